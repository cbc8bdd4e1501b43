use thiserror::Error;

/// A malformed availability expression.
///
/// Offsets are byte offsets into the source string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { offset: usize, found: char },

    #[error("unexpected {found} at offset {offset}")]
    UnexpectedToken { offset: usize, found: String },

    #[error("expression ended while expecting {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unclosed parenthesis opened at offset {offset}")]
    UnclosedParen { offset: usize },
}

pub type Result<T> = std::result::Result<T, ExpressionError>;
