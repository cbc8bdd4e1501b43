//! Tokenizer for availability expressions.

use std::fmt;

use crate::error::{ExpressionError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Code(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Code(code) => write!(f, "code '{code}'"),
            Token::And => f.write_str("'&'"),
            Token::Or => f.write_str("'|'"),
            Token::Not => f.write_str("'~'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
        }
    }
}

/// A token together with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub offset: usize,
    pub token: Token,
}

pub(crate) fn is_code_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.')
}

/// Split an expression into tokens. Whitespace is ignored.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((offset, ch)) = chars.next() {
        let token = match ch {
            '&' => Token::And,
            '|' => Token::Or,
            '~' => Token::Not,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_whitespace() => continue,
            c if is_code_char(c) => {
                let mut end = offset + c.len_utf8();
                while let Some(&(next_offset, next)) = chars.peek() {
                    if !is_code_char(next) {
                        break;
                    }
                    end = next_offset + next.len_utf8();
                    chars.next();
                }
                Token::Code(input[offset..end].to_string())
            }
            found => return Err(ExpressionError::UnexpectedChar { offset, found }),
        };
        tokens.push(Spanned { offset, token });
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .expect("tokenize")
            .into_iter()
            .map(|spanned| spanned.token)
            .collect()
    }

    #[test]
    fn splits_operators_and_codes() {
        assert_eq!(
            kinds("wheel_A&(red | ~blue)"),
            vec![
                Token::Code("wheel_A".to_string()),
                Token::And,
                Token::LParen,
                Token::Code("red".to_string()),
                Token::Or,
                Token::Not,
                Token::Code("blue".to_string()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn reports_offset_of_bad_character() {
        let error = tokenize("abc & $x").unwrap_err();
        assert_eq!(
            error,
            ExpressionError::UnexpectedChar {
                offset: 6,
                found: '$'
            }
        );
    }
}
