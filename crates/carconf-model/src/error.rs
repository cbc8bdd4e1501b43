use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("invalid style key '{0}': expected market-mmc-trim")]
    InvalidStyleKey(String),
    #[error("invalid option assignment '{0}': expected CATEGORY=CODE")]
    InvalidAssignment(String),
}
