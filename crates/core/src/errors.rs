use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown filter: {0}")]
    UnknownToggle(String),
    #[error("invalid type: {0}")]
    InvalidType(String),
    #[error("symbol must not be empty")]
    EmptySymbol,
}
