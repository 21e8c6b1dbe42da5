//! Error types for refdata-core

use thiserror::Error;

/// Core validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Empty exchange name")]
    EmptyExchange,

    #[error("Empty symbol")]
    EmptySymbol,

    #[error("Bar has no date")]
    MissingDate,

    #[error("Non-finite value for field {0}")]
    NonFiniteField(&'static str),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
