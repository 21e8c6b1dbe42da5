//! Codec error types

use refdata_core::InstrumentKey;
use thiserror::Error;

/// Errors from encoding a bar batch into column buffers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Cannot encode an empty batch")]
    EmptyBatch,

    #[error("Batch mixes instrument keys: {expected} and {found}")]
    MixedKeys {
        expected: InstrumentKey,
        found: InstrumentKey,
    },
}

/// Errors from decoding stored column buffers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed column {column}: {reason}")]
    MalformedColumn {
        column: &'static str,
        reason: String,
    },

    #[error("Stored row is missing column {0}")]
    MissingColumn(&'static str),
}
