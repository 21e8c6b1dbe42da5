//! Store error types

use crate::coordinator::BatchWriteReceipt;
use refdata_codec::{DecodeError, EncodeError};
use refdata_core::InstrumentKey;
use thiserror::Error;

/// Connection bootstrap failures.
///
/// Fatal to coordinator and reader construction; there is no degraded mode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("No contact points supplied")]
    NoContactPoints,

    #[error("No contact point reachable: {0}")]
    Unreachable(String),
}

/// Failures reported by the storage-client session
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Statement rejected by storage: {0}")]
    Rejected(String),

    #[error("Session is closed")]
    Closed,

    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),

    #[error("Pending write abandoned before completion")]
    Abandoned,
}

/// Errors from the single-request historic write path
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Write rejected by storage: {0}")]
    StorageRejected(#[source] SessionError),
}

/// At least one write in a dividend fan-out failed.
///
/// Carries the full receipt so callers can account for exactly which row
/// positions failed and how many succeeded; "finished" and "succeeded"
/// are never conflated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{} of {} dividend writes failed", .receipt.failed_indices.len(), .receipt.total())]
pub struct AggregateWriteError {
    pub receipt: BatchWriteReceipt,
}

/// Errors from the historic read path
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("No series stored for {0}")]
    KeyNotFound(InstrumentKey),

    #[error("Stored series is malformed: {0}")]
    Malformed(#[from] DecodeError),

    #[error("Storage query failed: {0}")]
    Session(#[from] SessionError),
}
