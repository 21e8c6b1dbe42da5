//! refdata-store - write coordination and read path for the refdata store
//!
//! This crate provides the storage-facing layer:
//! - the storage-client contract (session trait, prepared/bound statements,
//!   consistency levels, pending-write handles)
//! - the write coordinator (single-request historic batches, concurrent
//!   dividend fan-out behind a completion barrier)
//! - the historic read path (point lookup + decode)
//! - an in-memory session for tests and the demo workload

pub mod client;
pub mod coordinator;
pub mod error;
pub mod memory;
pub mod read;

pub use client::{
    BoundStatement, Consistency, PendingWrite, PreparedStatement, Row, Session, Value,
};
pub use coordinator::{BatchWriteReceipt, WriteCoordinator, WriteReceipt};
pub use error::{AggregateWriteError, ConnectError, ReadError, SessionError, WriteError};
pub use memory::InMemorySession;
pub use read::HistoricReader;
