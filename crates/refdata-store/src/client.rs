//! Storage-client contract: sessions, statements, rows, pending writes.
//!
//! The storage cluster itself is an external collaborator; this module
//! fixes the interface the write coordinator and read path program against.
//! A session offers synchronous-style execution (await the outcome),
//! non-blocking execution (a [`PendingWrite`] handle resolved on
//! completion), and statement preparation with a per-statement consistency
//! level.

use crate::error::SessionError;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Replica-acknowledgment level applied to a prepared statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consistency {
    /// Acknowledged by a single replica
    One,
    /// Acknowledged by a majority of replicas
    #[default]
    Quorum,
    /// Acknowledged by every replica
    All,
}

/// A value bound to one statement position
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 text
    Text(String),
    /// 64-bit float
    Double(f64),
    /// Epoch-millisecond timestamp
    Timestamp(i64),
    /// Opaque bytes
    Blob(Vec<u8>),
}

impl Value {
    /// Try to get as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as an epoch-millisecond timestamp
    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Value::Timestamp(ms) => Some(*ms),
            _ => None,
        }
    }

    /// Try to get as a byte slice
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }
}

/// A statement prepared once on a session and bound per execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedStatement {
    text: String,
    consistency: Consistency,
}

impl PreparedStatement {
    /// Create a prepared statement with the default consistency level
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            consistency: Consistency::default(),
        }
    }

    /// Set the consistency level applied to every execution
    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }

    /// The statement text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The configured consistency level
    pub fn consistency(&self) -> Consistency {
        self.consistency
    }

    /// Bind positional values for one execution
    pub fn bind(&self, values: Vec<Value>) -> BoundStatement {
        BoundStatement {
            statement: self.clone(),
            values,
        }
    }
}

/// A prepared statement plus positional values, ready to execute
#[derive(Debug, Clone)]
pub struct BoundStatement {
    pub statement: PreparedStatement,
    pub values: Vec<Value>,
}

/// One stored row returned by a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named column
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.columns.push((name.into(), value));
    }

    /// Look up a column by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }
}

/// Handle to one in-flight write.
///
/// Resolves to the operation's terminal outcome: explicitly success or
/// failure, never just "finished". Dropping the handle does not cancel the
/// write; once submitted, an operation runs to completion or failure.
pub struct PendingWrite {
    rx: oneshot::Receiver<Result<(), SessionError>>,
}

impl PendingWrite {
    /// Completion channel: the executor resolves the handle through the
    /// returned sender.
    pub fn channel() -> (oneshot::Sender<Result<(), SessionError>>, PendingWrite) {
        let (tx, rx) = oneshot::channel();
        (tx, PendingWrite { rx })
    }

    /// A handle that is already resolved
    pub fn ready(outcome: Result<(), SessionError>) -> Self {
        let (tx, handle) = Self::channel();
        let _ = tx.send(outcome);
        handle
    }
}

impl Future for PendingWrite {
    type Output = Result<(), SessionError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| match received {
            Ok(outcome) => outcome,
            // The executor dropped the sender without reporting; surface it
            // as a failure rather than hanging.
            Err(_) => Err(SessionError::Abandoned),
        })
    }
}

/// One long-lived connection to the storage cluster.
///
/// Shared by every operation and safe to share across tasks; statements
/// are prepared once and reused. Both execution modes must be supported:
/// the historic path awaits a single outcome, the dividend path fans out
/// through [`Session::execute_async`].
#[async_trait]
pub trait Session: Send + Sync {
    /// Prepare a statement for repeated execution
    async fn prepare(&self, text: &str) -> Result<PreparedStatement, SessionError>;

    /// Execute a bound write and suspend until its terminal outcome
    async fn execute(&self, statement: &BoundStatement) -> Result<(), SessionError>;

    /// Submit a bound write without waiting; the returned handle resolves
    /// to the operation's outcome
    fn execute_async(&self, statement: &BoundStatement) -> PendingWrite;

    /// Run a point read returning whole rows
    async fn query(&self, statement: &BoundStatement) -> Result<Vec<Row>, SessionError>;

    /// Close the session; later operations fail with [`SessionError::Closed`]
    async fn close(&self);
}
