//! Write coordination: bound-statement construction, fan-out, and the
//! completion barrier.
//!
//! Two write paths with different shapes:
//! - historic bars: one bound write per batch carrying the seven column
//!   blobs, awaited directly
//! - dividends: one independent write per event, submitted concurrently and
//!   joined by a completion barrier that aggregates per-index outcomes

use crate::client::{Consistency, PendingWrite, PreparedStatement, Session, Value};
use crate::error::{AggregateWriteError, SessionError, WriteError};
use futures::future::join_all;
use refdata_core::{DividendEvent, HistoricBar};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

const INSERT_HISTORIC: &str = "INSERT INTO refdata.historic_data \
     (exchange, symbol, dates, opens, highs, lows, closes, adj_closes, volumes) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";

const INSERT_DIVIDEND: &str = "INSERT INTO refdata.dividends \
     (exchange, symbol, date, dividend) VALUES (?, ?, ?, ?)";

const INSERT_METADATA: &str = "INSERT INTO refdata.exchange_metadata \
     (exchange, symbol, last_updated_date) VALUES (?, ?, ?)";

/// Receipt for a successful single-request historic write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Records carried by the written batch
    pub rows_written: usize,
}

/// Aggregate outcome of one dividend fan-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchWriteReceipt {
    /// Writes that reached a successful terminal state
    pub succeeded: usize,
    /// Input positions of the writes that failed
    pub failed_indices: BTreeSet<usize>,
}

impl BatchWriteReceipt {
    /// Total writes submitted
    pub fn total(&self) -> usize {
        self.succeeded + self.failed_indices.len()
    }

    /// True when every submitted write succeeded
    pub fn all_succeeded(&self) -> bool {
        self.failed_indices.is_empty()
    }
}

/// Coordinates writes against a shared storage session.
///
/// Statements are prepared once at construction and never re-prepared; the
/// session and statements are read-only afterwards, so the coordinator can
/// be shared freely across tasks. Writes are never retried here; retry
/// policy belongs to callers.
pub struct WriteCoordinator {
    session: Arc<dyn Session>,
    insert_historic: PreparedStatement,
    insert_dividend: PreparedStatement,
    /// Prepared for schema parity; no core path binds it yet. Extension
    /// point for recording per-instrument refresh times.
    #[allow(dead_code)]
    insert_metadata: PreparedStatement,
    total_points: AtomicU64,
}

impl WriteCoordinator {
    /// Prepare the insert statements at consistency ONE.
    ///
    /// ONE is the weakest level the cluster offers: a successful write
    /// guarantees single-replica durability at acknowledgment time, and
    /// every guarantee this coordinator makes is bounded by that choice.
    /// Preparation failure is fatal; there is no degraded mode.
    pub async fn new(session: Arc<dyn Session>) -> Result<Self, SessionError> {
        let insert_historic = session
            .prepare(INSERT_HISTORIC)
            .await?
            .with_consistency(Consistency::One);
        let insert_dividend = session
            .prepare(INSERT_DIVIDEND)
            .await?
            .with_consistency(Consistency::One);
        let insert_metadata = session
            .prepare(INSERT_METADATA)
            .await?
            .with_consistency(Consistency::One);

        info!("write coordinator ready (consistency ONE)");
        Ok(Self {
            session,
            insert_historic,
            insert_dividend,
            insert_metadata,
            total_points: AtomicU64::new(0),
        })
    }

    /// Write one instrument's daily series as a single batch.
    ///
    /// The batch replaces any series previously stored under its key: batch
    /// granularity is "the whole history for a key". The call suspends on
    /// the one operation's outcome; there is no fan-out on this path.
    pub async fn insert_historic_series(
        &self,
        bars: &[HistoricBar],
    ) -> Result<WriteReceipt, WriteError> {
        let set = refdata_codec::encode(bars)?;
        debug!(key = %set.key, rows = bars.len(), "writing historic series");

        let mut values = Vec::with_capacity(9);
        values.push(Value::Text(set.key.exchange.clone()));
        values.push(Value::Text(set.key.symbol.clone()));
        values.extend(set.columns().map(|(_, blob)| Value::Blob(blob.to_vec())));

        let bound = self.insert_historic.bind(values);
        self.session
            .execute(&bound)
            .await
            .map_err(WriteError::StorageRejected)?;

        self.total_points.fetch_add(bars.len() as u64, Ordering::Relaxed);
        Ok(WriteReceipt {
            rows_written: bars.len(),
        })
    }

    /// Write dividend events as one concurrent fan-out.
    ///
    /// Writes are submitted in input order, so the indices in the receipt
    /// refer to positions in `events`; completion order is unspecified.
    /// The call does not return until every submitted write has reached a
    /// terminal state: the barrier is a completion-driven join across the
    /// pending handles, not a poll loop.
    pub async fn insert_dividends(
        &self,
        events: &[DividendEvent],
    ) -> Result<BatchWriteReceipt, AggregateWriteError> {
        let pending: Vec<PendingWrite> = events
            .iter()
            .map(|event| {
                let bound = self.insert_dividend.bind(vec![
                    Value::Text(event.exchange.clone()),
                    Value::Text(event.symbol.clone()),
                    Value::Timestamp(event.date),
                    Value::Double(event.dividend),
                ]);
                self.session.execute_async(&bound)
            })
            .collect();

        // Completion barrier: suspend until all outcomes are knowable.
        let outcomes = join_all(pending).await;

        let mut failed_indices = BTreeSet::new();
        for (index, outcome) in outcomes.iter().enumerate() {
            match outcome {
                Ok(()) => {
                    self.total_points.fetch_add(1, Ordering::Relaxed);
                }
                Err(cause) => {
                    warn!(index, %cause, "dividend write failed");
                    failed_indices.insert(index);
                }
            }
        }

        let receipt = BatchWriteReceipt {
            succeeded: events.len() - failed_indices.len(),
            failed_indices,
        };
        debug!(
            succeeded = receipt.succeeded,
            failed = receipt.failed_indices.len(),
            "dividend fan-out complete"
        );

        if receipt.all_succeeded() {
            Ok(receipt)
        } else {
            Err(AggregateWriteError { receipt })
        }
    }

    /// Total records written through this coordinator.
    ///
    /// Monotonic. For any one batch the value is only guaranteed accurate
    /// after that batch's call has returned; increments from a fan-out in
    /// flight may not all be visible yet.
    pub fn total_points(&self) -> u64 {
        self.total_points.load(Ordering::Relaxed)
    }
}
