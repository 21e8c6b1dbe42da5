//! Read path: point lookup by instrument key, decode of the stored blobs.

use crate::client::{Consistency, PreparedStatement, Row, Session, Value};
use crate::error::{ReadError, SessionError};
use refdata_codec::{DecodeError, EncodedColumnSet};
use refdata_core::{HistoricBar, InstrumentKey};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const SELECT_HISTORIC: &str = "SELECT dates, opens, highs, lows, closes, adj_closes, volumes \
     FROM refdata.historic_data WHERE exchange = ? AND symbol = ?";

/// Reads stored daily series back out of the historic table.
pub struct HistoricReader {
    session: Arc<dyn Session>,
    select_historic: PreparedStatement,
}

impl HistoricReader {
    /// Prepare the point-lookup statement. Preparation failure is fatal.
    pub async fn new(session: Arc<dyn Session>) -> Result<Self, SessionError> {
        let select_historic = session
            .prepare(SELECT_HISTORIC)
            .await?
            .with_consistency(Consistency::One);
        Ok(Self {
            session,
            select_historic,
        })
    }

    /// Fetch the full stored series for one key.
    ///
    /// The data model keeps exactly zero or one row per key, so this is a
    /// point lookup with no pagination. A missing row is
    /// [`ReadError::KeyNotFound`]; a present row whose columns are empty is
    /// a stored empty series and yields an empty vec.
    pub async fn fetch_historic_series(
        &self,
        key: &InstrumentKey,
    ) -> Result<Vec<HistoricBar>, ReadError> {
        let started = Instant::now();
        let bound = self.select_historic.bind(vec![
            Value::Text(key.exchange.clone()),
            Value::Text(key.symbol.clone()),
        ]);

        let rows = self.session.query(&bound).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| ReadError::KeyNotFound(key.clone()))?;

        let set = column_set_from_row(key.clone(), &row)?;
        let bars: Vec<HistoricBar> = set.decode()?.collect();

        debug!(
            %key,
            rows = bars.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched historic series"
        );
        Ok(bars)
    }
}

fn column_set_from_row(key: InstrumentKey, row: &Row) -> Result<EncodedColumnSet, DecodeError> {
    let take = |name: &'static str| -> Result<Vec<u8>, DecodeError> {
        row.get(name)
            .and_then(Value::as_bytes)
            .map(<[u8]>::to_vec)
            .ok_or(DecodeError::MissingColumn(name))
    };

    Ok(EncodedColumnSet {
        key,
        dates: take("dates")?,
        opens: take("opens")?,
        highs: take("highs")?,
        lows: take("lows")?,
        closes: take("closes")?,
        adj_closes: take("adj_closes")?,
        volumes: take("volumes")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_set_from_row_missing_column() {
        let mut row = Row::new();
        row.push("dates", Value::Blob(Vec::new()));
        // Every other column absent.

        let err = column_set_from_row(InstrumentKey::new("NYSE", "ACME"), &row).unwrap_err();
        assert_eq!(err, DecodeError::MissingColumn("opens"));
    }

    #[test]
    fn test_column_set_from_row_wrong_type() {
        let mut row = Row::new();
        for name in refdata_codec::COLUMN_NAMES {
            row.push(name, Value::Blob(Vec::new()));
        }
        row.push("extra", Value::Double(1.0));

        let set = column_set_from_row(InstrumentKey::new("NYSE", "ACME"), &row).unwrap();
        assert_eq!(set.row_count().unwrap(), 0);
    }
}
