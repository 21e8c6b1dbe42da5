//! Aligned column buffers: the storage representation of one series batch.

use crate::error::DecodeError;
use refdata_core::InstrumentKey;

/// Bytes per encoded value; every column is fixed-width.
pub const VALUE_WIDTH: usize = 8;

/// Column names in storage order.
pub const COLUMN_NAMES: [&str; 7] = [
    "dates",
    "opens",
    "highs",
    "lows",
    "closes",
    "adj_closes",
    "volumes",
];

/// Encoded columns for one (exchange, symbol) batch.
///
/// Invariants, checked by [`EncodedColumnSet::row_count`]: every column
/// holds `8 × row_count` bytes, and row `i` of every column refers to the
/// same logical bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedColumnSet {
    /// Key the batch is stored under
    pub key: InstrumentKey,
    /// Big-endian i64 epoch-milliseconds
    pub dates: Vec<u8>,
    /// Big-endian f64 opening prices
    pub opens: Vec<u8>,
    /// Big-endian f64 intraday highs
    pub highs: Vec<u8>,
    /// Big-endian f64 intraday lows
    pub lows: Vec<u8>,
    /// Big-endian f64 closing prices
    pub closes: Vec<u8>,
    /// Big-endian f64 adjusted closes
    pub adj_closes: Vec<u8>,
    /// Big-endian f64 traded volumes
    pub volumes: Vec<u8>,
}

impl EncodedColumnSet {
    /// Empty set with every buffer pre-sized for `rows` records
    pub fn with_capacity(key: InstrumentKey, rows: usize) -> Self {
        let bytes = rows * VALUE_WIDTH;
        Self {
            key,
            dates: Vec::with_capacity(bytes),
            opens: Vec::with_capacity(bytes),
            highs: Vec::with_capacity(bytes),
            lows: Vec::with_capacity(bytes),
            closes: Vec::with_capacity(bytes),
            adj_closes: Vec::with_capacity(bytes),
            volumes: Vec::with_capacity(bytes),
        }
    }

    /// Columns in storage order, paired with their names
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &[u8])> + '_ {
        COLUMN_NAMES.into_iter().zip([
            self.dates.as_slice(),
            self.opens.as_slice(),
            self.highs.as_slice(),
            self.lows.as_slice(),
            self.closes.as_slice(),
            self.adj_closes.as_slice(),
            self.volumes.as_slice(),
        ])
    }

    /// Number of rows, after validating the length invariants.
    ///
    /// The row count is derived from `dates`; every other column must match
    /// it exactly. A zero-length set is valid and has zero rows.
    pub fn row_count(&self) -> Result<usize, DecodeError> {
        let rows = self.dates.len() / VALUE_WIDTH;
        for (column, buf) in self.columns() {
            if buf.len() % VALUE_WIDTH != 0 {
                return Err(DecodeError::MalformedColumn {
                    column,
                    reason: format!(
                        "length {} is not a multiple of {}",
                        buf.len(),
                        VALUE_WIDTH
                    ),
                });
            }
            if buf.len() != rows * VALUE_WIDTH {
                return Err(DecodeError::MalformedColumn {
                    column,
                    reason: format!("{} rows where the set has {}", buf.len() / VALUE_WIDTH, rows),
                });
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_set() -> EncodedColumnSet {
        EncodedColumnSet::with_capacity(InstrumentKey::new("NYSE", "ACME"), 0)
    }

    #[test]
    fn test_empty_set_has_zero_rows() {
        assert_eq!(empty_set().row_count().unwrap(), 0);
    }

    #[test]
    fn test_misaligned_column_rejected() {
        let mut set = empty_set();
        set.dates = vec![0u8; 12]; // not a multiple of 8

        let err = set.row_count().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedColumn { column: "dates", .. }
        ));
    }

    #[test]
    fn test_row_count_mismatch_rejected() {
        let mut set = empty_set();
        set.dates = vec![0u8; 16]; // 2 rows
        set.opens = vec![0u8; 16];
        set.highs = vec![0u8; 16];
        set.lows = vec![0u8; 16];
        set.closes = vec![0u8; 8]; // 1 row
        set.adj_closes = vec![0u8; 16];
        set.volumes = vec![0u8; 16];

        let err = set.row_count().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedColumn { column: "closes", .. }
        ));
    }

    #[test]
    fn test_columns_are_in_storage_order() {
        let names: Vec<&str> = empty_set().columns().map(|(name, _)| name).collect();
        assert_eq!(names, COLUMN_NAMES);
    }
}
