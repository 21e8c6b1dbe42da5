//! Fixed-width columnar codec for daily bar series.
//!
//! One buffer per measure, aligned by row index: row `i` of every column
//! lives at byte offset `i * 8`. `dates` holds big-endian i64
//! epoch-milliseconds; the six price/volume columns hold big-endian
//! IEEE-754 f64 bits. Byte order is part of the storage durability
//! contract: blobs written in an earlier process lifetime must decode
//! bit-identically later.

use crate::columns::{EncodedColumnSet, VALUE_WIDTH};
use crate::error::{DecodeError, EncodeError};
use refdata_core::HistoricBar;

/// Encode an ordered batch of bars into aligned column buffers.
///
/// All bars must share one (exchange, symbol) key; the returned set carries
/// that key. Row order matches input order exactly, with no resorting.
/// The input is borrowed and never mutated.
pub fn encode(bars: &[HistoricBar]) -> Result<EncodedColumnSet, EncodeError> {
    let first = bars.first().ok_or(EncodeError::EmptyBatch)?;
    let key = first.key();

    let mut set = EncodedColumnSet::with_capacity(key.clone(), bars.len());
    for bar in bars {
        if bar.exchange != key.exchange || bar.symbol != key.symbol {
            return Err(EncodeError::MixedKeys {
                expected: key,
                found: bar.key(),
            });
        }

        set.dates.extend_from_slice(&bar.date.to_be_bytes());
        set.opens.extend_from_slice(&bar.open.to_be_bytes());
        set.highs.extend_from_slice(&bar.high.to_be_bytes());
        set.lows.extend_from_slice(&bar.low.to_be_bytes());
        set.closes.extend_from_slice(&bar.close.to_be_bytes());
        set.adj_closes.extend_from_slice(&bar.adj_close.to_be_bytes());
        set.volumes.extend_from_slice(&bar.volume.to_be_bytes());
    }

    Ok(set)
}

impl EncodedColumnSet {
    /// Decode the stored buffers back into bars.
    ///
    /// Validates the column invariants up front and returns a borrowing row
    /// cursor. The cursor is `Clone` and the buffers are immutable, so the
    /// same set can be decoded any number of times.
    pub fn decode(&self) -> Result<BarRows<'_>, DecodeError> {
        let rows = self.row_count()?;
        Ok(BarRows {
            set: self,
            rows,
            next: 0,
        })
    }
}

/// Borrowing row cursor produced by [`EncodedColumnSet::decode`]
#[derive(Debug, Clone)]
pub struct BarRows<'a> {
    set: &'a EncodedColumnSet,
    rows: usize,
    next: usize,
}

impl Iterator for BarRows<'_> {
    type Item = HistoricBar;

    fn next(&mut self) -> Option<HistoricBar> {
        if self.next >= self.rows {
            return None;
        }
        let row = self.next;
        self.next += 1;

        let set = self.set;
        Some(HistoricBar {
            exchange: set.key.exchange.clone(),
            symbol: set.key.symbol.clone(),
            date: read_i64(&set.dates, row),
            open: read_f64(&set.opens, row),
            high: read_f64(&set.highs, row),
            low: read_f64(&set.lows, row),
            close: read_f64(&set.closes, row),
            adj_close: read_f64(&set.adj_closes, row),
            volume: read_f64(&set.volumes, row),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rows - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BarRows<'_> {}

fn read_i64(buf: &[u8], row: usize) -> i64 {
    let at = row * VALUE_WIDTH;
    i64::from_be_bytes(buf[at..at + VALUE_WIDTH].try_into().unwrap())
}

fn read_f64(buf: &[u8], row: usize) -> f64 {
    let at = row * VALUE_WIDTH;
    f64::from_be_bytes(buf[at..at + VALUE_WIDTH].try_into().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::VALUE_WIDTH;
    use refdata_core::InstrumentKey;

    const DAY_MS: i64 = 86_400_000;

    fn sample_bars(count: usize) -> Vec<HistoricBar> {
        (0..count)
            .map(|i| {
                HistoricBar::builder("NYSE", "ACME")
                    .date(i as i64 * DAY_MS)
                    .open(10.0 + i as f64)
                    .high(11.0 + i as f64)
                    .low(9.5 + i as f64)
                    .close(10.5 + i as f64)
                    .adj_close(10.4 + i as f64)
                    .volume(1_000_000.0 + i as f64)
                    .build()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let bars = sample_bars(5);
        let set = encode(&bars).unwrap();

        let decoded: Vec<HistoricBar> = set.decode().unwrap().collect();
        assert_eq!(decoded, bars);
    }

    #[test]
    fn test_column_length_invariant() {
        let bars = sample_bars(7);
        let set = encode(&bars).unwrap();

        assert_eq!(set.row_count().unwrap(), 7);
        for (_, buf) in set.columns() {
            assert_eq!(buf.len(), 7 * VALUE_WIDTH);
        }
    }

    #[test]
    fn test_encode_preserves_input_order() {
        // Deliberately unsorted dates: the codec must not resort.
        let mut bars = sample_bars(3);
        bars.swap(0, 2);

        let set = encode(&bars).unwrap();
        let decoded: Vec<HistoricBar> = set.decode().unwrap().collect();
        assert_eq!(decoded, bars);
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert_eq!(encode(&[]).unwrap_err(), EncodeError::EmptyBatch);
    }

    #[test]
    fn test_mixed_keys_rejected() {
        let mut bars = sample_bars(2);
        bars.push(
            HistoricBar::builder("LSE", "ACME")
                .date(2 * DAY_MS)
                .close(12.0)
                .build()
                .unwrap(),
        );

        let err = encode(&bars).unwrap_err();
        assert_eq!(
            err,
            EncodeError::MixedKeys {
                expected: InstrumentKey::new("NYSE", "ACME"),
                found: InstrumentKey::new("LSE", "ACME"),
            }
        );
    }

    #[test]
    fn test_batch_carries_common_key() {
        let set = encode(&sample_bars(3)).unwrap();
        assert_eq!(set.key, InstrumentKey::new("NYSE", "ACME"));
    }

    #[test]
    fn test_big_endian_layout() {
        let bar = HistoricBar::builder("NYSE", "ACME")
            .date(1)
            .close(1.0)
            .build()
            .unwrap();
        let set = encode(&[bar]).unwrap();

        assert_eq!(set.dates, 1i64.to_be_bytes());
        assert_eq!(set.closes, 1.0f64.to_be_bytes());
        // Most significant byte first.
        assert_eq!(set.dates[7], 1);
        assert_eq!(set.closes[0], 0x3f);
    }

    #[test]
    fn test_decode_is_restartable() {
        let bars = sample_bars(4);
        let set = encode(&bars).unwrap();

        let cursor = set.decode().unwrap();
        assert_eq!(cursor.len(), 4);

        let first_pass: Vec<HistoricBar> = cursor.clone().collect();
        let second_pass: Vec<HistoricBar> = cursor.collect();
        assert_eq!(first_pass, second_pass);
        assert_eq!(first_pass, bars);
    }

    #[test]
    fn test_zero_row_set_decodes_empty() {
        let set = EncodedColumnSet::with_capacity(InstrumentKey::new("NYSE", "ACME"), 0);
        let decoded: Vec<HistoricBar> = set.decode().unwrap().collect();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_rejects_truncated_column() {
        let mut set = encode(&sample_bars(3)).unwrap();
        set.volumes.truncate(set.volumes.len() - VALUE_WIDTH);

        let err = set.decode().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedColumn {
                column: "volumes",
                ..
            }
        ));
    }
}
