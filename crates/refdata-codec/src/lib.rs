//! refdata-codec - fixed-width columnar codec for daily bar series
//!
//! Packs an ordered batch of [`HistoricBar`]s into one byte buffer per
//! measure (`dates`, `opens`, `highs`, `lows`, `closes`, `adj_closes`,
//! `volumes`), aligned by row index, and decodes such buffers back into
//! bars. Pure and stateless; no I/O.
//!
//! [`HistoricBar`]: refdata_core::HistoricBar

pub mod codec;
pub mod columns;
pub mod error;

pub use codec::{encode, BarRows};
pub use columns::{EncodedColumnSet, COLUMN_NAMES, VALUE_WIDTH};
pub use error::{DecodeError, EncodeError};
