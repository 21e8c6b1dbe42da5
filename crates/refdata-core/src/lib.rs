//! refdata-core - value types for the refdata market reference-data store
//!
//! This crate holds the types shared by every other workspace member:
//! - `HistoricBar`: one trading day (OHLC, adjusted close, volume)
//! - `DividendEvent`: one cash dividend
//! - `InstrumentKey`: the (exchange, symbol) pair identifying a series

pub mod error;
pub mod types;

pub use error::{CoreError, Result};
pub use types::{BarBuilder, DividendEvent, HistoricBar, InstrumentKey, TimestampMs};
