//! Core data types for the refdata reference-data store

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Millisecond-precision Unix epoch timestamp
pub type TimestampMs = i64;

/// Identifies one instrument's series: exchange plus ticker symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstrumentKey {
    pub exchange: String,
    pub symbol: String,
}

impl InstrumentKey {
    /// Create a new key
    pub fn new(exchange: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            symbol: symbol.into(),
        }
    }

    /// Validate the key
    pub fn validate(&self) -> Result<()> {
        if self.exchange.is_empty() {
            return Err(CoreError::EmptyExchange);
        }
        if self.symbol.is_empty() {
            return Err(CoreError::EmptySymbol);
        }
        Ok(())
    }
}

impl fmt::Display for InstrumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchange, self.symbol)
    }
}

/// One trading day for one instrument.
///
/// Immutable once constructed; the codec and write paths consume bars by
/// reference and never mutate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricBar {
    /// Exchange the instrument trades on
    pub exchange: String,
    /// Ticker symbol
    pub symbol: String,
    /// Trading day, milliseconds since Unix epoch
    pub date: TimestampMs,
    /// Opening price
    pub open: f64,
    /// Intraday high
    pub high: f64,
    /// Intraday low
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Close adjusted for splits and dividends
    pub adj_close: f64,
    /// Shares traded
    pub volume: f64,
}

impl HistoricBar {
    /// Create a new bar builder
    pub fn builder(exchange: impl Into<String>, symbol: impl Into<String>) -> BarBuilder {
        BarBuilder::new(exchange, symbol)
    }

    /// The (exchange, symbol) key this bar belongs to
    pub fn key(&self) -> InstrumentKey {
        InstrumentKey::new(self.exchange.clone(), self.symbol.clone())
    }

    /// Validate the bar
    pub fn validate(&self) -> Result<()> {
        self.key().validate()?;
        for (name, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("adj_close", self.adj_close),
            ("volume", self.volume),
        ] {
            if !value.is_finite() {
                return Err(CoreError::NonFiniteField(name));
            }
        }
        Ok(())
    }
}

/// Builder for constructing HistoricBars
pub struct BarBuilder {
    exchange: String,
    symbol: String,
    date: Option<TimestampMs>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    adj_close: f64,
    volume: f64,
}

impl BarBuilder {
    /// Create a new bar builder
    pub fn new(exchange: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            symbol: symbol.into(),
            date: None,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
            adj_close: 0.0,
            volume: 0.0,
        }
    }

    /// Set the trading day (epoch milliseconds)
    pub fn date(mut self, date: TimestampMs) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the opening price
    pub fn open(mut self, open: f64) -> Self {
        self.open = open;
        self
    }

    /// Set the intraday high
    pub fn high(mut self, high: f64) -> Self {
        self.high = high;
        self
    }

    /// Set the intraday low
    pub fn low(mut self, low: f64) -> Self {
        self.low = low;
        self
    }

    /// Set the closing price
    pub fn close(mut self, close: f64) -> Self {
        self.close = close;
        self
    }

    /// Set the adjusted close
    pub fn adj_close(mut self, adj_close: f64) -> Self {
        self.adj_close = adj_close;
        self
    }

    /// Set the traded volume
    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Build the bar
    pub fn build(self) -> Result<HistoricBar> {
        let bar = HistoricBar {
            exchange: self.exchange,
            symbol: self.symbol,
            date: self.date.ok_or(CoreError::MissingDate)?,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            adj_close: self.adj_close,
            volume: self.volume,
        };

        bar.validate()?;
        Ok(bar)
    }
}

/// A cash dividend paid by one instrument on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    /// Exchange the instrument trades on
    pub exchange: String,
    /// Ticker symbol
    pub symbol: String,
    /// Ex-dividend date, milliseconds since Unix epoch
    pub date: TimestampMs,
    /// Dividend amount per share
    pub dividend: f64,
}

impl DividendEvent {
    /// Create a new dividend event
    pub fn new(
        exchange: impl Into<String>,
        symbol: impl Into<String>,
        date: TimestampMs,
        dividend: f64,
    ) -> Self {
        Self {
            exchange: exchange.into(),
            symbol: symbol.into(),
            date,
            dividend,
        }
    }

    /// The (exchange, symbol) key this event belongs to
    pub fn key(&self) -> InstrumentKey {
        InstrumentKey::new(self.exchange.clone(), self.symbol.clone())
    }

    /// Validate the event
    pub fn validate(&self) -> Result<()> {
        self.key().validate()?;
        if !self.dividend.is_finite() {
            return Err(CoreError::NonFiniteField("dividend"));
        }
        Ok(())
    }
}
