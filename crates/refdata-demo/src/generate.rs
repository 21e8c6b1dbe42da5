//! Synthetic daily-series generation for the demo workload.

use rand::prelude::*;
use refdata_core::{DividendEvent, HistoricBar, InstrumentKey, TimestampMs};

/// One trading day in milliseconds.
pub const DAY_MS: i64 = 86_400_000;

/// Roughly one calendar quarter between dividend events.
pub const QUARTER_MS: i64 = 91 * DAY_MS;

/// Generates a plausible daily series with a seeded random walk.
pub struct SeriesGenerator {
    rng: StdRng,
    price: f64,
}

impl SeriesGenerator {
    pub fn new(seed: u64, start_price: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            price: start_price,
        }
    }

    /// Generates `days` consecutive daily bars starting at `start_date`.
    ///
    /// Close-to-close drift stays within ±2% a day; highs and lows bracket
    /// the open/close range with a small wick.
    pub fn daily_bars(
        &mut self,
        key: &InstrumentKey,
        start_date: TimestampMs,
        days: usize,
    ) -> Vec<HistoricBar> {
        (0..days)
            .map(|day| {
                let open = self.price;
                let drift = self.rng.gen_range(-0.02..0.02);
                let close = (open * (1.0 + drift)).max(0.01);
                let high = open.max(close) * (1.0 + self.rng.gen_range(0.0..0.01));
                let low = open.min(close) * (1.0 - self.rng.gen_range(0.0..0.01));
                let volume = self.rng.gen_range(100_000.0..5_000_000.0_f64).round();
                self.price = close;

                HistoricBar {
                    exchange: key.exchange.clone(),
                    symbol: key.symbol.clone(),
                    date: start_date + day as i64 * DAY_MS,
                    open,
                    high,
                    low,
                    close,
                    adj_close: close,
                    volume,
                }
            })
            .collect()
    }

    /// Generates `count` quarterly dividend events starting at `start_date`.
    pub fn dividends(
        &mut self,
        key: &InstrumentKey,
        start_date: TimestampMs,
        count: usize,
    ) -> Vec<DividendEvent> {
        (0..count)
            .map(|quarter| {
                let amount = (self.rng.gen_range(0.10..0.75_f64) * 100.0).round() / 100.0;
                DividendEvent::new(
                    key.exchange.clone(),
                    key.symbol.clone(),
                    start_date + quarter as i64 * QUARTER_MS,
                    amount,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_is_deterministic_per_seed() {
        let key = InstrumentKey::new("AMEX", "IF");
        let first = SeriesGenerator::new(42, 25.0).daily_bars(&key, 0, 30);
        let second = SeriesGenerator::new(42, 25.0).daily_bars(&key, 0, 30);
        assert_eq!(first, second);

        let other_seed = SeriesGenerator::new(7, 25.0).daily_bars(&key, 0, 30);
        assert_ne!(first, other_seed);
    }

    #[test]
    fn test_bars_share_key_and_ascend_by_day() {
        let key = InstrumentKey::new("AMEX", "IF");
        let bars = SeriesGenerator::new(1, 25.0).daily_bars(&key, DAY_MS, 10);

        assert_eq!(bars.len(), 10);
        for (day, bar) in bars.iter().enumerate() {
            assert_eq!(bar.key(), key);
            assert_eq!(bar.date, DAY_MS + day as i64 * DAY_MS);
            assert!(bar.high >= bar.open.max(bar.close));
            assert!(bar.low <= bar.open.min(bar.close));
            assert!(bar.validate().is_ok());
        }
    }

    #[test]
    fn test_dividends_are_quarterly() {
        let key = InstrumentKey::new("AMEX", "IF");
        let events = SeriesGenerator::new(1, 25.0).dividends(&key, 0, 4);

        assert_eq!(events.len(), 4);
        for (quarter, event) in events.iter().enumerate() {
            assert_eq!(event.date, quarter as i64 * QUARTER_MS);
            assert!(event.dividend >= 0.10 && event.dividend <= 0.75);
        }
    }
}
