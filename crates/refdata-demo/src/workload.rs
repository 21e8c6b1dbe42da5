//! Demo flows: write a generated series, read it back, report timings.

use crate::config::{DividendConfig, RoundtripConfig};
use crate::generate::{SeriesGenerator, QUARTER_MS};
use anyhow::Result;
use refdata_core::{InstrumentKey, TimestampMs};
use refdata_store::{HistoricReader, InMemorySession, Session, Value, WriteCoordinator};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// First ex-dividend date used by the `dividends` subcommand (2010-01-01).
const DIVIDEND_START_MS: TimestampMs = 1_262_304_000_000;

/// Generate a daily series, write it through the coordinator, read it back,
/// and verify the roundtrip field-for-field.
pub async fn run_roundtrip(config: RoundtripConfig) -> Result<()> {
    anyhow::ensure!(config.days > 0, "--days must be at least 1");

    let session: Arc<dyn Session> = Arc::new(connect(&config.demo.contact_points)?);
    let coordinator = WriteCoordinator::new(session.clone()).await?;
    let reader = HistoricReader::new(session.clone()).await?;

    let key = InstrumentKey::new(&config.demo.exchange, &config.demo.symbol);
    let mut generator = SeriesGenerator::new(config.demo.seed, 25.0);
    let bars = generator.daily_bars(&key, config.start_date, config.days);
    info!(
        %key,
        days = bars.len(),
        from = %format_day(bars[0].date),
        to = %format_day(bars[bars.len() - 1].date),
        "generated daily series"
    );

    let started = Instant::now();
    let receipt = coordinator.insert_historic_series(&bars).await?;
    info!(
        "historic write of {} rows took {} ms",
        receipt.rows_written,
        started.elapsed().as_millis()
    );

    let started = Instant::now();
    let stored = reader.fetch_historic_series(&key).await?;
    info!(
        "data read took {} ms ({} rows)",
        started.elapsed().as_millis(),
        stored.len()
    );

    anyhow::ensure!(
        stored == bars,
        "read-back mismatch: stored series differs from written series"
    );
    info!(
        total_points = coordinator.total_points(),
        "roundtrip verified"
    );

    session.close().await;
    Ok(())
}

/// Fan out concurrent dividend writes and report the aggregate receipt.
pub async fn run_dividends(config: DividendConfig) -> Result<()> {
    let mut session = connect(&config.demo.contact_points)?;
    if config.max_delay_ms > 0 {
        session = session.with_write_delay_ms(1..config.max_delay_ms + 1);
    }
    if let Some(every) = config.fail_every {
        let every = every.max(1);
        session = session.with_failure_rule(move |statement| {
            statement
                .values
                .get(2)
                .and_then(Value::as_timestamp)
                .map(|date| {
                    let index = ((date - DIVIDEND_START_MS) / QUARTER_MS) as usize;
                    (index + 1) % every == 0
                })
                .unwrap_or(false)
        });
    }

    let session: Arc<dyn Session> = Arc::new(session);
    let coordinator = WriteCoordinator::new(session.clone()).await?;

    let key = InstrumentKey::new(&config.demo.exchange, &config.demo.symbol);
    let mut generator = SeriesGenerator::new(config.demo.seed, 25.0);
    let events = generator.dividends(&key, DIVIDEND_START_MS, config.count);

    info!(%key, count = events.len(), "submitting dividend fan-out");
    let started = Instant::now();
    match coordinator.insert_dividends(&events).await {
        Ok(receipt) => info!(
            "all {} dividend writes completed in {} ms",
            receipt.succeeded,
            started.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "{err} after {} ms (failed indices: {:?})",
            started.elapsed().as_millis(),
            err.receipt.failed_indices
        ),
    }
    info!(
        total_points = coordinator.total_points(),
        "fan-out finished"
    );

    session.close().await;
    Ok(())
}

fn connect(contact_points: &[String]) -> Result<InMemorySession> {
    let contact_points: Vec<&str> = contact_points.iter().map(String::as_str).collect();
    Ok(InMemorySession::connect(&contact_points)?)
}

fn format_day(ms: TimestampMs) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|day| day.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ms.to_string())
}
