//! Write/read workload demo for the refdata store.
//!
//! Generates a synthetic daily-bar series for one (exchange, symbol),
//! loads it through the write coordinator, reads it back through the read
//! path, and reports row counts and elapsed times. The `dividends`
//! subcommand exercises the concurrent fan-out with optional injected
//! delays and failures.
//!
//! # Usage
//! ```bash
//! # Write a year of bars and read them back
//! refdata-demo --exchange AMEX --symbol IF roundtrip --days 365
//!
//! # Fan out 20 dividend writes, failing every 4th
//! refdata-demo dividends -n 20 --fail-every 4
//! ```

pub mod config;
pub mod generate;
pub mod workload;

pub use config::{DemoConfig, DividendConfig, RoundtripConfig};
pub use workload::{run_dividends, run_roundtrip};
