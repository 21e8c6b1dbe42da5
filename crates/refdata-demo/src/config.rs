//! Configuration structs for the demo workload.

use refdata_core::TimestampMs;

/// Parameters shared by every subcommand.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Storage contact points
    pub contact_points: Vec<String>,

    /// Exchange to write under
    pub exchange: String,

    /// Symbol to write under
    pub symbol: String,

    /// Seed for the series generator
    pub seed: u64,
}

/// Configuration for the historic write/read roundtrip.
#[derive(Debug, Clone)]
pub struct RoundtripConfig {
    pub demo: DemoConfig,

    /// Number of daily bars to generate
    pub days: usize,

    /// First trading day, epoch milliseconds
    pub start_date: TimestampMs,
}

/// Configuration for the dividend fan-out.
#[derive(Debug, Clone)]
pub struct DividendConfig {
    pub demo: DemoConfig,

    /// Number of dividend events to write
    pub count: usize,

    /// Inject a failure on every Nth write (1-based spacing)
    pub fail_every: Option<usize>,

    /// Upper bound for the randomized per-write completion delay (ms)
    pub max_delay_ms: u64,
}
