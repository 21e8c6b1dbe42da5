//! CLI entry point for the refdata demo workload.

use anyhow::Result;
use clap::{Parser, Subcommand};
use refdata_demo::config::{DemoConfig, DividendConfig, RoundtripConfig};
use refdata_demo::workload::{run_dividends, run_roundtrip};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "refdata-demo")]
#[command(about = "Write/read workload demo for the refdata store")]
#[command(version)]
struct Cli {
    /// Storage contact points (comma-separated)
    #[arg(short, long, default_value = "localhost")]
    contact_points: String,

    /// Exchange to write under
    #[arg(short, long, default_value = "AMEX")]
    exchange: String,

    /// Symbol to write under
    #[arg(short, long, default_value = "IF")]
    symbol: String,

    /// Seed for the series generator
    #[arg(long, default_value = "42")]
    seed: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a generated daily series and read it back
    Roundtrip {
        /// Number of daily bars to generate
        #[arg(short, long, default_value = "365")]
        days: usize,

        /// First trading day, epoch milliseconds (default 2010-01-01)
        #[arg(long, default_value = "1262304000000")]
        start_date: i64,
    },

    /// Fan out concurrent dividend writes and report the receipt
    Dividends {
        /// Number of dividend events to write
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,

        /// Inject a failure on every Nth write
        #[arg(long)]
        fail_every: Option<usize>,

        /// Upper bound for the randomized per-write delay (ms)
        #[arg(long, default_value = "25")]
        max_delay_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let demo = DemoConfig {
        contact_points: cli
            .contact_points
            .split(',')
            .map(|point| point.trim().to_string())
            .filter(|point| !point.is_empty())
            .collect(),
        exchange: cli.exchange,
        symbol: cli.symbol,
        seed: cli.seed,
    };

    match cli.command {
        Commands::Roundtrip { days, start_date } => {
            run_roundtrip(RoundtripConfig {
                demo,
                days,
                start_date,
            })
            .await
        }
        Commands::Dividends {
            count,
            fail_every,
            max_delay_ms,
        } => {
            run_dividends(DividendConfig {
                demo,
                count,
                fail_every,
                max_delay_ms,
            })
            .await
        }
    }
}
