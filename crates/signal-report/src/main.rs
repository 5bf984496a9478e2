//! signal-report: run the signal engine over JSON dumps and print the report.
//!
//! Usage:
//!   cargo run -p signal-report -- --symbol AAPL --prices daily.json
//!   cargo run -p signal-report -- --symbol AAPL --prices daily.json --monthly monthly.json \
//!       --income income.json --balance balance.json --overview overview.json --range 1y

use std::path::PathBuf;
use std::sync::Arc;

use analysis_core::ChartRange;
use analysis_orchestrator::{EngineConfig, SignalOrchestrator};
use anyhow::{Context, Result};

mod snapshot;

use snapshot::{SnapshotPaths, SnapshotProvider};

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .filter(|v| !v.starts_with("--"))
}

fn usage() -> ! {
    eprintln!("Usage:");
    eprintln!("  signal-report --symbol SYM --prices FILE [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --monthly FILE     Monthly adjusted bars (price CAGR)");
    eprintln!("  --income FILE      Annual income statements");
    eprintln!("  --balance FILE     Annual balance sheets");
    eprintln!("  --overview FILE    Company overview");
    eprintln!("  --range R          Chart range: 3m, 6m, 1y (default: SIGNAL_CHART_RANGE or 6m)");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let args: Vec<String> = std::env::args().collect();
    let (Some(symbol), Some(prices)) = (arg_value(&args, "--symbol"), arg_value(&args, "--prices")) else {
        usage();
    };

    let mut config = EngineConfig::from_env().context("invalid engine configuration")?;
    if let Some(range) = arg_value(&args, "--range") {
        config.chart_range = range
            .parse::<ChartRange>()
            .with_context(|| format!("--range {}", range))?;
    }
    tracing::info!(
        cache_ttl_secs = config.cache_ttl_secs,
        min_price_points = config.min_price_points,
        chart_range = %config.chart_range,
        earnings_lookback = config.earnings_lookback,
        "Configuration loaded"
    );

    let paths = SnapshotPaths {
        prices: PathBuf::from(prices),
        monthly: arg_value(&args, "--monthly").map(PathBuf::from),
        income: arg_value(&args, "--income").map(PathBuf::from),
        balance: arg_value(&args, "--balance").map(PathBuf::from),
        overview: arg_value(&args, "--overview").map(PathBuf::from),
    };
    let provider = Arc::new(SnapshotProvider::load(symbol, &paths)?);

    let orchestrator = SignalOrchestrator::new(provider.clone(), provider, config)?;
    let report = orchestrator
        .analyze(symbol)
        .await
        .with_context(|| format!("analyzing {}", symbol))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
