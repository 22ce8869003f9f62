use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use freightline_common::Config;
use freightline_engine::{
    drain, output_channels, DistanceFreightCalculator, EventHub, IntervalPacer, JsonLineSink,
    MemoryRouteStore,
};

mod ingest;

use ingest::EventSource;

#[derive(Parser)]
#[command(name = "freightline", about = "Route freight and delivery simulator")]
struct Cli {
    /// Path to config TOML file
    #[arg(long, env = "FREIGHTLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Inbound events, one JSON object per line. `-` reads stdin.
    /// Without it the built-in demo route is simulated.
    #[arg(long)]
    events: Option<PathBuf>,

    /// Pause between driver positions, in milliseconds
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        // stdout carries the event stream
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    info!("Starting freightline simulator");

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(pacing_ms) = cli.pacing_ms {
        config.simulation.pacing_interval_ms = pacing_ms;
    }
    config.log_summary();

    let (senders, receivers) = output_channels();
    let hub = Arc::new(EventHub::new(
        Arc::new(MemoryRouteStore::new()),
        Arc::new(DistanceFreightCalculator::from(&config.freight)),
        Arc::new(IntervalPacer::new(config.pacing_interval())),
        senders,
    ));

    // The ingest task owns the only hub handle: once it and every dispatch
    // it started are done, the output channels close and `drain` returns.
    let ingest = tokio::spawn(ingest::run(hub, EventSource::from_arg(cli.events)));

    let mut sink = JsonLineSink::stdout();
    let drained = drain(receivers, &mut sink).await;

    let stats = ingest.await.context("Ingest task panicked")??;
    info!(
        dispatched = stats.dispatched,
        failed = stats.failed,
        skipped = stats.skipped,
        %drained,
        "Simulation finished"
    );
    Ok(())
}
