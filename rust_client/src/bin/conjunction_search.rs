//! Conjunction search command line client
//!
//! Submits one conjunction search, waits for it and prints the normalized
//! result as JSON.
//!
//! # Usage
//!
//! ```bash
//! conjunction-search \
//!   --start 2020-01-01T00:00:00 --end 2020-01-01T06:59:59 \
//!   --distance 500 \
//!   --ground '[{"programs": ["themis-asi"]}]' \
//!   --space '[{"programs": ["swarm"], "hemisphere": ["northern"]}]' \
//!   --conjunction-type nbtrace
//! ```
//!
//! # Environment Variables
//!
//! - `AURORAX_*`: client configuration when `--config` is not given
//! - `RUST_LOG`: Log level (default: warn, info with `--verbose`)

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use aurorax_rust::services::SearchRequestBuilder;
use aurorax_rust::transport::HttpTransport;
use aurorax_rust::{
    ClientConfig, ConjunctionResult, ConjunctionSearch, ConjunctionType, CriteriaBlock, Distance,
    SearchOptions, SearchOutcome,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Search AuroraX for conjunctions between instruments")]
struct Args {
    /// Start of the search window, e.g. 2020-01-01T00:00:00
    #[arg(long)]
    start: String,

    /// End of the search window
    #[arg(long)]
    end: String,

    /// Maximum distance in km, or a JSON object of per-pair distances
    #[arg(long)]
    distance: Distance,

    /// Ground criteria blocks as a JSON array
    #[arg(long)]
    ground: Option<String>,

    /// Space criteria blocks as a JSON array
    #[arg(long)]
    space: Option<String>,

    /// Event criteria blocks as a JSON array
    #[arg(long)]
    events: Option<String>,

    /// Conjunction type to search for (repeatable)
    #[arg(long = "conjunction-type")]
    conjunction_types: Vec<ConjunctionType>,

    /// Seconds between job status queries (defaults to the configured interval)
    #[arg(long)]
    poll_interval: Option<f64>,

    /// Give up waiting after this many seconds and cancel the job
    #[arg(long)]
    timeout: Option<f64>,

    /// Print the request that would be submitted and exit
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Report search progress
    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    /// TOML configuration file (defaults to AURORAX_* environment variables)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_blocks(flag: &str, value: Option<&str>) -> anyhow::Result<Vec<CriteriaBlock>> {
    match value {
        Some(json) => serde_json::from_str(json)
            .with_context(|| format!("--{} must be a JSON array of criteria blocks", flag)),
        None => Ok(Vec::new()),
    }
}

fn seconds(flag: &str, value: f64) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("--{} must be a non-negative number of seconds", flag))
}

fn print_json(result: &ConjunctionResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { Level::INFO } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default_level),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::from_env()?,
    };
    info!("Using AuroraX API at {}", config.base_url);

    let builder = SearchRequestBuilder::new(&args.start, &args.end, args.distance.clone())
        .ground(parse_blocks("ground", args.ground.as_deref())?)
        .space(parse_blocks("space", args.space.as_deref())?)
        .events(parse_blocks("events", args.events.as_deref())?)
        .conjunction_types(args.conjunction_types.iter().copied());

    let mut options = SearchOptions::from_config(&config);
    options.dry_run = args.dry_run;
    options.verbose = args.verbose;
    if let Some(interval) = args.poll_interval {
        options.poll = options.poll.with_interval(seconds("poll-interval", interval)?);
    }
    if let Some(timeout) = args.timeout {
        options.poll = options.poll.with_deadline(seconds("timeout", timeout)?);
    }

    let token = CancellationToken::new();
    options.poll = options.poll.with_cancellation(token.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling search");
            token.cancel();
        }
    });

    let transport = Arc::new(HttpTransport::new(&config)?);
    let search = ConjunctionSearch::new(transport, &config);

    if args.dry_run {
        match search.execute(&builder, &options).await {
            Ok(SearchOutcome::DryRun { payload }) => println!("{}", payload),
            Ok(SearchOutcome::Completed(result)) => print_json(&result)?,
            Err(e) if e.is_transport() => return Err(e.into()),
            Err(e) => {
                error!("Invalid search request: {}", e);
                print_json(&ConjunctionResult::empty())?;
            }
        }
        return Ok(());
    }

    let result = search.run(&builder, &options).await?;
    info!("Found {} conjunctions", result.len());
    print_json(&result)
}
