//! hrmatchups - daily batter vs. probable starter home run matchups
//!
//! Pulls the day's schedule from the MLB Stats API, checks every batter
//! against the opposing probable starter, and serves the batters with at
//! least one career home run in that matchup as JSON over HTTP (or prints
//! them once with --once).
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime or configuration error

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod server;
mod statsapi;

use analysis::{today, MatchupAggregator};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use models::{MatchupReport, ReportMetadata};
use server::ApiServer;
use statsapi::StatsApiClient;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Configuration decides the default verbosity, so load it first
    let (config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(log_level(&args, &config));

    info!("hrmatchups v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    info!("Configuration: {}", source);

    let result = if args.once {
        run_once(&args, &config).await
    } else {
        run_server(&config).await
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .hrmatchups.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

fn log_level(args: &Args, config: &Config) -> tracing::Level {
    if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration from file or use defaults, then apply CLI overrides.
///
/// Returns the configuration and a description of where it came from.
fn load_config(args: &Args) -> Result<(Config, String)> {
    let (mut config, source) = if let Some(ref config_path) = args.config {
        (
            Config::load(config_path)?,
            format!("loaded from {}", config_path.display()),
        )
    } else {
        match Config::load_default()? {
            Some(config) => (config, format!("loaded from {}", DEFAULT_CONFIG_FILE)),
            None => (Config::default(), "defaults".to_string()),
        }
    };

    config.merge_with_args(args);
    config.validate()?;

    Ok((config, source))
}

fn build_aggregator(config: &Config) -> Result<MatchupAggregator> {
    let client = StatsApiClient::new(config.statsapi_config())
        .context("Failed to create Stats API client")?;
    Ok(MatchupAggregator::new(client, config.aggregator.deadline()))
}

/// Serve the matchup endpoint until the process is stopped.
async fn run_server(config: &Config) -> Result<()> {
    let aggregator = build_aggregator(config)?;
    let server = ApiServer::new(
        aggregator,
        config.aggregator.tz()?,
        config.server.cache_max_age_seconds,
    );

    info!(
        "Stats API: {} (max {} in flight, {}s deadline)",
        config.statsapi.base_url,
        config.aggregator.max_in_flight,
        config.aggregator.deadline_seconds
    );

    server.serve(&config.server.bind).await
}

/// Compute matchups once and write them out.
async fn run_once(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();
    let aggregator = build_aggregator(config)?;
    let date = match args.target_date() {
        Some(date) => date,
        None => today(config.aggregator.tz()?),
    };

    let spinner = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .context("Invalid progress template")?,
        );
        pb.set_message(format!("Computing matchups for {}", date));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    };

    let result = aggregator.run(date).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let aggregation = result.with_context(|| format!("Failed to fetch MLB data for {}", date))?;

    let report = MatchupReport {
        metadata: ReportMetadata {
            date: aggregation.date,
            generated_at: Utc::now(),
            api_url: aggregator.client().base_url().to_string(),
            stats: aggregation.stats,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        matchups: aggregation.matchups,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    match args.output {
        Some(ref path) => {
            report::write_report(&output, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!(
                "Wrote {} matchups to {}",
                report.matchups.len(),
                path.display()
            );
        }
        None => println!("{}", output),
    }

    Ok(())
}
