//! marathon-stats CLI entry point

use anyhow::{Context, Result};
use marathon_stats::config::cli::{Cli, Command, GenerateArgs, ImportArgs};
use marathon_stats::config::{toml as config_file, validator, Config};
use marathon_stats::import;
use marathon_stats::output::text;
use marathon_stats::pipeline;
use marathon_stats::store::SqliteStore;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let main_start = Instant::now();

    // Parse CLI arguments
    let cli = Cli::parse_args();
    cli.validate()?;
    init_logging(cli.debug);

    let config = config_file::load_config(&cli)?;
    validator::validate_config(&config).context("Configuration validation failed")?;
    debug!(?config, "configuration loaded");

    let result = match &cli.command {
        Command::Generate(args) => run_generate(&config, args),
        Command::Import(args) => run_import(&config, args),
    };

    debug!(elapsed_ms = main_start.elapsed().as_millis() as u64, "finished");
    result
}

/// Logs go to stderr so stdout only carries the summary
fn init_logging(debug: bool) {
    let default_level = if debug { "marathon_stats=debug" } else { "marathon_stats=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the combined dataset and write the output document
fn run_generate(config: &Config, args: &GenerateArgs) -> Result<()> {
    info!(database = %config.database.display(), alignment = %config.alignment, "generating");

    let pipeline_start = Instant::now();
    let report = pipeline::generate(config)?;
    debug!(
        elapsed_ms = pipeline_start.elapsed().as_millis() as u64,
        "generate complete"
    );

    if !args.quiet {
        text::print_report(&report);
    }

    Ok(())
}

/// Load one marathon's stats file into the database
fn run_import(config: &Config, args: &ImportArgs) -> Result<()> {
    let path = args
        .file
        .clone()
        .unwrap_or_else(|| import::stats_path(&config.import.stats_dir, &args.name));
    info!(marathon = %args.name, file = %path.display(), "importing");

    let mut store = SqliteStore::open(&config.database)?;
    let summary = import::import_marathon(&mut store, &args.name, &path, args.create)?;

    println!(
        "Imported '{}' (id {}{}): {} samples, {} games, {} rows skipped",
        args.name,
        summary.marathon,
        if summary.created { ", created" } else { "" },
        summary.samples,
        summary.games,
        summary.skipped
    );

    Ok(())
}
