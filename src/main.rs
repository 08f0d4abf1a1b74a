//! # Alerts Analytics
//!
//! A data pipeline that pulls public-safety data from free government APIs,
//! normalizes it into one record shape, and writes JSON documents for a
//! static site to render.
//!
//! ## Datasets
//!
//! - Weather alerts from api.weather.gov
//! - Food enforcement reports (recalls) from openFDA
//! - Per-city air quality from AirNow
//!
//! Each dataset can also come from a seeded simulated source, so the whole
//! pipeline runs offline.
//!
//! ## Usage
//!
//! ```sh
//! alerts_analytics --source simulated --seed 42
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: a [`sources::DataSource`] returns raw upstream JSON
//! 2. **Normalizing**: pure per-record mapping, bad records skipped
//! 3. **Aggregating**: counts by hazard, state and severity; AQI statistics
//! 4. **Output**: atomic JSON writes, then blog posts, the sitemap and weekly digest

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod api;
mod aqi;
mod cli;
mod config;
mod error;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod sources;
mod templates;
mod utils;

use cli::{Cli, Command};
use config::Config;
use error::{PipelineError, WriteError};
use pipeline::Pipeline;
use sources::{LiveSource, SimulatedSource};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "alerts_analytics starting up");

    let args = Cli::parse();
    let command = args.command();
    debug!(?args.config, ?command, "Parsed CLI arguments");

    if let Err(e) = run(&args, command).await {
        error!(error = %e, ?command, "Run failed");
        return Err(e.into());
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

async fn run(args: &Cli, command: Command) -> Result<(), PipelineError> {
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;
    info!(
        source_mode = ?config.source_mode,
        output_dir = %config.output_dir.display(),
        airnow_key = config.airnow.api_key.is_some(),
        "Configuration ready"
    );

    // Early check: fail before any network work if outputs can't be written
    for dir in [&config.output_dir, &config.site_dir, &config.content_dir] {
        ensure_writable_dir(dir).await.map_err(|source| {
            error!(path = %dir.display(), error = %source, "Output directory is not writable");
            WriteError::Io {
                path: dir.clone(),
                source,
            }
        })?;
    }

    let live = LiveSource::new(&config)?;
    let simulated = SimulatedSource::new(config.seed, Utc::now());
    let pipeline = Pipeline::new(&config, live, simulated);

    match command {
        Command::All => pipeline.run_all().await?,
        Command::Alerts => {
            pipeline.run_alerts().await?;
        }
        Command::Recalls => {
            pipeline.run_recalls().await?;
        }
        Command::AirQuality => {
            pipeline.run_air_quality().await?;
        }
        Command::Posts => {
            pipeline.run_posts().await?;
        }
        Command::Sitemap => {
            pipeline.run_sitemap().await?;
        }
        Command::Digest => pipeline.run_digest().await?,
    }
    Ok(())
}
