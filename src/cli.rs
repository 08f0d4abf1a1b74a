//! Command-line interface definitions.
//!
//! Every option is optional. Flags override the YAML config file, which
//! overrides the built-in defaults.

use crate::config::{Config, SourceMode};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fetch weather alerts, food recalls and air quality into JSON.
///
/// # Examples
///
/// ```sh
/// # Everything, live where possible
/// alerts_analytics
///
/// # Offline, reproducible
/// alerts_analytics --source simulated --seed 42
///
/// # Just air quality, live
/// AIRNOW_API_KEY=... alerts_analytics --source live air-quality
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the JSON data files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Where records come from
    #[arg(short, long, value_enum, env = "ALERTS_SOURCE_MODE")]
    pub source: Option<SourceMode>,

    /// Seed for simulated data
    #[arg(long)]
    pub seed: Option<u64>,

    /// AirNow API key
    #[arg(long, env = "AIRNOW_API_KEY", hide_env_values = true)]
    pub airnow_api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Every dataset, then the posts, sitemap and digest (default)
    All,
    /// Weather alerts into alerts.json
    Alerts,
    /// Food recalls into recalls.json and openfda_food.json
    Recalls,
    /// Air quality into air-quality.json
    AirQuality,
    /// Blog posts and the content-update summary from the written data
    Posts,
    /// sitemap.xml and robots.txt from the written data
    Sitemap,
    /// Weekly digest Markdown from the written data
    Digest,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::All)
    }

    /// Layer the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(mode) = self.source {
            config.source_mode = mode;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(key) = self.airnow_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            config.airnow.api_key = Some(key.trim().to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["alerts_analytics"]);
        assert_eq!(cli.command(), Command::All);
        assert!(cli.config.is_none());
        assert!(cli.output_dir.is_none());
    }

    #[test]
    fn test_cli_subcommand_and_flags() {
        let cli = Cli::parse_from([
            "alerts_analytics",
            "--source",
            "simulated",
            "--seed",
            "42",
            "-o",
            "/tmp/data",
            "air-quality",
        ]);
        assert_eq!(cli.command(), Command::AirQuality);
        assert_eq!(cli.source, Some(SourceMode::Simulated));
        assert_eq!(cli.seed, Some(42));
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/data")));
    }

    #[test]
    fn test_posts_subcommand() {
        let cli = Cli::parse_from(["alerts_analytics", "posts"]);
        assert_eq!(cli.command(), Command::Posts);
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::parse_from([
            "alerts_analytics",
            "-s",
            "live",
            "--airnow-api-key",
            " abc ",
            "-o",
            "out",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.source_mode, SourceMode::Live);
        assert_eq!(config.airnow.api_key.as_deref(), Some("abc"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_apply_keeps_config_values() {
        let cli = Cli::parse_from(["alerts_analytics", "-c", "config.yaml"]);
        let mut config = Config {
            seed: Some(7),
            source_mode: SourceMode::Simulated,
            ..Config::default()
        };
        cli.apply(&mut config);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.source_mode, SourceMode::Simulated);
        assert_eq!(cli.config, Some(PathBuf::from("config.yaml")));
    }
}
