//! Runtime configuration.
//!
//! A [`Config`] is built once in `main` (defaults, then an optional YAML
//! file, then CLI/env overrides) and handed by reference to every component
//! at construction. Nothing reads ambient module state.
//!
//! ```yaml
//! output_dir: data
//! source_mode: simulated
//! seed: 42
//! openfda:
//!   start_date: "20230101"
//!   max_records: 500
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// Where raw records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Live APIs where possible, simulated data where a key is missing or an
    /// optional source is down.
    #[default]
    Auto,
    /// Live APIs only; any fetch failure aborts the run.
    Live,
    /// Simulated data only; no network access.
    Simulated,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: PathBuf,
    pub site_dir: PathBuf,
    pub content_dir: PathBuf,
    pub site_url: String,
    pub source_mode: SourceMode,
    /// Seed for the simulated source; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub user_agent: String,
    pub nws: NwsConfig,
    pub openfda: OpenFdaConfig,
    pub airnow: AirNowConfig,
    pub cities: Vec<City>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NwsConfig {
    pub alerts_url: String,
    pub status: String,
    pub message_type: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenFdaConfig {
    pub endpoint: String,
    pub limit: usize,
    pub max_records: usize,
    pub fallback_max_records: usize,
    /// `YYYYMMDD` lower bound for `report_date`.
    pub start_date: String,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AirNowConfig {
    pub base_url: String,
    pub distance_miles: u32,
    pub delay_ms: u64,
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct City {
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    fn new(city: &str, state: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            city: city.to_string(),
            state: state.to_string(),
            latitude,
            longitude,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
            site_dir: PathBuf::from("public"),
            content_dir: PathBuf::from("content"),
            site_url: "https://alertsanalytics.com".to_string(),
            source_mode: SourceMode::Auto,
            seed: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            nws: NwsConfig::default(),
            openfda: OpenFdaConfig::default(),
            airnow: AirNowConfig::default(),
            cities: default_cities(),
        }
    }
}

impl Default for NwsConfig {
    fn default() -> Self {
        Self {
            alerts_url: "https://api.weather.gov/alerts/active".to_string(),
            status: "actual".to_string(),
            message_type: "alert".to_string(),
        }
    }
}

impl Default for OpenFdaConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.fda.gov/food/enforcement.json".to_string(),
            limit: 100,
            max_records: 2000,
            fallback_max_records: 500,
            start_date: "20220101".to_string(),
            delay_ms: 200,
        }
    }
}

impl OpenFdaConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// openFDA range filter on `report_date`.
    pub fn search_filter(&self) -> String {
        format!("report_date:[{} TO 99999999]", self.start_date)
    }
}

impl Default for AirNowConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.airnowapi.org/aq".to_string(),
            distance_miles: 50,
            delay_ms: 100,
            api_key: None,
        }
    }
}

impl AirNowConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Config {
    /// Load defaults, overlaid with the YAML file at `path` when given.
    ///
    /// The result is not validated; CLI overrides may still change it, so
    /// callers run [`Config::validate`] once the final values are in place.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                let config = Self::from_yaml(&raw)?;
                info!(path = %path.display(), "Loaded configuration file");
                config
            }
            None => Self::default(),
        };
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openfda.limit == 0 {
            return Err(ConfigError::Invalid("openfda.limit must be positive".into()));
        }
        if self.openfda.start_date.len() != 8
            || !self.openfda.start_date.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ConfigError::Invalid(format!(
                "openfda.start_date must be YYYYMMDD, got {:?}",
                self.openfda.start_date
            )));
        }
        url::Url::parse(&self.site_url)
            .map_err(|e| ConfigError::Invalid(format!("site_url {:?}: {e}", self.site_url)))?;
        Ok(())
    }

    pub fn alerts_path(&self) -> PathBuf {
        self.output_dir.join("alerts.json")
    }

    pub fn recalls_path(&self) -> PathBuf {
        self.output_dir.join("recalls.json")
    }

    pub fn raw_recalls_path(&self) -> PathBuf {
        self.output_dir.join("openfda_food.json")
    }

    pub fn air_quality_path(&self) -> PathBuf {
        self.output_dir.join("air-quality.json")
    }

    pub fn sitemap_path(&self) -> PathBuf {
        self.site_dir.join("sitemap.xml")
    }

    pub fn robots_path(&self) -> PathBuf {
        self.site_dir.join("robots.txt")
    }

    pub fn digest_path(&self) -> PathBuf {
        self.content_dir.join("weekly-digest.md")
    }

    /// Directory of generated Markdown posts, one `{slug}.md` each.
    pub fn blog_dir(&self) -> PathBuf {
        self.content_dir.join("blog")
    }

    pub fn content_summary_path(&self) -> PathBuf {
        self.content_dir.join("content-update-summary.json")
    }
}

/// The 30 most populous US cities.
fn default_cities() -> Vec<City> {
    vec![
        City::new("Los Angeles", "CA", 34.0522, -118.2437),
        City::new("New York", "NY", 40.7128, -74.0060),
        City::new("Chicago", "IL", 41.8781, -87.6298),
        City::new("Houston", "TX", 29.7604, -95.3698),
        City::new("Phoenix", "AZ", 33.4484, -112.0740),
        City::new("Philadelphia", "PA", 39.9526, -75.1652),
        City::new("San Antonio", "TX", 29.4241, -98.4936),
        City::new("San Diego", "CA", 32.7157, -117.1611),
        City::new("Dallas", "TX", 32.7767, -96.7970),
        City::new("San Jose", "CA", 37.3382, -121.8863),
        City::new("Austin", "TX", 30.2672, -97.7431),
        City::new("Jacksonville", "FL", 30.3322, -81.6557),
        City::new("Fort Worth", "TX", 32.7555, -97.3308),
        City::new("Columbus", "OH", 39.9612, -82.9988),
        City::new("Indianapolis", "IN", 39.7684, -86.1581),
        City::new("Charlotte", "NC", 35.2271, -80.8431),
        City::new("San Francisco", "CA", 37.7749, -122.4194),
        City::new("Seattle", "WA", 47.6062, -122.3321),
        City::new("Denver", "CO", 39.7392, -104.9903),
        City::new("Boston", "MA", 42.3601, -71.0589),
        City::new("Washington", "DC", 38.9072, -77.0369),
        City::new("Nashville", "TN", 36.1627, -86.7816),
        City::new("El Paso", "TX", 31.7619, -106.4850),
        City::new("Detroit", "MI", 42.3314, -83.0458),
        City::new("Portland", "OR", 45.5152, -122.6784),
        City::new("Memphis", "TN", 35.1495, -90.0490),
        City::new("Louisville", "KY", 38.2527, -85.7585),
        City::new("Baltimore", "MD", 39.2904, -76.6122),
        City::new("Milwaukee", "WI", 43.0389, -87.9065),
        City::new("Albuquerque", "NM", 35.0844, -106.6504),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.source_mode, SourceMode::Auto);
        assert_eq!(config.openfda.limit, 100);
        assert_eq!(config.openfda.max_records, 2000);
        assert_eq!(config.cities.len(), 30);
        assert_eq!(config.alerts_path(), PathBuf::from("data/alerts.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "output_dir: out\nsource_mode: simulated\nseed: 7\nopenfda:\n  max_records: 300\n",
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.source_mode, SourceMode::Simulated);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.openfda.max_records, 300);
        assert_eq!(config.openfda.limit, 100);
        assert_eq!(config.nws.status, "actual");
        assert_eq!(config.cities.len(), 30);
    }

    #[test]
    fn test_yaml_cities_replace_defaults() {
        let config = Config::from_yaml(
            "cities:\n  - { city: Boise, state: ID, latitude: 43.615, longitude: -116.2023 }\n",
        )
        .unwrap();
        assert_eq!(config.cities, vec![City::new("Boise", "ID", 43.615, -116.2023)]);
    }

    #[test]
    fn test_validate_rejects_bad_start_date() {
        let mut config = Config::default();
        config.openfda.start_date = "2022-01-01".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_search_filter() {
        let config = OpenFdaConfig::default();
        assert_eq!(config.search_filter(), "report_date:[20220101 TO 99999999]");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "site_url: https://example.org\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.site_url, "https://example.org");
    }

    #[test]
    fn test_load_leaves_validation_to_caller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "openfda:\n  start_date: yesterday\n").unwrap();

        let mut config = Config::load(Some(&path)).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.openfda.start_date = "20240101".to_string();
        assert!(config.validate().is_ok());
    }
}
