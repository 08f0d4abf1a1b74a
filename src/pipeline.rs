//! Fetch → normalize → aggregate → write, once per dataset.
//!
//! [`Pipeline`] owns the source-selection policy. Which [`DataSource`]
//! answers a given dataset depends on [`SourceMode`]:
//!
//! | Dataset | `live` | `auto` | `simulated` |
//! |---------|--------|--------|-------------|
//! | Weather alerts | live, errors fatal | live, simulated on error | simulated |
//! | Food recalls | live, errors fatal | live, errors fatal | simulated |
//! | Air quality | live, key required | live if a key is set (simulated on error), else simulated | simulated |
//!
//! Every `run_*` builds its whole document in memory and writes it once.

use crate::aggregate::{summarize, summarize_air_quality};
use crate::config::{Config, SourceMode};
use crate::error::{ConfigError, FetchError, PipelineError};
use crate::models::{AirQualityReport, RecordBatch};
use crate::normalize::{air_quality, alerts, normalize_batch, recalls};
use crate::outputs::json::{read_json, write_atomic, write_json};
use crate::outputs::{digest, posts, sitemap};
use crate::sources::{DataSource, RawBatch};
use crate::utils::now_rfc3339;
use chrono::{Local, Utc};
use tracing::{info, instrument, warn};

/// Runs the pipeline commands against one configuration.
///
/// `live` and `simulated` are both consulted; which one answers is decided
/// per dataset from [`Config::source_mode`]. Tests substitute either side
/// with any other [`DataSource`].
pub struct Pipeline<'a, L, S> {
    config: &'a Config,
    live: L,
    simulated: S,
}

impl<'a, L: DataSource, S: DataSource> Pipeline<'a, L, S> {
    /// # Arguments
    ///
    /// * `config` - Final configuration, overrides already applied
    /// * `live` - Source for the upstream APIs
    /// * `simulated` - Source used in simulated mode and as the fallback
    pub fn new(config: &'a Config, live: L, simulated: S) -> Self {
        Self {
            config,
            live,
            simulated,
        }
    }

    async fn alerts_batch(&self) -> Result<RawBatch, FetchError> {
        match self.config.source_mode {
            SourceMode::Live => self.live.weather_alerts().await,
            SourceMode::Simulated => self.simulated.weather_alerts().await,
            SourceMode::Auto => match self.live.weather_alerts().await {
                Ok(batch) => Ok(batch),
                Err(e) => {
                    warn!(error = %e, "Live weather alerts unavailable; falling back to simulated data");
                    self.simulated.weather_alerts().await
                }
            },
        }
    }

    async fn air_quality_batch(&self) -> Result<RawBatch, PipelineError> {
        let cities = &self.config.cities;
        let has_key = self.config.airnow.api_key.is_some();
        let batch = match self.config.source_mode {
            SourceMode::Simulated => self.simulated.air_quality(cities).await?,
            SourceMode::Live if !has_key => {
                return Err(ConfigError::Invalid(
                    "live air quality needs an AirNow API key (--airnow-api-key or AIRNOW_API_KEY)"
                        .to_string(),
                )
                .into());
            }
            SourceMode::Live => self.live.air_quality(cities).await?,
            SourceMode::Auto if !has_key => {
                info!("No AirNow API key configured; using simulated air quality");
                self.simulated.air_quality(cities).await?
            }
            SourceMode::Auto => match self.live.air_quality(cities).await {
                Ok(batch) => batch,
                Err(e) => {
                    warn!(error = %e, "Live air quality unavailable; falling back to simulated data");
                    self.simulated.air_quality(cities).await?
                }
            },
        };
        Ok(batch)
    }

    /// Weather alerts into `alerts.json`.
    #[instrument(level = "info", skip_all)]
    pub async fn run_alerts(&self) -> Result<RecordBatch, PipelineError> {
        let RawBatch { source, records } = self.alerts_batch().await?;
        let items = normalize_batch(records, |v| alerts::normalize_alert(v, source));
        let document = RecordBatch {
            summary: summarize(&items, now_rfc3339()),
            items,
        };
        write_json(&self.config.alerts_path(), &document).await?;
        info!(total = document.summary.total, source, "Weather alerts updated");
        Ok(document)
    }

    /// Food recalls into `recalls.json`, with the raw upstream records kept
    /// alongside in `openfda_food.json`.
    #[instrument(level = "info", skip_all)]
    pub async fn run_recalls(&self) -> Result<RecordBatch, PipelineError> {
        let RawBatch { source, records } = match self.config.source_mode {
            SourceMode::Simulated => self.simulated.food_recalls().await?,
            SourceMode::Live | SourceMode::Auto => self.live.food_recalls().await?,
        };
        write_json(&self.config.raw_recalls_path(), &records).await?;

        let items = normalize_batch(records, |v| recalls::normalize_recall(v, source));
        let document = RecordBatch {
            summary: summarize(&items, now_rfc3339()),
            items,
        };
        write_json(&self.config.recalls_path(), &document).await?;
        info!(total = document.summary.total, source, "Food recalls updated");
        Ok(document)
    }

    /// Per-city air quality into `air-quality.json`.
    #[instrument(level = "info", skip_all)]
    pub async fn run_air_quality(&self) -> Result<AirQualityReport, PipelineError> {
        let RawBatch { source, records } = self.air_quality_batch().await?;
        let cities = normalize_batch(records, |v| air_quality::normalize_reading(v, source));
        let document = AirQualityReport {
            summary: summarize_air_quality(&cities, now_rfc3339()),
            cities,
        };
        write_json(&self.config.air_quality_path(), &document).await?;
        info!(
            cities = document.summary.total_cities,
            average_aqi = ?document.summary.average_aqi,
            source,
            "Air quality updated"
        );
        Ok(document)
    }

    /// Blog posts from the written documents into the blog directory, plus
    /// the content-update summary. Returns the number of posts written.
    #[instrument(level = "info", skip_all)]
    pub async fn run_posts(&self) -> Result<usize, PipelineError> {
        let alerts: Option<RecordBatch> = read_json(&self.config.alerts_path()).await?;
        let recalls: Option<RecordBatch> = read_json(&self.config.recalls_path()).await?;
        let air: Option<AirQualityReport> = read_json(&self.config.air_quality_path()).await?;
        let now = Utc::now();

        let built = posts::build_posts(
            alerts.as_ref(),
            recalls.as_ref(),
            air.as_ref(),
            &self.config.site_url,
            now,
        )?;
        let blog_dir = self.config.blog_dir();
        for post in &built {
            let path = blog_dir.join(post.file_name());
            write_atomic(&path, post.to_markdown()?.as_bytes()).await?;
            info!(path = %path.display(), "Blog post written");
        }

        let summary = posts::content_summary(
            alerts.as_ref(),
            recalls.as_ref(),
            air.as_ref(),
            built.len(),
            now,
        );
        write_json(&self.config.content_summary_path(), &summary).await?;
        info!(posts = built.len(), "Blog content updated");
        Ok(built.len())
    }

    /// Sitemap and robots.txt from the written alert and recall documents
    /// and the posts in the blog directory. Returns the number of pages listed.
    #[instrument(level = "info", skip_all)]
    pub async fn run_sitemap(&self) -> Result<usize, PipelineError> {
        let alerts: Option<RecordBatch> = read_json(&self.config.alerts_path()).await?;
        let recalls: Option<RecordBatch> = read_json(&self.config.recalls_path()).await?;
        let alert_items = alerts.map(|b| b.items).unwrap_or_default();
        let recall_items = recalls.map(|b| b.items).unwrap_or_default();
        let post_slugs = posts::list_post_slugs(&self.config.blog_dir()).await?;

        let pages = sitemap::site_pages(&alert_items, &recall_items, &post_slugs);
        let lastmod = Utc::now().format("%Y-%m-%d").to_string();
        let xml = sitemap::render_sitemap(&self.config.site_url, &pages, &lastmod)?;
        write_atomic(&self.config.sitemap_path(), xml.as_bytes()).await?;

        let robots = sitemap::robots_txt(&self.config.site_url, &now_rfc3339());
        write_atomic(&self.config.robots_path(), robots.as_bytes()).await?;

        info!(pages = pages.len(), "Sitemap updated");
        Ok(pages.len())
    }

    /// Weekly digest Markdown from the written documents.
    #[instrument(level = "info", skip_all)]
    pub async fn run_digest(&self) -> Result<(), PipelineError> {
        let alerts: Option<RecordBatch> = read_json(&self.config.alerts_path()).await?;
        let recalls: Option<RecordBatch> = read_json(&self.config.recalls_path()).await?;
        let air: Option<AirQualityReport> = read_json(&self.config.air_quality_path()).await?;

        let markdown = digest::render_weekly(
            alerts.as_ref(),
            recalls.as_ref(),
            air.as_ref(),
            Local::now().date_naive(),
        )?;
        write_atomic(&self.config.digest_path(), markdown.as_bytes()).await?;
        info!(path = %self.config.digest_path().display(), "Weekly digest updated");
        Ok(())
    }

    /// Every dataset, then the site outputs derived from them. Posts go
    /// before the sitemap so it lists them.
    pub async fn run_all(&self) -> Result<(), PipelineError> {
        self.run_alerts().await?;
        self.run_recalls().await?;
        self.run_air_quality().await?;
        self.run_posts().await?;
        self.run_sitemap().await?;
        self.run_digest().await?;
        Ok(())
    }
}
