//! Data-driven blog posts.
//!
//! Up to three Markdown posts per run, built from the written documents:
//!
//! - a weather alerts roundup, only when alerts are active
//! - an air quality report with per-city health recommendations
//! - a recall roundup of the ten most recent recalls, only when there are any
//!
//! Slugs carry the run date (`weather-alerts-2025-01-10`), so a rerun on the
//! same day replaces that day's posts instead of adding new ones. Each post
//! starts with YAML front matter for the static site generator.

use crate::error::{PipelineError, TemplateError, WriteError};
use crate::models::{AirQualityReport, CityAirQuality, NormalizedRecord, RecordBatch};
use crate::templates::{Bindings, render};
use crate::utils::format_rfc3339;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::warn;

/// Recalls listed in the roundup.
pub const RECALL_ROUNDUP_SIZE: usize = 10;

/// Interval the site expects between content updates.
const UPDATE_INTERVAL_HOURS: i64 = 4;

const DESCRIPTION: &str = "Auto-generated content with latest safety information";

const WEATHER_POST: &str = "\
# Current Severe Weather Alerts: Stay Safe and Informed

*Last updated: {{updated}}*

## Active Severe Weather Alerts
{{alerts}}
## Safety Recommendations

1. **Stay Informed**: Monitor local weather services and emergency alerts
2. **Have a Plan**: Know your evacuation routes and emergency contacts
3. **Emergency Kit**: Keep supplies ready including water, flashlights, and batteries
4. **Stay Connected**: Ensure your phone is charged and you have backup power

*For the latest updates, visit [AlertsAnalytics]({{site_url}})*
";

const ALERT_ITEM: &str = "
### {{title}}
- **Severity:** {{severity}}
- **Areas affected:** {{areas}}
- **Effective:** {{effective}}
- **Expires:** {{expires}}

{{description}}
{{instruction}}
---
";

const AIR_QUALITY_POST: &str = "\
# Air Quality Report: Major US Cities

*Report generated: {{updated}}*

{{overview}}

## Current Air Quality Index (AQI) Readings
{{cities}}
## Understanding Air Quality Index

- **0-50 (Green):** Good - Air quality is satisfactory
- **51-100 (Yellow):** Moderate - Acceptable for most people
- **101-150 (Orange):** Unhealthy for sensitive groups
- **151-200 (Red):** Unhealthy for everyone
- **201-300 (Purple):** Very unhealthy - health alert
- **301+ (Maroon):** Hazardous - emergency conditions

## Protect Yourself

1. **Check Daily AQI**: Monitor air quality before outdoor activities
2. **Limit Exposure**: Reduce outdoor exercise on high AQI days
3. **Use Air Purifiers**: Indoor air filtration can help
4. **Wear Masks**: N95 masks can filter particulate matter
";

const CITY_ITEM: &str = "
### {{city}}, {{state}}
- **AQI:** {{aqi}} - {{level}}
- **Status:** <span style=\"color: {{color}}\">●</span> {{level}}

**Health Recommendations:**
{{recommendations}}

---
";

const RECALLS_POST: &str = "\
# Weekly Product Recall Roundup

*Updated: {{updated}}*

Stay informed about the latest product recalls that could affect your safety.

## Recent Recalls
{{recalls}}
## What to Do If You Have a Recalled Product

1. **Stop Using Immediately**: Don't use the product if it's been recalled
2. **Check Lot Numbers**: Verify if your specific product is affected
3. **Follow Instructions**: Contact the manufacturer for refunds or exchanges
4. **Report Issues**: Contact the FDA if you experienced problems

*Source: FDA Food Enforcement Reports*
";

const RECALL_ITEM: &str = "
### {{rank}}. {{brand}}
- **Product:** {{product}}
- **Reason:** {{reason}}
- **Classification:** {{classification}}
- **Status:** {{status}}
- **Date:** {{date}}

---
";

/// YAML header of a post.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontMatter {
    pub title: String,
    pub slug: String,
    pub publish_date: String,
    pub tags: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub front: FrontMatter,
    pub body: String,
}

impl Post {
    fn new(title: String, slug: String, tags: &[&str], now: DateTime<Utc>, body: String) -> Self {
        Self {
            front: FrontMatter {
                title,
                slug,
                publish_date: format_rfc3339(now),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                description: DESCRIPTION.to_string(),
            },
            body,
        }
    }

    /// The full file: front matter between `---` fences, then the body.
    pub fn to_markdown(&self) -> Result<String, WriteError> {
        let yaml = serde_yaml::to_string(&self.front)?;
        Ok(format!("---\n{yaml}---\n\n{}", self.body))
    }

    pub fn file_name(&self) -> String {
        format!("{}.md", self.front.slug)
    }
}

/// What a content run produced, written next to the posts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub last_updated: String,
    pub weather_alerts: usize,
    pub air_quality_reports: usize,
    pub product_recalls: usize,
    pub blog_posts_generated: usize,
    pub next_update: String,
}

fn bindings<const N: usize>(pairs: [(&str, String); N]) -> Bindings {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn or_unspecified(value: Option<&str>) -> String {
    value.unwrap_or("Not specified").to_string()
}

fn date_label(now: DateTime<Utc>) -> String {
    now.format("%-m/%-d/%Y").to_string()
}

fn updated_label(now: DateTime<Utc>) -> String {
    now.format("%B %-d, %Y %H:%M UTC").to_string()
}

fn slug(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}-{}", now.format("%Y-%m-%d"))
}

fn render_alert(alert: &NormalizedRecord) -> Result<String, TemplateError> {
    let instruction = alert
        .instruction
        .as_deref()
        .map(|i| format!("\n**Instructions:** {i}\n"))
        .unwrap_or_default();
    render(
        ALERT_ITEM,
        &bindings([
            ("title", alert.title.clone()),
            ("severity", alert.severity.clone()),
            ("areas", alert.areas.join("; ")),
            ("effective", or_unspecified(alert.effective.as_deref())),
            ("expires", or_unspecified(alert.expires.as_deref())),
            ("description", alert.description.clone()),
            ("instruction", instruction),
        ]),
    )
}

/// Weather alerts roundup; `None` when no alerts are active.
pub fn weather_alerts_post(
    alerts: &RecordBatch,
    site_url: &str,
    now: DateTime<Utc>,
) -> Result<Option<Post>, TemplateError> {
    if alerts.items.is_empty() {
        return Ok(None);
    }
    let items = alerts
        .items
        .iter()
        .map(render_alert)
        .collect::<Result<String, _>>()?;
    let body = render(
        WEATHER_POST,
        &bindings([
            ("updated", updated_label(now)),
            ("alerts", items),
            ("site_url", site_url.trim_end_matches('/').to_string()),
        ]),
    )?;
    Ok(Some(Post::new(
        format!("Current Severe Weather Alerts: {} Update", date_label(now)),
        slug("weather-alerts", now),
        &["weather alerts", "severe weather", "safety", "emergency preparedness"],
        now,
        body,
    )))
}

fn render_city(city: &CityAirQuality) -> Result<String, TemplateError> {
    let recommendations = if city.recommendations.is_empty() {
        "- No current reading".to_string()
    } else {
        city.recommendations
            .iter()
            .map(|r| format!("- {r}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    render(
        CITY_ITEM,
        &bindings([
            ("city", city.city.clone()),
            ("state", city.state.clone()),
            ("aqi", city.aqi.map_or_else(|| "n/a".to_string(), |a| a.to_string())),
            ("level", city.level.clone()),
            ("color", city.color.clone()),
            ("recommendations", recommendations),
        ]),
    )
}

/// Air quality report, one section per city.
pub fn air_quality_post(
    report: &AirQualityReport,
    now: DateTime<Utc>,
) -> Result<Post, TemplateError> {
    let s = &report.summary;
    let overview = match (s.average_aqi, s.min_aqi, s.max_aqi) {
        (Some(avg), Some(min), Some(max)) => format!(
            "{} cities reporting. Average AQI {avg}, ranging from {min} to {max}.",
            s.total_cities
        ),
        _ => "No city reported an AQI in this update.".to_string(),
    };
    let cities = report
        .cities
        .iter()
        .map(render_city)
        .collect::<Result<String, _>>()?;
    let body = render(
        AIR_QUALITY_POST,
        &bindings([
            ("updated", updated_label(now)),
            ("overview", overview),
            ("cities", cities),
        ]),
    )?;
    Ok(Post::new(
        format!("Air Quality Report: Major US Cities - {}", date_label(now)),
        slug("air-quality-report", now),
        &["air quality", "health", "pollution", "environmental safety"],
        now,
        body,
    ))
}

fn render_recall(rank: usize, recall: &NormalizedRecord) -> Result<String, TemplateError> {
    render(
        RECALL_ITEM,
        &bindings([
            ("rank", rank.to_string()),
            ("brand", recall.brand.clone().unwrap_or_else(|| "Unknown".to_string())),
            ("product", recall.product.clone().unwrap_or_else(|| recall.title.clone())),
            ("reason", recall.hazard.clone()),
            ("classification", recall.severity.clone()),
            ("status", or_unspecified(recall.status.as_deref())),
            ("date", or_unspecified(recall.initiation.as_deref())),
        ]),
    )
}

/// Roundup of the first [`RECALL_ROUNDUP_SIZE`] recalls; `None` when there
/// are none.
pub fn recalls_post(
    recalls: &RecordBatch,
    now: DateTime<Utc>,
) -> Result<Option<Post>, TemplateError> {
    if recalls.items.is_empty() {
        return Ok(None);
    }
    let items = recalls
        .items
        .iter()
        .take(RECALL_ROUNDUP_SIZE)
        .enumerate()
        .map(|(i, recall)| render_recall(i + 1, recall))
        .collect::<Result<String, _>>()?;
    let body = render(
        RECALLS_POST,
        &bindings([("updated", date_label(now)), ("recalls", items)]),
    )?;
    Ok(Some(Post::new(
        "Weekly Product Recall Roundup: What You Need to Know".to_string(),
        slug("recalls-roundup", now),
        &["product recalls", "consumer safety", "food safety", "product safety"],
        now,
        body,
    )))
}

/// Every post the available documents support, in a fixed order.
pub fn build_posts(
    alerts: Option<&RecordBatch>,
    recalls: Option<&RecordBatch>,
    air_quality: Option<&AirQualityReport>,
    site_url: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Post>, TemplateError> {
    let mut posts = Vec::new();
    if let Some(alerts) = alerts {
        posts.extend(weather_alerts_post(alerts, site_url, now)?);
    }
    if let Some(report) = air_quality {
        posts.push(air_quality_post(report, now)?);
    }
    if let Some(recalls) = recalls {
        posts.extend(recalls_post(recalls, now)?);
    }
    Ok(posts)
}

pub fn content_summary(
    alerts: Option<&RecordBatch>,
    recalls: Option<&RecordBatch>,
    air_quality: Option<&AirQualityReport>,
    posts: usize,
    now: DateTime<Utc>,
) -> ContentSummary {
    ContentSummary {
        last_updated: format_rfc3339(now),
        weather_alerts: alerts.map_or(0, |b| b.items.len()),
        air_quality_reports: air_quality.map_or(0, |r| r.cities.len()),
        product_recalls: recalls.map_or(0, |b| b.items.len()),
        blog_posts_generated: posts,
        next_update: format_rfc3339(now + Duration::hours(UPDATE_INTERVAL_HOURS)),
    }
}

/// Slugs of the posts already in `dir`, sorted. A missing directory has none.
pub async fn list_post_slugs(dir: &Path) -> Result<Vec<String>, PipelineError> {
    let read_err = |source| PipelineError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %dir.display(), "Blog directory not found; no posts listed");
            return Ok(Vec::new());
        }
        Err(e) => return Err(read_err(e)),
    };

    let mut slugs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "md") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                slugs.push(stem.to_string());
            }
        }
    }
    slugs.sort();
    Ok(slugs)
}
