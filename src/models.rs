//! Data models for raw upstream records and their normalized representations.
//!
//! This module defines the core data structures used throughout the application:
//! - Raw views: [`RawAlertFeature`], [`RawRecall`], [`RawCityReading`], typed
//!   but fully optional projections of the upstream JSON
//! - [`NormalizedRecord`]: the canonical alert/recall record written to disk
//! - [`CityAirQuality`]: a normalized per-city air quality reading
//! - Summaries: [`Summary`], [`AirQualitySummary`]
//! - Output documents: [`RecordBatch`], [`AirQualityReport`]
//!
//! Raw views use the upstream field names (`areaDesc`, `recall_number`,
//! `ParameterName`) via serde renames. Output models serialize as camelCase
//! to match the JSON consumed by the site templates.

use serde::{Deserialize, Serialize};

/// A GeoJSON feature from the api.weather.gov alerts feed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawAlertFeature {
    pub id: Option<String>,
    pub properties: RawAlertProperties,
}

/// The `properties` object of a weather alert feature.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAlertProperties {
    pub id: Option<String>,
    #[serde(rename = "@id")]
    pub at_id: Option<String>,
    pub event: Option<String>,
    pub headline: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub sent: Option<String>,
    pub effective: Option<String>,
    pub expires: Option<String>,
    pub area_desc: Option<String>,
    pub instruction: Option<String>,
    pub description: Option<String>,
}

/// A food enforcement report from openFDA.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawRecall {
    pub recall_number: Option<String>,
    pub event_id: Option<String>,
    pub brand_name: Option<String>,
    pub recalling_firm: Option<String>,
    pub product_description: Option<String>,
    pub product_type: Option<String>,
    pub reason_for_recall: Option<String>,
    pub distribution_pattern: Option<String>,
    pub classification: Option<String>,
    pub status: Option<String>,
    pub recall_initiation_date: Option<String>,
    pub report_date: Option<String>,
    pub url: Option<String>,
    pub openfda: RawOpenFdaBlock,
}

/// The harmonized `openfda` sub-object, sometimes carrying brand names.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawOpenFdaBlock {
    pub brand_name: Vec<String>,
}

/// AirNow observations for one configured city.
///
/// AirNow returns a bare array of observations per location; the source
/// wraps it together with the city it asked about.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCityReading {
    pub city: Option<String>,
    pub state: Option<String>,
    pub observed_at: Option<String>,
    pub observations: Vec<RawObservation>,
}

/// A single pollutant observation in AirNow's response format.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawObservation {
    #[serde(rename = "ParameterName")]
    pub parameter_name: Option<String>,
    #[serde(rename = "AQI")]
    pub aqi: Option<i64>,
}

/// A weather alert or food recall in canonical form.
///
/// `severity` is `"Unknown"` when the upstream record has none, and
/// `states` is never empty (it falls back to `["US"]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    /// Slug unique within one batch.
    pub id: String,
    pub title: String,
    pub category: String,
    pub hazard: String,
    pub severity: String,
    pub status: Option<String>,
    pub areas: Vec<String>,
    pub states: Vec<String>,
    pub effective: Option<String>,
    pub expires: Option<String>,
    pub initiation: Option<String>,
    pub reported: Option<String>,
    pub description: String,
    pub instruction: Option<String>,
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// Provenance tag, e.g. `"api.weather.gov"` or `"openfda"`.
    pub source: String,
}

/// Air quality for one city after categorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityAirQuality {
    pub id: String,
    pub city: String,
    pub state: String,
    /// Highest pollutant AQI reported for the city.
    pub aqi: Option<u32>,
    pub level: String,
    pub color: String,
    pub timestamp: Option<String>,
    pub pollutants: Vec<Pollutant>,
    pub recommendations: Vec<String>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pollutant {
    pub parameter: String,
    pub aqi: Option<u32>,
}

/// One row of a grouped count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub name: String,
    pub count: usize,
}

/// Aggregate counts over one batch of normalized records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub fetched_at: String,
    pub total: usize,
    pub hazards: Vec<Count>,
    pub states: Vec<Count>,
    pub severities: Vec<Count>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualitySummary {
    #[serde(rename = "fetchedAt")]
    pub fetched_at: String,
    #[serde(rename = "totalCities")]
    pub total_cities: usize,
    #[serde(rename = "averageAQI")]
    pub average_aqi: Option<u32>,
    #[serde(rename = "maxAQI")]
    pub max_aqi: Option<u32>,
    #[serde(rename = "minAQI")]
    pub min_aqi: Option<u32>,
    #[serde(rename = "levelCounts")]
    pub level_counts: LevelCounts,
}

/// Histogram of city AQIs by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCounts {
    pub good: usize,
    pub moderate: usize,
    pub unhealthy_sensitive: usize,
    pub unhealthy: usize,
    pub very_unhealthy: usize,
    pub hazardous: usize,
}

/// Contents of `alerts.json` and `recalls.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    pub items: Vec<NormalizedRecord>,
    pub summary: Summary,
}

/// Contents of `air-quality.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReport {
    pub summary: AirQualitySummary,
    pub cities: Vec<CityAirQuality>,
}
