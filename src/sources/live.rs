//! Live upstream APIs.
//!
//! - Weather alerts: `GET {nws.alerts_url}?status=actual&message_type=alert`,
//!   which requires a `User-Agent` and answers in GeoJSON.
//! - Food recalls: openFDA `food/enforcement.json`, paginated with
//!   `limit`/`skip` and filtered on `report_date`, see
//!   [`collect_with_fallback`].
//! - Air quality: AirNow `observation/latLong/current`, one request per
//!   configured city. Needs an API key.

use super::{DataSource, RawBatch};
use crate::api::{HttpPager, PagePlan, collect_with_fallback, get_json};
use crate::config::{City, Config};
use crate::error::FetchError;
use crate::normalize::{air_quality, alerts, recalls};
use crate::utils::now_rfc3339;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
pub struct LiveSource<'a> {
    client: Client,
    config: &'a Config,
}

impl<'a> LiveSource<'a> {
    pub fn new(config: &'a Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, config })
    }

    async fn city_observations(&self, city: &City, api_key: &str) -> Result<Value, FetchError> {
        let airnow = &self.config.airnow;
        let url = format!(
            "{}/observation/latLong/current/",
            airnow.base_url.trim_end_matches('/')
        );
        let params = [
            ("format", "application/json".to_string()),
            ("latitude", city.latitude.to_string()),
            ("longitude", city.longitude.to_string()),
            ("distance", airnow.distance_miles.to_string()),
            ("API_KEY", api_key.to_string()),
        ];
        let observations = get_json(&self.client, &url, &params, &[]).await?;
        Ok(json!({
            "city": city.city,
            "state": city.state,
            "observedAt": now_rfc3339(),
            "observations": observations,
        }))
    }
}

impl DataSource for LiveSource<'_> {
    #[instrument(level = "info", skip_all)]
    async fn weather_alerts(&self) -> Result<RawBatch, FetchError> {
        let nws = &self.config.nws;
        let params = [
            ("status", nws.status.clone()),
            ("message_type", nws.message_type.clone()),
        ];
        let mut body = get_json(
            &self.client,
            &nws.alerts_url,
            &params,
            &[("Accept", "application/geo+json")],
        )
        .await?;

        let features = match body.get_mut("features").map(Value::take) {
            Some(Value::Array(features)) => features,
            _ => {
                warn!("NWS response has no features array");
                Vec::new()
            }
        };
        info!(count = features.len(), "Fetched weather alerts");
        Ok(RawBatch {
            source: alerts::SOURCE_TAG,
            records: features,
        })
    }

    #[instrument(level = "info", skip_all)]
    async fn food_recalls(&self) -> Result<RawBatch, FetchError> {
        let openfda = &self.config.openfda;
        let pager = HttpPager {
            client: &self.client,
            endpoint: &openfda.endpoint,
            results_key: "results",
        };
        let plan = PagePlan {
            limit: openfda.limit,
            max_records: openfda.max_records,
            delay: openfda.delay(),
        };
        let fallback = PagePlan {
            max_records: openfda.fallback_max_records,
            ..plan
        };

        let records = collect_with_fallback(&pager, &openfda.search_filter(), plan, fallback).await?;
        info!(count = records.len(), "Fetched openFDA enforcement reports");
        Ok(RawBatch {
            source: recalls::SOURCE_TAG,
            records,
        })
    }

    /// Cities whose request fails are logged and left out. The call only
    /// fails when every city failed.
    #[instrument(level = "info", skip_all, fields(cities = cities.len()))]
    async fn air_quality(&self, cities: &[City]) -> Result<RawBatch, FetchError> {
        let api_key = self
            .config
            .airnow
            .api_key
            .as_deref()
            .ok_or(FetchError::MissingApiKey("AirNow"))?;

        let mut readings = Vec::with_capacity(cities.len());
        let mut last_error = None;
        for (i, city) in cities.iter().enumerate() {
            if i > 0 {
                sleep(self.config.airnow.delay()).await;
            }
            match self.city_observations(city, api_key).await {
                Ok(reading) => {
                    debug!(city = %city.city, state = %city.state, "Fetched air quality");
                    readings.push(reading);
                }
                Err(e) => {
                    warn!(city = %city.city, state = %city.state, error = %e, "Air quality fetch failed; skipping city");
                    last_error = Some(e);
                }
            }
        }

        if readings.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }
        info!(count = readings.len(), "Fetched air quality readings");
        Ok(RawBatch {
            source: air_quality::SOURCE_TAG,
            records: readings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_air_quality_requires_key() {
        let config = Config::default();
        let source = LiveSource::new(&config).unwrap();
        let err = source.air_quality(&config.cities).await.unwrap_err();
        assert!(matches!(err, FetchError::MissingApiKey("AirNow")));
    }
}
