//! Air quality normalization.
//!
//! One raw reading holds every pollutant AirNow reported near a city. The
//! city's AQI is the highest pollutant AQI, which is how AirNow itself
//! reports an overall index. Negative AQIs (AirNow's "no data") count as
//! missing.

use super::{non_blank, typed};
use crate::aqi::AqiCategory;
use crate::error::ParseError;
use crate::models::{CityAirQuality, Pollutant, RawCityReading};
use crate::utils::{NATIONWIDE, normalize_timestamp, slugify};
use serde_json::Value;

const KIND: &str = "air quality";

/// Provenance tag for AirNow readings.
pub const SOURCE_TAG: &str = "airnow";

/// Map one city's AirNow observations to a [`CityAirQuality`].
///
/// Fails with a [`ParseError`] when the reading names no city.
pub fn normalize_reading(value: Value, source: &str) -> Result<CityAirQuality, ParseError> {
    let raw: RawCityReading = typed(KIND, value)?;

    let city = non_blank(raw.city).ok_or_else(|| ParseError::new(KIND, "missing city"))?;
    let state = non_blank(raw.state).unwrap_or_else(|| NATIONWIDE.to_string());

    let pollutants: Vec<Pollutant> = raw
        .observations
        .into_iter()
        .map(|obs| Pollutant {
            parameter: non_blank(obs.parameter_name).unwrap_or_else(|| "Unknown".to_string()),
            aqi: obs.aqi.and_then(|v| u32::try_from(v).ok()),
        })
        .collect();
    let aqi = pollutants.iter().filter_map(|p| p.aqi).max();

    let (level, color, recommendations) = match aqi.map(AqiCategory::from_aqi) {
        Some(category) => (
            category.level().to_string(),
            category.color().to_string(),
            category.recommendations(),
        ),
        None => ("Unknown".to_string(), "gray".to_string(), Vec::new()),
    };

    Ok(CityAirQuality {
        id: slugify(&format!("{city}-{state}")),
        city,
        state,
        aqi,
        level,
        color,
        timestamp: normalize_timestamp(raw.observed_at.as_deref()),
        pollutants,
        recommendations,
        source: source.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_city_aqi_is_max_pollutant() {
        let reading = normalize_reading(
            json!({
                "city": "Los Angeles",
                "state": "CA",
                "observedAt": "2025-01-10T12:00:00Z",
                "observations": [
                    { "ParameterName": "O3", "AQI": 48 },
                    { "ParameterName": "PM2.5", "AQI": 101 },
                    { "ParameterName": "PM10", "AQI": -1 }
                ]
            }),
            SOURCE_TAG,
        )
        .unwrap();
        assert_eq!(reading.id, "los-angeles-ca");
        assert_eq!(reading.aqi, Some(101));
        assert_eq!(reading.level, "Unhealthy for Sensitive Groups");
        assert_eq!(reading.color, "orange");
        assert_eq!(reading.pollutants[2].aqi, None);
        assert_eq!(reading.timestamp.as_deref(), Some("2025-01-10T12:00:00Z"));
        assert_eq!(reading.recommendations, AqiCategory::from_aqi(101).recommendations());
    }

    #[test]
    fn test_no_observations() {
        let reading =
            normalize_reading(json!({ "city": "Boise", "state": "ID" }), SOURCE_TAG).unwrap();
        assert_eq!(reading.aqi, None);
        assert_eq!(reading.level, "Unknown");
        assert!(reading.recommendations.is_empty());
    }

    #[test]
    fn test_missing_city_is_parse_error() {
        assert!(normalize_reading(json!({ "state": "ID" }), SOURCE_TAG).is_err());
    }

    #[test]
    fn test_extra_upstream_fields_are_ignored() {
        let reading = normalize_reading(
            json!({
                "city": "Denver",
                "state": "CO",
                "latitude": 39.7392,
                "longitude": -104.9903,
                "observations": [{ "ParameterName": "O3", "AQI": 42, "ReportingArea": "Denver" }]
            }),
            SOURCE_TAG,
        )
        .unwrap();
        assert_eq!(reading.aqi, Some(42));
        let out = serde_json::to_value(&reading).unwrap();
        assert!(out.get("latitude").is_none());
    }

    #[test]
    fn test_missing_state_uses_sentinel() {
        let reading = normalize_reading(json!({ "city": "Somewhere" }), SOURCE_TAG).unwrap();
        assert_eq!(reading.state, "US");
    }
}
