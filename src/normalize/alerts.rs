//! Weather alert normalization.
//!
//! Input is one GeoJSON feature from `https://api.weather.gov/alerts/active`.
//! The feature `id` (or, failing that, `properties.id` / `properties.@id`)
//! identifies the alert; a feature without any of them is skipped.

use super::{UNKNOWN_SEVERITY, non_blank, typed};
use crate::error::ParseError;
use crate::models::{NormalizedRecord, RawAlertFeature};
use crate::utils::{extract_states, normalize_timestamp, slugify, split_areas};
use serde_json::Value;

const KIND: &str = "weather alert";
const DEFAULT_EVENT: &str = "Alert";

/// Provenance tag for alerts from the live NWS feed.
pub const SOURCE_TAG: &str = "api.weather.gov";

/// Map one NWS alert feature to a [`NormalizedRecord`].
///
/// # Arguments
///
/// * `value` - A GeoJSON feature as returned by the alerts endpoint
/// * `source` - Provenance tag stamped on the record
///
/// # Returns
///
/// The canonical record with `category` `"weather"`, areas split on `;`
/// and states parsed from them, or a [`ParseError`] when the feature is
/// not an object or carries no identifier.
pub fn normalize_alert(value: Value, source: &str) -> Result<NormalizedRecord, ParseError> {
    let feature: RawAlertFeature = typed(KIND, value)?;
    let p = feature.properties;

    let identifier = non_blank(feature.id)
        .or_else(|| non_blank(p.id))
        .or_else(|| non_blank(p.at_id))
        .ok_or_else(|| ParseError::new(KIND, "missing alert id"))?;

    let event = non_blank(p.event);
    let hazard = event.clone().unwrap_or_else(|| DEFAULT_EVENT.to_string());
    let title = non_blank(p.headline)
        .or(event)
        .unwrap_or_else(|| DEFAULT_EVENT.to_string());

    let areas = split_areas(p.area_desc.as_deref().unwrap_or_default(), &[';']);
    let states = extract_states(&areas);
    let url = identifier.starts_with("http").then(|| identifier.clone());

    Ok(NormalizedRecord {
        id: slugify(&identifier),
        title,
        category: "weather".to_string(),
        hazard,
        severity: non_blank(p.severity).unwrap_or_else(|| UNKNOWN_SEVERITY.to_string()),
        status: non_blank(p.status),
        areas,
        states,
        effective: normalize_timestamp(p.effective.as_deref()),
        expires: normalize_timestamp(p.expires.as_deref()),
        initiation: normalize_timestamp(p.sent.as_deref()),
        reported: None,
        description: p.description.unwrap_or_default().trim().to_string(),
        instruction: non_blank(p.instruction),
        url,
        brand: None,
        product: None,
        source: source.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature() -> Value {
        json!({
            "id": "https://api.weather.gov/alerts/urn:oid:2.49.0.1.840.0.7a1c",
            "properties": {
                "event": "Winter Storm Warning",
                "headline": "Winter Storm Warning issued for Northern Colorado",
                "severity": "Severe",
                "status": "Actual",
                "sent": "2025-01-10T06:00:00-07:00",
                "effective": "2025-01-10T06:00:00-07:00",
                "expires": "2025-01-11T06:00:00-07:00",
                "areaDesc": "Fort Collins, CO; Greeley, CO; Loveland, CO",
                "instruction": "Travel is strongly discouraged.",
                "description": "A winter storm will bring 6 to 12 inches of snow."
            }
        })
    }

    #[test]
    fn test_normalize_full_feature() {
        let record = normalize_alert(feature(), SOURCE_TAG).unwrap();
        assert_eq!(
            record.id,
            "https-api-weather-gov-alerts-urn-oid-2-49-0-1-840-0-7a1c"
        );
        assert_eq!(record.title, "Winter Storm Warning issued for Northern Colorado");
        assert_eq!(record.hazard, "Winter Storm Warning");
        assert_eq!(record.severity, "Severe");
        assert_eq!(record.status.as_deref(), Some("Actual"));
        assert_eq!(record.areas, vec!["Fort Collins, CO", "Greeley, CO", "Loveland, CO"]);
        assert_eq!(record.states, vec!["CO"]);
        assert_eq!(record.initiation.as_deref(), Some("2025-01-10T06:00:00-07:00"));
        assert_eq!(record.instruction.as_deref(), Some("Travel is strongly discouraged."));
        assert_eq!(
            record.url.as_deref(),
            Some("https://api.weather.gov/alerts/urn:oid:2.49.0.1.840.0.7a1c")
        );
        assert_eq!(record.source, "api.weather.gov");
    }

    #[test]
    fn test_missing_severity_defaults_to_unknown() {
        for severity in [json!(null), json!(""), json!("   ")] {
            let record = normalize_alert(
                json!({ "id": "x", "properties": { "severity": severity } }),
                SOURCE_TAG,
            )
            .unwrap();
            assert_eq!(record.severity, "Unknown");
        }
        let record = normalize_alert(json!({ "id": "x" }), SOURCE_TAG).unwrap();
        assert_eq!(record.severity, "Unknown");
    }

    #[test]
    fn test_missing_optional_fields() {
        let record = normalize_alert(json!({ "id": "urn:oid:1", "properties": {} }), SOURCE_TAG)
            .unwrap();
        assert_eq!(record.title, "Alert");
        assert_eq!(record.hazard, "Alert");
        assert!(record.areas.is_empty());
        assert_eq!(record.states, vec!["US"]);
        assert_eq!(record.instruction, None);
        assert_eq!(record.url, None);
        assert_eq!(record.description, "");
    }

    #[test]
    fn test_title_falls_back_to_event() {
        let record = normalize_alert(
            json!({ "id": "x", "properties": { "event": "Heat Advisory" } }),
            SOURCE_TAG,
        )
        .unwrap();
        assert_eq!(record.title, "Heat Advisory");
    }

    #[test]
    fn test_id_from_properties() {
        let record = normalize_alert(
            json!({ "properties": { "@id": "urn:oid:2.49.0.1.840.0.99" } }),
            SOURCE_TAG,
        )
        .unwrap();
        assert_eq!(record.id, "urn-oid-2-49-0-1-840-0-99");
    }

    #[test]
    fn test_missing_id_is_parse_error() {
        let err = normalize_alert(json!({ "properties": { "event": "Heat Advisory" } }), SOURCE_TAG)
            .unwrap_err();
        assert_eq!(err.kind, "weather alert");
    }

    #[test]
    fn test_malformed_feature_is_parse_error() {
        assert!(normalize_alert(json!({ "id": "x", "properties": { "event": 5 } }), SOURCE_TAG).is_err());
        assert!(normalize_alert(json!("not an object"), SOURCE_TAG).is_err());
    }

    #[test]
    fn test_states_from_mixed_areas() {
        let record = normalize_alert(
            json!({ "id": "x", "properties": { "areaDesc": "City A, CA; City B, NY" } }),
            SOURCE_TAG,
        )
        .unwrap();
        assert_eq!(record.states, vec!["CA", "NY"]);
    }

    #[test]
    fn test_normalization_is_deterministic() {
        assert_eq!(
            normalize_alert(feature(), SOURCE_TAG).unwrap(),
            normalize_alert(feature(), SOURCE_TAG).unwrap()
        );
    }
}
