//! Simulated upstream data for demos, development and offline builds.
//!
//! Alerts and recalls are canned. Air quality readings are drawn from a
//! [`StdRng`]: with a seed the output is fully reproducible, without one it
//! is seeded from the OS. All timestamps are relative to a fixed anchor
//! chosen at construction.

use super::{DataSource, RawBatch};
use crate::config::City;
use crate::error::FetchError;
use crate::utils::format_rfc3339;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};
use std::sync::Mutex;
use tracing::info;

/// Provenance tag for every simulated record.
pub const SOURCE_TAG: &str = "simulated";

/// Pollutants and the AQI range each is drawn from.
const POLLUTANTS: [(&str, u32, u32); 4] = [
    ("PM2.5", 10, 210),
    ("PM10", 10, 120),
    ("O3", 20, 150),
    ("NO2", 10, 80),
];

struct CannedAlert {
    event: &'static str,
    headline: &'static str,
    severity: &'static str,
    expires_in_hours: i64,
    area: &'static str,
    instruction: &'static str,
    description: &'static str,
}

const CANNED_ALERTS: [CannedAlert; 3] = [
    CannedAlert {
        event: "Winter Storm Warning",
        headline: "Winter Storm Warning issued for Northern Colorado",
        severity: "Severe",
        expires_in_hours: 24,
        area: "Fort Collins, CO; Greeley, CO; Loveland, CO",
        instruction: "Travel is strongly discouraged. Heavy snow and blowing snow will create dangerous travel conditions.",
        description: "A winter storm will bring 6 to 12 inches of snow to the area through Friday morning.",
    },
    CannedAlert {
        event: "Heat Advisory",
        headline: "Heat Advisory issued for Phoenix Metro Area",
        severity: "Moderate",
        expires_in_hours: 12,
        area: "Phoenix, AZ; Scottsdale, AZ; Tempe, AZ",
        instruction: "Drink plenty of fluids, stay in air-conditioned rooms, and avoid extended exposure to the sun.",
        description: "Dangerously hot conditions with temperatures up to 115°F expected today.",
    },
    CannedAlert {
        event: "Flash Flood Watch",
        headline: "Flash Flood Watch issued for South Texas",
        severity: "Moderate",
        expires_in_hours: 18,
        area: "San Antonio, TX; Austin, TX; Houston, TX",
        instruction: "Be especially cautious at night when it is harder to recognize flood dangers.",
        description: "Heavy rainfall may cause flash flooding in urban areas and small streams.",
    },
];

#[derive(Debug)]
pub struct SimulatedSource {
    rng: Mutex<StdRng>,
    anchor: DateTime<Utc>,
}

impl SimulatedSource {
    pub fn new(seed: Option<u64>, anchor: DateTime<Utc>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
            anchor,
        }
    }

    fn at(&self, hours: i64) -> String {
        format_rfc3339(self.anchor + Duration::hours(hours))
    }

    fn alert(&self, n: usize, canned: &CannedAlert) -> Value {
        json!({
            "id": format!("simulated-alert-{n}"),
            "properties": {
                "event": canned.event,
                "headline": canned.headline,
                "severity": canned.severity,
                "status": "Actual",
                "sent": self.at(0),
                "effective": self.at(0),
                "expires": self.at(canned.expires_in_hours),
                "areaDesc": canned.area,
                "instruction": canned.instruction,
                "description": canned.description,
            }
        })
    }

    fn reading(&self, rng: &mut StdRng, city: &City) -> Value {
        let observations: Vec<Value> = POLLUTANTS
            .iter()
            .map(|&(parameter, low, high)| {
                json!({
                    "ParameterName": parameter,
                    "AQI": rng.random_range(low..=high),
                })
            })
            .collect();
        json!({
            "city": city.city,
            "state": city.state,
            "observedAt": self.at(0),
            "observations": observations,
        })
    }
}

impl DataSource for SimulatedSource {
    async fn weather_alerts(&self) -> Result<RawBatch, FetchError> {
        let records: Vec<Value> = CANNED_ALERTS
            .iter()
            .enumerate()
            .map(|(i, canned)| self.alert(i + 1, canned))
            .collect();
        info!(count = records.len(), "Generated simulated weather alerts");
        Ok(RawBatch {
            source: SOURCE_TAG,
            records,
        })
    }

    async fn food_recalls(&self) -> Result<RawBatch, FetchError> {
        let report_date = self.anchor.format("%Y%m%d").to_string();
        let initiated = (self.anchor - Duration::days(14)).format("%Y%m%d").to_string();
        let records = vec![
            json!({
                "recall_number": "F-0001-SIM",
                "event_id": "90001",
                "recalling_firm": "Sunrise Dairy Co.",
                "product_description": "Sunrise Vanilla Ice Cream, 1.5 qt cartons",
                "product_type": "Food",
                "reason_for_recall": "Undeclared peanuts",
                "distribution_pattern": "CA, NV, AZ",
                "classification": "Class I",
                "status": "Ongoing",
                "recall_initiation_date": initiated,
                "report_date": report_date,
            }),
            json!({
                "recall_number": "F-0002-SIM",
                "event_id": "90002",
                "recalling_firm": "Green Valley Farms",
                "product_description": "Bagged romaine lettuce, 10 oz",
                "product_type": "Food",
                "reason_for_recall": "Potential Listeria monocytogenes contamination",
                "distribution_pattern": "Nationwide",
                "classification": "Class II",
                "status": "Ongoing",
                "recall_initiation_date": initiated,
                "report_date": report_date,
            }),
            json!({
                "recall_number": "F-0003-SIM",
                "event_id": "90003",
                "recalling_firm": "Harbor Seafood LLC",
                "product_description": "Smoked salmon fillets, 8 oz vacuum packs",
                "product_type": "Food",
                "reason_for_recall": "Potential Clostridium botulinum contamination",
                "distribution_pattern": "WA; OR; ID",
                "status": "Ongoing",
                "recall_initiation_date": initiated,
                "report_date": report_date,
            }),
        ];
        info!(count = records.len(), "Generated simulated recalls");
        Ok(RawBatch {
            source: SOURCE_TAG,
            records,
        })
    }

    async fn air_quality(&self, cities: &[City]) -> Result<RawBatch, FetchError> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let records: Vec<Value> = cities.iter().map(|city| self.reading(&mut rng, city)).collect();
        info!(count = records.len(), "Generated simulated air quality readings");
        Ok(RawBatch {
            source: SOURCE_TAG,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_seeded_readings_are_reproducible() {
        let cities = Config::default().cities;
        let a = SimulatedSource::new(Some(42), anchor()).air_quality(&cities).await.unwrap();
        let b = SimulatedSource::new(Some(42), anchor()).air_quality(&cities).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.records.len(), cities.len());
        assert_eq!(a.source, "simulated");
    }

    #[tokio::test]
    async fn test_readings_within_ranges() {
        let cities = Config::default().cities;
        let batch = SimulatedSource::new(Some(7), anchor()).air_quality(&cities).await.unwrap();
        for reading in &batch.records {
            let observations = reading["observations"].as_array().unwrap();
            assert_eq!(observations.len(), POLLUTANTS.len());
            for (obs, &(name, low, high)) in observations.iter().zip(POLLUTANTS.iter()) {
                assert_eq!(obs["ParameterName"], name);
                let aqi = obs["AQI"].as_u64().unwrap() as u32;
                assert!((low..=high).contains(&aqi));
            }
            assert_eq!(reading["observedAt"], "2025-01-10T12:00:00Z");
            let mut keys: Vec<&str> = reading.as_object().unwrap().keys().map(String::as_str).collect();
            keys.sort_unstable();
            assert_eq!(keys, vec!["city", "observations", "observedAt", "state"]);
        }
    }

    #[tokio::test]
    async fn test_alerts_are_anchored() {
        let batch = SimulatedSource::new(Some(1), anchor()).weather_alerts().await.unwrap();
        assert_eq!(batch.records.len(), 3);
        assert_eq!(batch.records[0]["properties"]["sent"], "2025-01-10T12:00:00Z");
        assert_eq!(batch.records[0]["properties"]["expires"], "2025-01-11T12:00:00Z");
    }

    #[tokio::test]
    async fn test_recall_dates() {
        let batch = SimulatedSource::new(None, anchor()).food_recalls().await.unwrap();
        assert_eq!(batch.records[0]["report_date"], "20250110");
        assert_eq!(batch.records[0]["recall_initiation_date"], "20241227");
    }
}
