//! Grouped counts and statistics over normalized batches.
//!
//! Count lists are sorted descending by count. The sort is stable, so ties
//! keep the order in which names were first seen in the batch.

use crate::aqi::AqiCategory;
use crate::models::{AirQualitySummary, CityAirQuality, Count, LevelCounts, NormalizedRecord, Summary};
use crate::utils::NATIONWIDE;
use itertools::Itertools;
use std::collections::HashMap;

/// Order-preserving counter.
#[derive(Debug, Default)]
struct Tally {
    rows: Vec<Count>,
    index: HashMap<String, usize>,
}

impl Tally {
    fn add(&mut self, name: &str) {
        match self.index.get(name) {
            Some(&i) => self.rows[i].count += 1,
            None => {
                self.index.insert(name.to_string(), self.rows.len());
                self.rows.push(Count {
                    name: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    fn ranked(mut self) -> Vec<Count> {
        self.rows.sort_by(|a, b| b.count.cmp(&a.count));
        self.rows
    }
}

/// Count records by hazard, state and severity.
///
/// Each record counts once per distinct state it touches, so state counts
/// can add up to more than `total`; hazard and severity counts always add
/// up to exactly `total`.
pub fn summarize(items: &[NormalizedRecord], fetched_at: String) -> Summary {
    let mut hazards = Tally::default();
    let mut states = Tally::default();
    let mut severities = Tally::default();

    for item in items {
        hazards.add(&item.hazard);
        severities.add(&item.severity);
        if item.states.is_empty() {
            states.add(NATIONWIDE);
        }
        for state in item.states.iter().unique() {
            states.add(state);
        }
    }

    Summary {
        fetched_at,
        total: items.len(),
        hazards: hazards.ranked(),
        states: states.ranked(),
        severities: severities.ranked(),
    }
}

/// Min, max, rounded mean and category histogram over the cities that
/// reported an AQI.
pub fn summarize_air_quality(cities: &[CityAirQuality], fetched_at: String) -> AirQualitySummary {
    let values: Vec<u32> = cities.iter().filter_map(|c| c.aqi).collect();

    let mut level_counts = LevelCounts::default();
    for &aqi in &values {
        let bucket = match AqiCategory::from_aqi(aqi) {
            AqiCategory::Good => &mut level_counts.good,
            AqiCategory::Moderate => &mut level_counts.moderate,
            AqiCategory::UnhealthyForSensitiveGroups => &mut level_counts.unhealthy_sensitive,
            AqiCategory::Unhealthy => &mut level_counts.unhealthy,
            AqiCategory::VeryUnhealthy => &mut level_counts.very_unhealthy,
            AqiCategory::Hazardous => &mut level_counts.hazardous,
        };
        *bucket += 1;
    }

    let average_aqi = if values.is_empty() {
        None
    } else {
        let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
        Some((sum as f64 / values.len() as f64).round() as u32)
    };

    AirQualitySummary {
        fetched_at,
        total_cities: values.len(),
        average_aqi,
        max_aqi: values.iter().copied().max(),
        min_aqi: values.iter().copied().min(),
        level_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hazard: &str, severity: &str, states: &[&str]) -> NormalizedRecord {
        NormalizedRecord {
            id: hazard.to_lowercase(),
            title: hazard.to_string(),
            category: "weather".to_string(),
            hazard: hazard.to_string(),
            severity: severity.to_string(),
            status: None,
            areas: vec![],
            states: states.iter().map(|s| s.to_string()).collect(),
            effective: None,
            expires: None,
            initiation: None,
            reported: None,
            description: String::new(),
            instruction: None,
            url: None,
            brand: None,
            product: None,
            source: "test".to_string(),
        }
    }

    fn city(aqi: Option<u32>) -> CityAirQuality {
        CityAirQuality {
            id: "c".into(),
            city: "C".into(),
            state: "CA".into(),
            aqi,
            level: String::new(),
            color: String::new(),
            timestamp: None,
            pollutants: vec![],
            recommendations: vec![],
            source: "test".into(),
        }
    }

    fn names(counts: &[Count]) -> Vec<(&str, usize)> {
        counts.iter().map(|c| (c.name.as_str(), c.count)).collect()
    }

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let items = vec![
            record("Heat Advisory", "Moderate", &["AZ"]),
            record("Flood Watch", "Moderate", &["TX"]),
            record("Flood Watch", "Severe", &["TX", "LA"]),
            record("Wind Advisory", "Minor", &["AZ"]),
        ];
        let summary = summarize(&items, "t".into());
        assert_eq!(summary.total, 4);
        assert_eq!(
            names(&summary.hazards),
            vec![("Flood Watch", 2), ("Heat Advisory", 1), ("Wind Advisory", 1)]
        );
        assert_eq!(names(&summary.states), vec![("AZ", 2), ("TX", 2), ("LA", 1)]);
        assert_eq!(
            names(&summary.severities),
            vec![("Moderate", 2), ("Severe", 1), ("Minor", 1)]
        );
    }

    #[test]
    fn test_hazard_counts_sum_to_total() {
        let items: Vec<_> = (0..17)
            .map(|i| record(["A", "B", "C"][i % 3], "Unknown", &["US"]))
            .collect();
        let summary = summarize(&items, "t".into());
        let sum: usize = summary.hazards.iter().map(|c| c.count).sum();
        assert_eq!(sum, items.len());
        assert_eq!(summary.total, items.len());
    }

    #[test]
    fn test_duplicate_states_count_once_per_record() {
        let items = vec![record("X", "Unknown", &["CO", "CO"]), record("Y", "Unknown", &[])];
        let summary = summarize(&items, "t".into());
        assert_eq!(names(&summary.states), vec![("CO", 1), ("US", 1)]);
    }

    #[test]
    fn test_empty_batch() {
        let summary = summarize(&[], "t".into());
        assert_eq!(summary.total, 0);
        assert!(summary.hazards.is_empty());
    }

    #[test]
    fn test_air_quality_stats() {
        let cities = vec![
            city(Some(50)),
            city(Some(51)),
            city(Some(150)),
            city(Some(151)),
            city(Some(300)),
            city(Some(301)),
            city(None),
        ];
        let summary = summarize_air_quality(&cities, "t".into());
        assert_eq!(summary.total_cities, 6);
        assert_eq!(summary.min_aqi, Some(50));
        assert_eq!(summary.max_aqi, Some(301));
        // (50 + 51 + 150 + 151 + 300 + 301) / 6 = 167.17
        assert_eq!(summary.average_aqi, Some(167));
        assert_eq!(
            summary.level_counts,
            LevelCounts {
                good: 1,
                moderate: 1,
                unhealthy_sensitive: 1,
                unhealthy: 1,
                very_unhealthy: 1,
                hazardous: 1,
            }
        );
    }

    #[test]
    fn test_air_quality_without_values() {
        let summary = summarize_air_quality(&[city(None)], "t".into());
        assert_eq!(summary.total_cities, 0);
        assert_eq!(summary.average_aqi, None);
        assert_eq!(summary.max_aqi, None);
        assert_eq!(summary.level_counts, LevelCounts::default());
    }
}
