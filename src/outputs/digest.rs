//! Weekly safety digest.
//!
//! Summaries are built from the documents the data commands wrote and fed
//! through [`render`](crate::templates::render). A missing document yields
//! a "no data" line instead of failing.

use crate::error::TemplateError;
use crate::models::{AirQualityReport, Count, RecordBatch};
use crate::templates::{Bindings, render};
use chrono::{Datelike, NaiveDate};

pub const WEEKLY_TEMPLATE: &str = "\
# Your Weekly Safety Update - {{date}}

Here's your weekly safety update for {{week_of}}:

## Weather alerts this week
{{weather_alerts_summary}}

## Air quality report
{{air_quality_summary}}

## New product recalls
{{recalls_summary}}

## Safety tip of the week
{{safety_tip}}

---

Stay safe,
AlertsAnalytics Team
";

const SAFETY_TIPS: [&str; 6] = [
    "Keep a battery-powered weather radio and spare batteries where you can find them in the dark.",
    "Check the AQI before outdoor exercise; sensitive groups should limit exertion above 100.",
    "Register your appliances and check the recall list before buying groceries in bulk.",
    "Build a 72-hour kit: water, non-perishable food, medications, flashlight and copies of documents.",
    "Never drive through flooded roads. Six inches of moving water can knock you off your feet.",
    "During heat advisories, check on elderly neighbors and never leave children or pets in cars.",
];

fn top(counts: &[Count], n: usize) -> String {
    counts
        .iter()
        .take(n)
        .map(|c| format!("{} ({})", c.name, c.count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn alerts_summary(alerts: Option<&RecordBatch>) -> String {
    match alerts {
        Some(batch) if batch.summary.total > 0 => format!(
            "{} active alerts. Most common: {}. Most affected states: {}.",
            batch.summary.total,
            top(&batch.summary.hazards, 3),
            top(&batch.summary.states, 5),
        ),
        Some(_) => "No active weather alerts.".to_string(),
        None => "Weather alert data is not available yet.".to_string(),
    }
}

fn recalls_summary(recalls: Option<&RecordBatch>) -> String {
    match recalls {
        Some(batch) if batch.summary.total > 0 => {
            let mut lines = vec![format!(
                "{} recalls on file. Leading reasons: {}.",
                batch.summary.total,
                top(&batch.summary.hazards, 3),
            )];
            lines.extend(batch.items.iter().take(3).map(|r| {
                format!("- {} ({})", r.title, r.severity)
            }));
            lines.join("\n")
        }
        Some(_) => "No new product recalls.".to_string(),
        None => "Recall data is not available yet.".to_string(),
    }
}

fn air_quality_summary(report: Option<&AirQualityReport>) -> String {
    let Some(report) = report else {
        return "Air quality data is not available yet.".to_string();
    };
    let s = &report.summary;
    match (s.average_aqi, s.max_aqi) {
        (Some(avg), Some(max)) => {
            let worst = report
                .cities
                .iter()
                .filter(|c| c.aqi == Some(max))
                .map(|c| format!("{}, {}", c.city, c.state))
                .next()
                .unwrap_or_default();
            format!(
                "{} cities reporting. Average AQI {avg}; highest {max} in {worst}. \
                 {} cities at Unhealthy or worse.",
                s.total_cities,
                s.level_counts.unhealthy + s.level_counts.very_unhealthy + s.level_counts.hazardous,
            )
        }
        _ => "No cities reported air quality readings.".to_string(),
    }
}

/// Bindings for [`WEEKLY_TEMPLATE`]. The tip rotates with the ISO week.
pub fn weekly_bindings(
    alerts: Option<&RecordBatch>,
    recalls: Option<&RecordBatch>,
    air_quality: Option<&AirQualityReport>,
    today: NaiveDate,
) -> Bindings {
    let week_start = today - chrono::Duration::days(i64::from(today.weekday().num_days_from_monday()));
    let tip = SAFETY_TIPS[today.iso_week().week() as usize % SAFETY_TIPS.len()];

    [
        ("date", today.format("%B %-d, %Y").to_string()),
        ("week_of", format!("the week of {}", week_start.format("%B %-d, %Y"))),
        ("weather_alerts_summary", alerts_summary(alerts)),
        ("air_quality_summary", air_quality_summary(air_quality)),
        ("recalls_summary", recalls_summary(recalls)),
        ("safety_tip", tip.to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

pub fn render_weekly(
    alerts: Option<&RecordBatch>,
    recalls: Option<&RecordBatch>,
    air_quality: Option<&AirQualityReport>,
    today: NaiveDate,
) -> Result<String, TemplateError> {
    render(
        WEEKLY_TEMPLATE,
        &weekly_bindings(alerts, recalls, air_quality, today),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AirQualitySummary, LevelCounts, Summary};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    #[test]
    fn test_template_placeholders_all_bound() {
        let out = render_weekly(None, None, None, today()).unwrap();
        assert!(out.starts_with("# Your Weekly Safety Update - January 10, 2025"));
        assert!(out.contains("the week of January 6, 2025"));
        assert!(out.contains("Weather alert data is not available yet."));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn test_alert_summary_lists_top_counts() {
        let batch = RecordBatch {
            items: vec![],
            summary: Summary {
                fetched_at: "t".into(),
                total: 3,
                hazards: vec![
                    Count { name: "Heat Advisory".into(), count: 2 },
                    Count { name: "Flood Watch".into(), count: 1 },
                ],
                states: vec![Count { name: "AZ".into(), count: 2 }],
                severities: vec![],
            },
        };
        assert_eq!(
            alerts_summary(Some(&batch)),
            "3 active alerts. Most common: Heat Advisory (2), Flood Watch (1). Most affected states: AZ (2)."
        );
    }

    #[test]
    fn test_air_quality_without_readings() {
        let report = AirQualityReport {
            summary: AirQualitySummary {
                fetched_at: "t".into(),
                total_cities: 0,
                average_aqi: None,
                max_aqi: None,
                min_aqi: None,
                level_counts: LevelCounts::default(),
            },
            cities: vec![],
        };
        assert_eq!(
            air_quality_summary(Some(&report)),
            "No cities reported air quality readings."
        );
    }
}
