//! Air Quality Index categories.
//!
//! The single source of truth for AQI thresholds. The normalizer, the
//! histogram in the aggregator, and the recommendation text all go through
//! [`AqiCategory::from_aqi`], so they can never disagree about where a
//! boundary value lands. Boundaries belong to the lower category.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_aqi(aqi: u32) -> Self {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn level(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            AqiCategory::Good => "green",
            AqiCategory::Moderate => "yellow",
            AqiCategory::UnhealthyForSensitiveGroups => "orange",
            AqiCategory::Unhealthy => "red",
            AqiCategory::VeryUnhealthy => "purple",
            AqiCategory::Hazardous => "maroon",
        }
    }

    /// Short public-health guidance shown next to a reading.
    pub fn recommendations(self) -> Vec<String> {
        let lines: &[&str] = match self {
            AqiCategory::Good => &[
                "Perfect day for outdoor activities",
                "Air quality is excellent",
            ],
            AqiCategory::Moderate => &[
                "Moderate air quality",
                "Sensitive individuals should consider limiting prolonged outdoor exertion",
            ],
            AqiCategory::UnhealthyForSensitiveGroups => &[
                "Unhealthy for sensitive groups",
                "Children, elderly, and people with respiratory conditions should limit outdoor activities",
            ],
            AqiCategory::Unhealthy => &[
                "Unhealthy air quality",
                "Everyone should avoid prolonged outdoor exertion",
            ],
            AqiCategory::VeryUnhealthy => &[
                "Very unhealthy air quality",
                "Everyone should avoid outdoor exertion; sensitive groups should stay indoors",
            ],
            AqiCategory::Hazardous => &[
                "Health warning of emergency conditions",
                "Everyone should remain indoors and keep activity levels low",
            ],
        };
        lines.iter().map(|s| s.to_string()).collect()
    }
}
