//! Where raw records come from.
//!
//! The pipeline never generates data itself; it asks a [`DataSource`].
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | Live APIs | [`live`] | api.weather.gov, openFDA, AirNow (needs a key) |
//! | Simulated | [`simulated`] | Canned alerts and recalls, seeded random AQI |
//!
//! Both return AirNow/NWS/openFDA-shaped JSON so the normalizers cannot tell
//! them apart; only [`RawBatch::source`] records the difference.

pub mod live;
pub mod simulated;

use crate::config::City;
use crate::error::FetchError;
use serde_json::Value;

pub use live::LiveSource;
pub use simulated::SimulatedSource;

/// Raw records plus the provenance tag the normalizer should stamp on them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBatch {
    pub source: &'static str,
    pub records: Vec<Value>,
}

pub trait DataSource {
    /// Active weather alerts as GeoJSON features.
    async fn weather_alerts(&self) -> Result<RawBatch, FetchError>;

    /// Food enforcement reports.
    async fn food_recalls(&self) -> Result<RawBatch, FetchError>;

    /// One reading per city that produced observations.
    async fn air_quality(&self, cities: &[City]) -> Result<RawBatch, FetchError>;
}
