//! Mapping of raw upstream records into canonical records.
//!
//! Each domain module exposes a pure `normalize_*` function taking one raw
//! [`Value`] to one canonical record or a [`ParseError`]. The id it sets is
//! the deterministic slug of the record's source identifiers;
//! [`normalize_batch`] then makes ids unique across the batch.
//!
//! # Submodules
//!
//! - [`alerts`]: api.weather.gov GeoJSON features
//! - [`recalls`]: openFDA food enforcement reports
//! - [`air_quality`]: AirNow observations per city
//!
//! # Skipping
//!
//! A record that fails to deserialize or lacks its identifying field is
//! logged and dropped. It never aborts the batch.

pub mod air_quality;
pub mod alerts;
pub mod recalls;

use crate::error::ParseError;
use crate::models::{CityAirQuality, NormalizedRecord};
use crate::utils::slugify;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{info, warn};

/// Severity used when the upstream record carries none.
pub const UNKNOWN_SEVERITY: &str = "Unknown";

/// Records whose id can be rewritten during collision resolution.
pub trait Identified {
    fn id_mut(&mut self) -> &mut String;
}

impl Identified for NormalizedRecord {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

impl Identified for CityAirQuality {
    fn id_mut(&mut self) -> &mut String {
        &mut self.id
    }
}

/// Normalize a batch, dropping records that fail and deduplicating ids.
pub fn normalize_batch<T, F>(raw: Vec<Value>, mut normalize: F) -> Vec<T>
where
    T: Identified,
    F: FnMut(Value) -> Result<T, ParseError>,
{
    let total = raw.len();
    let mut records: Vec<T> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match normalize(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "Skipping record");
                None
            }
        })
        .collect();

    let mut ids = IdAllocator::default();
    for record in records.iter_mut() {
        let id = ids.allocate(record.id_mut());
        *record.id_mut() = id;
    }

    info!(
        total,
        kept = records.len(),
        skipped = total - records.len(),
        "Normalized batch"
    );
    records
}

/// Hands out ids unique within one batch.
///
/// A slug is used as-is the first time it is seen. An empty slug is
/// replaced by a random token and a repeated one gets a random suffix; this
/// is the only place normalization is not deterministic.
#[derive(Debug, Default)]
pub struct IdAllocator {
    seen: HashSet<String>,
}

impl IdAllocator {
    pub fn allocate(&mut self, candidate: &str) -> String {
        let slug = slugify(candidate);
        let mut id = slug.clone();
        while id.is_empty() || self.seen.contains(&id) {
            id = if slug.is_empty() {
                random_token()
            } else {
                format!("{slug}-{}", random_token())
            };
        }
        self.seen.insert(id.clone());
        id
    }
}

fn random_token() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Deserialize a raw value into its typed view, reporting failures as a
/// [`ParseError`] of the given kind.
pub(crate) fn typed<T: serde::de::DeserializeOwned>(
    kind: &'static str,
    value: Value,
) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|e| ParseError::new(kind, e.to_string()))
}

/// `Some` only for strings with non-whitespace content, trimmed.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First `max` characters of `s`.
pub(crate) fn prefix_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
