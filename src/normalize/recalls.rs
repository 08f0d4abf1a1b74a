//! Food recall normalization.
//!
//! Input is one openFDA food enforcement report. The recall number (or the
//! enforcement event id) is required. Distribution patterns are free text
//! such as `"CA, NV, AZ"` or `"Nationwide"`, so areas split on both `;` and
//! `,` before state extraction.

use super::{UNKNOWN_SEVERITY, non_blank, prefix_chars, typed};
use crate::error::ParseError;
use crate::models::{NormalizedRecord, RawRecall};
use crate::utils::{extract_states, normalize_timestamp, slugify, split_areas};
use serde_json::Value;

const KIND: &str = "recall";

/// Provenance tag for openFDA enforcement reports.
pub const SOURCE_TAG: &str = "openfda";

/// Map one openFDA enforcement report to a [`NormalizedRecord`].
///
/// # Arguments
///
/// * `value` - One element of the openFDA `results` array
/// * `source` - Provenance tag stamped on the record
///
/// # Returns
///
/// The canonical record, with `YYYYMMDD` dates rewritten as `YYYY-MM-DD`
/// and the brand resolved from `brand_name`, the harmonized `openfda`
/// block, or the recalling firm, in that order. Fails with a
/// [`ParseError`] when neither a recall number nor an event id is present.
pub fn normalize_recall(value: Value, source: &str) -> Result<NormalizedRecord, ParseError> {
    let raw: RawRecall = typed(KIND, value)?;

    let recall_number = non_blank(raw.recall_number)
        .or_else(|| non_blank(raw.event_id))
        .ok_or_else(|| ParseError::new(KIND, "missing recall_number and event_id"))?;

    let brand = non_blank(raw.brand_name)
        .or_else(|| non_blank(raw.openfda.brand_name.into_iter().next()))
        .or_else(|| non_blank(raw.recalling_firm))
        .unwrap_or_else(|| "Unknown".to_string());
    let product = raw
        .product_description
        .unwrap_or_default()
        .trim()
        .to_string();
    let reason = non_blank(raw.reason_for_recall);

    let title = if product.is_empty() {
        format!("{brand} recall")
    } else {
        prefix_chars(&product, 100).trim_end().to_string()
    };
    let id = slugify(&format!(
        "{recall_number}-{brand}-{}",
        prefix_chars(&product, 50)
    ));

    let areas = split_areas(
        raw.distribution_pattern.as_deref().unwrap_or_default(),
        &[';', ','],
    );
    let states = extract_states(&areas);

    Ok(NormalizedRecord {
        id,
        title,
        category: non_blank(raw.product_type).unwrap_or_else(|| "Food".to_string()),
        hazard: reason.clone().unwrap_or_else(|| "Unspecified".to_string()),
        severity: non_blank(raw.classification).unwrap_or_else(|| UNKNOWN_SEVERITY.to_string()),
        status: non_blank(raw.status),
        areas,
        states,
        effective: None,
        expires: None,
        initiation: normalize_timestamp(raw.recall_initiation_date.as_deref()),
        reported: normalize_timestamp(raw.report_date.as_deref()),
        description: reason.unwrap_or_default(),
        instruction: None,
        url: non_blank(raw.url),
        brand: Some(brand),
        product: Some(product),
        source: source.to_string(),
    })
}
