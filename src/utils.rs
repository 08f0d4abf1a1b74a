//! Utility functions for string derivation, timestamps, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Slugification for record ids and site URLs
//! - Area splitting and two-letter state code extraction
//! - Timestamp normalization to ISO-8601
//! - String truncation for logging
//! - File system validation for output directories

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Sentinel state used when no two-letter code can be parsed from an area.
pub const NATIONWIDE: &str = "US";

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static STATE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());

/// Convert free text into a URL-safe, lowercase, hyphenated token.
///
/// Runs of anything outside `[a-z0-9]` (after lowercasing) collapse to a
/// single hyphen, and leading/trailing hyphens are stripped. Applying it
/// twice gives the same result as applying it once.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Winter Storm Warning"), "winter-storm-warning");
/// assert_eq!(slugify("  F-0123-2024 / Acme "), "f-0123-2024-acme");
/// ```
pub fn slugify(s: &str) -> String {
    let lowered = s.to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Split an area description into trimmed, non-empty segments.
///
/// `delimiters` lists the separator characters; weather alerts use `;`
/// only, recall distribution patterns use both `;` and `,`.
pub fn split_areas(desc: &str, delimiters: &[char]) -> Vec<String> {
    desc.split(|c: char| delimiters.contains(&c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collect the two-letter state codes mentioned in `areas`.
///
/// Each area is split on commas and every token that is exactly two
/// uppercase ASCII letters counts, which covers both `"Fort Collins, CO"`
/// and a bare `"CO"`. Codes are unique, in first-seen order. When nothing
/// matches the result is the single sentinel [`NATIONWIDE`].
pub fn extract_states<S: AsRef<str>>(areas: &[S]) -> Vec<String> {
    let states: Vec<String> = areas
        .iter()
        .flat_map(|area| area.as_ref().split(',').map(str::trim))
        .filter(|token| STATE_CODE.is_match(token))
        .map(str::to_string)
        .unique()
        .collect();

    if states.is_empty() {
        vec![NATIONWIDE.to_string()]
    } else {
        states
    }
}

/// Normalize an upstream timestamp into an ISO-8601 string.
///
/// RFC 3339 values are kept verbatim, openFDA's compact `YYYYMMDD` dates
/// become `YYYY-MM-DD`. Blank or unrecognized values yield `None`.
pub fn normalize_timestamp(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if DateTime::parse_from_rfc3339(raw).is_ok() {
        return Some(raw.to_string());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y%m%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok() {
        return Some(raw.to_string());
    }
    tracing::debug!(raw, "Unrecognized timestamp format");
    None
}

/// Current UTC time as an RFC 3339 string with second precision.
pub fn now_rfc3339() -> String {
    format_rfc3339(Utc::now())
}

pub fn format_rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary)
/// with an ellipsis and byte count appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes an empty marker file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path).await?;
    let marker = path.join("..__write_check__");
    fs::write(&marker, b"").await?;
    let _ = fs::remove_file(&marker).await;
    info!("Output directory is writable");
    Ok(())
}
