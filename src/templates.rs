//! Placeholder substitution for text templates.
//!
//! Two placeholder forms are recognized: `{key}` and `{{ key }}` (inner
//! whitespace optional). Substitution is a single pass, so bound values
//! are never re-expanded.

use crate::error::TemplateError;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .unwrap()
});

pub type Bindings = HashMap<String, String>;

fn key<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

/// Keys referenced by `template`, in first-seen order.
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|caps| key(&caps).to_string())
        .unique()
        .collect()
}

/// Substitute every placeholder in `template`.
///
/// Fails with [`TemplateError::Unbound`] listing each missing key once if
/// any placeholder has no binding. Extra bindings are ignored.
pub fn render(template: &str, bindings: &Bindings) -> Result<String, TemplateError> {
    let missing: Vec<String> = placeholders(template)
        .into_iter()
        .filter(|k| !bindings.contains_key(k))
        .collect();
    if !missing.is_empty() {
        return Err(TemplateError::Unbound(missing));
    }

    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        bindings.get(key(caps)).cloned().unwrap_or_default()
    });
    Ok(rendered.into_owned())
}
