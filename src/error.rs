//! Error taxonomy for the data pipeline.
//!
//! Errors are split by how the caller is expected to react:
//!
//! - [`FetchError`]: an upstream request failed. Fatal for required sources,
//!   triggers a fallback (simulated data or an unfiltered query) for others.
//! - [`ParseError`]: one raw record could not be normalized. The record is
//!   skipped, the batch continues.
//! - [`WriteError`]: the output could not be persisted. Always fatal.
//!
//! [`PipelineError`] wraps everything that can abort a run and is what
//! `main` ultimately reports.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while talking to an upstream API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no API key configured for {0}")]
    MissingApiKey(&'static str),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// The HTTP status code, when the failure was a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// A single raw record that could not be normalized.
#[derive(Debug, Error)]
#[error("malformed {kind} record: {reason}")]
pub struct ParseError {
    pub kind: &'static str,
    pub reason: String,
}

impl ParseError {
    pub fn new(kind: &'static str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

/// Failure while persisting an output file. Always fatal: a partial
/// document is never left behind, but the run stops.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build XML: {0}")]
    Xml(String),

    #[error("failed to build front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
}

/// Failure while rendering a text template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unbound template placeholders: {}", .0.join(", "))]
    Unbound(Vec<String>),
}

/// The configuration file could not be read or holds invalid values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config error: {0}")]
    Invalid(String),
}

/// Anything that aborts a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_status() {
        let err = FetchError::Status {
            status: 503,
            url: "https://api.fda.gov/food/enforcement.json".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(
            err.to_string(),
            "HTTP 503 from https://api.fda.gov/food/enforcement.json"
        );
        assert_eq!(FetchError::MissingApiKey("airnow").status(), None);
    }

    #[test]
    fn test_template_error_lists_keys() {
        let err = TemplateError::Unbound(vec!["date".into(), "first_name".into()]);
        assert_eq!(
            err.to_string(),
            "unbound template placeholders: date, first_name"
        );
    }

    #[test]
    fn test_pipeline_error_is_transparent() {
        let err: PipelineError = FetchError::MissingApiKey("airnow").into();
        assert_eq!(err.to_string(), "no API key configured for airnow");
    }
}
