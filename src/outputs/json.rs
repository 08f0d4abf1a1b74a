//! JSON and plain-file persistence.
//!
//! Every file is written to a `.tmp` sibling first and renamed into place,
//! so readers only ever see the previous complete document or the new one.
//! JSON is pretty-printed with two-space indentation and a trailing newline.

use crate::error::{PipelineError, WriteError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

/// Serialize `value` and atomically replace `path` with it.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), WriteError> {
    let mut json = serde_json::to_vec_pretty(value)?;
    json.push(b'\n');
    write_atomic(path, &json).await
}

/// Atomically replace `path` with `bytes`, creating parent directories.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| WriteError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let tmp = tmp_path(path);
    if let Err(source) = fs::write(&tmp, bytes).await {
        error!(path = %tmp.display(), error = %source, "Failed writing temp file");
        return Err(WriteError::Io { path: tmp, source });
    }
    if let Err(source) = fs::rename(&tmp, path).await {
        error!(path = %path.display(), error = %source, "Failed moving temp file into place");
        let _ = fs::remove_file(&tmp).await;
        return Err(WriteError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    info!(path = %path.display(), bytes = bytes.len(), "Wrote file");
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read a previously written JSON document. A missing file is `Ok(None)`.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PipelineError> {
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Input file not found; treating as empty");
            return Ok(None);
        }
        Err(source) => {
            return Err(PipelineError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|source| PipelineError::Input {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_write_json_pretty_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        write_json(&path, &json!({ "a": [1, 2] })).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1,\n    2\n  ]\n}\n");
        assert!(!tmp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_write_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &json!([1])).await.unwrap();
        write_json(&path, &json!([2])).await.unwrap();

        let back: Option<Value> = read_json(&path).await.unwrap();
        assert_eq!(back, Some(json!([2])));
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let back: Option<Value> = read_json(&dir.path().join("nope.json")).await.unwrap();
        assert!(back.is_none());
    }

    #[tokio::test]
    async fn test_read_malformed_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_json::<Value>(&path).await.unwrap_err();
        assert!(matches!(err, PipelineError::Input { .. }));
    }

    #[test]
    fn test_tmp_path_is_sibling() {
        assert_eq!(
            tmp_path(Path::new("data/alerts.json")),
            PathBuf::from("data/alerts.json.tmp")
        );
    }
}
