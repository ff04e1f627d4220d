//! Input loading: a document path or inline JSON text to a JSON tree.

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Load an OpenAPI document.
///
/// `input` is either inline JSON (first non-blank character `{`) or a path.
/// Paths ending in `.yaml`/`.yml` are read as YAML, anything else as JSON.
pub fn load_document(input: &str) -> Result<serde_json::Value> {
    if input.trim_start().starts_with('{') {
        debug!("Loading inline OpenAPI document.");
        return Ok(serde_json::from_str(input)?);
    }

    let path = Path::new(input);
    let text = std::fs::read_to_string(path).map_err(|err| Error::fs("read", path, err))?;
    debug!(path = %path.display(), bytes = text.len(), "Loaded OpenAPI document.");

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            Ok(serde_yaml::from_str(&text)?)
        }
        _ => Ok(serde_json::from_str(&text)?),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_inline_json() {
        let value = load_document(r#"  { "openapi": "3.0.0" }"#).unwrap();
        assert_eq!(value["openapi"], "3.0.0");
    }

    #[test]
    fn test_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api.yml");
        std::fs::write(&path, "openapi: 3.0.1\ninfo:\n  title: Pets\n  version: v2\n").unwrap();
        let value = load_document(path.to_str().unwrap()).unwrap();
        assert_eq!(value["openapi"], "3.0.1");
        assert_eq!(value["info"]["version"], "v2");
    }

    #[test]
    fn test_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api.json");
        std::fs::write(&path, r#"{ "openapi": "3.1.0", "paths": {} }"#).unwrap();
        let value = load_document(path.to_str().unwrap()).unwrap();
        assert_eq!(value["openapi"], "3.1.0");
    }

    #[test]
    fn test_missing_file() {
        let err = load_document("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Fs { action: "read", .. }));
    }
}
