//! OpenAPI document model and the client IR built from it.
//!
//! - `spec`: typed view of an OpenAPI 3.x document
//! - `ir`: normalized `Client` (models and services) the writer renders

pub mod ir;
pub mod spec;

use tracing::debug;

use crate::error::{Error, Result};

/// Check the declared OpenAPI version on the raw document tree.
///
/// Swagger 2.0 documents and anything that is not 3.x are rejected before
/// typed decoding is attempted.
pub fn detect_version(document: &serde_json::Value) -> Result<()> {
    let declared = document
        .get("openapi")
        .or_else(|| document.get("swagger"))
        .map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();

    match declared.split('.').next().map(str::trim) {
        Some("2") => Err(Error::SwaggerV2),
        Some("3") => {
            debug!(version = %declared, "Detected OpenAPI version.");
            Ok(())
        }
        _ => Err(Error::UnsupportedVersion(declared)),
    }
}
