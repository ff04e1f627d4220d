//! The `core` category: request runtime shared by every service.

use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::config::{Options, Variation};
use crate::error::Result;
use crate::openapi::ir::Client;

use super::render::Artifact;
use super::typescript::escape_js_string;
use super::{CategoryDir, Emitter};

/// File the request override replaces.
pub const REQUEST_FILE: &str = "request.ts";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CoreContext {
    http_client: &'static str,
    variation: &'static str,
    server: String,
    version: String,
    runtime_validation: bool,
    throw_on_request_failed: bool,
    verbose_http_log: bool,
}

/// Files of the `core` category for the given variation.
pub fn core_files(variation: Variation) -> Vec<(&'static str, Artifact)> {
    let mut files = vec![
        ("OpenAPI.ts", Artifact::Settings),
        ("ApiError.ts", Artifact::ApiError),
        ("ApiRequestOptions.ts", Artifact::ApiRequestOptions),
        ("ApiResult.ts", Artifact::ApiResult),
        (REQUEST_FILE, Artifact::Request),
    ];
    if variation == Variation::ReactHook {
        files.push(("requestReactHook.ts", Artifact::ReactHookRequest));
    }
    files
}

/// Render the core files, then copy `request_override` over `request.ts`.
pub fn write_core(
    emitter: &Emitter,
    dir: &CategoryDir<'_>,
    client: &Client,
    options: &Options,
    request_override: Option<&Path>,
) -> Result<()> {
    let context = CoreContext {
        http_client: options.http_client.as_str(),
        variation: options.variation.as_str(),
        server: escape_js_string(&client.server),
        version: escape_js_string(&client.version),
        runtime_validation: options.runtime_validation,
        throw_on_request_failed: options.throw_on_request_failed,
        verbose_http_log: options.verbose_http_log,
    };

    core_files(options.variation)
        .par_iter()
        .try_for_each(|(file, artifact)| dir.write(file, &emitter.render(*artifact, &context)?))?;

    if let Some(request) = request_override {
        dir.copy_over(request, REQUEST_FILE)?;
        debug!(request = %request.display(), "Replaced request core with override.");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::HttpClient;
    use crate::writer::fs::LocalFs;
    use tempfile::TempDir;

    fn client() -> Client {
        Client {
            version: "2.1".to_string(),
            server: "https://api.example.com".to_string(),
            models: Vec::new(),
            services: Vec::new(),
        }
    }

    fn write(options: &Options) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let emitter = Emitter::new(tmp.path()).unwrap();
        let dir = CategoryDir::acquire(&LocalFs, tmp.path().join("core")).unwrap();
        write_core(&emitter, &dir, &client(), options, None).unwrap();
        tmp
    }

    #[test]
    fn test_settings_carry_server_and_version() {
        let tmp = write(&Options::new("out"));
        let settings = std::fs::read_to_string(tmp.path().join("core/OpenAPI.ts")).unwrap();
        assert!(settings.contains("BASE: 'https://api.example.com'"));
        assert!(settings.contains("VERSION: '2.1'"));
        assert!(tmp.path().join("core/requestReactHook.ts").is_file());
    }

    #[test]
    fn test_fastify_has_no_react_hook_request() {
        let options = Options {
            variation: Variation::Fastify,
            ..Options::new("out")
        };
        let tmp = write(&options);
        assert!(tmp.path().join("core/request.ts").is_file());
        assert!(!tmp.path().join("core/requestReactHook.ts").exists());
    }

    #[test]
    fn test_http_client_flavor() {
        let node = Options {
            http_client: HttpClient::Node,
            ..Options::new("out")
        };
        let tmp = write(&node);
        let request = std::fs::read_to_string(tmp.path().join("core/request.ts")).unwrap();
        assert!(request.contains("from 'node-fetch'"));

        let tmp = write(&Options::new("out"));
        let request = std::fs::read_to_string(tmp.path().join("core/request.ts")).unwrap();
        assert!(!request.contains("node-fetch"));
        assert!(request.contains("export const request"));
    }
}
