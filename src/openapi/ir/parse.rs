//! Client assembly.

use tracing::debug;

use crate::error::Result;
use crate::openapi::spec::Document;

use super::models::get_models;
use super::operations::OperationContext;
use super::services::get_services;
use super::types::Client;

/// Service version: `info.version` without a leading `v`.
pub fn service_version(version: &str) -> String {
    version
        .strip_prefix(['v', 'V'])
        .unwrap_or(version)
        .to_string()
}

/// Base URL of the first server, with variables substituted by their defaults
/// and no trailing slash.
pub fn server_url(doc: &Document) -> String {
    let Some(server) = doc.servers.first() else {
        return String::new();
    };
    let mut url = server.url.clone();
    for (name, variable) in &server.variables {
        url = url.replace(&format!("{{{name}}}"), &variable.default);
    }
    url.trim_end_matches('/').to_string()
}

/// Build the client IR from a document. Performs no I/O.
///
/// Synthesized models still carry provisional names; run
/// [`post_process_client`](super::post_process_client) before rendering.
pub fn parse(doc: &Document, response_schema_as_model: bool) -> Result<Client> {
    let version = service_version(&doc.info.version);
    let server = server_url(doc);
    let set = get_models(doc, response_schema_as_model)?;
    let (services, hoisted) = get_services(OperationContext {
        doc,
        promoted: &set.promoted,
    });

    let mut models = set.models;
    models.extend(hoisted);

    debug!(
        models = models.len(),
        services = services.len(),
        version = %version,
        "Parsed OpenAPI document."
    );
    Ok(Client {
        version,
        server,
        models,
        services,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_service_version() {
        assert_eq!(service_version("v1.2.0"), "1.2.0");
        assert_eq!(service_version("V2"), "2");
        assert_eq!(service_version("1.0"), "1.0");
    }

    #[test]
    fn test_server_url_substitutes_variables() {
        let doc: Document = serde_json::from_str(
            r#"{
                "openapi": "3.0.0",
                "servers": [
                    { "url": "https://{region}.example.com/{base}/", "variables": {
                        "region": { "default": "eu" },
                        "base": { "default": "api" }
                    } },
                    { "url": "https://ignored.example.com" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(server_url(&doc), "https://eu.example.com/api");
    }

    #[test]
    fn test_parse_assembles_client() {
        let doc: Document = serde_json::from_str(
            r##"{
                "openapi": "3.0.0",
                "info": { "title": "Pets", "version": "v3" },
                "paths": { "/pets": { "get": {
                    "responses": { "200": { "description": "ok", "content": { "application/json": {
                        "schema": { "type": "object", "properties": { "total": { "type": "integer" } } }
                    } } } }
                } } },
                "components": { "schemas": { "Pet": { "type": "string" } } }
            }"##,
        )
        .unwrap();
        let client = parse(&doc, true).unwrap();
        assert_eq!(client.version, "3");
        assert_eq!(client.server, "");
        assert_eq!(client.models.len(), 2);
        assert_eq!(client.models[0].name, "Pet");
        assert!(client.models[1].is_provisional());
        assert_eq!(client.services.len(), 1);
    }
}
