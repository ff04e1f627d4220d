#![forbid(unsafe_code)]
#![deny(warnings, unused_must_use, dead_code, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Generate typed TypeScript HTTP clients from OpenAPI v3 documents.
//!
//! The pipeline is:
//! 1. Load: JSON/YAML file or inline JSON -> `serde_json::Value`
//! 2. Detect: reject anything that is not OpenAPI 3.x
//! 3. Parse: `Document` -> `Client` IR (models and services)
//! 4. Post-process: final model names, dedup, sorting
//! 5. Write: per-category destroy-then-create emission, index last

pub mod config;
pub mod error;
pub mod loader;
pub mod openapi;
pub mod writer;

use tracing::info;

pub use config::{HttpClient, Options, Variation};
pub use error::{Error, Result};
pub use openapi::ir::Client;
pub use writer::Emitter;

use openapi::ir::{parse, post_process_client};
use openapi::spec::Document;

/// Build the client IR from an in-memory document and, when
/// `options.write` is set, write it below `options.output`.
///
/// Returns the post-processed client.
pub fn generate(input: &serde_json::Value, options: &Options) -> Result<Client> {
    let emitter = Emitter::from_cwd()?;
    generate_with(&emitter, input, options)
}

/// Load `input` (a `.json`/`.yaml`/`.yml` path, or inline JSON) and generate.
pub fn generate_from_path(input: &str, options: &Options) -> Result<Client> {
    let document = loader::load_document(input)?;
    generate(&document, options)
}

/// Same as [`generate`] with an explicit emitter, so the working directory,
/// renderer, formatter and filesystem can be substituted.
pub fn generate_with(
    emitter: &Emitter,
    input: &serde_json::Value,
    options: &Options,
) -> Result<Client> {
    openapi::detect_version(input)?;
    let document = Document::from_value(input.clone())?;
    let client = post_process_client(parse(&document, options.response_schema_as_model)?)?;

    if !options.write {
        info!(
            models = client.models.len(),
            services = client.services.len(),
            "Dry run, nothing written."
        );
        return Ok(client);
    }

    emitter.write_client(&client, options)?;
    info!(
        output = %options.output.display(),
        models = client.models.len(),
        services = client.services.len(),
        "Generated client."
    );
    Ok(client)
}
