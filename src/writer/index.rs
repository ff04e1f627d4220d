//! `index.ts`: re-exports every enabled category.

use std::path::Path;

use serde::Serialize;

use crate::config::Options;
use crate::error::Result;
use crate::openapi::ir::Client;

use super::Emitter;
use super::models::is_runtime_enum;
use super::render::Artifact;

/// Index file name, written directly below the output directory.
pub const INDEX_FILE: &str = "index.ts";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexModel<'a> {
    name: &'a str,
    is_enum: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexService<'a> {
    name: &'a str,
    module: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexContext<'a> {
    export_core: bool,
    export_services: bool,
    export_models: bool,
    export_schemas: bool,
    precompile_validator: bool,
    variation: &'static str,
    models: Vec<IndexModel<'a>>,
    services: Vec<IndexService<'a>>,
}

/// Write `index.ts` into `output`, which must already exist.
pub fn write_index(
    emitter: &Emitter,
    output: &Path,
    client: &Client,
    options: &Options,
) -> Result<()> {
    let context = IndexContext {
        export_core: options.export_core,
        export_services: options.export_services,
        export_models: options.export_models,
        export_schemas: options.export_schemas,
        precompile_validator: options.precompile_validator,
        variation: options.variation.as_str(),
        models: client
            .models
            .iter()
            .map(|m| IndexModel {
                name: &m.name,
                is_enum: is_runtime_enum(m, options.use_union_types),
            })
            .collect(),
        services: client
            .services
            .iter()
            .map(|s| IndexService {
                name: &s.name,
                module: format!("{}Service", s.name),
            })
            .collect(),
    };
    let text = emitter.render_formatted(Artifact::Index, &context)?;
    emitter.fs().write_file(&output.join(INDEX_FILE), &text)
}
