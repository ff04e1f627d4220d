//! The `schemas` category: a JSON Schema constant per model.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::openapi::ir::Model;

use super::render::Artifact;
use super::schema::definition_schema;
use super::{CategoryDir, Emitter};

#[derive(Debug, Serialize)]
struct SchemaContext<'a> {
    name: &'a str,
    schema: String,
}

/// Render a model's schema as pretty JSON.
pub fn schema_source(model: &Model) -> Result<String> {
    Ok(serde_json::to_string_pretty(&definition_schema(model))?)
}

/// Write `schemas/${Name}.ts` for every model.
pub fn write_schemas(emitter: &Emitter, dir: &CategoryDir<'_>, models: &[Model]) -> Result<()> {
    models.par_iter().try_for_each(|model| {
        let context = SchemaContext {
            name: &model.name,
            schema: schema_source(model)?,
        };
        dir.write(
            &format!("${}.ts", model.name),
            &emitter.render(Artifact::Schema, &context)?,
        )
    })
}
