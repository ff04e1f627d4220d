//! The `validators` category: precompiled response validators.
//!
//! Two phases. First a CommonJS schema module per model plus a generator
//! script are written into the category directory. Then the generator runs
//! in a child process that emits one standalone validator per model next to
//! them. The schema modules and the generator are removed afterwards on
//! every path, including failures.

use std::path::PathBuf;
use std::process::Command;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Options;
use crate::error::{Error, Result};
use crate::openapi::ir::Model;

use super::render::Artifact;
use super::schemas::schema_source;
use super::{CategoryDir, Emitter};

/// Generator script name.
pub const GENERATOR_FILE: &str = "$$generator.js";

/// Ephemeral schema module name for a model.
pub fn schema_file(model: &Model) -> String {
    format!("${}.js", model.name)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SchemaContext<'a> {
    name: &'a str,
    schema: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeneratorModel<'a> {
    name: &'a str,
    schema_file: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeneratorContext<'a> {
    models: Vec<GeneratorModel<'a>>,
    http_client: &'static str,
    use_union_types: bool,
}

/// Files removed from the category directory when dropped.
#[derive(Debug)]
struct Ephemeral<'a, 'd> {
    dir: &'a CategoryDir<'d>,
    files: Vec<String>,
}

impl Drop for Ephemeral<'_, '_> {
    fn drop(&mut self) {
        for file in &self.files {
            if let Err(err) = self.dir.remove(file) {
                warn!(file = %file, error = %err, "Failed to remove ephemeral validator file.");
            }
        }
        debug!(files = self.files.len(), "Removed ephemeral validator files.");
    }
}

/// Render the generator script for `models`.
pub fn generator_source(emitter: &Emitter, models: &[Model], options: &Options) -> Result<String> {
    let context = GeneratorContext {
        models: models
            .iter()
            .map(|m| GeneratorModel {
                name: &m.name,
                schema_file: schema_file(m),
            })
            .collect(),
        http_client: options.http_client.as_str(),
        use_union_types: options.use_union_types,
    };
    emitter.render(Artifact::ValidatorGenerator, &context)
}

fn resolve_runtime(program: &str) -> Result<PathBuf> {
    which::which(program).map_err(|source| Error::MissingExecutable {
        program: program.to_string(),
        source,
    })
}

/// Write the ephemeral inputs, run the generator and clean up.
pub fn write_validators(
    emitter: &Emitter,
    dir: &CategoryDir<'_>,
    models: &[Model],
    options: &Options,
) -> Result<()> {
    let runtime = resolve_runtime(&options.validator_runtime)?;

    let mut inputs: Vec<(String, String)> = models
        .par_iter()
        .map(|model| {
            let context = SchemaContext {
                name: &model.name,
                schema: schema_source(model)?,
            };
            Ok((
                schema_file(model),
                emitter.render(Artifact::ValidatorSchema, &context)?,
            ))
        })
        .collect::<Result<_>>()?;
    inputs.push((
        GENERATOR_FILE.to_string(),
        generator_source(emitter, models, options)?,
    ));

    let mut ephemeral = Ephemeral {
        dir,
        files: Vec::with_capacity(inputs.len()),
    };
    let written: Vec<(String, Result<()>)> = inputs
        .into_par_iter()
        .map(|(file, contents)| {
            let result = dir.write(&file, &contents);
            (file, result)
        })
        .collect();
    let mut first_error = None;
    for (file, result) in written {
        match result {
            Ok(()) => ephemeral.files.push(file),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }

    debug!(
        runtime = %runtime.display(),
        dir = %dir.path().display(),
        models = models.len(),
        "Running validator generator."
    );
    let status = Command::new(&runtime)
        .arg(GENERATOR_FILE)
        .current_dir(dir.path())
        .status()
        .map_err(|err| Error::fs("run", &runtime, err))?;

    if !status.success() {
        return Err(Error::ValidatorCompiler(status));
    }
    info!(models = models.len(), "Precompiled validators.");
    Ok(())
}
