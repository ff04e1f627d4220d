//! Post-processing of the assembled client.
//!
//! Naming policy:
//! - Names of component schemas and promoted responses are fixed. Two of
//!   them resolving to the same identifier is a `NameCollision` error.
//! - Synthesized models get `PascalCase(naming path)`. If that name is taken,
//!   a numeric suffix starting at 2 is appended. Every reference is rewritten
//!   to the final name.
//! - Duplicate operation names within a service get the same numeric suffix.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::error::{Error, Result};

use super::models::synthesized_name;
use super::types::{Client, Model, ModelKind, ModelOrigin};
use super::utils::{capitalize_first, unique_name};

/// Give every synthesized model its final name. Returns provisional -> final.
fn assign_model_names(models: &mut [Model]) -> Result<HashMap<String, String>> {
    let mut taken: HashSet<String> = HashSet::new();
    for model in models.iter().filter(|m| !m.is_provisional()) {
        if !taken.insert(model.name.clone()) {
            return Err(Error::NameCollision {
                name: model.name.clone(),
                origin: model.origin.to_string(),
            });
        }
    }

    let mut renames = HashMap::new();
    for model in models.iter_mut().filter(|m| m.is_provisional()) {
        let base = match &model.origin {
            ModelOrigin::Synthesized { segments } => synthesized_name(segments),
            _ => synthesized_name(std::slice::from_ref(&model.name)),
        };
        let name = unique_name(&base, &taken);
        if name != base {
            debug!(model = %base, renamed = %name, "Renamed colliding synthesized model.");
        }
        taken.insert(name.clone());
        renames.insert(std::mem::replace(&mut model.name, name.clone()), name);
    }
    Ok(renames)
}

fn rewrite_references(model: &mut Model, renames: &HashMap<String, String>) {
    model.walk_mut(&mut |m| {
        if m.kind == ModelKind::Reference
            && let Some(name) = renames.get(&m.base)
        {
            m.base.clone_from(name);
        }
    });
}

/// Enforce unique model names, rewrite references, dedupe operation names and
/// sort models and services by name.
pub fn post_process_client(mut client: Client) -> Result<Client> {
    let renames = assign_model_names(&mut client.models)?;

    for model in &mut client.models {
        rewrite_references(model, &renames);
        model.refresh_imports();
    }

    for service in &mut client.services {
        let mut seen: HashSet<String> = HashSet::new();
        for operation in &mut service.operations {
            for model in operation.models_mut() {
                rewrite_references(model, &renames);
            }
            operation.refresh_imports();

            let name = unique_name(&operation.name, &seen);
            if name != operation.name {
                operation.hook_name = format!("use{}", capitalize_first(&name));
                operation.name = name;
            }
            seen.insert(operation.name.clone());
        }
        let imports: BTreeSet<String> = service
            .operations
            .iter()
            .flat_map(|o| o.imports.iter().cloned())
            .collect();
        service.imports = imports.into_iter().collect();
    }

    client.models.sort_by(|a, b| a.name.cmp(&b.name));
    client.services.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(client)
}
