//! The `models` category: one module per definition.

use rayon::prelude::*;
use serde::Serialize;

use crate::config::Options;
use crate::error::Result;
use crate::openapi::ir::{Model, ModelKind};

use super::render::Artifact;
use super::services::doc_lines;
use super::typescript::{Emit, enum_key, literal, quote_if_needed};
use super::{CategoryDir, Emitter};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PropertyContext {
    key: String,
    optional: bool,
    readonly: bool,
    ts_type: String,
    doc: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberContext {
    key: String,
    value: String,
    doc: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelContext {
    name: String,
    kind: &'static str,
    imports: Vec<String>,
    doc: Vec<String>,
    ts_type: String,
    as_enum: bool,
    as_interface: bool,
    properties: Vec<PropertyContext>,
    members: Vec<MemberContext>,
    http_client: &'static str,
    use_union_types: bool,
}

/// True if the definition is emitted as a TypeScript `enum`, which is a
/// runtime value rather than a type only.
pub fn is_runtime_enum(model: &Model, use_union_types: bool) -> bool {
    !use_union_types
        && model.kind == ModelKind::Enum
        && !model.is_nullable
        && !model.enum_members.is_empty()
        && model
            .enum_members
            .iter()
            .all(|m| m.value.is_string() || m.value.is_number())
}

fn model_doc(model: &Model) -> Vec<String> {
    let mut doc = model.description.as_deref().map(doc_lines).unwrap_or_default();
    if model.deprecated {
        doc.push("@deprecated".to_string());
    }
    doc
}

fn model_context(model: &Model, options: &Options) -> ModelContext {
    let as_interface = model.kind == ModelKind::Interface
        && !model.properties.is_empty()
        && !model.is_nullable;

    ModelContext {
        name: model.name.clone(),
        kind: model.kind.as_str(),
        imports: model.imports.clone(),
        doc: model_doc(model),
        ts_type: model.emit(),
        as_enum: is_runtime_enum(model, options.use_union_types),
        as_interface,
        properties: model
            .properties
            .iter()
            .map(|p| PropertyContext {
                key: quote_if_needed(&p.name),
                optional: !p.is_required,
                readonly: p.is_read_only,
                ts_type: p.emit(),
                doc: model_doc(p),
            })
            .collect(),
        members: model
            .enum_members
            .iter()
            .map(|m| MemberContext {
                key: enum_key(&m.name),
                value: literal(&m.value),
                doc: m.description.as_deref().map(doc_lines).unwrap_or_default(),
            })
            .collect(),
        http_client: options.http_client.as_str(),
        use_union_types: options.use_union_types,
    }
}

/// Render and write one file per model.
pub fn write_models(
    emitter: &Emitter,
    dir: &CategoryDir<'_>,
    models: &[Model],
    options: &Options,
) -> Result<()> {
    models.par_iter().try_for_each(|model| {
        let context = model_context(model, options);
        dir.write(
            &format!("{}.ts", model.name),
            &emitter.render_formatted(Artifact::Model, &context)?,
        )
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::{parse, post_process_client};
    use crate::openapi::spec::Document;
    use crate::writer::fs::LocalFs;
    use tempfile::TempDir;

    const DOC: &str = r##"{
        "openapi": "3.0.0",
        "components": { "schemas": {
            "Pet": {
                "type": "object",
                "description": "A pet.",
                "required": ["id", "status"],
                "properties": {
                    "id": { "type": "integer", "readOnly": true },
                    "status": { "$ref": "#/components/schemas/Status" },
                    "tags": { "type": "array", "items": { "type": "string" } },
                    "owner-name": { "type": "string", "nullable": true },
                    "next": { "$ref": "#/components/schemas/Pet" }
                }
            },
            "Status": { "type": "string", "enum": ["available", "sold"], "x-enum-descriptions": ["Ready to go"] },
            "Ids": { "type": "array", "items": { "type": "integer" } }
        } }
    }"##;

    fn render(options: &Options) -> TempDir {
        let doc: Document = serde_json::from_str(DOC).unwrap();
        let client = post_process_client(parse(&doc, true).unwrap()).unwrap();
        let tmp = TempDir::new().unwrap();
        let emitter = Emitter::new(tmp.path()).unwrap();
        let dir = CategoryDir::acquire(&LocalFs, tmp.path().join("models")).unwrap();
        write_models(&emitter, &dir, &client.models, options).unwrap();
        tmp
    }

    fn read(tmp: &TempDir, file: &str) -> String {
        std::fs::read_to_string(tmp.path().join("models").join(file)).unwrap()
    }

    #[test]
    fn test_interface_model() {
        let tmp = render(&Options::new("out"));
        let pet = read(&tmp, "Pet.ts");
        assert!(pet.contains("import type { Status } from './Status';"));
        assert!(!pet.contains("from './Pet'"));
        assert!(pet.contains(" * A pet."));
        assert!(pet.contains("export type Pet = {"));
        assert!(pet.contains("    readonly id: number;"));
        assert!(pet.contains("    status: Status;"));
        assert!(pet.contains("    tags?: Array<string>;"));
        assert!(pet.contains("    'owner-name'?: (string | null);"));
        assert!(pet.contains("    next?: Pet;"));
    }

    #[test]
    fn test_enum_and_union_types() {
        let tmp = render(&Options::new("out"));
        let status = read(&tmp, "Status.ts");
        assert!(status.contains("export enum Status {"));
        assert!(status.contains("    AVAILABLE = 'available',"));
        assert!(status.contains("     * Ready to go"));

        let union = Options {
            use_union_types: true,
            ..Options::new("out")
        };
        let tmp = render(&union);
        assert!(read(&tmp, "Status.ts").contains("export type Status = ('available' | 'sold');"));
    }

    #[test]
    fn test_alias_model() {
        let tmp = render(&Options::new("out"));
        assert!(read(&tmp, "Ids.ts").contains("export type Ids = Array<number>;"));
    }
}
