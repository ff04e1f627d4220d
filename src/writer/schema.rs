//! JSON Schema rendering of models, shared by the `schemas` and `validators`
//! categories.

use serde_json::{Map, Value, json};

use crate::openapi::ir::{Model, ModelKind};

fn primitive(base: &str) -> Value {
    match base {
        "string" | "integer" | "number" | "boolean" | "null" => json!({ "type": base }),
        _ => json!({}),
    }
}

fn body(model: &Model) -> Value {
    match model.kind {
        ModelKind::Reference => json!({ "$ref": model.base }),
        ModelKind::Primitive => primitive(&model.base),
        ModelKind::Enum => {
            let mut schema = primitive(&model.base);
            let values: Vec<Value> = model.enum_members.iter().map(|m| m.value.clone()).collect();
            if let Some(object) = schema.as_object_mut() {
                object.insert("enum".to_string(), Value::Array(values));
            }
            schema
        }
        ModelKind::Array => json!({
            "type": "array",
            "items": model.link.as_deref().map_or_else(|| json!({}), json_schema),
        }),
        ModelKind::Dictionary => json!({
            "type": "object",
            "additionalProperties": model.link.as_deref().map_or_else(|| json!({}), json_schema),
        }),
        ModelKind::Interface => {
            let properties: Map<String, Value> = model
                .properties
                .iter()
                .map(|p| (p.name.clone(), json_schema(p)))
                .collect();
            let required: Vec<&str> = model
                .properties
                .iter()
                .filter(|p| p.is_required)
                .map(|p| p.name.as_str())
                .collect();
            let mut schema = json!({ "type": "object", "properties": properties });
            if !required.is_empty()
                && let Some(object) = schema.as_object_mut()
            {
                object.insert("required".to_string(), json!(required));
            }
            schema
        }
        ModelKind::OneOf | ModelKind::AnyOf | ModelKind::AllOf => {
            let keyword = match model.kind {
                ModelKind::OneOf => "oneOf",
                ModelKind::AnyOf => "anyOf",
                _ => "allOf",
            };
            let members: Vec<Value> = model.properties.iter().map(json_schema).collect();
            let mut schema = Map::new();
            schema.insert(keyword.to_string(), Value::Array(members));
            Value::Object(schema)
        }
    }
}

/// JSON Schema for `model`, with named models referenced by `$ref: Name`.
pub fn json_schema(model: &Model) -> Value {
    let mut schema = body(model);
    if let Some(object) = schema.as_object_mut() {
        if let Ok(Value::Object(constraints)) = serde_json::to_value(&model.constraints) {
            object.extend(constraints);
        }
        if let Some(description) = &model.description {
            object.insert("description".to_string(), json!(description));
        }
        if model.is_read_only {
            object.insert("readOnly".to_string(), json!(true));
        }
    }

    if model.is_nullable {
        json!({ "anyOf": [schema, { "type": "null" }] })
    } else {
        schema
    }
}

/// Top-level schema for a definition, identified by its model name.
pub fn definition_schema(model: &Model) -> Value {
    let mut schema = json_schema(model);
    if let Some(object) = schema.as_object_mut() {
        object.insert("$id".to_string(), json!(model.name));
    }
    schema
}
