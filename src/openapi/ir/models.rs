//! Model building: named schema plus descriptor to a full `Model`.
//!
//! Anonymous object schemas nested anywhere below a definition (property,
//! array item, dictionary value, composition member) are hoisted into their
//! own definitions. They get a provisional name unique to their position in
//! the document, and the post-processor turns the naming path into the final
//! identifier.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};
use crate::openapi::spec::{
    AdditionalProperties, Document, EnumValue, ExclusiveBound, RefOr, Response, Schema,
};

use super::resolver::{Shape, has_properties, primitive_base, resolve_type};
use super::types::{Constraints, EnumMember, Model, ModelKind, ModelOrigin, PROVISIONAL_PREFIX};
use super::utils::{
    enum_member_name, pascal_case, response_model_name, sanitize_type_name, unique_name,
};

/// Promoted response models keyed by `(response component, media type)`.
pub type PromotedResponses = HashMap<(String, String), String>;

/// Models built from `components`, plus the promoted response lookup the
/// operation builder needs.
#[derive(Debug, Default)]
pub struct ModelSet {
    /// Definitions, component schemas first, hoisted models last.
    pub models: Vec<Model>,
    /// Names given to promoted responses.
    pub promoted: PromotedResponses,
}

/// Builds models for one unit of work and collects the definitions hoisted
/// out of it.
#[derive(Debug)]
pub struct ModelScope {
    /// Distinguishes provisional names of units that share naming paths.
    scope: String,
    hoisted: Vec<Model>,
}

impl ModelScope {
    /// A scope whose provisional names are prefixed with `scope`.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            hoisted: Vec::new(),
        }
    }

    /// Definitions hoisted so far, in creation order.
    pub fn into_hoisted(self) -> Vec<Model> {
        self.hoisted
    }

    /// Build a definition-level model.
    pub fn definition(&mut self, name: &str, schema: &Schema, origin: ModelOrigin) -> Model {
        let mut model = self.build(name, schema, &[name.to_string()]);
        model.is_definition = true;
        model.origin = origin;
        model.refresh_imports();
        model
    }

    /// Build a model nested at `path`, hoisting it when it is an object.
    pub fn nested(&mut self, name: &str, schema: &Schema, path: &[String]) -> Model {
        let descriptor = resolve_type(schema);
        if descriptor.shape != Shape::Object {
            return self.build(name, schema, path);
        }

        let key = format!(
            "{PROVISIONAL_PREFIX}{}{PROVISIONAL_PREFIX}{}",
            self.scope,
            path.join("/")
        );
        let target = schema.unwrap_nullable().unwrap_or(schema);
        let mut hoisted = self.build(&key, target, path);
        hoisted.is_definition = true;
        hoisted.is_nullable = false;
        hoisted.origin = ModelOrigin::Synthesized {
            segments: path.to_vec(),
        };
        hoisted.refresh_imports();
        self.hoisted.push(hoisted);

        let mut reference = Model::reference(name, key);
        reference.is_nullable = descriptor.is_nullable;
        reference.description.clone_from(&target.description);
        reference.is_read_only = target.read_only;
        reference.deprecated = target.deprecated;
        reference
    }

    fn build(&mut self, name: &str, schema: &Schema, path: &[String]) -> Model {
        let descriptor = resolve_type(schema);
        let target = schema.unwrap_nullable().unwrap_or(schema);

        let mut model = Model::new(name, ModelKind::Primitive, descriptor.base.clone());
        model.is_nullable = descriptor.is_nullable;
        model.description = target.description.clone().or_else(|| schema.description.clone());
        model.is_read_only = target.read_only;
        model.deprecated = target.deprecated || schema.deprecated;
        model.format.clone_from(&target.format);
        model.default.clone_from(&target.default);
        model.constraints = constraints(target);

        match descriptor.shape {
            Shape::Reference => model.kind = ModelKind::Reference,
            Shape::Primitive => model.kind = ModelKind::Primitive,
            Shape::Enum => {
                model.kind = ModelKind::Enum;
                model.enum_members = enum_members(target);
            }
            Shape::Array => {
                model.kind = ModelKind::Array;
                let link = match &target.items {
                    Some(items) => self.nested("", items, &child(path, "Item")),
                    None => Model::primitive("", "any"),
                };
                model.link = Some(Box::new(link));
            }
            Shape::Dictionary => {
                model.kind = ModelKind::Dictionary;
                let link = match &target.additional_properties {
                    Some(AdditionalProperties::Schema(value)) => {
                        self.nested("", value, &child(path, "Value"))
                    }
                    _ => Model::primitive("", "any"),
                };
                model.link = Some(Box::new(link));
            }
            Shape::OneOf | Shape::AnyOf | Shape::AllOf => {
                self.composition(&mut model, descriptor.shape, target, path);
            }
            Shape::Object => {
                model.kind = ModelKind::Interface;
                model.properties = self.properties(target, path);
            }
        }

        model.refresh_imports();
        model
    }

    fn properties(&mut self, schema: &Schema, path: &[String]) -> Vec<Model> {
        let Some(properties) = &schema.properties else {
            return Vec::new();
        };
        properties
            .iter()
            .map(|(property_name, property_schema)| {
                let mut property =
                    self.nested(property_name, property_schema, &child(path, property_name));
                property.is_required = schema.required.iter().any(|r| r == property_name);
                property
            })
            .collect()
    }

    fn composition(&mut self, model: &mut Model, shape: Shape, schema: &Schema, path: &[String]) {
        let (kind, members, label) = match shape {
            Shape::AllOf => (ModelKind::AllOf, schema.all_of.as_deref(), "Part"),
            Shape::OneOf => (ModelKind::OneOf, schema.one_of.as_deref(), "Variant"),
            _ => (ModelKind::AnyOf, schema.any_of.as_deref(), "Variant"),
        };
        model.kind = kind;

        let mut index = 0;
        let mut next_path = || {
            index += 1;
            child(path, &format!("{label}{index}"))
        };

        match members {
            Some(members) => {
                for member in members.iter().filter(|m| !m.is_null_type()) {
                    let member_path = next_path();
                    model.properties.push(self.nested("", member, &member_path));
                }
            }
            // `type: [string, integer]` without explicit members.
            None => {
                for type_name in schema.type_names() {
                    model.properties.push(Model::primitive(
                        "",
                        primitive_base(type_name, schema.format.as_deref()),
                    ));
                }
            }
        }

        // Own properties next to `allOf` form one more member.
        if kind == ModelKind::AllOf && has_properties(schema) {
            let own = Schema {
                properties: schema.properties.clone(),
                required: schema.required.clone(),
                ..Schema::default()
            };
            let own_path = next_path();
            model.properties.push(self.nested("", &own, &own_path));
        }
    }
}

fn child(path: &[String], segment: &str) -> Vec<String> {
    let mut path = path.to_vec();
    path.push(segment.to_string());
    path
}

fn enum_members(schema: &Schema) -> Vec<EnumMember> {
    let Some(values) = &schema.enum_values else {
        return Vec::new();
    };
    let names = schema.enum_varnames.as_deref().unwrap_or_default();
    let descriptions = schema.enum_descriptions.as_deref().unwrap_or_default();

    let mut seen: Vec<&EnumValue> = Vec::with_capacity(values.len());
    let mut taken: HashSet<String> = HashSet::with_capacity(values.len());
    let mut members = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        if matches!(value, EnumValue::Null) || seen.contains(&value) {
            continue;
        }
        seen.push(value);

        let (derived, literal) = match value {
            EnumValue::String(s) => (enum_member_name(s), serde_json::Value::from(s.as_str())),
            EnumValue::Integer(n) => (format!("_{n}"), serde_json::Value::from(*n)),
            EnumValue::Float(f) => (
                format!("_{}", f.to_string().replace(['.', '-'], "_")),
                serde_json::Number::from_f64(*f)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number),
            ),
            EnumValue::Bool(b) => (b.to_string().to_uppercase(), serde_json::Value::Bool(*b)),
            EnumValue::Null => continue,
        };
        let base = names
            .get(index)
            .map_or(derived, |name| sanitize_type_name(name));
        // `asc` and `ASC` derive the same member name.
        let name = unique_name(&base, &taken);
        taken.insert(name.clone());
        members.push(EnumMember {
            name,
            value: literal,
            description: descriptions.get(index).cloned(),
        });
    }
    members
}

fn constraints(schema: &Schema) -> Constraints {
    let mut constraints = Constraints {
        pattern: schema.pattern.clone(),
        minimum: schema.minimum,
        maximum: schema.maximum,
        multiple_of: schema.multiple_of,
        min_length: schema.min_length,
        max_length: schema.max_length,
        min_items: schema.min_items,
        max_items: schema.max_items,
        unique_items: schema.unique_items,
        min_properties: schema.min_properties,
        max_properties: schema.max_properties,
        ..Constraints::default()
    };
    match schema.exclusive_minimum {
        Some(ExclusiveBound::Value(v)) => constraints.exclusive_minimum = Some(v),
        Some(ExclusiveBound::Flag(true)) => {
            constraints.exclusive_minimum = constraints.minimum.take();
        }
        _ => {}
    }
    match schema.exclusive_maximum {
        Some(ExclusiveBound::Value(v)) => constraints.exclusive_maximum = Some(v),
        Some(ExclusiveBound::Flag(true)) => {
            constraints.exclusive_maximum = constraints.maximum.take();
        }
        _ => {}
    }
    constraints
}

/// Build every component schema, and with `promote_responses` every
/// component response body, into models.
pub fn get_models(doc: &Document, promote_responses: bool) -> Result<ModelSet> {
    let entries: Vec<(&String, &Schema)> = doc.schemas().collect();
    let built: Vec<(Model, Vec<Model>)> = entries
        .par_iter()
        .map(|(key, schema)| {
            let mut scope = ModelScope::new("schemas");
            let model = scope.definition(&sanitize_type_name(key), schema, ModelOrigin::Schema);
            (model, scope.into_hoisted())
        })
        .collect();

    let mut set = ModelSet::default();
    let mut hoisted = Vec::new();
    for (model, nested) in built {
        set.models.push(model);
        hoisted.extend(nested);
    }

    if promote_responses && let Some(components) = &doc.components {
        promote(components.responses.iter(), &mut set, &mut hoisted)?;
    }

    debug!(
        schemas = entries.len(),
        promoted = set.promoted.len(),
        hoisted = hoisted.len(),
        "Built component models."
    );
    set.models.extend(hoisted);
    Ok(set)
}

fn promote<'a>(
    responses: impl Iterator<Item = (&'a String, &'a RefOr<Response>)>,
    set: &mut ModelSet,
    hoisted: &mut Vec<Model>,
) -> Result<()> {
    let mut taken: HashSet<String> = set.models.iter().map(|m| m.name.clone()).collect();

    for (definition_name, item) in responses {
        let RefOr::Item(response) = item else {
            continue;
        };
        for (media_type, content) in &response.content {
            let Some(schema) = &content.schema else {
                continue;
            };
            let name = sanitize_type_name(&response_model_name(definition_name, media_type));
            let origin = ModelOrigin::Response {
                component: definition_name.clone(),
                media_type: media_type.clone(),
            };
            if !taken.insert(name.clone()) {
                return Err(Error::NameCollision {
                    name,
                    origin: origin.to_string(),
                });
            }

            let mut scope = ModelScope::new("responses");
            set.models.push(scope.definition(&name, schema, origin));
            hoisted.extend(scope.into_hoisted());
            set.promoted
                .insert((definition_name.clone(), media_type.clone()), name);
        }
    }

    Ok(())
}

/// Final identifier for a synthesized model's naming path.
pub fn synthesized_name(segments: &[String]) -> String {
    let joined: String = segments.iter().map(|s| pascal_case(s)).collect();
    sanitize_type_name(&joined)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn doc(json: &str) -> Document {
        serde_json::from_str(json).unwrap()
    }

    fn find<'a>(models: &'a [Model], name: &str) -> &'a Model {
        models.iter().find(|m| m.name == name).unwrap()
    }

    #[test]
    fn test_primitive_schemas_one_model_each() {
        let doc = doc(
            r#"{
                "openapi": "3.0.0",
                "components": { "schemas": {
                    "Id": { "type": "string" },
                    "Count": { "type": "integer" },
                    "Flag": { "type": "boolean" }
                } }
            }"#,
        );
        let set = get_models(&doc, true).unwrap();
        let names: Vec<&str> = set.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Id", "Count", "Flag"]);
        assert!(set.models.iter().all(|m| m.kind == ModelKind::Primitive));
    }

    #[test]
    fn test_interface_required_and_imports() {
        let doc = doc(
            r##"{
                "openapi": "3.0.0",
                "components": { "schemas": {
                    "Pet": {
                        "type": "object",
                        "required": ["id"],
                        "properties": {
                            "id": { "type": "integer" },
                            "owner": { "$ref": "#/components/schemas/User" },
                            "tags": { "type": "array", "items": { "$ref": "#/components/schemas/Tag" } }
                        }
                    }
                } }
            }"##,
        );
        let set = get_models(&doc, false).unwrap();
        let pet = find(&set.models, "Pet");
        assert_eq!(pet.kind, ModelKind::Interface);
        assert_eq!(pet.properties.len(), 3);
        assert!(pet.properties[0].is_required);
        assert!(!pet.properties[1].is_required);
        assert_eq!(pet.imports, ["Tag", "User"]);
    }

    #[test]
    fn test_self_reference_terminates() {
        let doc = doc(
            r##"{
                "openapi": "3.0.0",
                "components": { "schemas": {
                    "Node": {
                        "type": "object",
                        "properties": {
                            "value": { "type": "string" },
                            "next": { "$ref": "#/components/schemas/Node" },
                            "children": { "type": "array", "items": { "$ref": "#/components/schemas/Node" } }
                        }
                    }
                } }
            }"##,
        );
        let set = get_models(&doc, false).unwrap();
        let node = find(&set.models, "Node");
        let next = &node.properties[1];
        assert_eq!(next.kind, ModelKind::Reference);
        assert_eq!(next.base, "Node");
        assert!(node.imports.is_empty());
    }

    #[test]
    fn test_digit_only_schema_key_keeps_a_name() {
        let doc = doc(
            r##"{
                "openapi": "3.0.0",
                "components": { "schemas": {
                    "123": { "type": "string" },
                    "Holder": {
                        "type": "object",
                        "properties": { "code": { "$ref": "#/components/schemas/123" } }
                    }
                } }
            }"##,
        );
        let set = get_models(&doc, false).unwrap();
        assert_eq!(set.models[0].name, "_123");
        let holder = find(&set.models, "Holder");
        assert_eq!(holder.properties[0].base, "_123");
        assert_eq!(holder.imports, ["_123"]);
    }

    #[test]
    fn test_nested_object_is_hoisted() {
        let doc = doc(
            r#"{
                "openapi": "3.0.0",
                "components": { "schemas": {
                    "Pet": {
                        "type": "object",
                        "properties": {
                            "owner": {
                                "type": "object",
                                "properties": { "name": { "type": "string" } }
                            }
                        }
                    }
                } }
            }"#,
        );
        let set = get_models(&doc, false).unwrap();
        assert_eq!(set.models.len(), 2);
        let hoisted = &set.models[1];
        assert!(hoisted.is_provisional());
        assert_eq!(
            hoisted.origin,
            ModelOrigin::Synthesized {
                segments: vec!["Pet".to_string(), "owner".to_string()]
            }
        );
        let owner = &find(&set.models, "Pet").properties[0];
        assert_eq!(owner.kind, ModelKind::Reference);
        assert_eq!(owner.base, hoisted.name);
    }

    #[test]
    fn test_enum_dedup_and_varnames() {
        let doc = doc(
            r#"{
                "openapi": "3.0.0",
                "components": { "schemas": {
                    "Status": {
                        "type": "string",
                        "enum": ["active", "in-progress", "active"],
                        "x-enum-descriptions": ["Running", "Busy"]
                    },
                    "Level": { "type": "integer", "enum": [1, 2], "x-enum-varnames": ["Low", "High"] }
                } }
            }"#,
        );
        let set = get_models(&doc, false).unwrap();
        let status = find(&set.models, "Status");
        let names: Vec<&str> = status.enum_members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["ACTIVE", "IN_PROGRESS"]);
        assert_eq!(status.enum_members[0].description.as_deref(), Some("Running"));
        let level = find(&set.models, "Level");
        assert_eq!(level.enum_members[1].name, "High");
        assert_eq!(level.enum_members[1].value, serde_json::json!(2));
    }

    #[test]
    fn test_enum_member_name_collision() {
        let doc = doc(
            r#"{
                "openapi": "3.0.0",
                "components": { "schemas": {
                    "Order": { "type": "string", "enum": ["asc", "ASC", "a-b", "a_b", "desc"] }
                } }
            }"#,
        );
        let set = get_models(&doc, false).unwrap();
        let order = find(&set.models, "Order");
        let names: Vec<&str> = order.enum_members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["ASC", "ASC2", "A_B", "A_B2", "DESC"]);
        assert_eq!(order.enum_members[1].value, serde_json::json!("ASC"));
        assert_eq!(order.enum_members[3].value, serde_json::json!("a_b"));
    }

    #[test]
    fn test_composition_members_stay_distinct() {
        let doc = doc(
            r##"{
                "openapi": "3.0.0",
                "components": { "schemas": {
                    "Dog": {
                        "allOf": [{ "$ref": "#/components/schemas/Animal" }],
                        "properties": { "bark": { "type": "boolean" } }
                    }
                } }
            }"##,
        );
        let set = get_models(&doc, false).unwrap();
        let dog = find(&set.models, "Dog");
        assert_eq!(dog.kind, ModelKind::AllOf);
        assert_eq!(dog.properties.len(), 2);
        assert_eq!(dog.properties[0].base, "Animal");
        assert_eq!(dog.properties[1].kind, ModelKind::Reference);
        assert!(set.models.iter().any(|m| m.origin
            == ModelOrigin::Synthesized {
                segments: vec!["Dog".to_string(), "Part2".to_string()]
            }));
    }

    #[test]
    fn test_response_promotion_names() {
        let doc = doc(
            r#"{
                "openapi": "3.0.0",
                "components": {
                    "responses": {
                        "Error": {
                            "description": "error",
                            "content": { "application/json": { "schema": { "type": "string" } } }
                        }
                    }
                }
            }"#,
        );
        let set = get_models(&doc, true).unwrap();
        assert!(set.models.iter().any(|m| m.name == "ErrorApplicationJsonResponse"));
        assert_eq!(
            set.promoted
                .get(&("Error".to_string(), "application/json".to_string()))
                .map(String::as_str),
            Some("ErrorApplicationJsonResponse")
        );

        let disabled = get_models(&doc, false).unwrap();
        assert!(disabled.models.is_empty());
    }

    #[test]
    fn test_response_promotion_collision_is_an_error() {
        let doc = doc(
            r#"{
                "openapi": "3.0.0",
                "components": {
                    "schemas": { "ErrorApplicationJsonResponse": { "type": "string" } },
                    "responses": {
                        "Error": {
                            "description": "error",
                            "content": { "application/json": { "schema": { "type": "string" } } }
                        }
                    }
                }
            }"#,
        );
        let err = get_models(&doc, true).unwrap_err();
        assert!(matches!(
            err,
            Error::NameCollision { ref name, .. } if name == "ErrorApplicationJsonResponse"
        ));
    }

    #[test]
    fn test_synthesized_name() {
        assert_eq!(
            synthesized_name(&["Pet".to_string(), "owner_info".to_string()]),
            "PetOwnerInfo"
        );
        assert_eq!(
            synthesized_name(&["getPet".to_string(), "Response200".to_string()]),
            "GetPetResponse200"
        );
        assert_eq!(synthesized_name(&["---".to_string()]), "Model");
    }
}
