//! Type resolution: schema node to `TypeDescriptor`.
//!
//! The resolver classifies a schema without expanding anything: a `$ref`
//! becomes the referenced type's name, and nested schemas are only looked at
//! far enough to fill in the `template` of arrays and dictionaries. The model
//! builder expands descriptors into full models.

use crate::openapi::spec::{AdditionalProperties, EnumValue, Schema, ref_key};

use super::utils::sanitize_type_name;

/// Broad shape of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A `$ref`.
    Reference,
    /// A scalar type, or an untyped schema.
    Primitive,
    /// A schema with `enum` values.
    Enum,
    /// An `array`.
    Array,
    /// An object with only `additionalProperties`.
    Dictionary,
    /// `oneOf`, or a `type` list.
    OneOf,
    /// `anyOf`.
    AnyOf,
    /// `allOf`.
    AllOf,
    /// An object with fixed properties.
    Object,
}

/// Resolved shape of a schema node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// How the node will be modeled.
    pub shape: Shape,
    /// Type name: referenced model, primitive name, or `any`.
    pub base: String,
    /// Element type name for arrays and dictionaries whose element is a
    /// reference or a primitive.
    pub template: Option<String>,
    /// Nullable under either the 3.0 or the 3.1 convention.
    pub is_nullable: bool,
    /// Model names this node refers to directly.
    pub imports: Vec<String>,
}

impl TypeDescriptor {
    fn new(shape: Shape, base: impl Into<String>, is_nullable: bool) -> Self {
        Self {
            shape,
            base: base.into(),
            template: None,
            is_nullable,
            imports: Vec::new(),
        }
    }
}

/// Type name for a `$ref` target: the last pointer segment, sanitized the
/// same way component schema keys are.
pub fn type_name_from_ref(ref_path: &str) -> String {
    sanitize_type_name(&ref_key(ref_path))
}

/// Primitive base name for an OpenAPI `type`/`format` pair.
pub fn primitive_base(type_name: &str, format: Option<&str>) -> &'static str {
    match (type_name, format) {
        ("string", Some("binary")) | ("file", _) => "binary",
        ("string", _) => "string",
        ("integer", _) => "integer",
        ("number", _) => "number",
        ("boolean", _) => "boolean",
        ("null", _) => "null",
        _ => "any",
    }
}

/// Primitive base name shared by every enum value.
fn enum_base(values: &[EnumValue]) -> &'static str {
    let mut bases = values.iter().filter_map(|value| match value {
        EnumValue::String(_) => Some("string"),
        EnumValue::Integer(_) | EnumValue::Float(_) => Some("number"),
        EnumValue::Bool(_) => Some("boolean"),
        EnumValue::Null => None,
    });
    let Some(first) = bases.next() else {
        return "any";
    };
    if bases.all(|base| base == first) {
        first
    } else {
        "any"
    }
}

fn non_empty(members: Option<&Vec<Schema>>) -> bool {
    members.is_some_and(|m| !m.is_empty())
}

/// True when the schema declares fixed properties.
pub fn has_properties(schema: &Schema) -> bool {
    schema.properties.as_ref().is_some_and(|p| !p.is_empty())
}

/// Resolve a schema node to its descriptor.
pub fn resolve_type(schema: &Schema) -> TypeDescriptor {
    if let Some(inner) = schema.unwrap_nullable() {
        let mut descriptor = resolve_type(inner);
        descriptor.is_nullable = true;
        return descriptor;
    }

    let is_nullable = schema.is_nullable();

    if let Some(ref_path) = &schema.ref_path {
        let name = type_name_from_ref(ref_path);
        let mut descriptor = TypeDescriptor::new(Shape::Reference, name.clone(), is_nullable);
        descriptor.imports.push(name);
        return descriptor;
    }

    if let Some(values) = schema.enum_values.as_ref().filter(|v| !v.is_empty()) {
        let nullable = is_nullable || values.contains(&EnumValue::Null);
        return TypeDescriptor::new(Shape::Enum, enum_base(values), nullable);
    }

    if non_empty(schema.all_of.as_ref()) {
        return TypeDescriptor::new(Shape::AllOf, "any", is_nullable);
    }
    if non_empty(schema.one_of.as_ref()) {
        return TypeDescriptor::new(Shape::OneOf, "any", is_nullable);
    }
    if non_empty(schema.any_of.as_ref()) {
        return TypeDescriptor::new(Shape::AnyOf, "any", is_nullable);
    }

    let types = schema.type_names();
    if types.len() > 1 {
        return TypeDescriptor::new(Shape::AnyOf, "any", is_nullable);
    }

    match types.first().copied() {
        Some("array") => {
            let mut descriptor = TypeDescriptor::new(Shape::Array, "any", is_nullable);
            if let Some(items) = &schema.items {
                element_template(&mut descriptor, items);
            } else {
                descriptor.template = Some("any".to_string());
            }
            descriptor
        }
        Some("object") | None if has_properties(schema) => {
            TypeDescriptor::new(Shape::Object, "any", is_nullable)
        }
        Some("object") => dictionary(schema, is_nullable),
        None if schema.additional_properties.is_some() => dictionary(schema, is_nullable),
        None if schema.items.is_some() => {
            let mut descriptor = TypeDescriptor::new(Shape::Array, "any", is_nullable);
            if let Some(items) = &schema.items {
                element_template(&mut descriptor, items);
            }
            descriptor
        }
        Some(type_name) => TypeDescriptor::new(
            Shape::Primitive,
            primitive_base(type_name, schema.format.as_deref()),
            is_nullable,
        ),
        None => TypeDescriptor::new(Shape::Primitive, "any", is_nullable),
    }
}

fn dictionary(schema: &Schema, is_nullable: bool) -> TypeDescriptor {
    let mut descriptor = TypeDescriptor::new(Shape::Dictionary, "any", is_nullable);
    match &schema.additional_properties {
        Some(AdditionalProperties::Schema(value)) => element_template(&mut descriptor, value),
        _ => descriptor.template = Some("any".to_string()),
    }
    descriptor
}

/// Fill `template` from a simple element type.
fn element_template(descriptor: &mut TypeDescriptor, element: &Schema) {
    let element = resolve_type(element);
    if matches!(element.shape, Shape::Reference | Shape::Primitive) {
        descriptor.template = Some(element.base);
        descriptor.imports = element.imports;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn schema(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_reference_uses_last_segment() {
        let d = resolve_type(&schema(r##"{ "$ref": "#/components/schemas/Pet" }"##));
        assert_eq!(d.shape, Shape::Reference);
        assert_eq!(d.base, "Pet");
        assert_eq!(d.imports, ["Pet"]);
        assert!(!d.is_nullable);
    }

    #[test]
    fn test_primitives_map_one_to_one() {
        for (json, base) in [
            (r#"{ "type": "string" }"#, "string"),
            (r#"{ "type": "number" }"#, "number"),
            (r#"{ "type": "integer" }"#, "integer"),
            (r#"{ "type": "boolean" }"#, "boolean"),
            (r#"{ "type": "string", "format": "binary" }"#, "binary"),
            (r#"{ "type": "string", "format": "date-time" }"#, "string"),
            (r#"{}"#, "any"),
        ] {
            let d = resolve_type(&schema(json));
            assert_eq!(d.shape, Shape::Primitive, "{json}");
            assert_eq!(d.base, base, "{json}");
        }
    }

    #[test]
    fn test_array_template() {
        let d = resolve_type(&schema(
            r##"{ "type": "array", "items": { "$ref": "#/components/schemas/Tag" } }"##,
        ));
        assert_eq!(d.shape, Shape::Array);
        assert_eq!(d.template.as_deref(), Some("Tag"));
        assert_eq!(d.imports, ["Tag"]);

        let nested = resolve_type(&schema(
            r#"{ "type": "array", "items": { "type": "array", "items": { "type": "string" } } }"#,
        ));
        assert_eq!(nested.template, None);
    }

    #[test]
    fn test_nullable_conventions() {
        let flag = resolve_type(&schema(r#"{ "type": "string", "nullable": true }"#));
        let type_array = resolve_type(&schema(r#"{ "type": ["integer", "null"] }"#));
        let any_of = resolve_type(&schema(
            r##"{ "anyOf": [{ "$ref": "#/components/schemas/Pet" }, { "type": "null" }] }"##,
        ));
        assert!(flag.is_nullable && flag.shape == Shape::Primitive);
        assert!(type_array.is_nullable && type_array.base == "integer");
        assert!(any_of.is_nullable && any_of.shape == Shape::Reference);
    }

    #[test]
    fn test_dictionary_without_properties() {
        let d = resolve_type(&schema(
            r#"{ "type": "object", "additionalProperties": { "type": "integer" } }"#,
        ));
        assert_eq!(d.shape, Shape::Dictionary);
        assert_eq!(d.template.as_deref(), Some("integer"));

        let open = resolve_type(&schema(r#"{ "type": "object" }"#));
        assert_eq!(open.shape, Shape::Dictionary);
        assert_eq!(open.template.as_deref(), Some("any"));
    }

    #[test]
    fn test_enum_and_compositions() {
        let e = resolve_type(&schema(r#"{ "enum": ["a", "b", null] }"#));
        assert_eq!(e.shape, Shape::Enum);
        assert_eq!(e.base, "string");
        assert!(e.is_nullable);

        let all = resolve_type(&schema(r##"{ "allOf": [{ "$ref": "#/components/schemas/A" }] }"##));
        assert_eq!(all.shape, Shape::AllOf);
        let one = resolve_type(&schema(
            r##"{ "oneOf": [{ "$ref": "#/components/schemas/A" }, { "$ref": "#/components/schemas/B" }] }"##,
        ));
        assert_eq!(one.shape, Shape::OneOf);
    }

    #[test]
    fn test_object_with_properties() {
        let d = resolve_type(&schema(r#"{ "properties": { "id": { "type": "string" } } }"#));
        assert_eq!(d.shape, Shape::Object);
    }
}
