//! OpenAPI document structs for serde deserialization.
//!
//! Only the subset of OpenAPI 3.x the IR builder reads is modelled. Maps use
//! `IndexMap` so declaration order survives into the generated client.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::Result;

/// Root OpenAPI document.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    /// Version string, e.g. `3.0.3`.
    pub openapi: String,
    /// Document metadata.
    #[serde(default)]
    pub info: Info,
    /// Declared servers; only the first one is used.
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Path items in declaration order.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components.
    pub components: Option<Components>,
}

/// The `info` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    /// API title.
    #[serde(default)]
    pub title: String,
    /// API version.
    #[serde(default)]
    pub version: String,
}

/// A server entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    /// URL, possibly containing `{variable}` placeholders.
    pub url: String,
    /// Placeholder values.
    #[serde(default)]
    pub variables: IndexMap<String, ServerVariable>,
}

/// A server URL variable.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerVariable {
    /// Value substituted into the URL.
    pub default: String,
}

/// Components section containing reusable definitions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Named schemas.
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
    /// Named responses.
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,
    /// Named parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, RefOr<Parameter>>,
    /// Named request bodies.
    #[serde(default)]
    pub request_bodies: IndexMap<String, RefOr<RequestBody>>,
}

/// A `$ref` object.
#[derive(Debug, Clone, Deserialize)]
pub struct Reference {
    /// JSON pointer to the referenced definition.
    #[serde(rename = "$ref")]
    pub ref_path: String,
}

/// Either a reference or an inline definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// `{"$ref": "..."}`
    Ref(Reference),
    /// Inline definition.
    Item(T),
}

/// HTTP methods an operation can be declared under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `get`
    Get,
    /// `put`
    Put,
    /// `post`
    Post,
    /// `delete`
    Delete,
    /// `options`
    Options,
    /// `head`
    Head,
    /// `patch`
    Patch,
    /// `trace`
    Trace,
}

impl Method {
    /// Parse a path item key into a method.
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "get" => Self::Get,
            "put" => Self::Put,
            "post" => Self::Post,
            "delete" => Self::Delete,
            "options" => Self::Options,
            "head" => Self::Head,
            "patch" => Self::Patch,
            "trace" => Self::Trace,
            _ => return None,
        })
    }

    /// Lowercase method name as written in the document.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

/// A path item: its operations keep the order they are declared in.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "IndexMap<String, serde_json::Value>")]
pub struct PathItem {
    /// Operations in declaration order.
    pub operations: Vec<(Method, Operation)>,
    /// Path-level parameters shared by all operations.
    pub parameters: Vec<RefOr<Parameter>>,
}

impl TryFrom<IndexMap<String, serde_json::Value>> for PathItem {
    type Error = serde_json::Error;

    fn try_from(raw: IndexMap<String, serde_json::Value>) -> Result<Self, Self::Error> {
        let mut item = Self::default();
        for (key, value) in raw {
            if key == "parameters" {
                item.parameters = serde_json::from_value(value)?;
            } else if let Some(method) = Method::from_key(&key) {
                item.operations.push((method, serde_json::from_value(value)?));
            }
        }
        Ok(item)
    }
}

/// An API operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Unique operation identifier.
    pub operation_id: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Tags; the first one picks the service.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Deprecation flag.
    #[serde(default)]
    pub deprecated: bool,
    /// Operation-level parameters.
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    /// Request body.
    pub request_body: Option<RefOr<RequestBody>>,
    /// Responses keyed by status.
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// `in: path`
    Path,
    /// `in: query`
    Query,
    /// `in: header`
    Header,
    /// `in: cookie`
    Cookie,
}

/// A path, query, header or cookie parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    /// Name on the wire.
    pub name: String,
    /// Where the parameter is carried.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Parameter description.
    pub description: Option<String>,
    /// Required flag; path parameters are always required.
    #[serde(default)]
    pub required: bool,
    /// Deprecation flag.
    #[serde(default)]
    pub deprecated: bool,
    /// Value schema.
    pub schema: Option<Schema>,
    /// Schema by media type, used when `schema` is absent.
    pub content: Option<IndexMap<String, MediaType>>,
}

/// A request body definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    /// Body description.
    pub description: Option<String>,
    /// Required flag.
    #[serde(default)]
    pub required: bool,
    /// Schema by media type.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// A response definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    /// Response description.
    #[serde(default)]
    pub description: String,
    /// Body schema by media type.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    /// Declared response headers.
    #[serde(default)]
    pub headers: IndexMap<String, RefOr<Header>>,
}

/// A response header definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Header {
    /// Header description.
    pub description: Option<String>,
    /// Header value schema.
    pub schema: Option<Schema>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    /// Content schema.
    pub schema: Option<Schema>,
}

/// JSON Schema definition used in OpenAPI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// The type of the schema (string, number, integer, boolean, object, array).
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Reference to another schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,

    /// Properties for object types, in declaration order.
    pub properties: Option<IndexMap<String, Schema>>,

    /// Required property names for object types.
    #[serde(default)]
    pub required: Vec<String>,

    /// Item schema for array types.
    pub items: Option<Box<Schema>>,

    /// Enum values (can be strings, integers, floats, booleans, or null).
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    /// Member names for enum values.
    #[serde(rename = "x-enum-varnames")]
    pub enum_varnames: Option<Vec<String>>,

    /// Member descriptions for enum values.
    #[serde(rename = "x-enum-descriptions")]
    pub enum_descriptions: Option<Vec<String>>,

    /// Members of an `anyOf` composition.
    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<Schema>>,

    /// Members of a `oneOf` composition.
    #[serde(rename = "oneOf")]
    pub one_of: Option<Vec<Schema>>,

    /// Members of an `allOf` composition.
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<Schema>>,

    /// Additional properties for object types (for Record/dict types).
    pub additional_properties: Option<AdditionalProperties>,

    /// Format hint (e.g., date-time, binary).
    pub format: Option<String>,

    /// Default value for the schema.
    pub default: Option<serde_json::Value>,

    /// OpenAPI 3.0 nullable flag (3.1 uses type arrays instead).
    pub nullable: Option<bool>,

    /// Deprecation flag.
    #[serde(default)]
    pub deprecated: bool,
    /// Read-only flag.
    #[serde(default)]
    pub read_only: bool,

    // --- Validation keywords ---
    /// String pattern.
    pub pattern: Option<String>,
    /// Lower bound.
    pub minimum: Option<f64>,
    /// Upper bound.
    pub maximum: Option<f64>,
    /// Exclusive lower bound, flag or number.
    pub exclusive_minimum: Option<ExclusiveBound>,
    /// Exclusive upper bound, flag or number.
    pub exclusive_maximum: Option<ExclusiveBound>,
    /// Divisor.
    pub multiple_of: Option<f64>,
    /// Minimum string length.
    pub min_length: Option<u64>,
    /// Maximum string length.
    pub max_length: Option<u64>,
    /// Minimum array length.
    pub min_items: Option<u64>,
    /// Maximum array length.
    pub max_items: Option<u64>,
    /// Distinct array items.
    pub unique_items: Option<bool>,
    /// Minimum property count.
    pub min_properties: Option<u64>,
    /// Maximum property count.
    pub max_properties: Option<u64>,
}

/// Enum value can be string, integer, float, boolean, or null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// A string literal.
    String(String),
    /// An integer literal.
    Integer(i64),
    /// A non-integer number.
    Float(f64),
    /// A boolean literal.
    Bool(bool),
    /// `null`
    Null,
}

/// `exclusiveMinimum` is a flag in 3.0 and a number in 3.1.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExclusiveBound {
    /// 3.0: applies to `minimum`/`maximum`.
    Flag(bool),
    /// 3.1: the bound itself.
    Value(f64),
}

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `type: string`
    Single(String),
    /// `type: [string, "null"]`
    Multiple(Vec<String>),
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` allows any value, `false` none.
    Bool(bool),
    /// Schema every extra value must match.
    Schema(Box<Schema>),
}

impl Document {
    /// Decode a document from an already parsed JSON tree.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Component schemas, empty when the document has none.
    pub fn schemas(&self) -> impl Iterator<Item = (&String, &Schema)> {
        self.components.iter().flat_map(|c| c.schemas.iter())
    }

    /// Resolve a `#/components/parameters/...` reference or return the inline value.
    pub fn parameter<'a>(&'a self, item: &'a RefOr<Parameter>) -> Option<&'a Parameter> {
        self.follow(item, |c| &c.parameters)
    }

    /// Resolve a `#/components/requestBodies/...` reference or return the inline value.
    pub fn request_body<'a>(&'a self, item: &'a RefOr<RequestBody>) -> Option<&'a RequestBody> {
        self.follow(item, |c| &c.request_bodies)
    }

    /// Resolve a `#/components/responses/...` reference or return the inline value.
    pub fn response<'a>(&'a self, item: &'a RefOr<Response>) -> Option<&'a Response> {
        self.follow(item, |c| &c.responses)
    }

    fn follow<'a, T>(
        &'a self,
        mut item: &'a RefOr<T>,
        table: impl Fn(&'a Components) -> &'a IndexMap<String, RefOr<T>>,
    ) -> Option<&'a T> {
        let components = self.components.as_ref();
        // Bounded so a reference cycle between components cannot loop forever.
        for _ in 0..16 {
            match item {
                RefOr::Item(value) => return Some(value),
                RefOr::Ref(reference) => {
                    item = table(components?).get(&ref_key(&reference.ref_path))?;
                }
            }
        }
        None
    }
}

impl Schema {
    /// Check if this schema is nullable (contains null in anyOf, type array, or nullable flag).
    pub fn is_nullable(&self) -> bool {
        // Check OpenAPI 3.0 nullable flag
        if self.nullable == Some(true) {
            return true;
        }

        // Check anyOf/oneOf for a null member
        for members in [&self.any_of, &self.one_of].into_iter().flatten() {
            if members.iter().any(Schema::is_null_type) {
                return true;
            }
        }

        // Check type array for null
        if let Some(SchemaType::Multiple(types)) = &self.schema_type
            && types.iter().any(|t| t == "null")
        {
            return true;
        }

        false
    }

    /// The single non-null member of an `anyOf`/`oneOf` that also allows null.
    pub fn unwrap_nullable(&self) -> Option<&Schema> {
        for members in [&self.any_of, &self.one_of].into_iter().flatten() {
            let non_null: Vec<&Schema> = members.iter().filter(|s| !s.is_null_type()).collect();
            if non_null.len() == 1 && non_null.len() < members.len() {
                return non_null.first().copied();
            }
        }
        None
    }

    /// True for `{"type": "null"}`.
    pub fn is_null_type(&self) -> bool {
        matches!(&self.schema_type, Some(SchemaType::Single(t)) if t == "null")
    }

    /// Declared non-null type names.
    pub fn type_names(&self) -> Vec<&str> {
        match &self.schema_type {
            None => Vec::new(),
            Some(SchemaType::Single(t)) => vec![t.as_str()],
            Some(SchemaType::Multiple(types)) => types
                .iter()
                .map(String::as_str)
                .filter(|t| *t != "null")
                .collect(),
        }
    }
}

/// Last segment of a JSON pointer, with `~1`/`~0` escapes decoded.
pub fn ref_key(ref_path: &str) -> String {
    ref_path
        .rsplit('/')
        .next()
        .unwrap_or(ref_path)
        .replace("~1", "/")
        .replace("~0", "~")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_path_item_keeps_method_order() {
        let item: PathItem = serde_json::from_str(
            r#"{
                "summary": "ignored",
                "post": { "operationId": "create" },
                "parameters": [{ "name": "id", "in": "path", "required": true }],
                "get": { "operationId": "read" }
            }"#,
        )
        .unwrap();
        let methods: Vec<Method> = item.operations.iter().map(|(m, _)| *m).collect();
        assert_eq!(methods, vec![Method::Post, Method::Get]);
        assert_eq!(item.parameters.len(), 1);
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let schema: Schema = serde_json::from_str(
            r#"{ "type": "object", "properties": { "zeta": {}, "alpha": {}, "mid": {} } }"#,
        )
        .unwrap();
        let names: Vec<&String> = schema.properties.as_ref().unwrap().keys().collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_is_nullable_variants() {
        let flag: Schema =
            serde_json::from_str(r#"{ "type": "string", "nullable": true }"#).unwrap();
        let array: Schema = serde_json::from_str(r#"{ "type": ["string", "null"] }"#).unwrap();
        let any_of: Schema =
            serde_json::from_str(r#"{ "anyOf": [{ "type": "string" }, { "type": "null" }] }"#)
                .unwrap();
        let plain: Schema = serde_json::from_str(r#"{ "type": "string" }"#).unwrap();
        assert!(flag.is_nullable());
        assert!(array.is_nullable());
        assert!(any_of.is_nullable());
        assert!(!plain.is_nullable());
        assert!(any_of.unwrap_nullable().is_some());
        assert_eq!(array.type_names(), ["string"]);
    }

    #[test]
    fn test_follow_component_references() {
        let doc: Document = serde_json::from_str(
            r##"{
                "openapi": "3.0.0",
                "components": {
                    "responses": {
                        "Alias": { "$ref": "#/components/responses/NotFound" },
                        "NotFound": { "description": "missing" }
                    }
                }
            }"##,
        )
        .unwrap();
        let item = RefOr::Ref(Reference {
            ref_path: "#/components/responses/Alias".to_string(),
        });
        assert_eq!(doc.response(&item).unwrap().description, "missing");
    }

    #[test]
    fn test_ref_key_decodes_pointer_escapes() {
        assert_eq!(ref_key("#/components/schemas/Pet"), "Pet");
        assert_eq!(ref_key("#/components/schemas/a~1b"), "a/b");
    }
}
