//! Client IR types.
//!
//! This module defines the normalized representation the emission pipeline
//! renders from:
//! - Client: version, server, models and services
//! - Model: one type definition, or an inline type nested inside one
//! - Service/Operation: grouped HTTP operations with parameters and results
//!
//! Models never embed other named models. A reference to a named model is a
//! `ModelKind::Reference` whose `base` holds the target name, which is how
//! recursive schemas stay finite.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::openapi::spec::Method;

/// Prefix marking a provisional name assigned to a synthesized model. The
/// post-processor replaces every such name with a final identifier.
pub const PROVISIONAL_PREFIX: char = '#';

/// Shape of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// Named back-reference to another model.
    Reference,
    /// string, number, integer, boolean, binary, null, void or any.
    Primitive,
    /// Closed set of literal values.
    Enum,
    /// Homogeneous list; `link` holds the item type.
    Array,
    /// String-keyed map; `link` holds the value type.
    Dictionary,
    /// Object with named properties.
    Interface,
    /// Exactly one of `properties`.
    OneOf,
    /// Any of `properties`.
    AnyOf,
    /// Intersection of `properties`.
    AllOf,
}

impl ModelKind {
    /// Kebab-case name used by templates.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Primitive => "primitive",
            Self::Enum => "enum",
            Self::Array => "array",
            Self::Dictionary => "dictionary",
            Self::Interface => "interface",
            Self::OneOf => "one-of",
            Self::AnyOf => "any-of",
            Self::AllOf => "all-of",
        }
    }

    /// True for the three composition kinds.
    pub const fn is_composition(self) -> bool {
        matches!(self, Self::OneOf | Self::AnyOf | Self::AllOf)
    }
}

/// Where a definition-level model came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOrigin {
    /// A `components.schemas` entry.
    Schema,
    /// A promoted `components.responses` entry.
    Response {
        /// Response component name.
        component: String,
        /// Media type the schema was declared under.
        media_type: String,
    },
    /// An anonymous object schema hoisted out of its parent. `segments` is
    /// the naming path the final name is derived from.
    Synthesized {
        /// Naming path, outermost first.
        segments: Vec<String>,
    },
}

impl fmt::Display for ModelOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema => f.write_str("component schema"),
            Self::Response {
                component,
                media_type,
            } => write!(f, "response \"{component}\" ({media_type})"),
            Self::Synthesized { segments } => {
                write!(f, "inline schema at {}", segments.join("."))
            }
        }
    }
}

/// One enum member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    /// Member identifier.
    pub name: String,
    /// Literal value.
    pub value: serde_json::Value,
    /// From `x-enum-descriptions`.
    pub description: Option<String>,
}

/// Validation keywords carried through to the schema renderers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    /// Regular expression for strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Inclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Exclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    /// Exclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    /// Number the value must divide by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    /// Shortest allowed string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Longest allowed string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Fewest array items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    /// Most array items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// Array items must be distinct.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    /// Fewest object properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    /// Most object properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
}

/// A type definition, a property, or an inline type inside either.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Definition name, or property name for properties, or empty.
    pub name: String,
    /// Shape of the type.
    pub kind: ModelKind,
    /// Referenced model name for references, primitive name for primitives,
    /// value type for enums, `any` otherwise.
    pub base: String,
    /// Element type for arrays and dictionaries.
    pub link: Option<Box<Model>>,
    /// Schema description, rendered as a doc comment.
    pub description: Option<String>,
    /// True for models that get their own file.
    pub is_definition: bool,
    /// Required property or parameter.
    pub is_required: bool,
    /// Accepts `null` besides its own type.
    pub is_nullable: bool,
    /// Rendered with `readonly`.
    pub is_read_only: bool,
    /// Marked `deprecated` in the document.
    pub deprecated: bool,
    /// Schema `format`, such as `date-time`.
    pub format: Option<String>,
    /// Schema `default` value.
    pub default: Option<serde_json::Value>,
    /// Validation keywords.
    pub constraints: Constraints,
    /// Members of an enum model, values deduplicated.
    pub enum_members: Vec<EnumMember>,
    /// Object properties, or composition members.
    pub properties: Vec<Model>,
    /// Sorted names of every model referenced beneath this one, excluding
    /// the definition itself.
    pub imports: Vec<String>,
    /// Source of a definition-level model.
    pub origin: ModelOrigin,
}

impl Model {
    /// An empty model of the given kind.
    pub fn new(name: impl Into<String>, kind: ModelKind, base: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            base: base.into(),
            link: None,
            description: None,
            is_definition: false,
            is_required: false,
            is_nullable: false,
            is_read_only: false,
            deprecated: false,
            format: None,
            default: None,
            constraints: Constraints::default(),
            enum_members: Vec::new(),
            properties: Vec::new(),
            imports: Vec::new(),
            origin: ModelOrigin::Schema,
        }
    }

    /// A named back-reference to `target`.
    pub fn reference(name: impl Into<String>, target: impl Into<String>) -> Self {
        let target = target.into();
        let mut model = Self::new(name, ModelKind::Reference, target.clone());
        model.imports = vec![target];
        model
    }

    /// A primitive model.
    pub fn primitive(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self::new(name, ModelKind::Primitive, base)
    }

    /// True while the model still carries a provisional synthesized name.
    pub fn is_provisional(&self) -> bool {
        self.name.starts_with(PROVISIONAL_PREFIX)
    }

    /// Visit this model and every model nested inside it.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Model)) {
        visit(self);
        if let Some(link) = self.link.as_deref_mut() {
            link.walk_mut(visit);
        }
        for property in &mut self.properties {
            property.walk_mut(visit);
        }
    }

    /// Collect the names of every model referenced at or beneath this one.
    pub fn collect_references(&self, out: &mut BTreeSet<String>) {
        if self.kind == ModelKind::Reference {
            out.insert(self.base.clone());
        }
        if let Some(link) = &self.link {
            link.collect_references(out);
        }
        for property in &self.properties {
            property.collect_references(out);
        }
    }

    /// Recompute `imports` for this model and everything nested in it.
    pub fn refresh_imports(&mut self) {
        if let Some(link) = self.link.as_deref_mut() {
            link.refresh_imports();
        }
        for property in &mut self.properties {
            property.refresh_imports();
        }
        let mut names = BTreeSet::new();
        self.collect_references(&mut names);
        if self.is_definition {
            names.remove(&self.name);
        }
        self.imports = names.into_iter().collect();
    }
}

/// Where an operation parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// `{param}` in the path.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
    /// The request body.
    Body,
}

/// One operation parameter, including the synthetic body parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationParameter {
    /// Name on the wire.
    pub prop: String,
    /// Identifier used in generated code.
    pub name: String,
    /// Where the value is sent.
    pub location: ParameterIn,
    /// Parameter description.
    pub description: Option<String>,
    /// Media type, only for the body parameter.
    pub media_type: Option<String>,
    /// Parameter type; `model.is_required` marks required parameters.
    pub model: Model,
}

/// Status code key of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// A concrete code such as 404.
    Code(u16),
    /// A class wildcard such as `4XX`; holds the leading digit.
    Range(u8),
    /// The `default` response.
    Default,
}

impl StatusCode {
    /// Parse a `responses` map key.
    pub fn parse(key: &str) -> Option<Self> {
        if key == "default" {
            return Some(Self::Default);
        }
        if let Ok(code) = key.parse::<u16>() {
            return (100..=599).contains(&code).then_some(Self::Code(code));
        }
        let mut chars = key.chars();
        match (chars.next(), chars.as_str()) {
            (Some(digit @ '1'..='5'), "XX" | "xx") => Some(Self::Range(digit as u8 - b'0')),
            _ => None,
        }
    }

    /// 2xx codes, the `2XX` range and `default` count as success.
    pub fn is_success(self) -> bool {
        match self {
            Self::Code(code) => (200..=299).contains(&code),
            Self::Range(class) => class == 2,
            Self::Default => true,
        }
    }

    /// Label used in synthesized names and rendered output.
    pub fn label(self) -> String {
        match self {
            Self::Code(code) => code.to_string(),
            Self::Range(class) => format!("{class}XX"),
            Self::Default => "Default".to_string(),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Range(class) => write!(f, "{class}XX"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// One entry of an operation's `responses` map.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResponse {
    /// Declared status key.
    pub code: StatusCode,
    /// Response description.
    pub description: String,
    /// Media type the body was read from.
    pub media_type: Option<String>,
    /// Body type; a `void` primitive when the response has no content.
    pub model: Model,
    /// First header declared on the response, if any.
    pub header: Option<String>,
}

/// A non-success status paired with a readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationError {
    /// Non-success status key.
    pub code: StatusCode,
    /// Reason phrase, or the response description.
    pub description: String,
}

impl Serialize for StatusCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One HTTP operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Owning service name.
    pub service: String,
    /// Function name, unique within the service.
    pub name: String,
    /// Identifier used by the hook-oriented variation.
    pub hook_name: String,
    /// Operation summary.
    pub summary: Option<String>,
    /// Operation description.
    pub description: Option<String>,
    /// Marked `deprecated` in the document.
    pub deprecated: bool,
    /// HTTP method.
    pub method: Method,
    /// Path as declared, with `{param}` placeholders.
    pub path: String,
    /// `{param}` names in left-to-right order.
    pub path_parameters: Vec<String>,
    /// Path as a template literal body, `{param}` rewritten to `${param}`.
    pub path_pattern: String,
    /// Path in router syntax, `{param}` rewritten to `:param`.
    pub route_pattern: String,
    /// All parameters, required first.
    pub parameters: Vec<OperationParameter>,
    /// Path parameters, in declaration order.
    pub parameters_path: Vec<OperationParameter>,
    /// Query parameters, in declaration order.
    pub parameters_query: Vec<OperationParameter>,
    /// Header parameters, in declaration order.
    pub parameters_header: Vec<OperationParameter>,
    /// Cookie parameters, in declaration order.
    pub parameters_cookie: Vec<OperationParameter>,
    /// The request body, if any.
    pub parameters_body: Option<OperationParameter>,
    /// Sorted names of the models the operation refers to.
    pub imports: Vec<String>,
    /// Every declared response.
    pub results: Vec<OperationResponse>,
    /// Responses with a success status.
    pub ok_results: Vec<OperationResponse>,
    /// All other responses.
    pub error_results: Vec<OperationResponse>,
    /// Readable reasons for `error_results`.
    pub errors: Vec<OperationError>,
    /// Header returned instead of the body, taken from the first
    /// success response that declares one.
    pub response_header: Option<String>,
}

impl Operation {
    /// Every model nested in parameters and results.
    pub fn models_mut(&mut self) -> impl Iterator<Item = &mut Model> {
        self.parameters
            .iter_mut()
            .chain(self.parameters_path.iter_mut())
            .chain(self.parameters_query.iter_mut())
            .chain(self.parameters_header.iter_mut())
            .chain(self.parameters_cookie.iter_mut())
            .chain(self.parameters_body.iter_mut())
            .map(|p| &mut p.model)
            .chain(
                self.results
                    .iter_mut()
                    .chain(self.ok_results.iter_mut())
                    .chain(self.error_results.iter_mut())
                    .map(|r| &mut r.model),
            )
    }

    /// Recompute `imports` from parameters and results.
    pub fn refresh_imports(&mut self) {
        let mut names = BTreeSet::new();
        for model in self.models_mut() {
            model.refresh_imports();
            model.collect_references(&mut names);
        }
        self.imports = names.into_iter().collect();
    }
}

/// Operations sharing a tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    /// Pascal-cased tag, or `Default`.
    pub name: String,
    /// Operations in declaration order.
    pub operations: Vec<Operation>,
    /// Union of the operations' imports.
    pub imports: Vec<String>,
}

/// The complete IR consumed by the emission pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    /// API version with any leading `v` removed.
    pub version: String,
    /// Base URL of the first server.
    pub server: String,
    /// Definition-level models, sorted by name.
    pub models: Vec<Model>,
    /// Services, sorted by name.
    pub services: Vec<Service>,
}

impl Client {
    /// Look a model up by name.
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Look a service up by name.
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_parse() {
        assert_eq!(StatusCode::parse("200"), Some(StatusCode::Code(200)));
        assert_eq!(StatusCode::parse("default"), Some(StatusCode::Default));
        assert_eq!(StatusCode::parse("4XX"), Some(StatusCode::Range(4)));
        assert_eq!(StatusCode::parse("42"), None);
        assert_eq!(StatusCode::parse("ok"), None);
    }

    #[test]
    fn test_status_code_success_partition() {
        assert!(StatusCode::Code(200).is_success());
        assert!(StatusCode::Code(299).is_success());
        assert!(StatusCode::Default.is_success());
        assert!(StatusCode::Range(2).is_success());
        assert!(!StatusCode::Code(300).is_success());
        assert!(!StatusCode::Code(199).is_success());
        assert!(!StatusCode::Range(5).is_success());
    }

    #[test]
    fn test_refresh_imports_excludes_self() {
        let mut node = Model::new("Node", ModelKind::Interface, "any");
        node.is_definition = true;
        node.properties.push(Model::reference("next", "Node"));
        node.properties.push(Model::reference("owner", "User"));
        let mut tags = Model::new("tags", ModelKind::Array, "any");
        tags.link = Some(Box::new(Model::reference("", "Tag")));
        node.properties.push(tags);
        node.refresh_imports();
        assert_eq!(node.imports, ["Tag", "User"]);
    }
}
