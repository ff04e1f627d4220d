//! TypeScript type expressions for IR models.
//!
//! Each model kind maps to one expression form. Named models are always
//! referred to by name, so output never recurses into another definition.

use crate::openapi::ir::{Model, ModelKind};
use crate::openapi::ir::utils::TS_RESERVED_WORDS;

/// Trait for emitting TypeScript source from IR nodes.
pub trait Emit {
    /// Convert the node to its TypeScript representation.
    fn emit(&self) -> String;
}

/// Check if a property key needs quoting.
///
/// Returns true if the name:
/// - Is empty
/// - Doesn't start with a letter, underscore, or dollar sign
/// - Contains characters other than alphanumeric, underscore, or dollar sign
pub fn needs_quoting(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a string for use in a single-quoted TypeScript literal.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Quote a property or enum key if it is not a plain identifier.
pub fn quote_if_needed(name: &str) -> String {
    if needs_quoting(name) {
        format!("'{}'", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// A JSON value as a TypeScript literal.
pub fn literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => format!("'{}'", escape_js_string(s)),
        other => other.to_string(),
    }
}

/// Enum member key: the member name if it is a valid identifier that is not
/// reserved, otherwise quoted.
pub fn enum_key(name: &str) -> String {
    if TS_RESERVED_WORDS.contains(name) {
        format!("'{name}'")
    } else {
        quote_if_needed(name)
    }
}

fn primitive(base: &str) -> &str {
    match base {
        "integer" | "number" => "number",
        "binary" => "Blob",
        "string" | "boolean" | "null" | "void" | "any" => base,
        _ => "any",
    }
}

fn join(members: &[Model], separator: &str) -> String {
    let parts: Vec<String> = members.iter().map(Emit::emit).collect();
    match parts.len() {
        0 => "any".to_string(),
        1 => parts.into_iter().collect(),
        _ => format!("({})", parts.join(separator)),
    }
}

/// Object literal type for inline interfaces, one member per line.
pub fn object_type(properties: &[Model]) -> String {
    if properties.is_empty() {
        return "Record<string, any>".to_string();
    }
    let mut out = String::from("{\n");
    for property in properties {
        let readonly = if property.is_read_only { "readonly " } else { "" };
        let optional = if property.is_required { "" } else { "?" };
        out.push_str(&format!(
            "{readonly}{}{optional}: {};\n",
            quote_if_needed(&property.name),
            property.emit()
        ));
    }
    out.push('}');
    out
}

impl Emit for Model {
    fn emit(&self) -> String {
        let expr = match self.kind {
            ModelKind::Reference => self.base.clone(),
            ModelKind::Primitive => primitive(&self.base).to_string(),
            ModelKind::Enum if self.enum_members.is_empty() => primitive(&self.base).to_string(),
            ModelKind::Enum => {
                let values: Vec<String> =
                    self.enum_members.iter().map(|m| literal(&m.value)).collect();
                if values.len() == 1 {
                    values.concat()
                } else {
                    format!("({})", values.join(" | "))
                }
            }
            ModelKind::Array => {
                let item = self.link.as_deref().map_or_else(|| "any".to_string(), Emit::emit);
                format!("Array<{item}>")
            }
            ModelKind::Dictionary => {
                let value = self.link.as_deref().map_or_else(|| "any".to_string(), Emit::emit);
                format!("Record<string, {value}>")
            }
            ModelKind::Interface => object_type(&self.properties),
            ModelKind::OneOf | ModelKind::AnyOf => join(&self.properties, " | "),
            ModelKind::AllOf => join(&self.properties, " & "),
        };

        if self.is_nullable && expr != "null" && expr != "any" {
            format!("({expr} | null)")
        } else {
            expr
        }
    }
}
