//! Naming helpers shared by the IR builders.
//!
//! Every identifier that ends up in generated TypeScript passes through one
//! of these functions, so re-running the generator on the same document always
//! produces the same names.

use std::collections::HashSet;
use std::sync::LazyLock;

/// TypeScript reserved words that cannot be used as identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "arguments",
        "await",
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "eval",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "implements",
        "import",
        "in",
        "instanceof",
        "interface",
        "let",
        "new",
        "null",
        "package",
        "private",
        "protected",
        "public",
        "return",
        "static",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
    ]
    .into_iter()
    .collect()
});

/// Make a schema key usable as a type name.
///
/// Leading characters that cannot start an identifier are dropped and every
/// run of other non-word characters becomes `_`. Valid names pass through
/// unchanged. A key with nothing left after that (`123`) keeps its word
/// characters behind a `_`, and a key without any falls back to `Model`.
pub fn sanitize_type_name(name: &str) -> String {
    let trimmed =
        name.trim_start_matches(|c: char| !(c.is_ascii_alphabetic() || c == '_' || c == '$'));
    let result = collapse_separators(trimmed);
    if !result.is_empty() {
        return result;
    }
    let body = collapse_separators(name);
    let body = body.trim_matches('_');
    if body.is_empty() {
        "Model".to_string()
    } else {
        format!("_{body}")
    }
}

fn collapse_separators(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
            result.push(c);
            in_separator = false;
        } else if !in_separator {
            result.push('_');
            in_separator = true;
        }
    }
    result
}

/// First name among `base`, `base2`, `base3`, ... that is not in `taken`.
pub fn unique_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Split on anything that is not an ASCII letter or digit. All-caps words
/// are lowered so `LIST_ALL` reads as `list` + `all`.
fn words(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            if part.len() > 1 && !part.chars().any(|c| c.is_ascii_lowercase()) {
                part.to_ascii_lowercase()
            } else {
                part.to_string()
            }
        })
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// `application/json` -> `ApplicationJson`, `pet_owner` -> `PetOwner`.
pub fn pascal_case(s: &str) -> String {
    words(s).map(|word| capitalize_first(&word)).collect()
}

/// `get-pet_by id` -> `getPetById`, `GetPets` -> `getPets`.
pub fn camel_case(s: &str) -> String {
    let mut parts = words(s);
    let Some(first) = parts.next() else {
        return String::new();
    };
    let mut result = lower_first(&first);
    for part in parts {
        result.push_str(&capitalize_first(&part));
    }
    result
}

/// Camel-case a name and make it a valid, non-reserved TypeScript identifier.
pub fn sanitize_ts_identifier(name: &str) -> String {
    let mut result = camel_case(name);

    // If empty after processing, use a default
    if result.is_empty() {
        return "_empty".to_string();
    }

    // Prepend underscore if starts with digit
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result = format!("_{result}");
    }

    // Check for reserved words (case-sensitive)
    if TS_RESERVED_WORDS.contains(result.as_str()) {
        result = format!("_{result}");
    }

    result
}

/// Name of the model promoted from a response component for one media type.
///
/// `("Error", "application/json")` gives `ErrorApplicationJsonResponse`.
pub fn response_model_name(definition_name: &str, media_type: &str) -> String {
    format!("{definition_name}{}Response", pascal_case(media_type))
}

/// Service name for a tag: `pet store` -> `PetStore`.
pub fn service_name(tag: &str) -> String {
    let name = pascal_case(tag.trim_start_matches(|c: char| !c.is_ascii_alphabetic()));
    if name.is_empty() {
        DEFAULT_SERVICE.to_string()
    } else {
        name
    }
}

/// Service that collects untagged operations.
pub const DEFAULT_SERVICE: &str = "Default";

/// Enum member name derived from a string value: `in-progress` -> `IN_PROGRESS`.
pub fn enum_member_name(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 4);
    let mut previous_lower = false;
    let mut in_separator = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if c.is_ascii_uppercase() && previous_lower {
                result.push('_');
            }
            result.push(c.to_ascii_uppercase());
            previous_lower = c.is_ascii_lowercase();
            in_separator = false;
        } else if !in_separator {
            result.push('_');
            previous_lower = false;
            in_separator = true;
        }
    }
    if result.is_empty() || result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_type_name() {
        assert_eq!(sanitize_type_name("Pet"), "Pet");
        assert_eq!(sanitize_type_name("Pet-Owner"), "Pet_Owner");
        assert_eq!(sanitize_type_name("api.v1.Pet"), "api_v1_Pet");
        assert_eq!(sanitize_type_name("1Pet"), "Pet");
        assert_eq!(sanitize_type_name("Foo  Bar"), "Foo_Bar");
        assert_eq!(sanitize_type_name("123"), "_123");
        assert_eq!(sanitize_type_name("1-2"), "_1_2");
        assert_eq!(sanitize_type_name("---"), "Model");
        assert_eq!(sanitize_type_name(""), "Model");
    }

    #[test]
    fn test_unique_name() {
        let taken: HashSet<String> = ["id", "id2"].into_iter().map(String::from).collect();
        assert_eq!(unique_name("name", &taken), "name");
        assert_eq!(unique_name("id", &taken), "id3");
    }

    #[test]
    fn test_sanitize_ts_identifier() {
        assert_eq!(sanitize_ts_identifier("foo"), "foo");
        assert_eq!(sanitize_ts_identifier("foo-bar"), "fooBar");
        assert_eq!(sanitize_ts_identifier("foo.bar"), "fooBar");
        assert_eq!(sanitize_ts_identifier("123foo"), "_123foo");
        assert_eq!(sanitize_ts_identifier("delete"), "_delete");
        assert_eq!(sanitize_ts_identifier("class"), "_class");
        assert_eq!(sanitize_ts_identifier("api-version"), "apiVersion");
        assert_eq!(sanitize_ts_identifier("---"), "_empty");
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("foo"), "Foo");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("ABC"), "ABC");
    }

    #[test]
    fn test_camel_and_pascal_case() {
        assert_eq!(camel_case("get-pet_by id"), "getPetById");
        assert_eq!(camel_case("GetPets"), "getPets");
        assert_eq!(camel_case("LIST_ALL"), "listAll");
        assert_eq!(pascal_case("application/json"), "ApplicationJson");
        assert_eq!(pascal_case("pet_owner"), "PetOwner");
        assert_eq!(pascal_case("PetStore"), "PetStore");
    }

    #[test]
    fn test_response_model_name() {
        assert_eq!(
            response_model_name("Error", "application/json"),
            "ErrorApplicationJsonResponse"
        );
        assert_eq!(
            response_model_name("Error", "text/plain"),
            "ErrorTextPlainResponse"
        );
        assert_ne!(
            response_model_name("Error", "application/json"),
            response_model_name("Error", "application/xml")
        );
    }

    #[test]
    fn test_service_name() {
        assert_eq!(service_name("pets"), "Pets");
        assert_eq!(service_name("pet store"), "PetStore");
        assert_eq!(service_name("123"), "Default");
    }

    #[test]
    fn test_enum_member_name() {
        assert_eq!(enum_member_name("active"), "ACTIVE");
        assert_eq!(enum_member_name("in-progress"), "IN_PROGRESS");
        assert_eq!(enum_member_name("camelCase"), "CAMEL_CASE");
        assert_eq!(enum_member_name("1st"), "_1ST");
        assert_eq!(enum_member_name(""), "_");
    }
}
