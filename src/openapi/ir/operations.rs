//! Operation building: one path + method to an `Operation`.
//!
//! This module handles all the per-operation OpenAPI logic:
//! - Parameter merging (operation-level overrides path-level)
//! - Request body folding into a synthetic `requestBody` parameter
//! - Response partitioning into ok/error results and readable errors

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::openapi::spec::{
    self, Document, MediaType, Method, Parameter, ParameterLocation, RefOr, Schema, ref_key,
};

use super::models::{ModelScope, PromotedResponses};
use super::types::{
    Model, Operation, OperationError, OperationParameter, OperationResponse, ParameterIn,
    StatusCode,
};
use super::utils::{
    DEFAULT_SERVICE, capitalize_first, pascal_case, sanitize_ts_identifier, service_name,
    unique_name,
};

/// Placeholder for the API version inside paths.
const API_VERSION_PLACEHOLDER: &str = "api-version";

/// Template literal expression the version placeholder expands to.
pub const VERSION_TEMPLATE: &str = "OpenAPI.VERSION";

/// Media types tried in order when a body or response declares several.
const PREFERRED_MEDIA_TYPES: [&str; 7] = [
    "application/json-patch+json",
    "application/json",
    "application/x-www-form-urlencoded",
    "multipart/form-data",
    "multipart/mixed",
    "multipart/related",
    "multipart/batch",
];

/// Read-only inputs shared by every operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationContext<'a> {
    /// Document the `$ref`s resolve against.
    pub doc: &'a Document,
    /// Promoted response names.
    pub promoted: &'a PromotedResponses,
}

/// Pick the preferred media type and its schema.
fn preferred_content(content: &IndexMap<String, MediaType>) -> Option<(&String, &Schema)> {
    let with_schema = |key: &str| {
        content
            .get_key_value(key)
            .and_then(|(k, media)| media.schema.as_ref().map(|s| (k, s)))
    };
    PREFERRED_MEDIA_TYPES
        .iter()
        .find_map(|key| with_schema(key))
        .or_else(|| {
            content
                .iter()
                .find_map(|(k, media)| media.schema.as_ref().map(|s| (k, s)))
        })
}

/// Operation name: camel-cased `operationId`, or method plus path segments.
pub fn operation_name(operation_id: Option<&str>, method: Method, path: &str) -> String {
    if let Some(id) = operation_id.filter(|id| !id.trim().is_empty()) {
        return sanitize_ts_identifier(id);
    }
    let mut name = method.as_str().to_string();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if let Some(param) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            name.push_str("By");
            name.push_str(&pascal_case(param));
        } else {
            name.push_str(&pascal_case(segment));
        }
    }
    sanitize_ts_identifier(&name)
}

/// `{param}` names in left-to-right order, each listed once.
pub fn path_parameters(path: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        rest = &rest[start + len + 1..];
    }
    names
}

/// Rewrite every `{param}` with `render(param)`.
fn rewrite_path(path: &str, render: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(path.len() + 8);
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&render(&rest[start + 1..start + len]));
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

/// Path as a template literal body: `/pets/{pet-id}` becomes `/pets/${petId}`.
pub fn path_pattern(path: &str) -> String {
    template_path(path, sanitize_ts_identifier)
}

fn template_path(path: &str, identifier: impl Fn(&str) -> String) -> String {
    rewrite_path(path, |param| {
        if param == API_VERSION_PLACEHOLDER {
            format!("${{{VERSION_TEMPLATE}}}")
        } else {
            format!("${{{}}}", identifier(param))
        }
    })
}

/// Path in router syntax: `/pets/{id}` becomes `/pets/:id`.
pub fn route_pattern(path: &str) -> String {
    rewrite_path(path, |param| format!(":{param}"))
}

/// Standard reason phrase for a status code.
pub fn status_reason(code: StatusCode) -> Option<&'static str> {
    let reason = match code {
        StatusCode::Default => return None,
        StatusCode::Range(1) => "Informational",
        StatusCode::Range(2) => "Success",
        StatusCode::Range(3) => "Redirection",
        StatusCode::Range(4) => "Client Error",
        StatusCode::Range(5) => "Server Error",
        StatusCode::Range(_) => return None,
        StatusCode::Code(code) => match code {
            100 => "Continue",
            101 => "Switching Protocols",
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            304 => "Not Modified",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            402 => "Payment Required",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            406 => "Not Acceptable",
            408 => "Request Timeout",
            409 => "Conflict",
            410 => "Gone",
            412 => "Precondition Failed",
            413 => "Payload Too Large",
            415 => "Unsupported Media Type",
            422 => "Unprocessable Entity",
            423 => "Locked",
            428 => "Precondition Required",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => return None,
        },
    };
    Some(reason)
}

const fn parameter_in(location: ParameterLocation) -> ParameterIn {
    match location {
        ParameterLocation::Path => ParameterIn::Path,
        ParameterLocation::Query => ParameterIn::Query,
        ParameterLocation::Header => ParameterIn::Header,
        ParameterLocation::Cookie => ParameterIn::Cookie,
    }
}

/// Merge path-level and operation-level parameters. An operation-level
/// parameter replaces a path-level one with the same name and location.
fn merge_parameters<'a>(
    doc: &'a Document,
    path_level: &'a [RefOr<Parameter>],
    op_level: &'a [RefOr<Parameter>],
) -> Vec<&'a Parameter> {
    let mut merged: Vec<&Parameter> =
        path_level.iter().filter_map(|p| doc.parameter(p)).collect();
    for param in op_level.iter().filter_map(|p| doc.parameter(p)) {
        merged.retain(|existing| {
            !(existing.name == param.name && existing.location == param.location)
        });
        merged.push(param);
    }
    merged
}

/// Argument identifier for each merged parameter, plus every name in use.
///
/// Path parameters claim their names first. Any later parameter whose
/// identifier is taken (`id` in path and query, `page-size` next to
/// `pageSize`) gets a numeric suffix; its wire name is unaffected.
fn parameter_identifiers(params: &[&Parameter]) -> (Vec<String>, HashSet<String>) {
    let mut taken = HashSet::with_capacity(params.len() + 1);
    let mut names = vec![String::new(); params.len()];
    let path_first = params
        .iter()
        .enumerate()
        .filter(|(_, p)| p.location == ParameterLocation::Path)
        .chain(
            params
                .iter()
                .enumerate()
                .filter(|(_, p)| p.location != ParameterLocation::Path),
        );
    for (index, param) in path_first {
        let name = unique_name(&sanitize_ts_identifier(&param.name), &taken);
        taken.insert(name.clone());
        names[index] = name;
    }
    (names, taken)
}

/// Build one operation and the models hoisted out of it.
pub fn get_operation(
    ctx: OperationContext<'_>,
    path: &str,
    method: Method,
    op: &spec::Operation,
    path_level: &[RefOr<Parameter>],
) -> (Operation, Vec<Model>) {
    let service = op
        .tags
        .first()
        .map_or_else(|| DEFAULT_SERVICE.to_string(), |tag| service_name(tag));
    let name = operation_name(op.operation_id.as_deref(), method, path);
    let root = capitalize_first(&name);
    let mut scope = ModelScope::new(format!("{} {path}", method.as_str()));

    let mut operation = Operation {
        service,
        hook_name: format!("use{root}"),
        name,
        summary: op.summary.clone(),
        description: op.description.clone(),
        deprecated: op.deprecated,
        method,
        path: path.to_string(),
        path_parameters: path_parameters(path),
        path_pattern: path_pattern(path),
        route_pattern: route_pattern(path),
        parameters: Vec::new(),
        parameters_path: Vec::new(),
        parameters_query: Vec::new(),
        parameters_header: Vec::new(),
        parameters_cookie: Vec::new(),
        parameters_body: None,
        imports: Vec::new(),
        results: Vec::new(),
        ok_results: Vec::new(),
        error_results: Vec::new(),
        errors: Vec::new(),
        response_header: None,
    };

    let merged = merge_parameters(ctx.doc, path_level, &op.parameters);
    let (identifiers, taken) = parameter_identifiers(&merged);
    for (param, identifier) in merged.into_iter().zip(identifiers) {
        let schema = param.schema.as_ref().or_else(|| {
            param
                .content
                .as_ref()
                .and_then(|c| preferred_content(c).map(|(_, s)| s))
        });
        let mut model = match schema {
            Some(schema) => {
                scope.nested(&param.name, schema, &[root.clone(), pascal_case(&param.name)])
            }
            None => Model::primitive(&param.name, "any"),
        };
        let location = parameter_in(param.location);
        model.is_required = param.required || location == ParameterIn::Path;
        model.deprecated |= param.deprecated;

        let parameter = OperationParameter {
            prop: param.name.clone(),
            name: identifier,
            location,
            description: param.description.clone(),
            media_type: None,
            model,
        };
        match location {
            ParameterIn::Path => operation.parameters_path.push(parameter.clone()),
            ParameterIn::Query => operation.parameters_query.push(parameter.clone()),
            ParameterIn::Header => operation.parameters_header.push(parameter.clone()),
            ParameterIn::Cookie | ParameterIn::Body => {
                operation.parameters_cookie.push(parameter.clone());
            }
        }
        operation.parameters.push(parameter);
    }

    if let Some(body) = op.request_body.as_ref().and_then(|b| ctx.doc.request_body(b))
        && let Some((media_type, schema)) = preferred_content(&body.content)
    {
        let naming = [root.clone(), "RequestBody".to_string()];
        let mut model = scope.nested("requestBody", schema, &naming);
        model.is_required = body.required;
        let parameter = OperationParameter {
            prop: "requestBody".to_string(),
            name: unique_name("requestBody", &taken),
            location: ParameterIn::Body,
            description: body.description.clone(),
            media_type: Some(media_type.clone()),
            model,
        };
        operation.parameters_body = Some(parameter.clone());
        operation.parameters.push(parameter);
    }

    let pattern = template_path(path, |param| {
        operation
            .parameters_path
            .iter()
            .find(|p| p.prop == param)
            .map_or_else(|| sanitize_ts_identifier(param), |p| p.name.clone())
    });
    operation.path_pattern = pattern;

    // Required parameters first; stable so declaration order is kept otherwise.
    operation
        .parameters
        .sort_by_key(|p| !p.model.is_required);

    for (key, item) in &op.responses {
        let Some(code) = StatusCode::parse(key) else {
            warn!(
                path,
                method = method.as_str(),
                status = %key,
                "Skipping unrecognized response status."
            );
            continue;
        };
        let Some(response) = ctx.doc.response(item) else {
            warn!(
                path,
                method = method.as_str(),
                status = %key,
                "Skipping unresolved response reference."
            );
            continue;
        };
        let content = preferred_content(&response.content);
        let promoted = match (item, content) {
            (RefOr::Ref(reference), Some((media_type, _))) => ctx
                .promoted
                .get(&(ref_key(&reference.ref_path), media_type.clone())),
            _ => None,
        };
        let model = match (promoted, content) {
            (Some(model_name), _) => Model::reference("", model_name.clone()),
            (None, Some((_, schema))) => {
                scope.nested("", schema, &[root.clone(), format!("Response{}", code.label())])
            }
            (None, None) => Model::primitive("", "void"),
        };
        operation.results.push(OperationResponse {
            code,
            description: response.description.clone(),
            media_type: content.map(|(media_type, _)| media_type.clone()),
            model,
            header: response.headers.keys().next().cloned(),
        });
    }

    let (ok, error): (Vec<_>, Vec<_>) = operation
        .results
        .iter()
        .cloned()
        .partition(|r| r.code.is_success());
    operation.ok_results = ok;
    operation.error_results = error;
    operation.errors = operation
        .error_results
        .iter()
        .map(|r| OperationError {
            code: r.code,
            description: status_reason(r.code)
                .map(str::to_string)
                .or_else(|| Some(r.description.clone()).filter(|d| !d.is_empty()))
                .unwrap_or_else(|| "Unknown Error".to_string()),
        })
        .collect();

    // First declared header wins; later ones are ignored.
    let mut headers = operation.ok_results.iter().filter_map(|r| r.header.as_deref());
    operation.response_header = headers.next().map(str::to_string);
    for ignored in headers.filter(|h| Some(*h) != operation.response_header.as_deref()) {
        debug!(
            operation = %operation.name,
            header = ignored,
            "Ignoring additional response header."
        );
    }

    operation.refresh_imports();
    (operation, scope.into_hoisted())
}
