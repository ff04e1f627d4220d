//! The `services` category: one module per service.
//!
//! Everything type-related is computed here so the templates only lay text
//! out: signatures, argument lists, result unions and error tables arrive as
//! ready strings.

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::config::{Options, Variation};
use crate::error::Result;
use crate::openapi::ir::operations::VERSION_TEMPLATE;
use crate::openapi::ir::{ModelKind, Operation, OperationParameter, Service};

use super::render::Artifact;
use super::typescript::{Emit, escape_js_string, quote_if_needed};
use super::{CategoryDir, Emitter};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldContext {
    prop: String,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BodyContext {
    name: String,
    media_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorContext {
    code: String,
    description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OperationContext {
    name: String,
    hook_name: String,
    doc: Vec<String>,
    method: String,
    path_pattern: String,
    route_pattern: String,
    signature: String,
    arguments: String,
    deps: String,
    result: String,
    path: Vec<FieldContext>,
    query: Vec<FieldContext>,
    headers: Vec<FieldContext>,
    cookies: Vec<FieldContext>,
    body: Option<BodyContext>,
    errors: Vec<ErrorContext>,
    response_header: Option<String>,
    validator: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceContext {
    name: String,
    imports: Vec<String>,
    validators: Vec<String>,
    operations: Vec<OperationContext>,
    http_client: &'static str,
    use_union_types: bool,
    use_version: bool,
    use_options: bool,
    runtime_validation: bool,
    precompile_validator: bool,
    throw_on_request_failed: bool,
    verbose_http_log: bool,
}

/// File name of a service module.
pub fn service_file(service: &Service) -> String {
    format!("{}Service.ts", service.name)
}

/// Text safe to place inside a `/** */` block.
pub fn doc_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_end().replace("*/", "*\\/"))
        .collect()
}

fn parameter_type(parameter: &OperationParameter) -> String {
    parameter.model.emit()
}

/// Function parameter list and the matching call-site argument list.
fn signature(parameters: &[OperationParameter], use_options: bool) -> (String, String) {
    if parameters.is_empty() {
        return (String::new(), String::new());
    }
    let names: Vec<&str> = parameters.iter().map(|p| p.name.as_str()).collect();
    if use_options {
        let fields: Vec<String> = parameters
            .iter()
            .map(|p| {
                let optional = if p.model.is_required { "" } else { "?" };
                format!("{}{optional}: {};", p.name, parameter_type(p))
            })
            .collect();
        let all_optional = parameters.iter().all(|p| !p.model.is_required);
        let default = if all_optional { " = {}" } else { "" };
        let binding = format!("{{ {} }}", names.join(", "));
        (
            format!("{binding}: {{ {} }}{default}", fields.join(" ")),
            binding,
        )
    } else {
        let params: Vec<String> = parameters
            .iter()
            .map(|p| {
                let optional = if p.model.is_required { "" } else { "?" };
                format!("{}{optional}: {}", p.name, parameter_type(p))
            })
            .collect();
        (params.join(", "), names.join(", "))
    }
}

/// Union of the success result types, `void` when there are none.
fn result_type(operation: &Operation) -> String {
    let mut seen = BTreeSet::new();
    let types: Vec<String> = operation
        .ok_results
        .iter()
        .map(|r| r.model.emit())
        .filter(|t| seen.insert(t.clone()))
        .collect();
    if types.is_empty() {
        "void".to_string()
    } else {
        types.join(" | ")
    }
}

/// Name of the model to validate responses against, when every success
/// result is the same named model.
fn validated_model(operation: &Operation) -> Option<String> {
    let mut names = operation.ok_results.iter().map(|r| {
        (r.model.kind == ModelKind::Reference && !r.model.is_nullable)
            .then(|| r.model.base.clone())
    });
    let first = names.next()??;
    names.all(|n| n.as_deref() == Some(first.as_str())).then_some(first)
}

fn fields(parameters: &[OperationParameter]) -> Vec<FieldContext> {
    parameters
        .iter()
        .map(|p| FieldContext {
            prop: escape_js_string(&p.prop),
            name: p.name.clone(),
        })
        .collect()
}

fn operation_doc(operation: &Operation, options: &Options) -> Vec<String> {
    let mut doc = Vec::new();
    if let Some(summary) = &operation.summary {
        doc.extend(doc_lines(summary));
    }
    if let Some(description) = &operation.description {
        doc.extend(doc_lines(description));
    }
    if operation.deprecated {
        doc.push("@deprecated".to_string());
    }
    for parameter in &operation.parameters {
        let description = parameter.description.as_deref().unwrap_or_default();
        let line = format!("@param {} {}", parameter.name, description);
        doc.extend(doc_lines(line.trim_end()));
    }
    if options.throw_on_request_failed {
        for error in &operation.errors {
            doc.push(format!("@throws ApiError {} {}", error.code, error.description));
        }
    }
    doc
}

fn operation_context(operation: &Operation, options: &Options) -> OperationContext {
    let (signature, arguments) = signature(&operation.parameters, options.use_options);
    let names: Vec<&str> = operation.parameters.iter().map(|p| p.name.as_str()).collect();
    let validator = (options.runtime_validation && options.precompile_validator)
        .then(|| validated_model(operation))
        .flatten();

    OperationContext {
        name: operation.name.clone(),
        hook_name: operation.hook_name.clone(),
        doc: operation_doc(operation, options),
        method: operation.method.as_str().to_uppercase(),
        path_pattern: operation.path_pattern.replace('`', "\\`"),
        route_pattern: escape_js_string(&operation.route_pattern),
        signature,
        arguments,
        deps: format!("[{}]", names.join(", ")),
        result: result_type(operation),
        path: fields(&operation.parameters_path),
        query: fields(&operation.parameters_query),
        headers: fields(&operation.parameters_header),
        cookies: fields(&operation.parameters_cookie),
        body: operation.parameters_body.as_ref().map(|body| BodyContext {
            name: body.name.clone(),
            media_type: body.media_type.clone().unwrap_or_default(),
        }),
        errors: operation
            .errors
            .iter()
            .map(|e| ErrorContext {
                code: quote_if_needed(&e.code.to_string()),
                description: escape_js_string(&e.description),
            })
            .collect(),
        response_header: operation.response_header.as_deref().map(escape_js_string),
        validator,
    }
}

fn service_context(service: &Service, options: &Options) -> ServiceContext {
    let operations: Vec<OperationContext> = service
        .operations
        .iter()
        .map(|o| operation_context(o, options))
        .collect();
    let validators: BTreeSet<String> = operations
        .iter()
        .filter_map(|o| o.validator.clone())
        .collect();

    ServiceContext {
        name: service.name.clone(),
        imports: service.imports.clone(),
        validators: validators.into_iter().collect(),
        use_version: service
            .operations
            .iter()
            .any(|o| o.path_pattern.contains(VERSION_TEMPLATE)),
        operations,
        http_client: options.http_client.as_str(),
        use_union_types: options.use_union_types,
        use_options: options.use_options,
        runtime_validation: options.runtime_validation,
        precompile_validator: options.precompile_validator,
        throw_on_request_failed: options.throw_on_request_failed,
        verbose_http_log: options.verbose_http_log,
    }
}

/// Render and write every service with the template of the chosen variation.
pub fn write_services(
    emitter: &Emitter,
    dir: &CategoryDir<'_>,
    services: &[Service],
    options: &Options,
) -> Result<()> {
    let artifact = match options.variation {
        Variation::ReactHook => Artifact::ReactHookService,
        Variation::Fastify => Artifact::FastifyService,
    };
    debug!(services = services.len(), variation = %options.variation, "Writing services.");

    services.par_iter().try_for_each(|service| {
        let context = service_context(service, options);
        dir.write(
            &service_file(service),
            &emitter.render_formatted(artifact, &context)?,
        )
    })
}
