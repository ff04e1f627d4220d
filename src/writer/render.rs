//! Template rendering.
//!
//! The writer hands a JSON context per [`Artifact`] to a [`Renderer`] and gets
//! text back. [`TeraRenderer`] is the bundled implementation; its templates
//! are compiled into the binary.

use std::fmt::{self, Debug};

use tera::{Context, Tera};

use crate::error::{Error, Result};

/// Every kind of file the pipeline renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// `core/OpenAPI.ts`
    Settings,
    /// `core/ApiError.ts`
    ApiError,
    /// `core/ApiRequestOptions.ts`
    ApiRequestOptions,
    /// `core/ApiResult.ts`
    ApiResult,
    /// `core/request.ts`
    Request,
    /// `core/requestReactHook.ts`
    ReactHookRequest,
    /// Service module for the react-hook variation.
    ReactHookService,
    /// Service module for the fastify variation.
    FastifyService,
    /// `models/{Name}.ts`
    Model,
    /// `schemas/${Name}.ts`
    Schema,
    /// Ephemeral CommonJS schema consumed by the validator generator.
    ValidatorSchema,
    /// Ephemeral script that compiles every validator.
    ValidatorGenerator,
    /// `index.ts`
    Index,
}

impl Artifact {
    const ALL: [Self; 13] = [
        Self::Settings,
        Self::ApiError,
        Self::ApiRequestOptions,
        Self::ApiResult,
        Self::Request,
        Self::ReactHookRequest,
        Self::ReactHookService,
        Self::FastifyService,
        Self::Model,
        Self::Schema,
        Self::ValidatorSchema,
        Self::ValidatorGenerator,
        Self::Index,
    ];

    /// Template name.
    pub const fn template(self) -> &'static str {
        match self {
            Self::Settings => "core/OpenAPI.ts",
            Self::ApiError => "core/ApiError.ts",
            Self::ApiRequestOptions => "core/ApiRequestOptions.ts",
            Self::ApiResult => "core/ApiResult.ts",
            Self::Request => "core/request.ts",
            Self::ReactHookRequest => "core/requestReactHook.ts",
            Self::ReactHookService => "services/reactHook.ts",
            Self::FastifyService => "services/fastify.ts",
            Self::Model => "models/model.ts",
            Self::Schema => "schemas/schema.ts",
            Self::ValidatorSchema => "validators/schema.js",
            Self::ValidatorGenerator => "validators/generator.js",
            Self::Index => "index.ts",
        }
    }

    const fn source(self) -> &'static str {
        match self {
            Self::Settings => include_str!("../../templates/core/OpenAPI.ts.tera"),
            Self::ApiError => include_str!("../../templates/core/ApiError.ts.tera"),
            Self::ApiRequestOptions => {
                include_str!("../../templates/core/ApiRequestOptions.ts.tera")
            }
            Self::ApiResult => include_str!("../../templates/core/ApiResult.ts.tera"),
            Self::Request => include_str!("../../templates/core/request.ts.tera"),
            Self::ReactHookRequest => include_str!("../../templates/core/requestReactHook.ts.tera"),
            Self::ReactHookService => include_str!("../../templates/services/reactHook.ts.tera"),
            Self::FastifyService => include_str!("../../templates/services/fastify.ts.tera"),
            Self::Model => include_str!("../../templates/models/model.ts.tera"),
            Self::Schema => include_str!("../../templates/schemas/schema.ts.tera"),
            Self::ValidatorSchema => include_str!("../../templates/validators/schema.js.tera"),
            Self::ValidatorGenerator => {
                include_str!("../../templates/validators/generator.js.tera")
            }
            Self::Index => include_str!("../../templates/index.ts.tera"),
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template())
    }
}

/// Turns a context into file contents for one artifact kind.
pub trait Renderer: Debug + Send + Sync {
    /// Render `artifact` with `context`.
    fn render(&self, artifact: Artifact, context: &serde_json::Value) -> Result<String>;
}

/// [`Renderer`] backed by the bundled Tera templates.
pub struct TeraRenderer {
    tera: Tera,
}

impl Debug for TeraRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeraRenderer")
            .field("templates", &Artifact::ALL.len())
            .finish()
    }
}

impl TeraRenderer {
    /// Compile every bundled template.
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(Artifact::ALL.map(|a| (a.template(), a.source())))
            .map_err(|source| Error::Render {
                artifact: "templates".to_string(),
                source,
            })?;
        // Output is source code, not HTML.
        tera.autoescape_on(vec![]);
        Ok(Self { tera })
    }
}

impl Renderer for TeraRenderer {
    fn render(&self, artifact: Artifact, context: &serde_json::Value) -> Result<String> {
        let render_error = |source| Error::Render {
            artifact: artifact.to_string(),
            source,
        };
        let context = Context::from_value(context.clone()).map_err(render_error)?;
        self.tera
            .render(artifact.template(), &context)
            .map_err(render_error)
    }
}
