//! Error type shared by every stage of the generator.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fatal conditions. Any of these aborts the whole generation run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document declares an OpenAPI version other than 3.x.
    #[error("Unsupported Open API version: \"{0}\"")]
    UnsupportedVersion(String),

    /// The document is a Swagger 2.0 document.
    #[error("OpenAPI V2 is not supported")]
    SwaggerV2,

    /// The output directory is not strictly inside the working directory.
    #[error("Output folder {} is not a subdirectory of the current working directory", .0.display())]
    UnsafeOutput(PathBuf),

    /// The custom request override file does not exist.
    #[error("Custom request file \"{}\" does not exist", .0.display())]
    MissingRequestFile(PathBuf),

    /// An unrecognized service variation was requested.
    #[error("Unknown variation: {0}")]
    UnknownVariation(String),

    /// An unrecognized HTTP client flavor was requested.
    #[error("Unknown http client: {0}")]
    UnknownHttpClient(String),

    /// A synthesized model name clashes with a model that already exists.
    #[error("Model name \"{name}\" synthesized for {origin} collides with an existing model")]
    NameCollision {
        /// The clashing name.
        name: String,
        /// Where the synthesized name came from.
        origin: String,
    },

    /// The validator compiler exited unsuccessfully.
    #[error("Validator compiler exited with {0}")]
    ValidatorCompiler(ExitStatus),

    /// The validator runtime could not be located on PATH.
    #[error("Could not locate `{program}` to precompile validators: {source}")]
    MissingExecutable {
        /// Program that was searched for.
        program: String,
        /// Lookup failure.
        #[source]
        source: which::Error,
    },

    /// A filesystem collaborator call failed.
    #[error("Failed to {action} {}: {source}", .path.display())]
    Fs {
        /// What was being attempted.
        action: &'static str,
        /// The path involved.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A template failed to render.
    #[error("Failed to render {artifact}: {source}")]
    Render {
        /// Template name.
        artifact: String,
        /// Underlying template error.
        #[source]
        source: tera::Error,
    },

    /// The input document is not valid JSON or does not match the OpenAPI shape.
    #[error("Invalid OpenAPI document: {0}")]
    Json(#[from] serde_json::Error),

    /// The input document is not valid YAML.
    #[error("Invalid OpenAPI document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration file is not valid TOML.
    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Wrap an IO error with the action and path that produced it.
    pub(crate) fn fs(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Fs {
            action,
            path: path.into(),
            source,
        }
    }
}
