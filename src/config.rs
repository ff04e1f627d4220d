//! Generation options.
//!
//! Every field has a default, so callers only set what they care about. The
//! same struct is deserialized from a TOML config file by the command line
//! front end.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

/// HTTP client flavor used by the generated request core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum HttpClient {
    /// Browser `fetch` API.
    #[default]
    Fetch,
    /// `node-fetch` for server-side usage.
    Node,
}

impl HttpClient {
    /// Name used in templates and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Node => "node",
        }
    }
}

impl FromStr for HttpClient {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fetch" => Ok(Self::Fetch),
            "node" => Ok(Self::Node),
            other => Err(Error::UnknownHttpClient(other.to_string())),
        }
    }
}

impl TryFrom<String> for HttpClient {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flavor of the generated service layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Variation {
    /// Request functions plus React hooks per operation.
    #[default]
    ReactHook,
    /// Request functions plus route descriptors for a fastify server.
    Fastify,
}

impl Variation {
    /// Name used in templates and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReactHook => "react-hook",
            Self::Fastify => "fastify",
        }
    }
}

impl FromStr for Variation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "react-hook" => Ok(Self::ReactHook),
            "fastify" => Ok(Self::Fastify),
            other => Err(Error::UnknownVariation(other.to_string())),
        }
    }
}

impl TryFrom<String> for Variation {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All recognized generation options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Options {
    /// Output directory, relative to the working directory.
    pub output: PathBuf,
    /// HTTP client flavor.
    pub http_client: HttpClient,
    /// Service layer flavor.
    pub variation: Variation,
    /// Generate functions taking a single options object instead of positional arguments.
    pub use_options: bool,
    /// Emit enums as union types instead of TypeScript enums.
    pub use_union_types: bool,
    /// Write the `core` directory.
    pub export_core: bool,
    /// Write the `services` directory.
    pub export_services: bool,
    /// Write the `models` directory.
    pub export_models: bool,
    /// Write the `schemas` directory.
    pub export_schemas: bool,
    /// Promote `components.responses` to named models.
    pub response_schema_as_model: bool,
    /// Validate response payloads at runtime.
    pub runtime_validation: bool,
    /// Precompile validators with the JavaScript runtime.
    pub precompile_validator: bool,
    /// Throw instead of returning an error result when a request fails.
    pub throw_on_request_failed: bool,
    /// Log every request and response in the generated client.
    pub verbose_http_log: bool,
    /// File copied over the generated `core/request.ts`.
    pub request: Option<PathBuf>,
    /// Write files at all. When false the run stops after building the client.
    pub write: bool,
    /// Program used to run the validator generator.
    pub validator_runtime: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            output: PathBuf::new(),
            http_client: HttpClient::Fetch,
            variation: Variation::ReactHook,
            use_options: false,
            use_union_types: false,
            export_core: true,
            export_services: true,
            export_models: true,
            export_schemas: false,
            response_schema_as_model: true,
            runtime_validation: true,
            precompile_validator: false,
            throw_on_request_failed: false,
            verbose_http_log: false,
            request: None,
            write: true,
            validator_runtime: "node".to_string(),
        }
    }
}

impl Options {
    /// Options writing to `output` with every other field defaulted.
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            ..Self::default()
        }
    }

    /// Load options from a TOML file. Missing keys keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|err| Error::fs("read", path, err))?;
        Self::from_toml_str(&text)
    }

    /// Parse options from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// True when at least one output category is enabled.
    pub const fn any_category_enabled(&self) -> bool {
        self.export_core
            || self.export_services
            || self.export_models
            || self.export_schemas
            || self.precompile_validator
    }
}
