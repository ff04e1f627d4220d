//! Emission pipeline: a post-processed `Client` to files on disk.
//!
//! Every enabled category directory is destroyed and recreated before it is
//! populated, so a rerun never leaves stale files behind. Categories run in
//! a fixed order (core, services, schemas, validators, models) and the index
//! is written last. Files inside one category are rendered and written in
//! parallel.
//!
//! Before anything is touched the output path must be strictly inside the
//! working directory and a configured request override must exist.

pub mod format;
pub mod fs;
pub mod index;
pub mod models;
pub mod render;
pub mod runtime;
pub mod schema;
pub mod schemas;
pub mod services;
pub mod typescript;
pub mod validators;

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Options;
use crate::error::{Error, Result};
use crate::openapi::ir::Client;

use self::format::{Formatter, IndentFormatter};
use self::fs::{FileSystem, LocalFs};
use self::render::{Artifact, Renderer, TeraRenderer};

/// Lexically normalize `path`, resolving `.` and `..` without touching disk.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// True if `child`, resolved against `parent`, lies strictly below it.
pub fn is_sub_directory(parent: &Path, child: &Path) -> bool {
    let parent = normalize(parent);
    let child = normalize(&parent.join(child));
    child != parent && child.starts_with(&parent)
}

/// An output category directory that has been cleared and recreated.
///
/// Holding one is proof the directory exists and is empty apart from what
/// has been written through it.
#[derive(Debug)]
pub struct CategoryDir<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
}

impl<'a> CategoryDir<'a> {
    /// Remove `path` recursively, then create it again.
    pub fn acquire(fs: &'a dyn FileSystem, path: PathBuf) -> Result<Self> {
        fs.rmdir(&path)?;
        fs.mkdir(&path)?;
        debug!(path = %path.display(), "Recreated output directory.");
        Ok(Self { fs, path })
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of `file` inside this directory.
    pub fn file(&self, file: &str) -> PathBuf {
        self.path.join(file)
    }

    /// Write `contents` to `file` inside this directory.
    pub fn write(&self, file: &str, contents: &str) -> Result<()> {
        self.fs.write_file(&self.file(file), contents)
    }

    /// Copy `from` over `file` inside this directory.
    pub fn copy_over(&self, from: &Path, file: &str) -> Result<()> {
        self.fs.copy_file(from, &self.file(file))
    }

    /// Remove `file` inside this directory.
    pub fn remove(&self, file: &str) -> Result<()> {
        self.fs.remove_file(&self.file(file))
    }
}

/// Renders a `Client` into an output tree.
#[derive(Debug, Clone)]
pub struct Emitter {
    cwd: PathBuf,
    renderer: Arc<dyn Renderer>,
    formatter: Arc<dyn Formatter>,
    fs: Arc<dyn FileSystem>,
}

impl Emitter {
    /// Emitter resolving output paths against `cwd`, with the bundled
    /// templates, the indent formatter and the local filesystem.
    pub fn new(cwd: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            cwd: cwd.into(),
            renderer: Arc::new(TeraRenderer::new()?),
            formatter: Arc::new(IndentFormatter::default()),
            fs: Arc::new(LocalFs),
        })
    }

    /// Emitter rooted at the process working directory.
    pub fn from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|err| Error::fs("resolve working directory", ".", err))?;
        Self::new(cwd)
    }

    /// Replace the renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replace the formatter.
    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Replace the filesystem.
    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Working directory output paths are resolved against.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub(crate) fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Render `artifact` with a serializable context.
    pub(crate) fn render<C: Serialize>(&self, artifact: Artifact, context: &C) -> Result<String> {
        let value = serde_json::to_value(context)?;
        self.renderer.render(artifact, &value)
    }

    /// Render and format.
    pub(crate) fn render_formatted<C: Serialize>(
        &self,
        artifact: Artifact,
        context: &C,
    ) -> Result<String> {
        Ok(self.formatter.format(&self.render(artifact, context)?))
    }

    /// Write every enabled category of `client` below `options.output`.
    pub fn write_client(&self, client: &Client, options: &Options) -> Result<()> {
        if !is_sub_directory(&self.cwd, &options.output) {
            return Err(Error::UnsafeOutput(options.output.clone()));
        }
        let output = normalize(&self.cwd.join(&options.output));

        let request_override = match &options.request {
            Some(request) if options.export_core => {
                let path = normalize(&self.cwd.join(request));
                if !self.fs.exists(&path) {
                    return Err(Error::MissingRequestFile(path));
                }
                Some(path)
            }
            _ => None,
        };

        if options.export_core {
            let dir = CategoryDir::acquire(self.fs(), output.join("core"))?;
            runtime::write_core(self, &dir, client, options, request_override.as_deref())?;
        }

        if options.export_services {
            let dir = CategoryDir::acquire(self.fs(), output.join("services"))?;
            services::write_services(self, &dir, &client.services, options)?;
        }

        if options.export_schemas {
            let dir = CategoryDir::acquire(self.fs(), output.join("schemas"))?;
            schemas::write_schemas(self, &dir, &client.models)?;
        }

        if options.precompile_validator {
            let dir = CategoryDir::acquire(self.fs(), output.join("validators"))?;
            validators::write_validators(self, &dir, &client.models, options)?;
        }

        if options.export_models {
            let dir = CategoryDir::acquire(self.fs(), output.join("models"))?;
            models::write_models(self, &dir, &client.models, options)?;
        }

        if options.any_category_enabled() {
            self.fs.mkdir(&output)?;
            index::write_index(self, &output, client, options)?;
            info!(output = %output.display(), "Wrote client.");
        } else {
            debug!("No output category enabled; nothing written.");
        }
        Ok(())
    }
}
