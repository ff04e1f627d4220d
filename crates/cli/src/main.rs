//! `oapi-tsgen` command-line front end.
//!
//! Options come from an optional TOML file, overridden by flags, and are
//! handed to [`oapi_tsgen::generate_from_path`]. Any error is printed to
//! stderr and turns into exit status 1.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use oapi_tsgen::{HttpClient, Options, Variation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_ENV: &str = "OAPI_TSGEN_LOG";

/// Generate a typed TypeScript client from an OpenAPI v3 document.
#[derive(Parser, Debug)]
#[command(name = "oapi-tsgen", version, about)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "SPEC",
        help = "OpenAPI document: a JSON or YAML file path, or inline JSON"
    )]
    input: String,
    #[arg(
        short,
        long,
        value_name = "DIR",
        help = "Output directory, relative to the current directory"
    )]
    output: Option<PathBuf>,
    #[arg(
        short,
        long = "config",
        value_name = "FILE",
        help = "TOML file with generation options; flags override it"
    )]
    config: Option<PathBuf>,
    #[arg(long = "client", value_name = "CLIENT", help = "HTTP client: fetch or node")]
    http_client: Option<HttpClient>,
    #[arg(long, value_name = "VARIATION", help = "Service flavor: react-hook or fastify")]
    variation: Option<Variation>,
    #[arg(long, value_name = "BOOL", help = "Take a single options object per function")]
    use_options: Option<bool>,
    #[arg(long, value_name = "BOOL", help = "Emit enums as union types")]
    use_union_types: Option<bool>,
    #[arg(long, value_name = "BOOL", help = "Write the core directory")]
    export_core: Option<bool>,
    #[arg(long, value_name = "BOOL", help = "Write the services directory")]
    export_services: Option<bool>,
    #[arg(long, value_name = "BOOL", help = "Write the models directory")]
    export_models: Option<bool>,
    #[arg(long, value_name = "BOOL", help = "Write the schemas directory")]
    export_schemas: Option<bool>,
    #[arg(long, value_name = "BOOL", help = "Promote components.responses to models")]
    response_schema_as_model: Option<bool>,
    #[arg(long, value_name = "BOOL", help = "Validate responses at runtime")]
    runtime_validation: Option<bool>,
    #[arg(long, value_name = "BOOL", help = "Precompile validators with the JavaScript runtime")]
    precompile_validator: Option<bool>,
    #[arg(long, value_name = "BOOL", help = "Throw when a request fails")]
    throw_on_request_failed: Option<bool>,
    #[arg(long, value_name = "BOOL", help = "Log every request in the generated client")]
    verbose_http_log: Option<bool>,
    #[arg(long, value_name = "FILE", help = "File copied over core/request.ts")]
    request: Option<PathBuf>,
    #[arg(long, value_name = "PROGRAM", help = "Program that runs the validator generator")]
    validator_runtime: Option<String>,
    #[arg(long = "no-write", help = "Build the client without writing any file")]
    no_write: bool,
    #[arg(short, long, help = "Log at debug level, overriding OAPI_TSGEN_LOG")]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> oapi_tsgen::Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::from_toml_file(path)?,
            None => Options::default(),
        };

        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = self.$field {
                    options.$field = value;
                })*
            };
        }
        overlay!(
            http_client,
            variation,
            use_options,
            use_union_types,
            export_core,
            export_services,
            export_models,
            export_schemas,
            response_schema_as_model,
            runtime_validation,
            precompile_validator,
            throw_on_request_failed,
            verbose_http_log,
        );
        if let Some(output) = &self.output {
            options.output.clone_from(output);
        }
        if let Some(runtime) = &self.validator_runtime {
            options.validator_runtime.clone_from(runtime);
        }
        if self.request.is_some() {
            options.request.clone_from(&self.request);
        }
        if self.no_write {
            options.write = false;
        }
        Ok(options)
    }
}

fn is_plain_level(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}

fn init_tracing(verbose: bool) {
    // A bare level applies to the library only; anything else is a full filter spec.
    let filter = match std::env::var(LOG_ENV) {
        _ if verbose => "oapi_tsgen=debug".to_string(),
        Ok(level) if is_plain_level(&level) => format!("oapi_tsgen={level}"),
        Ok(spec) => spec,
        Err(_) => "oapi_tsgen=info".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn run(cli: &Cli) -> oapi_tsgen::Result<()> {
    let options = cli.options()?;
    tracing::debug!(?options, "Resolved options.");
    oapi_tsgen::generate_from_path(&cli.input, &options)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
