// crates/wps-execute-cli/src/main.rs
// ============================================================================
// Module: WPS Execute CLI Entry Point
// Description: Command dispatcher for execute request validation.
// Purpose: Validate compact and document requests against a registry file.
// Dependencies: clap, wps-execute-core, wps-execute-config, wps-execute-fetch
// ============================================================================

//! ## Overview
//! The `wps-execute` binary loads a JSON process registry, validates one
//! execute request in either encoding and prints the normalized request as
//! JSON. With `--fetch` every referenced input is also dereferenced over HTTP
//! and summarized. Logs go to stderr; stdout carries only command output.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wps_execute_config::ReferencesConfig;
use wps_execute_config::WpsExecuteConfig;
use wps_execute_core::ExecuteEngine;
use wps_execute_core::ExecuteError;
use wps_execute_core::ExecuteRequest;
use wps_execute_core::Identifier;
use wps_execute_core::InMemoryProcessRegistry;
use wps_execute_core::InputValue;
use wps_execute_core::KvpParams;
use wps_execute_core::ReferenceFetcher;
use wps_execute_fetch::FetchSettings;
use wps_execute_fetch::HttpReferenceFetcher;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a process registry file.
const MAX_REGISTRY_BYTES: usize = 16 * 1024 * 1024;
/// Environment variable holding the log filter.
const LOG_ENV: &str = "WPS_EXECUTE_LOG";
/// Log filter used when neither `--log-level` nor `WPS_EXECUTE_LOG` is set.
const DEFAULT_LOG_FILTER: &str = "warn";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "wps-execute", version, disable_help_subcommand = true)]
struct Cli {
    /// Configuration file (overrides `WPS_EXECUTE_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Log filter directive (overrides `WPS_EXECUTE_LOG`).
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a compact (key/value) execute request.
    Kvp(KvpCommand),
    /// Validate a JSON execute request document.
    Document(DocumentCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments shared by the request validation commands.
#[derive(Args, Debug)]
struct RequestTarget {
    /// JSON process registry file (overrides `registry.path`).
    #[arg(long, value_name = "FILE")]
    registry: Option<PathBuf>,
    /// Dereference referenced inputs after validation.
    #[arg(long)]
    fetch: bool,
}

/// Arguments for `kvp`.
#[derive(Args, Debug)]
struct KvpCommand {
    /// Registry and fetch options.
    #[command(flatten)]
    target: RequestTarget,
    /// Query string, with or without a leading `?`.
    #[arg(long, value_name = "QUERY")]
    query: String,
}

/// Arguments for `document`.
#[derive(Args, Debug)]
struct DocumentCommand {
    /// Registry and fetch options.
    #[command(flatten)]
    target: RequestTarget,
    /// JSON request document file.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration file.
    Validate,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying the message shown on stderr.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// Validated request plus fetch summaries, printed for `--fetch`.
#[derive(Debug, Serialize)]
struct FetchedRequest<'a> {
    /// Normalized request.
    request: &'a ExecuteRequest,
    /// One entry per referenced input, in request order.
    fetched: Vec<FetchedReference>,
}

/// Summary of one dereferenced input.
#[derive(Debug, Serialize)]
struct FetchedReference {
    /// Input identifier.
    identifier: Identifier,
    /// Fetched URL.
    href: String,
    /// Reported content type.
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    /// Payload size in bytes.
    bytes: usize,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Kvp(command) => command_kvp(config_path, &command),
        Commands::Document(command) => command_document(config_path, &command),
        Commands::Config {
            command,
        } => command_config(config_path, &command),
    }
}

/// Installs the stderr log subscriber.
fn init_logging(level: Option<&str>) -> CliResult<()> {
    let filter = match level {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|err| CliError::new(format!("invalid log level {directive}: {err}")))?,
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| CliError::new(format!("failed to install logger: {err}")))
}

// ============================================================================
// SECTION: Request Commands
// ============================================================================

/// Executes the `kvp` command.
fn command_kvp(config_path: Option<&Path>, command: &KvpCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let engine = build_engine(&config, command.target.registry.as_deref())?;
    let params = KvpParams::parse_query(&command.query);
    let request = engine.parse_kvp(&params).map_err(|err| execute_error(&err))?;
    emit_request(&config, &request, command.target.fetch)
}

/// Executes the `document` command.
fn command_document(config_path: Option<&Path>, command: &DocumentCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let engine = build_engine(&config, command.target.registry.as_deref())?;
    let bytes = read_bytes_with_limit(&command.input, config.limits.max_document_bytes)
        .map_err(|err| read_error("request document", &command.input, &err))?;
    let request = engine.parse_document_json(&bytes).map_err(|err| execute_error(&err))?;
    emit_request(&config, &request, command.target.fetch)
}

/// Loads configuration, using defaults when no config file is present.
fn load_config(path: Option<&Path>) -> CliResult<WpsExecuteConfig> {
    WpsExecuteConfig::load_or_default(path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Builds an engine over the registry named by the flag or the config.
fn build_engine(
    config: &WpsExecuteConfig,
    registry: Option<&Path>,
) -> CliResult<ExecuteEngine<InMemoryProcessRegistry>> {
    let path = registry.or(config.registry.path.as_deref()).ok_or_else(|| {
        CliError::new("no process registry: pass --registry or set registry.path".to_string())
    })?;
    let bytes = read_bytes_with_limit(path, MAX_REGISTRY_BYTES)
        .map_err(|err| read_error("process registry", path, &err))?;
    let registry = InMemoryProcessRegistry::from_json(&bytes)
        .map_err(|err| CliError::new(format!("invalid process registry {}: {err}", path.display())))?;
    debug!(processes = registry.len(), "process registry loaded");
    Ok(ExecuteEngine::with_options(registry, config.engine_options()))
}

/// Prints the request, fetching references first when asked.
fn emit_request(
    config: &WpsExecuteConfig,
    request: &ExecuteRequest,
    fetch: bool,
) -> CliResult<ExitCode> {
    let rendered = if fetch {
        let fetched = fetch_references(&config.references, request)?;
        serde_json::to_string_pretty(&FetchedRequest {
            request,
            fetched,
        })
    } else {
        serde_json::to_string_pretty(request)
    }
    .map_err(|err| CliError::new(format!("failed to render request: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Dereferences every referenced input of a validated request.
fn fetch_references(
    references: &ReferencesConfig,
    request: &ExecuteRequest,
) -> CliResult<Vec<FetchedReference>> {
    let fetcher = HttpReferenceFetcher::new(fetch_settings(references))
        .map_err(|err| CliError::new(format!("failed to build fetcher: {err}")))?;
    let mut fetched = Vec::new();
    for input in request.inputs() {
        let InputValue::ReferencedComplex(reference) = &input.value else {
            continue;
        };
        let payload = fetcher.fetch(reference).map_err(|err| {
            CliError::new(format!("failed to fetch input {}: {err}", input.identifier))
        })?;
        info!(
            input = %input.identifier,
            href = %reference.reference.href,
            bytes = payload.bytes.len(),
            "reference fetched"
        );
        fetched.push(FetchedReference {
            identifier: input.identifier.clone(),
            href: reference.reference.href.to_string(),
            content_type: payload.content_type,
            bytes: payload.bytes.len(),
        });
    }
    Ok(fetched)
}

/// Converts the `[references]` section into fetcher settings.
fn fetch_settings(references: &ReferencesConfig) -> FetchSettings {
    FetchSettings {
        allowed_schemes: references.allowed_schemes.clone(),
        timeout: Duration::from_millis(references.fetch_timeout_ms),
        max_bytes: references.max_fetch_bytes,
    }
}

/// Formats a validation failure with its exception code and locator.
fn execute_error(err: &ExecuteError) -> CliError {
    CliError::new(format!("{}: {err} (locator: {})", err.ows_code(), err.locator()))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(config_path: Option<&Path>, command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => command_config_validate(config_path),
    }
}

/// Executes the config validation command.
fn command_config_validate(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let _config = WpsExecuteConfig::load(config_path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line("Config valid.").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: File Helpers
// ============================================================================

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Formats a bounded read failure.
fn read_error(label: &str, path: &Path, error: &ReadLimitError) -> CliError {
    let detail = match error {
        ReadLimitError::Io(err) => err.to_string(),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => format!("{size} bytes exceeds limit of {limit} bytes"),
    };
    CliError::new(format!("failed to read {label} {}: {detail}", path.display()))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
