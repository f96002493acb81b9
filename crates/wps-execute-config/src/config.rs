// crates/wps-execute-config/src/config.rs
// ============================================================================
// Module: WPS Execute Configuration
// Description: Configuration loading and validation for execute validation.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: wps-execute-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys are rejected and every limit is range checked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use wps_execute_core::AllowedValuesPolicy;
use wps_execute_core::DefaultResponseForm;
use wps_execute_core::EngineOptions;
use wps_execute_core::RequestLimits;
use wps_execute_core::runtime::options::DEFAULT_MAX_DATA_INPUTS;
use wps_execute_core::runtime::options::DEFAULT_MAX_DOCUMENT_BYTES;
use wps_execute_core::runtime::options::DEFAULT_MAX_HEADERS;
use wps_execute_core::runtime::options::DEFAULT_MAX_OUTPUTS;
use wps_execute_core::runtime::options::DEFAULT_MAX_TOKEN_BYTES;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "wps-execute.toml";
/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "WPS_EXECUTE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum length of a full path.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for `limits.max_data_inputs`.
const MAX_DATA_INPUTS_LIMIT: usize = 65_536;
/// Upper bound for `limits.max_outputs`.
const MAX_OUTPUTS_LIMIT: usize = 4_096;
/// Upper bound for `limits.max_headers`.
const MAX_HEADERS_LIMIT: usize = 1_024;
/// Upper bound for `limits.max_token_bytes`.
const MAX_TOKEN_BYTES_LIMIT: usize = 8 * 1024 * 1024;
/// Upper bound for `limits.max_document_bytes`.
const MAX_DOCUMENT_BYTES_LIMIT: usize = 256 * 1024 * 1024;
/// Default reference fetch timeout in milliseconds.
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;
/// Minimum reference fetch timeout in milliseconds.
const MIN_FETCH_TIMEOUT_MS: u64 = 100;
/// Maximum reference fetch timeout in milliseconds.
const MAX_FETCH_TIMEOUT_MS: u64 = 600_000;
/// Default maximum fetched payload size in bytes.
const DEFAULT_MAX_FETCH_BYTES: usize = 64 * 1024 * 1024;
/// Maximum configurable fetched payload size in bytes.
const MAX_FETCH_BYTES_LIMIT: usize = 1024 * 1024 * 1024;
/// Schemes a reference fetcher may ever be allowed to use.
const SUPPORTED_SCHEMES: [&str; 2] = ["http", "https"];

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Top-level execute validation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WpsExecuteConfig {
    /// Request limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Validation policies.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Reference fetching settings.
    #[serde(default)]
    pub references: ReferencesConfig,
    /// Process registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl WpsExecuteConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit `path`, then `WPS_EXECUTE_CONFIG`, then
    /// `wps-execute.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let file = File::open(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        let bytes = read_limited(file, MAX_CONFIG_FILE_SIZE)?;
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Loads configuration like [`Self::load`], falling back to defaults when
    /// no path is given, `WPS_EXECUTE_CONFIG` is unset, and the default file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a located file fails to load or validate.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if path.is_none()
            && env::var_os(CONFIG_ENV_VAR).is_none()
            && !Path::new(DEFAULT_CONFIG_NAME).exists()
        {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.references.validate()?;
        self.registry.validate()?;
        Ok(())
    }

    /// Converts the configuration into engine options.
    #[must_use]
    pub const fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            limits: self.limits.request_limits(),
            default_response_form: self.policy.default_response_form,
            allowed_values: self.policy.allowed_values,
        }
    }
}

/// Request limit settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum number of data inputs per request.
    #[serde(default = "default_max_data_inputs")]
    pub max_data_inputs: usize,
    /// Maximum number of requested outputs.
    #[serde(default = "default_max_outputs")]
    pub max_outputs: usize,
    /// Maximum number of headers per reference.
    #[serde(default = "default_max_headers")]
    pub max_headers: usize,
    /// Maximum size of one compact token in bytes.
    #[serde(default = "default_max_token_bytes")]
    pub max_token_bytes: usize,
    /// Maximum size of a request document in bytes.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_data_inputs: default_max_data_inputs(),
            max_outputs: default_max_outputs(),
            max_headers: default_max_headers(),
            max_token_bytes: default_max_token_bytes(),
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

impl LimitsConfig {
    /// Validates every limit against its allowed range.
    fn validate(&self) -> Result<(), ConfigError> {
        check_range("limits.max_data_inputs", self.max_data_inputs, MAX_DATA_INPUTS_LIMIT)?;
        check_range("limits.max_outputs", self.max_outputs, MAX_OUTPUTS_LIMIT)?;
        check_range("limits.max_headers", self.max_headers, MAX_HEADERS_LIMIT)?;
        check_range("limits.max_token_bytes", self.max_token_bytes, MAX_TOKEN_BYTES_LIMIT)?;
        check_range("limits.max_document_bytes", self.max_document_bytes, MAX_DOCUMENT_BYTES_LIMIT)
    }

    /// Converts into engine request limits.
    #[must_use]
    pub const fn request_limits(&self) -> RequestLimits {
        RequestLimits {
            max_data_inputs: self.max_data_inputs,
            max_outputs: self.max_outputs,
            max_headers: self.max_headers,
            max_token_bytes: self.max_token_bytes,
            max_document_bytes: self.max_document_bytes,
        }
    }
}

/// Validation policy settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Response form applied when a request specifies none.
    #[serde(default)]
    pub default_response_form: DefaultResponseForm,
    /// Handling of declared allowed values.
    #[serde(default)]
    pub allowed_values: AllowedValuesPolicy,
}

/// Reference fetching settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferencesConfig {
    /// URL schemes references may use.
    #[serde(default = "default_allowed_schemes")]
    pub allowed_schemes: Vec<String>,
    /// Per-fetch timeout in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Maximum fetched payload size in bytes.
    #[serde(default = "default_max_fetch_bytes")]
    pub max_fetch_bytes: usize,
}

impl Default for ReferencesConfig {
    fn default() -> Self {
        Self {
            allowed_schemes: default_allowed_schemes(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_fetch_bytes: default_max_fetch_bytes(),
        }
    }
}

impl ReferencesConfig {
    /// Validates reference fetching settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_schemes.is_empty() {
            return Err(ConfigError::Invalid(
                "references.allowed_schemes must be non-empty".to_string(),
            ));
        }
        for scheme in &self.allowed_schemes {
            if !SUPPORTED_SCHEMES.contains(&scheme.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "references.allowed_schemes contains unsupported scheme: {scheme}"
                )));
            }
        }
        if !(MIN_FETCH_TIMEOUT_MS..=MAX_FETCH_TIMEOUT_MS).contains(&self.fetch_timeout_ms) {
            return Err(ConfigError::Invalid(
                "references.fetch_timeout_ms out of range".to_string(),
            ));
        }
        check_range("references.max_fetch_bytes", self.max_fetch_bytes, MAX_FETCH_BYTES_LIMIT)
    }
}

/// Process registry settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Path to a JSON process registry file.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl RegistryConfig {
    /// Validates the registry path, if any.
    fn validate(&self) -> Result<(), ConfigError> {
        match &self.path {
            Some(path) if path.as_os_str().is_empty() => {
                Err(ConfigError::Invalid("registry.path must be non-empty".to_string()))
            }
            Some(path) => validate_path(path),
            None => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument, environment, or default.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Reads at most `max_bytes` from `reader`, failing when more remain.
fn read_limited(reader: impl Read, max_bytes: usize) -> Result<Vec<u8>, ConfigError> {
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    reader
        .take(limit)
        .read_to_end(&mut bytes)
        .map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > max_bytes {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    Ok(bytes)
}

/// Fails when `value` is zero or above `max`.
fn check_range(field: &str, value: usize, max: usize) -> Result<(), ConfigError> {
    if value == 0 || value > max {
        return Err(ConfigError::Invalid(format!("{field} out of range")));
    }
    Ok(())
}

/// Default for `limits.max_data_inputs`.
const fn default_max_data_inputs() -> usize {
    DEFAULT_MAX_DATA_INPUTS
}

/// Default for `limits.max_outputs`.
const fn default_max_outputs() -> usize {
    DEFAULT_MAX_OUTPUTS
}

/// Default for `limits.max_headers`.
const fn default_max_headers() -> usize {
    DEFAULT_MAX_HEADERS
}

/// Default for `limits.max_token_bytes`.
const fn default_max_token_bytes() -> usize {
    DEFAULT_MAX_TOKEN_BYTES
}

/// Default for `limits.max_document_bytes`.
const fn default_max_document_bytes() -> usize {
    DEFAULT_MAX_DOCUMENT_BYTES
}

/// Default for `references.allowed_schemes`.
fn default_allowed_schemes() -> Vec<String> {
    SUPPORTED_SCHEMES.iter().map(ToString::to_string).collect()
}

/// Default for `references.fetch_timeout_ms`.
const fn default_fetch_timeout_ms() -> u64 {
    DEFAULT_FETCH_TIMEOUT_MS
}

/// Default for `references.max_fetch_bytes`.
const fn default_max_fetch_bytes() -> usize {
    DEFAULT_MAX_FETCH_BYTES
}

// ============================================================================
// SECTION: Tests
// ============================================================================
