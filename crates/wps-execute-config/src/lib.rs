// crates/wps-execute-config/src/lib.rs
// ============================================================================
// Module: WPS Execute Config Library
// Description: Public API surface for execute configuration.
// Purpose: Expose the configuration model and its loader.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! Configuration is read from `wps-execute.toml` (or an explicit path) and
//! converted into [`wps_execute_core::EngineOptions`] plus the settings used
//! by the reference fetcher and the CLI.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::LimitsConfig;
pub use config::PolicyConfig;
pub use config::ReferencesConfig;
pub use config::RegistryConfig;
pub use config::WpsExecuteConfig;
