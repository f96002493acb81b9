// crates/wps-execute-core/src/runtime/options.rs
// ============================================================================
// Module: Engine Options
// Description: Request limits and policy switches for the execute engine.
// Purpose: Bound request sizes and settle open policy choices in one place.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`EngineOptions`] carries the hard limits that reject oversized requests
//! and the policy switches for behavior the protocol leaves open: the default
//! response form and whether literal allowed values are enforced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::ExecuteError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum number of data inputs per request.
pub const DEFAULT_MAX_DATA_INPUTS: usize = 256;
/// Default maximum number of requested outputs per request.
pub const DEFAULT_MAX_OUTPUTS: usize = 64;
/// Default maximum number of headers per reference.
pub const DEFAULT_MAX_HEADERS: usize = 32;
/// Default maximum size of one compact token in bytes.
pub const DEFAULT_MAX_TOKEN_BYTES: usize = 64 * 1024;
/// Default maximum size of a request document in bytes.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

/// Hard limits applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLimits {
    /// Maximum number of data inputs.
    pub max_data_inputs: usize,
    /// Maximum number of requested outputs.
    pub max_outputs: usize,
    /// Maximum number of headers per reference.
    pub max_headers: usize,
    /// Maximum size of one compact token in bytes.
    pub max_token_bytes: usize,
    /// Maximum size of a request document in bytes.
    pub max_document_bytes: usize,
}

impl RequestLimits {
    /// Fails when `actual` exceeds `max`.
    pub(crate) const fn check(
        limit: &'static str,
        max: usize,
        actual: usize,
    ) -> Result<(), ExecuteError> {
        if actual > max {
            return Err(ExecuteError::LimitExceeded {
                limit,
                max,
                actual,
            });
        }
        Ok(())
    }
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_data_inputs: DEFAULT_MAX_DATA_INPUTS,
            max_outputs: DEFAULT_MAX_OUTPUTS,
            max_headers: DEFAULT_MAX_HEADERS,
            max_token_bytes: DEFAULT_MAX_TOKEN_BYTES,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Policies
// ============================================================================

/// Response form applied when a request specifies none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultResponseForm {
    /// Leave the response form absent; the execution engine decides.
    #[default]
    Absent,
    /// Use a response document without explicit outputs.
    EmptyDocument,
    /// Use a response document listing every declared output.
    AllOutputs,
}

/// Handling of declared allowed values on literal inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowedValuesPolicy {
    /// Log values outside the allowed set and accept them.
    #[default]
    Advisory,
    /// Reject values outside the allowed set.
    Enforce,
}

// ============================================================================
// SECTION: Engine Options
// ============================================================================

/// Options for [`crate::runtime::ExecuteEngine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Request limits.
    pub limits: RequestLimits,
    /// Default response form policy.
    pub default_response_form: DefaultResponseForm,
    /// Allowed values policy.
    pub allowed_values: AllowedValuesPolicy,
}
