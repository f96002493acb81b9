// crates/wps-execute-core/src/interfaces/mod.rs
// ============================================================================
// Module: Execute Interfaces
// Description: Collaborator contracts for process lookup and reference fetching.
// Purpose: Keep the request engine free of storage and network details.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The request engine consumes a [`ProcessRegistry`] to resolve process
//! identifiers. A [`ReferenceFetcher`] is consumed downstream by execution
//! engines to dereference inputs supplied by URL; the request engine itself
//! only describes the fetch and never performs it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::DescriptorError;
use crate::core::Identifier;
use crate::core::ProcessDescriptor;
use crate::core::ReferencedComplexInput;

// ============================================================================
// SECTION: Process Registry
// ============================================================================

/// Errors raised while building or loading a process registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two descriptors share one process identifier.
    #[error("duplicate process identifier: {0}")]
    DuplicateProcess(Identifier),
    /// A descriptor failed validation.
    #[error("invalid process {identifier}: {source}")]
    InvalidDescriptor {
        /// Process identifier.
        identifier: Identifier,
        /// Validation failure.
        source: DescriptorError,
    },
    /// Registry source could not be parsed.
    #[error("registry parse error: {0}")]
    Parse(String),
}

/// Read-only catalog of executable processes.
///
/// Implementations must be safe for concurrent reads.
pub trait ProcessRegistry {
    /// Returns the descriptor registered under `identifier`, if any.
    fn lookup(&self, identifier: &Identifier) -> Option<Arc<ProcessDescriptor>>;
}

impl<R: ProcessRegistry + ?Sized> ProcessRegistry for Arc<R> {
    fn lookup(&self, identifier: &Identifier) -> Option<Arc<ProcessDescriptor>> {
        (**self).lookup(identifier)
    }
}

// ============================================================================
// SECTION: Reference Fetcher
// ============================================================================

/// Bytes fetched for a referenced input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPayload {
    /// Raw payload bytes.
    pub bytes: Vec<u8>,
    /// Content type reported by the server.
    pub content_type: Option<String>,
}

/// Errors raised while fetching a referenced input.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL scheme is not permitted.
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    /// Request could not be built or sent.
    #[error("http failure: {0}")]
    Http(String),
    /// Server redirected the request.
    #[error("redirected from {from} to {to}")]
    Redirected {
        /// Requested URL.
        from: String,
        /// Redirect target.
        to: String,
    },
    /// Server answered with a non-success status.
    #[error("http status {status} for {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },
    /// Payload exceeded the configured byte limit.
    #[error("payload exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Observed payload size in bytes.
        actual_bytes: usize,
    },
    /// Inline POST body could not be serialized.
    #[error("invalid request body: {0}")]
    Body(String),
}

/// Dereferences inputs supplied by URL.
pub trait ReferenceFetcher: Send + Sync {
    /// Performs the fetch described by a referenced input.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the payload cannot be retrieved.
    fn fetch(&self, input: &ReferencedComplexInput) -> Result<FetchedPayload, FetchError>;
}
