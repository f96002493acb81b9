// crates/wps-execute-core/src/runtime/engine.rs
// ============================================================================
// Module: Execute Engine
// Description: Entry points for compact and document execute requests.
// Purpose: Run the shared validation pipeline and assemble the request.
// Dependencies: crate::{core, interfaces, runtime}, serde_json, tracing
// ============================================================================

//! ## Overview
//! Both encodings follow the same pipeline: look up the process, resolve each
//! input, validate cardinality, resolve the response form, then assemble one
//! immutable [`ExecuteRequest`]. The engine holds no mutable state, so one
//! instance may serve concurrent requests as long as its registry allows
//! concurrent reads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use tracing::debug;

use crate::core::ExecuteError;
use crate::core::ExecuteRequest;
use crate::core::Identifier;
use crate::core::ProcessDescriptor;
use crate::core::ResolvedInput;
use crate::interfaces::ProcessRegistry;
use crate::runtime::document::ExecuteDocument;
use crate::runtime::document::lower_document;
use crate::runtime::kvp::KvpParams;
use crate::runtime::kvp::lower_kvp;
use crate::runtime::options::EngineOptions;
use crate::runtime::options::RequestLimits;
use crate::runtime::outputs::OutputResolver;
use crate::runtime::outputs::RawOutput;
use crate::runtime::outputs::RawResponseDocument;

// ============================================================================
// SECTION: Lowered Request
// ============================================================================

/// Request state after inputs are resolved and before outputs are.
#[derive(Debug, Clone)]
pub(crate) struct LoweredRequest {
    /// Process to run.
    pub(crate) process: Arc<ProcessDescriptor>,
    /// Requested language.
    pub(crate) language: Option<String>,
    /// Resolved inputs that passed cardinality checks.
    pub(crate) inputs: Vec<ResolvedInput>,
    /// Response document construct, if supplied.
    pub(crate) document: Option<RawResponseDocument>,
    /// Raw data output construct, if supplied.
    pub(crate) raw_data: Option<RawOutput>,
}

// ============================================================================
// SECTION: Execute Engine
// ============================================================================

/// Validates execute requests against a process registry.
#[derive(Debug, Clone)]
pub struct ExecuteEngine<R> {
    /// Process registry.
    registry: R,
    /// Engine options.
    options: EngineOptions,
}

impl<R: ProcessRegistry> ExecuteEngine<R> {
    /// Creates an engine with default options.
    #[must_use]
    pub fn new(registry: R) -> Self {
        Self::with_options(registry, EngineOptions::default())
    }

    /// Creates an engine with explicit options.
    #[must_use]
    pub const fn with_options(registry: R, options: EngineOptions) -> Self {
        Self {
            registry,
            options,
        }
    }

    /// Returns the engine options.
    #[must_use]
    pub const fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Returns the process registry.
    #[must_use]
    pub const fn registry(&self) -> &R {
        &self.registry
    }

    /// Validates a compact (key/value) request.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError`] describing the first violation found.
    pub fn parse_kvp(&self, params: &KvpParams) -> Result<ExecuteRequest, ExecuteError> {
        let lowered = lower_kvp(params, &self.options, |identifier| self.process(identifier))?;
        self.complete(lowered)
    }

    /// Validates a request document.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError`] describing the first violation found.
    pub fn parse_document(&self, document: ExecuteDocument) -> Result<ExecuteRequest, ExecuteError> {
        let lowered = lower_document(document, &self.options, |identifier| self.process(identifier))?;
        self.complete(lowered)
    }

    /// Parses a JSON request document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::LimitExceeded`] for oversized documents,
    /// [`ExecuteError::InvalidDocument`] for malformed JSON, or any
    /// validation error.
    pub fn parse_document_json(&self, bytes: &[u8]) -> Result<ExecuteRequest, ExecuteError> {
        RequestLimits::check("document bytes", self.options.limits.max_document_bytes, bytes.len())?;
        let document: ExecuteDocument = serde_json::from_slice(bytes)
            .map_err(|err| ExecuteError::InvalidDocument(err.to_string()))?;
        self.parse_document(document)
    }

    /// Looks up a process by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::UnknownProcess`] when the registry has no such process.
    pub fn process(&self, identifier: &Identifier) -> Result<Arc<ProcessDescriptor>, ExecuteError> {
        self.registry.lookup(identifier).ok_or_else(|| ExecuteError::UnknownProcess {
            identifier: identifier.clone(),
        })
    }

    /// Resolves the response form and assembles the request.
    fn complete(&self, lowered: LoweredRequest) -> Result<ExecuteRequest, ExecuteError> {
        let response_form = OutputResolver::new(&lowered.process, &self.options)
            .resolve(lowered.document, lowered.raw_data)?;
        debug!(
            process = %lowered.process.identifier,
            inputs = lowered.inputs.len(),
            "execute request assembled"
        );
        Ok(ExecuteRequest::assemble(
            lowered.language,
            lowered.process,
            lowered.inputs,
            response_form,
        ))
    }
}
