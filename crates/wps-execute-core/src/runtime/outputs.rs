// crates/wps-execute-core/src/runtime/outputs.rs
// ============================================================================
// Module: Output Request Resolver
// Description: Validates the requested response form against declared outputs.
// Purpose: Produce a normalized response document or raw output request.
// Dependencies: crate::{core, runtime::negotiator, runtime::options}
// ============================================================================

//! ## Overview
//! A request may ask for a response document (a list of outputs plus three
//! flags) or a single raw output, never both. Each requested output must be
//! declared by the process; complex outputs get their format negotiated while
//! other outputs keep the requested format attributes as given. When no form
//! is requested, [`DefaultResponseForm`] decides the outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ExecuteError;
use crate::core::FormatSpec;
use crate::core::Identifier;
use crate::core::LanguageString;
use crate::core::OutputDefinition;
use crate::core::ProcessDescriptor;
use crate::core::RawDataOutput;
use crate::core::RequestedOutput;
use crate::core::ResponseDocument;
use crate::core::ResponseForm;
use crate::runtime::negotiator::negotiate;
use crate::runtime::options::DefaultResponseForm;
use crate::runtime::options::EngineOptions;
use crate::runtime::options::RequestLimits;

// ============================================================================
// SECTION: Raw Outputs
// ============================================================================

/// Output request as supplied by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    /// Output identifier.
    pub identifier: Identifier,
    /// Requested format attributes.
    pub format: FormatSpec,
    /// Requested unit of measure.
    pub uom: Option<String>,
    /// Deliver as reference.
    pub as_reference: bool,
    /// Optional title.
    pub title: Option<LanguageString>,
    /// Optional abstract.
    pub summary: Option<LanguageString>,
}

impl RawOutput {
    /// Creates an output request with default attributes.
    #[must_use]
    pub fn new(identifier: impl Into<Identifier>) -> Self {
        Self {
            identifier: identifier.into(),
            format: FormatSpec::default(),
            uom: None,
            as_reference: false,
            title: None,
            summary: None,
        }
    }
}

/// Response document as supplied by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponseDocument {
    /// Listed outputs; `None` when the client listed none.
    pub outputs: Option<Vec<RawOutput>>,
    /// Store the response as a retrievable resource.
    pub store_execute_response: bool,
    /// Echo inputs back in the response.
    pub lineage: bool,
    /// Provide incremental status.
    pub status: bool,
}

// ============================================================================
// SECTION: Output Resolver
// ============================================================================

/// Resolves response forms against one process descriptor.
#[derive(Debug, Clone, Copy)]
pub struct OutputResolver<'a> {
    /// Process whose outputs are resolved.
    process: &'a ProcessDescriptor,
    /// Engine options.
    options: &'a EngineOptions,
}

impl<'a> OutputResolver<'a> {
    /// Creates a resolver for `process`.
    #[must_use]
    pub const fn new(process: &'a ProcessDescriptor, options: &'a EngineOptions) -> Self {
        Self {
            process,
            options,
        }
    }

    /// Resolves the response form from the two alternative constructs.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::MutuallyExclusive`] when both constructs are
    /// present, or any output resolution error.
    pub fn resolve(
        &self,
        document: Option<RawResponseDocument>,
        raw_data: Option<RawOutput>,
    ) -> Result<Option<ResponseForm>, ExecuteError> {
        ensure_single_form(document.is_some(), raw_data.is_some())?;
        match (document, raw_data) {
            (_, Some(raw)) => {
                Ok(Some(ResponseForm::RawData(RawDataOutput::new(self.resolve_output(raw)?))))
            }
            (Some(document), None) => Ok(Some(ResponseForm::Document(self.resolve_document(document)?))),
            (None, None) => Ok(self.default_form()),
        }
    }

    /// Resolves one requested output.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::UnknownOutput`] or [`ExecuteError::NoMatchingFormat`].
    pub fn resolve_output(&self, raw: RawOutput) -> Result<RequestedOutput, ExecuteError> {
        let definition = self.definition(&raw.identifier)?;
        let format = match definition.formats() {
            Some(formats) => {
                negotiate(&raw.format, formats).map(|matched| matched.format).map_err(|mismatch| {
                    ExecuteError::NoMatchingFormat {
                        identifier: definition.identifier.clone(),
                        field: mismatch.field,
                        attempted: mismatch.attempted,
                    }
                })?
            }
            None => raw.format,
        };
        Ok(RequestedOutput {
            identifier: definition.identifier.clone(),
            as_reference: raw.as_reference,
            format,
            uom: raw.uom,
            title: raw.title,
            summary: raw.summary,
        })
    }

    /// Resolves a response document.
    fn resolve_document(&self, document: RawResponseDocument) -> Result<ResponseDocument, ExecuteError> {
        let outputs = match document.outputs {
            Some(outputs) => {
                RequestLimits::check("outputs", self.options.limits.max_outputs, outputs.len())?;
                outputs
                    .into_iter()
                    .map(|output| self.resolve_output(output))
                    .collect::<Result<Vec<_>, _>>()?
            }
            None => self.implicit_outputs(),
        };
        Ok(ResponseDocument {
            outputs,
            store_execute_response: document.store_execute_response,
            lineage: document.lineage,
            status: document.status,
        })
    }

    /// Returns the response form applied when none was requested.
    fn default_form(&self) -> Option<ResponseForm> {
        match self.options.default_response_form {
            DefaultResponseForm::Absent => None,
            DefaultResponseForm::EmptyDocument | DefaultResponseForm::AllOutputs => {
                Some(ResponseForm::Document(ResponseDocument {
                    outputs: self.implicit_outputs(),
                    ..ResponseDocument::default()
                }))
            }
        }
    }

    /// Returns the outputs of a document that lists none.
    fn implicit_outputs(&self) -> Vec<RequestedOutput> {
        match self.options.default_response_form {
            DefaultResponseForm::AllOutputs => {
                self.process.outputs.iter().map(default_output).collect()
            }
            DefaultResponseForm::Absent | DefaultResponseForm::EmptyDocument => Vec::new(),
        }
    }

    /// Looks up the declared output named `identifier`.
    fn definition(&self, identifier: &Identifier) -> Result<&'a OutputDefinition, ExecuteError> {
        self.process.output(identifier).ok_or_else(|| ExecuteError::UnknownOutput {
            identifier: identifier.clone(),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Fails when both a response document and a raw output are present.
///
/// # Errors
///
/// Returns [`ExecuteError::MutuallyExclusive`] naming both constructs.
pub fn ensure_single_form(has_document: bool, has_raw_data: bool) -> Result<(), ExecuteError> {
    if has_document && has_raw_data {
        return Err(ExecuteError::MutuallyExclusive {
            first: "ResponseDocument".to_string(),
            second: "RawDataOutput".to_string(),
            identifier: None,
        });
    }
    Ok(())
}

/// Builds the implicit request for a declared output.
fn default_output(definition: &OutputDefinition) -> RequestedOutput {
    RequestedOutput {
        identifier: definition.identifier.clone(),
        as_reference: false,
        format: definition.formats().map(|formats| formats.default.clone()).unwrap_or_default(),
        uom: None,
        title: None,
        summary: None,
    }
}
