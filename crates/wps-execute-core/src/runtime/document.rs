// crates/wps-execute-core/src/runtime/document.rs
// ============================================================================
// Module: Document Request Decoder
// Description: Serde model and lowering of execute request documents.
// Purpose: Check document structure and feed inputs to the shared resolvers.
// Dependencies: crate::{core, runtime}, serde, serde_json
// ============================================================================

//! ## Overview
//! The document encoding mirrors the execute request tree: a process
//! identifier, an optional language, an optional list of inputs (each with
//! inline data or a reference, never both), and an optional response form
//! holding either a response document or a raw data output. Documents are
//! read from JSON and unknown fields are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use crate::core::ExecuteError;
use crate::core::FormatSpec;
use crate::core::HttpMethod;
use crate::core::Identifier;
use crate::core::LanguageString;
use crate::core::ProcessDescriptor;
use crate::core::ReferenceHeader;
use crate::core::ResolvedInput;
use crate::runtime::cardinality::count_occurrences;
use crate::runtime::cardinality::validate_cardinality;
use crate::runtime::engine::LoweredRequest;
use crate::runtime::inputs::InputResolver;
use crate::runtime::inputs::RawInput;
use crate::runtime::inputs::RawInputValue;
use crate::runtime::inputs::RawReference;
use crate::runtime::options::EngineOptions;
use crate::runtime::options::RequestLimits;
use crate::runtime::outputs::RawOutput;
use crate::runtime::outputs::RawResponseDocument;
use crate::runtime::outputs::ensure_single_form;

// ============================================================================
// SECTION: Document Model
// ============================================================================

/// Execute request document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecuteDocument {
    /// Process identifier.
    #[serde(default)]
    pub identifier: Option<Identifier>,
    /// Requested language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Supplied inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_inputs: Option<Vec<DocumentInput>>,
    /// Requested response form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_form: Option<DocumentResponseForm>,
}

/// One input element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentInput {
    /// Input identifier.
    #[serde(default)]
    pub identifier: Option<Identifier>,
    /// Optional title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<LanguageString>,
    /// Optional abstract.
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub summary: Option<LanguageString>,
    /// Inline data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DocumentData>,
    /// Reference to the data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<DocumentReference>,
}

/// Inline data of an input; exactly one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentData {
    /// Literal value.
    LiteralData(DocumentLiteral),
    /// Bounding box.
    BoundingBoxData(DocumentBoundingBox),
    /// Embedded complex data.
    ComplexData(DocumentComplex),
}

/// Inline literal data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentLiteral {
    /// Literal text.
    #[serde(default)]
    pub value: String,
    /// Claimed data type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Claimed unit of measure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
}

/// Inline bounding box with whitespace-separated corners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentBoundingBox {
    /// Lower corner, for example `"-180 -90"`.
    pub lower_corner: String,
    /// Upper corner, for example `"180 90"`.
    pub upper_corner: String,
    /// Claimed CRS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
}

/// Inline complex data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentComplex {
    /// Requested mime type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Requested encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Requested schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Opaque payload.
    #[serde(default)]
    pub value: Value,
}

/// Reference to input data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentReference {
    /// Target URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Requested mime type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Requested encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Requested schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// HTTP method; `GET` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Request headers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<DocumentHeader>,
    /// Inline POST body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// POST body reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_reference: Option<DocumentBodyReference>,
}

/// Header of a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentHeader {
    /// Header name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Header value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Body reference of a POST reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentBodyReference {
    /// Body URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// Response form element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentResponseForm {
    /// Response document choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_document: Option<DocumentResponseDocument>,
    /// Raw data output choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data_output: Option<DocumentOutput>,
}

/// Response document element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentResponseDocument {
    /// Requested outputs; at least one.
    #[serde(default)]
    pub outputs: Vec<DocumentOutput>,
    /// Store the response as a retrievable resource.
    #[serde(default)]
    pub store_execute_response: bool,
    /// Echo inputs back in the response.
    #[serde(default)]
    pub lineage: bool,
    /// Provide incremental status.
    #[serde(default)]
    pub status: bool,
}

/// Output element of a response form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentOutput {
    /// Output identifier.
    #[serde(default)]
    pub identifier: Option<Identifier>,
    /// Optional title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<LanguageString>,
    /// Optional abstract.
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub summary: Option<LanguageString>,
    /// Requested mime type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Requested encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Requested schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Requested unit of measure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
    /// Deliver as reference; ignored for raw data outputs.
    #[serde(default)]
    pub as_reference: bool,
}

// ============================================================================
// SECTION: Lowering
// ============================================================================

/// Lowers a document into resolved inputs and raw response constructs.
pub(crate) fn lower_document(
    document: ExecuteDocument,
    options: &EngineOptions,
    lookup: impl FnOnce(&Identifier) -> Result<Arc<ProcessDescriptor>, ExecuteError>,
) -> Result<LoweredRequest, ExecuteError> {
    let Some(identifier) = document.identifier else {
        return Err(missing("ows:Identifier"));
    };
    debug!(identifier = %identifier, "decoding execute document");
    let process = lookup(&identifier)?;

    let inputs = match document.data_inputs {
        Some(inputs) => lower_inputs(inputs, &process, options)?,
        None => Vec::new(),
    };
    validate_cardinality(&count_occurrences(&inputs), &process.inputs)?;

    let (response_document, raw_data) = match document.response_form {
        Some(form) => lower_response_form(form)?,
        None => (None, None),
    };

    Ok(LoweredRequest {
        process,
        language: document.language,
        inputs,
        document: response_document,
        raw_data,
    })
}

/// Resolves every input element in order.
fn lower_inputs(
    inputs: Vec<DocumentInput>,
    process: &ProcessDescriptor,
    options: &EngineOptions,
) -> Result<Vec<ResolvedInput>, ExecuteError> {
    if inputs.is_empty() {
        return Err(missing("wps:DataInputs/wps:Input"));
    }
    RequestLimits::check("data inputs", options.limits.max_data_inputs, inputs.len())?;
    let resolver = InputResolver::new(process, options);
    let mut resolved = Vec::with_capacity(inputs.len());
    for input in inputs {
        let Some(identifier) = input.identifier else {
            return Err(missing("wps:Input/ows:Identifier"));
        };
        resolver.definition(&identifier)?;
        let value = match (input.data, input.reference) {
            (Some(_), Some(_)) => {
                return Err(ExecuteError::MutuallyExclusive {
                    first: "Data".to_string(),
                    second: "Reference".to_string(),
                    identifier: Some(identifier),
                });
            }
            (None, None) => {
                return Err(ExecuteError::MissingInputValue {
                    identifier,
                });
            }
            (Some(data), None) => lower_data(&identifier, data)?,
            (None, Some(reference)) => RawInputValue::Reference(lower_reference(reference)?),
        };
        resolved.push(resolver.resolve(RawInput {
            identifier,
            title: input.title,
            summary: input.summary,
            value,
        })?);
    }
    Ok(resolved)
}

/// Lowers inline data.
fn lower_data(identifier: &Identifier, data: DocumentData) -> Result<RawInputValue, ExecuteError> {
    Ok(match data {
        DocumentData::LiteralData(literal) => RawInputValue::Literal {
            value: literal.value,
            data_type: literal.data_type,
            uom: literal.uom,
        },
        DocumentData::BoundingBoxData(bbox) => {
            let lower: Vec<&str> = bbox.lower_corner.split_whitespace().collect();
            let upper: Vec<&str> = bbox.upper_corner.split_whitespace().collect();
            let (&[min_x, min_y, ..], &[max_x, max_y, ..]) = (lower.as_slice(), upper.as_slice())
            else {
                return Err(ExecuteError::InvalidCoordinates {
                    identifier: identifier.clone(),
                    coordinates: format!("{} {}", bbox.lower_corner, bbox.upper_corner),
                });
            };
            if lower.len() > 2 || upper.len() > 2 {
                warn!(input = %identifier, "assuming two-dimensional bounding box coordinates");
            }
            RawInputValue::BoundingBox {
                coordinates: Vec::from([min_x, min_y, max_x, max_y].map(str::to_string)),
                crs: bbox.crs,
            }
        }
        DocumentData::ComplexData(complex) => RawInputValue::EmbeddedComplex {
            format: FormatSpec::new(complex.mime_type, complex.schema, complex.encoding),
            payload: complex.value,
        },
    })
}

/// Lowers a reference element.
fn lower_reference(reference: DocumentReference) -> Result<RawReference, ExecuteError> {
    let method = match reference.method.as_deref() {
        None => HttpMethod::Get,
        Some(name) => HttpMethod::parse(name).ok_or_else(|| ExecuteError::InvalidParameterValue {
            parameter: "wps:Reference/@method".to_string(),
            value: name.to_string(),
        })?,
    };
    let headers = reference
        .headers
        .into_iter()
        .map(|header| {
            let key = header.key.ok_or_else(|| missing("wps:Header/@key"))?;
            let value = header.value.ok_or_else(|| missing("wps:Header/@value"))?;
            Ok(ReferenceHeader {
                key,
                value,
            })
        })
        .collect::<Result<Vec<_>, ExecuteError>>()?;
    let body_reference = reference
        .body_reference
        .map(|body| body.href.ok_or_else(|| missing("wps:BodyReference/@xlink:href")))
        .transpose()?;
    Ok(RawReference {
        href: reference.href,
        format: FormatSpec::new(reference.mime_type, reference.schema, reference.encoding),
        method,
        headers,
        body: reference.body,
        body_reference,
    })
}

/// Lowers the response form into its two alternative constructs.
fn lower_response_form(
    form: DocumentResponseForm,
) -> Result<(Option<RawResponseDocument>, Option<RawOutput>), ExecuteError> {
    ensure_single_form(form.response_document.is_some(), form.raw_data_output.is_some())?;
    match (form.response_document, form.raw_data_output) {
        (Some(document), _) => {
            if document.outputs.is_empty() {
                return Err(missing("wps:ResponseDocument/wps:Output"));
            }
            let outputs =
                document.outputs.into_iter().map(lower_output).collect::<Result<Vec<_>, _>>()?;
            Ok((
                Some(RawResponseDocument {
                    outputs: Some(outputs),
                    store_execute_response: document.store_execute_response,
                    lineage: document.lineage,
                    status: document.status,
                }),
                None,
            ))
        }
        (None, Some(raw)) => {
            let mut output = lower_output(raw)?;
            output.as_reference = false;
            Ok((None, Some(output)))
        }
        (None, None) => Err(ExecuteError::MissingChoice {
            first: "ResponseDocument".to_string(),
            second: "RawDataOutput".to_string(),
        }),
    }
}

/// Lowers one output element.
fn lower_output(output: DocumentOutput) -> Result<RawOutput, ExecuteError> {
    let identifier = output.identifier.ok_or_else(|| missing("wps:Output/ows:Identifier"))?;
    Ok(RawOutput {
        identifier,
        format: FormatSpec::new(output.mime_type, output.schema, output.encoding),
        uom: output.uom,
        as_reference: output.as_reference,
        title: output.title,
        summary: output.summary,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a missing parameter error.
fn missing(parameter: &str) -> ExecuteError {
    ExecuteError::MissingParameter {
        parameter: parameter.to_string(),
    }
}
