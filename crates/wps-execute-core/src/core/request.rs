// crates/wps-execute-core/src/core/request.rs
// ============================================================================
// Module: Execute Request Model
// Description: Validated inputs, requested outputs, and the assembled request.
// Purpose: Provide the immutable result handed to an execution engine.
// Dependencies: crate::core::{format, identifiers, process}, serde, url
// ============================================================================

//! ## Overview
//! These types are produced only by the request engine after every check has
//! passed. An [`ExecuteRequest`] is never partially populated: it is either
//! returned whole or not at all.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::core::format::FormatSpec;
use crate::core::identifiers::Identifier;
use crate::core::identifiers::LanguageString;
use crate::core::process::ParameterKind;
use crate::core::process::ProcessDescriptor;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Protocol version stamped on assembled requests.
pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============================================================================
// SECTION: Resolved Inputs
// ============================================================================

/// Input value that passed validation against its definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedInput {
    /// Input identifier.
    pub identifier: Identifier,
    /// Optional title supplied by the client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<LanguageString>,
    /// Optional abstract supplied by the client.
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub summary: Option<LanguageString>,
    /// Resolved value.
    pub value: InputValue,
}

impl ResolvedInput {
    /// Creates a resolved input without title or abstract.
    #[must_use]
    pub const fn new(identifier: Identifier, value: InputValue) -> Self {
        Self {
            identifier,
            title: None,
            summary: None,
            value,
        }
    }

    /// Returns the parameter kind of the resolved value.
    #[must_use]
    pub const fn kind(&self) -> ParameterKind {
        match &self.value {
            InputValue::Literal {
                ..
            } => ParameterKind::Literal,
            InputValue::BoundingBox {
                ..
            } => ParameterKind::BoundingBox,
            InputValue::EmbeddedComplex {
                ..
            }
            | InputValue::ReferencedComplex(_) => ParameterKind::Complex,
        }
    }

    /// Returns the resolved format of complex inputs.
    #[must_use]
    pub const fn format(&self) -> Option<&FormatSpec> {
        match &self.value {
            InputValue::EmbeddedComplex {
                format,
                ..
            } => Some(format),
            InputValue::ReferencedComplex(reference) => Some(&reference.format),
            InputValue::Literal {
                ..
            }
            | InputValue::BoundingBox {
                ..
            } => None,
        }
    }
}

/// Resolved input payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputValue {
    /// Literal text with its resolved unit of measure.
    Literal {
        /// Literal text.
        value: String,
        /// Resolved unit of measure, if the definition declares units.
        uom: Option<String>,
    },
    /// Bounding box with its resolved CRS.
    BoundingBox {
        /// `[min_x, min_y, max_x, max_y]`.
        bounds: [f64; 4],
        /// Resolved CRS identifier.
        crs: String,
    },
    /// Complex data embedded in the request.
    EmbeddedComplex {
        /// Negotiated format.
        format: FormatSpec,
        /// Opaque payload.
        payload: Value,
    },
    /// Complex data supplied by reference.
    ReferencedComplex(ReferencedComplexInput),
}

/// Complex input supplied as a URL to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferencedComplexInput {
    /// Negotiated format.
    pub format: FormatSpec,
    /// Description of how to fetch the data.
    pub reference: InputReference,
}

/// Fetch description for a referenced input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputReference {
    /// Target URL.
    pub href: Url,
    /// HTTP method.
    pub method: HttpMethod,
    /// Request headers in client order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<ReferenceHeader>,
    /// POST body; always absent for GET.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ReferenceBody>,
}

impl InputReference {
    /// Creates a GET reference without headers.
    #[must_use]
    pub const fn get(href: Url) -> Self {
        Self {
            href,
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
        }
    }
}

/// Header sent when fetching a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceHeader {
    /// Header name.
    pub key: String,
    /// Header value.
    pub value: String,
}

/// POST body of a referenced input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceBody {
    /// Body embedded in the request.
    Inline(Value),
    /// Body to fetch from another URL.
    Reference(Url),
}

/// HTTP method of a referenced input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET.
    #[default]
    Get,
    /// HTTP POST.
    Post,
}

impl HttpMethod {
    /// Parses a protocol method name (`GET` or `POST`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            _ => None,
        }
    }

    /// Returns the protocol method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Requested Outputs
// ============================================================================

/// Output the client wants produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestedOutput {
    /// Output identifier.
    pub identifier: Identifier,
    /// Deliver as a stored reference instead of inline.
    pub as_reference: bool,
    /// Negotiated format; passes through unchanged for non-complex outputs.
    pub format: FormatSpec,
    /// Requested unit of measure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
    /// Optional title supplied by the client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<LanguageString>,
    /// Optional abstract supplied by the client.
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub summary: Option<LanguageString>,
}

/// Requested response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseForm {
    /// Response document listing outputs.
    Document(ResponseDocument),
    /// Single raw output.
    RawData(RawDataOutput),
}

/// Response document request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResponseDocument {
    /// Requested outputs in client order.
    pub outputs: Vec<RequestedOutput>,
    /// Store the response as a retrievable resource.
    pub store_execute_response: bool,
    /// Echo inputs and output requests back in the response.
    pub lineage: bool,
    /// Provide incremental status updates.
    pub status: bool,
}

/// Raw single-output request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawDataOutput {
    /// The single output; never delivered as a reference.
    output: RequestedOutput,
}

impl RawDataOutput {
    /// Wraps an output, forcing `as_reference` to false.
    #[must_use]
    pub fn new(mut output: RequestedOutput) -> Self {
        output.as_reference = false;
        Self {
            output,
        }
    }

    /// Returns the wrapped output.
    #[must_use]
    pub const fn output(&self) -> &RequestedOutput {
        &self.output
    }
}

// ============================================================================
// SECTION: Execute Request
// ============================================================================

/// Fully validated execute request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecuteRequest {
    /// Protocol version.
    version: String,
    /// Optional language tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    /// Descriptor of the process to run.
    process: Arc<ProcessDescriptor>,
    /// Resolved inputs in request order.
    inputs: Vec<ResolvedInput>,
    /// Requested response form; absent means the default shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    response_form: Option<ResponseForm>,
}

impl ExecuteRequest {
    /// Assembles a request from already validated parts.
    #[must_use]
    pub fn assemble(
        language: Option<String>,
        process: Arc<ProcessDescriptor>,
        inputs: Vec<ResolvedInput>,
        response_form: Option<ResponseForm>,
    ) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            language,
            process,
            inputs,
            response_form,
        }
    }

    /// Returns the protocol version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the language tag.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Returns the process descriptor.
    #[must_use]
    pub fn process(&self) -> &ProcessDescriptor {
        &self.process
    }

    /// Returns a shared handle to the process descriptor.
    #[must_use]
    pub fn process_handle(&self) -> Arc<ProcessDescriptor> {
        Arc::clone(&self.process)
    }

    /// Returns the resolved inputs.
    #[must_use]
    pub fn inputs(&self) -> &[ResolvedInput] {
        &self.inputs
    }

    /// Returns the requested response form.
    #[must_use]
    pub const fn response_form(&self) -> Option<&ResponseForm> {
        self.response_form.as_ref()
    }
}
