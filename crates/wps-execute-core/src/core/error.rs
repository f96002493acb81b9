// crates/wps-execute-core/src/core/error.rs
// ============================================================================
// Module: Execute Errors
// Description: Typed failures raised while validating execute requests.
// Purpose: Carry the offending identifier, attribute, and value to the caller.
// Dependencies: crate::core::{format, identifiers, process}, thiserror
// ============================================================================

//! ## Overview
//! Every rejection produced by the request engine is an [`ExecuteError`].
//! Errors are terminal for the request and never retried. Callers translate
//! them into protocol exception reports through [`ExecuteError::ows_code`] and
//! [`ExecuteError::locator`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::core::format::FormatField;
use crate::core::identifiers::Identifier;
use crate::core::process::MaxOccurs;
use crate::core::process::ParameterKind;

// ============================================================================
// SECTION: Categories
// ============================================================================

/// Coarse classification of execute errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed token or missing mandatory element.
    Structural,
    /// Unknown process, input, or output identifier.
    UnknownReference,
    /// Occurrence count out of bounds.
    Cardinality,
    /// No matching format combination.
    FormatNegotiation,
    /// Both or neither of two alternative constructs.
    MutualExclusion,
    /// Value rejected by a declared constraint.
    InvalidValue,
    /// Configured request limit exceeded.
    Limit,
}

/// Protocol exception codes used in exception reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OwsCode {
    /// Mandatory parameter value is missing.
    MissingParameterValue,
    /// Parameter value is invalid.
    InvalidParameterValue,
    /// No more specific code applies.
    NoApplicableCode,
}

impl OwsCode {
    /// Returns the exception code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingParameterValue => "MissingParameterValue",
            Self::InvalidParameterValue => "InvalidParameterValue",
            Self::NoApplicableCode => "NoApplicableCode",
        }
    }
}

impl fmt::Display for OwsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Execute Error
// ============================================================================

/// Execute request validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteError {
    /// A compact token could not be decoded.
    #[error("malformed {parameter} parameter: {token:?}")]
    MalformedParameter {
        /// Request parameter that carried the token.
        parameter: String,
        /// Offending token.
        token: String,
    },
    /// A request document could not be parsed.
    #[error("invalid execute document: {0}")]
    InvalidDocument(String),
    /// A mandatory parameter or element is absent.
    #[error("missing parameter value: {parameter}")]
    MissingParameter {
        /// Missing parameter name.
        parameter: String,
    },
    /// A parameter value is not acceptable.
    #[error("invalid value {value:?} for parameter {parameter}")]
    InvalidParameterValue {
        /// Parameter name.
        parameter: String,
        /// Offending value.
        value: String,
    },
    /// The process identifier is not registered.
    #[error("no process with identifier '{identifier}' is known")]
    UnknownProcess {
        /// Requested process identifier.
        identifier: Identifier,
    },
    /// The input identifier is not declared by the process.
    #[error("process does not declare an input named '{identifier}'")]
    UnknownInput {
        /// Requested input identifier.
        identifier: Identifier,
    },
    /// The output identifier is not declared by the process.
    #[error("process does not declare an output named '{identifier}'")]
    UnknownOutput {
        /// Requested output identifier.
        identifier: Identifier,
    },
    /// An input occurs too few or too many times.
    #[error(
        "input '{identifier}' occurs {actual} times, expected between {min_occurs} and \
         {max_occurs}"
    )]
    Occurrence {
        /// Input identifier.
        identifier: Identifier,
        /// Declared minimum.
        min_occurs: u32,
        /// Declared maximum.
        max_occurs: MaxOccurs,
        /// Observed count.
        actual: u32,
    },
    /// Requested data type conflicts with the declared data type.
    #[error("input '{identifier}' requests data type {requested:?} but declares {declared:?}")]
    DatatypeMismatch {
        /// Input identifier.
        identifier: Identifier,
        /// Data type supplied by the client.
        requested: String,
        /// Declared data type.
        declared: String,
    },
    /// Unit of measure is not supported by the definition.
    #[error("input '{identifier}' does not support unit of measure {uom:?}")]
    InvalidUom {
        /// Input identifier.
        identifier: Identifier,
        /// Requested unit.
        uom: String,
    },
    /// Bounding box coordinates are missing or not numeric.
    #[error("input '{identifier}' has invalid bounding box coordinates {coordinates:?}")]
    InvalidCoordinates {
        /// Input identifier.
        identifier: Identifier,
        /// Raw coordinate text.
        coordinates: String,
    },
    /// CRS is not supported by the definition.
    #[error("input '{identifier}' does not support crs {crs:?}")]
    InvalidCrs {
        /// Input identifier.
        identifier: Identifier,
        /// Requested CRS.
        crs: String,
    },
    /// No declared format matches the requested one.
    #[error("parameter '{identifier}' offers no format matching {}", render_attempt(.attempted))]
    NoMatchingFormat {
        /// Input or output identifier.
        identifier: Identifier,
        /// Attribute whose filter eliminated the last candidate.
        field: FormatField,
        /// Attribute combination that failed, in filter order.
        attempted: Vec<(FormatField, Option<String>)>,
    },
    /// A complex input has no reference URL.
    #[error("complex input '{identifier}' must be supplied by reference (href)")]
    MissingReference {
        /// Input identifier.
        identifier: Identifier,
    },
    /// A URL attribute is not a well-formed URL.
    #[error("input '{identifier}' has invalid {attribute} URL {value:?}")]
    InvalidUrl {
        /// Input identifier.
        identifier: Identifier,
        /// Attribute that carried the URL.
        attribute: String,
        /// Offending value.
        value: String,
    },
    /// A POST reference has neither an inline body nor a body reference.
    #[error("POST reference for input '{identifier}' requires a Body or BodyReference")]
    ReferenceBody {
        /// Input identifier.
        identifier: Identifier,
    },
    /// Two alternative constructs were both supplied.
    #[error("{first} and {second} are mutually exclusive{}", render_scope(.identifier.as_ref()))]
    MutuallyExclusive {
        /// First construct.
        first: String,
        /// Second construct.
        second: String,
        /// Input the constructs belong to, if any.
        identifier: Option<Identifier>,
    },
    /// An input supplies neither inline data nor a reference.
    #[error("input '{identifier}' requires either Data or Reference")]
    MissingInputValue {
        /// Input identifier.
        identifier: Identifier,
    },
    /// Neither of two alternative constructs was supplied.
    #[error("one of {first} or {second} is required")]
    MissingChoice {
        /// First construct.
        first: String,
        /// Second construct.
        second: String,
    },
    /// Inline data kind does not match the declared input kind.
    #[error("input '{identifier}' is declared as {expected} but {found} was supplied")]
    InputKindMismatch {
        /// Input identifier.
        identifier: Identifier,
        /// Declared kind.
        expected: ParameterKind,
        /// Supplied kind.
        found: ParameterKind,
    },
    /// A reference was supplied for a non-complex input.
    #[error("input '{identifier}' is {kind} and cannot be supplied by reference")]
    ReferenceNotSupported {
        /// Input identifier.
        identifier: Identifier,
        /// Declared kind.
        kind: ParameterKind,
    },
    /// A literal value is outside its allowed values.
    #[error("input '{identifier}' does not allow value {value:?}")]
    DisallowedValue {
        /// Input identifier.
        identifier: Identifier,
        /// Offending value.
        value: String,
    },
    /// A configured request limit was exceeded.
    #[error("{limit} exceeds limit: {actual} > {max}")]
    LimitExceeded {
        /// Limit name.
        limit: &'static str,
        /// Configured maximum.
        max: usize,
        /// Observed value.
        actual: usize,
    },
}

impl ExecuteError {
    /// Returns the coarse category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedParameter {
                ..
            }
            | Self::InvalidDocument(_)
            | Self::MissingParameter {
                ..
            }
            | Self::InvalidParameterValue {
                ..
            }
            | Self::MissingReference {
                ..
            }
            | Self::InvalidUrl {
                ..
            }
            | Self::InputKindMismatch {
                ..
            }
            | Self::ReferenceNotSupported {
                ..
            } => ErrorCategory::Structural,
            Self::UnknownProcess {
                ..
            }
            | Self::UnknownInput {
                ..
            }
            | Self::UnknownOutput {
                ..
            } => ErrorCategory::UnknownReference,
            Self::Occurrence {
                ..
            } => ErrorCategory::Cardinality,
            Self::NoMatchingFormat {
                ..
            } => ErrorCategory::FormatNegotiation,
            Self::ReferenceBody {
                ..
            }
            | Self::MutuallyExclusive {
                ..
            }
            | Self::MissingInputValue {
                ..
            }
            | Self::MissingChoice {
                ..
            } => ErrorCategory::MutualExclusion,
            Self::DatatypeMismatch {
                ..
            }
            | Self::InvalidUom {
                ..
            }
            | Self::InvalidCoordinates {
                ..
            }
            | Self::InvalidCrs {
                ..
            }
            | Self::DisallowedValue {
                ..
            } => ErrorCategory::InvalidValue,
            Self::LimitExceeded {
                ..
            } => ErrorCategory::Limit,
        }
    }

    /// Returns the protocol exception code for this error.
    #[must_use]
    pub const fn ows_code(&self) -> OwsCode {
        match self {
            Self::MissingParameter {
                ..
            }
            | Self::MissingReference {
                ..
            }
            | Self::ReferenceBody {
                ..
            }
            | Self::MissingInputValue {
                ..
            }
            | Self::MissingChoice {
                ..
            } => OwsCode::MissingParameterValue,
            Self::InvalidDocument(_)
            | Self::LimitExceeded {
                ..
            } => OwsCode::NoApplicableCode,
            _ => OwsCode::InvalidParameterValue,
        }
    }

    /// Returns the locator for exception reports: the offending parameter.
    #[must_use]
    pub fn locator(&self) -> String {
        match self {
            Self::MalformedParameter {
                parameter,
                ..
            }
            | Self::MissingParameter {
                parameter,
            }
            | Self::InvalidParameterValue {
                parameter,
                ..
            } => parameter.clone(),
            Self::InvalidDocument(_) => "Execute".to_string(),
            Self::UnknownProcess {
                ..
            } => "ows:Identifier".to_string(),
            Self::UnknownInput {
                identifier,
            }
            | Self::UnknownOutput {
                identifier,
            }
            | Self::Occurrence {
                identifier,
                ..
            }
            | Self::DatatypeMismatch {
                identifier,
                ..
            }
            | Self::InvalidUom {
                identifier,
                ..
            }
            | Self::InvalidCoordinates {
                identifier,
                ..
            }
            | Self::InvalidCrs {
                identifier,
                ..
            }
            | Self::NoMatchingFormat {
                identifier,
                ..
            }
            | Self::MissingReference {
                identifier,
            }
            | Self::InvalidUrl {
                identifier,
                ..
            }
            | Self::ReferenceBody {
                identifier,
            }
            | Self::MissingInputValue {
                identifier,
            }
            | Self::InputKindMismatch {
                identifier,
                ..
            }
            | Self::ReferenceNotSupported {
                identifier,
                ..
            }
            | Self::DisallowedValue {
                identifier,
                ..
            } => identifier.to_string(),
            Self::MutuallyExclusive {
                first,
                second,
                identifier,
            } => identifier
                .as_ref()
                .map_or_else(|| format!("{first}/{second}"), ToString::to_string),
            Self::MissingChoice {
                first,
                second,
            } => format!("{first}/{second}"),
            Self::LimitExceeded {
                limit,
                ..
            } => (*limit).to_string(),
        }
    }
}

// ============================================================================
// SECTION: Rendering Helpers
// ============================================================================

/// Renders an attempted attribute combination as `name=value` pairs.
fn render_attempt(attempted: &[(FormatField, Option<String>)]) -> String {
    attempted
        .iter()
        .map(|(field, value)| format!("{field}={}", value.as_deref().unwrap_or("-")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the optional input scope of a mutual exclusion error.
fn render_scope(identifier: Option<&Identifier>) -> String {
    identifier.map_or_else(String::new, |identifier| format!(" for input '{identifier}'"))
}
