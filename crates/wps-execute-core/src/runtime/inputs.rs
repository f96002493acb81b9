// crates/wps-execute-core/src/runtime/inputs.rs
// ============================================================================
// Module: Input Resolver
// Description: Validates raw inputs against declared input definitions.
// Purpose: Produce literal, bounding box, and complex inputs for a request.
// Dependencies: crate::{core, runtime::negotiator, runtime::options}, tracing, url
// ============================================================================

//! ## Overview
//! Both request encodings lower their inputs into [`RawInput`] values, which
//! this resolver checks against the process descriptor:
//! - Literal: data type must agree with a declared data type; the unit of
//!   measure falls back to the declared default or must be a declared unit.
//! - Bounding box: at least four numeric coordinates and a declared CRS.
//! - Complex: the requested format is negotiated against the declared formats.
//!   References additionally need a well-formed URL, and POST references need
//!   exactly one of an inline body or a body reference.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use tracing::debug;
use tracing::warn;
use url::Url;

use crate::core::BoundingBoxDefinition;
use crate::core::ExecuteError;
use crate::core::FormatSet;
use crate::core::FormatSpec;
use crate::core::HttpMethod;
use crate::core::Identifier;
use crate::core::InputDefinition;
use crate::core::InputKind;
use crate::core::InputReference;
use crate::core::InputValue;
use crate::core::LanguageString;
use crate::core::LiteralDefinition;
use crate::core::ParameterKind;
use crate::core::ProcessDescriptor;
use crate::core::ReferenceBody;
use crate::core::ReferenceHeader;
use crate::core::ReferencedComplexInput;
use crate::core::ResolvedInput;
use crate::runtime::negotiator::negotiate;
use crate::runtime::options::AllowedValuesPolicy;
use crate::runtime::options::EngineOptions;
use crate::runtime::options::RequestLimits;

// ============================================================================
// SECTION: Raw Inputs
// ============================================================================

/// Input as supplied by a client, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawInput {
    /// Input identifier.
    pub identifier: Identifier,
    /// Optional title.
    pub title: Option<LanguageString>,
    /// Optional abstract.
    pub summary: Option<LanguageString>,
    /// Supplied value.
    pub value: RawInputValue,
}

impl RawInput {
    /// Creates a raw input without title or abstract.
    #[must_use]
    pub const fn new(identifier: Identifier, value: RawInputValue) -> Self {
        Self {
            identifier,
            title: None,
            summary: None,
            value,
        }
    }
}

/// Supplied value of a raw input.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInputValue {
    /// Literal text with optional data type and unit attributes.
    Literal {
        /// Literal text.
        value: String,
        /// Data type claimed by the client.
        data_type: Option<String>,
        /// Unit of measure claimed by the client.
        uom: Option<String>,
    },
    /// Bounding box coordinates with an optional CRS.
    BoundingBox {
        /// Coordinate tokens in `min_x, min_y, max_x, max_y` order.
        coordinates: Vec<String>,
        /// CRS claimed by the client.
        crs: Option<String>,
    },
    /// Complex data embedded in the request.
    EmbeddedComplex {
        /// Requested format.
        format: FormatSpec,
        /// Opaque payload.
        payload: Value,
    },
    /// Data supplied by reference.
    Reference(RawReference),
}

impl RawInputValue {
    /// Returns the kind of inline data, or `None` for references.
    #[must_use]
    pub const fn data_kind(&self) -> Option<ParameterKind> {
        match self {
            Self::Literal {
                ..
            } => Some(ParameterKind::Literal),
            Self::BoundingBox {
                ..
            } => Some(ParameterKind::BoundingBox),
            Self::EmbeddedComplex {
                ..
            } => Some(ParameterKind::Complex),
            Self::Reference(_) => None,
        }
    }
}

/// Reference as supplied by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReference {
    /// Target URL text.
    pub href: Option<String>,
    /// Requested format.
    pub format: FormatSpec,
    /// HTTP method.
    pub method: HttpMethod,
    /// Headers in client order.
    pub headers: Vec<ReferenceHeader>,
    /// Inline POST body.
    pub body: Option<Value>,
    /// POST body reference URL text.
    pub body_reference: Option<String>,
}

impl RawReference {
    /// Creates a GET reference to `href`.
    #[must_use]
    pub fn get(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::default()
        }
    }
}

// ============================================================================
// SECTION: Input Resolver
// ============================================================================

/// Resolves raw inputs against one process descriptor.
#[derive(Debug, Clone, Copy)]
pub struct InputResolver<'a> {
    /// Process whose inputs are resolved.
    process: &'a ProcessDescriptor,
    /// Engine options.
    options: &'a EngineOptions,
}

impl<'a> InputResolver<'a> {
    /// Creates a resolver for `process`.
    #[must_use]
    pub const fn new(process: &'a ProcessDescriptor, options: &'a EngineOptions) -> Self {
        Self {
            process,
            options,
        }
    }

    /// Looks up the declared input named `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::UnknownInput`] when the process declares no such input.
    pub fn definition(&self, identifier: &Identifier) -> Result<&'a InputDefinition, ExecuteError> {
        self.process.input(identifier).ok_or_else(|| ExecuteError::UnknownInput {
            identifier: identifier.clone(),
        })
    }

    /// Resolves one raw input.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError`] when the input is unknown, of the wrong kind,
    /// or violates its definition.
    pub fn resolve(&self, raw: RawInput) -> Result<ResolvedInput, ExecuteError> {
        let definition = self.definition(&raw.identifier)?;
        let identifier = &definition.identifier;
        let value = match (&definition.kind, raw.value) {
            (
                InputKind::Literal(literal),
                RawInputValue::Literal {
                    value,
                    data_type,
                    uom,
                },
            ) => self.resolve_literal(identifier, literal, value, data_type, uom)?,
            (
                InputKind::BoundingBox(bbox),
                RawInputValue::BoundingBox {
                    coordinates,
                    crs,
                },
            ) => resolve_bounding_box(identifier, bbox, &coordinates, crs)?,
            (
                InputKind::Complex(complex),
                RawInputValue::EmbeddedComplex {
                    format,
                    payload,
                },
            ) => InputValue::EmbeddedComplex {
                format: negotiate_input(identifier, &format, &complex.formats)?,
                payload,
            },
            (InputKind::Complex(complex), RawInputValue::Reference(reference)) => {
                InputValue::ReferencedComplex(self.resolve_reference(
                    identifier,
                    &complex.formats,
                    reference,
                )?)
            }
            (kind, RawInputValue::Reference(_)) => {
                return Err(ExecuteError::ReferenceNotSupported {
                    identifier: identifier.clone(),
                    kind: kind.name(),
                });
            }
            (kind, other) => {
                return Err(ExecuteError::InputKindMismatch {
                    identifier: identifier.clone(),
                    expected: kind.name(),
                    found: other.data_kind().unwrap_or(ParameterKind::Complex),
                });
            }
        };
        Ok(ResolvedInput {
            identifier: identifier.clone(),
            title: raw.title,
            summary: raw.summary,
            value,
        })
    }

    /// Resolves a literal value.
    fn resolve_literal(
        &self,
        identifier: &Identifier,
        definition: &LiteralDefinition,
        value: String,
        data_type: Option<String>,
        uom: Option<String>,
    ) -> Result<InputValue, ExecuteError> {
        if let (Some(requested), Some(declared)) = (data_type, definition.data_type.as_ref())
            && &requested != declared
        {
            return Err(ExecuteError::DatatypeMismatch {
                identifier: identifier.clone(),
                requested,
                declared: declared.clone(),
            });
        }
        self.check_allowed_values(identifier, definition, &value)?;
        let uom = match uom {
            None => definition.default_uom.clone(),
            Some(uom) if definition.supports_uom(&uom) => Some(uom),
            Some(uom) => {
                return Err(ExecuteError::InvalidUom {
                    identifier: identifier.clone(),
                    uom,
                });
            }
        };
        Ok(InputValue::Literal {
            value,
            uom,
        })
    }

    /// Applies the allowed values policy to a literal.
    fn check_allowed_values(
        &self,
        identifier: &Identifier,
        definition: &LiteralDefinition,
        value: &str,
    ) -> Result<(), ExecuteError> {
        if definition.allowed_values.is_empty()
            || definition.allowed_values.iter().any(|allowed| allowed.admits(value))
        {
            return Ok(());
        }
        match self.options.allowed_values {
            AllowedValuesPolicy::Advisory => {
                warn!(input = %identifier, value, "literal value outside declared allowed values");
                Ok(())
            }
            AllowedValuesPolicy::Enforce => Err(ExecuteError::DisallowedValue {
                identifier: identifier.clone(),
                value: value.to_string(),
            }),
        }
    }

    /// Resolves a reference to complex data.
    fn resolve_reference(
        &self,
        identifier: &Identifier,
        formats: &FormatSet,
        reference: RawReference,
    ) -> Result<ReferencedComplexInput, ExecuteError> {
        let Some(href_text) = reference.href else {
            return Err(ExecuteError::MissingReference {
                identifier: identifier.clone(),
            });
        };
        let href = parse_url(identifier, "href", &href_text)?;
        let format = negotiate_input(identifier, &reference.format, formats)?;
        RequestLimits::check(
            "headers",
            self.options.limits.max_headers,
            reference.headers.len(),
        )?;
        let body = match reference.method {
            HttpMethod::Get => {
                if reference.body.is_some() || reference.body_reference.is_some() {
                    debug!(input = %identifier, "ignoring request body on GET reference");
                }
                None
            }
            HttpMethod::Post => match (reference.body, reference.body_reference) {
                (Some(_), Some(_)) => {
                    return Err(ExecuteError::MutuallyExclusive {
                        first: "Body".to_string(),
                        second: "BodyReference".to_string(),
                        identifier: Some(identifier.clone()),
                    });
                }
                (Some(body), None) => Some(ReferenceBody::Inline(body)),
                (None, Some(body_href)) => {
                    Some(ReferenceBody::Reference(parse_url(identifier, "BodyReference", &body_href)?))
                }
                (None, None) => {
                    return Err(ExecuteError::ReferenceBody {
                        identifier: identifier.clone(),
                    });
                }
            },
        };
        Ok(ReferencedComplexInput {
            format,
            reference: InputReference {
                href,
                method: reference.method,
                headers: reference.headers,
                body,
            },
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves bounding box coordinates and CRS.
fn resolve_bounding_box(
    identifier: &Identifier,
    definition: &BoundingBoxDefinition,
    coordinates: &[String],
    crs: Option<String>,
) -> Result<InputValue, ExecuteError> {
    let invalid = || ExecuteError::InvalidCoordinates {
        identifier: identifier.clone(),
        coordinates: coordinates.join(","),
    };
    if coordinates.len() < 4 {
        return Err(invalid());
    }
    if coordinates.len() > 4 {
        warn!(input = %identifier, "assuming two-dimensional bounding box coordinates");
    }
    let mut bounds = [0.0_f64; 4];
    for (slot, token) in bounds.iter_mut().zip(coordinates) {
        *slot = token.trim().parse::<f64>().map_err(|_| invalid())?;
    }
    let crs = crs.unwrap_or_else(|| definition.default_crs.clone());
    if !definition.supports_crs(&crs) {
        return Err(ExecuteError::InvalidCrs {
            identifier: identifier.clone(),
            crs,
        });
    }
    Ok(InputValue::BoundingBox {
        bounds,
        crs,
    })
}

/// Negotiates an input format and maps failures onto the input.
fn negotiate_input(
    identifier: &Identifier,
    requested: &FormatSpec,
    declared: &FormatSet,
) -> Result<FormatSpec, ExecuteError> {
    negotiate(requested, declared).map(|matched| matched.format).map_err(|mismatch| {
        ExecuteError::NoMatchingFormat {
            identifier: identifier.clone(),
            field: mismatch.field,
            attempted: mismatch.attempted,
        }
    })
}

/// Parses a URL attribute of an input.
fn parse_url(identifier: &Identifier, attribute: &str, value: &str) -> Result<Url, ExecuteError> {
    Url::parse(value).map_err(|_| ExecuteError::InvalidUrl {
        identifier: identifier.clone(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    })
}
