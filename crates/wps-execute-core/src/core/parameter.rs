// crates/wps-execute-core/src/core/parameter.rs
// ============================================================================
// Module: Attributed Parameter Codec
// Description: Decoder/encoder for compact `name=value@attr=val` tokens.
// Purpose: Turn one compact-encoding token into a structured parameter.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Compact (KVP) requests encode every input and output as a single token:
//! `identifier[=value](@attribute[=value])*`. Decoding splits on `@`, then
//! splits each segment once on its first `=`. Attribute names keep their case
//! and order; a second uppercase-keyed map serves case-insensitive lookups and
//! is never used to rewrite the original attributes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Separator between the identifier segment and attribute segments.
const ATTRIBUTE_SEPARATOR: char = '@';
/// Separator between a name and its value.
const VALUE_SEPARATOR: char = '=';

/// Recognized attribute: declared data type of a literal.
pub const ATTR_DATA_TYPE: &str = "DATATYPE";
/// Recognized attribute: unit of measure.
pub const ATTR_UOM: &str = "UOM";
/// Recognized attribute: requested mime type.
pub const ATTR_MIME_TYPE: &str = "MIMETYPE";
/// Recognized attribute: requested encoding.
pub const ATTR_ENCODING: &str = "ENCODING";
/// Recognized attribute: requested schema.
pub const ATTR_SCHEMA: &str = "SCHEMA";
/// Recognized attribute: reference URL.
pub const ATTR_HREF: &str = "HREF";
/// Namespaced spelling of the reference URL attribute.
pub const ATTR_XLINK_HREF: &str = "XLINK:HREF";
/// Recognized attribute: deliver output as reference.
pub const ATTR_AS_REFERENCE: &str = "ASREFERENCE";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while decoding a compact token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// Token has no identifier after splitting.
    #[error("malformed attributed parameter: {0:?}")]
    Malformed(String),
}

// ============================================================================
// SECTION: Attributed Parameter
// ============================================================================

/// Decoded compact-encoding token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributedParameter {
    /// Parameter identifier; never empty.
    identifier: String,
    /// Optional primary value.
    value: Option<String>,
    /// Attributes in token order with original casing.
    attributes: Vec<(String, Option<String>)>,
    /// Uppercase-keyed lookup view; later duplicates win.
    lookup: BTreeMap<String, Option<String>>,
}

impl AttributedParameter {
    /// Creates a parameter without attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Malformed`] when the identifier is empty.
    pub fn new(identifier: impl Into<String>, value: Option<String>) -> Result<Self, ParameterError> {
        let identifier = identifier.into();
        if identifier.is_empty() {
            return Err(ParameterError::Malformed(identifier));
        }
        Ok(Self {
            identifier,
            value,
            attributes: Vec::new(),
            lookup: BTreeMap::new(),
        })
    }

    /// Returns this parameter with an additional attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        let name = name.into();
        self.lookup.insert(name.to_ascii_uppercase(), value.clone());
        self.attributes.push((name, value));
        self
    }

    /// Decodes a compact token.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Malformed`] when the identifier segment is empty.
    pub fn decode(token: &str) -> Result<Self, ParameterError> {
        let mut segments = token.split(ATTRIBUTE_SEPARATOR);
        let head = segments.next().unwrap_or_default();
        let (identifier, value) = split_segment(head);
        if identifier.is_empty() {
            return Err(ParameterError::Malformed(token.to_string()));
        }
        let mut parameter = Self::new(identifier, value.map(str::to_string))?;
        for segment in segments.filter(|segment| !segment.is_empty()) {
            let (name, value) = split_segment(segment);
            if name.is_empty() {
                continue;
            }
            parameter = parameter.with_attribute(name, value.map(str::to_string));
        }
        Ok(parameter)
    }

    /// Encodes this parameter back into compact form.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.identifier.len() + 16);
        push_segment(&mut out, &self.identifier, self.value.as_deref());
        for (name, value) in &self.attributes {
            out.push(ATTRIBUTE_SEPARATOR);
            push_segment(&mut out, name, value.as_deref());
        }
        out
    }

    /// Returns the parameter identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the primary value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns the attributes in token order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, Option<String>)] {
        &self.attributes
    }

    /// Looks up an attribute value by name, ignoring case.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.lookup.get(&name.to_ascii_uppercase()).and_then(Option::as_deref)
    }

    /// Returns the `dataType` attribute.
    #[must_use]
    pub fn data_type(&self) -> Option<&str> {
        self.attribute(ATTR_DATA_TYPE)
    }

    /// Returns the `uom` attribute.
    #[must_use]
    pub fn uom(&self) -> Option<&str> {
        self.attribute(ATTR_UOM)
    }

    /// Returns the `mimeType` attribute.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.attribute(ATTR_MIME_TYPE)
    }

    /// Returns the `encoding` attribute.
    #[must_use]
    pub fn encoding(&self) -> Option<&str> {
        self.attribute(ATTR_ENCODING)
    }

    /// Returns the `schema` attribute.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.attribute(ATTR_SCHEMA)
    }

    /// Returns the `href` attribute, accepting the `xlink:href` spelling.
    #[must_use]
    pub fn href(&self) -> Option<&str> {
        self.attribute(ATTR_HREF).or_else(|| self.attribute(ATTR_XLINK_HREF))
    }

    /// Returns the raw `asReference` attribute.
    #[must_use]
    pub fn as_reference(&self) -> Option<&str> {
        self.attribute(ATTR_AS_REFERENCE)
    }
}

impl fmt::Display for AttributedParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Splits a segment once on its first `=`; a trailing `=` yields no value.
fn split_segment(segment: &str) -> (&str, Option<&str>) {
    match segment.split_once(VALUE_SEPARATOR) {
        Some((name, value)) if !value.is_empty() => (name, Some(value)),
        Some((name, _)) => (name, None),
        None => (segment, None),
    }
}

/// Appends `name[=value]` to the buffer.
fn push_segment(out: &mut String, name: &str, value: Option<&str>) {
    out.push_str(name);
    if let Some(value) = value {
        out.push(VALUE_SEPARATOR);
        out.push_str(value);
    }
}
