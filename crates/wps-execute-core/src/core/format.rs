// crates/wps-execute-core/src/core/format.rs
// ============================================================================
// Module: Complex Data Formats
// Description: Partial format descriptions and declared format sets.
// Purpose: Model the mime type / schema / encoding triple used for negotiation.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`FormatSpec`] is a partial description: any field may be absent, which
//! means "unconstrained" on the request side and "not declared" on the
//! definition side. A [`FormatSet`] is the declared capability of a complex
//! parameter: one default format plus alternates in declaration order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Format Specification
// ============================================================================

/// Mime type, schema, and encoding triple. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatSpec {
    /// Mime type (for example `text/xml`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Schema URL or identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Character or transfer encoding (for example `UTF-8` or `base64`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl FormatSpec {
    /// Creates a format from optional parts.
    #[must_use]
    pub const fn new(
        mime_type: Option<String>,
        schema: Option<String>,
        encoding: Option<String>,
    ) -> Self {
        Self {
            mime_type,
            schema,
            encoding,
        }
    }

    /// Creates a format that only constrains the mime type.
    #[must_use]
    pub fn mime(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: Some(mime_type.into()),
            schema: None,
            encoding: None,
        }
    }

    /// Returns this format with the schema set.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Returns this format with the encoding set.
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Returns true when no field is set.
    #[must_use]
    pub const fn is_unconstrained(&self) -> bool {
        self.mime_type.is_none() && self.schema.is_none() && self.encoding.is_none()
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mimeType: {}, schema: {}, encoding: {}",
            self.mime_type.as_deref().unwrap_or("-"),
            self.schema.as_deref().unwrap_or("-"),
            self.encoding.as_deref().unwrap_or("-"),
        )
    }
}

// ============================================================================
// SECTION: Format Fields
// ============================================================================

/// Individual format attribute, used when reporting negotiation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatField {
    /// Mime type attribute.
    MimeType,
    /// Schema attribute.
    Schema,
    /// Encoding attribute.
    Encoding,
}

impl FormatField {
    /// Returns the protocol attribute name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MimeType => "mimetype",
            Self::Schema => "schema",
            Self::Encoding => "encoding",
        }
    }
}

impl fmt::Display for FormatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Declared Format Set
// ============================================================================

/// Declared formats of a complex parameter: a default plus alternates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSet {
    /// Default format.
    pub default: FormatSpec,
    /// Other accepted formats in declaration order.
    #[serde(default)]
    pub others: Vec<FormatSpec>,
}

impl FormatSet {
    /// Creates a format set with only a default format.
    #[must_use]
    pub const fn new(default: FormatSpec) -> Self {
        Self {
            default,
            others: Vec::new(),
        }
    }

    /// Returns this set with an additional alternate format.
    #[must_use]
    pub fn with_other(mut self, other: FormatSpec) -> Self {
        self.others.push(other);
        self
    }

    /// Iterates the default followed by the alternates.
    pub fn candidates(&self) -> impl Iterator<Item = &FormatSpec> {
        std::iter::once(&self.default).chain(self.others.iter())
    }

    /// Returns true when the format is literally declared in this set.
    #[must_use]
    pub fn contains(&self, format: &FormatSpec) -> bool {
        self.candidates().any(|candidate| candidate == format)
    }
}
