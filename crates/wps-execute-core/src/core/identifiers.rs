// crates/wps-execute-core/src/core/identifiers.rs
// ============================================================================
// Module: Execute Identifiers
// Description: Code-typed identifiers and language-tagged strings.
// Purpose: Provide strongly typed, serializable identifiers with stable equality.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Processes, inputs, and outputs are named by a code plus an optional code
//! space. Two identifiers match only when both parts are equal, so an
//! identifier without a code space never matches one that declares one.
//! Identifiers deserialize from a bare code string or a `{code, code_space}`
//! object.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier
// ============================================================================

/// Code-typed identifier for processes and their parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "IdentifierRepr")]
pub struct Identifier {
    /// Identifier code.
    pub code: String,
    /// Optional code space qualifying the code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_space: Option<String>,
}

impl Identifier {
    /// Creates an identifier without a code space.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            code_space: None,
        }
    }

    /// Creates an identifier qualified by a code space.
    #[must_use]
    pub fn with_code_space(code: impl Into<String>, code_space: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            code_space: Some(code_space.into()),
        }
    }

    /// Returns the identifier code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the code space, if any.
    #[must_use]
    pub fn code_space(&self) -> Option<&str> {
        self.code_space.as_deref()
    }
}

/// Accepted serialized forms of an identifier.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdentifierRepr {
    /// Bare code.
    Code(String),
    /// Code with an optional code space.
    Qualified {
        /// Identifier code.
        code: String,
        /// Optional code space.
        #[serde(default)]
        code_space: Option<String>,
    },
}

impl From<IdentifierRepr> for Identifier {
    fn from(repr: IdentifierRepr) -> Self {
        match repr {
            IdentifierRepr::Code(code) => Self::new(code),
            IdentifierRepr::Qualified {
                code,
                code_space,
            } => Self {
                code,
                code_space,
            },
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code_space {
            Some(space) => write!(f, "{{{space}}}{}", self.code),
            None => self.code.fmt(f),
        }
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Language Strings
// ============================================================================

/// Human-readable text with an optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageString {
    /// Text value.
    pub value: String,
    /// Optional language tag (for example `en` or `de-DE`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl LanguageString {
    /// Creates an untagged language string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            lang: None,
        }
    }
}

impl fmt::Display for LanguageString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
