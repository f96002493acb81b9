// crates/wps-execute-core/src/runtime/negotiator.rs
// ============================================================================
// Module: Format Negotiator
// Description: Resolves a partial format request against declared formats.
// Purpose: Pick one declared format for every complex input and output.
// Dependencies: crate::core::format, thiserror, tracing
// ============================================================================

//! ## Overview
//! Negotiation narrows the declared candidates (default first, then the
//! alternates in declaration order) through three filters: mime type, schema,
//! then encoding. An absent mime type collapses the candidates to the default.
//! An absent schema or encoding leaves the candidates untouched; a present one
//! keeps only candidates declaring exactly that value. The first survivor is
//! returned as declared, so the result is always a member of the format set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::core::FormatField;
use crate::core::FormatSet;
use crate::core::FormatSpec;

// ============================================================================
// SECTION: Results
// ============================================================================

/// Successful negotiation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatMatch {
    /// Selected declared format.
    pub format: FormatSpec,
    /// Number of candidates that survived all filters.
    pub candidates: usize,
}

impl FormatMatch {
    /// Returns true when more than one candidate survived.
    #[must_use]
    pub const fn is_ambiguous(&self) -> bool {
        self.candidates > 1
    }
}

/// Negotiation failure naming the filter that eliminated all candidates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no declared format matches {field} (attempted {attempted:?})")]
pub struct FormatMismatch {
    /// Attribute whose filter left no candidates.
    pub field: FormatField,
    /// Attribute combination that failed, in filter order.
    pub attempted: Vec<(FormatField, Option<String>)>,
}

// ============================================================================
// SECTION: Negotiation
// ============================================================================

/// Resolves `requested` against `declared`.
///
/// # Errors
///
/// Returns [`FormatMismatch`] when a filter eliminates every candidate.
pub fn negotiate(requested: &FormatSpec, declared: &FormatSet) -> Result<FormatMatch, FormatMismatch> {
    let mut candidates: Vec<&FormatSpec> = match requested.mime_type.as_deref() {
        None => vec![&declared.default],
        Some(mime) => {
            declared.candidates().filter(|candidate| candidate.mime_type.as_deref() == Some(mime)).collect()
        }
    };
    if candidates.is_empty() {
        return Err(mismatch(requested, FormatField::MimeType));
    }

    if let Some(schema) = requested.schema.as_deref() {
        candidates.retain(|candidate| candidate.schema.as_deref() == Some(schema));
        if candidates.is_empty() {
            return Err(mismatch(requested, FormatField::Schema));
        }
    }

    if let Some(encoding) = requested.encoding.as_deref() {
        candidates.retain(|candidate| candidate.encoding.as_deref() == Some(encoding));
        if candidates.is_empty() {
            return Err(mismatch(requested, FormatField::Encoding));
        }
    }

    let count = candidates.len();
    let Some(selected) = candidates.into_iter().next() else {
        return Err(mismatch(requested, FormatField::Encoding));
    };
    if count > 1 {
        warn!(
            requested = %requested,
            selected = %selected,
            candidates = count,
            "multiple declared formats match request, using first"
        );
    } else {
        debug!(requested = %requested, selected = %selected, "format negotiated");
    }
    Ok(FormatMatch {
        format: selected.clone(),
        candidates: count,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a mismatch carrying every attribute up to and including `field`.
fn mismatch(requested: &FormatSpec, field: FormatField) -> FormatMismatch {
    let mut attempted = vec![(FormatField::MimeType, requested.mime_type.clone())];
    if matches!(field, FormatField::Schema | FormatField::Encoding) {
        attempted.push((FormatField::Schema, requested.schema.clone()));
    }
    if field == FormatField::Encoding {
        attempted.push((FormatField::Encoding, requested.encoding.clone()));
    }
    FormatMismatch {
        field,
        attempted,
    }
}
