// crates/wps-execute-core/tests/proptest_negotiation.rs
// ============================================================================
// Module: Format Negotiation Property Tests
// Description: Property-based checks for format negotiation.
// Purpose: Ensure selections are declared, consistent, and deterministic.
// Dependencies: wps-execute-core, proptest
// ============================================================================
//! ## Overview
//! Generates declared format sets and partial requests over a small alphabet
//! so that matches, partial matches, and misses all occur.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use proptest::prelude::*;
use wps_execute_core::FormatSet;
use wps_execute_core::FormatSpec;
use wps_execute_core::negotiate;

/// Mime types used by generated formats.
const MIME_TYPES: &[&str] = &["text/xml", "application/json", "image/png"];
/// Schemas used by generated formats.
const SCHEMAS: &[&str] = &["A", "B"];
/// Encodings used by generated formats.
const ENCODINGS: &[&str] = &["UTF-8", "base64"];

/// Strategy for one optional format field drawn from `values`.
fn field(values: &'static [&'static str]) -> impl Strategy<Value = Option<String>> {
    proptest::option::of(proptest::sample::select(values).prop_map(str::to_string))
}

/// Strategy for a partial format.
fn format() -> impl Strategy<Value = FormatSpec> {
    (field(MIME_TYPES), field(SCHEMAS), field(ENCODINGS))
        .prop_map(|(mime_type, schema, encoding)| FormatSpec::new(mime_type, schema, encoding))
}

/// Strategy for one declared format; the mime type is always set.
fn declared_format() -> impl Strategy<Value = FormatSpec> {
    (proptest::sample::select(MIME_TYPES), field(SCHEMAS), field(ENCODINGS)).prop_map(
        |(mime_type, schema, encoding)| FormatSpec::new(Some(mime_type.to_string()), schema, encoding),
    )
}

/// Strategy for a declared format set.
fn declared() -> impl Strategy<Value = FormatSet> {
    (declared_format(), proptest::collection::vec(declared_format(), 0..4))
        .prop_map(|(default, others)| others.into_iter().fold(FormatSet::new(default), FormatSet::with_other))
}

/// Returns true when every field set in `requested` equals the candidate's.
fn admits(requested: &FormatSpec, candidate: &FormatSpec) -> bool {
    [
        (&requested.mime_type, &candidate.mime_type),
        (&requested.schema, &candidate.schema),
        (&requested.encoding, &candidate.encoding),
    ]
    .into_iter()
    .all(|(wanted, got)| wanted.is_none() || wanted == got)
}

proptest! {
    /// Verifies a selection is declared and agrees with every requested field.
    #[test]
    fn selection_is_declared_and_consistent(requested in format(), declared in declared()) {
        if let Ok(selection) = negotiate(&requested, &declared) {
            prop_assert!(declared.contains(&selection.format));
            prop_assert!(selection.candidates >= 1);
            for (wanted, got) in [
                (&requested.mime_type, &selection.format.mime_type),
                (&requested.schema, &selection.format.schema),
                (&requested.encoding, &selection.format.encoding),
            ] {
                if wanted.is_some() {
                    prop_assert_eq!(wanted, got);
                }
            }
        }
    }

    /// Verifies requesting a declared format selects the first candidate it admits.
    #[test]
    fn first_declared_match_wins(declared in declared(), index in 0usize..5) {
        let candidates: Vec<&FormatSpec> = declared.candidates().collect();
        let target = candidates[index % candidates.len()].clone();
        let selection = negotiate(&target, &declared).unwrap();
        let first = candidates
            .iter()
            .find(|candidate| admits(&target, candidate))
            .unwrap();
        prop_assert_eq!(&selection.format, *first);
    }

    /// Verifies a request without a mime type only ever selects the default.
    #[test]
    fn absent_mime_type_selects_default(requested in format(), declared in declared()) {
        let requested = FormatSpec::new(None, requested.schema, requested.encoding);
        if let Ok(selection) = negotiate(&requested, &declared) {
            prop_assert_eq!(selection.format, declared.default.clone());
            prop_assert_eq!(selection.candidates, 1);
        }
    }

    /// Verifies negotiation is deterministic.
    #[test]
    fn negotiation_is_deterministic(requested in format(), declared in declared()) {
        prop_assert_eq!(negotiate(&requested, &declared), negotiate(&requested, &declared));
    }
}
