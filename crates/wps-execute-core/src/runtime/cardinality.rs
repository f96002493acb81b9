// crates/wps-execute-core/src/runtime/cardinality.rs
// ============================================================================
// Module: Cardinality Validator
// Description: Occurrence checks for declared inputs.
// Purpose: Confirm every declared input occurs within [min_occurs, max_occurs].
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Runs once after every input of a request has been resolved. Declared
//! inputs are checked in declaration order and the first violation is
//! reported, so the reported identifier is deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::ExecuteError;
use crate::core::Identifier;
use crate::core::InputDefinition;
use crate::core::ResolvedInput;

// ============================================================================
// SECTION: Counting
// ============================================================================

/// Counts resolved inputs per identifier.
#[must_use]
pub fn count_occurrences(inputs: &[ResolvedInput]) -> BTreeMap<Identifier, u32> {
    let mut counts = BTreeMap::new();
    for input in inputs {
        let count: &mut u32 = counts.entry(input.identifier.clone()).or_default();
        *count = count.saturating_add(1);
    }
    counts
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates observed counts against the declared inputs.
///
/// Identifiers absent from `counts` count as zero occurrences.
///
/// # Errors
///
/// Returns [`ExecuteError::Occurrence`] for the first declared input whose
/// count is out of bounds.
pub fn validate_cardinality(
    counts: &BTreeMap<Identifier, u32>,
    declared: &[InputDefinition],
) -> Result<(), ExecuteError> {
    for definition in declared {
        let actual = counts.get(&definition.identifier).copied().unwrap_or(0);
        if actual < definition.min_occurs || !definition.max_occurs.admits(actual) {
            return Err(ExecuteError::Occurrence {
                identifier: definition.identifier.clone(),
                min_occurs: definition.min_occurs,
                max_occurs: definition.max_occurs,
                actual,
            });
        }
    }
    Ok(())
}
