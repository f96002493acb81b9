// crates/wps-execute-core/src/runtime/mod.rs
// ============================================================================
// Module: Execute Runtime
// Description: Resolvers, front ends, and the execute engine.
// Purpose: Validate execute requests in either encoding.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the request pipeline. Both encodings lower into
//! the same resolver inputs so every validation rule lives in exactly one
//! place.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod cardinality;
pub mod document;
pub mod engine;
pub mod inputs;
pub mod kvp;
pub mod negotiator;
pub mod options;
pub mod outputs;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cardinality::count_occurrences;
pub use cardinality::validate_cardinality;
pub use document::DocumentBodyReference;
pub use document::DocumentBoundingBox;
pub use document::DocumentComplex;
pub use document::DocumentData;
pub use document::DocumentHeader;
pub use document::DocumentInput;
pub use document::DocumentLiteral;
pub use document::DocumentOutput;
pub use document::DocumentReference;
pub use document::DocumentResponseDocument;
pub use document::DocumentResponseForm;
pub use document::ExecuteDocument;
pub use engine::ExecuteEngine;
pub use inputs::InputResolver;
pub use inputs::RawInput;
pub use inputs::RawInputValue;
pub use inputs::RawReference;
pub use kvp::KvpParams;
pub use negotiator::FormatMatch;
pub use negotiator::FormatMismatch;
pub use negotiator::negotiate;
pub use options::AllowedValuesPolicy;
pub use options::DefaultResponseForm;
pub use options::EngineOptions;
pub use options::RequestLimits;
pub use outputs::OutputResolver;
pub use outputs::RawOutput;
pub use outputs::RawResponseDocument;
pub use outputs::ensure_single_form;
pub use registry::InMemoryProcessRegistry;
