// crates/wps-execute-core/src/lib.rs
// ============================================================================
// Module: WPS Execute Core Library
// Description: Public API surface for execute request validation.
// Purpose: Expose core types, collaborator interfaces, and the engine.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! WPS Execute core turns a client execute request, in compact key/value or
//! document encoding, into a validated [`ExecuteRequest`]: which process to
//! run, with which inputs, and in which output formats. It performs no I/O;
//! process lookup and reference fetching go through the traits in
//! [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::FetchError;
pub use interfaces::FetchedPayload;
pub use interfaces::ProcessRegistry;
pub use interfaces::ReferenceFetcher;
pub use interfaces::RegistryError;
pub use runtime::AllowedValuesPolicy;
pub use runtime::DefaultResponseForm;
pub use runtime::EngineOptions;
pub use runtime::ExecuteDocument;
pub use runtime::ExecuteEngine;
pub use runtime::FormatMatch;
pub use runtime::FormatMismatch;
pub use runtime::InMemoryProcessRegistry;
pub use runtime::InputResolver;
pub use runtime::KvpParams;
pub use runtime::OutputResolver;
pub use runtime::RawInput;
pub use runtime::RawInputValue;
pub use runtime::RawOutput;
pub use runtime::RawReference;
pub use runtime::RawResponseDocument;
pub use runtime::RequestLimits;
pub use runtime::negotiate;
pub use runtime::validate_cardinality;
