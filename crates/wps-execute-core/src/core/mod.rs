// crates/wps-execute-core/src/core/mod.rs
// ============================================================================
// Module: Execute Core Types
// Description: Process descriptors, compact tokens, requests, and errors.
// Purpose: Provide stable, serializable types shared by both request encodings.
// Dependencies: serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! Core types describe what a process accepts ([`ProcessDescriptor`]), what a
//! client asked for ([`ExecuteRequest`]), and why a request was rejected
//! ([`ExecuteError`]). They carry no I/O and no runtime state.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod error;
pub mod format;
pub mod identifiers;
pub mod parameter;
pub mod process;
pub mod request;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::ErrorCategory;
pub use error::ExecuteError;
pub use error::OwsCode;
pub use format::FormatField;
pub use format::FormatSet;
pub use format::FormatSpec;
pub use identifiers::Identifier;
pub use identifiers::LanguageString;
pub use parameter::AttributedParameter;
pub use parameter::ParameterError;
pub use process::AllowedValue;
pub use process::BoundingBoxDefinition;
pub use process::ComplexDefinition;
pub use process::DescriptorError;
pub use process::InputDefinition;
pub use process::InputKind;
pub use process::LiteralDefinition;
pub use process::MaxOccurs;
pub use process::OutputDefinition;
pub use process::OutputKind;
pub use process::ParameterKind;
pub use process::ProcessDescriptor;
pub use request::ExecuteRequest;
pub use request::HttpMethod;
pub use request::InputReference;
pub use request::InputValue;
pub use request::PROTOCOL_VERSION;
pub use request::RawDataOutput;
pub use request::ReferenceBody;
pub use request::ReferenceHeader;
pub use request::ReferencedComplexInput;
pub use request::RequestedOutput;
pub use request::ResolvedInput;
pub use request::ResponseDocument;
pub use request::ResponseForm;
