// crates/wps-execute-fetch/src/lib.rs
// ============================================================================
// Module: WPS Execute Fetch Library
// Description: HTTP dereferencing of inputs supplied by reference.
// Purpose: Provide the blocking reference fetcher used by execution engines.
// Dependencies: crate::http
// ============================================================================

//! ## Overview
//! [`HttpReferenceFetcher`] implements [`wps_execute_core::ReferenceFetcher`]
//! over a blocking `reqwest` client. It sends the method, headers, and body a
//! validated request describes and returns the raw payload bytes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use http::FetchSettings;
pub use http::HttpReferenceFetcher;
