// crates/wps-execute-core/tests/kvp_requests.rs
// ============================================================================
// Module: Compact Request Tests
// Description: End-to-end tests for key/value execute requests.
// Purpose: Ensure compact parameters decode and validate like documents.
// Dependencies: wps-execute-core
// ============================================================================
//! ## Overview
//! Exercises `ExecuteEngine::parse_kvp` with fixture processes.

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

mod common;

use wps_execute_core::DefaultResponseForm;
use wps_execute_core::EngineOptions;
use wps_execute_core::ExecuteError;
use wps_execute_core::ExecuteRequest;
use wps_execute_core::FormatField;
use wps_execute_core::FormatSpec;
use wps_execute_core::Identifier;
use wps_execute_core::InputValue;
use wps_execute_core::KvpParams;
use wps_execute_core::OwsCode;
use wps_execute_core::RequestLimits;
use wps_execute_core::ResponseForm;

use crate::common::PROCESS;
use crate::common::engine;
use crate::common::engine_with;

/// Parses compact parameters for the main process.
fn parse(pairs: &[(&str, &str)]) -> Result<ExecuteRequest, ExecuteError> {
    let params: KvpParams =
        [("IDENTIFIER", PROCESS)].into_iter().chain(pairs.iter().copied()).collect();
    engine().parse_kvp(&params)
}

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Verifies parameter names are case-insensitive.
#[test]
fn parameter_names_ignore_case() {
    let params = KvpParams::parse_query("?service=WPS&Identifier=TestProcess&dataInputs=count%3D5");
    assert_eq!(params.get("IDENTIFIER"), Some("TestProcess"));
    assert_eq!(params.get("datainputs"), Some("count=5"));
    assert!(params.contains("Service"));
    assert_eq!(params.len(), 3);
}

/// Verifies a missing identifier is reported.
#[test]
fn missing_identifier_fails() {
    let err = engine().parse_kvp(&KvpParams::new()).unwrap_err();
    assert_eq!(
        err,
        ExecuteError::MissingParameter {
            parameter: "IDENTIFIER".to_string(),
        }
    );
    assert_eq!(err.ows_code(), OwsCode::MissingParameterValue);
}

/// Verifies an unknown process is reported.
#[test]
fn unknown_process_fails() {
    let params: KvpParams = [("IDENTIFIER", "Nope")].into_iter().collect();
    let err = engine().parse_kvp(&params).unwrap_err();
    assert_eq!(err.locator(), "ows:Identifier");
}

// ============================================================================
// SECTION: Data Inputs
// ============================================================================

/// Verifies a literal token with unit and data type resolves.
#[test]
fn literal_token_resolves() {
    let request = parse(&[("DATAINPUTS", "count=5@uom=minutes@datatype=integer")]).unwrap();
    assert_eq!(
        request.inputs()[0].value,
        InputValue::Literal {
            value: "5".to_string(),
            uom: Some("minutes".to_string()),
        }
    );
}

/// Verifies an undeclared unit in a token is rejected.
#[test]
fn literal_token_with_unknown_uom_fails() {
    let err = parse(&[("DATAINPUTS", "count=5@uom=hours")]).unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::InvalidUom {
            ref uom,
            ..
        } if uom == "hours"
    ));
}

/// Verifies a literal token without value resolves to empty text.
#[test]
fn literal_token_without_value_is_empty() {
    let request = parse(&[("DATAINPUTS", "label")]).unwrap();
    assert!(matches!(
        request.inputs()[0].value,
        InputValue::Literal {
            ref value,
            uom: None,
        } if value.is_empty()
    ));
}

/// Verifies bounding box tokens carry coordinates and an optional CRS.
#[test]
fn bounding_box_token_resolves() {
    let request = parse(&[("DATAINPUTS", "bbox=0,0,90,180,EPSG:3857")]).unwrap();
    assert_eq!(
        request.inputs()[0].value,
        InputValue::BoundingBox {
            bounds: [0.0, 0.0, 90.0, 180.0],
            crs: "EPSG:3857".to_string(),
        }
    );
    let request = parse(&[("DATAINPUTS", "bbox=0,0,90,180")]).unwrap();
    assert!(matches!(
        request.inputs()[0].value,
        InputValue::BoundingBox {
            ref crs,
            ..
        } if crs == "EPSG:4326"
    ));
}

/// Verifies parts beyond the CRS are rejected rather than dropped.
#[test]
fn bounding_box_token_with_trailing_parts_fails() {
    let err = parse(&[("DATAINPUTS", "bbox=0,0,1,1,EPSG:4326,junk")]).unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::InvalidCoordinates {
            ref identifier,
            ref coordinates,
        } if *identifier == Identifier::new("bbox") && coordinates == "0,0,1,1,EPSG:4326,junk"
    ));
    assert_eq!(err.ows_code(), OwsCode::InvalidParameterValue);
}

/// Verifies a complex token resolves as a GET reference.
#[test]
fn complex_token_resolves_as_reference() {
    let request = parse(&[(
        "DATAINPUTS",
        "doc=@mimetype=text/xml@schema=B@xlink:href=http://data.example/doc.xml",
    )])
    .unwrap();
    let InputValue::ReferencedComplex(resolved) = &request.inputs()[0].value else {
        panic!("expected reference");
    };
    assert_eq!(resolved.format, FormatSpec::mime("text/xml").with_schema("B"));
    assert_eq!(resolved.reference.href.as_str(), "http://data.example/doc.xml");
}

/// Verifies a complex token without href is rejected.
#[test]
fn complex_token_without_href_fails() {
    let err = parse(&[("DATAINPUTS", "doc=@mimetype=text/xml")]).unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::MissingReference {
            ..
        }
    ));
}

/// Verifies a complex token with an undeclared format is rejected.
#[test]
fn complex_token_with_unknown_format_fails() {
    let err =
        parse(&[("DATAINPUTS", "doc@mimetype=image/png@href=http://data.example/a.png")])
            .unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::NoMatchingFormat {
            field: FormatField::MimeType,
            ..
        }
    ));
}

/// Verifies inputs keep request order and trailing separators are ignored.
#[test]
fn inputs_keep_request_order() {
    let request = parse(&[("DATAINPUTS", "label=b;count=1;label=a;")]).unwrap();
    let identifiers: Vec<&str> =
        request.inputs().iter().map(|input| input.identifier.code()).collect();
    assert_eq!(identifiers, vec!["label", "count", "label"]);
}

/// Verifies a token without identifier is malformed.
#[test]
fn token_without_identifier_fails() {
    let err = parse(&[("DATAINPUTS", "count=1;;label=a")]).unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::MalformedParameter {
            ref parameter,
            ..
        } if parameter == "DataInputs"
    ));
}

/// Verifies unknown inputs are rejected.
#[test]
fn unknown_input_token_fails() {
    let err = parse(&[("DATAINPUTS", "ghost=1")]).unwrap_err();
    assert_eq!(
        err,
        ExecuteError::UnknownInput {
            identifier: Identifier::new("ghost"),
        }
    );
}

/// Verifies the data input limit is enforced.
#[test]
fn data_input_limit_enforced() {
    let options = EngineOptions {
        limits: RequestLimits {
            max_data_inputs: 1,
            ..RequestLimits::default()
        },
        ..EngineOptions::default()
    };
    let params: KvpParams =
        [("IDENTIFIER", PROCESS), ("DATAINPUTS", "label=a;label=b")].into_iter().collect();
    let err = engine_with(options).parse_kvp(&params).unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::LimitExceeded {
            limit: "data inputs",
            max: 1,
            actual: 2,
        }
    ));
}

/// Verifies the token size limit is enforced.
#[test]
fn token_size_limit_enforced() {
    let options = EngineOptions {
        limits: RequestLimits {
            max_token_bytes: 8,
            ..RequestLimits::default()
        },
        ..EngineOptions::default()
    };
    let params: KvpParams =
        [("IDENTIFIER", PROCESS), ("DATAINPUTS", "label=abcdefghij")].into_iter().collect();
    let err = engine_with(options).parse_kvp(&params).unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::LimitExceeded {
            limit: "token bytes",
            ..
        }
    ));
}

// ============================================================================
// SECTION: Response Forms
// ============================================================================

/// Verifies response document tokens and flags resolve.
#[test]
fn response_document_resolves() {
    let request = parse(&[
        ("RESPONSEDOCUMENT", "XMLOutput@mimetype=application/json@asReference=TRUE;LiteralOutput"),
        ("STATUS", "true"),
        ("LINEAGE", "False"),
    ])
    .unwrap();
    let Some(ResponseForm::Document(document)) = request.response_form() else {
        panic!("expected response document");
    };
    assert!(document.status);
    assert!(!document.lineage);
    assert!(!document.store_execute_response);
    assert_eq!(document.outputs.len(), 2);
    assert!(document.outputs[0].as_reference);
    assert_eq!(document.outputs[0].format, FormatSpec::mime("application/json"));
    assert!(!document.outputs[1].as_reference);
}

/// Verifies raw data output resolves and never delivers by reference.
#[test]
fn raw_data_output_resolves() {
    let request = parse(&[("RAWDATAOUTPUT", "XMLOutput@asReference=true")]).unwrap();
    let Some(ResponseForm::RawData(raw)) = request.response_form() else {
        panic!("expected raw data output");
    };
    assert_eq!(raw.output().identifier, Identifier::new("XMLOutput"));
    assert!(!raw.output().as_reference);
    assert_eq!(raw.output().format, FormatSpec::mime("text/xml").with_schema("A"));
}

/// Verifies both response forms together are rejected.
#[test]
fn both_response_forms_fail() {
    let err = parse(&[("RESPONSEDOCUMENT", "XMLOutput"), ("RAWDATAOUTPUT", "XMLOutput")])
        .unwrap_err();
    assert_eq!(
        err,
        ExecuteError::MutuallyExclusive {
            first: "ResponseDocument".to_string(),
            second: "RawDataOutput".to_string(),
            identifier: None,
        }
    );
}

/// Verifies invalid flag values are rejected.
#[test]
fn invalid_flag_fails() {
    let err = parse(&[("RESPONSEDOCUMENT", "XMLOutput"), ("STOREEXECUTERESPONSE", "yes")])
        .unwrap_err();
    assert_eq!(
        err,
        ExecuteError::InvalidParameterValue {
            parameter: "STOREEXECUTERESPONSE".to_string(),
            value: "yes".to_string(),
        }
    );
}

/// Verifies flags without output tokens build a document with implicit outputs.
#[test]
fn flags_without_outputs_use_default_policy() {
    let request = parse(&[("STATUS", "true")]).unwrap();
    let Some(ResponseForm::Document(document)) = request.response_form() else {
        panic!("expected response document");
    };
    assert!(document.status);
    assert!(document.outputs.is_empty());
}

/// Verifies the all-outputs policy lists every declared output.
#[test]
fn all_outputs_policy_fills_default_form() {
    let options = EngineOptions {
        default_response_form: DefaultResponseForm::AllOutputs,
        ..EngineOptions::default()
    };
    let params: KvpParams = [("IDENTIFIER", PROCESS)].into_iter().collect();
    let request = engine_with(options).parse_kvp(&params).unwrap();
    let Some(ResponseForm::Document(document)) = request.response_form() else {
        panic!("expected response document");
    };
    let identifiers: Vec<&str> =
        document.outputs.iter().map(|output| output.identifier.code()).collect();
    assert_eq!(identifiers, vec!["XMLOutput", "LiteralOutput"]);
    assert_eq!(document.outputs[0].format, FormatSpec::mime("text/xml").with_schema("A"));
}

/// Verifies the language parameter is carried through.
#[test]
fn language_is_carried() {
    let request = parse(&[("LANGUAGE", "de-DE")]).unwrap();
    assert_eq!(request.language(), Some("de-DE"));
    assert!(request.response_form().is_none());
}
