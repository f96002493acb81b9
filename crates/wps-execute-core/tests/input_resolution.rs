// crates/wps-execute-core/tests/input_resolution.rs
// ============================================================================
// Module: Input Resolution Tests
// Description: Tests for literal, bounding box, and complex input checks.
// Purpose: Ensure raw inputs are validated against their declarations.
// Dependencies: wps-execute-core, serde_json
// ============================================================================
//! ## Overview
//! Exercises `InputResolver` with raw inputs built by hand.

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

use serde_json::json;
use wps_execute_core::AllowedValue;
use wps_execute_core::AllowedValuesPolicy;
use wps_execute_core::EngineOptions;
use wps_execute_core::ExecuteError;
use wps_execute_core::FormatField;
use wps_execute_core::FormatSpec;
use wps_execute_core::HttpMethod;
use wps_execute_core::Identifier;
use wps_execute_core::InputDefinition;
use wps_execute_core::InputKind;
use wps_execute_core::InputResolver;
use wps_execute_core::InputValue;
use wps_execute_core::LiteralDefinition;
use wps_execute_core::ParameterKind;
use wps_execute_core::ProcessDescriptor;
use wps_execute_core::RawInput;
use wps_execute_core::RawInputValue;
use wps_execute_core::RawReference;
use wps_execute_core::ReferenceBody;
use wps_execute_core::ResolvedInput;

use crate::common::test_process;

/// Resolves one raw input against the fixture process with default options.
fn resolve(identifier: &str, value: RawInputValue) -> Result<ResolvedInput, ExecuteError> {
    let process = test_process();
    let options = EngineOptions::default();
    InputResolver::new(&process, &options).resolve(RawInput::new(Identifier::new(identifier), value))
}

/// Builds a raw literal value.
fn literal(value: &str, data_type: Option<&str>, uom: Option<&str>) -> RawInputValue {
    RawInputValue::Literal {
        value: value.to_string(),
        data_type: data_type.map(str::to_string),
        uom: uom.map(str::to_string),
    }
}

/// Builds raw bounding box coordinates.
fn bbox(coordinates: &[&str], crs: Option<&str>) -> RawInputValue {
    RawInputValue::BoundingBox {
        coordinates: coordinates.iter().map(ToString::to_string).collect(),
        crs: crs.map(str::to_string),
    }
}

// ============================================================================
// SECTION: Literal Inputs
// ============================================================================

/// Verifies a declared unit and matching data type are accepted.
#[test]
fn literal_with_declared_uom_resolves() {
    let input = resolve("count", literal("5", Some("integer"), Some("minutes"))).unwrap();
    assert_eq!(
        input.value,
        InputValue::Literal {
            value: "5".to_string(),
            uom: Some("minutes".to_string()),
        }
    );
    assert_eq!(input.kind(), ParameterKind::Literal);
}

/// Verifies the default unit is applied when none is requested.
#[test]
fn literal_without_uom_gets_default() {
    let input = resolve("count", literal("5", None, None)).unwrap();
    assert!(matches!(
        input.value,
        InputValue::Literal {
            uom: Some(ref uom),
            ..
        } if uom == "seconds"
    ));
}

/// Verifies an undeclared unit is rejected.
#[test]
fn literal_with_unknown_uom_fails() {
    let err = resolve("count", literal("5", None, Some("hours"))).unwrap_err();
    assert_eq!(
        err,
        ExecuteError::InvalidUom {
            identifier: Identifier::new("count"),
            uom: "hours".to_string(),
        }
    );
}

/// Verifies a unit on an input with no declared units is rejected.
#[test]
fn literal_uom_without_declared_units_fails() {
    let err = resolve("label", literal("abc", None, Some("m"))).unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::InvalidUom {
            ..
        }
    ));
}

/// Verifies a conflicting data type is rejected.
#[test]
fn literal_with_conflicting_data_type_fails() {
    let err = resolve("count", literal("5", Some("double"), None)).unwrap_err();
    assert_eq!(
        err,
        ExecuteError::DatatypeMismatch {
            identifier: Identifier::new("count"),
            requested: "double".to_string(),
            declared: "integer".to_string(),
        }
    );
}

/// Verifies any data type is accepted when none is declared.
#[test]
fn literal_data_type_unchecked_without_declaration() {
    resolve("label", literal("abc", Some("string"), None)).unwrap();
}

/// Process with an allowed values list.
fn restricted_process() -> ProcessDescriptor {
    ProcessDescriptor::new("Restricted").with_input(InputDefinition::new(
        "level",
        InputKind::Literal(LiteralDefinition {
            allowed_values: vec![
                AllowedValue::Value("low".to_string()),
                AllowedValue::Range {
                    minimum: Some(1.0),
                    maximum: Some(5.0),
                },
            ],
            ..LiteralDefinition::default()
        }),
    ))
}

/// Verifies allowed values are advisory by default.
#[test]
fn allowed_values_are_advisory_by_default() {
    let process = restricted_process();
    let options = EngineOptions::default();
    let input = InputResolver::new(&process, &options)
        .resolve(RawInput::new(Identifier::new("level"), literal("extreme", None, None)))
        .unwrap();
    assert!(matches!(
        input.value,
        InputValue::Literal {
            ref value,
            ..
        } if value == "extreme"
    ));
}

/// Verifies the enforce policy rejects values outside the allowed set.
#[test]
fn allowed_values_enforced_when_configured() {
    let process = restricted_process();
    let options = EngineOptions {
        allowed_values: AllowedValuesPolicy::Enforce,
        ..EngineOptions::default()
    };
    let resolver = InputResolver::new(&process, &options);
    resolver.resolve(RawInput::new(Identifier::new("level"), literal("low", None, None))).unwrap();
    resolver.resolve(RawInput::new(Identifier::new("level"), literal("3", None, None))).unwrap();
    let err = resolver
        .resolve(RawInput::new(Identifier::new("level"), literal("extreme", None, None)))
        .unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::DisallowedValue {
            ..
        }
    ));
}

// ============================================================================
// SECTION: Bounding Box Inputs
// ============================================================================

/// Verifies four coordinates resolve with the default CRS.
#[test]
fn bounding_box_defaults_crs() {
    let input = resolve("bbox", bbox(&["0", "-10.5", "90", " 180 "], None)).unwrap();
    assert_eq!(
        input.value,
        InputValue::BoundingBox {
            bounds: [0.0, -10.5, 90.0, 180.0],
            crs: "EPSG:4326".to_string(),
        }
    );
}

/// Verifies a declared non-default CRS is accepted.
#[test]
fn bounding_box_accepts_other_crs() {
    let input = resolve("bbox", bbox(&["0", "0", "1", "1"], Some("EPSG:3857"))).unwrap();
    assert!(matches!(
        input.value,
        InputValue::BoundingBox {
            ref crs,
            ..
        } if crs == "EPSG:3857"
    ));
}

/// Verifies an undeclared CRS is rejected.
#[test]
fn bounding_box_rejects_unknown_crs() {
    let err = resolve("bbox", bbox(&["0", "0", "1", "1"], Some("EPSG:27700"))).unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::InvalidCrs {
            ref crs,
            ..
        } if crs == "EPSG:27700"
    ));
}

/// Verifies fewer than four coordinates are rejected.
#[test]
fn bounding_box_rejects_short_coordinates() {
    let err = resolve("bbox", bbox(&["0", "0", "1"], None)).unwrap_err();
    assert_eq!(
        err,
        ExecuteError::InvalidCoordinates {
            identifier: Identifier::new("bbox"),
            coordinates: "0,0,1".to_string(),
        }
    );
}

/// Verifies non-numeric coordinates are rejected.
#[test]
fn bounding_box_rejects_non_numeric_coordinates() {
    let err = resolve("bbox", bbox(&["0", "north", "1", "1"], None)).unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::InvalidCoordinates {
            ..
        }
    ));
}

/// Verifies extra coordinates are ignored and the box is treated as 2D.
#[test]
fn bounding_box_ignores_extra_dimensions() {
    let input = resolve("bbox", bbox(&["0", "0", "1", "1", "5", "6"], None)).unwrap();
    assert!(matches!(
        input.value,
        InputValue::BoundingBox {
            bounds: [0.0, 0.0, 1.0, 1.0],
            ..
        }
    ));
}

// ============================================================================
// SECTION: Complex Inputs
// ============================================================================

/// Verifies embedded complex data is negotiated and kept verbatim.
#[test]
fn embedded_complex_negotiates_format() {
    let payload = json!({"features": []});
    let input = resolve(
        "doc",
        RawInputValue::EmbeddedComplex {
            format: FormatSpec::mime("application/json"),
            payload: payload.clone(),
        },
    )
    .unwrap();
    assert_eq!(
        input.value,
        InputValue::EmbeddedComplex {
            format: FormatSpec::mime("application/json").with_encoding("UTF-8"),
            payload,
        }
    );
}

/// Verifies a GET reference resolves to the negotiated format.
#[test]
fn get_reference_resolves() {
    let mut reference = RawReference::get("http://data.example/doc.xml");
    reference.format = FormatSpec::mime("text/xml").with_schema("B");
    let input = resolve("doc", RawInputValue::Reference(reference)).unwrap();
    let InputValue::ReferencedComplex(resolved) = input.value else {
        panic!("expected referenced complex input");
    };
    assert_eq!(resolved.format, FormatSpec::mime("text/xml").with_schema("B"));
    assert_eq!(resolved.reference.href.as_str(), "http://data.example/doc.xml");
    assert_eq!(resolved.reference.method, HttpMethod::Get);
    assert_eq!(resolved.reference.body, None);
}

/// Verifies a reference body is ignored for GET.
#[test]
fn get_reference_ignores_body() {
    let mut reference = RawReference::get("http://data.example/doc.xml");
    reference.body = Some(json!("ignored"));
    let input = resolve("doc", RawInputValue::Reference(reference)).unwrap();
    let InputValue::ReferencedComplex(resolved) = input.value else {
        panic!("expected referenced complex input");
    };
    assert_eq!(resolved.reference.body, None);
}

/// Verifies a POST reference carries its inline body.
#[test]
fn post_reference_with_body_resolves() {
    let mut reference = RawReference::get("http://data.example/wfs");
    reference.method = HttpMethod::Post;
    reference.body = Some(json!("<GetFeature/>"));
    let input = resolve("doc", RawInputValue::Reference(reference)).unwrap();
    let InputValue::ReferencedComplex(resolved) = input.value else {
        panic!("expected referenced complex input");
    };
    assert_eq!(resolved.reference.body, Some(ReferenceBody::Inline(json!("<GetFeature/>"))));
}

/// Verifies a POST reference without any body fails.
#[test]
fn post_reference_without_body_fails() {
    let mut reference = RawReference::get("http://data.example/wfs");
    reference.method = HttpMethod::Post;
    let err = resolve("doc", RawInputValue::Reference(reference)).unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::ReferenceBody {
            ..
        }
    ));
}

/// Verifies a POST reference with both body kinds fails.
#[test]
fn post_reference_with_both_bodies_fails() {
    let mut reference = RawReference::get("http://data.example/wfs");
    reference.method = HttpMethod::Post;
    reference.body = Some(json!("<GetFeature/>"));
    reference.body_reference = Some("http://data.example/body.xml".to_string());
    let err = resolve("doc", RawInputValue::Reference(reference)).unwrap_err();
    assert_eq!(
        err,
        ExecuteError::MutuallyExclusive {
            first: "Body".to_string(),
            second: "BodyReference".to_string(),
            identifier: Some(Identifier::new("doc")),
        }
    );
}

/// Verifies a malformed reference URL fails.
#[test]
fn reference_with_invalid_url_fails() {
    let err =
        resolve("doc", RawInputValue::Reference(RawReference::get("not a url"))).unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::InvalidUrl {
            ref attribute,
            ..
        } if attribute == "href"
    ));
}

/// Verifies a reference without `href` fails.
#[test]
fn reference_without_href_fails() {
    let err = resolve("doc", RawInputValue::Reference(RawReference::default())).unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::MissingReference {
            ..
        }
    ));
}

/// Verifies an undeclared format on a reference fails.
#[test]
fn reference_with_undeclared_format_fails() {
    let mut reference = RawReference::get("http://data.example/doc.xml");
    reference.format = FormatSpec::mime("text/xml").with_schema("C");
    let err = resolve("doc", RawInputValue::Reference(reference)).unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::NoMatchingFormat {
            field: FormatField::Schema,
            ..
        }
    ));
}

// ============================================================================
// SECTION: Kinds
// ============================================================================

/// Verifies references to literal inputs are rejected.
#[test]
fn reference_to_literal_input_fails() {
    let err = resolve("count", RawInputValue::Reference(RawReference::get("http://a/")))
        .unwrap_err();
    assert_eq!(
        err,
        ExecuteError::ReferenceNotSupported {
            identifier: Identifier::new("count"),
            kind: ParameterKind::Literal,
        }
    );
}

/// Verifies inline data of the wrong kind is rejected.
#[test]
fn wrong_data_kind_fails() {
    let err = resolve("bbox", literal("1", None, None)).unwrap_err();
    assert_eq!(
        err,
        ExecuteError::InputKindMismatch {
            identifier: Identifier::new("bbox"),
            expected: ParameterKind::BoundingBox,
            found: ParameterKind::Literal,
        }
    );
}

/// Verifies unknown input identifiers are rejected.
#[test]
fn unknown_input_fails() {
    let err = resolve("missing", literal("1", None, None)).unwrap_err();
    assert_eq!(err.locator(), "missing");
    assert!(matches!(
        err,
        ExecuteError::UnknownInput {
            ..
        }
    ));
}
