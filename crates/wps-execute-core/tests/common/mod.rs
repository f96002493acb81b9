// crates/wps-execute-core/tests/common/mod.rs
// =============================================================================
// Module: Execute Test Fixtures
// Description: Shared process descriptors and engines for core tests.
// Purpose: Reduce duplication across integration tests for wps-execute-core.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use wps_execute_core::BoundingBoxDefinition;
use wps_execute_core::ComplexDefinition;
use wps_execute_core::EngineOptions;
use wps_execute_core::ExecuteEngine;
use wps_execute_core::FormatSet;
use wps_execute_core::FormatSpec;
use wps_execute_core::InMemoryProcessRegistry;
use wps_execute_core::InputDefinition;
use wps_execute_core::InputKind;
use wps_execute_core::LiteralDefinition;
use wps_execute_core::MaxOccurs;
use wps_execute_core::OutputDefinition;
use wps_execute_core::OutputKind;
use wps_execute_core::ProcessDescriptor;

/// Identifier of the main fixture process.
pub const PROCESS: &str = "TestProcess";
/// Identifier of the fixture process with required inputs.
pub const STRICT_PROCESS: &str = "StrictProcess";

/// Declared formats of the `doc` complex input.
pub fn doc_formats() -> FormatSet {
    FormatSet::new(FormatSpec::mime("text/xml").with_schema("A").with_encoding("UTF-8"))
        .with_other(FormatSpec::mime("text/xml").with_schema("B"))
        .with_other(FormatSpec::mime("application/json").with_encoding("UTF-8"))
}

/// Declared formats of the `XMLOutput` complex output.
pub fn output_formats() -> FormatSet {
    FormatSet::new(FormatSpec::mime("text/xml").with_schema("A"))
        .with_other(FormatSpec::mime("application/json"))
}

/// Literal definition of the `count` input.
pub fn count_definition() -> LiteralDefinition {
    LiteralDefinition {
        data_type: Some("integer".to_string()),
        default_uom: Some("seconds".to_string()),
        other_uoms: vec!["minutes".to_string()],
        allowed_values: Vec::new(),
    }
}

/// Process with optional literal, bounding box, and complex inputs.
pub fn test_process() -> ProcessDescriptor {
    ProcessDescriptor::new(PROCESS)
        .with_input(
            InputDefinition::new("count", InputKind::Literal(count_definition()))
                .with_occurs(0, MaxOccurs::Bounded(1)),
        )
        .with_input(
            InputDefinition::new(
                "bbox",
                InputKind::BoundingBox(BoundingBoxDefinition {
                    default_crs: "EPSG:4326".to_string(),
                    other_crs: vec!["EPSG:3857".to_string()],
                }),
            )
            .with_occurs(0, MaxOccurs::Bounded(1)),
        )
        .with_input(
            InputDefinition::new(
                "doc",
                InputKind::Complex(ComplexDefinition {
                    formats: doc_formats(),
                }),
            )
            .with_occurs(0, MaxOccurs::Unbounded),
        )
        .with_input(
            InputDefinition::new("label", InputKind::Literal(LiteralDefinition::default()))
                .with_occurs(0, MaxOccurs::Bounded(2)),
        )
        .with_output(OutputDefinition::new(
            "XMLOutput",
            OutputKind::Complex {
                formats: output_formats(),
            },
        ))
        .with_output(OutputDefinition::new(
            "LiteralOutput",
            OutputKind::Literal {
                data_type: Some("double".to_string()),
            },
        ))
}

/// Process whose inputs are mandatory, used for cardinality checks.
pub fn strict_process() -> ProcessDescriptor {
    ProcessDescriptor::new(STRICT_PROCESS)
        .with_input(InputDefinition::new("first", InputKind::Literal(LiteralDefinition::default())))
        .with_input(
            InputDefinition::new("second", InputKind::Literal(LiteralDefinition::default()))
                .with_occurs(2, MaxOccurs::Bounded(3)),
        )
        .with_output(OutputDefinition::new(
            "result",
            OutputKind::Literal {
                data_type: None,
            },
        ))
}

/// Registry holding both fixture processes.
pub fn registry() -> InMemoryProcessRegistry {
    InMemoryProcessRegistry::from_descriptors([test_process(), strict_process()])
        .expect("fixture registry")
}

/// Engine over the fixture registry with default options.
pub fn engine() -> ExecuteEngine<InMemoryProcessRegistry> {
    ExecuteEngine::new(registry())
}

/// Engine over the fixture registry with explicit options.
pub fn engine_with(options: EngineOptions) -> ExecuteEngine<InMemoryProcessRegistry> {
    ExecuteEngine::with_options(registry(), options)
}
