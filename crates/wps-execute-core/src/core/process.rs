// crates/wps-execute-core/src/core/process.rs
// ============================================================================
// Module: Process Descriptors
// Description: Declared parameter contracts of executable processes.
// Purpose: Describe inputs and outputs so requests can be validated against them.
// Dependencies: crate::core::{format, identifiers}, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`ProcessDescriptor`] is the read-only contract of one process: its
//! identifier plus ordered input and output definitions. Descriptors are
//! loaded by a registry and validated once at load time; the request engine
//! only reads them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::format::FormatSet;
use crate::core::identifiers::Identifier;
use crate::core::identifiers::LanguageString;

// ============================================================================
// SECTION: Process Descriptor
// ============================================================================

/// Declared contract for one process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    /// Process identifier.
    pub identifier: Identifier,
    /// Optional process title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<LanguageString>,
    /// Declared inputs in declaration order.
    #[serde(default)]
    pub inputs: Vec<InputDefinition>,
    /// Declared outputs in declaration order.
    #[serde(default)]
    pub outputs: Vec<OutputDefinition>,
}

impl ProcessDescriptor {
    /// Creates a descriptor without inputs or outputs.
    #[must_use]
    pub fn new(identifier: impl Into<Identifier>) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Returns this descriptor with an additional input definition.
    #[must_use]
    pub fn with_input(mut self, input: InputDefinition) -> Self {
        self.inputs.push(input);
        self
    }

    /// Returns this descriptor with an additional output definition.
    #[must_use]
    pub fn with_output(mut self, output: OutputDefinition) -> Self {
        self.outputs.push(output);
        self
    }

    /// Looks up a declared input by identifier.
    #[must_use]
    pub fn input(&self, identifier: &Identifier) -> Option<&InputDefinition> {
        self.inputs.iter().find(|input| &input.identifier == identifier)
    }

    /// Looks up a declared output by identifier.
    #[must_use]
    pub fn output(&self, identifier: &Identifier) -> Option<&OutputDefinition> {
        self.outputs.iter().find(|output| &output.identifier == identifier)
    }

    /// Validates descriptor invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError`] when the descriptor is inconsistent.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.identifier.code.trim().is_empty() {
            return Err(DescriptorError::EmptyIdentifier);
        }
        ensure_unique_inputs(self)?;
        ensure_unique_outputs(self)?;
        for input in &self.inputs {
            if input.identifier.code.trim().is_empty() {
                return Err(DescriptorError::EmptyParameterIdentifier(self.identifier.to_string()));
            }
            if let MaxOccurs::Bounded(max) = input.max_occurs
                && max < input.min_occurs
            {
                return Err(DescriptorError::InvalidOccurs {
                    identifier: input.identifier.to_string(),
                    min_occurs: input.min_occurs,
                    max_occurs: max,
                });
            }
            if let InputKind::BoundingBox(bbox) = &input.kind
                && bbox.default_crs.trim().is_empty()
            {
                return Err(DescriptorError::MissingDefaultCrs(input.identifier.to_string()));
            }
        }
        for output in &self.outputs {
            if output.identifier.code.trim().is_empty() {
                return Err(DescriptorError::EmptyParameterIdentifier(self.identifier.to_string()));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Occurrence Bounds
// ============================================================================

/// Upper occurrence bound of a declared input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxOccurs {
    /// At most this many occurrences.
    Bounded(u32),
    /// Any number of occurrences.
    Unbounded,
}

impl MaxOccurs {
    /// Returns true when `count` does not exceed this bound.
    #[must_use]
    pub const fn admits(self, count: u32) -> bool {
        match self {
            Self::Bounded(max) => count <= max,
            Self::Unbounded => true,
        }
    }
}

impl Default for MaxOccurs {
    fn default() -> Self {
        Self::Bounded(1)
    }
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => max.fmt(f),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Serde default for `min_occurs`.
const fn default_min_occurs() -> u32 {
    1
}

// ============================================================================
// SECTION: Input Definitions
// ============================================================================

/// Declared input parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDefinition {
    /// Input identifier.
    pub identifier: Identifier,
    /// Optional input title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<LanguageString>,
    /// Minimum number of occurrences.
    #[serde(default = "default_min_occurs")]
    pub min_occurs: u32,
    /// Maximum number of occurrences.
    #[serde(default)]
    pub max_occurs: MaxOccurs,
    /// Kind-specific declaration.
    pub kind: InputKind,
}

impl InputDefinition {
    /// Creates a required, single-occurrence input.
    #[must_use]
    pub fn new(identifier: impl Into<Identifier>, kind: InputKind) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            min_occurs: 1,
            max_occurs: MaxOccurs::Bounded(1),
            kind,
        }
    }

    /// Returns this definition with explicit occurrence bounds.
    #[must_use]
    pub const fn with_occurs(mut self, min_occurs: u32, max_occurs: MaxOccurs) -> Self {
        self.min_occurs = min_occurs;
        self.max_occurs = max_occurs;
        self
    }
}

/// Kind-specific part of an input definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputKind {
    /// Scalar literal value.
    Literal(LiteralDefinition),
    /// Bounding box with a coordinate reference system.
    BoundingBox(BoundingBoxDefinition),
    /// Complex (structured or binary) data.
    Complex(ComplexDefinition),
}

impl InputKind {
    /// Returns the kind name used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> ParameterKind {
        match self {
            Self::Literal(_) => ParameterKind::Literal,
            Self::BoundingBox(_) => ParameterKind::BoundingBox,
            Self::Complex(_) => ParameterKind::Complex,
        }
    }
}

/// Parameter kind label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Literal data.
    Literal,
    /// Bounding box data.
    BoundingBox,
    /// Complex data.
    Complex,
}

impl ParameterKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Literal => "LiteralData",
            Self::BoundingBox => "BoundingBoxData",
            Self::Complex => "ComplexData",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal input declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiteralDefinition {
    /// Declared data type name (for example `integer`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Default unit of measure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_uom: Option<String>,
    /// Other accepted units of measure.
    #[serde(default)]
    pub other_uoms: Vec<String>,
    /// Allowed value constraints; empty means any value.
    #[serde(default)]
    pub allowed_values: Vec<AllowedValue>,
}

impl LiteralDefinition {
    /// Returns true when the unit is the default or an alternate unit.
    ///
    /// A definition without a default unit accepts no explicit unit.
    #[must_use]
    pub fn supports_uom(&self, uom: &str) -> bool {
        match &self.default_uom {
            Some(default) => default == uom || self.other_uoms.iter().any(|other| other == uom),
            None => false,
        }
    }
}

/// Allowed value constraint on a literal input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowedValue {
    /// Exact value.
    Value(String),
    /// Inclusive numeric range; an absent bound is open.
    Range {
        /// Lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        /// Upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
}

impl AllowedValue {
    /// Returns true when the literal text satisfies this constraint.
    #[must_use]
    pub fn admits(&self, value: &str) -> bool {
        match self {
            Self::Value(allowed) => allowed == value,
            Self::Range {
                minimum,
                maximum,
            } => {
                let Ok(number) = value.trim().parse::<f64>() else {
                    return false;
                };
                minimum.is_none_or(|min| number >= min) && maximum.is_none_or(|max| number <= max)
            }
        }
    }
}

/// Bounding box input declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBoxDefinition {
    /// Default CRS identifier.
    pub default_crs: String,
    /// Other accepted CRS identifiers.
    #[serde(default)]
    pub other_crs: Vec<String>,
}

impl BoundingBoxDefinition {
    /// Returns true when the CRS is the default or an alternate CRS.
    #[must_use]
    pub fn supports_crs(&self, crs: &str) -> bool {
        self.default_crs == crs || self.other_crs.iter().any(|other| other == crs)
    }
}

/// Complex input declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexDefinition {
    /// Declared formats.
    pub formats: FormatSet,
}

// ============================================================================
// SECTION: Output Definitions
// ============================================================================

/// Declared output parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDefinition {
    /// Output identifier.
    pub identifier: Identifier,
    /// Optional output title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<LanguageString>,
    /// Kind-specific declaration.
    pub kind: OutputKind,
}

impl OutputDefinition {
    /// Creates an output definition.
    #[must_use]
    pub fn new(identifier: impl Into<Identifier>, kind: OutputKind) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            kind,
        }
    }

    /// Returns the declared formats for complex outputs.
    #[must_use]
    pub const fn formats(&self) -> Option<&FormatSet> {
        match &self.kind {
            OutputKind::Complex {
                formats,
            } => Some(formats),
            OutputKind::Literal {
                ..
            }
            | OutputKind::BoundingBox {
                ..
            } => None,
        }
    }
}

/// Kind-specific part of an output definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputKind {
    /// Literal output.
    Literal {
        /// Declared data type name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data_type: Option<String>,
    },
    /// Bounding box output.
    BoundingBox {
        /// Default CRS identifier.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_crs: Option<String>,
    },
    /// Complex output.
    Complex {
        /// Declared formats.
        formats: FormatSet,
    },
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Process descriptor validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// Process identifier is empty.
    #[error("process identifier must be non-empty")]
    EmptyIdentifier,
    /// A parameter identifier is empty.
    #[error("process {0} declares a parameter with an empty identifier")]
    EmptyParameterIdentifier(String),
    /// Duplicate input identifiers detected.
    #[error("duplicate input identifier: {0}")]
    DuplicateInput(String),
    /// Duplicate output identifiers detected.
    #[error("duplicate output identifier: {0}")]
    DuplicateOutput(String),
    /// `max_occurs` is lower than `min_occurs`.
    #[error("input {identifier} declares max_occurs {max_occurs} below min_occurs {min_occurs}")]
    InvalidOccurs {
        /// Input identifier.
        identifier: String,
        /// Declared minimum.
        min_occurs: u32,
        /// Declared maximum.
        max_occurs: u32,
    },
    /// Bounding box input declares no default CRS.
    #[error("bounding box input {0} must declare a default crs")]
    MissingDefaultCrs(String),
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Ensures input identifiers are unique within the descriptor.
fn ensure_unique_inputs(process: &ProcessDescriptor) -> Result<(), DescriptorError> {
    for (index, input) in process.inputs.iter().enumerate() {
        if process.inputs.iter().skip(index + 1).any(|other| other.identifier == input.identifier) {
            return Err(DescriptorError::DuplicateInput(input.identifier.to_string()));
        }
    }
    Ok(())
}

/// Ensures output identifiers are unique within the descriptor.
fn ensure_unique_outputs(process: &ProcessDescriptor) -> Result<(), DescriptorError> {
    for (index, output) in process.outputs.iter().enumerate() {
        if process.outputs.iter().skip(index + 1).any(|other| other.identifier == output.identifier)
        {
            return Err(DescriptorError::DuplicateOutput(output.identifier.to_string()));
        }
    }
    Ok(())
}
