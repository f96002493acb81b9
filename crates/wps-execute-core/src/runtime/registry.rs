// crates/wps-execute-core/src/runtime/registry.rs
// ============================================================================
// Module: In-Memory Process Registry
// Description: Immutable process registry backed by a sorted map.
// Purpose: Serve validated process descriptors to the execute engine.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! Descriptors are validated once on insert. The registry has no interior
//! mutability, so shared references are safe for concurrent lookups.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::Identifier;
use crate::core::ProcessDescriptor;
use crate::interfaces::ProcessRegistry;
use crate::interfaces::RegistryError;

// ============================================================================
// SECTION: In-Memory Registry
// ============================================================================

/// In-memory process registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProcessRegistry {
    /// Descriptors keyed by process identifier.
    processes: BTreeMap<Identifier, Arc<ProcessDescriptor>>,
}

impl InMemoryProcessRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            processes: BTreeMap::new(),
        }
    }

    /// Builds a registry from descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a descriptor is invalid or duplicated.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ProcessDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.insert(descriptor)?;
        }
        Ok(registry)
    }

    /// Parses a JSON array of descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Parse`] for malformed JSON, or any insert error.
    pub fn from_json(bytes: &[u8]) -> Result<Self, RegistryError> {
        let descriptors: Vec<ProcessDescriptor> =
            serde_json::from_slice(bytes).map_err(|err| RegistryError::Parse(err.to_string()))?;
        Self::from_descriptors(descriptors)
    }

    /// Validates and registers a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the descriptor is invalid or its
    /// identifier is already registered.
    pub fn insert(&mut self, descriptor: ProcessDescriptor) -> Result<(), RegistryError> {
        descriptor.validate().map_err(|source| RegistryError::InvalidDescriptor {
            identifier: descriptor.identifier.clone(),
            source,
        })?;
        if self.processes.contains_key(&descriptor.identifier) {
            return Err(RegistryError::DuplicateProcess(descriptor.identifier));
        }
        self.processes.insert(descriptor.identifier.clone(), Arc::new(descriptor));
        Ok(())
    }

    /// Returns the registered identifiers in sorted order.
    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.processes.keys()
    }

    /// Returns the number of registered processes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Returns true when no processes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

impl ProcessRegistry for InMemoryProcessRegistry {
    fn lookup(&self, identifier: &Identifier) -> Option<Arc<ProcessDescriptor>> {
        self.processes.get(identifier).map(Arc::clone)
    }
}
