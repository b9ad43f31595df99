//! Kernel metadata.
//!
//! Every statistical routine in the engine is exposed as a kernel: a small
//! struct carrying its metadata plus a pure `compute` function.

use crate::domain::Domain;
use serde::{Deserialize, Serialize};

/// Kernel metadata.
///
/// Identifies a kernel and describes what it computes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KernelMetadata {
    /// Unique kernel identifier (e.g., "temporal/mann-kendall").
    pub id: String,

    /// Analytical domain.
    pub domain: Domain,

    /// Human-readable description.
    pub description: String,

    /// Version of the kernel implementation.
    pub version: u32,
}

impl KernelMetadata {
    /// Create metadata for a batch kernel.
    #[must_use]
    pub fn batch(id: impl Into<String>, domain: Domain) -> Self {
        Self {
            id: id.into(),
            domain,
            description: String::new(),
            version: 1,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Returns the short kernel name (the part after the domain prefix).
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }
}

impl Default for KernelMetadata {
    fn default() -> Self {
        Self::batch("unnamed", Domain::Core)
    }
}
