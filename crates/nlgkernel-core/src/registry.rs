//! Kernel registry.
//!
//! The registry holds the metadata of every kernel a domain crate exposes.
//! Domain crates populate it through their `register_all` function.

use crate::domain::Domain;
use crate::error::{KernelError, Result};
use crate::kernel::KernelMetadata;
use hashbrown::HashMap;
use tracing::{debug, info, warn};

/// Registry statistics.
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Total number of registered kernels.
    pub total: usize,
    /// Kernels by domain.
    pub by_domain: HashMap<Domain, usize>,
}

/// Central registry for all kernels.
#[derive(Debug, Default)]
pub struct KernelRegistry {
    kernels: HashMap<String, KernelMetadata>,
}

impl KernelRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kernel's metadata.
    ///
    /// # Errors
    ///
    /// Returns `KernelAlreadyRegistered` if the ID is taken.
    pub fn register(&mut self, metadata: KernelMetadata) -> Result<()> {
        if self.kernels.contains_key(&metadata.id) {
            return Err(KernelError::KernelAlreadyRegistered(metadata.id));
        }

        debug!(kernel_id = %metadata.id, domain = %metadata.domain, "Registering kernel");
        self.kernels.insert(metadata.id.clone(), metadata);
        Ok(())
    }

    /// Get a kernel by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&KernelMetadata> {
        self.kernels.get(id)
    }

    /// Get a kernel by ID, failing if absent.
    pub fn require(&self, id: &str) -> Result<&KernelMetadata> {
        self.get(id).ok_or_else(|| KernelError::not_found(id))
    }

    /// Check if a kernel exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.kernels.contains_key(id)
    }

    /// All kernel IDs, sorted.
    #[must_use]
    pub fn all_kernel_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.kernels.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Get kernels by domain, sorted by ID.
    #[must_use]
    pub fn by_domain(&self, domain: Domain) -> Vec<KernelMetadata> {
        let mut result: Vec<KernelMetadata> = self
            .kernels
            .values()
            .filter(|m| m.domain == domain)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        result
    }

    /// Get registry statistics.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let mut by_domain: HashMap<Domain, usize> = HashMap::new();
        for metadata in self.kernels.values() {
            *by_domain.entry(metadata.domain).or_default() += 1;
        }

        RegistryStats {
            total: self.kernels.len(),
            by_domain,
        }
    }

    /// Total number of registered kernels.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.kernels.len()
    }

    /// Clear all registered kernels.
    pub fn clear(&mut self) {
        self.kernels.clear();
        info!("Cleared kernel registry");
    }

    /// Unregister a kernel by ID.
    pub fn unregister(&mut self, id: &str) -> bool {
        if self.kernels.remove(id).is_some() {
            debug!(kernel_id = %id, "Unregistered kernel");
            return true;
        }

        warn!(kernel_id = %id, "Attempted to unregister non-existent kernel");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_metadata() -> KernelMetadata {
        KernelMetadata::batch("core/test", Domain::Core)
    }

    #[test]
    fn test_registry_creation() {
        let registry = KernelRegistry::new();
        assert_eq!(registry.total_count(), 0);
    }

    #[test]
    fn test_registration() {
        let mut registry = KernelRegistry::new();
        registry.register(test_metadata()).unwrap();

        assert_eq!(registry.total_count(), 1);
        assert!(registry.contains("core/test"));
        assert!(registry.get("core/test").is_some());
        assert!(registry.require("core/missing").is_err());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = KernelRegistry::new();
        registry.register(test_metadata()).unwrap();
        let result = registry.register(test_metadata());
        assert!(matches!(result, Err(KernelError::KernelAlreadyRegistered(_))));
    }

    #[test]
    fn test_by_domain_and_stats() {
        let mut registry = KernelRegistry::new();
        registry.register(test_metadata()).unwrap();
        registry
            .register(KernelMetadata::batch(
                "temporal/mann-kendall",
                Domain::TemporalAnalysis,
            ))
            .unwrap();
        registry
            .register(KernelMetadata::batch(
                "temporal/periodogram",
                Domain::TemporalAnalysis,
            ))
            .unwrap();

        let temporal = registry.by_domain(Domain::TemporalAnalysis);
        assert_eq!(temporal.len(), 2);
        assert_eq!(temporal[0].id, "temporal/mann-kendall");

        let stats = registry.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_domain.get(&Domain::Core), Some(&1));
        assert_eq!(stats.by_domain.get(&Domain::TemporalAnalysis), Some(&2));
    }

    #[test]
    fn test_unregister() {
        let mut registry = KernelRegistry::new();
        registry.register(test_metadata()).unwrap();

        assert!(registry.unregister("core/test"));
        assert!(!registry.contains("core/test"));
        assert!(!registry.unregister("core/test"));
    }
}
