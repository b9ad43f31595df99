//! # NlgKernel Comparative Analysis
//!
//! Kernels that compare members of a distribution with each other.
//!
//! ## Kernels
//!
//! - `MadOutlier` - Median absolute deviation outliers, split around the mean
//! - `CorrelationClassifier` - Pearson relatedness buckets against a reference

#![warn(missing_docs)]

pub mod correlation;
pub mod messages;
pub mod outlier;
pub mod types;

pub use correlation::{pearson, CorrelationClassifier};
pub use outlier::{median, MadOutlier, DEFAULT_THRESHOLD};
pub use types::*;

use nlgkernel_core::{error::Result, registry::KernelRegistry, traits::Kernel};

/// Register all comparative kernels.
pub fn register_all(registry: &mut KernelRegistry) -> Result<()> {
    tracing::info!("Registering comparative analysis kernels");

    registry.register(MadOutlier::new().metadata().clone())?;
    registry.register(CorrelationClassifier::new().metadata().clone())?;

    Ok(())
}

/// Number of kernels `register_all` adds.
pub const KERNEL_COUNT: usize = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all() {
        let mut registry = KernelRegistry::new();
        register_all(&mut registry).unwrap();
        assert_eq!(registry.total_count(), KERNEL_COUNT);
        assert!(registry.contains("comparative/mad-outlier"));
        assert!(register_all(&mut registry).is_err());
    }
}
