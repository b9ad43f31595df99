//! # NlgKernel Narrative
//!
//! Turns one analytics record into a sectioned English report.
//!
//! ## Pipeline
//!
//! - `record` - JSON record model, validation and a JSON-lines reader
//! - `aggregate` - Region, buzzword and term ledgers merged across topics
//! - `templates` - Sentence tables keyed by statistical verdicts
//! - `composer` - Pure functions from verdicts to section lines
//! - `report` - `ReportGenerator`, the kernel that runs the statistics
//!
//! ## Kernels
//!
//! - `ReportGenerator` - Full narrative for one record

#![warn(missing_docs)]

pub mod aggregate;
pub mod composer;
pub mod format;
pub mod messages;
pub mod record;
pub mod report;
pub mod templates;

pub use aggregate::{Aggregates, BuzzwordStats, RegionStats, TermStats, TopicSummary};
pub use messages::{ReportInput, ReportOutput};
pub use record::{Record, RecordReader, TopicEntry};
pub use report::{Report, ReportGenerator, Section, SectionKind};

use nlgkernel_core::{error::Result, registry::KernelRegistry, traits::Kernel};

/// Register all narrative kernels.
pub fn register_all(registry: &mut KernelRegistry) -> Result<()> {
    tracing::info!("Registering narrative kernels");

    registry.register(ReportGenerator::new().metadata().clone())?;

    Ok(())
}

/// Number of kernels `register_all` adds.
pub const KERNEL_COUNT: usize = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use nlgkernel_core::domain::Domain;

    #[test]
    fn test_register_all() {
        let mut registry = KernelRegistry::new();
        register_all(&mut registry).unwrap();
        assert_eq!(registry.total_count(), KERNEL_COUNT);
        assert_eq!(registry.by_domain(Domain::Narrative).len(), 1);
        assert!(registry.contains("narrative/report"));
    }
}
