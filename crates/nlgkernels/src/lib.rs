//! # NlgKernels
//!
//! Statistical narrative engine. Each record describes a corpus of documents
//! grouped into topics, with per-bin counts and sentiment sums. The engine
//! tests the series for trend and periodicity, finds outlying topics and
//! regions, buckets topic correlations, and renders the verdicts as an
//! English report.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nlgkernels::narrative::{Record, ReportGenerator};
//!
//! let record = Record::from_json(&line)?;
//! let report = ReportGenerator::new().generate(&record)?;
//! println!("{}", report);
//! ```
//!
//! ## Domain Organization
//!
//! | Domain | Kernels | Description |
//! |--------|---------|-------------|
//! | TemporalAnalysis | 5 | Mann-Kendall, periodogram, decomposition, calendar labels |
//! | ComparativeAnalysis | 2 | MAD outliers, correlation buckets |
//! | Narrative | 1 | Report generation |
//!
//! ## Feature Flags
//!
//! - `default`: all three domains
//! - `temporal`, `comparative`: statistics only
//! - `narrative`: report generation (pulls in both statistics domains)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use nlgkernel_core as core;

#[cfg(feature = "temporal")]
pub use nlgkernel_temporal as temporal;

#[cfg(feature = "comparative")]
pub use nlgkernel_comparative as comparative;

#[cfg(feature = "narrative")]
pub use nlgkernel_narrative as narrative;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use nlgkernel_core::prelude::*;

    #[cfg(feature = "narrative")]
    pub use nlgkernel_narrative::{Record, RecordReader, Report, ReportGenerator, SectionKind};
}

/// Version information.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Kernel catalog.
pub mod catalog {
    use nlgkernel_core::domain::Domain;

    /// Domain information.
    #[derive(Debug, Clone)]
    pub struct DomainInfo {
        /// Domain enum value.
        pub domain: Domain,
        /// Human-readable name.
        pub name: &'static str,
        /// Description.
        pub description: &'static str,
        /// Number of kernels.
        pub kernel_count: usize,
        /// Feature flag to enable.
        pub feature: &'static str,
    }

    /// All domains that carry kernels.
    pub fn domains() -> Vec<DomainInfo> {
        vec![
            DomainInfo {
                domain: Domain::TemporalAnalysis,
                name: "Temporal Analysis",
                description: "Mann-Kendall trend, periodogram, seasonal decomposition, calendar labels",
                kernel_count: 5,
                feature: "temporal",
            },
            DomainInfo {
                domain: Domain::ComparativeAnalysis,
                name: "Comparative Analysis",
                description: "MAD outliers split around the mean, Pearson correlation buckets",
                kernel_count: 2,
                feature: "comparative",
            },
            DomainInfo {
                domain: Domain::Narrative,
                name: "Narrative",
                description: "Record aggregation, template selection, report assembly",
                kernel_count: 1,
                feature: "narrative",
            },
        ]
    }

    /// Total kernel count across all domains.
    pub fn total_kernel_count() -> usize {
        domains().iter().map(|d| d.kernel_count).sum()
    }

    /// Check if a domain is enabled via compile-time features.
    pub fn is_domain_enabled(feature: &str) -> bool {
        enabled_domains().contains(&feature)
    }

    /// Enabled domains based on compile-time features.
    #[allow(clippy::vec_init_then_push)]
    pub fn enabled_domains() -> Vec<&'static str> {
        let mut enabled = Vec::new();

        #[cfg(feature = "temporal")]
        enabled.push("temporal");
        #[cfg(feature = "comparative")]
        enabled.push("comparative");
        #[cfg(feature = "narrative")]
        enabled.push("narrative");

        enabled
    }
}

/// Register all enabled domain kernels into a registry.
///
/// # Errors
///
/// Returns an error if a kernel id is registered twice.
pub fn register_all(
    registry: &mut nlgkernel_core::registry::KernelRegistry,
) -> nlgkernel_core::error::Result<()> {
    #[cfg(feature = "temporal")]
    nlgkernel_temporal::register_all(registry)?;

    #[cfg(feature = "comparative")]
    nlgkernel_comparative::register_all(registry)?;

    #[cfg(feature = "narrative")]
    nlgkernel_narrative::register_all(registry)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let _domain = Domain::Narrative;
        let _level = LogLevel::Info;
    }

    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!version::VERSION.is_empty());
    }

    #[test]
    fn test_catalog() {
        assert_eq!(catalog::domains().len(), 3);
        assert_eq!(catalog::total_kernel_count(), 8);
    }

    #[test]
    fn test_enabled_domains() {
        let enabled = catalog::enabled_domains();
        assert!(enabled.contains(&"temporal"));
        assert!(catalog::is_domain_enabled("narrative"));
    }

    #[test]
    fn test_register_all_matches_catalog() {
        let mut registry = nlgkernel_core::registry::KernelRegistry::new();
        register_all(&mut registry).unwrap();
        assert_eq!(registry.total_count(), catalog::total_kernel_count());
        for info in catalog::domains() {
            assert_eq!(registry.by_domain(info.domain).len(), info.kernel_count);
        }
    }
}
