//! Domain definitions for kernel categorization.
//!
//! Kernels are organized into domains representing the stage of the narrative
//! pipeline they serve. Domains are used for kernel discovery and for grouping
//! the catalogue printed by the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Analytical domain for kernel categorization.
///
/// - Temporal: trend tests, spectral periodicity, decomposition, time labels
/// - Comparative: outliers among members of a distribution, series relatedness
/// - Narrative: record ingestion and sentence composition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Domain {
    /// Temporal analysis: Mann-Kendall, periodogram, seasonal decomposition, calendar labels
    TemporalAnalysis,

    /// Comparative analysis: MAD outliers, correlation buckets
    ComparativeAnalysis,

    /// Narrative composition: template selection and report assembly
    Narrative,

    /// Core: infrastructure and registry validation
    Core,
}

impl Domain {
    /// All available domains.
    pub const ALL: &'static [Domain] = &[
        Domain::TemporalAnalysis,
        Domain::ComparativeAnalysis,
        Domain::Narrative,
        Domain::Core,
    ];

    /// Returns the domain name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Domain::TemporalAnalysis => "TemporalAnalysis",
            Domain::ComparativeAnalysis => "ComparativeAnalysis",
            Domain::Narrative => "Narrative",
            Domain::Core => "Core",
        }
    }

    /// Short feature name used for filtering on the command line.
    #[must_use]
    pub const fn feature(&self) -> &'static str {
        match self {
            Domain::TemporalAnalysis => "temporal",
            Domain::ComparativeAnalysis => "comparative",
            Domain::Narrative => "narrative",
            Domain::Core => "core",
        }
    }

    /// Parse a domain from either its name or its feature string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Domain::ALL
            .iter()
            .copied()
            .find(|d| d.as_str().eq_ignore_ascii_case(s) || d.feature() == s.to_lowercase())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
