//! Message types for comparative analysis kernels.

use serde::{Deserialize, Serialize};

use crate::outlier::DEFAULT_THRESHOLD;
use crate::types::{BucketTally, OutlierSet, Relatedness};

// ============================================================================
// MAD Outlier Messages
// ============================================================================

/// Input for MAD outlier detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MadOutlierInput {
    /// Distribution members.
    pub values: Vec<f64>,
    /// Modified z-score threshold.
    pub threshold: f64,
}

impl MadOutlierInput {
    /// Create an input at the default threshold.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Override the threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Output from MAD outlier detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MadOutlierOutput {
    /// Flagged members split around the mean.
    pub outliers: OutlierSet,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Correlation Messages
// ============================================================================

/// Input for correlation bucketing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationInput {
    /// Sub-series, each aligned bin-for-bin with `reference`.
    pub series: Vec<Vec<f64>>,
    /// Reference aggregate.
    pub reference: Vec<f64>,
}

/// Output from correlation bucketing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationOutput {
    /// One result per sub-series.
    pub results: Vec<Relatedness>,
    /// Sub-series grouped by bucket.
    pub tally: BucketTally,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}
