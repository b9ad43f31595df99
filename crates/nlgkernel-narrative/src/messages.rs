//! Message types for narrative kernels.

use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::report::Report;

// ============================================================================
// Report Messages
// ============================================================================

/// Input for report generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInput {
    /// Record to narrate.
    pub record: Record,
}

impl ReportInput {
    /// Wrap a record.
    pub fn new(record: Record) -> Self {
        Self { record }
    }
}

/// Output from report generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    /// Generated narrative.
    pub report: Report,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}
