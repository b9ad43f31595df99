//! Message types for temporal analysis kernels.
//!
//! Input/output message types for the `BatchKernel` trait implementations.

use serde::{Deserialize, Serialize};

use crate::periodicity::DEFAULT_EXPLORATORY_ALPHA;
use crate::trend::DEFAULT_ALPHA;
use crate::types::{
    DecompositionResult, Periodogram, SeriesAnalysis, TimeRangeLabel, TimeSeries, TimeUnit,
    TrendVerdict,
};

// ============================================================================
// Mann-Kendall Messages
// ============================================================================

/// Input for the Mann-Kendall trend test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MannKendallInput {
    /// Series to test.
    pub series: TimeSeries,
    /// Two-sided significance level.
    pub alpha: f64,
}

impl MannKendallInput {
    /// Create an input at the default significance level.
    pub fn new(series: TimeSeries) -> Self {
        Self {
            series,
            alpha: DEFAULT_ALPHA,
        }
    }

    /// Override the significance level.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Output from the Mann-Kendall trend test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MannKendallOutput {
    /// Test verdict.
    pub verdict: TrendVerdict,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Periodogram Messages
// ============================================================================

/// Input for the periodogram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodogramInput {
    /// Series to analyze.
    pub series: TimeSeries,
}

impl PeriodogramInput {
    /// Create a new periodogram input.
    pub fn new(series: TimeSeries) -> Self {
        Self { series }
    }
}

/// Output from the periodogram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodogramOutput {
    /// Spectral estimate.
    pub periodogram: Periodogram,
    /// Dominant period in bins, if one exists.
    pub dominant_period: Option<usize>,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Seasonal Decomposition Messages
// ============================================================================

/// Input for seasonal decomposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalDecompositionInput {
    /// Input time series.
    pub series: TimeSeries,
    /// Seasonal period in bins.
    pub period: usize,
}

impl SeasonalDecompositionInput {
    /// Create a new decomposition input.
    pub fn new(series: TimeSeries, period: usize) -> Self {
        Self { series, period }
    }
}

/// Output from seasonal decomposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalDecompositionOutput {
    /// Decomposition result.
    pub result: DecompositionResult,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Periodicity Analysis Messages
// ============================================================================

/// Input for periodicity analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodicityAnalysisInput {
    /// Series to analyze.
    pub series: TimeSeries,
    /// Calendar unit of one bin.
    pub unit: TimeUnit,
    /// Significance level for the decomposed trend.
    pub alpha: f64,
}

impl PeriodicityAnalysisInput {
    /// Create an input at the exploratory significance level.
    pub fn new(series: TimeSeries, unit: TimeUnit) -> Self {
        Self {
            series,
            unit,
            alpha: DEFAULT_EXPLORATORY_ALPHA,
        }
    }
}

/// Output from periodicity analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodicityAnalysisOutput {
    /// Combined verdict.
    pub analysis: SeriesAnalysis,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}

// ============================================================================
// Time Label Messages
// ============================================================================

/// Input for time labeling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeLabelInput {
    /// Period start, epoch milliseconds.
    pub start_ms: i64,
    /// Period end, epoch milliseconds.
    pub end_ms: i64,
    /// Bin width, milliseconds.
    pub interval_ms: i64,
    /// Bin indices to label at the dominant unit.
    pub slots: Vec<usize>,
}

/// Output from time labeling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeLabelOutput {
    /// Range labels.
    pub range: TimeRangeLabel,
    /// One label per requested slot.
    pub slots: Vec<String>,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}
