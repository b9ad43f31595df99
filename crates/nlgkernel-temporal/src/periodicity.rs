//! Periodicity and deseasonalized trend analysis.
//!
//! Combines the periodogram, additive decomposition and the Mann-Kendall test
//! into one verdict per series:
//!
//! 1. pick the dominant period from the periodogram
//! 2. decompose the series with that period
//! 3. grade the seasonal swing against the mean level
//! 4. test the decomposed trend for monotonic change

use std::time::Instant;

use crate::decomposition::SeasonalDecomposition;
use crate::messages::{PeriodicityAnalysisInput, PeriodicityAnalysisOutput};
use crate::spectral::PeriodogramKernel;
use crate::trend::MannKendall;
use crate::types::{
    mean, PeriodicityClass, PeriodicityVerdict, SeriesAnalysis, TimeUnit, TrendVerdict,
};
use nlgkernel_core::{
    domain::Domain,
    error::Result,
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};

/// Significance level applied to the decomposed trend.
///
/// Deliberately loose: the decomposed trend is smooth and short, and the
/// report grades the p-value itself.
pub const DEFAULT_EXPLORATORY_ALPHA: f64 = 0.5;

// ============================================================================
// Periodicity Analysis Kernel
// ============================================================================

/// Periodicity analysis kernel.
#[derive(Debug, Clone)]
pub struct PeriodicityAnalysis {
    metadata: KernelMetadata,
}

impl Default for PeriodicityAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodicityAnalysis {
    /// Create a new periodicity analysis kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch(
                "temporal/periodicity-analysis",
                Domain::TemporalAnalysis,
            )
            .with_description("Dominant period, seasonal amplitude and deseasonalized trend"),
        }
    }

    /// Analyze a series at the default exploratory significance level.
    pub fn compute(series: &[f64], unit: TimeUnit) -> Result<SeriesAnalysis> {
        Self::compute_with_alpha(series, unit, DEFAULT_EXPLORATORY_ALPHA)
    }

    /// Analyze a series.
    ///
    /// # Arguments
    /// * `series` - Observations, at least four
    /// * `unit` - Calendar unit of one bin, used in the periodicity label
    /// * `alpha` - Significance level for the trend test
    ///
    /// # Errors
    ///
    /// `InsufficientData` for short series, `Indeterminate` when no spectral
    /// peak shorter than the series carries power.
    pub fn compute_with_alpha(
        series: &[f64],
        unit: TimeUnit,
        alpha: f64,
    ) -> Result<SeriesAnalysis> {
        let period = PeriodogramKernel::dominant_period(series)?;
        let decomposition = SeasonalDecomposition::compute(series, period)?;

        let level = mean(series).abs();
        let amplitude = if decomposition.seasonal.iter().any(|s| s.is_nan()) {
            f64::NAN
        } else {
            decomposition
                .seasonal
                .iter()
                .fold(0.0_f64, |acc, s| acc.max(s.abs()))
        };
        let amplitude_ratio = if level > 0.0 && amplitude.is_finite() {
            amplitude / level
        } else {
            f64::NAN
        };
        let class = PeriodicityClass::classify(amplitude_ratio);

        let trend = MannKendall::compute(&decomposition.finite_trend(), alpha)?;

        let analysis = SeriesAnalysis::new(
            trend,
            PeriodicityVerdict {
                period,
                amplitude_ratio,
                class,
                unit,
            },
        );

        tracing::debug!(
            n = series.len(),
            period,
            amplitude_ratio,
            ?class,
            p_value = analysis.p_value,
            "Periodicity analysis"
        );

        Ok(analysis)
    }

    /// Analyze a series, falling back when the statistics are degenerate.
    ///
    /// When no period can be found the trend is tested on the raw series at
    /// `raw_alpha` and the periodicity verdict is empty. When even that is
    /// undefined the verdict is neutral. Only invalid input is returned as an
    /// error.
    ///
    /// # Arguments
    /// * `series` - Observations, one per bin
    /// * `unit` - Unit of one bin
    /// * `alpha` - Significance level for the decomposed trend
    /// * `raw_alpha` - Significance level for the raw-series fallback
    pub fn analyze_or_fallback(
        series: &[f64],
        unit: TimeUnit,
        alpha: f64,
        raw_alpha: f64,
    ) -> Result<SeriesAnalysis> {
        match Self::compute_with_alpha(series, unit, alpha) {
            Ok(analysis) => Ok(analysis),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, n = series.len(), "Periodicity undefined; testing raw trend");
                let trend = match MannKendall::compute(series, raw_alpha) {
                    Ok(verdict) => verdict,
                    Err(e) if e.is_recoverable() => {
                        tracing::warn!(error = %e, "Trend undefined; using neutral verdict");
                        TrendVerdict::indeterminate(series.len())
                    }
                    Err(e) => return Err(e),
                };
                Ok(SeriesAnalysis::new(trend, PeriodicityVerdict::none(unit)))
            }
            Err(e) => Err(e),
        }
    }
}

impl Kernel for PeriodicityAnalysis {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

impl BatchKernel<PeriodicityAnalysisInput, PeriodicityAnalysisOutput> for PeriodicityAnalysis {
    fn execute(&self, input: PeriodicityAnalysisInput) -> Result<PeriodicityAnalysisOutput> {
        let start = Instant::now();
        let analysis = Self::compute_with_alpha(&input.series.values, input.unit, input.alpha)?;
        Ok(PeriodicityAnalysisOutput {
            analysis,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }
}
