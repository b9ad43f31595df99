//! Time series decomposition kernels.
//!
//! This module provides classical additive decomposition:
//! observed = trend + seasonal + residual, where the trend is a centered
//! moving average and the seasonal term is the centered per-phase mean of the
//! detrended series.

use std::time::Instant;

use crate::messages::{SeasonalDecompositionInput, SeasonalDecompositionOutput};
use crate::types::DecompositionResult;
use nlgkernel_core::{
    domain::Domain,
    error::{KernelError, Result},
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};

// ============================================================================
// Seasonal Decomposition Kernel
// ============================================================================

/// Seasonal decomposition kernel (additive, moving-average based).
///
/// Decomposes a time series into trend, seasonal, and residual components.
#[derive(Debug, Clone)]
pub struct SeasonalDecomposition {
    metadata: KernelMetadata,
}

impl Default for SeasonalDecomposition {
    fn default() -> Self {
        Self::new()
    }
}

impl SeasonalDecomposition {
    /// Create a new seasonal decomposition kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch(
                "temporal/seasonal-decomposition",
                Domain::TemporalAnalysis,
            )
            .with_description("Additive moving-average seasonal decomposition"),
        }
    }

    /// Decompose a time series.
    ///
    /// # Arguments
    /// * `series` - Input observations
    /// * `period` - Seasonal period in bins, at least 2
    ///
    /// Trend values within `period / 2` bins of either edge are NaN. A phase
    /// with no defined detrended value makes the whole seasonal component NaN.
    pub fn compute(series: &[f64], period: usize) -> Result<DecompositionResult> {
        let n = series.len();
        if period < 2 {
            return Err(KernelError::validation(format!(
                "seasonal period must be at least 2, got {}",
                period
            )));
        }
        let needed = 2 * (period / 2) + 1;
        if n < needed {
            return Err(KernelError::insufficient(needed, n));
        }

        let trend = Self::centered_moving_average(series, period);

        let detrended: Vec<f64> = series
            .iter()
            .zip(&trend)
            .map(|(v, t)| v - t)
            .collect();

        let pattern = Self::mean_seasonal(&detrended, period);
        let seasonal: Vec<f64> = (0..n).map(|i| pattern[i % period]).collect();

        let residual: Vec<f64> = detrended
            .iter()
            .zip(&seasonal)
            .map(|(d, s)| d - s)
            .collect();

        Ok(DecompositionResult {
            trend,
            seasonal,
            residual,
            n,
            period,
        })
    }

    /// Centered moving average.
    ///
    /// Odd windows weight `period` neighbours equally; even windows span
    /// `period + 1` points with half weight on both ends.
    fn centered_moving_average(values: &[f64], period: usize) -> Vec<f64> {
        let n = values.len();
        let half = period / 2;
        let even = period % 2 == 0;
        let mut result = vec![f64::NAN; n];

        for (i, slot) in result.iter_mut().enumerate().take(n - half).skip(half) {
            let window = &values[i - half..=i + half];
            let mut sum: f64 = window.iter().sum();
            if even {
                sum -= 0.5 * (window[0] + window[window.len() - 1]);
            }
            *slot = sum / period as f64;
        }

        result
    }

    /// Per-phase mean of the defined detrended values, centered to sum to zero.
    fn mean_seasonal(detrended: &[f64], period: usize) -> Vec<f64> {
        let mut sums = vec![0.0; period];
        let mut counts = vec![0usize; period];

        for (i, &d) in detrended.iter().enumerate() {
            if d.is_nan() {
                continue;
            }
            sums[i % period] += d;
            counts[i % period] += 1;
        }

        if counts.iter().any(|&c| c == 0) {
            tracing::warn!(period, "Seasonal phase without data; seasonal component undefined");
            return vec![f64::NAN; period];
        }

        let averages: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(s, &c)| s / c as f64)
            .collect();

        let center = averages.iter().sum::<f64>() / period as f64;
        averages.iter().map(|a| a - center).collect()
    }
}

impl Kernel for SeasonalDecomposition {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

impl BatchKernel<SeasonalDecompositionInput, SeasonalDecompositionOutput>
    for SeasonalDecomposition
{
    fn execute(&self, input: SeasonalDecompositionInput) -> Result<SeasonalDecompositionOutput> {
        let start = Instant::now();
        let result = Self::compute(&input.series.values, input.period)?;
        Ok(SeasonalDecompositionOutput {
            result,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn create_seasonal_series() -> Vec<f64> {
        // Trend + seasonal pattern
        let period = 12;
        (0..120)
            .map(|t| {
                let trend = 100.0 + 0.5 * t as f64;
                let seasonal = 10.0 * ((2.0 * PI * t as f64 / period as f64).sin());
                trend + seasonal
            })
            .collect()
    }

    #[test]
    fn test_decomposition_metadata() {
        let kernel = SeasonalDecomposition::new();
        assert_eq!(kernel.metadata().id, "temporal/seasonal-decomposition");
        assert_eq!(kernel.metadata().domain, Domain::TemporalAnalysis);
    }

    #[test]
    fn test_seasonal_decomposition() {
        let series = create_seasonal_series();
        let result = SeasonalDecomposition::compute(&series, 12).unwrap();

        assert_eq!(result.trend.len(), series.len());
        assert_eq!(result.seasonal.len(), series.len());
        assert_eq!(result.residual.len(), series.len());
        assert_eq!(result.period, 12);

        // Seasonal should be periodic
        for i in 0..result.seasonal.len() - 12 {
            let diff = (result.seasonal[i] - result.seasonal[i + 12]).abs();
            assert!(diff < 1e-9, "Seasonal not periodic at {}: diff={}", i, diff);
        }

        // Linear trend passes through a symmetric moving average unchanged
        for i in 6..114 {
            let expected = 100.0 + 0.5 * i as f64;
            assert!((result.trend[i] - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_trend_edges_are_nan() {
        let series: Vec<f64> = (0..10).map(f64::from).collect();
        let odd = SeasonalDecomposition::compute(&series, 3).unwrap();
        assert!(odd.trend[0].is_nan());
        assert!(odd.trend[9].is_nan());
        assert_eq!(odd.finite_trend().len(), 8);
        assert!((odd.trend[1] - 1.0).abs() < 1e-12);

        let even = SeasonalDecomposition::compute(&series, 4).unwrap();
        assert!(even.trend[1].is_nan());
        assert!(even.trend[8].is_nan());
        assert_eq!(even.finite_trend().len(), 6);
        assert!((even.trend[2] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_seasonal_is_centered() {
        let result = SeasonalDecomposition::compute(&create_seasonal_series(), 12).unwrap();
        let sum: f64 = result.seasonal[..12].iter().sum();
        assert!(sum.abs() < 1e-9);
    }

    #[test]
    fn test_residual_reconstructs_series() {
        let series = create_seasonal_series();
        let result = SeasonalDecomposition::compute(&series, 12).unwrap();
        for i in 6..114 {
            let rebuilt = result.trend[i] + result.seasonal[i] + result.residual[i];
            assert!((rebuilt - series[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_phase_gives_nan_seasonal() {
        // period 4 over 7 points leaves phase 1 without a defined trend
        let series = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let result = SeasonalDecomposition::compute(&series, 4).unwrap();
        assert!(result.seasonal.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_invalid_period() {
        assert!(SeasonalDecomposition::compute(&[1.0, 2.0, 3.0], 1).is_err());
        assert!(matches!(
            SeasonalDecomposition::compute(&[1.0, 2.0, 3.0, 4.0], 4),
            Err(KernelError::InsufficientData { needed: 5, actual: 4 })
        ));
    }
}
