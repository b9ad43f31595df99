//! Monotonic trend testing.
//!
//! This module provides the Mann-Kendall test, a distribution-free test for
//! a monotonic upward or downward trend. It is best read as exploratory: the
//! significance level is a knob, not a guarantee.

use std::time::Instant;

use statrs::distribution::{ContinuousCDF, Normal};

use crate::messages::{MannKendallInput, MannKendallOutput};
use crate::types::{TrendDirection, TrendVerdict};
use nlgkernel_core::{
    domain::Domain,
    error::{KernelError, Result},
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};

/// Default two-sided significance level.
pub const DEFAULT_ALPHA: f64 = 0.05;

// ============================================================================
// Mann-Kendall Kernel
// ============================================================================

/// Mann-Kendall trend test kernel.
///
/// Computes Kendall's S over all ordered pairs, its tie-corrected variance,
/// and the continuity-corrected normal score.
#[derive(Debug, Clone)]
pub struct MannKendall {
    metadata: KernelMetadata,
}

impl Default for MannKendall {
    fn default() -> Self {
        Self::new()
    }
}

impl MannKendall {
    /// Create a new Mann-Kendall kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("temporal/mann-kendall", Domain::TemporalAnalysis)
                .with_description("Mann-Kendall nonparametric monotonic trend test"),
        }
    }

    /// Test a series for monotonic trend.
    ///
    /// # Arguments
    /// * `series` - Ordered observations, at least two
    /// * `alpha` - Two-sided significance level in (0, 1)
    ///
    /// A series whose S variance is zero (all values equal) yields a neutral
    /// verdict flagged `indeterminate` instead of an error.
    pub fn compute(series: &[f64], alpha: f64) -> Result<TrendVerdict> {
        let n = series.len();
        if n < 2 {
            return Err(KernelError::insufficient(2, n));
        }
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(KernelError::validation(format!(
                "alpha must lie in (0, 1), got {}",
                alpha
            )));
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(KernelError::validation(
                "trend series contains non-finite values",
            ));
        }

        let s = Self::s_statistic(series);
        let variance = Self::variance(series);

        if variance <= 0.0 {
            tracing::warn!(n, "Mann-Kendall variance is zero; trend is indeterminate");
            return Ok(TrendVerdict::indeterminate(n));
        }

        let z_score = match s.signum() {
            1 => (s - 1) as f64 / variance.sqrt(),
            -1 => (s + 1) as f64 / variance.sqrt(),
            _ => 0.0,
        };

        let normal = Normal::new(0.0, 1.0).map_err(|e| KernelError::internal(e.to_string()))?;
        let p_value = (2.0 * (1.0 - normal.cdf(z_score.abs()))).clamp(0.0, 1.0);
        let critical = normal.inverse_cdf(1.0 - alpha / 2.0);
        let significant = z_score.abs() > critical;

        let direction = if significant && z_score < 0.0 {
            TrendDirection::Downward
        } else if significant && z_score > 0.0 {
            TrendDirection::Upward
        } else {
            TrendDirection::None
        };

        tracing::debug!(n, s, variance, z_score, p_value, ?direction, "Mann-Kendall verdict");

        Ok(TrendVerdict {
            direction,
            significant,
            p_value,
            z_score,
            s,
            variance,
            indeterminate: false,
            n,
        })
    }

    /// Kendall's S: sum of sign(x[j] - x[k]) over k < j.
    pub fn s_statistic(series: &[f64]) -> i64 {
        let mut s = 0i64;
        for (k, &xk) in series.iter().enumerate() {
            for &xj in &series[k + 1..] {
                if xj > xk {
                    s += 1;
                } else if xj < xk {
                    s -= 1;
                }
            }
        }
        s
    }

    /// Variance of S with the tie correction.
    pub fn variance(series: &[f64]) -> f64 {
        let n = series.len() as f64;
        let mut sorted = series.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mut tie_term = 0.0;
        let mut run = 1usize;
        for i in 1..=sorted.len() {
            if i < sorted.len() && sorted[i] == sorted[i - 1] {
                run += 1;
                continue;
            }
            if run > 1 {
                let t = run as f64;
                tie_term += t * (t - 1.0) * (2.0 * t + 5.0);
            }
            run = 1;
        }

        (n * (n - 1.0) * (2.0 * n + 5.0) - tie_term) / 18.0
    }
}

impl Kernel for MannKendall {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

impl BatchKernel<MannKendallInput, MannKendallOutput> for MannKendall {
    fn execute(&self, input: MannKendallInput) -> Result<MannKendallOutput> {
        let start = Instant::now();
        let verdict = Self::compute(&input.series.values, input.alpha)?;
        Ok(MannKendallOutput {
            verdict,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeSeries;

    #[test]
    fn test_mann_kendall_metadata() {
        let kernel = MannKendall::new();
        assert_eq!(kernel.metadata().id, "temporal/mann-kendall");
        assert_eq!(kernel.metadata().domain, Domain::TemporalAnalysis);
    }

    #[test]
    fn test_increasing_series() {
        let verdict = MannKendall::compute(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.05).unwrap();
        assert_eq!(verdict.s, 10);
        assert!((verdict.variance - 50.0 / 3.0).abs() < 1e-9);
        assert!((verdict.z_score - 2.2045).abs() < 1e-3);
        assert!((verdict.p_value - 0.0275).abs() < 1e-3);
        assert!(verdict.significant);
        assert_eq!(verdict.direction, TrendDirection::Upward);
    }

    #[test]
    fn test_strictly_monotonic_s() {
        let up: Vec<f64> = (0..12).map(f64::from).collect();
        let verdict = MannKendall::compute(&up, 0.05).unwrap();
        assert_eq!(verdict.s, 12 * 11 / 2);
        assert!(verdict.z_score > 0.0);

        let down: Vec<f64> = up.iter().rev().copied().collect();
        let verdict = MannKendall::compute(&down, 0.05).unwrap();
        assert_eq!(verdict.s, -(12 * 11 / 2));
        assert!(verdict.z_score < 0.0);
        assert_eq!(verdict.direction, TrendDirection::Downward);
    }

    #[test]
    fn test_constant_series_is_indeterminate() {
        let verdict = MannKendall::compute(&[4.0; 6], 0.05).unwrap();
        assert!(verdict.indeterminate);
        assert!(!verdict.significant);
        assert_eq!(verdict.direction, TrendDirection::None);
        assert_eq!(verdict.p_value, 1.0);
    }

    #[test]
    fn test_tie_correction() {
        // One tie group of size 2: 5*4*15 - 2*1*9 = 282
        let variance = MannKendall::variance(&[1.0, 2.0, 2.0, 3.0, 4.0]);
        assert!((variance - 282.0 / 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_not_significant_at_strict_alpha() {
        let verdict = MannKendall::compute(&[1.0, 3.0, 2.0, 4.0], 0.05).unwrap();
        assert_eq!(verdict.s, 4);
        assert!(!verdict.significant);
        assert_eq!(verdict.direction, TrendDirection::None);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            MannKendall::compute(&[1.0], 0.05),
            Err(KernelError::InsufficientData { needed: 2, actual: 1 })
        ));
        assert!(MannKendall::compute(&[1.0, 2.0], 0.0).is_err());
        assert!(MannKendall::compute(&[1.0, 2.0], 1.0).is_err());
        assert!(MannKendall::compute(&[1.0, f64::NAN], 0.05).is_err());
    }

    #[test]
    fn test_batch_execute() {
        let kernel = MannKendall::new();
        let input = MannKendallInput::new(TimeSeries::new(vec![5.0, 4.0, 3.0, 2.0, 1.0]));
        let output = kernel.execute(input).unwrap();
        assert_eq!(output.verdict.direction, TrendDirection::Downward);
    }
}
