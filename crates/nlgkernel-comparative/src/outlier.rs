//! Robust outlier detection.
//!
//! Modified z-scores built on the median absolute deviation (MAD):
//! z_i = 0.6745 * |x_i - median| / median(|x - median|).
//! Multi-dimensional members use their Euclidean distance to the
//! per-dimension median.

use std::time::Instant;

use crate::messages::{MadOutlierInput, MadOutlierOutput};
use crate::types::OutlierSet;
use nlgkernel_core::{
    domain::Domain,
    error::{KernelError, Result},
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};

/// Default modified z-score threshold.
pub const DEFAULT_THRESHOLD: f64 = 3.5;

/// Consistency constant of the MAD for normal data (0.75 quantile of N(0, 1)).
const MAD_SCALE: f64 = 0.6745;

// ============================================================================
// MAD Outlier Kernel
// ============================================================================

/// MAD-based outlier detection kernel.
#[derive(Debug, Clone)]
pub struct MadOutlier {
    metadata: KernelMetadata,
}

impl Default for MadOutlier {
    fn default() -> Self {
        Self::new()
    }
}

impl MadOutlier {
    /// Create a new MAD outlier kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("comparative/mad-outlier", Domain::ComparativeAnalysis)
                .with_description("Median absolute deviation modified z-score outliers"),
        }
    }

    /// Flag outliers in a one-dimensional distribution.
    ///
    /// The mask has one entry per value. When the MAD is zero, members that
    /// differ from the median score infinity and are flagged; members equal
    /// to it are not.
    pub fn compute(values: &[f64], threshold: f64) -> Vec<bool> {
        Self::scores(values)
            .into_iter()
            .map(|z| z > threshold)
            .collect()
    }

    /// Flag outliers among multi-dimensional members.
    pub fn compute_points(points: &[Vec<f64>], threshold: f64) -> Vec<bool> {
        let dims = points.iter().map(Vec::len).max().unwrap_or(0);
        let center: Vec<f64> = (0..dims)
            .map(|d| {
                let column: Vec<f64> = points
                    .iter()
                    .map(|p| p.get(d).copied().unwrap_or(0.0))
                    .collect();
                median(&column)
            })
            .collect();

        let distances: Vec<f64> = points
            .iter()
            .map(|p| {
                center
                    .iter()
                    .enumerate()
                    .map(|(d, c)| (p.get(d).copied().unwrap_or(0.0) - c).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .collect();

        modified_z(&distances)
            .into_iter()
            .map(|z| z > threshold)
            .collect()
    }

    /// Modified z-scores of a one-dimensional distribution.
    pub fn scores(values: &[f64]) -> Vec<f64> {
        if values.is_empty() {
            return Vec::new();
        }
        let center = median(values);
        let distances: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
        modified_z(&distances)
    }

    /// Detect outliers and split them around the distribution mean.
    pub fn detect(values: &[f64], threshold: f64) -> OutlierSet {
        let mask = Self::compute(values, threshold);
        let set = Self::partition(values, &mask);
        tracing::debug!(
            members = values.len(),
            above = set.above.len(),
            below = set.below.len(),
            "MAD outliers"
        );
        set
    }

    /// Split flagged members into above-mean and below-mean groups.
    ///
    /// Each group lists the member farthest from the mean first.
    pub fn partition(values: &[f64], mask: &[bool]) -> OutlierSet {
        let mean = if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        };

        let mut above: Vec<usize> = Vec::new();
        let mut below: Vec<usize> = Vec::new();
        for (i, (&v, &flagged)) in values.iter().zip(mask).enumerate() {
            if !flagged {
                continue;
            }
            if v > mean {
                above.push(i);
            } else {
                below.push(i);
            }
        }

        above.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
        below.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

        OutlierSet {
            above,
            below,
            mean,
            members: values.len(),
        }
    }
}

/// Median of a slice (mean of the middle pair for even lengths).
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn modified_z(distances: &[f64]) -> Vec<f64> {
    if distances.is_empty() {
        return Vec::new();
    }
    let mad = median(distances);
    distances
        .iter()
        .map(|&d| {
            if mad > 0.0 {
                MAD_SCALE * d / mad
            } else if d > 0.0 {
                f64::INFINITY
            } else {
                0.0
            }
        })
        .collect()
}

impl Kernel for MadOutlier {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

impl BatchKernel<MadOutlierInput, MadOutlierOutput> for MadOutlier {
    fn execute(&self, input: MadOutlierInput) -> Result<MadOutlierOutput> {
        let start = Instant::now();
        let outliers = Self::detect(&input.values, input.threshold);
        Ok(MadOutlierOutput {
            outliers,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }

    fn validate_input(&self, input: &MadOutlierInput) -> Result<()> {
        if !(input.threshold.is_finite() && input.threshold > 0.0) {
            return Err(KernelError::validation(format!(
                "outlier threshold must be positive, got {}",
                input.threshold
            )));
        }
        if input.values.iter().any(|v| !v.is_finite()) {
            return Err(KernelError::validation("outlier input contains non-finite values"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mad_metadata() {
        let kernel = MadOutlier::new();
        assert_eq!(kernel.metadata().id, "comparative/mad-outlier");
        assert_eq!(kernel.metadata().domain, Domain::ComparativeAnalysis);
    }

    #[test]
    fn test_single_spike_with_zero_mad() {
        let mask = MadOutlier::compute(&[10.0, 10.0, 10.0, 10.0, 100.0], DEFAULT_THRESHOLD);
        assert_eq!(mask, vec![false, false, false, false, true]);
    }

    #[test]
    fn test_regular_spread() {
        let values = [9.0, 10.0, 11.0, 10.5, 9.5, 10.2, 60.0];
        let mask = MadOutlier::compute(&values, DEFAULT_THRESHOLD);
        assert_eq!(mask.iter().filter(|&&m| m).count(), 1);
        assert!(mask[6]);
    }

    #[test]
    fn test_degenerate_distributions() {
        assert!(MadOutlier::compute(&[], DEFAULT_THRESHOLD).is_empty());
        assert!(MadOutlier::compute(&[5.0; 6], DEFAULT_THRESHOLD)
            .iter()
            .all(|&m| !m));
        assert_eq!(MadOutlier::compute(&[7.0], DEFAULT_THRESHOLD), vec![false]);
    }

    #[test]
    fn test_mask_never_exceeds_members() {
        let values = [1.0, 2.0, 3.0, 100.0, -100.0];
        let mask = MadOutlier::compute(&values, DEFAULT_THRESHOLD);
        assert_eq!(mask.len(), values.len());
    }

    #[test]
    fn test_partition_around_mean() {
        let values = [0.1, 0.0, 0.2, 4.0, -3.9, 0.1, 0.0];
        let set = MadOutlier::detect(&values, DEFAULT_THRESHOLD);
        assert_eq!(set.above, vec![3]);
        assert_eq!(set.below, vec![4]);
        assert_eq!(set.members, 7);
    }

    #[test]
    fn test_points_euclidean() {
        let points = vec![
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            vec![1.1, 0.9],
            vec![0.9, 1.0],
            vec![8.0, 9.0],
        ];
        let mask = MadOutlier::compute_points(&points, DEFAULT_THRESHOLD);
        assert_eq!(mask, vec![false, false, false, false, true]);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_validate_input() {
        let kernel = MadOutlier::new();
        let bad = MadOutlierInput::new(vec![1.0, f64::NAN]);
        assert!(kernel.run(bad).is_err());
        let ok = MadOutlierInput::new(vec![1.0, 1.0, 9.0]);
        assert_eq!(kernel.run(ok).unwrap().outliers.above, vec![2]);
    }
}
