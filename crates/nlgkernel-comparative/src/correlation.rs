//! Correlation relatedness kernels.
//!
//! Pearson correlation of each sub-series against a reference aggregate,
//! bucketed into five relatedness classes. Only bins carrying documents in
//! both series are paired.

use std::time::Instant;

use crate::messages::{CorrelationInput, CorrelationOutput};
use crate::types::{BucketTally, CorrelationBucket, Relatedness};
use nlgkernel_core::{
    domain::Domain,
    error::{KernelError, Result},
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};

// ============================================================================
// Correlation Classifier Kernel
// ============================================================================

/// Correlation classifier kernel.
#[derive(Debug, Clone)]
pub struct CorrelationClassifier {
    metadata: KernelMetadata,
}

impl Default for CorrelationClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrelationClassifier {
    /// Create a new correlation classifier kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch(
                "comparative/correlation-buckets",
                Domain::ComparativeAnalysis,
            )
            .with_description("Pearson relatedness of sub-series against a reference"),
        }
    }

    /// Correlate `series` with `reference`, pairing bins nonzero in both.
    pub fn compute(series: &[f64], reference: &[f64]) -> Result<Relatedness> {
        let keep: Vec<bool> = series
            .iter()
            .zip(reference)
            .map(|(&a, &b)| a != 0.0 && b != 0.0)
            .collect();
        Self::compute_masked(series, reference, &keep)
    }

    /// Correlate `series` with `reference` over the bins where `keep` is set.
    ///
    /// Used for sentiment series, whose support comes from the matching
    /// document counts rather than the values themselves.
    pub fn compute_masked(
        series: &[f64],
        reference: &[f64],
        keep: &[bool],
    ) -> Result<Relatedness> {
        if series.len() != reference.len() || series.len() != keep.len() {
            return Err(KernelError::validation(format!(
                "correlated series differ in length: {}, {} and mask {}",
                series.len(),
                reference.len(),
                keep.len()
            )));
        }

        let (xs, ys): (Vec<f64>, Vec<f64>) = series
            .iter()
            .zip(reference)
            .zip(keep)
            .filter(|(_, &k)| k)
            .map(|((&x, &y), _)| (x, y))
            .unzip();

        let relatedness = match pearson(&xs, &ys) {
            Some(r) => Relatedness {
                coefficient: Some(r),
                bucket: Some(CorrelationBucket::classify(r)),
                pairs: xs.len(),
            },
            None => {
                tracing::warn!(pairs = xs.len(), "Correlation undefined; no bucket assigned");
                Relatedness::indeterminate(xs.len())
            }
        };

        Ok(relatedness)
    }

    /// Correlate every sub-series against the reference and group by bucket.
    pub fn classify_all(
        series: &[Vec<f64>],
        reference: &[f64],
    ) -> Result<(Vec<Relatedness>, BucketTally)> {
        let results = series
            .iter()
            .map(|s| Self::compute(s, reference))
            .collect::<Result<Vec<_>>>()?;
        let tally = BucketTally::tally(&results);
        Ok((results, tally))
    }
}

/// Pearson coefficient clamped to [-1, 1].
///
/// `None` with fewer than two pairs or zero variance in either series.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }

    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

impl Kernel for CorrelationClassifier {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

impl BatchKernel<CorrelationInput, CorrelationOutput> for CorrelationClassifier {
    fn execute(&self, input: CorrelationInput) -> Result<CorrelationOutput> {
        let start = Instant::now();
        let (results, tally) = Self::classify_all(&input.series, &input.reference)?;
        Ok(CorrelationOutput {
            results,
            tally,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }
}
