//! Spectral analysis kernels.
//!
//! This module provides the periodogram used for period detection:
//! constant detrend, boxcar window, density scaling at unit sampling rate,
//! one-sided spectrum.

use std::time::Instant;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::messages::{PeriodogramInput, PeriodogramOutput};
use crate::types::{mean, Periodogram};
use nlgkernel_core::{
    domain::Domain,
    error::{KernelError, Result},
    kernel::KernelMetadata,
    traits::{BatchKernel, Kernel},
};

/// Shortest series the period detector accepts.
pub const MIN_PERIODOGRAM_LEN: usize = 4;

// ============================================================================
// Periodogram Kernel
// ============================================================================

/// Periodogram kernel.
///
/// Estimates the power spectral density of a series and picks its dominant
/// period.
#[derive(Debug, Clone)]
pub struct PeriodogramKernel {
    metadata: KernelMetadata,
}

impl Default for PeriodogramKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodogramKernel {
    /// Create a new periodogram kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("temporal/periodogram", Domain::TemporalAnalysis)
                .with_description("One-sided periodogram and dominant period selection"),
        }
    }

    /// Compute the one-sided periodogram of `series`.
    pub fn compute(series: &[f64]) -> Result<Periodogram> {
        let n = series.len();
        if n < 2 {
            return Err(KernelError::insufficient(2, n));
        }

        let level = mean(series);
        let mut buffer: Vec<Complex<f64>> = series
            .iter()
            .map(|&x| Complex::new(x - level, 0.0))
            .collect();

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        let half = n / 2;
        let scale = 1.0 / n as f64;
        let mut frequencies = Vec::with_capacity(half + 1);
        let mut power = Vec::with_capacity(half + 1);

        for (k, value) in buffer.iter().take(half + 1).enumerate() {
            let mut p = value.norm_sqr() * scale;
            // Fold the negative frequencies in; DC and an even-length Nyquist have no mirror.
            let is_nyquist = n % 2 == 0 && k == half;
            if k != 0 && !is_nyquist {
                p *= 2.0;
            }
            frequencies.push(k as f64 / n as f64);
            power.push(p);
        }

        Ok(Periodogram {
            frequencies,
            power,
            n,
        })
    }

    /// Pick the dominant period of `series`, in bins.
    ///
    /// Frequencies whose period `round(1/f)` reaches the series length (DC
    /// included) are discarded before the maximum is taken. The first maximum
    /// wins ties.
    pub fn dominant_period(series: &[f64]) -> Result<usize> {
        let n = series.len();
        if n < MIN_PERIODOGRAM_LEN {
            return Err(KernelError::insufficient(MIN_PERIODOGRAM_LEN, n));
        }

        let periodogram = Self::compute(series)?;
        let mut best: Option<(usize, f64)> = None;

        for (&f, &p) in periodogram.frequencies.iter().zip(&periodogram.power) {
            let Some(period) = period_of(f) else {
                continue;
            };
            if period >= n {
                continue;
            }
            match best {
                Some((_, bp)) if p <= bp => {}
                _ => best = Some((period, p)),
            }
        }

        match best {
            Some((period, p)) if p > 0.0 => {
                tracing::debug!(n, period, power = p, "Dominant period selected");
                Ok(period)
            }
            _ => Err(KernelError::indeterminate(
                "no spectral peak shorter than the series",
            )),
        }
    }
}

/// Period in bins for a frequency in cycles per bin; `None` at DC.
fn period_of(frequency: f64) -> Option<usize> {
    if frequency <= 0.0 {
        return None;
    }
    Some((1.0 / frequency).round_ties_even() as usize)
}

impl Kernel for PeriodogramKernel {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

impl BatchKernel<PeriodogramInput, PeriodogramOutput> for PeriodogramKernel {
    fn execute(&self, input: PeriodogramInput) -> Result<PeriodogramOutput> {
        let start = Instant::now();
        let periodogram = Self::compute(&input.series.values)?;
        let dominant_period = match Self::dominant_period(&input.series.values) {
            Ok(period) => Some(period),
            Err(e) if e.is_recoverable() => None,
            Err(e) => return Err(e),
        };
        Ok(PeriodogramOutput {
            periodogram,
            dominant_period,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }
}
