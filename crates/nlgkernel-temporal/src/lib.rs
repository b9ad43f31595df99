//! # NlgKernel Temporal Analysis
//!
//! Temporal kernels that turn binned series into trend and periodicity
//! verdicts and calendar phrases.
//!
//! ## Kernels
//!
//! ### Trend (1 kernel)
//! - `MannKendall` - Nonparametric monotonic trend test
//!
//! ### Periodicity (3 kernels)
//! - `PeriodogramKernel` - One-sided periodogram, dominant period
//! - `SeasonalDecomposition` - Additive moving-average decomposition
//! - `PeriodicityAnalysis` - Period, seasonal amplitude and deseasonalized trend
//!
//! ### Calendar (1 kernel)
//! - `TimeLabelTranslator` - Epoch timestamps to calendar phrases

#![warn(missing_docs)]

pub mod decomposition;
pub mod messages;
pub mod periodicity;
pub mod spectral;
pub mod timelabel;
pub mod trend;
pub mod types;

pub use decomposition::SeasonalDecomposition;
pub use periodicity::{PeriodicityAnalysis, DEFAULT_EXPLORATORY_ALPHA};
pub use spectral::PeriodogramKernel;
pub use timelabel::TimeLabelTranslator;
pub use trend::{MannKendall, DEFAULT_ALPHA};
pub use types::*;

use nlgkernel_core::{error::Result, registry::KernelRegistry, traits::Kernel};

/// Register all temporal kernels.
pub fn register_all(registry: &mut KernelRegistry) -> Result<()> {
    tracing::info!("Registering temporal analysis kernels");

    registry.register(MannKendall::new().metadata().clone())?;
    registry.register(PeriodogramKernel::new().metadata().clone())?;
    registry.register(SeasonalDecomposition::new().metadata().clone())?;
    registry.register(PeriodicityAnalysis::new().metadata().clone())?;
    registry.register(TimeLabelTranslator::new().metadata().clone())?;

    Ok(())
}

/// Number of kernels `register_all` adds.
pub const KERNEL_COUNT: usize = 5;
