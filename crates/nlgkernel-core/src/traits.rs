//! Core kernel traits.
//!
//! This module defines the traits that all kernels implement:
//! - `Kernel`: Base trait exposing metadata and configuration checks
//! - `BatchKernel`: Trait for synchronous request/response kernels
//!
//! Execution is single-pass and synchronous. A kernel owns no mutable state
//! between calls, so the same instance can serve any number of reports.

use crate::error::Result;
use crate::kernel::KernelMetadata;
use std::fmt::Debug;

// ============================================================================
// Base Kernel Trait
// ============================================================================

/// Base trait for all kernels.
pub trait Kernel: Debug {
    /// Returns the kernel metadata.
    fn metadata(&self) -> &KernelMetadata;

    /// Validate kernel configuration.
    ///
    /// Called before execution to ensure parameters are usable.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Returns the kernel ID.
    fn id(&self) -> &str {
        &self.metadata().id
    }
}

// ============================================================================
// Batch Kernel Trait
// ============================================================================

/// Trait for batch kernels.
///
/// Batch kernels take a typed input message and return a typed output
/// message. Outputs conventionally carry `compute_time_us`.
pub trait BatchKernel<I, O>: Kernel {
    /// Execute the kernel with the given input.
    ///
    /// # Arguments
    ///
    /// * `input` - The input data for the kernel
    ///
    /// # Returns
    ///
    /// The kernel output or an error.
    fn execute(&self, input: I) -> Result<O>;

    /// Validate the input before execution.
    ///
    /// Override to provide custom input validation.
    fn validate_input(&self, _input: &I) -> Result<()> {
        Ok(())
    }

    /// Validate then execute.
    fn run(&self, input: I) -> Result<O> {
        self.validate()?;
        self.validate_input(&input)?;
        self.execute(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use crate::error::KernelError;

    #[derive(Debug)]
    struct Doubler {
        metadata: KernelMetadata,
    }

    impl Kernel for Doubler {
        fn metadata(&self) -> &KernelMetadata {
            &self.metadata
        }
    }

    impl BatchKernel<Vec<f64>, Vec<f64>> for Doubler {
        fn execute(&self, input: Vec<f64>) -> Result<Vec<f64>> {
            Ok(input.into_iter().map(|v| v * 2.0).collect())
        }

        fn validate_input(&self, input: &Vec<f64>) -> Result<()> {
            if input.is_empty() {
                return Err(KernelError::validation("empty input"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_run_validates_then_executes() {
        let kernel = Doubler {
            metadata: KernelMetadata::batch("core/doubler", Domain::Core),
        };
        assert_eq!(kernel.id(), "core/doubler");
        assert_eq!(kernel.run(vec![1.0, 2.5]).unwrap(), vec![2.0, 5.0]);
        assert!(kernel.run(Vec::new()).is_err());
    }
}
