//! # NlgKernel Core
//!
//! Core abstractions, traits, and registry for the NlgKernels narrative engine.
//!
//! This crate provides:
//! - Domain and kernel type definitions
//! - Kernel metadata
//! - Trait definitions for synchronous batch kernels
//! - Kernel registry
//! - Narrative configuration and structured logging

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod error;
pub mod kernel;
pub mod observability;
pub mod registry;
pub mod traits;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{NarrativeConfig, NarrativeConfigBuilder};
    pub use crate::domain::Domain;
    pub use crate::error::{KernelError, Result};
    pub use crate::kernel::KernelMetadata;
    pub use crate::observability::{LogConfig, LogLevel};
    pub use crate::registry::{KernelRegistry, RegistryStats};
    pub use crate::traits::{BatchKernel, Kernel};
}
