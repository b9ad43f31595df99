//! Observability Infrastructure
//!
//! Structured logging for the narrative engine. Kernels emit `tracing` events
//! at their boundaries:
//!
//! - **debug**: computed verdicts (S, z, p, period, bucket)
//! - **warn**: indeterminate statistics and the fallback label chosen
//! - **info**: report start and finish

pub mod logging;

pub use logging::{LogConfig, LogLevel};
