//! Error types for NlgKernels.

use thiserror::Error;

/// Result type alias using `KernelError`.
pub type Result<T> = std::result::Result<T, KernelError>;

/// Errors that can occur during kernel operations.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Kernel not found in registry.
    #[error("Kernel not found: {0}")]
    KernelNotFound(String),

    /// Kernel already registered.
    #[error("Kernel already registered: {0}")]
    KernelAlreadyRegistered(String),

    /// Input validation failed (malformed record, bad parameter).
    #[error("Input validation failed: {0}")]
    ValidationError(String),

    /// Not enough observations for the requested statistic.
    #[error("Insufficient data: need at least {needed} observations, got {actual}")]
    InsufficientData {
        /// Minimum number of observations required.
        needed: usize,
        /// Number of observations supplied.
        actual: usize,
    },

    /// The statistic is mathematically undefined for this input.
    #[error("Indeterminate statistic: {0}")]
    Indeterminate(String),

    /// Timestamp outside the representable calendar range.
    #[error("Invalid timestamp: {0} ms")]
    InvalidTimestamp(i64),

    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    DeserializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl KernelError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        KernelError::ValidationError(msg.into())
    }

    /// Create an indeterminate-statistic error.
    #[must_use]
    pub fn indeterminate(msg: impl Into<String>) -> Self {
        KernelError::Indeterminate(msg.into())
    }

    /// Create an insufficient-data error.
    #[must_use]
    pub fn insufficient(needed: usize, actual: usize) -> Self {
        KernelError::InsufficientData { needed, actual }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        KernelError::InternalError(msg.into())
    }

    /// Create a kernel not found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        KernelError::KernelNotFound(id.into())
    }

    /// Returns true if the report can recover with a fallback label.
    ///
    /// Degenerate statistics are recovered locally; anything else aborts the
    /// record being processed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            KernelError::Indeterminate(_) | KernelError::InsufficientData { .. }
        )
    }

    /// Returns true if this is an undefined-statistic condition.
    #[must_use]
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, KernelError::Indeterminate(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(KernelError::indeterminate("constant series").is_recoverable());
        assert!(KernelError::insufficient(4, 2).is_recoverable());
        assert!(!KernelError::validation("missing bins").is_recoverable());
        assert!(!KernelError::internal("boom").is_recoverable());
    }

    #[test]
    fn test_error_messages() {
        let err = KernelError::insufficient(4, 2);
        assert_eq!(
            err.to_string(),
            "Insufficient data: need at least 4 observations, got 2"
        );
        assert!(KernelError::indeterminate("x").is_indeterminate());
        assert!(!KernelError::insufficient(2, 1).is_indeterminate());
    }

    #[test]
    fn test_from_serde_json() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: KernelError = parse.unwrap_err().into();
        assert!(matches!(err, KernelError::DeserializationError(_)));
    }
}
