//! Error types for the Xyston library.
//!
//! All fallible operations in this crate return [`Result`], whose error type
//! is the [`XystonError`] enum. The variants distinguish the failure classes
//! a caller needs to tell apart: readiness failures are retryable once the
//! index finishes building, while metric, parameter, and bitset failures
//! indicate a configuration or caller bug.

use anyhow;
use thiserror::Error;

/// The main error type for Xyston operations.
#[derive(Error, Debug)]
pub enum XystonError {
    /// The target field has no queryable index yet.
    #[error("Index not ready: {0}")]
    IndexNotReady(String),

    /// Requested metric type does not match the index's configured metric.
    #[error("Metric mismatch: {0}")]
    MetricMismatch(String),

    /// Search parameter map rejected by the index-type adapter.
    #[error("Parameter validation failed: {0}")]
    ParameterValidation(String),

    /// A chunked bitset violated the assembler's layout contract.
    #[error("Bitset contract violation: {0}")]
    BitsetContract(String),

    /// Schema-related errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// Index collaborator misbehavior (e.g. short query output)
    #[error("Index error: {0}")]
    Index(String),

    /// Invalid argument supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with XystonError.
pub type Result<T> = std::result::Result<T, XystonError>;

impl XystonError {
    /// Create a new index-not-ready error.
    pub fn not_ready<S: Into<String>>(msg: S) -> Self {
        XystonError::IndexNotReady(msg.into())
    }

    /// Create a new metric-mismatch error.
    pub fn metric_mismatch<S: Into<String>>(msg: S) -> Self {
        XystonError::MetricMismatch(msg.into())
    }

    /// Create a new parameter-validation error.
    pub fn param_validation<S: Into<String>>(msg: S) -> Self {
        XystonError::ParameterValidation(msg.into())
    }

    /// Create a new bitset-contract error.
    pub fn bitset_contract<S: Into<String>>(msg: S) -> Self {
        XystonError::BitsetContract(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        XystonError::Schema(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        XystonError::Index(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        XystonError::InvalidArgument(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        XystonError::Other(msg.into())
    }
}
