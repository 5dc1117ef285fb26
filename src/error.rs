//! Error types for soma-validation
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

use crate::capability::Capability;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Validation error types
///
/// None of these are ever turned into a score: a failing stage aborts the
/// run and the error is handed back to the caller unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// Observation does not have the `{mean, std}` shape
    #[error("Observation error: {0}")]
    Observation(String),

    /// Model lacks a capability the test requires
    #[error("Model '{model}' cannot run '{test}': missing capabilities {capabilities:?}")]
    MissingCapability {
        /// Test display name
        test: String,
        /// Model display name
        model: String,
        /// Capabilities the model does not provide
        capabilities: Vec<Capability>,
    },

    /// Trace violates its shape invariants
    #[error("Invalid trace: {0}")]
    InvalidTrace(String),

    /// Feature extractor could not compute a feature for a trace
    #[error("Feature '{feature}' unavailable: {reason}")]
    FeatureUnavailable {
        /// Requested feature name
        feature: String,
        /// Why the value could not be computed
        reason: String,
    },

    /// Feature name not known to the extractor
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// Setting name not known to the extractor
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    /// Plot rendering failed
    #[error("Plot error: {0}")]
    Plot(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
