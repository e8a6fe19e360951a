//! Error types for storelens

use thiserror::Error;

/// Result type alias using StoreLensError
pub type Result<T> = std::result::Result<T, StoreLensError>;

/// Error type alias for convenience
pub type Error = StoreLensError;

/// Main error type for storelens
#[derive(Debug, Error)]
pub enum StoreLensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model endpoint unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Model request timed out after {attempts} attempt(s)")]
    ModelTimeout { attempts: u32 },

    #[error("Model response unparseable: {reason}")]
    UnparseableResponse {
        reason: String,
        /// Raw model output preserved for diagnostics
        raw: String,
    },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl StoreLensError {
    /// True when a retry against the model endpoint may succeed.
    ///
    /// Connection failures and timeouts are transient; a well-formed error
    /// response from the endpoint itself is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ModelUnavailable(_) | Self::ModelTimeout { .. } => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
