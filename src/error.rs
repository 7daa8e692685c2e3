//! Error taxonomy shared by ingestion, aggregation and retrieval.

use thiserror::Error;

/// Feature store error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureStoreError {
    /// Malformed or empty caller-supplied data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Required field or column absent, or incompatible key types
    #[error("Schema error: {0}")]
    Schema(String),

    /// Retrieval attempted before the simulator was initialized
    #[error("Not initialized: {0}")]
    NotInitialized(String),
}

impl FeatureStoreError {
    /// Stable machine-readable kind, used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FeatureStoreError::InvalidInput(_) => "invalid_input",
            FeatureStoreError::Schema(_) => "schema",
            FeatureStoreError::NotInitialized(_) => "not_initialized",
        }
    }
}

/// Result type for feature store operations
pub type Result<T> = std::result::Result<T, FeatureStoreError>;
