//! Error types for sqlcontainer

use thiserror::Error;

/// Core error type for sqlcontainer operations
#[derive(Error, Debug)]
pub enum SqlContainerError {
    /// A mandatory setting is missing or a sizing rule is violated.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Opening a physical connection failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Every connection is reserved and the pool is at its maximum size.
    #[error("Connection pool exhausted: all {max_size} connections are reserved")]
    PoolExhausted { max_size: usize },

    #[error("Query error: {0}")]
    Query(String),

    /// The filter compiler was handed a node it cannot render.
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl SqlContainerError {
    /// Whether the caller should back off and retry rather than treat this as a bug.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SqlContainerError::PoolExhausted { .. } | SqlContainerError::Connection(_)
        )
    }
}

/// Result type alias for sqlcontainer operations
pub type Result<T> = std::result::Result<T, SqlContainerError>;
