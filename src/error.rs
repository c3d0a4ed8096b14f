//! Custom error types for curator

use thiserror::Error;

/// Main error type for curator operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transient embedding-provider failure (network, rate limit, 5xx).
    /// Eligible for retry with backoff.
    #[error("Embedding provider error: {0}")]
    Provider(String),

    /// Non-retryable embedding-provider failure (bad request, malformed
    /// or mismatched response).
    #[error("Embedding provider fatal error: {0}")]
    ProviderFatal(String),

    /// A persisted JSONL line failed to parse. Readers skip and count
    /// these; they never abort a run.
    #[error("Corrupt record at line {line}: {message}")]
    CorruptRecord { line: usize, message: String },

    /// Query-time failure (query embedding or index call). Aborts the
    /// single query, never the process.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Qdrant error: {0}")]
    Qdrant(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Not initialized: run 'curator init' first")]
    NotInitialized,

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether a retry with backoff may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Provider(_))
    }
}

/// Result type alias for curator
pub type Result<T> = std::result::Result<T, Error>;

/// Convert qdrant errors
impl From<qdrant_client::QdrantError> for Error {
    fn from(err: qdrant_client::QdrantError) -> Self {
        Error::Qdrant(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::Provider("rate limited".to_string()).is_transient());
        assert!(!Error::ProviderFatal("bad request".to_string()).is_transient());
        assert!(!Error::Config("overlap too large".to_string()).is_transient());
        assert!(!Error::Retrieval("query failed".to_string()).is_transient());
    }
}
