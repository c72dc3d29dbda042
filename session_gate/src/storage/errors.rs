use thiserror::Error;

/// Per-request backend failure. Each variant names the backend it came from
/// (with credentials redacted) so the log line is actionable on its own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("error connecting to backend server {backend}: {message}")]
    Unreachable { backend: String, message: String },

    #[error("error querying backend server {backend}: {message}")]
    Query { backend: String, message: String },

    #[error("backend server {backend} did not answer within {timeout_ms}ms")]
    Timeout { backend: String, timeout_ms: u128 },
}

impl StorageError {
    pub(crate) fn unreachable(backend: &str, err: impl std::fmt::Display) -> Self {
        Self::Unreachable {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn query(backend: &str, err: impl std::fmt::Display) -> Self {
        Self::Query {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }
}
