use thiserror::Error;

/// Malformed scope setting, raised while configuration is being resolved at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid flag value for {key}: '{value}' (expected on/off)")]
    InvalidFlag { key: String, value: String },

    #[error("Invalid backend port: '{0}'")]
    InvalidPort(String),

    #[error("Invalid backend timeout: '{0}'")]
    InvalidTimeout(String),

    #[error("Unsupported backend type: '{0}'. Supported types are 'postgres' and 'redis'")]
    UnknownBackend(String),

    #[error("Invalid table name: '{0}'")]
    InvalidCollectionName(String),

    #[error("Invalid backend descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Invalid identity header name: '{0}'")]
    InvalidHeaderName(String),

    #[error("Invalid scope settings: {0}")]
    Serde(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

/// Failure while turning a gate decision into response headers.
#[derive(Debug, Error, Clone)]
pub enum GateError {
    #[error("Header error: {0}")]
    HeaderError(String),
}
