use std::str::FromStr;
use std::time::Duration;

use http::HeaderName;
use serde::Deserialize;

use crate::errors::ConfigError;

pub const DEFAULT_COOKIE_NAME: &str = "ra_cookie";
pub const DEFAULT_REDIRECT_TARGET: &str = "/auth";
pub const DEFAULT_POSTGRES_DESCRIPTOR: &str = "dbname = auth";
pub const DEFAULT_COLLECTION_NAME: &str = "sessions";
pub const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Which session store a scope validates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Row lookup with an expiry check.
    #[default]
    Postgres,
    /// Key presence only.
    Redis,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "redis" => Ok(Self::Redis),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Fully resolved backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Postgres {
        descriptor: String,
        collection_name: String,
    },
    Redis {
        host: String,
        port: u16,
    },
}

/// Resolved gate configuration for one scope.
///
/// Built once at startup by [`GateSettings::resolve`](super::GateSettings::resolve)
/// and shared read-only by every request in the scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub enabled: bool,
    pub backend: BackendConfig,
    pub cookie_name: String,
    pub redirect_target: String,
    /// Request header that receives the session's username, if any.
    pub identity_header: Option<HeaderName>,
    /// Deadline for a single backend round trip. `None` waits indefinitely.
    pub backend_timeout: Option<Duration>,
}
