use std::env;

use crate::errors::ConfigError;

use super::settings::GateSettings;
use super::types::BackendKind;

/// Prefix for the root scope's environment variables, e.g. `SESSION_GATE_ENABLE`.
pub const DEFAULT_ENV_PREFIX: &str = "SESSION_GATE_";

impl GateSettings {
    /// Read root-scope settings from `SESSION_GATE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Read settings from environment variables named `{prefix}{KEY}`.
    ///
    /// Recognised keys: `ENABLE`, `BACKEND`, `BACKEND_OPTS`, `BACKEND_PORT`,
    /// `TABLE_NAME`, `COOKIE`, `REDIRECT`, `IDENTITY_HEADER`,
    /// `BACKEND_TIMEOUT_MS`. Variables that are missing or blank stay unset.
    ///
    /// `BACKEND_OPTS` belongs to the backend named by `BACKEND` (Postgres when
    /// unset): a connection string for Postgres, a host name for Redis.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(prefix, |key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        prefix: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |suffix: &str| {
            let key = format!("{prefix}{suffix}");
            let value = lookup(&key).filter(|v| !v.trim().is_empty());
            (key, value)
        };

        let enabled = match get("ENABLE") {
            (key, Some(value)) => Some(parse_flag(&key, &value)?),
            (_, None) => None,
        };

        let backend = get("BACKEND")
            .1
            .map(|v| v.parse::<BackendKind>())
            .transpose()?;

        let backend_port = get("BACKEND_PORT")
            .1
            .map(|v| {
                v.trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort(v.clone()))
            })
            .transpose()?;

        let backend_timeout_ms = get("BACKEND_TIMEOUT_MS")
            .1
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(v.clone()))
            })
            .transpose()?;

        let backend_opts = get("BACKEND_OPTS").1;
        let (postgres_descriptor, redis_host) = match backend.unwrap_or_default() {
            BackendKind::Postgres => (backend_opts, None),
            BackendKind::Redis => (None, backend_opts),
        };

        let settings = GateSettings {
            enabled,
            backend,
            postgres_descriptor,
            redis_host,
            backend_port,
            collection_name: get("TABLE_NAME").1,
            cookie_name: get("COOKIE").1,
            redirect_target: get("REDIRECT").1,
            identity_header: get("IDENTITY_HEADER").1,
            backend_timeout_ms,
        };

        // The descriptor may carry a password; it is logged once resolved and redacted.
        tracing::debug!(
            prefix,
            enabled = ?settings.enabled,
            backend = ?settings.backend,
            cookie = ?settings.cookie_name,
            redirect = ?settings.redirect_target,
            "Loaded gate settings from environment"
        );
        Ok(settings)
    }
}

/// Parse an on/off flag the way server configuration files spell them.
pub(crate) fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
