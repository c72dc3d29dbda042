use std::collections::BTreeMap;
use std::time::Duration;

use http::HeaderName;
use serde::Deserialize;

use crate::errors::ConfigError;

use super::types::{
    BackendConfig, BackendKind, DEFAULT_COLLECTION_NAME, DEFAULT_COOKIE_NAME,
    DEFAULT_POSTGRES_DESCRIPTOR, DEFAULT_REDIRECT_TARGET, DEFAULT_REDIS_HOST, DEFAULT_REDIS_PORT,
    GateConfig,
};

/// Raw gate settings as declared on one scope.
///
/// Every field is optional: `None` means "not set here" and is filled from the
/// parent scope by [`GateSettings::inherit`], then from the built-in defaults by
/// [`GateSettings::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateSettings {
    pub enabled: Option<bool>,
    pub backend: Option<BackendKind>,
    /// Postgres connection string (URL or keyword/value). Ignored by the Redis backend.
    pub postgres_descriptor: Option<String>,
    /// Redis host name. Ignored by the Postgres backend.
    pub redis_host: Option<String>,
    /// Redis port. Ignored by the Postgres backend.
    pub backend_port: Option<u16>,
    /// Postgres table or view holding sessions. Ignored by the Redis backend.
    pub collection_name: Option<String>,
    pub cookie_name: Option<String>,
    pub redirect_target: Option<String>,
    pub identity_header: Option<String>,
    pub backend_timeout_ms: Option<u64>,
}

impl GateSettings {
    /// Merge these (child) settings over `parent`. A field set on the child
    /// always wins; unset fields take the parent's value, set or not.
    pub fn inherit(&self, parent: &GateSettings) -> GateSettings {
        GateSettings {
            enabled: self.enabled.or(parent.enabled),
            backend: self.backend.or(parent.backend),
            postgres_descriptor: self
                .postgres_descriptor
                .clone()
                .or_else(|| parent.postgres_descriptor.clone()),
            redis_host: self
                .redis_host
                .clone()
                .or_else(|| parent.redis_host.clone()),
            backend_port: self.backend_port.or(parent.backend_port),
            collection_name: self
                .collection_name
                .clone()
                .or_else(|| parent.collection_name.clone()),
            cookie_name: self
                .cookie_name
                .clone()
                .or_else(|| parent.cookie_name.clone()),
            redirect_target: self
                .redirect_target
                .clone()
                .or_else(|| parent.redirect_target.clone()),
            identity_header: self
                .identity_header
                .clone()
                .or_else(|| parent.identity_header.clone()),
            backend_timeout_ms: self.backend_timeout_ms.or(parent.backend_timeout_ms),
        }
    }

    /// Collapse to a fully populated [`GateConfig`], substituting defaults for
    /// anything still unset.
    ///
    /// Only primitive well-formedness is checked here. Whether the backend is
    /// reachable or the redirect target is a sensible URL is left to request time.
    pub fn resolve(&self) -> Result<GateConfig, ConfigError> {
        let backend = match self.backend.unwrap_or_default() {
            BackendKind::Postgres => {
                let collection_name = self
                    .collection_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COLLECTION_NAME.to_string());
                validate_collection_name(&collection_name)?;

                BackendConfig::Postgres {
                    descriptor: self
                        .postgres_descriptor
                        .clone()
                        .unwrap_or_else(|| DEFAULT_POSTGRES_DESCRIPTOR.to_string()),
                    collection_name,
                }
            }
            BackendKind::Redis => BackendConfig::Redis {
                host: self
                    .redis_host
                    .clone()
                    .unwrap_or_else(|| DEFAULT_REDIS_HOST.to_string()),
                port: self.backend_port.unwrap_or(DEFAULT_REDIS_PORT),
            },
        };

        let identity_header = self
            .identity_header
            .as_deref()
            .map(|name| {
                HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| ConfigError::InvalidHeaderName(name.to_string()))
            })
            .transpose()?;

        Ok(GateConfig {
            enabled: self.enabled.unwrap_or(false),
            backend,
            cookie_name: self
                .cookie_name
                .clone()
                .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
            redirect_target: self
                .redirect_target
                .clone()
                .unwrap_or_else(|| DEFAULT_REDIRECT_TARGET.to_string()),
            identity_header,
            backend_timeout: backend_timeout(self.backend_timeout_ms)?,
        })
    }
}

// A zero deadline would fail every enabled request.
fn backend_timeout(ms: Option<u64>) -> Result<Option<Duration>, ConfigError> {
    match ms {
        Some(0) => Err(ConfigError::InvalidTimeout("0".to_string())),
        ms => Ok(ms.map(Duration::from_millis)),
    }
}

/// Parse a JSON object mapping path prefixes to per-location settings.
///
/// ```json
/// { "/admin": { "cookie_name": "admin_session" }, "/public": { "enabled": false } }
/// ```
pub fn locations_from_json(json: &str) -> Result<BTreeMap<String, GateSettings>, ConfigError> {
    Ok(serde_json::from_str(json)?)
}

/// Accepts `name` or `schema.name`, each part a plain SQL identifier.
pub(crate) fn validate_collection_name(name: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 || parts.iter().any(|part| !is_identifier(part)) {
        return Err(ConfigError::InvalidCollectionName(name.to_string()));
    }
    Ok(())
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    part.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
