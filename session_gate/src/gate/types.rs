use std::fmt;
use std::sync::Arc;

use http::StatusCode;

use crate::config::{GateConfig, GateSettings};
use crate::errors::ConfigError;
use crate::storage::{SessionBackend, SessionValidator};

/// What the host server should do with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Hand the request on to the next phase untouched.
    Continue { identity: Option<String> },
    /// Send the client to the login location.
    Redirect { status: StatusCode, location: String },
    /// The session store could not answer.
    ServerError(StatusCode),
}

/// A resolved scope: its configuration plus the session store it checks.
///
/// Cheap to clone; every request in the scope shares the same instance.
#[derive(Clone)]
pub struct GateScope {
    config: Arc<GateConfig>,
    validator: Arc<dyn SessionValidator>,
}

impl GateScope {
    /// Resolve raw settings and build the configured backend.
    pub fn from_settings(settings: &GateSettings) -> Result<Self, ConfigError> {
        Self::from_config(settings.resolve()?)
    }

    pub fn from_config(config: GateConfig) -> Result<Self, ConfigError> {
        let backend = SessionBackend::from_config(&config.backend)?;

        tracing::info!(
            enabled = config.enabled,
            backend = %backend.describe(),
            cookie = %config.cookie_name,
            redirect = %config.redirect_target,
            "Resolved session gate scope"
        );

        Ok(Self::with_validator(config, backend))
    }

    /// Use a caller-supplied validator instead of the configured backend.
    pub fn with_validator(config: GateConfig, validator: impl SessionValidator) -> Self {
        Self {
            config: Arc::new(config),
            validator: Arc::new(validator),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn validator(&self) -> &dyn SessionValidator {
        self.validator.as_ref()
    }
}

impl fmt::Debug for GateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The raw backend descriptor may carry a password, so only the
        // validator's redacted description is shown.
        f.debug_struct("GateScope")
            .field("enabled", &self.config.enabled)
            .field("backend", &self.validator.describe())
            .field("cookie_name", &self.config.cookie_name)
            .field("redirect_target", &self.config.redirect_target)
            .field("identity_header", &self.config.identity_header)
            .field("backend_timeout", &self.config.backend_timeout)
            .finish()
    }
}
