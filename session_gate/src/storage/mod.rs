mod conninfo;
mod errors;
mod postgres;
mod redis;
mod types;

use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::errors::ConfigError;

pub use errors::StorageError;
pub use self::postgres::PostgresSessionStore;
pub use self::redis::RedisSessionStore;
pub use types::{SessionToken, SessionValidator, ValidationOutcome};

/// The two built-in session stores, chosen per scope from its [`BackendConfig`].
#[derive(Clone, Debug)]
pub enum SessionBackend {
    Postgres(PostgresSessionStore),
    Redis(RedisSessionStore),
}

impl SessionBackend {
    pub fn from_config(config: &BackendConfig) -> Result<Self, ConfigError> {
        match config {
            BackendConfig::Postgres {
                descriptor,
                collection_name,
            } => Ok(Self::Postgres(PostgresSessionStore::new(
                descriptor,
                collection_name,
            )?)),
            BackendConfig::Redis { host, port } => {
                Ok(Self::Redis(RedisSessionStore::new(host, *port)?))
            }
        }
    }
}

#[async_trait]
impl SessionValidator for SessionBackend {
    fn describe(&self) -> String {
        match self {
            Self::Postgres(store) => store.describe(),
            Self::Redis(store) => store.describe(),
        }
    }

    async fn validate(&self, token: &SessionToken) -> ValidationOutcome {
        match self {
            Self::Postgres(store) => store.validate(token).await,
            Self::Redis(store) => store.validate(token).await,
        }
    }
}
