use async_trait::async_trait;
use redis::Value;

use crate::errors::ConfigError;

use super::errors::StorageError;
use super::types::{SessionToken, SessionValidator, ValidationOutcome};

/// Validates tokens by key presence in Redis.
///
/// There is no expiry check here: a key that exists grants access. Expiry has
/// to be enforced by whoever writes the key, typically with a TTL.
#[derive(Clone, Debug)]
pub struct RedisSessionStore {
    client: redis::Client,
    backend: String,
}

impl RedisSessionStore {
    pub fn new(host: &str, port: u16) -> Result<Self, ConfigError> {
        let client = redis::Client::open((host.to_string(), port)).map_err(|e| {
            ConfigError::InvalidDescriptor(format!("redis backend {host}:{port}: {e}"))
        })?;

        Ok(Self {
            client,
            backend: format!("{host}:{port}"),
        })
    }
}

#[async_trait]
impl SessionValidator for RedisSessionStore {
    fn describe(&self) -> String {
        self.backend.clone()
    }

    async fn validate(&self, token: &SessionToken) -> ValidationOutcome {
        // Dropped at the end of this call, which shuts the connection down.
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                return ValidationOutcome::BackendError(StorageError::unreachable(
                    &self.backend,
                    e,
                ));
            }
        };

        let reply: redis::RedisResult<Value> = redis::cmd("EXISTS")
            .arg(token.as_bytes())
            .query_async(&mut conn)
            .await;

        exists_outcome(reply, &self.backend)
    }
}

fn exists_outcome(reply: redis::RedisResult<Value>, backend: &str) -> ValidationOutcome {
    match reply {
        Ok(Value::Int(1)) => ValidationOutcome::Valid { identity: None },
        Ok(_) => ValidationOutcome::Invalid,
        Err(e) => ValidationOutcome::BackendError(StorageError::query(backend, e)),
    }
}
