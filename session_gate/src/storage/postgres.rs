use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};

use crate::errors::ConfigError;

use super::conninfo::{parse_descriptor, redact_descriptor};
use super::errors::StorageError;
use super::types::{SessionToken, SessionValidator, ValidationOutcome};

/// Validates tokens against a Postgres table of sessions with an expiry column.
///
/// Each check opens its own connection and closes it before returning; pooling
/// is left to whatever sits in front of Postgres.
#[derive(Clone, Debug)]
pub struct PostgresSessionStore {
    options: PgConnectOptions,
    query: String,
    backend: String,
}

impl PostgresSessionStore {
    pub fn new(descriptor: &str, collection_name: &str) -> Result<Self, ConfigError> {
        crate::config::validate_collection_name(collection_name)?;

        Ok(Self {
            options: parse_descriptor(descriptor)?,
            query: session_query(collection_name),
            backend: redact_descriptor(descriptor),
        })
    }
}

// The token is bound as text; the cast lets `session_key` be uuid, varchar or any
// other type with a text form.
fn session_query(collection_name: &str) -> String {
    format!(
        r#"SELECT username FROM {} WHERE session_key::text = $1 AND expiry > now() LIMIT 1"#,
        quote_identifier(collection_name)
    )
}

/// `auth.sessions` -> `"auth"."sessions"`. Callers validate the name first.
fn quote_identifier(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{part}\""))
        .collect::<Vec<_>>()
        .join(".")
}

#[async_trait]
impl SessionValidator for PostgresSessionStore {
    fn describe(&self) -> String {
        self.backend.clone()
    }

    async fn validate(&self, token: &SessionToken) -> ValidationOutcome {
        // A non-UTF-8 token can never equal a text session key.
        let Some(session_key) = token.as_str() else {
            tracing::debug!("Session token is not valid UTF-8");
            return ValidationOutcome::Invalid;
        };

        let mut conn = match PgConnection::connect_with(&self.options).await {
            Ok(conn) => conn,
            Err(e) => {
                return ValidationOutcome::BackendError(StorageError::unreachable(
                    &self.backend,
                    e,
                ));
            }
        };

        let result = sqlx::query_scalar::<_, Option<String>>(&self.query)
            .bind(session_key)
            .fetch_optional(&mut conn)
            .await;

        // The username is already an owned String here, so it outlives the connection.
        if let Err(e) = conn.close().await {
            tracing::debug!(backend = %self.backend, error = %e, "Failed to close backend connection cleanly");
        }

        match result {
            Ok(Some(identity)) => ValidationOutcome::Valid { identity },
            Ok(None) => ValidationOutcome::Invalid,
            Err(e) => ValidationOutcome::BackendError(StorageError::query(&self.backend, e)),
        }
    }
}
