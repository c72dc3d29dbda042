use std::fmt;

use async_trait::async_trait;

use super::errors::StorageError;

/// Raw session cookie value. Treated as an opaque credential: it is never
/// parsed, decoded, or written to logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(Vec<u8>);

impl SessionToken {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self(value.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The token as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<{} bytes>)", self.0.len())
    }
}

/// Result of checking one token against a session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The session exists (and, for Postgres, has not expired). `identity` is
    /// the session's username when the store records one.
    Valid { identity: Option<String> },
    Invalid,
    BackendError(StorageError),
}

/// A session store the gate can ask about a token.
///
/// Implementations own their error handling: every backend failure is reported
/// as [`ValidationOutcome::BackendError`], and any connection opened for the
/// check is released before `validate` returns.
#[async_trait]
pub trait SessionValidator: Send + Sync + 'static {
    /// Backend identity for log lines, with credentials removed.
    fn describe(&self) -> String;

    async fn validate(&self, token: &SessionToken) -> ValidationOutcome;
}
