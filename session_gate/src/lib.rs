//! session-gate - request-time session check for HTTP servers
//!
//! Before a request reaches its handler, the gate reads a session token from a
//! named cookie, asks a session store whether the token is live, and answers
//! with one of three decisions: let the request through, redirect the client
//! to a login location, or fail with 500 when the store cannot be reached.
//!
//! Two stores are supported:
//! * Postgres: the token must match `session_key` in a row whose `expiry` is
//!   in the future.
//! * Redis: the token must exist as a key. No expiry is checked.
//!
//! Settings are declared per scope and inherited from enclosing scopes, then
//! resolved once at startup into an immutable [`GateScope`].

mod config;
mod cookie;
mod errors;
mod gate;
mod storage;

#[cfg(test)]
mod test_utils;

pub use config::{
    BackendConfig, BackendKind, DEFAULT_COLLECTION_NAME, DEFAULT_COOKIE_NAME, DEFAULT_ENV_PREFIX,
    DEFAULT_POSTGRES_DESCRIPTOR, DEFAULT_REDIRECT_TARGET, DEFAULT_REDIS_HOST, DEFAULT_REDIS_PORT,
    GateConfig, GateSettings, locations_from_json,
};
pub use cookie::{extract_session_token, find_cookie};
pub use errors::{ConfigError, GateError};
pub use gate::{GateDecision, GateScope, apply_redirect, evaluate, redirect_status};
pub use storage::{
    PostgresSessionStore, RedisSessionStore, SessionBackend, SessionToken, SessionValidator,
    StorageError, ValidationOutcome,
};
