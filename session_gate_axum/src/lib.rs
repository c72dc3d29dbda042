//! session-gate-axum - axum middleware for the session gate
//!
//! Wraps routes with [`session_gate`], which runs the gate before the handler and
//! either forwards the request, redirects to the scope's login location, or
//! answers 500 when the session store is unavailable.

mod middleware;
mod session;

pub use middleware::session_gate;
pub use session::SessionIdentity;

// Re-export what callers need to build scopes
pub use ::session_gate::{ConfigError, GateScope, GateSettings, locations_from_json};
