use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{StatusCode, request::Parts},
};

/// Username of the session that passed the gate.
///
/// Only present when the scope's store records one (the Postgres backend).
/// Request it as an extractor in a handler behind [`session_gate`](crate::session_gate):
///
/// ```no_run
/// use session_gate_axum::SessionIdentity;
///
/// async fn whoami(identity: Option<SessionIdentity>) -> String {
///     identity.map_or_else(|| "anonymous session".to_string(), |id| id.username)
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionIdentity {
    pub username: String,
}

impl<S> FromRequestParts<S> for SessionIdentity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionIdentity>()
            .cloned()
            .ok_or_else(|| {
                tracing::debug!("No session identity on request");
                (StatusCode::UNAUTHORIZED, "Unauthorized")
            })
    }
}

impl<S> OptionalFromRequestParts<S> for SessionIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<SessionIdentity>().cloned())
    }
}
