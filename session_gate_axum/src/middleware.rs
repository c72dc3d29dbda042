use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::HeaderValue;

use ::session_gate::{GateDecision, GateScope, apply_redirect, evaluate};

use super::session::SessionIdentity;

/// Session gate middleware.
///
/// Install per scope with `from_fn_with_state`:
///
/// ```no_run
/// use axum::{Router, middleware::from_fn_with_state, routing::get};
/// use session_gate_axum::{GateScope, GateSettings, session_gate};
///
/// # fn build() -> Result<Router, session_gate_axum::ConfigError> {
/// let scope = GateScope::from_settings(&GateSettings::from_env()?)?;
/// let app: Router = Router::new()
///     .route("/private", get(|| async { "secret" }))
///     .route_layer(from_fn_with_state(scope, session_gate));
/// # Ok(app)
/// # }
/// ```
pub async fn session_gate(State(scope): State<GateScope>, mut req: Request, next: Next) -> Response {
    let decision = evaluate(&scope, req.headers(), req.version()).await;

    match decision {
        GateDecision::Continue { identity } => {
            attach_identity(&scope, &mut req, identity);
            next.run(req).await
        }
        GateDecision::Redirect { status, location } => redirect_response(status, &location),
        GateDecision::ServerError(status) => status.into_response(),
    }
}

// Helper function to expose the session's username to the handler
fn attach_identity(scope: &GateScope, req: &mut Request, identity: Option<String>) {
    let header_name = scope.config().identity_header.as_ref();

    // Never trust a client-supplied copy of the identity header
    if let Some(name) = header_name {
        req.headers_mut().remove(name);
    }

    let Some(username) = identity else {
        return;
    };

    if let Some(name) = header_name {
        match HeaderValue::from_str(&username) {
            Ok(value) => {
                req.headers_mut().insert(name.clone(), value);
            }
            Err(e) => {
                tracing::warn!("Username cannot be sent as header {}: {}", name, e);
            }
        }
    }

    req.extensions_mut().insert(SessionIdentity { username });
}

fn redirect_response(status: StatusCode, location: &str) -> Response {
    let mut response = Response::new(Body::empty());
    match apply_redirect(&mut response, status, location) {
        Ok(()) => response,
        Err(e) => {
            tracing::error!("Failed to build redirect response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
