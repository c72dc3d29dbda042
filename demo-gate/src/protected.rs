use axum::{
    Router,
    http::HeaderMap,
    response::{Html, IntoResponse},
    routing::get,
};

use session_gate_axum::SessionIdentity;

pub(super) fn router() -> Router<()> {
    Router::new()
        .route("/", get(landing))
        .route("/whoami", get(whoami))
        .route("/headers", get(identity_header))
}

async fn landing(identity: Option<SessionIdentity>) -> impl IntoResponse {
    match identity {
        Some(id) => Html(format!("Welcome back, {}!", id.username)),
        None => Html("Welcome, your session is valid.".to_string()),
    }
}

// Rejects with 401 when the scope's backend does not record a username
async fn whoami(identity: SessionIdentity) -> String {
    identity.username
}

async fn identity_header(headers: HeaderMap) -> String {
    match std::env::var("SESSION_GATE_IDENTITY_HEADER") {
        Ok(name) => headers
            .get(name.as_str())
            .and_then(|v| v.to_str().ok())
            .unwrap_or("<not set>")
            .to_string(),
        Err(_) => "identity header disabled".to_string(),
    }
}
