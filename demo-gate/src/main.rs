use std::collections::BTreeMap;

use axum::{Router, middleware::from_fn_with_state, response::Html, routing::get};

use session_gate_axum::{GateScope, GateSettings, locations_from_json, session_gate};

mod protected;
mod server;

use server::{init_tracing, spawn_http_server};

const DEFAULT_PORT: u16 = 3001;

async fn index() -> Html<&'static str> {
    Html(
        "<ul><li><a href=\"/protected\">/protected</a> (root scope)</li>\
         <li><a href=\"/admin\">/admin</a></li>\
         <li><a href=\"/public\">/public</a></li></ul>",
    )
}

async fn login() -> Html<&'static str> {
    Html("Please sign in. Your session is missing or has expired.")
}

/// Scopes used when `SESSION_GATE_LOCATIONS` does not point at a JSON file.
fn default_locations() -> BTreeMap<String, GateSettings> {
    let mut locations = BTreeMap::new();
    locations.insert("/protected".to_string(), GateSettings::default());
    locations.insert(
        "/admin".to_string(),
        GateSettings {
            cookie_name: Some("admin_session".to_string()),
            ..Default::default()
        },
    );
    locations.insert(
        "/public".to_string(),
        GateSettings {
            enabled: Some(false),
            ..Default::default()
        },
    );
    locations
}

async fn load_locations() -> Result<BTreeMap<String, GateSettings>, Box<dyn std::error::Error>> {
    match std::env::var("SESSION_GATE_LOCATIONS") {
        Ok(path) if !path.trim().is_empty() => {
            tracing::info!("Loading gate locations from {}", path);
            let json = tokio::fs::read_to_string(&path).await?;
            Ok(locations_from_json(&json)?)
        }
        _ => Ok(default_locations()),
    }
}

fn build_app(
    root: &GateSettings,
    locations: &BTreeMap<String, GateSettings>,
) -> Result<Router, Box<dyn std::error::Error>> {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/auth", get(login));

    for (path, settings) in locations {
        if !path.starts_with('/') || path == "/" {
            return Err(format!("Location must be a non-root path starting with '/': {path:?}").into());
        }
        let scope = GateScope::from_settings(&settings.inherit(root))?;
        tracing::info!(location = %path, ?scope, "Gate scope installed");
        app = app.nest(
            path,
            protected::router().route_layer(from_fn_with_state(scope, session_gate)),
        );
    }

    Ok(app)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing("demo_gate");

    let root = GateSettings::from_env()?;
    let locations = load_locations().await?;
    let app = build_app(&root, &locations)?;

    let port = match std::env::var("PORT") {
        Ok(port) => port.parse()?,
        Err(_) => DEFAULT_PORT,
    };

    spawn_http_server(port, app).await??;
    Ok(())
}
