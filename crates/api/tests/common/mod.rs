use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use curio_api::auth::jwt::JwtConfig;
use curio_api::config::ServerConfig;
use curio_api::state::AppState;
use curio_api::ws::SessionRegistry;
use curio_store::models::{NewVisitor, Visitor};
use curio_store::Store;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough-for-hmac".to_string(),
            token_expiry_days: 30,
        },
    }
}

/// Build an `AppState` over a freshly seeded store, exactly as `main.rs`
/// assembles it (minus the background tasks).
pub fn test_state() -> AppState {
    AppState {
        store: Arc::new(Store::seeded().expect("seed data is valid")),
        config: Arc::new(test_config()),
        sessions: Arc::new(SessionRegistry::new()),
        bus: Arc::new(curio_events::EventBus::default()),
    }
}

/// Build the full application router with all middleware layers, exactly
/// as `main.rs` does.
#[allow(dead_code)]
pub fn build_test_app() -> Router {
    let config = test_config();
    curio_api::router::build_app_router(test_state(), &config)
}

/// Fire a GET request at the app.
#[allow(dead_code)]
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    )
    .await
    .expect("response")
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("body json")
}

/// Insert a guest visitor directly into the store.
#[allow(dead_code)]
pub async fn seed_visitor(state: &AppState, name: &str) -> Visitor {
    state
        .store
        .visitors
        .create(NewVisitor {
            name: name.into(),
            email: None,
            password_hash: None,
            is_guest: true,
            content_language: 1,
            socket_id: None,
            device_address: None,
            device_os: None,
            device_version: None,
            device_model: None,
        })
        .await
        .expect("visitor insert")
}
