use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::SessionRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The seeded record stores.
    pub store: Arc<curio_store::Store>,
    /// Server configuration (JWT secret, timeouts).
    pub config: Arc<ServerConfig>,
    /// WebSocket session registry (the Notifier).
    pub sessions: Arc<SessionRegistry>,
    /// Centralized event bus feeding the visit log.
    pub bus: Arc<curio_events::EventBus>,
}
