use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool is reference-counted and the rest is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: helpdesk_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Lifecycle events are published here after each committed mutation.
    pub event_bus: Arc<helpdesk_events::EventBus>,
}
