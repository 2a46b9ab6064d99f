//! Application state shared across all handlers.

use std::sync::Arc;

use thingdash_auth::jwt::decoder::JwtDecoder;
use thingdash_core::config::AppConfig;
use thingdash_database::store::PresenceStore;
use thingdash_realtime::RealtimeGateway;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Presence store (PostgreSQL in production, in-memory in tests).
    pub store: Arc<dyn PresenceStore>,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Realtime gateway.
    pub gateway: RealtimeGateway,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("gateway", &self.gateway)
            .finish()
    }
}
