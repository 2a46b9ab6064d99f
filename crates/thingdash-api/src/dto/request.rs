//! Request DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Device-shadow bridge request: push one event to one user's dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEventRequest {
    /// Target user.
    pub user_id: Uuid,
    /// Wire event name delivered to the client.
    pub event: String,
    /// Application-defined payload.
    #[serde(default)]
    pub payload: Value,
}

/// WebSocket handshake query parameters.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Bearer credential, with or without the `"Bearer "` prefix.
    pub token: String,
}
