//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Presence read response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceResponse {
    /// User id.
    pub user_id: Uuid,
    /// Whether the user currently has a live connection.
    pub online: bool,
}

/// Acknowledgment for accepted device events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEventResponse {
    /// Always true; delivery itself is fire-and-forget.
    pub accepted: bool,
}
