//! User entity model: the presence record of the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered dashboard user and their presence record.
///
/// `socket_id` is a weak reference to the user's currently associated
/// live connection; `None` means offline. The realtime gateway keeps this
/// column consistent across registrations, reconnects, and disconnects.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Currently associated connection, or `None` when offline.
    pub socket_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user currently has a live connection registered.
    pub fn is_online(&self) -> bool {
        self.socket_id.is_some()
    }
}
