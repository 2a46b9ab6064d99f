//! In-process presence store.
//!
//! Backs the gateway in tests and single-node development setups where
//! no PostgreSQL instance is available. Semantics match the sqlx
//! repository: every operation is atomic per entry, and updates against
//! unknown users fail with a not-found error.

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use async_trait::async_trait;

use thingdash_core::error::AppError;
use thingdash_core::result::AppResult;
use thingdash_entity::User;

use crate::store::PresenceStore;

/// Presence store keeping user records in a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryPresenceStore {
    users: DashMap<Uuid, User>,
}

impl MemoryPresenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user record, replacing any existing record with the same id.
    pub fn insert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Create and insert a fresh offline user, returning its id.
    pub fn seed_user(&self, username: &str, email: &str) -> Uuid {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            socket_id: None,
            created_at: now,
            updated_at: now,
        };
        let id = user.id;
        self.users.insert(id, user);
        id
    }
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.get(&user_id).map(|entry| entry.value().clone()))
    }

    async fn find_by_socket(&self, socket_id: Uuid) -> AppResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().socket_id == Some(socket_id))
            .map(|entry| entry.value().clone()))
    }

    async fn update_socket(&self, user_id: Uuid, socket_id: Option<Uuid>) -> AppResult<User> {
        let mut entry = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found("User does not exist"))?;
        entry.socket_id = socket_id;
        entry.updated_at = Utc::now();
        Ok(entry.value().clone())
    }
}
