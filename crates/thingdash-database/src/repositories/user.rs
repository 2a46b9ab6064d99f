//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use thingdash_core::error::{AppError, ErrorKind};
use thingdash_core::result::AppResult;
use thingdash_entity::User;

use crate::store::PresenceStore;

/// Repository for user lookup and presence updates.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find the user currently associated with a socket id.
    pub async fn find_by_socket(&self, socket_id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE socket_id = $1")
            .bind(socket_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by socket", e)
            })
    }

    /// Set or clear a user's socket id and return the updated row.
    pub async fn update_socket(&self, id: Uuid, socket_id: Option<Uuid>) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET socket_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(socket_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update user socket", e)
        })?
        .ok_or_else(|| AppError::not_found("User does not exist"))
    }
}

#[async_trait]
impl PresenceStore for UserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        UserRepository::find_by_id(self, user_id).await
    }

    async fn find_by_socket(&self, socket_id: Uuid) -> AppResult<Option<User>> {
        UserRepository::find_by_socket(self, socket_id).await
    }

    async fn update_socket(&self, user_id: Uuid, socket_id: Option<Uuid>) -> AppResult<User> {
        UserRepository::update_socket(self, user_id, socket_id).await
    }
}
