//! The presence store trait consumed by the realtime gateway.

use async_trait::async_trait;
use uuid::Uuid;

use thingdash_core::result::AppResult;
use thingdash_entity::User;

/// Identity-store operations the gateway round-trips for every presence
/// change. Implementations must make each operation atomic from the
/// caller's perspective; the gateway layers no cache or lock on top.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Look a user up by id. `Ok(None)` when no such user exists.
    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>>;

    /// Look a user up by their currently associated socket id.
    async fn find_by_socket(&self, socket_id: Uuid) -> AppResult<Option<User>>;

    /// Associate (or, with `None`, clear) a user's socket id and return
    /// the updated record. Fails with a not-found error when the user
    /// does not exist.
    async fn update_socket(&self, user_id: Uuid, socket_id: Option<Uuid>) -> AppResult<User>;
}
