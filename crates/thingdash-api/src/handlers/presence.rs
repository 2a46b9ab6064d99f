//! Presence read handler.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use thingdash_core::error::AppError;

use crate::dto::response::PresenceResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/presence/{user_id}
pub async fn get_presence(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PresenceResponse>, ApiError> {
    let user = state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User does not exist"))?;

    Ok(Json(PresenceResponse {
        user_id: user.id,
        online: user.is_online(),
    }))
}
