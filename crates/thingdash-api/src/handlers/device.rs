//! Device-shadow bridge handler.
//!
//! Shadow-update functions call this endpoint to forward device state
//! changes to the owning user's live dashboard connection.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::request::DeviceEventRequest;
use crate::dto::response::DeviceEventResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/devices/events
///
/// Answers `202 Accepted` once the gateway takes the event. Events
/// for offline users are dropped without error.
pub async fn publish_event(
    State(state): State<AppState>,
    _caller: AuthUser,
    Json(request): Json<DeviceEventRequest>,
) -> Result<(StatusCode, Json<DeviceEventResponse>), ApiError> {
    state
        .gateway
        .emit_to_user(request.user_id, &request.event, request.payload)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DeviceEventResponse { accepted: true }),
    ))
}
