//! WebSocket upgrade handler.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;

use crate::dto::request::WsQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /ws?token={jwt}
///
/// The credential is verified before the upgrade completes, so an
/// unauthenticated client never reaches any application event handler.
#[axum::debug_handler]
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    query: Result<Query<WsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = query.ok();
    let token = query.as_ref().map(|q| q.token.as_str());
    let claims = state.gateway.authenticate(token)?;

    let gateway = state.gateway.clone();
    Ok(ws.on_upgrade(move |socket| thingdash_realtime::session::run(gateway, claims, socket)))
}
