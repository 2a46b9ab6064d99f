//! Per-connection session loop over an established WebSocket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use thingdash_auth::Claims;

use crate::gateway::RealtimeGateway;
use crate::handle::SocketHandle;
use crate::protocol::{Ack, ClientEvent, Envelope};

/// Drives one admitted connection until it closes, then runs disconnect
/// cleanup. Spawned by the WebSocket upgrade handler.
pub async fn run(gateway: RealtimeGateway, claims: Claims, socket: WebSocket) {
    let (handle, mut outbound_rx) = match gateway.attach(claims) {
        Ok(attached) => attached,
        Err(e) => {
            warn!(error = %e, "Connection dropped before admission");
            return;
        }
    };
    let socket_id = handle.id;

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Drain the outbound queue into the transport sink.
    let forwarder = tokio::spawn(async move {
        while let Some(envelope) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&envelope) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize outbound envelope");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                dispatch(&gateway, &handle, text.as_str()).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(%socket_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    forwarder.abort();
    gateway.handle_disconnect(socket_id).await;

    info!(%socket_id, "Connection closed");
}

/// Parses and handles one inbound frame.
///
/// Failures are answered on the connection's own ack channel; nothing
/// here propagates as a transport-level error.
async fn dispatch(gateway: &RealtimeGateway, handle: &Arc<SocketHandle>, raw: &str) {
    let event: ClientEvent = match serde_json::from_str(raw) {
        Ok(event) => event,
        Err(e) => {
            debug!(socket_id = %handle.id, error = %e, "Unparseable inbound frame");
            handle.send(Envelope::new(
                "error",
                Ack::err(format!("Unrecognized event: {e}")),
            ));
            return;
        }
    };

    let name = event.name();
    let ack = match event {
        ClientEvent::AddUser { user_id } => gateway.add_user(handle, user_id).await,
        ClientEvent::RemoveUser { user_id } => gateway.remove_user(user_id).await,
        ClientEvent::CheckSocket { user_id } => gateway.check_socket(handle, user_id).await,
    };

    handle.send(Envelope::new(name, ack));
}
