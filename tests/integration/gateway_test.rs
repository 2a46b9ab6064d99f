//! Integration tests for the realtime gateway over a live WebSocket.

use std::time::Duration;

use http::StatusCode;
use serde_json::Value;
use tokio_tungstenite::tungstenite;
use uuid::Uuid;

use thingdash_database::PresenceStore;

use crate::helpers::TestApp;

fn ack_field<'a>(envelope: &'a Value, field: &str) -> Option<&'a Value> {
    envelope.get("data").and_then(|data| data.get(field))
}

fn assert_http_status(result: Result<crate::helpers::WsClient, tungstenite::Error>, expected: u16) {
    match result {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), expected);
        }
        Err(other) => panic!("Expected HTTP {} rejection, got error: {}", expected, other),
        Ok(_) => panic!("Expected HTTP {} rejection, got an open connection", expected),
    }
}

#[tokio::test]
async fn handshake_without_token_is_rejected() {
    let app = TestApp::new().await;

    let result = app.connect_ws(None).await;

    assert_http_status(result, StatusCode::UNAUTHORIZED.as_u16());
}

#[tokio::test]
async fn handshake_with_invalid_token_is_rejected() {
    let app = TestApp::new().await;

    let result = app.connect_ws(Some("not-a-jwt")).await;

    assert_http_status(result, StatusCode::UNAUTHORIZED.as_u16());
}

#[tokio::test]
async fn handshake_accepts_bare_and_bearer_prefixed_tokens() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("kenji");
    let token = app.token_for(user_id, "kenji");

    let bare = app.connect_ws(Some(&token)).await;
    assert!(bare.is_ok(), "Bare token was rejected");

    let prefixed = app
        .connect_ws(Some(&format!("Bearer%20{}", token)))
        .await;
    assert!(prefixed.is_ok(), "Bearer-prefixed token was rejected");
}

#[tokio::test]
async fn add_user_binds_connection_and_acks() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("aki");
    let token = app.token_for(user_id, "aki");

    let mut ws = app.connect_ws(Some(&token)).await.unwrap();
    app.send_event(&mut ws, "addUser", user_id).await;

    let envelope = app.recv_envelope(&mut ws).await;
    assert_eq!(envelope.get("event").and_then(Value::as_str), Some("addUser"));
    assert_eq!(ack_field(&envelope, "error"), Some(&Value::Bool(false)));
    assert_eq!(
        ack_field(&envelope, "user_id").and_then(Value::as_str),
        Some(user_id.to_string().as_str())
    );

    let user = app.store.find_by_id(user_id).await.unwrap().unwrap();
    assert!(user.socket_id.is_some(), "Presence record was not bound");
}

#[tokio::test]
async fn add_user_for_unknown_user_acks_error() {
    let app = TestApp::new().await;
    let caller = app.seed_user("rin");
    let token = app.token_for(caller, "rin");

    let mut ws = app.connect_ws(Some(&token)).await.unwrap();
    app.send_event(&mut ws, "addUser", Uuid::new_v4()).await;

    let envelope = app.recv_envelope(&mut ws).await;
    assert_eq!(ack_field(&envelope, "error"), Some(&Value::Bool(true)));
    assert_eq!(
        ack_field(&envelope, "message").and_then(Value::as_str),
        Some("User does not exist")
    );
}

#[tokio::test]
async fn check_socket_reports_and_repairs_binding() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("noa");
    let token = app.token_for(user_id, "noa");

    let mut ws = app.connect_ws(Some(&token)).await.unwrap();
    app.send_event(&mut ws, "addUser", user_id).await;
    app.recv_envelope(&mut ws).await;

    app.send_event(&mut ws, "checkSocket", user_id).await;
    let envelope = app.recv_envelope(&mut ws).await;
    assert_eq!(
        ack_field(&envelope, "message").and_then(Value::as_str),
        Some("Socket is up to date")
    );

    // A fresh connection that never registered repairs the stale binding.
    let mut ws2 = app.connect_ws(Some(&token)).await.unwrap();
    app.send_event(&mut ws2, "checkSocket", user_id).await;
    let envelope = app.recv_envelope(&mut ws2).await;
    assert_eq!(
        ack_field(&envelope, "message").and_then(Value::as_str),
        Some("Socket was updated")
    );
}

#[tokio::test]
async fn remove_user_clears_presence_and_is_idempotent() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("mio");
    let token = app.token_for(user_id, "mio");

    let mut ws = app.connect_ws(Some(&token)).await.unwrap();
    app.send_event(&mut ws, "addUser", user_id).await;
    app.recv_envelope(&mut ws).await;

    app.send_event(&mut ws, "removeUser", user_id).await;
    let envelope = app.recv_envelope(&mut ws).await;
    assert_eq!(ack_field(&envelope, "error"), Some(&Value::Bool(false)));

    let user = app.store.find_by_id(user_id).await.unwrap().unwrap();
    assert!(user.socket_id.is_none(), "Presence record was not cleared");

    // Clearing an already-offline user still succeeds.
    app.send_event(&mut ws, "removeUser", user_id).await;
    let envelope = app.recv_envelope(&mut ws).await;
    assert_eq!(ack_field(&envelope, "error"), Some(&Value::Bool(false)));
}

#[tokio::test]
async fn device_event_is_delivered_to_bound_connection() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("sora");
    let token = app.token_for(user_id, "sora");

    let mut ws = app.connect_ws(Some(&token)).await.unwrap();
    app.send_event(&mut ws, "addUser", user_id).await;
    app.recv_envelope(&mut ws).await;

    let body = serde_json::json!({
        "user_id": user_id,
        "event": "temperatureUpdate",
        "payload": { "device": "sensor-1", "celsius": 21.5 },
    });
    let response = app
        .request("POST", "/api/devices/events", Some(body), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let envelope = app.recv_envelope(&mut ws).await;
    assert_eq!(
        envelope.get("event").and_then(Value::as_str),
        Some("temperatureUpdate")
    );
    assert_eq!(
        envelope
            .get("data")
            .and_then(|d| d.get("device"))
            .and_then(Value::as_str),
        Some("sensor-1")
    );
}

#[tokio::test]
async fn last_registered_connection_wins() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("yuki");
    let token = app.token_for(user_id, "yuki");

    let mut first = app.connect_ws(Some(&token)).await.unwrap();
    app.send_event(&mut first, "addUser", user_id).await;
    app.recv_envelope(&mut first).await;

    let mut second = app.connect_ws(Some(&token)).await.unwrap();
    app.send_event(&mut second, "addUser", user_id).await;
    app.recv_envelope(&mut second).await;

    let body = serde_json::json!({
        "user_id": user_id,
        "event": "doorOpened",
        "payload": { "device": "door-1" },
    });
    app.request("POST", "/api/devices/events", Some(body), Some(&token))
        .await;

    let envelope = app.recv_envelope(&mut second).await;
    assert_eq!(
        envelope.get("event").and_then(Value::as_str),
        Some("doorOpened")
    );

    let stale = app
        .try_recv_envelope(&mut first, Duration::from_millis(300))
        .await;
    assert!(stale.is_none(), "Superseded connection still received: {:?}", stale);
}

#[tokio::test]
async fn disconnect_clears_own_presence_binding() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("haru");
    let token = app.token_for(user_id, "haru");

    let mut ws = app.connect_ws(Some(&token)).await.unwrap();
    app.send_event(&mut ws, "addUser", user_id).await;
    app.recv_envelope(&mut ws).await;
    drop(ws);

    // Cleanup runs asynchronously after the transport closes.
    let mut cleared = false;
    for _ in 0..40 {
        let user = app.store.find_by_id(user_id).await.unwrap().unwrap();
        if user.socket_id.is_none() {
            cleared = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(cleared, "Presence binding survived the disconnect");
}

#[tokio::test]
async fn disconnect_of_stale_connection_keeps_new_binding() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("emi");
    let token = app.token_for(user_id, "emi");

    let mut first = app.connect_ws(Some(&token)).await.unwrap();
    app.send_event(&mut first, "addUser", user_id).await;
    app.recv_envelope(&mut first).await;

    let mut second = app.connect_ws(Some(&token)).await.unwrap();
    app.send_event(&mut second, "addUser", user_id).await;
    app.recv_envelope(&mut second).await;

    // The first connection's socket id is no longer in the store, so its
    // disconnect must not clear the second connection's binding.
    drop(first);
    tokio::time::sleep(Duration::from_millis(300)).await;

    let user = app.store.find_by_id(user_id).await.unwrap().unwrap();
    assert!(user.socket_id.is_some(), "Stale disconnect cleared a live binding");
}

#[tokio::test]
async fn unparseable_frame_gets_error_envelope() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("tomo");
    let token = app.token_for(user_id, "tomo");

    let mut ws = app.connect_ws(Some(&token)).await.unwrap();
    {
        use futures::SinkExt;
        use tokio_tungstenite::tungstenite::Message;
        ws.send(Message::Text(r#"{"event":"selfDestruct"}"#.to_string().into()))
            .await
            .unwrap();
    }

    let envelope = app.recv_envelope(&mut ws).await;
    assert_eq!(envelope.get("event").and_then(Value::as_str), Some("error"));
    assert_eq!(ack_field(&envelope, "error"), Some(&Value::Bool(true)));
}
