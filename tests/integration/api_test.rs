//! Integration tests for the REST surface.

use http::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use crate::helpers::TestApp;

#[tokio::test]
async fn health_check_is_public() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body.get("status").and_then(Value::as_str),
        Some("ok")
    );
}

#[tokio::test]
async fn presence_read_requires_token() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("kai");

    let response = app
        .request("GET", &format!("/api/presence/{}", user_id), None, None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn presence_read_reports_offline_user() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("ren");
    let token = app.token_for(user_id, "ren");

    let response = app
        .request(
            "GET",
            &format!("/api/presence/{}", user_id),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.get("online"), Some(&Value::Bool(false)));
}

#[tokio::test]
async fn presence_read_reports_online_after_registration() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("ume");
    let token = app.token_for(user_id, "ume");

    let mut ws = app.connect_ws(Some(&token)).await.unwrap();
    app.send_event(&mut ws, "addUser", user_id).await;
    app.recv_envelope(&mut ws).await;

    let response = app
        .request(
            "GET",
            &format!("/api/presence/{}", user_id),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.get("online"), Some(&Value::Bool(true)));
}

#[tokio::test]
async fn presence_read_of_unknown_user_is_not_found() {
    let app = TestApp::new().await;
    let caller = app.seed_user("iku");
    let token = app.token_for(caller, "iku");

    let response = app
        .request(
            "GET",
            &format!("/api/presence/{}", Uuid::new_v4()),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn device_event_requires_token() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("gen");

    let body = serde_json::json!({
        "user_id": user_id,
        "event": "humidityUpdate",
        "payload": { "percent": 40 },
    });
    let response = app
        .request("POST", "/api/devices/events", Some(body), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn device_event_for_offline_user_is_accepted() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("fuyu");
    let token = app.token_for(user_id, "fuyu");

    let body = serde_json::json!({
        "user_id": user_id,
        "event": "humidityUpdate",
        "payload": { "percent": 40 },
    });
    let response = app
        .request("POST", "/api/devices/events", Some(body), Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(response.body.get("accepted"), Some(&Value::Bool(true)));
}

#[tokio::test]
async fn device_event_for_unknown_user_is_accepted() {
    let app = TestApp::new().await;
    let caller = app.seed_user("nao");
    let token = app.token_for(caller, "nao");

    let body = serde_json::json!({
        "user_id": Uuid::new_v4(),
        "event": "humidityUpdate",
    });
    let response = app
        .request("POST", "/api/devices/events", Some(body), Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::ACCEPTED);
}
