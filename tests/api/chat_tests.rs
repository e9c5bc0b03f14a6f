//! Direct Message API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{issue_token, TestApp, ALICE, BOB, CAROL};

async fn send(app: &TestApp, from: i64, to: i64, content: &str) -> Value {
    let response = app
        .server
        .post("/api/v1/chat/messages")
        .authorization_bearer(app.token(from))
        .json(&json!({ "receiver_id": to, "content": content }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

async fn unread_count(app: &TestApp, user_id: i64) -> i64 {
    let response = app
        .server
        .get("/api/v1/chat/unread-count")
        .authorization_bearer(app.token(user_id))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["count"].as_i64().unwrap()
}

#[tokio::test]
async fn test_requests_without_valid_token_are_rejected() {
    let app = TestApp::new();

    app.server
        .get("/api/v1/chat/conversations")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .get("/api/v1/chat/conversations")
        .authorization_bearer(issue_token(ALICE, -120))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .get("/api/v1/chat/conversations")
        .authorization_bearer("garbage")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_offline_recipient_reads_history() {
    let app = TestApp::new();
    let sent = send(&app, ALICE, BOB, "hi").await;
    assert_eq!(sent["sender_id"], ALICE);
    assert_eq!(sent["receiver_id"], BOB);

    let response = app
        .server
        .get("/api/v1/chat/conversations")
        .authorization_bearer(app.token(BOB))
        .await;
    response.assert_status_ok();
    let conversations = response.json::<Value>()["data"].clone();
    assert_eq!(conversations.as_array().unwrap().len(), 1);
    assert_eq!(conversations[0]["last_message"], "hi");
    assert_eq!(conversations[0]["unread_count"], 1);
    assert_eq!(conversations[0]["other_user"]["nickname"], "alice");

    let response = app
        .server
        .get(&format!("/api/v1/chat/messages/{ALICE}"))
        .authorization_bearer(app.token(BOB))
        .await;
    response.assert_status_ok();
    let messages = response.json::<Value>()["data"].clone();
    assert_eq!(messages.as_array().unwrap().len(), 1);
    assert_eq!(messages[0]["id"], sent["id"]);

    // Viewing the history marked it read.
    assert_eq!(unread_count(&app, BOB).await, 0);
}

#[tokio::test]
async fn test_send_validation_errors() {
    let app = TestApp::new();
    let token = app.token(ALICE);

    let blank = app
        .server
        .post("/api/v1/chat/messages")
        .authorization_bearer(token.clone())
        .json(&json!({ "receiver_id": BOB, "content": "   " }))
        .await;
    blank.assert_status(StatusCode::BAD_REQUEST);

    let to_self = app
        .server
        .post("/api/v1/chat/messages")
        .authorization_bearer(token.clone())
        .json(&json!({ "receiver_id": ALICE, "content": "me" }))
        .await;
    to_self.assert_status(StatusCode::BAD_REQUEST);

    let missing_receiver = app
        .server
        .post("/api/v1/chat/messages")
        .authorization_bearer(token.clone())
        .json(&json!({ "receiver_id": 0, "content": "x" }))
        .await;
    missing_receiver.assert_status(StatusCode::BAD_REQUEST);

    let unknown = app
        .server
        .post("/api/v1/chat/messages")
        .authorization_bearer(token)
        .json(&json!({ "receiver_id": 404, "content": "anyone?" }))
        .await;
    unknown.assert_status(StatusCode::NOT_FOUND);

    assert_eq!(unread_count(&app, BOB).await, 0);
}

#[tokio::test]
async fn test_history_pagination() {
    let app = TestApp::new();
    for text in ["one", "two", "three"] {
        send(&app, ALICE, BOB, text).await;
    }

    let page = |page: i64, size: i64| {
        app.server
            .get(&format!("/api/v1/chat/messages/{BOB}"))
            .add_query_param("page", page)
            .add_query_param("pageSize", size)
            .authorization_bearer(app.token(ALICE))
    };

    let first: Value = page(1, 2).await.json();
    let contents: Vec<_> = first["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents, vec!["three", "two"]);

    let second: Value = page(2, 2).await.json();
    assert_eq!(second["data"].as_array().unwrap().len(), 1);
    assert_eq!(second["data"][0]["content"], "one");

    // Out-of-range sizes fall back to the default page.
    let oversized: Value = page(1, 500).await.json();
    assert_eq!(oversized["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_history_non_numeric_paging_uses_defaults() {
    let app = TestApp::new();
    for text in ["one", "two", "three"] {
        send(&app, ALICE, BOB, text).await;
    }

    let response = app
        .server
        .get(&format!("/api/v1/chat/messages/{BOB}"))
        .add_query_param("page", "x")
        .add_query_param("pageSize", "abc")
        .authorization_bearer(app.token(ALICE))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["content"], "three");
}

#[tokio::test]
async fn test_mark_read_only_by_receiver() {
    let app = TestApp::new();
    let sent = send(&app, ALICE, BOB, "read me").await;
    let id = sent["id"].as_i64().unwrap();

    app.server
        .put(&format!("/api/v1/chat/messages/{id}/read"))
        .authorization_bearer(app.token(ALICE))
        .await
        .assert_status_ok();
    assert_eq!(unread_count(&app, BOB).await, 1);

    let response = app
        .server
        .put(&format!("/api/v1/chat/messages/{id}/read"))
        .authorization_bearer(app.token(BOB))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "success": true }));
    assert_eq!(unread_count(&app, BOB).await, 0);

    // Unknown message IDs are accepted silently.
    app.server
        .put("/api/v1/chat/messages/999999/read")
        .authorization_bearer(app.token(BOB))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_mark_conversation_read() {
    let app = TestApp::new();
    send(&app, ALICE, BOB, "a").await;
    send(&app, ALICE, BOB, "b").await;
    send(&app, CAROL, BOB, "c").await;

    let response = app
        .server
        .put(&format!("/api/v1/chat/conversations/{ALICE}/read"))
        .authorization_bearer(app.token(BOB))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "success": true, "updated": 2 }));
    assert_eq!(unread_count(&app, BOB).await, 1);
}

#[tokio::test]
async fn test_rest_send_reaches_live_connections() {
    let app = TestApp::new();
    let (_bob_conn, mut bob_rx) = app.state.hub.register(BOB);
    let (_alice_conn, mut alice_rx) = app.state.hub.register(ALICE);

    let sent = send(&app, ALICE, BOB, "over http").await;

    let frame: Value = serde_json::from_str(&bob_rx.recv().await.unwrap()).unwrap();
    assert_eq!(frame["type"], "message");
    assert_eq!(frame["content"], "over http");
    assert_eq!(frame["message_id"], sent["id"]);

    let echo: Value = serde_json::from_str(&alice_rx.recv().await.unwrap()).unwrap();
    assert_eq!(echo, frame);

    app.server
        .put(&format!("/api/v1/chat/messages/{}/read", sent["id"]))
        .authorization_bearer(app.token(BOB))
        .await
        .assert_status_ok();
    let receipt: Value = serde_json::from_str(&alice_rx.recv().await.unwrap()).unwrap();
    assert_eq!(receipt["type"], "read");
    assert_eq!(receipt["from"], BOB);
}

#[tokio::test]
async fn test_online_status() {
    let app = TestApp::new();
    let (conn, _rx) = app.state.hub.register(BOB);

    let online: Value = app
        .server
        .get(&format!("/api/v1/chat/online/{BOB}"))
        .authorization_bearer(app.token(ALICE))
        .await
        .json();
    assert_eq!(online, json!({ "user_id": BOB, "online": true }));

    app.state.hub.unregister(BOB, conn);
    let offline: Value = app
        .server
        .get(&format!("/api/v1/chat/online/{BOB}"))
        .authorization_bearer(app.token(ALICE))
        .await
        .json();
    assert_eq!(offline["online"], false);
}

#[tokio::test]
async fn test_invalid_path_ids() {
    let app = TestApp::new();

    app.server
        .get("/api/v1/chat/messages/abc")
        .authorization_bearer(app.token(ALICE))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .put("/api/v1/chat/messages/-1/read")
        .authorization_bearer(app.token(ALICE))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
