//! End-to-end tests driving the router with stubbed collaborator scripts.
//!
//! Each test writes small `/bin/sh` scripts into a private temp directory and
//! points the configured interpreter at `/bin/sh`, so the full
//! validate → spawn → capture → relay path runs without Python installed.

use std::fs;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::util::ServiceExt;

use concierged::{app, AppState, Config};

fn stub_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("concierged-{test}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_stub(dir: &Path, name: &str, script: &str) {
    fs::write(dir.join(name), script).unwrap();
}

fn test_app(dir: &Path, timeout_ms: u64) -> Router {
    let config: Config = toml::from_str(&format!(
        r#"
        [server]
        exec_timeout_ms = {timeout_ms}

        [scripts]
        python = "/bin/sh"
        working_dir = "{}"
        agent = "agent.sh"
        availability = "availability.sh"
        hotels = "hotels.sh"
        "#,
        dir.display()
    ))
    .unwrap();
    app(AppState::new(config))
}

async fn post_chat(app: Router, body: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chat_missing_fields_rejected() {
    let dir = stub_dir("chat-missing");
    for body in [
        "{}",
        r#"{"session_id":"s1"}"#,
        r#"{"message":"hi"}"#,
        r#"{"session_id":"","message":"hi"}"#,
        r#"{"session_id":"s1","message":"  "}"#,
        "not json at all",
    ] {
        let response = post_chat(test_app(&dir, 5000), body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(body_string(response).await, r#"{"message":"Incomplete data."}"#);
    }
}

#[tokio::test]
async fn chat_relays_agent_json_unchanged() {
    let dir = stub_dir("chat-json");
    let payload = r#"{"text":"hi","ui_action":{"type":"show_hotels","hotel_ids":["h1"]}}"#;
    write_stub(&dir, "agent.sh", &format!("echo '{payload}'\n"));

    let response = post_chat(
        test_app(&dir, 5000),
        r#"{"session_id":"s1","message":"show me hotels"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/json; charset=UTF-8"
    );
    assert_eq!(body_string(response).await, payload);
}

#[tokio::test]
async fn chat_wraps_non_json_output() {
    let dir = stub_dir("chat-text");
    write_stub(&dir, "agent.sh", "echo 'not json'\n");

    let response = post_chat(test_app(&dir, 5000), r#"{"session_id":"s1","message":"hi"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, r#"{"text":"not json"}"#);
}

#[tokio::test]
async fn chat_empty_output_is_500() {
    let dir = stub_dir("chat-empty");
    write_stub(&dir, "agent.sh", "exit 0\n");

    let response = post_chat(test_app(&dir, 5000), r#"{"session_id":"s1","message":"hi"}"#).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_string(response).await,
        r#"{"error":"Agent execution returned no output."}"#
    );
}

#[tokio::test]
async fn chat_strips_quotes_and_passes_argv_verbatim() {
    let dir = stub_dir("chat-argv");
    // Echo back the --session_id and --message argument values.
    write_stub(&dir, "agent.sh", "printf '{\"text\":\"%s|%s\"}' \"$2\" \"$4\"\n");

    let request = serde_json::json!({
        "session_id": "s\"1\"",
        "message": "say \"hello\" $(id)",
    });
    let response = post_chat(test_app(&dir, 5000), &request.to_string()).await;
    assert_eq!(response.status(), StatusCode::OK);
    // Quotes removed; shell syntax carried through as plain text, unexpanded.
    assert_eq!(body_string(response).await, r#"{"text":"s1|say hello $(id)"}"#);
}

#[tokio::test]
async fn chat_hung_agent_times_out() {
    let dir = stub_dir("chat-hang");
    write_stub(&dir, "agent.sh", "sleep 5\n");

    let response = post_chat(test_app(&dir, 200), r#"{"session_id":"s1","message":"hi"}"#).await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body_string(response).await, r#"{"error":"Agent timed out."}"#);
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn availability_missing_hotel_id_rejected() {
    let dir = stub_dir("avail-missing");
    for uri in ["/api/availability", "/api/availability?hotel_id="] {
        let response = get(test_app(&dir, 5000), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(
            body_string(response).await,
            r#"{"error":"Missing hotel_id parameter."}"#
        );
    }
}

#[tokio::test]
async fn availability_invalid_hotel_id_rejected() {
    let dir = stub_dir("avail-invalid");
    for uri in [
        "/api/availability?hotel_id=bad.id",
        "/api/availability?hotel_id=h1%3Bls",
        "/api/availability?hotel_id=h1%20h2",
    ] {
        let response = get(test_app(&dir, 5000), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(
            body_string(response).await,
            r#"{"error":"Invalid hotel_id format."}"#
        );
    }
}

#[tokio::test]
async fn availability_relays_json_array() {
    let dir = stub_dir("avail-ok");
    let payload = r#"[{"check_in":"2026-08-10","check_out":"2026-08-12"}]"#;
    write_stub(&dir, "availability.sh", &format!("echo '{payload}'\n"));

    let response = get(test_app(&dir, 5000), "/api/availability?hotel_id=h1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/json; charset=UTF-8"
    );
    assert_eq!(body_string(response).await, payload);
}

#[tokio::test]
async fn availability_empty_output_is_500() {
    let dir = stub_dir("avail-empty");
    write_stub(&dir, "availability.sh", "exit 0\n");

    let response = get(test_app(&dir, 5000), "/api/availability?hotel_id=h1").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_string(response).await,
        r#"{"error":"Failed to fetch availability."}"#
    );
}

#[tokio::test]
async fn availability_non_json_output_is_500() {
    let dir = stub_dir("avail-text");
    write_stub(
        &dir,
        "availability.sh",
        "echo 'sqlite3.OperationalError: no such table: reservations'\n",
    );

    let response = get(test_app(&dir, 5000), "/api/availability?hotel_id=h1").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_string(response).await,
        r#"{"error":"Failed to fetch availability."}"#
    );
}

// ---------------------------------------------------------------------------
// Hotels
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hotels_relays_catalog() {
    let dir = stub_dir("hotels-ok");
    let payload = r#"[{"id":"h1","name":"Riad Jasmine","city":"Marrakech","price":85}]"#;
    write_stub(&dir, "hotels.sh", &format!("echo '{payload}'\n"));

    let response = get(test_app(&dir, 5000), "/api/hotels").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, payload);
}

#[tokio::test]
async fn hotels_empty_output_is_500() {
    let dir = stub_dir("hotels-empty");
    write_stub(&dir, "hotels.sh", "exit 0\n");

    let response = get(test_app(&dir, 5000), "/api/hotels").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_string(response).await, r#"{"error":"Failed to fetch hotels"}"#);
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let dir = stub_dir("health");
    let response = get(test_app(&dir, 5000), "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
    assert!(body["uptime_secs"].is_u64());
}
