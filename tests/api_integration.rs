//! REST API tests driven through the router without a network listener

#![cfg(feature = "api")]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use helpdesk::api::router;
use helpdesk::config::{DATA_DIR, WorkflowConfig};
use helpdesk::lifecycle::Helpdesk;
use helpdesk::storage::FileStorage;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

fn setup() -> (TempDir, Router) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = FileStorage::new(temp_dir.path().join(DATA_DIR));
    storage
        .ensure_directories()
        .expect("Failed to create data dir");
    let app = router(Helpdesk::new(storage, WorkflowConfig::default()));
    (temp_dir, app)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    actor: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send_raw(app, method, uri, actor, body.map(|body| body.to_string())).await
}

async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    actor: Option<(&str, &str)>,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = actor {
        request = request.header("X-Actor-Id", id).header("X-Actor-Role", role);
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body)),
        None => request.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response is not JSON")
    };
    (status, value)
}

const ALICE: Option<(&str, &str)> = Some(("alice", "user"));
const OPS: Option<(&str, &str)> = Some(("ops", "admin"));

async fn file_ticket(app: &Router) -> String {
    let (status, ticket) = send(
        app,
        "POST",
        "/api/tickets",
        ALICE,
        Some(json!({
            "title": "Printer jam",
            "description": "Office printer jams every print job",
            "priority": "high",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ticket["status"], "open");
    assert!(ticket["createdAt"].is_string());
    ticket["id"].as_str().expect("Missing id").to_string()
}

#[tokio::test]
async fn test_missing_actor_is_unauthorized() {
    let (_temp_dir, app) = setup();
    let (status, body) = send(&app, "GET", "/api/tickets/tickets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_resolution_workflow() {
    let (_temp_dir, app) = setup();
    let id = file_ticket(&app).await;

    let (status, ticket) = send(&app, "GET", &format!("/api/tickets/{id}"), OPS, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ticket["status"], "in_progress");
    assert_eq!(ticket["assignee"], "ops");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/tickets/{id}/resolve"),
        OPS,
        Some(json!({ "comment": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, ticket) = send(
        &app,
        "POST",
        &format!("/api/tickets/{id}/resolve"),
        OPS,
        Some(json!({ "comment": "Replaced fuser unit" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ticket["status"], "resolved");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/tickets/{id}/comments"),
        ALICE,
        Some(json!({ "comment": "Thanks!" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/tickets/{id}/reopen"),
        OPS,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, ticket) = send(
        &app,
        "POST",
        &format!("/api/tickets/{id}/reopen"),
        OPS,
        Some(json!({ "confirm": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ticket["status"], "in_progress");

    let (status, comments) =
        send(&app, "GET", &format!("/api/tickets/{id}/comments"), ALICE, None).await;
    assert_eq!(status, StatusCode::OK);
    let comments = comments.as_array().expect("Expected an array");
    assert_eq!(comments.len(), 3);
    assert_eq!(comments[1]["comment"], "Replaced fuser unit");
}

#[tokio::test]
async fn test_invalid_transition_is_conflict() {
    let (_temp_dir, app) = setup();
    let id = file_ticket(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/tickets/{id}/resolve"),
        OPS,
        Some(json!({ "comment": "Done" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_state");
}

#[tokio::test]
async fn test_listing_scope_and_admin_routes() {
    let (_temp_dir, app) = setup();
    let id = file_ticket(&app).await;
    send(
        &app,
        "POST",
        &format!("/api/tickets/{id}/comments"),
        ALICE,
        Some(json!({ "comment": "Model HP 4000" })),
    )
    .await;

    let (_, own) = send(&app, "GET", "/api/tickets/tickets", ALICE, None).await;
    let own = own.as_array().expect("Expected an array");
    assert_eq!(own.len(), 1);
    assert_eq!(own[0]["lastComment"]["comment"], "Model HP 4000");

    let (_, other) = send(&app, "GET", "/api/tickets/tickets", Some(("bob", "user")), None).await;
    assert_eq!(other, json!([]));

    let (status, _) = send(&app, "GET", "/api/tickets/admin", ALICE, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, all) = send(
        &app,
        "GET",
        "/api/tickets/admin?status=open&search=printer",
        OPS,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, "GET", "/api/tickets/admin?priority=urgent", OPS, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, stats) = send(&app, "GET", "/api/tickets/stats", OPS, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["open"], 1);
    assert_eq!(stats["in_progress"], 0);
    assert_eq!(stats["total"], 1);
    assert!(stats["averageResolutionTime"].is_number());
}

#[tokio::test]
async fn test_unknown_ticket_is_not_found() {
    let (_temp_dir, app) = setup();
    let (status, _) = send(&app, "GET", "/api/tickets/not-a-uuid", OPS, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "POST",
        "/api/tickets/00000000-0000-4000-8000-000000000000/handle",
        OPS,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_admin_cannot_file_ticket() {
    let (_temp_dir, app) = setup();
    let (status, body) = send(
        &app,
        "POST",
        "/api/tickets",
        OPS,
        Some(json!({ "title": "Printer jam", "description": "Office printer jams" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

async fn resolved_ticket(app: &Router) -> String {
    let id = file_ticket(app).await;
    send(app, "GET", &format!("/api/tickets/{id}"), OPS, None).await;
    let (status, ticket) = send(
        app,
        "POST",
        &format!("/api/tickets/{id}/resolve"),
        OPS,
        Some(json!({ "comment": "Replaced fuser unit" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ticket["status"], "resolved");
    id
}

#[tokio::test]
async fn test_reopen_requires_confirmation() {
    let (_temp_dir, app) = setup();
    let id = resolved_ticket(&app).await;
    let uri = format!("/api/tickets/{id}/reopen");

    for body in [json!({}), json!({ "confirm": false })] {
        let (status, error) = send(&app, "POST", &uri, OPS, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "validation_error");
    }

    let (_, ticket) = send(&app, "GET", &format!("/api/tickets/{id}"), OPS, None).await;
    assert_eq!(ticket["status"], "resolved");
    let (_, comments) =
        send(&app, "GET", &format!("/api/tickets/{id}/comments"), OPS, None).await;
    assert_eq!(comments.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_reopen_by_user_is_forbidden_without_confirmation() {
    let (_temp_dir, app) = setup();
    let id = resolved_ticket(&app).await;
    let uri = format!("/api/tickets/{id}/reopen");

    let (status, body) = send(&app, "POST", &uri, ALICE, Some(json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = send(&app, "POST", &uri, ALICE, Some(json!({ "confirm": true }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let (_temp_dir, app) = setup();
    let id = file_ticket(&app).await;

    let (status, body) = send_raw(
        &app,
        "POST",
        "/api/tickets",
        ALICE,
        Some("{\"title\": ".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].is_string());

    let (status, body) = send_raw(
        &app,
        "POST",
        &format!("/api/tickets/{id}/comments"),
        ALICE,
        Some("not json".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (_, comments) =
        send(&app, "GET", &format!("/api/tickets/{id}/comments"), ALICE, None).await;
    assert_eq!(comments, json!([]));
}
