//! Router tests driven through `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use tycoon_core::GameConfig;
use tycoon_server::{AppState, PlayerRepository, router};

fn app() -> Router {
    router(AppState::new(PlayerRepository::in_memory(GameConfig::default())))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_success() {
    let (status, body) = send(&app(), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn create_user_starts_with_defaults_and_is_idempotent() {
    let app = app();
    let payload = json!({"id": "u1", "username": "chef", "email": "chef@pizza.test"});

    let (status, body) = send(&app, post("/api/user", payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["balance"], 100);
    assert_eq!(body["data"]["xp"], 0);
    assert_eq!(body["data"]["level"], 1);

    send(&app, post("/api/game/finish", json!({"user_id": "u1", "coins": 10, "xp": 20}))).await;

    let (_, again) = send(&app, post("/api/user", payload)).await;
    assert_eq!(again["data"]["balance"], 110);
    assert_eq!(again["data"]["created_at"], body["data"]["created_at"]);
}

#[tokio::test]
async fn missing_ids_are_bad_requests() {
    let app = app();

    let (status, body) = send(&app, post("/api/user", json!({"username": "chef"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, post("/api/game/finish", json!({"coins": 10}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn finish_levels_up_and_reports_it() {
    let app = app();
    send(&app, post("/api/user", json!({"id": "u1"}))).await;

    let (status, body) = send(
        &app,
        post("/api/game/finish", json!({"user_id": "u1", "coins": 100, "xp": 200})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["balance"], 200);
    assert_eq!(body["data"]["level"], 2);
    assert_eq!(body["data"]["xp"], 100);
    assert_eq!(body["level_up"], true);
    assert_eq!(body["levels_gained"], 1);
}

#[tokio::test]
async fn unknown_users_are_not_found() {
    let app = app();

    let (status, _) = send(
        &app,
        post("/api/game/finish", json!({"user_id": "ghost", "coins": 10, "xp": 20})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get("/api/user/ghost")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "user not found");
}

#[tokio::test]
async fn get_user_returns_the_stored_record() {
    let app = app();
    send(&app, post("/api/user", json!({"id": "u1", "username": "chef"}))).await;

    let (status, body) = send(&app, get("/api/user/u1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], "u1");
    assert_eq!(body["data"]["username"], "chef");
}
