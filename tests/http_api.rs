//! Router-level flows over an in-memory database: public registration,
//! bearer protection on the account routes, and a register-login-list loop.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use pipedesk::api::{build_router, build_state};
use pipedesk::config::{AppConfig, DatabaseConfig};
use pipedesk::storage::create_pool;

async fn test_router() -> Router {
    let db = DatabaseConfig {
        url: "sqlite://:memory:".to_string(),
        // One connection so every query sees the same in-memory database.
        max_connections: 1,
        auto_migrate: true,
        ..Default::default()
    };
    let pool = create_pool(&db).await.expect("test pool");
    build_router(build_state(pool, &AppConfig::default()))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn registration_body(email: &str) -> Value {
    json!({
        "full_name": "Dana Cole",
        "email": email,
        "password": "hunter2hunter2",
        "password_confirmation": "hunter2hunter2"
    })
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn registration_is_reachable_without_a_token() {
    let router = test_router().await;

    let response = router
        .oneshot(post_json("/api/v1/auth/register", registration_body("dana@example.com")))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["email"], "dana@example.com");
    assert_eq!(body["roles"], json!(["USER"]));
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn account_routes_require_a_bearer_token() {
    let router = test_router().await;

    let response = router
        .oneshot(Request::builder().uri("/api/v1/accounts").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registered_account_can_login_and_list_accounts() {
    let router = test_router().await;

    let created = router
        .clone()
        .oneshot(post_json("/api/v1/auth/register", registration_body("lee@example.com")))
        .await
        .expect("register");
    assert_eq!(created.status(), StatusCode::CREATED);

    let login = router
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({ "email": "lee@example.com", "password": "hunter2hunter2" }),
        ))
        .await
        .expect("login");
    assert_eq!(login.status(), StatusCode::OK);
    let token = body_json(login).await["token"].as_str().expect("token").to_string();

    let listed = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/accounts")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("list");
    assert_eq!(listed.status(), StatusCode::OK);

    let accounts = body_json(listed).await;
    assert_eq!(accounts.as_array().map(Vec::len), Some(1));
    assert_eq!(accounts[0]["email"], "lee@example.com");
}
