//! Session handling shared by the commands

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use pagecraft::config::{PagecraftConfig, TokenStoreKind};
use pagecraft_cli::Context;
use serde_json::{json, Value};

async fn login() -> Json<Value> {
    Json(json!({
        "access": "opaque-access",
        "refresh": "r1",
        "user": {"id": 1, "username": "root", "is_admin": true}
    }))
}

async fn rejected_token() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type"})),
    )
}

async fn missing() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."})))
}

async fn context() -> Context {
    let app = Router::new()
        .route("/api/auth/login/", post(login))
        .route("/api/templates/", get(rejected_token))
        .route("/api/templates/9/", get(missing));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut config = PagecraftConfig::default();
    config.api.base_url = format!("http://{addr}/api");
    config.session.store = TokenStoreKind::Memory;
    Context::new(config).await.unwrap()
}

/// Test that a signed-out bearer request tells the user to log in
#[tokio::test]
async fn test_bearer_requires_login() {
    let ctx = context().await;

    let err = ctx.bearer().await.unwrap_err();

    assert!(err.to_string().contains("pagecraft login"));
}

/// Test that a signed-in context hands out its token
#[tokio::test]
async fn test_bearer_after_login() {
    let ctx = context().await;
    ctx.session().login("root", "pw").await.unwrap();

    assert_eq!(ctx.bearer().await.unwrap(), "opaque-access");
}

/// Test that a 401 from the service drops the stored session
#[tokio::test]
async fn test_unauthorized_expires_session() {
    let ctx = context().await;
    ctx.session().login("root", "pw").await.unwrap();
    let bearer = ctx.bearer().await.unwrap();

    let result = ctx.api().list_templates(Some(&bearer)).await;
    let err = ctx.check(result).await.unwrap_err().to_string();

    assert!(err.contains("Given token not valid"));
    assert!(err.contains("pagecraft login"));
    assert!(!ctx.session().is_authenticated());
    assert!(ctx.bearer().await.is_err());
}

/// Test that other failures keep the session
#[tokio::test]
async fn test_not_found_keeps_session() {
    let ctx = context().await;
    ctx.session().login("root", "pw").await.unwrap();
    let bearer = ctx.bearer().await.unwrap();

    let result = ctx.api().get_template("9", Some(&bearer)).await;
    let err = ctx.check(result).await.unwrap_err().to_string();

    assert_eq!(err, "Not found.");
    assert!(ctx.session().is_authenticated());
}

/// Test that successes pass through untouched
#[tokio::test]
async fn test_check_passes_values() {
    let ctx = context().await;

    let value = ctx.check(Ok::<_, pagecraft::api::ApiError>(7)).await.unwrap();

    assert_eq!(value, 7);
}
