use axum::http::{Method, StatusCode, header::SET_COOKIE};
use pretty_assertions::assert_eq;
use schedman_api::{
    handlers::auth::NO_REFRESH_TOKEN,
    middleware::{
        auth::CREDENTIALS_NOT_PROVIDED,
        jwt::{TOKEN_INVALID, TokenType},
    },
};
use schedman_core::validation::user::{BLANK, INVALID_EMAIL, PASSWORD_REQUIRED, REQUIRED};
use serde_json::json;

use crate::test_utils::{access_token, json_request, send, test_app};

#[tokio::test]
async fn test_health_and_version_are_public() {
    let (app, _) = test_app();
    let (status, _, body) = send(
        app.clone(),
        axum::http::Request::get("/health")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, _, body) = send(
        app,
        axum::http::Request::get("/version")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_register_reports_every_field() {
    let (app, _) = test_app();
    let request = json_request(
        Method::POST,
        "/api/register",
        json!({ "email": "not-an-email", "first_name": "x".repeat(31) }),
    );

    let (status, _, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["email"], json!([INVALID_EMAIL]));
    assert_eq!(body["password"], json!([PASSWORD_REQUIRED]));
    assert_eq!(
        body["first_name"],
        json!(["Ensure this field has no more than 30 characters."])
    );
}

#[tokio::test]
async fn test_register_missing_email() {
    let (app, _) = test_app();
    let request = json_request(Method::POST, "/api/register", json!({ "password": "" }));

    let (status, _, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["email"], json!([REQUIRED]));
    assert_eq!(body["password"], json!([PASSWORD_REQUIRED]));
}

#[tokio::test]
async fn test_login_blank_fields() {
    let (app, _) = test_app();
    let request = json_request(
        Method::POST,
        "/api/login",
        json!({ "email": "", "password": "" }),
    );

    let (status, _, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "email": [BLANK], "password": [BLANK] }));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _) = test_app();
    let request = axum::http::Request::post("/api/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let (status, _, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_refresh_without_token() {
    let (app, _) = test_app();
    let request = json_request(Method::POST, "/api/refresh/token", json!({}));

    let (status, headers, body) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": NO_REFRESH_TOKEN }));
    assert!(headers.get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_refresh_with_garbage_token() {
    let (app, _) = test_app();
    let request = json_request(
        Method::POST,
        "/api/refresh/token",
        json!({ "refresh": "garbage" }),
    );

    let (status, _, body) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": TOKEN_INVALID }));
}

#[tokio::test]
async fn test_refresh_rejects_access_token_from_cookie() {
    let (app, state) = test_app();
    let access = access_token(&state, TokenType::Access);
    let request = axum::http::Request::post("/api/refresh/token")
        .header("cookie", format!("refresh_token={}", access))
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, _, body) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": TOKEN_INVALID }));
}

#[tokio::test]
async fn test_logout_requires_authentication() {
    let (app, _) = test_app();
    let request = json_request(Method::POST, "/api/logout", json!({ "refresh": "x" }));

    let (status, _, body) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": CREDENTIALS_NOT_PROVIDED }));
}
