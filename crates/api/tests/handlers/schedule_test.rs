use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use schedman_api::{
    handlers::schedule::{PERMISSION_DENIED, ensure_can_modify},
    middleware::{
        auth::CREDENTIALS_NOT_PROVIDED,
        jwt::{TOKEN_INVALID, TokenType},
    },
};
use schedman_core::errors::ManagerError;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::{
    access_token, bearer_request, json_request, schedule_owned_by, send, test_app, user,
};

#[tokio::test]
async fn test_schedule_routes_require_authentication() {
    let id = Uuid::new_v4();
    let cases = [
        (Method::GET, "/api/schedule".to_string()),
        (Method::POST, "/api/schedule".to_string()),
        (Method::GET, "/api/schedule/grouped".to_string()),
        (Method::GET, format!("/api/schedule/{}", id)),
        (Method::PATCH, format!("/api/schedule/{}", id)),
        (Method::DELETE, format!("/api/schedule/{}", id)),
    ];

    for (method, uri) in cases {
        let (app, _) = test_app();
        let request = json_request(method.clone(), &uri, json!({ "day": "monday" }));

        let (status, _, body) = send(app, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body, json!({ "detail": CREDENTIALS_NOT_PROVIDED }));
    }
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let (app, state) = test_app();
    let refresh = access_token(&state, TokenType::Refresh);

    let (status, _, body) =
        send(app, bearer_request(Method::GET, "/api/schedule", &refresh)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": TOKEN_INVALID }));
}

#[tokio::test]
async fn test_access_cookie_is_read() {
    let (app, _) = test_app();
    let request = axum::http::Request::get("/api/schedule/grouped")
        .header("cookie", "access_token=forged")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, _, body) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": TOKEN_INVALID }));
}

#[test]
fn test_owner_may_modify() {
    let owner = user(false);
    let schedule = schedule_owned_by(owner.id);

    assert!(ensure_can_modify(&owner, &schedule).is_ok());
}

#[test]
fn test_superuser_may_modify_any_schedule() {
    let admin = user(true);
    let schedule = schedule_owned_by(Uuid::new_v4());

    assert!(ensure_can_modify(&admin, &schedule).is_ok());
}

#[test]
fn test_other_users_are_forbidden() {
    let stranger = user(false);
    let schedule = schedule_owned_by(Uuid::new_v4());

    match ensure_can_modify(&stranger, &schedule).unwrap_err() {
        ManagerError::Authorization(message) => assert_eq!(message, PERMISSION_DENIED),
        other => panic!("unexpected error: {:?}", other),
    }
}
