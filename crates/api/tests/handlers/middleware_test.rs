use axum::http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION};
use pretty_assertions::assert_eq;
use rstest::rstest;
use schedman_api::middleware::{
    auth::{self, EMAIL_REQUIRED, PASSWORD_REQUIRED, UserSpec},
    error_handling::{AppError, SERVER_ERROR, map_error},
};
use schedman_core::errors::{FieldErrors, ManagerError};
use serde_json::json;

#[rstest]
#[case(ManagerError::NotFound("missing".into()), StatusCode::NOT_FOUND)]
#[case(ManagerError::Validation("invalid".into()), StatusCode::BAD_REQUEST)]
#[case(ManagerError::field("email", "bad"), StatusCode::BAD_REQUEST)]
#[case(ManagerError::BadRequest("bad".into()), StatusCode::BAD_REQUEST)]
#[case(ManagerError::Authentication("who".into()), StatusCode::UNAUTHORIZED)]
#[case(ManagerError::Authorization("no".into()), StatusCode::FORBIDDEN)]
#[case(ManagerError::Database(eyre::eyre!("down")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(
    ManagerError::Internal(Box::new(std::io::Error::other("boom"))),
    StatusCode::INTERNAL_SERVER_ERROR
)]
fn test_error_status(#[case] error: ManagerError, #[case] expected: StatusCode) {
    assert_eq!(map_error(error).status(), expected);
}

#[test]
fn test_validation_body_is_non_field() {
    let error = AppError(ManagerError::Validation(
        "Schedule with these IDs already exists.".to_string(),
    ));

    assert_eq!(
        error.body(),
        json!({ "non_field_errors": ["Schedule with these IDs already exists."] })
    );
}

#[test]
fn test_field_errors_body() {
    let mut fields = FieldErrors::new();
    fields.insert("email".to_string(), vec!["This field may not be blank.".to_string()]);
    fields.insert("password".to_string(), vec!["This field is required".to_string()]);

    assert_eq!(
        AppError(ManagerError::InvalidFields(fields)).body(),
        json!({
            "email": ["This field may not be blank."],
            "password": ["This field is required"],
        })
    );
}

#[test]
fn test_server_errors_hide_details() {
    let error = AppError(ManagerError::Database(eyre::eyre!("password authentication failed")));

    assert_eq!(error.body(), json!({ "detail": SERVER_ERROR }));
}

#[test]
fn test_detail_body() {
    let error = AppError(ManagerError::Authentication("Token is blacklisted".to_string()));

    assert_eq!(error.body(), json!({ "detail": "Token is blacklisted" }));
}

#[test]
fn test_hash_and_verify_password() {
    let hashed = auth::hash_password("Str0ng!pass").unwrap();

    assert!(hashed.starts_with("$argon2"));
    assert!(auth::verify_password("Str0ng!pass", &hashed));
    assert!(!auth::verify_password("wrong_password", &hashed));
    assert!(!auth::verify_password("Str0ng!pass", "not-a-hash"));
}

#[test]
fn test_hashes_are_salted() {
    let first = auth::hash_password("Str0ng!pass").unwrap();
    let second = auth::hash_password("Str0ng!pass").unwrap();

    assert_ne!(first, second);
}

#[rstest]
#[case("Bearer abc.def", Some("abc.def"))]
#[case("bearer abc.def", Some("abc.def"))]
#[case("Basic dXNlcjpwYXNz", None)]
#[case("Bearer ", None)]
#[case("abc.def", None)]
fn test_bearer_token(#[case] header: &str, #[case] expected: Option<&str>) {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(header).unwrap());

    assert_eq!(auth::bearer_token(&headers).as_deref(), expected);
}

#[test]
fn test_prepare_user_requires_email_and_password() {
    let no_email = UserSpec {
        password: "Str0ng!pass".to_string(),
        ..UserSpec::default()
    };
    let no_password = UserSpec {
        email: "admin@example.com".to_string(),
        ..UserSpec::default()
    };

    match auth::prepare_user(no_email).unwrap_err() {
        ManagerError::Validation(message) => assert_eq!(message, EMAIL_REQUIRED),
        other => panic!("unexpected error: {:?}", other),
    }
    match auth::prepare_user(no_password).unwrap_err() {
        ManagerError::Validation(message) => assert_eq!(message, PASSWORD_REQUIRED),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_prepare_user_hashes_password() {
    let prepared = auth::prepare_user(UserSpec {
        email: "admin@example.com".to_string(),
        password: "Str0ng!pass".to_string(),
        is_superuser: true,
        ..UserSpec::default()
    })
    .unwrap();

    assert!(prepared.is_superuser);
    assert_ne!(prepared.password_hash, "Str0ng!pass");
    assert!(auth::verify_password("Str0ng!pass", &prepared.password_hash));
}
