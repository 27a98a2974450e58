//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON bodies, so every endpoint
//! reports failures the same way:
//!
//! - field errors: `{"field": ["message", ...]}`
//! - other validation failures: `{"non_field_errors": ["message"]}`
//! - everything else: `{"detail": "message"}`

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use schedman_core::errors::ManagerError;
use serde_json::{Value, json};
use tracing::error;

/// Detail returned for failures whose cause is only logged.
pub const SERVER_ERROR: &str = "A server error occurred.";

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use schedman_api::middleware::error_handling::AppError;
/// use schedman_core::errors::ManagerError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(AppError(ManagerError::NotFound("No Schedule matches the given query.".into())));
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub ManagerError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ManagerError::NotFound(_) => StatusCode::NOT_FOUND,
            ManagerError::Validation(_) => StatusCode::BAD_REQUEST,
            ManagerError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            ManagerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ManagerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ManagerError::Authorization(_) => StatusCode::FORBIDDEN,
            ManagerError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ManagerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        match &self.0 {
            ManagerError::Validation(message) => json!({ "non_field_errors": [message] }),
            ManagerError::InvalidFields(fields) => json!(fields),
            ManagerError::NotFound(message)
            | ManagerError::BadRequest(message)
            | ManagerError::Authentication(message)
            | ManagerError::Authorization(message) => json!({ "detail": message }),
            ManagerError::Database(_) | ManagerError::Internal(_) => {
                json!({ "detail": SERVER_ERROR })
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        }

        (status, Json(self.body())).into_response()
    }
}

/// Automatic conversion from ManagerError to AppError
impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        AppError(err)
    }
}

/// Repository failures surface as database errors.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(ManagerError::Database(err))
    }
}

/// Malformed JSON bodies are reported as 400 with a detail message.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(ManagerError::BadRequest(rejection.body_text()))
    }
}

/// `Json` extractor whose rejection renders through [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Maps a ManagerError to an HTTP response
pub fn map_error(err: ManagerError) -> Response {
    AppError(err).into_response()
}
