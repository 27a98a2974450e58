use std::collections::BTreeMap;

use thiserror::Error;

/// Field name → messages, rendered as `{"field": ["message", ...]}`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Validation failure that is not tied to a single field.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid fields: {}", format_fields(.0))]
    InvalidFields(FieldErrors),

    /// Malformed request that is reported as a plain detail message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ManagerError {
    /// Builds an `InvalidFields` error carrying a single message for one field.
    pub fn field(name: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(name.to_string(), vec![message.to_string()]);
        ManagerError::InvalidFields(errors)
    }
}

fn format_fields(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type ManagerResult<T> = Result<T, ManagerError>;
