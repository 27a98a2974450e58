use crate::{
    errors::{FieldErrors, ManagerError, ManagerResult},
    models::auth::{LoginRequest, RegisterRequest},
};

pub const REQUIRED: &str = "This field is required.";
pub const PASSWORD_REQUIRED: &str = "This field is required";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const EMAIL_TAKEN: &str = "user with this email already exists.";
pub const WEAK_PASSWORD: &str = "Password must contain an uppercase letter, a lowercase letter, a digit and a special character.";

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 255;
pub const NAME_MAX_LENGTH: usize = 30;

/// Registration data that passed every check not needing the database.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

fn push(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.into());
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose structural check: a single `@`, a non-empty local part and a dotted
/// domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    }
}

/// Password strength errors, empty when the password is acceptable.
pub fn password_errors(password: &str) -> Vec<String> {
    let length = password.chars().count();
    let mut errors = Vec::new();

    if length < PASSWORD_MIN_LENGTH {
        errors.push(format!(
            "Ensure this field has at least {} characters.",
            PASSWORD_MIN_LENGTH
        ));
    } else if length > PASSWORD_MAX_LENGTH {
        errors.push(format!(
            "Ensure this field has no more than {} characters.",
            PASSWORD_MAX_LENGTH
        ));
    }

    let strong = password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric());
    if !strong {
        errors.push(WEAK_PASSWORD.to_string());
    }

    errors
}

fn optional_name(errors: &mut FieldErrors, field: &str, value: &Option<String>) -> Option<String> {
    let value = value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
    if value.chars().count() > NAME_MAX_LENGTH {
        push(
            errors,
            field,
            format!("Ensure this field has no more than {} characters.", NAME_MAX_LENGTH),
        );
    }
    Some(value.to_string())
}

/// Field checks for `POST /api/register`. Email uniqueness is checked by the
/// caller against the store.
pub fn validate_registration(request: &RegisterRequest) -> ManagerResult<Registration> {
    let mut errors = FieldErrors::new();

    let email = match request.email.as_deref().map(normalize_email) {
        None => {
            push(&mut errors, "email", REQUIRED);
            None
        }
        Some(email) if email.is_empty() => {
            push(&mut errors, "email", BLANK);
            None
        }
        Some(email) if !is_valid_email(&email) => {
            push(&mut errors, "email", INVALID_EMAIL);
            None
        }
        Some(email) => Some(email),
    };

    let password = match request.password.as_deref() {
        None | Some("") => {
            push(&mut errors, "password", PASSWORD_REQUIRED);
            None
        }
        Some(password) => {
            let problems = password_errors(password);
            if problems.is_empty() {
                Some(password.to_string())
            } else {
                errors.entry("password".to_string()).or_default().extend(problems);
                None
            }
        }
    };

    let first_name = optional_name(&mut errors, "first_name", &request.first_name);
    let last_name = optional_name(&mut errors, "last_name", &request.last_name);

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok(Registration {
            email,
            password,
            first_name,
            last_name,
        }),
        _ => Err(ManagerError::InvalidFields(errors)),
    }
}

/// Field checks for `POST /api/login`.
pub fn validate_credentials(request: &LoginRequest) -> ManagerResult<Credentials> {
    let mut errors = FieldErrors::new();

    let mut required = |field: &str, value: &Option<String>| match value.as_deref() {
        None => {
            push(&mut errors, field, REQUIRED);
            None
        }
        Some(v) if v.trim().is_empty() => {
            push(&mut errors, field, BLANK);
            None
        }
        Some(v) => Some(v.to_string()),
    };

    let email = required("email", &request.email);
    let password = required("password", &request.password);

    match (email, password) {
        (Some(email), Some(password)) => Ok(Credentials {
            email: normalize_email(&email),
            password,
        }),
        _ => Err(ManagerError::InvalidFields(errors)),
    }
}
