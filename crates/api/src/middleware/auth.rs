//! # Authentication Module
//!
//! Password hashing, user creation and the [`CurrentUser`] extractor that
//! authenticates requests.
//!
//! Passwords are stored as Argon2 hashes in PHC string format.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use eyre::Result;
use schedman_core::{
    errors::{ManagerError, ManagerResult},
    models::user::{NewUser, User},
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    ApiState,
    middleware::{cookies::read_cookie, error_handling::AppError, jwt::TokenType},
};

pub const CREDENTIALS_NOT_PROVIDED: &str = "Authentication credentials were not provided.";
pub const USER_NOT_FOUND: &str = "User not found";
pub const USER_INACTIVE: &str = "User is inactive";
pub const EMAIL_REQUIRED: &str = "User must have an email address";
pub const PASSWORD_REQUIRED: &str = "User must have a password";

/// Hashes a password using the Argon2 algorithm
///
/// A fresh random salt is generated for every call, so hashing the same
/// password twice yields different strings.
///
/// # Example
///
/// ```rust
/// use schedman_api::middleware::auth::{hash_password, verify_password};
///
/// let hashed = hash_password("Secr3t!pass").unwrap();
/// assert!(verify_password("Secr3t!pass", &hashed));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a fresh, random salt
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Checks `password` against a stored PHC hash. A malformed hash never
/// matches.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Account fields accepted by [`create_user`].
#[derive(Debug, Clone, Default)]
pub struct UserSpec {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_superuser: bool,
}

/// Hashes the password and stores the account.
///
/// Fails with a validation error when the email or password is empty.
pub async fn create_user(pool: &PgPool, spec: UserSpec) -> ManagerResult<User> {
    let new_user = prepare_user(spec)?;
    let created = schedman_db::repositories::user::create_user(pool, &new_user).await?;

    tracing::info!("Created user {}", created.id);
    Ok(User::from(created))
}

/// Checks the required fields and replaces the password with its hash.
pub fn prepare_user(spec: UserSpec) -> ManagerResult<NewUser> {
    if spec.email.is_empty() {
        return Err(ManagerError::Validation(EMAIL_REQUIRED.to_string()));
    }
    if spec.password.is_empty() {
        return Err(ManagerError::Validation(PASSWORD_REQUIRED.to_string()));
    }

    Ok(NewUser {
        email: spec.email,
        password_hash: hash_password(&spec.password)?,
        first_name: spec.first_name,
        last_name: spec.last_name,
        is_superuser: spec.is_superuser,
    })
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// The authenticated, active user making the request.
///
/// The access token is read from the `Authorization` header first and from
/// the access-token cookie otherwise.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl FromRequestParts<Arc<ApiState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| read_cookie(&parts.headers, &state.auth.cookies.access_name))
            .ok_or_else(|| ManagerError::Authentication(CREDENTIALS_NOT_PROVIDED.to_string()))?;

        let claims = state.tokens.verify(&token, TokenType::Access)?;

        let user = schedman_db::repositories::user::get_user_by_id(&state.db_pool, claims.sub)
            .await?
            .map(User::from)
            .ok_or_else(|| ManagerError::Authentication(USER_NOT_FOUND.to_string()))?;

        if !user.is_active {
            return Err(AppError(ManagerError::Authentication(USER_INACTIVE.to_string())));
        }

        Ok(CurrentUser(user))
    }
}
