use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use schedman_core::{
    errors::{ManagerError, ManagerResult},
    models::{
        auth::{
            DetailResponse, LoginRequest, LoginResponse, RefreshResponse, RegisterRequest,
            TokenRequest,
        },
        user::{User, UserResponse},
    },
    validation::user::{
        EMAIL_TAKEN, is_valid_email, normalize_email, validate_credentials,
        validate_registration,
    },
};
use schedman_db::repositories::{token, user};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    ApiState,
    middleware::{
        auth::{self, CurrentUser, UserSpec},
        cookies::{append_cookies, clear_cookie, read_cookie, token_cookie},
        error_handling::{AppError, AppJson},
        jwt::{Claims, IssuedToken, TOKEN_INVALID, TokenType},
    },
};

pub const REGISTERED: &str = "Successfully Registered";
pub const LOGGED_OUT: &str = "Successfully logged out";
pub const NO_ACTIVE_ACCOUNT: &str = "No active account found with the given credentials";
pub const NO_REFRESH_TOKEN: &str = "No valid refresh token found.";
pub const TOKEN_BLACKLISTED: &str = "Token is blacklisted";

fn is_unique_violation(err: &eyre::Report) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_unique_violation())
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<DetailResponse>), AppError> {
    let email_taken = match payload.email.as_deref().map(normalize_email) {
        Some(email) if is_valid_email(&email) => user::email_exists(&state.db_pool, &email).await?,
        _ => false,
    };

    let registration = match (validate_registration(&payload), email_taken) {
        (Ok(registration), false) => registration,
        (Ok(_), true) => return Err(ManagerError::field("email", EMAIL_TAKEN).into()),
        (Err(ManagerError::InvalidFields(mut fields)), true) => {
            fields
                .entry("email".to_string())
                .or_default()
                .push(EMAIL_TAKEN.to_string());
            return Err(ManagerError::InvalidFields(fields).into());
        }
        (Err(err), _) => return Err(err.into()),
    };

    let spec = UserSpec {
        email: registration.email,
        password: registration.password,
        first_name: registration.first_name,
        last_name: registration.last_name,
        is_superuser: false,
    };

    match auth::create_user(&state.db_pool, spec).await {
        Ok(created) => info!("Registered user {}", created.id),
        // Lost a race with a concurrent registration of the same email.
        Err(ManagerError::Database(err)) if is_unique_violation(&err) => {
            return Err(ManagerError::field("email", EMAIL_TAKEN).into());
        }
        Err(err) => return Err(err.into()),
    }

    Ok((StatusCode::CREATED, Json(DetailResponse::new(REGISTERED))))
}

/// `Set-Cookie` headers for the tokens in cookie-only mode, none otherwise.
fn session_cookies(
    state: &ApiState,
    cookie_only: bool,
    access: &IssuedToken,
    refresh: Option<&IssuedToken>,
) -> ManagerResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    if !cookie_only {
        return Ok(headers);
    }

    let cookies = &state.auth.cookies;
    let mut values = vec![token_cookie(
        &cookies.access_name,
        &access.token,
        access.max_age(),
        cookies,
    )?];
    if let Some(refresh) = refresh {
        values.push(token_cookie(
            &cookies.refresh_name,
            &refresh.token,
            refresh.max_age(),
            cookies,
        )?);
    }
    append_cookies(&mut headers, values);

    Ok(headers)
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), AppError> {
    let credentials = validate_credentials(&payload)?;

    let account = user::get_user_by_email(&state.db_pool, &credentials.email)
        .await?
        .map(User::from)
        .filter(|account| {
            account.is_active && auth::verify_password(&credentials.password, &account.password_hash)
        })
        .ok_or_else(|| ManagerError::Authentication(NO_ACTIVE_ACCOUNT.to_string()))?;

    user::update_last_login(&state.db_pool, account.id).await?;
    let pair = state.tokens.issue_pair(account.id)?;
    debug!("Issued token pair for user {}", account.id);

    let cookie_only = payload.is_http_cookie_only;
    let headers = session_cookies(&state, cookie_only, &pair.access, Some(&pair.refresh))?;

    let response = LoginResponse {
        access: (!cookie_only).then(|| pair.access.token.clone()),
        refresh: (!cookie_only).then(|| pair.refresh.token.clone()),
        access_expiration: pair.access.expires_at(),
        refresh_expiration: pair.refresh.expires_at(),
        user: UserResponse::from(&account),
    };

    Ok((headers, Json(response)))
}

/// Refresh token from the body, falling back to the refresh cookie.
fn presented_refresh_token(
    state: &ApiState,
    headers: &HeaderMap,
    payload: &TokenRequest,
) -> Option<String> {
    payload
        .refresh
        .clone()
        .filter(|token| !token.is_empty())
        .or_else(|| read_cookie(headers, &state.auth.cookies.refresh_name))
}

async fn check_not_blacklisted(state: &ApiState, claims: &Claims) -> ManagerResult<()> {
    if token::is_token_blacklisted(&state.db_pool, claims.jti).await? {
        return Err(ManagerError::Authentication(TOKEN_BLACKLISTED.to_string()));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn refresh(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    payload: Option<Json<TokenRequest>>,
) -> Result<(HeaderMap, Json<RefreshResponse>), AppError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();

    let presented = presented_refresh_token(&state, &headers, &payload)
        .ok_or_else(|| ManagerError::Authentication(NO_REFRESH_TOKEN.to_string()))?;
    let claims = state.tokens.verify(&presented, TokenType::Refresh)?;
    check_not_blacklisted(&state, &claims).await?;

    let account = user::get_user_by_id(&state.db_pool, claims.sub)
        .await?
        .filter(|account| account.is_active)
        .ok_or_else(|| ManagerError::Authentication(NO_ACTIVE_ACCOUNT.to_string()))?;

    let access = state.tokens.issue(account.id, TokenType::Access)?;
    let rotated = if state.auth.rotate_refresh_tokens {
        token::blacklist_token(&state.db_pool, claims.jti, claims.sub, claims.expires_at()).await?;
        Some(state.tokens.issue(account.id, TokenType::Refresh)?)
    } else {
        None
    };

    let cookie_only = payload.is_http_cookie_only;
    let response_headers = session_cookies(&state, cookie_only, &access, rotated.as_ref())?;

    let response = RefreshResponse {
        access: (!cookie_only).then(|| access.token.clone()),
        refresh: rotated
            .as_ref()
            .filter(|_| !cookie_only)
            .map(|token| token.token.clone()),
        access_expiration: access.expires_at(),
        refresh_expiration: rotated
            .as_ref()
            .map(IssuedToken::expires_at)
            .unwrap_or_else(|| claims.expires_at()),
    };

    Ok((response_headers, Json(response)))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<Arc<ApiState>>,
    CurrentUser(current): CurrentUser,
    headers: HeaderMap,
    payload: Option<Json<TokenRequest>>,
) -> Result<(HeaderMap, Json<DetailResponse>), AppError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();

    let presented = presented_refresh_token(&state, &headers, &payload)
        .ok_or_else(|| ManagerError::Authentication(NO_REFRESH_TOKEN.to_string()))?;
    let claims = state
        .tokens
        .verify(&presented, TokenType::Refresh)
        .map_err(|_| ManagerError::BadRequest(TOKEN_INVALID.to_string()))?;
    check_not_blacklisted(&state, &claims)
        .await
        .map_err(|err| match err {
            ManagerError::Authentication(message) => ManagerError::BadRequest(message),
            other => other,
        })?;

    user::update_last_logout_at(&state.db_pool, current.id).await?;
    token::blacklist_token(&state.db_pool, claims.jti, claims.sub, claims.expires_at()).await?;
    info!("User {} logged out", current.id);

    let mut response_headers = HeaderMap::new();
    if payload.is_http_cookie_only {
        let cookies = &state.auth.cookies;
        append_cookies(
            &mut response_headers,
            vec![
                clear_cookie(&cookies.access_name, cookies)?,
                clear_cookie(&cookies.refresh_name, cookies)?,
            ],
        );
    }

    Ok((response_headers, Json(DetailResponse::new(LOGGED_OUT))))
}
