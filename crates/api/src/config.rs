//! # API Configuration Module
//!
//! Loads the server configuration from environment variables, with defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Request timeout (default: 30)
//! - `JWT_SECRET`: Secret key used to sign tokens (required)
//! - `ACCESS_TOKEN_LIFETIME_SECONDS`: Access token lifetime (default: 300)
//! - `REFRESH_TOKEN_LIFETIME_SECONDS`: Refresh token lifetime (default: 86400)
//! - `ROTATE_REFRESH_TOKENS`: Issue a new refresh token on refresh (default: true)
//! - `JWT_AUTH_COOKIE`: Access token cookie name (default: "access_token")
//! - `JWT_AUTH_REFRESH_COOKIE`: Refresh token cookie name (default: "refresh_token")
//! - `JWT_AUTH_SECURE`: Mark token cookies `Secure` (default: false)
//! - `JWT_AUTH_SAMESITE`: `SameSite` attribute of token cookies (default: "Lax")

use eyre::{Result, WrapErr, eyre};
use std::env;
use tracing::Level;

/// Configuration for the schedman API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use schedman_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Token and cookie settings
    pub auth: AuthConfig,
}

/// Settings of the token-based authentication.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_lifetime: i64,
    pub refresh_token_lifetime: i64,
    pub rotate_refresh_tokens: bool,
    pub cookies: CookieConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CookieConfig {
    pub access_name: String,
    pub refresh_name: String,
    pub secure: bool,
    pub same_site: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_name: "access_token".to_string(),
            refresh_name: "refresh_token".to_string(),
            secure: false,
            same_site: "Lax".to_string(),
        }
    }
}

impl AuthConfig {
    /// Default lifetimes and cookie names around the given signing secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_lifetime: 300,
            refresh_token_lifetime: 86_400,
            rotate_refresh_tokens: true,
            cookies: CookieConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL or JWT_SECRET environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - A token lifetime is not a positive number of seconds
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // Network settings
        let host = var("API_HOST", "0.0.0.0");
        let port = var("API_PORT", "3000")
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;

        // Logging settings
        let log_level = match var("LOG_LEVEL", "info").as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Performance settings
        let request_timeout = var("API_REQUEST_TIMEOUT_SECONDS", "30")
            .parse()
            .unwrap_or(30);

        // Security settings
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| eyre!("JWT_SECRET environment variable must be set"))?;

        let lifetime = |key: &str, default: &str| -> Result<i64> {
            let seconds: i64 = var(key, default)
                .parse()
                .wrap_err_with(|| format!("Invalid {} value", key))?;
            if seconds <= 0 {
                return Err(eyre!("{} must be positive", key));
            }
            Ok(seconds)
        };
        let access_token_lifetime = lifetime("ACCESS_TOKEN_LIFETIME_SECONDS", "300")?;
        let refresh_token_lifetime = lifetime("REFRESH_TOKEN_LIFETIME_SECONDS", "86400")?;

        let flag = |key: &str, default: bool| match lookup(key) {
            Some(value) => matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
            None => default,
        };

        let cookies = CookieConfig {
            access_name: var("JWT_AUTH_COOKIE", "access_token"),
            refresh_name: var("JWT_AUTH_REFRESH_COOKIE", "refresh_token"),
            secure: flag("JWT_AUTH_SECURE", false),
            same_site: var("JWT_AUTH_SAMESITE", "Lax"),
        };

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            auth: AuthConfig {
                jwt_secret,
                access_token_lifetime,
                refresh_token_lifetime,
                rotate_refresh_tokens: flag("ROTATE_REFRESH_TOKENS", true),
                cookies,
            },
        })
    }

    /// Returns the server address as a string
    ///
    /// # Returns
    ///
    /// * `String` - Formatted server address (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
