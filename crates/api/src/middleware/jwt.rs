//! Signed access and refresh tokens.
//!
//! Tokens are HS256 JWTs. Both kinds share one claim set and are told apart by
//! `token_type`, so a refresh token is never accepted where an access token
//! is expected and vice versa.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use schedman_core::errors::{ManagerError, ManagerResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;

pub const TOKEN_INVALID: &str = "Token is invalid or expired";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the user the token was issued to.
    pub sub: Uuid,
    pub token_type: TokenType,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }

    pub fn max_age(&self) -> i64 {
        (self.claims.exp - self.claims.iat).max(0)
    }
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Signing and verification keys plus the lifetime of each token kind.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, access_lifetime: Duration, refresh_lifetime: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_lifetime,
            refresh_lifetime,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            Duration::seconds(config.access_token_lifetime),
            Duration::seconds(config.refresh_token_lifetime),
        )
    }

    pub fn issue(&self, user_id: Uuid, token_type: TokenType) -> ManagerResult<IssuedToken> {
        let lifetime = match token_type {
            TokenType::Access => self.access_lifetime,
            TokenType::Refresh => self.refresh_lifetime,
        };
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            token_type,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ManagerError::Internal(Box::new(e)))?;

        Ok(IssuedToken { token, claims })
    }

    pub fn issue_pair(&self, user_id: Uuid) -> ManagerResult<TokenPair> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenType::Access)?,
            refresh: self.issue(user_id, TokenType::Refresh)?,
        })
    }

    /// Checks signature, expiry and kind. Every failure is reported as an
    /// authentication error with the same message.
    pub fn verify(&self, token: &str, expected: TokenType) -> ManagerResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!("Rejected token: {}", e);
                ManagerError::Authentication(TOKEN_INVALID.to_string())
            })?
            .claims;

        if claims.token_type != expected {
            return Err(ManagerError::Authentication(TOKEN_INVALID.to_string()));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys() -> TokenKeys {
        TokenKeys::new("test-secret", Duration::seconds(300), Duration::seconds(86_400))
    }

    #[test]
    fn test_issue_and_verify() {
        let keys = keys();
        let user_id = Uuid::new_v4();

        let access = keys.issue(user_id, TokenType::Access).unwrap();
        let claims = keys.verify(&access.token, TokenType::Access).unwrap();

        assert_eq!(claims, access.claims);
        assert_eq!(claims.sub, user_id);
        assert_eq!(access.max_age(), 300);
    }

    #[test]
    fn test_pair_has_distinct_ids() {
        let pair = keys().issue_pair(Uuid::new_v4()).unwrap();

        assert_ne!(pair.access.claims.jti, pair.refresh.claims.jti);
        assert_eq!(pair.refresh.max_age(), 86_400);
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let keys = keys();
        let refresh = keys.issue(Uuid::new_v4(), TokenType::Refresh).unwrap();

        let err = keys.verify(&refresh.token, TokenType::Access).unwrap_err();
        assert_eq!(err.to_string(), format!("Authentication error: {}", TOKEN_INVALID));
    }

    #[test]
    fn test_expired_rejected() {
        let keys = TokenKeys::new("test-secret", Duration::seconds(-60), Duration::seconds(-60));
        let access = keys.issue(Uuid::new_v4(), TokenType::Access).unwrap();

        assert!(keys.verify(&access.token, TokenType::Access).is_err());
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let other = TokenKeys::new("other-secret", Duration::seconds(300), Duration::seconds(300));
        let access = other.issue(Uuid::new_v4(), TokenType::Access).unwrap();

        assert!(keys().verify(&access.token, TokenType::Access).is_err());
        assert!(keys().verify("not-a-token", TokenType::Access).is_err());
    }
}
