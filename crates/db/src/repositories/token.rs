use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Revokes a refresh token. Revoking twice is a no-op.
pub async fn blacklist_token(
    pool: &Pool<Postgres>,
    jti: Uuid,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO blacklisted_tokens (jti, user_id, expires_at, blacklisted_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (jti) DO NOTHING
        "#,
    )
    .bind(jti)
    .bind(user_id)
    .bind(expires_at)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn is_token_blacklisted(pool: &Pool<Postgres>, jti: Uuid) -> Result<bool> {
    let blacklisted = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (SELECT 1 FROM blacklisted_tokens WHERE jti = $1)
        "#,
    )
    .bind(jti)
    .fetch_one(pool)
    .await?;

    Ok(blacklisted)
}

/// Drops revocations of tokens that have expired anyway. Returns how many
/// rows were removed.
pub async fn purge_expired_tokens(pool: &Pool<Postgres>) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM blacklisted_tokens
        WHERE expires_at < $1
        "#,
    )
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
