use crate::models::DbUser;
use chrono::Utc;
use eyre::{Result, eyre};
use schedman_core::models::user::NewUser;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_user(pool: &Pool<Postgres>, user: &NewUser) -> Result<DbUser> {
    if user.email.is_empty() {
        return Err(eyre!("User must have an email address"));
    }
    if user.password_hash.is_empty() {
        return Err(eyre!("User must have a password"));
    }

    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating user: id={}, email={}, superuser={}",
        id, user.email, user.is_superuser
    );

    let created = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (id, email, password_hash, first_name, last_name, is_superuser, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING id, email, password_hash, first_name, last_name, is_active, is_superuser,
                  last_login, last_logout_at, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.is_superuser)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, password_hash, first_name, last_name, is_active, is_superuser,
               last_login, last_logout_at, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(pool: &Pool<Postgres>, email: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, password_hash, first_name, last_name, is_active, is_superuser,
               last_login, last_logout_at, created_at, updated_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn email_exists(pool: &Pool<Postgres>, email: &str) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)
        "#,
    )
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

pub async fn update_last_login(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET last_login = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn update_last_logout_at(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET last_logout_at = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}
