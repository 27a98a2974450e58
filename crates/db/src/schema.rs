use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email VARCHAR(254) NOT NULL UNIQUE,
            password_hash VARCHAR(255) NOT NULL,
            first_name VARCHAR(30) NULL,
            last_name VARCHAR(30) NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
            last_login TIMESTAMP WITH TIME ZONE NULL,
            last_logout_at TIMESTAMP WITH TIME ZONE NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create schedules table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schedules (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            day VARCHAR(10) NOT NULL,
            start TIME NOT NULL,
            stop TIME NOT NULL,
            badge_ids TEXT[] NOT NULL DEFAULT '{}',
            camera_ids BIGINT[] NOT NULL DEFAULT '{}',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_day CHECK (
                day IN ('monday', 'tuesday', 'wednesday', 'thursday', 'friday', 'saturday', 'sunday')
            ),
            CONSTRAINT single_id_kind CHECK (
                (cardinality(badge_ids) = 0) <> (cardinality(camera_ids) = 0)
            )
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create blacklisted_tokens table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blacklisted_tokens (
            jti UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            expires_at TIMESTAMP WITH TIME ZONE NOT NULL,
            blacklisted_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_schedules_slot ON schedules(owner_id, day, start, stop)",
        "CREATE INDEX IF NOT EXISTS idx_schedules_day ON schedules(day)",
        "CREATE INDEX IF NOT EXISTS idx_schedules_created_at ON schedules(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_blacklisted_tokens_expires_at ON blacklisted_tokens(expires_at)",
    ];
    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
