use chrono::{DateTime, NaiveTime, Utc};
use eyre::{Report, eyre};
use schedman_core::models::{
    schedule::{Day, Schedule},
    user::User,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSchedule {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub day: String,
    pub start: NaiveTime,
    pub stop: NaiveTime,
    pub badge_ids: Vec<String>,
    pub camera_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbSchedule> for Schedule {
    type Error = Report;

    fn try_from(row: DbSchedule) -> Result<Self, Self::Error> {
        let day = row
            .day
            .parse::<Day>()
            .map_err(|e| eyre!("Corrupt schedule {}: {}", row.id, e))?;

        Ok(Schedule {
            id: row.id,
            owner_id: row.owner_id,
            day,
            start: row.start,
            stop: row.stop,
            badge_ids: row.badge_ids,
            camera_ids: row.camera_ids,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub last_logout_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            last_login: row.last_login,
            last_logout_at: row.last_logout_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBlacklistedToken {
    pub jti: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub blacklisted_at: DateTime<Utc>,
}
