use async_trait::async_trait;
use chrono::{NaiveTime, Utc};
use eyre::{Result, eyre};
use schedman_core::{
    errors::ManagerResult,
    models::schedule::{Day, NewSchedule, Schedule},
    repository::ScheduleRepository,
};
use sqlx::{PgConnection, PgExecutor, Postgres, Transaction};
use uuid::Uuid;

use crate::{DbPool, models::DbSchedule};

pub fn into_schedules(rows: Vec<DbSchedule>) -> Result<Vec<Schedule>> {
    rows.into_iter().map(Schedule::try_from).collect()
}

/// Serializes writers of one `(owner, day, start, stop)` slot until the
/// surrounding transaction ends.
pub async fn lock_slot(
    conn: &mut PgConnection,
    owner_id: Uuid,
    day: Day,
    start: NaiveTime,
    stop: NaiveTime,
) -> Result<()> {
    let key = format!("schedule:{}:{}:{}:{}", owner_id, day, start, stop);
    tracing::debug!("Locking schedule slot: {}", key);

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(key)
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn find_sibling_schedules<'e, E>(
    executor: E,
    owner_id: Uuid,
    day: Day,
    start: NaiveTime,
    stop: NaiveTime,
) -> Result<Vec<DbSchedule>>
where
    E: PgExecutor<'e>,
{
    let schedules = sqlx::query_as::<_, DbSchedule>(
        r#"
        SELECT id, owner_id, day, start, stop, badge_ids, camera_ids, created_at, updated_at
        FROM schedules
        WHERE owner_id = $1 AND day = $2 AND start = $3 AND stop = $4
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(owner_id)
    .bind(day.as_str())
    .bind(start)
    .bind(stop)
    .fetch_all(executor)
    .await?;

    Ok(schedules)
}

pub async fn get_schedule_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<DbSchedule>>
where
    E: PgExecutor<'e>,
{
    tracing::debug!("Getting schedule by id: {}", id);

    let schedule = sqlx::query_as::<_, DbSchedule>(
        r#"
        SELECT id, owner_id, day, start, stop, badge_ids, camera_ids, created_at, updated_at
        FROM schedules
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(schedule)
}

/// Every schedule, oldest first.
pub async fn list_schedules<'e, E>(executor: E) -> Result<Vec<DbSchedule>>
where
    E: PgExecutor<'e>,
{
    let schedules = sqlx::query_as::<_, DbSchedule>(
        r#"
        SELECT id, owner_id, day, start, stop, badge_ids, camera_ids, created_at, updated_at
        FROM schedules
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(schedules)
}

pub async fn create_schedule<'e, E>(executor: E, schedule: &NewSchedule) -> Result<DbSchedule>
where
    E: PgExecutor<'e>,
{
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating schedule: id={}, owner={}, day={}, badges={}, cameras={}",
        id,
        schedule.owner_id,
        schedule.day,
        schedule.badge_ids.len(),
        schedule.camera_ids.len()
    );

    let created = sqlx::query_as::<_, DbSchedule>(
        r#"
        INSERT INTO schedules (id, owner_id, day, start, stop, badge_ids, camera_ids, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        RETURNING id, owner_id, day, start, stop, badge_ids, camera_ids, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(schedule.owner_id)
    .bind(schedule.day.as_str())
    .bind(schedule.start)
    .bind(schedule.stop)
    .bind(&schedule.badge_ids)
    .bind(&schedule.camera_ids)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(created)
}

/// Writes every mutable column of `schedule`. The owner is never changed.
pub async fn update_schedule<'e, E>(executor: E, schedule: &Schedule) -> Result<DbSchedule>
where
    E: PgExecutor<'e>,
{
    let updated = sqlx::query_as::<_, DbSchedule>(
        r#"
        UPDATE schedules
        SET day = $2, start = $3, stop = $4, badge_ids = $5, camera_ids = $6, updated_at = $7
        WHERE id = $1
        RETURNING id, owner_id, day, start, stop, badge_ids, camera_ids, created_at, updated_at
        "#,
    )
    .bind(schedule.id)
    .bind(schedule.day.as_str())
    .bind(schedule.start)
    .bind(schedule.stop)
    .bind(&schedule.badge_ids)
    .bind(&schedule.camera_ids)
    .bind(schedule.updated_at)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| eyre!("Schedule not found"))?;

    Ok(updated)
}

pub async fn delete_schedule<'e, E>(executor: E, id: Uuid) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM schedules
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// [`ScheduleRepository`] bound to one PostgreSQL transaction.
///
/// Sibling lookups take the slot's advisory lock, so a validated write cannot
/// race another write to the same slot. Dropping the repository without
/// calling [`commit`](Self::commit) rolls everything back.
pub struct PgScheduleRepository {
    tx: Transaction<'static, Postgres>,
}

impl PgScheduleRepository {
    pub async fn begin(pool: &DbPool) -> Result<Self> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for PgScheduleRepository {
    async fn find_siblings(
        &mut self,
        owner_id: Uuid,
        day: Day,
        start: NaiveTime,
        stop: NaiveTime,
    ) -> ManagerResult<Vec<Schedule>> {
        lock_slot(&mut self.tx, owner_id, day, start, stop).await?;
        let rows = find_sibling_schedules(&mut *self.tx, owner_id, day, start, stop).await?;
        Ok(into_schedules(rows)?)
    }

    async fn get(&mut self, id: Uuid) -> ManagerResult<Option<Schedule>> {
        let row = get_schedule_by_id(&mut *self.tx, id).await?;
        Ok(row.map(Schedule::try_from).transpose()?)
    }

    async fn list(&mut self) -> ManagerResult<Vec<Schedule>> {
        let rows = list_schedules(&mut *self.tx).await?;
        Ok(into_schedules(rows)?)
    }

    async fn create(&mut self, schedule: NewSchedule) -> ManagerResult<Schedule> {
        let row = create_schedule(&mut *self.tx, &schedule).await?;
        Ok(Schedule::try_from(row)?)
    }

    async fn update(&mut self, schedule: Schedule) -> ManagerResult<Schedule> {
        let row = update_schedule(&mut *self.tx, &schedule).await?;
        Ok(Schedule::try_from(row)?)
    }

    async fn delete(&mut self, id: Uuid) -> ManagerResult<bool> {
        Ok(delete_schedule(&mut *self.tx, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::create_test_pool;
    use crate::repositories::user::create_user;
    use schedman_core::models::user::NewUser;

    fn time(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    #[tokio::test]
    #[ignore = "needs TEST_DATABASE_URL"]
    async fn test_schedule_round_trip_in_transaction() {
        let pool = create_test_pool().await;
        let owner = create_user(
            &pool,
            &NewUser {
                email: format!("{}@example.com", Uuid::new_v4()),
                password_hash: "hash".to_string(),
                first_name: None,
                last_name: None,
                is_superuser: false,
            },
        )
        .await
        .unwrap();

        let mut repo = PgScheduleRepository::begin(&pool).await.unwrap();
        let created = repo
            .create(NewSchedule {
                owner_id: owner.id,
                day: Day::Tuesday,
                start: time(9),
                stop: time(10),
                badge_ids: vec!["a".to_string()],
                camera_ids: vec![],
            })
            .await
            .unwrap();
        let siblings = repo
            .find_siblings(owner.id, Day::Tuesday, time(9), time(10))
            .await
            .unwrap();
        repo.commit().await.unwrap();

        assert_eq!(siblings.len(), 1);
        assert_eq!(siblings[0].id, created.id);

        assert!(delete_schedule(&pool, created.id).await.unwrap());
        assert!(get_schedule_by_id(&pool, created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "needs TEST_DATABASE_URL"]
    async fn test_rolled_back_without_commit() {
        let pool = create_test_pool().await;
        let owner = create_user(
            &pool,
            &NewUser {
                email: format!("{}@example.com", Uuid::new_v4()),
                password_hash: "hash".to_string(),
                first_name: None,
                last_name: None,
                is_superuser: false,
            },
        )
        .await
        .unwrap();

        let id = {
            let mut repo = PgScheduleRepository::begin(&pool).await.unwrap();
            repo.create(NewSchedule {
                owner_id: owner.id,
                day: Day::Sunday,
                start: time(1),
                stop: time(2),
                badge_ids: vec![],
                camera_ids: vec![7],
            })
            .await
            .unwrap()
            .id
        };

        assert!(get_schedule_by_id(&pool, id).await.unwrap().is_none());
    }
}
