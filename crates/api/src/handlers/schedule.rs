use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use schedman_core::{
    errors::ManagerError,
    models::{
        schedule::{GroupedScheduleResponse, Schedule, ScheduleRequest, ScheduleResponse},
        user::User,
    },
    repository::ScheduleRepository,
    services,
};
use schedman_db::repositories::schedule::{PgScheduleRepository, into_schedules, list_schedules};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        auth::CurrentUser,
        error_handling::{AppError, AppJson},
    },
};

pub const NOT_FOUND: &str = "No Schedule matches the given query.";
pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

/// Only the owner or a superuser may change a schedule.
pub fn ensure_can_modify(user: &User, schedule: &Schedule) -> Result<(), ManagerError> {
    if schedule.owner_id == user.id || user.is_superuser {
        Ok(())
    } else {
        Err(ManagerError::Authorization(PERMISSION_DENIED.to_string()))
    }
}

async fn find_schedule(repo: &mut PgScheduleRepository, id: Uuid) -> Result<Schedule, AppError> {
    repo.get(id)
        .await?
        .ok_or_else(|| AppError(ManagerError::NotFound(NOT_FOUND.to_string())))
}

#[axum::debug_handler]
pub async fn list_schedule(
    State(state): State<Arc<ApiState>>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let schedules = into_schedules(list_schedules(&state.db_pool).await?)?;

    Ok(Json(
        schedules.into_iter().map(ScheduleResponse::from).collect(),
    ))
}

#[axum::debug_handler]
pub async fn create_schedule(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    AppJson(payload): AppJson<ScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleResponse>), AppError> {
    let mut repo = PgScheduleRepository::begin(&state.db_pool).await?;
    let created = services::schedule::create_schedule(&mut repo, user.id, payload).await?;
    repo.commit().await?;

    info!("Created schedule {} for user {}", created.id, user.id);
    Ok((StatusCode::CREATED, Json(ScheduleResponse::from(created))))
}

#[axum::debug_handler]
pub async fn grouped_schedule(
    State(state): State<Arc<ApiState>>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<GroupedScheduleResponse>, AppError> {
    let mut repo = PgScheduleRepository::begin(&state.db_pool).await?;
    let schedule = services::schedule::grouped_schedules(&mut repo).await?;
    repo.commit().await?;

    Ok(Json(GroupedScheduleResponse { schedule }))
}

#[axum::debug_handler]
pub async fn get_schedule(
    State(state): State<Arc<ApiState>>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let schedule = schedman_db::repositories::schedule::get_schedule_by_id(&state.db_pool, id)
        .await?
        .map(Schedule::try_from)
        .transpose()?
        .ok_or_else(|| ManagerError::NotFound(NOT_FOUND.to_string()))?;

    Ok(Json(ScheduleResponse::from(schedule)))
}

#[axum::debug_handler]
pub async fn update_schedule(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let mut repo = PgScheduleRepository::begin(&state.db_pool).await?;
    let instance = find_schedule(&mut repo, id).await?;
    ensure_can_modify(&user, &instance)?;

    let updated = services::schedule::update_schedule(&mut repo, instance, payload).await?;
    repo.commit().await?;

    info!("Updated schedule {}", updated.id);
    Ok(Json(ScheduleResponse::from(updated)))
}

#[axum::debug_handler]
pub async fn delete_schedule(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut repo = PgScheduleRepository::begin(&state.db_pool).await?;
    let instance = find_schedule(&mut repo, id).await?;
    ensure_can_modify(&user, &instance)?;

    repo.delete(instance.id).await?;
    repo.commit().await?;

    info!("Deleted schedule {}", id);
    Ok(StatusCode::NO_CONTENT)
}
