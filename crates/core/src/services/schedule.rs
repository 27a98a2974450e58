//! Schedule write paths: validate against the stored siblings, then persist
//! through the same repository.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::{
    errors::ManagerResult,
    grouping::build_grouped_view,
    models::schedule::{GroupedSchedule, NewSchedule, Schedule, ScheduleRequest},
    repository::ScheduleRepository,
    validation::schedule::{ScheduleCandidate, check_id_kind, validate_schedule},
};

/// Creates a schedule owned by `owner_id`. The owner never comes from the
/// request body.
pub async fn create_schedule<R>(
    repo: &mut R,
    owner_id: Uuid,
    request: ScheduleRequest,
) -> ManagerResult<Schedule>
where
    R: ScheduleRepository + ?Sized,
{
    let candidate = ScheduleCandidate::for_create(owner_id, &request)?;
    check_id_kind(&candidate)?;

    let siblings = repo
        .find_siblings(owner_id, candidate.day, candidate.start, candidate.stop)
        .await?;
    validate_schedule(&candidate, &siblings, None)?;

    debug!(
        "Creating schedule: owner={}, day={}, start={}, stop={}",
        owner_id, candidate.day, candidate.start, candidate.stop
    );

    repo.create(NewSchedule {
        owner_id,
        day: candidate.day,
        start: candidate.start,
        stop: candidate.stop,
        badge_ids: candidate.badge_ids,
        camera_ids: candidate.camera_ids,
    })
    .await
}

/// Applies a partial update to `instance`, re-running validation against the
/// other schedules in the resulting slot.
pub async fn update_schedule<R>(
    repo: &mut R,
    instance: Schedule,
    request: ScheduleRequest,
) -> ManagerResult<Schedule>
where
    R: ScheduleRepository + ?Sized,
{
    let candidate = ScheduleCandidate::for_update(&instance, &request);
    check_id_kind(&candidate)?;

    let siblings = repo
        .find_siblings(
            instance.owner_id,
            candidate.day,
            candidate.start,
            candidate.stop,
        )
        .await?;
    validate_schedule(&candidate, &siblings, Some(&instance))?;

    debug!("Updating schedule: id={}", instance.id);

    let mut updated = instance;
    updated.day = candidate.day;
    updated.start = candidate.start;
    updated.stop = candidate.stop;
    if request.badge_ids.is_some() {
        updated.badge_ids = candidate.badge_ids;
    }
    if request.camera_ids.is_some() {
        updated.camera_ids = candidate.camera_ids;
    }
    updated.updated_at = Utc::now();

    repo.update(updated).await
}

pub async fn grouped_schedules<R>(repo: &mut R) -> ManagerResult<GroupedSchedule>
where
    R: ScheduleRepository + ?Sized,
{
    let schedules = repo.list().await?;
    Ok(build_grouped_view(&schedules))
}
