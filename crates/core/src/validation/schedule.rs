//! # Schedule validation
//!
//! A schedule carries exactly one kind of id list: badge ids or camera ids.
//! For a given owner and slot (`day`, `start`, `stop`) no two schedules may
//! carry the same set of ids of that kind. The rules run in a fixed order and
//! the first failing rule determines the error:
//!
//! 1. both kinds supplied
//! 2. neither kind supplied
//! 3. a sibling in the same slot carries the same id set (order-insensitive)
//! 4. on update, the payload switches kind while the stored schedule still
//!    carries the other kind
//!
//! Every failure is reported as [`ManagerError::Validation`], which the API
//! renders as a non-field error.

use std::collections::BTreeSet;

use chrono::NaiveTime;
use uuid::Uuid;

use crate::{
    errors::{ManagerError, ManagerResult},
    models::schedule::{Day, Schedule, ScheduleRequest},
};

pub const BOTH_ID_KINDS: &str = "You can provide either 'badge_ids' or 'camera_ids', not both.";
pub const MISSING_ID_KIND: &str = "You must provide either 'badge_ids' or 'camera_ids'.";
pub const DUPLICATE_SCHEDULE: &str = "Schedule with these IDs already exists.";
pub const BADGE_OVER_CAMERA: &str =
    "Cannot include badge IDs without removing existing camera IDs.";
pub const CAMERA_OVER_BADGE: &str =
    "Cannot include camera IDs without removing existing badge IDs.";

const REQUIRED: &str = "This field is required.";

/// Which id list a schedule carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Badge,
    Camera,
}

/// A schedule as submitted, with its slot fully resolved.
///
/// An absent id list and an empty one are treated alike.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleCandidate {
    pub owner_id: Uuid,
    pub day: Day,
    pub start: NaiveTime,
    pub stop: NaiveTime,
    pub badge_ids: Vec<String>,
    pub camera_ids: Vec<i64>,
}

impl ScheduleCandidate {
    /// Candidate for a new schedule. `day`, `start` and `stop` are required.
    pub fn for_create(owner_id: Uuid, request: &ScheduleRequest) -> ManagerResult<Self> {
        let mut missing = Vec::new();
        if request.day.is_none() {
            missing.push("day");
        }
        if request.start.is_none() {
            missing.push("start");
        }
        if request.stop.is_none() {
            missing.push("stop");
        }

        match (request.day, request.start, request.stop) {
            (Some(day), Some(start), Some(stop)) => Ok(Self {
                owner_id,
                day,
                start,
                stop,
                badge_ids: request.badge_ids.clone().unwrap_or_default(),
                camera_ids: request.camera_ids.clone().unwrap_or_default(),
            }),
            _ => Err(ManagerError::InvalidFields(
                missing
                    .into_iter()
                    .map(|field| (field.to_string(), vec![REQUIRED.to_string()]))
                    .collect(),
            )),
        }
    }

    /// Candidate for a partial update: slot fields left out of the request
    /// keep the stored values, id lists are taken as submitted.
    pub fn for_update(instance: &Schedule, request: &ScheduleRequest) -> Self {
        Self {
            owner_id: instance.owner_id,
            day: request.day.unwrap_or(instance.day),
            start: request.start.unwrap_or(instance.start),
            stop: request.stop.unwrap_or(instance.stop),
            badge_ids: request.badge_ids.clone().unwrap_or_default(),
            camera_ids: request.camera_ids.clone().unwrap_or_default(),
        }
    }
}

/// Rules 1 and 2: exactly one id kind must be present.
pub fn check_id_kind(candidate: &ScheduleCandidate) -> ManagerResult<IdKind> {
    match (candidate.badge_ids.is_empty(), candidate.camera_ids.is_empty()) {
        (false, false) => Err(ManagerError::Validation(BOTH_ID_KINDS.to_string())),
        (true, true) => Err(ManagerError::Validation(MISSING_ID_KIND.to_string())),
        (false, true) => Ok(IdKind::Badge),
        (true, false) => Ok(IdKind::Camera),
    }
}

fn same_set<T: Ord>(left: &[T], right: &[T]) -> bool {
    left.iter().collect::<BTreeSet<_>>() == right.iter().collect::<BTreeSet<_>>()
}

/// Whether `sibling` already carries the candidate's ids, compared as sets and
/// only for the kind the candidate carries.
pub fn is_duplicate(candidate: &ScheduleCandidate, kind: IdKind, sibling: &Schedule) -> bool {
    match kind {
        IdKind::Badge => same_set(&candidate.badge_ids, &sibling.badge_ids),
        IdKind::Camera => same_set(&candidate.camera_ids, &sibling.camera_ids),
    }
}

/// Decides whether `candidate` may be written.
///
/// `siblings` are the owner's schedules in the candidate's slot; when
/// `instance` is the schedule being updated it is skipped among them and the
/// kind-switch rule applies.
pub fn validate_schedule(
    candidate: &ScheduleCandidate,
    siblings: &[Schedule],
    instance: Option<&Schedule>,
) -> ManagerResult<()> {
    let kind = check_id_kind(candidate)?;

    let duplicate = siblings
        .iter()
        .filter(|sibling| instance.is_none_or(|current| current.id != sibling.id))
        .any(|sibling| is_duplicate(candidate, kind, sibling));
    if duplicate {
        return Err(ManagerError::Validation(DUPLICATE_SCHEDULE.to_string()));
    }

    if let Some(current) = instance {
        match kind {
            IdKind::Badge if !current.camera_ids.is_empty() => {
                return Err(ManagerError::Validation(BADGE_OVER_CAMERA.to_string()));
            }
            IdKind::Camera if !current.badge_ids.is_empty() => {
                return Err(ManagerError::Validation(CAMERA_OVER_BADGE.to_string()));
            }
            _ => {}
        }
    }

    Ok(())
}
