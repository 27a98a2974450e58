use async_trait::async_trait;
use chrono::NaiveTime;
use uuid::Uuid;

use crate::{
    errors::ManagerResult,
    models::schedule::{Day, NewSchedule, Schedule},
};

/// Storage the schedule rules run against.
///
/// Methods take `&mut self` so an implementation can be bound to a single
/// transaction: everything read through it and written through it commits or
/// rolls back together.
#[async_trait]
pub trait ScheduleRepository: Send {
    /// Schedules of `owner_id` in exactly this slot.
    async fn find_siblings(
        &mut self,
        owner_id: Uuid,
        day: Day,
        start: NaiveTime,
        stop: NaiveTime,
    ) -> ManagerResult<Vec<Schedule>>;

    async fn get(&mut self, id: Uuid) -> ManagerResult<Option<Schedule>>;

    /// All schedules in insertion order.
    async fn list(&mut self) -> ManagerResult<Vec<Schedule>>;

    async fn create(&mut self, schedule: NewSchedule) -> ManagerResult<Schedule>;

    async fn update(&mut self, schedule: Schedule) -> ManagerResult<Schedule>;

    /// Returns whether a row was removed.
    async fn delete(&mut self, id: Uuid) -> ManagerResult<bool>;
}
