use async_trait::async_trait;
use chrono::NaiveTime;
use mockall::mock;
use schedman_core::{
    errors::ManagerResult,
    models::schedule::{Day, NewSchedule, Schedule},
    repository::ScheduleRepository,
};
use uuid::Uuid;

mock! {
    pub ScheduleRepo {}

    #[async_trait]
    impl ScheduleRepository for ScheduleRepo {
        async fn find_siblings(
            &mut self,
            owner_id: Uuid,
            day: Day,
            start: NaiveTime,
            stop: NaiveTime,
        ) -> ManagerResult<Vec<Schedule>>;

        async fn get(&mut self, id: Uuid) -> ManagerResult<Option<Schedule>>;

        async fn list(&mut self) -> ManagerResult<Vec<Schedule>>;

        async fn create(&mut self, schedule: NewSchedule) -> ManagerResult<Schedule>;

        async fn update(&mut self, schedule: Schedule) -> ManagerResult<Schedule>;

        async fn delete(&mut self, id: Uuid) -> ManagerResult<bool>;
    }
}
