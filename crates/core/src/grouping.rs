//! Read-only per-day projection of the whole schedule collection.

use std::collections::HashSet;

use chrono::NaiveTime;

use crate::models::schedule::{Day, GroupedSchedule, Schedule, ScheduleView};

type EntryKey = (NaiveTime, NaiveTime, Vec<String>, Vec<i64>);

/// Key an entry is deduplicated on within a day. Id lists compare as ordered
/// sequences here, unlike the set comparison done before writes.
fn entry_key(view: &ScheduleView) -> EntryKey {
    (
        view.start,
        view.stop,
        view.badge_ids.clone().unwrap_or_default(),
        view.camera_ids.clone().unwrap_or_default(),
    )
}

/// Groups `schedules` by day.
///
/// `schedules` is expected in insertion order. Within a day entries are sorted
/// by start time (stable), and repeated `(start, stop, badge_ids, camera_ids)`
/// entries keep only their first occurrence. All seven days are present.
pub fn build_grouped_view(schedules: &[Schedule]) -> GroupedSchedule {
    let days = Day::ALL
        .into_iter()
        .map(|day| {
            let mut day_schedules: Vec<&Schedule> =
                schedules.iter().filter(|s| s.day == day).collect();
            day_schedules.sort_by_key(|s| s.start);

            let mut seen = HashSet::new();
            let entries = day_schedules
                .into_iter()
                .map(ScheduleView::from)
                .filter(|view| seen.insert(entry_key(view)))
                .collect();

            (day, entries)
        })
        .collect();

    GroupedSchedule::new(days)
}
