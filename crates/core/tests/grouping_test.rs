use chrono::{Duration, NaiveTime, Utc};
use pretty_assertions::assert_eq;
use schedman_core::{
    grouping::build_grouped_view,
    models::schedule::{Day, GroupedScheduleResponse, Schedule},
};
use serde_json::{json, to_value};
use uuid::Uuid;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

struct Fixture {
    owner: Uuid,
    schedules: Vec<Schedule>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            owner: Uuid::new_v4(),
            schedules: Vec::new(),
        }
    }

    fn add(&mut self, day: Day, start: NaiveTime, stop: NaiveTime, badges: &[&str], cameras: &[i64]) {
        let created_at = Utc::now() + Duration::milliseconds(self.schedules.len() as i64);
        self.schedules.push(Schedule {
            id: Uuid::new_v4(),
            owner_id: self.owner,
            day,
            start,
            stop,
            badge_ids: badges.iter().map(|b| b.to_string()).collect(),
            camera_ids: cameras.to_vec(),
            created_at,
            updated_at: created_at,
        });
    }
}

#[test]
fn test_every_day_present_in_order() {
    let view = build_grouped_view(&[]);

    assert_eq!(view.days().collect::<Vec<_>>(), Day::ALL.to_vec());
    for day in Day::ALL {
        assert!(view.get(day).is_empty());
    }
}

#[test]
fn test_serialized_keys_follow_weekday_order() {
    let mut fixture = Fixture::new();
    fixture.add(Day::Sunday, time(9, 0), time(10, 0), &[], &[1]);

    let response = GroupedScheduleResponse {
        schedule: build_grouped_view(&fixture.schedules),
    };
    let body = serde_json::to_string(&response).unwrap();

    let positions: Vec<usize> = Day::ALL
        .iter()
        .map(|day| body.find(&format!("\"{}\"", day)).expect("day key present"))
        .collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);

    assert_eq!(
        to_value(&response).unwrap()["schedule"]["sunday"],
        json!([{ "start": "09:00:00", "stop": "10:00:00", "camera_ids": [1] }])
    );
}

#[test]
fn test_entries_sorted_by_start() {
    let mut fixture = Fixture::new();
    fixture.add(Day::Monday, time(14, 0), time(15, 0), &["late"], &[]);
    fixture.add(Day::Monday, time(8, 0), time(9, 0), &["early"], &[]);
    fixture.add(Day::Monday, time(11, 0), time(12, 0), &["noon"], &[]);

    let view = build_grouped_view(&fixture.schedules);
    let starts: Vec<NaiveTime> = view.get(Day::Monday).iter().map(|e| e.start).collect();

    assert_eq!(starts, vec![time(8, 0), time(11, 0), time(14, 0)]);
}

#[test]
fn test_equal_starts_keep_insertion_order() {
    let mut fixture = Fixture::new();
    fixture.add(Day::Friday, time(8, 0), time(10, 0), &[], &[3]);
    fixture.add(Day::Friday, time(8, 0), time(9, 0), &[], &[1]);
    fixture.add(Day::Friday, time(8, 0), time(11, 0), &[], &[2]);

    let view = build_grouped_view(&fixture.schedules);
    let cameras: Vec<Vec<i64>> = view
        .get(Day::Friday)
        .iter()
        .map(|e| e.camera_ids.clone().unwrap())
        .collect();

    assert_eq!(cameras, vec![vec![3], vec![1], vec![2]]);
}

#[test]
fn test_identical_entries_collapse_to_first() {
    // Two owners can hold the same slot with the same ids.
    let mut fixture = Fixture::new();
    fixture.add(Day::Monday, time(0, 0), time(1, 0), &["1", "2", "3"], &[]);
    fixture.owner = Uuid::new_v4();
    fixture.add(Day::Monday, time(0, 0), time(1, 0), &["1", "2", "3"], &[]);
    fixture.add(Day::Monday, time(0, 0), time(1, 0), &["4"], &[]);

    let view = build_grouped_view(&fixture.schedules);
    let monday = view.get(Day::Monday);

    assert_eq!(monday.len(), 2);
    assert_eq!(monday[0].badge_ids, Some(vec!["1".to_string(), "2".to_string(), "3".to_string()]));
    assert_eq!(monday[1].badge_ids, Some(vec!["4".to_string()]));
    assert!(view.get(Day::Tuesday).is_empty());
}

#[test]
fn test_reordered_ids_are_not_collapsed() {
    let mut fixture = Fixture::new();
    fixture.add(Day::Wednesday, time(0, 0), time(1, 0), &[], &[1, 2, 3]);
    fixture.owner = Uuid::new_v4();
    fixture.add(Day::Wednesday, time(0, 0), time(1, 0), &[], &[3, 2, 1]);

    let view = build_grouped_view(&fixture.schedules);

    assert_eq!(view.get(Day::Wednesday).len(), 2);
}

#[test]
fn test_entries_omit_owner_day_and_empty_lists() {
    let mut fixture = Fixture::new();
    fixture.add(Day::Thursday, time(6, 30), time(7, 0), &[], &[42]);

    let value = to_value(build_grouped_view(&fixture.schedules)).unwrap();

    assert_eq!(
        value["thursday"][0],
        json!({ "start": "06:30:00", "stop": "07:00:00", "camera_ids": [42] })
    );
    assert_eq!(value["monday"], json!([]));
}
