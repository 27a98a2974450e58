use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use thiserror::Error;
use uuid::Uuid;

/// Day of the week a schedule applies to.
///
/// Serialized in lower case (`"monday"`), which is also how it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// Every day, Monday first.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("\"{0}\" is not a valid day")]
pub struct ParseDayError(pub String);

impl FromStr for Day {
    type Err = ParseDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::ALL
            .into_iter()
            .find(|day| day.as_str() == s)
            .ok_or_else(|| ParseDayError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub day: Day,
    #[serde(with = "time_format")]
    pub start: NaiveTime,
    #[serde(with = "time_format")]
    pub stop: NaiveTime,
    pub badge_ids: Vec<String>,
    pub camera_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated schedule ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSchedule {
    pub owner_id: Uuid,
    pub day: Day,
    pub start: NaiveTime,
    pub stop: NaiveTime,
    pub badge_ids: Vec<String>,
    pub camera_ids: Vec<i64>,
}

/// Body of both `POST /api/schedule` and `PATCH /api/schedule/:id`.
///
/// Every field is optional at the wire level; creation requires `day`, `start`
/// and `stop`, while a partial update falls back to the stored values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    #[serde(default)]
    pub day: Option<Day>,
    #[serde(default, with = "time_format::option")]
    pub start: Option<NaiveTime>,
    #[serde(default, with = "time_format::option")]
    pub stop: Option<NaiveTime>,
    #[serde(default, deserialize_with = "badge_ids::deserialize")]
    pub badge_ids: Option<Vec<String>>,
    #[serde(default)]
    pub camera_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub day: Day,
    #[serde(with = "time_format")]
    pub start: NaiveTime,
    #[serde(with = "time_format")]
    pub stop: NaiveTime,
    pub badge_ids: Vec<String>,
    pub camera_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Schedule> for ScheduleResponse {
    fn from(schedule: Schedule) -> Self {
        Self {
            id: schedule.id,
            day: schedule.day,
            start: schedule.start,
            stop: schedule.stop,
            badge_ids: schedule.badge_ids,
            camera_ids: schedule.camera_ids,
            created_at: schedule.created_at,
            updated_at: schedule.updated_at,
        }
    }
}

/// One entry of the grouped view. Owner and day are implied by the grouping,
/// and an empty id list is left out instead of rendered as `[]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleView {
    #[serde(with = "time_format")]
    pub start: NaiveTime,
    #[serde(with = "time_format")]
    pub stop: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_ids: Option<Vec<i64>>,
}

impl From<&Schedule> for ScheduleView {
    fn from(schedule: &Schedule) -> Self {
        Self {
            start: schedule.start,
            stop: schedule.stop,
            badge_ids: (!schedule.badge_ids.is_empty()).then(|| schedule.badge_ids.clone()),
            camera_ids: (!schedule.camera_ids.is_empty()).then(|| schedule.camera_ids.clone()),
        }
    }
}

/// Schedules bucketed by day, always holding all seven days in Monday → Sunday
/// order. Serializes as a JSON object keyed by day name in that same order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSchedule {
    days: Vec<(Day, Vec<ScheduleView>)>,
}

impl GroupedSchedule {
    pub(crate) fn new(days: Vec<(Day, Vec<ScheduleView>)>) -> Self {
        Self { days }
    }

    pub fn get(&self, day: Day) -> &[ScheduleView] {
        self.days
            .iter()
            .find(|(d, _)| *d == day)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        self.days.iter().map(|(day, _)| *day)
    }
}

impl Serialize for GroupedSchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (day, entries) in &self.days {
            map.serialize_entry(day.as_str(), entries)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupedScheduleResponse {
    pub schedule: GroupedSchedule,
}

/// Time-of-day wire format: rendered as `HH:MM:SS`, accepted as `HH:MM`,
/// `HH:MM:SS` or `HH:MM:SS.ffffff`.
pub mod time_format {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%H:%M:%S";

    pub fn parse(raw: &str) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .map_err(|_| {
                "Time has wrong format. Use one of these formats instead: hh:mm[:ss[.uuuuuu]]."
                    .to_string()
            })
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer, de};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(time) => super::serialize(time, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).map_err(de::Error::custom))
                .transpose()
        }
    }
}

/// Badge ids are opaque strings, but clients commonly send them as numbers.
mod badge_ids {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BadgeId {
        Text(String),
        Number(i64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<String>>, D::Error> {
        let ids = Option::<Vec<BadgeId>>::deserialize(deserializer)?;
        Ok(ids.map(|ids| {
            ids.into_iter()
                .map(|id| match id {
                    BadgeId::Text(text) => text,
                    BadgeId::Number(number) => number.to_string(),
                })
                .collect()
        }))
    }
}
