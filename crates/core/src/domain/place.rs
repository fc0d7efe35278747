use crate::domain::week::{day_name, format_clock, WEEK};
use chrono::Weekday;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One business returned by the places search, after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(rename = "distance")]
    pub distance_m: u32,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<OpenHours>,
    /// Upstream 0-10 scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// Opening window in minutes past midnight. `close_minutes` may exceed a day when the place
/// closes after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub open_minutes: u32,
    pub close_minutes: u32,
}

impl TimeRange {
    pub fn display(&self) -> String {
        format!(
            "{} - {}",
            format_clock(self.open_minutes),
            format_clock(self.close_minutes)
        )
    }
}

/// Regular weekly hours, indexed Monday..Sunday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenHours {
    days: [Option<TimeRange>; 7],
}

impl OpenHours {
    pub fn set(&mut self, day: Weekday, range: TimeRange) {
        self.days[day.num_days_from_monday() as usize] = Some(range);
    }

    pub fn get(&self, day: Weekday) -> Option<TimeRange> {
        self.days[day.num_days_from_monday() as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, TimeRange)> + '_ {
        WEEK.iter()
            .filter_map(move |day| self.get(*day).map(|range| (*day, range)))
    }
}

impl Serialize for OpenHours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present = self.iter().count();
        let mut map = serializer.serialize_map(Some(present))?;
        for (day, range) in self.iter() {
            map.serialize_entry(day_name(day), &range.display())?;
        }
        map.end()
    }
}
