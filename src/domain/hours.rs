use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Europe::London;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::text::capitalize_first;
use super::validation::invalid_field;

lazy_static! {
    static ref CLOCK_TIME: Regex = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time pattern");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "check_open_times"))]
pub struct DayHours {
    pub open: bool,
    pub start: String,
    pub end: String,
}

impl DayHours {
    pub fn open(start: &str, end: &str) -> Self {
        DayHours {
            open: true,
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    pub fn closed() -> Self {
        DayHours {
            open: false,
            start: "09:00".to_string(),
            end: "17:00".to_string(),
        }
    }

    fn range(&self) -> String {
        format!("{} - {}", self.start, self.end)
    }
}

// Closed days keep whatever times the wizard last held.
fn check_open_times(day: &DayHours) -> Result<(), ValidationError> {
    if !day.open {
        return Ok(());
    }
    if !CLOCK_TIME.is_match(&day.start) {
        return Err(invalid_field("start", "clock_time", "Start time must be in HH:MM format"));
    }
    if !CLOCK_TIME.is_match(&day.end) {
        return Err(invalid_field("end", "clock_time", "End time must be in HH:MM format"));
    }
    Ok(())
}

/// Weekly opening hours. Always exactly seven days, iterated Monday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BusinessHours {
    #[validate(nested)]
    pub monday: DayHours,
    #[validate(nested)]
    pub tuesday: DayHours,
    #[validate(nested)]
    pub wednesday: DayHours,
    #[validate(nested)]
    pub thursday: DayHours,
    #[validate(nested)]
    pub friday: DayHours,
    #[validate(nested)]
    pub saturday: DayHours,
    #[validate(nested)]
    pub sunday: DayHours,
}

impl Default for BusinessHours {
    fn default() -> Self {
        BusinessHours {
            monday: DayHours::open("09:00", "17:00"),
            tuesday: DayHours::open("09:00", "17:00"),
            wednesday: DayHours::open("09:00", "17:00"),
            thursday: DayHours::open("09:00", "17:00"),
            friday: DayHours::open("09:00", "17:00"),
            saturday: DayHours::closed(),
            sunday: DayHours::closed(),
        }
    }
}

impl BusinessHours {
    pub fn days(&self) -> [(&'static str, &DayHours); 7] {
        [
            ("monday", &self.monday),
            ("tuesday", &self.tuesday),
            ("wednesday", &self.wednesday),
            ("thursday", &self.thursday),
            ("friday", &self.friday),
            ("saturday", &self.saturday),
            ("sunday", &self.sunday),
        ]
    }

    pub fn day(&self, weekday: Weekday) -> &DayHours {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    /// Whether the business is open at `at`, evaluated on UK local time.
    /// Days with unparseable times count as closed.
    pub fn is_open_at(&self, at: DateTime<Utc>) -> bool {
        let local = at.with_timezone(&London);
        let day = self.day(local.weekday());
        if !day.open {
            return false;
        }

        let (Ok(start), Ok(end)) = (
            NaiveTime::parse_from_str(&day.start, "%H:%M"),
            NaiveTime::parse_from_str(&day.end, "%H:%M"),
        ) else {
            return false;
        };

        let now = local.time();
        start <= now && now < end
    }
}

/// Renders open days as `"Monday - Friday: 09:00 - 17:00, Saturday: 10:00 - 14:00"`.
///
/// Closed days are dropped before grouping, so open days with identical
/// hours either side of a closed day end up in the same group.
pub fn format_business_hours(hours: &BusinessHours) -> String {
    let mut groups: Vec<(Vec<&'static str>, String)> = Vec::new();

    for (name, day) in hours.days() {
        if !day.open {
            continue;
        }
        let range = day.range();
        match groups.last_mut() {
            Some((days, last_range)) if *last_range == range => days.push(name),
            _ => groups.push((vec![name], range)),
        }
    }

    if groups.is_empty() {
        return "Closed".to_string();
    }

    groups
        .iter()
        .map(|(days, range)| {
            let label = match days.as_slice() {
                [only] => capitalize_first(only),
                [first, .., last] => {
                    format!("{} - {}", capitalize_first(first), capitalize_first(last))
                }
                [] => String::new(),
            };
            format!("{}: {}", label, range)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
