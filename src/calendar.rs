use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days a task form offers for scheduling, counted from today.
pub const SCHEDULING_HORIZON_DAYS: i64 = 28;

const LABEL_FORMAT: &str = "%A, %m/%d";

/// The visible span of a schedule: `today` through `today + max_future_days`.
///
/// Derived per request and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    today: NaiveDate,
    max_date: NaiveDate,
}

impl ScheduleWindow {
    /// `None` when the last day would fall past the supported calendar range.
    pub fn new(today: NaiveDate, max_future_days: u32) -> Option<Self> {
        let max_date = today.checked_add_signed(Duration::days(i64::from(max_future_days)))?;
        Some(Self { today, max_date })
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn max_date(&self) -> NaiveDate {
        self.max_date
    }

    /// Every date from today through the last visible day, inclusive.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = self.today;
        while current <= self.max_date {
            days.push(current);
            current = current + Duration::days(1);
        }
        days
    }
}

/// Full weekday name plus zero-padded month/day, e.g. `Monday, 06/10`.
pub fn format_day_label(date: NaiveDate) -> String {
    date.format(LABEL_FORMAT).to_string()
}

/// Range of dates the task form offers as `(min, max)`. Advisory only.
pub fn scheduling_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today, today + Duration::days(SCHEDULING_HORIZON_DAYS))
}

/// Parses a stored date, which must be exactly `YYYY-MM-DD` with zero padding.
pub fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    let bytes = input.as_bytes();
    let shaped = bytes.len() == 10
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { *b == b'-' } else { b.is_ascii_digit() });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}
