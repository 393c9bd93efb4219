use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Canonical weekday order used by every agenda: Sunday through Saturday.
pub const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Rotate the canonical order so that it begins at `start`.
///
/// `week_order(Weekday::Mon)` gives the Monday-first order used by most
/// calendar displays; passing today's weekday gives a "next seven days" view.
pub fn week_order(start: Weekday) -> [Weekday; 7] {
    let offset = start.num_days_from_sunday() as usize;
    let mut order = SUNDAY_FIRST;
    order.rotate_left(offset);
    order
}

/// Full English name of a weekday ("Monday").
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Build a date, stepping the day back until it is valid for the month.
///
/// Returns `None` for a month outside `1..=12` or a year chrono cannot
/// represent. Day numbers are clamped into `1..=31` before stepping back,
/// so day 31 in April lands on April 30 and day 29 in a non-leap February
/// lands on February 28.
pub fn try_normalize(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let day = day.clamp(1, 31);
    // every month has at least 28 days, so at most four candidates
    (1..=day)
        .rev()
        .take(4)
        .find_map(|day| NaiveDate::from_ymd_opt(year, month, day))
}

/// Infallible form of [`try_normalize`]. An out-of-range month is clamped
/// into `1..=12`; a year beyond chrono's range saturates to
/// [`NaiveDate::MIN`] or [`NaiveDate::MAX`].
pub fn normalize(year: i32, month: u32, day: u32) -> NaiveDate {
    let month = month.clamp(1, 12);
    try_normalize(year, month, day).unwrap_or(if year < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

/// Move `date` into the year of `today`, keeping month and day.
pub fn project(date: NaiveDate, today: NaiveDate) -> NaiveDate {
    normalize(today.year(), date.month(), date.day())
}

/// Forward-looking windows used for birthdays and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    Week,
    Month,
}

impl Window {
    /// Length of the lookahead in days. `Month` is a fixed 30 days.
    pub fn days(self) -> i64 {
        match self {
            Window::Week => 7,
            Window::Month => 30,
        }
    }

    /// True when `date`, projected onto the current year, falls within
    /// `[today, today + days]`.
    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        let projected = project(date, today);
        projected >= today && projected <= today + Duration::days(self.days())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Window::Week => "week",
            Window::Month => "month",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "week" => Some(Window::Week),
            "month" => Some(Window::Month),
            _ => None,
        }
    }
}

pub fn in_week(date: NaiveDate, today: NaiveDate) -> bool {
    Window::Week.contains(date, today)
}

pub fn in_month(date: NaiveDate, today: NaiveDate) -> bool {
    Window::Month.contains(date, today)
}
