use chrono::{NaiveDate, NaiveTime, Weekday};
use std::fmt;

use crate::calendar::weekday_name;

/// English ordinal for `n`: 1st, 2nd, 3rd, 4th, 11th, 21st, 113th.
pub fn ordinal(n: u32) -> String {
    let suffix = if (11..=13).contains(&(n % 100)) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{n}{suffix}")
}

/// Join items into an English list with an Oxford comma.
pub fn join_and<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [head @ .., last] => {
            let head = head.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ");
            format!("{head}, and {}", last.as_ref())
        }
    }
}

/// Turn a snake_case key into a title ("date_of_birth" -> "Date Of Birth").
pub fn format_label(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 12-hour clock without a leading pad ("6:30 AM").
pub fn format_time(time: NaiveTime) -> String {
    time.format("%l:%M %p").to_string().trim().to_string()
}

/// Parse a time-of-day as entered in client records.
pub fn parse_time_of_day(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(input, fmt).ok())
}

/// One displayable client field. Each kind has its own formatter.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Date(NaiveDate),
    Schedule(Vec<(Weekday, String)>),
    List(Vec<String>),
    Scalar(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Date(date) => write!(f, "{}", date.format("%B %d, %Y")),
            FieldValue::Schedule(slots) => {
                let slots = slots
                    .iter()
                    .map(|(day, time)| {
                        let time = parse_time_of_day(time)
                            .map(format_time)
                            .unwrap_or_else(|| time.clone());
                        format!("{}s at {}", weekday_name(*day), time)
                    })
                    .collect::<Vec<_>>();
                f.write_str(&join_and(&slots))
            }
            FieldValue::List(items) => f.write_str(&join_and(items)),
            FieldValue::Scalar(value) => f.write_str(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_label_capitalizes_each_word() {
        assert_eq!(format_label("date_of_birth"), "Date Of Birth");
        assert_eq!(format_label("jane_doe"), "Jane Doe");
    }

    #[test]
    fn format_time_uses_twelve_hour_clock() {
        let time = NaiveTime::from_hms_opt(18, 5, 0).unwrap();
        assert_eq!(format_time(time), "6:05 PM");
    }

    #[test]
    fn parse_time_of_day_accepts_common_forms() {
        let expected = NaiveTime::from_hms_opt(6, 30, 0).unwrap();
        assert_eq!(parse_time_of_day("06:30"), Some(expected));
        assert_eq!(parse_time_of_day("6:30 AM"), Some(expected));
        assert_eq!(parse_time_of_day("06:30:00"), Some(expected));
        assert_eq!(parse_time_of_day("soon"), None);
    }
}
