use crate::weekday_serde;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Frequency tag that makes a new task expire after seven days.
pub const THIS_WEEK: &str = "this_week";

/// A user-defined task repeated on a set of weekdays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTask {
    pub title: String,
    #[serde(rename = "schedule", with = "weekday_serde::list")]
    pub weekdays: Vec<Weekday>,
    #[serde(rename = "frequency", default)]
    pub frequency_tag: String,
    #[serde(rename = "delete_on", default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomTask {
    pub fn new<I>(title: impl Into<String>, weekdays: I, frequency_tag: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        let mut weekdays: Vec<Weekday> = weekdays.into_iter().collect();
        weekday_serde::canonicalize(&mut weekdays);
        Self {
            title: title.into(),
            weekdays,
            frequency_tag: frequency_tag.into(),
            expiry: None,
            extra: Map::new(),
        }
    }

    pub fn with_expiry(mut self, expiry: NaiveDate) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn is_scheduled_on(&self, day: Weekday) -> bool {
        self.weekdays.contains(&day)
    }

    /// A task with no weekdays left has been deleted.
    pub fn is_deleted(&self) -> bool {
        self.weekdays.is_empty()
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry.is_some_and(|expiry| today >= expiry)
    }

    pub fn is_live(&self, today: NaiveDate) -> bool {
        !self.is_deleted() && !self.is_expired(today)
    }

    /// Remove `day` from the schedule. Returns whether it was present.
    pub fn unschedule(&mut self, day: Weekday) -> bool {
        let before = self.weekdays.len();
        self.weekdays.retain(|d| *d != day);
        self.weekdays.len() != before
    }
}
