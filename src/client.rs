use crate::format::{FieldValue, format_label};
use crate::weekday_serde;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether a client is active or has been moved to the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    #[default]
    Current,
    Archived,
}

impl ClientStatus {
    pub fn dir_name(self) -> &'static str {
        match self {
            ClientStatus::Current => "current",
            ClientStatus::Archived => "archived",
        }
    }
}

/// Directory key for a client name. Keys pass through unchanged, so
/// "Jane Doe", "jane doe" and "jane_doe" all name the same client.
pub fn directory_key(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// The scheduling-relevant part of a client's data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientScheduleRecord {
    #[serde(rename = "name")]
    pub client_name: String,
    #[serde(rename = "date_of_birth")]
    pub birth_date: NaiveDate,
    /// Regular training sessions: weekday and the time-of-day as entered.
    #[serde(rename = "training_schedule", default, with = "weekday_serde::times")]
    pub workout_weekdays: Vec<(Weekday, String)>,
    /// Days the client trains alone and needs a workout sent ahead.
    #[serde(rename = "additional_workouts", default, with = "weekday_serde::list")]
    pub extra_workout_weekdays: Vec<Weekday>,
    /// Set by the store from where the record lives, never persisted.
    #[serde(skip)]
    pub status: ClientStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientScheduleRecord {
    pub fn new(client_name: impl Into<String>, birth_date: NaiveDate) -> Self {
        Self {
            client_name: client_name.into(),
            birth_date,
            workout_weekdays: Vec::new(),
            extra_workout_weekdays: Vec::new(),
            status: ClientStatus::Current,
            extra: Map::new(),
        }
    }

    pub fn with_session(mut self, day: Weekday, time: impl Into<String>) -> Self {
        self.workout_weekdays.retain(|(d, _)| *d != day);
        self.workout_weekdays.push((day, time.into()));
        self.workout_weekdays
            .sort_by_key(|(d, _)| d.num_days_from_sunday());
        self
    }

    pub fn with_extra_workouts<I>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        self.extra_workout_weekdays.extend(days);
        weekday_serde::canonicalize(&mut self.extra_workout_weekdays);
        self
    }

    pub fn archived(mut self) -> Self {
        self.status = ClientStatus::Archived;
        self
    }

    pub fn is_current(&self) -> bool {
        self.status == ClientStatus::Current
    }

    pub fn session_on(&self, day: Weekday) -> Option<&str> {
        self.workout_weekdays
            .iter()
            .find(|(d, _)| *d == day)
            .map(|(_, time)| time.as_str())
    }

    pub fn has_extra_workout_on(&self, day: Weekday) -> bool {
        self.extra_workout_weekdays.contains(&day)
    }

    /// Directory-style key for the client ("Jane Doe" -> "jane_doe").
    pub fn directory_name(&self) -> String {
        directory_key(&self.client_name)
    }

    /// The name as shown in confirmations, rebuilt from the directory key.
    pub fn display_name(&self) -> String {
        format_label(&self.directory_name())
    }

    /// Labelled fields for a client profile page, in display order.
    pub fn profile(&self) -> Vec<(String, FieldValue)> {
        let mut fields = vec![
            (
                format_label("name"),
                FieldValue::Scalar(self.client_name.clone()),
            ),
            (
                format_label("date_of_birth"),
                FieldValue::Date(self.birth_date),
            ),
            (
                format_label("training_schedule"),
                FieldValue::Schedule(self.workout_weekdays.clone()),
            ),
            (
                format_label("additional_workouts"),
                FieldValue::List(
                    self.extra_workout_weekdays
                        .iter()
                        .map(|day| crate::calendar::weekday_name(*day).to_string())
                        .collect(),
                ),
            ),
        ];
        for (key, value) in &self.extra {
            let value = match value {
                Value::String(s) => FieldValue::Scalar(s.clone()),
                Value::Array(items) => FieldValue::List(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                ),
                Value::Null => continue,
                other => FieldValue::Scalar(other.to_string()),
            };
            fields.push((format_label(key), value));
        }
        fields
    }
}
