use crate::error::ValidationError;
use crate::format::join_and;
use crate::weekday_serde;
use chrono::{NaiveDate, Weekday};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// Form input for a new custom task.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub schedule: Vec<Weekday>,
    #[serde(default)]
    pub frequency: String,
}

/// Form input for a new custom event. `date` is kept as typed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewEvent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub frequency: String,
}

/// Form input for a new client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewClient {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, with = "weekday_serde::times")]
    pub training_schedule: Vec<(Weekday, String)>,
    #[serde(default, with = "weekday_serde::list")]
    pub additional_workouts: Vec<Weekday>,
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn validate_task(task: &NewTask) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if blank(&task.title) {
        errors.push("enter a task description");
    }
    if task.schedule.is_empty() {
        errors.push("set your task's schedule");
    }
    if blank(&task.frequency) {
        errors.push("select a frequency");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(format!("Please {}", join_and(&errors))))
    }
}

pub fn validate_event(event: &NewEvent) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if blank(&event.title) {
        errors.push("enter an event description");
    }
    if blank(&event.date) {
        errors.push("set your event's date");
    }
    if blank(&event.frequency) {
        errors.push("select a frequency");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(format!("Please {}", join_and(&errors))))
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$")
            .expect("email pattern compiles")
    })
}

pub fn validate_client(client: &NewClient, today: NaiveDate) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if blank(&client.first_name) || blank(&client.last_name) {
        errors.push("a complete name");
    }
    let birth_date = NaiveDate::parse_from_str(client.date_of_birth.trim(), "%Y-%m-%d").ok();
    if birth_date.is_none_or(|date| date > today) {
        errors.push("a valid date of birth");
    }
    if !email_pattern().is_match(client.email.trim()) {
        errors.push("a valid email address");
    }
    errors.sort_by_key(|message| message.len());
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(format!(
            "Please enter {}",
            join_and(&errors)
        )))
    }
}
