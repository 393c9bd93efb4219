use crate::calendar::{SUNDAY_FIRST, Window, project, week_order, weekday_name};
use crate::client::ClientScheduleRecord;
use crate::error::RecordError;
use crate::format::{join_and, parse_time_of_day};
use crate::recurrence::{EventRecord, occurrences};
use crate::sweep::{SweepPlan, is_lapsed_event};
use crate::task::CustomTask;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Serialize, Serializer};
use serde::ser::SerializeMap;
use std::collections::BTreeMap;

pub const NO_TASKS: &str = "You have no tasks scheduled";

/// Seven days of display lines, one entry per weekday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agenda {
    days: Vec<(Weekday, Vec<String>)>,
}

impl Agenda {
    pub fn days(&self) -> &[(Weekday, Vec<String>)] {
        &self.days
    }

    pub fn get(&self, day: Weekday) -> &[String] {
        self.days
            .iter()
            .find(|(d, _)| *d == day)
            .map(|(_, lines)| lines.as_slice())
            .unwrap_or(&[])
    }

    /// Same agenda, reordered to begin at `start`.
    pub fn starting_from(&self, start: Weekday) -> Agenda {
        let days = week_order(start)
            .iter()
            .map(|day| (*day, self.get(*day).to_vec()))
            .collect();
        Agenda { days }
    }
}

impl Serialize for Agenda {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (day, lines) in &self.days {
            map.serialize_entry(weekday_name(*day), lines)?;
        }
        map.end()
    }
}

/// Titles of live tasks scheduled on `day`, in store order.
pub fn tasks_for_day(tasks: &[CustomTask], day: Weekday, today: NaiveDate) -> Vec<String> {
    tasks
        .iter()
        .filter(|task| task.is_live(today) && task.is_scheduled_on(day))
        .map(|task| task.title.clone())
        .collect()
}

fn extra_workouts_on(clients: &[ClientScheduleRecord], day: Weekday) -> Vec<&str> {
    clients
        .iter()
        .filter(|client| client.is_current() && client.has_extra_workout_on(day))
        .map(|client| client.client_name.as_str())
        .collect()
}

/// Build the Sunday-to-Saturday agenda of tasks and client workouts.
///
/// Expired tasks are left out and returned in the plan for removal once
/// the caller is done with the snapshot.
pub fn week_agenda(
    tasks: &[CustomTask],
    clients: &[ClientScheduleRecord],
    today: NaiveDate,
) -> (Agenda, SweepPlan) {
    let mut plan = SweepPlan::new();
    for task in tasks.iter().filter(|task| task.is_expired(today)) {
        plan.add_task(task);
    }

    let days = SUNDAY_FIRST
        .iter()
        .map(|day| {
            let mut lines = tasks_for_day(tasks, *day, today);
            let names = extra_workouts_on(clients, *day);
            if !names.is_empty() {
                lines.push(format!("Client workouts due: {}", join_and(&names)));
            }
            if lines.is_empty() {
                lines.push(NO_TASKS.to_string());
            }
            (*day, lines)
        })
        .collect();

    (Agenda { days }, plan)
}

/// Reminders to send workouts ahead of tomorrow's solo sessions. On a
/// Friday the Sunday workouts are sent along with Saturday's.
pub fn workout_reminders(clients: &[ClientScheduleRecord], today: NaiveDate) -> Vec<String> {
    let tomorrow = today.succ_opt().unwrap_or(today).weekday();
    let mut reminders = extra_workouts_on(clients, tomorrow)
        .into_iter()
        .map(|name| format!("Send tomorrow's workout to {name}"))
        .collect::<Vec<_>>();
    if tomorrow == Weekday::Sat {
        reminders.extend(
            extra_workouts_on(clients, Weekday::Sun)
                .into_iter()
                .map(|name| format!("Send Sunday's workout to {name}")),
        );
    }
    reminders
}

/// Current clients training on `day`, ordered by session time.
pub fn training_sessions(clients: &[ClientScheduleRecord], day: Weekday) -> Vec<(NaiveTime, String)> {
    let mut sessions = Vec::new();
    for client in clients.iter().filter(|client| client.is_current()) {
        let Some(raw) = client.session_on(day) else {
            continue;
        };
        match parse_time_of_day(raw) {
            Some(time) => sessions.push((time, client.client_name.clone())),
            None => tracing::warn!(
                client = %client.client_name,
                time = raw,
                "skipping session with unreadable time"
            ),
        }
    }
    sessions.sort();
    sessions
}

/// Birthdays of all clients, current and archived, falling in `window`.
/// Keyed by this year's birthday.
pub fn birthdays_in_window(
    clients: &[ClientScheduleRecord],
    window: Window,
    today: NaiveDate,
) -> BTreeMap<NaiveDate, Vec<String>> {
    let mut birthdays: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
    for client in clients {
        if window.contains(client.birth_date, today) {
            birthdays
                .entry(project(client.birth_date, today))
                .or_default()
                .push(client.client_name.clone());
        }
    }
    birthdays
}

/// Event titles by date, plus the records that could not be used.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Upcoming {
    pub entries: BTreeMap<NaiveDate, Vec<String>>,
    #[serde(skip)]
    pub errors: Vec<RecordError>,
}

/// Occurrences of every event that fall in `window`.
///
/// Lapsed events are excluded and returned in the plan. Records that fail
/// to parse are reported in [`Upcoming::errors`]; the rest still count.
pub fn events_in_window(
    events: &[EventRecord],
    window: Window,
    today: NaiveDate,
) -> (Upcoming, SweepPlan) {
    let mut upcoming = Upcoming::default();
    let mut plan = SweepPlan::new();

    for event in events {
        if is_lapsed_event(event, today) {
            plan.add_event(event);
            continue;
        }
        let item = match event.to_item() {
            Ok(item) => item,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unusable event");
                upcoming.errors.push(err);
                continue;
            }
        };
        for date in occurrences(&item, today.year()) {
            if window.contains(date, today) {
                upcoming
                    .entries
                    .entry(date)
                    .or_default()
                    .push(item.title.clone());
            }
        }
    }

    (upcoming, plan)
}

/// Last day covered by `window` starting today.
pub fn window_end(window: Window, today: NaiveDate) -> NaiveDate {
    today + Duration::days(window.days())
}
