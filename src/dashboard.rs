use crate::agenda::{self, Agenda, Upcoming};
use crate::calendar::Window;
use crate::client::{ClientScheduleRecord, ClientStatus, directory_key};
use crate::describe::describe;
use crate::error::{RecordError, ValidationError};
use crate::persistence::{PersistenceError, PersistenceResult, RecordStore};
use crate::recurrence::{EventRecord, RecurringItem};
use crate::sweep::{SweepOutcome, SweepPlan, sweep_store};
use crate::task::{CustomTask, THIS_WEEK};
use crate::validation::{self, NewClient, NewEvent, NewTask};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime, Weekday};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("no {} client named '{name}'", .status.dir_name())]
    UnknownClient { name: String, status: ClientStatus },
}

/// Current and archived clients, each sorted by directory name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientRoster {
    pub current: Vec<ClientScheduleRecord>,
    pub archived: Vec<ClientScheduleRecord>,
}

/// Presentation-facing entry point.
///
/// Every read takes one snapshot from the store, computes on it, and only
/// then removes whatever the pass found to be expired.
pub struct Dashboard<S> {
    store: S,
    today: NaiveDate,
}

impl<S: RecordStore> Dashboard<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            today: Local::now().date_naive(),
        }
    }

    /// Pin the dashboard's notion of today.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn finish(&self, plan: SweepPlan) -> PersistenceResult<()> {
        if !plan.is_empty() {
            plan.apply(&self.store)?;
        }
        Ok(())
    }

    /// Today's task titles followed by workout reminders for tomorrow.
    pub fn today_agenda(&self) -> PersistenceResult<Vec<String>> {
        let tasks = self.store.load_tasks()?;
        let clients = self.store.load_client_records()?;

        let mut lines = agenda::tasks_for_day(&tasks, self.today.weekday(), self.today);
        lines.extend(agenda::workout_reminders(&clients, self.today));

        self.finish(SweepPlan::collect(&tasks, &[], self.today))?;
        Ok(lines)
    }

    pub fn week_agenda(&self) -> PersistenceResult<Agenda> {
        let tasks = self.store.load_tasks()?;
        let clients = self.store.load_client_records()?;
        let (week, plan) = agenda::week_agenda(&tasks, &clients, self.today);
        self.finish(plan)?;
        Ok(week)
    }

    pub fn birthdays_in_window(
        &self,
        window: Window,
    ) -> PersistenceResult<BTreeMap<NaiveDate, Vec<String>>> {
        let clients = self.store.load_client_records()?;
        Ok(agenda::birthdays_in_window(&clients, window, self.today))
    }

    pub fn events_in_window(&self, window: Window) -> PersistenceResult<Upcoming> {
        let events = self.store.load_events()?;
        let (upcoming, plan) = agenda::events_in_window(&events, window, self.today);
        self.finish(plan)?;
        Ok(upcoming)
    }

    /// Birthdays and events together, birthdays first on shared dates.
    pub fn upcoming(&self, window: Window) -> PersistenceResult<BTreeMap<NaiveDate, Vec<String>>> {
        let mut merged: BTreeMap<NaiveDate, Vec<String>> = self
            .birthdays_in_window(window)?
            .into_iter()
            .map(|(date, names)| {
                let lines = names
                    .into_iter()
                    .map(|name| format!("{name}'s birthday"))
                    .collect();
                (date, lines)
            })
            .collect();
        for (date, titles) in self.events_in_window(window)?.entries {
            merged.entry(date).or_default().extend(titles);
        }
        Ok(merged)
    }

    pub fn todays_sessions(&self) -> PersistenceResult<Vec<(NaiveTime, String)>> {
        let clients = self.store.load_client_records()?;
        Ok(agenda::training_sessions(&clients, self.today.weekday()))
    }

    /// Description of `item` as it recurs in the current year.
    pub fn describe_recurrence(&self, item: &RecurringItem) -> String {
        describe(item, self.today.year())
    }

    /// Every stored event with its recurrence description, sorted by title.
    pub fn event_descriptions(
        &self,
    ) -> PersistenceResult<Vec<(EventRecord, Result<String, RecordError>)>> {
        let year = self.today.year();
        let mut events = self.store.load_events()?;
        events.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(events
            .into_iter()
            .map(|event| {
                let description = event.to_item().map(|item| describe(&item, year));
                (event, description)
            })
            .collect())
    }

    /// Validate and append a task. "this_week" tasks expire after 7 days.
    pub fn add_task(&self, input: NewTask) -> Result<CustomTask, DashboardError> {
        validation::validate_task(&input)?;
        let title = input.title.trim().replace('"', "'");
        let mut task = CustomTask::new(title, input.schedule, input.frequency.trim());
        if task.frequency_tag == THIS_WEEK {
            task.expiry = Some(self.today + Duration::days(7));
        }

        let mut tasks = self.store.load_tasks()?;
        tasks.push(task.clone());
        self.store.save_tasks(&tasks)?;
        tracing::info!(title = %task.title, "added task");
        Ok(task)
    }

    pub fn add_event(&self, input: NewEvent) -> Result<EventRecord, DashboardError> {
        validation::validate_event(&input)?;
        let record = EventRecord::new(input.title.trim(), input.date.trim(), input.frequency.trim());
        record.to_item()?;

        let mut events = self.store.load_events()?;
        events.push(record.clone());
        self.store.save_events(&events)?;
        tracing::info!(title = %record.title, "added event");
        Ok(record)
    }

    fn client_from_input(&self, input: NewClient) -> Result<ClientScheduleRecord, DashboardError> {
        validation::validate_client(&input, self.today)?;
        let birth_date = NaiveDate::parse_from_str(input.date_of_birth.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::new("Please enter a valid date of birth"))?;
        let name = format!("{} {}", input.first_name.trim(), input.last_name.trim());

        let mut client = ClientScheduleRecord::new(name, birth_date)
            .with_extra_workouts(input.additional_workouts);
        for (day, time) in input.training_schedule {
            client = client.with_session(day, time);
        }
        client
            .extra
            .insert("email".into(), Value::String(input.email.trim().to_string()));
        Ok(client)
    }

    pub fn add_client(&self, input: NewClient) -> Result<ClientScheduleRecord, DashboardError> {
        let client = self.client_from_input(input)?;
        self.store.save_client_record(&client)?;
        tracing::info!(client = %client.client_name, "added client");
        Ok(client)
    }

    pub fn clients(&self) -> PersistenceResult<ClientRoster> {
        let mut roster = ClientRoster::default();
        for client in self.store.load_client_records()? {
            match client.status {
                ClientStatus::Current => roster.current.push(client),
                ClientStatus::Archived => roster.archived.push(client),
            }
        }
        roster.current.sort_by_key(ClientScheduleRecord::directory_name);
        roster.archived.sort_by_key(ClientScheduleRecord::directory_name);
        Ok(roster)
    }

    /// Look a client up by display name or directory key.
    pub fn find_client(
        &self,
        name: &str,
        status: ClientStatus,
    ) -> Result<ClientScheduleRecord, DashboardError> {
        let key = directory_key(name);
        self.store
            .load_client_records()?
            .into_iter()
            .find(|client| {
                client.status == status && !key.is_empty() && client.directory_name() == key
            })
            .ok_or_else(|| DashboardError::UnknownClient {
                name: name.to_string(),
                status,
            })
    }

    /// Replace a current client's form fields. Fields the form does not
    /// cover are carried over, and a changed name renames the record.
    pub fn edit_client(
        &self,
        name: &str,
        input: NewClient,
    ) -> Result<ClientScheduleRecord, DashboardError> {
        let existing = self.find_client(name, ClientStatus::Current)?;
        let mut client = self.client_from_input(input)?;
        for (key, value) in &existing.extra {
            client
                .extra
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        let renamed = client.directory_name() != existing.directory_name();
        if renamed
            && self
                .find_client(&client.client_name, ClientStatus::Current)
                .is_ok()
        {
            return Err(ValidationError::new(format!(
                "{} is already one of your clients",
                client.client_name
            ))
            .into());
        }

        self.store.replace_client_record(&existing, &client)?;
        tracing::info!(client = %client.client_name, renamed, "edited client");
        Ok(client)
    }

    pub fn archive_client(&self, name: &str) -> Result<ClientScheduleRecord, DashboardError> {
        self.move_client(name, ClientStatus::Current, ClientStatus::Archived)
    }

    pub fn restore_client(&self, name: &str) -> Result<ClientScheduleRecord, DashboardError> {
        self.move_client(name, ClientStatus::Archived, ClientStatus::Current)
    }

    fn move_client(
        &self,
        name: &str,
        from: ClientStatus,
        to: ClientStatus,
    ) -> Result<ClientScheduleRecord, DashboardError> {
        let mut client = self.find_client(name, from)?;
        self.store.move_client_record(&client, to)?;
        tracing::info!(client = %client.client_name, to = to.dir_name(), "moved client");
        client.status = to;
        Ok(client)
    }

    /// Only archived clients can be deleted.
    pub fn delete_archived_client(&self, name: &str) -> Result<ClientScheduleRecord, DashboardError> {
        let client = self.find_client(name, ClientStatus::Archived)?;
        self.store.delete_client_record(&client)?;
        tracing::info!(client = %client.client_name, "deleted archived client");
        Ok(client)
    }

    /// Unschedule the given `(day, title)` pairs. Tasks left without any
    /// day are removed. Returns the distinct titles that were touched.
    pub fn remove_task_days(&self, removals: &[(Weekday, String)]) -> PersistenceResult<Vec<String>> {
        let mut tasks = self.store.load_tasks()?;
        let mut removed: Vec<String> = Vec::new();
        for task in &mut tasks {
            for (day, title) in removals {
                if task.title == *title && task.unschedule(*day) && !removed.contains(title) {
                    removed.push(title.clone());
                }
            }
        }
        if !removed.is_empty() {
            self.store.save_tasks(&tasks)?;
        }
        Ok(removed)
    }

    /// Remove every event whose title is listed. Returns how many went.
    pub fn delete_events(&self, titles: &[String]) -> PersistenceResult<usize> {
        let mut events = self.store.load_events()?;
        let before = events.len();
        events.retain(|event| !titles.contains(&event.title));
        let removed = before - events.len();
        if removed > 0 {
            self.store.save_events(&events)?;
        }
        Ok(removed)
    }

    pub fn sweep(&self) -> PersistenceResult<SweepOutcome> {
        sweep_store(&self.store, self.today)
    }
}
