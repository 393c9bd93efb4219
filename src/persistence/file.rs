use super::{
    PersistenceError, PersistenceResult, RecordStore, decode_records, live_tasks, undecodable,
    with_unreadable,
};
use crate::calendar::weekday_name;
use crate::client::{ClientScheduleRecord, ClientStatus};
use crate::recurrence::EventRecord;
use crate::task::CustomTask;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

const TASKS_FILE: &str = "custom_tasks.json";
const EVENTS_FILE: &str = "custom_events.json";
const CLIENTS_DIR: &str = "clients";
const CLIENT_DATA_FILE: &str = "data.json";

/// JSON files under a data directory:
///
/// ```text
/// <root>/custom_tasks.json
/// <root>/custom_events.json
/// <root>/clients/current/<client>/data.json
/// <root>/clients/archived/<client>/data.json
/// ```
///
/// Missing files and directories read as empty collections.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    root: PathBuf,
}

impl FileRecordStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.root.join(TASKS_FILE)
    }

    pub fn events_path(&self) -> PathBuf {
        self.root.join(EVENTS_FILE)
    }

    pub fn clients_dir(&self, status: ClientStatus) -> PathBuf {
        self.root.join(CLIENTS_DIR).join(status.dir_name())
    }

    fn read_array(path: &Path) -> PersistenceResult<Vec<Value>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&contents)? {
            Value::Array(values) => Ok(values),
            Value::Null => Ok(Vec::new()),
            _ => Err(PersistenceError::InvalidData(format!(
                "{} does not contain a list of records",
                path.display()
            ))),
        }
    }

    fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> PersistenceResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, value)?;
        Ok(())
    }

    fn load_clients_in(&self, status: ClientStatus) -> PersistenceResult<Vec<ClientScheduleRecord>> {
        let dir = self.clients_dir(status);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name())
            .collect::<Vec<_>>();
        names.sort();

        let mut clients = Vec::with_capacity(names.len());
        for name in names {
            let path = dir.join(&name).join(CLIENT_DATA_FILE);
            if !path.exists() {
                continue;
            }
            let parsed = File::open(&path)
                .map_err(PersistenceError::from)
                .and_then(|file| {
                    serde_json::from_reader::<_, ClientScheduleRecord>(BufReader::new(file))
                        .map_err(PersistenceError::from)
                });
            match parsed {
                Ok(mut client) => {
                    client.status = status;
                    clients.push(client);
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping malformed client record");
                }
            }
        }
        Ok(clients)
    }
}

impl RecordStore for FileRecordStore {
    fn load_tasks(&self) -> PersistenceResult<Vec<CustomTask>> {
        let values = Self::read_array(&self.tasks_path())?;
        Ok(decode_records(values, "task"))
    }

    fn save_tasks(&self, tasks: &[CustomTask]) -> PersistenceResult<()> {
        let path = self.tasks_path();
        let tasks = live_tasks(tasks);
        let unreadable = undecodable::<CustomTask>(Self::read_array(&path)?);
        tracing::debug!(count = tasks.len(), "writing tasks");
        Self::write_json(&path, &with_unreadable(&tasks, unreadable)?)
    }

    fn load_events(&self) -> PersistenceResult<Vec<EventRecord>> {
        let values = Self::read_array(&self.events_path())?;
        Ok(decode_records(values, "event"))
    }

    fn save_events(&self, events: &[EventRecord]) -> PersistenceResult<()> {
        let path = self.events_path();
        let unreadable = undecodable::<EventRecord>(Self::read_array(&path)?);
        tracing::debug!(count = events.len(), "writing events");
        Self::write_json(&path, &with_unreadable(events, unreadable)?)
    }

    fn load_client_records(&self) -> PersistenceResult<Vec<ClientScheduleRecord>> {
        let mut clients = self.load_clients_in(ClientStatus::Current)?;
        clients.extend(self.load_clients_in(ClientStatus::Archived)?);
        Ok(clients)
    }

    fn save_client_record(&self, client: &ClientScheduleRecord) -> PersistenceResult<()> {
        let dir_name = client.directory_name();
        if dir_name.is_empty() {
            return Err(PersistenceError::InvalidData(
                "client record requires a name".into(),
            ));
        }
        let path = self
            .clients_dir(client.status)
            .join(dir_name)
            .join(CLIENT_DATA_FILE);
        Self::write_json(&path, client)
    }

    fn move_client_record(
        &self,
        client: &ClientScheduleRecord,
        to: ClientStatus,
    ) -> PersistenceResult<()> {
        if client.status == to {
            return Ok(());
        }
        let dir_name = client.directory_name();
        let source = self.clients_dir(client.status).join(&dir_name);
        let target = self.clients_dir(to).join(&dir_name);
        if target.exists() {
            return Err(PersistenceError::InvalidData(format!(
                "{} already has a client directory named {dir_name}",
                to.dir_name()
            )));
        }
        if !source.is_dir() {
            let mut moved = client.clone();
            moved.status = to;
            return self.save_client_record(&moved);
        }
        fs::create_dir_all(self.clients_dir(to))?;
        fs::rename(&source, &target)?;
        tracing::debug!(client = %client.client_name, from = client.status.dir_name(), to = to.dir_name(), "moved client directory");
        Ok(())
    }

    fn delete_client_record(&self, client: &ClientScheduleRecord) -> PersistenceResult<bool> {
        let dir_name = client.directory_name();
        if dir_name.is_empty() {
            return Ok(false);
        }
        let dir = self.clients_dir(client.status).join(dir_name);
        if !dir.is_dir() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)?;
        tracing::debug!(path = %dir.display(), "removed client directory");
        Ok(true)
    }

    /// A renamed client keeps its directory, and with it any documents
    /// stored next to `data.json`.
    fn replace_client_record(
        &self,
        old: &ClientScheduleRecord,
        new: &ClientScheduleRecord,
    ) -> PersistenceResult<()> {
        let source = self.clients_dir(old.status).join(old.directory_name());
        let target = self.clients_dir(new.status).join(new.directory_name());
        if source != target && source.is_dir() {
            if target.exists() {
                return Err(PersistenceError::InvalidData(format!(
                    "client directory {} already exists",
                    target.display()
                )));
            }
            fs::create_dir_all(self.clients_dir(new.status))?;
            fs::rename(&source, &target)?;
        }
        self.save_client_record(new)
    }
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    title: String,
    schedule: String,
    frequency: String,
    #[serde(default)]
    delete_on: String,
}

impl From<&CustomTask> for TaskCsvRecord {
    fn from(task: &CustomTask) -> Self {
        Self {
            title: task.title.clone(),
            schedule: join_weekdays(&task.weekdays),
            frequency: task.frequency_tag.clone(),
            delete_on: format_date(task.expiry),
        }
    }
}

impl TaskCsvRecord {
    fn into_task(self) -> PersistenceResult<CustomTask> {
        if self.title.trim().is_empty() {
            return Err(PersistenceError::InvalidData(
                "task row is missing a title".into(),
            ));
        }
        let weekdays = split_weekdays(&self.schedule)?;
        let mut task = CustomTask::new(self.title, weekdays, self.frequency);
        task.expiry = parse_date(&self.delete_on)?;
        Ok(task)
    }
}

pub fn save_tasks_to_csv<P: AsRef<Path>>(tasks: &[CustomTask], path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for task in live_tasks(tasks) {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read tasks from CSV. Rows that do not describe a task are skipped.
pub fn load_tasks_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<CustomTask>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    for (row, record) in reader.deserialize::<TaskCsvRecord>().enumerate() {
        match record.map_err(PersistenceError::from).and_then(TaskCsvRecord::into_task) {
            Ok(task) if !task.is_deleted() => tasks.push(task),
            Ok(_) => {}
            Err(err) => tracing::warn!(row, error = %err, "skipping malformed task row"),
        }
    }
    Ok(tasks)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn join_weekdays(days: &[Weekday]) -> String {
    days.iter()
        .map(|day| weekday_name(*day))
        .collect::<Vec<_>>()
        .join(";")
}

fn split_weekdays(input: &str) -> PersistenceResult<Vec<Weekday>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    input
        .split(';')
        .map(|part| {
            part.trim()
                .parse::<Weekday>()
                .map_err(|_| PersistenceError::InvalidData(format!("invalid weekday '{part}'")))
        })
        .collect()
}
