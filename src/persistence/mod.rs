use crate::client::{ClientScheduleRecord, ClientStatus};
use crate::recurrence::EventRecord;
use crate::task::CustomTask;
use serde::Serialize;
use serde::de::{Deserialize, DeserializeOwned};
use serde_json::Value;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Backing store for everything the dashboard reads.
///
/// Saves are full overwrites of the collection. Callers load a snapshot,
/// compute on it, and write back in one step. Stored records that could
/// not be decoded on load are skipped by `load_*` and kept by `save_*`.
pub trait RecordStore {
    fn load_tasks(&self) -> PersistenceResult<Vec<CustomTask>>;
    fn save_tasks(&self, tasks: &[CustomTask]) -> PersistenceResult<()>;
    fn load_events(&self) -> PersistenceResult<Vec<EventRecord>>;
    fn save_events(&self, events: &[EventRecord]) -> PersistenceResult<()>;
    fn load_client_records(&self) -> PersistenceResult<Vec<ClientScheduleRecord>>;
    fn save_client_record(&self, client: &ClientScheduleRecord) -> PersistenceResult<()>;
    /// Move a stored client from `client.status` to `to`, keeping every
    /// field of the stored record.
    fn move_client_record(
        &self,
        client: &ClientScheduleRecord,
        to: ClientStatus,
    ) -> PersistenceResult<()>;
    /// Remove a stored client from `client.status`. Returns `false` when
    /// there was nothing to remove.
    fn delete_client_record(&self, client: &ClientScheduleRecord) -> PersistenceResult<bool>;

    /// Overwrite the stored `old` with `new`, which may carry a new name.
    fn replace_client_record(
        &self,
        old: &ClientScheduleRecord,
        new: &ClientScheduleRecord,
    ) -> PersistenceResult<()> {
        if old.client_name != new.client_name || old.status != new.status {
            self.delete_client_record(old)?;
        }
        self.save_client_record(new)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn load_tasks(&self) -> PersistenceResult<Vec<CustomTask>> {
        (**self).load_tasks()
    }

    fn save_tasks(&self, tasks: &[CustomTask]) -> PersistenceResult<()> {
        (**self).save_tasks(tasks)
    }

    fn load_events(&self) -> PersistenceResult<Vec<EventRecord>> {
        (**self).load_events()
    }

    fn save_events(&self, events: &[EventRecord]) -> PersistenceResult<()> {
        (**self).save_events(events)
    }

    fn load_client_records(&self) -> PersistenceResult<Vec<ClientScheduleRecord>> {
        (**self).load_client_records()
    }

    fn save_client_record(&self, client: &ClientScheduleRecord) -> PersistenceResult<()> {
        (**self).save_client_record(client)
    }

    fn move_client_record(
        &self,
        client: &ClientScheduleRecord,
        to: ClientStatus,
    ) -> PersistenceResult<()> {
        (**self).move_client_record(client, to)
    }

    fn delete_client_record(&self, client: &ClientScheduleRecord) -> PersistenceResult<bool> {
        (**self).delete_client_record(client)
    }

    fn replace_client_record(
        &self,
        old: &ClientScheduleRecord,
        new: &ClientScheduleRecord,
    ) -> PersistenceResult<()> {
        (**self).replace_client_record(old, new)
    }
}

/// Decode each element of a JSON array on its own, skipping the ones that
/// do not fit `T` instead of failing the whole collection.
pub(crate) fn decode_records<T: DeserializeOwned>(values: Vec<Value>, kind: &str) -> Vec<T> {
    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(kind, index, error = %err, "skipping malformed record");
            }
        }
    }
    records
}

/// Elements of a stored collection that do not decode as `T`. Saves write
/// them back untouched, after the records being saved.
pub(crate) fn undecodable<T: DeserializeOwned>(values: Vec<Value>) -> Vec<Value> {
    values
        .into_iter()
        .filter(|value| T::deserialize(value).is_err())
        .collect()
}

/// The JSON array a full-overwrite save writes: `records` followed by the
/// elements that were never readable.
pub(crate) fn with_unreadable<R: Serialize>(
    records: &[R],
    unreadable: Vec<Value>,
) -> PersistenceResult<Vec<Value>> {
    if !unreadable.is_empty() {
        tracing::debug!(count = unreadable.len(), "keeping unreadable records");
    }
    let mut values = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    values.extend(unreadable);
    Ok(values)
}

/// Tasks without any weekday are deletions and are not written back.
pub(crate) fn live_tasks(tasks: &[CustomTask]) -> Vec<&CustomTask> {
    tasks.iter().filter(|task| !task.is_deleted()).collect()
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{FileRecordStore, load_tasks_from_csv, save_tasks_to_csv};
pub use memory::MemoryRecordStore;
