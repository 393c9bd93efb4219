use super::{PersistenceResult, RecordStore, live_tasks};
use crate::client::{ClientScheduleRecord, ClientStatus};
use crate::recurrence::EventRecord;
use crate::task::CustomTask;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Records {
    tasks: Vec<CustomTask>,
    events: Vec<EventRecord>,
    clients: Vec<ClientScheduleRecord>,
}

/// Store that keeps every collection in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<Records>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(self, tasks: Vec<CustomTask>) -> Self {
        self.lock().tasks = tasks;
        self
    }

    pub fn with_events(self, events: Vec<EventRecord>) -> Self {
        self.lock().events = events;
        self
    }

    pub fn with_clients(self, clients: Vec<ClientScheduleRecord>) -> Self {
        self.lock().clients = clients;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordStore for MemoryRecordStore {
    fn load_tasks(&self) -> PersistenceResult<Vec<CustomTask>> {
        Ok(self.lock().tasks.clone())
    }

    fn save_tasks(&self, tasks: &[CustomTask]) -> PersistenceResult<()> {
        self.lock().tasks = live_tasks(tasks).into_iter().cloned().collect();
        Ok(())
    }

    fn load_events(&self) -> PersistenceResult<Vec<EventRecord>> {
        Ok(self.lock().events.clone())
    }

    fn save_events(&self, events: &[EventRecord]) -> PersistenceResult<()> {
        self.lock().events = events.to_vec();
        Ok(())
    }

    fn load_client_records(&self) -> PersistenceResult<Vec<ClientScheduleRecord>> {
        Ok(self.lock().clients.clone())
    }

    fn save_client_record(&self, client: &ClientScheduleRecord) -> PersistenceResult<()> {
        let mut records = self.lock();
        match records
            .clients
            .iter_mut()
            .find(|existing| existing.client_name == client.client_name)
        {
            Some(existing) => *existing = client.clone(),
            None => records.clients.push(client.clone()),
        }
        Ok(())
    }

    fn move_client_record(
        &self,
        client: &ClientScheduleRecord,
        to: ClientStatus,
    ) -> PersistenceResult<()> {
        let mut records = self.lock();
        match records.clients.iter_mut().find(|existing| {
            existing.client_name == client.client_name && existing.status == client.status
        }) {
            Some(existing) => existing.status = to,
            None => {
                let mut moved = client.clone();
                moved.status = to;
                records.clients.push(moved);
            }
        }
        Ok(())
    }

    fn delete_client_record(&self, client: &ClientScheduleRecord) -> PersistenceResult<bool> {
        let mut records = self.lock();
        let before = records.clients.len();
        records.clients.retain(|existing| {
            existing.client_name != client.client_name || existing.status != client.status
        });
        Ok(records.clients.len() != before)
    }
}
