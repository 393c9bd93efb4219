use super::{PersistenceResult, RecordStore, decode_records, live_tasks};
use crate::client::{ClientScheduleRecord, ClientStatus};
use crate::recurrence::EventRecord;
use crate::task::CustomTask;
use rusqlite::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// SQLite-backed store. Each record is one JSON row, so unknown keys
/// survive exactly as they do with the file store.
pub struct SqliteRecordStore {
    connection: Mutex<Connection>,
}

impl SqliteRecordStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS tasks (
                position INTEGER PRIMARY KEY,
                task_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS events (
                position INTEGER PRIMARY KEY,
                event_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS clients (
                name TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                client_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_json_rows(&self, sql: &str) -> PersistenceResult<Vec<Value>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut values = Vec::new();
        for json in rows {
            let json = json?;
            match serde_json::from_str::<Value>(&json) {
                Ok(value) => values.push(value),
                Err(err) => tracing::warn!(error = %err, "skipping unreadable sqlite row"),
            }
        }
        Ok(values)
    }

    /// Replace every row of `table` with `rows`. Existing rows that do not
    /// decode as `T` are kept, after the new ones.
    fn replace_rows<T: DeserializeOwned, R: Serialize>(
        &self,
        table: &str,
        column: &str,
        rows: &[R],
    ) -> PersistenceResult<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let unreadable = {
            let mut stmt =
                tx.prepare(&format!("SELECT {column} FROM {table} ORDER BY position ASC"))?;
            let existing = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut unreadable = Vec::new();
            for json in existing {
                let json = json?;
                if serde_json::from_str::<T>(&json).is_err() {
                    unreadable.push(json);
                }
            }
            unreadable
        };
        if !unreadable.is_empty() {
            tracing::debug!(table, count = unreadable.len(), "keeping unreadable rows");
        }

        tx.execute(&format!("DELETE FROM {table}"), [])?;
        {
            let mut stmt =
                tx.prepare(&format!("INSERT INTO {table} (position, {column}) VALUES (?1, ?2)"))?;
            let mut position = 0i64;
            for row in rows {
                stmt.execute(params![position, serde_json::to_string(row)?])?;
                position += 1;
            }
            for json in unreadable {
                stmt.execute(params![position, json])?;
                position += 1;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl RecordStore for SqliteRecordStore {
    fn load_tasks(&self) -> PersistenceResult<Vec<CustomTask>> {
        let values = self.load_json_rows("SELECT task_json FROM tasks ORDER BY position ASC")?;
        Ok(decode_records(values, "task"))
    }

    fn save_tasks(&self, tasks: &[CustomTask]) -> PersistenceResult<()> {
        self.replace_rows::<CustomTask, _>("tasks", "task_json", &live_tasks(tasks))
    }

    fn load_events(&self) -> PersistenceResult<Vec<EventRecord>> {
        let values = self.load_json_rows("SELECT event_json FROM events ORDER BY position ASC")?;
        Ok(decode_records(values, "event"))
    }

    fn save_events(&self, events: &[EventRecord]) -> PersistenceResult<()> {
        self.replace_rows::<EventRecord, _>("events", "event_json", events)
    }

    fn load_client_records(&self) -> PersistenceResult<Vec<ClientScheduleRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT status, client_json FROM clients ORDER BY status DESC, name ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut clients = Vec::new();
        for row in rows {
            let (status, json) = row?;
            match serde_json::from_str::<ClientScheduleRecord>(&json) {
                Ok(mut client) => {
                    client.status = if status == ClientStatus::Archived.dir_name() {
                        ClientStatus::Archived
                    } else {
                        ClientStatus::Current
                    };
                    clients.push(client);
                }
                Err(err) => tracing::warn!(error = %err, "skipping malformed client row"),
            }
        }
        Ok(clients)
    }

    fn save_client_record(&self, client: &ClientScheduleRecord) -> PersistenceResult<()> {
        let json = serde_json::to_string(client)?;
        let conn = self.lock();
        conn.execute(
            "INSERT INTO clients (name, status, client_json) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET status = excluded.status, client_json = excluded.client_json",
            params![client.client_name, client.status.dir_name(), json],
        )?;
        Ok(())
    }

    fn move_client_record(
        &self,
        client: &ClientScheduleRecord,
        to: ClientStatus,
    ) -> PersistenceResult<()> {
        let moved = {
            let conn = self.lock();
            conn.execute(
                "UPDATE clients SET status = ?1 WHERE name = ?2 AND status = ?3",
                params![to.dir_name(), client.client_name, client.status.dir_name()],
            )?
        };
        if moved == 0 {
            let mut moved = client.clone();
            moved.status = to;
            self.save_client_record(&moved)?;
        }
        Ok(())
    }

    fn delete_client_record(&self, client: &ClientScheduleRecord) -> PersistenceResult<bool> {
        let conn = self.lock();
        let removed = conn.execute(
            "DELETE FROM clients WHERE name = ?1 AND status = ?2",
            params![client.client_name, client.status.dir_name()],
        )?;
        Ok(removed > 0)
    }
}
