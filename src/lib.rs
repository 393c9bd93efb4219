pub mod agenda;
pub mod calendar;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod describe;
pub mod error;
pub mod format;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod messages;
pub mod persistence;
pub mod recurrence;
pub mod sweep;
pub mod task;
pub mod validation;
pub(crate) mod weekday_serde;

pub use agenda::{Agenda, Upcoming};
pub use calendar::{Window, in_month, in_week, normalize, project};
pub use client::{ClientScheduleRecord, ClientStatus};
pub use config::AgendaConfig;
pub use dashboard::{ClientRoster, Dashboard, DashboardError};
pub use describe::describe;
pub use error::{RecordError, ValidationError};
pub use format::{FieldValue, join_and, ordinal};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteRecordStore;
pub use persistence::{
    FileRecordStore, MemoryRecordStore, PersistenceError, RecordStore, load_tasks_from_csv,
    save_tasks_to_csv,
};
pub use recurrence::{EventRecord, Frequency, ParseFrequencyError, RecurringItem, occurrences};
pub use sweep::{SweepOutcome, SweepPlan, sweep_store};
pub use task::CustomTask;
pub use validation::{NewClient, NewEvent, NewTask};
