use crate::persistence::{PersistenceResult, RecordStore};
use crate::recurrence::{EventRecord, Frequency};
use crate::task::CustomTask;
use chrono::NaiveDate;

/// True when an event has lapsed: its explicit expiry has been reached, or
/// it is a one-time event dated before today.
///
/// Records whose date or frequency cannot be parsed are never swept; they
/// are reported elsewhere and left for the user to fix.
pub fn is_lapsed_event(event: &EventRecord, today: NaiveDate) -> bool {
    if event.delete_on.is_some_and(|expiry| today >= expiry) {
        return true;
    }
    match event.to_item() {
        Ok(item) => item.frequency == Frequency::Once && item.anchor_date < today,
        Err(_) => false,
    }
}

/// Records found to be expired during a read-only pass, removed from the
/// store afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepPlan {
    tasks: Vec<CustomTask>,
    events: Vec<EventRecord>,
}

/// Counts of records actually removed by [`SweepPlan::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub tasks_removed: usize,
    pub events_removed: usize,
}

impl SweepOutcome {
    pub fn is_empty(&self) -> bool {
        self.tasks_removed == 0 && self.events_removed == 0
    }
}

impl SweepPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan removal of every expired task and lapsed event in a snapshot.
    pub fn collect(tasks: &[CustomTask], events: &[EventRecord], today: NaiveDate) -> Self {
        let mut plan = Self::new();
        for task in tasks.iter().filter(|task| task.is_expired(today)) {
            plan.add_task(task);
        }
        for event in events.iter().filter(|event| is_lapsed_event(event, today)) {
            plan.add_event(event);
        }
        plan
    }

    pub fn add_task(&mut self, task: &CustomTask) {
        if !self.tasks.contains(task) {
            self.tasks.push(task.clone());
        }
    }

    pub fn add_event(&mut self, event: &EventRecord) {
        if !self.events.contains(event) {
            self.events.push(event.clone());
        }
    }

    pub fn merge(&mut self, other: SweepPlan) {
        for task in &other.tasks {
            self.add_task(task);
        }
        for event in &other.events {
            self.add_event(event);
        }
    }

    pub fn tasks(&self) -> &[CustomTask] {
        &self.tasks
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.events.is_empty()
    }

    /// Remove the planned records from a fresh load of the store.
    ///
    /// Records that are already gone are ignored, and a collection is only
    /// rewritten when something was removed from it.
    pub fn apply<S: RecordStore + ?Sized>(&self, store: &S) -> PersistenceResult<SweepOutcome> {
        let mut outcome = SweepOutcome::default();

        if !self.tasks.is_empty() {
            let mut tasks = store.load_tasks()?;
            let before = tasks.len();
            tasks.retain(|task| !self.tasks.contains(task));
            outcome.tasks_removed = before - tasks.len();
            if outcome.tasks_removed > 0 {
                store.save_tasks(&tasks)?;
            }
        }

        if !self.events.is_empty() {
            let mut events = store.load_events()?;
            let before = events.len();
            events.retain(|event| !self.events.contains(event));
            outcome.events_removed = before - events.len();
            if outcome.events_removed > 0 {
                store.save_events(&events)?;
            }
        }

        if !outcome.is_empty() {
            tracing::info!(
                tasks = outcome.tasks_removed,
                events = outcome.events_removed,
                "swept expired records"
            );
        }
        Ok(outcome)
    }
}

/// Load a snapshot, plan, and apply the sweep in one step.
pub fn sweep_store<S: RecordStore + ?Sized>(
    store: &S,
    today: NaiveDate,
) -> PersistenceResult<SweepOutcome> {
    let tasks = store.load_tasks()?;
    let events = store.load_events()?;
    SweepPlan::collect(&tasks, &events, today).apply(store)
}
