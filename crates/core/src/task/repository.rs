//! Task repository
//!
//! Typed CRUD over the task collection. Every mutation reads the whole
//! collection, transforms it and writes it back as one value under
//! [`TASKS_KEY`], so each call commits exactly one write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::changes::ChangeStream;
use super::draft::TaskDraft;
use super::model::{Task, TaskStatus};
use crate::storage::{KvStore, Subscription};
use crate::Result;

/// Storage key holding the serialized task collection
pub const TASKS_KEY: &str = "tasks";

/// Repository for task CRUD operations over a [`KvStore`]
#[derive(Clone)]
pub struct TaskRepository {
    store: Arc<KvStore>,
}

impl TaskRepository {
    /// Create a new TaskRepository on top of `store`
    pub fn new(store: Arc<KvStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<KvStore> {
        &self.store
    }

    /// Get all tasks in insertion order.
    ///
    /// A missing or unreadable collection is reported as empty. Elements
    /// that are not valid tasks are left out.
    pub fn list_all(&self) -> Vec<Task> {
        decode_collection(self.store.read(TASKS_KEY))
    }

    /// Get a task by ID
    pub fn get(&self, id: &str) -> Option<Task> {
        self.list_all().into_iter().find(|task| task.id == id)
    }

    /// Validate `draft`, append it to the collection and return the stored task
    pub fn create(&self, draft: TaskDraft) -> Result<Task> {
        draft.validate()?;

        let task = self.store.update(TASKS_KEY, move |current| {
            let mut records = decode_records(current);
            let id = next_id(&records, Utc::now());
            let task = draft.into_task(id);
            records.push(StoredRecord::Task(task.clone()));
            Ok((encode_records(&records)?, task))
        })?;

        debug!("Created task {}", task.id);
        Ok(task)
    }

    /// Delete a task by ID. Deleting an unknown ID is a no-op.
    pub fn delete(&self, id: &str) -> Result<()> {
        let removed = self.mutate(|records| {
            let before = records.len();
            records.retain(|record| record.task().map_or(true, |task| task.id != id));
            before != records.len()
        })?;

        if removed {
            debug!("Deleted task {}", id);
        }
        Ok(())
    }

    /// Replace the status of a task, leaving every other field as it was.
    /// Updating an unknown ID is a no-op.
    pub fn update_status(&self, id: &str, status: TaskStatus) -> Result<()> {
        let updated = self.mutate(|records| {
            let Some(slot) = records.iter_mut().find_map(|record| match record {
                StoredRecord::Task(task) if task.id == id => Some(task),
                _ => None,
            }) else {
                return false;
            };
            *slot = slot.clone().with_status(status.clone());
            true
        })?;

        if updated {
            debug!("Task {} is now {}", id, status);
        }
        Ok(())
    }

    /// Register `callback` to run after every committed change.
    ///
    /// The callback carries no payload; call [`list_all`](Self::list_all)
    /// for the fresh state.
    pub fn subscribe_to_changes<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.store.subscribe(TASKS_KEY, move |_| callback())
    }

    /// Async view of the change notifications
    pub fn changes(&self) -> ChangeStream {
        ChangeStream::new(&self.store, TASKS_KEY)
    }

    /// Rewrite the collection through `transform`, reporting whether it changed anything
    fn mutate<F>(&self, transform: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<StoredRecord>) -> bool,
    {
        self.store.update(TASKS_KEY, |current| {
            let mut records = decode_records(current);
            let changed = transform(&mut records);
            Ok((encode_records(&records)?, changed))
        })
    }
}

/// One element of the stored array
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum StoredRecord {
    Task(Task),
    /// Not a valid task; written back exactly as it was read
    Unreadable(Value),
}

impl StoredRecord {
    fn task(&self) -> Option<&Task> {
        match self {
            Self::Task(task) => Some(task),
            Self::Unreadable(_) => None,
        }
    }

    fn numeric_id(&self) -> Option<i64> {
        let id = match self {
            Self::Task(task) => task.id.as_str(),
            Self::Unreadable(value) => value.get("id").and_then(Value::as_str)?,
        };
        id.parse().ok()
    }
}

/// Parse the stored array element by element.
///
/// Input that is not a JSON array yields nothing. An element that fails to
/// parse as a task is logged and kept as raw JSON so a later rewrite does not
/// drop it.
fn decode_records(raw: Option<String>) -> Vec<StoredRecord> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let elements: Vec<Value> = match serde_json::from_str(&raw) {
        Ok(elements) => elements,
        Err(e) => {
            warn!("Stored task collection is malformed, treating it as empty: {}", e);
            return Vec::new();
        }
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| match Task::deserialize(&element) {
            Ok(task) => StoredRecord::Task(task),
            Err(e) => {
                warn!("Task record {} is unreadable, keeping it as stored: {}", index, e);
                StoredRecord::Unreadable(element)
            }
        })
        .collect()
}

fn encode_records(records: &[StoredRecord]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Serialize a task collection to its persisted form
pub fn encode_collection(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string(tasks)?)
}

/// Parse a persisted task collection.
///
/// Absent or malformed input yields an empty collection; elements that are
/// not valid tasks are skipped. Both cases are logged.
pub fn decode_collection(raw: Option<String>) -> Vec<Task> {
    decode_records(raw)
        .into_iter()
        .filter_map(|record| match record {
            StoredRecord::Task(task) => Some(task),
            StoredRecord::Unreadable(_) => None,
        })
        .collect()
}

/// Time-derived ID: milliseconds since the epoch.
///
/// Bumped past the newest numeric ID already in the collection so that
/// creates within the same millisecond, or after a clock step backwards,
/// stay unique. Nothing coordinates IDs across processes.
fn next_id(records: &[StoredRecord], now: DateTime<Utc>) -> String {
    let candidate = now.timestamp_millis();
    let newest = records.iter().filter_map(StoredRecord::numeric_id).max();
    match newest {
        Some(newest) if newest >= candidate => (newest + 1).to_string(),
        _ => candidate.to_string(),
    }
}
