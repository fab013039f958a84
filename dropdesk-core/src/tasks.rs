//! Persisted task list.
//!
//! The list is hydrated once from a [`KeyValueStore`] slot and written back
//! whole after every mutation. There is no re-read after startup.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};
use crate::storage::KeyValueStore;

/// Storage slot holding the serialized task list
pub const STORAGE_KEY: &str = "tasks";

/// A single to-do entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    pub text: String,
    pub completed: bool,
}

/// Ordered task list mirrored into a storage slot
#[derive(Debug)]
pub struct TaskList<S: KeyValueStore> {
    store: S,
    tasks: Vec<TaskRecord>,
    last_id: i64,
}

impl<S: KeyValueStore> TaskList<S> {
    /// Hydrate from `store` and persist the result once.
    ///
    /// A missing or unparsable slot starts an empty list. Only a failing
    /// store is an error.
    pub fn initialize(store: S) -> Result<Self> {
        let tasks = match store.get(STORAGE_KEY)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<TaskRecord>>(&raw) {
                Ok(tasks) => tasks,
                Err(err) => {
                    tracing::warn!(error = %err, "Stored task list is unreadable, starting empty");
                    Vec::new()
                }
            },
        };

        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        tracing::info!(count = tasks.len(), "Hydrated task list");

        let mut list = Self {
            store,
            tasks,
            last_id,
        };
        list.persist()?;
        Ok(list)
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&TaskRecord> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of tasks not yet completed
    pub fn remaining(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Millisecond timestamp, bumped past the last id so ids stay unique
    fn next_id(&mut self) -> i64 {
        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id
    }

    /// Append a task with the trimmed text.
    ///
    /// Blank input is ignored without touching storage and returns `None`.
    pub fn add_task(&mut self, raw_text: &str) -> Result<Option<&TaskRecord>> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let record = TaskRecord {
            id: self.next_id(),
            text: text.to_string(),
            completed: false,
        };
        let id = record.id;
        let mut next = self.tasks.clone();
        next.push(record);
        self.commit(next)?;
        tracing::debug!(id, "Added task");
        Ok(self.tasks.last())
    }

    /// Remove the task with `id`, then persist. Returns whether it existed.
    pub fn delete_task(&mut self, id: i64) -> Result<bool> {
        let next: Vec<TaskRecord> = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        let removed = next.len() != self.tasks.len();
        self.commit(next)?;
        if removed {
            tracing::debug!(id, "Deleted task");
        }
        Ok(removed)
    }

    /// Flip `completed` on the task with `id`, then persist.
    /// Returns the new state, or `None` if no such task.
    pub fn toggle_task(&mut self, id: i64) -> Result<Option<bool>> {
        let mut next = self.tasks.clone();
        let state = next.iter_mut().find(|t| t.id == id).map(|task| {
            task.completed = !task.completed;
            task.completed
        });
        self.commit(next)?;
        if let Some(completed) = state {
            tracing::debug!(id, completed, "Toggled task");
        }
        Ok(state)
    }

    /// Write `next` to storage and adopt it only once the write succeeded
    fn commit(&mut self, next: Vec<TaskRecord>) -> Result<()> {
        let body = serde_json::to_string(&next).map_err(|e| DeskError::json("task list", e))?;
        self.store.set(STORAGE_KEY, &body)?;
        self.tasks = next;
        Ok(())
    }

    /// Serialized form of the whole list, exactly as stored
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.tasks).map_err(|e| DeskError::json("task list", e))
    }

    /// Overwrite the storage slot with the current list
    pub fn persist(&mut self) -> Result<()> {
        let body = self.to_json()?;
        self.store.set(STORAGE_KEY, &body)
    }
}
