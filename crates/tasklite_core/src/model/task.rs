//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record mapped to and from the `tasks` table.
//! - Provide lifecycle helpers for the unpersisted -> persisted transition.
//!
//! # Invariants
//! - `task_id` is assigned exactly once, by the engine, at insert time.
//! - `title` must never be empty when the record is persisted.
//! - `created_at`/`updated_at` are owned by the engine and populated on
//!   read-back, never fabricated in memory.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Engine-assigned row identifier for task records.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = i64;

/// Default priority applied when the caller does not choose one.
pub const DEFAULT_PRIORITY: i64 = 3;

/// Inclusive priority range accepted by business rules.
pub const PRIORITY_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Canonical task record.
///
/// A freshly constructed record carries no identifier and no timestamps;
/// both are populated by the engine once the record is inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Engine-assigned identifier. `None` until the record is inserted.
    pub task_id: Option<TaskId>,
    /// Short human-readable title. Required, non-empty.
    pub title: String,
    /// Optional free-form details.
    pub description: Option<String>,
    /// Priority in `PRIORITY_RANGE`, lower is less urgent.
    pub priority: i64,
    /// Optional due date, stored as `YYYY-MM-DD` text.
    pub due_date: Option<NaiveDate>,
    /// Completion flag, stored as 0/1.
    pub completed: bool,
    /// Row creation timestamp, set by the engine on insert.
    pub created_at: Option<NaiveDateTime>,
    /// Last mutation timestamp, refreshed by every update.
    pub updated_at: Option<NaiveDateTime>,
}

impl Task {
    /// Creates an unpersisted task with default priority and no due date.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            task_id: None,
            title: title.into(),
            description: None,
            priority: DEFAULT_PRIORITY,
            due_date: None,
            completed: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Returns whether this record has been persisted yet.
    pub fn is_new(&self) -> bool {
        self.task_id.is_none()
    }

    /// Checks record-level integrity rules ahead of any write.
    ///
    /// # Errors
    /// - `TaskValidationError::EmptyTitle` when the title is blank.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// Integrity violations detected before SQL mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
    /// Insert was attempted on a record that already carries an id.
    AlreadyPersisted(TaskId),
    /// Update was attempted on a record that has no id yet.
    NotPersisted,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::AlreadyPersisted(id) => {
                write!(f, "task already persisted with id {id}; insert refused")
            }
            Self::NotPersisted => write!(f, "task has no id yet; update refused"),
        }
    }
}

impl Error for TaskValidationError {}

#[cfg(test)]
mod tests {
    use super::{Task, TaskValidationError, DEFAULT_PRIORITY};

    #[test]
    fn new_task_is_unpersisted_with_defaults() {
        let task = Task::new("write tests");
        assert!(task.is_new());
        assert_eq!(task.priority, DEFAULT_PRIORITY);
        assert!(!task.completed);
        assert!(task.created_at.is_none());
        assert!(task.updated_at.is_none());
    }

    #[test]
    fn blank_title_fails_validation() {
        let task = Task::new("   ");
        assert_eq!(task.validate(), Err(TaskValidationError::EmptyTitle));
    }

    #[test]
    fn task_serializes_with_date_fields() {
        let mut task = Task::new("export");
        task.due_date = chrono::NaiveDate::from_ymd_opt(2026, 8, 5);
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("2026-08-05"));
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }
}
