//! Task use-case service.
//!
//! # Responsibility
//! - Compose repository calls into task-oriented operations.
//! - Enforce business rules (title presence, priority range, due windows)
//!   before any write is attempted.
//!
//! # Invariants
//! - The service holds no SQL; all persistence goes through the repository.
//! - Due-window queries are inclusive on both ends and exclude records
//!   without a due date.

use crate::dates;
use crate::model::task::{Task, TaskId, TaskValidationError, DEFAULT_PRIORITY, PRIORITY_RANGE};
use crate::repo::task_repo::{RepoError, RepoResult, TaskCriteria, TaskRepository};
use chrono::NaiveDate;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// A business or integrity rule failed before any write.
    Validation(TaskValidationError),
    /// Due-window queries require a non-negative day count.
    InvalidDueWindow(i64),
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidDueWindow(days) => {
                write!(f, "due window must be >= 0 days, got {days}")
            }
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent task state: {details}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Request model for creating one task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `DEFAULT_PRIORITY` when absent; out-of-range values are
    /// clamped back to the default.
    pub priority: Option<i64>,
    pub due_date: Option<NaiveDate>,
}

impl CreateTaskRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Task service facade over repository implementations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one task and returns the persisted record.
    ///
    /// # Contract
    /// - Title must be non-empty; nothing is written otherwise.
    /// - Out-of-range priority falls back to the default.
    pub fn create_task(&self, request: CreateTaskRequest) -> Result<Task, TaskServiceError> {
        if request.title.trim().is_empty() {
            return Err(TaskServiceError::Validation(TaskValidationError::EmptyTitle));
        }

        let mut task = Task::new(request.title);
        task.description = request.description;
        task.priority = normalize_priority(request.priority);
        task.due_date = request.due_date;

        let id = self.repo.insert(&task)?;
        self.repo
            .find_by_id(id)?
            .ok_or(TaskServiceError::InconsistentState(
                "created task not found in read-back",
            ))
    }

    /// Creates a batch of tasks, skipping requests with blank titles.
    ///
    /// Returns the number of records handed to the repository. Bracket the
    /// call in a transaction scope when all-or-nothing semantics matter.
    pub fn create_tasks_batch(
        &self,
        requests: Vec<CreateTaskRequest>,
    ) -> Result<usize, TaskServiceError> {
        let mut tasks = Vec::with_capacity(requests.len());
        for request in requests {
            if request.title.trim().is_empty() {
                warn!("event=task_batch module=service status=skip reason=empty_title");
                continue;
            }
            let mut task = Task::new(request.title);
            task.description = request.description;
            task.priority = normalize_priority(request.priority);
            task.due_date = request.due_date;
            tasks.push(task);
        }

        if tasks.is_empty() {
            return Ok(0);
        }
        Ok(self.repo.insert_many(&tasks)?)
    }

    /// Gets one task by id. Absence is a normal outcome.
    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.find_by_id(id)
    }

    /// Lists every task, ordered by id ascending.
    pub fn get_all_tasks(&self) -> RepoResult<Vec<Task>> {
        self.repo.find_all()
    }

    /// Rewrites an already persisted task.
    pub fn update_task(&self, task: &Task) -> Result<(), TaskServiceError> {
        self.repo.update(task)?;
        Ok(())
    }

    /// Removes one task. Returns whether a row was actually removed.
    pub fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        self.repo.delete(id)
    }

    /// Lists tasks that have not been completed yet.
    pub fn get_incomplete_tasks(&self) -> RepoResult<Vec<Task>> {
        self.repo
            .find_by_criteria(&TaskCriteria::new().eq("completed", false))
    }

    /// Lists tasks with the given priority.
    pub fn get_tasks_by_priority(&self, priority: i64) -> RepoResult<Vec<Task>> {
        self.repo
            .find_by_criteria(&TaskCriteria::new().eq("priority", priority))
    }

    /// Marks one task as completed and returns the updated record.
    ///
    /// # Errors
    /// - `TaskServiceError::TaskNotFound` when no task has that id.
    pub fn complete_task(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        let mut task = self
            .repo
            .find_by_id(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        task.completed = true;
        self.repo.update(&task)?;
        self.repo
            .find_by_id(id)?
            .ok_or(TaskServiceError::InconsistentState(
                "completed task not found in read-back",
            ))
    }

    /// Lists tasks due within `[today, today + days]` inclusive, ascending
    /// by due date. Tasks without a due date are excluded.
    ///
    /// # Errors
    /// - `TaskServiceError::InvalidDueWindow` when `days` is negative.
    pub fn get_tasks_due_within_days(&self, days: i64) -> Result<Vec<Task>, TaskServiceError> {
        if days < 0 {
            return Err(TaskServiceError::InvalidDueWindow(days));
        }
        let tasks = self.repo.find_all()?;
        Ok(due_within_window(tasks, dates::today(), days))
    }

    /// Lists incomplete tasks whose due date has already passed.
    pub fn get_overdue_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = self.repo.find_all()?;
        Ok(overdue(tasks, dates::today()))
    }

    /// Lists tasks whose title contains `fragment`.
    pub fn search_tasks_by_title(&self, fragment: &str) -> RepoResult<Vec<Task>> {
        self.repo.find_by_title_contains(fragment)
    }
}

fn normalize_priority(priority: Option<i64>) -> i64 {
    match priority {
        Some(value) if PRIORITY_RANGE.contains(&value) => value,
        Some(value) => {
            warn!(
                "event=task_priority module=service status=clamp requested={value} applied={DEFAULT_PRIORITY}"
            );
            DEFAULT_PRIORITY
        }
        None => DEFAULT_PRIORITY,
    }
}

/// Filters to tasks due in `[today, today + days]`, sorted by due date.
fn due_within_window(tasks: Vec<Task>, today: NaiveDate, days: i64) -> Vec<Task> {
    let end = today + chrono::Duration::days(days);
    let mut due: Vec<Task> = tasks
        .into_iter()
        .filter(|task| {
            task.due_date
                .is_some_and(|date| dates::is_in_range(date, today, end))
        })
        .collect();
    due.sort_by_key(|task| task.due_date);
    due
}

/// Filters to incomplete tasks strictly past their due date.
fn overdue(tasks: Vec<Task>, today: NaiveDate) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|task| !task.completed && task.due_date.is_some_and(|date| date < today))
        .collect()
}
