//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `tasks` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Values are always bound through placeholders, never concatenated into
//!   SQL text; column names in criteria are checked against the fixed
//!   definitions before they reach a WHERE clause.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::schema::{self, SchemaError};
use crate::db::ConnectionError;
use crate::model::task::{Task, TaskId, TaskValidationError};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Name of the single table owned by this repository.
pub const TASK_TABLE: &str = "tasks";

/// Fixed column definitions for the `tasks` table, in creation order.
pub const TASK_COLUMNS: &[(&str, &str)] = &[
    ("task_id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
    ("title", "TEXT NOT NULL"),
    ("description", "TEXT"),
    ("priority", "INTEGER DEFAULT 3"),
    ("due_date", "DATE"),
    ("completed", "BOOLEAN DEFAULT 0"),
    ("created_at", "TIMESTAMP DEFAULT CURRENT_TIMESTAMP"),
    ("updated_at", "TIMESTAMP DEFAULT CURRENT_TIMESTAMP"),
];

const TASK_SELECT_SQL: &str = "SELECT
    task_id,
    title,
    description,
    priority,
    due_date,
    completed,
    created_at,
    updated_at
FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Schema(SchemaError),
    Db(ConnectionError),
    NotFound(TaskId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SchemaError> for RepoError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<ConnectionError> for RepoError {
    fn from(value: ConnectionError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(ConnectionError::Sqlite(value))
    }
}

/// Equality-only column/value filter, ANDed into one WHERE clause.
///
/// Column names are validated against the fixed `tasks` definitions when the
/// query is built; an unknown name is a schema mismatch, not a silent miss.
#[derive(Debug, Clone, Default)]
pub struct TaskCriteria {
    fields: BTreeMap<String, Value>,
}

impl TaskCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one `column = value` condition. Later calls on the same column
    /// replace the earlier value.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(column.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    /// Persists one new record and returns the engine-assigned id.
    fn insert(&self, task: &Task) -> RepoResult<TaskId>;
    /// Persists a batch with one prepared statement; returns the count.
    /// Bracket the call in a transaction scope when atomicity is required.
    fn insert_many(&self, tasks: &[Task]) -> RepoResult<usize>;
    /// Gets one record by id. Absence is a normal outcome.
    fn find_by_id(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists every record, ordered by id ascending.
    fn find_all(&self) -> RepoResult<Vec<Task>>;
    /// Lists records matching all criteria entries; empty criteria lists all.
    fn find_by_criteria(&self, criteria: &TaskCriteria) -> RepoResult<Vec<Task>>;
    /// Lists records whose title contains `fragment`.
    fn find_by_title_contains(&self, fragment: &str) -> RepoResult<Vec<Task>>;
    /// Rewrites all mutable columns and refreshes the update timestamp.
    fn update(&self, task: &Task) -> RepoResult<()>;
    /// Removes one row. Returns whether a row was actually removed.
    fn delete(&self, id: TaskId) -> RepoResult<bool>;
    /// Creates the `tasks` table from this repository's fixed definitions.
    fn create_table(&self) -> RepoResult<()>;
}

/// SQLite-backed task repository.
#[derive(Debug)]
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository without touching the schema.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Constructs a ready-to-use repository: creates the `tasks` table when
    /// absent and verifies the live structure against the fixed definitions.
    ///
    /// # Errors
    /// - `RepoError::Schema` when the live table is missing a mapped column
    ///   or carries one the record model does not map.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let repo = Self::new(conn);
        if !schema::table_exists(conn, TASK_TABLE)? {
            repo.create_table()?;
        }
        repo.verify_schema()?;
        Ok(repo)
    }

    /// Checks that the live table and the record model map one-to-one.
    pub fn verify_schema(&self) -> RepoResult<()> {
        let live = schema::table_info(self.conn, TASK_TABLE)?;

        for (name, _) in TASK_COLUMNS {
            if !live.iter().any(|info| info.name == *name) {
                return Err(SchemaError::MissingColumn {
                    table: TASK_TABLE.to_string(),
                    column: (*name).to_string(),
                }
                .into());
            }
        }
        for info in &live {
            if !TASK_COLUMNS.iter().any(|(name, _)| *name == info.name) {
                return Err(SchemaError::UnexpectedColumn {
                    table: TASK_TABLE.to_string(),
                    column: info.name.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;
        if let Some(id) = task.task_id {
            return Err(TaskValidationError::AlreadyPersisted(id).into());
        }

        self.conn.execute(
            "INSERT INTO tasks (title, description, priority, due_date, completed)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                task.title.as_str(),
                task.description.as_deref(),
                task.priority,
                task.due_date,
                task.completed,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("event=task_insert module=repo status=ok task_id={id}");
        Ok(id)
    }

    fn insert_many(&self, tasks: &[Task]) -> RepoResult<usize> {
        for task in tasks {
            task.validate()?;
            if let Some(id) = task.task_id {
                return Err(TaskValidationError::AlreadyPersisted(id).into());
            }
        }

        let mut stmt = self.conn.prepare(
            "INSERT INTO tasks (title, description, priority, due_date, completed)
             VALUES (?1, ?2, ?3, ?4, ?5);",
        )?;
        for task in tasks {
            stmt.execute(params![
                task.title.as_str(),
                task.description.as_deref(),
                task.priority,
                task.due_date,
                task.completed,
            ])?;
        }

        info!(
            "event=task_insert_many module=repo status=ok count={}",
            tasks.len()
        );
        Ok(tasks.len())
    }

    fn find_by_id(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE task_id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn find_all(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY task_id ASC;"))?;
        let mut rows = stmt.query([])?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn find_by_criteria(&self, criteria: &TaskCriteria) -> RepoResult<Vec<Task>> {
        if criteria.is_empty() {
            return self.find_all();
        }

        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        for (column, value) in criteria.entries() {
            if !TASK_COLUMNS.iter().any(|(name, _)| *name == column) {
                return Err(SchemaError::UnexpectedColumn {
                    table: TASK_TABLE.to_string(),
                    column: column.to_string(),
                }
                .into());
            }
            sql.push_str(&format!(" AND {column} = ?"));
            bind_values.push(value.clone());
        }
        sql.push_str(" ORDER BY task_id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn find_by_title_contains(&self, fragment: &str) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} WHERE title LIKE ?1 ORDER BY task_id ASC;"
        ))?;
        let pattern = format!("%{fragment}%");
        let mut rows = stmt.query([pattern.as_str()])?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn update(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;
        let id = task.task_id.ok_or(TaskValidationError::NotPersisted)?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                priority = ?3,
                due_date = ?4,
                completed = ?5,
                updated_at = CURRENT_TIMESTAMP
             WHERE task_id = ?6;",
            params![
                task.title.as_str(),
                task.description.as_deref(),
                task.priority,
                task.due_date,
                task.completed,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        info!("event=task_update module=repo status=ok task_id={id}");
        Ok(())
    }

    fn delete(&self, id: TaskId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE task_id = ?1;", [id])?;
        info!("event=task_delete module=repo status=ok task_id={id} removed={}", changed > 0);
        Ok(changed > 0)
    }

    fn create_table(&self) -> RepoResult<()> {
        schema::create_table(self.conn, TASK_TABLE, TASK_COLUMNS)?;
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in tasks.completed"
            )));
        }
    };

    Ok(Task {
        task_id: Some(row.get("task_id")?),
        title: row.get("title")?,
        description: row.get("description")?,
        priority: row.get("priority")?,
        due_date: row.get("due_date")?,
        completed,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
