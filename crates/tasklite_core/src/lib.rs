//! Layered access to an embedded SQLite task store.
//! This crate is the single source of truth for business invariants.

pub mod dates;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::schema::{ColumnInfo, SchemaError, SchemaResult};
pub use db::txn::{with_savepoint, with_transaction};
pub use db::{close_db, open_db, open_db_in_memory, with_db, ConnectionError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Task, TaskId, TaskValidationError, DEFAULT_PRIORITY};
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskCriteria, TaskRepository, TASK_COLUMNS,
    TASK_TABLE,
};
pub use service::task_service::{CreateTaskRequest, TaskService, TaskServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
