//! Demo runner for the tasklite core crate.
//!
//! # Responsibility
//! - Exercise connection, schema, repository, service and transaction
//!   layers end-to-end against one database file.
//! - Keep output deterministic enough for quick local sanity checks.

use std::error::Error;

use tasklite_core::{
    default_log_level, init_logging, open_db, with_savepoint, with_transaction, CreateTaskRequest,
    RepoError, SqliteTaskRepository, Task, TaskRepository, TaskService,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("tasklite demo failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tasklite_demo.db".to_string());

    let log_dir = std::env::temp_dir().join("tasklite-logs");
    if let Err(err) = init_logging(default_log_level(), &log_dir.to_string_lossy()) {
        eprintln!("logging disabled: {err}");
    }

    let mut conn = open_db(&path)?;
    println!("opened database at `{path}`");

    {
        let repo = SqliteTaskRepository::try_new(&conn)?;
        let service = TaskService::new(repo);

        let groceries = service.create_task(CreateTaskRequest {
            title: "buy groceries".to_string(),
            description: Some("milk, bread, coffee".to_string()),
            priority: Some(2),
            due_date: Some(tasklite_core::dates::future_date(2)),
        })?;
        let report = service.create_task(CreateTaskRequest {
            title: "write quarterly report".to_string(),
            priority: Some(5),
            due_date: Some(tasklite_core::dates::future_date(10)),
            ..CreateTaskRequest::default()
        })?;
        service.create_task(CreateTaskRequest::new("sharpen pencils"))?;

        println!("\nall tasks:");
        for task in service.get_all_tasks()? {
            print_task(&task);
        }

        let completed = service.complete_task(groceries.task_id.expect("persisted id"))?;
        println!("\ncompleted: {}", completed.title);

        println!("\nincomplete tasks:");
        for task in service.get_incomplete_tasks()? {
            print_task(&task);
        }

        println!("\ndue within 7 days:");
        for task in service.get_tasks_due_within_days(7)? {
            print_task(&task);
        }

        println!("\ntitle search for `report`:");
        for task in service.search_tasks_by_title("report")? {
            print_task(&task);
        }

        let removed = service.delete_task(report.task_id.expect("persisted id"))?;
        println!("\ndeleted report task: {removed}");
    }

    transaction_demo(&mut conn)?;

    tasklite_core::close_db(conn)?;
    println!("\ndatabase closed");
    Ok(())
}

/// Shows commit, rollback and savepoint semantics over repository calls.
fn transaction_demo(conn: &mut rusqlite::Connection) -> Result<(), Box<dyn Error>> {
    println!("\n-- transaction demo --");

    let committed: Result<(), RepoError> = with_transaction(conn, |tx| {
        let repo = SqliteTaskRepository::new(tx);
        repo.insert(&Task::new("pay rent"))?;
        repo.insert(&Task::new("call landlord"))?;
        Ok(())
    });
    committed?;
    println!("committed a two-insert scope");

    let before = SqliteTaskRepository::new(conn).find_all()?.len();
    let rolled_back: Result<(), RepoError> = with_transaction(conn, |tx| {
        let repo = SqliteTaskRepository::new(tx);
        repo.insert(&Task::new("phantom task"))?;
        // Blank titles never reach storage; the whole scope rolls back.
        repo.insert(&Task::new(""))?;
        Ok(())
    });
    let after = SqliteTaskRepository::new(conn).find_all()?.len();
    println!(
        "failed scope rolled back: {} (rows before={before} after={after})",
        rolled_back.is_err()
    );

    let mut tx = conn.transaction()?;
    {
        let inner: Result<(), RepoError> = with_savepoint(&mut tx, "sp_demo", |sp| {
            let repo = SqliteTaskRepository::new(sp);
            repo.insert(&Task::new("speculative task"))?;
            Err(RepoError::InvalidData("demo rollback".to_string()))
        });
        println!("savepoint rolled back: {}", inner.is_err());
        let repo = SqliteTaskRepository::new(&tx);
        repo.insert(&Task::new("outer work"))?;
    }
    tx.commit()?;
    println!("outer transaction still committed");

    Ok(())
}

fn print_task(task: &Task) {
    let id = task
        .task_id
        .map_or_else(|| "-".to_string(), |v| v.to_string());
    let due = task
        .due_date
        .map_or_else(|| "none".to_string(), |d| d.to_string());
    println!(
        "  [{id}] {} (priority={}, due={due}, completed={})",
        task.title, task.priority, task.completed
    );
}
