use tasklite_core::{
    open_db_in_memory, with_savepoint, with_transaction, RepoError, SqliteTaskRepository, Task,
    TaskRepository,
};

#[test]
fn successful_scope_commits_all_inserts() {
    let mut conn = open_db_in_memory().unwrap();
    SqliteTaskRepository::try_new(&conn).unwrap();

    let result: Result<(), RepoError> = with_transaction(&mut conn, |tx| {
        let repo = SqliteTaskRepository::new(tx);
        repo.insert(&Task::new("first"))?;
        repo.insert(&Task::new("second"))?;
        Ok(())
    });
    result.unwrap();

    let repo = SqliteTaskRepository::new(&conn);
    assert_eq!(repo.find_all().unwrap().len(), 2);
}

#[test]
fn failed_scope_leaves_zero_rows() {
    let mut conn = open_db_in_memory().unwrap();
    SqliteTaskRepository::try_new(&conn).unwrap();

    let result: Result<(), RepoError> = with_transaction(&mut conn, |tx| {
        let repo = SqliteTaskRepository::new(tx);
        repo.insert(&Task::new("first"))?;
        repo.insert(&Task::new("second"))?;
        // Blank title fails validation and aborts the scope.
        repo.insert(&Task::new(""))?;
        Ok(())
    });
    assert!(result.is_err());

    let repo = SqliteTaskRepository::new(&conn);
    assert!(repo.find_all().unwrap().is_empty());
}

#[test]
fn scope_error_restores_previous_state() {
    let mut conn = open_db_in_memory().unwrap();
    let existing_id = {
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        repo.insert(&Task::new("already there")).unwrap()
    };

    let result: Result<(), RepoError> = with_transaction(&mut conn, |tx| {
        let repo = SqliteTaskRepository::new(tx);
        repo.insert(&Task::new("doomed"))?;
        repo.delete(existing_id)?;
        Err(RepoError::InvalidData("forced failure".to_string()))
    });
    assert!(result.is_err());

    let repo = SqliteTaskRepository::new(&conn);
    let all = repo.find_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].task_id, Some(existing_id));
}

#[test]
fn savepoint_rollback_keeps_outer_work_pending() {
    let mut conn = open_db_in_memory().unwrap();
    SqliteTaskRepository::try_new(&conn).unwrap();

    let mut tx = conn.transaction().unwrap();
    SqliteTaskRepository::new(&tx)
        .insert(&Task::new("outer"))
        .unwrap();

    let inner: Result<(), RepoError> = with_savepoint(&mut tx, "sp_inner", |sp| {
        let repo = SqliteTaskRepository::new(sp);
        repo.insert(&Task::new("inner"))?;
        Err(RepoError::InvalidData("undo inner".to_string()))
    });
    assert!(inner.is_err());

    tx.commit().unwrap();

    let repo = SqliteTaskRepository::new(&conn);
    let titles: Vec<String> = repo
        .find_all()
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, ["outer"]);
}

#[test]
fn released_savepoint_commits_with_the_outer_scope() {
    let mut conn = open_db_in_memory().unwrap();
    SqliteTaskRepository::try_new(&conn).unwrap();

    let mut tx = conn.transaction().unwrap();
    let inner: Result<(), RepoError> = with_savepoint(&mut tx, "sp_keep", |sp| {
        SqliteTaskRepository::new(sp).insert(&Task::new("kept"))?;
        Ok(())
    });
    inner.unwrap();
    tx.commit().unwrap();

    let repo = SqliteTaskRepository::new(&conn);
    assert_eq!(repo.find_all().unwrap().len(), 1);
}

#[test]
fn nested_savepoints_roll_back_independently() {
    let mut conn = open_db_in_memory().unwrap();
    SqliteTaskRepository::try_new(&conn).unwrap();

    let mut tx = conn.transaction().unwrap();
    let outer: Result<(), RepoError> = with_savepoint(&mut tx, "sp_outer", |sp| {
        SqliteTaskRepository::new(sp).insert(&Task::new("outer work"))?;

        let mut inner = sp.savepoint_with_name("sp_nested")?;
        SqliteTaskRepository::new(&inner).insert(&Task::new("nested work"))?;
        inner.rollback()?;

        Ok(())
    });
    outer.unwrap();
    tx.commit().unwrap();

    let repo = SqliteTaskRepository::new(&conn);
    let titles: Vec<String> = repo
        .find_all()
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, ["outer work"]);
}

#[test]
fn autocommit_applies_outside_explicit_scopes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let id = repo.insert(&Task::new("immediate")).unwrap();
    assert!(repo.find_by_id(id).unwrap().is_some());
}
