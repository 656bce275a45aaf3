use tasklite_core::db::schema::{self, SchemaError};
use tasklite_core::{
    open_db_in_memory, RepoError, SqliteTaskRepository, TaskRepository, TASK_COLUMNS, TASK_TABLE,
};

#[test]
fn create_table_then_exists() {
    let conn = open_db_in_memory().unwrap();

    assert!(!schema::table_exists(&conn, "notes").unwrap());
    schema::create_table(&conn, "notes", &[("id", "INTEGER PRIMARY KEY"), ("body", "TEXT")])
        .unwrap();
    assert!(schema::table_exists(&conn, "notes").unwrap());
}

#[test]
fn create_table_is_a_noop_when_table_exists() {
    let conn = open_db_in_memory().unwrap();
    let columns = &[("id", "INTEGER PRIMARY KEY"), ("body", "TEXT")];

    schema::create_table(&conn, "notes", columns).unwrap();
    schema::create_table(&conn, "notes", columns).unwrap();
    assert!(schema::table_exists(&conn, "notes").unwrap());
}

#[test]
fn create_table_needs_at_least_one_column() {
    let conn = open_db_in_memory().unwrap();

    let err = schema::create_table(&conn, "empty", &[]).unwrap_err();
    assert!(matches!(err, SchemaError::EmptyDefinition(_)));
}

#[test]
fn create_table_rejects_malformed_identifiers() {
    let conn = open_db_in_memory().unwrap();

    let err = schema::create_table(&conn, "bad name", &[("id", "INTEGER")]).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidIdentifier(_)));

    let err =
        schema::create_table(&conn, "ok", &[("id; DROP TABLE tasks", "INTEGER")]).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidIdentifier(_)));
}

#[test]
fn create_table_surfaces_invalid_constraint_syntax() {
    let conn = open_db_in_memory().unwrap();

    let err = schema::create_table(&conn, "broken", &[("id", "INTEGER NOT")]).unwrap_err();
    assert!(matches!(err, SchemaError::Sqlite(_)));
}

#[test]
fn add_column_contract() {
    let conn = open_db_in_memory().unwrap();
    schema::create_table(&conn, "notes", &[("id", "INTEGER PRIMARY KEY")]).unwrap();

    schema::add_column(&conn, "notes", "body", "TEXT").unwrap();
    let names: Vec<String> = schema::table_info(&conn, "notes")
        .unwrap()
        .into_iter()
        .map(|info| info.name)
        .collect();
    assert_eq!(names, ["id", "body"]);

    let err = schema::add_column(&conn, "notes", "body", "TEXT").unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateColumn { .. }));

    let err = schema::add_column(&conn, "missing", "body", "TEXT").unwrap_err();
    assert!(matches!(err, SchemaError::MissingTable(_)));
}

#[test]
fn table_info_reports_primary_key_and_constraints() {
    let conn = open_db_in_memory().unwrap();
    let _repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let info = schema::table_info(&conn, TASK_TABLE).unwrap();
    assert_eq!(info.len(), TASK_COLUMNS.len());

    let id_col = info.iter().find(|col| col.name == "task_id").unwrap();
    assert!(id_col.pk);

    let title_col = info.iter().find(|col| col.name == "title").unwrap();
    assert!(title_col.notnull);
}

#[test]
fn table_info_on_missing_table_is_an_error() {
    let conn = open_db_in_memory().unwrap();

    let err = schema::table_info(&conn, "nowhere").unwrap_err();
    assert!(matches!(err, SchemaError::MissingTable(_)));
}

#[test]
fn repository_creates_its_table_on_first_use() {
    let conn = open_db_in_memory().unwrap();

    assert!(!schema::table_exists(&conn, TASK_TABLE).unwrap());
    let _repo = SqliteTaskRepository::try_new(&conn).unwrap();
    assert!(schema::table_exists(&conn, TASK_TABLE).unwrap());
}

#[test]
fn repository_rejects_tables_with_unmapped_columns() {
    let conn = open_db_in_memory().unwrap();
    {
        let _repo = SqliteTaskRepository::try_new(&conn).unwrap();
    }
    schema::add_column(&conn, TASK_TABLE, "attachment", "BLOB").unwrap();

    let err = SqliteTaskRepository::try_new(&conn).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Schema(SchemaError::UnexpectedColumn { .. })
    ));
}

#[test]
fn repository_rejects_tables_missing_mapped_columns() {
    let conn = open_db_in_memory().unwrap();
    schema::create_table(
        &conn,
        TASK_TABLE,
        &[("task_id", "INTEGER PRIMARY KEY AUTOINCREMENT"), ("title", "TEXT NOT NULL")],
    )
    .unwrap();

    let err = SqliteTaskRepository::try_new(&conn).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Schema(SchemaError::MissingColumn { .. })
    ));
}

#[test]
fn repository_create_table_uses_fixed_definitions() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    repo.create_table().unwrap();

    let names: Vec<String> = schema::table_info(&conn, TASK_TABLE)
        .unwrap()
        .into_iter()
        .map(|info| info.name)
        .collect();
    let expected: Vec<&str> = TASK_COLUMNS.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, expected);
}
