//! Declarative table and column management.
//!
//! # Responsibility
//! - Create tables from ordered column-definition pairs.
//! - Add columns to existing tables and answer existence queries.
//! - Expose table structure for schema-mismatch detection.
//!
//! # Invariants
//! - Table and column names are validated as identifiers before they are
//!   interpolated into DDL; SQLite cannot bind identifiers as parameters.
//! - `create_table` is a no-op when the table already exists.

use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Malformed or mismatched table/column definitions.
#[derive(Debug)]
pub enum SchemaError {
    /// A table or column name is not a plain SQL identifier.
    InvalidIdentifier(String),
    /// `create_table` was called with no column definitions.
    EmptyDefinition(String),
    /// The addressed table does not exist.
    MissingTable(String),
    /// The column to add is already present.
    DuplicateColumn { table: String, column: String },
    /// A required column is absent from the live table.
    MissingColumn { table: String, column: String },
    /// The live table carries a column the record model does not map.
    UnexpectedColumn { table: String, column: String },
    /// Invalid type/constraint syntax or another engine-level failure.
    Sqlite(rusqlite::Error),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier(name) => {
                write!(f, "`{name}` is not a valid SQL identifier")
            }
            Self::EmptyDefinition(table) => {
                write!(f, "table `{table}` needs at least one column definition")
            }
            Self::MissingTable(table) => write!(f, "table `{table}` does not exist"),
            Self::DuplicateColumn { table, column } => {
                write!(f, "column `{column}` already exists in table `{table}`")
            }
            Self::MissingColumn { table, column } => {
                write!(f, "table `{table}` is missing required column `{column}`")
            }
            Self::UnexpectedColumn { table, column } => {
                write!(f, "table `{table}` carries unmapped column `{column}`")
            }
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for SchemaError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// One row of `PRAGMA table_info` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column position in the table definition.
    pub cid: i64,
    pub name: String,
    /// Declared type text, as written in the DDL.
    pub col_type: String,
    pub notnull: bool,
    pub default_value: Option<String>,
    /// Non-zero when the column participates in the primary key.
    pub pk: bool,
}

/// Creates `table` from ordered `(name, type-and-constraint)` pairs.
///
/// Creating an already existing table is a no-op, not an error.
///
/// # Errors
/// - `SchemaError::EmptyDefinition` when `columns` is empty.
/// - `SchemaError::InvalidIdentifier` on malformed table/column names.
/// - `SchemaError::Sqlite` on invalid type/constraint syntax.
pub fn create_table(
    conn: &Connection,
    table: &str,
    columns: &[(&str, &str)],
) -> SchemaResult<()> {
    validate_identifier(table)?;
    if columns.is_empty() {
        return Err(SchemaError::EmptyDefinition(table.to_string()));
    }

    let mut defs = Vec::with_capacity(columns.len());
    for (name, decl) in columns {
        validate_identifier(name)?;
        defs.push(format!("{name} {decl}"));
    }

    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n    {}\n);",
        defs.join(",\n    ")
    );
    conn.execute_batch(&sql)?;
    info!("event=schema_create_table module=db status=ok table={table}");
    Ok(())
}

/// Adds one column to an existing table.
///
/// # Errors
/// - `SchemaError::MissingTable` when `table` is absent.
/// - `SchemaError::DuplicateColumn` when `column` already exists.
pub fn add_column(
    conn: &Connection,
    table: &str,
    column: &str,
    decl: &str,
) -> SchemaResult<()> {
    validate_identifier(table)?;
    validate_identifier(column)?;

    if !table_exists(conn, table)? {
        return Err(SchemaError::MissingTable(table.to_string()));
    }
    if table_has_column(conn, table, column)? {
        return Err(SchemaError::DuplicateColumn {
            table: table.to_string(),
            column: column.to_string(),
        });
    }

    conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl};"))?;
    info!("event=schema_add_column module=db status=ok table={table} column={column}");
    Ok(())
}

/// Returns whether `table` exists. A missing table is a normal outcome.
pub fn table_exists(conn: &Connection, table: &str) -> SchemaResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Returns the live structure of `table` in definition order.
///
/// # Errors
/// - `SchemaError::MissingTable` when `table` is absent.
pub fn table_info(conn: &Connection, table: &str) -> SchemaResult<Vec<ColumnInfo>> {
    validate_identifier(table)?;
    if !table_exists(conn, table)? {
        return Err(SchemaError::MissingTable(table.to_string()));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(ColumnInfo {
            cid: row.get("cid")?,
            name: row.get("name")?,
            col_type: row.get("type")?,
            notnull: row.get::<_, i64>("notnull")? != 0,
            default_value: row.get("dflt_value")?,
            pk: row.get::<_, i64>("pk")? != 0,
        });
    }
    Ok(columns)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> SchemaResult<bool> {
    Ok(table_info(conn, table)?
        .iter()
        .any(|info| info.name == column))
}

fn validate_identifier(name: &str) -> SchemaResult<()> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier(name.to_string()))
    }
}
