//! SQLite connection bootstrap, schema management and transaction scopes.
//!
//! # Responsibility
//! - Open and configure SQLite connections for tasklite core.
//! - Expose declarative schema operations and scoped transaction helpers.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout set.
//! - Core code must not read/write application data before the schema for
//!   the target table has been created.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;
pub mod schema;
pub mod txn;

pub use open::{close_db, open_db, open_db_in_memory, with_db};

pub type DbResult<T> = Result<T, ConnectionError>;

/// Failure to open, maintain or release the engine handle.
#[derive(Debug)]
pub enum ConnectionError {
    /// The database file could not be opened or created.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// The handle could not be released cleanly.
    Close(rusqlite::Error),
    /// Any other engine-level failure on an open handle.
    Sqlite(rusqlite::Error),
}

impl Display for ConnectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "cannot open database at `{}`: {source}", path.display())
            }
            Self::Close(err) => write!(f, "cannot close database handle: {err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Close(err) => Some(err),
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for ConnectionError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
