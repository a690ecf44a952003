//! SQLite storage bootstrap and connection ownership.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the mapping core.
//! - Own the per-database registry of model descriptors and created tables.
//!
//! # Invariants
//! - One connection per [`Database`]; every statement runs through it.
//! - At most one table-creation statement is issued per (database, table)
//!   pair during the lifetime of a `Database` value.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

mod database;
mod open;

pub use database::{Database, StatementOutcome};
pub use open::{open_database, open_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Storage-layer error.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    CreateDirectory {
        path: PathBuf,
        source: io::Error,
    },
    /// Table creation failed; the table stays unregistered and the next
    /// operation retries it.
    SchemaCreationFailed {
        table: String,
        source: rusqlite::Error,
    },
}

impl DbError {
    /// Whether the engine rejected a statement over a constraint, such as a
    /// uniqueness violation.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::Sqlite(err) => {
                err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation)
            }
            _ => false,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::CreateDirectory { path, source } => {
                write!(
                    f,
                    "failed to create database directory `{}`: {source}",
                    path.display()
                )
            }
            Self::SchemaCreationFailed { table, source } => {
                write!(f, "failed to create table `{table}`: {source}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::CreateDirectory { source, .. } => Some(source),
            Self::SchemaCreationFailed { source, .. } => Some(source),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
