//! Connection bootstrap utilities.
//!
//! # Responsibility
//! - Open file or in-memory databases.
//! - Configure connection pragmas required by core behavior.
//!
//! # Invariants
//! - Returned databases have `foreign_keys=ON` and a busy timeout set.
//! - A missing parent directory is created before the file is opened.

use super::{Database, DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a database file, creating parent directories as needed.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_database(path: impl AsRef<Path>) -> DbResult<Database> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    match open_file(path.as_ref()) {
        Ok(db) => {
            info!(
                "event=db_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(db)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens an in-memory database.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_in_memory() -> DbResult<Database> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    match Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(bootstrap)
    {
        Ok(conn) => {
            info!(
                "event=db_open module=db status=ok mode=memory duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(Database::new(conn, None))
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=memory duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn open_file(path: &Path) -> DbResult<Database> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let conn = bootstrap(Connection::open(path)?)?;
    Ok(Database::new(conn, Some(path.to_path_buf())))
}

fn bootstrap(conn: Connection) -> DbResult<Connection> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}
