//! Database handle: statement execution and table lifecycle.
//!
//! # Responsibility
//! - Execute parameterized statements and queries for the mapping core.
//! - Register model descriptors and materialize tables lazily, once each.
//!
//! # Invariants
//! - The table check-then-create path runs under one registry lock.
//! - A creation failure leaves the table unregistered so the next
//!   operation retries it.
//! - The connection is not shared across threads; callers needing that must
//!   serialize access externally.

use crate::db::{DbError, DbResult};
use crate::model::Model;
use crate::query::builder;
use crate::schema::descriptor::{derive, SchemaDescriptor};
use crate::schema::SchemaResult;
use log::{debug, error, info};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Outcome of one mutating statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementOutcome {
    /// Rows changed by the statement.
    pub rows_affected: usize,
    /// Engine-assigned rowid of the most recent insert on this connection.
    pub last_insert_id: i64,
}

#[derive(Default)]
struct Registry {
    descriptors: HashMap<&'static str, Arc<SchemaDescriptor>>,
    tables: HashSet<String>,
}

/// Owner of one SQLite connection and the model registry bound to it.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
    registry: Mutex<Registry>,
}

impl Database {
    pub(crate) fn new(conn: Connection, path: Option<PathBuf>) -> Self {
        Self {
            conn,
            path,
            registry: Mutex::new(Registry::default()),
        }
    }

    /// Backing file path, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Derives and caches the schema descriptor for a record type.
    ///
    /// Derivation is pure and deterministic, so repeated registration of
    /// the same type is a no-op. No table is created here; that happens
    /// lazily on first use.
    pub fn register<M: Model>(&self) -> SchemaResult<()> {
        let descriptor = derive::<M>()?;
        debug!(
            "event=model_register module=db model={} table={}",
            M::NAME,
            descriptor.table
        );
        let mut registry = self.lock_registry();
        registry
            .descriptors
            .entry(M::NAME)
            .or_insert_with(|| Arc::new(descriptor));
        Ok(())
    }

    pub(crate) fn descriptor_for(&self, model: &'static str) -> Option<Arc<SchemaDescriptor>> {
        self.lock_registry().descriptors.get(model).cloned()
    }

    /// Creates the descriptor's table on first use within this database's
    /// lifetime; later calls are in-memory no-ops.
    pub fn ensure_table(&self, descriptor: &SchemaDescriptor) -> DbResult<()> {
        let mut registry = self.lock_registry();
        if registry.tables.contains(&descriptor.table) {
            return Ok(());
        }

        let started_at = Instant::now();
        let sql = builder::create_table_sql(descriptor);
        if let Err(err) = self.conn.execute_batch(&sql) {
            error!(
                "event=table_create module=db status=error table={} duration_ms={} error={}",
                descriptor.table,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(DbError::SchemaCreationFailed {
                table: descriptor.table.clone(),
                source: err,
            });
        }

        registry.tables.insert(descriptor.table.clone());
        info!(
            "event=table_create module=db status=ok table={} duration_ms={}",
            descriptor.table,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Executes one mutating statement with bound values.
    pub fn execute_statement(&self, sql: &str, values: Vec<Value>) -> DbResult<StatementOutcome> {
        let rows_affected = self.conn.execute(sql, params_from_iter(values))?;
        Ok(StatementOutcome {
            rows_affected,
            last_insert_id: self.conn.last_insert_rowid(),
        })
    }

    /// Executes one query with bound values and returns every row as an
    /// ordered list of scalar values.
    pub fn query_rows(&self, sql: &str, values: Vec<Value>) -> DbResult<Vec<Vec<Value>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(values))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(column_count);
            for index in 0..column_count {
                record.push(row.get::<_, Value>(index)?);
            }
            out.push(record);
        }

        Ok(out)
    }

    /// Closes the connection, surfacing any flush error.
    pub fn close(self) -> DbResult<()> {
        let Database { conn, .. } = self;
        conn.close().map_err(|(_, err)| DbError::Sqlite(err))
    }

    fn lock_registry(&self) -> MutexGuard<'_, Registry> {
        match self.registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
