//! Record repository: the public persistence operations.
//!
//! # Responsibility
//! - Provide save/get/filter/all/update over one registered record type.
//! - Keep SQL construction and row binding behind this boundary.
//!
//! # Invariants
//! - Every operation calls `ensure_table` first; table creation stays
//!   lazy and happens at most once per database lifetime.
//! - Predicates are validated against the descriptor before any statement
//!   is built.

use crate::db::{Database, DbError};
use crate::model::Model;
use crate::query::{builder, Predicate};
use crate::repo::binder;
use crate::schema::descriptor::{PrimaryKeySpec, SchemaDescriptor};
use crate::schema::types::CoerceError;
use crate::schema::SchemaError;
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

pub type RepoResult<T> = Result<T, RepoError>;

/// Operation-level error for record persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Schema(SchemaError),
    Db(DbError),
    /// The record type was never registered with this database.
    UnboundModel { model: &'static str },
    /// A predicate constrains a field the descriptor does not know.
    UnknownField { table: String, field: String },
    /// A single-row lookup matched more than one row.
    MultipleResults { table: String, matched: usize },
    /// Row or instance shape diverged from the descriptor.
    FieldCountMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },
    /// An update was attempted on a record with no key value.
    MissingPrimaryKey { table: String },
    /// An update targeted a key no stored row carries.
    NotFound { table: String, key: String },
    InvalidData(String),
}

impl RepoError {
    /// Whether the underlying engine rejected a statement over a
    /// constraint, such as a uniqueness violation.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_constraint_violation())
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UnboundModel { model } => {
                write!(f, "model `{model}` is not registered with this database")
            }
            Self::UnknownField { table, field } => {
                write!(f, "unknown field `{field}` for table `{table}`")
            }
            Self::MultipleResults { table, matched } => {
                write!(f, "expected at most one row in `{table}`, matched {matched}")
            }
            Self::FieldCountMismatch {
                table,
                expected,
                actual,
            } => write!(
                f,
                "table `{table}` shape mismatch: expected {expected} values, got {actual}"
            ),
            Self::MissingPrimaryKey { table } => {
                write!(f, "record for `{table}` has no primary key value")
            }
            Self::NotFound { table, key } => {
                write!(f, "no row in `{table}` with primary key {key}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SchemaError> for RepoError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<CoerceError> for RepoError {
    fn from(value: CoerceError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Typed persistence handle for one registered record type.
pub struct Repository<'db, M: Model> {
    db: &'db Database,
    descriptor: Arc<SchemaDescriptor>,
    _model: PhantomData<M>,
}

impl<'db, M: Model> std::fmt::Debug for Repository<'db, M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("model", &M::NAME)
            .field("table", &self.descriptor.table)
            .finish_non_exhaustive()
    }
}

impl<'db, M: Model> Repository<'db, M> {
    /// Binds the repository to a database the record type was registered
    /// with.
    pub fn try_new(db: &'db Database) -> RepoResult<Self> {
        let descriptor = db
            .descriptor_for(M::NAME)
            .ok_or(RepoError::UnboundModel { model: M::NAME })?;
        Ok(Self {
            db,
            descriptor,
            _model: PhantomData,
        })
    }

    /// Derived schema descriptor backing this repository.
    pub fn descriptor(&self) -> &SchemaDescriptor {
        &self.descriptor
    }

    /// Inserts the record and assigns an engine-generated primary key onto
    /// it.
    ///
    /// An auto-assigned key column is omitted from the statement unless the
    /// instance already carries a value for it.
    pub fn save(&self, record: &mut M) -> RepoResult<()> {
        self.db.ensure_table(&self.descriptor)?;
        let values = binder::to_parameters(record, &self.descriptor)?;

        let (sql, bound, engine_assigns) = match &self.descriptor.primary_key {
            PrimaryKeySpec::Synthesized { .. } => match record.primary_key() {
                Some(id) => {
                    let mut bound = Vec::with_capacity(values.len() + 1);
                    bound.push(Value::Integer(id));
                    bound.extend(values);
                    (builder::insert_sql(&self.descriptor, true), bound, false)
                }
                None => (builder::insert_sql(&self.descriptor, false), values, true),
            },
            PrimaryKeySpec::Declared { index, auto, .. } => {
                if *auto && matches!(values[*index], Value::Null) {
                    let mut bound = values;
                    bound.remove(*index);
                    (builder::insert_sql(&self.descriptor, false), bound, true)
                } else {
                    (builder::insert_sql(&self.descriptor, true), values, false)
                }
            }
        };

        let outcome = self.db.execute_statement(&sql, bound)?;
        if engine_assigns {
            record.assign_primary_key(outcome.last_insert_id);
        }
        Ok(())
    }

    /// Fetches at most one record matching the predicate.
    ///
    /// Zero matches yield `None`; two or more are an error so ambiguity is
    /// surfaced instead of silently resolved.
    pub fn get(&self, predicate: &Predicate) -> RepoResult<Option<M>> {
        let mut matches = self.filter(predicate)?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            matched => Err(RepoError::MultipleResults {
                table: self.descriptor.table.clone(),
                matched,
            }),
        }
    }

    /// Fetches at most one record by primary-key value.
    pub fn find(&self, key: impl Into<Value>) -> RepoResult<Option<M>> {
        let predicate = Predicate::new().eq(self.descriptor.primary_key.column(), key);
        self.get(&predicate)
    }

    /// Fetches every record matching the predicate, in storage row order.
    pub fn filter(&self, predicate: &Predicate) -> RepoResult<Vec<M>> {
        self.db.ensure_table(&self.descriptor)?;
        if let Some(field) = predicate.unknown_field(&self.descriptor) {
            return Err(RepoError::UnknownField {
                table: self.descriptor.table.clone(),
                field: field.to_string(),
            });
        }

        let sql = builder::select_sql(&self.descriptor, predicate);
        let rows = self.db.query_rows(&sql, predicate.bind_values())?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(binder::from_row::<M>(row, &self.descriptor)?);
        }
        Ok(records)
    }

    /// Fetches every record of this type.
    pub fn all(&self) -> RepoResult<Vec<M>> {
        self.filter(&Predicate::new())
    }

    /// Rewrites all non-key fields of a previously saved record.
    pub fn update(&self, record: &M) -> RepoResult<()> {
        self.db.ensure_table(&self.descriptor)?;
        let values = binder::to_parameters(record, &self.descriptor)?;

        let (mut bound, key) = match &self.descriptor.primary_key {
            PrimaryKeySpec::Synthesized { .. } => {
                let id = record
                    .primary_key()
                    .ok_or_else(|| RepoError::MissingPrimaryKey {
                        table: self.descriptor.table.clone(),
                    })?;
                (values, Value::Integer(id))
            }
            PrimaryKeySpec::Declared { index, .. } => {
                let mut values = values;
                let key = values.remove(*index);
                if matches!(key, Value::Null) {
                    return Err(RepoError::MissingPrimaryKey {
                        table: self.descriptor.table.clone(),
                    });
                }
                (values, key)
            }
        };
        bound.push(key.clone());

        let sql = builder::update_sql(&self.descriptor);
        let outcome = self.db.execute_statement(&sql, bound)?;
        if outcome.rows_affected == 0 {
            return Err(RepoError::NotFound {
                table: self.descriptor.table.clone(),
                key: key_display(&key),
            });
        }
        Ok(())
    }
}

fn key_display(key: &Value) -> String {
    match key {
        Value::Integer(id) => id.to_string(),
        Value::Text(text) => format!("`{text}`"),
        other => format!("{other:?}"),
    }
}
