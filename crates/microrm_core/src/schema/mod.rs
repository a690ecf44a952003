//! Schema derivation for record types.
//!
//! # Responsibility
//! - Derive one immutable storage descriptor per record type.
//! - Map semantic field kinds to storage column types.
//!
//! # Invariants
//! - Derivation is pure; repeated derivation for the same type agrees.
//! - Every derivation error is raised before any table is created.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod descriptor;
pub mod types;

pub use descriptor::{derive, ColumnSpec, PrimaryKeySpec, SchemaDescriptor};

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Record declaration error found while deriving a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A field is declared in a way the storage mapping cannot represent.
    UnsupportedType { field: String, declared: String },
    /// The primary-key directive names a field the record does not declare.
    InvalidPrimaryKey { model: String, field: String },
    /// A unique-constraint group names a field the record does not declare.
    UnknownField { model: String, field: String },
    /// A unique-constraint group contains no fields.
    EmptyUniqueGroup { model: String },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedType { field, declared } => {
                write!(f, "field `{field}` has unsupported declaration: {declared}")
            }
            Self::InvalidPrimaryKey { model, field } => {
                write!(f, "primary key `{field}` is not a declared field of `{model}`")
            }
            Self::UnknownField { model, field } => {
                write!(f, "unique constraint on `{model}` names unknown field `{field}`")
            }
            Self::EmptyUniqueGroup { model } => {
                write!(f, "unique constraint on `{model}` contains no fields")
            }
        }
    }
}

impl Error for SchemaError {}
