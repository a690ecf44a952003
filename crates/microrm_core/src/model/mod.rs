//! Record type declaration surface.
//!
//! # Responsibility
//! - Define the [`Model`] contract binding one record type to one table.
//! - Describe declared fields through an explicit static descriptor table.
//!
//! # Invariants
//! - `fields()` order is the declaration order; every statement and every
//!   value list follows it.
//! - `to_values()` and `from_values()` must agree with `fields()` in length
//!   and order.

use crate::schema::types::CoerceError;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

/// Semantic kind of one declared field.
///
/// Optionality is not a kind of its own; it is carried by
/// [`FieldSpec::nullable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// UTF-8 text, stored as TEXT.
    Text,
    /// 64-bit signed integer, stored as INTEGER.
    Integer,
    /// 64-bit float, stored as REAL.
    Float,
    /// Boolean, stored as INTEGER 0/1.
    Boolean,
    /// Raw bytes, stored as BLOB.
    Blob,
}

impl FieldKind {
    /// Lower-case label used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Blob => "blob",
        }
    }
}

/// One declared record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Column name, verbatim.
    pub name: &'static str,
    /// Semantic kind mapped to a storage column type.
    pub kind: FieldKind,
    /// Whether NULL is a legal stored value for this field.
    pub nullable: bool,
}

impl FieldSpec {
    /// Declares a non-nullable field.
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    /// Declares a nullable field.
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }
}

/// Uniqueness directive for a record type.
///
/// A bare field becomes a one-field group; a group is enforced jointly
/// unique; `Groups` declares several independent constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UniqueSpec {
    #[default]
    None,
    Field(&'static str),
    Group(&'static [&'static str]),
    Groups(&'static [&'static [&'static str]]),
}

/// Per-record-type directives: table name, primary key, uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOptions {
    /// Explicit table name. When absent the lower-cased type name is used.
    pub table: Option<&'static str>,
    /// Primary-key field name. `"id"` is synthesized when not declared.
    pub primary_key: &'static str,
    /// Uniqueness constraints.
    pub unique: UniqueSpec,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            table: None,
            primary_key: "id",
            unique: UniqueSpec::None,
        }
    }
}

/// Contract mapping one record type to one table.
///
/// Implementations supply a static field-descriptor table instead of any
/// runtime reflection; the schema layer derives everything else from it.
pub trait Model: Sized {
    /// Record type name. Drives table-name inference: the name is
    /// lower-cased with no separator insertion, so `BlogPost` maps to
    /// `blogpost`.
    const NAME: &'static str;

    /// Declared fields in declaration order, excluding a synthesized
    /// primary key.
    fn fields() -> &'static [FieldSpec];

    /// Directive block for this record type.
    fn options() -> ModelOptions {
        ModelOptions::default()
    }

    /// Current field values in declaration order.
    fn to_values(&self) -> Vec<Value>;

    /// Rebuilds an instance from decoded field values in declaration order.
    ///
    /// A synthesized primary key is not part of `values`; it is assigned
    /// afterwards through [`Model::assign_primary_key`].
    fn from_values(values: &[Value]) -> Result<Self, CoerceError>;

    /// Assigned primary-key value for a synthesized key, `None` before the
    /// first save.
    fn primary_key(&self) -> Option<i64> {
        None
    }

    /// Stores the engine-assigned primary-key value after an insert.
    fn assign_primary_key(&mut self, _value: i64) {}
}
