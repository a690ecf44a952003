//! Schema descriptor derivation.
//!
//! # Responsibility
//! - Compute the storage mapping of a record type: table name, ordered
//!   columns, primary key, unique-constraint groups.
//!
//! # Invariants
//! - Table name and column list are fixed once derived; derivation has no
//!   side effects and no I/O.
//! - A primary-key directive other than the implicit `id` must reference a
//!   declared field.

use crate::model::{FieldKind, Model, UniqueSpec};
use crate::schema::{SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};

/// One storage column derived from a declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: FieldKind,
    pub nullable: bool,
}

/// Primary-key placement for one record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryKeySpec {
    /// Auto-incrementing INTEGER column synthesized ahead of the declared
    /// fields.
    Synthesized { column: String },
    /// A declared field serves as the key. `index` points into the declared
    /// column list; `auto` marks engine-assigned INTEGER keys.
    Declared {
        column: String,
        index: usize,
        auto: bool,
    },
}

impl PrimaryKeySpec {
    /// Column name of the primary key.
    pub fn column(&self) -> &str {
        match self {
            Self::Synthesized { column } | Self::Declared { column, .. } => column,
        }
    }

    /// Whether the engine assigns the key value on insert.
    pub fn is_auto(&self) -> bool {
        match self {
            Self::Synthesized { .. } => true,
            Self::Declared { auto, .. } => *auto,
        }
    }

    pub(crate) fn declared_index(&self) -> Option<usize> {
        match self {
            Self::Synthesized { .. } => None,
            Self::Declared { index, .. } => Some(*index),
        }
    }
}

/// Derived, immutable storage description of one record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Record type name the descriptor was derived from.
    pub model: String,
    /// Target table name.
    pub table: String,
    /// Primary-key placement.
    pub primary_key: PrimaryKeySpec,
    /// Declared columns in declaration order. A synthesized primary key is
    /// not listed here.
    pub columns: Vec<ColumnSpec>,
    /// Normalized unique-constraint groups.
    pub unique: Vec<Vec<String>>,
}

impl SchemaDescriptor {
    /// Whether `name` is the primary-key column or a declared column.
    pub fn has_column(&self, name: &str) -> bool {
        self.primary_key.column() == name || self.columns.iter().any(|column| column.name == name)
    }

    /// Column names in result order: a synthesized key first, then the
    /// declared columns.
    pub(crate) fn select_columns(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.columns.len() + 1);
        if let PrimaryKeySpec::Synthesized { column } = &self.primary_key {
            names.push(column.as_str());
        }
        names.extend(self.columns.iter().map(|column| column.name.as_str()));
        names
    }
}

/// Derives the storage descriptor for a record type.
///
/// Table name resolution: the explicit `table` directive wins; otherwise
/// the record type name is lower-cased with no separator insertion, so
/// `BlogPost` becomes `blogpost`.
///
/// The primary key defaults to `id`. When `id` is not among the declared
/// fields an auto-incrementing INTEGER column is synthesized and prepended.
/// Any other primary-key name must reference a declared field. A declared
/// INTEGER key is engine-assigned; a declared TEXT key is caller-assigned;
/// other kinds and nullable keys are rejected.
pub fn derive<M: Model>() -> SchemaResult<SchemaDescriptor> {
    let options = M::options();
    let fields = M::fields();

    let table = options
        .table
        .map(str::to_string)
        .unwrap_or_else(|| M::NAME.to_lowercase());

    let columns: Vec<ColumnSpec> = fields
        .iter()
        .map(|field| ColumnSpec {
            name: field.name.to_string(),
            kind: field.kind,
            nullable: field.nullable,
        })
        .collect();

    let pk_name = options.primary_key;
    let primary_key = match fields.iter().position(|field| field.name == pk_name) {
        Some(index) => {
            let field = &fields[index];
            if field.nullable {
                return Err(SchemaError::UnsupportedType {
                    field: pk_name.to_string(),
                    declared: "nullable primary key".to_string(),
                });
            }
            let auto = match field.kind {
                FieldKind::Integer => true,
                FieldKind::Text => false,
                other => {
                    return Err(SchemaError::UnsupportedType {
                        field: pk_name.to_string(),
                        declared: format!("{} primary key", other.label()),
                    });
                }
            };
            PrimaryKeySpec::Declared {
                column: pk_name.to_string(),
                index,
                auto,
            }
        }
        None if pk_name == "id" => PrimaryKeySpec::Synthesized {
            column: "id".to_string(),
        },
        None => {
            return Err(SchemaError::InvalidPrimaryKey {
                model: M::NAME.to_string(),
                field: pk_name.to_string(),
            });
        }
    };

    let unique = normalize_unique(M::NAME, &options.unique, &columns, primary_key.column())?;

    Ok(SchemaDescriptor {
        model: M::NAME.to_string(),
        table,
        primary_key,
        columns,
        unique,
    })
}

fn normalize_unique(
    model: &str,
    spec: &UniqueSpec,
    columns: &[ColumnSpec],
    pk_column: &str,
) -> SchemaResult<Vec<Vec<String>>> {
    let groups: Vec<Vec<&'static str>> = match *spec {
        UniqueSpec::None => Vec::new(),
        UniqueSpec::Field(field) => vec![vec![field]],
        UniqueSpec::Group(group) => vec![group.to_vec()],
        UniqueSpec::Groups(groups) => groups.iter().map(|group| group.to_vec()).collect(),
    };

    let mut normalized = Vec::with_capacity(groups.len());
    for group in &groups {
        if group.is_empty() {
            return Err(SchemaError::EmptyUniqueGroup {
                model: model.to_string(),
            });
        }
        for field in group {
            let known =
                *field == pk_column || columns.iter().any(|column| column.name == *field);
            if !known {
                return Err(SchemaError::UnknownField {
                    model: model.to_string(),
                    field: field.to_string(),
                });
            }
        }
        normalized.push(group.iter().map(|field| field.to_string()).collect());
    }

    Ok(normalized)
}
