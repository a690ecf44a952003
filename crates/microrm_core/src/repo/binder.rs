//! Record binding between instances and rows.
//!
//! # Responsibility
//! - Move declared field values between record instances and bound
//!   parameter lists.
//!
//! # Invariants
//! - Binding performs no I/O.
//! - Shape divergence between a row and the descriptor is surfaced, never
//!   repaired.

use crate::model::Model;
use crate::repo::record_repo::{RepoError, RepoResult};
use crate::schema::descriptor::{PrimaryKeySpec, SchemaDescriptor};
use crate::schema::types;
use rusqlite::types::Value;

/// Reads declared field values off an instance in declaration order,
/// validated and normalized for binding.
///
/// A NULL value is let through for an auto-assigned declared key so the
/// engine can fill it in.
pub fn to_parameters<M: Model>(
    record: &M,
    descriptor: &SchemaDescriptor,
) -> RepoResult<Vec<Value>> {
    let values = record.to_values();
    if values.len() != descriptor.columns.len() {
        return Err(RepoError::FieldCountMismatch {
            table: descriptor.table.clone(),
            expected: descriptor.columns.len(),
            actual: values.len(),
        });
    }

    let auto_key_index = match &descriptor.primary_key {
        PrimaryKeySpec::Declared {
            index, auto: true, ..
        } => Some(*index),
        _ => None,
    };

    let mut normalized = Vec::with_capacity(values.len());
    for (index, (value, column)) in values.into_iter().zip(&descriptor.columns).enumerate() {
        if auto_key_index == Some(index) && matches!(value, Value::Null) {
            normalized.push(Value::Null);
            continue;
        }
        normalized.push(types::normalize(
            value,
            column.kind,
            column.nullable,
            &column.name,
        )?);
    }

    Ok(normalized)
}

/// Rebuilds a record instance from one result row.
///
/// The row must carry exactly the descriptor's columns, with a synthesized
/// primary key first.
pub fn from_row<M: Model>(row: Vec<Value>, descriptor: &SchemaDescriptor) -> RepoResult<M> {
    let expected = match &descriptor.primary_key {
        PrimaryKeySpec::Synthesized { .. } => descriptor.columns.len() + 1,
        PrimaryKeySpec::Declared { .. } => descriptor.columns.len(),
    };
    if row.len() != expected {
        return Err(RepoError::FieldCountMismatch {
            table: descriptor.table.clone(),
            expected,
            actual: row.len(),
        });
    }

    let mut values = row;
    let assigned_key = match &descriptor.primary_key {
        PrimaryKeySpec::Synthesized { column } => match values.remove(0) {
            Value::Integer(id) => Some(id),
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid primary key value `{other:?}` in {}.{column}",
                    descriptor.table
                )));
            }
        },
        PrimaryKeySpec::Declared { .. } => None,
    };

    let mut decoded = Vec::with_capacity(values.len());
    for (value, column) in values.into_iter().zip(&descriptor.columns) {
        decoded.push(types::normalize(
            value,
            column.kind,
            column.nullable,
            &column.name,
        )?);
    }

    let mut record = M::from_values(&decoded)?;
    if let Some(id) = assigned_key {
        record.assign_primary_key(id);
    }
    Ok(record)
}
