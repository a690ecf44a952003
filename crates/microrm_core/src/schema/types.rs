//! Storage type mapping and scalar coercion.
//!
//! # Responsibility
//! - Map semantic field kinds to storage column types and back.
//! - Validate and normalize scalars crossing the storage boundary.
//!
//! # Invariants
//! - Booleans are stored as INTEGER and only 0/1 decode back.
//! - NULL is accepted only for nullable fields.

use crate::model::FieldKind;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use rusqlite::types::Value;

/// Storage column type for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    Blob,
}

impl ColumnType {
    /// SQL spelling of this column type.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Blob => "BLOB",
        }
    }
}

/// Maps a semantic field kind to its storage column type.
pub fn column_type(kind: FieldKind) -> ColumnType {
    match kind {
        FieldKind::Text => ColumnType::Text,
        FieldKind::Integer | FieldKind::Boolean => ColumnType::Integer,
        FieldKind::Float => ColumnType::Real,
        FieldKind::Blob => ColumnType::Blob,
    }
}

/// SQL nullability clause for one field, separate from the column type.
pub fn not_null_clause(nullable: bool) -> &'static str {
    if nullable {
        ""
    } else {
        " NOT NULL"
    }
}

/// Scalar/field shape mismatch found while moving a value across the
/// storage boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceError {
    /// Field the value was destined for or read from.
    pub field: String,
    /// Expected storage shape.
    pub expected: &'static str,
    /// Observed storage shape.
    pub found: String,
}

impl CoerceError {
    pub fn new(field: &str, expected: &'static str, found: &Value) -> Self {
        Self {
            field: field.to_string(),
            expected,
            found: variant_name(found).to_string(),
        }
    }
}

impl Display for CoerceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "field `{}` expected {}, found {}",
            self.field, self.expected, self.found
        )
    }
}

impl Error for CoerceError {}

fn variant_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Integer(_) => "INTEGER",
        Value::Real(_) => "REAL",
        Value::Text(_) => "TEXT",
        Value::Blob(_) => "BLOB",
    }
}

/// Validates one scalar against a field declaration and normalizes it to
/// its canonical storage shape.
///
/// Integers widen to REAL for float fields. Booleans must already be
/// INTEGER and only 0/1 are accepted.
pub fn normalize(
    value: Value,
    kind: FieldKind,
    nullable: bool,
    field: &str,
) -> Result<Value, CoerceError> {
    match (kind, value) {
        (_, Value::Null) if nullable => Ok(Value::Null),
        (kind, value @ Value::Null) => Err(CoerceError::new(field, expected_shape(kind), &value)),
        (FieldKind::Text, Value::Text(text)) => Ok(Value::Text(text)),
        (FieldKind::Integer, Value::Integer(number)) => Ok(Value::Integer(number)),
        (FieldKind::Float, Value::Real(number)) => Ok(Value::Real(number)),
        (FieldKind::Float, Value::Integer(number)) => Ok(Value::Real(number as f64)),
        (FieldKind::Boolean, Value::Integer(flag @ (0 | 1))) => Ok(Value::Integer(flag)),
        (FieldKind::Blob, Value::Blob(bytes)) => Ok(Value::Blob(bytes)),
        (kind, value) => Err(CoerceError::new(field, expected_shape(kind), &value)),
    }
}

fn expected_shape(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "TEXT",
        FieldKind::Integer => "INTEGER",
        FieldKind::Float => "REAL",
        FieldKind::Boolean => "INTEGER 0/1",
        FieldKind::Blob => "BLOB",
    }
}

/// Binds a text value.
pub fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

/// Binds an optional text value.
pub fn opt_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}

/// Binds an integer value.
pub fn integer(value: i64) -> Value {
    Value::Integer(value)
}

/// Binds an optional integer value.
pub fn opt_integer(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

/// Binds a float value.
pub fn real(value: f64) -> Value {
    Value::Real(value)
}

/// Binds an optional float value.
pub fn opt_real(value: Option<f64>) -> Value {
    value.map_or(Value::Null, Value::Real)
}

/// Binds a boolean value as INTEGER 0/1.
pub fn boolean(value: bool) -> Value {
    Value::Integer(i64::from(value))
}

/// Binds an optional boolean value.
pub fn opt_boolean(value: Option<bool>) -> Value {
    value.map_or(Value::Null, boolean)
}

/// Binds a byte-string value.
pub fn blob(value: &[u8]) -> Value {
    Value::Blob(value.to_vec())
}

/// Reads a stored text value back.
pub fn as_text(value: &Value, field: &str) -> Result<String, CoerceError> {
    match value {
        Value::Text(text) => Ok(text.clone()),
        other => Err(CoerceError::new(field, "TEXT", other)),
    }
}

/// Reads a stored optional text value back.
pub fn as_opt_text(value: &Value, field: &str) -> Result<Option<String>, CoerceError> {
    match value {
        Value::Null => Ok(None),
        other => as_text(other, field).map(Some),
    }
}

/// Reads a stored integer value back.
pub fn as_integer(value: &Value, field: &str) -> Result<i64, CoerceError> {
    match value {
        Value::Integer(number) => Ok(*number),
        other => Err(CoerceError::new(field, "INTEGER", other)),
    }
}

/// Reads a stored optional integer value back.
pub fn as_opt_integer(value: &Value, field: &str) -> Result<Option<i64>, CoerceError> {
    match value {
        Value::Null => Ok(None),
        other => as_integer(other, field).map(Some),
    }
}

/// Reads a stored float value back, widening INTEGER storage.
pub fn as_real(value: &Value, field: &str) -> Result<f64, CoerceError> {
    match value {
        Value::Real(number) => Ok(*number),
        Value::Integer(number) => Ok(*number as f64),
        other => Err(CoerceError::new(field, "REAL", other)),
    }
}

/// Reads a stored optional float value back.
pub fn as_opt_real(value: &Value, field: &str) -> Result<Option<f64>, CoerceError> {
    match value {
        Value::Null => Ok(None),
        other => as_real(other, field).map(Some),
    }
}

/// Reads a stored boolean back from INTEGER 0/1.
pub fn as_boolean(value: &Value, field: &str) -> Result<bool, CoerceError> {
    match value {
        Value::Integer(0) => Ok(false),
        Value::Integer(1) => Ok(true),
        other => Err(CoerceError::new(field, "INTEGER 0/1", other)),
    }
}

/// Reads a stored optional boolean value back.
pub fn as_opt_boolean(value: &Value, field: &str) -> Result<Option<bool>, CoerceError> {
    match value {
        Value::Null => Ok(None),
        other => as_boolean(other, field).map(Some),
    }
}

/// Reads a stored byte-string value back.
pub fn as_blob(value: &Value, field: &str) -> Result<Vec<u8>, CoerceError> {
    match value {
        Value::Blob(bytes) => Ok(bytes.clone()),
        other => Err(CoerceError::new(field, "BLOB", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        as_boolean, as_opt_text, as_real, boolean, column_type, normalize, not_null_clause,
        opt_text, ColumnType, Value,
    };
    use crate::model::FieldKind;

    #[test]
    fn kinds_map_to_storage_column_types() {
        assert_eq!(column_type(FieldKind::Text), ColumnType::Text);
        assert_eq!(column_type(FieldKind::Integer), ColumnType::Integer);
        assert_eq!(column_type(FieldKind::Boolean), ColumnType::Integer);
        assert_eq!(column_type(FieldKind::Float), ColumnType::Real);
        assert_eq!(column_type(FieldKind::Blob), ColumnType::Blob);
        assert_eq!(ColumnType::Real.as_sql(), "REAL");
    }

    #[test]
    fn nullability_clause_is_separate_from_column_type() {
        assert_eq!(not_null_clause(false), " NOT NULL");
        assert_eq!(not_null_clause(true), "");
    }

    #[test]
    fn normalize_rejects_null_for_required_fields() {
        let err = normalize(Value::Null, FieldKind::Text, false, "name").unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.found, "NULL");

        assert_eq!(
            normalize(Value::Null, FieldKind::Text, true, "email").unwrap(),
            Value::Null
        );
    }

    #[test]
    fn normalize_widens_integers_for_float_fields() {
        assert_eq!(
            normalize(Value::Integer(3), FieldKind::Float, false, "score").unwrap(),
            Value::Real(3.0)
        );
    }

    #[test]
    fn normalize_accepts_only_zero_and_one_for_booleans() {
        assert_eq!(
            normalize(Value::Integer(1), FieldKind::Boolean, false, "active").unwrap(),
            Value::Integer(1)
        );
        let err = normalize(Value::Integer(2), FieldKind::Boolean, false, "active").unwrap_err();
        assert_eq!(err.expected, "INTEGER 0/1");
    }

    #[test]
    fn boolean_round_trips_through_integer_storage() {
        assert!(as_boolean(&boolean(true), "active").unwrap());
        assert!(!as_boolean(&boolean(false), "active").unwrap());
        assert!(as_boolean(&Value::Integer(7), "active").is_err());
    }

    #[test]
    fn optional_text_round_trips_null() {
        assert_eq!(opt_text(None), Value::Null);
        assert_eq!(as_opt_text(&Value::Null, "email").unwrap(), None);
        assert_eq!(
            as_opt_text(&opt_text(Some("a@x.com")), "email").unwrap(),
            Some("a@x.com".to_string())
        );
    }

    #[test]
    fn real_widens_integer_storage_on_read() {
        assert_eq!(as_real(&Value::Integer(2), "score").unwrap(), 2.0);
    }
}
