//! Equality predicate construction.
//!
//! # Invariants
//! - Pair order is preserved; it drives placeholder numbering.
//! - Field names are validated against the descriptor before any SQL text
//!   is built.

use crate::schema::descriptor::SchemaDescriptor;
use rusqlite::types::Value;

/// Ordered conjunction of `field = value` constraints.
///
/// An empty predicate matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    pairs: Vec<(String, Value)>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one equality constraint, keeping insertion order.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.pairs.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub(crate) fn fields(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(field, _)| field.as_str())
    }

    pub(crate) fn bind_values(&self) -> Vec<Value> {
        self.pairs.iter().map(|(_, value)| value.clone()).collect()
    }

    /// First constrained field the descriptor does not know, if any.
    pub(crate) fn unknown_field(&self, descriptor: &SchemaDescriptor) -> Option<&str> {
        self.fields().find(|field| !descriptor.has_column(field))
    }
}

#[cfg(test)]
mod tests {
    use super::{Predicate, Value};
    use crate::schema::descriptor::{ColumnSpec, PrimaryKeySpec, SchemaDescriptor};
    use crate::model::FieldKind;

    fn descriptor() -> SchemaDescriptor {
        SchemaDescriptor {
            model: "User".to_string(),
            table: "user".to_string(),
            primary_key: PrimaryKeySpec::Synthesized {
                column: "id".to_string(),
            },
            columns: vec![ColumnSpec {
                name: "name".to_string(),
                kind: FieldKind::Text,
                nullable: false,
            }],
            unique: Vec::new(),
        }
    }

    #[test]
    fn pairs_keep_insertion_order() {
        let predicate = Predicate::new()
            .eq("name", Value::Text("Alice".to_string()))
            .eq("id", 1i64);
        let fields: Vec<&str> = predicate.fields().collect();
        assert_eq!(fields, vec!["name", "id"]);
        assert_eq!(predicate.len(), 2);
    }

    #[test]
    fn unknown_field_is_reported() {
        let predicate = Predicate::new().eq("nickname", Value::Null);
        assert_eq!(predicate.unknown_field(&descriptor()), Some("nickname"));
    }

    #[test]
    fn primary_key_column_is_a_known_field() {
        let predicate = Predicate::new().eq("id", 1i64);
        assert_eq!(predicate.unknown_field(&descriptor()), None);
    }
}
