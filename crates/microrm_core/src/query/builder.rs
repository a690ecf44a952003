//! Parameterized SQL text builders.
//!
//! # Responsibility
//! - Produce CREATE TABLE, INSERT, SELECT and UPDATE text from a schema
//!   descriptor.
//!
//! # Invariants
//! - Placeholder numbering follows the caller's value order exactly.
//! - Column order follows the descriptor's declaration order.

use crate::query::predicate::Predicate;
use crate::schema::descriptor::{PrimaryKeySpec, SchemaDescriptor};
use crate::schema::types::{column_type, not_null_clause};

/// Builds the idempotent creation statement for the descriptor's table.
pub fn create_table_sql(descriptor: &SchemaDescriptor) -> String {
    let mut defs: Vec<String> = Vec::with_capacity(descriptor.columns.len() + 2);

    if let PrimaryKeySpec::Synthesized { column } = &descriptor.primary_key {
        defs.push(format!("{column} INTEGER PRIMARY KEY AUTOINCREMENT"));
    }

    for (index, column) in descriptor.columns.iter().enumerate() {
        if descriptor.primary_key.declared_index() == Some(index) {
            if descriptor.primary_key.is_auto() {
                defs.push(format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", column.name));
            } else {
                defs.push(format!(
                    "{} {} PRIMARY KEY NOT NULL",
                    column.name,
                    column_type(column.kind).as_sql()
                ));
            }
        } else {
            defs.push(format!(
                "{} {}{}",
                column.name,
                column_type(column.kind).as_sql(),
                not_null_clause(column.nullable)
            ));
        }
    }

    for group in &descriptor.unique {
        defs.push(format!("UNIQUE ({})", group.join(", ")));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({});",
        descriptor.table,
        defs.join(", ")
    )
}

/// Builds the insert statement.
///
/// With `include_pk` unset, an auto-assigned primary-key column is omitted
/// so the engine assigns it.
pub fn insert_sql(descriptor: &SchemaDescriptor, include_pk: bool) -> String {
    let mut columns: Vec<&str> = Vec::with_capacity(descriptor.columns.len() + 1);

    if include_pk {
        if let PrimaryKeySpec::Synthesized { column } = &descriptor.primary_key {
            columns.push(column);
        }
    }
    for (index, column) in descriptor.columns.iter().enumerate() {
        if !include_pk && descriptor.primary_key.declared_index() == Some(index) {
            continue;
        }
        columns.push(&column.name);
    }

    let placeholders: Vec<String> = (1..=columns.len()).map(|n| format!("?{n}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        descriptor.table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Builds the select statement for a conjunctive equality predicate.
///
/// An empty predicate selects every row in storage order.
pub fn select_sql(descriptor: &SchemaDescriptor, predicate: &Predicate) -> String {
    let mut sql = format!(
        "SELECT {} FROM {}",
        descriptor.select_columns().join(", "),
        descriptor.table
    );

    if !predicate.is_empty() {
        let clauses: Vec<String> = predicate
            .fields()
            .enumerate()
            .map(|(index, field)| format!("{field} = ?{}", index + 1))
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    sql.push(';');
    sql
}

/// Builds the update-by-primary-key statement over all non-key columns.
///
/// The key value binds to the last placeholder.
pub fn update_sql(descriptor: &SchemaDescriptor) -> String {
    let mut assignments: Vec<String> = Vec::with_capacity(descriptor.columns.len());
    for (index, column) in descriptor.columns.iter().enumerate() {
        if descriptor.primary_key.declared_index() == Some(index) {
            continue;
        }
        assignments.push(format!("{} = ?{}", column.name, assignments.len() + 1));
    }

    format!(
        "UPDATE {} SET {} WHERE {} = ?{};",
        descriptor.table,
        assignments.join(", "),
        descriptor.primary_key.column(),
        assignments.len() + 1
    )
}

#[cfg(test)]
mod tests {
    use super::{create_table_sql, insert_sql, select_sql, update_sql};
    use crate::model::FieldKind;
    use crate::query::predicate::Predicate;
    use crate::schema::descriptor::{ColumnSpec, PrimaryKeySpec, SchemaDescriptor};
    use rusqlite::types::Value;

    fn column(name: &str, kind: FieldKind, nullable: bool) -> ColumnSpec {
        ColumnSpec {
            name: name.to_string(),
            kind,
            nullable,
        }
    }

    fn user_descriptor() -> SchemaDescriptor {
        SchemaDescriptor {
            model: "User".to_string(),
            table: "user".to_string(),
            primary_key: PrimaryKeySpec::Synthesized {
                column: "id".to_string(),
            },
            columns: vec![
                column("name", FieldKind::Text, false),
                column("email", FieldKind::Text, true),
            ],
            unique: vec![vec!["email".to_string()]],
        }
    }

    fn product_descriptor() -> SchemaDescriptor {
        SchemaDescriptor {
            model: "Product".to_string(),
            table: "product".to_string(),
            primary_key: PrimaryKeySpec::Declared {
                column: "sku".to_string(),
                index: 0,
                auto: false,
            },
            columns: vec![
                column("sku", FieldKind::Text, false),
                column("price", FieldKind::Float, false),
            ],
            unique: Vec::new(),
        }
    }

    #[test]
    fn create_table_lists_synthesized_key_first() {
        assert_eq!(
            create_table_sql(&user_descriptor()),
            "CREATE TABLE IF NOT EXISTS user (id INTEGER PRIMARY KEY AUTOINCREMENT, \
             name TEXT NOT NULL, email TEXT, UNIQUE (email));"
        );
    }

    #[test]
    fn create_table_annotates_declared_text_key() {
        assert_eq!(
            create_table_sql(&product_descriptor()),
            "CREATE TABLE IF NOT EXISTS product (sku TEXT PRIMARY KEY NOT NULL, \
             price REAL NOT NULL);"
        );
    }

    #[test]
    fn insert_omits_auto_assigned_key() {
        assert_eq!(
            insert_sql(&user_descriptor(), false),
            "INSERT INTO user (name, email) VALUES (?1, ?2);"
        );
        assert_eq!(
            insert_sql(&user_descriptor(), true),
            "INSERT INTO user (id, name, email) VALUES (?1, ?2, ?3);"
        );
    }

    #[test]
    fn insert_keeps_declared_key_in_place() {
        assert_eq!(
            insert_sql(&product_descriptor(), true),
            "INSERT INTO product (sku, price) VALUES (?1, ?2);"
        );
    }

    #[test]
    fn select_numbers_placeholders_in_pair_order() {
        let predicate = Predicate::new()
            .eq("name", Value::Text("Alice".to_string()))
            .eq("email", Value::Null);
        assert_eq!(
            select_sql(&user_descriptor(), &predicate),
            "SELECT id, name, email FROM user WHERE name = ?1 AND email = ?2;"
        );
    }

    #[test]
    fn select_without_predicate_has_no_where_clause() {
        assert_eq!(
            select_sql(&user_descriptor(), &Predicate::new()),
            "SELECT id, name, email FROM user;"
        );
    }

    #[test]
    fn update_binds_key_last() {
        assert_eq!(
            update_sql(&user_descriptor()),
            "UPDATE user SET name = ?1, email = ?2 WHERE id = ?3;"
        );
        assert_eq!(
            update_sql(&product_descriptor()),
            "UPDATE product SET price = ?1 WHERE sku = ?2;"
        );
    }
}
