//! Statement construction for the mapping core.
//!
//! # Responsibility
//! - Translate descriptors and predicates into parameterized SQL text.
//!
//! # Invariants
//! - Values are always bound through placeholders, never interpolated.

pub mod builder;
pub mod predicate;

pub use predicate::Predicate;
