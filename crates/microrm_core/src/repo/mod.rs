//! Persistence operations over registered record types.
//!
//! # Responsibility
//! - Bind record instances to rows and back.
//! - Provide the save/get/filter surface on top of the database handle.
//!
//! # Invariants
//! - Every operation guarantees the target table exists before touching it.
//! - Errors are surfaced to the caller; nothing is swallowed or retried
//!   silently.

pub mod binder;
pub mod record_repo;
