//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `microrm_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use microrm_core::schema::types::{self, CoerceError, Value};
use microrm_core::{open_in_memory, FieldKind, FieldSpec, Model, Repository};
use std::process::ExitCode;

#[derive(Debug)]
struct User {
    id: Option<i64>,
    name: String,
    email: Option<String>,
}

impl Model for User {
    const NAME: &'static str = "User";

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::required("name", FieldKind::Text),
            FieldSpec::optional("email", FieldKind::Text),
        ];
        FIELDS
    }

    fn to_values(&self) -> Vec<Value> {
        vec![types::text(&self.name), types::opt_text(self.email.as_deref())]
    }

    fn from_values(values: &[Value]) -> Result<Self, CoerceError> {
        Ok(Self {
            id: None,
            name: types::as_text(&values[0], "name")?,
            email: types::as_opt_text(&values[1], "email")?,
        })
    }

    fn primary_key(&self) -> Option<i64> {
        self.id
    }

    fn assign_primary_key(&mut self, value: i64) {
        self.id = Some(value);
    }
}

fn main() -> ExitCode {
    // Why: keep a tiny probe that exercises the full save/read path without
    // touching the filesystem, so core wiring can be checked in isolation.
    println!("microrm_core version={}", microrm_core::core_version());
    match smoke() {
        Ok(()) => {
            println!("smoke=ok");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("smoke failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn smoke() -> Result<(), Box<dyn std::error::Error>> {
    let db = open_in_memory()?;
    db.register::<User>()?;
    let users = Repository::<User>::try_new(&db)?;

    let mut alice = User {
        id: None,
        name: "Alice".to_string(),
        email: Some("alice@example.com".to_string()),
    };
    users.save(&mut alice)?;
    let id = alice.id.ok_or("primary key was not assigned")?;

    let loaded = users.find(id)?.ok_or("saved record not found")?;
    println!("roundtrip id={id} name={}", loaded.name);
    Ok(())
}
