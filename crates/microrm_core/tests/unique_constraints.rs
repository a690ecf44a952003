use microrm_core::db::open_in_memory;
use microrm_core::schema::types::{self, CoerceError, Value};
use microrm_core::{FieldKind, FieldSpec, Model, ModelOptions, Repository, UniqueSpec};

#[derive(Debug, Clone, PartialEq)]
struct Account {
    id: Option<i64>,
    email: String,
    display_name: String,
}

impl Account {
    fn new(email: &str, display_name: &str) -> Self {
        Self {
            id: None,
            email: email.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

impl Model for Account {
    const NAME: &'static str = "Account";

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::required("email", FieldKind::Text),
            FieldSpec::required("display_name", FieldKind::Text),
        ];
        FIELDS
    }

    fn options() -> ModelOptions {
        ModelOptions {
            unique: UniqueSpec::Field("email"),
            ..ModelOptions::default()
        }
    }

    fn to_values(&self) -> Vec<Value> {
        vec![types::text(&self.email), types::text(&self.display_name)]
    }

    fn from_values(values: &[Value]) -> Result<Self, CoerceError> {
        Ok(Self {
            id: None,
            email: types::as_text(&values[0], "email")?,
            display_name: types::as_text(&values[1], "display_name")?,
        })
    }

    fn primary_key(&self) -> Option<i64> {
        self.id
    }

    fn assign_primary_key(&mut self, value: i64) {
        self.id = Some(value);
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Booking {
    id: Option<i64>,
    room: String,
    day: i64,
    guest: String,
}

impl Booking {
    fn new(room: &str, day: i64, guest: &str) -> Self {
        Self {
            id: None,
            room: room.to_string(),
            day,
            guest: guest.to_string(),
        }
    }
}

impl Model for Booking {
    const NAME: &'static str = "Booking";

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::required("room", FieldKind::Text),
            FieldSpec::required("day", FieldKind::Integer),
            FieldSpec::required("guest", FieldKind::Text),
        ];
        FIELDS
    }

    fn options() -> ModelOptions {
        ModelOptions {
            unique: UniqueSpec::Groups(&[&["room", "day"], &["guest"]]),
            ..ModelOptions::default()
        }
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            types::text(&self.room),
            types::integer(self.day),
            types::text(&self.guest),
        ]
    }

    fn from_values(values: &[Value]) -> Result<Self, CoerceError> {
        Ok(Self {
            id: None,
            room: types::as_text(&values[0], "room")?,
            day: types::as_integer(&values[1], "day")?,
            guest: types::as_text(&values[2], "guest")?,
        })
    }

    fn primary_key(&self) -> Option<i64> {
        self.id
    }

    fn assign_primary_key(&mut self, value: i64) {
        self.id = Some(value);
    }
}

#[test]
fn colliding_unique_field_fails_the_insert() {
    let db = open_in_memory().unwrap();
    db.register::<Account>().unwrap();
    let accounts = Repository::<Account>::try_new(&db).unwrap();

    accounts.save(&mut Account::new("a@x.com", "first")).unwrap();

    let err = accounts
        .save(&mut Account::new("a@x.com", "second"))
        .unwrap_err();
    assert!(err.is_constraint_violation());
}

#[test]
fn violation_leaves_registration_state_usable() {
    let db = open_in_memory().unwrap();
    db.register::<Account>().unwrap();
    let accounts = Repository::<Account>::try_new(&db).unwrap();

    accounts.save(&mut Account::new("a@x.com", "first")).unwrap();
    let err = accounts
        .save(&mut Account::new("a@x.com", "dup"))
        .unwrap_err();
    assert!(err.is_constraint_violation());

    accounts.save(&mut Account::new("b@x.com", "second")).unwrap();
    assert_eq!(accounts.all().unwrap().len(), 2);
}

#[test]
fn group_constraint_is_enforced_jointly() {
    let db = open_in_memory().unwrap();
    db.register::<Booking>().unwrap();
    let bookings = Repository::<Booking>::try_new(&db).unwrap();

    bookings.save(&mut Booking::new("blue", 1, "ada")).unwrap();
    // Same room on another day is fine; the pair is what must be unique.
    bookings.save(&mut Booking::new("blue", 2, "grace")).unwrap();

    let err = bookings
        .save(&mut Booking::new("blue", 1, "linus"))
        .unwrap_err();
    assert!(err.is_constraint_violation());
}

#[test]
fn independent_groups_are_enforced_separately() {
    let db = open_in_memory().unwrap();
    db.register::<Booking>().unwrap();
    let bookings = Repository::<Booking>::try_new(&db).unwrap();

    bookings.save(&mut Booking::new("blue", 1, "ada")).unwrap();

    let err = bookings
        .save(&mut Booking::new("red", 9, "ada"))
        .unwrap_err();
    assert!(err.is_constraint_violation());
}
