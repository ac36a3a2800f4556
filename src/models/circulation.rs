use chrono::{NaiveDate, NaiveDateTime};

use crate::error::Result;
use crate::models::Book;
use crate::record::{Entity, Record, Values};
use crate::schema::Schema;
use crate::sqlite::Database;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub registration: String,
    pub isbn: String,
    pub loaned_on: NaiveDate,
    pub due_on: NaiveDate,
}

impl Entity for Loan {
    const SCHEMA: Schema = Schema::new(
        "loans",
        &["registration", "isbn", "loaned_on", "due_on"],
        &["registration", "isbn"],
    );

    fn from_values(values: &mut Values) -> Result<Self> {
        Ok(Self {
            registration: values.take()?,
            isbn: values.take()?,
            loaned_on: values.take()?,
            due_on: values.take()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.registration.as_str().into(),
            self.isbn.as_str().into(),
            self.loaned_on.into(),
            self.due_on.into(),
        ]
    }
}

impl Loan {
    pub fn book(&self, db: &Database) -> Result<Option<Record<Book>>> {
        Book::select(db, self.isbn.as_str())
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.due_on
    }
}

/// A hold on a book. `fulfilled_at` stays empty while the reservation waits
/// for a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub registration: String,
    pub isbn: String,
    pub reserved_at: NaiveDateTime,
    pub fulfilled_at: Option<NaiveDateTime>,
}

impl Entity for Reservation {
    const SCHEMA: Schema = Schema::new(
        "reservations",
        &["registration", "isbn", "reserved_at", "fulfilled_at"],
        &["registration", "isbn"],
    );

    fn from_values(values: &mut Values) -> Result<Self> {
        Ok(Self {
            registration: values.take()?,
            isbn: values.take()?,
            reserved_at: values.take()?,
            fulfilled_at: values.take()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.registration.as_str().into(),
            self.isbn.as_str().into(),
            self.reserved_at.into(),
            self.fulfilled_at.into(),
        ]
    }
}

impl Reservation {
    /// Build a reservation of `book` made `at`. It is fulfilled immediately
    /// when the book still has open slots, otherwise it is queued.
    ///
    /// The reservation is not inserted.
    pub fn request(
        db: &Database,
        registration: &str,
        book: &Book,
        at: NaiveDateTime,
    ) -> Result<Self> {
        let fulfilled_at = (book.open_slots(db)? > 0).then_some(at);
        Ok(Self {
            registration: registration.to_string(),
            isbn: book.isbn.clone(),
            reserved_at: at,
            fulfilled_at,
        })
    }

    pub fn is_fulfilled(&self) -> bool {
        self.fulfilled_at.is_some()
    }

    pub fn book(&self, db: &Database) -> Result<Option<Record<Book>>> {
        Book::select(db, self.isbn.as_str())
    }

    /// [`Book::advance_queue`] over every book in the catalog.
    pub fn advance_queues(db: &Database, at: NaiveDateTime) -> Result<usize> {
        let mut fulfilled = 0;
        for book in Book::select_all(db)? {
            fulfilled += book.advance_queue(db, at)?;
        }
        Ok(fulfilled)
    }
}
