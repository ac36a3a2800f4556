use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::Result;
use crate::models::{Loan, Reservation};
use crate::record::{Entity, Filter, Record, Values};
use crate::schema::Schema;
use crate::sqlite::Database;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub year: i64,
    pub publisher: String,
    pub copies: i64,
    pub category_code: Option<i64>,
}

impl Entity for Book {
    const SCHEMA: Schema = Schema::new(
        "books",
        &["isbn", "title", "year", "publisher", "copies", "category_code"],
        &["isbn"],
    );

    fn from_values(values: &mut Values) -> Result<Self> {
        Ok(Self {
            isbn: values.take()?,
            title: values.take()?,
            year: values.take()?,
            publisher: values.take()?,
            copies: values.take()?,
            category_code: values.take()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.isbn.as_str().into(),
            self.title.as_str().into(),
            self.year.into(),
            self.publisher.as_str().into(),
            self.copies.into(),
            self.category_code.into(),
        ]
    }
}

impl Book {
    /// Authors linked through `author_books`. Dangling links are skipped.
    pub fn authors(&self, db: &Database) -> Result<Vec<Record<Author>>> {
        let links = AuthorBook::filter(db, Filter::new().with_condition("book_isbn", &self.isbn))?;
        let mut authors = Vec::with_capacity(links.len());
        for link in links {
            if let Some(author) = Author::select(db, link.author_cpf.as_str())? {
                authors.push(author);
            }
        }
        Ok(authors)
    }

    /// Description of the book's category.
    pub fn category(&self, db: &Database) -> Result<Option<String>> {
        let Some(code) = self.category_code else {
            return Ok(None);
        };
        Ok(Category::select(db, code)?.map(|c| c.into_entity().description))
    }

    pub fn loans(&self, db: &Database) -> Result<Vec<Record<Loan>>> {
        Loan::filter(db, Filter::new().with_condition("isbn", &self.isbn))
    }

    pub fn reservations(&self, db: &Database) -> Result<Vec<Record<Reservation>>> {
        Reservation::filter(db, Filter::new().with_condition("isbn", &self.isbn))
    }

    /// Copies not currently on loan.
    pub fn available(&self, db: &Database) -> Result<i64> {
        Ok(self.copies - self.loans(db)?.len() as i64)
    }

    /// Copies neither on loan nor held by a reservation.
    pub fn open_slots(&self, db: &Database) -> Result<i64> {
        Ok(self.available(db)? - self.reservations(db)?.len() as i64)
    }

    /// Move the reservation queue forward.
    ///
    /// Fulfilled reservations are dropped first. Then the oldest queued
    /// reservations, by `reserved_at`, are marked fulfilled `at`, one per copy
    /// not on loan. Returns how many were fulfilled.
    pub fn advance_queue(&self, db: &Database, at: NaiveDateTime) -> Result<usize> {
        let mut queued = Vec::new();
        for reservation in self.reservations(db)? {
            if reservation.is_fulfilled() {
                reservation.delete(db);
            } else {
                queued.push(reservation);
            }
        }
        queued.sort_by_key(|r| r.reserved_at);

        let open = usize::try_from(self.available(db)?).unwrap_or(0);
        let mut fulfilled = 0;
        for mut reservation in queued.into_iter().take(open) {
            reservation.fulfilled_at = Some(at);
            if reservation.update(db) {
                fulfilled += 1;
            }
        }
        debug!(isbn = %self.isbn, fulfilled, "reservation queue advanced");
        Ok(fulfilled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub cpf: String,
    pub name: String,
    pub nationality: String,
}

impl Entity for Author {
    const SCHEMA: Schema = Schema::new("authors", &["cpf", "name", "nationality"], &["cpf"]);

    fn from_values(values: &mut Values) -> Result<Self> {
        Ok(Self {
            cpf: values.take()?,
            name: values.take()?,
            nationality: values.take()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.cpf.as_str().into(),
            self.name.as_str().into(),
            self.nationality.as_str().into(),
        ]
    }
}

impl Author {
    pub fn books(&self, db: &Database) -> Result<Vec<Record<Book>>> {
        let links = AuthorBook::filter(db, Filter::key(self.cpf.as_str()))?;
        let mut books = Vec::with_capacity(links.len());
        for link in links {
            if let Some(book) = Book::select(db, link.book_isbn.as_str())? {
                books.push(book);
            }
        }
        Ok(books)
    }
}

/// Link between an author and a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorBook {
    pub author_cpf: String,
    pub book_isbn: String,
}

impl Entity for AuthorBook {
    const SCHEMA: Schema = Schema::new(
        "author_books",
        &["author_cpf", "book_isbn"],
        &["author_cpf", "book_isbn"],
    );

    fn from_values(values: &mut Values) -> Result<Self> {
        Ok(Self {
            author_cpf: values.take()?,
            book_isbn: values.take()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![self.author_cpf.as_str().into(), self.book_isbn.as_str().into()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub code: i64,
    pub description: String,
}

impl Entity for Category {
    const SCHEMA: Schema = Schema::new("categories", &["code", "description"], &["code"]);

    fn from_values(values: &mut Values) -> Result<Self> {
        Ok(Self {
            code: values.take()?,
            description: values.take()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![self.code.into(), self.description.as_str().into()]
    }
}

impl Category {
    pub fn books(&self, db: &Database) -> Result<Vec<Record<Book>>> {
        Book::filter(db, Filter::new().with_condition("category_code", self.code))
    }
}
