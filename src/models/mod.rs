//! Library entities and their derived accessors.
//!
//! Relationships are never held by reference: every accessor issues a fresh
//! select or filter through the [`Database`](crate::Database) it is given.

mod book;
mod circulation;
mod course;
mod user;

pub use book::{Author, AuthorBook, Book, Category};
pub use circulation::{Loan, Reservation};
pub use course::Course;
pub use user::{Phone, Professor, Profile, Staff, Student, User, UserKind};

use crate::record::Entity;
use crate::schema::Schema;

/// Schemas of every library table.
pub const ALL_SCHEMAS: [Schema; 12] = [
    User::SCHEMA,
    Student::SCHEMA,
    Staff::SCHEMA,
    Professor::SCHEMA,
    Course::SCHEMA,
    Phone::SCHEMA,
    Loan::SCHEMA,
    Reservation::SCHEMA,
    Category::SCHEMA,
    Book::SCHEMA,
    AuthorBook::SCHEMA,
    Author::SCHEMA,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::Database;

    #[test]
    fn every_schema_is_valid() {
        for schema in ALL_SCHEMAS {
            schema.validate().unwrap();
        }
    }

    #[test]
    fn every_schema_matches_its_table() {
        let db = Database::open_in_memory().unwrap();
        for schema in ALL_SCHEMAS {
            assert_eq!(db.select_all(&schema).unwrap().count(), 0, "{}", schema.table);
        }

        let course = Course {
            code: 1,
            name: "Computer Science".to_string(),
        };
        assert!(crate::Record::new(course).insert(&db));
        let rows: Vec<_> = db.select_all(&Course::SCHEMA).unwrap().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), Course::SCHEMA.columns.len());
    }
}
