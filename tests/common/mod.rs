#![allow(dead_code)]

use chrono::NaiveDate;
use library_sqlite::auth::password_hash;
use library_sqlite::models::{Book, Course, Professor, Staff, Student, User, UserKind};
use library_sqlite::{Database, Entity, Record};

pub fn create_test_db() -> Database {
    Database::open_in_memory().expect("in-memory database")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn book(isbn: &str, title: &str, copies: i64) -> Record<Book> {
    Record::new(Book {
        isbn: isbn.to_string(),
        title: title.to_string(),
        year: 2001,
        publisher: "Campus".to_string(),
        copies,
        category_code: None,
    })
}

pub fn user(registration: &str, kind: UserKind) -> Record<User> {
    Record::new(User {
        registration: registration.to_string(),
        nickname: format!("user{registration}"),
        password_hash: password_hash("secret"),
        name: format!("User {registration}"),
        address: "Main St".to_string(),
        kind,
        permission: 0,
    })
}

pub fn ensure_course(db: &Database) {
    let course = Record::new(Course {
        code: 1,
        name: "Computer Science".to_string(),
    });
    if Course::select(db, 1).unwrap().is_none() {
        assert!(course.insert(db));
    }
}

/// Insert a user together with its profile row.
pub fn seed_user(db: &Database, registration: &str, kind: UserKind) -> Record<User> {
    let user = user(registration, kind);
    assert!(user.insert(db), "insert user {registration}");
    match kind {
        UserKind::Student => {
            ensure_course(db);
            Record::new(Student {
                registration: registration.to_string(),
                expected_graduation: date(2099, 12, 15),
                enrolled_on: date(2020, 2, 1),
                course_code: 1,
            })
            .insert_strict(db)
            .expect("insert student");
        }
        UserKind::Professor => {
            ensure_course(db);
            assert!(Record::new(Professor {
                siape: registration.to_string(),
                hired_on: date(2010, 8, 1),
                work_regime: "full-time".to_string(),
                course_code: 1,
            })
            .insert(db));
        }
        UserKind::Staff => {
            assert!(Record::new(Staff {
                registration: registration.to_string(),
            })
            .insert(db));
        }
    }
    user
}
