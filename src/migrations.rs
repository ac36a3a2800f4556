//! Library schema, applied on first connect.

use rusqlite::Connection;

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS courses (
    code INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    code INTEGER PRIMARY KEY,
    description TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    registration TEXT PRIMARY KEY,
    nickname TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    name TEXT NOT NULL,
    address TEXT NOT NULL DEFAULT '',
    kind TEXT NOT NULL CHECK (kind IN ('student', 'professor', 'staff')),
    permission INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS students (
    registration TEXT PRIMARY KEY
        REFERENCES users(registration) ON UPDATE CASCADE ON DELETE CASCADE,
    expected_graduation TEXT NOT NULL,
    enrolled_on TEXT NOT NULL,
    course_code INTEGER NOT NULL REFERENCES courses(code)
);

CREATE TABLE IF NOT EXISTS professors (
    siape TEXT PRIMARY KEY
        REFERENCES users(registration) ON UPDATE CASCADE ON DELETE CASCADE,
    hired_on TEXT NOT NULL,
    work_regime TEXT NOT NULL,
    course_code INTEGER NOT NULL REFERENCES courses(code)
);

CREATE TABLE IF NOT EXISTS staff (
    registration TEXT PRIMARY KEY
        REFERENCES users(registration) ON UPDATE CASCADE ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS phones (
    registration TEXT NOT NULL
        REFERENCES users(registration) ON UPDATE CASCADE ON DELETE CASCADE,
    number TEXT NOT NULL,
    PRIMARY KEY (registration, number)
);

CREATE TABLE IF NOT EXISTS authors (
    cpf TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    nationality TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS books (
    isbn TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    year INTEGER NOT NULL,
    publisher TEXT NOT NULL,
    copies INTEGER NOT NULL CHECK (copies >= 0),
    category_code INTEGER REFERENCES categories(code)
);

CREATE TABLE IF NOT EXISTS author_books (
    author_cpf TEXT NOT NULL
        REFERENCES authors(cpf) ON UPDATE CASCADE ON DELETE CASCADE,
    book_isbn TEXT NOT NULL
        REFERENCES books(isbn) ON UPDATE CASCADE ON DELETE CASCADE,
    PRIMARY KEY (author_cpf, book_isbn)
);

CREATE TABLE IF NOT EXISTS loans (
    registration TEXT NOT NULL
        REFERENCES users(registration) ON UPDATE CASCADE ON DELETE CASCADE,
    isbn TEXT NOT NULL
        REFERENCES books(isbn) ON UPDATE CASCADE ON DELETE CASCADE,
    loaned_on TEXT NOT NULL,
    due_on TEXT NOT NULL,
    PRIMARY KEY (registration, isbn),
    CHECK (due_on >= loaned_on)
);

CREATE TABLE IF NOT EXISTS reservations (
    registration TEXT NOT NULL
        REFERENCES users(registration) ON UPDATE CASCADE ON DELETE CASCADE,
    isbn TEXT NOT NULL
        REFERENCES books(isbn) ON UPDATE CASCADE ON DELETE CASCADE,
    reserved_at TEXT NOT NULL,
    fulfilled_at TEXT,
    PRIMARY KEY (registration, isbn)
);

CREATE TRIGGER IF NOT EXISTS students_graduation_in_future
BEFORE INSERT ON students
WHEN NEW.expected_graduation <= date('now')
BEGIN
    SELECT RAISE(ABORT, 'expected graduation date must be after today');
END;
"#;

pub const INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_loans_isbn ON loans(isbn);
CREATE INDEX IF NOT EXISTS idx_reservations_isbn ON reservations(isbn);
CREATE INDEX IF NOT EXISTS idx_books_category ON books(category_code);
CREATE INDEX IF NOT EXISTS idx_author_books_isbn ON author_books(book_isbn);
"#;

/// Create every library table, index and trigger that is missing.
pub fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;
    conn.execute_batch(INDEXES)?;
    Ok(())
}
