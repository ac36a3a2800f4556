use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};

use crate::auth;
use crate::error::{LibraryError, Result};
use crate::models::{Course, Loan, Reservation};
use crate::record::{Entity, Filter, Record, Values};
use crate::schema::Schema;
use crate::sqlite::Database;
use crate::value::{FromValue, Value};

/// Which profile table specializes a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserKind {
    Student,
    Professor,
    Staff,
}

impl UserKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UserKind::Student => "student",
            UserKind::Professor => "professor",
            UserKind::Staff => "staff",
        }
    }
}

impl fmt::Display for UserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserKind {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "student" => Ok(UserKind::Student),
            "professor" => Ok(UserKind::Professor),
            "staff" => Ok(UserKind::Staff),
            other => Err(LibraryError::UnknownUserKind {
                value: other.to_string(),
            }),
        }
    }
}

impl From<UserKind> for Value {
    fn from(kind: UserKind) -> Self {
        Value::from(kind.as_str())
    }
}

impl FromValue for UserKind {
    const EXPECTED: &'static str = "user kind";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(s) => s.parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub registration: String,
    pub nickname: String,
    pub password_hash: String,
    pub name: String,
    pub address: String,
    pub kind: UserKind,
    pub permission: i64,
}

impl Entity for User {
    const SCHEMA: Schema = Schema::new(
        "users",
        &[
            "registration",
            "nickname",
            "password_hash",
            "name",
            "address",
            "kind",
            "permission",
        ],
        &["registration"],
    );

    fn from_values(values: &mut Values) -> Result<Self> {
        Ok(Self {
            registration: values.take()?,
            nickname: values.take()?,
            password_hash: values.take()?,
            name: values.take()?,
            address: values.take()?,
            kind: values.take()?,
            permission: values.take()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.registration.as_str().into(),
            self.nickname.as_str().into(),
            self.password_hash.as_str().into(),
            self.name.as_str().into(),
            self.address.as_str().into(),
            self.kind.into(),
            self.permission.into(),
        ]
    }
}

impl User {
    /// Replace the stored hash. Call `update` to persist it.
    pub fn change_password(&mut self, password: &str) {
        self.password_hash = auth::password_hash(password);
    }

    /// The profile record matching this user's kind.
    pub fn profile(&self, db: &Database) -> Result<Option<Profile>> {
        let registration = self.registration.as_str();
        Ok(match self.kind {
            UserKind::Student => Student::select(db, registration)?.map(Profile::Student),
            UserKind::Professor => Professor::select(db, registration)?.map(Profile::Professor),
            UserKind::Staff => Staff::select(db, registration)?.map(Profile::Staff),
        })
    }

    pub fn phones(&self, db: &Database) -> Result<Vec<Record<Phone>>> {
        Phone::filter(db, Filter::key(self.registration.as_str()))
    }

    pub fn loans(&self, db: &Database) -> Result<Vec<Record<Loan>>> {
        Loan::filter(db, Filter::key(self.registration.as_str()))
    }

    pub fn reservations(&self, db: &Database) -> Result<Vec<Record<Reservation>>> {
        Reservation::filter(db, Filter::key(self.registration.as_str()))
    }

    /// Build a loan of `isbn` starting `today`, due after the profile's
    /// loan period. The loan is not inserted.
    pub fn new_loan(&self, db: &Database, isbn: &str, today: NaiveDate) -> Result<Loan> {
        let profile = self
            .profile(db)?
            .ok_or_else(|| LibraryError::MissingProfile {
                registration: self.registration.clone(),
            })?;
        let due_on = today
            .checked_add_days(Days::new(profile.loan_days()))
            .unwrap_or(NaiveDate::MAX);
        Ok(Loan {
            registration: self.registration.clone(),
            isbn: isbn.to_string(),
            loaned_on: today,
            due_on,
        })
    }
}

/// A user's specialization record.
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Student(Record<Student>),
    Professor(Record<Professor>),
    Staff(Record<Staff>),
}

impl Profile {
    pub fn max_books(&self) -> u64 {
        match self {
            Profile::Student(_) => Student::MAX_BOOKS,
            Profile::Professor(_) => Professor::MAX_BOOKS,
            Profile::Staff(_) => Staff::MAX_BOOKS,
        }
    }

    pub fn loan_days(&self) -> u64 {
        match self {
            Profile::Student(_) => Student::LOAN_DAYS,
            Profile::Professor(_) => Professor::LOAN_DAYS,
            Profile::Staff(_) => Staff::LOAN_DAYS,
        }
    }

    pub fn kind(&self) -> UserKind {
        match self {
            Profile::Student(_) => UserKind::Student,
            Profile::Professor(_) => UserKind::Professor,
            Profile::Staff(_) => UserKind::Staff,
        }
    }
}

/// Student profile.
///
/// Inserts go through `insert_strict`: a trigger rejects an expected
/// graduation date that is not after today, and registration screens retry
/// with a corrected date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub registration: String,
    pub expected_graduation: NaiveDate,
    pub enrolled_on: NaiveDate,
    pub course_code: i64,
}

impl Student {
    pub const MAX_BOOKS: u64 = 3;
    pub const LOAN_DAYS: u64 = 15;

    pub fn course_name(&self, db: &Database) -> Result<Option<String>> {
        Ok(Course::select(db, self.course_code)?.map(|c| c.into_entity().name))
    }
}

impl Entity for Student {
    const SCHEMA: Schema = Schema::new(
        "students",
        &["registration", "expected_graduation", "enrolled_on", "course_code"],
        &["registration"],
    );

    fn from_values(values: &mut Values) -> Result<Self> {
        Ok(Self {
            registration: values.take()?,
            expected_graduation: values.take()?,
            enrolled_on: values.take()?,
            course_code: values.take()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.registration.as_str().into(),
            self.expected_graduation.into(),
            self.enrolled_on.into(),
            self.course_code.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Professor {
    pub siape: String,
    pub hired_on: NaiveDate,
    pub work_regime: String,
    pub course_code: i64,
}

impl Professor {
    pub const MAX_BOOKS: u64 = 5;
    pub const LOAN_DAYS: u64 = 30;

    pub fn course_name(&self, db: &Database) -> Result<Option<String>> {
        Ok(Course::select(db, self.course_code)?.map(|c| c.into_entity().name))
    }
}

impl Entity for Professor {
    const SCHEMA: Schema = Schema::new(
        "professors",
        &["siape", "hired_on", "work_regime", "course_code"],
        &["siape"],
    );

    fn from_values(values: &mut Values) -> Result<Self> {
        Ok(Self {
            siape: values.take()?,
            hired_on: values.take()?,
            work_regime: values.take()?,
            course_code: values.take()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.siape.as_str().into(),
            self.hired_on.into(),
            self.work_regime.as_str().into(),
            self.course_code.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staff {
    pub registration: String,
}

impl Staff {
    pub const MAX_BOOKS: u64 = 4;
    pub const LOAN_DAYS: u64 = 21;
}

impl Entity for Staff {
    const SCHEMA: Schema = Schema::new("staff", &["registration"], &["registration"]);

    fn from_values(values: &mut Values) -> Result<Self> {
        Ok(Self {
            registration: values.take()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![self.registration.as_str().into()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phone {
    pub registration: String,
    pub number: String,
}

impl Entity for Phone {
    const SCHEMA: Schema = Schema::new(
        "phones",
        &["registration", "number"],
        &["registration", "number"],
    );

    fn from_values(values: &mut Values) -> Result<Self> {
        Ok(Self {
            registration: values.take()?,
            number: values.take()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![self.registration.as_str().into(), self.number.as_str().into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_kind_round_trips_through_text() {
        for kind in [UserKind::Student, UserKind::Professor, UserKind::Staff] {
            assert_eq!(UserKind::from_value(Value::from(kind)), Some(kind));
        }
        assert_eq!("professor".parse::<UserKind>().unwrap(), UserKind::Professor);
        assert!(matches!(
            "librarian".parse::<UserKind>(),
            Err(LibraryError::UnknownUserKind { value }) if value == "librarian"
        ));
    }

    #[test]
    fn profile_limits() {
        let staff = Profile::Staff(Record::new(Staff {
            registration: "1".to_string(),
        }));
        assert_eq!(staff.max_books(), 4);
        assert_eq!(staff.loan_days(), 21);
        assert_eq!(staff.kind(), UserKind::Staff);
    }
}
