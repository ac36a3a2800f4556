//! Password hashing and login lookup.

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::User;
use crate::record::{Entity, Record};
use crate::sqlite::Database;
use crate::value::Value;

/// Hex SHA-256 of the password, ignoring leading and trailing newlines.
pub fn password_hash(password: &str) -> String {
    let digest = Sha256::digest(password.trim_matches('\n').as_bytes());
    hex::encode(digest)
}

/// Look up a user by nickname or registration and password.
pub fn login(db: &Database, name: &str, password: &str) -> Result<Option<Record<User>>> {
    let sql = "SELECT registration FROM users \
               WHERE (nickname=? OR registration=?) AND password_hash=?";
    let params: [Value; 3] = [name.into(), name.into(), password_hash(password).into()];
    let Some(row) = db.first_result(sql, &params)? else {
        return Ok(None);
    };
    match row.into_iter().next() {
        Some(registration) => User::select(db, registration),
        None => Ok(None),
    }
}
