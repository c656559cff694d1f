//! User account operations

use rusqlite::{params, ErrorCode, OptionalExtension};

use super::Database;
use crate::error::{Error, Result};
use crate::models::User;

impl Database {
    /// Insert a user with an already hashed password, returning the new id
    ///
    /// A second user with the same email (ignoring case) fails with
    /// [`Error::AlreadyExists`].
    pub fn create_user(&self, email: &str, hash: &str) -> Result<i64> {
        let conn = self.conn()?;
        match conn.execute(
            "INSERT INTO users (email, hash) VALUES (?, ?)",
            params![email, hash],
        ) {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(Error::AlreadyExists(format!("User {}", email)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a user by email (case-insensitive)
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT user_id, email, hash FROM users WHERE email = ?",
            params![email],
            |row| {
                Ok(User {
                    user_id: row.get(0)?,
                    email: row.get(1)?,
                    hash: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn user_exists(&self, email: &str) -> Result<bool> {
        Ok(self.get_user_by_email(email)?.is_some())
    }
}
