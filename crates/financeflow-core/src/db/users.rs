//! User and refresh-token operations

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{format_timestamp, new_id, parse_timestamp, Database};
use crate::error::{Error, Result};
use crate::models::User;

struct UserRow {
    id: String,
    email: String,
    name: String,
    password_hash: String,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    const COLUMNS: &'static str = "id, email, name, password_hash, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            password_hash: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn into_user(self) -> Result<User> {
        Ok(User {
            id: self.id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

impl Database {
    /// Create a user with an already-hashed password
    ///
    /// Returns `Error::Conflict` if the email is taken.
    pub fn create_user(&self, email: &str, name: &str, password_hash: &str) -> Result<User> {
        self.create_user_with_id(&new_id(), email, name, password_hash)
    }

    pub(crate) fn create_user_with_id(
        &self,
        id: &str,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<User> {
        if self.get_user_by_email(email)?.is_some() {
            return Err(Error::Conflict(format!(
                "User with email {} already exists",
                email
            )));
        }

        let now = Utc::now();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (id, email, name, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                id,
                email,
                name,
                password_hash,
                format_timestamp(now),
                format_timestamp(now)
            ],
        )?;

        self.get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }

    /// Get a user by ID
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", UserRow::COLUMNS),
                params![id],
                UserRow::from_row,
            )
            .optional()?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by email (case-insensitive)
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?", UserRow::COLUMNS),
                params![email],
                UserRow::from_row,
            )
            .optional()?;

        row.map(UserRow::into_user).transpose()
    }

    /// Record an issued refresh token
    pub fn store_refresh_token(
        &self,
        token_id: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO refresh_tokens (token_id, user_id, expires_at) VALUES (?, ?, ?)",
            params![token_id, user_id, format_timestamp(expires_at)],
        )?;
        Ok(())
    }

    /// Check whether a refresh token is still live for this user
    pub fn refresh_token_is_active(&self, token_id: &str, user_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM refresh_tokens WHERE token_id = ? AND user_id = ? AND expires_at > ?",
            params![token_id, user_id, format_timestamp(Utc::now())],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Revoke a refresh token; returns whether it existed
    pub fn revoke_refresh_token(&self, token_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM refresh_tokens WHERE token_id = ?",
            params![token_id],
        )?;
        Ok(deleted > 0)
    }

    /// Drop refresh tokens past their expiry; returns how many were removed
    pub fn purge_expired_refresh_tokens(&self) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM refresh_tokens WHERE expires_at <= ?",
            params![format_timestamp(Utc::now())],
        )?;
        Ok(deleted)
    }
}
