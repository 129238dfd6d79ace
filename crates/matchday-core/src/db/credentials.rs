//! SQLite-backed credential store

use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::{AuthSession, AuthUser, CredentialStore};
use crate::error::Result;

use super::keys;

/// `SQLite` implementation of [`CredentialStore`], sharing the cache table
/// with the sync engine's collections under auth-owned keys.
pub struct SqliteCredentialStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteCredentialStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Signed-in username, for display purposes
    pub fn username(&self) -> Result<Option<String>> {
        self.read_value(keys::USERNAME)
    }

    /// Stored user record from the last sign-in, if any
    pub fn user_profile(&self) -> Result<Option<AuthUser>> {
        match self.read_value(keys::USER_PROFILE)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn read_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM cache WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO cache (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete_value(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM cache WHERE key = ?", params![key])?;
        Ok(())
    }
}

impl CredentialStore for SqliteCredentialStore<'_> {
    fn access_token(&self) -> Result<Option<String>> {
        self.read_value(keys::ACCESS_TOKEN)
    }

    fn current_user_id(&self) -> Result<Option<i64>> {
        Ok(self
            .read_value(keys::USER_ID)?
            .and_then(|value| value.parse().ok()))
    }

    fn save_session(&self, session: &AuthSession) -> Result<()> {
        self.write_value(keys::ACCESS_TOKEN, &session.access_token)?;
        self.write_value(keys::USER_ID, &session.user.id.to_string())?;
        self.write_value(keys::USERNAME, &session.user.username)?;
        self.write_value(keys::USER_PROFILE, &serde_json::to_string(&session.user)?)?;
        Ok(())
    }

    fn clear_access_token(&self) -> Result<()> {
        self.delete_value(keys::ACCESS_TOKEN)
    }

    fn clear_session(&self) -> Result<()> {
        self.delete_value(keys::ACCESS_TOKEN)?;
        self.delete_value(keys::USER_ID)?;
        self.delete_value(keys::USERNAME)?;
        self.delete_value(keys::USER_PROFILE)?;
        Ok(())
    }
}
