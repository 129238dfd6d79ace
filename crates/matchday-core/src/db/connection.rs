//! Cache database connection management

use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

/// Database wrapper for the local cache store
///
/// The cache is a single key-value table; concurrent processes sharing the
/// same file can interleave read-modify-write cycles, which is an accepted
/// limitation of this client.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the cache database at the given path, creating it if it doesn't exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let database = Self { conn };
        database.configure();
        database.migrate()?;
        Ok(database)
    }

    /// Open an in-memory cache (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let database = Self { conn };
        database.migrate()?;
        Ok(database)
    }

    /// Configure `SQLite` for a frequently rewritten small store
    fn configure(&self) {
        // WAL keeps readers unblocked while a collection write is in flight
        self.conn.pragma_update(None, "journal_mode", "WAL").ok();
        self.conn.pragma_update(None, "synchronous", "NORMAL").ok();
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS cache (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;
        Ok(())
    }

    /// Get a reference to the underlying connection
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}
