//! Cache repository implementation

use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::{Fixture, Prediction};

use super::keys;

/// Prediction collection keyed by fixture id
pub type PredictionMap = BTreeMap<i64, Prediction>;

/// Trait for local cache storage operations.
///
/// Every method is a whole-collection read or read-modify-write, so a future
/// multi-process host can add locking inside an implementation without
/// changing call sites.
pub trait CacheRepository {
    /// Fixture collection from the last successful fetch, if any
    fn fixtures(&self) -> Result<Option<Vec<Fixture>>>;

    /// Replace the entire fixture collection
    fn replace_fixtures(&self, fixtures: &[Fixture]) -> Result<()>;

    /// Prediction collection keyed by fixture id (empty when absent)
    fn predictions(&self) -> Result<PredictionMap>;

    /// Stored prediction for one fixture
    fn prediction(&self, match_id: i64) -> Result<Option<Prediction>>;

    /// Replace the entire prediction collection
    fn replace_predictions(&self, predictions: &PredictionMap) -> Result<()>;

    /// Overwrite the entry for one fixture, keeping the rest
    fn upsert_prediction(&self, prediction: &Prediction) -> Result<()>;

    /// Wipe all cached data except the stored credential
    fn clear(&self) -> Result<()>;
}

/// `SQLite` implementation of `CacheRepository`
pub struct SqliteCacheRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteCacheRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
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
}

impl CacheRepository for SqliteCacheRepository<'_> {
    fn fixtures(&self) -> Result<Option<Vec<Fixture>>> {
        match self.read_value(keys::UPCOMING_MATCHES)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn replace_fixtures(&self, fixtures: &[Fixture]) -> Result<()> {
        self.write_value(keys::UPCOMING_MATCHES, &serde_json::to_string(fixtures)?)
    }

    fn predictions(&self) -> Result<PredictionMap> {
        match self.read_value(keys::USER_PREDICTIONS)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(PredictionMap::new()),
        }
    }

    fn prediction(&self, match_id: i64) -> Result<Option<Prediction>> {
        let mut predictions = self.predictions()?;
        Ok(predictions.remove(&match_id))
    }

    fn replace_predictions(&self, predictions: &PredictionMap) -> Result<()> {
        self.write_value(keys::USER_PREDICTIONS, &serde_json::to_string(predictions)?)
    }

    fn upsert_prediction(&self, prediction: &Prediction) -> Result<()> {
        let mut predictions = self.predictions()?;
        predictions.insert(prediction.match_id, prediction.clone());
        self.replace_predictions(&predictions)
    }

    fn clear(&self) -> Result<()> {
        self.conn.execute(
            "DELETE FROM cache WHERE key != ?",
            params![keys::ACCESS_TOKEN],
        )?;
        Ok(())
    }
}
