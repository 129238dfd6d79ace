//! Prediction model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a prediction.
///
/// Server-assigned ids are integers; records accepted only locally carry a
/// synthesized string placeholder, so the two id spaces can never collide.
/// On the wire a `Server` id is a JSON number and a `Local` id is a JSON
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionId {
    Server(i64),
    Local(String),
}

impl PredictionId {
    /// Synthesize a fresh placeholder id for a record the server has not
    /// accepted yet. UUID v7 keeps placeholders unique and time-sortable.
    #[must_use]
    pub fn new_local() -> Self {
        Self::Local(format!("local_{}", Uuid::now_v7()))
    }

    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Display for PredictionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(id) => write!(f, "{id}"),
            Self::Local(id) => write!(f, "{id}"),
        }
    }
}

/// Whether a prediction's stored form matches a backend-accepted write.
///
/// The only transition `LocalOnly -> ServerConfirmed` is a successful server
/// write (direct submit or reconciliation); the only transition into
/// `LocalOnly` is a failed submit, which can also regress a previously
/// confirmed record. Persisted as the `is_local_only` boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum Origin {
    #[default]
    ServerConfirmed,
    LocalOnly,
}

impl From<bool> for Origin {
    fn from(is_local_only: bool) -> Self {
        if is_local_only {
            Self::LocalOnly
        } else {
            Self::ServerConfirmed
        }
    }
}

impl From<Origin> for bool {
    fn from(origin: Origin) -> Self {
        origin == Origin::LocalOnly
    }
}

/// A user's forecast for one fixture
///
/// The local collection is keyed by `match_id`: a write always overwrites
/// the prior entry for that fixture, never appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: PredictionId,
    /// Fixture this forecast is for
    pub match_id: i64,
    pub home_score: i64,
    pub away_score: i64,
    #[serde(default)]
    pub comment: String,
    /// Owning user; absent in the backend's create/update responses
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Points awarded once the fixture completes
    #[serde(default)]
    pub points_earned: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "is_local_only", default)]
    pub origin: Origin,
}

impl Prediction {
    #[must_use]
    pub fn is_local_only(&self) -> bool {
        self.origin == Origin::LocalOnly
    }
}
