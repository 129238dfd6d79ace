//! Fixture model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a fixture, as reported by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureStatus {
    #[default]
    Scheduled,
    Live,
    Finished,
    Postponed,
    Canceled,
}

/// A scheduled or completed match
///
/// Fixtures are created server-side and immutable from the client's
/// perspective; the cached copy is only ever replaced by a full re-fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Server-assigned stable identifier
    pub id: i64,
    pub home_team: String,
    pub away_team: String,
    /// Kickoff timestamp
    pub match_date: DateTime<Utc>,
    /// Final home score, present once the match is completed
    #[serde(default)]
    pub home_score: Option<i64>,
    /// Final away score, present once the match is completed
    #[serde(default)]
    pub away_score: Option<i64>,
    #[serde(default)]
    pub stadium: Option<String>,
    /// Stage label, e.g. "Group stage" or "Quarter-final"
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub status: FixtureStatus,
}

impl Fixture {
    /// A fixture is completed once both final scores are known.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }

    /// Whether the fixture lies in the past relative to `now`.
    #[must_use]
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.match_date < now || self.status == FixtureStatus::Finished
    }
}
