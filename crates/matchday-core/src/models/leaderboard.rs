//! Leaderboard standings model

use serde::{Deserialize, Serialize};

/// One row of the contest leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: i64,
    pub username: String,
    pub total_points: i64,
    pub predictions_count: i64,
}
