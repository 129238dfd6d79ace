//! Data models for Matchday

mod fixture;
mod leaderboard;
mod prediction;

pub use fixture::{Fixture, FixtureStatus};
pub use leaderboard::LeaderboardEntry;
pub use prediction::{Origin, Prediction, PredictionId};
