//! Shared helpers for CLI commands

use std::path::Path;

use chrono::{DateTime, Utc};
use matchday_core::api::ContestApiClient;
use matchday_core::db::{Database, SqliteCacheRepository, SqliteCredentialStore};
use matchday_core::models::{Fixture, LeaderboardEntry, Prediction};
use matchday_core::sync::SyncEngine;

use crate::error::CliError;

pub type CliEngine<'a> =
    SyncEngine<ContestApiClient, SqliteCacheRepository<'a>, SqliteCredentialStore<'a>>;

/// Open the cache database, creating its parent directory if needed.
pub fn open_database(db_path: &Path) -> Result<Database, CliError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(Database::open(db_path)?)
}

pub fn build_engine<'a>(api_url: &str, db: &'a Database) -> Result<CliEngine<'a>, CliError> {
    Ok(SyncEngine::new(
        ContestApiClient::new(api_url)?,
        SqliteCacheRepository::new(db.connection()),
        SqliteCredentialStore::new(db.connection()),
    ))
}

pub fn format_kickoff(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn format_fixture_line(fixture: &Fixture) -> String {
    let score = match (fixture.home_score, fixture.away_score) {
        (Some(home), Some(away)) => format!("  {home}-{away}"),
        _ => String::new(),
    };
    let stadium = fixture
        .stadium
        .as_deref()
        .map(|stadium| format!("  [{stadium}]"))
        .unwrap_or_default();
    format!(
        "#{:<4} {}  {} vs {}{score}{stadium}",
        fixture.id,
        format_kickoff(fixture.match_date),
        fixture.home_team,
        fixture.away_team,
    )
}

pub fn format_prediction_line(prediction: &Prediction) -> String {
    let comment = if prediction.comment.is_empty() {
        String::new()
    } else {
        format!("  \"{}\"", prediction.comment)
    };
    let marker = if prediction.is_local_only() {
        "  (awaiting sync)"
    } else {
        ""
    };
    format!(
        "match #{:<4} {}-{}{comment}{marker}",
        prediction.match_id, prediction.home_score, prediction.away_score,
    )
}

pub fn format_leaderboard_line(entry: &LeaderboardEntry) -> String {
    format!(
        "{:>3}. {:<20} {:>4} pts  ({} predictions)",
        entry.rank, entry.username, entry.total_points, entry.predictions_count,
    )
}
