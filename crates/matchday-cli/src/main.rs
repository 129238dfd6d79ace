//! Matchday CLI - Command-line client for the prediction contest
//!
//! Works offline: fixture reads fall back to the local cache and prediction
//! submits degrade to durable local records that sync back later.

mod cli;
mod commands;
mod error;

use std::env;
use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::clear::run_clear;
use crate::commands::completions::run_completions;
use crate::commands::leaderboard::run_leaderboard;
use crate::commands::matches::run_matches;
use crate::commands::predict::run_predict;
use crate::commands::predictions::run_predictions;
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::error::CliError;

const DEFAULT_API_URL: &str = "http://localhost:5000";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("matchday_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let api_url = resolve_api_url(cli.api_url, env::var("MATCHDAY_API_URL").ok());
    let db_path = resolve_db_path(cli.db_path);

    match cli.command {
        Commands::Matches { past, json } => run_matches(&api_url, &db_path, past, json).await?,
        Commands::Predict {
            match_id,
            home,
            away,
            comment,
        } => run_predict(&api_url, &db_path, match_id, home, away, comment.as_deref()).await?,
        Commands::Predictions { json } => run_predictions(&api_url, &db_path, json).await?,
        Commands::Sync => run_sync(&api_url, &db_path).await?,
        Commands::Leaderboard { json } => run_leaderboard(&api_url, &db_path, json).await?,
        Commands::Status => run_status(&api_url, &db_path).await?,
        Commands::ClearCache => run_clear(&db_path)?,
        Commands::Auth { command } => run_auth(command, &api_url, &db_path).await?,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}

fn resolve_api_url(cli_api_url: Option<String>, env_api_url: Option<String>) -> String {
    cli_api_url
        .or(env_api_url)
        .map_or_else(|| DEFAULT_API_URL.to_string(), |url| url.trim().to_string())
}

fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("MATCHDAY_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("matchday")
        .join("matchday.db")
}
