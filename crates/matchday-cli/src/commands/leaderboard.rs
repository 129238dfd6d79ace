use std::path::Path;

use crate::commands::common::{build_engine, format_leaderboard_line, open_database};
use crate::error::CliError;

pub async fn run_leaderboard(api_url: &str, db_path: &Path, as_json: bool) -> Result<(), CliError> {
    let db = open_database(db_path)?;
    let engine = build_engine(api_url, &db)?;

    let standings = engine.fetch_leaderboard().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&standings)?);
        return Ok(());
    }

    if standings.is_empty() {
        println!("No standings yet.");
        return Ok(());
    }

    for entry in &standings {
        println!("{}", format_leaderboard_line(entry));
    }
    Ok(())
}
