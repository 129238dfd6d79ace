use std::path::Path;

use crate::commands::common::{build_engine, format_prediction_line, open_database};
use crate::error::CliError;

pub async fn run_predict(
    api_url: &str,
    db_path: &Path,
    match_id: i64,
    home: u32,
    away: u32,
    comment: Option<&str>,
) -> Result<(), CliError> {
    let db = open_database(db_path)?;
    let engine = build_engine(api_url, &db)?;

    let outcome = engine
        .submit_prediction(match_id, i64::from(home), i64::from(away), comment)
        .await?;

    if outcome.stored_locally {
        println!("Saved locally; run `matchday sync` once the server is reachable.");
    } else {
        println!("Prediction saved on the server.");
    }
    println!("{}", format_prediction_line(&outcome.prediction));
    Ok(())
}
