use std::path::Path;

use matchday_core::auth::CredentialStore;
use matchday_core::db::SqliteCredentialStore;

use crate::commands::common::{build_engine, format_prediction_line, open_database};
use crate::error::CliError;

pub async fn run_predictions(api_url: &str, db_path: &Path, as_json: bool) -> Result<(), CliError> {
    let db = open_database(db_path)?;
    let engine = build_engine(api_url, &db)?;

    let predictions = engine.fetch_user_predictions().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&predictions)?);
        return Ok(());
    }

    if predictions.is_empty() {
        let signed_in = SqliteCredentialStore::new(db.connection())
            .access_token()?
            .is_some();
        if signed_in {
            println!("No predictions yet.");
        } else {
            println!("Not signed in. Run `matchday auth login` first.");
        }
        return Ok(());
    }

    for prediction in predictions.values() {
        println!("{}", format_prediction_line(prediction));
    }
    Ok(())
}
