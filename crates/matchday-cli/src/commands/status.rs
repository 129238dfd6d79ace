use std::path::Path;

use matchday_core::db::SqliteCredentialStore;

use crate::commands::common::{build_engine, open_database};
use crate::error::CliError;

pub async fn run_status(api_url: &str, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path)?;
    let engine = build_engine(api_url, &db)?;

    let reachable = engine.check_connection().await;
    println!(
        "Server: {}",
        if reachable { "reachable" } else { "unreachable" }
    );

    match SqliteCredentialStore::new(db.connection()).username()? {
        Some(username) => println!("Signed in as {username}"),
        None => println!("Not signed in"),
    }

    let pending = engine.pending_predictions()?;
    if pending > 0 {
        println!("{pending} prediction(s) waiting to sync");
    }
    Ok(())
}
