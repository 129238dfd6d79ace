use std::path::Path;

use crate::commands::common::{build_engine, open_database};
use crate::error::CliError;

pub async fn run_sync(api_url: &str, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path)?;
    let engine = build_engine(api_url, &db)?;

    let report = engine.auto_sync().await?;
    if report.predictions.total == 0 {
        println!("Nothing to sync.");
    } else {
        println!(
            "Synced {} of {} local predictions",
            report.predictions.synced, report.predictions.total
        );
    }
    Ok(())
}
