use std::path::Path;

use crate::commands::common::{build_engine, format_fixture_line, open_database};
use crate::error::CliError;

pub async fn run_matches(
    api_url: &str,
    db_path: &Path,
    past: bool,
    as_json: bool,
) -> Result<(), CliError> {
    let db = open_database(db_path)?;
    let engine = build_engine(api_url, &db)?;

    let fixtures = if past {
        engine.fetch_past_fixtures().await?
    } else {
        engine.fetch_fixtures().await?
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&fixtures)?);
        return Ok(());
    }

    if fixtures.is_empty() {
        println!("No fixtures found.");
        return Ok(());
    }

    for fixture in &fixtures {
        println!("{}", format_fixture_line(fixture));
    }
    Ok(())
}
