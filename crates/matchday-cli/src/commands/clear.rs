use std::path::Path;

use matchday_core::db::{CacheRepository, SqliteCacheRepository};

use crate::commands::common::open_database;
use crate::error::CliError;

pub fn run_clear(db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path)?;
    SqliteCacheRepository::new(db.connection()).clear()?;
    println!("Local cache cleared (sign-in kept).");
    Ok(())
}
