use std::path::Path;

use matchday_core::auth::{AuthClient, CredentialStore};
use matchday_core::db::SqliteCredentialStore;

use crate::cli::AuthCommands;
use crate::commands::common::open_database;
use crate::error::CliError;

pub async fn run_auth(
    command: AuthCommands,
    api_url: &str,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_database(db_path)?;
    let client = AuthClient::new(api_url, SqliteCredentialStore::new(db.connection()))?;

    match command {
        AuthCommands::Register {
            username,
            email,
            password,
        } => {
            client.register(&username, &email, &password).await?;
            println!("Account created. Sign in with `matchday auth login`.");
        }
        AuthCommands::Login { username, password } => {
            let user = client.login(&username, &password).await?;
            println!("Signed in as {}", user.username);
        }
        AuthCommands::Logout => {
            client.logout().await?;
            println!("Signed out. Locally saved predictions are kept for later sync.");
        }
        AuthCommands::Status => {
            let store = SqliteCredentialStore::new(db.connection());
            let Some(username) = store.username()? else {
                println!("Not signed in.");
                return Ok(());
            };
            if store.access_token()?.is_none() {
                println!("Session for {username} has expired; sign in again.");
            } else if client.check_auth().await? {
                println!("Signed in as {username}");
            } else {
                println!("Session for {username} has expired; sign in again.");
            }
        }
    }
    Ok(())
}
