use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] matchday_core::Error),
    #[error(transparent)]
    Api(#[from] matchday_core::api::ApiError),
    #[error("Authentication error: {0}")]
    Auth(#[from] matchday_core::auth::AuthError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
