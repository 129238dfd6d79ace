//! Contest backend auth client and stored-session contract.
//!
//! The auth component owns the stored credential: it is the only writer of
//! the token keys in the local cache. The sync engine only ever reads the
//! token and user id through [`CredentialStore`], and clears the token when
//! the backend reports the session expired.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{is_http_url, normalize_text_option};

/// Timeout for login/register calls
const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for logout and session checks
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Signed-in user as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

/// A stored sign-in: bearer token plus the user it belongs to
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Auth HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Auth API error: {0}")]
    Api(String),
    #[error("Invalid auth payload: {0}")]
    InvalidPayload(String),
    #[error("Credential storage error: {0}")]
    Storage(#[from] crate::error::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Stored-credential operations.
///
/// Reads return `Ok(None)` when no session is stored. Methods return the
/// core error type so the sync engine can propagate storage failures
/// directly.
pub trait CredentialStore {
    /// Stored bearer token, if signed in
    fn access_token(&self) -> crate::error::Result<Option<String>>;

    /// Signed-in user id, if known
    fn current_user_id(&self) -> crate::error::Result<Option<i64>>;

    /// Persist a signed-in session
    fn save_session(&self, session: &AuthSession) -> crate::error::Result<()>;

    /// Drop the bearer token, keeping the rest of the stored session
    fn clear_access_token(&self) -> crate::error::Result<()>;

    /// Drop the whole stored session
    fn clear_session(&self) -> crate::error::Result<()>;
}

/// HTTP client for the contest backend's auth endpoints
#[derive(Clone)]
pub struct AuthClient<S: CredentialStore> {
    base_url: String,
    client: Client,
    store: S,
}

impl<S: CredentialStore> AuthClient<S> {
    pub fn new(base_url: impl Into<String>, store: S) -> AuthResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            client: Client::builder().build()?,
            store,
        })
    }

    /// Create a new account. The backend signs nobody in on registration;
    /// callers follow up with [`AuthClient::login`].
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<()> {
        validate_credentials(username, password)?;
        if email.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "email must not be empty".to_string(),
            ));
        }

        let response = self
            .client
            .post(format!("{}/api/auth/register", self.base_url))
            .header("Accept", "application/json")
            .timeout(LOGIN_TIMEOUT)
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(AuthError::Api(parse_api_error(status, &body)))
        }
    }

    /// Sign in and persist the session through the credential store.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<AuthUser> {
        validate_credentials(username, password)?;

        let response = self
            .client
            .post(format!("{}/api/auth/login", self.base_url))
            .header("Accept", "application/json")
            .timeout(LOGIN_TIMEOUT)
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }

        let payload = response.json::<LoginResponse>().await?;
        let session = AuthSession {
            access_token: payload.access_token,
            user: payload.user,
        };
        self.store.save_session(&session)?;
        Ok(session.user)
    }

    /// Sign out: notify the backend on a best-effort basis, then always
    /// clear the stored session. Cached predictions are deliberately kept
    /// so they can still be reconciled after the next sign-in.
    pub async fn logout(&self) -> AuthResult<()> {
        if let Some(token) = self.store.access_token()? {
            let request = self
                .client
                .post(format!("{}/api/auth/logout", self.base_url))
                .bearer_auth(&token)
                .timeout(CHECK_TIMEOUT);
            if let Err(error) = request.send().await {
                tracing::warn!("Logout request failed, clearing session anyway: {error}");
            }
        }
        self.store.clear_session()?;
        Ok(())
    }

    /// Whether the stored session is still usable.
    ///
    /// A definitive 401 clears the token; any other response, or no
    /// response at all, is treated as valid so an offline spell never
    /// signs the user out.
    pub async fn check_auth(&self) -> AuthResult<bool> {
        let Some(token) = self.store.access_token()? else {
            return Ok(false);
        };

        let request = self
            .client
            .get(format!("{}/api/auth/check-auth", self.base_url))
            .bearer_auth(&token)
            .timeout(CHECK_TIMEOUT);
        match request.send().await {
            Ok(response) if response.status() == StatusCode::UNAUTHORIZED => {
                self.store.clear_access_token()?;
                Ok(false)
            }
            Ok(_) => Ok(true),
            Err(error) => {
                tracing::warn!("Auth check unreachable, assuming session is valid: {error}");
                Ok(true)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<AuthApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn validate_credentials(username: &str, password: &str) -> AuthResult<()> {
    if username.trim().is_empty() {
        return Err(AuthError::InvalidConfiguration(
            "username must not be empty".to_string(),
        ));
    }
    if password.is_empty() {
        return Err(AuthError::InvalidConfiguration(
            "password must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn normalize_base_url(raw: String) -> AuthResult<String> {
    let base_url = normalize_text_option(Some(raw)).ok_or_else(|| {
        AuthError::InvalidConfiguration("base URL must not be empty".to_string())
    })?;
    if is_http_url(&base_url) {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(AuthError::InvalidConfiguration(
            "base URL must include http:// or https://".to_string(),
        ))
    }
}
