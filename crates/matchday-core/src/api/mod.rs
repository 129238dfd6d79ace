//! REST gateway to the prediction contest backend.
//!
//! The gateway is a trait so the sync engine can be exercised against
//! scripted implementations in tests; [`ContestApiClient`] is the reqwest
//! implementation used by real frontends. Every call carries an explicit
//! timeout and always resolves.

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Fixture, LeaderboardEntry, Prediction};
use crate::util::{compact_text, is_http_url, normalize_text_option};

/// Timeout for the lightweight health probe
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for data reads and writes
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors produced by the backend gateway.
///
/// Everything except `Unauthorized` is fallback-equivalent to the sync
/// engine: a timeout, a refused connection, and a 500 all degrade to the
/// local cache the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The backend rejected the bearer token
    #[error("Request was not authorized")]
    Unauthorized,

    /// Non-2xx response other than 401
    #[error("Server returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection failure, DNS failure, or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// 2xx response whose body failed to parse
    #[error("Invalid response payload: {0}")]
    InvalidPayload(String),

    /// Client construction problem
    #[error("Invalid API configuration: {0}")]
    Configuration(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

/// Request body for prediction create/update calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub home_score: i64,
    pub away_score: i64,
    pub comment: String,
}

impl From<&Prediction> for PredictionRequest {
    fn from(prediction: &Prediction) -> Self {
        Self {
            home_score: prediction.home_score,
            away_score: prediction.away_score,
            comment: prediction.comment.clone(),
        }
    }
}

/// Gateway to the contest backend
#[allow(async_fn_in_trait)]
pub trait ContestApi {
    /// Health probe; collapses every failure to `false`
    async fn check_health(&self) -> bool;

    async fn upcoming_matches(&self) -> ApiResult<Vec<Fixture>>;

    async fn past_matches(&self) -> ApiResult<Vec<Fixture>>;

    /// Current user's predictions for upcoming fixtures
    async fn user_predictions(&self, token: &str) -> ApiResult<Vec<Prediction>>;

    async fn create_prediction(
        &self,
        token: &str,
        match_id: i64,
        request: &PredictionRequest,
    ) -> ApiResult<Prediction>;

    async fn update_prediction(
        &self,
        token: &str,
        prediction_id: i64,
        request: &PredictionRequest,
    ) -> ApiResult<Prediction>;

    async fn leaderboard(&self) -> ApiResult<Vec<LeaderboardEntry>>;
}

/// HTTP implementation of [`ContestApi`]
#[derive(Debug, Clone)]
pub struct ContestApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ContestApiClient {
    /// Builds a client for an explicit API base URL.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let client = reqwest::Client::builder().build().map_err(|error| {
            ApiError::Configuration(format!("failed to construct HTTP client: {error}"))
        })?;
        Ok(Self { base_url, client })
    }

    /// Returns the base URL this client was configured with.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{path}", self.base_url))
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: compact_text(&body),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|error| ApiError::InvalidPayload(error.to_string()))
    }
}

impl ContestApi for ContestApiClient {
    async fn check_health(&self) -> bool {
        let request = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .timeout(HEALTH_TIMEOUT);
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                tracing::debug!("Health probe failed: {error}");
                false
            }
        }
    }

    async fn upcoming_matches(&self) -> ApiResult<Vec<Fixture>> {
        Self::send_json(self.get("/api/matches/upcoming-matches")).await
    }

    async fn past_matches(&self) -> ApiResult<Vec<Fixture>> {
        Self::send_json(self.get("/api/matches/past-matches")).await
    }

    async fn user_predictions(&self, token: &str) -> ApiResult<Vec<Prediction>> {
        Self::send_json(
            self.get("/api/predictions/predictions?match_status=upcoming")
                .bearer_auth(token),
        )
        .await
    }

    async fn create_prediction(
        &self,
        token: &str,
        match_id: i64,
        request: &PredictionRequest,
    ) -> ApiResult<Prediction> {
        Self::send_json(
            self.client
                .post(format!("{}/api/predictions/{match_id}", self.base_url))
                .header("Accept", "application/json")
                .timeout(REQUEST_TIMEOUT)
                .bearer_auth(token)
                .json(request),
        )
        .await
    }

    async fn update_prediction(
        &self,
        token: &str,
        prediction_id: i64,
        request: &PredictionRequest,
    ) -> ApiResult<Prediction> {
        Self::send_json(
            self.client
                .put(format!("{}/api/predictions/{prediction_id}", self.base_url))
                .header("Accept", "application/json")
                .timeout(REQUEST_TIMEOUT)
                .bearer_auth(token)
                .json(request),
        )
        .await
    }

    async fn leaderboard(&self) -> ApiResult<Vec<LeaderboardEntry>> {
        Self::send_json(self.get("/api/predictions/leaderboard")).await
    }
}

fn normalize_base_url(raw: String) -> ApiResult<String> {
    let base_url = normalize_text_option(Some(raw)).ok_or_else(|| {
        ApiError::Configuration("base URL must not be empty".to_string())
    })?;
    if is_http_url(&base_url) {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(ApiError::Configuration(
            "base URL must include http:// or https://".to_string(),
        ))
    }
}
