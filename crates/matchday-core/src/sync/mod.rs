//! Offline-tolerant synchronization between the local cache and the backend.
//!
//! Reads prefer the server and degrade to the cache; writes prefer the
//! server and degrade to a durable local-only record; reconciliation pushes
//! local-only records back to the server and promotes them on success.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::api::{ApiError, ContestApi, PredictionRequest};
use crate::auth::CredentialStore;
use crate::db::{CacheRepository, PredictionMap};
use crate::error::{Error, Result};
use crate::models::{Fixture, LeaderboardEntry, Origin, Prediction, PredictionId};

/// Result of a single prediction submit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitOutcome {
    pub prediction: Prediction,
    /// True when the record could not reach the server and was stored
    /// locally for later reconciliation
    pub stored_locally: bool,
}

/// Result of one reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Local-only records the server accepted
    pub synced: usize,
    /// Local-only records that were pending when the pass started
    pub total: usize,
}

/// Result of an `auto_sync` invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoSyncReport {
    pub predictions: SyncReport,
    pub completed_at: DateTime<Utc>,
}

/// The offline-tolerant read/write path for fixtures and predictions.
///
/// The engine never surfaces a transient network failure as an error:
/// reads fall back to the cache (or the built-in seed fixtures) and writes
/// fall back to a durable local-only record. Only missing credentials,
/// expired sessions, and cache I/O problems are reported as errors.
pub struct SyncEngine<A, C, S> {
    api: A,
    cache: C,
    credentials: S,
}

impl<A, C, S> SyncEngine<A, C, S>
where
    A: ContestApi,
    C: CacheRepository,
    S: CredentialStore,
{
    pub const fn new(api: A, cache: C, credentials: S) -> Self {
        Self {
            api,
            cache,
            credentials,
        }
    }

    /// Whether the backend is currently reachable.
    ///
    /// Advisory only: ordinary reads and writes always attempt the network
    /// themselves and fall back independently of this probe.
    pub async fn check_connection(&self) -> bool {
        self.api.check_health().await
    }

    /// Upcoming fixtures, preferring the server.
    ///
    /// A successful fetch replaces the cached collection wholesale. On any
    /// failure the cached collection is returned; a cold offline start gets
    /// the built-in seed fixtures so the schedule never renders empty.
    pub async fn fetch_fixtures(&self) -> Result<Vec<Fixture>> {
        match self.api.upcoming_matches().await {
            Ok(fixtures) => {
                self.cache.replace_fixtures(&fixtures)?;
                Ok(fixtures)
            }
            Err(error) => {
                tracing::warn!("Falling back to cached fixtures: {error}");
                match self.cache.fixtures()? {
                    Some(cached) => Ok(cached),
                    None => Ok(seed_fixtures()),
                }
            }
        }
    }

    /// Completed fixtures with final scores. No cache fallback.
    pub async fn fetch_past_fixtures(&self) -> Result<Vec<Fixture>> {
        Ok(self.api.past_matches().await?)
    }

    /// The current user's predictions, keyed by fixture id.
    ///
    /// Without a stored token this returns an empty map and performs no
    /// network call. A server result is merged with pending local-only
    /// records (a pending record is never silently dropped by a read, but
    /// server truth wins for any fixture the server knows about) and the
    /// merged map is written back to the cache before being returned.
    pub async fn fetch_user_predictions(&self) -> Result<PredictionMap> {
        let Some(token) = self.credentials.access_token()? else {
            return Ok(PredictionMap::new());
        };

        match self.api.user_predictions(&token).await {
            Ok(list) => {
                let mut merged: PredictionMap = list
                    .into_iter()
                    .map(|prediction| (prediction.match_id, prediction))
                    .collect();
                for (match_id, prediction) in self.cache.predictions()? {
                    if prediction.is_local_only() && !merged.contains_key(&match_id) {
                        merged.insert(match_id, prediction);
                    }
                }
                self.cache.replace_predictions(&merged)?;
                Ok(merged)
            }
            Err(ApiError::Unauthorized) => {
                tracing::warn!("Stored session rejected, clearing token");
                self.credentials.clear_access_token()?;
                Ok(PredictionMap::new())
            }
            Err(error) => {
                tracing::warn!("Falling back to cached predictions: {error}");
                self.cache.predictions()
            }
        }
    }

    /// Submit a score prediction for one fixture.
    ///
    /// Prefers the server: an existing server-confirmed record is updated
    /// in place, anything else is created. When the server cannot be
    /// reached (or rejects the write with anything but a 401) the record
    /// is stored locally instead and the submit still succeeds with
    /// `stored_locally: true`.
    pub async fn submit_prediction(
        &self,
        match_id: i64,
        home_score: i64,
        away_score: i64,
        comment: Option<&str>,
    ) -> Result<SubmitOutcome> {
        let token = self
            .credentials
            .access_token()?
            .ok_or(Error::AuthRequired)?;
        if home_score < 0 || away_score < 0 {
            return Err(Error::InvalidInput(
                "scores must be non-negative".to_string(),
            ));
        }

        let comment = comment.unwrap_or("");
        let prior = self.cache.prediction(match_id)?;
        let request = PredictionRequest {
            home_score,
            away_score,
            comment: comment.to_string(),
        };

        let update_target = match &prior {
            Some(prediction) if !prediction.is_local_only() => match &prediction.id {
                PredictionId::Server(id) => Some(*id),
                PredictionId::Local(_) => None,
            },
            _ => None,
        };
        let attempt = match update_target {
            Some(prediction_id) => {
                self.api
                    .update_prediction(&token, prediction_id, &request)
                    .await
            }
            None => self.api.create_prediction(&token, match_id, &request).await,
        };

        match attempt {
            Ok(record) => {
                let record = self.adopt_server_record(record, prior.as_ref())?;
                self.cache.upsert_prediction(&record)?;
                Ok(SubmitOutcome {
                    prediction: record,
                    stored_locally: false,
                })
            }
            Err(ApiError::Unauthorized) => {
                tracing::warn!("Stored session rejected, clearing token");
                self.credentials.clear_access_token()?;
                Err(Error::SessionExpired)
            }
            Err(error) => {
                tracing::warn!(
                    "Storing prediction for match {match_id} locally: {error}"
                );
                let record =
                    self.local_record(match_id, home_score, away_score, comment, prior.as_ref())?;
                self.cache.upsert_prediction(&record)?;
                Ok(SubmitOutcome {
                    prediction: record,
                    stored_locally: true,
                })
            }
        }
    }

    /// Push all local-only predictions to the server.
    ///
    /// Entries are pushed sequentially; one that fails stays local-only
    /// without aborting the rest, and the pass reports how many the server
    /// accepted. A 401 clears the token and ends the pass early, keeping
    /// whatever progress was made.
    pub async fn sync_predictions(&self) -> Result<SyncReport> {
        let token = self
            .credentials
            .access_token()?
            .ok_or(Error::AuthRequired)?;

        let mut predictions = self.cache.predictions()?;
        let pending: Vec<i64> = predictions
            .values()
            .filter(|prediction| prediction.is_local_only())
            .map(|prediction| prediction.match_id)
            .collect();
        if pending.is_empty() {
            return Ok(SyncReport {
                synced: 0,
                total: 0,
            });
        }

        if !self.api.check_health().await {
            return Err(Error::Offline);
        }

        let total = pending.len();
        let mut synced = 0;
        for match_id in pending {
            let Some(entry) = predictions.get(&match_id) else {
                continue;
            };
            let request = PredictionRequest::from(entry);
            let target = entry.id.clone();
            let attempt = match target {
                PredictionId::Local(_) => {
                    self.api.create_prediction(&token, match_id, &request).await
                }
                PredictionId::Server(prediction_id) => {
                    self.api
                        .update_prediction(&token, prediction_id, &request)
                        .await
                }
            };
            match attempt {
                Ok(record) => {
                    let record =
                        self.adopt_server_record(record, predictions.get(&match_id))?;
                    predictions.insert(match_id, record);
                    synced += 1;
                }
                Err(ApiError::Unauthorized) => {
                    tracing::warn!("Stored session rejected mid-sync, clearing token");
                    self.credentials.clear_access_token()?;
                    self.cache.replace_predictions(&predictions)?;
                    return Err(Error::SessionExpired);
                }
                Err(error) => {
                    tracing::warn!("Failed to sync prediction for match {match_id}: {error}");
                }
            }
        }

        self.cache.replace_predictions(&predictions)?;
        Ok(SyncReport { synced, total })
    }

    /// Probe connectivity, then reconcile predictions if reachable.
    ///
    /// The entry point for a manual "sync now" action or a periodic timer.
    /// Unreachable backends short-circuit without touching storage.
    /// Fixtures are read-only from this client and are not reconciled.
    pub async fn auto_sync(&self) -> Result<AutoSyncReport> {
        if !self.api.check_health().await {
            return Err(Error::Offline);
        }

        let predictions = self.sync_predictions().await?;
        Ok(AutoSyncReport {
            predictions,
            completed_at: Utc::now(),
        })
    }

    /// Current contest standings. No cache fallback.
    pub async fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        Ok(self.api.leaderboard().await?)
    }

    /// Number of local-only predictions waiting for reconciliation.
    pub fn pending_predictions(&self) -> Result<usize> {
        Ok(self
            .cache
            .predictions()?
            .values()
            .filter(|prediction| prediction.is_local_only())
            .count())
    }

    /// Wipe all cached data except the stored credential.
    pub fn clear_local_data(&self) -> Result<()> {
        self.cache.clear()
    }

    /// Normalize a record the server returned: mark it confirmed and
    /// back-fill the fields the backend's write responses omit.
    fn adopt_server_record(
        &self,
        mut record: Prediction,
        prior: Option<&Prediction>,
    ) -> Result<Prediction> {
        record.origin = Origin::ServerConfirmed;
        if record.user_id.is_none() {
            record.user_id = self.credentials.current_user_id()?;
        }
        if record.created_at.is_none() {
            record.created_at = prior.and_then(|p| p.created_at).or_else(|| Some(Utc::now()));
        }
        if record.updated_at.is_none() {
            record.updated_at = Some(Utc::now());
        }
        Ok(record)
    }

    /// Build the durable local-only record for a write the server did not
    /// accept. Reuses the prior id so a regressed update keeps its server
    /// identity for the eventual reconciliation.
    fn local_record(
        &self,
        match_id: i64,
        home_score: i64,
        away_score: i64,
        comment: &str,
        prior: Option<&Prediction>,
    ) -> Result<Prediction> {
        let now = Utc::now();
        Ok(Prediction {
            id: prior.map_or_else(PredictionId::new_local, |p| p.id.clone()),
            match_id,
            home_score,
            away_score,
            comment: comment.to_string(),
            user_id: self.credentials.current_user_id()?,
            points_earned: prior.and_then(|p| p.points_earned),
            created_at: prior.and_then(|p| p.created_at).or(Some(now)),
            updated_at: Some(now),
            origin: Origin::LocalOnly,
        })
    }
}

/// Built-in fixtures returned when the cache is empty and the backend is
/// unreachable, so a cold offline start never renders an empty schedule.
#[must_use]
pub fn seed_fixtures() -> Vec<Fixture> {
    let now = Utc::now();
    let fixture = |id: i64, home: &str, away: &str, days: i64, stadium: &str| Fixture {
        id,
        home_team: home.to_string(),
        away_team: away.to_string(),
        match_date: now + Duration::days(days),
        home_score: None,
        away_score: None,
        stadium: Some(stadium.to_string()),
        stage: Some("Champions League, quarter-final".to_string()),
        status: crate::models::FixtureStatus::Scheduled,
    };
    vec![
        fixture(1, "Barcelona", "Bayern Munich", 2, "Camp Nou"),
        fixture(2, "Real Madrid", "Manchester City", 4, "Santiago Bernabeu"),
        fixture(3, "Paris Saint-Germain", "Liverpool", 6, "Parc des Princes"),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::auth::{AuthSession, AuthUser};
    use crate::db::{keys, Database, SqliteCacheRepository, SqliteCredentialStore};

    fn network_error<T>() -> crate::api::ApiResult<T> {
        Err(ApiError::Network("connection refused".to_string()))
    }

    /// Scripted backend: every endpoint answers from a queue or canned
    /// value, defaulting to a network error, and counts its calls.
    #[derive(Default)]
    struct ScriptedApi {
        healthy: bool,
        upcoming: Mutex<Option<crate::api::ApiResult<Vec<Fixture>>>>,
        predictions: Mutex<Option<crate::api::ApiResult<Vec<Prediction>>>>,
        create_responses: Mutex<VecDeque<crate::api::ApiResult<Prediction>>>,
        update_responses: Mutex<VecDeque<crate::api::ApiResult<Prediction>>>,
        health_calls: AtomicUsize,
        prediction_calls: AtomicUsize,
        create_calls: AtomicUsize,
        update_calls: AtomicUsize,
    }

    impl ScriptedApi {
        fn offline() -> Self {
            Self::default()
        }

        fn online() -> Self {
            Self {
                healthy: true,
                ..Self::default()
            }
        }

        fn with_upcoming(self, fixtures: Vec<Fixture>) -> Self {
            *self.upcoming.lock().unwrap() = Some(Ok(fixtures));
            self
        }

        fn with_predictions(
            self,
            predictions: crate::api::ApiResult<Vec<Prediction>>,
        ) -> Self {
            *self.predictions.lock().unwrap() = Some(predictions);
            self
        }

        fn push_create(&self, response: crate::api::ApiResult<Prediction>) {
            self.create_responses.lock().unwrap().push_back(response);
        }

        fn push_update(&self, response: crate::api::ApiResult<Prediction>) {
            self.update_responses.lock().unwrap().push_back(response);
        }
    }

    impl ContestApi for &ScriptedApi {
        async fn check_health(&self) -> bool {
            self.health_calls.fetch_add(1, Ordering::SeqCst);
            self.healthy
        }

        async fn upcoming_matches(&self) -> crate::api::ApiResult<Vec<Fixture>> {
            self.upcoming
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(network_error)
        }

        async fn past_matches(&self) -> crate::api::ApiResult<Vec<Fixture>> {
            network_error()
        }

        async fn user_predictions(
            &self,
            _token: &str,
        ) -> crate::api::ApiResult<Vec<Prediction>> {
            self.prediction_calls.fetch_add(1, Ordering::SeqCst);
            self.predictions
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(network_error)
        }

        async fn create_prediction(
            &self,
            _token: &str,
            _match_id: i64,
            _request: &PredictionRequest,
        ) -> crate::api::ApiResult<Prediction> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.create_responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(network_error)
        }

        async fn update_prediction(
            &self,
            _token: &str,
            _prediction_id: i64,
            _request: &PredictionRequest,
        ) -> crate::api::ApiResult<Prediction> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            self.update_responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(network_error)
        }

        async fn leaderboard(&self) -> crate::api::ApiResult<Vec<LeaderboardEntry>> {
            network_error()
        }
    }

    fn engine<'a>(
        api: &'a ScriptedApi,
        db: &'a Database,
    ) -> SyncEngine<&'a ScriptedApi, SqliteCacheRepository<'a>, SqliteCredentialStore<'a>> {
        SyncEngine::new(
            api,
            SqliteCacheRepository::new(db.connection()),
            SqliteCredentialStore::new(db.connection()),
        )
    }

    fn cache(db: &Database) -> SqliteCacheRepository<'_> {
        SqliteCacheRepository::new(db.connection())
    }

    fn sign_in(db: &Database) {
        let store = SqliteCredentialStore::new(db.connection());
        store
            .save_session(&AuthSession {
                access_token: "token-1".to_string(),
                user: AuthUser {
                    id: 7,
                    username: "ada".to_string(),
                    email: None,
                    is_admin: false,
                    created_at: None,
                    last_login: None,
                },
            })
            .unwrap();
    }

    fn stored_token(db: &Database) -> Option<String> {
        SqliteCredentialStore::new(db.connection())
            .access_token()
            .unwrap()
    }

    fn fixture(id: i64) -> Fixture {
        serde_json::from_str(&format!(
            r#"{{"id": {id}, "home_team": "A", "away_team": "B", "match_date": "2026-06-14T19:00:00Z"}}"#
        ))
        .unwrap()
    }

    /// Shape of the backend's create/update responses: prediction fields
    /// only, no user or timestamps.
    fn server_prediction(id: i64, match_id: i64, home: i64, away: i64) -> Prediction {
        Prediction {
            id: PredictionId::Server(id),
            match_id,
            home_score: home,
            away_score: away,
            comment: String::new(),
            user_id: None,
            points_earned: None,
            created_at: None,
            updated_at: None,
            origin: Origin::ServerConfirmed,
        }
    }

    fn local_prediction(match_id: i64, home: i64, away: i64) -> Prediction {
        Prediction {
            id: PredictionId::new_local(),
            match_id,
            home_score: home,
            away_score: away,
            comment: String::new(),
            user_id: Some(7),
            points_earned: None,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
            origin: Origin::LocalOnly,
        }
    }

    #[tokio::test]
    async fn fetch_fixtures_replaces_cache_on_success() {
        let db = Database::open_in_memory().unwrap();
        cache(&db).replace_fixtures(&[fixture(9)]).unwrap();

        let api = ScriptedApi::online().with_upcoming(vec![fixture(1), fixture(2)]);
        let fetched = engine(&api, &db).fetch_fixtures().await.unwrap();

        assert_eq!(fetched.len(), 2);
        assert_eq!(cache(&db).fixtures().unwrap(), Some(fetched));
    }

    #[tokio::test]
    async fn fetch_fixtures_falls_back_to_cache_when_offline() {
        let db = Database::open_in_memory().unwrap();
        cache(&db).replace_fixtures(&[fixture(9)]).unwrap();

        let api = ScriptedApi::offline();
        let fetched = engine(&api, &db).fetch_fixtures().await.unwrap();

        assert_eq!(fetched, vec![fixture(9)]);
    }

    #[tokio::test]
    async fn fetch_fixtures_seeds_cold_offline_start() {
        let db = Database::open_in_memory().unwrap();
        let api = ScriptedApi::offline();

        let fetched = engine(&api, &db).fetch_fixtures().await.unwrap();

        assert!(!fetched.is_empty());
        // The seed is a fallback, not cached truth
        assert_eq!(cache(&db).fixtures().unwrap(), None);
    }

    #[tokio::test]
    async fn fetch_user_predictions_without_token_skips_network() {
        let db = Database::open_in_memory().unwrap();
        let api = ScriptedApi::online();

        let predictions = engine(&api, &db).fetch_user_predictions().await.unwrap();

        assert!(predictions.is_empty());
        assert_eq!(api.prediction_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_user_predictions_merges_pending_local_records() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);
        // Pending local records for matches 1 and 2; the server knows
        // about match 1 only, so its version must win there
        let mut stale = local_prediction(1, 0, 0);
        stale.id = PredictionId::Server(101);
        cache(&db).upsert_prediction(&stale).unwrap();
        cache(&db).upsert_prediction(&local_prediction(2, 2, 2)).unwrap();

        let api = ScriptedApi::online()
            .with_predictions(Ok(vec![server_prediction(101, 1, 3, 1)]));
        let merged = engine(&api, &db).fetch_user_predictions().await.unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[&1].home_score, 3);
        assert!(!merged[&1].is_local_only());
        assert!(merged[&2].is_local_only());
        assert_eq!(cache(&db).predictions().unwrap(), merged);
    }

    #[tokio::test]
    async fn fetch_user_predictions_expired_session_goes_quiet() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);

        let api = ScriptedApi::online().with_predictions(Err(ApiError::Unauthorized));
        let engine = engine(&api, &db);

        assert!(engine.fetch_user_predictions().await.unwrap().is_empty());
        assert_eq!(stored_token(&db), None);

        // The cleared token short-circuits the next read entirely
        assert!(engine.fetch_user_predictions().await.unwrap().is_empty());
        assert_eq!(api.prediction_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_user_predictions_falls_back_to_cache() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);
        cache(&db).upsert_prediction(&local_prediction(4, 1, 0)).unwrap();

        let api = ScriptedApi::offline();
        let predictions = engine(&api, &db).fetch_user_predictions().await.unwrap();

        assert_eq!(predictions.len(), 1);
        assert!(predictions[&4].is_local_only());
    }

    #[tokio::test]
    async fn submit_requires_sign_in() {
        let db = Database::open_in_memory().unwrap();
        let api = ScriptedApi::online();

        let result = engine(&api, &db).submit_prediction(1, 2, 1, None).await;

        assert!(matches!(result, Err(Error::AuthRequired)));
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submit_rejects_negative_scores_before_any_network_call() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);
        let api = ScriptedApi::online();

        let result = engine(&api, &db).submit_prediction(1, -1, 0, None).await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resubmit_online_updates_instead_of_creating() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);

        let api = ScriptedApi::online();
        api.push_create(Ok(server_prediction(101, 1, 2, 1)));
        api.push_update(Ok(server_prediction(101, 1, 3, 1)));
        let engine = engine(&api, &db);

        let first = engine.submit_prediction(1, 2, 1, None).await.unwrap();
        assert!(!first.stored_locally);
        assert_eq!(first.prediction.id, PredictionId::Server(101));
        assert_eq!(first.prediction.user_id, Some(7));

        let second = engine.submit_prediction(1, 3, 1, None).await.unwrap();
        assert!(!second.stored_locally);

        assert_eq!(api.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.update_calls.load(Ordering::SeqCst), 1);

        let predictions = cache(&db).predictions().unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[&1].home_score, 3);
    }

    #[tokio::test]
    async fn submit_offline_stores_durable_local_record() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);

        let api = ScriptedApi::offline();
        let outcome = engine(&api, &db)
            .submit_prediction(1, 2, 1, Some("test"))
            .await
            .unwrap();

        assert!(outcome.stored_locally);
        let prediction = outcome.prediction;
        assert_eq!(prediction.match_id, 1);
        assert_eq!(prediction.home_score, 2);
        assert_eq!(prediction.away_score, 1);
        assert_eq!(prediction.comment, "test");
        assert_eq!(prediction.user_id, Some(7));
        assert!(prediction.id.is_local());
        assert!(prediction.is_local_only());

        // The persisted layout matches the wire convention
        let raw: String = db
            .connection()
            .query_row(
                "SELECT value FROM cache WHERE key = ?",
                [keys::USER_PREDICTIONS],
                |row| row.get(0),
            )
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["1"]["match_id"], 1);
        assert_eq!(value["1"]["home_score"], 2);
        assert_eq!(value["1"]["away_score"], 1);
        assert_eq!(value["1"]["comment"], "test");
        assert_eq!(value["1"]["is_local_only"], true);
    }

    #[tokio::test]
    async fn submit_offline_keeps_one_entry_per_fixture() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);

        let api = ScriptedApi::offline();
        let engine = engine(&api, &db);

        let first = engine.submit_prediction(1, 2, 1, None).await.unwrap();
        engine.submit_prediction(2, 0, 0, None).await.unwrap();
        let resubmit = engine.submit_prediction(1, 0, 3, None).await.unwrap();

        let predictions = cache(&db).predictions().unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[&1].away_score, 3);
        // A resubmit reuses the placeholder id instead of minting a new one
        assert_eq!(first.prediction.id, resubmit.prediction.id);
    }

    #[tokio::test]
    async fn failed_update_regresses_confirmed_record() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);

        let created_at = Utc::now() - Duration::days(1);
        let mut confirmed = server_prediction(101, 1, 2, 1);
        confirmed.created_at = Some(created_at);
        confirmed.updated_at = Some(created_at);
        cache(&db).upsert_prediction(&confirmed).unwrap();

        let api = ScriptedApi::offline();
        let outcome = engine(&api, &db)
            .submit_prediction(1, 3, 0, None)
            .await
            .unwrap();

        assert!(outcome.stored_locally);
        let stored = cache(&db).prediction(1).unwrap().unwrap();
        assert!(stored.is_local_only());
        // Keeps its server identity for the eventual reconciliation
        assert_eq!(stored.id, PredictionId::Server(101));
        assert_eq!(stored.created_at, Some(created_at));
        assert!(stored.updated_at.unwrap() > created_at);
        assert_eq!(api.update_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn submit_session_expiry_clears_token_without_local_write() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);

        let api = ScriptedApi::online();
        api.push_create(Err(ApiError::Unauthorized));

        let result = engine(&api, &db).submit_prediction(1, 2, 1, None).await;

        assert!(matches!(result, Err(Error::SessionExpired)));
        assert_eq!(stored_token(&db), None);
        assert!(cache(&db).predictions().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sync_predictions_trivial_when_nothing_pending() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);
        cache(&db)
            .upsert_prediction(&server_prediction(101, 1, 2, 1))
            .unwrap();

        let api = ScriptedApi::offline();
        let report = engine(&api, &db).sync_predictions().await.unwrap();

        assert_eq!(report, SyncReport { synced: 0, total: 0 });
        // Nothing pending means the prober is not even consulted
        assert_eq!(api.health_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sync_predictions_requires_connectivity() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);
        cache(&db).upsert_prediction(&local_prediction(1, 2, 1)).unwrap();
        cache(&db).upsert_prediction(&local_prediction(2, 0, 0)).unwrap();
        let before = cache(&db).predictions().unwrap();

        let api = ScriptedApi::offline();
        let result = engine(&api, &db).sync_predictions().await;

        assert!(matches!(result, Err(Error::Offline)));
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.update_calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache(&db).predictions().unwrap(), before);
    }

    #[tokio::test]
    async fn sync_predictions_promotes_all_pending() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);
        cache(&db).upsert_prediction(&local_prediction(1, 2, 1)).unwrap();
        cache(&db).upsert_prediction(&local_prediction(2, 0, 0)).unwrap();

        let api = ScriptedApi::online();
        api.push_create(Ok(server_prediction(101, 1, 2, 1)));
        api.push_create(Ok(server_prediction(102, 2, 0, 0)));

        let report = engine(&api, &db).sync_predictions().await.unwrap();

        assert_eq!(report, SyncReport { synced: 2, total: 2 });
        let predictions = cache(&db).predictions().unwrap();
        assert!(predictions.values().all(|p| !p.is_local_only()));
        assert_eq!(predictions[&1].id, PredictionId::Server(101));
        assert_eq!(predictions[&2].id, PredictionId::Server(102));
    }

    #[tokio::test]
    async fn sync_predictions_reports_partial_failure() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);
        cache(&db).upsert_prediction(&local_prediction(1, 2, 1)).unwrap();
        cache(&db).upsert_prediction(&local_prediction(2, 0, 0)).unwrap();

        let api = ScriptedApi::online();
        // Entries are pushed in ascending fixture order
        api.push_create(Ok(server_prediction(101, 1, 2, 1)));
        api.push_create(Err(ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        }));

        let report = engine(&api, &db).sync_predictions().await.unwrap();

        assert_eq!(report, SyncReport { synced: 1, total: 2 });
        let predictions = cache(&db).predictions().unwrap();
        assert!(!predictions[&1].is_local_only());
        assert!(predictions[&2].is_local_only());
    }

    #[tokio::test]
    async fn sync_updates_regressed_records_by_server_id() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);
        let mut regressed = local_prediction(1, 3, 0);
        regressed.id = PredictionId::Server(101);
        cache(&db).upsert_prediction(&regressed).unwrap();

        let api = ScriptedApi::online();
        api.push_update(Ok(server_prediction(101, 1, 3, 0)));

        let report = engine(&api, &db).sync_predictions().await.unwrap();

        assert_eq!(report, SyncReport { synced: 1, total: 1 });
        assert_eq!(api.update_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
        assert!(!cache(&db).prediction(1).unwrap().unwrap().is_local_only());
    }

    #[tokio::test]
    async fn sync_auth_expiry_stops_the_loop() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);
        cache(&db).upsert_prediction(&local_prediction(1, 2, 1)).unwrap();
        cache(&db).upsert_prediction(&local_prediction(2, 0, 0)).unwrap();

        let api = ScriptedApi::online();
        api.push_create(Err(ApiError::Unauthorized));

        let result = engine(&api, &db).sync_predictions().await;

        assert!(matches!(result, Err(Error::SessionExpired)));
        assert_eq!(stored_token(&db), None);
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 1);
        let predictions = cache(&db).predictions().unwrap();
        assert!(predictions.values().all(Prediction::is_local_only));
    }

    #[tokio::test]
    async fn auto_sync_offline_touches_nothing() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);
        cache(&db).upsert_prediction(&local_prediction(1, 2, 1)).unwrap();
        let before = cache(&db).predictions().unwrap();

        let api = ScriptedApi::offline();
        let result = engine(&api, &db).auto_sync().await;

        assert!(matches!(result, Err(Error::Offline)));
        assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache(&db).predictions().unwrap(), before);
    }

    #[tokio::test]
    async fn auto_sync_reports_reconciliation() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);
        cache(&db).upsert_prediction(&local_prediction(1, 2, 1)).unwrap();

        let api = ScriptedApi::online();
        api.push_create(Ok(server_prediction(101, 1, 2, 1)));

        let report = engine(&api, &db).auto_sync().await.unwrap();

        assert_eq!(report.predictions, SyncReport { synced: 1, total: 1 });
        assert!(report.completed_at <= Utc::now());
    }

    #[tokio::test]
    async fn pending_predictions_counts_local_only_entries() {
        let db = Database::open_in_memory().unwrap();
        cache(&db).upsert_prediction(&local_prediction(1, 2, 1)).unwrap();
        cache(&db)
            .upsert_prediction(&server_prediction(102, 2, 0, 0))
            .unwrap();

        let api = ScriptedApi::offline();
        assert_eq!(engine(&api, &db).pending_predictions().unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_local_data_preserves_credential() {
        let db = Database::open_in_memory().unwrap();
        sign_in(&db);
        cache(&db).replace_fixtures(&[fixture(1)]).unwrap();
        cache(&db).upsert_prediction(&local_prediction(1, 2, 1)).unwrap();

        let api = ScriptedApi::offline();
        engine(&api, &db).clear_local_data().unwrap();

        assert_eq!(cache(&db).fixtures().unwrap(), None);
        assert!(cache(&db).predictions().unwrap().is_empty());
        assert_eq!(stored_token(&db).as_deref(), Some("token-1"));
    }

    #[test]
    fn seed_fixtures_cover_upcoming_days() {
        let seeds = seed_fixtures();
        assert_eq!(seeds.len(), 3);
        let now = Utc::now();
        assert!(seeds.iter().all(|f| f.match_date > now));
        assert!(seeds.iter().all(|f| !f.is_completed()));
    }
}
