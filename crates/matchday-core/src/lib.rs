//! matchday-core - Core library for Matchday
//!
//! This crate contains the shared models, local cache, backend API gateway,
//! and the offline-tolerant sync engine used by all Matchday interfaces.

pub mod api;
pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Fixture, Prediction, PredictionId};
