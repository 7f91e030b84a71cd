//! Page-level use-case services.
//!
//! # Responsibility
//! - Own the form state of each view and write every change through to the
//!   state repository.
//! - Turn backend failures into localized strings stored where the result
//!   would have gone.
//!
//! # Invariants
//! - Only persistence failures propagate as errors; network failures never
//!   do.
//! - State is read from the repository once, at load.

use log::warn;
use serde::de::DeserializeOwned;

use crate::repo::state_repo::{RepoResult, StateKey, StateRepository};

pub mod app_service;
pub mod chart_service;
pub mod city_search;
pub mod horoscope_service;

/// Result of a user-triggered action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Preconditions not met (empty input); nothing was requested.
    Skipped,
    Completed,
    /// The request failed; the localized message was stored in the result slot.
    Failed(String),
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Loads a persisted JSON value, treating corrupt data as absent.
pub(crate) fn load_json_lenient<R, T>(repo: &R, key: StateKey) -> RepoResult<Option<T>>
where
    R: StateRepository,
    T: DeserializeOwned,
{
    match repo.get_json(key) {
        Ok(value) => Ok(value),
        Err(crate::repo::state_repo::RepoError::InvalidData(_)) => {
            warn!(
                "event=state_load module=service status=error key={} error_code=invalid_data",
                key.as_str()
            );
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

pub(crate) fn load_text<R: StateRepository>(repo: &R, key: StateKey) -> RepoResult<String> {
    Ok(repo.get_text(key)?.unwrap_or_default())
}

pub(crate) fn epoch_millis() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
