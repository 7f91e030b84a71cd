//! Debounced, cancellable city autocomplete.
//!
//! # Invariants
//! - Each call supersedes the previous one: its debounce timer or in-flight
//!   request is aborted, so at most one request is outstanding.
//! - Queries shorter than the configured minimum never reach the backend.

use log::{debug, warn};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tokio::task::AbortHandle;

use crate::client::ApiClient;
use crate::model::CitySuggestion;

#[derive(Debug, Clone, PartialEq)]
pub enum CitySearchOutcome {
    /// Query below the minimum length; suggestions should be hidden.
    TooShort,
    Suggestions(Vec<CitySuggestion>),
    /// A newer query (or `cancel`) replaced this one.
    Superseded,
    /// The request failed; the list should be emptied.
    Failed,
}

pub struct CitySearcher {
    client: ApiClient,
    pending: Mutex<Option<AbortHandle>>,
}

impl CitySearcher {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            pending: Mutex::new(None),
        }
    }

    /// Searches after the debounce delay unless a newer call arrives first.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn search(&self, query: &str) -> CitySearchOutcome {
        let config = self.client.config();
        let min_chars = config.search_min_chars;
        let debounce = config.search_debounce;
        let limit = config.search_limit;

        let task = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = pending.take() {
                previous.abort();
            }
            if query.chars().count() < min_chars {
                return CitySearchOutcome::TooShort;
            }

            let client = self.client.clone();
            let query = query.to_string();
            let task = tokio::spawn(async move {
                tokio::time::sleep(debounce).await;
                let started_at = Instant::now();
                match client.search_cities(&query, limit).await {
                    Ok(suggestions) => {
                        debug!(
                            "event=city_search module=service status=ok query_len={} results={} duration_ms={}",
                            query.chars().count(),
                            suggestions.len(),
                            started_at.elapsed().as_millis()
                        );
                        CitySearchOutcome::Suggestions(suggestions)
                    }
                    Err(err) => {
                        warn!(
                            "event=city_search module=service status=error query_len={} {}",
                            query.chars().count(),
                            err.log_fields()
                        );
                        CitySearchOutcome::Failed
                    }
                }
            });
            *pending = Some(task.abort_handle());
            task
        };

        match task.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() => CitySearchOutcome::Superseded,
            Err(_) => {
                warn!("event=city_search module=service status=error error_code=task_panic");
                CitySearchOutcome::Failed
            }
        }
    }

    /// Drops any pending search, e.g. when the page goes away.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }
}

impl Drop for CitySearcher {
    fn drop(&mut self) {
        self.cancel();
    }
}
