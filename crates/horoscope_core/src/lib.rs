//! Core logic for the honest-horoscope app.
//! Shells (Flutter via FFI, CLI) only render what this crate returns.

pub mod client;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use client::{ApiClient, ApiError, RoastEvent, RoastProgress, RoastStream};
pub use config::{resolve_state_db_path, ClientConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{
    default_log_level, init_logging, init_logging_with, logging_status, LogEcho, LoggingError,
};
pub use model::{
    BirthChart, BirthDetails, CitySuggestion, Language, Page, Period, PlacementRoasts, Roast,
    SignInfo, Translations, ZodiacSign,
};
pub use repo::state_repo::{
    RepoError, RepoResult, SqliteStateRepository, StateKey, StateRepository,
};
pub use service::app_service::{AppController, AppEvent, LanguageRefresh};
pub use service::chart_service::{ChartForm, ChartService, RoastStreamSummary};
pub use service::city_search::{CitySearchOutcome, CitySearcher};
pub use service::horoscope_service::{HoroscopeForm, HoroscopeService};
pub use service::ActionOutcome;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
