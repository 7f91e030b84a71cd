//! Key/value repository for UI form fields and cached responses.
//!
//! # Responsibility
//! - Provide get/set/remove primitives over the `local_state` table.
//! - Offer JSON helpers for structured values (sign info, charts, roasts).
//!
//! # Invariants
//! - Every write stamps `updated_at`.
//! - Bulk removal is atomic.

use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted state: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Every persisted UI field, with its storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    CurrentPage,
    Language,

    HoroscopeBirthDate,
    HoroscopeSign,
    HoroscopeDisplaySign,
    HoroscopePeriod,
    HoroscopeRoast,
    HoroscopeSignInfo,

    ChartBirthDate,
    ChartBirthTime,
    ChartSelectedCity,
    ChartLatitude,
    ChartLongitude,
    ChartUseCitySearch,
    ChartBirthChart,
    ChartImageUrl,
    ChartPlacementRoasts,
}

impl StateKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CurrentPage => "horoscope-current-page",
            Self::Language => "horoscope-language",
            Self::HoroscopeBirthDate => "horoscope-birth-date",
            Self::HoroscopeSign => "horoscope-sign",
            Self::HoroscopeDisplaySign => "horoscope-display-sign",
            Self::HoroscopePeriod => "horoscope-period",
            Self::HoroscopeRoast => "horoscope-roast",
            Self::HoroscopeSignInfo => "horoscope-sign-info",
            Self::ChartBirthDate => "chart-birth-date",
            Self::ChartBirthTime => "chart-birth-time",
            Self::ChartSelectedCity => "chart-selected-city",
            Self::ChartLatitude => "chart-latitude",
            Self::ChartLongitude => "chart-longitude",
            Self::ChartUseCitySearch => "chart-use-city-search",
            Self::ChartBirthChart => "chart-birth-chart",
            Self::ChartImageUrl => "chart-image-url",
            Self::ChartPlacementRoasts => "chart-placement-roasts",
        }
    }

    /// Keys cleared when the shell switches to the home view.
    ///
    /// The sign-calculator birth date survives the switch.
    pub fn horoscope_page_keys() -> &'static [StateKey] {
        &[
            Self::HoroscopeSign,
            Self::HoroscopeDisplaySign,
            Self::HoroscopePeriod,
            Self::HoroscopeRoast,
            Self::HoroscopeSignInfo,
        ]
    }

    /// Keys cleared when the shell switches to the birth-chart view.
    pub fn chart_page_keys() -> &'static [StateKey] {
        &[
            Self::ChartBirthDate,
            Self::ChartBirthTime,
            Self::ChartSelectedCity,
            Self::ChartLatitude,
            Self::ChartLongitude,
            Self::ChartUseCitySearch,
            Self::ChartBirthChart,
            Self::ChartImageUrl,
            Self::ChartPlacementRoasts,
        ]
    }
}

/// Repository interface for persisted UI state.
pub trait StateRepository {
    fn get_text(&self, key: StateKey) -> RepoResult<Option<String>>;
    fn set_text(&self, key: StateKey, value: &str) -> RepoResult<()>;
    fn remove(&self, key: StateKey) -> RepoResult<()>;
    fn remove_all(&self, keys: &[StateKey]) -> RepoResult<()>;

    /// Reads and decodes a JSON value.
    fn get_json<T: DeserializeOwned>(&self, key: StateKey) -> RepoResult<Option<T>> {
        match self.get_text(key)? {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|err| {
                RepoError::InvalidData(format!("`{}` is not valid JSON: {err}", key.as_str()))
            }),
            None => Ok(None),
        }
    }

    /// Encodes and writes a JSON value; `None` removes the key.
    fn set_json<T: Serialize>(&self, key: StateKey, value: Option<&T>) -> RepoResult<()> {
        match value {
            Some(value) => {
                let raw = serde_json::to_string(value).map_err(|err| {
                    RepoError::InvalidData(format!("`{}` failed to encode: {err}", key.as_str()))
                })?;
                self.set_text(key, &raw)
            }
            None => self.remove(key),
        }
    }
}

/// SQLite-backed state repository.
pub struct SqliteStateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStateRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StateRepository for SqliteStateRepository<'_> {
    fn get_text(&self, key: StateKey) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_state WHERE key = ?1;",
                [key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_text(&self, key: StateKey, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO local_state (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key.as_str(), value],
        )?;
        debug!(
            "event=state_write module=repo status=ok key={} bytes={}",
            key.as_str(),
            value.len()
        );
        Ok(())
    }

    fn remove(&self, key: StateKey) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM local_state WHERE key = ?1;", [key.as_str()])?;
        Ok(())
    }

    fn remove_all(&self, keys: &[StateKey]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for key in keys {
            tx.execute("DELETE FROM local_state WHERE key = ?1;", [key.as_str()])?;
        }
        tx.commit()?;
        Ok(())
    }
}
