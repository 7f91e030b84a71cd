//! Page shell: current view, language, and cross-page signals.
//!
//! # Responsibility
//! - Persist the active view and language.
//! - Clear a view's stored fields when the user navigates to it, and tell
//!   the view to reset.
//! - Re-fetch language-dependent content after a language change.
//!
//! # Invariants
//! - A page switch emits at most one reset event.
//! - Refresh failures never alter stored data.

use log::{info, warn};
use tokio::sync::broadcast;

use super::chart_service::stream_placement_roasts;
use super::load_json_lenient;
use crate::client::ApiClient;
use crate::model::{
    BirthChart, BirthDetails, Language, Page, Period, PlacementRoasts, Roast, Translations,
};
use crate::repo::state_repo::{RepoResult, StateKey, StateRepository};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Signals from the shell to the views.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    HoroscopeReset,
    ChartReset,
    HoroscopeRefreshed(Roast),
    ChartRoastsRefreshed(PlacementRoasts),
}

/// What a language change re-fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LanguageRefresh {
    pub horoscope: bool,
    pub chart: bool,
}

pub struct AppController<R: StateRepository> {
    repo: R,
    client: ApiClient,
    page: Page,
    language: Language,
    events: broadcast::Sender<AppEvent>,
}

impl<R: StateRepository> AppController<R> {
    /// Restores page and language; unknown stored values fall back to
    /// the home view and English.
    pub fn load(repo: R, client: ApiClient) -> RepoResult<Self> {
        let page = repo
            .get_text(StateKey::CurrentPage)?
            .and_then(|raw| Page::parse(&raw))
            .unwrap_or_default();
        let language = Language::from_stored(repo.get_text(StateKey::Language)?.as_deref());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            repo,
            client,
            page,
            language,
            events,
        })
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn translations(&self) -> &'static Translations {
        Translations::for_language(self.language)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    /// Makes `page` the active view.
    ///
    /// Returns `true` when the view changed; the target view's keys are then
    /// removed and its reset event is sent.
    pub fn switch_page(&mut self, page: Page) -> RepoResult<bool> {
        self.repo.set_text(StateKey::CurrentPage, page.as_str())?;
        let previous = std::mem::replace(&mut self.page, page);
        if previous == page {
            return Ok(false);
        }

        let (keys, event) = match page {
            Page::Home => (StateKey::horoscope_page_keys(), AppEvent::HoroscopeReset),
            Page::BirthChart => (StateKey::chart_page_keys(), AppEvent::ChartReset),
        };
        self.repo.remove_all(keys)?;
        info!(
            "event=page_switch module=service status=ok from={} to={} cleared_keys={}",
            previous.as_str(),
            page.as_str(),
            keys.len()
        );
        self.emit(event);
        Ok(true)
    }

    /// Persists `language` and re-fetches stored content in it.
    pub async fn change_language(&mut self, language: Language) -> RepoResult<LanguageRefresh> {
        self.repo.set_text(StateKey::Language, language.as_str())?;
        let previous = std::mem::replace(&mut self.language, language);
        if previous == language {
            return Ok(LanguageRefresh::default());
        }

        info!(
            "event=language_change module=service status=start from={} to={}",
            previous.as_str(),
            language.as_str()
        );
        let refresh = LanguageRefresh {
            horoscope: self.refresh_horoscope(language).await?,
            chart: self.refresh_chart_roasts(language).await?,
        };
        info!(
            "event=language_change module=service status=ok horoscope_refreshed={} chart_refreshed={}",
            refresh.horoscope, refresh.chart
        );
        Ok(refresh)
    }

    async fn refresh_horoscope(&self, language: Language) -> RepoResult<bool> {
        let Some(sign) = self
            .repo
            .get_text(StateKey::HoroscopeSign)?
            .filter(|sign| !sign.trim().is_empty())
        else {
            return Ok(false);
        };
        let period = self
            .repo
            .get_text(StateKey::HoroscopePeriod)?
            .and_then(|raw| Period::parse(&raw))
            .unwrap_or_default();

        match self.client.horoscope(&sign, period, language).await {
            Ok(roast) => {
                self.repo.set_json(StateKey::HoroscopeRoast, Some(&roast))?;
                self.emit(AppEvent::HoroscopeRefreshed(roast));
                Ok(true)
            }
            Err(err) => {
                warn!(
                    "event=language_change module=service status=error target=horoscope {}",
                    err.log_fields()
                );
                Ok(false)
            }
        }
    }

    async fn refresh_chart_roasts(&self, language: Language) -> RepoResult<bool> {
        let chart: Option<BirthChart> = load_json_lenient(&self.repo, StateKey::ChartBirthChart)?;
        if chart.is_none() {
            return Ok(false);
        }
        let Some(details) = self.stored_birth_details()? else {
            return Ok(false);
        };

        let summary =
            stream_placement_roasts(&self.client, &details, language, |roasts| {
                self.repo
                    .set_json(StateKey::ChartPlacementRoasts, Some(roasts))?;
                self.emit(AppEvent::ChartRoastsRefreshed(roasts.clone()));
                Ok(())
            })
            .await?;
        Ok(!summary.failed)
    }

    fn stored_birth_details(&self) -> RepoResult<Option<BirthDetails>> {
        let field = |key: StateKey| -> RepoResult<String> {
            Ok(self.repo.get_text(key)?.unwrap_or_default())
        };
        Ok(BirthDetails::from_fields(
            &field(StateKey::ChartBirthDate)?,
            &field(StateKey::ChartBirthTime)?,
            &field(StateKey::ChartLatitude)?,
            &field(StateKey::ChartLongitude)?,
        ))
    }

    fn emit(&self, event: AppEvent) {
        // No subscribers is fine: views reload from storage.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::{AppController, AppEvent, LanguageRefresh};
    use crate::client::ApiClient;
    use crate::config::ClientConfig;
    use crate::db::open_db_in_memory;
    use crate::model::{Language, Page};
    use crate::repo::state_repo::{SqliteStateRepository, StateKey, StateRepository};

    fn unreachable_client() -> ApiClient {
        ApiClient::new(ClientConfig::default().with_base_url("http://127.0.0.1:9")).unwrap()
    }

    #[test]
    fn unknown_stored_values_fall_back_to_defaults() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteStateRepository::new(&conn);
        repo.set_text(StateKey::CurrentPage, "settings").unwrap();
        repo.set_text(StateKey::Language, "Klingon").unwrap();

        let app = AppController::load(repo, unreachable_client()).unwrap();
        assert_eq!(app.page(), Page::Home);
        assert_eq!(app.language(), Language::English);
    }

    #[test]
    fn switching_to_same_page_keeps_state_and_emits_nothing() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteStateRepository::new(&conn);
        repo.set_text(StateKey::HoroscopeSign, "Leo").unwrap();
        let mut app = AppController::load(repo, unreachable_client()).unwrap();
        let mut events = app.subscribe();

        assert!(!app.switch_page(Page::Home).unwrap());

        assert!(events.try_recv().is_err());
        let repo = SqliteStateRepository::new(&conn);
        assert_eq!(
            repo.get_text(StateKey::HoroscopeSign).unwrap().as_deref(),
            Some("Leo")
        );
    }

    #[test]
    fn switching_to_chart_clears_chart_keys_once() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteStateRepository::new(&conn);
        repo.set_text(StateKey::ChartBirthDate, "1990-06-15").unwrap();
        repo.set_text(StateKey::HoroscopeSign, "Leo").unwrap();
        let mut app = AppController::load(repo, unreachable_client()).unwrap();
        let mut events = app.subscribe();

        assert!(app.switch_page(Page::BirthChart).unwrap());

        assert_eq!(events.try_recv().unwrap(), AppEvent::ChartReset);
        assert!(events.try_recv().is_err());
        let repo = SqliteStateRepository::new(&conn);
        assert_eq!(repo.get_text(StateKey::ChartBirthDate).unwrap(), None);
        assert_eq!(
            repo.get_text(StateKey::HoroscopeSign).unwrap().as_deref(),
            Some("Leo")
        );
        assert_eq!(
            repo.get_text(StateKey::CurrentPage).unwrap().as_deref(),
            Some("birth-chart")
        );
    }

    #[tokio::test]
    async fn language_change_without_stored_content_only_persists() {
        let conn = open_db_in_memory().unwrap();
        let mut app =
            AppController::load(SqliteStateRepository::new(&conn), unreachable_client()).unwrap();

        let refresh = app.change_language(Language::Russian).await.unwrap();

        assert_eq!(refresh, LanguageRefresh::default());
        assert_eq!(app.language(), Language::Russian);
        assert_eq!(
            app.translations().page_title,
            crate::model::Translations::for_language(Language::Russian).page_title
        );
        let repo = SqliteStateRepository::new(&conn);
        assert_eq!(
            repo.get_text(StateKey::Language).unwrap().as_deref(),
            Some("Russian")
        );
    }
}
