//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose one function per UI action to Dart via FRB.
//! - Return render-ready view structs so Dart does no formatting.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call reloads page state from the state DB; nothing is cached in
//!   Dart.
//! - Network-backed calls block on a shared tokio runtime and are exported
//!   without `frb(sync)` so they run off the UI thread.
//! - While `chart_roast` runs, each streamed placement is persisted; the UI
//!   polls `chart_state` to render progress.

use horoscope_core::db::open_db;
use horoscope_core::view::{
    ascendant_line, format_degrees, overall_synthesis, placeholder_placements,
    placement_roast_text, placement_title, roast_sections, sign_info_rows,
};
use horoscope_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    resolve_state_db_path, ActionOutcome, ApiClient, AppController, ChartForm, ChartService,
    CitySearchOutcome, CitySearcher, CitySuggestion, ClientConfig, HoroscopeForm,
    HoroscopeService, Language, Page, Period, SqliteStateRepository, StateKey, StateRepository,
    Translations, ZodiacSign,
};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tokio::runtime::Runtime;

static STATE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static API_CLIENT: OnceLock<Result<ApiClient, String>> = OnceLock::new();
static RUNTIME: OnceLock<Result<Runtime, String>> = OnceLock::new();
static CITY_SEARCHER: OnceLock<CitySearcher> = OnceLock::new();
static CHART_STREAMING: AtomicBool = AtomicBool::new(false);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// All UI strings for `language` as a JSON object keyed by field name.
///
/// Unknown languages fall back to English.
#[flutter_rust_bridge::frb(sync)]
pub fn translations(language: String) -> String {
    let language = Language::parse(&language).unwrap_or_default();
    serde_json::to_string(Translations::for_language(language)).unwrap_or_default()
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the action completed.
    pub ok: bool,
    /// Localized error for the UI, or a diagnostic message.
    pub message: String,
}

impl ActionResponse {
    fn success() -> Self {
        Self {
            ok: true,
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }

    fn from_outcome(outcome: ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::Completed | ActionOutcome::Skipped => Self::success(),
            ActionOutcome::Failed(message) => Self::failure(message),
        }
    }
}

impl<E: std::fmt::Display> From<Result<(), E>> for ActionResponse {
    fn from(value: Result<(), E>) -> Self {
        match value {
            Ok(()) => Self::success(),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOption {
    /// Wire value (`English|French|Russian`).
    pub value: String,
    /// Self-name shown in the selector.
    pub label: String,
}

/// Shell state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppStateView {
    /// `home` or `birth-chart`.
    pub page: String,
    pub language: String,
    pub languages: Vec<LanguageOption>,
    /// Empty on success; load error otherwise.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledText {
    /// `None` for an unlabeled paragraph.
    pub label: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodOption {
    pub value: String,
    pub label: String,
}

/// Horoscope page state, localized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HoroscopeStateView {
    pub birth_date: String,
    pub sign: String,
    pub display_sign: String,
    pub period: String,
    pub sign_options: Vec<String>,
    pub period_options: Vec<PeriodOption>,
    /// Heading above the roast, e.g. `Gemini Horoscope - Today`.
    pub roast_heading: String,
    pub roast: Vec<LabeledText>,
    pub sign_info: Vec<LabeledText>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityView {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl From<CitySuggestion> for CityView {
    fn from(suggestion: CitySuggestion) -> Self {
        Self {
            display_name: suggestion.display_name,
            latitude: suggestion.latitude,
            longitude: suggestion.longitude,
            city: suggestion.city,
            state: suggestion.state,
            country: suggestion.country,
        }
    }
}

impl From<CityView> for CitySuggestion {
    fn from(view: CityView) -> Self {
        Self {
            display_name: view.display_name,
            latitude: view.latitude,
            longitude: view.longitude,
            city: view.city,
            state: view.state,
            country: view.country,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementView {
    pub planet: String,
    pub symbol: String,
    pub sign: String,
    /// `24.3°`
    pub degrees: String,
    /// `Sun in Gemini (10th House)`; empty for placeholders.
    pub title: String,
    pub roast_text: String,
}

/// Chart page state, localized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartStateView {
    pub birth_date: String,
    pub birth_time: String,
    pub selected_city: Option<CityView>,
    pub latitude: String,
    pub longitude: String,
    pub use_city_search: bool,
    pub chart_image_url: String,
    /// `true` while the grid shows placeholder placements.
    pub placeholder: bool,
    pub placements: Vec<PlacementView>,
    pub ascendant: Option<String>,
    pub overall_synthesis: Option<String>,
    pub streaming: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CitySearchResponse {
    /// `too_short|ok|superseded|failed`.
    pub status: String,
    pub suggestions: Vec<CityView>,
}

/// Current page and language.
#[flutter_rust_bridge::frb(sync)]
pub fn app_state() -> AppStateView {
    let languages = Language::ALL
        .into_iter()
        .map(|language| LanguageOption {
            value: language.as_str().to_string(),
            label: language.native_label().to_string(),
        })
        .collect();
    let loaded = open_state_db().and_then(|conn| {
        let repo = SqliteStateRepository::new(&conn);
        let page = repo
            .get_text(StateKey::CurrentPage)
            .map_err(|err| err.to_string())?
            .and_then(|raw| Page::parse(&raw))
            .unwrap_or_default();
        Ok((page, load_language(&conn)?))
    });

    match loaded {
        Ok((page, language)) => AppStateView {
            page: page.as_str().to_string(),
            language: language.as_str().to_string(),
            languages,
            message: String::new(),
        },
        Err(message) => AppStateView {
            page: Page::default().as_str().to_string(),
            language: Language::default().as_str().to_string(),
            languages,
            message,
        },
    }
}

/// Navigates to `page` (`home|birth-chart`), clearing that page's fields.
#[flutter_rust_bridge::frb(sync)]
pub fn switch_page(page: String) -> ActionResponse {
    let Some(page) = Page::parse(&page) else {
        return ActionResponse::failure(format!("unknown page `{page}`"));
    };
    let result = open_state_db().and_then(|conn| {
        let client = api_client()?;
        let mut app = AppController::load(SqliteStateRepository::new(&conn), client)
            .map_err(|err| err.to_string())?;
        app.switch_page(page).map_err(|err| err.to_string())?;
        Ok(())
    });
    result.into()
}

/// Persists `language` and re-fetches stored roasts in it.
pub fn change_language(language: String) -> ActionResponse {
    let Some(language) = Language::parse(&language) else {
        return ActionResponse::failure(format!("unknown language `{language}`"));
    };
    let result = open_state_db().and_then(|conn| {
        let client = api_client()?;
        let runtime = runtime()?;
        let mut app = AppController::load(SqliteStateRepository::new(&conn), client)
            .map_err(|err| err.to_string())?;
        runtime
            .block_on(app.change_language(language))
            .map_err(|err| err.to_string())?;
        Ok(())
    });
    result.into()
}

/// Horoscope page state in the current language.
#[flutter_rust_bridge::frb(sync)]
pub fn horoscope_state() -> HoroscopeStateView {
    let loaded = open_state_db().and_then(|conn| {
        let language = load_language(&conn)?;
        let service = load_horoscope(&conn)?;
        Ok(horoscope_view(service.form(), language))
    });
    loaded.unwrap_or_else(|message| HoroscopeStateView {
        message,
        ..HoroscopeStateView::default()
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn horoscope_set_birth_date(birth_date: String) -> ActionResponse {
    with_horoscope(|service| service.set_birth_date(&birth_date).map_err(|err| err.to_string()))
}

/// Selects a sign by the name shown in the selector (any language).
#[flutter_rust_bridge::frb(sync)]
pub fn horoscope_select_sign(display_name: String) -> ActionResponse {
    with_horoscope(|service| {
        service
            .select_sign(display_name.trim())
            .map_err(|err| err.to_string())
    })
}

/// `period`: `daily|tomorrow|yesterday|weekly|monthly`.
#[flutter_rust_bridge::frb(sync)]
pub fn horoscope_set_period(period: String) -> ActionResponse {
    let Some(period) = Period::parse(&period) else {
        return ActionResponse::failure(format!("unknown period `{period}`"));
    };
    with_horoscope(|service| service.set_period(period).map_err(|err| err.to_string()))
}

pub fn horoscope_calculate_sign() -> ActionResponse {
    run_page_action(|conn, runtime, language| {
        let mut service = load_horoscope(conn)?;
        runtime
            .block_on(service.calculate_sign(language))
            .map_err(|err| err.to_string())
    })
}

pub fn horoscope_fetch_roast() -> ActionResponse {
    run_page_action(|conn, runtime, language| {
        let mut service = load_horoscope(conn)?;
        runtime
            .block_on(service.fetch_roast(language))
            .map_err(|err| err.to_string())
    })
}

/// Chart page state in the current language.
#[flutter_rust_bridge::frb(sync)]
pub fn chart_state() -> ChartStateView {
    let loaded = open_state_db().and_then(|conn| {
        let language = load_language(&conn)?;
        let service = load_chart(&conn)?;
        Ok(chart_view(
            service.form(),
            language,
            CHART_STREAMING.load(Ordering::SeqCst),
        ))
    });
    loaded.unwrap_or_else(|message| ChartStateView {
        message,
        ..ChartStateView::default()
    })
}

/// Writes all manual inputs at once; unchanged values are rewritten as-is.
#[flutter_rust_bridge::frb(sync)]
pub fn chart_set_inputs(
    birth_date: String,
    birth_time: String,
    latitude: String,
    longitude: String,
    use_city_search: bool,
) -> ActionResponse {
    with_chart(|service| {
        service.set_birth_date(&birth_date)?;
        service.set_birth_time(&birth_time)?;
        service.set_latitude(&latitude)?;
        service.set_longitude(&longitude)?;
        service.set_use_city_search(use_city_search)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn chart_select_city(city: CityView) -> ActionResponse {
    with_chart(|service| service.select_city(city.into()))
}

pub fn chart_calculate() -> ActionResponse {
    run_page_action(|conn, runtime, language| {
        let mut service = load_chart(conn)?;
        runtime
            .block_on(service.calculate_chart(language))
            .map_err(|err| err.to_string())
    })
}

/// Calculates the chart and streams placement roasts.
///
/// Returns when the stream ends; poll `chart_state` meanwhile.
pub fn chart_roast() -> ActionResponse {
    if CHART_STREAMING.swap(true, Ordering::SeqCst) {
        return ActionResponse::failure("a chart roast is already running");
    }
    let response = run_page_action(|conn, runtime, language| {
        let mut service = load_chart(conn)?;
        runtime
            .block_on(service.roast_chart(language, |_| {}))
            .map_err(|err| err.to_string())
    });
    CHART_STREAMING.store(false, Ordering::SeqCst);
    response
}

/// Debounced city autocomplete; a newer call supersedes older ones.
pub fn city_search(query: String) -> CitySearchResponse {
    let searcher = match city_searcher() {
        Ok(searcher) => searcher,
        Err(_) => return city_search_response("failed", Vec::new()),
    };
    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err(_) => return city_search_response("failed", Vec::new()),
    };

    match runtime.block_on(searcher.search(&query)) {
        CitySearchOutcome::TooShort => city_search_response("too_short", Vec::new()),
        CitySearchOutcome::Superseded => city_search_response("superseded", Vec::new()),
        CitySearchOutcome::Failed => city_search_response("failed", Vec::new()),
        CitySearchOutcome::Suggestions(suggestions) => city_search_response(
            "ok",
            suggestions.into_iter().map(CityView::from).collect(),
        ),
    }
}

/// Drops any pending city search (page unmount).
#[flutter_rust_bridge::frb(sync)]
pub fn city_search_cancel() {
    if let Some(searcher) = CITY_SEARCHER.get() {
        searcher.cancel();
    }
}

fn horoscope_view(form: &HoroscopeForm, language: Language) -> HoroscopeStateView {
    let t = Translations::for_language(language);
    let roast = form
        .roast
        .as_ref()
        .map(|roast| {
            roast_sections(roast, t)
                .into_iter()
                .map(|(label, text)| LabeledText {
                    label: label.map(str::to_string),
                    text: text.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();
    let sign_info = form
        .sign_info
        .as_ref()
        .map(|info| {
            sign_info_rows(info, t)
                .into_iter()
                .map(|(label, value)| LabeledText {
                    label: Some(label.to_string()),
                    text: value,
                })
                .collect()
        })
        .unwrap_or_default();
    let roast_heading = if form.sign.is_empty() {
        String::new()
    } else {
        format!(
            "{} {} - {}",
            display_sign_for(form, language),
            t.horoscope,
            form.period.label(t)
        )
    };

    HoroscopeStateView {
        birth_date: form.birth_date.clone(),
        sign: form.sign.clone(),
        display_sign: form.display_sign.clone(),
        period: form.period.as_str().to_string(),
        sign_options: ZodiacSign::ALL
            .into_iter()
            .map(|sign| sign.display_name(language).to_string())
            .collect(),
        period_options: Period::ALL
            .into_iter()
            .map(|period| PeriodOption {
                value: period.as_str().to_string(),
                label: period.label(t).to_string(),
            })
            .collect(),
        roast_heading,
        roast,
        sign_info,
        message: String::new(),
    }
}

fn display_sign_for(form: &HoroscopeForm, language: Language) -> String {
    ZodiacSign::from_display_name(&form.sign)
        .map(|sign| sign.display_name(language).to_string())
        .unwrap_or_else(|| form.display_sign.clone())
}

fn chart_view(form: &ChartForm, language: Language, streaming: bool) -> ChartStateView {
    let t = Translations::for_language(language);
    let (placeholder, placements, ascendant) = match &form.birth_chart {
        Some(chart) => (
            false,
            chart
                .ordered_planets()
                .into_iter()
                .map(|(planet, placement)| PlacementView {
                    planet: planet.to_string(),
                    symbol: placement.symbol.clone(),
                    sign: placement.sign.clone(),
                    degrees: format_degrees(placement.sign_degrees),
                    title: placement_title(planet, placement, language),
                    roast_text: placement_roast_text(
                        Some(&form.placement_roasts),
                        planet,
                        streaming,
                        t,
                    )
                    .to_string(),
                })
                .collect(),
            chart.ascendant.as_ref().map(ascendant_line),
        ),
        None => (
            true,
            placeholder_placements()
                .iter()
                .map(|placement| PlacementView {
                    planet: placement.name.to_string(),
                    symbol: placement.symbol.to_string(),
                    sign: placement.sign.to_string(),
                    degrees: placement.degrees.to_string(),
                    title: String::new(),
                    roast_text: String::new(),
                })
                .collect(),
            None,
        ),
    };

    ChartStateView {
        birth_date: form.birth_date.clone(),
        birth_time: form.birth_time.clone(),
        selected_city: form.selected_city.clone().map(CityView::from),
        latitude: form.latitude.clone(),
        longitude: form.longitude.clone(),
        use_city_search: form.use_city_search,
        chart_image_url: form.chart_image_url.clone(),
        placeholder,
        placements,
        ascendant,
        overall_synthesis: overall_synthesis(&form.placement_roasts).map(str::to_string),
        streaming,
        message: String::new(),
    }
}

fn city_search_response(status: &str, suggestions: Vec<CityView>) -> CitySearchResponse {
    CitySearchResponse {
        status: status.to_string(),
        suggestions,
    }
}

fn with_horoscope(
    f: impl FnOnce(&mut HoroscopeService<SqliteStateRepository<'_>>) -> Result<(), String>,
) -> ActionResponse {
    open_state_db()
        .and_then(|conn| {
            let mut service = load_horoscope(&conn)?;
            f(&mut service)
        })
        .into()
}

fn with_chart(
    f: impl FnOnce(
        &mut ChartService<SqliteStateRepository<'_>>,
    ) -> horoscope_core::RepoResult<()>,
) -> ActionResponse {
    open_state_db()
        .and_then(|conn| {
            let mut service = load_chart(&conn)?;
            f(&mut service).map_err(|err| err.to_string())
        })
        .into()
}

fn run_page_action(
    f: impl FnOnce(&Connection, &Runtime, Language) -> Result<ActionOutcome, String>,
) -> ActionResponse {
    let result = open_state_db().and_then(|conn| {
        let runtime = runtime()?;
        let language = load_language(&conn)?;
        f(&conn, runtime, language)
    });
    match result {
        Ok(outcome) => ActionResponse::from_outcome(outcome),
        Err(message) => ActionResponse::failure(message),
    }
}

fn load_horoscope(conn: &Connection) -> Result<HoroscopeService<SqliteStateRepository<'_>>, String> {
    HoroscopeService::load(SqliteStateRepository::new(conn), api_client()?)
        .map_err(|err| format!("horoscope state load failed: {err}"))
}

fn load_chart(conn: &Connection) -> Result<ChartService<SqliteStateRepository<'_>>, String> {
    ChartService::load(SqliteStateRepository::new(conn), api_client()?)
        .map_err(|err| format!("chart state load failed: {err}"))
}

fn load_language(conn: &Connection) -> Result<Language, String> {
    let stored = SqliteStateRepository::new(conn)
        .get_text(StateKey::Language)
        .map_err(|err| err.to_string())?;
    Ok(Language::from_stored(stored.as_deref()))
}

fn open_state_db() -> Result<Connection, String> {
    open_db(state_db_path()).map_err(|err| format!("state DB open failed: {err}"))
}

fn state_db_path() -> &'static PathBuf {
    STATE_DB_PATH.get_or_init(resolve_state_db_path)
}

fn api_client() -> Result<ApiClient, String> {
    API_CLIENT
        .get_or_init(|| {
            ApiClient::new(ClientConfig::from_env())
                .map_err(|err| format!("API client init failed: {err}"))
        })
        .clone()
}

fn runtime() -> Result<&'static Runtime, String> {
    RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|err| format!("async runtime init failed: {err}"))
        })
        .as_ref()
        .map_err(Clone::clone)
}

fn city_searcher() -> Result<&'static CitySearcher, String> {
    if let Some(searcher) = CITY_SEARCHER.get() {
        return Ok(searcher);
    }
    let client = api_client()?;
    Ok(CITY_SEARCHER.get_or_init(|| CitySearcher::new(client)))
}
