//! Birth-chart page.
//!
//! # Responsibility
//! - Hold birth inputs, the calculated chart, its plot URL and the streamed
//!   per-placement roasts.
//! - Drive `/birth-chart` and `/birth-chart/roast-placements`.
//!
//! # Invariants
//! - Requests are only sent for complete, validated birth details.
//! - During a roast stream the roast map is persisted after every
//!   placement, so a reload mid-stream shows the partial result.

use log::{info, warn};
use serde::Serialize;
use std::time::Instant;

use super::{epoch_millis, load_json_lenient, load_text, ActionOutcome};
use crate::client::{ApiClient, RoastProgress};
use crate::model::{
    BirthChart, BirthDetails, CitySuggestion, Language, PlacementRoasts, Translations,
};
use crate::repo::state_repo::{RepoResult, StateKey, StateRepository};

/// Persisted fields of the chart page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartForm {
    pub birth_date: String,
    pub birth_time: String,
    pub selected_city: Option<CitySuggestion>,
    /// Coordinates as entered (or copied from the selected city).
    pub latitude: String,
    pub longitude: String,
    pub use_city_search: bool,
    pub birth_chart: Option<BirthChart>,
    pub chart_image_url: String,
    pub placement_roasts: PlacementRoasts,
}

impl Default for ChartForm {
    fn default() -> Self {
        Self {
            birth_date: String::new(),
            birth_time: String::new(),
            selected_city: None,
            latitude: String::new(),
            longitude: String::new(),
            use_city_search: true,
            birth_chart: None,
            chart_image_url: String::new(),
            placement_roasts: PlacementRoasts::new(),
        }
    }
}

impl ChartForm {
    fn load<R: StateRepository>(repo: &R) -> RepoResult<Self> {
        Ok(Self {
            birth_date: load_text(repo, StateKey::ChartBirthDate)?,
            birth_time: load_text(repo, StateKey::ChartBirthTime)?,
            selected_city: load_json_lenient(repo, StateKey::ChartSelectedCity)?,
            latitude: load_text(repo, StateKey::ChartLatitude)?,
            longitude: load_text(repo, StateKey::ChartLongitude)?,
            use_city_search: load_json_lenient(repo, StateKey::ChartUseCitySearch)?
                .unwrap_or(true),
            birth_chart: load_json_lenient(repo, StateKey::ChartBirthChart)?,
            chart_image_url: load_text(repo, StateKey::ChartImageUrl)?,
            placement_roasts: load_json_lenient(repo, StateKey::ChartPlacementRoasts)?
                .unwrap_or_default(),
        })
    }

    /// Complete details, or `None` while any input is blank.
    pub fn birth_details(&self) -> Option<BirthDetails> {
        BirthDetails::from_fields(
            &self.birth_date,
            &self.birth_time,
            &self.latitude,
            &self.longitude,
        )
    }
}

/// How a placement-roast stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoastStreamSummary {
    pub roasts: PlacementRoasts,
    /// The backend sent its `complete` event.
    pub complete: bool,
    /// The stream could not be opened or broke off.
    pub failed: bool,
}

/// Streams placement roasts, calling `on_update` with the accumulated map
/// after each placement and once more on completion.
///
/// Network failures end the stream and are reported in the summary; only
/// errors returned by `on_update` propagate.
pub async fn stream_placement_roasts<F>(
    client: &ApiClient,
    details: &BirthDetails,
    language: Language,
    mut on_update: F,
) -> RepoResult<RoastStreamSummary>
where
    F: FnMut(&PlacementRoasts) -> RepoResult<()>,
{
    let started_at = Instant::now();
    let mut progress = RoastProgress::new();

    let mut stream = match client.roast_placements(details, language).await {
        Ok(stream) => stream,
        Err(err) => {
            warn!(
                "event=roast_stream module=service status=error phase=open {}",
                err.log_fields()
            );
            return Ok(RoastStreamSummary {
                roasts: progress.into_roasts(),
                complete: false,
                failed: true,
            });
        }
    };

    let mut failed = false;
    loop {
        match stream.next_event().await {
            Ok(Some(event)) => {
                if progress.apply(event) {
                    on_update(progress.roasts())?;
                }
                if progress.is_complete() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!(
                    "event=roast_stream module=service status=error phase=read placements={} {}",
                    progress.roasts().len(),
                    err.log_fields()
                );
                failed = true;
                break;
            }
        }
    }

    if !failed {
        info!(
            "event=roast_stream module=service status=ok placements={} complete={} skipped_lines={} duration_ms={}",
            progress.roasts().len(),
            progress.is_complete(),
            stream.skipped_lines(),
            started_at.elapsed().as_millis()
        );
    }
    let complete = progress.is_complete();
    Ok(RoastStreamSummary {
        roasts: progress.into_roasts(),
        complete,
        failed,
    })
}

pub struct ChartService<R: StateRepository> {
    repo: R,
    client: ApiClient,
    form: ChartForm,
    streaming: bool,
}

impl<R: StateRepository> ChartService<R> {
    /// Restores the page from the repository.
    pub fn load(repo: R, client: ApiClient) -> RepoResult<Self> {
        let form = ChartForm::load(&repo)?;
        Ok(Self {
            repo,
            client,
            form,
            streaming: false,
        })
    }

    pub fn form(&self) -> &ChartForm {
        &self.form
    }

    /// A roast stream is being read.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn birth_details(&self) -> Option<BirthDetails> {
        self.form.birth_details()
    }

    pub fn set_birth_date(&mut self, birth_date: &str) -> RepoResult<()> {
        self.repo.set_text(StateKey::ChartBirthDate, birth_date)?;
        self.form.birth_date = birth_date.to_string();
        Ok(())
    }

    pub fn set_birth_time(&mut self, birth_time: &str) -> RepoResult<()> {
        self.repo.set_text(StateKey::ChartBirthTime, birth_time)?;
        self.form.birth_time = birth_time.to_string();
        Ok(())
    }

    pub fn set_latitude(&mut self, latitude: &str) -> RepoResult<()> {
        self.repo.set_text(StateKey::ChartLatitude, latitude)?;
        self.form.latitude = latitude.to_string();
        Ok(())
    }

    pub fn set_longitude(&mut self, longitude: &str) -> RepoResult<()> {
        self.repo.set_text(StateKey::ChartLongitude, longitude)?;
        self.form.longitude = longitude.to_string();
        Ok(())
    }

    pub fn set_use_city_search(&mut self, use_city_search: bool) -> RepoResult<()> {
        self.repo
            .set_json(StateKey::ChartUseCitySearch, Some(&use_city_search))?;
        self.form.use_city_search = use_city_search;
        Ok(())
    }

    /// Stores the city and copies its coordinates into the inputs.
    pub fn select_city(&mut self, city: CitySuggestion) -> RepoResult<()> {
        self.set_latitude(&city.latitude.to_string())?;
        self.set_longitude(&city.longitude.to_string())?;
        self.repo.set_json(StateKey::ChartSelectedCity, Some(&city))?;
        self.form.selected_city = Some(city);
        Ok(())
    }

    /// Fetches the chart and its plot URL.
    ///
    /// # Contract
    /// - Incomplete inputs: `Skipped`. Invalid inputs: `Failed` with
    ///   `invalid_birth_details`, no request.
    /// - Placement roasts are cleared first.
    /// - Failure clears chart and URL.
    pub async fn calculate_chart(&mut self, language: Language) -> RepoResult<ActionOutcome> {
        let details = match self.checked_details(language) {
            Ok(details) => details,
            Err(outcome) => return Ok(outcome),
        };

        self.store_roasts(PlacementRoasts::new())?;
        self.fetch_chart(&details, language).await
    }

    /// Fetches the chart, then streams a roast for each placement.
    ///
    /// `on_progress` sees the accumulated roast map after every placement.
    /// Stream failures are logged and keep whatever arrived.
    pub async fn roast_chart<F>(
        &mut self,
        language: Language,
        mut on_progress: F,
    ) -> RepoResult<ActionOutcome>
    where
        F: FnMut(&PlacementRoasts),
    {
        let details = match self.checked_details(language) {
            Ok(details) => details,
            Err(outcome) => return Ok(outcome),
        };

        self.store_chart(None, String::new())?;
        self.store_roasts(PlacementRoasts::new())?;
        let outcome = self.fetch_chart(&details, language).await?;
        if !outcome.is_completed() {
            return Ok(outcome);
        }

        self.streaming = true;
        let repo = &self.repo;
        let roasts = &mut self.form.placement_roasts;
        let summary = stream_placement_roasts(&self.client, &details, language, |current| {
            repo.set_json(StateKey::ChartPlacementRoasts, Some(current))?;
            roasts.clone_from(current);
            on_progress(current);
            Ok(())
        })
        .await;
        self.streaming = false;
        summary?;

        Ok(ActionOutcome::Completed)
    }

    /// Adopts roasts re-streamed by the shell after a language change.
    pub fn apply_refreshed_roasts(&mut self, roasts: PlacementRoasts) {
        self.form.placement_roasts = roasts;
    }

    /// Back to an empty page. Persisted keys were removed by the shell.
    pub fn reset(&mut self) {
        self.form = ChartForm::default();
        self.streaming = false;
    }

    fn checked_details(&self, language: Language) -> Result<BirthDetails, ActionOutcome> {
        let details = self.form.birth_details().ok_or(ActionOutcome::Skipped)?;
        details.validate().map_err(|err| {
            warn!(
                "event=chart_input module=service status=error error_code={}",
                err.code()
            );
            ActionOutcome::Failed(
                Translations::for_language(language)
                    .invalid_birth_details
                    .to_string(),
            )
        })?;
        Ok(details)
    }

    async fn fetch_chart(
        &mut self,
        details: &BirthDetails,
        language: Language,
    ) -> RepoResult<ActionOutcome> {
        let fetched = match self.client.birth_chart(details).await {
            Ok(chart) => self
                .client
                .chart_plot_url(details, epoch_millis())
                .map(|url| (chart, url)),
            Err(err) => Err(err),
        };

        match fetched {
            Ok((chart, url)) => {
                info!(
                    "event=chart_calculate module=service status=ok planets={} has_ascendant={}",
                    chart.planets.len(),
                    chart.ascendant.is_some()
                );
                self.store_chart(Some(chart), url)?;
                Ok(ActionOutcome::Completed)
            }
            Err(err) => {
                warn!(
                    "event=chart_calculate module=service status=error {}",
                    err.log_fields()
                );
                self.store_chart(None, String::new())?;
                Ok(ActionOutcome::Failed(
                    Translations::for_language(language)
                        .error_calculating_chart
                        .to_string(),
                ))
            }
        }
    }

    fn store_chart(&mut self, chart: Option<BirthChart>, image_url: String) -> RepoResult<()> {
        self.repo.set_json(StateKey::ChartBirthChart, chart.as_ref())?;
        if image_url.is_empty() {
            self.repo.remove(StateKey::ChartImageUrl)?;
        } else {
            self.repo.set_text(StateKey::ChartImageUrl, &image_url)?;
        }
        self.form.birth_chart = chart;
        self.form.chart_image_url = image_url;
        Ok(())
    }

    fn store_roasts(&mut self, roasts: PlacementRoasts) -> RepoResult<()> {
        self.repo
            .set_json(StateKey::ChartPlacementRoasts, Some(&roasts))?;
        self.form.placement_roasts = roasts;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartForm, ChartService};
    use crate::client::ApiClient;
    use crate::config::ClientConfig;
    use crate::db::open_db_in_memory;
    use crate::model::{CitySuggestion, Language, PlacementRoasts, Translations};
    use crate::repo::state_repo::{SqliteStateRepository, StateKey, StateRepository};
    use crate::service::ActionOutcome;

    fn unreachable_client() -> ApiClient {
        ApiClient::new(ClientConfig::default().with_base_url("http://127.0.0.1:9")).unwrap()
    }

    fn paris() -> CitySuggestion {
        CitySuggestion {
            display_name: "Paris, Île-de-France, France".to_string(),
            latitude: 48.8566,
            longitude: 2.3522,
            city: Some("Paris".to_string()),
            state: None,
            country: Some("France".to_string()),
        }
    }

    #[test]
    fn fresh_form_prefers_city_search() {
        let conn = open_db_in_memory().unwrap();
        let service =
            ChartService::load(SqliteStateRepository::new(&conn), unreachable_client()).unwrap();
        assert_eq!(service.form(), &ChartForm::default());
        assert!(service.form().use_city_search);
    }

    #[test]
    fn select_city_copies_coordinates() {
        let conn = open_db_in_memory().unwrap();
        let mut service =
            ChartService::load(SqliteStateRepository::new(&conn), unreachable_client()).unwrap();

        service.select_city(paris()).unwrap();

        let repo = SqliteStateRepository::new(&conn);
        assert_eq!(
            repo.get_text(StateKey::ChartLatitude).unwrap().as_deref(),
            Some("48.8566")
        );
        assert_eq!(
            repo.get_text(StateKey::ChartLongitude).unwrap().as_deref(),
            Some("2.3522")
        );
        let stored: Option<CitySuggestion> = repo.get_json(StateKey::ChartSelectedCity).unwrap();
        assert_eq!(stored, Some(paris()));
    }

    #[test]
    fn inputs_survive_reload() {
        let conn = open_db_in_memory().unwrap();
        {
            let mut service =
                ChartService::load(SqliteStateRepository::new(&conn), unreachable_client())
                    .unwrap();
            service.set_birth_date("1990-06-15").unwrap();
            service.set_birth_time("12:00").unwrap();
            service.set_use_city_search(false).unwrap();
            service.set_latitude("40.7128").unwrap();
            service.set_longitude("-74.0060").unwrap();
        }

        let reloaded =
            ChartService::load(SqliteStateRepository::new(&conn), unreachable_client()).unwrap();
        let details = reloaded.birth_details().unwrap();
        assert_eq!(details.birth_time, "12:00");
        assert_eq!(details.longitude, "-74.0060");
        assert!(!reloaded.form().use_city_search);
    }

    #[tokio::test]
    async fn incomplete_inputs_skip_and_invalid_inputs_fail_without_request() {
        let conn = open_db_in_memory().unwrap();
        let mut service =
            ChartService::load(SqliteStateRepository::new(&conn), unreachable_client()).unwrap();
        service.set_birth_date("1990-06-15").unwrap();

        assert_eq!(
            service.calculate_chart(Language::English).await.unwrap(),
            ActionOutcome::Skipped
        );

        service.set_birth_time("12:00").unwrap();
        service.set_latitude("95").unwrap();
        service.set_longitude("0").unwrap();
        let outcome = service
            .roast_chart(Language::English, |_| {})
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Failed(
                Translations::for_language(Language::English)
                    .invalid_birth_details
                    .to_string()
            )
        );
    }

    #[test]
    fn reset_empties_roasts_and_restores_defaults() {
        let conn = open_db_in_memory().unwrap();
        let mut service =
            ChartService::load(SqliteStateRepository::new(&conn), unreachable_client()).unwrap();
        service.set_birth_date("1990-06-15").unwrap();
        let mut roasts = PlacementRoasts::new();
        roasts.insert("Sun".to_string(), "Loud.".to_string());
        service.apply_refreshed_roasts(roasts);

        service.reset();

        assert_eq!(service.form(), &ChartForm::default());
        assert!(!service.is_streaming());
    }
}
