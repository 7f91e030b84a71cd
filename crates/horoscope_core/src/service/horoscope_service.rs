//! Sign calculator and horoscope page.
//!
//! # Responsibility
//! - Hold the page's form and results, loaded once from the repository.
//! - Call `/calculate-sign` and `/horoscope` and store what comes back.
//!
//! # Invariants
//! - Every mutation is written through before the method returns.
//! - A failed request stores the localized error string in the result slot;
//!   it is never surfaced as an `Err`.

use log::{info, warn};
use serde::Serialize;

use super::{load_json_lenient, load_text, ActionOutcome};
use crate::client::ApiClient;
use crate::model::{
    canonical_sign_name, is_valid_birth_date, Language, Period, Roast, SignInfo, Translations,
};
use crate::repo::state_repo::{RepoResult, StateKey, StateRepository};

/// Persisted fields of the horoscope page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HoroscopeForm {
    pub birth_date: String,
    /// Identifier sent to the backend (English name).
    pub sign: String,
    /// Name as shown in the sign selector.
    pub display_sign: String,
    pub period: Period,
    pub roast: Option<Roast>,
    pub sign_info: Option<SignInfo>,
}

impl HoroscopeForm {
    fn load<R: StateRepository>(repo: &R) -> RepoResult<Self> {
        let period = repo
            .get_text(StateKey::HoroscopePeriod)?
            .and_then(|raw| Period::parse(&raw))
            .unwrap_or_default();
        Ok(Self {
            birth_date: load_text(repo, StateKey::HoroscopeBirthDate)?,
            sign: load_text(repo, StateKey::HoroscopeSign)?,
            display_sign: load_text(repo, StateKey::HoroscopeDisplaySign)?,
            period,
            roast: load_json_lenient(repo, StateKey::HoroscopeRoast)?,
            sign_info: load_json_lenient(repo, StateKey::HoroscopeSignInfo)?,
        })
    }
}

pub struct HoroscopeService<R: StateRepository> {
    repo: R,
    client: ApiClient,
    form: HoroscopeForm,
}

impl<R: StateRepository> HoroscopeService<R> {
    /// Restores the page from the repository.
    pub fn load(repo: R, client: ApiClient) -> RepoResult<Self> {
        let form = HoroscopeForm::load(&repo)?;
        Ok(Self { repo, client, form })
    }

    pub fn form(&self) -> &HoroscopeForm {
        &self.form
    }

    pub fn set_birth_date(&mut self, birth_date: &str) -> RepoResult<()> {
        self.repo.set_text(StateKey::HoroscopeBirthDate, birth_date)?;
        self.form.birth_date = birth_date.to_string();
        Ok(())
    }

    /// Stores the selector value and the backend identifier it maps to.
    pub fn select_sign(&mut self, display_name: &str) -> RepoResult<()> {
        let sign = canonical_sign_name(display_name);
        self.store_sign(&sign, display_name)
    }

    pub fn set_period(&mut self, period: Period) -> RepoResult<()> {
        self.repo.set_text(StateKey::HoroscopePeriod, period.as_str())?;
        self.form.period = period;
        Ok(())
    }

    /// Asks the backend for the sign of the stored birth date.
    ///
    /// # Contract
    /// - Empty birth date: `Skipped`, nothing stored.
    /// - Success: `zodiac_sign` becomes both sign and display sign;
    ///   sign info is replaced.
    /// - Failure (including a malformed date): the sign slot holds
    ///   `error_calculating_sign`, sign info is cleared.
    pub async fn calculate_sign(&mut self, language: Language) -> RepoResult<ActionOutcome> {
        let birth_date = self.form.birth_date.trim().to_string();
        if birth_date.is_empty() {
            return Ok(ActionOutcome::Skipped);
        }

        let result = if is_valid_birth_date(&birth_date) {
            self.client
                .calculate_sign(&birth_date)
                .await
                .map_err(|err| err.log_fields())
        } else {
            Err("error_code=invalid_input".to_string())
        };

        match result {
            Ok(calculation) => {
                info!(
                    "event=sign_calculate module=service status=ok has_sign_info={}",
                    calculation.sign_info.is_some()
                );
                self.store_sign(&calculation.zodiac_sign, &calculation.zodiac_sign)?;
                self.store_sign_info(calculation.sign_info)?;
                Ok(ActionOutcome::Completed)
            }
            Err(fields) => {
                warn!("event=sign_calculate module=service status=error {}", fields);
                let text = Translations::for_language(language).error_calculating_sign;
                self.store_sign(text, text)?;
                self.store_sign_info(None)?;
                Ok(ActionOutcome::Failed(text.to_string()))
            }
        }
    }

    /// Fetches the roast for the stored sign and period.
    ///
    /// # Contract
    /// - Empty sign: `Skipped`.
    /// - Failure stores `Roast::Text(error_fetching_roast)`.
    pub async fn fetch_roast(&mut self, language: Language) -> RepoResult<ActionOutcome> {
        let sign = self.form.sign.trim().to_string();
        if sign.is_empty() {
            return Ok(ActionOutcome::Skipped);
        }

        match self.client.horoscope(&sign, self.form.period, language).await {
            Ok(roast) => {
                self.store_roast(Some(roast))?;
                Ok(ActionOutcome::Completed)
            }
            Err(err) => {
                warn!(
                    "event=roast_fetch module=service status=error period={} {}",
                    self.form.period.as_str(),
                    err.log_fields()
                );
                let text = Translations::for_language(language).error_fetching_roast;
                self.store_roast(Some(Roast::Text(text.to_string())))?;
                Ok(ActionOutcome::Failed(text.to_string()))
            }
        }
    }

    /// Adopts a roast re-fetched by the shell after a language change.
    pub fn apply_refreshed_roast(&mut self, roast: Roast) {
        self.form.roast = Some(roast);
    }

    /// Clears everything but the birth date.
    ///
    /// The shell has already removed the persisted keys; this only drops the
    /// in-memory copy.
    pub fn reset(&mut self) {
        self.form = HoroscopeForm {
            birth_date: std::mem::take(&mut self.form.birth_date),
            ..HoroscopeForm::default()
        };
    }

    fn store_sign(&mut self, sign: &str, display_sign: &str) -> RepoResult<()> {
        self.repo.set_text(StateKey::HoroscopeSign, sign)?;
        self.repo.set_text(StateKey::HoroscopeDisplaySign, display_sign)?;
        self.form.sign = sign.to_string();
        self.form.display_sign = display_sign.to_string();
        Ok(())
    }

    fn store_sign_info(&mut self, sign_info: Option<SignInfo>) -> RepoResult<()> {
        self.repo
            .set_json(StateKey::HoroscopeSignInfo, sign_info.as_ref())?;
        self.form.sign_info = sign_info;
        Ok(())
    }

    fn store_roast(&mut self, roast: Option<Roast>) -> RepoResult<()> {
        self.repo.set_json(StateKey::HoroscopeRoast, roast.as_ref())?;
        self.form.roast = roast;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{HoroscopeForm, HoroscopeService};
    use crate::client::ApiClient;
    use crate::config::ClientConfig;
    use crate::db::open_db_in_memory;
    use crate::model::{Language, Period, Roast};
    use crate::repo::state_repo::{SqliteStateRepository, StateKey, StateRepository};
    use crate::service::ActionOutcome;

    fn unreachable_client() -> ApiClient {
        ApiClient::new(ClientConfig::default().with_base_url("http://127.0.0.1:9")).unwrap()
    }

    #[test]
    fn select_sign_persists_display_and_canonical_names() {
        let conn = open_db_in_memory().unwrap();
        let mut service =
            HoroscopeService::load(SqliteStateRepository::new(&conn), unreachable_client())
                .unwrap();

        service.select_sign("Bélier").unwrap();

        let repo = SqliteStateRepository::new(&conn);
        assert_eq!(
            repo.get_text(StateKey::HoroscopeSign).unwrap().as_deref(),
            Some("Aries")
        );
        assert_eq!(
            repo.get_text(StateKey::HoroscopeDisplaySign).unwrap().as_deref(),
            Some("Bélier")
        );
    }

    #[test]
    fn load_restores_persisted_fields_and_tolerates_bad_json() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteStateRepository::new(&conn);
        repo.set_text(StateKey::HoroscopeBirthDate, "1990-06-15").unwrap();
        repo.set_text(StateKey::HoroscopePeriod, "weekly").unwrap();
        repo.set_text(StateKey::HoroscopeSignInfo, "{not json").unwrap();
        repo.set_json(StateKey::HoroscopeRoast, Some(&Roast::Text("meh".to_string())))
            .unwrap();

        let service = HoroscopeService::load(repo, unreachable_client()).unwrap();
        let form = service.form();
        assert_eq!(form.birth_date, "1990-06-15");
        assert_eq!(form.period, Period::Weekly);
        assert_eq!(form.sign_info, None);
        assert_eq!(form.roast, Some(Roast::Text("meh".to_string())));
    }

    #[test]
    fn reset_keeps_only_birth_date() {
        let conn = open_db_in_memory().unwrap();
        let mut service =
            HoroscopeService::load(SqliteStateRepository::new(&conn), unreachable_client())
                .unwrap();
        service.set_birth_date("2000-01-01").unwrap();
        service.select_sign("Leo").unwrap();
        service.set_period(Period::Monthly).unwrap();

        service.reset();

        assert_eq!(
            service.form(),
            &HoroscopeForm {
                birth_date: "2000-01-01".to_string(),
                ..HoroscopeForm::default()
            }
        );
    }

    #[tokio::test]
    async fn empty_inputs_skip_requests() {
        let conn = open_db_in_memory().unwrap();
        let mut service =
            HoroscopeService::load(SqliteStateRepository::new(&conn), unreachable_client())
                .unwrap();

        assert_eq!(
            service.calculate_sign(Language::English).await.unwrap(),
            ActionOutcome::Skipped
        );
        assert_eq!(
            service.fetch_roast(Language::English).await.unwrap(),
            ActionOutcome::Skipped
        );
        assert_eq!(service.form().roast, None);
    }

    #[tokio::test]
    async fn malformed_birth_date_stores_localized_error_without_request() {
        let conn = open_db_in_memory().unwrap();
        let mut service =
            HoroscopeService::load(SqliteStateRepository::new(&conn), unreachable_client())
                .unwrap();
        service.set_birth_date("15/06/1990").unwrap();

        let outcome = service.calculate_sign(Language::French).await.unwrap();

        let expected = crate::model::Translations::for_language(Language::French)
            .error_calculating_sign;
        assert_eq!(outcome, ActionOutcome::Failed(expected.to_string()));
        assert_eq!(service.form().sign, expected);
        assert_eq!(service.form().sign_info, None);
    }
}
