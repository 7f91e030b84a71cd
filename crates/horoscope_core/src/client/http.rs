use log::{info, warn};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::VecDeque;
use std::time::Instant;

use super::error::ApiError;
use super::stream::{RoastEvent, RoastStreamDecoder};
use crate::config::ClientConfig;
use crate::model::{
    BirthChart, BirthDetails, CitySuggestion, Language, Period, Roast, SignCalculation,
};

/// Backend endpoints; `name` is the path as written in logs and errors.
#[derive(Debug, Clone, Copy)]
struct Endpoint {
    name: &'static str,
    segments: &'static [&'static str],
}

const CALCULATE_SIGN: Endpoint = Endpoint {
    name: "calculate-sign",
    segments: &["calculate-sign"],
};
const HOROSCOPE: Endpoint = Endpoint {
    name: "horoscope",
    segments: &["horoscope"],
};
const SEARCH_CITIES: Endpoint = Endpoint {
    name: "search-cities",
    segments: &["search-cities"],
};
const BIRTH_CHART: Endpoint = Endpoint {
    name: "birth-chart",
    segments: &["birth-chart"],
};
const BIRTH_CHART_PLOT: Endpoint = Endpoint {
    name: "birth-chart/plot",
    segments: &["birth-chart", "plot"],
};
const ROAST_PLACEMENTS: Endpoint = Endpoint {
    name: "birth-chart/roast-placements",
    segments: &["birth-chart", "roast-placements"],
};

#[derive(Deserialize)]
struct HoroscopeResponse {
    roast: Roast,
}

#[derive(Deserialize)]
struct CitySearchResponse {
    #[serde(default)]
    suggestions: Vec<CitySuggestion>,
}

/// Async client for the horoscope backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: "client",
                source,
            })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET /calculate-sign/{date}`.
    pub async fn calculate_sign(&self, birth_date: &str) -> Result<SignCalculation, ApiError> {
        let url = self.endpoint_url(CALCULATE_SIGN, Some(birth_date.trim()))?;
        let response = self.send(CALCULATE_SIGN, url).await?;
        decode_json(CALCULATE_SIGN, response).await
    }

    /// `GET /horoscope/{sign}?period&language`, returning the `roast` field.
    pub async fn horoscope(
        &self,
        sign: &str,
        period: Period,
        language: Language,
    ) -> Result<Roast, ApiError> {
        let mut url = self.endpoint_url(HOROSCOPE, Some(sign.trim()))?;
        url.query_pairs_mut()
            .append_pair("period", period.as_str())
            .append_pair("language", language.as_str());
        let response = self.send(HOROSCOPE, url).await?;
        let body: HoroscopeResponse = decode_json(HOROSCOPE, response).await?;
        Ok(body.roast)
    }

    /// `GET /search-cities?query&limit`.
    pub async fn search_cities(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CitySuggestion>, ApiError> {
        let mut url = self.endpoint_url(SEARCH_CITIES, None)?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("limit", &limit.to_string());
        let response = self.send(SEARCH_CITIES, url).await?;
        let body: CitySearchResponse = decode_json(SEARCH_CITIES, response).await?;
        Ok(body.suggestions)
    }

    /// `GET /birth-chart?birth_date&birth_time&latitude&longitude`.
    pub async fn birth_chart(&self, details: &BirthDetails) -> Result<BirthChart, ApiError> {
        let url = self.birth_details_url(BIRTH_CHART, details)?;
        let response = self.send(BIRTH_CHART, url).await?;
        decode_json(BIRTH_CHART, response).await
    }

    /// URL of the chart wheel image; `cache_bust_ms` becomes the `t=`
    /// parameter so a recalculated chart is not served from cache.
    pub fn chart_plot_url(
        &self,
        details: &BirthDetails,
        cache_bust_ms: u128,
    ) -> Result<String, ApiError> {
        let mut url = self.birth_details_url(BIRTH_CHART_PLOT, details)?;
        url.query_pairs_mut()
            .append_pair("t", &cache_bust_ms.to_string());
        Ok(url.into())
    }

    /// `GET /birth-chart/roast-placements?...&language`, streamed.
    pub async fn roast_placements(
        &self,
        details: &BirthDetails,
        language: Language,
    ) -> Result<RoastStream, ApiError> {
        let mut url = self.birth_details_url(ROAST_PLACEMENTS, details)?;
        url.query_pairs_mut()
            .append_pair("language", language.as_str());
        let response = self.send(ROAST_PLACEMENTS, url).await?;
        Ok(RoastStream {
            response,
            decoder: RoastStreamDecoder::new(),
            buffered: VecDeque::new(),
            finished: false,
        })
    }

    /// Endpoint URL with an optional trailing user value as one
    /// percent-encoded path segment.
    fn endpoint_url(&self, endpoint: Endpoint, value: Option<&str>) -> Result<Url, ApiError> {
        if value.is_some_and(str::is_empty) {
            return Err(ApiError::InvalidInput(format!(
                "{} requires a path value",
                endpoint.name
            )));
        }

        let mut url = Url::parse(&self.config.base_url).map_err(|err| {
            ApiError::InvalidInput(format!("base url `{}`: {err}", self.config.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::InvalidInput(format!(
                    "base url `{}` cannot carry a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(endpoint.segments)
            .extend(value);
        Ok(url)
    }

    fn birth_details_url(
        &self,
        endpoint: Endpoint,
        details: &BirthDetails,
    ) -> Result<Url, ApiError> {
        details
            .validate()
            .map_err(|err| ApiError::InvalidInput(err.to_string()))?;
        let mut url = self.endpoint_url(endpoint, None)?;
        url.query_pairs_mut().extend_pairs(details.query_pairs());
        Ok(url)
    }

    async fn send(&self, endpoint: Endpoint, url: Url) -> Result<Response, ApiError> {
        let endpoint = endpoint.name;
        let started_at = Instant::now();
        let response = self.http.get(url).send().await.map_err(|source| {
            warn!(
                "event=api_request module=client status=error endpoint={} duration_ms={} error_code=transport",
                endpoint,
                started_at.elapsed().as_millis()
            );
            ApiError::Transport {
                endpoint,
                source: source.without_url(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "event=api_request module=client status=error endpoint={} http_status={} duration_ms={}",
                endpoint,
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        info!(
            "event=api_request module=client status=ok endpoint={} http_status={} duration_ms={}",
            endpoint,
            status.as_u16(),
            started_at.elapsed().as_millis()
        );
        Ok(response)
    }
}

async fn decode_json<T: DeserializeOwned>(
    endpoint: Endpoint,
    response: Response,
) -> Result<T, ApiError> {
    let endpoint = endpoint.name;
    let bytes = response
        .bytes()
        .await
        .map_err(|source| ApiError::Transport {
            endpoint,
            source: source.without_url(),
        })?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode {
        endpoint,
        message: err.to_string(),
    })
}

/// Open roast-placements response, yielding events as chunks arrive.
pub struct RoastStream {
    response: Response,
    decoder: RoastStreamDecoder,
    buffered: VecDeque<RoastEvent>,
    finished: bool,
}

impl RoastStream {
    /// Next decoded event, or `None` once the body is exhausted.
    pub async fn next_event(&mut self) -> Result<Option<RoastEvent>, ApiError> {
        loop {
            if let Some(event) = self.buffered.pop_front() {
                return Ok(Some(event));
            }
            if self.finished {
                return Ok(None);
            }

            let chunk = self
                .response
                .chunk()
                .await
                .map_err(|source| ApiError::Transport {
                    endpoint: ROAST_PLACEMENTS.name,
                    source: source.without_url(),
                })?;
            match chunk {
                Some(bytes) => self.buffered.extend(self.decoder.feed(&bytes)),
                None => {
                    self.finished = true;
                    self.buffered.extend(self.decoder.finish());
                }
            }
        }
    }

    /// Lines that were dropped as undecodable so far.
    pub fn skipped_lines(&self) -> usize {
        self.decoder.skipped_lines()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiClient;
    use crate::config::ClientConfig;
    use crate::model::BirthDetails;

    fn unreachable_client() -> ApiClient {
        ApiClient::new(ClientConfig::default().with_base_url("http://127.0.0.1:9")).unwrap()
    }

    #[tokio::test]
    async fn transport_errors_do_not_echo_user_input() {
        let client = unreachable_client();

        let sign_error = client.calculate_sign("1987-03-14").await.unwrap_err();
        assert_eq!(sign_error.code(), "transport");
        assert!(!sign_error.to_string().contains("1987-03-14"));

        let details = BirthDetails::from_fields("1987-03-14", "04:05", "51.5072", "-0.1276").unwrap();
        let chart_error = client.birth_chart(&details).await.unwrap_err();
        let text = chart_error.to_string();
        assert!(!text.contains("1987-03-14"));
        assert!(!text.contains("51.5072"));

        let search_error = client.search_cities("Secret Village", 5).await.unwrap_err();
        let text = search_error.to_string();
        assert!(!text.contains("Secret"));
        assert!(!text.contains("127.0.0.1"));
    }

    #[tokio::test]
    async fn invalid_details_error_omits_the_entered_value() {
        let details = BirthDetails::from_fields("1987-03-14", "04:05", "my house", "0").unwrap();
        let error = unreachable_client().birth_chart(&details).await.unwrap_err();

        assert_eq!(error.code(), "invalid_input");
        assert!(!error.to_string().contains("my house"));
    }
}
