#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use horoscope_core::{ApiClient, ClientConfig};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const GOOD_DATE: &str = "1990-06-15";
/// Birth date the fake backend refuses to chart or roast.
pub const FAILING_DATE: &str = "1900-01-01";

/// Request counters per endpoint.
#[derive(Default)]
pub struct Hits {
    pub calculate_sign: AtomicUsize,
    pub horoscope: AtomicUsize,
    pub search_cities: AtomicUsize,
    pub birth_chart: AtomicUsize,
    pub roast_placements: AtomicUsize,
}

impl Hits {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub struct FakeBackend {
    pub base_url: String,
    pub hits: Arc<Hits>,
}

impl FakeBackend {
    pub fn client(&self) -> ApiClient {
        self.client_with_debounce(Duration::from_millis(150))
    }

    pub fn client_with_debounce(&self, debounce: Duration) -> ApiClient {
        let config = ClientConfig::default()
            .with_base_url(self.base_url.clone())
            .with_search_debounce(debounce);
        ApiClient::new(config).expect("client")
    }
}

/// Serves a scripted horoscope backend on an ephemeral local port.
pub async fn spawn_backend() -> FakeBackend {
    let hits = Arc::new(Hits::default());
    let app = Router::new()
        .route("/calculate-sign/{date}", get(calculate_sign))
        .route("/horoscope/{sign}", get(horoscope))
        .route("/search-cities", get(search_cities))
        .route("/birth-chart", get(birth_chart))
        .route("/birth-chart/roast-placements", get(roast_placements))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    FakeBackend {
        base_url: format!("http://{addr}"),
        hits,
    }
}

/// Base URL of a port nothing listens on.
pub fn dead_client() -> ApiClient {
    ApiClient::new(ClientConfig::default().with_base_url("http://127.0.0.1:9")).expect("client")
}

async fn calculate_sign(State(hits): State<Arc<Hits>>, Path(date): Path<String>) -> Response {
    hits.calculate_sign.fetch_add(1, Ordering::SeqCst);
    if date != GOOD_DATE {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    }
    Json(json!({
        "zodiac_sign": "Gemini",
        "sign_info": {
            "name": "Gemini",
            "element": "Air",
            "quality": "Mutable",
            "ruler": "Mercury",
            "dates": "May 21 - June 20",
            "traits": ["curious", "restless"]
        }
    }))
    .into_response()
}

async fn horoscope(
    State(hits): State<Arc<Hits>>,
    Path(sign): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    hits.horoscope.fetch_add(1, Ordering::SeqCst);
    if sign == "Broken" {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let period = params.get("period").cloned().unwrap_or_default();
    let language = params.get("language").cloned().unwrap_or_default();
    if period == "weekly" {
        return Json(json!({
            "roast": {
                "overall": format!("{sign} week ({language})"),
                "love": "love",
                "work": "work",
                "social": "social"
            }
        }))
        .into_response();
    }
    Json(json!({ "roast": format!("{sign}|{period}|{language}") })).into_response()
}

async fn search_cities(
    State(hits): State<Arc<Hits>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    hits.search_cities.fetch_add(1, Ordering::SeqCst);
    let query = params.get("query").cloned().unwrap_or_default();
    if query.contains("fail") {
        return StatusCode::BAD_GATEWAY.into_response();
    }
    let limit = params
        .get("limit")
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(5);
    let suggestions = (0..limit.min(2))
        .map(|index| {
            json!({
                "display_name": format!("{query} #{index}"),
                "latitude": 48.8566,
                "longitude": 2.3522,
                "city": query,
                "country": "France"
            })
        })
        .collect::<Vec<_>>();
    Json(json!({ "suggestions": suggestions })).into_response()
}

fn chart_json() -> serde_json::Value {
    json!({
        "planets": {
            "Moon": {"name": "Moon", "symbol": "☽", "sign": "Cancer", "sign_degrees": 8.7, "house": 11},
            "Sun": {"name": "Sun", "symbol": "☉", "sign": "Gemini", "sign_degrees": 24.28, "house": 10}
        },
        "ascendant": {"sign": "Virgo", "sign_degrees": 12.5, "formatted": "12°30'"},
        "birth_data": {"birth_date": GOOD_DATE}
    })
}

async fn birth_chart(
    State(hits): State<Arc<Hits>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    hits.birth_chart.fetch_add(1, Ordering::SeqCst);
    if params.get("birth_date").map(String::as_str) == Some(FAILING_DATE) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(chart_json()).into_response()
}

async fn roast_placements(
    State(hits): State<Arc<Hits>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    hits.roast_placements.fetch_add(1, Ordering::SeqCst);
    if params.get("birth_date").map(String::as_str) == Some(FAILING_DATE) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    let language = params.get("language").cloned().unwrap_or_default();
    let body = format!(
        concat!(
            "data: {{\"planet\": \"Sun\", \"roast\": \"Sun roast ({lang})\"}}\n\n",
            "data: not json\n\n",
            ": keep-alive\n\n",
            "data: {{\"planet\": \"Moon\", \"roast\": \"Moon roast ({lang})\"}}\n\n",
            "data: {{\"complete\": true, \"all_roasts\": {{",
            "\"Sun\": \"Sun roast ({lang})\", ",
            "\"Moon\": \"Moon roast ({lang})\", ",
            "\"overall_synthesis\": \"All of it ({lang})\"}}}}\n\n"
        ),
        lang = language
    );
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}
