//! Backend response shapes that the UI persists and renders.
//!
//! # Invariants
//! - Unknown response fields are ignored on decode so backend additions do
//!   not break stored state.
//! - `Roast` keeps the backend's two shapes (plain text or categorized)
//!   without normalizing one into the other.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-planet roast text keyed by planet name.
///
/// May also carry [`OVERALL_SYNTHESIS_KEY`], rendered ahead of the planets.
pub type PlacementRoasts = BTreeMap<String, String>;

pub const OVERALL_SYNTHESIS_KEY: &str = "overall_synthesis";

/// Display order of the classical bodies in the placements grid.
pub const PLANET_ORDER: [&str; 10] = [
    "Sun", "Moon", "Mercury", "Venus", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune", "Pluto",
];

/// Descriptive data returned alongside a calculated sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub element: String,
    pub quality: String,
    pub ruler: String,
    pub dates: String,
    #[serde(default)]
    pub traits: Vec<String>,
}

/// `GET /calculate-sign/{date}` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignCalculation {
    pub zodiac_sign: String,
    pub sign_info: Option<SignInfo>,
}

/// Horoscope roast body: one paragraph, or one paragraph per life area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Roast {
    Text(String),
    Categorized(RoastCategories),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoastCategories {
    pub overall: String,
    pub love: String,
    pub work: String,
    pub social: String,
}

/// One city autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Position of one celestial body in the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPlacement {
    #[serde(default)]
    pub name: String,
    pub symbol: String,
    pub sign: String,
    pub sign_degrees: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degrees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house: Option<u8>,
}

/// Angle such as the ascendant or midheaven.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub sign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_degrees: Option<f64>,
    #[serde(default)]
    pub formatted: String,
}

/// `GET /birth-chart` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthChart {
    #[serde(default)]
    pub planets: BTreeMap<String, PlanetPlacement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascendant: Option<ChartPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midheaven: Option<ChartPoint>,
    /// Echo of the request inputs; kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_data: Option<serde_json::Value>,
}

impl BirthChart {
    /// Planets in display order: Sun through Pluto, then any other bodies
    /// alphabetically.
    pub fn ordered_planets(&self) -> Vec<(&str, &PlanetPlacement)> {
        let mut ordered = self
            .planets
            .iter()
            .map(|(name, placement)| (name.as_str(), placement))
            .collect::<Vec<_>>();
        ordered.sort_by_key(|(name, _)| {
            let rank = PLANET_ORDER
                .iter()
                .position(|known| known == name)
                .unwrap_or(PLANET_ORDER.len());
            (rank, *name)
        });
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::{BirthChart, Roast, RoastCategories, SignCalculation};

    #[test]
    fn roast_decodes_both_backend_shapes() {
        let text: Roast = serde_json::from_str(r#""Mercury is judging you.""#).unwrap();
        assert_eq!(text, Roast::Text("Mercury is judging you.".to_string()));

        let categorized: Roast = serde_json::from_str(
            r#"{"overall":"o","love":"l","work":"w","social":"s"}"#,
        )
        .unwrap();
        assert_eq!(
            categorized,
            Roast::Categorized(RoastCategories {
                overall: "o".to_string(),
                love: "l".to_string(),
                work: "w".to_string(),
                social: "s".to_string(),
            })
        );
    }

    #[test]
    fn sign_calculation_ignores_unknown_fields() {
        let decoded: SignCalculation = serde_json::from_str(
            r#"{
                "zodiac_sign": "Leo",
                "sign_info": {
                    "name": "Leo", "element": "Fire", "quality": "Fixed",
                    "ruler": "Sun", "dates": "July 23 - August 22",
                    "traits": ["Creative", "Generous"], "emoji": "lion"
                },
                "calculated_at": "2024-01-01"
            }"#,
        )
        .unwrap();
        let info = decoded.sign_info.unwrap();
        assert_eq!(info.ruler, "Sun");
        assert_eq!(info.traits, vec!["Creative", "Generous"]);
    }

    #[test]
    fn ordered_planets_puts_classical_bodies_first() {
        let chart: BirthChart = serde_json::from_str(
            r#"{"planets": {
                "Chiron": {"symbol": "⚷", "sign": "Aries", "sign_degrees": 1.0},
                "Moon": {"symbol": "☽", "sign": "Cancer", "sign_degrees": 8.7},
                "Pluto": {"symbol": "♇", "sign": "Scorpio", "sign_degrees": 11.8},
                "Sun": {"symbol": "☉", "sign": "Gemini", "sign_degrees": 24.3}
            }}"#,
        )
        .unwrap();
        let names = chart
            .ordered_planets()
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Sun", "Moon", "Pluto", "Chiron"]);
        assert!(chart.ascendant.is_none());
    }
}
