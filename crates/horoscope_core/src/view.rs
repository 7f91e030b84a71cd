//! Presentation helpers shared by the Flutter shell and the CLI.
//!
//! Pure string formatting over model types; no I/O.

use crate::model::{
    ChartPoint, Language, PlacementRoasts, PlanetPlacement, Roast, SignInfo, Translations,
    OVERALL_SYNTHESIS_KEY,
};

/// Chart-less placement shown before the first calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderPlacement {
    pub symbol: &'static str,
    pub name: &'static str,
    pub sign: &'static str,
    pub degrees: &'static str,
}

const PLACEHOLDER_PLACEMENTS: [PlaceholderPlacement; 10] = [
    placeholder("☉", "Sun", "Gemini", "24.3°"),
    placeholder("☽", "Moon", "Cancer", "8.7°"),
    placeholder("☿", "Mercury", "Gemini", "15.2°"),
    placeholder("♀", "Venus", "Taurus", "12.8°"),
    placeholder("♂", "Mars", "Leo", "3.4°"),
    placeholder("♃", "Jupiter", "Cancer", "22.1°"),
    placeholder("♄", "Saturn", "Capricorn", "18.9°"),
    placeholder("♅", "Uranus", "Capricorn", "7.6°"),
    placeholder("♆", "Neptune", "Capricorn", "14.2°"),
    placeholder("♇", "Pluto", "Scorpio", "11.8°"),
];

const fn placeholder(
    symbol: &'static str,
    name: &'static str,
    sign: &'static str,
    degrees: &'static str,
) -> PlaceholderPlacement {
    PlaceholderPlacement {
        symbol,
        name,
        sign,
        degrees,
    }
}

pub fn placeholder_placements() -> &'static [PlaceholderPlacement] {
    &PLACEHOLDER_PLACEMENTS
}

/// `24.3°`
pub fn format_degrees(sign_degrees: f64) -> String {
    format!("{sign_degrees:.1}°")
}

/// Roast heading for one placement, e.g. `Sun in Gemini (10th House)`.
///
/// The ordinal suffix is English-only. A placement without a house omits the
/// parenthesized part.
pub fn placement_title(
    planet: &str,
    placement: &PlanetPlacement,
    language: Language,
) -> String {
    let t = Translations::for_language(language);
    let name = if placement.name.is_empty() {
        planet
    } else {
        placement.name.as_str()
    };
    let mut title = format!("{name} {} {}", t.in_sign, placement.sign);
    if let Some(house) = placement.house {
        let suffix = if language == Language::English { "th" } else { "" };
        title.push_str(&format!(" ({house}{suffix} {})", t.house));
    }
    title
}

/// `Leo - 12°34'`
pub fn ascendant_line(ascendant: &ChartPoint) -> String {
    format!("{} - {}", ascendant.sign, ascendant.formatted)
}

/// Text under a placement heading.
pub fn placement_roast_text<'a>(
    roasts: Option<&'a PlacementRoasts>,
    planet: &str,
    streaming: bool,
    t: &'a Translations,
) -> &'a str {
    match roasts.and_then(|map| map.get(planet)).filter(|roast| !roast.is_empty()) {
        Some(roast) => roast.as_str(),
        None if streaming => t.generating_roast,
        None => t.waiting_for_roast,
    }
}

pub fn overall_synthesis(roasts: &PlacementRoasts) -> Option<&str> {
    roasts
        .get(OVERALL_SYNTHESIS_KEY)
        .map(String::as_str)
        .filter(|text| !text.is_empty())
}

/// `(label, text)` sections of a horoscope roast; plain text has no label.
pub fn roast_sections<'a>(roast: &'a Roast, t: &'a Translations) -> Vec<(Option<&'a str>, &'a str)> {
    match roast {
        Roast::Text(text) => vec![(None, text.as_str())],
        Roast::Categorized(categories) => vec![
            (Some(t.overall), categories.overall.as_str()),
            (Some(t.love), categories.love.as_str()),
            (Some(t.work), categories.work.as_str()),
            (Some(t.social), categories.social.as_str()),
        ],
    }
}

/// `(label, value)` rows of the sign details card.
pub fn sign_info_rows<'a>(info: &'a SignInfo, t: &'a Translations) -> Vec<(&'a str, String)> {
    vec![
        (t.element, info.element.clone()),
        (t.quality, info.quality.clone()),
        (t.ruler, info.ruler.clone()),
        (t.dates, info.dates.clone()),
        (t.traits, info.traits.join(", ")),
    ]
}
