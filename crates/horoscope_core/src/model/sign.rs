//! Zodiac signs and their localized display names.
//!
//! # Invariants
//! - The backend only ever receives the canonical English name.
//! - A display name from any supported language resolves to exactly one sign.

use serde::{Deserialize, Serialize};

use super::language::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    /// Zodiac order, as listed in the sign selector.
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Identifier sent to `/horoscope/{sign}`.
    pub fn canonical_name(self) -> &'static str {
        self.display_name(Language::English)
    }

    pub fn display_name(self, language: Language) -> &'static str {
        let names = match language {
            Language::English => &ENGLISH_NAMES,
            Language::French => &FRENCH_NAMES,
            Language::Russian => &RUSSIAN_NAMES,
        };
        names[self.index()]
    }

    /// Resolves a name shown in any supported language to its sign.
    ///
    /// Exact matches win; otherwise a case-insensitive match is accepted so
    /// that lowercase backend identifiers (`"aries"`) also resolve.
    pub fn from_display_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }

        find_sign(|candidate| candidate == trimmed).or_else(|| {
            let lowered = trimmed.to_lowercase();
            find_sign(|candidate| candidate.to_lowercase() == lowered)
        })
    }

    fn index(self) -> usize {
        self as usize
    }
}

fn find_sign(matches: impl Fn(&str) -> bool) -> Option<ZodiacSign> {
    Language::ALL.into_iter().find_map(|language| {
        ZodiacSign::ALL
            .into_iter()
            .find(|sign| matches(sign.display_name(language)))
    })
}

/// Maps a displayed sign name to the identifier the backend expects.
///
/// Unknown names pass through unchanged so that free-form input still
/// reaches the backend, which owns the final validation.
pub fn canonical_sign_name(display_name: &str) -> String {
    ZodiacSign::from_display_name(display_name)
        .map(|sign| sign.canonical_name().to_string())
        .unwrap_or_else(|| display_name.to_string())
}

const ENGLISH_NAMES: [&str; 12] = [
    "Aries",
    "Taurus",
    "Gemini",
    "Cancer",
    "Leo",
    "Virgo",
    "Libra",
    "Scorpio",
    "Sagittarius",
    "Capricorn",
    "Aquarius",
    "Pisces",
];

const FRENCH_NAMES: [&str; 12] = [
    "Bélier",
    "Taureau",
    "Gémeaux",
    "Cancer",
    "Lion",
    "Vierge",
    "Balance",
    "Scorpion",
    "Sagittaire",
    "Capricorne",
    "Verseau",
    "Poissons",
];

const RUSSIAN_NAMES: [&str; 12] = [
    "Овен",
    "Телец",
    "Близнецы",
    "Рак",
    "Лев",
    "Дева",
    "Весы",
    "Скорпион",
    "Стрелец",
    "Козерог",
    "Водолей",
    "Рыбы",
];
