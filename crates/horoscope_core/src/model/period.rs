//! Horoscope period and page selectors.

use serde::{Deserialize, Serialize};

use super::translations::Translations;

/// Time window passed to the horoscope endpoint as `period=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    Daily,
    Tomorrow,
    Yesterday,
    Weekly,
    Monthly,
}

impl Period {
    /// Selector order used by the UI.
    pub const ALL: [Period; 5] = [
        Period::Daily,
        Period::Tomorrow,
        Period::Yesterday,
        Period::Weekly,
        Period::Monthly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Tomorrow => "tomorrow",
            Self::Yesterday => "yesterday",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|period| period.as_str().eq_ignore_ascii_case(trimmed))
    }

    /// Localized selector label (`Today`, `This Week`, ...).
    pub fn label(self, t: &Translations) -> &'static str {
        match self {
            Self::Daily => t.today,
            Self::Tomorrow => t.tomorrow,
            Self::Yesterday => t.yesterday,
            Self::Weekly => t.this_week,
            Self::Monthly => t.this_month,
        }
    }
}

/// Top-level views of the app shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Page {
    #[default]
    Home,
    BirthChart,
}

impl Page {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::BirthChart => "birth-chart",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "home" => Some(Self::Home),
            "birth-chart" => Some(Self::BirthChart),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, Period};
    use crate::model::{Language, Translations};

    #[test]
    fn period_wire_values_round_trip_through_parse() {
        for period in Period::ALL {
            assert_eq!(Period::parse(period.as_str()), Some(period));
        }
        assert_eq!(Period::parse("fortnightly"), None);
    }

    #[test]
    fn period_labels_follow_language() {
        let fr = Translations::for_language(Language::French);
        assert_eq!(Period::Weekly.label(fr), "Cette Semaine");
        let en = Translations::for_language(Language::English);
        assert_eq!(Period::Daily.label(en), "Today");
    }

    #[test]
    fn page_storage_values_match_shell_routes() {
        assert_eq!(Page::parse("birth-chart"), Some(Page::BirthChart));
        assert_eq!(Page::parse("home"), Some(Page::Home));
        assert_eq!(Page::parse("settings"), None);
    }
}
