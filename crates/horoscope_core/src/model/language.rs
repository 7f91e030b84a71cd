//! UI language selection.

use serde::{Deserialize, Serialize};

/// Languages the UI and the roast backend support.
///
/// The wire value (sent as `language=`) is the English language name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    French,
    Russian,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::French, Language::Russian];

    /// Value stored in local state and sent to the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::French => "French",
            Self::Russian => "Russian",
        }
    }

    /// Label shown in the language selector, in the language itself.
    pub fn native_label(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::French => "Français",
            Self::Russian => "Русский",
        }
    }

    /// Parses a stored or user-entered language name.
    ///
    /// Accepts the wire value, the native label, or a two-letter code.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL.into_iter().find(|language| {
            language.as_str().eq_ignore_ascii_case(trimmed)
                || language.native_label().to_lowercase() == trimmed.to_lowercase()
                || language.code().eq_ignore_ascii_case(trimmed)
        })
    }

    /// Parses a persisted value, falling back to English for unknown input.
    pub fn from_stored(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_default()
    }

    fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
            Self::Russian => "ru",
        }
    }
}
