//! Domain model shared by services, FFI and CLI.
//!
//! # Responsibility
//! - Define the enums the UI selects from (language, sign, period, page).
//! - Define the backend response shapes persisted in local state.
//! - Hold the localized string tables shown by every front-end.
//!
//! # Invariants
//! - The backend always receives canonical identifiers (English sign names,
//!   lowercase period values, English language names).

pub mod birth;
pub mod chart;
pub mod language;
pub mod period;
pub mod sign;
pub mod translations;

pub use birth::{is_valid_birth_date, BirthDetails, BirthDetailsError};
pub use chart::{
    BirthChart, ChartPoint, CitySuggestion, PlacementRoasts, PlanetPlacement, Roast,
    RoastCategories, SignCalculation, SignInfo, OVERALL_SYNTHESIS_KEY, PLANET_ORDER,
};
pub use language::Language;
pub use period::{Page, Period};
pub use sign::{canonical_sign_name, ZodiacSign};
pub use translations::Translations;
