//! Birth details entered on the chart page.
//!
//! # Invariants
//! - Only validated details are sent to the chart endpoints.
//! - Coordinates keep the text the user entered for persistence; parsed
//!   values are used for range checks only.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid date regex")
});
static TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time regex"));

/// Inputs shared by `/birth-chart`, `/birth-chart/plot` and
/// `/birth-chart/roast-placements`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthDetails {
    /// `YYYY-MM-DD`.
    pub birth_date: String,
    /// `HH:MM`, 24-hour clock.
    pub birth_time: String,
    pub latitude: String,
    pub longitude: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BirthDetailsError {
    InvalidDate(String),
    InvalidTime(String),
    InvalidCoordinate(String),
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl BirthDetailsError {
    /// Variant name for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDate(_) => "invalid_date",
            Self::InvalidTime(_) => "invalid_time",
            Self::InvalidCoordinate(_) => "invalid_coordinate",
            Self::LatitudeOutOfRange(_) => "latitude_out_of_range",
            Self::LongitudeOutOfRange(_) => "longitude_out_of_range",
        }
    }
}

// Messages leave the entered value out; it is birth data.
impl Display for BirthDetailsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(_) => write!(f, "birth_date must be YYYY-MM-DD"),
            Self::InvalidTime(_) => write!(f, "birth_time must be HH:MM"),
            Self::InvalidCoordinate(_) => write!(f, "coordinate is not a number"),
            Self::LatitudeOutOfRange(_) => write!(f, "latitude is outside [-90, 90]"),
            Self::LongitudeOutOfRange(_) => write!(f, "longitude is outside [-180, 180]"),
        }
    }
}

impl Error for BirthDetailsError {}

impl BirthDetails {
    /// Builds details from form fields; `None` when any field is blank.
    pub fn from_fields(
        birth_date: &str,
        birth_time: &str,
        latitude: &str,
        longitude: &str,
    ) -> Option<Self> {
        let fields = [birth_date, birth_time, latitude, longitude].map(str::trim);
        if fields.iter().any(|field| field.is_empty()) {
            return None;
        }
        let [birth_date, birth_time, latitude, longitude] = fields.map(str::to_string);
        Some(Self {
            birth_date,
            birth_time,
            latitude,
            longitude,
        })
    }

    pub fn validate(&self) -> Result<(), BirthDetailsError> {
        if !DATE_PATTERN.is_match(&self.birth_date) {
            return Err(BirthDetailsError::InvalidDate(self.birth_date.clone()));
        }
        if !TIME_PATTERN.is_match(&self.birth_time) {
            return Err(BirthDetailsError::InvalidTime(self.birth_time.clone()));
        }
        let latitude = parse_coordinate(&self.latitude)?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(BirthDetailsError::LatitudeOutOfRange(latitude));
        }
        let longitude = parse_coordinate(&self.longitude)?;
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(BirthDetailsError::LongitudeOutOfRange(longitude));
        }
        Ok(())
    }

    /// Query pairs in the order the backend documents them.
    pub fn query_pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("birth_date", self.birth_date.as_str()),
            ("birth_time", self.birth_time.as_str()),
            ("latitude", self.latitude.as_str()),
            ("longitude", self.longitude.as_str()),
        ]
    }
}

/// Checks a sign-calculator date input before it is sent.
pub fn is_valid_birth_date(value: &str) -> bool {
    DATE_PATTERN.is_match(value.trim())
}

fn parse_coordinate(value: &str) -> Result<f64, BirthDetailsError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| BirthDetailsError::InvalidCoordinate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{is_valid_birth_date, BirthDetails, BirthDetailsError};

    fn details(date: &str, time: &str, lat: &str, lon: &str) -> BirthDetails {
        BirthDetails::from_fields(date, time, lat, lon).expect("all fields present")
    }

    #[test]
    fn blank_field_yields_no_details() {
        assert!(BirthDetails::from_fields("1990-06-15", " ", "40.7", "-74.0").is_none());
    }

    #[test]
    fn validate_accepts_well_formed_details() {
        details("1990-06-15", "12:00", "40.7128", "-74.0060")
            .validate()
            .expect("valid details");
    }

    #[test]
    fn validate_rejects_bad_formats_and_ranges() {
        assert!(matches!(
            details("15/06/1990", "12:00", "0", "0").validate(),
            Err(BirthDetailsError::InvalidDate(_))
        ));
        assert!(matches!(
            details("1990-06-15", "25:00", "0", "0").validate(),
            Err(BirthDetailsError::InvalidTime(_))
        ));
        assert!(matches!(
            details("1990-06-15", "12:00", "north", "0").validate(),
            Err(BirthDetailsError::InvalidCoordinate(_))
        ));
        assert_eq!(
            details("1990-06-15", "12:00", "91", "0").validate(),
            Err(BirthDetailsError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            details("1990-06-15", "12:00", "0", "-180.5").validate(),
            Err(BirthDetailsError::LongitudeOutOfRange(-180.5))
        );
    }

    #[test]
    fn error_text_and_code_leave_input_out() {
        let error = details("1990-06-15", "12:00", "my house", "0")
            .validate()
            .unwrap_err();
        assert_eq!(error.code(), "invalid_coordinate");
        assert!(!error.to_string().contains("my house"));

        let error = details("1990-06-15", "12:00", "0", "-180.5")
            .validate()
            .unwrap_err();
        assert!(!error.to_string().contains("180.5"));
    }

    #[test]
    fn birth_date_check_trims_input() {
        assert!(is_valid_birth_date(" 2001-02-28 "));
        assert!(!is_valid_birth_date("2001-13-01"));
    }
}
