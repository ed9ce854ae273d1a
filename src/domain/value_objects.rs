//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use crate::domain::errors::PayloadError;
use serde::{Deserialize, Serialize};

/// Number of decimal places kept for resolved coordinates.
pub const COORDINATE_PRECISION: i32 = 4;

/// ISO 3166-1 alpha-2 country code (BR, US, FR, etc).
///
/// Always two ASCII letters, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a country code, rejecting anything that is not two letters.
    ///
    /// # Examples
    /// ```
    /// use favorite_places::domain::value_objects::CountryCode;
    ///
    /// assert_eq!(CountryCode::parse("br").unwrap().as_str(), "BR");
    /// assert!(CountryCode::parse("BRA").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PayloadError> {
        let trimmed = s.trim();
        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(PayloadError::InvalidCountry(s.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Round a coordinate to [`COORDINATE_PRECISION`] decimal places.
pub fn round_coordinate(value: f64) -> f64 {
    let factor = 10f64.powi(COORDINATE_PRECISION);
    (value * factor).round() / factor
}

/// Treat blank provider strings as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
