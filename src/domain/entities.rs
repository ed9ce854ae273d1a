//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the favorite places domain.
//! They have no external dependencies and contain only business logic.

use crate::domain::errors::{PayloadError, ValidationError};
use crate::domain::value_objects::{non_blank, round_coordinate, CountryCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned place identifier.
pub type PlaceId = i64;

pub const DESCRIPTION_MIN_CHARS: usize = 3;
pub const DESCRIPTION_MAX_CHARS: usize = 255;

/// A favorite place as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Identifier assigned on creation, never changed afterwards
    pub id: PlaceId,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Free-form description (3-255 chars)
    pub description: String,
    /// Country code (ISO 3166-1 alpha-2)
    pub country: Option<String>,
    pub city: Option<String>,
    pub locality: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied input for create and update.
///
/// Every field is optional: absent means "not mentioned", never "clear".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceInput {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PlaceInput {
    /// Input with a description only, letting the resolver pick the location.
    pub fn description_only(description: Option<String>) -> Self {
        Self {
            latitude: None,
            longitude: None,
            description,
        }
    }

    /// Whether the input touches the place's location on either axis.
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() || self.longitude.is_some()
    }

    /// Check field bounds. Absent fields are always valid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(description) = &self.description {
            let len = description.chars().count();
            if !(DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&len) {
                return Err(ValidationError::DescriptionLength(len));
            }
        }
        if let Some(lat) = self.latitude {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(ValidationError::LatitudeOutOfRange(lat));
            }
        }
        if let Some(lon) = self.longitude {
            if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                return Err(ValidationError::LongitudeOutOfRange(lon));
            }
        }
        Ok(())
    }

    /// Validation for creation, which additionally needs a description.
    pub fn validate_for_create(&self) -> Result<(), ValidationError> {
        if self.description.is_none() {
            return Err(ValidationError::MissingDescription);
        }
        self.validate()
    }
}

/// Transient working copy of a place during one create or update call.
///
/// For updates it doubles as the partial change set: `Some` coordinates and
/// description are written, and once `enriched` is set the country, city and
/// locality are written as they are, `None` included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceDraft {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub locality: Option<String>,
    /// Set by a successful resolution; `None` enrichment fields then mean "clear"
    pub enriched: bool,
}

impl PlaceDraft {
    /// Build a draft holding only the fields present in the input.
    pub fn from_input(input: &PlaceInput) -> Self {
        Self {
            latitude: input.latitude,
            longitude: input.longitude,
            description: input.description.clone(),
            ..Self::default()
        }
    }

    /// Merge a successful resolution into the draft.
    ///
    /// Enrichment fields are always replaced, so a locality that resolves to
    /// nothing clears stale values. Coordinates only fill empty axes.
    pub fn merge_locality(&mut self, locality: ResolvedLocality) {
        self.country = locality.country_code;
        self.city = locality.city;
        self.locality = locality.locality;
        self.enriched = true;
        if self.latitude.is_none() {
            self.latitude = Some(locality.latitude);
        }
        if self.longitude.is_none() {
            self.longitude = Some(locality.longitude);
        }
    }

    /// Turn the draft into an insertable record. Requires a description.
    pub fn into_new_place(self) -> Option<NewPlace> {
        Some(NewPlace {
            latitude: self.latitude,
            longitude: self.longitude,
            description: self.description?,
            country: self.country,
            city: self.city,
            locality: self.locality,
        })
    }
}

/// Fields written when a place is inserted. Timestamps and id come from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlace {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub locality: Option<String>,
}

/// Equality filter for store reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceFilter {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub limit: Option<usize>,
}

/// Locality data resolved from coordinates by the geocoding provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocality {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub locality: Option<String>,
}

impl ResolvedLocality {
    /// Build from raw provider values, rounding coordinates and dropping blank strings.
    pub fn new(
        latitude: f64,
        longitude: f64,
        city: Option<String>,
        country_code: Option<String>,
        locality: Option<String>,
    ) -> Self {
        Self {
            latitude: round_coordinate(latitude),
            longitude: round_coordinate(longitude),
            city: non_blank(city),
            country_code: non_blank(country_code),
            locality: non_blank(locality),
        }
    }
}

/// Notification sent downstream after a place is created or updated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryCityEvent {
    /// City name, empty when unknown
    pub city: String,
    pub alpha2code: CountryCode,
}

impl CountryCityEvent {
    /// Build the event from an already merged draft.
    pub fn from_draft(place: &PlaceDraft) -> Result<Self, PayloadError> {
        let country = place.country.as_deref().ok_or(PayloadError::MissingCountry)?;
        Ok(Self {
            city: place.city.clone().unwrap_or_default(),
            alpha2code: CountryCode::parse(country)?,
        })
    }

    pub fn to_json(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(self)?)
    }
}
