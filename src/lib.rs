//! Favorite Places Library
//!
//! Exposes the places service components for integration tests
//! and as a library.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::PlaceOrchestrator;
pub use config::load_config;
pub use domain::entities::{CountryCityEvent, Place, PlaceId, PlaceInput, ResolvedLocality};
pub use domain::ports::{EventPublisher, LocationResolver, PlaceStore};
pub use domain::value_objects::CountryCode;
