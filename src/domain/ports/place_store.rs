//! Place Store Port
//!
//! Defines the interface for persisting places.
//! Every write commits its own transaction before returning.

use crate::domain::entities::{NewPlace, Place, PlaceDraft, PlaceFilter, PlaceId};
use crate::domain::errors::StoreError;
use async_trait::async_trait;

/// Repository for favorite places.
///
/// This is an outbound port that abstracts the storage mechanism.
/// Concurrent writes to the same row are serialized by the implementation.
#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// Get places matching the filter, ordered by identifier.
    async fn find_all(&self, filter: &PlaceFilter) -> Result<Vec<Place>, StoreError>;

    /// Get a specific place by ID.
    async fn find_by_id(&self, id: PlaceId) -> Result<Option<Place>, StoreError>;

    /// Insert a place and commit.
    ///
    /// Returns the new identifier, or None when no row was written.
    async fn create_and_commit(&self, place: &NewPlace) -> Result<Option<PlaceId>, StoreError>;

    /// Apply `changes` to the place and commit.
    ///
    /// Coordinates and description are written when `Some`. When
    /// `changes.enriched` is set, country, city and locality are all
    /// written, clearing the ones that are `None`.
    ///
    /// Returns the number of matched rows (0 when the place does not exist).
    async fn update_and_commit(&self, id: PlaceId, changes: &PlaceDraft)
        -> Result<u64, StoreError>;

    /// Delete a place and commit. Returns the number of matched rows.
    async fn delete_and_commit(&self, id: PlaceId) -> Result<u64, StoreError>;
}
