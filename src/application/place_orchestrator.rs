//! Place Orchestrator - Main application use case
//!
//! Orchestrates the place workflows: enriching places with locality data,
//! persisting them, and notifying downstream consumers.
//! This is the primary interface for the inbound adapter.

use crate::domain::entities::{
    CountryCityEvent, Place, PlaceDraft, PlaceFilter, PlaceId, PlaceInput,
};
use crate::domain::errors::StoreError;
use crate::domain::ports::{EventPublisher, LocationResolver, PlaceStore};
use std::sync::Arc;
use std::time::Duration;

/// Place orchestrator - main application use case.
///
/// Each create or update runs strictly in order:
/// 1. Resolves locality data for the input coordinates (best-effort)
/// 2. Merges it into the working place
/// 3. Persists the result in a single transaction
/// 4. Publishes a country/city notification (best-effort)
///
/// The orchestrator keeps no state between calls.
pub struct PlaceOrchestrator {
    store: Arc<dyn PlaceStore>,
    resolver: Arc<dyn LocationResolver>,
    publisher: Arc<dyn EventPublisher>,
    queue_name: String,
    resolve_timeout: Duration,
}

impl PlaceOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        store: Arc<dyn PlaceStore>,
        resolver: Arc<dyn LocationResolver>,
        publisher: Arc<dyn EventPublisher>,
        queue_name: impl Into<String>,
        resolve_timeout: Duration,
    ) -> Self {
        Self {
            store,
            resolver,
            publisher,
            queue_name: queue_name.into(),
            resolve_timeout,
        }
    }

    /// Get all places in store order.
    pub async fn list_all(&self) -> Result<Vec<Place>, StoreError> {
        self.store.find_all(&PlaceFilter::default()).await
    }

    /// Get a place by ID. A missing place is `None`, not an error.
    pub async fn get_by_id(&self, id: PlaceId) -> Result<Option<Place>, StoreError> {
        self.store.find_by_id(id).await
    }

    /// Enrich the working place with locality data for the input coordinates.
    ///
    /// On success the enrichment fields are replaced and coordinates fill the
    /// axes the working place lacks. On failure or timeout the place is
    /// returned unchanged.
    pub async fn enrich_location(&self, mut place: PlaceDraft, input: &PlaceInput) -> PlaceDraft {
        let lookup = self.resolver.resolve(input.latitude, input.longitude);
        match tokio::time::timeout(self.resolve_timeout, lookup).await {
            Ok(Some(locality)) => {
                tracing::debug!(
                    "resolved locality country={:?} city={:?}",
                    locality.country_code,
                    locality.city
                );
                place.merge_locality(locality);
            }
            Ok(None) => {
                tracing::debug!("location unavailable, keeping place unchanged");
            }
            Err(_) => {
                tracing::warn!(
                    "location lookup timed out after {:?}, keeping place unchanged",
                    self.resolve_timeout
                );
            }
        }
        place
    }

    /// Create a place from the input.
    ///
    /// Location is always resolved, so missing coordinates are filled in by
    /// the provider. Returns the new ID, or `None` if nothing was written.
    pub async fn create(&self, input: &PlaceInput) -> Result<Option<PlaceId>, StoreError> {
        if input.description.is_none() {
            tracing::warn!("refusing to create place without description");
            return Ok(None);
        }

        let place = self
            .enrich_location(PlaceDraft::from_input(input), input)
            .await;

        let Some(new_place) = place.clone().into_new_place() else {
            return Ok(None);
        };
        let Some(id) = self.store.create_and_commit(&new_place).await? else {
            tracing::warn!("store reported no row written for new place");
            return Ok(None);
        };

        tracing::info!("created place {}", id);
        self.publish_notification(&place);

        Ok(Some(id))
    }

    /// Create a place whose location is determined entirely by the resolver.
    pub async fn create_auto(
        &self,
        description: Option<String>,
    ) -> Result<Option<PlaceId>, StoreError> {
        self.create(&PlaceInput::description_only(description)).await
    }

    /// Update a place with the fields present in the input.
    ///
    /// Location is re-resolved only when the input carries a coordinate.
    /// Returns the number of matched rows; 0 means the place does not exist.
    pub async fn update(&self, id: PlaceId, input: &PlaceInput) -> Result<u64, StoreError> {
        let mut place = PlaceDraft::from_input(input);
        if input.has_coordinates() {
            place = self.enrich_location(place, input).await;
        } else {
            tracing::debug!("no coordinate change for place {}, skipping lookup", id);
        }

        let matched = self.store.update_and_commit(id, &place).await?;
        if matched == 0 {
            tracing::debug!("place {} not found for update", id);
            return Ok(0);
        }

        tracing::info!("updated place {}", id);
        self.publish_notification(&place);

        Ok(matched)
    }

    /// Delete a place. Returns the number of matched rows. Never notifies.
    pub async fn delete(&self, id: PlaceId) -> Result<u64, StoreError> {
        let matched = self.store.delete_and_commit(id).await?;
        if matched > 0 {
            tracing::info!("deleted place {}", id);
        }
        Ok(matched)
    }

    /// Publish the country/city event for a merged place.
    ///
    /// Failures are logged and dropped; they never affect the write and are
    /// not retried.
    fn publish_notification(&self, place: &PlaceDraft) {
        let body = match CountryCityEvent::from_draft(place).and_then(|event| event.to_json()) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    "the message was not well-formed during publishing event: {}",
                    e
                );
                return;
            }
        };

        if let Err(e) = self.publisher.publish(&self.queue_name, body) {
            tracing::warn!(
                "failed to publish event to queue {}: {}",
                self.queue_name,
                e
            );
        }
    }

    /// Get the queue notifications are published to.
    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }
}
