//! Domain errors shared by the ports and the application layer.

use thiserror::Error;

/// Persistence failure reported by a [`PlaceStore`](crate::domain::ports::PlaceStore).
///
/// Always propagated to the caller: losing a write silently is not acceptable.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("storage task failed: {0}")]
    Task(String),
}

/// Failure to hand a message to an [`EventPublisher`](crate::domain::ports::EventPublisher).
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("no async runtime available to deliver the message")]
    NoRuntime,
    #[error("publisher rejected message: {0}")]
    Rejected(String),
}

/// A notification payload could not be built from the working place.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("country code is missing")]
    MissingCountry,
    #[error("invalid country code: {0:?}")]
    InvalidCountry(String),
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Caller input rejected before reaching the orchestrator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("description is required")]
    MissingDescription,
    #[error("description must be 3-255 characters, got {0}")]
    DescriptionLength(usize),
    #[error("latitude must be within [-90, 90], got {0}")]
    LatitudeOutOfRange(f64),
    #[error("longitude must be within [-180, 180], got {0}")]
    LongitudeOutOfRange(f64),
}
