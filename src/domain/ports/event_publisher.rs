//! Event Publisher Port

use crate::domain::errors::PublishError;

/// Fire-and-forget publisher for downstream notifications.
///
/// `publish` returns as soon as the message is handed off. Delivery happens
/// in the background and is never confirmed to the caller.
pub trait EventPublisher: Send + Sync {
    /// Publish a serialized payload to the named queue.
    fn publish(&self, queue: &str, body: String) -> Result<(), PublishError>;
}
