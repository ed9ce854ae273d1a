//! Log Event Publisher
//!
//! Implements EventPublisher by writing events to the log.
//! Used when no message broker is configured.

use crate::domain::errors::PublishError;
use crate::domain::ports::EventPublisher;

/// Publisher that only logs events.
#[derive(Debug, Default)]
pub struct LogEventPublisher;

impl LogEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

impl EventPublisher for LogEventPublisher {
    fn publish(&self, queue: &str, body: String) -> Result<(), PublishError> {
        tracing::info!("event for queue {}: {}", queue, body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_publish_logs_event() {
        let publisher = LogEventPublisher::new();
        assert!(publisher.publish("places_import", "{\"city\":\"\"}".to_string()).is_ok());
        assert!(logs_contain("event for queue places_import"));
    }
}
