mod bigdatacloud_resolver;
mod log_publisher;
mod rabbitmq_publisher;
mod sqlite_place_store;

pub use bigdatacloud_resolver::{BigDataCloudConfig, BigDataCloudResolver};
pub use log_publisher::LogEventPublisher;
pub use rabbitmq_publisher::{RabbitMqConfig, RabbitMqHttpPublisher};
pub use sqlite_place_store::SqlitePlaceStore;
