mod event_publisher;
mod location_resolver;
mod place_store;

pub use event_publisher::EventPublisher;
pub use location_resolver::LocationResolver;
pub use place_store::PlaceStore;
