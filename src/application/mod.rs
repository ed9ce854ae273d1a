//! Application Layer
//!
//! Use cases composing the domain ports.

mod place_orchestrator;

pub use place_orchestrator::PlaceOrchestrator;
