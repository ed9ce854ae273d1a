//! Location Resolver Port
//!
//! Defines the interface for resolving coordinates to locality data.

use crate::domain::entities::ResolvedLocality;
use async_trait::async_trait;

/// Resolver for coordinates to country, city and locality.
///
/// This is an outbound port that abstracts the reverse-geocoding provider.
/// Either axis may be absent; providers are expected to cope with that
/// (e.g. by falling back to the caller's network location).
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Resolve coordinates to locality data.
    ///
    /// Returns None on any transport error or non-success response.
    /// Never fails loudly: enrichment is best-effort.
    async fn resolve(&self, latitude: Option<f64>, longitude: Option<f64>)
        -> Option<ResolvedLocality>;
}
