//! BigDataCloud Location Resolver
//!
//! Implements LocationResolver using the BigDataCloud reverse-geocoding API.
//!
//! See: https://www.bigdatacloud.com/docs/api/free-reverse-geocode-to-city-api

use crate::domain::entities::ResolvedLocality;
use crate::domain::ports::LocationResolver;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const REVERSE_GEOCODE_ENDPOINT: &str = "reverse-geocode-client";

/// Response from the reverse-geocode endpoint (only the fields we use).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReverseGeocodeResponse {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    locality: Option<String>,
}

impl From<ReverseGeocodeResponse> for ResolvedLocality {
    fn from(r: ReverseGeocodeResponse) -> Self {
        ResolvedLocality::new(r.latitude, r.longitude, r.city, r.country_code, r.locality)
    }
}

/// Configuration for the BigDataCloud client.
#[derive(Debug, Clone)]
pub struct BigDataCloudConfig {
    /// Base URL for the API (e.g., "https://api.bigdatacloud.net/data/")
    pub base_url: String,
    /// Language for locality names
    pub language: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for BigDataCloudConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bigdatacloud.net/data/".to_string(),
            language: "en".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// BigDataCloud reverse-geocoding resolver.
///
/// Without coordinates the provider falls back to the caller's network
/// location, which is what auto-located places rely on.
pub struct BigDataCloudResolver {
    config: BigDataCloudConfig,
    client: reqwest::Client,
}

impl BigDataCloudResolver {
    /// Create a new resolver with the given configuration.
    pub fn new(config: BigDataCloudConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            REVERSE_GEOCODE_ENDPOINT
        )
    }

    /// Query the reverse-geocode endpoint.
    ///
    /// Returns Ok(None) for any non-200 status.
    async fn fetch(
        &self,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> anyhow::Result<Option<ResolvedLocality>> {
        let mut query = vec![("localityLanguage", self.config.language.clone())];
        if let Some(lat) = latitude {
            query.push(("latitude", lat.to_string()));
        }
        if let Some(lon) = longitude {
            query.push(("longitude", lon.to_string()));
        }

        let response = self
            .client
            .get(self.endpoint_url())
            .query(&query)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            tracing::warn!("reverse geocode returned status {}", response.status());
            return Ok(None);
        }

        let data: ReverseGeocodeResponse = response.json().await?;
        Ok(Some(data.into()))
    }
}

#[async_trait]
impl LocationResolver for BigDataCloudResolver {
    async fn resolve(
        &self,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Option<ResolvedLocality> {
        match self.fetch(latitude, longitude).await {
            Ok(locality) => locality,
            Err(e) => {
                tracing::warn!("reverse geocode request failed: {:?}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver_for(server: &MockServer) -> BigDataCloudResolver {
        BigDataCloudResolver::new(BigDataCloudConfig {
            base_url: server.uri(),
            language: "en".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = BigDataCloudConfig::default();
        assert_eq!(config.base_url, "https://api.bigdatacloud.net/data/");
        assert_eq!(config.language, "en");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_endpoint_url_handles_trailing_slash() {
        let resolver = BigDataCloudResolver::new(BigDataCloudConfig::default()).unwrap();
        assert_eq!(
            resolver.endpoint_url(),
            "https://api.bigdatacloud.net/data/reverse-geocode-client"
        );

        let resolver = BigDataCloudResolver::new(BigDataCloudConfig {
            base_url: "http://localhost:9000".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            resolver.endpoint_url(),
            "http://localhost:9000/reverse-geocode-client"
        );
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse-geocode-client"))
            .and(query_param("localityLanguage", "en"))
            .and(query_param("latitude", "12.3456"))
            .and(query_param("longitude", "23.4567"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 12.345_649,
                "longitude": 23.456_71,
                "city": "City",
                "countryCode": "AA",
                "locality": "Location"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let locality = resolver_for(&mock_server)
            .resolve(Some(12.3456), Some(23.4567))
            .await
            .unwrap();

        assert_eq!(locality.latitude, 12.3456);
        assert_eq!(locality.longitude, 23.4567);
        assert_eq!(locality.city.as_deref(), Some("City"));
        assert_eq!(locality.country_code.as_deref(), Some("AA"));
        assert_eq!(locality.locality.as_deref(), Some("Location"));
    }

    #[tokio::test]
    async fn test_resolve_without_coordinates_omits_params() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse-geocode-client"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 1.0,
                "longitude": 2.0,
                "city": "",
                "countryCode": "BB",
                "locality": ""
            })))
            .mount(&mock_server)
            .await;

        let locality = resolver_for(&mock_server).resolve(None, None).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let query = requests[0].url.query().unwrap_or_default().to_string();
        assert!(!query.contains("latitude"));
        assert!(!query.contains("longitude"));

        assert_eq!(locality.city, None);
        assert_eq!(locality.locality, None);
        assert_eq!(locality.country_code.as_deref(), Some("BB"));
    }

    #[tokio::test]
    async fn test_resolve_single_axis() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse-geocode-client"))
            .and(query_param("latitude", "-22.9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": -22.9,
                "longitude": -43.2
            })))
            .mount(&mock_server)
            .await;

        let locality = resolver_for(&mock_server)
            .resolve(Some(-22.9), None)
            .await
            .unwrap();

        assert_eq!(locality.longitude, -43.2);
        assert_eq!(locality.city, None);
        assert_eq!(locality.country_code, None);
    }

    #[tokio::test]
    async fn test_resolve_non_ok_status_is_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse-geocode-client"))
            .respond_with(ResponseTemplate::new(402).set_body_string("Payment Required"))
            .mount(&mock_server)
            .await;

        let result = resolver_for(&mock_server).resolve(Some(1.0), Some(2.0)).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_resolve_malformed_body_is_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse-geocode-client"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let result = resolver_for(&mock_server).resolve(Some(1.0), Some(2.0)).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_resolve_slow_provider_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse-geocode-client"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(serde_json::json!({"latitude": 1.0, "longitude": 2.0})),
            )
            .mount(&mock_server)
            .await;

        let resolver = BigDataCloudResolver::new(BigDataCloudConfig {
            base_url: mock_server.uri(),
            language: "en".to_string(),
            timeout: Duration::from_millis(100),
        })
        .unwrap();

        assert!(resolver.resolve(Some(1.0), Some(2.0)).await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_connection_refused_is_unavailable() {
        let resolver = BigDataCloudResolver::new(BigDataCloudConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            language: "en".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        assert!(resolver.resolve(Some(1.0), Some(2.0)).await.is_none());
    }
}
