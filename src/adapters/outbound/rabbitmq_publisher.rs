//! RabbitMQ Event Publisher
//!
//! Implements EventPublisher over the RabbitMQ management HTTP API.
//! Messages go through the default exchange, so the routing key is the queue name.
//!
//! See: https://www.rabbitmq.com/docs/management#http-api

use crate::domain::errors::PublishError;
use crate::domain::ports::EventPublisher;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Request body for `POST /api/exchanges/{vhost}/{exchange}/publish`.
#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    properties: HashMap<String, String>,
    routing_key: &'a str,
    payload: &'a str,
    payload_encoding: &'static str,
}

/// Response from the publish endpoint.
#[derive(Debug, Deserialize)]
struct PublishResponse {
    routed: bool,
}

/// Configuration for the RabbitMQ management API.
#[derive(Debug, Clone)]
pub struct RabbitMqConfig {
    /// Base URL for the management API (e.g., "http://localhost:15672")
    pub api_url: String,
    pub username: String,
    pub password: String,
    pub vhost: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for RabbitMqConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:15672".to_string(),
            username: "guest".to_string(),
            password: "guest".to_string(),
            vhost: "/".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Fire-and-forget RabbitMQ publisher.
///
/// `publish` spawns the HTTP request on the current Tokio runtime and returns
/// immediately. Delivery failures are only logged.
pub struct RabbitMqHttpPublisher {
    config: RabbitMqConfig,
    client: reqwest::Client,
    publish_url: reqwest::Url,
}

impl RabbitMqHttpPublisher {
    /// Create a new publisher with the given configuration.
    pub fn new(config: RabbitMqConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let publish_url = Self::build_publish_url(&config)?;
        Ok(Self {
            config,
            client,
            publish_url,
        })
    }

    /// `{api_url}/api/exchanges/{vhost}/amq.default/publish`, with the vhost
    /// percent-encoded as a single path segment.
    fn build_publish_url(config: &RabbitMqConfig) -> anyhow::Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&config.api_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("RabbitMQ API URL cannot be a base: {}", config.api_url))?
            .pop_if_empty()
            .extend(["api", "exchanges", config.vhost.as_str(), "amq.default", "publish"]);
        Ok(url)
    }

    /// Send one message. Returns whether the broker routed it to a queue.
    async fn send(
        client: &reqwest::Client,
        url: reqwest::Url,
        config: &RabbitMqConfig,
        queue: &str,
        body: &str,
    ) -> anyhow::Result<bool> {
        let request = PublishRequest {
            properties: HashMap::new(),
            routing_key: queue,
            payload: body,
            payload_encoding: "string",
        };

        let response = client
            .post(url)
            .basic_auth(&config.username, Some(&config.password))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("RabbitMQ publish failed: {} - {}", status, body);
        }

        let data: PublishResponse = response.json().await?;
        Ok(data.routed)
    }
}

impl EventPublisher for RabbitMqHttpPublisher {
    fn publish(&self, queue: &str, body: String) -> Result<(), PublishError> {
        let handle =
            tokio::runtime::Handle::try_current().map_err(|_| PublishError::NoRuntime)?;

        let client = self.client.clone();
        let url = self.publish_url.clone();
        let config = self.config.clone();
        let queue = queue.to_string();

        handle.spawn(async move {
            match Self::send(&client, url, &config, &queue, &body).await {
                Ok(true) => tracing::debug!("published event to queue {}", queue),
                Ok(false) => tracing::warn!("event for queue {} was not routed", queue),
                Err(e) => tracing::warn!("failed to deliver event to queue {}: {:?}", queue, e),
            }
        });

        Ok(())
    }
}
