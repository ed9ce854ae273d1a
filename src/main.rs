//! Favorite Places service
//!
//! Composition root that wires the adapters into the place orchestrator.

use favorite_places::adapters::inbound::{ApiServer, ApiState};
use favorite_places::adapters::outbound::{
    BigDataCloudConfig, BigDataCloudResolver, LogEventPublisher, RabbitMqConfig,
    RabbitMqHttpPublisher, SqlitePlaceStore,
};
use favorite_places::application::PlaceOrchestrator;
use favorite_places::config::load_config;
use favorite_places::domain::ports::EventPublisher;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting favorite-places listen={} db={}",
        cfg.listen_addr,
        cfg.db_path
    );

    // ===== COMPOSITION ROOT =====

    // 1. Outbound adapters
    let store = Arc::new(SqlitePlaceStore::open(&cfg.db_path)?);

    let geo_timeout = Duration::from_secs(cfg.geo_timeout_secs);
    let resolver = Arc::new(BigDataCloudResolver::new(BigDataCloudConfig {
        base_url: cfg.geo_base_url.clone(),
        language: cfg.geo_language.clone(),
        timeout: geo_timeout,
    })?);

    let publisher: Arc<dyn EventPublisher> = match &cfg.rabbitmq_api_url {
        Some(api_url) => {
            tracing::info!("publishing events through RabbitMQ at {}", api_url);
            Arc::new(RabbitMqHttpPublisher::new(RabbitMqConfig {
                api_url: api_url.clone(),
                username: cfg.rabbitmq_user.clone(),
                password: cfg.rabbitmq_password.clone(),
                vhost: cfg.rabbitmq_vhost.clone(),
                timeout: Duration::from_secs(cfg.rabbitmq_timeout_secs),
            })?)
        }
        None => {
            tracing::info!("no RabbitMQ API configured, events will only be logged");
            Arc::new(LogEventPublisher::new())
        }
    };

    // 2. Application service
    let orchestrator = Arc::new(PlaceOrchestrator::new(
        store,
        resolver,
        publisher,
        cfg.queue_places_import.clone(),
        geo_timeout,
    ));

    // 3. Inbound adapter
    let server = ApiServer::new(cfg.listen_addr, ApiState::new(orchestrator, cfg.page_size));
    server.run().await?;

    tracing::info!("favorite-places stopped");
    Ok(())
}
