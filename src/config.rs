use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // HTTP and storage
    pub listen_addr: String,
    pub db_path: String,
    pub page_size: usize,
    pub debug: bool,

    // Reverse geocoding
    pub geo_base_url: String,
    pub geo_language: String,
    pub geo_timeout_secs: u64,

    // Event publishing (log-only when no management API is set)
    pub rabbitmq_api_url: Option<String>,
    pub rabbitmq_user: String,
    pub rabbitmq_password: String,
    pub rabbitmq_vhost: String,
    pub rabbitmq_timeout_secs: u64,
    pub queue_places_import: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            db_path: "places.db".to_string(),
            page_size: 50,
            debug: false,
            geo_base_url: "https://api.bigdatacloud.net/data/".to_string(),
            geo_language: "en".to_string(),
            geo_timeout_secs: 5,
            rabbitmq_api_url: None,
            rabbitmq_user: "guest".to_string(),
            rabbitmq_password: "guest".to_string(),
            rabbitmq_vhost: "/".to_string(),
            rabbitmq_timeout_secs: 5,
            queue_places_import: "places_import".to_string(),
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let defaults = Config::default();

    let listen_addr = std::env::var("PLACES_LISTEN_ADDR").unwrap_or(defaults.listen_addr);

    let db_path = std::env::var("PLACES_DB_PATH").unwrap_or(defaults.db_path);

    let page_size = std::env::var("PLACES_PAGE_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|size: &usize| *size > 0)
        .unwrap_or(defaults.page_size);

    let debug = std::env::var("DEBUG").is_ok();

    // Reverse geocoding
    let geo_base_url = std::env::var("PLACES_GEO_BASE_URL").unwrap_or(defaults.geo_base_url);

    let geo_language = std::env::var("PLACES_GEO_LANGUAGE").unwrap_or(defaults.geo_language);

    let geo_timeout_secs = std::env::var("PLACES_GEO_TIMEOUT_SECS")
        .unwrap_or_else(|_| "5".to_string())
        .parse()
        .unwrap_or(defaults.geo_timeout_secs);

    // Event publishing
    let rabbitmq_api_url = std::env::var("PLACES_RABBITMQ_API_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());

    let rabbitmq_user = std::env::var("PLACES_RABBITMQ_USER").unwrap_or(defaults.rabbitmq_user);

    let rabbitmq_password =
        std::env::var("PLACES_RABBITMQ_PASSWORD").unwrap_or(defaults.rabbitmq_password);

    let rabbitmq_vhost = std::env::var("PLACES_RABBITMQ_VHOST").unwrap_or(defaults.rabbitmq_vhost);

    let rabbitmq_timeout_secs = std::env::var("PLACES_RABBITMQ_TIMEOUT_SECS")
        .unwrap_or_else(|_| "5".to_string())
        .parse()
        .unwrap_or(defaults.rabbitmq_timeout_secs);

    let queue_places_import =
        std::env::var("PLACES_QUEUE_PLACES_IMPORT").unwrap_or(defaults.queue_places_import);

    Ok(Config {
        listen_addr,
        db_path,
        page_size,
        debug,
        geo_base_url,
        geo_language,
        geo_timeout_secs,
        rabbitmq_api_url,
        rabbitmq_user,
        rabbitmq_password,
        rabbitmq_vhost,
        rabbitmq_timeout_secs,
        queue_places_import,
    })
}
