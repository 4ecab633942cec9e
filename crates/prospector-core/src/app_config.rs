use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    /// Optional YAML rule file. The built-in rule set is used when unset.
    pub rules_path: Option<PathBuf>,
    /// Only required by commands that hit the places provider.
    pub google_maps_api_key: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub places_request_timeout_secs: u64,
    pub places_user_agent: String,
    pub places_max_retries: u32,
    pub places_retry_backoff_base_ms: u64,
    /// Delay before requesting a follow-up page; the provider rejects
    /// page tokens that are used too quickly.
    pub places_page_delay_ms: u64,
    pub places_detail_concurrency: usize,
    pub search_cache_ttl_secs: u64,
    /// `None` disables the radius cut.
    pub max_distance_miles: Option<f64>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("rules_path", &self.rules_path)
            .field("database_url", &"[redacted]")
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "places_request_timeout_secs",
                &self.places_request_timeout_secs,
            )
            .field("places_user_agent", &self.places_user_agent)
            .field("places_max_retries", &self.places_max_retries)
            .field(
                "places_retry_backoff_base_ms",
                &self.places_retry_backoff_base_ms,
            )
            .field("places_page_delay_ms", &self.places_page_delay_ms)
            .field(
                "places_detail_concurrency",
                &self.places_detail_concurrency,
            )
            .field("search_cache_ttl_secs", &self.search_cache_ttl_secs)
            .field("max_distance_miles", &self.max_distance_miles)
            .finish()
    }
}
