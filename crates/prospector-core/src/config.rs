use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a plain
/// `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let google_maps_api_key = lookup("GOOGLE_MAPS_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());

    let env = parse_environment(&or_default("PROSPECTOR_ENV", "development"))?;
    let log_level = or_default("PROSPECTOR_LOG_LEVEL", "info");
    let rules_path = lookup("PROSPECTOR_RULES_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let db_max_connections = parse_u32("PROSPECTOR_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PROSPECTOR_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PROSPECTOR_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let places_request_timeout_secs = parse_u64("PROSPECTOR_PLACES_REQUEST_TIMEOUT_SECS", "30")?;
    let places_user_agent = or_default(
        "PROSPECTOR_PLACES_USER_AGENT",
        "prospector/0.1 (dealer-prospecting)",
    );
    let places_max_retries = parse_u32("PROSPECTOR_PLACES_MAX_RETRIES", "3")?;
    let places_retry_backoff_base_ms = parse_u64("PROSPECTOR_PLACES_RETRY_BACKOFF_BASE_MS", "1000")?;
    let places_page_delay_ms = parse_u64("PROSPECTOR_PLACES_PAGE_DELAY_MS", "2000")?;
    let places_detail_concurrency = parse_usize("PROSPECTOR_PLACES_DETAIL_CONCURRENCY", "4")?;
    if places_detail_concurrency == 0 {
        return Err(invalid(
            "PROSPECTOR_PLACES_DETAIL_CONCURRENCY",
            "must be at least 1".to_string(),
        ));
    }

    let search_cache_ttl_secs = parse_u64("PROSPECTOR_SEARCH_CACHE_TTL_SECS", "3600")?;
    let max_distance_miles = parse_max_distance(&or_default("PROSPECTOR_MAX_DISTANCE_MILES", "20"))
        .map_err(|reason| invalid("PROSPECTOR_MAX_DISTANCE_MILES", reason))?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        rules_path,
        google_maps_api_key,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        places_request_timeout_secs,
        places_user_agent,
        places_max_retries,
        places_retry_backoff_base_ms,
        places_page_delay_ms,
        places_detail_concurrency,
        search_cache_ttl_secs,
        max_distance_miles,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PROSPECTOR_ENV".to_string(),
            reason: format!("expected development, test, or production; got {other:?}"),
        }),
    }
}

/// `0` turns the radius cut off; anything else must be a positive finite number.
fn parse_max_distance(raw: &str) -> Result<Option<f64>, String> {
    let miles = raw.trim().parse::<f64>().map_err(|e| e.to_string())?;
    if !miles.is_finite() || miles < 0.0 {
        return Err(format!("expected a non-negative number of miles, got {raw:?}"));
    }
    if miles <= 0.0 {
        Ok(None)
    } else {
        Ok(Some(miles))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
