use prospector_core::CoreError;
use thiserror::Error;

/// Errors returned by the places client and candidate source.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP 429 or `OVER_QUERY_LIMIT`.
    #[error("rate limited by places provider on {endpoint}")]
    RateLimited { endpoint: String },

    /// The provider answered `NOT_FOUND` for a place or address.
    #[error("not found: {endpoint}")]
    NotFound { endpoint: String },

    /// Any other non-OK provider status, e.g. `REQUEST_DENIED`.
    #[error("places API returned {status} for {endpoint}: {message}")]
    ApiStatus {
        endpoint: String,
        status: String,
        message: String,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("could not geocode {0}")]
    GeocodeFailed(String),

    /// Reverse geocoding found no US postal code at the clicked point.
    #[error("no US postal code found at ({lat}, {lng})")]
    NoPostalCode { lat: f64, lng: f64 },

    #[error("coordinates out of range: ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error(transparent)]
    InvalidInput(#[from] CoreError),
}
