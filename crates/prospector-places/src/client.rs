//! HTTP client for the Google Geocoding and Places web services.
//!
//! Wraps `reqwest` with API-key handling, provider status checking, retry on
//! transient failures, and `next_page_token` pagination.

use std::time::Duration;

use prospector_core::{GeoPoint, RawPlace};
use reqwest::{Client, StatusCode, Url};

use crate::error::PlacesError;
use crate::normalize::details_to_raw_place;
use crate::retry::retry_with_backoff;
use crate::types::{DetailsResponse, GeocodeResponse, PlaceSummary, SearchPage};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;
const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(2);
/// The provider never returns more than three pages (60 results) per query.
const DEFAULT_MAX_PAGES: usize = 3;

const GEOCODE: &str = "geocode/json";
const TEXT_SEARCH: &str = "place/textsearch/json";
const NEARBY_SEARCH: &str = "place/nearbysearch/json";
const DETAILS: &str = "place/details/json";

const DETAIL_FIELDS: &str = "place_id,name,formatted_address,formatted_phone_number,website,\
                             rating,user_ratings_total,url,geometry,business_status";

/// Geocoded center of a ZIP code plus the locality it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedZip {
    pub zip_code: String,
    pub point: GeoPoint,
    pub formatted_address: Option<String>,
    pub city: Option<String>,
    /// Two-letter state code.
    pub state: Option<String>,
}

/// Client for the Google Geocoding and Places APIs.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
    page_delay: Duration,
    max_pages: usize,
}

impl PlacesClient {
    /// Creates a new client pointed at the production Google Maps API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`PlacesError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so endpoint paths join under it.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|_| PlacesError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            page_delay: DEFAULT_PAGE_DELAY,
            max_pages: DEFAULT_MAX_PAGES,
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Delay before each follow-up page request.
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Geocodes a US ZIP code to its center point, city, and state.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::GeocodeFailed`] if the provider returns no result.
    /// - [`PlacesError::ApiStatus`] / [`PlacesError::RateLimited`] for provider errors.
    /// - [`PlacesError::Http`] on network failure.
    pub async fn geocode_zip(&self, zip_code: &str) -> Result<GeocodedZip, PlacesError> {
        let body = self
            .get_json(GEOCODE, &[("address", zip_code), ("components", "country:US")])
            .await?;
        let response: GeocodeResponse = decode(GEOCODE, body)?;

        let result = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| PlacesError::GeocodeFailed(zip_code.to_string()))?;

        let city = result
            .component("locality")
            .or_else(|| result.component("postal_town"))
            .or_else(|| result.component("sublocality"))
            .map(|c| c.long_name.clone());
        let state = result
            .component("administrative_area_level_1")
            .map(|c| c.short_name.clone());

        Ok(GeocodedZip {
            zip_code: zip_code.to_string(),
            point: GeoPoint::new(result.geometry.location.lat, result.geometry.location.lng),
            formatted_address: result.formatted_address.clone(),
            city,
            state,
        })
    }

    /// Reverse-geocodes a point to the first US postal code found.
    ///
    /// Returns `Ok(None)` when the point has no US postal code (open water,
    /// outside the US).
    ///
    /// # Errors
    ///
    /// Returns provider or network errors as for [`PlacesClient::geocode_zip`].
    pub async fn reverse_geocode_zip(&self, point: GeoPoint) -> Result<Option<String>, PlacesError> {
        let latlng = format!("{},{}", point.lat, point.lng);
        let body = self.get_json(GEOCODE, &[("latlng", &latlng)]).await?;
        let response: GeocodeResponse = decode(GEOCODE, body)?;

        let zip = response.results.iter().find_map(|result| {
            let in_us = result
                .component("country")
                .is_some_and(|c| c.short_name == "US");
            let postal = result.component("postal_code")?;
            in_us.then(|| postal.short_name.clone())
        });

        Ok(zip)
    }

    /// Runs a free-text place search, following up to the page limit.
    ///
    /// # Errors
    ///
    /// Returns an error only if the first page fails; a failing follow-up
    /// page ends pagination with the results gathered so far.
    pub async fn text_search(&self, query: &str) -> Result<Vec<PlaceSummary>, PlacesError> {
        self.paged_search(TEXT_SEARCH, &[("query", query)]).await
    }

    /// Runs a radius search around `point` for one place type.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::text_search`].
    pub async fn nearby_search(
        &self,
        point: GeoPoint,
        radius_meters: u32,
        place_type: &str,
    ) -> Result<Vec<PlaceSummary>, PlacesError> {
        let location = format!("{},{}", point.lat, point.lng);
        let radius = radius_meters.to_string();
        self.paged_search(
            NEARBY_SEARCH,
            &[("location", &location), ("radius", &radius), ("type", place_type)],
        )
        .await
    }

    /// Fetches full details for one place.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::NotFound`] if the place no longer exists.
    /// - [`PlacesError::Deserialize`] if the response has no `result`.
    /// - Provider or network errors as for [`PlacesClient::geocode_zip`].
    pub async fn place_details(&self, place_id: &str) -> Result<RawPlace, PlacesError> {
        let body = self
            .get_json(DETAILS, &[("place_id", place_id), ("fields", DETAIL_FIELDS)])
            .await?;
        let response: DetailsResponse = decode(DETAILS, body)?;
        Ok(details_to_raw_place(place_id, response.result))
    }

    async fn paged_search(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<PlaceSummary>, PlacesError> {
        let mut results = Vec::new();
        let mut body = self.get_json(endpoint, params).await?;
        let mut pages = 1usize;

        loop {
            let page: SearchPage = decode(endpoint, body)?;
            results.extend(page.results);

            let Some(token) = page.next_page_token.filter(|t| !t.is_empty()) else {
                break;
            };
            if pages >= self.max_pages {
                break;
            }

            // Page tokens only become valid a short while after they are issued.
            tokio::time::sleep(self.page_delay).await;
            body = match self.get_json(endpoint, &[("pagetoken", &token)]).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(
                        endpoint,
                        page = pages + 1,
                        error = %e,
                        "follow-up page failed, keeping earlier pages"
                    );
                    break;
                }
            };
            pages += 1;
        }

        Ok(results)
    }

    /// Builds the request URL for `endpoint` with the API key and `extra`
    /// parameters percent-encoded.
    fn build_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|_| PlacesError::InvalidBaseUrl(self.base_url.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// GET with retry, returning the JSON body once its provider status is OK.
    async fn get_json(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, PlacesError> {
        let url = self.build_url(endpoint, params)?;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_once(endpoint, &url)
        })
        .await
    }

    async fn request_once(
        &self,
        endpoint: &str,
        url: &Url,
    ) -> Result<serde_json::Value, PlacesError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(without_key)?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PlacesError::RateLimited {
                endpoint: endpoint.to_string(),
            });
        }
        if !status.is_success() {
            // The URL carries the API key, so only the endpoint is reported.
            return Err(PlacesError::UnexpectedStatus {
                status: status.as_u16(),
                url: endpoint.to_string(),
            });
        }

        let body = response.text().await.map_err(without_key)?;
        let json: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                context: endpoint.to_string(),
                source: e,
            })?;
        check_status(endpoint, &json)?;
        Ok(json)
    }
}

/// Strips the request URL, and with it the `key` query parameter, from a
/// transport error before it reaches logs or callers.
fn without_key(err: reqwest::Error) -> PlacesError {
    PlacesError::Http(err.without_url())
}

/// Maps the provider's top-level `status` field to an error when it is not
/// `OK` or `ZERO_RESULTS`.
fn check_status(endpoint: &str, body: &serde_json::Value) -> Result<(), PlacesError> {
    let status = body
        .get("status")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("MISSING_STATUS");

    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "OVER_QUERY_LIMIT" => Err(PlacesError::RateLimited {
            endpoint: endpoint.to_string(),
        }),
        "NOT_FOUND" => Err(PlacesError::NotFound {
            endpoint: endpoint.to_string(),
        }),
        other => Err(PlacesError::ApiStatus {
            endpoint: endpoint.to_string(),
            status: other.to_string(),
            message: body
                .get("error_message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    endpoint: &str,
    body: serde_json::Value,
) -> Result<T, PlacesError> {
    serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
        context: endpoint.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> PlacesClient {
        PlacesClient::with_base_url("test-key", 30, "prospector-test/0.1", base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_joins_endpoint_and_appends_key_last() {
        let client = test_client("https://maps.googleapis.com/maps/api");
        let url = client.build_url(GEOCODE, &[("address", "62701")]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.googleapis.com/maps/api/geocode/json?address=62701&key=test-key"
        );
    }

    #[test]
    fn build_url_encodes_special_characters() {
        let client = test_client("https://maps.googleapis.com/maps/api/");
        let url = client
            .build_url(TEXT_SEARCH, &[("query", "used cars & trucks 62701")])
            .unwrap();
        assert!(
            url.as_str().contains("used+cars+%26+trucks+62701"),
            "query param should be percent-encoded: {url}"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = PlacesClient::with_base_url("k", 30, "ua", "not a url");
        assert!(matches!(result, Err(PlacesError::InvalidBaseUrl(_))));
    }

    #[test]
    fn check_status_accepts_ok_and_zero_results() {
        assert!(check_status(GEOCODE, &serde_json::json!({"status": "OK"})).is_ok());
        assert!(check_status(GEOCODE, &serde_json::json!({"status": "ZERO_RESULTS"})).is_ok());
    }

    #[test]
    fn check_status_maps_provider_errors() {
        assert!(matches!(
            check_status(GEOCODE, &serde_json::json!({"status": "OVER_QUERY_LIMIT"})),
            Err(PlacesError::RateLimited { .. })
        ));
        assert!(matches!(
            check_status(DETAILS, &serde_json::json!({"status": "NOT_FOUND"})),
            Err(PlacesError::NotFound { .. })
        ));
        let denied = check_status(
            GEOCODE,
            &serde_json::json!({"status": "REQUEST_DENIED", "error_message": "bad key"}),
        );
        assert!(matches!(
            denied,
            Err(PlacesError::ApiStatus { ref status, ref message, .. })
                if status == "REQUEST_DENIED" && message == "bad key"
        ));
    }

    #[test]
    fn check_status_rejects_missing_status() {
        assert!(matches!(
            check_status(GEOCODE, &serde_json::json!({})),
            Err(PlacesError::ApiStatus { ref status, .. }) if status == "MISSING_STATUS"
        ));
    }
}
