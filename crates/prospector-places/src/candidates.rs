//! Candidate gathering: turns a ZIP code (or a clicked map point) into a
//! de-duplicated list of [`RawPlace`] records ready for classification.
//!
//! A search runs every query in the [`QueryStrategy`] around the geocoded ZIP
//! center, merges the hits in first-seen order, then fetches details for each
//! unique place with bounded concurrency. Individual query or detail failures
//! are logged and skipped.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use prospector_core::{validate_zip_code, GeoPoint, RawPlace, SearchOrigin};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::cache::{CacheKey, SearchCache};
use crate::client::{GeocodedZip, PlacesClient};
use crate::error::PlacesError;
use crate::types::PlaceSummary;

/// A radius search around the ZIP center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NearbyQuery {
    pub radius_meters: u32,
    pub place_type: String,
}

/// The set of queries run for each ZIP code.
///
/// Templates use `{zip}`, `{city}` and `{state}` placeholders. City templates
/// are skipped when the geocoder returns no locality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryStrategy {
    pub zip_templates: Vec<String>,
    pub nearby: Vec<NearbyQuery>,
    pub city_templates: Vec<String>,
}

impl Default for QueryStrategy {
    fn default() -> Self {
        Self {
            zip_templates: [
                "used car dealer {zip}",
                "used cars {zip}",
                "auto sales {zip}",
                "car dealer {zip}",
                "car lot {zip}",
                "independent auto {zip}",
                "car dealers in {zip}",
                "auto dealers near {zip}",
            ]
            .iter()
            .map(|t| (*t).to_string())
            .collect(),
            nearby: [12_000, 20_000]
                .into_iter()
                .map(|radius_meters| NearbyQuery {
                    radius_meters,
                    place_type: "car_dealer".to_string(),
                })
                .collect(),
            city_templates: vec![
                "used cars {city} {state}".to_string(),
                "car dealers {city} {state}".to_string(),
            ],
        }
    }
}

impl QueryStrategy {
    /// Stable hex digest of the strategy, used in cache keys.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let encoded = serde_json::to_vec(self).unwrap_or_default();
        format!("{:x}", Sha256::digest(&encoded))
    }

    /// Expands the text templates for one geocoded ZIP.
    #[must_use]
    pub fn text_queries(&self, geocoded: &GeocodedZip) -> Vec<String> {
        let mut queries: Vec<String> = self
            .zip_templates
            .iter()
            .map(|t| t.replace("{zip}", &geocoded.zip_code))
            .collect();

        if let (Some(city), Some(state)) = (&geocoded.city, &geocoded.state) {
            queries.extend(self.city_templates.iter().map(|t| {
                t.replace("{city}", city)
                    .replace("{state}", state)
                    .replace("{zip}", &geocoded.zip_code)
            }));
        }
        queries
    }
}

/// Counters describing how a batch was gathered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GatherStats {
    pub queries_run: usize,
    pub failed_queries: usize,
    pub unique_candidates: usize,
    pub details_fetched: usize,
    pub failed_details: usize,
    pub from_cache: bool,
}

/// Detailed candidates for one search origin.
#[derive(Debug, Clone)]
pub struct CandidateBatch {
    pub origin: SearchOrigin,
    pub candidates: Vec<RawPlace>,
    pub stats: GatherStats,
}

/// Gathers candidates through a [`PlacesClient`], caching whole batches.
#[derive(Debug)]
pub struct CandidateSource {
    client: PlacesClient,
    strategy: QueryStrategy,
    fingerprint: String,
    detail_concurrency: usize,
    cache: SearchCache,
}

impl CandidateSource {
    #[must_use]
    pub fn new(
        client: PlacesClient,
        strategy: QueryStrategy,
        detail_concurrency: usize,
        cache_ttl: Duration,
    ) -> Self {
        let fingerprint = strategy.fingerprint();
        Self {
            client,
            strategy,
            fingerprint,
            detail_concurrency: detail_concurrency.max(1),
            cache: SearchCache::new(cache_ttl),
        }
    }

    #[must_use]
    pub fn strategy(&self) -> &QueryStrategy {
        &self.strategy
    }

    #[must_use]
    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Gathers detailed candidates around a US ZIP code.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::InvalidInput`] if `zip_code` is not five digits.
    /// - [`PlacesError::GeocodeFailed`] or provider errors from geocoding.
    /// - The last query error if every search query failed.
    pub async fn gather_for_zip(&self, zip_code: &str) -> Result<CandidateBatch, PlacesError> {
        let zip = validate_zip_code(zip_code)?;
        let key = CacheKey::for_zip(&zip, self.fingerprint.clone());
        if let Some(mut cached) = self.cache.get(&key) {
            tracing::debug!(zip = %zip, "search cache hit");
            cached.stats.from_cache = true;
            return Ok(cached);
        }

        let geocoded = self.client.geocode_zip(&zip).await?;
        let mut stats = GatherStats::default();
        let summaries = self.run_queries(&geocoded, &mut stats).await?;

        let ids = unique_place_ids(&summaries);
        stats.unique_candidates = ids.len();

        let candidates = self.fetch_details(ids, &mut stats).await;

        tracing::info!(
            zip = %zip,
            queries = stats.queries_run,
            failed_queries = stats.failed_queries,
            unique = stats.unique_candidates,
            detailed = stats.details_fetched,
            failed_details = stats.failed_details,
            "gathered candidates"
        );

        let batch = CandidateBatch {
            origin: SearchOrigin::new(geocoded.point).with_zip_code(zip),
            candidates,
            stats,
        };
        self.cache.insert(key, batch.clone());
        Ok(batch)
    }

    /// Gathers candidates for a clicked map point by reverse-geocoding it to a
    /// US ZIP code and searching that ZIP.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::InvalidCoordinates`] if the point is out of range.
    /// - [`PlacesError::NoPostalCode`] if no US ZIP covers the point.
    /// - Anything [`CandidateSource::gather_for_zip`] returns.
    pub async fn gather_for_point(&self, lat: f64, lng: f64) -> Result<CandidateBatch, PlacesError> {
        let point = GeoPoint::new(lat, lng);
        if !point.is_valid() {
            return Err(PlacesError::InvalidCoordinates { lat, lng });
        }
        let zip = self
            .client
            .reverse_geocode_zip(point)
            .await?
            .ok_or(PlacesError::NoPostalCode { lat, lng })?;
        tracing::info!(lat, lng, zip = %zip, "resolved map point to ZIP");
        self.gather_for_zip(&zip).await
    }

    async fn run_queries(
        &self,
        geocoded: &GeocodedZip,
        stats: &mut GatherStats,
    ) -> Result<Vec<PlaceSummary>, PlacesError> {
        let mut summaries = Vec::new();
        let mut last_error = None;

        for query in self.strategy.text_queries(geocoded) {
            stats.queries_run += 1;
            match self.client.text_search(&query).await {
                Ok(hits) => summaries.extend(hits),
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "text search failed, skipping");
                    stats.failed_queries += 1;
                    last_error = Some(e);
                }
            }
        }

        for nearby in &self.strategy.nearby {
            stats.queries_run += 1;
            match self
                .client
                .nearby_search(geocoded.point, nearby.radius_meters, &nearby.place_type)
                .await
            {
                Ok(hits) => summaries.extend(hits),
                Err(e) => {
                    tracing::warn!(
                        radius_meters = nearby.radius_meters,
                        error = %e,
                        "nearby search failed, skipping"
                    );
                    stats.failed_queries += 1;
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if stats.failed_queries == stats.queries_run => Err(e),
            _ => Ok(summaries),
        }
    }

    async fn fetch_details(&self, ids: Vec<String>, stats: &mut GatherStats) -> Vec<RawPlace> {
        let client = &self.client;
        let results: Vec<(String, Result<RawPlace, PlacesError>)> = stream::iter(ids)
            .map(|id| async move {
                let result = client.place_details(&id).await;
                (id, result)
            })
            .buffered(self.detail_concurrency)
            .collect()
            .await;

        let mut candidates = Vec::with_capacity(results.len());
        for (id, result) in results {
            match result {
                Ok(place) => {
                    stats.details_fetched += 1;
                    candidates.push(place);
                }
                Err(e) => {
                    tracing::warn!(place_id = %id, error = %e, "place details failed, skipping");
                    stats.failed_details += 1;
                }
            }
        }
        candidates
    }
}

/// Place ids in first-seen order, without duplicates or blanks.
fn unique_place_ids(summaries: &[PlaceSummary]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    summaries
        .iter()
        .map(|s| s.place_id.trim())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .map(str::to_string)
        .collect()
}
