//! Candidate source backed by the Google Places and Geocoding web services.
//!
//! [`PlacesClient`] wraps the individual endpoints. [`CandidateSource`] fans a
//! ZIP code out over several query variants, merges the results by
//! `place_id`, fetches per-place details, and caches whole batches.

pub mod cache;
pub mod candidates;
pub mod client;
pub mod error;
pub(crate) mod normalize;
pub(crate) mod retry;
pub mod types;

pub use cache::{CacheKey, SearchCache};
pub use candidates::{CandidateBatch, CandidateSource, GatherStats, NearbyQuery, QueryStrategy};
pub use client::{GeocodedZip, PlacesClient};
pub use error::PlacesError;
pub use types::PlaceSummary;
