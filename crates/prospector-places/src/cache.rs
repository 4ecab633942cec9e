//! In-process cache of gathered candidate batches.
//!
//! Entries are keyed by search location and query-strategy fingerprint, so a
//! changed strategy never reuses stale results. Expiry is checked lazily on
//! read.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::candidates::CandidateBatch;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Search location, e.g. `zip:62701`.
    pub location: String,
    /// Fingerprint of the query strategy used to gather the batch.
    pub fingerprint: String,
}

impl CacheKey {
    #[must_use]
    pub fn new(location: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            fingerprint: fingerprint.into(),
        }
    }

    /// Key for a ZIP-driven search: location `zip:<zip>`.
    #[must_use]
    pub fn for_zip(zip_code: &str, fingerprint: impl Into<String>) -> Self {
        Self::new(format!("zip:{zip_code}"), fingerprint)
    }
}

/// Time-bounded cache of [`CandidateBatch`] values.
///
/// A zero TTL disables caching: nothing is stored.
#[derive(Debug)]
pub struct SearchCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, (Instant, CandidateBatch)>>,
}

impl SearchCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a clone of the cached batch if present and not expired.
    /// Expired entries are removed.
    pub fn get(&self, key: &CacheKey) -> Option<CandidateBatch> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some((stored_at, batch)) if stored_at.elapsed() < self.ttl => Some(batch.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: CacheKey, batch: CandidateBatch) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, (Instant::now(), batch));
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
