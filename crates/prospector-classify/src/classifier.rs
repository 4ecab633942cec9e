//! The classify-and-score pipeline.
//!
//! Each candidate runs through these stages in order and is dropped at the
//! first one it fails:
//!
//! 1. Identity: a blank `place_id` or name is malformed, a repeated
//!    `place_id` is a duplicate (first occurrence wins).
//! 2. Closure: permanently closed businesses.
//! 3. Franchise: brand plus corroborating signal, or a franchise-only phrase.
//! 4. Non-dealer: rental, salvage, towing, single-service shops and the like.
//! 5. Relevance: the name must carry an independent indicator or a car token.
//! 6. Distance: great-circle miles to the origin, with a ZIP-in-address
//!    fallback, then the optional radius cut.
//! 7. Scoring and priority.
//!
//! Survivors are stably sorted by descending score, then ascending distance.

use std::collections::HashSet;

use prospector_core::{
    haversine_miles, round_tenth, Priority, RawPlace, RuleSet, ScoredProspect, SearchOrigin,
};
use serde::Serialize;

use crate::scoring::score_place;
use crate::signals::{franchise_signal, indicator_signal, is_non_dealer, FranchiseSignal};

/// Why a candidate was not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    Malformed,
    Duplicate,
    Closed,
    Franchise(FranchiseSignal),
    NonDealer,
    Irrelevant,
    NoLocation,
    OutOfRange,
}

/// Per-stage tallies for one classification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterCounters {
    pub examined: usize,
    pub retained: usize,
    pub malformed: usize,
    pub duplicate: usize,
    pub closed: usize,
    pub franchise: usize,
    pub non_dealer: usize,
    pub irrelevant: usize,
    pub no_location: usize,
    pub out_of_range: usize,
}

impl FilterCounters {
    fn record(&mut self, exclusion: &Exclusion) {
        match exclusion {
            Exclusion::Malformed => self.malformed += 1,
            Exclusion::Duplicate => self.duplicate += 1,
            Exclusion::Closed => self.closed += 1,
            Exclusion::Franchise(_) => self.franchise += 1,
            Exclusion::NonDealer => self.non_dealer += 1,
            Exclusion::Irrelevant => self.irrelevant += 1,
            Exclusion::NoLocation => self.no_location += 1,
            Exclusion::OutOfRange => self.out_of_range += 1,
        }
    }

    /// Adds another run's tallies, e.g. when one search covers several ZIP codes.
    pub fn merge(&mut self, other: &FilterCounters) {
        self.examined += other.examined;
        self.retained += other.retained;
        self.malformed += other.malformed;
        self.duplicate += other.duplicate;
        self.closed += other.closed;
        self.franchise += other.franchise;
        self.non_dealer += other.non_dealer;
        self.irrelevant += other.irrelevant;
        self.no_location += other.no_location;
        self.out_of_range += other.out_of_range;
    }

    /// Sum of every exclusion bucket.
    #[must_use]
    pub fn excluded(&self) -> usize {
        self.malformed
            + self.duplicate
            + self.closed
            + self.franchise
            + self.non_dealer
            + self.irrelevant
            + self.no_location
            + self.out_of_range
    }
}

/// Output of one classification run.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Retained prospects, best first.
    pub prospects: Vec<ScoredProspect>,
    pub counters: FilterCounters,
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    rules: RuleSet,
    max_distance_miles: Option<f64>,
}

impl Classifier {
    #[must_use]
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            max_distance_miles: None,
        }
    }

    /// Exclude candidates farther than `miles` from the origin. `None` keeps all.
    #[must_use]
    pub fn with_max_distance(mut self, miles: Option<f64>) -> Self {
        self.max_distance_miles = miles;
        self
    }

    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Decide a single candidate, ignoring duplicate tracking.
    ///
    /// # Errors
    ///
    /// Returns the [`Exclusion`] stage that rejected the candidate.
    pub fn evaluate(
        &self,
        place: &RawPlace,
        origin: &SearchOrigin,
    ) -> Result<ScoredProspect, Exclusion> {
        let name = place.name.trim().to_lowercase();
        if name.is_empty() || place.place_id.trim().is_empty() {
            return Err(Exclusion::Malformed);
        }

        if place.is_permanently_closed() {
            return Err(Exclusion::Closed);
        }

        if let Some(signal) = franchise_signal(&name, &self.rules) {
            return Err(Exclusion::Franchise(signal));
        }

        if is_non_dealer(&name, &self.rules) {
            return Err(Exclusion::NonDealer);
        }

        let indicators = indicator_signal(&name, &self.rules);
        if !indicators.is_relevant() {
            return Err(Exclusion::Irrelevant);
        }

        let raw_miles = distance_from(place, origin).ok_or(Exclusion::NoLocation)?;
        if self.max_distance_miles.is_some_and(|max| raw_miles > max) {
            return Err(Exclusion::OutOfRange);
        }

        let prospect_score = score_place(place, &indicators).total();

        Ok(ScoredProspect {
            place: place.clone(),
            distance_miles: round_tenth(raw_miles),
            prospect_score,
            priority: Priority::from_score(prospect_score),
        })
    }

    /// Filter, score, and rank a batch of candidates.
    ///
    /// Never fails: every candidate is either retained or counted against
    /// the stage that excluded it.
    #[must_use]
    pub fn classify_and_score(&self, candidates: &[RawPlace], origin: &SearchOrigin) -> Classification {
        let mut counters = FilterCounters {
            examined: candidates.len(),
            ..FilterCounters::default()
        };
        let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());
        let mut prospects = Vec::new();

        for place in candidates {
            let decision = if seen.contains(place.place_id.as_str()) {
                Err(Exclusion::Duplicate)
            } else {
                self.evaluate(place, origin)
            };

            match decision {
                Ok(prospect) => {
                    seen.insert(place.place_id.as_str());
                    prospects.push(prospect);
                }
                Err(exclusion) => {
                    tracing::debug!(
                        place_id = %place.place_id,
                        name = %place.name,
                        reason = ?exclusion,
                        "candidate excluded"
                    );
                    if exclusion != Exclusion::Malformed {
                        seen.insert(place.place_id.as_str());
                    }
                    counters.record(&exclusion);
                }
            }
        }

        prospects.sort_by(|a, b| {
            b.prospect_score
                .cmp(&a.prospect_score)
                .then(a.distance_miles.total_cmp(&b.distance_miles))
        });
        counters.retained = prospects.len();

        tracing::info!(
            examined = counters.examined,
            retained = counters.retained,
            franchise = counters.franchise,
            non_dealer = counters.non_dealer,
            closed = counters.closed,
            irrelevant = counters.irrelevant,
            no_location = counters.no_location,
            out_of_range = counters.out_of_range,
            duplicate = counters.duplicate,
            malformed = counters.malformed,
            "classification complete"
        );

        Classification {
            prospects,
            counters,
        }
    }
}

/// Classify with the built-in rule set and no radius cut.
#[must_use]
pub fn classify_and_score(candidates: &[RawPlace], origin: &SearchOrigin) -> Vec<ScoredProspect> {
    Classifier::default()
        .classify_and_score(candidates, origin)
        .prospects
}

/// Unrounded miles to the origin. Without usable coordinates, a candidate
/// whose address contains the searched ZIP sits inside that ZIP (0.0).
fn distance_from(place: &RawPlace, origin: &SearchOrigin) -> Option<f64> {
    if let Some(location) = place.location.filter(prospector_core::GeoPoint::is_valid) {
        return Some(haversine_miles(origin.point, location));
    }

    let zip = origin.zip_code.as_deref()?;
    let address = place.address.as_deref()?;
    address.contains(zip).then_some(0.0)
}

#[cfg(test)]
#[path = "classifier_test.rs"]
mod tests;
