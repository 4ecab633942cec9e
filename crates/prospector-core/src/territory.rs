//! Aggregates over the prospects found for one or more searched ZIP codes.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::{Priority, ScoredProspect};

/// Prospects found for one searched ZIP code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerritoryResult {
    pub zip_code: String,
    pub prospects: Vec<ScoredProspect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSummary {
    pub total: usize,
    pub high_priority: usize,
    pub with_phone: usize,
    pub with_website: usize,
    pub average_score: Option<f64>,
    /// Mean over prospects with a non-zero rating.
    pub average_rating: Option<f64>,
    /// Prospect count per searched ZIP, in search order.
    pub by_zip: Vec<(String, usize)>,
}

/// Drop prospects already seen in an earlier territory.
///
/// A dealer that turns up for several adjacent ZIP codes stays with the
/// first territory that found it. Ordering inside each territory is kept.
#[must_use]
pub fn merge_territories(territories: Vec<TerritoryResult>) -> Vec<TerritoryResult> {
    let mut seen: HashSet<String> = HashSet::new();
    territories
        .into_iter()
        .map(|territory| TerritoryResult {
            prospects: territory
                .prospects
                .into_iter()
                .filter(|p| seen.insert(p.place.place_id.clone()))
                .collect(),
            zip_code: territory.zip_code,
        })
        .collect()
}

#[must_use]
pub fn summarize_territories(territories: &[TerritoryResult]) -> SearchSummary {
    let all: Vec<&ScoredProspect> = territories.iter().flat_map(|t| &t.prospects).collect();

    let ratings: Vec<f64> = all
        .iter()
        .filter_map(|p| p.place.rating)
        .filter(|r| *r > 0.0)
        .collect();

    SearchSummary {
        total: all.len(),
        high_priority: all.iter().filter(|p| p.priority == Priority::High).count(),
        with_phone: all.iter().filter(|p| p.place.has_phone()).count(),
        with_website: all.iter().filter(|p| p.place.has_website()).count(),
        average_score: mean(all.iter().map(|p| f64::from(p.prospect_score))),
        average_rating: mean(ratings.into_iter()),
        by_zip: territories
            .iter()
            .map(|t| (t.zip_code.clone(), t.prospects.len()))
            .collect(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawPlace;

    fn prospect(id: &str, score: u8, rating: Option<f64>, phone: bool) -> ScoredProspect {
        let mut place = RawPlace::new(id, format!("{id} Auto Sales"));
        place.rating = rating;
        if phone {
            place.phone = Some("(555) 010-0000".to_string());
        }
        ScoredProspect {
            place,
            distance_miles: 1.0,
            prospect_score: score,
            priority: Priority::from_score(score),
        }
    }

    #[test]
    fn summary_of_nothing_has_no_averages() {
        let summary = summarize_territories(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.average_score.is_none());
        assert!(summary.average_rating.is_none());
    }

    #[test]
    fn summary_counts_and_averages() {
        let territories = vec![
            TerritoryResult {
                zip_code: "62701".to_string(),
                prospects: vec![
                    prospect("a", 90, Some(4.5), true),
                    prospect("b", 60, Some(0.0), false),
                ],
            },
            TerritoryResult {
                zip_code: "62702".to_string(),
                prospects: vec![prospect("c", 75, Some(3.5), true)],
            },
        ];
        let summary = summarize_territories(&territories);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.high_priority, 2);
        assert_eq!(summary.with_phone, 2);
        assert_eq!(summary.with_website, 0);
        assert!((summary.average_score.unwrap() - 75.0).abs() < 1e-9);
        // zero rating is excluded from the mean
        assert!((summary.average_rating.unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(
            summary.by_zip,
            vec![("62701".to_string(), 2), ("62702".to_string(), 1)]
        );
    }

    #[test]
    fn merge_keeps_first_territory_for_shared_dealers() {
        let merged = merge_territories(vec![
            TerritoryResult {
                zip_code: "62701".to_string(),
                prospects: vec![prospect("a", 90, None, false), prospect("b", 80, None, false)],
            },
            TerritoryResult {
                zip_code: "62702".to_string(),
                prospects: vec![prospect("b", 80, None, false), prospect("c", 70, None, false)],
            },
        ]);
        let ids: Vec<Vec<&str>> = merged
            .iter()
            .map(|t| t.prospects.iter().map(|p| p.place.place_id.as_str()).collect())
            .collect();
        assert_eq!(ids, vec![vec!["a", "b"], vec!["c"]]);
    }
}
