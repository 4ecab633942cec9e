//! Additive prospect scoring.

use prospector_core::RawPlace;
use serde::Serialize;

use crate::signals::IndicatorSignal;

const BASE_SCORE: u32 = 50;
const MAX_SCORE: u32 = 100;

/// Rating tiers, highest first. Only the first tier reached applies.
const RATING_TIERS: &[(f64, u32)] = &[(4.5, 20), (4.0, 15), (3.5, 10)];

/// Review-count tiers, highest first. Only the first tier reached applies.
const REVIEW_TIERS: &[(u32, u32)] = &[(100, 15), (50, 10), (20, 5)];

const WEBSITE_BONUS: u32 = 10;
const PHONE_BONUS: u32 = 10;
const INDEPENDENT_BONUS: u32 = 15;
const STRONG_INDEPENDENT_BONUS: u32 = 10;

/// Per-component points for one place. `total` is clamped, the parts are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub rating: u32,
    pub reviews: u32,
    pub website: u32,
    pub phone: u32,
    pub independent: u32,
    pub strong_independent: u32,
}

impl ScoreBreakdown {
    #[must_use]
    pub fn raw_sum(&self) -> u32 {
        self.base
            + self.rating
            + self.reviews
            + self.website
            + self.phone
            + self.independent
            + self.strong_independent
    }

    /// Final score in `[0, 100]`.
    #[must_use]
    pub fn total(&self) -> u8 {
        u8::try_from(self.raw_sum().min(MAX_SCORE)).unwrap_or(u8::MAX)
    }
}

/// Score a place given the indicators found in its name.
///
/// A zero rating is treated as unrated: no bonus, no penalty.
#[must_use]
pub fn score_place(place: &RawPlace, indicators: &IndicatorSignal) -> ScoreBreakdown {
    let rating = place
        .rating
        .filter(|r| r.is_finite() && *r > 0.0)
        .and_then(|r| RATING_TIERS.iter().find(|(min, _)| r >= *min))
        .map_or(0, |(_, points)| *points);

    let reviews = place
        .review_count
        .and_then(|n| REVIEW_TIERS.iter().find(|(min, _)| n >= *min))
        .map_or(0, |(_, points)| *points);

    ScoreBreakdown {
        base: BASE_SCORE,
        rating,
        reviews,
        website: if place.has_website() { WEBSITE_BONUS } else { 0 },
        phone: if place.has_phone() { PHONE_BONUS } else { 0 },
        independent: if indicators.independent.is_some() {
            INDEPENDENT_BONUS
        } else {
            0
        },
        strong_independent: if indicators.strong.is_some() {
            STRONG_INDEPENDENT_BONUS
        } else {
            0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators(independent: bool, strong: bool) -> IndicatorSignal {
        IndicatorSignal {
            independent: independent.then(|| "used cars".to_string()),
            strong: strong.then(|| "used cars".to_string()),
            generic: true,
        }
    }

    #[test]
    fn bare_place_scores_base() {
        let place = RawPlace::new("p1", "Car Lot");
        let score = score_place(&place, &indicators(false, false));
        assert_eq!(score.total(), 50);
    }

    #[test]
    fn fully_loaded_place_clamps_to_100() {
        let mut place = RawPlace::new("p1", "Springfield Used Cars");
        place.rating = Some(4.6);
        place.review_count = Some(120);
        place.website = Some("https://example.com".to_string());
        place.phone = Some("(217) 555-0100".to_string());
        let score = score_place(&place, &indicators(true, false));
        assert_eq!(score.raw_sum(), 120);
        assert_eq!(score.total(), 100);
    }

    #[test]
    fn rating_tiers_are_exclusive() {
        let cases = [
            (4.5, 20),
            (4.49, 15),
            (4.0, 15),
            (3.99, 10),
            (3.5, 10),
            (3.49, 0),
        ];
        for (rating, expected) in cases {
            let mut place = RawPlace::new("p1", "Car Lot");
            place.rating = Some(rating);
            assert_eq!(
                score_place(&place, &indicators(false, false)).rating,
                expected,
                "rating {rating}"
            );
        }
    }

    #[test]
    fn zero_rating_earns_nothing() {
        let mut place = RawPlace::new("p1", "Car Lot");
        place.rating = Some(0.0);
        assert_eq!(score_place(&place, &indicators(false, false)).rating, 0);
    }

    #[test]
    fn review_tiers_are_exclusive() {
        let cases = [(100, 15), (99, 10), (50, 10), (49, 5), (20, 5), (19, 0), (0, 0)];
        for (count, expected) in cases {
            let mut place = RawPlace::new("p1", "Car Lot");
            place.review_count = Some(count);
            assert_eq!(
                score_place(&place, &indicators(false, false)).reviews,
                expected,
                "reviews {count}"
            );
        }
    }

    #[test]
    fn strong_indicator_stacks_on_independent() {
        let place = RawPlace::new("p1", "Independent Auto Sales");
        let score = score_place(&place, &indicators(true, true));
        assert_eq!(score.independent, 15);
        assert_eq!(score.strong_independent, 10);
        assert_eq!(score.total(), 75);
    }
}
