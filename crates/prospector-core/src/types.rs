//! Place and prospect records shared by the candidate source, the classifier,
//! and the CRM store.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::CoreError;

/// Score at or above which a prospect is ranked [`Priority::High`].
pub const HIGH_PRIORITY_THRESHOLD: u8 = 70;

/// Operational status reported by the places provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessStatus {
    Operational,
    ClosedTemporarily,
    ClosedPermanently,
}

impl BusinessStatus {
    /// Map the provider's `business_status` string (e.g. `"CLOSED_PERMANENTLY"`).
    ///
    /// Unknown values yield `None`, which callers treat as operating.
    #[must_use]
    pub fn from_provider(raw: &str) -> Option<Self> {
        match raw {
            "OPERATIONAL" => Some(Self::Operational),
            "CLOSED_TEMPORARILY" => Some(Self::ClosedTemporarily),
            "CLOSED_PERMANENTLY" => Some(Self::ClosedPermanently),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::ClosedTemporarily => "closed_temporarily",
            Self::ClosedPermanently => "closed_permanently",
        }
    }
}

/// One business candidate as returned by the places provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlace {
    pub place_id: String,
    pub name: String,
    /// Formatted postal address, e.g. `"123 Main St, Springfield, IL 62701, USA"`.
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    /// Provider star rating in `[0.0, 5.0]`. `0.0` means unrated.
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub location: Option<GeoPoint>,
    pub business_status: Option<BusinessStatus>,
    /// Provider map link for the place.
    pub maps_url: Option<String>,
}

impl RawPlace {
    /// Minimal record with only the identifying fields set.
    #[must_use]
    pub fn new(place_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            name: name.into(),
            address: None,
            phone: None,
            website: None,
            rating: None,
            review_count: None,
            location: None,
            business_status: None,
            maps_url: None,
        }
    }

    /// Absent status counts as operating.
    #[must_use]
    pub fn is_permanently_closed(&self) -> bool {
        self.business_status == Some(BusinessStatus::ClosedPermanently)
    }

    #[must_use]
    pub fn has_phone(&self) -> bool {
        self.phone.as_deref().is_some_and(|p| !p.trim().is_empty())
    }

    #[must_use]
    pub fn has_website(&self) -> bool {
        self.website.as_deref().is_some_and(|w| !w.trim().is_empty())
    }
}

/// The reference point a search was run around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOrigin {
    pub point: GeoPoint,
    /// Searched ZIP code, when the search was ZIP-driven. Used as the distance
    /// fallback for candidates without coordinates.
    pub zip_code: Option<String>,
}

impl SearchOrigin {
    #[must_use]
    pub fn new(point: GeoPoint) -> Self {
        Self {
            point,
            zip_code: None,
        }
    }

    #[must_use]
    pub fn with_zip_code(mut self, zip_code: impl Into<String>) -> Self {
        self.zip_code = Some(zip_code.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Standard,
    /// Only ever set by a manual CRM override, never by scoring.
    Low,
}

impl Priority {
    /// Derive the priority for a clamped prospect score.
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        if score >= HIGH_PRIORITY_THRESHOLD {
            Self::High
        } else {
            Self::Standard
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Standard => "standard",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "standard" => Ok(Self::Standard),
            "low" => Ok(Self::Low),
            _ => Err(CoreError::InvalidPriority(s.to_string())),
        }
    }
}

/// A retained, scored independent dealer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProspect {
    #[serde(flatten)]
    pub place: RawPlace,
    /// Great-circle miles from the search origin, rounded to one decimal.
    pub distance_miles: f64,
    pub prospect_score: u8,
    pub priority: Priority,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_status_maps_provider_strings() {
        assert_eq!(
            BusinessStatus::from_provider("CLOSED_PERMANENTLY"),
            Some(BusinessStatus::ClosedPermanently)
        );
        assert_eq!(
            BusinessStatus::from_provider("OPERATIONAL"),
            Some(BusinessStatus::Operational)
        );
        assert_eq!(BusinessStatus::from_provider("SOMETHING_NEW"), None);
    }

    #[test]
    fn missing_status_is_not_closed() {
        let place = RawPlace::new("p1", "Budget Auto Sales");
        assert!(!place.is_permanently_closed());
    }

    #[test]
    fn blank_contact_fields_do_not_count() {
        let mut place = RawPlace::new("p1", "Budget Auto Sales");
        place.phone = Some("  ".to_string());
        place.website = Some(String::new());
        assert!(!place.has_phone());
        assert!(!place.has_website());
    }

    #[test]
    fn priority_threshold_is_inclusive() {
        assert_eq!(Priority::from_score(70), Priority::High);
        assert_eq!(Priority::from_score(69), Priority::Standard);
        assert_eq!(Priority::from_score(100), Priority::High);
        assert_eq!(Priority::from_score(0), Priority::Standard);
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn scored_prospect_serializes_flat() {
        let prospect = ScoredProspect {
            place: RawPlace::new("p1", "Budget Auto Sales"),
            distance_miles: 2.4,
            prospect_score: 75,
            priority: Priority::High,
        };
        let json = serde_json::to_value(&prospect).unwrap();
        assert_eq!(json["place_id"], "p1");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["prospect_score"], 75);
    }
}
