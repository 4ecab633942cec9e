use serde::{Deserialize, Serialize};

use crate::CoreError;

const EARTH_RADIUS_MILES: f64 = 3958.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `true` when both coordinates are finite and within WGS84 bounds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Great-circle distance in miles between two points (haversine).
#[must_use]
pub fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}

/// Round to one decimal place.
#[must_use]
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Validate a US five-digit ZIP code, returning the trimmed value.
///
/// # Errors
///
/// Returns [`CoreError::InvalidZipCode`] unless the input is exactly five ASCII digits.
pub fn validate_zip_code(raw: &str) -> Result<String, CoreError> {
    let zip = raw.trim();
    if zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit()) {
        Ok(zip.to_string())
    } else {
        Err(CoreError::InvalidZipCode(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero_miles() {
        let p = GeoPoint::new(39.7817, -89.6501);
        assert!(haversine_miles(p, p).abs() < 1e-9);
    }

    #[test]
    fn springfield_to_chicago_is_about_180_miles() {
        let springfield = GeoPoint::new(39.7817, -89.6501);
        let chicago = GeoPoint::new(41.8781, -87.6298);
        let miles = haversine_miles(springfield, chicago);
        assert!((175.0..=190.0).contains(&miles), "got {miles}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(34.0522, -118.2437);
        let b = GeoPoint::new(36.1699, -115.1398);
        assert!((haversine_miles(a, b) - haversine_miles(b, a)).abs() < 1e-9);
    }

    #[test]
    fn round_tenth_rounds_half_away_from_zero() {
        assert!((round_tenth(3.14159) - 3.1).abs() < 1e-9);
        assert!((round_tenth(2.25) - 2.3).abs() < 1e-9);
        assert!((round_tenth(0.04) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn validates_zip_codes() {
        assert_eq!(validate_zip_code(" 62701 ").unwrap(), "62701");
        assert!(validate_zip_code("6270").is_err());
        assert!(validate_zip_code("62701-1234").is_err());
        assert!(validate_zip_code("abcde").is_err());
    }

    #[test]
    fn geo_point_bounds() {
        assert!(GeoPoint::new(45.0, -120.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
    }
}
