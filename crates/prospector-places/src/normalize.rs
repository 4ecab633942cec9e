use prospector_core::{BusinessStatus, GeoPoint, RawPlace};

use crate::types::PlaceDetails;

/// Convert a details payload into a [`RawPlace`].
///
/// `requested_id` is used when the payload omits `place_id`. Blank strings
/// become `None`; a missing name is kept as an empty string so the
/// classifier counts it as malformed.
pub(crate) fn details_to_raw_place(requested_id: &str, details: PlaceDetails) -> RawPlace {
    RawPlace {
        place_id: non_blank(details.place_id).unwrap_or_else(|| requested_id.to_string()),
        name: details.name.map(|n| n.trim().to_string()).unwrap_or_default(),
        address: non_blank(details.formatted_address),
        phone: non_blank(details.formatted_phone_number),
        website: non_blank(details.website),
        rating: details.rating.filter(|r| r.is_finite()),
        review_count: details.user_ratings_total,
        location: details
            .geometry
            .map(|g| GeoPoint::new(g.location.lat, g.location.lng)),
        business_status: details
            .business_status
            .as_deref()
            .and_then(BusinessStatus::from_provider),
        maps_url: non_blank(details.url),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
