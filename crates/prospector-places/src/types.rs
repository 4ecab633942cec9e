//! Google Geocoding / Places web-service response types.
//!
//! Every response carries a top-level `status` string (`"OK"`,
//! `"ZERO_RESULTS"`, `"OVER_QUERY_LIMIT"`, ...). The client checks it on the
//! raw JSON before decoding into these types, so they only model the
//! success shape.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

// ---------------------------------------------------------------------------
// geocode/json
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    pub geometry: Geometry,
}

impl GeocodeResult {
    /// First component carrying `kind` among its types.
    #[must_use]
    pub fn component(&self, kind: &str) -> Option<&AddressComponent> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == kind))
    }
}

#[derive(Debug, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

// ---------------------------------------------------------------------------
// place/textsearch/json and place/nearbysearch/json
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<PlaceSummary>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One hit from a text or nearby search. Details are fetched separately.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceSummary {
    pub place_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    /// Nearby search returns a short `vicinity` instead of a full address.
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub business_status: Option<String>,
}

impl PlaceSummary {
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.formatted_address
            .as_deref()
            .or(self.vicinity.as_deref())
    }
}

// ---------------------------------------------------------------------------
// place/details/json
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DetailsResponse {
    pub result: PlaceDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    /// Provider map link.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub business_status: Option<String>,
}
