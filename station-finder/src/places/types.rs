//! Places API request and response DTOs.
//!
//! These types map directly to the Places API (New) JSON bodies. The API
//! omits fields rather than sending nulls, so almost everything is optional.

use serde::{Deserialize, Serialize};

/// Body of a `places:autocomplete` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteRequest {
    /// Free-text query, e.g. "gas station".
    pub input: String,

    /// Results must fall inside this area.
    pub location_restriction: LocationRestriction,

    /// Primary type tags to restrict predictions to.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included_primary_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationRestriction {
    pub rectangle: Rectangle,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rectangle {
    pub low: LatLng,
    pub high: LatLng,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// Response from `places:autocomplete`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteResponse {
    /// Absent entirely when nothing matched.
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Query predictions have no place prediction and are skipped.
    pub place_prediction: Option<PlacePrediction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacePrediction {
    pub place_id: String,
    pub text: Option<FormattableText>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormattableText {
    pub text: String,
}

/// Response from `GET places/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResponse {
    pub id: String,
    pub display_name: Option<LocalizedText>,
    pub location: Option<LatLng>,
    pub formatted_address: Option<String>,
    pub national_phone_number: Option<String>,
    pub international_phone_number: Option<String>,
    pub regular_opening_hours: Option<OpeningHours>,
    pub website_uri: Option<String>,
    pub rating: Option<f32>,
    /// e.g. `PRICE_LEVEL_MODERATE`.
    pub price_level: Option<String>,
    pub user_rating_count: Option<u32>,
    /// e.g. `OPERATIONAL`.
    pub business_status: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    pub text: String,
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_descriptions: Vec<String>,
}
