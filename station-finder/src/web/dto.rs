//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregator::{Phase, StationBoard};
use crate::domain::{BusinessStatus, GeoPoint, PlaceDetail, PriceLevel};
use crate::location::AuthorizationStatus;

/// Zoom level for the initial map camera.
pub const DEFAULT_ZOOM: f32 = 14.0;

/// A position report from the client.
#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// An authorization change from the client.
#[derive(Debug, Deserialize)]
pub struct AuthorizationRequest {
    pub status: AuthorizationStatus,
}

/// A station as shown to clients.
#[derive(Debug, Serialize)]
pub struct StationView {
    /// Stable place ID
    pub place_id: String,

    /// Name as returned by the API
    pub name: Option<String>,

    /// Name with the fallback label applied
    pub display_name: String,

    pub latitude: f64,
    pub longitude: f64,

    /// `"lat,lng"`, for map deep links
    pub coordinate: String,

    /// Distance from the search origin in meters
    pub distance_meters: Option<f64>,

    pub formatted_address: Option<String>,
    pub phone_number: Option<String>,
    pub opening_hours: Option<Vec<String>>,
    pub website: Option<String>,
    pub rating: Option<f32>,
    pub price_level: Option<PriceLevel>,
    pub user_ratings_total: Option<u32>,
    pub business_status: Option<BusinessStatus>,
    pub types: Vec<String>,
}

impl StationView {
    /// Build a view, measuring distance from `origin` when known.
    pub fn from_detail(detail: &PlaceDetail, origin: Option<&GeoPoint>) -> Self {
        Self {
            place_id: detail.place_id.to_string(),
            name: detail.name.clone(),
            display_name: detail.display_name().to_string(),
            latitude: detail.coordinate.latitude(),
            longitude: detail.coordinate.longitude(),
            coordinate: detail.coordinate_string(),
            distance_meters: origin.map(|o| o.distance_to(&detail.coordinate)),
            formatted_address: detail.formatted_address.clone(),
            phone_number: detail.phone_number.clone(),
            opening_hours: detail.opening_hours.clone(),
            website: detail.website.clone(),
            rating: detail.rating,
            price_level: detail.price_level,
            user_ratings_total: detail.user_ratings_total,
            business_status: detail.business_status,
            types: detail.types.clone(),
        }
    }
}

/// The station board as shown to clients.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub generation: u64,
    pub phase: Phase,

    /// Origin of the last settled search
    pub origin: Option<GeoPoint>,

    /// Stations in the order their details arrived
    pub stations: Vec<StationView>,

    pub closest: Option<StationView>,

    /// Discovery failure message, if the last search found nothing
    pub error: Option<String>,

    /// Why no position is available, independent of `error`
    pub location_error: Option<String>,

    pub settled_at: Option<DateTime<Utc>>,
}

impl StationsResponse {
    pub fn from_board(board: &StationBoard, location_error: Option<String>) -> Self {
        let result = &board.result;
        let origin = result.origin.as_ref();

        Self {
            generation: board.generation,
            phase: board.phase.clone(),
            origin: result.origin,
            stations: result
                .stations
                .iter()
                .map(|s| StationView::from_detail(s, origin))
                .collect(),
            closest: result
                .closest
                .as_ref()
                .map(|s| StationView::from_detail(s, origin)),
            error: result.error.clone(),
            location_error,
            settled_at: result.settled_at,
        }
    }
}

/// Initial map camera.
#[derive(Debug, Serialize)]
pub struct CameraView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f32,
}

/// Settings a map client needs before it can draw.
#[derive(Debug, Serialize)]
pub struct MapConfigResponse {
    pub api_key: String,

    /// Centered on the latest fix; absent until one arrives
    pub camera: Option<CameraView>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
