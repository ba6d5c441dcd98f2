//! Place identifiers, search candidates and fully fetched place details.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::point::GeoPoint;

/// Name shown for a station the API returned without a display name.
pub const UNNAMED_STATION: &str = "Unnamed Gas Station";

/// Error returned when parsing an empty place ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid place ID: must not be empty")]
pub struct InvalidPlaceId;

/// An opaque, API-assigned place identifier.
///
/// Place IDs are the only identity a place has: two records with the same
/// ID describe the same place regardless of name or coordinate.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaceId(String);

impl PlaceId {
    /// Parse a place ID. Surrounding whitespace is trimmed.
    pub fn parse(s: &str) -> Result<Self, InvalidPlaceId> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidPlaceId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlaceId {
    type Error = InvalidPlaceId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PlaceId> for String {
    fn from(id: PlaceId) -> Self {
        id.0
    }
}

impl fmt::Debug for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlaceId({})", self.0)
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A place reference returned by the search-predictions stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub place_id: PlaceId,
    pub name: Option<String>,
}

impl PlaceCandidate {
    pub fn new(place_id: PlaceId, name: Option<String>) -> Self {
        Self { place_id, name }
    }
}

/// Price tier reported for a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceLevel {
    Free,
    Cheap,
    Medium,
    High,
    Expensive,
    Unknown,
}

/// Whether a place is currently trading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessStatus {
    Operational,
    ClosedTemporarily,
    ClosedPermanently,
    Unknown,
}

/// A fully hydrated place record.
///
/// Immutable once fetched. Collections of details are deduplicated on
/// `place_id` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetail {
    pub place_id: PlaceId,
    pub name: Option<String>,
    pub coordinate: GeoPoint,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// One human-readable line per weekday.
    #[serde(default)]
    pub opening_hours: Option<Vec<String>>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub price_level: Option<PriceLevel>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub business_status: Option<BusinessStatus>,
    /// Type tags, e.g. `gas_station`, `convenience_store`.
    #[serde(default)]
    pub types: Vec<String>,
}

impl PlaceDetail {
    /// A detail with only the required fields set.
    pub fn new(place_id: PlaceId, name: Option<String>, coordinate: GeoPoint) -> Self {
        Self {
            place_id,
            name,
            coordinate,
            formatted_address: None,
            phone_number: None,
            opening_hours: None,
            website: None,
            rating: None,
            price_level: None,
            user_ratings_total: None,
            business_status: None,
            types: Vec::new(),
        }
    }

    /// Add type tags.
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.extend(types.into_iter().map(Into::into));
        self
    }

    /// Name for display, falling back to a generic label.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_STATION)
    }

    /// `"lat,lng"`, the format map deep links expect.
    pub fn coordinate_string(&self) -> String {
        self.coordinate.to_string()
    }

    /// Whether the place carries the given type tag.
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}
