//! Domain types for nearby-station discovery.
//!
//! Coordinates and place identifiers validate their invariants at
//! construction time, so code that receives them can trust their validity.

mod place;
mod point;

pub use place::{
    BusinessStatus, InvalidPlaceId, PlaceCandidate, PlaceDetail, PlaceId, PriceLevel,
    UNNAMED_STATION,
};
pub use point::{BoundingBox, GeoPoint, InvalidGeoPoint, geodesic_distance};
