//! Geographic point and distance types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, used by the haversine formula.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Meters per degree of latitude.
const METERS_PER_LAT_DEGREE: f64 = 110_540.0;

/// Meters per degree of longitude at the equator.
const METERS_PER_LNG_DEGREE: f64 = 111_320.0;

/// Error returned when constructing an out-of-range coordinate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate ({latitude}, {longitude}): {reason}")]
pub struct InvalidGeoPoint {
    latitude: f64,
    longitude: f64,
    reason: &'static str,
}

/// A latitude/longitude pair in decimal degrees.
///
/// `GeoPoint` is a plain value: two points are the same point exactly when
/// their coordinates are equal.
///
/// # Examples
///
/// ```
/// use station_finder::domain::GeoPoint;
///
/// let toronto = GeoPoint::new(43.70, -79.40).unwrap();
/// assert_eq!(toronto.latitude(), 43.70);
///
/// // Latitude must be within [-90, 90]
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Create a point, validating that both coordinates are finite and in range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidGeoPoint> {
        let err = |reason| InvalidGeoPoint {
            latitude,
            longitude,
            reason,
        };

        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(err("coordinates must be finite"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(err("latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(err("longitude must be within [-180, 180]"));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other`, in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        geodesic_distance(self, other)
    }

    /// The point `meters_north` and `meters_east` away, using the same
    /// flat approximation as [`BoundingBox::around`].
    ///
    /// Useful for placing fixtures at a known offset from an origin.
    pub fn offset(&self, meters_north: f64, meters_east: f64) -> Self {
        let lat = (self.latitude + meters_north / METERS_PER_LAT_DEGREE).clamp(-90.0, 90.0);
        let lng = (self.longitude + meters_east / meters_per_lng_degree(self.latitude))
            .clamp(-180.0, 180.0);
        Self {
            latitude: lat,
            longitude: lng,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Haversine distance between two points, in meters.
///
/// Symmetric, non-negative, and zero for identical points.
pub fn geodesic_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);

    // Rounding can push h a hair over 1 for antipodal points
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_METERS * c
}

fn meters_per_lng_degree(latitude: f64) -> f64 {
    // Never divide by zero at the poles
    (METERS_PER_LNG_DEGREE * latitude.to_radians().cos()).max(1.0)
}

/// A latitude/longitude rectangle, used to restrict place searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// South-west corner.
    pub low: GeoPoint,
    /// North-east corner.
    pub high: GeoPoint,
}

impl BoundingBox {
    /// The square of half-width `half_width_meters` centered on `center`.
    ///
    /// Corners are clamped to valid coordinates, so boxes near the poles or
    /// the antimeridian are truncated rather than wrapped.
    pub fn around(center: GeoPoint, half_width_meters: f64) -> Self {
        let dlat = half_width_meters / METERS_PER_LAT_DEGREE;
        let dlng = half_width_meters / meters_per_lng_degree(center.latitude);

        let low = GeoPoint {
            latitude: (center.latitude - dlat).clamp(-90.0, 90.0),
            longitude: (center.longitude - dlng).clamp(-180.0, 180.0),
        };
        let high = GeoPoint {
            latitude: (center.latitude + dlat).clamp(-90.0, 90.0),
            longitude: (center.longitude + dlng).clamp(-180.0, 180.0),
        };

        Self { low, high }
    }

    /// Whether `point` lies inside the box (edges inclusive).
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.low.latitude..=self.high.latitude).contains(&point.latitude)
            && (self.low.longitude..=self.high.longitude).contains(&point.longitude)
    }
}
