//! Great-circle distance and search-area helpers.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Haversine distance between two points, in kilometers.
///
/// Symmetric, and exactly `0.0` for identical inputs.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = ((d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Slack added to every box edge so points sitting exactly on the search
/// circle survive float rounding in the box arithmetic.
const BOX_EPSILON_DEG: f64 = 1e-9;

/// Longitude span of a [`BoundingBox`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LongitudeRange {
    /// Every longitude; the circle covers a pole.
    Full,
    /// `min <= lon <= max`.
    Contiguous { min: f64, max: f64 },
    /// The box crosses the antimeridian: `lon >= west || lon <= east`.
    Wrapped { west: f64, east: f64 },
}

impl LongitudeRange {
    pub fn contains(&self, longitude: f64) -> bool {
        match *self {
            LongitudeRange::Full => true,
            LongitudeRange::Contiguous { min, max } => longitude >= min && longitude <= max,
            LongitudeRange::Wrapped { west, east } => longitude >= west || longitude <= east,
        }
    }
}

/// Smallest latitude/longitude box containing every point within a radius
/// of an origin. Used as a cheap prefilter ahead of [`distance_km`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub longitude: LongitudeRange,
}

impl BoundingBox {
    /// Returns `None` when nothing can match (negative or non-finite radius).
    pub fn around(origin: Coordinates, radius_km: f64) -> Option<Self> {
        if radius_km.is_nan() || radius_km < 0.0 {
            return None;
        }

        let angular = radius_km / EARTH_RADIUS_KM;
        let d_lat = angular.to_degrees();
        let min_latitude = origin.latitude - d_lat;
        let max_latitude = origin.latitude + d_lat;

        if min_latitude <= -90.0 || max_latitude >= 90.0 {
            return Some(Self {
                min_latitude: min_latitude.max(-90.0),
                max_latitude: max_latitude.min(90.0),
                longitude: LongitudeRange::Full,
            });
        }

        // No pole inside the circle, so angular < 90deg - |lat| and the ratio stays below 1.
        let d_lon = (angular.sin() / origin.latitude.to_radians().cos()).asin().to_degrees()
            + BOX_EPSILON_DEG;
        let min_lon = origin.longitude - d_lon;
        let max_lon = origin.longitude + d_lon;

        let longitude = if min_lon < -180.0 {
            LongitudeRange::Wrapped { west: min_lon + 360.0, east: max_lon }
        } else if max_lon > 180.0 {
            LongitudeRange::Wrapped { west: min_lon, east: max_lon - 360.0 }
        } else {
            LongitudeRange::Contiguous { min: min_lon, max: max_lon }
        };

        Some(Self {
            min_latitude: min_latitude - BOX_EPSILON_DEG,
            max_latitude: max_latitude + BOX_EPSILON_DEG,
            longitude,
        })
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        point.latitude >= self.min_latitude
            && point.latitude <= self.max_latitude
            && self.longitude.contains(point.longitude)
    }
}
