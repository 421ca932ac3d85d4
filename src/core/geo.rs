use serde::{Deserialize, Serialize};

use crate::MapError;

/// Web Mercator projection constants
const EARTH_RADIUS: f64 = 6378137.0;
const MAX_LATITUDE: f64 = 85.0511287798;

/// A geographical coordinate. Immutable value type shared by markers,
/// geocode results and the parent's address model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a coordinate, rejecting values outside lat [-90, 90] / lng [-180, 180]
    pub fn try_new(lat: f64, lng: f64) -> Result<Self, MapError> {
        let coord = Self::new(lat, lng);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(MapError::InvalidCoordinates(format!("({lat}, {lng})")))
        }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    /// Calculates the distance to another LatLng using the Haversine formula
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS * c
    }

    /// Clamps latitude to the range Web Mercator can project
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Smallest bounds containing every point, `None` for an empty slice
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::new(*first, *first);
        for point in rest {
            bounds.extend(point);
        }
        Some(bounds)
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Returns bounds grown on every side by `ratio` of the current span,
    /// matching Leaflet's `LatLngBounds.pad`.
    pub fn pad(&self, ratio: f64) -> LatLngBounds {
        let span = self.span();
        let height_buffer = span.lat.abs() * ratio;
        let width_buffer = span.lng.abs() * ratio;

        LatLngBounds::new(
            LatLng::new(
                self.south_west.lat - height_buffer,
                self.south_west.lng - width_buffer,
            ),
            LatLng::new(
                self.north_east.lat + height_buffer,
                self.north_east.lng + width_buffer,
            ),
        )
    }

    /// Gets the span of the bounds
    pub fn span(&self) -> LatLng {
        LatLng::new(
            self.north_east.lat - self.south_west.lat,
            self.north_east.lng - self.south_west.lng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(28.6139, 77.209);
        assert_eq!(coord.lat, 28.6139);
        assert_eq!(coord.lng, 77.209);
        assert!(coord.is_valid());
    }

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert!(LatLng::try_new(91.0, 0.0).is_err());
        assert!(LatLng::try_new(0.0, -180.5).is_err());
        assert!(LatLng::try_new(f64::NAN, 0.0).is_err());
        assert!(LatLng::try_new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_lat_lng_distance() {
        let connaught_place = LatLng::new(28.6315, 77.2167);
        let airport = LatLng::new(28.5562, 77.1000);
        let distance = connaught_place.distance_to(&airport);

        // Roughly 14 km as the crow flies
        assert!((distance - 14_155.0).abs() < 500.0);
    }

    #[test]
    fn test_bounds_from_points_and_pad() {
        let bounds = LatLngBounds::from_points(&[
            LatLng::new(28.61, 77.20),
            LatLng::new(28.70, 77.10),
        ])
        .unwrap();
        assert_eq!(bounds.south_west, LatLng::new(28.61, 77.10));
        assert_eq!(bounds.north_east, LatLng::new(28.70, 77.20));

        let padded = bounds.pad(0.2);
        assert!((padded.south_west.lat - 28.592).abs() < 1e-9);
        assert!((padded.north_east.lng - 77.22).abs() < 1e-9);
        assert!(padded.contains(&LatLng::new(28.61, 77.20)));
        assert!(padded.contains(&LatLng::new(28.70, 77.10)));
    }

    #[test]
    fn test_bounds_from_empty_slice() {
        assert!(LatLngBounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = LatLngBounds::from_coords(28.0, 77.0, 29.0, 78.0);
        assert!(bounds.contains(&LatLng::new(28.5, 77.5)));
        assert!(!bounds.contains(&LatLng::new(30.0, 77.5)));
    }
}
