use crate::core::constants::{DEFAULT_MAX_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, LatLngBounds, Point};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS: f64 = 6378137.0;

/// Manages the current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center: Self::clamp_center(center),
            zoom: zoom.clamp(0.0, DEFAULT_MAX_ZOOM),
            size,
            min_zoom: 0.0,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }

    /// Sets the center of the viewport, clamped to the projectable world
    pub fn set_center(&mut self, center: LatLng) {
        self.center = Self::clamp_center(center);
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Sets center and zoom together
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.set_center(center);
        self.set_zoom(zoom);
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    /// Projects a LatLng to world pixel coordinates (EPSG:3857)
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let z = zoom.unwrap_or(self.zoom);
        let scale = TILE_SIZE as f64 * 2_f64.powf(z);
        let half_world = std::f64::consts::PI * EARTH_RADIUS;

        let x = lat_lng.lng.to_radians() * EARTH_RADIUS;
        let lat = LatLng::clamp_lat(lat_lng.lat);
        let y = ((std::f64::consts::PI / 4.0 + lat.to_radians() / 2.0).tan().ln()) * EARTH_RADIUS;

        Point::new(
            (x + half_world) / (2.0 * half_world) * scale,
            (-y + half_world) / (2.0 * half_world) * scale,
        )
    }

    /// Unprojects world pixel coordinates back to LatLng
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let z = zoom.unwrap_or(self.zoom);
        let scale = TILE_SIZE as f64 * 2_f64.powf(z);
        let half_world = std::f64::consts::PI * EARTH_RADIUS;

        let x = (pixel.x / scale) * (2.0 * half_world) - half_world;
        let y = half_world - (pixel.y / scale) * (2.0 * half_world);

        let lng = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - std::f64::consts::PI / 2.0).to_degrees();

        LatLng::new(lat, lng)
    }

    /// Converts a geographical coordinate to container pixel coordinates
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let origin = self.project(&self.center, None);
        self.project(lat_lng, None)
            .subtract(&origin)
            .add(&Point::new(self.size.x / 2.0, self.size.y / 2.0))
    }

    /// Converts container pixel coordinates back to geographical coordinates
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let origin = self.project(&self.center, None);
        let world = pixel
            .subtract(&Point::new(self.size.x / 2.0, self.size.y / 2.0))
            .add(&origin);
        self.unproject(&world, None)
    }

    /// Pans the viewport by the given pixel offset
    pub fn pan(&mut self, delta: Point) {
        let center_pixel = Point::new(self.size.x / 2.0, self.size.y / 2.0);
        let new_center = self.pixel_to_lat_lng(&center_pixel.subtract(&delta));
        self.set_center(new_center);
    }

    /// Gets the current viewport bounds in geographical coordinates
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&Point::new(self.size.x, self.size.y));

        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }

    /// Fits the viewport to contain the given bounds, picking the deepest
    /// integer zoom at which the bounds still fit inside the container.
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds) {
        let nw_corner = LatLng::new(bounds.north_east.lat, bounds.south_west.lng);
        let se_corner = LatLng::new(bounds.south_west.lat, bounds.north_east.lng);

        let mut best_zoom = self.min_zoom;

        for test_zoom in (self.min_zoom.ceil() as i32)..=(self.max_zoom.floor() as i32) {
            let zoom = test_zoom as f64;

            let nw = self.project(&nw_corner, Some(zoom));
            let se = self.project(&se_corner, Some(zoom));

            let bounds_width = (se.x - nw.x).abs();
            let bounds_height = (se.y - nw.y).abs();

            if bounds_width <= self.size.x && bounds_height <= self.size.y {
                best_zoom = zoom;
            } else {
                break;
            }
        }

        // Center on the projected midpoint so both edges get the same pixel slack
        let nw = self.project(&nw_corner, Some(best_zoom));
        let se = self.project(&se_corner, Some(best_zoom));
        let mid = Point::new((nw.x + se.x) / 2.0, (nw.y + se.y) / 2.0);
        let center = self.unproject(&mid, Some(best_zoom));

        self.set_view(center, best_zoom);
    }

    /// Clamps center to the projectable world
    fn clamp_center(center: LatLng) -> LatLng {
        LatLng::new(
            LatLng::clamp_lat(center.lat),
            center.lng.clamp(-180.0, 180.0),
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::new(LatLng::new(28.6139, 77.209), 12.0, Point::new(800.0, 600.0));

        assert_eq!(viewport.zoom, 12.0);
        assert_eq!(viewport.center.lat, 28.6139);
        assert_eq!(viewport.size.x, 800.0);
    }

    #[test]
    fn test_coordinate_conversion() {
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 1.0, Point::new(512.0, 512.0));

        let center_lat_lng = viewport.pixel_to_lat_lng(&Point::new(256.0, 256.0));
        assert!(center_lat_lng.lat.abs() < 0.01);
        assert!(center_lat_lng.lng.abs() < 0.01);

        let pixel = viewport.lat_lng_to_pixel(&LatLng::new(10.0, 20.0));
        let back = viewport.pixel_to_lat_lng(&pixel);
        assert!((back.lat - 10.0).abs() < 1e-6);
        assert!((back.lng - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(2.0, 15.0);

        viewport.set_zoom(1.0);
        assert_eq!(viewport.zoom, 2.0);

        viewport.set_zoom(20.0);
        assert_eq!(viewport.zoom, 15.0);
    }

    #[test]
    fn test_pan() {
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 1.0, Point::new(512.0, 512.0));

        let original_center = viewport.center;
        viewport.pan(Point::new(10.0, 10.0));

        assert_ne!(viewport.center, original_center);
    }

    #[test]
    fn test_fit_bounds_contains_both_corners() {
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 3.0, Point::new(800.0, 600.0));
        let target = LatLngBounds::from_coords(28.592, 77.08, 28.718, 77.22);

        viewport.fit_bounds(&target);

        let visible = viewport.bounds();
        assert!(visible.contains(&target.south_west));
        assert!(visible.contains(&target.north_east));
        assert!(viewport.zoom >= 9.0 && viewport.zoom <= 13.0);
    }
}
