//! Core constants derived from Leaflet defaults and the courier front-end's map settings.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

use std::time::Duration;

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Deepest zoom the OpenStreetMap tile server serves.
pub const DEFAULT_MAX_ZOOM: f64 = 19.0;

/// Zoom used when the surface is first mounted.
pub const DEFAULT_ZOOM: f64 = 12.0;

/// Fallback center (New Delhi) when neither slot has a coordinate at mount.
pub const FALLBACK_CENTER: (f64, f64) = (28.6139, 77.209);

/// Fraction of the A–B span added on every side when fitting both markers.
pub const FIT_PADDING_RATIO: f64 = 0.2;

/// OpenStreetMap raster tile template.
pub const OSM_TILE_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Attribution required by the OpenStreetMap tile usage policy.
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Gateway base URL the front-end talks to.
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8080/api";

/// Quiet period before a typed query is sent.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(250);

/// Minimum trimmed query length that triggers a forward search.
pub const MIN_QUERY_CHARS: usize = 3;

/// Default number of forward-search candidates requested.
pub const SEARCH_LIMIT: usize = 6;

/// Per-request timeout for geocode calls.
pub const GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);
