//! Configuration for the map widget and the geocoding client
//!
//! Both configs carry Leaflet/front-end defaults and can be built
//! programmatically with `with_*` methods or loaded from a JSON settings
//! file. Missing JSON fields fall back to the defaults.

use crate::core::constants::{
    DEFAULT_GATEWAY_URL, DEFAULT_MAX_ZOOM, DEFAULT_ZOOM, FALLBACK_CENTER, FIT_PADDING_RATIO,
    GEOCODE_TIMEOUT, MIN_QUERY_CHARS, OSM_ATTRIBUTION, OSM_TILE_TEMPLATE, SEARCH_DEBOUNCE,
    SEARCH_LIMIT,
};
use crate::core::geo::LatLng;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base tile layer options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileLayerOptions {
    /// URL template with `{z}`, `{x}`, `{y}` placeholders
    pub url_template: String,
    pub max_zoom: f64,
    pub attribution: String,
}

impl Default for TileLayerOptions {
    fn default() -> Self {
        Self {
            url_template: OSM_TILE_TEMPLATE.to_string(),
            max_zoom: DEFAULT_MAX_ZOOM,
            attribution: OSM_ATTRIBUTION.to_string(),
        }
    }
}

/// Human-facing names for the two slots, e.g. pickup/dropoff or start/end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotLabels {
    pub a: String,
    pub b: String,
}

impl SlotLabels {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    /// Order creation flow
    pub fn pickup_dropoff() -> Self {
        Self::new("Pickup", "Dropoff")
    }

    /// Driver registration flow (start/end garage)
    pub fn start_end() -> Self {
        Self::new("Start", "End")
    }
}

impl Default for SlotLabels {
    fn default() -> Self {
        Self::pickup_dropoff()
    }
}

/// Map widget configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Center used when neither slot has a coordinate at mount
    pub fallback_center: LatLng,
    pub initial_zoom: f64,
    /// Fraction of the A–B span added on every side when fitting both markers
    pub fit_padding: f64,
    pub tiles: TileLayerOptions,
    pub labels: SlotLabels,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            fallback_center: LatLng::new(FALLBACK_CENTER.0, FALLBACK_CENTER.1),
            initial_zoom: DEFAULT_ZOOM,
            fit_padding: FIT_PADDING_RATIO,
            tiles: TileLayerOptions::default(),
            labels: SlotLabels::default(),
        }
    }
}

impl WidgetConfig {
    pub fn with_labels(mut self, labels: SlotLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_fallback_center(mut self, center: LatLng) -> Self {
        self.fallback_center = center;
        self
    }

    pub fn with_initial_zoom(mut self, zoom: f64) -> Self {
        self.initial_zoom = zoom;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(MapError::Serialization)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.fallback_center.is_valid() {
            return Err(MapError::InvalidCoordinates(self.fallback_center.to_string()).into());
        }
        if !(0.0..=self.tiles.max_zoom).contains(&self.initial_zoom) {
            return Err(MapError::Config(format!(
                "initial zoom {} outside 0..={}",
                self.initial_zoom, self.tiles.max_zoom
            ))
            .into());
        }
        if !(0.0..=1.0).contains(&self.fit_padding) {
            return Err(MapError::Config(format!(
                "fit padding {} outside 0..=1",
                self.fit_padding
            ))
            .into());
        }
        Ok(())
    }
}

/// Gateway geocoding and search-box configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeConfig {
    /// Gateway base, e.g. `http://localhost:8080/api`
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// Number of forward-search candidates to request
    pub search_limit: usize,
    /// Minimum trimmed query length before a search is issued
    pub min_query_chars: usize,
    /// Quiet period before a typed query settles
    pub debounce: Duration,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            timeout: GEOCODE_TIMEOUT,
            user_agent: concat!("parcelmap/", env!("CARGO_PKG_VERSION")).to_string(),
            search_limit: SEARCH_LIMIT,
            min_query_chars: MIN_QUERY_CHARS,
            debounce: SEARCH_DEBOUNCE,
        }
    }
}

impl GeocodeConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(MapError::Serialization)?;
        if config.search_limit == 0 {
            return Err(MapError::Config("search limit must be at least 1".to_string()).into());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_defaults() {
        let config = WidgetConfig::default();
        assert_eq!(config.fallback_center, LatLng::new(28.6139, 77.209));
        assert_eq!(config.initial_zoom, 12.0);
        assert_eq!(config.fit_padding, 0.2);
        assert_eq!(config.tiles.max_zoom, 19.0);
        assert_eq!(config.labels.a, "Pickup");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_widget_config_partial_json() {
        let config =
            WidgetConfig::from_json_str(r#"{"labels": {"a": "Start", "b": "End"}}"#).unwrap();
        assert_eq!(config.labels, SlotLabels::start_end());
        assert_eq!(config.initial_zoom, 12.0);
    }

    #[test]
    fn test_widget_config_rejects_bad_padding() {
        let err = WidgetConfig::from_json_str(r#"{"fit_padding": 3.0}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_geocode_defaults() {
        let config = GeocodeConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.search_limit, 6);
        assert_eq!(config.min_query_chars, 3);
        assert_eq!(config.debounce, Duration::from_millis(250));
    }

    #[test]
    fn test_geocode_config_json() {
        let config =
            GeocodeConfig::from_json_str(r#"{"base_url": "http://gateway:8080/api"}"#).unwrap();
        assert_eq!(config.base_url, "http://gateway:8080/api");
        assert_eq!(config.search_limit, 6);

        assert!(GeocodeConfig::from_json_str(r#"{"search_limit": 0}"#).is_err());
    }
}
