//! # parcelmap
//!
//! A two-slot map picker for courier flows: the user picks a pickup and a
//! dropoff (or a start and an end garage) either by clicking the map or by
//! searching an address. Clicks are reverse-geocoded through the gateway and
//! every resolved location is reported to the owner of the form.
//!
//! The map itself is headless ([`core::map::Map`]); the optional `egui`
//! feature paints it.

pub mod address;
pub mod core;
pub mod geocode;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod traits;
#[cfg(feature = "egui")]
pub mod ui;
pub mod widget;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{GeocodeConfig, SlotLabels, TileLayerOptions, WidgetConfig},
    geo::{LatLng, LatLngBounds, Point},
    map::Map,
    viewport::Viewport,
};

pub use layers::{base::LayerTrait, marker::Marker, tile::TileLayer, vector::Polyline};

pub use input::{events::InputEvent, handler::EventManager};

pub use address::FormAddress;

pub use geocode::{
    address::AddressFields, gateway::GatewayGeocoder, GeocodeError, GeocodeService, Place,
};

pub use widget::{
    locate::{FixedPosition, LocateError, PositionProvider, Unsupported},
    surface::{HeadlessBackend, Lifecycle, MapBackend, MapEngine, MapSurface},
    Intent, LocationSink, LocationUpdate, MapWidget, TargetSlot, WidgetProps,
};

#[cfg(feature = "egui")]
pub use ui::widget::MapView;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Lifecycle error: {0}")]
    Lifecycle(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Install `env_logger` as the `log` backend. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
