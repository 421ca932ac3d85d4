//! Prelude module for common parcelmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use parcelmap::prelude::*;`

pub use crate::core::{
    config::{GeocodeConfig, SlotLabels, TileLayerOptions, WidgetConfig},
    geo::{LatLng, LatLngBounds, Point},
    map::Map as CoreMap,
    viewport::Viewport,
};

pub use crate::layers::{
    base::LayerTrait, manager::LayerManager, marker::Marker, tile::TileLayer, vector::Polyline,
};

pub use crate::input::{
    events::{InputEvent, MapEvent, MapEventKind, MouseButton},
    handler::EventManager,
};

pub use crate::geocode::{
    address::AddressFields, gateway::GatewayGeocoder, GeocodeError, GeocodeService, Place,
};

pub use crate::address::FormAddress;

pub use crate::widget::{
    locate::{FixedPosition, LocateError, PositionProvider, Unsupported},
    surface::{HeadlessBackend, Lifecycle, MapBackend, MapEngine, MapSurface},
    Intent, LocationSink, LocationUpdate, MapWidget, TargetSlot, WidgetProps,
};

pub use crate::runtime::{runtime, sleep, spawn, AsyncHandle, AsyncSpawner};

pub use crate::traits::Configurable;

#[cfg(feature = "egui")]
pub use crate::ui::widget::MapView;

pub use crate::{Error as MapError, Result};

pub use std::{
    collections::VecDeque,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, RwLock},
    time::Duration,
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
