use crate::{
    core::{
        config::{TileLayerOptions, WidgetConfig},
        geo::{LatLng, LatLngBounds, Point},
        map::Map,
    },
    input::{MapEvent, MapEventKind},
    Result,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Engine-side handle for a layer (tile layer, marker or line)
pub type LayerId = String;

/// The single click callback a surface binds on its engine
pub type ClickHandler = Box<dyn FnMut(LatLng) + Send>;

/// Operations the widget needs from an interactive map instance.
pub trait MapEngine: Send {
    fn add_tile_layer(&mut self, options: &TileLayerOptions) -> Result<LayerId>;
    fn add_marker(&mut self, position: LatLng, label: &str) -> Result<LayerId>;
    fn move_marker(&mut self, marker: &str, position: LatLng) -> Result<()>;
    fn add_line(&mut self, from: LatLng, to: LatLng) -> Result<LayerId>;
    fn set_line(&mut self, line: &str, from: LatLng, to: LatLng) -> Result<()>;
    fn remove_layer(&mut self, layer: &str) -> Result<()>;
    fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()>;
    fn fit_bounds(&mut self, bounds: &LatLngBounds) -> Result<()>;
    fn zoom(&self) -> f64;

    /// Bind the click handler, replacing any previous binding
    fn bind_click(&mut self, handler: ClickHandler);
    fn unbind_click(&mut self);
    /// Deliver a click; `false` when nothing is bound
    fn click(&mut self, at: LatLng) -> bool;

    /// Release everything the engine holds. Idempotent.
    fn destroy(&mut self);
}

/// Factory for map engines
pub trait MapBackend {
    type Engine: MapEngine;

    fn create(&mut self, center: LatLng, zoom: f64) -> Result<Self::Engine>;
}

impl MapEngine for Map {
    fn add_tile_layer(&mut self, options: &TileLayerOptions) -> Result<LayerId> {
        Map::add_tile_layer(self, options)
    }

    fn add_marker(&mut self, position: LatLng, label: &str) -> Result<LayerId> {
        Map::add_marker(self, position, label)
    }

    fn move_marker(&mut self, marker: &str, position: LatLng) -> Result<()> {
        Map::move_marker(self, marker, position)
    }

    fn add_line(&mut self, from: LatLng, to: LatLng) -> Result<LayerId> {
        self.add_polyline(vec![from, to])
    }

    fn set_line(&mut self, line: &str, from: LatLng, to: LatLng) -> Result<()> {
        self.set_polyline(line, vec![from, to])
    }

    fn remove_layer(&mut self, layer: &str) -> Result<()> {
        Map::remove_layer(self, layer)
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        Map::set_view(self, center, zoom)
    }

    fn fit_bounds(&mut self, bounds: &LatLngBounds) -> Result<()> {
        Map::fit_bounds(self, bounds)
    }

    fn zoom(&self) -> f64 {
        Map::zoom(self)
    }

    fn bind_click(&mut self, mut handler: ClickHandler) {
        self.on(MapEventKind::Click, move |event| {
            if let MapEvent::Click { lat_lng } = event {
                handler(*lat_lng);
            }
        });
    }

    fn unbind_click(&mut self) {
        self.off(MapEventKind::Click);
    }

    fn click(&mut self, at: LatLng) -> bool {
        self.fire_click(at)
    }

    fn destroy(&mut self) {
        self.remove();
    }
}

/// Creates headless [`Map`] engines and counts how many it has made.
#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    size: Point,
    created: Arc<AtomicUsize>,
}

impl HeadlessBackend {
    pub fn new(size: Point) -> Self {
        Self {
            size,
            created: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Engines created so far, shared across clones
    pub fn instances_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(Point::new(800.0, 600.0))
    }
}

impl MapBackend for HeadlessBackend {
    type Engine = Map;

    fn create(&mut self, center: LatLng, zoom: f64) -> Result<Map> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Map::new(center, zoom, self.size))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Mounted,
    /// Terminal
    Unmounted,
}

/// Owns one map engine and its base tile layer for a widget's lifetime.
pub struct MapSurface<B: MapBackend> {
    backend: B,
    engine: Option<B::Engine>,
    tile_layer: Option<LayerId>,
    lifecycle: Lifecycle,
    fallback_center: LatLng,
    zoom: f64,
    tiles: TileLayerOptions,
    pending_click: Option<ClickHandler>,
}

impl<B: MapBackend> MapSurface<B> {
    pub fn new(backend: B, config: &WidgetConfig) -> Self {
        Self {
            backend,
            engine: None,
            tile_layer: None,
            lifecycle: Lifecycle::Uninitialized,
            fallback_center: config.fallback_center,
            zoom: config.initial_zoom,
            tiles: config.tiles.clone(),
            pending_click: None,
        }
    }

    /// Pick up mount-time settings; ignored once mounted
    pub fn reconfigure(&mut self, config: &WidgetConfig) {
        if self.lifecycle != Lifecycle::Uninitialized {
            log::debug!("surface already mounted, keeping its view and tile settings");
            return;
        }
        self.fallback_center = config.fallback_center;
        self.zoom = config.initial_zoom;
        self.tiles = config.tiles.clone();
    }

    /// Create the engine centred on `initial_center` (or the fallback) and
    /// add the base tiles. Only the first call on a fresh surface does anything.
    pub fn initialize(&mut self, initial_center: Option<LatLng>) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Mounted => return Ok(()),
            Lifecycle::Unmounted => {
                log::debug!("ignoring initialize on a disposed surface");
                return Ok(());
            }
            Lifecycle::Uninitialized => {}
        }

        let center = initial_center
            .filter(LatLng::is_valid)
            .unwrap_or(self.fallback_center);
        let mut engine = self.backend.create(center, self.zoom)?;

        let tile_layer = match engine.add_tile_layer(&self.tiles) {
            Ok(id) => id,
            Err(e) => {
                engine.destroy();
                return Err(e);
            }
        };
        if let Some(handler) = self.pending_click.take() {
            engine.bind_click(handler);
        }

        self.engine = Some(engine);
        self.tile_layer = Some(tile_layer);
        self.lifecycle = Lifecycle::Mounted;
        log::debug!("map surface mounted at {center} (zoom {})", self.zoom);
        Ok(())
    }

    /// Release the engine, its tile layer, overlays and click binding.
    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Unmounted {
            return;
        }

        self.pending_click = None;
        if let Some(mut engine) = self.engine.take() {
            engine.unbind_click();
            if let Some(tile_layer) = self.tile_layer.take() {
                if let Err(e) = engine.remove_layer(&tile_layer) {
                    log::warn!("failed to remove tile layer {tile_layer}: {e}");
                }
            }
            engine.destroy();
        }

        self.lifecycle = Lifecycle::Unmounted;
        log::debug!("map surface disposed");
    }

    /// Bind the one click handler. Before mount it is held until `initialize`;
    /// after dispose it is dropped and `false` is returned.
    pub fn register_click_handler(&mut self, handler: ClickHandler) -> bool {
        match self.lifecycle {
            Lifecycle::Mounted => match self.engine.as_mut() {
                Some(engine) => {
                    engine.bind_click(handler);
                    true
                }
                None => false,
            },
            Lifecycle::Uninitialized => {
                self.pending_click = Some(handler);
                true
            }
            Lifecycle::Unmounted => false,
        }
    }

    /// Deliver a host click to the bound handler
    pub fn dispatch_click(&mut self, at: LatLng) -> bool {
        if self.lifecycle != Lifecycle::Mounted {
            return false;
        }
        self.engine.as_mut().is_some_and(|engine| engine.click(at))
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    pub fn engine(&self) -> Option<&B::Engine> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut B::Engine> {
        self.engine.as_mut()
    }

    pub fn tile_layer_id(&self) -> Option<&str> {
        self.tile_layer.as_deref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: MapBackend> Drop for MapSurface<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}
