use crate::{
    core::{
        config::TileLayerOptions,
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    input::{EventManager, InputEvent, MapEvent, MapEventKind, MouseButton},
    layers::{
        base::LayerTrait, manager::LayerManager, marker::Marker, tile::TileLayer,
        vector::Polyline,
    },
    MapError, Result,
};

/// Default container size for a map that has not been laid out yet
const DEFAULT_SIZE: Point = Point { x: 800.0, y: 600.0 };

/// A headless map: a viewport, the layers on it and its event bindings.
///
/// Hosts that paint (the egui view) read the viewport and layers back out;
/// everything else only drives it through `set_view`, `fit_bounds` and the
/// layer methods.
pub struct Map {
    pub viewport: Viewport,
    layer_manager: LayerManager,
    event_manager: EventManager,
    next_layer: u64,
    removed: bool,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            viewport: Viewport::new(center, zoom, size),
            layer_manager: LayerManager::new(),
            event_manager: EventManager::new(),
            next_layer: 0,
            removed: false,
        }
    }

    pub fn with_default_size(center: LatLng, zoom: f64) -> Self {
        Self::new(center, zoom, DEFAULT_SIZE)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.removed {
            return Err(MapError::Lifecycle("map has been removed".to_string()).into());
        }
        Ok(())
    }

    /// Queue `event` and deliver it right away
    fn emit(&mut self, event: MapEvent) {
        self.event_manager.emit(event);
        self.event_manager.process_events();
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_layer += 1;
        format!("{prefix}-{}", self.next_layer)
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        self.ensure_live()?;
        let old_center = self.viewport.center;
        let old_zoom = self.viewport.zoom;

        self.viewport.set_view(center, zoom);

        if self.viewport.center != old_center || self.viewport.zoom != old_zoom {
            self.emit(MapEvent::ViewChanged {
                center: self.viewport.center,
                zoom: self.viewport.zoom,
            });
        }
        Ok(())
    }

    /// Fit `bounds` (already padded by the caller) into the view
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds) -> Result<()> {
        self.ensure_live()?;
        self.viewport.fit_bounds(bounds);
        self.emit(MapEvent::ViewChanged {
            center: self.viewport.center,
            zoom: self.viewport.zoom,
        });
        Ok(())
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        self.ensure_live()?;
        let layer_id = layer.id().to_string();
        self.layer_manager.add_layer(layer)?;
        self.emit(MapEvent::LayerAdd { layer_id });
        Ok(())
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Result<()> {
        self.ensure_live()?;
        if self.layer_manager.remove_layer(layer_id).is_some() {
            self.emit(MapEvent::LayerRemove {
                layer_id: layer_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn add_tile_layer(&mut self, options: &TileLayerOptions) -> Result<String> {
        let id = self.next_id("tiles");
        self.add_layer(Box::new(TileLayer::new(id.clone(), options.clone())))?;
        self.viewport.set_zoom_limits(0.0, options.max_zoom);
        Ok(id)
    }

    pub fn add_marker(&mut self, position: LatLng, label: &str) -> Result<String> {
        let id = self.next_id("marker");
        self.add_layer(Box::new(Marker::new(id.clone(), position).with_tooltip(label)))?;
        Ok(id)
    }

    pub fn move_marker(&mut self, marker_id: &str, position: LatLng) -> Result<()> {
        self.ensure_live()?;
        self.layer_manager
            .with_layer_as::<Marker, _, _>(marker_id, |marker| marker.set_position(position))
            .ok_or_else(|| MapError::Layer(format!("no marker {marker_id}")).into())
    }

    pub fn add_polyline(&mut self, points: Vec<LatLng>) -> Result<String> {
        let id = self.next_id("line");
        self.add_layer(Box::new(Polyline::new(id.clone(), points)))?;
        Ok(id)
    }

    pub fn set_polyline(&mut self, line_id: &str, points: Vec<LatLng>) -> Result<()> {
        self.ensure_live()?;
        self.layer_manager
            .with_layer_as::<Polyline, _, _>(line_id, |line| line.set_points(points))
            .ok_or_else(|| MapError::Layer(format!("no polyline {line_id}")).into())
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layer_manager
    }

    pub fn markers(&self) -> Vec<&Marker> {
        self.layer_manager
            .layers()
            .into_iter()
            .filter_map(|layer| layer.as_any().downcast_ref::<Marker>())
            .collect()
    }

    pub fn polylines(&self) -> Vec<&Polyline> {
        self.layer_manager
            .layers()
            .into_iter()
            .filter_map(|layer| layer.as_any().downcast_ref::<Polyline>())
            .collect()
    }

    pub fn tile_layer(&self) -> Option<&TileLayer> {
        self.layer_manager
            .layers()
            .into_iter()
            .find_map(|layer| layer.as_any().downcast_ref::<TileLayer>())
    }

    /// Register the single listener for `kind`, replacing any previous one
    pub fn on<F>(&mut self, kind: MapEventKind, callback: F) -> bool
    where
        F: FnMut(&MapEvent) + Send + 'static,
    {
        if self.removed {
            return false;
        }
        self.event_manager.on(kind, callback)
    }

    pub fn off(&mut self, kind: MapEventKind) -> bool {
        self.event_manager.off(kind)
    }

    pub fn has_listener(&self, kind: MapEventKind) -> bool {
        self.event_manager.has_listener(kind)
    }

    /// Fire a click at a geographic position, returning whether a listener saw it
    pub fn fire_click(&mut self, lat_lng: LatLng) -> bool {
        if self.removed || !self.event_manager.has_listener(MapEventKind::Click) {
            return false;
        }
        self.emit(MapEvent::Click { lat_lng });
        true
    }

    /// Apply host input; clicks are converted through the viewport
    pub fn handle_input(&mut self, input: InputEvent) -> Result<bool> {
        self.ensure_live()?;
        match input {
            InputEvent::Click {
                position,
                button: MouseButton::Left,
            } => {
                let lat_lng = self.viewport.pixel_to_lat_lng(&position);
                Ok(self.fire_click(lat_lng))
            }
            InputEvent::Click { .. } => Ok(false),
            InputEvent::Drag { delta } => {
                self.viewport.pan(delta);
                self.emit(MapEvent::ViewChanged {
                    center: self.viewport.center,
                    zoom: self.viewport.zoom,
                });
                Ok(true)
            }
            InputEvent::Resize { size } => {
                self.viewport.set_size(size);
                Ok(true)
            }
        }
    }

    pub fn process_events(&mut self) -> usize {
        self.event_manager.process_events()
    }

    pub fn pending_events(&self) -> usize {
        self.event_manager.pending_events()
    }

    /// Tear the map down: drop every layer and listener. Idempotent.
    pub fn remove(&mut self) {
        if self.removed {
            return;
        }
        let released = self.layer_manager.clear();
        self.event_manager.clear();
        self.removed = true;
        log::debug!("map removed, released {} layers", released.len());
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn map() -> Map {
        Map::with_default_size(LatLng::new(28.6139, 77.209), 12.0)
    }

    #[test]
    fn test_marker_and_line_lifecycle() {
        let mut map = map();
        let a = map.add_marker(LatLng::new(28.6, 77.2), "Pickup").unwrap();
        let line = map
            .add_polyline(vec![LatLng::new(28.6, 77.2), LatLng::new(28.5, 77.1)])
            .unwrap();
        assert_eq!(map.markers().len(), 1);
        assert_eq!(map.polylines().len(), 1);

        map.move_marker(&a, LatLng::new(28.7, 77.3)).unwrap();
        assert_eq!(map.markers()[0].position(), LatLng::new(28.7, 77.3));

        map.remove_layer(&line).unwrap();
        assert!(map.polylines().is_empty());
        assert!(map.move_marker("marker-missing", LatLng::default()).is_err());
    }

    #[test]
    fn test_click_reaches_single_listener() {
        let mut map = map();
        assert!(!map.fire_click(LatLng::new(1.0, 1.0)));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        map.on(MapEventKind::Click, move |event| {
            if let MapEvent::Click { lat_lng } = event {
                sink.lock().unwrap().push(*lat_lng);
            }
        });

        assert!(map.fire_click(LatLng::new(1.0, 2.0)));
        assert_eq!(*seen.lock().unwrap(), vec![LatLng::new(1.0, 2.0)]);
    }

    #[test]
    fn test_pixel_click_converts_through_viewport() {
        let mut map = map();
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        map.on(MapEventKind::Click, move |event| {
            if let MapEvent::Click { lat_lng } = event {
                *sink.lock().unwrap() = Some(*lat_lng);
            }
        });

        let center = Point::new(400.0, 300.0);
        let handled = map
            .handle_input(InputEvent::Click {
                position: center,
                button: MouseButton::Left,
            })
            .unwrap();
        assert!(handled);

        let clicked = seen.lock().unwrap().unwrap();
        assert!((clicked.lat - 28.6139).abs() < 1e-6);
        assert!((clicked.lng - 77.209).abs() < 1e-6);
    }

    #[test]
    fn test_panning_leaves_no_backlog() {
        let mut map = map();
        for _ in 0..10_000 {
            map.handle_input(InputEvent::Drag {
                delta: Point::new(3.0, -2.0),
            })
            .unwrap();
        }
        assert_eq!(map.pending_events(), 0);

        let views = Arc::new(Mutex::new(0));
        let counter = views.clone();
        map.on(MapEventKind::ViewChanged, move |_| *counter.lock().unwrap() += 1);
        for _ in 0..100 {
            map.handle_input(InputEvent::Drag {
                delta: Point::new(3.0, -2.0),
            })
            .unwrap();
        }
        map.set_view(LatLng::new(28.5, 77.0), 10.0).unwrap();

        assert_eq!(*views.lock().unwrap(), 101);
        assert_eq!(map.pending_events(), 0);
        assert_eq!(map.process_events(), 0);
    }

    #[test]
    fn test_remove_is_idempotent_and_final() {
        let mut map = map();
        map.add_tile_layer(&TileLayerOptions::default()).unwrap();
        map.on(MapEventKind::Click, |_| {});

        map.remove();
        map.remove();
        assert!(map.is_removed());
        assert!(map.layers().is_empty());
        assert!(!map.fire_click(LatLng::default()));
        assert!(map.add_marker(LatLng::default(), "A").is_err());
    }
}
