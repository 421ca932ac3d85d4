//! The two-slot map picker.
//!
//! A [`MapWidget`] is rendered by its parent with fresh [`WidgetProps`] on
//! every frame. It owns the map surface, keeps the markers in step with the
//! props, and reports every click, search pick or located position through a
//! single [`LocationSink`]. The parent owns the address state.

pub mod click;
pub mod locate;
pub mod markers;
pub mod search;
pub mod surface;

use crate::{
    core::{
        config::{GeocodeConfig, WidgetConfig},
        geo::LatLng,
    },
    geocode::{address::AddressFields, GeocodeService},
    runtime::{self, AsyncHandle},
    traits::Configurable,
    Result,
};
use click::{ClickRouter, ReverseLookup};
use crossbeam_channel::{Receiver, Sender};
use locate::{LocateError, PositionProvider};
use markers::MarkerSet;
use search::ForwardSearch;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, PoisonError, RwLock,
};
use surface::{HeadlessBackend, Lifecycle, MapBackend, MapSurface};

/// Which of the two addresses a marker or update belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSlot {
    A,
    B,
}

impl TargetSlot {
    pub fn index(self) -> usize {
        match self {
            TargetSlot::A => 0,
            TargetSlot::B => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            TargetSlot::A => TargetSlot::B,
            TargetSlot::B => TargetSlot::A,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSelection {
    Slot(TargetSlot),
    All,
}

impl SlotSelection {
    pub fn slots(self) -> Vec<TargetSlot> {
        match self {
            SlotSelection::Slot(slot) => vec![slot],
            SlotSelection::All => vec![TargetSlot::A, TargetSlot::B],
        }
    }
}

impl From<TargetSlot> for SlotSelection {
    fn from(slot: TargetSlot) -> Self {
        SlotSelection::Slot(slot)
    }
}

/// What the parent passes on every render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetProps {
    pub active_slot: TargetSlot,
    pub coordinate_a: Option<LatLng>,
    pub coordinate_b: Option<LatLng>,
}

impl WidgetProps {
    pub fn new(active_slot: TargetSlot) -> Self {
        Self {
            active_slot,
            coordinate_a: None,
            coordinate_b: None,
        }
    }

    pub fn with_a(mut self, coordinate: LatLng) -> Self {
        self.coordinate_a = Some(coordinate);
        self
    }

    pub fn with_b(mut self, coordinate: LatLng) -> Self {
        self.coordinate_b = Some(coordinate);
        self
    }

    pub fn coordinate(&self, slot: TargetSlot) -> Option<LatLng> {
        match slot {
            TargetSlot::A => self.coordinate_a,
            TargetSlot::B => self.coordinate_b,
        }
    }
}

impl Default for WidgetProps {
    fn default() -> Self {
        Self::new(TargetSlot::A)
    }
}

/// A resolved location for one slot. `address` is `None` when geocoding
/// failed or found nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub slot: TargetSlot,
    pub coordinate: LatLng,
    pub address: Option<AddressFields>,
}

type LocationCallback = Arc<dyn Fn(LocationUpdate) + Send + Sync>;

/// Live slot for the parent's `on_location_resolved` callback. It is read at
/// emission time, so replacing it affects lookups already in flight.
#[derive(Clone, Default)]
pub struct LocationSink {
    callback: Arc<RwLock<Option<LocationCallback>>>,
}

impl LocationSink {
    pub fn set<F>(&self, callback: F)
    where
        F: Fn(LocationUpdate) + Send + Sync + 'static,
    {
        let mut slot = self.callback.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(callback));
    }

    pub fn clear(&self) {
        *self.callback.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_set(&self) -> bool {
        self.callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Deliver `update`, returning whether a callback received it
    pub fn emit(&self, update: LocationUpdate) -> bool {
        let callback = self
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match callback {
            Some(callback) => {
                callback(update);
                true
            }
            None => {
                log::debug!(
                    "no location callback set, dropping update for {:?}",
                    update.slot
                );
                false
            }
        }
    }
}

/// "Send" fills the pickup from the device position, "Receive" the dropoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Send,
    Receive,
}

impl Intent {
    pub fn slot(self) -> TargetSlot {
        match self {
            Intent::Send => TargetSlot::A,
            Intent::Receive => TargetSlot::B,
        }
    }
}

/// Two-slot map picker over a [`MapBackend`].
pub struct MapWidget<B: MapBackend = HeadlessBackend> {
    config: WidgetConfig,
    surface: MapSurface<B>,
    markers: MarkerSet,
    props: WidgetProps,
    sink: LocationSink,
    router: ClickRouter,
    searches: [ForwardSearch; 2],
    clicks_tx: Sender<LatLng>,
    clicks_rx: Receiver<LatLng>,
    alive: Arc<AtomicBool>,
}

impl MapWidget<HeadlessBackend> {
    pub fn headless(
        geocoder: Arc<dyn GeocodeService>,
        config: WidgetConfig,
        geocode: &GeocodeConfig,
    ) -> Self {
        Self::new(HeadlessBackend::default(), geocoder, config, geocode)
    }
}

impl<B: MapBackend> MapWidget<B> {
    pub fn new(
        backend: B,
        geocoder: Arc<dyn GeocodeService>,
        config: WidgetConfig,
        geocode: &GeocodeConfig,
    ) -> Self {
        let sink = LocationSink::default();
        let alive = Arc::new(AtomicBool::new(true));
        let search = |slot| {
            ForwardSearch::new(slot, geocoder.clone(), sink.clone(), alive.clone(), geocode)
        };
        let searches = [search(TargetSlot::A), search(TargetSlot::B)];
        let (clicks_tx, clicks_rx) = crossbeam_channel::unbounded();

        Self {
            surface: MapSurface::new(backend, &config),
            markers: MarkerSet::new(config.labels.clone(), config.fit_padding),
            props: WidgetProps::default(),
            router: ClickRouter::new(geocoder.clone(), sink.clone(), alive.clone()),
            config,
            sink,
            searches,
            clicks_tx,
            clicks_rx,
            alive,
        }
    }

    /// Set the parent's callback, replacing any previous one
    pub fn on_location_resolved<F>(&self, callback: F)
    where
        F: Fn(LocationUpdate) + Send + Sync + 'static,
    {
        self.sink.set(callback);
    }

    pub fn sink(&self) -> &LocationSink {
        &self.sink
    }

    /// Apply the parent's latest props. The first render mounts the map,
    /// centred on whichever slot already has a coordinate.
    pub fn render(&mut self, props: WidgetProps) -> Result<()> {
        let a = props.coordinate_a.filter(LatLng::is_valid);
        let b = props.coordinate_b.filter(LatLng::is_valid);
        self.props = props;

        if self.surface.lifecycle() == Lifecycle::Uninitialized {
            let clicks = self.clicks_tx.clone();
            self.surface.register_click_handler(Box::new(move |at| {
                if clicks.send(at).is_err() {
                    log::trace!("click at {at} after widget shutdown");
                }
            }));
            self.surface.initialize(a.or(b))?;
        }

        self.markers.sync(&mut self.surface, a, b)
    }

    /// Handle a click on the map. The active slot's marker moves at once;
    /// the returned lookup reports the address when resolved.
    pub fn click(&mut self, at: LatLng) -> Option<ReverseLookup> {
        if !at.is_valid() {
            log::debug!("ignoring click outside the world: {at}");
            return None;
        }
        if !self.surface.dispatch_click(at) {
            return None;
        }

        let at = self.clicks_rx.try_recv().ok()?;
        let slot = self.props.active_slot;
        Some(self.router.route(
            slot,
            at,
            &mut self.markers,
            &mut self.surface,
            Some(self.searches[slot.index()].clone()),
        ))
    }

    /// [`click`](Self::click) with the lookup spawned on the crate runtime
    pub fn click_and_spawn(&mut self, at: LatLng) -> Option<Box<dyn AsyncHandle>> {
        let lookup = self.click(at)?;
        Some(runtime::spawn(async move {
            lookup.resolve().await;
        }))
    }

    /// Remove the marker(s) and search text for `which`
    pub fn clear(&mut self, which: impl Into<SlotSelection>) -> Result<()> {
        let which = which.into();
        self.markers.clear(&mut self.surface, which)?;
        for slot in which.slots() {
            self.searches[slot.index()].clear();
        }
        Ok(())
    }

    pub fn search(&self, slot: TargetSlot) -> &ForwardSearch {
        &self.searches[slot.index()]
    }

    /// Resolve the device position for `slot` and report it like a click.
    /// The marker follows once the parent renders the new coordinate.
    pub fn locate(
        &self,
        slot: TargetSlot,
        provider: Arc<dyn PositionProvider>,
    ) -> impl Future<Output = std::result::Result<LocationUpdate, LocateError>> + Send + 'static
    {
        let router = self.router.clone();
        let search = self.searches[slot.index()].clone();

        async move {
            let at = provider.current_position().await.map_err(|e| {
                log::warn!("could not locate {slot:?}: {e}");
                e
            })?;
            match router.lookup(slot, at, Some(search)).resolve().await {
                Some(update) => Ok(update),
                None => Err(LocateError::Unavailable("the map was closed".to_string())),
            }
        }
    }

    /// Clear the opposite slot, then locate the intent's slot
    pub fn apply_intent(
        &mut self,
        intent: Intent,
        provider: Arc<dyn PositionProvider>,
    ) -> impl Future<Output = std::result::Result<LocationUpdate, LocateError>> + Send + 'static
    {
        if let Err(e) = self.clear(intent.slot().other()) {
            log::warn!("failed to clear {:?} for {intent:?}: {e}", intent.slot().other());
        }
        self.locate(intent.slot(), provider)
    }

    /// Tear the widget down. Lookups still in flight will not report.
    pub fn dispose(&mut self) {
        if !self.alive.swap(false, Ordering::SeqCst) {
            return;
        }
        for search in &self.searches {
            search.clear();
        }
        self.surface.dispose();
        self.markers.reset();
        self.sink.clear();
        while self.clicks_rx.try_recv().is_ok() {}
    }

    pub fn props(&self) -> &WidgetProps {
        &self.props
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn surface(&self) -> &MapSurface<B> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut MapSurface<B> {
        &mut self.surface
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.surface.lifecycle()
    }

    pub fn label(&self, slot: TargetSlot) -> &str {
        match slot {
            TargetSlot::A => &self.config.labels.a,
            TargetSlot::B => &self.config.labels.b,
        }
    }

    /// Dialog title, e.g. "Set Pickup on Map"
    pub fn title(&self) -> String {
        format!("Set {} on Map", self.label(self.props.active_slot))
    }

    pub fn hint(&self) -> String {
        format!(
            "Click on the map to set the {}. When both are set, a line connects them.",
            self.label(self.props.active_slot).to_lowercase()
        )
    }
}

impl<B: MapBackend> Configurable for MapWidget<B> {
    type Config = WidgetConfig;

    fn config(&self) -> &WidgetConfig {
        &self.config
    }

    fn set_config(&mut self, config: WidgetConfig) -> Result<()> {
        config.validate()?;
        self.surface.reconfigure(&config);
        self.markers.set_style(config.labels.clone(), config.fit_padding);
        self.config = config;
        Ok(())
    }

    fn validate_config(config: &WidgetConfig) -> Result<()> {
        config.validate()
    }
}

impl<B: MapBackend> Drop for MapWidget<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}
