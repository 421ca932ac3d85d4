use crate::{
    core::geo::LatLng,
    geocode::{reverse_lookup, GeocodeService},
    widget::{
        markers::MarkerSet,
        search::ForwardSearch,
        surface::{MapBackend, MapSurface},
        LocationSink, LocationUpdate, TargetSlot,
    },
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Turns map clicks into a placed marker plus a pending reverse lookup.
#[derive(Clone)]
pub struct ClickRouter {
    geocoder: Arc<dyn GeocodeService>,
    sink: LocationSink,
    alive: Arc<AtomicBool>,
}

impl ClickRouter {
    pub fn new(
        geocoder: Arc<dyn GeocodeService>,
        sink: LocationSink,
        alive: Arc<AtomicBool>,
    ) -> Self {
        Self {
            geocoder,
            sink,
            alive,
        }
    }

    /// Place `slot`'s marker at `at` right away and hand back the lookup
    /// that will report the address.
    pub fn route<B: MapBackend>(
        &self,
        slot: TargetSlot,
        at: LatLng,
        markers: &mut MarkerSet,
        surface: &mut MapSurface<B>,
        search: Option<ForwardSearch>,
    ) -> ReverseLookup {
        if let Err(e) = markers.place(surface, slot, at) {
            log::warn!("failed to place {slot:?} marker at {at}: {e}");
        }
        self.lookup(slot, at, search)
    }

    /// A lookup for `at` that places nothing
    pub fn lookup(
        &self,
        slot: TargetSlot,
        at: LatLng,
        search: Option<ForwardSearch>,
    ) -> ReverseLookup {
        ReverseLookup {
            slot,
            coordinate: at,
            geocoder: self.geocoder.clone(),
            sink: self.sink.clone(),
            alive: self.alive.clone(),
            search,
        }
    }
}

/// A reverse geocode for one click. Resolving it emits exactly one
/// [`LocationUpdate`], unless the widget was disposed in the meantime.
#[must_use = "the lookup does nothing until awaited or spawned"]
pub struct ReverseLookup {
    slot: TargetSlot,
    coordinate: LatLng,
    geocoder: Arc<dyn GeocodeService>,
    sink: LocationSink,
    alive: Arc<AtomicBool>,
    search: Option<ForwardSearch>,
}

impl ReverseLookup {
    pub fn slot(&self) -> TargetSlot {
        self.slot
    }

    pub fn coordinate(&self) -> LatLng {
        self.coordinate
    }

    pub async fn resolve(self) -> Option<LocationUpdate> {
        let address = reverse_lookup(self.geocoder.as_ref(), self.coordinate).await;

        if !self.alive.load(Ordering::SeqCst) {
            log::debug!(
                "dropping reverse lookup for {:?} at {}: widget disposed",
                self.slot,
                self.coordinate
            );
            return None;
        }

        if let (Some(search), Some(label)) = (
            &self.search,
            address.as_ref().and_then(|fields| fields.display_name()),
        ) {
            search.show_resolved(label);
        }

        let update = LocationUpdate {
            slot: self.slot,
            coordinate: self.coordinate,
            address,
        };
        self.sink.emit(update.clone());
        Some(update)
    }
}
