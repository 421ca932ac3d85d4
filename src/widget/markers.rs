use crate::{
    core::{
        config::SlotLabels,
        geo::{LatLng, LatLngBounds},
    },
    widget::{
        surface::{LayerId, MapBackend, MapEngine, MapSurface},
        SlotSelection, TargetSlot,
    },
    Result,
};

#[derive(Debug, Clone)]
struct SlotMarker {
    id: LayerId,
    position: LatLng,
}

/// Up to two slot markers and the line joining them.
#[derive(Debug)]
pub struct MarkerSet {
    markers: [Option<SlotMarker>; 2],
    line: Option<LayerId>,
    /// Coordinates from the previous `sync`, used to detect prop changes
    last_synced: Option<[Option<LatLng>; 2]>,
    labels: SlotLabels,
    fit_padding: f64,
}

impl MarkerSet {
    pub fn new(labels: SlotLabels, fit_padding: f64) -> Self {
        Self {
            markers: [None, None],
            line: None,
            last_synced: None,
            labels,
            fit_padding,
        }
    }

    pub fn position(&self, slot: TargetSlot) -> Option<LatLng> {
        self.markers[slot.index()].as_ref().map(|m| m.position)
    }

    pub fn has_marker(&self, slot: TargetSlot) -> bool {
        self.markers[slot.index()].is_some()
    }

    pub fn has_line(&self) -> bool {
        self.line.is_some()
    }

    pub fn marker_id(&self, slot: TargetSlot) -> Option<&str> {
        self.markers[slot.index()].as_ref().map(|m| m.id.as_str())
    }

    pub fn line_id(&self) -> Option<&str> {
        self.line.as_deref()
    }

    /// Great-circle length of the connecting line
    pub fn route_distance_m(&self) -> Option<f64> {
        self.line.as_ref()?;
        let a = self.position(TargetSlot::A)?;
        let b = self.position(TargetSlot::B)?;
        Some(a.distance_to(&b))
    }

    /// Reconcile markers, the line and the view with the parent's coordinates.
    ///
    /// Markers move instead of being recreated. A slot is only touched when
    /// its coordinate differs from the previous sync, so a marker placed by a
    /// click survives renders that still carry the old props, and calling
    /// this on every render leaves a user's panning alone.
    pub fn sync<B: MapBackend>(
        &mut self,
        surface: &mut MapSurface<B>,
        a: Option<LatLng>,
        b: Option<LatLng>,
    ) -> Result<()> {
        let Some(engine) = surface.engine_mut() else {
            return Ok(());
        };

        let incoming = [a, b];
        let previous = self.last_synced;
        let changed = |slot: TargetSlot| {
            previous.map_or(true, |prev| prev[slot.index()] != incoming[slot.index()])
        };
        if !changed(TargetSlot::A) && !changed(TargetSlot::B) {
            return Ok(());
        }

        for slot in [TargetSlot::A, TargetSlot::B] {
            if !changed(slot) {
                continue;
            }
            let label = self.label(slot).to_string();
            Self::apply_slot(
                engine,
                &mut self.markers[slot.index()],
                incoming[slot.index()],
                &label,
            )?;
        }
        self.refresh_line(engine)?;

        self.last_synced = Some(incoming);
        self.adjust_view(engine)
    }

    /// Create or move one slot's marker without waiting for new props
    pub fn place<B: MapBackend>(
        &mut self,
        surface: &mut MapSurface<B>,
        slot: TargetSlot,
        coordinate: LatLng,
    ) -> Result<()> {
        let Some(engine) = surface.engine_mut() else {
            return Ok(());
        };

        let label = self.label(slot).to_string();
        Self::apply_slot(engine, &mut self.markers[slot.index()], Some(coordinate), &label)?;
        self.refresh_line(engine)
    }

    /// Remove the marker(s) for `which`, dropping the line once it is incomplete
    pub fn clear<B: MapBackend>(
        &mut self,
        surface: &mut MapSurface<B>,
        which: SlotSelection,
    ) -> Result<()> {
        let Some(engine) = surface.engine_mut() else {
            return Ok(());
        };

        for slot in which.slots() {
            Self::apply_slot(engine, &mut self.markers[slot.index()], None, "")?;
        }
        self.refresh_line(engine)
    }

    /// Labels apply to markers created from now on
    pub fn set_style(&mut self, labels: SlotLabels, fit_padding: f64) {
        self.labels = labels;
        self.fit_padding = fit_padding;
    }

    /// Forget engine handles after the surface has been disposed
    pub fn reset(&mut self) {
        self.markers = [None, None];
        self.line = None;
        self.last_synced = None;
    }

    fn label(&self, slot: TargetSlot) -> &str {
        match slot {
            TargetSlot::A => &self.labels.a,
            TargetSlot::B => &self.labels.b,
        }
    }

    fn apply_slot<E: MapEngine>(
        engine: &mut E,
        marker: &mut Option<SlotMarker>,
        incoming: Option<LatLng>,
        label: &str,
    ) -> Result<()> {
        match (marker.as_mut(), incoming) {
            (Some(existing), None) => {
                engine.remove_layer(&existing.id)?;
                log::trace!("removed marker {}", existing.id);
                *marker = None;
            }
            (None, Some(position)) => {
                let id = engine.add_marker(position, label)?;
                log::trace!("added {label} marker {id} at {position}");
                *marker = Some(SlotMarker { id, position });
            }
            (Some(existing), Some(position)) if existing.position != position => {
                engine.move_marker(&existing.id, position)?;
                log::trace!("moved marker {} to {position}", existing.id);
                existing.position = position;
            }
            _ => {}
        }
        Ok(())
    }

    fn refresh_line<E: MapEngine>(&mut self, engine: &mut E) -> Result<()> {
        match (self.position(TargetSlot::A), self.position(TargetSlot::B)) {
            (Some(a), Some(b)) => match &self.line {
                Some(line) => engine.set_line(line, a, b)?,
                None => self.line = Some(engine.add_line(a, b)?),
            },
            _ => {
                if let Some(line) = self.line.take() {
                    engine.remove_layer(&line)?;
                }
            }
        }
        Ok(())
    }

    fn adjust_view<E: MapEngine>(&self, engine: &mut E) -> Result<()> {
        match (self.position(TargetSlot::A), self.position(TargetSlot::B)) {
            (Some(a), Some(b)) => {
                if let Some(bounds) = LatLngBounds::from_points(&[a, b]) {
                    engine.fit_bounds(&bounds.pad(self.fit_padding))?;
                }
            }
            (Some(only), None) | (None, Some(only)) => {
                let zoom = engine.zoom();
                engine.set_view(only, zoom)?;
            }
            (None, None) => {}
        }
        Ok(())
    }
}
