use crate::{
    input::events::{MapEvent, MapEventKind},
    prelude::{HashMap, VecDeque},
};

/// Event listener callback type
pub type EventCallback = Box<dyn FnMut(&MapEvent) + Send>;

/// Event management system for the map.
///
/// Each event kind has at most one listener, so binding a new one releases
/// the previous binding instead of stacking it.
#[derive(Default)]
pub struct EventManager {
    listeners: HashMap<MapEventKind, EventCallback>,
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the listener for `kind`, returning whether one was replaced
    pub fn on<F>(&mut self, kind: MapEventKind, callback: F) -> bool
    where
        F: FnMut(&MapEvent) + Send + 'static,
    {
        self.listeners.insert(kind, Box::new(callback)).is_some()
    }

    /// Remove the listener for `kind`
    pub fn off(&mut self, kind: MapEventKind) -> bool {
        self.listeners.remove(&kind).is_some()
    }

    pub fn has_listener(&self, kind: MapEventKind) -> bool {
        self.listeners.contains_key(&kind)
    }

    /// Queue an event for its listener. Events nobody listens for are dropped.
    pub fn emit(&mut self, event: MapEvent) {
        if !self.has_listener(event.kind()) {
            log::trace!("no listener for {:?}, dropping event", event.kind());
            return;
        }
        self.event_queue.push_back(event);
    }

    /// Deliver all queued events to their listeners, returning how many
    /// reached a listener
    pub fn process_events(&mut self) -> usize {
        let events: Vec<_> = self.event_queue.drain(..).collect();
        let mut delivered = 0;

        for event in &events {
            if let Some(callback) = self.listeners.get_mut(&event.kind()) {
                callback(event);
                delivered += 1;
            }
        }

        delivered
    }

    /// Drop every listener and queued event
    pub fn clear(&mut self) {
        self.listeners.clear();
        self.event_queue.clear();
    }

    /// Get number of pending events
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn click() -> MapEvent {
        MapEvent::Click {
            lat_lng: LatLng::new(28.6, 77.2),
        }
    }

    #[test]
    fn test_rebinding_replaces_listener() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut events = EventManager::new();

        let counter = first.clone();
        assert!(!events.on(MapEventKind::Click, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let counter = second.clone();
        assert!(events.on(MapEventKind::Click, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        events.emit(click());
        assert_eq!(events.process_events(), 1);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unlistened_events_are_not_queued() {
        let mut events = EventManager::new();
        for _ in 0..1000 {
            events.emit(click());
        }
        assert_eq!(events.pending_events(), 0);
        assert_eq!(events.process_events(), 0);
    }

    #[test]
    fn test_listener_removed_before_delivery() {
        let mut events = EventManager::new();
        events.on(MapEventKind::Click, |_| {});
        events.emit(click());
        assert_eq!(events.pending_events(), 1);

        events.off(MapEventKind::Click);
        assert_eq!(events.process_events(), 0);
        assert_eq!(events.pending_events(), 0);
    }

    #[test]
    fn test_clear_releases_listeners() {
        let mut events = EventManager::new();
        events.on(MapEventKind::Click, |_| {});
        events.clear();
        assert!(!events.has_listener(MapEventKind::Click));
    }
}
