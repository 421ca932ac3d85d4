use crate::{
    core::config::GeocodeConfig,
    geocode::{forward_search, GeocodeService, Place},
    runtime::{self, AsyncHandle},
    widget::{LocationSink, LocationUpdate, TargetSlot},
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use std::time::Duration;

#[derive(Default)]
struct SearchState {
    /// What the box shows
    text: String,
    /// Last text that settled, as typed
    settled: Option<String>,
    /// Bumped by every issuance and invalidation; results apply only on a match
    generation: u64,
    candidates: Vec<Place>,
    /// Bumped by every keystroke so a woken debounce timer can tell it is stale
    input_epoch: u64,
    pending: Option<Box<dyn AsyncHandle>>,
}

impl SearchState {
    fn cancel_timer(&mut self) {
        self.input_epoch += 1;
        if let Some(handle) = self.pending.take() {
            handle.cancel();
        }
    }
}

/// Debounced address search for one slot's search box.
///
/// Clones share state, so a spawned debounce task and the widget see the same
/// candidates.
#[derive(Clone)]
pub struct ForwardSearch {
    slot: TargetSlot,
    state: Arc<Mutex<SearchState>>,
    geocoder: Arc<dyn GeocodeService>,
    sink: LocationSink,
    alive: Arc<AtomicBool>,
    limit: usize,
    min_chars: usize,
    debounce: Duration,
}

impl ForwardSearch {
    pub fn new(
        slot: TargetSlot,
        geocoder: Arc<dyn GeocodeService>,
        sink: LocationSink,
        alive: Arc<AtomicBool>,
        config: &GeocodeConfig,
    ) -> Self {
        Self {
            slot,
            state: Arc::new(Mutex::new(SearchState::default())),
            geocoder,
            sink,
            alive,
            limit: config.search_limit,
            min_chars: config.min_query_chars,
            debounce: config.debounce,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn slot(&self) -> TargetSlot {
        self.slot
    }

    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    pub fn candidates(&self) -> Vec<Place> {
        self.lock().candidates.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// A debounce timer is running
    pub fn is_pending(&self) -> bool {
        self.lock()
            .pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Record a keystroke. The text settles once it has been stable for the
    /// debounce period; earlier timers are cancelled.
    pub fn input(&self, text: impl Into<String>) {
        let text = text.into();
        let mut state = self.lock();
        state.text = text.clone();
        state.cancel_timer();

        let epoch = state.input_epoch;
        let search = self.clone();
        state.pending = Some(runtime::spawn(async move {
            runtime::sleep(search.debounce).await;
            if search.timer_fired(epoch) {
                search.settle(&text).await;
            }
        }));
    }

    /// Settle `text` immediately, e.g. when the user presses enter
    pub async fn search_now(&self, text: &str) -> bool {
        {
            let mut state = self.lock();
            state.text = text.to_string();
            state.cancel_timer();
        }
        self.settle(text).await
    }

    fn timer_fired(&self, epoch: u64) -> bool {
        let mut state = self.lock();
        if state.input_epoch != epoch {
            return false;
        }
        state.pending = None;
        true
    }

    /// Issue the search for settled text. Returns whether its results were
    /// applied; a later issuance or invalidation discards them.
    async fn settle(&self, text: &str) -> bool {
        let query = text.trim();
        let generation = {
            let mut state = self.lock();
            state.generation += 1;

            if query.chars().count() < self.min_chars {
                state.candidates.clear();
                state.settled = None;
                return false;
            }
            if state.settled.as_deref() == Some(text) {
                state.candidates.clear();
                return false;
            }

            state.settled = Some(text.to_string());
            state.generation
        };

        log::debug!("searching {query:?} for {:?} (generation {generation})", self.slot);
        let places = forward_search(self.geocoder.as_ref(), query, self.limit).await;

        let mut state = self.lock();
        if state.generation != generation {
            log::debug!(
                "discarding {} stale results for {query:?} (generation {generation}, now {})",
                places.len(),
                state.generation
            );
            return false;
        }
        state.candidates = places;
        true
    }

    /// Pick a candidate: report it like a map click, close the list and show
    /// its label without searching again.
    pub fn select(&self, place: &Place) -> Option<LocationUpdate> {
        self.show_resolved(&place.display_name);

        if !self.alive.load(Ordering::SeqCst) {
            return None;
        }
        let update = LocationUpdate {
            slot: self.slot,
            coordinate: place.coordinate,
            address: place.address_fields(),
        };
        self.sink.emit(update.clone());
        Some(update)
    }

    /// Show a resolved label in the box, dropping candidates and in-flight results
    pub fn show_resolved(&self, label: &str) {
        let mut state = self.lock();
        state.cancel_timer();
        state.generation += 1;
        state.candidates.clear();
        state.text = label.to_string();
        state.settled = Some(label.to_string());
    }

    /// Empty the box and forget everything in flight
    pub fn clear(&self) {
        let mut state = self.lock();
        state.cancel_timer();
        state.generation += 1;
        state.candidates.clear();
        state.text.clear();
        state.settled = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::geo::LatLng,
        geocode::{address::AddressFields, GeocodeError},
    };
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct Echo {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeocodeService for Echo {
        async fn reverse(&self, _at: LatLng) -> Result<Place, GeocodeError> {
            Err(GeocodeError::NotFound)
        }

        async fn forward(&self, query: &str, _limit: usize) -> Result<Vec<Place>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Place {
                display_name: format!("{query}, India"),
                coordinate: LatLng::new(28.6, 77.2),
                address: AddressFields::default(),
            }])
        }
    }

    fn search() -> (ForwardSearch, Arc<Echo>, LocationSink) {
        let echo = Arc::new(Echo {
            calls: AtomicUsize::new(0),
        });
        let sink = LocationSink::default();
        let search = ForwardSearch::new(
            TargetSlot::A,
            echo.clone(),
            sink.clone(),
            Arc::new(AtomicBool::new(true)),
            &GeocodeConfig::default(),
        );
        (search, echo, sink)
    }

    #[tokio::test]
    async fn test_short_query_clears_without_network() {
        let (search, echo, _) = search();
        assert!(search.search_now("Delhi").await);
        assert_eq!(search.candidates().len(), 1);

        assert!(!search.search_now(" De ").await);
        assert!(search.candidates().is_empty());
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unchanged_query_clears_without_network() {
        let (search, echo, _) = search();
        assert!(search.search_now("Delhi").await);
        assert!(!search.search_now("Delhi").await);
        assert!(search.candidates().is_empty());
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_select_emits_and_closes_list() {
        let (search, echo, sink) = search();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        sink.set(move |update| log.lock().unwrap().push(update));

        search.search_now("Delhi").await;
        let place = search.candidates()[0].clone();
        let update = search.select(&place).unwrap();

        assert_eq!(update.slot, TargetSlot::A);
        assert_eq!(update.coordinate, LatLng::new(28.6, 77.2));
        assert_eq!(*seen.lock().unwrap(), vec![update]);
        assert!(search.candidates().is_empty());
        assert_eq!(search.text(), "Delhi, India");
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_resets_box() {
        let (search, _, _) = search();
        search.search_now("Delhi").await;
        let before = search.generation();
        search.clear();
        assert!(search.text().is_empty());
        assert!(search.candidates().is_empty());
        assert!(search.generation() > before);
    }
}
