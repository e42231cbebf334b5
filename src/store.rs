//! Weather store — the stateful orchestrator
//!
//! Holds the full application state (snapshot, selected day, search
//! results, loading/error flags, persisted history) and exposes the user
//! intents. Network work is dispatched to tokio tasks that report back
//! through an mpsc channel of [`StoreEvent`]s; the event loop drains the
//! channel and feeds each event to [`WeatherStore::apply`], so every state
//! mutation happens on the loop thread.
//!
//! Each fetch dispatch is stamped with a monotonically increasing sequence
//! number. A resolution that does not carry the latest sequence was
//! superseded by a newer dispatch and is discarded, so overlapping fetches
//! resolve last-dispatched-wins instead of last-resolved-wins. In-flight
//! requests are not cancelled.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::data::{DailyForecast, GatewayError, Location, WeatherApi, WeatherSnapshot};
use crate::persist::PersistedState;

/// Maximum entries kept in the recent-searches list
pub const MAX_RECENT_SEARCHES: usize = 5;

/// What a resolved fetch was dispatched for
#[derive(Debug, Clone)]
pub enum FetchKind {
    /// A user picked this location from search results (or coordinates)
    Select(Location),
    /// A refresh of the last selected location
    Refresh,
}

/// Resolution of an async gateway call, delivered back to the event loop
#[derive(Debug)]
pub enum StoreEvent {
    /// A geocoding search finished
    SearchResolved(Result<Vec<Location>, GatewayError>),
    /// A weather fetch finished
    FetchResolved {
        seq: u64,
        kind: FetchKind,
        result: Result<WeatherSnapshot, GatewayError>,
    },
}

/// The application state container
///
/// Constructible (no global singleton) so tests can run independent
/// instances side by side.
pub struct WeatherStore {
    /// Last successfully fetched snapshot; replaced wholesale
    pub weather: Option<WeatherSnapshot>,
    /// Location of the current snapshot, used for refresh
    pub last_location: Option<Location>,
    /// When the current snapshot was fetched
    pub last_updated: Option<chrono::DateTime<Utc>>,
    /// Up to [`MAX_RECENT_SEARCHES`] previously selected locations, newest first
    pub recent_searches: Vec<Location>,
    /// Day the user is inspecting; `None` shows current conditions
    pub selected_day: Option<DailyForecast>,
    /// Open search results (the dropdown)
    pub locations: Vec<Location>,
    /// Whether a weather fetch is in flight
    pub is_loading: bool,
    /// User-facing error message from the last failed call
    pub error: Option<String>,

    gateway: Arc<dyn WeatherApi>,
    events_tx: mpsc::UnboundedSender<StoreEvent>,
    events_rx: mpsc::UnboundedReceiver<StoreEvent>,
    fetch_seq: u64,
}

impl WeatherStore {
    /// Creates an empty store over the given gateway.
    pub fn new(gateway: Arc<dyn WeatherApi>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            weather: None,
            last_location: None,
            last_updated: None,
            recent_searches: Vec::new(),
            selected_day: None,
            locations: Vec::new(),
            is_loading: false,
            error: None,
            gateway,
            events_tx,
            events_rx,
            fetch_seq: 0,
        }
    }

    /// Installs previously persisted state. Called once at startup by the
    /// composition root.
    pub fn hydrate(&mut self, persisted: PersistedState) {
        self.weather = persisted.weather;
        self.last_location = persisted.last_location;
        self.last_updated = persisted.last_updated;
        self.recent_searches = persisted.recent_searches;
    }

    /// The subset of state that is written to disk.
    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            weather: self.weather.clone(),
            last_location: self.last_location.clone(),
            last_updated: self.last_updated,
            recent_searches: self.recent_searches.clone(),
        }
    }

    /// Searches the geocoding catalog for `query`.
    ///
    /// A blank query synchronously clears the dropdown and makes no
    /// network call. Search is not surfaced as a blocking operation:
    /// `is_loading` is never touched here.
    pub fn search_city(&mut self, query: &str) {
        if query.trim().is_empty() {
            self.locations.clear();
            return;
        }

        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        let query = query.to_string();
        tokio::spawn(async move {
            let result = gateway.search_locations(&query).await;
            let _ = tx.send(StoreEvent::SearchResolved(result));
        });
    }

    /// Fetches weather for `location` and makes it the current one.
    ///
    /// Synchronously marks loading, clears any error, and closes the
    /// dropdown before the request starts.
    pub fn select_location(&mut self, location: Location) {
        self.is_loading = true;
        self.error = None;
        self.locations.clear();

        let seq = self.next_seq();
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = gateway
                .fetch_weather(location.latitude, location.longitude, &location.display_name())
                .await;
            let _ = tx.send(StoreEvent::FetchResolved {
                seq,
                kind: FetchKind::Select(location),
                result,
            });
        });
    }

    /// Re-fetches the last selected location. No-op when nothing has been
    /// selected yet.
    pub fn refresh_weather(&mut self) {
        let Some(location) = self.last_location.clone() else {
            return;
        };

        self.is_loading = true;
        self.error = None;

        let seq = self.next_seq();
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = gateway
                .fetch_weather(location.latitude, location.longitude, &location.display_name())
                .await;
            let _ = tx.send(StoreEvent::FetchResolved {
                seq,
                kind: FetchKind::Refresh,
                result,
            });
        });
    }

    /// Selects a day from the timeline for display; `None` reverts the
    /// display to current conditions.
    pub fn select_day(&mut self, day: Option<DailyForecast>) {
        self.selected_day = day;
    }

    /// Closes the search dropdown.
    pub fn clear_locations(&mut self) {
        self.locations.clear();
    }

    /// Dismisses the error banner.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Restores the full initial state, both persisted and transient, and
    /// invalidates any in-flight fetch.
    pub fn reset(&mut self) {
        self.weather = None;
        self.last_location = None;
        self.last_updated = None;
        self.recent_searches.clear();
        self.selected_day = None;
        self.locations.clear();
        self.is_loading = false;
        self.error = None;
        self.fetch_seq += 1;
    }

    /// Checks for a resolved event without blocking.
    pub fn try_recv(&mut self) -> Option<StoreEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Waits for the next resolved event. Used by tests and by callers
    /// that want to block on a resolution.
    pub async fn next_event(&mut self) -> Option<StoreEvent> {
        self.events_rx.recv().await
    }

    /// Applies a resolved event to the state.
    ///
    /// Returns `true` when the persisted subset changed, so the caller
    /// knows to write it out.
    pub fn apply(&mut self, event: StoreEvent) -> bool {
        match event {
            StoreEvent::SearchResolved(Ok(locations)) => {
                self.locations = locations;
                false
            }
            StoreEvent::SearchResolved(Err(err)) => {
                self.error = Some(err.to_string());
                false
            }
            StoreEvent::FetchResolved { seq, kind, result } => {
                if seq != self.fetch_seq {
                    // superseded by a newer dispatch
                    return false;
                }

                match result {
                    Ok(snapshot) => {
                        self.weather = Some(snapshot);
                        self.is_loading = false;
                        self.last_updated = Some(Utc::now());
                        if let FetchKind::Select(location) = kind {
                            self.selected_day = None;
                            self.remember_search(&location);
                            self.last_location = Some(location);
                        }
                        true
                    }
                    Err(err) => {
                        // previously displayed weather stays visible
                        self.error = Some(err.to_string());
                        self.is_loading = false;
                        false
                    }
                }
            }
        }
    }

    /// De-dup by id, prepend, truncate to [`MAX_RECENT_SEARCHES`].
    fn remember_search(&mut self, location: &Location) {
        self.recent_searches.retain(|l| l.id != location.id);
        self.recent_searches.insert(0, location.clone());
        self.recent_searches.truncate(MAX_RECENT_SEARCHES);
    }

    fn next_seq(&mut self) -> u64 {
        self.fetch_seq += 1;
        self.fetch_seq
    }
}
