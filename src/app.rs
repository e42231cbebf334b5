//! Application shell for Weatherly
//!
//! Owns the text input and cursor state around the [`WeatherStore`] and
//! translates keyboard events into store intents. All weather rules live
//! in the store and the view helpers; this layer only routes.

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::data::Location;
use crate::store::WeatherStore;
use crate::view;

/// Which list the dropdown is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dropdown {
    /// Nothing open
    Closed,
    /// Search results from the store
    SearchResults,
    /// Recently selected locations
    RecentSearches,
}

/// Main application struct managing input state around the store
pub struct App {
    /// The weather state container
    pub store: WeatherStore,
    /// Current contents of the search input
    pub input: String,
    /// Highlighted row in the open dropdown
    pub dropdown_index: usize,
    /// Whether the recent-searches list is open instead of search results
    pub showing_recent: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
}

impl App {
    /// Creates a new App around a store
    pub fn new(store: WeatherStore) -> Self {
        Self {
            store,
            input: String::new(),
            dropdown_index: 0,
            showing_recent: false,
            should_quit: false,
        }
    }

    /// Which dropdown is visible, if any
    pub fn dropdown(&self) -> Dropdown {
        if !self.store.locations.is_empty() {
            Dropdown::SearchResults
        } else if self.showing_recent && !self.store.recent_searches.is_empty() {
            Dropdown::RecentSearches
        } else {
            Dropdown::Closed
        }
    }

    /// Rows of the visible dropdown
    pub fn dropdown_rows(&self) -> &[Location] {
        match self.dropdown() {
            Dropdown::SearchResults => &self.store.locations,
            Dropdown::RecentSearches => &self.store.recent_searches,
            Dropdown::Closed => &[],
        }
    }

    /// Drains resolved store events.
    ///
    /// Returns `true` when the persisted subset changed so the caller can
    /// write it out.
    pub fn tick(&mut self) -> bool {
        let mut persisted_changed = false;
        while let Some(event) = self.store.try_recv() {
            persisted_changed |= self.store.apply(event);
        }

        // keep the highlight inside the visible list
        let rows = self.dropdown_rows().len();
        if rows == 0 {
            self.dropdown_index = 0;
        } else if self.dropdown_index >= rows {
            self.dropdown_index = rows - 1;
        }

        persisted_changed
    }

    /// Handles keyboard input and routes it to store intents
    ///
    /// # Key Bindings
    /// - typing / `Backspace`: edit the search input
    /// - `Enter`: select the highlighted location, or search the input
    /// - `Up`/`Down`: move the dropdown highlight; `Down` on an empty
    ///   input opens recent searches
    /// - `Left`/`Right`: walk the 7-day timeline (day selection)
    /// - `Ctrl-D`: clear the day selection back to current conditions
    /// - `Ctrl-R`: refresh the current location (rate limited)
    /// - `Esc`: dismiss dropdown / error / day selection / input, then quit
    /// - `Ctrl-C`: quit
    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
            }
            KeyCode::Char('r') if ctrl => {
                if view::can_refresh(self.store.last_updated, Utc::now()) {
                    self.store.refresh_weather();
                }
            }
            KeyCode::Char('d') if ctrl => {
                self.store.select_day(None);
            }
            KeyCode::Char(c) if !ctrl => {
                self.showing_recent = false;
                self.input.push(c);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Down => self.move_highlight_down(),
            KeyCode::Up => self.move_highlight_up(),
            KeyCode::Right => self.move_day_selection(1),
            KeyCode::Left => self.move_day_selection(-1),
            KeyCode::Esc => self.dismiss(),
            _ => {}
        }
    }

    /// Enter: pick from the open dropdown, otherwise search the input.
    fn submit(&mut self) {
        let rows = self.dropdown_rows();
        if let Some(location) = rows.get(self.dropdown_index).cloned() {
            self.showing_recent = false;
            self.input.clear();
            self.store.select_location(location);
        } else {
            let query = self.input.clone();
            self.store.search_city(&query);
        }
        self.dropdown_index = 0;
    }

    fn move_highlight_down(&mut self) {
        match self.dropdown() {
            Dropdown::Closed => {
                // an empty input opens the recent-searches list
                if self.input.is_empty() && !self.store.recent_searches.is_empty() {
                    self.showing_recent = true;
                    self.dropdown_index = 0;
                }
            }
            _ => {
                let rows = self.dropdown_rows().len();
                self.dropdown_index = (self.dropdown_index + 1) % rows;
            }
        }
    }

    fn move_highlight_up(&mut self) {
        let rows = self.dropdown_rows().len();
        if rows == 0 {
            return;
        }
        if self.dropdown_index == 0 {
            self.dropdown_index = rows - 1;
        } else {
            self.dropdown_index -= 1;
        }
    }

    /// Walks the timeline left or right, wrapping at the ends.
    fn move_day_selection(&mut self, delta: i32) {
        let Some(weather) = &self.store.weather else {
            return;
        };
        let timeline = weather.timeline();
        let len = timeline.len() as i32;

        let current = self
            .store
            .selected_day
            .as_ref()
            .and_then(|day| timeline.iter().position(|d| d.date == day.date))
            .map(|i| i as i32);

        let next = match current {
            Some(i) => (i + delta).rem_euclid(len),
            // start from the beginning or the end of the timeline
            None if delta > 0 => 0,
            None => len - 1,
        };

        let day = timeline[next as usize].clone();
        self.store.select_day(Some(day));
    }

    /// Esc dismisses the topmost layer; quits when nothing is open.
    fn dismiss(&mut self) {
        if self.dropdown() != Dropdown::Closed {
            self.showing_recent = false;
            self.store.clear_locations();
            self.dropdown_index = 0;
        } else if self.store.error.is_some() {
            self.store.clear_error();
        } else if self.store.selected_day.is_some() {
            self.store.select_day(None);
        } else if !self.input.is_empty() {
            self.input.clear();
        } else {
            self.should_quit = true;
        }
    }
}
