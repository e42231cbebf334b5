//! Terminal UI rendering for Weatherly
//!
//! Render functions consume the app state and draw it; user intents are
//! raised through keyboard handling in [`crate::app`]. Nothing in here
//! mutates state.

pub mod days;
pub mod search;
pub mod weather;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::app::App;

/// Renders the whole screen for the current app state
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search bar
            Constraint::Min(9),    // current conditions or welcome
            Constraint::Length(6), // 7-day strip
            Constraint::Length(1), // status line
        ])
        .split(frame.area());

    search::render_search_bar(frame, chunks[0], app);

    if app.store.weather.is_some() {
        weather::render_current_panel(frame, chunks[1], app);
        days::render_day_strip(frame, chunks[2], app);
    } else {
        weather::render_welcome(frame, chunks[1], app);
    }

    days::render_status_line(frame, chunks[3], app);

    // drawn last so it sits on top of the body
    search::render_dropdown(frame, chunks[0], app);
}
