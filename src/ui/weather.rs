//! Current conditions panel and welcome screen

use chrono::NaiveDate;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::view;

/// Renders the conditions panel: current weather, or the selected day's
/// aggregate when one is picked from the timeline.
pub fn render_current_panel(frame: &mut Frame, area: Rect, app: &App) {
    let Some(snapshot) = &app.store.weather else {
        return;
    };

    let display = view::display_conditions(snapshot, app.store.selected_day.as_ref());

    let title = match &app.store.selected_day {
        Some(day) => format!(" {} — {} ", snapshot.location_name, day_title(day, snapshot)),
        None => format!(" {} ", snapshot.location_name),
    };

    let temp_line = if display.is_average {
        Line::from(vec![
            Span::styled(
                format!("{}°C", display.temp),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(" (day average)", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(Span::styled(
            format!("{}°C", display.temp),
            Style::default().add_modifier(Modifier::BOLD),
        ))
    };

    let lines = vec![
        temp_line,
        Line::from(format!(
            "{}   H: {}°  L: {}°",
            view::weather_description(display.weather_code),
            display.max_temp,
            display.min_temp
        )),
        Line::from(format!(
            "Wind: {} km/h {}",
            display.wind_speed,
            view::wind_direction_label(display.wind_direction)
        )),
        Line::from(format!(
            "Humidity: {}%   Precipitation: {} mm   Pressure: {} hPa",
            display.humidity, display.precipitation, display.pressure
        )),
        Line::from(format!(
            "Sunrise: {}   Sunset: {}",
            view::format_time(display.sunrise),
            view::format_time(display.sunset)
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_style(Style::default().add_modifier(Modifier::BOLD)),
        ),
        area,
    );
}

/// Relative label for the panel title, e.g. "Tomorrow"
fn day_title(day: &crate::data::DailyForecast, snapshot: &crate::data::WeatherSnapshot) -> String {
    match (
        NaiveDate::parse_from_str(&day.date, "%Y-%m-%d"),
        NaiveDate::parse_from_str(&snapshot.today.date, "%Y-%m-%d"),
    ) {
        (Ok(date), Ok(today)) => view::relative_day_label(date, today),
        _ => day.date.clone(),
    }
}

/// Renders the empty state shown before any city is selected
pub fn render_welcome(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to Weatherly",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Type a city name and press Enter to search."),
        Line::from("Current weather · 3-day forecast · 3-day history"),
    ];

    if !app.store.recent_searches.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Recent searches (press Down):",
            Style::default().fg(Color::DarkGray),
        )));
        for location in &app.store.recent_searches {
            lines.push(Line::from(Span::styled(
                location.display_name(),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}
