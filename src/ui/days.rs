//! 7-day timeline strip and the status line

use chrono::{NaiveDate, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::data::transform::TIMELINE_DAYS;
use crate::view;

/// Renders the history + today + forecast strip; the selected day (or
/// today, when none is selected) is highlighted.
pub fn render_day_strip(frame: &mut Frame, area: Rect, app: &App) {
    let Some(snapshot) = &app.store.weather else {
        return;
    };

    let timeline = snapshot.timeline();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, TIMELINE_DAYS as u32); TIMELINE_DAYS])
        .split(area);

    let today = NaiveDate::parse_from_str(&snapshot.today.date, "%Y-%m-%d").ok();
    let selected_date = app.store.selected_day.as_ref().map(|d| d.date.as_str());

    for (day, cell) in timeline.iter().zip(cells.iter()) {
        let label = match (NaiveDate::parse_from_str(&day.date, "%Y-%m-%d").ok(), today) {
            (Some(date), Some(today)) => view::relative_day_label(date, today),
            _ => day.date.clone(),
        };

        let is_selected = selected_date == Some(day.date.as_str());
        let border_style = if is_selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let lines = vec![
            Line::from(Span::styled(
                format!("{}°", day.max_temp),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{}°", day.min_temp),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(view::weather_description(day.weather_code)),
        ];

        frame.render_widget(
            Paragraph::new(lines)
                .alignment(ratatui::layout::Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!(" {label} "))
                        .border_style(border_style),
                ),
            *cell,
        );
    }
}

/// Renders the one-line footer: loading/error state or data age
pub fn render_status_line(frame: &mut Frame, area: Rect, app: &App) {
    let now = Utc::now();

    let line = if app.store.is_loading {
        Line::from(Span::styled(
            "Fetching weather…",
            Style::default().fg(Color::Cyan),
        ))
    } else if let Some(error) = &app.store.error {
        Line::from(Span::styled(
            format!("{error} (Esc to dismiss)"),
            Style::default().fg(Color::Red),
        ))
    } else if let Some(last_updated) = app.store.last_updated {
        let mut spans = vec![Span::raw(format!(
            "Updated {}",
            view::format_relative_time(last_updated, now)
        ))];
        if view::is_stale(last_updated, now) {
            spans.push(Span::styled(
                "  stale — Ctrl-R to refresh",
                Style::default().fg(Color::Yellow),
            ));
        }
        Line::from(spans)
    } else {
        Line::from(Span::styled(
            "←/→ browse days · Ctrl-R refresh · Esc quit",
            Style::default().fg(Color::DarkGray),
        ))
    };

    frame.render_widget(Paragraph::new(line), area);
}
