//! Search bar and location dropdown

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::{App, Dropdown};

/// Renders the search input at the top of the screen
pub fn render_search_bar(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.store.is_loading {
        " Search a city (fetching…) "
    } else {
        " Search a city "
    };

    let input = Paragraph::new(Line::from(vec![
        Span::raw(app.input.as_str()),
        Span::styled("▏", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(input, area);
}

/// Renders the location dropdown anchored under the search bar
pub fn render_dropdown(frame: &mut Frame, anchor: Rect, app: &App) {
    let rows = app.dropdown_rows();
    if rows.is_empty() {
        return;
    }

    let title = match app.dropdown() {
        Dropdown::RecentSearches => " Recent searches ",
        _ => " Select a location ",
    };

    let height = (rows.len() as u16 + 2).min(frame.area().height.saturating_sub(anchor.bottom()));
    let area = Rect {
        x: anchor.x + 2,
        y: anchor.bottom(),
        width: anchor.width.saturating_sub(4),
        height,
    };

    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .map(|(i, location)| {
            let style = if i == app.dropdown_index {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!(" {} ", location.display_name()), style))
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}
