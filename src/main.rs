//! Weatherly - search any city and browse a 7-day weather timeline
//!
//! A terminal UI application backed by the Open-Meteo forecast and
//! geocoding APIs. The composition root below wires the HTTP gateway into
//! the store, loads persisted state, and runs the event loop.

use std::io;
use std::panic;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use weatherly::app::App;
use weatherly::cli::{Cli, StartupConfig};
use weatherly::data::{Location, OpenMeteoClient};
use weatherly::persist::StateStore;
use weatherly::store::WeatherStore;
use weatherly::ui;

/// Sets up a panic hook that restores the terminal before printing the
/// panic message, so the shell stays usable after a crash.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run(config).await {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run(config: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state_store = if config.persist {
        StateStore::new()
    } else {
        None
    };

    let mut store = WeatherStore::new(Arc::new(OpenMeteoClient::new()));
    if let Some(persisted) = state_store.as_ref().and_then(StateStore::load) {
        store.hydrate(persisted);
    }

    let mut app = App::new(store);

    // apply startup intents before the first draw
    if let Some((latitude, longitude)) = config.initial_coords {
        app.store.select_location(Location::ad_hoc(latitude, longitude));
    } else if let Some(query) = &config.initial_query {
        app.input = query.clone();
        app.store.search_city(query);
    }

    setup_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        // drain resolved fetches; persist when the durable subset changed
        if app.tick() {
            if let Some(state_store) = &state_store {
                let _ = state_store.save(&app.store.persisted());
            }
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
