//! Command-line interface parsing for Weatherly
//!
//! Parses startup arguments: an optional city to search for immediately,
//! a raw coordinate pair for the ad-hoc "Current Location" path, and a
//! switch to run without touching the persisted state file.

use clap::Parser;
use thiserror::Error;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The --coords value is not a valid "LAT,LON" pair
    #[error("Invalid coordinates: '{0}'. Expected 'LAT,LON', e.g. '51.5,-0.13'")]
    InvalidCoords(String),
}

/// Weatherly - search a city and browse a 7-day weather timeline
#[derive(Parser, Debug)]
#[command(name = "weatherly")]
#[command(about = "City weather in the terminal, powered by Open-Meteo")]
#[command(version)]
pub struct Cli {
    /// City to search for on startup
    ///
    /// Examples:
    ///   weatherly                 # open with the last persisted snapshot
    ///   weatherly London          # search for London immediately
    pub city: Option<String>,

    /// Fetch weather for an explicit coordinate pair instead of a city
    #[arg(long, value_name = "LAT,LON", conflicts_with = "city")]
    pub coords: Option<String>,

    /// Do not read or write the persisted state file
    #[arg(long)]
    pub no_persist: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupConfig {
    /// Query to search for as soon as the app starts
    pub initial_query: Option<String>,
    /// Coordinates to fetch as the ad-hoc "Current Location"
    pub initial_coords: Option<(f64, f64)>,
    /// Whether persisted state should be loaded and saved
    pub persist: bool,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let initial_coords = match &cli.coords {
            Some(raw) => Some(parse_coords(raw)?),
            None => None,
        };

        Ok(StartupConfig {
            initial_query: cli.city.clone(),
            initial_coords,
            persist: !cli.no_persist,
        })
    }
}

/// Parses a "LAT,LON" argument, validating coordinate ranges.
pub fn parse_coords(raw: &str) -> Result<(f64, f64), CliError> {
    let invalid = || CliError::InvalidCoords(raw.to_string());

    let (lat_str, lon_str) = raw.split_once(',').ok_or_else(invalid)?;
    let latitude: f64 = lat_str.trim().parse().map_err(|_| invalid())?;
    let longitude: f64 = lon_str.trim().parse().map_err(|_| invalid())?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(invalid());
    }

    Ok((latitude, longitude))
}
