//! Derived view logic
//!
//! Pure helpers that turn store state into presentation-ready values:
//! relative day labels, staleness/refresh-cooldown signals, selected-day
//! display blending, and the small formatting lookups the screens share.
//! Nothing in here performs I/O or mutates state.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::data::{CurrentConditions, DailyForecast, WeatherSnapshot};

/// Age after which a displayed snapshot counts as stale
const STALE_AFTER_MINUTES: i64 = 30;

/// Cooldown gating the manual refresh control after a successful fetch
const REFRESH_COOLDOWN_MINUTES: i64 = 5;

/// Labels a day relative to today: "Today", "Yesterday", "Tomorrow",
/// "N days ago", "In N days".
pub fn relative_day_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        -1 => "Yesterday".to_string(),
        1 => "Tomorrow".to_string(),
        n if n < -1 => format!("{} days ago", -n),
        n => format!("In {n} days"),
    }
}

/// Whether a snapshot fetched at `last_updated` is older than the staleness
/// threshold. Staleness is an age signal, not a correctness signal.
pub fn is_stale(last_updated: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - last_updated > Duration::minutes(STALE_AFTER_MINUTES)
}

/// Whether the manual refresh control is enabled. Separate from staleness
/// so refresh is disabled immediately after any successful fetch.
pub fn can_refresh(last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_updated {
        None => true,
        Some(at) => now - at > Duration::minutes(REFRESH_COOLDOWN_MINUTES),
    }
}

/// Formats a fetch timestamp as relative text for the status line.
pub fn format_relative_time(last_updated: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - last_updated;
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} minute{} ago", if minutes > 1 { "s" } else { "" })
    } else if hours < 24 {
        format!("{hours} hour{} ago", if hours > 1 { "s" } else { "" })
    } else {
        "over a day ago".to_string()
    }
}

/// The values the current-conditions panel renders
///
/// When a day is selected, every field is sourced from that day and `temp`
/// carries its average (flagged by `is_average`); otherwise the fields come
/// from the snapshot's instantaneous block.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConditions<'a> {
    pub temp: i32,
    /// True when `temp` is a daily average rather than an instantaneous read
    pub is_average: bool,
    pub max_temp: i32,
    pub min_temp: i32,
    pub weather_code: i32,
    pub wind_speed: f64,
    pub wind_direction: i32,
    pub humidity: i32,
    pub precipitation: f64,
    pub pressure: i32,
    pub sunrise: &'a str,
    pub sunset: &'a str,
}

/// Blends the snapshot with an optional selected day for display.
pub fn display_conditions<'a>(
    snapshot: &'a WeatherSnapshot,
    selected: Option<&'a DailyForecast>,
) -> DisplayConditions<'a> {
    match selected {
        Some(day) => DisplayConditions {
            temp: day.avg_temp,
            is_average: true,
            max_temp: day.max_temp,
            min_temp: day.min_temp,
            weather_code: day.weather_code,
            wind_speed: day.wind_speed,
            wind_direction: day.wind_direction,
            humidity: day.humidity,
            precipitation: day.precipitation,
            pressure: day.pressure,
            sunrise: &day.sunrise,
            sunset: &day.sunset,
        },
        None => from_current(&snapshot.current),
    }
}

fn from_current(current: &CurrentConditions) -> DisplayConditions<'_> {
    DisplayConditions {
        temp: current.temp,
        is_average: false,
        max_temp: current.max_temp,
        min_temp: current.min_temp,
        weather_code: current.weather_code,
        wind_speed: current.wind_speed,
        wind_direction: current.wind_direction,
        humidity: current.humidity,
        precipitation: current.precipitation,
        pressure: current.pressure,
        sunrise: &current.sunrise,
        sunset: &current.sunset,
    }
}

/// Human-readable text for a WMO weather code
///
/// See: https://open-meteo.com/en/docs#weathervariables
pub fn weather_description(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51..=55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61..=65 => "Rain",
        66 | 67 => "Freezing rain",
        71..=77 => "Snow",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95..=99 => "Thunderstorm",
        _ => "Unknown",
    }
}

/// Compass point for a wind direction in degrees
pub fn wind_direction_label(degrees: i32) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let normalized = degrees.rem_euclid(360) as f64;
    let index = ((normalized + 22.5) / 45.0) as usize % 8;
    POINTS[index]
}

/// Extracts "HH:MM" from an ISO datetime ("2026-02-06T06:30"); falls back
/// to the raw string when it is not in that shape.
pub fn format_time(datetime: &str) -> String {
    NaiveDateTime::parse_from_str(datetime, "%Y-%m-%dT%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| datetime.to_string())
}
