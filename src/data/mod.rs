//! Core data models for Weatherly
//!
//! This module contains the normalized weather types used throughout the
//! application. The transformer produces them, the store holds them, and the
//! view layer reads them. Serialized field names are camelCase so persisted
//! snapshots match the `weather-storage` JSON format.

pub mod gateway;
pub mod transform;

pub use gateway::{GatewayError, OpenMeteoClient, WeatherApi};
pub use transform::{transform, ForecastResponse, TransformError, TODAY_INDEX};

use serde::{Deserialize, Serialize};

/// Sentinel `id` for an ad-hoc location (e.g. supplied by geolocation or
/// `--coords`) that is not backed by a geocoding catalog entry.
pub const AD_HOC_LOCATION_ID: i64 = 0;

/// A place the user can fetch weather for, as returned by the geocoding API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Provider catalog id; 0 marks an ad-hoc location
    pub id: i64,
    /// City or place name
    pub name: String,
    /// Country the place belongs to; empty for ad-hoc locations
    pub country: String,
    /// Latitude coordinate
    pub latitude: f64,
    /// Longitude coordinate
    pub longitude: f64,
}

impl Location {
    /// Creates the sentinel "Current Location" entry for a raw coordinate
    /// pair. Ad-hoc entries share the sentinel id, so recent-searches
    /// dedup treats them as one entry.
    pub fn ad_hoc(latitude: f64, longitude: f64) -> Self {
        Self {
            id: AD_HOC_LOCATION_ID,
            name: "Current Location".to_string(),
            country: String::new(),
            latitude,
            longitude,
        }
    }

    /// Display name in "City, Country" form; ad-hoc locations have no
    /// country and render as the bare name.
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// One calendar day's aggregated weather
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    /// ISO date ("2026-02-06"), unique within a timeline
    pub date: String,
    /// Daily maximum temperature in °C
    pub max_temp: i32,
    /// Daily minimum temperature in °C
    pub min_temp: i32,
    /// round((max + min) / 2)
    pub avg_temp: i32,
    /// WMO weather classification code
    pub weather_code: i32,
    /// Maximum wind speed in km/h
    pub wind_speed: f64,
    /// Dominant wind direction in degrees
    pub wind_direction: i32,
    /// Mean relative humidity over the day's hourly samples, percent
    pub humidity: i32,
    /// Precipitation sum in mm, one decimal
    pub precipitation: f64,
    /// Mean sea-level pressure over the day's hourly samples, hPa
    pub pressure: i32,
    /// ISO datetime of sunrise ("2026-02-06T06:30")
    pub sunrise: String,
    /// ISO datetime of sunset
    pub sunset: String,
}

/// Instantaneous conditions, merged with today's extremes and sun times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    /// Temperature right now in °C
    pub temp: i32,
    /// Today's maximum temperature in °C
    pub max_temp: i32,
    /// Today's minimum temperature in °C
    pub min_temp: i32,
    /// WMO weather classification code
    pub weather_code: i32,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Wind direction in degrees
    pub wind_direction: i32,
    /// Relative humidity percent, from the current hour's sample
    pub humidity: i32,
    /// Precipitation in mm, from the current hour's sample
    pub precipitation: f64,
    /// Sea-level pressure in hPa, from the current hour's sample
    pub pressure: i32,
    /// Today's sunrise (ISO datetime)
    pub sunrise: String,
    /// Today's sunset (ISO datetime)
    pub sunset: String,
}

/// A complete, immutable weather snapshot for one location
///
/// `history + [today] + forecast` forms a contiguous 7-day timeline in
/// ascending date order. Snapshots are replaced wholesale on every
/// successful fetch, never mutated field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// Human-readable name the snapshot was fetched for
    pub location_name: String,
    /// Instantaneous conditions
    pub current: CurrentConditions,
    /// Today's aggregate
    pub today: DailyForecast,
    /// The 3 days immediately preceding today, oldest first
    pub history: Vec<DailyForecast>,
    /// The 3 days immediately following today
    pub forecast: Vec<DailyForecast>,
}

impl WeatherSnapshot {
    /// The full 7-day timeline in ascending date order.
    pub fn timeline(&self) -> Vec<&DailyForecast> {
        self.history
            .iter()
            .chain(std::iter::once(&self.today))
            .chain(self.forecast.iter())
            .collect()
    }
}
