//! Open-Meteo API gateway
//!
//! The only place in the application that talks to the network. Two
//! operations are exposed behind the [`WeatherApi`] trait: geocode search
//! and forecast fetch. Payload shaping is delegated to
//! [`transform`](super::transform::transform); everything above this module
//! is transport-ignorant.

use async_trait::async_trait;
use chrono::Local;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use super::transform::{self, ForecastResponse, TransformError, FORECAST_DAYS, PAST_DAYS};
use super::{Location, WeatherSnapshot};

/// Base URL for the Open-Meteo geocoding API
const GEOCODING_BASE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// Base URL for the Open-Meteo forecast API
const FORECAST_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Maximum geocoding results requested per search
const SEARCH_RESULT_LIMIT: u8 = 5;

/// Errors produced by gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider answered with a non-success HTTP status
    #[error("{0}")]
    Network(String),

    /// The request could not be sent or the body could not be read
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The payload parsed but did not have the expected shape
    #[error("unexpected response: {0}")]
    Malformed(#[from] TransformError),
}

/// Async boundary wrapping the two remote calls
///
/// The store depends on this trait rather than on a concrete HTTP client,
/// so tests can drive it with canned results.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Searches the geocoding catalog for places matching `query`.
    ///
    /// A blank query resolves to an empty list without touching the
    /// network; an absent/empty result list is also an empty list, not an
    /// error.
    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, GatewayError>;

    /// Fetches the 7-day snapshot for a coordinate pair, tagged with
    /// `location_name`.
    async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
        location_name: &str,
    ) -> Result<WeatherSnapshot, GatewayError>;
}

/// Geocoding response envelope; `results` is absent when nothing matches
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    id: i64,
    name: String,
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

/// HTTP client for the Open-Meteo APIs
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    geocoding_url: String,
    forecast_url: String,
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoClient {
    /// Creates a client against the public Open-Meteo endpoints
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            geocoding_url: GEOCODING_BASE_URL.to_string(),
            forecast_url: FORECAST_BASE_URL.to_string(),
        }
    }

    /// Creates a client against custom endpoints (for tests)
    pub fn with_base_urls(geocoding_url: impl Into<String>, forecast_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
        }
    }

    fn status_message(prefix: &str, status: StatusCode) -> String {
        let text = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string());
        format!("{prefix} failed: {text}")
    }
}

#[async_trait]
impl WeatherApi for OpenMeteoClient {
    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, GatewayError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(&self.geocoding_url)
            .query(&[
                ("name", query.to_string()),
                ("count", SEARCH_RESULT_LIMIT.to_string()),
                ("language", "en".to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::Network(Self::status_message(
                "Geocoding",
                response.status(),
            )));
        }

        let body: GeocodingResponse = response.json().await?;

        Ok(body
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|r| Location {
                id: r.id,
                name: r.name,
                country: r.country.unwrap_or_default(),
                latitude: r.latitude,
                longitude: r.longitude,
            })
            .collect())
    }

    async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
        location_name: &str,
    ) -> Result<WeatherSnapshot, GatewayError> {
        let response = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current_weather", "true".to_string()),
                (
                    "hourly",
                    "relativehumidity_2m,precipitation,pressure_msl".to_string(),
                ),
                (
                    "daily",
                    "temperature_2m_max,temperature_2m_min,weathercode,sunrise,sunset,\
                     windspeed_10m_max,winddirection_10m_dominant,precipitation_sum"
                        .to_string(),
                ),
                ("timezone", "auto".to_string()),
                ("past_days", PAST_DAYS.to_string()),
                // today plus the forecast days
                ("forecast_days", (FORECAST_DAYS + 1).to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::Network(Self::status_message(
                "Weather fetch",
                response.status(),
            )));
        }

        let payload: ForecastResponse = response.json().await?;
        let snapshot = transform::transform(&payload, location_name, Local::now().naive_local())?;

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_query_short_circuits_without_network() {
        // The endpoint is unroutable; a blank query must never reach it
        let client = OpenMeteoClient::with_base_urls(
            "http://127.0.0.1:1/search",
            "http://127.0.0.1:1/forecast",
        );

        let results = client
            .search_locations("   ")
            .await
            .expect("blank query should resolve without a request");
        assert!(results.is_empty());
    }

    #[test]
    fn test_geocoding_response_maps_to_locations() {
        let json = r#"{
            "results": [
                {"id": 2643743, "name": "London", "country": "United Kingdom",
                 "latitude": 51.5074, "longitude": -0.1278},
                {"id": 6058560, "name": "London", "country": "Canada",
                 "latitude": 42.9834, "longitude": -81.2497}
            ]
        }"#;

        let body: GeocodingResponse = serde_json::from_str(json).expect("should parse");
        let results = body.results.expect("results present");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 2643743);
        assert_eq!(results[1].country.as_deref(), Some("Canada"));
    }

    #[test]
    fn test_geocoding_response_without_results_parses() {
        let body: GeocodingResponse = serde_json::from_str("{}").expect("should parse");
        assert!(body.results.is_none());
    }

    #[test]
    fn test_status_message_uses_canonical_reason() {
        let msg = OpenMeteoClient::status_message("Geocoding", StatusCode::NOT_FOUND);
        assert_eq!(msg, "Geocoding failed: Not Found");

        let msg = OpenMeteoClient::status_message("Weather fetch", StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(msg, "Weather fetch failed: Service Unavailable");
    }
}
