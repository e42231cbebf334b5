//! Transformation of raw Open-Meteo forecast payloads
//!
//! This module owns all of the date/index arithmetic and numeric rounding
//! that turns the provider's parallel arrays into a [`WeatherSnapshot`].
//! The daily series is requested as 3 past days + today + 3 forecast days,
//! so "today" always sits at [`TODAY_INDEX`] and the series must span
//! exactly [`TIMELINE_DAYS`] entries; anything else fails loudly instead of
//! reading out of bounds.

use chrono::{NaiveDateTime, Timelike};
use serde::Deserialize;
use thiserror::Error;

use super::{CurrentConditions, DailyForecast, WeatherSnapshot};

/// Position of "today" within the daily series (0-indexed)
pub const TODAY_INDEX: usize = 3;

/// Days of history requested from the provider (`past_days`)
pub const PAST_DAYS: usize = 3;

/// Forecast days beyond today requested from the provider
pub const FORECAST_DAYS: usize = 3;

/// Total length of the daily series: history + today + forecast
pub const TIMELINE_DAYS: usize = PAST_DAYS + 1 + FORECAST_DAYS;

/// Hourly samples per calendar day
pub const HOURS_PER_DAY: usize = 24;

/// Errors that can occur while shaping a forecast payload
#[derive(Debug, Error)]
pub enum TransformError {
    /// The daily series does not span history + today + forecast
    #[error("expected 7 daily entries, got {0}")]
    WrongDailySpan(usize),

    /// Required daily arrays disagree on length
    #[error("daily arrays have inconsistent lengths")]
    InconsistentDaily,

    /// Hourly arrays disagree with the hourly time axis on length
    #[error("hourly arrays have inconsistent lengths")]
    InconsistentHourly,
}

/// Raw forecast response from Open-Meteo
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub current_weather: CurrentWeatherBlock,
    pub hourly: HourlyBlock,
    pub daily: DailyBlock,
}

/// Instantaneous conditions block (`current_weather=true`)
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeatherBlock {
    pub temperature: f64,
    pub weathercode: i32,
    pub windspeed: f64,
    pub winddirection: f64,
}

/// Hourly time series; samples may be null in the provider payload
#[derive(Debug, Clone, Deserialize)]
pub struct HourlyBlock {
    pub time: Vec<String>,
    pub relativehumidity_2m: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub pressure_msl: Vec<Option<f64>>,
}

/// Daily time series; wind and precipitation-sum arrays are optional
#[derive(Debug, Clone, Deserialize)]
pub struct DailyBlock {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
    pub weathercode: Vec<i32>,
    pub sunrise: Vec<String>,
    pub sunset: Vec<String>,
    #[serde(default)]
    pub windspeed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub winddirection_10m_dominant: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
}

/// Shapes a raw forecast payload into a [`WeatherSnapshot`].
///
/// Pure and deterministic given the payload and `now`. `now` is the
/// evaluation instant in the payload's local-civil timezone
/// (`timezone=auto`) and is only used to pick the hourly sample that feeds
/// the current humidity/precipitation/pressure; callers inject it so tests
/// can pin the clock.
pub fn transform(
    response: &ForecastResponse,
    location_name: &str,
    now: NaiveDateTime,
) -> Result<WeatherSnapshot, TransformError> {
    let daily = &response.daily;
    let hourly = &response.hourly;

    validate(daily, hourly)?;

    let days: Vec<DailyForecast> = (0..TIMELINE_DAYS)
        .map(|i| build_day(daily, hourly, i))
        .collect();

    let today = days[TODAY_INDEX].clone();
    let current = build_current(&response.current_weather, hourly, &today, now);

    let mut days = days;
    let forecast = days.split_off(TODAY_INDEX + 1);
    days.truncate(TODAY_INDEX);
    let history = days;

    Ok(WeatherSnapshot {
        location_name: location_name.to_string(),
        current,
        today,
        history,
        forecast,
    })
}

/// Rejects payloads whose array lengths cannot be indexed safely.
fn validate(daily: &DailyBlock, hourly: &HourlyBlock) -> Result<(), TransformError> {
    if daily.time.len() != TIMELINE_DAYS {
        return Err(TransformError::WrongDailySpan(daily.time.len()));
    }

    let len = daily.time.len();
    if daily.temperature_2m_max.len() != len
        || daily.temperature_2m_min.len() != len
        || daily.weathercode.len() != len
        || daily.sunrise.len() != len
        || daily.sunset.len() != len
    {
        return Err(TransformError::InconsistentDaily);
    }

    let hours = hourly.time.len();
    if hourly.relativehumidity_2m.len() != hours
        || hourly.precipitation.len() != hours
        || hourly.pressure_msl.len() != hours
    {
        return Err(TransformError::InconsistentHourly);
    }

    Ok(())
}

/// Builds the aggregate for day `i` of the daily series.
fn build_day(daily: &DailyBlock, hourly: &HourlyBlock, i: usize) -> DailyForecast {
    let max_temp = daily.temperature_2m_max[i].round() as i32;
    let min_temp = daily.temperature_2m_min[i].round() as i32;
    let avg_temp = (f64::from(max_temp + min_temp) / 2.0).round() as i32;

    DailyForecast {
        date: daily.time[i].clone(),
        max_temp,
        min_temp,
        avg_temp,
        weather_code: daily.weathercode[i],
        wind_speed: optional_at(&daily.windspeed_10m_max, i)
            .map(f64::round)
            .unwrap_or(0.0),
        wind_direction: optional_at(&daily.winddirection_10m_dominant, i)
            .map(|d| d.round() as i32)
            .unwrap_or(0),
        humidity: day_mean(&hourly.relativehumidity_2m, i).round() as i32,
        precipitation: round_one_decimal(optional_at(&daily.precipitation_sum, i).unwrap_or(0.0)),
        pressure: day_mean(&hourly.pressure_msl, i).round() as i32,
        sunrise: daily.sunrise[i].clone(),
        sunset: daily.sunset[i].clone(),
    }
}

/// Merges the instantaneous block with today's extremes and the hourly
/// sample matching `now`.
fn build_current(
    current: &CurrentWeatherBlock,
    hourly: &HourlyBlock,
    today: &DailyForecast,
    now: NaiveDateTime,
) -> CurrentConditions {
    let hour_index = current_hour_index(&hourly.time, now)
        .unwrap_or(TODAY_INDEX * HOURS_PER_DAY + now.hour() as usize);

    CurrentConditions {
        temp: current.temperature.round() as i32,
        max_temp: today.max_temp,
        min_temp: today.min_temp,
        weather_code: current.weathercode,
        wind_speed: current.windspeed,
        wind_direction: current.winddirection.round() as i32,
        humidity: optional_at(&hourly.relativehumidity_2m, hour_index)
            .map(|h| h.round() as i32)
            .unwrap_or(0),
        precipitation: round_one_decimal(
            optional_at(&hourly.precipitation, hour_index).unwrap_or(0.0),
        ),
        pressure: optional_at(&hourly.pressure_msl, hour_index)
            .map(|p| p.round() as i32)
            .unwrap_or(0),
        sunrise: today.sunrise.clone(),
        sunset: today.sunset.clone(),
    }
}

/// Finds the hourly index whose calendar date and civil hour match `now`.
fn current_hour_index(times: &[String], now: NaiveDateTime) -> Option<usize> {
    times.iter().position(|time| {
        NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
            .map(|t| t.date() == now.date() && t.hour() == now.hour())
            .unwrap_or(false)
    })
}

/// Arithmetic mean of day `i`'s hourly samples, skipping null or
/// non-finite entries. A day with no valid samples reads as 0.
fn day_mean(samples: &[Option<f64>], day: usize) -> f64 {
    let start = day * HOURS_PER_DAY;
    let end = (start + HOURS_PER_DAY).min(samples.len());
    if start >= end {
        return 0.0;
    }

    let valid: Vec<f64> = samples[start..end]
        .iter()
        .filter_map(|s| *s)
        .filter(|v| v.is_finite())
        .collect();

    if valid.is_empty() {
        0.0
    } else {
        valid.iter().sum::<f64>() / valid.len() as f64
    }
}

/// Sample at `index`, treating out-of-range and non-finite values as absent.
fn optional_at(samples: &[Option<f64>], index: usize) -> Option<f64> {
    samples
        .get(index)
        .copied()
        .flatten()
        .filter(|v| v.is_finite())
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Dates covered by the fixture payload: 3 past days, today, 3 forecast
    const FIXTURE_DATES: [&str; 7] = [
        "2026-02-03",
        "2026-02-04",
        "2026-02-05",
        "2026-02-06",
        "2026-02-07",
        "2026-02-08",
        "2026-02-09",
    ];

    fn fixture_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 6)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    /// Builds a well-formed 7-day payload. Hourly humidity is `40 + day`
    /// and pressure `1000 + day` so per-day means are distinguishable;
    /// the sample matching `fixture_now` (index 86) is marked with
    /// distinct values to verify the exact-hour lookup.
    fn fixture() -> ForecastResponse {
        let mut time = Vec::new();
        let mut humidity = Vec::new();
        let mut precipitation = Vec::new();
        let mut pressure = Vec::new();

        for (day, date) in FIXTURE_DATES.iter().enumerate() {
            for hour in 0..HOURS_PER_DAY {
                time.push(format!("{date}T{hour:02}:00"));
                humidity.push(Some(40.0 + day as f64));
                precipitation.push(Some(0.2));
                pressure.push(Some(1000.0 + day as f64));
            }
        }

        // 2026-02-06T14:00 = day 3, hour 14
        let now_index = TODAY_INDEX * HOURS_PER_DAY + 14;
        humidity[now_index] = Some(99.0);
        precipitation[now_index] = Some(1.23);
        pressure[now_index] = Some(1020.0);

        ForecastResponse {
            current_weather: CurrentWeatherBlock {
                temperature: 21.6,
                weathercode: 2,
                windspeed: 12.5,
                winddirection: 269.6,
            },
            hourly: HourlyBlock {
                time,
                relativehumidity_2m: humidity,
                precipitation,
                pressure_msl: pressure,
            },
            daily: DailyBlock {
                time: FIXTURE_DATES.iter().map(|d| d.to_string()).collect(),
                temperature_2m_max: vec![10.4, 12.0, 14.6, 24.6, 20.0, 18.2, 16.0],
                temperature_2m_min: vec![2.2, 3.0, 4.4, 17.4, 12.0, 10.6, 8.0],
                weathercode: vec![0, 1, 2, 3, 61, 71, 95],
                sunrise: FIXTURE_DATES.iter().map(|d| format!("{d}T07:30")).collect(),
                sunset: FIXTURE_DATES.iter().map(|d| format!("{d}T17:05")).collect(),
                windspeed_10m_max: vec![Some(10.2); 7],
                winddirection_10m_dominant: vec![Some(180.4); 7],
                precipitation_sum: vec![Some(1.25); 7],
            },
        }
    }

    #[test]
    fn test_transform_is_deterministic() {
        let payload = fixture();
        let a = transform(&payload, "London, United Kingdom", fixture_now())
            .expect("transform should succeed");
        let b = transform(&payload, "London, United Kingdom", fixture_now())
            .expect("transform should succeed");
        assert_eq!(a, b);
    }

    #[test]
    fn test_timeline_is_contiguous_and_ascending() {
        let snapshot = transform(&fixture(), "London", fixture_now()).expect("should transform");

        assert_eq!(snapshot.history.len(), 3);
        assert_eq!(snapshot.forecast.len(), 3);

        let timeline = snapshot.timeline();
        assert_eq!(timeline.len(), 7);

        for pair in timeline.windows(2) {
            let a = NaiveDate::parse_from_str(&pair[0].date, "%Y-%m-%d").expect("valid date");
            let b = NaiveDate::parse_from_str(&pair[1].date, "%Y-%m-%d").expect("valid date");
            assert_eq!(
                (b - a).num_days(),
                1,
                "timeline should have no gaps: {} -> {}",
                pair[0].date,
                pair[1].date
            );
        }
    }

    #[test]
    fn test_today_sits_at_fixed_index() {
        let snapshot = transform(&fixture(), "London", fixture_now()).expect("should transform");
        assert_eq!(snapshot.today.date, FIXTURE_DATES[TODAY_INDEX]);
        assert_eq!(snapshot.history[0].date, FIXTURE_DATES[0]);
        assert_eq!(snapshot.forecast[2].date, FIXTURE_DATES[6]);
    }

    #[test]
    fn test_temperatures_round_to_nearest_integer() {
        let snapshot = transform(&fixture(), "London", fixture_now()).expect("should transform");
        // today: max 24.6 -> 25, min 17.4 -> 17
        assert_eq!(snapshot.today.max_temp, 25);
        assert_eq!(snapshot.today.min_temp, 17);
    }

    #[test]
    fn test_average_invariant_holds_for_every_day() {
        let snapshot = transform(&fixture(), "London", fixture_now()).expect("should transform");
        for day in snapshot.timeline() {
            let expected = (f64::from(day.max_temp + day.min_temp) / 2.0).round() as i32;
            assert_eq!(day.avg_temp, expected, "avg invariant broken on {}", day.date);
        }
    }

    #[test]
    fn test_precipitation_rounds_to_one_decimal() {
        let snapshot = transform(&fixture(), "London", fixture_now()).expect("should transform");
        // sum 1.25 -> 1.3
        assert!((snapshot.today.precipitation - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_wind_defaults_to_zero_when_arrays_absent() {
        let mut payload = fixture();
        payload.daily.windspeed_10m_max = Vec::new();
        payload.daily.winddirection_10m_dominant = Vec::new();
        payload.daily.precipitation_sum = Vec::new();

        let snapshot = transform(&payload, "London", fixture_now()).expect("should transform");
        assert!((snapshot.today.wind_speed - 0.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.today.wind_direction, 0);
        assert!((snapshot.today.precipitation - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_humidity_is_daily_mean_of_hourly_samples() {
        let snapshot = transform(&fixture(), "London", fixture_now()).expect("should transform");
        // day 0 samples are all 40.0
        assert_eq!(snapshot.history[0].humidity, 40);
        assert_eq!(snapshot.history[0].pressure, 1000);
        // day 6 samples are all 46.0
        assert_eq!(snapshot.forecast[2].humidity, 46);
        assert_eq!(snapshot.forecast[2].pressure, 1006);
    }

    #[test]
    fn test_mean_excludes_null_samples() {
        let mut payload = fixture();
        // day 0: half the humidity samples null, the rest 80
        for hour in 0..HOURS_PER_DAY {
            payload.hourly.relativehumidity_2m[hour] =
                if hour % 2 == 0 { None } else { Some(80.0) };
        }

        let snapshot = transform(&payload, "London", fixture_now()).expect("should transform");
        assert_eq!(snapshot.history[0].humidity, 80);
    }

    #[test]
    fn test_all_null_day_reads_as_zero() {
        let mut payload = fixture();
        for hour in 0..HOURS_PER_DAY {
            payload.hourly.relativehumidity_2m[hour] = None;
            payload.hourly.pressure_msl[hour] = None;
        }

        let snapshot = transform(&payload, "London", fixture_now()).expect("should transform");
        assert_eq!(snapshot.history[0].humidity, 0);
        assert_eq!(snapshot.history[0].pressure, 0);
    }

    #[test]
    fn test_current_borrows_todays_extremes_and_sun_times() {
        let snapshot = transform(&fixture(), "London", fixture_now()).expect("should transform");
        assert_eq!(snapshot.current.max_temp, snapshot.today.max_temp);
        assert_eq!(snapshot.current.min_temp, snapshot.today.min_temp);
        assert_eq!(snapshot.current.sunrise, snapshot.today.sunrise);
        assert_eq!(snapshot.current.sunset, snapshot.today.sunset);
    }

    #[test]
    fn test_current_reads_the_matching_hourly_sample() {
        let snapshot = transform(&fixture(), "London", fixture_now()).expect("should transform");
        // the fixture marks 2026-02-06T14:00 with distinct values
        assert_eq!(snapshot.current.humidity, 99);
        assert!((snapshot.current.precipitation - 1.2).abs() < 1e-9);
        assert_eq!(snapshot.current.pressure, 1020);
    }

    #[test]
    fn test_current_instantaneous_fields_come_from_current_block() {
        let snapshot = transform(&fixture(), "London", fixture_now()).expect("should transform");
        assert_eq!(snapshot.current.temp, 22); // 21.6 rounded
        assert_eq!(snapshot.current.weather_code, 2);
        assert!((snapshot.current.wind_speed - 12.5).abs() < f64::EPSILON);
        assert_eq!(snapshot.current.wind_direction, 270); // 269.6 rounded
    }

    #[test]
    fn test_current_hour_falls_back_to_todays_slot() {
        // "now" on a date outside the payload: no exact match, so the
        // lookup falls back to hour 10 of the day at TODAY_INDEX
        let now = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        let snapshot = transform(&fixture(), "London", now).expect("should transform");
        // day 3 regular samples: humidity 43, pressure 1003
        assert_eq!(snapshot.current.humidity, 43);
        assert_eq!(snapshot.current.pressure, 1003);
    }

    #[test]
    fn test_wrong_daily_span_is_rejected() {
        let mut payload = fixture();
        payload.daily.time.pop();
        payload.daily.temperature_2m_max.pop();
        payload.daily.temperature_2m_min.pop();
        payload.daily.weathercode.pop();
        payload.daily.sunrise.pop();
        payload.daily.sunset.pop();

        let result = transform(&payload, "London", fixture_now());
        match result {
            Err(TransformError::WrongDailySpan(n)) => assert_eq!(n, 6),
            other => panic!("Expected WrongDailySpan, got {other:?}"),
        }
    }

    #[test]
    fn test_inconsistent_daily_arrays_are_rejected() {
        let mut payload = fixture();
        payload.daily.temperature_2m_min.pop();

        let result = transform(&payload, "London", fixture_now());
        assert!(matches!(result, Err(TransformError::InconsistentDaily)));
    }

    #[test]
    fn test_inconsistent_hourly_arrays_are_rejected() {
        let mut payload = fixture();
        payload.hourly.pressure_msl.pop();

        let result = transform(&payload, "London", fixture_now());
        assert!(matches!(result, Err(TransformError::InconsistentHourly)));
    }

    #[test]
    fn test_payload_deserializes_from_provider_json() {
        let json = r#"{
            "current_weather": {
                "time": "2026-02-06T14:00",
                "temperature": 21.6,
                "weathercode": 2,
                "windspeed": 12.5,
                "winddirection": 269.6
            },
            "hourly": {
                "time": ["2026-02-06T00:00", "2026-02-06T01:00"],
                "relativehumidity_2m": [65, null],
                "precipitation": [0.0, 0.1],
                "pressure_msl": [1013.2, null]
            },
            "daily": {
                "time": ["2026-02-06"],
                "temperature_2m_max": [24.6],
                "temperature_2m_min": [17.4],
                "weathercode": [3],
                "sunrise": ["2026-02-06T07:30"],
                "sunset": ["2026-02-06T17:05"],
                "windspeed_10m_max": [10.2],
                "winddirection_10m_dominant": [180.4],
                "precipitation_sum": [1.25]
            }
        }"#;

        let payload: ForecastResponse =
            serde_json::from_str(json).expect("Failed to parse provider JSON");
        assert_eq!(payload.hourly.relativehumidity_2m[1], None);
        assert_eq!(payload.daily.weathercode[0], 3);
    }
}
