//! Weather data for the trip planner.
//!
//! [`WeatherProvider`] is the seam between the `getWeather` / `planActivities`
//! tools and wherever the data comes from: [`OpenMeteo`] over HTTP, or
//! [`StaticWeather`] for offline use and tests.

mod open_meteo;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use open_meteo::OpenMeteo;

/// Errors from weather providers.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The location could not be resolved.
    #[error("location not found: {0}")]
    LocationNotFound(String),

    /// The upstream service failed or returned an unexpected payload.
    #[error("weather service error: {0}")]
    Upstream(String),

    /// HTTP transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for weather lookups.
pub type WeatherResult<T> = Result<T, WeatherError>;

/// One day of forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ForecastDay {
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    /// Human-readable condition, e.g. `Light rain`.
    pub condition: String,
    /// Daily high in °C.
    pub high: f64,
    /// Daily low in °C.
    pub low: f64,
}

/// Current conditions plus a daily forecast. This is the `getWeather` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WeatherReport {
    /// Resolved location name.
    pub location: String,
    /// Current temperature in °C.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    /// Daily forecast, starting today.
    pub forecast: Vec<ForecastDay>,
}

/// A source of weather data.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Current conditions and a `days`-day forecast for `location`.
    async fn report(&self, location: &str, days: u8) -> WeatherResult<WeatherReport>;
}

impl std::fmt::Debug for dyn WeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherProvider")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Human-readable description of a WMO weather interpretation code.
#[must_use]
pub fn describe_wmo_code(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 => "Light rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 | 67 => "Freezing rain",
        71 => "Light snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}

/// Whether `condition` keeps people indoors.
#[must_use]
pub fn is_wet(condition: &str) -> bool {
    let c = condition.to_ascii_lowercase();
    ["rain", "drizzle", "snow", "thunderstorm", "shower", "fog"]
        .iter()
        .any(|w| c.contains(w))
}

/// Deterministic offline weather.
///
/// Values are derived from the location name, so the same location always
/// gets the same report. Forecast dates start at `start` (today by default).
#[derive(Debug, Clone)]
pub struct StaticWeather {
    start: Option<NaiveDate>,
}

const STATIC_CODES: [u8; 7] = [0, 2, 61, 1, 3, 80, 0];

impl StaticWeather {
    /// Forecasts starting today.
    #[must_use]
    pub fn new() -> Self {
        Self { start: None }
    }

    /// Forecasts starting at `start`.
    #[must_use]
    pub fn starting(start: NaiveDate) -> Self {
        Self { start: Some(start) }
    }

    fn seed(location: &str) -> u32 {
        location
            .to_lowercase()
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)))
    }
}

impl Default for StaticWeather {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
#[allow(clippy::unnecessary_literal_bound)]
impl WeatherProvider for StaticWeather {
    fn name(&self) -> &str {
        "static"
    }

    async fn report(&self, location: &str, days: u8) -> WeatherResult<WeatherReport> {
        let location = location.trim();
        if location.is_empty() {
            return Err(WeatherError::LocationNotFound(location.to_owned()));
        }
        let seed = Self::seed(location);
        let base = f64::from(seed % 20) + 8.0;
        let start = self.start.unwrap_or_else(|| Utc::now().date_naive());

        let mut forecast = Vec::with_capacity(usize::from(days));
        for day in 0..days {
            let date = start
                .checked_add_days(Days::new(u64::from(day)))
                .ok_or_else(|| WeatherError::Upstream("forecast date out of range".into()))?;
            let idx = (seed.wrapping_add(u32::from(day)) % 7) as usize;
            let swing = f64::from(u32::from(day) % 3);
            forecast.push(ForecastDay {
                date: date.format("%Y-%m-%d").to_string(),
                condition: describe_wmo_code(STATIC_CODES[idx]).to_owned(),
                high: base + 6.0 + swing,
                low: base - 2.0 - swing,
            });
        }

        Ok(WeatherReport {
            location: location.to_owned(),
            temperature: base + 3.0,
            humidity: f64::from(seed % 50) + 40.0,
            wind_speed: f64::from(seed % 25) + 3.0,
            forecast,
        })
    }
}
