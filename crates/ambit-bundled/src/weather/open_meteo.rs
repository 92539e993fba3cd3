//! Open-Meteo weather provider.
//!
//! Resolves the location with the Open-Meteo geocoding API, then fetches
//! current conditions and a daily forecast. No API key is required.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{ForecastDay, WeatherError, WeatherProvider, WeatherReport, WeatherResult, describe_wmo_code};

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Default HTTP request timeout (10 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Open-Meteo only serves this many forecast days.
const MAX_FORECAST_DAYS: u8 = 16;

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    weather_code: Vec<u8>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
}

/// Weather from the public Open-Meteo API.
#[derive(Debug, Clone)]
pub struct OpenMeteo {
    client: reqwest::Client,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteo {
    /// Create a provider with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::Http`] if the HTTP client cannot be built.
    pub fn new() -> WeatherResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a provider with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::Http`] if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> WeatherResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ambit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            geocoding_url: GEOCODING_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
        })
    }

    /// Override both endpoint URLs (for self-hosted instances).
    #[must_use]
    pub fn with_endpoints(mut self, geocoding: impl Into<String>, forecast: impl Into<String>) -> Self {
        self.geocoding_url = geocoding.into();
        self.forecast_url = forecast.into();
        self
    }

    async fn geocode(&self, location: &str) -> WeatherResult<GeocodingResult> {
        let response: GeocodingResponse = self
            .client
            .get(&self.geocoding_url)
            .query(&[("name", location), ("count", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(location.to_owned()))
    }
}

fn into_report(name: String, forecast: ForecastResponse) -> WeatherResult<WeatherReport> {
    let daily = forecast.daily;
    let len = daily.time.len();
    if daily.weather_code.len() != len
        || daily.temperature_2m_max.len() != len
        || daily.temperature_2m_min.len() != len
    {
        return Err(WeatherError::Upstream(
            "daily forecast arrays have mismatched lengths".into(),
        ));
    }

    let days = daily
        .time
        .into_iter()
        .zip(daily.weather_code)
        .zip(daily.temperature_2m_max.into_iter().zip(daily.temperature_2m_min))
        .map(|((date, code), (high, low))| ForecastDay {
            date,
            condition: describe_wmo_code(code).to_owned(),
            high,
            low,
        })
        .collect();

    Ok(WeatherReport {
        location: name,
        temperature: forecast.current.temperature_2m,
        humidity: forecast.current.relative_humidity_2m,
        wind_speed: forecast.current.wind_speed_10m,
        forecast: days,
    })
}

#[async_trait]
#[allow(clippy::unnecessary_literal_bound)]
impl WeatherProvider for OpenMeteo {
    fn name(&self) -> &str {
        "open-meteo"
    }

    async fn report(&self, location: &str, days: u8) -> WeatherResult<WeatherReport> {
        let place = self.geocode(location).await?;
        debug!(
            location,
            resolved = %place.name,
            latitude = place.latitude,
            longitude = place.longitude,
            "Geocoded location"
        );

        let days = days.clamp(1, MAX_FORECAST_DAYS).to_string();
        let latitude = place.latitude.to_string();
        let longitude = place.longitude.to_string();
        let forecast: ForecastResponse = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                (
                    "current",
                    "temperature_2m,relative_humidity_2m,wind_speed_10m",
                ),
                (
                    "daily",
                    "weather_code,temperature_2m_max,temperature_2m_min",
                ),
                ("timezone", "auto"),
                ("forecast_days", days.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        into_report(place.name, forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_forecast() -> ForecastResponse {
        serde_json::from_str(
            r#"{
                "current": {"temperature_2m": 18.2, "relative_humidity_2m": 71, "wind_speed_10m": 9.4},
                "daily": {
                    "time": ["2026-10-16", "2026-10-17"],
                    "weather_code": [3, 63],
                    "temperature_2m_max": [20.1, 17.5],
                    "temperature_2m_min": [12.0, 11.2]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_into_report_maps_fields() {
        let report = into_report("Porto".into(), sample_forecast()).unwrap();
        assert_eq!(report.location, "Porto");
        assert_eq!(report.humidity, 71.0);
        assert_eq!(report.forecast.len(), 2);
        assert_eq!(report.forecast[1].condition, "Moderate rain");
        assert_eq!(report.forecast[1].low, 11.2);
    }

    #[test]
    fn test_into_report_rejects_ragged_arrays() {
        let mut forecast = sample_forecast();
        forecast.daily.weather_code.pop();
        assert!(matches!(
            into_report("Porto".into(), forecast),
            Err(WeatherError::Upstream(_))
        ));
    }

    #[test]
    fn test_geocoding_without_results() {
        let parsed: GeocodingResponse = serde_json::from_str(r#"{"generationtime_ms": 0.5}"#).unwrap();
        assert!(parsed.results.is_empty());
    }
}
