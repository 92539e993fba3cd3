//! Trip planner plugin: weather lookup, weather-aware itineraries, and an
//! agent that uses both.
//!
//! Capabilities: tools `getWeather` and `planActivities`, agent
//! `tripPlannerAgent`, storage adapter `trips`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use ambit_plugins::{
    CapabilityKind, InstructedAgent, MemoryStorage, PluginError, PluginFeatures, PluginId,
    PluginManifest, PluginResult, SchemaTool, StaticPlugin, ToolContext, TypedTool,
};

use crate::weather::{ForecastDay, WeatherProvider, WeatherReport, is_wet};

/// Plugin identifier.
pub const PLUGIN_ID: &str = "trip-planner";
/// Storage adapter holding planned itineraries, keyed by city.
pub const TRIPS_STORAGE: &str = "trips";
/// Forecast length returned by `getWeather`.
const WEATHER_DAYS: u8 = 7;

/// Input of `getWeather`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GetWeatherInput {
    /// City name.
    #[schemars(length(min = 1))]
    pub location: String,
}

/// `getWeather`: current conditions and a week of forecast.
pub struct GetWeather {
    provider: Arc<dyn WeatherProvider>,
}

impl GetWeather {
    /// Use `provider` for data.
    #[must_use]
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TypedTool for GetWeather {
    type Input = GetWeatherInput;
    type Output = WeatherReport;

    fn id(&self) -> &str {
        "getWeather"
    }

    fn description(&self) -> &str {
        "Get current weather and a 7-day forecast for a location"
    }

    async fn run(&self, input: GetWeatherInput, _ctx: &ToolContext<'_>) -> PluginResult<WeatherReport> {
        self.provider
            .report(&input.location, WEATHER_DAYS)
            .await
            .map_err(|e| PluginError::ExecutionFailed(e.to_string()))
    }
}

fn default_days() -> u8 {
    3
}

/// Input of `planActivities`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlanActivitiesInput {
    /// Destination city.
    #[schemars(length(min = 1))]
    pub city: String,
    /// Trip length in days.
    #[serde(default = "default_days")]
    #[schemars(range(min = 1, max = 14))]
    pub days: u8,
    /// Traveller interests, e.g. `museums` or `food`.
    #[serde(default)]
    pub interests: Vec<String>,
}

/// One day of a planned trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItineraryDay {
    /// 1-based day number.
    pub day: u8,
    /// ISO date.
    pub date: String,
    /// Forecast condition for the day.
    pub condition: String,
    /// Suggested activities.
    pub activities: Vec<String>,
}

/// Output of `planActivities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Itinerary {
    /// Destination city as resolved by the weather provider.
    pub city: String,
    /// One entry per day.
    pub itinerary: Vec<ItineraryDay>,
}

/// `planActivities`: build a day-by-day plan around the forecast and store it.
pub struct PlanActivities {
    provider: Arc<dyn WeatherProvider>,
}

impl PlanActivities {
    /// Use `provider` for the forecast.
    #[must_use]
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }
}

fn activities_for(city: &str, forecast: &ForecastDay, interests: &[String], day: usize) -> Vec<String> {
    let mut activities = if is_wet(&forecast.condition) {
        vec![
            format!("Visit a museum in {city}"),
            "Try a local café".to_string(),
        ]
    } else {
        vec![
            format!("Walking tour of {city}"),
            "Picnic in a park".to_string(),
        ]
    };
    if let Some(interest) = day
        .checked_rem(interests.len())
        .and_then(|i| interests.get(i))
    {
        activities.push(format!("Explore {interest} in {city}"));
    }
    activities
}

fn plan(report: &WeatherReport, days: u8, interests: &[String]) -> Itinerary {
    let itinerary = report
        .forecast
        .iter()
        .take(usize::from(days))
        .enumerate()
        .map(|(i, forecast)| ItineraryDay {
            day: u8::try_from(i).map_or(u8::MAX, |d| d.saturating_add(1)),
            date: forecast.date.clone(),
            condition: forecast.condition.clone(),
            activities: activities_for(&report.location, forecast, interests, i),
        })
        .collect();
    Itinerary {
        city: report.location.clone(),
        itinerary,
    }
}

fn trip_key(city: &str) -> String {
    city.trim().to_lowercase().replace(char::is_whitespace, "-")
}

#[async_trait]
impl TypedTool for PlanActivities {
    type Input = PlanActivitiesInput;
    type Output = Itinerary;

    fn id(&self) -> &str {
        "planActivities"
    }

    fn description(&self) -> &str {
        "Plan day-by-day activities for a trip based on the weather forecast"
    }

    async fn run(&self, input: PlanActivitiesInput, ctx: &ToolContext<'_>) -> PluginResult<Itinerary> {
        let trips = ctx.storage(TRIPS_STORAGE)?;
        let report = self
            .provider
            .report(&input.city, input.days)
            .await
            .map_err(|e| PluginError::ExecutionFailed(e.to_string()))?;

        let itinerary = plan(&report, input.days, &input.interests);
        let stored = serde_json::json!({
            "plannedAt": Utc::now().to_rfc3339(),
            "itinerary": &itinerary,
        });
        trips.put(&trip_key(&itinerary.city), stored).await?;
        info!(city = %itinerary.city, days = itinerary.itinerary.len(), "Planned trip");
        Ok(itinerary)
    }
}

/// The trip planner agent.
#[must_use]
pub fn agent() -> InstructedAgent {
    InstructedAgent::new(
        "tripPlannerAgent",
        "Plans trips around the weather",
        "You are a travel planner. Check the weather for the destination with \
         getWeather, then build an itinerary with planActivities. Prefer indoor \
         activities on wet days and keep suggestions concrete.",
    )
    .with_tool("getWeather")
    .with_tool("planActivities")
}

/// The plugin manifest.
#[must_use]
pub fn manifest() -> PluginManifest {
    PluginManifest::new(PluginId::from_static(PLUGIN_ID), "Trip Planner", "0.1.0")
        .with_description("Weather lookup and weather-aware trip itineraries")
        .with_features(PluginFeatures::from_kinds(&[
            CapabilityKind::Tools,
            CapabilityKind::Agents,
            CapabilityKind::Storage,
        ]))
}

/// The assembled plugin, using `provider` for weather data.
#[must_use]
pub fn plugin(provider: Arc<dyn WeatherProvider>) -> StaticPlugin {
    StaticPlugin::new(manifest())
        .with_tool(Arc::new(SchemaTool::new(GetWeather::new(Arc::clone(&provider)))))
        .with_tool(Arc::new(SchemaTool::new(PlanActivities::new(provider))))
        .with_agent(Arc::new(agent()))
        .with_storage(Arc::new(MemoryStorage::new(TRIPS_STORAGE)))
}
