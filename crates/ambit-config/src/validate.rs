//! Post-merge configuration validation.
//!
//! Validates that deserialized [`Config`](crate::Config) values are within
//! acceptable ranges and that cross-field invariants hold.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Accepted moderation actions.
pub const MODERATION_ACTIONS: [&str; 3] = ["block", "redact", "warn"];
/// Accepted weather providers.
pub const WEATHER_PROVIDERS: [&str; 2] = ["open-meteo", "static"];
/// Upper bound for `weather.timeout_secs`.
const MAX_WEATHER_TIMEOUT_SECS: u64 = 120;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_logging(config)?;
    validate_plugins(config)?;
    validate_moderation(config)?;
    validate_weather(config)?;
    Ok(())
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message,
    }
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        ));
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        ));
    }

    Ok(())
}

fn validate_plugins(config: &Config) -> ConfigResult<()> {
    let p = &config.plugins;
    if let Some(id) = p.enabled.iter().find(|id| p.disabled.contains(id)) {
        return Err(invalid(
            "plugins.enabled",
            format!("plugin '{id}' is both enabled and disabled"),
        ));
    }
    if p.dirs.iter().any(|d| d.trim().is_empty()) {
        return Err(invalid(
            "plugins.dirs",
            "plugin directories must not be empty".to_owned(),
        ));
    }
    Ok(())
}

fn validate_moderation(config: &Config) -> ConfigResult<()> {
    let m = &config.moderation;
    if !MODERATION_ACTIONS.contains(&m.action.as_str()) {
        return Err(invalid(
            "moderation.action",
            format!(
                "unsupported action '{}'; expected one of: {}",
                m.action,
                MODERATION_ACTIONS.join(", ")
            ),
        ));
    }
    if m.blocked_terms.iter().any(|t| t.trim().is_empty()) {
        return Err(invalid(
            "moderation.blocked_terms",
            "blocked terms must not be blank".to_owned(),
        ));
    }
    Ok(())
}

fn validate_weather(config: &Config) -> ConfigResult<()> {
    let w = &config.weather;
    if !WEATHER_PROVIDERS.contains(&w.provider.as_str()) {
        return Err(invalid(
            "weather.provider",
            format!(
                "unsupported provider '{}'; expected one of: {}",
                w.provider,
                WEATHER_PROVIDERS.join(", ")
            ),
        ));
    }
    if w.timeout_secs == 0 || w.timeout_secs > MAX_WEATHER_TIMEOUT_SECS {
        return Err(invalid(
            "weather.timeout_secs",
            format!("timeout_secs must be between 1 and {MAX_WEATHER_TIMEOUT_SECS}"),
        ));
    }
    Ok(())
}
