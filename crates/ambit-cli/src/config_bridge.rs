//! Bridge from `ambit_config::Config` to the types the CLI composes.
//!
//! The config crate keeps plugin settings as plain strings so it does not
//! depend on the plugin crates; this module turns them into the typed
//! options the bundled plugins and the telemetry crate expect.

use std::sync::Arc;
use std::time::Duration;

use ambit_bundled::{BundledOptions, ModerationAction, OpenMeteo, StaticWeather, WeatherProvider};
use ambit_config::{Config, WeatherSection};
use ambit_plugins::HostRegistry;
use ambit_telemetry::LogConfig;
use anyhow::{Context, bail};
use tracing::debug;

/// Logging settings from the `[logging]` section.
pub(crate) fn to_log_config(config: &Config) -> anyhow::Result<LogConfig> {
    LogConfig::from_section(&config.logging).context("invalid [logging] section")
}

/// The weather source named by `[weather] provider`.
pub(crate) fn weather_provider(section: &WeatherSection) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    match section.provider.as_str() {
        "static" => Ok(Arc::new(StaticWeather::new())),
        "open-meteo" => {
            let provider = OpenMeteo::with_timeout(Duration::from_secs(section.timeout_secs))
                .context("failed to build the Open-Meteo client")?;
            Ok(Arc::new(provider))
        },
        other => bail!("unknown weather provider '{other}'"),
    }
}

/// Options for the bundled plugins.
pub(crate) fn to_bundled_options(config: &Config) -> anyhow::Result<BundledOptions> {
    let moderation_action: ModerationAction = config
        .moderation
        .action
        .parse()
        .context("invalid [moderation] action")?;

    Ok(BundledOptions {
        weather: weather_provider(&config.weather)?,
        blocked_terms: config.moderation.blocked_terms.clone(),
        moderation_action,
    })
}

/// A registry holding every bundled plugin `[plugins]` enables.
pub(crate) fn build_registry(config: &Config) -> anyhow::Result<HostRegistry> {
    let options = to_bundled_options(config)?;
    let mut registry = HostRegistry::new();
    let count = ambit_bundled::register_filtered(&mut registry, &options, |id| {
        config.plugins.is_enabled(id)
    })
    .context("failed to register bundled plugins")?;
    debug!(count, "Host registry ready");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambit_plugins::PluginId;
    use ambit_telemetry::LogFormat;

    fn offline_config() -> Config {
        let mut config = Config::default();
        config.weather.provider = "static".into();
        config
    }

    #[test]
    fn test_log_config_from_defaults() {
        let log = to_log_config(&Config::default()).unwrap();
        assert_eq!(log.level, "info");
        assert_eq!(log.format, LogFormat::Compact);
    }

    #[test]
    fn test_bundled_options_map_moderation() {
        let mut config = offline_config();
        config.moderation.blocked_terms = vec!["spam".into()];
        config.moderation.action = "block".into();

        let options = to_bundled_options(&config).unwrap();
        assert_eq!(options.moderation_action, ModerationAction::Block);
        assert_eq!(options.blocked_terms, vec!["spam"]);
        assert_eq!(options.weather.name(), "static");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut section = offline_config().weather;
        section.provider = "almanac".into();
        assert!(weather_provider(&section).is_err());
    }

    #[test]
    fn test_registry_honours_plugin_selection() {
        let mut config = offline_config();
        config.plugins.disabled = vec!["research-bot".into()];

        let registry = build_registry(&config).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(!registry.contains(&PluginId::from_static("research-bot")));
        assert!(registry.contains(&PluginId::from_static("trip-planner")));
    }
}
