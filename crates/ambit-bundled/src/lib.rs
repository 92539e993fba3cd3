//! Ambit Bundled - example plugins that ship with Ambit.
//!
//! Four plugins, each exercising a different slice of the capability model:
//!
//! - [`trip_planner`]: tools, an agent, and a storage adapter, backed by a
//!   [`WeatherProvider`].
//! - [`research_bot`]: a tool that delegates to a collaborator agent.
//! - [`ask_user`]: human-in-the-loop tools that suspend, plus the UI
//!   components rendering them.
//! - [`moderation`]: an input processor screening for blocked terms.
//!
//! [`register_all`] installs all of them into a [`HostRegistry`].

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod ask_user;
pub mod moderation;
pub mod research_bot;
pub mod trip_planner;
pub mod weather;

use std::sync::Arc;

use ambit_plugins::{HostRegistry, Plugin, PluginResult, StaticPlugin};
use tracing::info;

pub use moderation::{ContentModeration, ModerationAction, ParseActionError};
pub use weather::{OpenMeteo, StaticWeather, WeatherError, WeatherProvider, WeatherReport};

/// Settings the bundled plugins are built from.
#[derive(Debug, Clone)]
pub struct BundledOptions {
    /// Weather source for the trip planner.
    pub weather: Arc<dyn WeatherProvider>,
    /// Terms the moderation processor looks for.
    pub blocked_terms: Vec<String>,
    /// What the moderation processor does on a match.
    pub moderation_action: ModerationAction,
}

impl Default for BundledOptions {
    /// Offline weather and no blocked terms.
    fn default() -> Self {
        Self {
            weather: Arc::new(StaticWeather::new()),
            blocked_terms: Vec::new(),
            moderation_action: ModerationAction::default(),
        }
    }
}

/// Every bundled plugin, sorted by id.
///
/// # Errors
///
/// Returns an error if the moderation term list cannot be compiled.
pub fn all_plugins(options: &BundledOptions) -> PluginResult<Vec<StaticPlugin>> {
    Ok(vec![
        ask_user::plugin(),
        moderation::plugin(&options.blocked_terms, options.moderation_action)?,
        research_bot::plugin(),
        trip_planner::plugin(Arc::clone(&options.weather)),
    ])
}

/// Register every bundled plugin whose id `keep` accepts.
///
/// Registration stops at the first failure; plugins registered before it
/// stay registered.
///
/// # Errors
///
/// Returns the first build or registration failure.
pub fn register_filtered(
    registry: &mut HostRegistry,
    options: &BundledOptions,
    keep: impl Fn(&str) -> bool,
) -> PluginResult<usize> {
    let mut count = 0usize;
    for plugin in all_plugins(options)? {
        if !keep(plugin.manifest().id.as_str()) {
            continue;
        }
        registry.register(Box::new(plugin))?;
        count = count.saturating_add(1);
    }
    info!(count, weather = options.weather.name(), "Registered bundled plugins");
    Ok(count)
}

/// Register every bundled plugin.
///
/// # Errors
///
/// See [`register_filtered`].
pub fn register_all(registry: &mut HostRegistry, options: &BundledOptions) -> PluginResult<usize> {
    register_filtered(registry, options, |_| true)
}
