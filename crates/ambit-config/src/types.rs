//! Configuration types.
//!
//! These types mirror the sections of `config.toml` and carry no dependency on
//! the plugin crates; the CLI converts them into plugin options at startup.
//! Every struct implements [`Default`] matching `defaults.toml`, so a bare
//! `[section]` header produces a working configuration.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
    /// Which plugins load and where manifests are discovered.
    pub plugins: PluginsSection,
    /// Content moderation settings.
    pub moderation: ModerationSection,
    /// Weather data source for the trip planner.
    pub weather: WeatherSection,
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["ambit_plugins=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// PluginsSection
// ---------------------------------------------------------------------------

/// Plugin selection and discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsSection {
    /// Plugins to load. Empty means all.
    pub enabled: Vec<String>,
    /// Plugins never to load. Wins over `enabled`.
    pub disabled: Vec<String>,
    /// Extra directories searched for `plugin.toml` manifests.
    pub dirs: Vec<String>,
}

impl PluginsSection {
    /// Whether the plugin `id` should be loaded.
    #[must_use]
    pub fn is_enabled(&self, id: &str) -> bool {
        if self.disabled.iter().any(|d| d == id) {
            return false;
        }
        self.enabled.is_empty() || self.enabled.iter().any(|e| e == id)
    }
}

// ---------------------------------------------------------------------------
// ModerationSection
// ---------------------------------------------------------------------------

/// Content moderation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationSection {
    /// Terms matched as whole words, case-insensitively.
    pub blocked_terms: Vec<String>,
    /// `"block"`, `"redact"`, or `"warn"`.
    pub action: String,
}

impl Default for ModerationSection {
    fn default() -> Self {
        Self {
            blocked_terms: Vec::new(),
            action: "redact".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// WeatherSection
// ---------------------------------------------------------------------------

/// Weather provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSection {
    /// `"open-meteo"` (HTTP) or `"static"` (offline, deterministic).
    pub provider: String,
    /// HTTP request timeout for `open-meteo`.
    pub timeout_secs: u64,
}

impl Default for WeatherSection {
    fn default() -> Self {
        Self {
            provider: "open-meteo".to_owned(),
            timeout_secs: 10,
        }
    }
}
