//! Deep merge of TOML value trees with per-field source tracking.
//!
//! The merge operates on raw [`toml::Value`] trees rather than deserialized
//! structs, so a key absent from an overlay never overrides the base layer.

use std::collections::HashMap;

/// Which configuration layer a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Compiled-in defaults (`defaults.toml`).
    Defaults,
    /// User-level configuration (`~/.ambit/config.toml`).
    User,
    /// Workspace-level configuration (`{workspace}/.ambit/config.toml`).
    Workspace,
    /// Environment variable fallback.
    Environment,
}

impl ConfigLayer {
    /// Whether the value came from a config file.
    #[must_use]
    pub fn is_file(self) -> bool {
        matches!(self, Self::User | Self::Workspace)
    }
}

impl std::fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defaults => write!(f, "defaults"),
            Self::User => write!(f, "user"),
            Self::Workspace => write!(f, "workspace"),
            Self::Environment => write!(f, "env"),
        }
    }
}

/// Tracks which layer set each field's value, keyed by dotted path.
pub type FieldSources = HashMap<String, ConfigLayer>;

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Deep-merge `overlay` into `base`, recording which layer set each leaf.
///
/// Tables merge per key; scalars and arrays from the overlay replace the
/// base value.
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    layer: ConfigLayer,
    sources: &mut FieldSources,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = join(prefix, key);
                if let Some(base_val) = base_table.get_mut(key) {
                    if overlay_val.is_table() {
                        deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
                    } else {
                        *base_val = overlay_val.clone();
                        sources.insert(path, layer);
                    }
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                    record_leaves(overlay_val, &path, layer, sources);
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            sources.insert(prefix.to_owned(), layer);
        },
    }
}

/// Record every leaf path under `val` as coming from `layer`.
pub fn record_leaves(val: &toml::Value, prefix: &str, layer: ConfigLayer, sources: &mut FieldSources) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            record_leaves(child, &join(prefix, key), layer, sources);
        }
    } else {
        sources.insert(prefix.to_owned(), layer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_overlay_replaces_scalars_only_where_set() {
        let mut base = parse("[weather]\nprovider = \"open-meteo\"\ntimeout_secs = 10");
        let mut sources = FieldSources::new();
        record_leaves(&base, "", ConfigLayer::Defaults, &mut sources);

        let overlay = parse("[weather]\ntimeout_secs = 30");
        deep_merge_tracking(&mut base, &overlay, "", ConfigLayer::User, &mut sources);

        assert_eq!(base["weather"]["provider"].as_str(), Some("open-meteo"));
        assert_eq!(base["weather"]["timeout_secs"].as_integer(), Some(30));
        assert_eq!(sources["weather.provider"], ConfigLayer::Defaults);
        assert_eq!(sources["weather.timeout_secs"], ConfigLayer::User);
    }

    #[test]
    fn test_arrays_are_replaced() {
        let mut base = parse("[moderation]\nblocked_terms = [\"a\", \"b\"]");
        let mut sources = FieldSources::new();
        let overlay = parse("[moderation]\nblocked_terms = [\"c\"]");
        deep_merge_tracking(&mut base, &overlay, "", ConfigLayer::Workspace, &mut sources);
        assert_eq!(base["moderation"]["blocked_terms"].as_array().unwrap().len(), 1);
        assert_eq!(sources["moderation.blocked_terms"], ConfigLayer::Workspace);
    }

    #[test]
    fn test_new_sections_are_tracked() {
        let mut base = parse("[logging]\nlevel = \"info\"");
        let mut sources = FieldSources::new();
        let overlay = parse("[plugins]\ndirs = [\"/opt/plugins\"]");
        deep_merge_tracking(&mut base, &overlay, "", ConfigLayer::User, &mut sources);
        assert_eq!(sources["plugins.dirs"], ConfigLayer::User);
        assert!(!sources.contains_key("logging.level"));
    }
}
