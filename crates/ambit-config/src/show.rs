//! Source-annotated display for `config show`.

use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::merge::FieldSources;
use crate::types::Config;

/// A resolved configuration together with source annotations.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final merged configuration.
    pub config: Config,
    /// Dotted field path → which layer set the value.
    pub field_sources: FieldSources,
    /// Config file paths that were loaded (in precedence order).
    pub loaded_files: Vec<String>,
}

/// Output format for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    /// TOML with inline comments showing source.
    Toml,
    /// JSON (for programmatic consumption).
    Json,
}

impl ResolvedConfig {
    /// Render the resolved config, optionally limited to one section.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or `section` does not exist.
    pub fn show(&self, format: ShowFormat, section: Option<&str>) -> Result<String, fmt::Error> {
        match format {
            ShowFormat::Toml => self.show_toml(section),
            ShowFormat::Json => self.show_json(section),
        }
    }

    fn section_value(&self, section: &str) -> Result<toml::Value, fmt::Error> {
        let val = toml::Value::try_from(&self.config).map_err(|_| fmt::Error)?;
        val.get(section).cloned().ok_or(fmt::Error)
    }

    fn show_toml(&self, section: Option<&str>) -> Result<String, fmt::Error> {
        let toml_str = match section {
            Some(name) => to_toml(&self.section_value(name)?)?,
            None => to_toml(&self.config)?,
        };

        let mut output = String::new();
        output.push_str("# Resolved Ambit configuration\n");
        output.push_str("# Source annotations: [defaults] [user] [workspace] [env]\n");

        if !self.loaded_files.is_empty() {
            output.push_str("#\n# Loaded files (in precedence order):\n");
            for (i, path) in self.loaded_files.iter().enumerate() {
                writeln!(output, "#   {}. {path}", i.saturating_add(1))?;
            }
        }
        output.push('\n');

        let mut table = section.unwrap_or("").to_owned();
        for line in toml_str.lines() {
            let trimmed = line.trim();
            if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
                table = match section {
                    Some(s) => format!("{s}.{header}"),
                    None => header.to_owned(),
                };
            }
            match self.annotate_line(trimmed, &table) {
                Some(annotation) => writeln!(output, "{line}  # [{annotation}]")?,
                None => writeln!(output, "{line}")?,
            }
        }

        Ok(output)
    }

    fn show_json(&self, section: Option<&str>) -> Result<String, fmt::Error> {
        let json = match section {
            Some(name) => serde_json::to_string_pretty(&self.section_value(name)?),
            None => serde_json::to_string_pretty(&self.config),
        };
        json.map_err(|_| fmt::Error)
    }

    /// Source annotation for a `key = value` line inside `table`.
    fn annotate_line(&self, trimmed: &str, table: &str) -> Option<String> {
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
            return None;
        }
        let key = trimmed.split('=').next()?.trim();
        let path = if table.is_empty() {
            key.to_owned()
        } else {
            format!("{table}.{key}")
        };
        self.field_sources.get(&path).map(ToString::to_string)
    }

    /// Every config file path checked during loading.
    #[must_use]
    pub fn config_paths(home_dir: Option<&str>, workspace_root: Option<&str>) -> Vec<String> {
        vec![
            home_dir.map_or_else(
                || "~/.ambit/config.toml".to_owned(),
                |home| format!("{home}/.ambit/config.toml"),
            ),
            "$AMBIT_HOME/config.toml".to_owned(),
            workspace_root.map_or_else(
                || "{workspace}/.ambit/config.toml".to_owned(),
                |ws| format!("{ws}/.ambit/config.toml"),
            ),
        ]
    }
}

fn to_toml<T: Serialize + ?Sized>(value: &T) -> Result<String, fmt::Error> {
    toml::to_string_pretty(value).map_err(|_| fmt::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ConfigLayer;

    fn resolved() -> ResolvedConfig {
        let mut field_sources = FieldSources::new();
        field_sources.insert("weather.provider".into(), ConfigLayer::User);
        field_sources.insert("weather.timeout_secs".into(), ConfigLayer::Defaults);
        ResolvedConfig {
            config: Config::default(),
            field_sources,
            loaded_files: vec!["/home/u/.ambit/config.toml".into()],
        }
    }

    #[test]
    fn test_show_toml_annotates_sources() {
        let out = resolved().show(ShowFormat::Toml, None).unwrap();
        assert!(out.contains("1. /home/u/.ambit/config.toml"));
        assert!(out.contains("provider = \"open-meteo\"  # [user]"));
        assert!(out.contains("timeout_secs = 10  # [defaults]"));
    }

    #[test]
    fn test_show_section() {
        let out = resolved().show(ShowFormat::Toml, Some("weather")).unwrap();
        assert!(out.contains("# [user]"));
        assert!(!out.contains("[logging]"));
        assert!(resolved().show(ShowFormat::Toml, Some("nope")).is_err());
    }

    #[test]
    fn test_show_json() {
        let out = resolved().show(ShowFormat::Json, Some("moderation")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["action"], "redact");
    }

    #[test]
    fn test_config_paths() {
        let paths = ResolvedConfig::config_paths(Some("/home/u"), Some("/src/app"));
        assert_eq!(paths[0], "/home/u/.ambit/config.toml");
        assert_eq!(paths[2], "/src/app/.ambit/config.toml");
    }
}
