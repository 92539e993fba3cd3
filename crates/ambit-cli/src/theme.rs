//! CLI theme and styling.

use ambit_plugins::PluginFeatures;
use colored::Colorize;

/// CLI theme configuration.
pub(crate) struct Theme;

impl Theme {
    /// Format a header.
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    /// Format a success message.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    /// Format an error message.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    /// Format a warning message.
    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "!".yellow(), text.yellow())
    }

    /// Format an info message.
    pub(crate) fn info(text: &str) -> String {
        format!("{} {}", "i".blue(), text)
    }

    /// Format a dimmed message.
    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    /// Format a separator line.
    pub(crate) fn separator() -> String {
        "━".repeat(50).dimmed().to_string()
    }

    /// Format a key-value pair.
    pub(crate) fn kv(key: &str, value: &str) -> String {
        format!("{}: {}", key.bold(), value)
    }

    /// Format a capability identifier.
    pub(crate) fn capability(id: &str) -> String {
        format!("{}", id.cyan())
    }
}

/// Comma-separated list of the declared feature keys, or `-` for none.
pub(crate) fn feature_list(features: &PluginFeatures) -> String {
    let declared = features.declared();
    if declared.is_empty() {
        return "-".to_owned();
    }
    declared
        .iter()
        .map(|kind| kind.key())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambit_plugins::CapabilityKind;

    #[test]
    fn test_feature_list() {
        assert_eq!(feature_list(&PluginFeatures::default()), "-");
        let features = PluginFeatures::from_kinds(&[CapabilityKind::Ui, CapabilityKind::Tools]);
        assert_eq!(feature_list(&features), "tools,ui");
    }
}
