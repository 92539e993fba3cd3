//! Test fixtures for common types.

use serde_json::{Value, json};

use ambit_plugins::{
    CapabilityKind, Message, PluginFeatures, PluginId, PluginManifest,
};

/// A valid manifest declaring `kinds`.
#[must_use]
pub fn test_manifest(id: &str, kinds: &[CapabilityKind]) -> PluginManifest {
    PluginManifest::new(PluginId::from_static(id), format!("Test {id}"), "0.1.0")
        .with_features(PluginFeatures::from_kinds(kinds))
}

/// `plugin.toml` text for a manifest declaring `kinds`.
#[must_use]
pub fn test_manifest_toml(id: &str, kinds: &[CapabilityKind]) -> String {
    let mut out = format!("id = \"{id}\"\nname = \"Test {id}\"\nversion = \"0.1.0\"\n\n[features]\n");
    for kind in kinds {
        out.push_str(&format!("{kind} = true\n"));
    }
    out
}

/// A one-message user conversation.
#[must_use]
pub fn test_conversation(text: &str) -> Vec<Message> {
    vec![Message::user(text)]
}

/// A weather report that satisfies the `getWeather` output schema.
#[must_use]
pub fn test_weather_report() -> Value {
    json!({
        "location": "Lisbon",
        "temperature": 21.5,
        "humidity": 60,
        "windSpeed": 12.0,
        "forecast": [
            {"date": "2026-10-16", "condition": "Clear sky", "high": 24.0, "low": 15.0}
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_toml_parses() {
        let text = test_manifest_toml("demo", &[CapabilityKind::Tools, CapabilityKind::Ui]);
        let manifest: PluginManifest = toml_parse(&text);
        assert_eq!(manifest, test_manifest("demo", &[CapabilityKind::Tools, CapabilityKind::Ui]));
    }

    fn toml_parse(text: &str) -> PluginManifest {
        let dir = crate::harness::test_dir();
        let path = crate::harness::test_file_in_dir(dir.path(), "plugin.toml", text);
        ambit_plugins::load_manifest(&path).unwrap()
    }
}
