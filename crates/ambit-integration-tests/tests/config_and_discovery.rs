//! Composing a host from layered configuration and discovered manifests.

mod common;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use ambit_bundled::{BundledOptions, ModerationAction, StaticWeather};
use ambit_config::loader::{CONFIG_DIR_NAME, load_with_env};
use ambit_config::{ConfigError, ConfigLayer};
use ambit_plugins::{CapabilityKind, HostRegistry, PluginId, discover_manifests};
use ambit_test::prelude::*;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

#[test]
fn layered_config_selects_and_configures_plugins() {
    let home = test_dir();
    let workspace = test_dir();
    let _ = test_file_in_dir(
        home.path(),
        "config.toml",
        "[moderation]\nblocked_terms = [\"spam\"]\naction = \"warn\"\n\n[weather]\nprovider = \"static\"\n",
    );
    let _ = test_file_in_dir(
        workspace.path(),
        &format!("{CONFIG_DIR_NAME}/config.toml"),
        "[plugins]\ndisabled = [\"research-bot\"]\n\n[moderation]\naction = \"block\"\n",
    );

    let resolved = load_with_env(
        Some(workspace.path()),
        Some(home.path()),
        &env(&[("AMBIT_WEATHER_PROVIDER", "open-meteo")]),
    )
    .unwrap();
    let config = &resolved.config;

    assert_eq!(config.weather.provider, "static");
    assert_eq!(config.moderation.action, "block");
    assert_eq!(
        resolved.field_sources.get("moderation.action"),
        Some(&ConfigLayer::Workspace)
    );
    assert_eq!(
        resolved.field_sources.get("moderation.blocked_terms"),
        Some(&ConfigLayer::User)
    );

    let options = BundledOptions {
        weather: Arc::new(StaticWeather::new()),
        blocked_terms: config.moderation.blocked_terms.clone(),
        moderation_action: config.moderation.action.parse().unwrap(),
    };
    assert_eq!(options.moderation_action, ModerationAction::Block);

    let mut registry = HostRegistry::new();
    let count =
        ambit_bundled::register_filtered(&mut registry, &options, |id| config.plugins.is_enabled(id))
            .unwrap();
    assert_eq!(count, 3);
    assert!(registry.agent("researchAgent").is_none());
    assert!(registry.run_processors(test_conversation("spam")).is_err());
}

#[test]
fn env_fallbacks_apply_when_no_file_sets_the_field() {
    let home = test_dir();
    let resolved = load_with_env(
        None,
        Some(home.path()),
        &env(&[("AMBIT_WEATHER_PROVIDER", "static"), ("AMBIT_LOG_LEVEL", "debug")]),
    )
    .unwrap();
    assert_eq!(resolved.config.weather.provider, "static");
    assert_eq!(resolved.config.logging.level, "debug");
    assert_eq!(
        resolved.field_sources.get("weather.provider"),
        Some(&ConfigLayer::Environment)
    );
}

#[test]
fn invalid_moderation_action_fails_to_load() {
    let home = test_dir();
    let _ = test_file_in_dir(home.path(), "config.toml", "[moderation]\naction = \"shout\"\n");
    let err = load_with_env(None, Some(home.path()), &HashMap::new()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "moderation.action"));
}

#[test]
fn discovery_merges_directories_and_skips_bad_manifests() {
    let first = PluginDir::new();
    let second = PluginDir::new();
    let _ = first.add_manifest(
        "weather",
        &test_manifest_toml("weather-kit", &[CapabilityKind::Tools, CapabilityKind::Storage]),
    );
    let _ = first.add_manifest("broken", "id = \"broken\"\nname = \"Broken\"\n");
    let _ = second.add_manifest("alpha", &test_manifest_toml("alpha", &[CapabilityKind::Ui]));
    let _ = second.add_manifest(
        "weather-copy",
        &test_manifest_toml("weather-kit", &[CapabilityKind::Agents]),
    );

    let found = discover_manifests(&[
        first.path().to_path_buf(),
        second.path().to_path_buf(),
        PathBuf::from("/nonexistent/ambit/plugins"),
    ]);
    let ids: Vec<&str> = found.iter().map(|(m, _)| m.id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "weather-kit"]);

    let (weather, dir) = &found[1];
    assert_eq!(
        weather,
        &test_manifest("weather-kit", &[CapabilityKind::Tools, CapabilityKind::Storage])
    );
    assert!(dir.starts_with(first.path()));
}

#[test]
fn shipped_manifests_describe_the_bundled_plugins() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../ambit-bundled/manifests");
    let found = discover_manifests(&[dir]);
    let registry = common::default_registry();

    assert_eq!(found.len(), registry.len());
    for (manifest, _) in &found {
        let plugin = registry.get(&manifest.id).unwrap();
        assert_eq!(plugin.manifest().features, manifest.features, "{}", manifest.id);
        assert_eq!(plugin.manifest().version, manifest.version);
    }
    assert!(registry.contains(&PluginId::from_static("ask-user-for-stuff")));
}
