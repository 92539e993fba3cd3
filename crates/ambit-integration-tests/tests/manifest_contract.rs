//! The manifest contract as seen by a host: schema-validated I/O with
//! defaults, field-level errors, feature flags matching reality, and
//! identifier uniqueness.

mod common;

use ambit_bundled::ask_user::ConfirmationRequest;
use ambit_bundled::weather::WeatherReport;
use ambit_bundled::{BundledOptions, all_plugins};
use ambit_plugins::{
    CapabilityKind, HostRegistry, Plugin, PluginError, PluginFeatures, PluginId, PluginManifest,
    StaticPlugin, ValidationStage,
};
use ambit_schema::{IssueKind, Schema};
use ambit_test::prelude::*;
use serde_json::json;

#[test]
fn round_trip_validation_populates_defaults() {
    let schema = Schema::of::<ConfirmationRequest>();
    let normalized = schema
        .validate(&json!({"title": "Delete?", "message": "This cannot be undone"}))
        .unwrap();

    assert_eq!(normalized["confirmLabel"], "Confirm");
    assert_eq!(normalized["cancelLabel"], "Cancel");
    assert_eq!(normalized["variant"], "default");

    let parsed: ConfirmationRequest = schema.parse(&normalized).unwrap();
    assert_eq!(parsed.confirm_label, "Confirm");
}

#[test]
fn validation_is_idempotent() {
    let schema = Schema::of::<ConfirmationRequest>();
    let once = schema
        .validate(&json!({"title": "Delete?", "message": "Sure?", "variant": "warning"}))
        .unwrap();
    let twice = schema.validate(&once).unwrap();
    assert_eq!(once, twice);
}

#[tokio::test]
async fn missing_required_field_is_named() {
    let registry = common::default_registry();
    let err = registry
        .call_tool("askForConfirmation", &json!({"title": "Delete?"}))
        .await
        .unwrap_err();

    let (stage, source) = err.as_validation().unwrap();
    assert_eq!(stage, ValidationStage::Input);
    assert_eq!(source.issue_for("message").unwrap().kind, IssueKind::Missing);
}

#[tokio::test]
async fn wrong_primitive_type_is_named() {
    let registry = common::default_registry();
    let err = registry
        .call_tool("getWeather", &json!({"location": 42}))
        .await
        .unwrap_err();
    assert!(err.as_validation().unwrap().1.mentions("location"));
}

#[test]
fn confirmation_example_validates_with_defaults() {
    let normalized = Schema::of::<ConfirmationRequest>()
        .validate(&json!({
            "title": "Delete?",
            "message": "This cannot be undone",
            "variant": "danger"
        }))
        .unwrap();
    assert_eq!(
        normalized,
        json!({
            "title": "Delete?",
            "message": "This cannot be undone",
            "variant": "danger",
            "confirmLabel": "Confirm",
            "cancelLabel": "Cancel"
        })
    );
}

#[test]
fn weather_output_without_forecast_is_rejected() {
    let mut report = test_weather_report();
    assert!(Schema::of::<WeatherReport>().is_valid(&report));

    report.as_object_mut().unwrap().remove("forecast");
    let err = Schema::of::<WeatherReport>().validate(&report).unwrap_err();
    assert_eq!(err.fields(), vec!["forecast"]);
}

#[test]
fn bundled_feature_flags_reflect_capabilities() {
    for plugin in all_plugins(&BundledOptions::default()).unwrap() {
        let carried = PluginFeatures::from_kinds(&plugin.capabilities().kinds());
        assert_eq!(plugin.manifest().features, carried, "{}", plugin.id());
        assert!(plugin.check().is_ok());
    }
}

#[test]
fn capability_guards_only_expose_present_groups() {
    let plugins = all_plugins(&BundledOptions::default()).unwrap();
    let moderation = plugins
        .iter()
        .find(|p| p.id().as_str() == "content-moderation")
        .unwrap();

    let caps = moderation.capabilities();
    assert!(caps.tools().is_none());
    assert!(caps.agents().is_none());
    assert_eq!(caps.processors().unwrap().len(), 1);
    assert!(caps.has(CapabilityKind::Processors));
    assert!(!caps.has(CapabilityKind::Ui));
}

#[test]
fn identifiers_are_unique_within_a_plugin() {
    let plugin = StaticPlugin::new(
        PluginManifest::new(PluginId::from_static("twins"), "Twins", "0.1.0")
            .with_features(PluginFeatures::from_kinds(&[CapabilityKind::Tools])),
    )
    .with_tool(EchoTool::shared("echo"))
    .with_tool(EchoTool::shared("echo"));

    assert!(matches!(
        plugin.check(),
        Err(PluginError::DuplicateCapability { ref id, kind: CapabilityKind::Tools, .. }) if id == "echo"
    ));

    let mut registry = HostRegistry::new();
    assert!(registry.register(Box::new(plugin)).is_err());
    assert!(registry.is_empty());
    assert!(registry.tool("echo").is_none());
}

#[test]
fn undeclared_capability_group_is_rejected() {
    let plugin = MockPlugin::new("sneaky")
        .features(&[CapabilityKind::Tools])
        .echo_tool("echo")
        .storage("cache")
        .build();

    let err = plugin.check().unwrap_err();
    assert!(matches!(
        err,
        PluginError::FeatureMismatch {
            kind: CapabilityKind::Storage,
            declared: false,
            present: true,
            ..
        }
    ));
}
