//! Shared setup for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use ambit_bundled::{BundledOptions, ModerationAction, StaticWeather};
use ambit_plugins::HostRegistry;
use ambit_test::ScriptedModel;
use chrono::NaiveDate;

/// Reply used by scripted research runs.
pub const RESEARCH_REPLY: &str = "Rust is a systems language.\n\
- Memory safety without a garbage collector\n\
- Fearless concurrency\n\
- Zero-cost abstractions\n\
- A strong type system\n\
- Cargo and crates.io";

/// Offline options: a fixed-date forecast and the given moderation setup.
pub fn options(blocked_terms: &[&str], action: ModerationAction) -> BundledOptions {
    BundledOptions {
        weather: Arc::new(StaticWeather::starting(
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        )),
        blocked_terms: blocked_terms.iter().map(|t| (*t).to_owned()).collect(),
        moderation_action: action,
    }
}

/// Every bundled plugin, registered with `model` as the host model.
pub fn bundled_registry(model: Arc<ScriptedModel>, options: &BundledOptions) -> HostRegistry {
    let mut registry = HostRegistry::new().with_model(model);
    ambit_bundled::register_all(&mut registry, options).unwrap();
    registry
}

/// Every bundled plugin with no blocked terms and a model that always
/// answers [`RESEARCH_REPLY`].
pub fn default_registry() -> HostRegistry {
    bundled_registry(
        Arc::new(ScriptedModel::always(RESEARCH_REPLY)),
        &options(&[], ModerationAction::Redact),
    )
}
