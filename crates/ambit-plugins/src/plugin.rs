//! Plugin trait and core types.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::capability::{CapabilityKind, PluginCapabilities};
use crate::error::{PluginError, PluginResult};
use crate::manifest::PluginManifest;
use crate::processor::Processor;
use crate::storage::StorageAdapter;
use crate::tool::Tool;
use crate::ui::UiComponent;

/// Unique, stable, human-readable plugin identifier.
///
/// Plugin IDs are slugs like `"trip-planner"` or `"ask-user-for-stuff"`.
/// They must be non-empty and contain only lowercase alphanumeric characters
/// and hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PluginId(String);

/// Deserialize with validation so malformed IDs never enter a registry.
impl<'de> Deserialize<'de> for PluginId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl PluginId {
    /// Create a new `PluginId`, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is empty or contains invalid characters.
    pub fn new(id: impl Into<String>) -> PluginResult<Self> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Create a `PluginId` without validation (for literals and tests).
    #[must_use]
    pub fn from_static(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether a string is a valid plugin ID without constructing one.
    #[must_use]
    pub fn is_valid_id(id: &str) -> bool {
        Self::validate(id).is_ok()
    }

    fn validate(id: &str) -> PluginResult<()> {
        if id.is_empty() {
            return Err(PluginError::InvalidId("plugin id must not be empty".into()));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(PluginError::InvalidId(format!(
                "plugin id must contain only lowercase alphanumeric characters and hyphens, got: {id}"
            )));
        }
        if id.starts_with('-') || id.ends_with('-') {
            return Err(PluginError::InvalidId(format!(
                "plugin id must not start or end with a hyphen, got: {id}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PluginId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A self-contained package of capabilities.
///
/// The manifest says which capability groups the plugin claims to provide;
/// [`capabilities`](Plugin::capabilities) carries the groups themselves.
pub trait Plugin: Send + Sync {
    /// The manifest that describes this plugin.
    fn manifest(&self) -> &PluginManifest;

    /// The capability groups this plugin carries.
    fn capabilities(&self) -> &PluginCapabilities;

    /// The unique identifier for this plugin.
    fn id(&self) -> &PluginId {
        &self.manifest().id
    }

    /// Verify the plugin is internally consistent.
    ///
    /// Checks that the manifest is well-formed, that every feature flag
    /// matches the presence of a non-empty capability group, and that no two
    /// capabilities of one kind share an identifier.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    fn check(&self) -> PluginResult<()> {
        let manifest = self.manifest();
        manifest.validate()?;
        let capabilities = self.capabilities();

        for kind in CapabilityKind::ALL {
            let declared = manifest.features.declares(kind);
            let present = capabilities.has(kind);
            if declared != present {
                return Err(PluginError::FeatureMismatch {
                    plugin: manifest.id.clone(),
                    kind,
                    declared,
                    present,
                });
            }

            let mut seen = HashSet::new();
            for id in capabilities.ids(kind) {
                if !seen.insert(id) {
                    return Err(PluginError::DuplicateCapability {
                        plugin: manifest.id.clone(),
                        kind,
                        id: id.to_owned(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for dyn Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("id", self.id())
            .field("kinds", &self.capabilities().kinds())
            .finish_non_exhaustive()
    }
}

/// A plugin assembled from a manifest and capability definitions at startup.
///
/// This is the usual way to build a plugin in code:
///
/// ```
/// use ambit_plugins::{Plugin, PluginId, PluginManifest, StaticPlugin};
///
/// let manifest = PluginManifest::new(PluginId::from_static("empty"), "Empty", "0.1.0");
/// let plugin = StaticPlugin::new(manifest);
/// assert!(plugin.capabilities().kinds().is_empty());
/// ```
#[derive(Clone)]
pub struct StaticPlugin {
    manifest: PluginManifest,
    capabilities: PluginCapabilities,
}

impl StaticPlugin {
    /// Start a plugin with no capabilities.
    #[must_use]
    pub fn new(manifest: PluginManifest) -> Self {
        Self {
            manifest,
            capabilities: PluginCapabilities::default(),
        }
    }

    /// Add a tool.
    #[must_use]
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.capabilities.add_tool(tool);
        self
    }

    /// Add an agent.
    #[must_use]
    pub fn with_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.capabilities.add_agent(agent);
        self
    }

    /// Add a UI component.
    #[must_use]
    pub fn with_ui(mut self, component: Arc<dyn UiComponent>) -> Self {
        self.capabilities.add_ui(component);
        self
    }

    /// Add a processor.
    #[must_use]
    pub fn with_processor(mut self, processor: Arc<dyn Processor>) -> Self {
        self.capabilities.add_processor(processor);
        self
    }

    /// Add a storage adapter.
    #[must_use]
    pub fn with_storage(mut self, adapter: Arc<dyn StorageAdapter>) -> Self {
        self.capabilities.add_storage(adapter);
        self
    }
}

impl Plugin for StaticPlugin {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn capabilities(&self) -> &PluginCapabilities {
        &self.capabilities
    }
}

impl fmt::Debug for StaticPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticPlugin")
            .field("id", &self.manifest.id)
            .field("kinds", &self.capabilities.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::PluginFeatures;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_valid_plugin_ids() {
        assert!(PluginId::new("trip-planner").is_ok());
        assert!(PluginId::new("ask-user-for-stuff").is_ok());
        assert!(PluginId::new("plugin123").is_ok());
        assert!(PluginId::new("a").is_ok());
    }

    #[test]
    fn test_invalid_plugin_ids() {
        assert!(PluginId::new("").is_err());
        assert!(PluginId::new("TripPlanner").is_err());
        assert!(PluginId::new("trip planner").is_err());
        assert!(PluginId::new("trip_planner").is_err());
        assert!(PluginId::new("-plugin").is_err());
        assert!(PluginId::new("plugin-").is_err());
        assert!(PluginId::new("plugin@1").is_err());
    }

    #[test]
    fn test_plugin_id_serde_rejects_malformed() {
        let ok: PluginId = serde_json::from_str("\"research-bot\"").unwrap();
        assert_eq!(ok.as_str(), "research-bot");
        assert!(serde_json::from_str::<PluginId>("\"../etc\"").is_err());
    }

    fn manifest(features: PluginFeatures) -> PluginManifest {
        PluginManifest::new(PluginId::from_static("store-only"), "Store Only", "1.0.0")
            .with_features(features)
    }

    #[test]
    fn test_check_accepts_consistent_plugin() {
        let plugin = StaticPlugin::new(manifest(PluginFeatures::from_kinds(&[
            CapabilityKind::Storage,
        ])))
        .with_storage(Arc::new(MemoryStorage::new("notes")));
        assert!(plugin.check().is_ok());
    }

    #[test]
    fn test_check_rejects_declared_but_absent_group() {
        let plugin = StaticPlugin::new(manifest(PluginFeatures::from_kinds(&[
            CapabilityKind::Storage,
            CapabilityKind::Tools,
        ])))
        .with_storage(Arc::new(MemoryStorage::new("notes")));
        let err = plugin.check().unwrap_err();
        assert!(matches!(
            err,
            PluginError::FeatureMismatch {
                kind: CapabilityKind::Tools,
                declared: true,
                present: false,
                ..
            }
        ));
    }

    #[test]
    fn test_check_rejects_undeclared_group() {
        let plugin = StaticPlugin::new(manifest(PluginFeatures::default()))
            .with_storage(Arc::new(MemoryStorage::new("notes")));
        assert!(matches!(
            plugin.check().unwrap_err(),
            PluginError::FeatureMismatch {
                kind: CapabilityKind::Storage,
                declared: false,
                present: true,
                ..
            }
        ));
    }

    #[test]
    fn test_check_rejects_duplicate_identifiers() {
        let plugin = StaticPlugin::new(manifest(PluginFeatures::from_kinds(&[
            CapabilityKind::Storage,
        ])))
        .with_storage(Arc::new(MemoryStorage::new("notes")))
        .with_storage(Arc::new(MemoryStorage::new("notes")));
        let err = plugin.check().unwrap_err();
        assert!(matches!(err, PluginError::DuplicateCapability { ref id, .. } if id == "notes"));
    }
}
