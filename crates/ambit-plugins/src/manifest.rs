//! Plugin manifest types.
//!
//! A plugin manifest (`plugin.toml`) names a plugin and declares which
//! optional capability groups it provides. Manifests are built once, either
//! in code or by [`load_manifest`](crate::discovery::load_manifest), and never
//! mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityKind;
use crate::error::{PluginError, PluginResult};
use crate::plugin::PluginId;

/// A plugin's static identity and declared capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique plugin identifier.
    pub id: PluginId,
    /// Human-readable display name.
    pub name: String,
    /// Semantic version string.
    pub version: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Which capability groups the plugin provides. Omitted flags are `false`.
    #[serde(default)]
    pub features: PluginFeatures,
}

impl PluginManifest {
    /// A manifest with no optional fields and no declared features.
    #[must_use]
    pub fn new(id: PluginId, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            version: version.into(),
            description: None,
            author: None,
            features: PluginFeatures::default(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the declared features.
    #[must_use]
    pub fn with_features(mut self, features: PluginFeatures) -> Self {
        self.features = features;
        self
    }

    /// Check the fields that deserialization alone cannot.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidId`] for an ID built without validation,
    /// or [`PluginError::InvalidVersion`] for a non-semver version.
    pub fn validate(&self) -> PluginResult<()> {
        if !PluginId::is_valid_id(self.id.as_str()) {
            return Err(PluginError::InvalidId(self.id.to_string()));
        }
        semver::Version::parse(&self.version).map_err(|e| PluginError::InvalidVersion {
            version: self.version.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// Capability-group flags declared by a manifest.
///
/// Parsed from the `[features]` table of `plugin.toml`:
///
/// ```toml
/// [features]
/// tools = true
/// ui = true
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct PluginFeatures {
    /// Tools callable by agents.
    pub tools: bool,
    /// Agents.
    pub agents: bool,
    /// UI components rendering message parts.
    pub ui: bool,
    /// Input processors.
    pub processors: bool,
    /// Storage adapters.
    pub storage: bool,
}

impl PluginFeatures {
    /// Flags set for exactly the given kinds.
    #[must_use]
    pub fn from_kinds(kinds: &[CapabilityKind]) -> Self {
        let mut features = Self::default();
        for kind in kinds {
            features.set(*kind, true);
        }
        features
    }

    /// Whether the manifest declares `kind`.
    #[must_use]
    pub fn declares(&self, kind: CapabilityKind) -> bool {
        match kind {
            CapabilityKind::Tools => self.tools,
            CapabilityKind::Agents => self.agents,
            CapabilityKind::Ui => self.ui,
            CapabilityKind::Processors => self.processors,
            CapabilityKind::Storage => self.storage,
        }
    }

    /// Every declared kind, in [`CapabilityKind::ALL`] order.
    #[must_use]
    pub fn declared(&self) -> Vec<CapabilityKind> {
        CapabilityKind::ALL
            .into_iter()
            .filter(|k| self.declares(*k))
            .collect()
    }

    fn set(&mut self, kind: CapabilityKind, value: bool) {
        match kind {
            CapabilityKind::Tools => self.tools = value,
            CapabilityKind::Agents => self.agents = value,
            CapabilityKind::Ui => self.ui = value,
            CapabilityKind::Processors => self.processors = value,
            CapabilityKind::Storage => self.storage = value,
        }
    }
}
