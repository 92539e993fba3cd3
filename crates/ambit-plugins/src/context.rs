//! Execution context handed to tools and agents.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::agent::{Agent, LanguageModel};
use crate::error::{PluginError, PluginResult};
use crate::registry::HostRegistry;
use crate::storage::StorageAdapter;
use crate::tool::{self, Tool, ToolOutcome};

/// Per-invocation access to collaborators registered with the host.
///
/// Every lookup fails with [`PluginError::MissingCollaborator`] when the
/// collaborator is absent, which fails the whole invocation.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
    registry: &'a HostRegistry,
    invocation_id: Uuid,
}

impl<'a> ToolContext<'a> {
    /// A context for a new invocation against `registry`.
    #[must_use]
    pub fn new(registry: &'a HostRegistry) -> Self {
        Self {
            registry,
            invocation_id: Uuid::new_v4(),
        }
    }

    /// Identifier of this invocation.
    #[must_use]
    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    /// The registry this invocation runs against.
    #[must_use]
    pub fn registry(&self) -> &'a HostRegistry {
        self.registry
    }

    /// A registered agent.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MissingCollaborator`] if no agent has this id.
    pub fn agent(&self, id: &str) -> PluginResult<Arc<dyn Agent>> {
        self.registry
            .agent(id)
            .ok_or_else(|| PluginError::missing("agent", id))
    }

    /// A registered storage adapter.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MissingCollaborator`] if no adapter has this id.
    pub fn storage(&self, id: &str) -> PluginResult<Arc<dyn StorageAdapter>> {
        self.registry
            .storage(id)
            .ok_or_else(|| PluginError::missing("storage", id))
    }

    /// A registered tool.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MissingCollaborator`] if no tool has this id.
    pub fn tool(&self, id: &str) -> PluginResult<Arc<dyn Tool>> {
        self.registry
            .tool(id)
            .ok_or_else(|| PluginError::missing("tool", id))
    }

    /// The host's language model.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MissingCollaborator`] if the host has none.
    pub fn model(&self) -> PluginResult<Arc<dyn LanguageModel>> {
        self.registry
            .model()
            .ok_or_else(|| PluginError::missing("model", "default"))
    }

    /// Call another registered tool within this invocation.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::MissingCollaborator`] if the tool is absent, or
    /// any failure from [`tool::invoke`].
    pub async fn call_tool(&self, id: &str, input: &Value) -> PluginResult<ToolOutcome> {
        let tool = self.tool(id)?;
        tool::invoke(tool.as_ref(), input, self).await
    }
}
