//! Capability kinds and the per-plugin capability set.
//!
//! A plugin may carry any subset of the five capability groups. Presence is
//! checked through the guard accessors ([`PluginCapabilities::tools`] and
//! friends), which only hand out a slice when the group is present *and*
//! non-empty.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::processor::Processor;
use crate::storage::StorageAdapter;
use crate::tool::Tool;
use crate::ui::UiComponent;

/// The optional capability groups a plugin can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    /// Tools callable by agents.
    Tools,
    /// Agents.
    Agents,
    /// UI components.
    Ui,
    /// Input processors.
    Processors,
    /// Storage adapters.
    Storage,
}

impl CapabilityKind {
    /// Every kind, in manifest order.
    pub const ALL: [Self; 5] = [
        Self::Tools,
        Self::Agents,
        Self::Ui,
        Self::Processors,
        Self::Storage,
    ];

    /// The manifest key for this kind (`tools`, `agents`, ...).
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Tools => "tools",
            Self::Agents => "agents",
            Self::Ui => "ui",
            Self::Processors => "processors",
            Self::Storage => "storage",
        }
    }

    /// Singular noun for a member of this group, for messages.
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            Self::Tools => "tool",
            Self::Agents => "agent",
            Self::Ui => "ui component",
            Self::Processors => "processor",
            Self::Storage => "storage adapter",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The capability groups one plugin carries.
///
/// Each group is either absent or a list of definitions. An empty list is
/// treated the same as an absent group by every accessor.
#[derive(Clone, Default)]
pub struct PluginCapabilities {
    tools: Option<Vec<Arc<dyn Tool>>>,
    agents: Option<Vec<Arc<dyn Agent>>>,
    ui: Option<Vec<Arc<dyn UiComponent>>>,
    processors: Option<Vec<Arc<dyn Processor>>>,
    storage: Option<Vec<Arc<dyn StorageAdapter>>>,
}

fn non_empty<T>(group: Option<&[T]>) -> Option<&[T]> {
    group.filter(|g| !g.is_empty())
}

impl PluginCapabilities {
    /// The tool group, if present and non-empty.
    #[must_use]
    pub fn tools(&self) -> Option<&[Arc<dyn Tool>]> {
        non_empty(self.tools.as_deref())
    }

    /// The agent group, if present and non-empty.
    #[must_use]
    pub fn agents(&self) -> Option<&[Arc<dyn Agent>]> {
        non_empty(self.agents.as_deref())
    }

    /// The UI component group, if present and non-empty.
    #[must_use]
    pub fn ui(&self) -> Option<&[Arc<dyn UiComponent>]> {
        non_empty(self.ui.as_deref())
    }

    /// The processor group, if present and non-empty.
    #[must_use]
    pub fn processors(&self) -> Option<&[Arc<dyn Processor>]> {
        non_empty(self.processors.as_deref())
    }

    /// The storage adapter group, if present and non-empty.
    #[must_use]
    pub fn storage(&self) -> Option<&[Arc<dyn StorageAdapter>]> {
        non_empty(self.storage.as_deref())
    }

    /// Whether the `kind` group is present and non-empty.
    #[must_use]
    pub fn has(&self, kind: CapabilityKind) -> bool {
        match kind {
            CapabilityKind::Tools => self.tools().is_some(),
            CapabilityKind::Agents => self.agents().is_some(),
            CapabilityKind::Ui => self.ui().is_some(),
            CapabilityKind::Processors => self.processors().is_some(),
            CapabilityKind::Storage => self.storage().is_some(),
        }
    }

    /// Every present kind, in [`CapabilityKind::ALL`] order.
    #[must_use]
    pub fn kinds(&self) -> Vec<CapabilityKind> {
        CapabilityKind::ALL
            .into_iter()
            .filter(|k| self.has(*k))
            .collect()
    }

    /// Identifiers of every capability in the `kind` group, in insertion order.
    ///
    /// UI components are identified by their part type.
    #[must_use]
    pub fn ids(&self, kind: CapabilityKind) -> Vec<&str> {
        match kind {
            CapabilityKind::Tools => self.tools().unwrap_or_default().iter().map(|t| t.id()).collect(),
            CapabilityKind::Agents => self
                .agents()
                .unwrap_or_default()
                .iter()
                .map(|a| a.id())
                .collect(),
            CapabilityKind::Ui => self
                .ui()
                .unwrap_or_default()
                .iter()
                .map(|u| u.part_type())
                .collect(),
            CapabilityKind::Processors => self
                .processors()
                .unwrap_or_default()
                .iter()
                .map(|p| p.id())
                .collect(),
            CapabilityKind::Storage => self
                .storage()
                .unwrap_or_default()
                .iter()
                .map(|s| s.id())
                .collect(),
        }
    }

    /// Add a tool.
    pub fn add_tool(&mut self, tool: Arc<dyn Tool>) {
        self.tools.get_or_insert_with(Vec::new).push(tool);
    }

    /// Add an agent.
    pub fn add_agent(&mut self, agent: Arc<dyn Agent>) {
        self.agents.get_or_insert_with(Vec::new).push(agent);
    }

    /// Add a UI component.
    pub fn add_ui(&mut self, component: Arc<dyn UiComponent>) {
        self.ui.get_or_insert_with(Vec::new).push(component);
    }

    /// Add a processor.
    pub fn add_processor(&mut self, processor: Arc<dyn Processor>) {
        self.processors.get_or_insert_with(Vec::new).push(processor);
    }

    /// Add a storage adapter.
    pub fn add_storage(&mut self, adapter: Arc<dyn StorageAdapter>) {
        self.storage.get_or_insert_with(Vec::new).push(adapter);
    }
}

impl fmt::Debug for PluginCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for kind in CapabilityKind::ALL {
            if self.has(kind) {
                map.entry(&kind.key(), &self.ids(kind));
            }
        }
        map.finish()
    }
}
