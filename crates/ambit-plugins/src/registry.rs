//! Host registry.
//!
//! Holds the plugins a host application composed at startup and indexes
//! every capability they carry by identifier. Registration is explicit and
//! atomic: a rejected plugin leaves the registry exactly as it was.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::agent::{Agent, LanguageModel};
use crate::capability::CapabilityKind;
use crate::context::ToolContext;
use crate::error::{PluginError, PluginResult};
use crate::message::{Message, Role};
use crate::plugin::{Plugin, PluginId};
use crate::processor::{Processor, ProcessorVerdict};
use crate::storage::StorageAdapter;
use crate::tool::{self, Suspension, Tool, ToolOutcome};
use crate::ui::{UiComponent, bound_tool_id};

/// A tool definition exported for a language model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool identifier.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for tool input.
    pub input_schema: Value,
}

/// A `tool-{id}` UI component whose tool is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiBindingIssue {
    /// The component's part type.
    pub part_type: String,
    /// The tool identifier the part type refers to.
    pub tool_id: String,
    /// Plugin that contributed the component.
    pub plugin: PluginId,
}

/// Input after every processor has seen it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedInput {
    /// The (possibly rewritten) conversation.
    pub messages: Vec<Message>,
    /// `(processor, reason)` for every processor that flagged the input.
    pub flags: Vec<(String, String)>,
}

/// Capabilities of one kind, keyed by identifier, with their owning plugin.
type Index<T> = HashMap<String, (PluginId, Arc<T>)>;

fn index_conflict<T: ?Sized>(
    index: &Index<T>,
    kind: CapabilityKind,
    id: &str,
    incoming: &PluginId,
) -> PluginResult<()> {
    match index.get(id) {
        Some((existing, _)) => Err(PluginError::CapabilityConflict {
            kind,
            id: id.to_owned(),
            existing: existing.clone(),
            incoming: incoming.clone(),
        }),
        None => Ok(()),
    }
}

/// Registry of plugins composed into one host application.
#[derive(Default)]
pub struct HostRegistry {
    plugins: HashMap<PluginId, Box<dyn Plugin>>,
    tools: Index<dyn Tool>,
    agents: Index<dyn Agent>,
    ui: Index<dyn UiComponent>,
    storage: Index<dyn StorageAdapter>,
    /// Kept in registration order; the pipeline runs in this order.
    processors: Vec<(PluginId, Arc<dyn Processor>)>,
    model: Option<Arc<dyn LanguageModel>>,
}

impl HostRegistry {
    /// Create an empty registry with no language model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `model` for agent generation.
    #[must_use]
    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Replace the language model.
    pub fn set_model(&mut self, model: Arc<dyn LanguageModel>) {
        self.model = Some(model);
    }

    /// The host language model, if one is configured.
    #[must_use]
    pub fn model(&self) -> Option<Arc<dyn LanguageModel>> {
        self.model.clone()
    }

    /// Register a plugin and index its capabilities.
    ///
    /// Absent capability groups are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::AlreadyRegistered`] if a plugin with the same
    /// ID is already registered, [`PluginError::CapabilityConflict`] if
    /// another plugin already provides a capability with the same kind and
    /// identifier, or any error from [`Plugin::check`]. On error nothing is
    /// registered.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> PluginResult<()> {
        let id = plugin.id().clone();
        if self.plugins.contains_key(&id) {
            return Err(PluginError::AlreadyRegistered(id));
        }
        plugin.check()?;
        self.check_conflicts(plugin.as_ref())?;

        let caps = plugin.capabilities();
        for t in caps.tools().unwrap_or_default() {
            self.tools
                .insert(t.id().to_owned(), (id.clone(), Arc::clone(t)));
        }
        for a in caps.agents().unwrap_or_default() {
            self.agents
                .insert(a.id().to_owned(), (id.clone(), Arc::clone(a)));
        }
        for u in caps.ui().unwrap_or_default() {
            self.ui
                .insert(u.part_type().to_owned(), (id.clone(), Arc::clone(u)));
        }
        for s in caps.storage().unwrap_or_default() {
            self.storage
                .insert(s.id().to_owned(), (id.clone(), Arc::clone(s)));
        }
        for p in caps.processors().unwrap_or_default() {
            self.processors.push((id.clone(), Arc::clone(p)));
        }

        info!(
            plugin_id = %id,
            version = %plugin.manifest().version,
            kinds = ?caps.kinds(),
            "Registered plugin"
        );
        self.plugins.insert(id, plugin);
        Ok(())
    }

    fn check_conflicts(&self, plugin: &dyn Plugin) -> PluginResult<()> {
        let incoming = plugin.id();
        let caps = plugin.capabilities();
        for kind in caps.kinds() {
            for cap_id in caps.ids(kind) {
                match kind {
                    CapabilityKind::Tools => index_conflict(&self.tools, kind, cap_id, incoming)?,
                    CapabilityKind::Agents => {
                        index_conflict(&self.agents, kind, cap_id, incoming)?;
                    },
                    CapabilityKind::Ui => index_conflict(&self.ui, kind, cap_id, incoming)?,
                    CapabilityKind::Storage => {
                        index_conflict(&self.storage, kind, cap_id, incoming)?;
                    },
                    CapabilityKind::Processors => {
                        if let Some((existing, _)) =
                            self.processors.iter().find(|(_, p)| p.id() == cap_id)
                        {
                            return Err(PluginError::CapabilityConflict {
                                kind,
                                id: cap_id.to_owned(),
                                existing: existing.clone(),
                                incoming: incoming.clone(),
                            });
                        }
                    },
                }
            }
        }
        Ok(())
    }

    /// Unregister a plugin, returning it if it was present.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotFound`] if no plugin with the given ID exists.
    pub fn unregister(&mut self, id: &PluginId) -> PluginResult<Box<dyn Plugin>> {
        let plugin = self
            .plugins
            .remove(id)
            .ok_or_else(|| PluginError::NotFound(id.clone()))?;

        self.tools.retain(|_, (owner, _)| owner != id);
        self.agents.retain(|_, (owner, _)| owner != id);
        self.ui.retain(|_, (owner, _)| owner != id);
        self.storage.retain(|_, (owner, _)| owner != id);
        self.processors.retain(|(owner, _)| owner != id);

        info!(plugin_id = %id, "Unregistered plugin");
        Ok(plugin)
    }

    /// Get a reference to a plugin by ID.
    #[must_use]
    pub fn get(&self, id: &PluginId) -> Option<&dyn Plugin> {
        self.plugins.get(id).map(AsRef::as_ref)
    }

    /// Whether a plugin with this ID is registered.
    #[must_use]
    pub fn contains(&self, id: &PluginId) -> bool {
        self.plugins.contains_key(id)
    }

    /// All registered plugins, sorted by ID.
    #[must_use]
    pub fn plugins(&self) -> Vec<&dyn Plugin> {
        let mut plugins: Vec<&dyn Plugin> = self.plugins.values().map(AsRef::as_ref).collect();
        plugins.sort_by(|a, b| a.id().cmp(b.id()));
        plugins
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    // -----------------------------------------------------------------
    // Capability lookup
    // -----------------------------------------------------------------

    /// A tool by identifier.
    #[must_use]
    pub fn tool(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(id).map(|(_, t)| Arc::clone(t))
    }

    /// An agent by identifier.
    #[must_use]
    pub fn agent(&self, id: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(id).map(|(_, a)| Arc::clone(a))
    }

    /// A UI component by part type.
    #[must_use]
    pub fn ui_component(&self, part_type: &str) -> Option<Arc<dyn UiComponent>> {
        self.ui.get(part_type).map(|(_, u)| Arc::clone(u))
    }

    /// A storage adapter by identifier.
    #[must_use]
    pub fn storage(&self, id: &str) -> Option<Arc<dyn StorageAdapter>> {
        self.storage.get(id).map(|(_, s)| Arc::clone(s))
    }

    /// A processor by identifier.
    #[must_use]
    pub fn processor(&self, id: &str) -> Option<Arc<dyn Processor>> {
        self.processors
            .iter()
            .find(|(_, p)| p.id() == id)
            .map(|(_, p)| Arc::clone(p))
    }

    /// The plugin that provides the `kind` capability `id`.
    #[must_use]
    pub fn owner(&self, kind: CapabilityKind, id: &str) -> Option<&PluginId> {
        match kind {
            CapabilityKind::Tools => self.tools.get(id).map(|(o, _)| o),
            CapabilityKind::Agents => self.agents.get(id).map(|(o, _)| o),
            CapabilityKind::Ui => self.ui.get(id).map(|(o, _)| o),
            CapabilityKind::Storage => self.storage.get(id).map(|(o, _)| o),
            CapabilityKind::Processors => self
                .processors
                .iter()
                .find(|(_, p)| p.id() == id)
                .map(|(o, _)| o),
        }
    }

    /// Every registered tool, sorted by identifier.
    #[must_use]
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        let mut ids: Vec<&String> = self.tools.keys().collect();
        ids.sort();
        ids.into_iter()
            .filter_map(|id| self.tools.get(id).map(|(_, t)| Arc::clone(t)))
            .collect()
    }

    /// Every registered agent, sorted by identifier.
    #[must_use]
    pub fn agents(&self) -> Vec<Arc<dyn Agent>> {
        let mut ids: Vec<&String> = self.agents.keys().collect();
        ids.sort();
        ids.into_iter()
            .filter_map(|id| self.agents.get(id).map(|(_, a)| Arc::clone(a)))
            .collect()
    }

    /// Every registered processor, in pipeline order.
    #[must_use]
    pub fn processors(&self) -> Vec<Arc<dyn Processor>> {
        self.processors.iter().map(|(_, p)| Arc::clone(p)).collect()
    }

    /// Definitions of every registered tool, sorted by name.
    #[must_use]
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools()
            .into_iter()
            .map(|t| ToolDefinition {
                name: t.id().to_owned(),
                description: t.description().to_owned(),
                input_schema: t.input_schema().as_value().clone(),
            })
            .collect()
    }

    /// UI components bound to a tool (`tool-{id}`) that is not registered.
    ///
    /// Sorted by part type. Components whose part type is not of the
    /// `tool-` form are not bound to anything and never reported.
    #[must_use]
    pub fn ui_binding_issues(&self) -> Vec<UiBindingIssue> {
        let mut issues: Vec<UiBindingIssue> = self
            .ui
            .iter()
            .filter_map(|(part_type, (plugin, _))| {
                let tool_id = bound_tool_id(part_type)?;
                (!self.tools.contains_key(tool_id)).then(|| UiBindingIssue {
                    part_type: part_type.clone(),
                    tool_id: tool_id.to_owned(),
                    plugin: plugin.clone(),
                })
            })
            .collect();
        issues.sort_by(|a, b| a.part_type.cmp(&b.part_type));
        issues
    }

    // -----------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------

    fn require_tool(&self, id: &str) -> PluginResult<Arc<dyn Tool>> {
        self.tool(id).ok_or_else(|| PluginError::CapabilityNotFound {
            kind: CapabilityKind::Tools,
            id: id.to_owned(),
        })
    }

    /// Validate `input`, run the tool `id`, and validate its output.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::CapabilityNotFound`] for an unknown tool, or
    /// any error from [`tool::invoke`].
    pub async fn call_tool(&self, id: &str, input: &Value) -> PluginResult<ToolOutcome> {
        let tool = self.require_tool(id)?;
        let ctx = ToolContext::new(self);
        tool::invoke(tool.as_ref(), input, &ctx).await
    }

    /// Finish a suspended invocation of tool `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::CapabilityNotFound`] for an unknown tool, or
    /// any error from [`tool::resume`].
    pub async fn resume_tool(
        &self,
        id: &str,
        suspension: &Suspension,
        data: &Value,
    ) -> PluginResult<Value> {
        let tool = self.require_tool(id)?;
        let ctx = ToolContext::new(self);
        tool::resume(tool.as_ref(), suspension, data, &ctx).await
    }

    /// Render `props` with the UI component registered for `part_type`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::CapabilityNotFound`] for an unknown part type,
    /// or a props validation error.
    pub fn render(&self, part_type: &str, props: &Value) -> PluginResult<String> {
        let component =
            self.ui_component(part_type)
                .ok_or_else(|| PluginError::CapabilityNotFound {
                    kind: CapabilityKind::Ui,
                    id: part_type.to_owned(),
                })?;
        component.render_text(props)
    }

    /// Run every processor over `messages`, in registration order.
    ///
    /// A rewrite replaces the messages seen by later processors. A flag is
    /// recorded and the chain continues.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Blocked`] as soon as a processor blocks; no
    /// later processor runs.
    pub fn run_processors(&self, messages: Vec<Message>) -> PluginResult<ProcessedInput> {
        let mut current = messages;
        let mut flags = Vec::new();
        for (_, processor) in &self.processors {
            match processor.process_input(&current)? {
                ProcessorVerdict::Pass => {},
                ProcessorVerdict::Flag { reason } => {
                    warn!(processor = processor.id(), %reason, "Input flagged");
                    flags.push((processor.id().to_owned(), reason));
                },
                ProcessorVerdict::Rewrite { messages } => {
                    debug!(processor = processor.id(), "Input rewritten");
                    current = messages;
                },
                ProcessorVerdict::Block { reason } => {
                    warn!(processor = processor.id(), %reason, "Input blocked");
                    return Err(PluginError::Blocked {
                        processor: processor.id().to_owned(),
                        reason,
                    });
                },
            }
        }
        Ok(ProcessedInput {
            messages: current,
            flags,
        })
    }

    /// Run `prompt` through the processors, then through agent `agent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::CapabilityNotFound`] for an unknown agent,
    /// [`PluginError::Blocked`] if a processor blocks,
    /// [`PluginError::EmptyPrompt`] if a rewrite dropped the user message, or
    /// any generation failure.
    pub async fn generate(&self, agent_id: &str, prompt: &str) -> PluginResult<String> {
        let agent = self
            .agent(agent_id)
            .ok_or_else(|| PluginError::CapabilityNotFound {
                kind: CapabilityKind::Agents,
                id: agent_id.to_owned(),
            })?;
        let processed = self.run_processors(vec![Message::user(prompt)])?;
        let prompt = processed
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .ok_or_else(|| PluginError::EmptyPrompt {
                agent: agent_id.to_owned(),
            })?;
        let ctx = ToolContext::new(self);
        agent.generate(prompt, &ctx).await
    }
}

impl fmt::Debug for HostRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut plugins: Vec<&PluginId> = self.plugins.keys().collect();
        plugins.sort();
        f.debug_struct("HostRegistry")
            .field("plugins", &plugins)
            .field("has_model", &self.model.is_some())
            .finish_non_exhaustive()
    }
}
