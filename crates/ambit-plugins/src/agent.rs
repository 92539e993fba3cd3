//! Agent capability and the host language model seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::ToolContext;
use crate::error::PluginResult;
use crate::message::Message;

/// A request handed to the host's language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System instructions.
    pub system: String,
    /// Conversation so far.
    pub messages: Vec<Message>,
    /// Identifiers of the tools the model may call.
    #[serde(default)]
    pub tool_ids: Vec<String>,
}

/// The model an agent generates with. Supplied by the host, not by plugins.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model name, for logs.
    fn name(&self) -> &str;

    /// Produce the next assistant message.
    async fn complete(&self, request: CompletionRequest) -> PluginResult<String>;
}

impl std::fmt::Debug for dyn LanguageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageModel")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// An agent contributed by a plugin.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent identifier (unique per host registry).
    fn id(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// System instructions.
    fn instructions(&self) -> &str;

    /// Identifiers of the tools this agent may call.
    fn tool_ids(&self) -> &[String];

    /// Answer `prompt`.
    async fn generate(&self, prompt: &str, ctx: &ToolContext<'_>) -> PluginResult<String>;
}

impl std::fmt::Debug for dyn Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id())
            .finish_non_exhaustive()
    }
}

/// An agent defined by instructions and a tool list, generating with the
/// host's [`LanguageModel`].
#[derive(Debug, Clone)]
pub struct InstructedAgent {
    id: String,
    description: String,
    instructions: String,
    tool_ids: Vec<String>,
}

impl InstructedAgent {
    /// An agent with no tools.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            instructions: instructions.into(),
            tool_ids: Vec::new(),
        }
    }

    /// Allow the agent to call `tool_id`.
    #[must_use]
    pub fn with_tool(mut self, tool_id: impl Into<String>) -> Self {
        self.tool_ids.push(tool_id.into());
        self
    }
}

#[async_trait]
impl Agent for InstructedAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn instructions(&self) -> &str {
        &self.instructions
    }

    fn tool_ids(&self) -> &[String] {
        &self.tool_ids
    }

    async fn generate(&self, prompt: &str, ctx: &ToolContext<'_>) -> PluginResult<String> {
        let model = ctx.model()?;
        debug!(agent = %self.id, model = model.name(), "Generating");
        model
            .complete(CompletionRequest {
                system: self.instructions.clone(),
                messages: vec![Message::user(prompt)],
                tool_ids: self.tool_ids.clone(),
            })
            .await
    }
}
