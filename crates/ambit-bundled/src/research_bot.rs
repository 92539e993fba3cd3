//! Research bot plugin.
//!
//! `deepResearch` hands the query to the `researchAgent` collaborator and
//! condenses its answer into a summary and key points. The agent must be
//! registered; without it the tool fails with a missing-collaborator error.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ambit_plugins::{
    CapabilityKind, InstructedAgent, PluginFeatures, PluginId, PluginManifest, PluginResult,
    SchemaTool, StaticPlugin, ToolContext, TypedTool,
};

/// Plugin identifier.
pub const PLUGIN_ID: &str = "research-bot";
/// Agent `deepResearch` delegates to.
pub const RESEARCH_AGENT: &str = "researchAgent";

/// How deep the research goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResearchDepth {
    /// A few headline facts.
    Quick,
    /// A balanced overview.
    #[default]
    Standard,
    /// Exhaustive.
    Thorough,
}

impl ResearchDepth {
    /// Maximum number of key points reported at this depth.
    #[must_use]
    pub fn key_point_limit(self) -> usize {
        match self {
            Self::Quick => 3,
            Self::Standard => 5,
            Self::Thorough => 10,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Standard => "standard",
            Self::Thorough => "thorough",
        }
    }
}

fn default_max_sources() -> u8 {
    5
}

/// Input of `deepResearch`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResearchRequest {
    /// What to research.
    #[schemars(length(min = 1))]
    pub query: String,
    /// Research depth.
    #[serde(default)]
    pub depth: ResearchDepth,
    /// Upper bound on sources consulted.
    #[serde(default = "default_max_sources")]
    #[schemars(range(min = 1, max = 20))]
    pub max_sources: u8,
}

/// Output of `deepResearch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResearchReport {
    /// The original query.
    pub query: String,
    /// Depth the research ran at.
    pub depth: ResearchDepth,
    /// Short prose summary.
    pub summary: String,
    /// Bulleted findings.
    pub key_points: Vec<String>,
}

fn prompt_for(request: &ResearchRequest) -> String {
    format!(
        "Research the following topic at {} depth, consulting at most {} sources.\n\
         Start with a one-paragraph summary, then list the key findings as bullet points.\n\n\
         Topic: {}",
        request.depth.as_str(),
        request.max_sources,
        request.query
    )
}

/// Strip a `- `, `* ` or `N. ` list marker.
fn bullet_text(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Some(rest.trim());
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line.get(digits..)
        .and_then(|rest| rest.strip_prefix(". "))
        .map(str::trim)
}

/// Split an agent reply into a summary paragraph and up to `limit` key points.
fn condense(reply: &str, limit: usize) -> (String, Vec<String>) {
    let key_points: Vec<String> = reply
        .lines()
        .filter_map(bullet_text)
        .filter(|p| !p.is_empty())
        .take(limit)
        .map(str::to_owned)
        .collect();

    let summary = reply
        .split("\n\n")
        .map(|paragraph| {
            paragraph
                .lines()
                .filter(|l| bullet_text(l).is_none())
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .find(|p| !p.is_empty())
        .unwrap_or_default();

    (summary, key_points)
}

/// `deepResearch`: research a topic through the research agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepResearch;

#[async_trait]
impl TypedTool for DeepResearch {
    type Input = ResearchRequest;
    type Output = ResearchReport;

    fn id(&self) -> &str {
        "deepResearch"
    }

    fn description(&self) -> &str {
        "Research a topic in depth and summarize the findings"
    }

    async fn run(&self, input: ResearchRequest, ctx: &ToolContext<'_>) -> PluginResult<ResearchReport> {
        let agent = ctx.agent(RESEARCH_AGENT)?;
        let reply = agent.generate(&prompt_for(&input), ctx).await?;
        let (summary, key_points) = condense(&reply, input.depth.key_point_limit());
        debug!(
            query = %input.query,
            depth = input.depth.as_str(),
            key_points = key_points.len(),
            "Research complete"
        );
        Ok(ResearchReport {
            query: input.query,
            depth: input.depth,
            summary,
            key_points,
        })
    }
}

/// The research agent.
#[must_use]
pub fn agent() -> InstructedAgent {
    InstructedAgent::new(
        RESEARCH_AGENT,
        "Researches topics and reports structured findings",
        "You are a careful researcher. Answer with a short summary paragraph \
         followed by the key findings as a bulleted list. Cite sources inline \
         where you can and say so when evidence is thin.",
    )
}

/// The plugin manifest.
#[must_use]
pub fn manifest() -> PluginManifest {
    PluginManifest::new(PluginId::from_static(PLUGIN_ID), "Research Bot", "0.1.0")
        .with_description("Delegated deep research with summarized findings")
        .with_features(PluginFeatures::from_kinds(&[
            CapabilityKind::Tools,
            CapabilityKind::Agents,
        ]))
}

/// The assembled plugin.
#[must_use]
pub fn plugin() -> StaticPlugin {
    StaticPlugin::new(manifest())
        .with_tool(Arc::new(SchemaTool::new(DeepResearch)))
        .with_agent(Arc::new(agent()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambit_plugins::{HostRegistry, Plugin, PluginError};
    use ambit_test::ScriptedModel;
    use serde_json::json;

    const REPLY: &str = "Rust is a systems language\nfocused on safety.\n\n\
        - Ownership replaces a garbage collector\n\
        * Traits give zero-cost abstraction\n\
        1. Cargo manages builds\n\
        2. Editions keep old code compiling\n";

    fn registry(model: Arc<ScriptedModel>) -> HostRegistry {
        let mut registry = HostRegistry::new().with_model(model);
        registry.register(Box::new(plugin())).unwrap();
        registry
    }

    #[test]
    fn test_condense() {
        let (summary, points) = condense(REPLY, 3);
        assert_eq!(summary, "Rust is a systems language focused on safety.");
        assert_eq!(
            points,
            vec![
                "Ownership replaces a garbage collector",
                "Traits give zero-cost abstraction",
                "Cargo manages builds",
            ]
        );
    }

    #[test]
    fn test_bullet_text() {
        assert_eq!(bullet_text("  - item"), Some("item"));
        assert_eq!(bullet_text("12. item"), Some("item"));
        assert_eq!(bullet_text("2024 was a year"), None);
        assert_eq!(bullet_text("plain"), None);
    }

    #[tokio::test]
    async fn test_deep_research_defaults() {
        let model = Arc::new(ScriptedModel::always(REPLY));
        let out = registry(Arc::clone(&model))
            .call_tool("deepResearch", &json!({"query": "Rust"}))
            .await
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(out["depth"], "standard");
        assert_eq!(out["keyPoints"].as_array().unwrap().len(), 4);

        let request = &model.requests()[0];
        assert!(request.messages[0].content.contains("at most 5 sources"));
        assert!(request.system.contains("researcher"));
    }

    #[tokio::test]
    async fn test_deep_research_quick_limits_points() {
        let out = registry(Arc::new(ScriptedModel::always(REPLY)))
            .call_tool("deepResearch", &json!({"query": "Rust", "depth": "quick"}))
            .await
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(out["keyPoints"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_deep_research_rejects_bad_input() {
        let registry = registry(Arc::new(ScriptedModel::always(REPLY)));
        let err = registry
            .call_tool("deepResearch", &json!({"query": "Rust", "maxSources": 50}))
            .await
            .unwrap_err();
        assert!(err.as_validation().unwrap().1.mentions("maxSources"));

        let err = registry
            .call_tool("deepResearch", &json!({"query": "Rust", "depth": "deep"}))
            .await
            .unwrap_err();
        assert!(err.as_validation().unwrap().1.mentions("depth"));
    }

    #[tokio::test]
    async fn test_deep_research_without_agent() {
        let tool_only = StaticPlugin::new(
            PluginManifest::new(PluginId::from_static("research-lite"), "Lite", "0.1.0")
                .with_features(PluginFeatures::from_kinds(&[CapabilityKind::Tools])),
        )
        .with_tool(Arc::new(SchemaTool::new(DeepResearch)));
        assert!(tool_only.check().is_ok());

        let mut registry = HostRegistry::new().with_model(Arc::new(ScriptedModel::always(REPLY)));
        registry.register(Box::new(tool_only)).unwrap();
        let err = registry
            .call_tool("deepResearch", &json!({"query": "Rust"}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PluginError::MissingCollaborator { ref kind, ref id } if kind == "agent" && id == RESEARCH_AGENT
        ));
    }
}
