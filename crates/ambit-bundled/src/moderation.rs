//! Content moderation plugin.
//!
//! The `contentModeration` processor scans user messages for blocked terms
//! (whole words, case-insensitive) before they reach an agent, and blocks,
//! redacts or flags the input depending on the configured action.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ambit_plugins::{
    CapabilityKind, Message, PluginError, PluginFeatures, PluginId, PluginManifest, PluginResult,
    Processor, ProcessorVerdict, Role, StaticPlugin,
};

/// Plugin identifier.
pub const PLUGIN_ID: &str = "content-moderation";
/// Replacement text for redacted terms.
pub const REDACTION: &str = "[redacted]";

/// What to do when a blocked term is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    /// Reject the input.
    Block,
    /// Replace the offending terms and continue.
    #[default]
    Redact,
    /// Let the input through but flag it.
    Warn,
}

impl ModerationAction {
    /// The lowercase name used in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Redact => "redact",
            Self::Warn => "warn",
        }
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognised moderation action name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown moderation action '{0}' (expected block, redact or warn)")]
pub struct ParseActionError(pub String);

impl FromStr for ModerationAction {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "redact" => Ok(Self::Redact),
            "warn" => Ok(Self::Warn),
            other => Err(ParseActionError(other.to_owned())),
        }
    }
}

/// The `contentModeration` processor.
#[derive(Debug, Clone)]
pub struct ContentModeration {
    pattern: Option<Regex>,
    action: ModerationAction,
}

impl ContentModeration {
    /// A processor matching `terms` and applying `action`.
    ///
    /// Blank terms are ignored. With no terms left the processor passes
    /// everything through.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::ExecutionFailed`] if the combined pattern
    /// cannot be compiled.
    pub fn new<I, S>(terms: I, action: ModerationAction) -> PluginResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_owned())
            .filter(|t| !t.is_empty())
            .map(|t| term_pattern(&t))
            .collect();

        let pattern = if alternatives.is_empty() {
            None
        } else {
            let source = format!("(?i){}", alternatives.join("|"));
            Some(Regex::new(&source).map_err(|e| {
                PluginError::ExecutionFailed(format!("invalid moderation pattern: {e}"))
            })?)
        };

        Ok(Self { pattern, action })
    }

    /// The configured action.
    #[must_use]
    pub fn action(&self) -> ModerationAction {
        self.action
    }

    /// Distinct blocked terms found in `text`, lowercased, in order of first
    /// appearance.
    #[must_use]
    pub fn matches(&self, text: &str) -> Vec<String> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        let mut found: Vec<String> = Vec::new();
        for m in pattern.find_iter(text) {
            let term = m.as_str().to_lowercase();
            if !found.contains(&term) {
                found.push(term);
            }
        }
        found
    }

    fn redact(&self, text: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(text, REDACTION).into_owned(),
            None => text.to_owned(),
        }
    }
}

/// `term` as a standalone token.
///
/// A word-character edge needs a word boundary (`\b`). A non-word edge such
/// as the `@` of `@admin` needs the opposite (`\B`), so the neighbouring
/// character must not be a word character either.
fn term_pattern(term: &str) -> String {
    let edge = |c: Option<char>| match c {
        Some(c) if c.is_alphanumeric() || c == '_' => r"\b",
        _ => r"\B",
    };
    format!(
        "(?:{}{}{})",
        edge(term.chars().next()),
        regex::escape(term),
        edge(term.chars().next_back())
    )
}

impl Processor for ContentModeration {
    fn id(&self) -> &str {
        "contentModeration"
    }

    fn description(&self) -> &str {
        "Blocks, redacts or flags user input containing blocked terms"
    }

    fn process_input(&self, messages: &[Message]) -> PluginResult<ProcessorVerdict> {
        let mut found: Vec<String> = Vec::new();
        for message in messages.iter().filter(|m| m.role == Role::User) {
            for term in self.matches(&message.content) {
                if !found.contains(&term) {
                    found.push(term);
                }
            }
        }
        if found.is_empty() {
            return Ok(ProcessorVerdict::Pass);
        }

        debug!(action = %self.action, terms = found.len(), "Blocked terms in input");
        let reason = format!("blocked terms: {}", found.join(", "));
        Ok(match self.action {
            ModerationAction::Block => ProcessorVerdict::Block { reason },
            ModerationAction::Warn => ProcessorVerdict::Flag { reason },
            ModerationAction::Redact => ProcessorVerdict::Rewrite {
                messages: messages
                    .iter()
                    .map(|m| {
                        if m.role == Role::User {
                            Message::new(m.role, self.redact(&m.content))
                        } else {
                            m.clone()
                        }
                    })
                    .collect(),
            },
        })
    }
}

/// The plugin manifest.
#[must_use]
pub fn manifest() -> PluginManifest {
    PluginManifest::new(PluginId::from_static(PLUGIN_ID), "Content Moderation", "0.1.0")
        .with_description("Screens user input for blocked terms")
        .with_features(PluginFeatures::from_kinds(&[CapabilityKind::Processors]))
}

/// The assembled plugin.
///
/// # Errors
///
/// Returns [`PluginError::ExecutionFailed`] if the term list cannot be
/// compiled.
pub fn plugin<I, S>(terms: I, action: ModerationAction) -> PluginResult<StaticPlugin>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let processor = ContentModeration::new(terms, action)?;
    Ok(StaticPlugin::new(manifest()).with_processor(Arc::new(processor)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambit_plugins::{HostRegistry, Plugin};

    fn moderation(action: ModerationAction) -> ContentModeration {
        ContentModeration::new(["spam", "scam"], action).unwrap()
    }

    #[test]
    fn test_whole_word_case_insensitive() {
        let m = moderation(ModerationAction::Block);
        assert_eq!(m.matches("SPAM and more Spam"), vec!["spam"]);
        assert!(m.matches("spammer").is_empty());
        assert!(m.matches("antispam").is_empty());
    }

    #[test]
    fn test_terms_are_escaped() {
        let m = ContentModeration::new(["a.b"], ModerationAction::Block).unwrap();
        assert_eq!(m.matches("see a.b here"), vec!["a.b"]);
        assert!(m.matches("axb").is_empty());
    }

    #[test]
    fn test_terms_with_symbol_edges() {
        let m = ContentModeration::new(["c++", "@admin", "spam"], ModerationAction::Block).unwrap();
        assert_eq!(m.matches("I love C++ a lot"), vec!["c++"]);
        assert_eq!(m.matches("ping @admin now"), vec!["@admin"]);
        assert_eq!(m.matches("@admin: spam"), vec!["@admin", "spam"]);
        assert!(m.matches("c++x and me@admin").is_empty());
    }

    #[test]
    fn test_redact_symbol_term() {
        let m = ContentModeration::new(["$$$"], ModerationAction::Redact).unwrap();
        let verdict = m.process_input(&[Message::user("win $$$ now")]).unwrap();
        let ProcessorVerdict::Rewrite { messages } = verdict else {
            panic!("expected rewrite, got {verdict:?}");
        };
        assert_eq!(messages[0].content, "win [redacted] now");
    }

    #[test]
    fn test_block() {
        let verdict = moderation(ModerationAction::Block)
            .process_input(&[Message::user("buy spam now")])
            .unwrap();
        assert_eq!(
            verdict,
            ProcessorVerdict::Block {
                reason: "blocked terms: spam".into()
            }
        );
    }

    #[test]
    fn test_redact_only_user_messages() {
        let verdict = moderation(ModerationAction::Redact)
            .process_input(&[Message::system("spam filter on"), Message::user("Spam? spam!")])
            .unwrap();
        let ProcessorVerdict::Rewrite { messages } = verdict else {
            panic!("expected rewrite, got {verdict:?}");
        };
        assert_eq!(messages[0].content, "spam filter on");
        assert_eq!(messages[1].content, "[redacted]? [redacted]!");
    }

    #[test]
    fn test_warn_flags() {
        let verdict = moderation(ModerationAction::Warn)
            .process_input(&[Message::user("spam")])
            .unwrap();
        assert!(matches!(verdict, ProcessorVerdict::Flag { .. }));
    }

    #[test]
    fn test_clean_input_and_empty_terms_pass() {
        let verdict = moderation(ModerationAction::Block)
            .process_input(&[Message::user("hello")])
            .unwrap();
        assert_eq!(verdict, ProcessorVerdict::Pass);

        let empty = ContentModeration::new(["", "  "], ModerationAction::Block).unwrap();
        assert_eq!(
            empty.process_input(&[Message::user("spam")]).unwrap(),
            ProcessorVerdict::Pass
        );
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("BLOCK".parse::<ModerationAction>().unwrap(), ModerationAction::Block);
        assert_eq!(ModerationAction::default(), ModerationAction::Redact);
        assert_eq!(
            "shout".parse::<ModerationAction>(),
            Err(ParseActionError("shout".into()))
        );
    }

    #[test]
    fn test_registry_blocks_before_agent() {
        let mut registry = HostRegistry::new();
        let plugin = plugin(["spam"], ModerationAction::Block).unwrap();
        assert!(plugin.check().is_ok());
        registry.register(Box::new(plugin)).unwrap();
        let err = registry
            .run_processors(vec![Message::user("spam")])
            .unwrap_err();
        assert!(matches!(err, PluginError::Blocked { .. }));
    }
}
