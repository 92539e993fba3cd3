//! Ask-user-for-stuff plugin: human-in-the-loop tools.
//!
//! Each tool suspends with the request as payload and finishes once the host
//! resumes it with the human's answer. A UI component `tool-{toolId}` renders
//! each pending request.

mod ui;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use ambit_plugins::{
    CapabilityKind, InteractiveTool, PluginError, PluginFeatures, PluginId, PluginManifest,
    PluginResult, SchemaUi, StaticPlugin, SuspendingTool, ValidationStage,
};
use ambit_schema::{FieldPath, IssueKind, ValidationError, ValidationIssue};

pub use ui::{ChoicePrompt, ConfirmationDialog, TextPrompt};

/// Plugin identifier.
pub const PLUGIN_ID: &str = "ask-user-for-stuff";

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn default_confirm_label() -> String {
    "Confirm".to_string()
}

fn default_cancel_label() -> String {
    "Cancel".to_string()
}

/// Visual emphasis of a confirmation dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationVariant {
    /// Neutral.
    #[default]
    Default,
    /// Destructive action.
    Danger,
    /// Needs attention.
    Warning,
}

/// Input of `askForConfirmation`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfirmationRequest {
    /// Dialog title.
    pub title: String,
    /// What is being confirmed.
    pub message: String,
    /// Label of the confirm button.
    #[serde(default = "default_confirm_label")]
    pub confirm_label: String,
    /// Label of the cancel button.
    #[serde(default = "default_cancel_label")]
    pub cancel_label: String,
    /// Visual emphasis.
    #[serde(default)]
    pub variant: ConfirmationVariant,
}

/// Resume data of `askForConfirmation`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfirmationAnswer {
    /// Whether the user confirmed.
    pub confirmed: bool,
}

/// Output of `askForConfirmation`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfirmationResult {
    /// Whether the user confirmed.
    pub confirmed: bool,
    /// When the answer was recorded (RFC 3339).
    pub timestamp: String,
}

/// `askForConfirmation`: yes/no dialog.
#[derive(Debug, Clone, Copy, Default)]
pub struct AskForConfirmation;

impl InteractiveTool for AskForConfirmation {
    type Input = ConfirmationRequest;
    type Resume = ConfirmationAnswer;
    type Output = ConfirmationResult;

    fn id(&self) -> &str {
        "askForConfirmation"
    }

    fn description(&self) -> &str {
        "Ask the user to confirm or cancel an action"
    }

    fn complete(
        &self,
        _request: ConfirmationRequest,
        answer: ConfirmationAnswer,
    ) -> PluginResult<ConfirmationResult> {
        Ok(ConfirmationResult {
            confirmed: answer.confirmed,
            timestamp: now(),
        })
    }
}

/// Input of `askForText`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextRequest {
    /// The question to ask.
    pub question: String,
    /// Hint shown in the empty input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Whether a multi-line answer is expected.
    #[serde(default)]
    pub multiline: bool,
}

/// Resume data of `askForText`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextAnswer {
    /// What the user typed.
    pub answer: String,
}

/// Output of `askForText`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextResult {
    /// What the user typed.
    pub answer: String,
    /// When the answer was recorded (RFC 3339).
    pub timestamp: String,
}

/// `askForText`: free-form text input.
#[derive(Debug, Clone, Copy, Default)]
pub struct AskForText;

impl InteractiveTool for AskForText {
    type Input = TextRequest;
    type Resume = TextAnswer;
    type Output = TextResult;

    fn id(&self) -> &str {
        "askForText"
    }

    fn description(&self) -> &str {
        "Ask the user a question and wait for a text answer"
    }

    fn complete(&self, _request: TextRequest, answer: TextAnswer) -> PluginResult<TextResult> {
        Ok(TextResult {
            answer: answer.answer,
            timestamp: now(),
        })
    }
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChoiceOption {
    /// Value returned when selected.
    pub id: String,
    /// Text shown to the user.
    pub label: String,
}

/// Input of `askForChoice`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChoiceRequest {
    /// The question to ask.
    pub question: String,
    /// Offered options.
    #[schemars(length(min = 1))]
    pub options: Vec<ChoiceOption>,
    /// Whether more than one option may be selected.
    #[serde(default)]
    pub allow_multiple: bool,
}

/// Resume data of `askForChoice`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChoiceAnswer {
    /// Ids of the selected options.
    pub selected: Vec<String>,
}

/// Output of `askForChoice`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChoiceResult {
    /// Ids of the selected options.
    pub selected: Vec<String>,
    /// When the answer was recorded (RFC 3339).
    pub timestamp: String,
}

/// `askForChoice`: pick one (or several) of the offered options.
#[derive(Debug, Clone, Copy, Default)]
pub struct AskForChoice;

impl AskForChoice {
    fn check_selection(request: &ChoiceRequest, answer: &ChoiceAnswer) -> Vec<ValidationIssue> {
        let offered: Vec<String> = request.options.iter().map(|o| o.id.clone()).collect();
        let selected = FieldPath::root().key("selected");
        let mut issues = Vec::new();

        let count = answer.selected.len();
        let allowed_count = if request.allow_multiple {
            count >= 1
        } else {
            count == 1
        };
        if !allowed_count {
            issues.push(ValidationIssue {
                path: selected.clone(),
                kind: IssueKind::Length {
                    bound: if request.allow_multiple {
                        "at least 1".into()
                    } else {
                        "exactly 1".into()
                    },
                    actual: count,
                },
            });
        }

        let mut seen = HashSet::new();
        for (i, id) in answer.selected.iter().enumerate() {
            if !offered.contains(id) {
                issues.push(ValidationIssue {
                    path: selected.index(i),
                    kind: IssueKind::NotInEnum {
                        allowed: offered.clone(),
                    },
                });
            } else if !seen.insert(id) {
                issues.push(ValidationIssue {
                    path: selected.index(i),
                    kind: IssueKind::Duplicate,
                });
            }
        }
        issues
    }
}

impl InteractiveTool for AskForChoice {
    type Input = ChoiceRequest;
    type Resume = ChoiceAnswer;
    type Output = ChoiceResult;

    fn id(&self) -> &str {
        "askForChoice"
    }

    fn description(&self) -> &str {
        "Ask the user to pick from a list of options"
    }

    fn complete(&self, request: ChoiceRequest, answer: ChoiceAnswer) -> PluginResult<ChoiceResult> {
        let issues = Self::check_selection(&request, &answer);
        if !issues.is_empty() {
            return Err(PluginError::validation(
                self.id(),
                ValidationStage::Resume,
                ValidationError::new(Some("ChoiceAnswer".into()), issues),
            ));
        }
        Ok(ChoiceResult {
            selected: answer.selected,
            timestamp: now(),
        })
    }
}

/// The plugin manifest.
#[must_use]
pub fn manifest() -> PluginManifest {
    PluginManifest::new(PluginId::from_static(PLUGIN_ID), "Ask User For Stuff", "0.1.0")
        .with_description("Human-in-the-loop confirmation, text and choice prompts")
        .with_features(PluginFeatures::from_kinds(&[
            CapabilityKind::Tools,
            CapabilityKind::Ui,
        ]))
}

/// The assembled plugin.
#[must_use]
pub fn plugin() -> StaticPlugin {
    StaticPlugin::new(manifest())
        .with_tool(Arc::new(SuspendingTool::new(AskForConfirmation)))
        .with_tool(Arc::new(SuspendingTool::new(AskForText)))
        .with_tool(Arc::new(SuspendingTool::new(AskForChoice)))
        .with_ui(Arc::new(SchemaUi::new(ConfirmationDialog)))
        .with_ui(Arc::new(SchemaUi::new(TextPrompt)))
        .with_ui(Arc::new(SchemaUi::new(ChoicePrompt)))
}
