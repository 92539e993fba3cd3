//! Tool capability.
//!
//! A tool has an input schema, an output schema and an executor. Callers go
//! through [`invoke`] (or [`HostRegistry::call_tool`](crate::registry::HostRegistry::call_tool)),
//! which validates the input, runs the executor and validates the output, so
//! an executor only ever sees normalized input with defaults filled in.
//!
//! Most tools are written against [`TypedTool`] and wrapped in
//! [`SchemaTool`]; human-in-the-loop tools use [`InteractiveTool`] and
//! [`SuspendingTool`].

use std::fmt;

use ambit_schema::Schema;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::context::ToolContext;
use crate::error::{PluginError, PluginResult, ValidationStage};

/// A paused tool invocation waiting for external input.
///
/// The payload is what the host shows to whoever must answer (usually the
/// normalized tool input); `resume_schema` is the shape the answer must have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suspension {
    /// Unique invocation identifier.
    pub id: Uuid,
    /// The tool that suspended.
    pub tool_id: String,
    /// Data describing what is being asked.
    pub payload: Value,
    /// JSON Schema the resume data must satisfy.
    pub resume_schema: Value,
}

impl Suspension {
    /// A fresh suspension for `tool_id`.
    #[must_use]
    pub fn new(tool_id: impl Into<String>, payload: Value, resume_schema: &Schema) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool_id: tool_id.into(),
            payload,
            resume_schema: resume_schema.as_value().clone(),
        }
    }
}

/// Result of running a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum ToolOutcome {
    /// The tool finished with this output.
    Completed(Value),
    /// The tool is waiting for external input.
    Suspended(Suspension),
}

impl ToolOutcome {
    /// The output, if the tool finished.
    #[must_use]
    pub fn completed(self) -> Option<Value> {
        match self {
            Self::Completed(v) => Some(v),
            Self::Suspended(_) => None,
        }
    }

    /// The suspension, if the tool paused.
    #[must_use]
    pub fn suspended(self) -> Option<Suspension> {
        match self {
            Self::Completed(_) => None,
            Self::Suspended(s) => Some(s),
        }
    }
}

/// A tool contributed by a plugin.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool identifier (unique per host registry). Also the dispatch key and
    /// the suffix of the matching UI part type (`tool-{id}`).
    fn id(&self) -> &str;

    /// Human-readable description for the model.
    fn description(&self) -> &str;

    /// Schema candidate input must satisfy.
    fn input_schema(&self) -> &Schema;

    /// Schema the executor's output must satisfy.
    fn output_schema(&self) -> &Schema;

    /// Schema for resume data, for tools that can suspend.
    fn resume_schema(&self) -> Option<&Schema> {
        None
    }

    /// Run the tool on already-validated input.
    async fn execute(&self, input: Value, ctx: &ToolContext<'_>) -> PluginResult<ToolOutcome>;

    /// Finish a suspended invocation with already-validated resume data.
    async fn resume(
        &self,
        suspension: &Suspension,
        data: Value,
        ctx: &ToolContext<'_>,
    ) -> PluginResult<Value> {
        let _ = (suspension, data, ctx);
        Err(PluginError::NotResumable(self.id().to_owned()))
    }
}

impl fmt::Debug for dyn Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("id", &self.id())
            .finish_non_exhaustive()
    }
}

fn check_output(tool: &dyn Tool, output: Value) -> PluginResult<Value> {
    tool.output_schema()
        .validate(&output)
        .map_err(|e| PluginError::validation(tool.id(), ValidationStage::Output, e))
}

/// Validate `input`, execute `tool`, and validate its output.
///
/// # Errors
///
/// Returns [`PluginError::Validation`] at the input or output stage, or
/// whatever the executor fails with.
pub async fn invoke(
    tool: &dyn Tool,
    input: &Value,
    ctx: &ToolContext<'_>,
) -> PluginResult<ToolOutcome> {
    let normalized = tool
        .input_schema()
        .validate(input)
        .map_err(|e| PluginError::validation(tool.id(), ValidationStage::Input, e))?;

    debug!(tool = tool.id(), invocation = %ctx.invocation_id(), "Executing tool");
    match tool.execute(normalized, ctx).await? {
        ToolOutcome::Completed(output) => check_output(tool, output).map(ToolOutcome::Completed),
        ToolOutcome::Suspended(suspension) => {
            debug!(tool = tool.id(), suspension = %suspension.id, "Tool suspended");
            Ok(ToolOutcome::Suspended(suspension))
        },
    }
}

/// Validate `data` against the tool's resume schema and finish `suspension`.
///
/// # Errors
///
/// Returns [`PluginError::SuspensionMismatch`] when the suspension came from
/// another tool, [`PluginError::NotResumable`] when the tool never suspends,
/// and [`PluginError::Validation`] at the resume or output stage.
pub async fn resume(
    tool: &dyn Tool,
    suspension: &Suspension,
    data: &Value,
    ctx: &ToolContext<'_>,
) -> PluginResult<Value> {
    if suspension.tool_id != tool.id() {
        return Err(PluginError::SuspensionMismatch {
            expected: suspension.tool_id.clone(),
            actual: tool.id().to_owned(),
        });
    }
    let schema = tool
        .resume_schema()
        .ok_or_else(|| PluginError::NotResumable(tool.id().to_owned()))?;
    let normalized = schema
        .validate(data)
        .map_err(|e| PluginError::validation(tool.id(), ValidationStage::Resume, e))?;

    debug!(tool = tool.id(), suspension = %suspension.id, "Resuming tool");
    let output = tool.resume(suspension, normalized, ctx).await?;
    check_output(tool, output)
}

/// A tool written against concrete Rust types.
///
/// The schemas are derived from `Input` and `Output`; wrap the tool in
/// [`SchemaTool`] to register it.
#[async_trait]
pub trait TypedTool: Send + Sync + 'static {
    /// Input type. Its `JsonSchema` is the tool's input schema.
    type Input: DeserializeOwned + JsonSchema + Send;
    /// Output type. Its `JsonSchema` is the tool's output schema.
    type Output: Serialize + JsonSchema + Send;

    /// Tool identifier.
    fn id(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Run the tool.
    async fn run(&self, input: Self::Input, ctx: &ToolContext<'_>) -> PluginResult<Self::Output>;
}

/// Adapter exposing a [`TypedTool`] as a [`Tool`].
pub struct SchemaTool<T> {
    inner: T,
    input: Schema,
    output: Schema,
}

impl<T: TypedTool> SchemaTool<T> {
    /// Wrap `inner`, deriving both schemas from its associated types.
    #[must_use]
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            input: Schema::of::<T::Input>(),
            output: Schema::of::<T::Output>(),
        }
    }

    /// The wrapped tool.
    #[must_use]
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: TypedTool> Tool for SchemaTool<T> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn input_schema(&self) -> &Schema {
        &self.input
    }

    fn output_schema(&self) -> &Schema {
        &self.output
    }

    async fn execute(&self, input: Value, ctx: &ToolContext<'_>) -> PluginResult<ToolOutcome> {
        let typed = self
            .input
            .parse::<T::Input>(&input)
            .map_err(|e| PluginError::validation(self.id(), ValidationStage::Input, e))?;
        let output = self.inner.run(typed, ctx).await?;
        let value = serde_json::to_value(output)
            .map_err(|e| PluginError::ExecutionFailed(format!("{}: {e}", self.id())))?;
        Ok(ToolOutcome::Completed(value))
    }
}

/// A tool that always pauses for a human answer before it can finish.
///
/// Executing it yields a [`Suspension`] carrying the normalized input; the
/// host collects a `Resume` value and hands it back through [`resume`].
pub trait InteractiveTool: Send + Sync + 'static {
    /// The request shown to the human.
    type Input: DeserializeOwned + JsonSchema + Send;
    /// The human's answer.
    type Resume: DeserializeOwned + JsonSchema + Send;
    /// The final result.
    type Output: Serialize + JsonSchema + Send;

    /// Tool identifier.
    fn id(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Combine the original request and the answer into the final output.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Validation`] at the resume stage when the
    /// answer is well-formed but inconsistent with the request.
    fn complete(&self, request: Self::Input, answer: Self::Resume) -> PluginResult<Self::Output>;
}

/// Adapter exposing an [`InteractiveTool`] as a [`Tool`].
pub struct SuspendingTool<T> {
    inner: T,
    input: Schema,
    resume: Schema,
    output: Schema,
}

impl<T: InteractiveTool> SuspendingTool<T> {
    /// Wrap `inner`, deriving all three schemas from its associated types.
    #[must_use]
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            input: Schema::of::<T::Input>(),
            resume: Schema::of::<T::Resume>(),
            output: Schema::of::<T::Output>(),
        }
    }
}

#[async_trait]
impl<T: InteractiveTool> Tool for SuspendingTool<T> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn input_schema(&self) -> &Schema {
        &self.input
    }

    fn output_schema(&self) -> &Schema {
        &self.output
    }

    fn resume_schema(&self) -> Option<&Schema> {
        Some(&self.resume)
    }

    async fn execute(&self, input: Value, _ctx: &ToolContext<'_>) -> PluginResult<ToolOutcome> {
        let normalized = self
            .input
            .validate(&input)
            .map_err(|e| PluginError::validation(self.id(), ValidationStage::Input, e))?;
        Ok(ToolOutcome::Suspended(Suspension::new(
            self.id(),
            normalized,
            &self.resume,
        )))
    }

    async fn resume(
        &self,
        suspension: &Suspension,
        data: Value,
        _ctx: &ToolContext<'_>,
    ) -> PluginResult<Value> {
        let request = self
            .input
            .parse::<T::Input>(&suspension.payload)
            .map_err(|e| PluginError::validation(self.id(), ValidationStage::Input, e))?;
        let answer = self
            .resume
            .parse::<T::Resume>(&data)
            .map_err(|e| PluginError::validation(self.id(), ValidationStage::Resume, e))?;
        let output = self.inner.complete(request, answer)?;
        serde_json::to_value(output)
            .map_err(|e| PluginError::ExecutionFailed(format!("{}: {e}", self.id())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::HostRegistry;
    use serde_json::json;

    #[derive(Deserialize, JsonSchema)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    struct AddInput {
        a: i64,
        #[serde(default = "one")]
        b: i64,
    }

    fn one() -> i64 {
        1
    }

    #[derive(Serialize, JsonSchema)]
    struct AddOutput {
        sum: i64,
    }

    struct Add;

    #[async_trait]
    impl TypedTool for Add {
        type Input = AddInput;
        type Output = AddOutput;

        fn id(&self) -> &str {
            "add"
        }

        fn description(&self) -> &str {
            "Adds two integers"
        }

        async fn run(&self, input: AddInput, _ctx: &ToolContext<'_>) -> PluginResult<AddOutput> {
            Ok(AddOutput {
                sum: input.a.saturating_add(input.b),
            })
        }
    }

    /// Returns whatever output it was built with, bypassing any typing.
    struct Raw {
        output: Value,
        schema: Schema,
    }

    #[async_trait]
    impl Tool for Raw {
        fn id(&self) -> &str {
            "raw"
        }

        fn description(&self) -> &str {
            "Returns a fixed value"
        }

        fn input_schema(&self) -> &Schema {
            &self.schema
        }

        fn output_schema(&self) -> &Schema {
            &self.schema
        }

        async fn execute(&self, _input: Value, _ctx: &ToolContext<'_>) -> PluginResult<ToolOutcome> {
            Ok(ToolOutcome::Completed(self.output.clone()))
        }
    }

    #[derive(Deserialize, JsonSchema)]
    struct Question {
        text: String,
    }

    #[derive(Deserialize, JsonSchema)]
    struct Answer {
        yes: bool,
    }

    #[derive(Serialize, JsonSchema)]
    struct Verdict {
        text: String,
        yes: bool,
    }

    struct Ask;

    impl InteractiveTool for Ask {
        type Input = Question;
        type Resume = Answer;
        type Output = Verdict;

        fn id(&self) -> &str {
            "ask"
        }

        fn description(&self) -> &str {
            "Asks a yes/no question"
        }

        fn complete(&self, request: Question, answer: Answer) -> PluginResult<Verdict> {
            Ok(Verdict {
                text: request.text,
                yes: answer.yes,
            })
        }
    }

    #[tokio::test]
    async fn test_typed_tool_applies_defaults() {
        let registry = HostRegistry::new();
        let ctx = ToolContext::new(&registry);
        let tool = SchemaTool::new(Add);
        let out = invoke(&tool, &json!({"a": 41}), &ctx).await.unwrap();
        assert_eq!(out.completed(), Some(json!({"sum": 42})));
    }

    #[tokio::test]
    async fn test_input_validation_names_field() {
        let registry = HostRegistry::new();
        let ctx = ToolContext::new(&registry);
        let tool = SchemaTool::new(Add);
        let err = invoke(&tool, &json!({"a": "x"}), &ctx).await.unwrap_err();
        let (stage, source) = err.as_validation().unwrap();
        assert_eq!(stage, ValidationStage::Input);
        assert!(source.mentions("a"));
    }

    #[tokio::test]
    async fn test_output_validation_enforced() {
        let registry = HostRegistry::new();
        let ctx = ToolContext::new(&registry);
        let tool = Raw {
            output: json!("not an object"),
            schema: Schema::from_value(json!({"type": "object"})),
        };
        let err = invoke(&tool, &json!({}), &ctx).await.unwrap_err();
        assert_eq!(err.as_validation().unwrap().0, ValidationStage::Output);
    }

    #[tokio::test]
    async fn test_plain_tool_is_not_resumable() {
        let registry = HostRegistry::new();
        let ctx = ToolContext::new(&registry);
        let tool = SchemaTool::new(Add);
        let suspension = Suspension::new("add", json!({}), &Schema::of::<Answer>());
        let err = resume(&tool, &suspension, &json!({}), &ctx).await.unwrap_err();
        assert!(matches!(err, PluginError::NotResumable(id) if id == "add"));
    }

    #[tokio::test]
    async fn test_suspend_then_resume() {
        let registry = HostRegistry::new();
        let ctx = ToolContext::new(&registry);
        let tool = SuspendingTool::new(Ask);

        let outcome = invoke(&tool, &json!({"text": "Proceed?"}), &ctx).await.unwrap();
        let suspension = outcome.suspended().unwrap();
        assert_eq!(suspension.tool_id, "ask");
        assert_eq!(suspension.payload, json!({"text": "Proceed?"}));

        let err = resume(&tool, &suspension, &json!({"yes": "sure"}), &ctx)
            .await
            .unwrap_err();
        let (stage, source) = err.as_validation().unwrap();
        assert_eq!(stage, ValidationStage::Resume);
        assert!(source.mentions("yes"));

        let out = resume(&tool, &suspension, &json!({"yes": true}), &ctx)
            .await
            .unwrap();
        assert_eq!(out, json!({"text": "Proceed?", "yes": true}));
    }

    #[tokio::test]
    async fn test_resume_rejects_foreign_suspension() {
        let registry = HostRegistry::new();
        let ctx = ToolContext::new(&registry);
        let tool = SuspendingTool::new(Ask);
        let foreign = Suspension::new("other", json!({}), &Schema::of::<Answer>());
        assert!(matches!(
            resume(&tool, &foreign, &json!({"yes": true}), &ctx).await,
            Err(PluginError::SuspensionMismatch { .. })
        ));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(ToolOutcome::Completed(json!({"ok": true}))).unwrap();
        assert_eq!(value, json!({"status": "completed", "value": {"ok": true}}));
    }
}
