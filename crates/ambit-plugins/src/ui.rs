//! UI component capability.
//!
//! A UI component renders one kind of message part. Components that render
//! a tool's invocation use the part type `tool-{toolId}`, so the tool
//! identifier doubles as the UI discriminator; [`bound_tool_id`] recovers it.

use ambit_schema::Schema;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{PluginError, PluginResult, ValidationStage};

/// Part-type prefix for components bound to a tool.
pub const TOOL_PART_PREFIX: &str = "tool-";

/// The part type a component rendering `tool_id` must use.
#[must_use]
pub fn tool_part_type(tool_id: &str) -> String {
    format!("{TOOL_PART_PREFIX}{tool_id}")
}

/// The tool a part type is bound to, if it follows the `tool-{id}` form.
#[must_use]
pub fn bound_tool_id(part_type: &str) -> Option<&str> {
    part_type
        .strip_prefix(TOOL_PART_PREFIX)
        .filter(|id| !id.is_empty())
}

/// A UI component contributed by a plugin.
pub trait UiComponent: Send + Sync {
    /// The message part type this component renders.
    fn part_type(&self) -> &str;

    /// Schema the props must satisfy.
    fn props_schema(&self) -> &Schema;

    /// Render `props` as plain text.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Validation`] at the props stage when `props`
    /// do not match [`props_schema`](UiComponent::props_schema).
    fn render_text(&self, props: &Value) -> PluginResult<String>;
}

impl std::fmt::Debug for dyn UiComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiComponent")
            .field("part_type", &self.part_type())
            .finish_non_exhaustive()
    }
}

/// A UI component written against a concrete props type.
pub trait TypedUi: Send + Sync + 'static {
    /// Props type. Its `JsonSchema` is the props schema.
    type Props: DeserializeOwned + JsonSchema;

    /// The message part type this component renders.
    fn part_type(&self) -> &str;

    /// Render validated props.
    fn render(&self, props: Self::Props) -> String;
}

/// Adapter exposing a [`TypedUi`] as a [`UiComponent`].
pub struct SchemaUi<T> {
    inner: T,
    props: Schema,
}

impl<T: TypedUi> SchemaUi<T> {
    /// Wrap `inner`, deriving the props schema from its associated type.
    #[must_use]
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            props: Schema::of::<T::Props>(),
        }
    }
}

impl<T: TypedUi> UiComponent for SchemaUi<T> {
    fn part_type(&self) -> &str {
        self.inner.part_type()
    }

    fn props_schema(&self) -> &Schema {
        &self.props
    }

    fn render_text(&self, props: &Value) -> PluginResult<String> {
        let typed = self
            .props
            .parse::<T::Props>(props)
            .map_err(|e| PluginError::validation(self.part_type(), ValidationStage::Props, e))?;
        Ok(self.inner.render(typed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, JsonSchema)]
    struct BadgeProps {
        label: String,
    }

    struct Badge;

    impl TypedUi for Badge {
        type Props = BadgeProps;

        fn part_type(&self) -> &str {
            "tool-badge"
        }

        fn render(&self, props: BadgeProps) -> String {
            format!("[{}]", props.label)
        }
    }

    #[test]
    fn test_bound_tool_id() {
        assert_eq!(bound_tool_id("tool-askForText"), Some("askForText"));
        assert_eq!(bound_tool_id("tool-"), None);
        assert_eq!(bound_tool_id("chart"), None);
        assert_eq!(tool_part_type("getWeather"), "tool-getWeather");
    }

    #[test]
    fn test_render_validates_props() {
        let ui = SchemaUi::new(Badge);
        assert_eq!(ui.render_text(&json!({"label": "new"})).unwrap(), "[new]");

        let err = ui.render_text(&json!({"label": 3})).unwrap_err();
        let (stage, source) = err.as_validation().unwrap();
        assert_eq!(stage, ValidationStage::Props);
        assert!(source.mentions("label"));
    }
}
