//! Human-in-the-loop tools: suspend, render the pending question, resume.

mod common;

use ambit_plugins::{PluginError, Schema, Suspension, ValidationStage, tool_part_type};
use serde_json::json;

#[tokio::test]
async fn confirmation_suspends_renders_and_resumes() {
    let registry = common::default_registry();
    let suspension = registry
        .call_tool(
            "askForConfirmation",
            &json!({"title": "Delete?", "message": "This cannot be undone", "variant": "danger"}),
        )
        .await
        .unwrap()
        .suspended()
        .unwrap();
    assert_eq!(suspension.tool_id, "askForConfirmation");

    let rendered = registry
        .render(&tool_part_type(&suspension.tool_id), &suspension.payload)
        .unwrap();
    assert_eq!(
        rendered,
        "[!] Delete?\nThis cannot be undone\n[Confirm] [Cancel]"
    );

    let out = registry
        .resume_tool("askForConfirmation", &suspension, &json!({"confirmed": false}))
        .await
        .unwrap();
    assert_eq!(out["confirmed"], false);
}

#[tokio::test]
async fn suspension_survives_serialization() {
    let registry = common::default_registry();
    let suspension = registry
        .call_tool("askForText", &json!({"question": "Name?", "placeholder": "Ada"}))
        .await
        .unwrap()
        .suspended()
        .unwrap();

    let wire = serde_json::to_string(&suspension).unwrap();
    let restored: Suspension = serde_json::from_str(&wire).unwrap();
    assert_eq!(restored, suspension);

    let out = registry
        .resume_tool("askForText", &restored, &json!({"answer": "Grace"}))
        .await
        .unwrap();
    assert_eq!(out["answer"], "Grace");
}

#[tokio::test]
async fn invalid_resume_data_names_the_field() {
    let registry = common::default_registry();
    let suspension = registry
        .call_tool("askForConfirmation", &json!({"title": "t", "message": "m"}))
        .await
        .unwrap()
        .suspended()
        .unwrap();

    let err = registry
        .resume_tool("askForConfirmation", &suspension, &json!({"confirmed": "yes"}))
        .await
        .unwrap_err();
    let (stage, source) = err.as_validation().unwrap();
    assert_eq!(stage, ValidationStage::Resume);
    assert!(source.mentions("confirmed"));
}

#[tokio::test]
async fn suspension_cannot_be_handed_to_another_tool() {
    let registry = common::default_registry();
    let suspension = registry
        .call_tool("askForConfirmation", &json!({"title": "t", "message": "m"}))
        .await
        .unwrap()
        .suspended()
        .unwrap();

    let err = registry
        .resume_tool("askForText", &suspension, &json!({"answer": "x"}))
        .await
        .unwrap_err();
    assert!(matches!(err, PluginError::SuspensionMismatch { .. }));
}

#[tokio::test]
async fn plain_tools_complete_and_cannot_resume() {
    let registry = common::default_registry();
    let outcome = registry
        .call_tool("getWeather", &json!({"location": "Lisbon"}))
        .await
        .unwrap();
    assert!(outcome.clone().suspended().is_none());
    assert_eq!(outcome.completed().unwrap()["forecast"].as_array().unwrap().len(), 7);

    let fake = Suspension::new("getWeather", json!({}), &Schema::from_value(json!({})));
    let err = registry
        .resume_tool("getWeather", &fake, &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, PluginError::NotResumable(ref id) if id == "getWeather"));
}

#[test]
fn choice_prompt_rejects_props_without_options() {
    let registry = common::default_registry();
    let err = registry
        .render("tool-askForChoice", &json!({"question": "Pick"}))
        .unwrap_err();
    let (stage, source) = err.as_validation().unwrap();
    assert_eq!(stage, ValidationStage::Props);
    assert!(source.mentions("options"));
}
