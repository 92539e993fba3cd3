//! Tool commands - list tools, print their schemas, and call them.

use ambit_plugins::{CapabilityKind, HostRegistry, Suspension, ToolOutcome, tool_part_type};
use anyhow::{Context, anyhow};
use serde_json::Value;
use tracing::debug;

use crate::theme::Theme;

/// Print every registered tool with its owning plugin.
pub(crate) fn list_tools(registry: &HostRegistry) {
    let tools = registry.tools();
    if tools.is_empty() {
        println!("{}", Theme::info("No tools registered"));
        return;
    }

    println!("{}", Theme::header("Registered Tools"));
    println!("  {:<22} {:<22} DESCRIPTION", "ID", "PLUGIN");
    println!("{}", Theme::separator());
    for tool in &tools {
        let owner = registry
            .owner(CapabilityKind::Tools, tool.id())
            .map_or("-", |id| id.as_str());
        let suspends = if tool.resume_schema().is_some() {
            format!(" {}", Theme::dimmed("(asks the user)"))
        } else {
            String::new()
        };
        println!(
            "  {:<22} {:<22} {}{suspends}",
            tool.id(),
            owner,
            tool.description()
        );
    }
    println!("\n{}", Theme::dimmed(&format!("{} tool(s)", tools.len())));
}

/// The input (or output) JSON Schema of tool `id`, pretty-printed.
pub(crate) fn schema_json(registry: &HostRegistry, id: &str, output: bool) -> anyhow::Result<String> {
    let tool = registry
        .tool(id)
        .ok_or_else(|| anyhow!("tool '{id}' is not registered"))?;
    let schema = if output {
        tool.output_schema()
    } else {
        tool.input_schema()
    };
    Ok(serde_json::to_string_pretty(schema.as_value())?)
}

/// Print a tool schema.
pub(crate) fn show_schema(registry: &HostRegistry, id: &str, output: bool) -> anyhow::Result<()> {
    println!("{}", schema_json(registry, id, output)?);
    Ok(())
}

fn parse_json(raw: &str, what: &str) -> anyhow::Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("{what} is not valid JSON"))
}

/// Call tool `id` with `input`, finishing a suspension with `resume` when
/// one is given.
///
/// Returns the tool output, or the suspension when the tool paused and no
/// resume data was supplied.
pub(crate) async fn run_tool(
    registry: &HostRegistry,
    id: &str,
    input: &str,
    resume: Option<&str>,
) -> anyhow::Result<ToolOutcome> {
    let input = parse_json(input, "tool input")?;
    let outcome = registry.call_tool(id, &input).await?;

    match (outcome, resume) {
        (ToolOutcome::Suspended(suspension), Some(raw)) => {
            debug!(tool = id, invocation = %suspension.id, "Resuming suspended tool");
            let data = parse_json(raw, "resume data")?;
            let output = registry.resume_tool(id, &suspension, &data).await?;
            Ok(ToolOutcome::Completed(output))
        },
        (outcome, _) => Ok(outcome),
    }
}

/// Call a tool and print its result.
pub(crate) async fn call_tool(
    registry: &HostRegistry,
    id: &str,
    input: &str,
    resume: Option<&str>,
) -> anyhow::Result<()> {
    match run_tool(registry, id, input, resume).await? {
        ToolOutcome::Completed(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        },
        ToolOutcome::Suspended(suspension) => print_suspension(registry, &suspension)?,
    }
    Ok(())
}

fn print_suspension(registry: &HostRegistry, suspension: &Suspension) -> anyhow::Result<()> {
    println!(
        "{}",
        Theme::warning(&format!("{} is waiting for an answer", suspension.tool_id))
    );

    let part_type = tool_part_type(&suspension.tool_id);
    if registry.ui_component(&part_type).is_some() {
        println!("{}", Theme::separator());
        println!("{}", registry.render(&part_type, &suspension.payload)?);
        println!("{}", Theme::separator());
    }

    println!(
        "{}",
        Theme::kv(
            "Answer schema",
            &serde_json::to_string(&suspension.resume_schema)?
        )
    );
    println!(
        "{}",
        Theme::info("Call again with --resume '<json>' to finish the invocation")
    );
    Ok(())
}
