//! `ambit moderate` - run text through the registered input processors.

use ambit_plugins::{HostRegistry, Message, PluginError, ProcessedInput, Role};
use anyhow::bail;

use crate::theme::Theme;

/// The last user message after processing.
pub(crate) fn user_text(processed: &ProcessedInput) -> Option<&str> {
    processed
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
}

/// Run `text` as a user message through every processor and print the
/// result. A blocked input is reported as an error.
pub(crate) fn moderate(registry: &HostRegistry, text: &str) -> anyhow::Result<()> {
    if registry.processors().is_empty() {
        println!("{}", Theme::info("No processors registered; input passes unchanged"));
    }

    match registry.run_processors(vec![Message::user(text)]) {
        Ok(processed) => {
            for (processor, reason) in &processed.flags {
                println!("{}", Theme::warning(&format!("{processor}: {reason}")));
            }
            let output = user_text(&processed).unwrap_or_default();
            if output == text {
                println!("{}", Theme::success("Input passed"));
            } else {
                println!("{}", Theme::success("Input rewritten"));
            }
            println!("{output}");
            Ok(())
        },
        Err(PluginError::Blocked { processor, reason }) => {
            println!("{}", Theme::error(&format!("Blocked by {processor}")));
            bail!("{reason}")
        },
        Err(e) => Err(e.into()),
    }
}
