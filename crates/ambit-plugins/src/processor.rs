//! Input processor capability.
//!
//! Processors inspect the conversation before it reaches an agent. The host
//! runs every registered processor in registration order; see
//! [`HostRegistry::run_processors`](crate::registry::HostRegistry::run_processors).

use serde::{Deserialize, Serialize};

use crate::error::PluginResult;
use crate::message::Message;

/// What a processor decided about the input it saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "camelCase")]
pub enum ProcessorVerdict {
    /// Leave the input unchanged.
    Pass,
    /// Leave the input unchanged but record a warning.
    Flag {
        /// Why the input was flagged.
        reason: String,
    },
    /// Replace the input with the given messages.
    Rewrite {
        /// The replacement conversation.
        messages: Vec<Message>,
    },
    /// Stop the pipeline. No later processor runs.
    Block {
        /// Why the input was blocked.
        reason: String,
    },
}

/// A processor contributed by a plugin.
pub trait Processor: Send + Sync {
    /// Processor identifier (unique per host registry).
    fn id(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str {
        ""
    }

    /// Inspect `messages` and decide what happens to them.
    ///
    /// # Errors
    ///
    /// Returns an error if the processor itself fails. A rejection of the
    /// input is a [`ProcessorVerdict::Block`], not an error.
    fn process_input(&self, messages: &[Message]) -> PluginResult<ProcessorVerdict>;
}

impl std::fmt::Debug for dyn Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("id", &self.id())
            .finish_non_exhaustive()
    }
}
