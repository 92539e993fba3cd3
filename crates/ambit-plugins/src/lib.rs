//! Plugin manifests, capability traits and the host registry for Ambit.
//!
//! Provides the core abstractions for composing an agent application out of
//! independent plugins:
//!
//! - [`PluginManifest`]: a plugin's identity and declared [`PluginFeatures`]
//! - [`Plugin`]: manifest plus the [`PluginCapabilities`] it carries
//! - [`Tool`], [`Agent`], [`UiComponent`], [`Processor`], [`StorageAdapter`]:
//!   the five capability kinds
//! - [`TypedTool`] / [`SchemaTool`]: tools whose schemas are derived from
//!   Rust types and enforced on every call
//! - [`HostRegistry`]: explicit registry indexing every capability by id
//! - [`discover_manifests`]: filesystem discovery of `plugin.toml` manifests
//!
//! # Feature flags and presence
//!
//! A manifest's `features.X` flag must agree with whether the plugin carries
//! a non-empty X group. [`Plugin::check`] enforces this and the registry
//! runs it on every registration. Callers reach a group through the
//! presence guards ([`PluginCapabilities::tools`] and friends), which return
//! `None` for an absent or empty group.
//!
//! # UI binding
//!
//! Components that render a tool's invocation use part type `tool-{toolId}`.
//! [`HostRegistry::ui_binding_issues`] reports components whose tool is not
//! registered.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod agent;
pub mod capability;
pub mod context;
pub mod discovery;
pub mod error;
pub mod manifest;
pub mod message;
pub mod plugin;
pub mod processor;
pub mod registry;
pub mod storage;
pub mod tool;
pub mod ui;

pub use agent::{Agent, CompletionRequest, InstructedAgent, LanguageModel};
pub use capability::{CapabilityKind, PluginCapabilities};
pub use context::ToolContext;
pub use discovery::{MANIFEST_FILE_NAME, discover_manifests, load_manifest, load_manifests_from_dir};
pub use error::{PluginError, PluginResult, ValidationStage};
pub use manifest::{PluginFeatures, PluginManifest};
pub use message::{Message, Role};
pub use plugin::{Plugin, PluginId, StaticPlugin};
pub use processor::{Processor, ProcessorVerdict};
pub use registry::{HostRegistry, ProcessedInput, ToolDefinition, UiBindingIssue};
pub use storage::{MemoryStorage, StorageAdapter};
pub use tool::{
    InteractiveTool, SchemaTool, Suspension, SuspendingTool, Tool, ToolOutcome, TypedTool,
};
pub use ui::{SchemaUi, TypedUi, UiComponent, bound_tool_id, tool_part_type};

/// Re-exported so plugin crates validate against the same schema types.
pub use ambit_schema::{Schema, ValidationError};
