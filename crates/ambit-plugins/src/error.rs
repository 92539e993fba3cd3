//! Plugin error types.

use std::fmt;
use std::path::PathBuf;

use ambit_schema::ValidationError;

use crate::capability::CapabilityKind;
use crate::plugin::PluginId;

/// Which boundary of a capability invocation a validation failure occurred at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    /// Candidate input, before the executor runs.
    Input,
    /// Executor output, before it is handed to the caller.
    Output,
    /// Data supplied to resume a suspended invocation.
    Resume,
    /// Props handed to a UI component.
    Props,
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
            Self::Resume => f.write_str("resume data"),
            Self::Props => f.write_str("props"),
        }
    }
}

/// Errors from plugin operations.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The requested plugin was not found in the registry.
    #[error("plugin not found: {0}")]
    NotFound(PluginId),

    /// A plugin with this ID is already registered.
    #[error("plugin already registered: {0}")]
    AlreadyRegistered(PluginId),

    /// The plugin ID is invalid.
    #[error("invalid plugin id: {0}")]
    InvalidId(String),

    /// The manifest version is not a semantic version.
    #[error("invalid version '{version}': {message}")]
    InvalidVersion {
        /// The rejected version string.
        version: String,
        /// Parser message.
        message: String,
    },

    /// Failed to parse a plugin manifest file.
    #[error("manifest parse error in {path}: {message}")]
    ManifestParseError {
        /// Path to the manifest file.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// A value crossing a capability boundary did not match its schema.
    #[error("{capability}: invalid {stage}: {source}")]
    Validation {
        /// Identifier of the capability whose schema rejected the value.
        capability: String,
        /// Which boundary the value was crossing.
        stage: ValidationStage,
        /// Field-level details.
        #[source]
        source: ValidationError,
    },

    /// A capability depends on another object that is not registered.
    #[error("missing collaborator: {kind} '{id}' is not registered")]
    MissingCollaborator {
        /// What kind of object was looked up (e.g. `agent`).
        kind: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// No capability with this identifier is registered.
    #[error("{} not found: {id}", noun(.kind))]
    CapabilityNotFound {
        /// Capability kind that was searched.
        kind: CapabilityKind,
        /// The identifier that was looked up.
        id: String,
    },

    /// Two plugins declare the same capability identifier.
    #[error("{} '{id}' from plugin {incoming} conflicts with plugin {existing}", noun(.kind))]
    CapabilityConflict {
        /// Capability kind of the conflicting identifier.
        kind: CapabilityKind,
        /// The shared identifier.
        id: String,
        /// Plugin that already provides it.
        existing: PluginId,
        /// Plugin whose registration was rejected.
        incoming: PluginId,
    },

    /// A manifest feature flag disagrees with the capabilities a plugin carries.
    #[error("plugin {plugin} declares {kind}={declared} but {}", presence(.present))]
    FeatureMismatch {
        /// The inconsistent plugin.
        plugin: PluginId,
        /// The capability group in question.
        kind: CapabilityKind,
        /// The manifest's flag.
        declared: bool,
        /// Whether a non-empty group is actually carried.
        present: bool,
    },

    /// Two capabilities of the same kind inside one plugin share an identifier.
    #[error("plugin {plugin} declares {} '{id}' more than once", noun(.kind))]
    DuplicateCapability {
        /// The inconsistent plugin.
        plugin: PluginId,
        /// Capability kind.
        kind: CapabilityKind,
        /// The repeated identifier.
        id: String,
    },

    /// A processor stopped the input pipeline.
    #[error("input blocked by processor {processor}: {reason}")]
    Blocked {
        /// The processor that blocked.
        processor: String,
        /// Why.
        reason: String,
    },

    /// Processing removed every user message, leaving nothing to generate from.
    #[error("no user message left for agent {agent} after input processing")]
    EmptyPrompt {
        /// The agent that would have been called.
        agent: String,
    },

    /// The tool never suspends, so it cannot be resumed.
    #[error("tool {0} does not support resumption")]
    NotResumable(String),

    /// A suspension was handed to a different tool than the one that created it.
    #[error("suspension belongs to tool {expected}, not {actual}")]
    SuspensionMismatch {
        /// Tool recorded in the suspension.
        expected: String,
        /// Tool it was handed to.
        actual: String,
    },

    /// Capability execution failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    /// Wrap a validation failure for `capability` at `stage`.
    #[must_use]
    pub fn validation(
        capability: impl Into<String>,
        stage: ValidationStage,
        source: ValidationError,
    ) -> Self {
        Self::Validation {
            capability: capability.into(),
            stage,
            source,
        }
    }

    /// A missing-collaborator failure for `kind` / `id`.
    #[must_use]
    pub fn missing(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::MissingCollaborator {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// The underlying validation failure, if this is one.
    #[must_use]
    pub fn as_validation(&self) -> Option<(ValidationStage, &ValidationError)> {
        match self {
            Self::Validation { stage, source, .. } => Some((*stage, source)),
            _ => None,
        }
    }
}

fn noun(kind: &CapabilityKind) -> &'static str {
    kind.noun()
}

fn presence(present: &bool) -> &'static str {
    if *present {
        "provides them"
    } else {
        "provides none"
    }
}

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;
