//! Mock capabilities and plugins for testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use ambit_plugins::{
    CapabilityKind, Message, Plugin, PluginCapabilities, PluginFeatures, PluginId,
    PluginManifest, PluginResult, Processor, ProcessorVerdict, SchemaTool, StaticPlugin,
    ToolContext, TypedTool,
};

/// Input of [`EchoTool`].
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EchoInput {
    /// Text to echo.
    pub text: String,
    /// How many times to repeat it.
    #[serde(default = "default_times")]
    #[schemars(range(min = 1, max = 5))]
    pub times: u32,
}

fn default_times() -> u32 {
    1
}

/// Output of [`EchoTool`].
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct EchoOutput {
    /// The repeated text.
    pub echoed: String,
}

/// A typed tool that repeats its input. Wrap in [`SchemaTool`] to register.
#[derive(Debug, Clone)]
pub struct EchoTool {
    id: String,
}

impl EchoTool {
    /// An echo tool registered under `id`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The tool wrapped and ready to register.
    #[must_use]
    pub fn shared(id: impl Into<String>) -> Arc<SchemaTool<Self>> {
        Arc::new(SchemaTool::new(Self::new(id)))
    }
}

#[async_trait]
impl TypedTool for EchoTool {
    type Input = EchoInput;
    type Output = EchoOutput;

    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        "Repeats the given text"
    }

    async fn run(&self, input: EchoInput, _ctx: &ToolContext<'_>) -> PluginResult<EchoOutput> {
        let count = usize::try_from(input.times).unwrap_or(1);
        Ok(EchoOutput {
            echoed: vec![input.text; count].join(" "),
        })
    }
}

/// A processor returning a fixed verdict and recording what it saw.
#[derive(Debug)]
pub struct MockProcessor {
    id: String,
    verdict: ProcessorVerdict,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl MockProcessor {
    /// A processor that always answers `verdict`.
    #[must_use]
    pub fn new(id: impl Into<String>, verdict: ProcessorVerdict) -> Self {
        Self {
            id: id.into(),
            verdict,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// How many times the processor ran.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.seen.lock().expect("lock poisoned").len()
    }

    /// The messages passed on each run.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn seen(&self) -> Vec<Vec<Message>> {
        self.seen.lock().expect("lock poisoned").clone()
    }
}

impl Processor for MockProcessor {
    fn id(&self) -> &str {
        &self.id
    }

    fn process_input(&self, messages: &[Message]) -> PluginResult<ProcessorVerdict> {
        self.seen
            .lock()
            .expect("lock poisoned")
            .push(messages.to_vec());
        Ok(self.verdict.clone())
    }
}

/// Builder for plugins used in tests.
///
/// Unlike [`StaticPlugin`], the manifest's feature flags are derived from the
/// capabilities added unless overridden with [`features`](Self::features),
/// so both consistent and deliberately inconsistent plugins are one line.
#[derive(Debug, Clone)]
pub struct MockPlugin {
    id: PluginId,
    version: String,
    features: Option<PluginFeatures>,
    inner: StaticPlugin,
}

impl MockPlugin {
    /// An empty plugin named `id`, version `0.1.0`.
    #[must_use]
    pub fn new(id: &str) -> Self {
        let id = PluginId::from_static(id);
        let manifest = PluginManifest::new(id.clone(), id.as_str(), "0.1.0");
        Self {
            id,
            version: "0.1.0".into(),
            features: None,
            inner: StaticPlugin::new(manifest),
        }
    }

    /// Override the declared feature flags.
    #[must_use]
    pub fn features(mut self, kinds: &[CapabilityKind]) -> Self {
        self.features = Some(PluginFeatures::from_kinds(kinds));
        self
    }

    /// Override the manifest version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add an [`EchoTool`] named `tool_id`.
    #[must_use]
    pub fn echo_tool(mut self, tool_id: &str) -> Self {
        self.inner = self.inner.with_tool(EchoTool::shared(tool_id));
        self
    }

    /// Add a [`MockProcessor`].
    #[must_use]
    pub fn processor(mut self, processor: Arc<MockProcessor>) -> Self {
        self.inner = self.inner.with_processor(processor);
        self
    }

    /// Add a memory storage adapter named `adapter_id`.
    #[must_use]
    pub fn storage(mut self, adapter_id: &str) -> Self {
        self.inner = self
            .inner
            .with_storage(Arc::new(ambit_plugins::MemoryStorage::new(adapter_id)));
        self
    }

    /// Access the underlying plugin to add arbitrary capabilities.
    #[must_use]
    pub fn with(mut self, f: impl FnOnce(StaticPlugin) -> StaticPlugin) -> Self {
        self.inner = f(self.inner);
        self
    }

    /// Finish the plugin.
    #[must_use]
    pub fn build(self) -> StaticPlugin {
        let capabilities: &PluginCapabilities = self.inner.capabilities();
        let features = self
            .features
            .unwrap_or_else(|| PluginFeatures::from_kinds(&capabilities.kinds()));
        let manifest = PluginManifest::new(self.id.clone(), self.id.as_str(), self.version)
            .with_features(features);
        rebuild(manifest, capabilities)
    }

    /// Finish the plugin, boxed for registration.
    #[must_use]
    pub fn boxed(self) -> Box<dyn Plugin> {
        Box::new(self.build())
    }
}

fn rebuild(manifest: PluginManifest, capabilities: &PluginCapabilities) -> StaticPlugin {
    let mut plugin = StaticPlugin::new(manifest);
    for t in capabilities.tools().unwrap_or_default() {
        plugin = plugin.with_tool(Arc::clone(t));
    }
    for a in capabilities.agents().unwrap_or_default() {
        plugin = plugin.with_agent(Arc::clone(a));
    }
    for u in capabilities.ui().unwrap_or_default() {
        plugin = plugin.with_ui(Arc::clone(u));
    }
    for p in capabilities.processors().unwrap_or_default() {
        plugin = plugin.with_processor(Arc::clone(p));
    }
    for s in capabilities.storage().unwrap_or_default() {
        plugin = plugin.with_storage(Arc::clone(s));
    }
    plugin
}
