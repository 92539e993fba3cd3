//! Storage adapter capability.
//!
//! The [`StorageAdapter`] trait provides JSON-valued `get`/`put`/`delete`
//! operations keyed by string. Adapters are the only capabilities that hold
//! mutable state, always behind interior mutability so a shared `Arc` can be
//! used from concurrent tool invocations.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::error::{PluginError, PluginResult};

/// A named key-value store contributed by a plugin.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Adapter identifier (unique per host registry).
    fn id(&self) -> &str;

    /// Get a value by key.
    async fn get(&self, key: &str) -> PluginResult<Option<Value>>;

    /// Insert or replace a value.
    async fn put(&self, key: &str, value: Value) -> PluginResult<()>;

    /// Delete a key. Returns `true` if the key existed.
    async fn delete(&self, key: &str) -> PluginResult<bool>;

    /// All keys, sorted.
    async fn list(&self) -> PluginResult<Vec<String>>;
}

impl std::fmt::Debug for dyn StorageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageAdapter")
            .field("id", &self.id())
            .finish_non_exhaustive()
    }
}

fn validate_key(key: &str) -> PluginResult<()> {
    if key.is_empty() {
        return Err(PluginError::Storage("key must not be empty".into()));
    }
    if key.contains('\0') {
        return Err(PluginError::Storage("key must not contain null bytes".into()));
    }
    Ok(())
}

/// In-memory storage adapter for tests and ephemeral data.
#[derive(Debug)]
pub struct MemoryStorage {
    id: String,
    entries: DashMap<String, Value>,
}

impl MemoryStorage {
    /// Create an empty adapter named `id`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: DashMap::new(),
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the adapter holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    fn id(&self) -> &str {
        &self.id
    }

    async fn get(&self, key: &str) -> PluginResult<Option<Value>> {
        validate_key(key)?;
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn put(&self, key: &str, value: Value) -> PluginResult<()> {
        validate_key(key)?;
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> PluginResult<bool> {
        validate_key(key)?;
        Ok(self.entries.remove(key).is_some())
    }

    async fn list(&self) -> PluginResult<Vec<String>> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}
