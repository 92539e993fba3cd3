//! Test harness helpers.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use ambit_plugins::MANIFEST_FILE_NAME;

/// Create a temporary directory for testing.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
#[must_use]
pub fn test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Create a file within a temporary directory, creating parents as needed.
///
/// Returns the path to the created file.
///
/// # Panics
///
/// Panics if the file cannot be created or written.
#[must_use]
pub fn test_file_in_dir(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    std::fs::write(&path, content).expect("Failed to write file");
    path
}

/// Set up test logging with the given filter.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// A temporary plugins directory for discovery tests.
#[derive(Debug)]
pub struct PluginDir {
    /// Backing temporary directory.
    pub dir: TempDir,
}

impl PluginDir {
    /// Create an empty plugins directory.
    #[must_use]
    pub fn new() -> Self {
        Self { dir: test_dir() }
    }

    /// Path of the plugins directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `{name}/plugin.toml` with `content`.
    #[must_use]
    pub fn add_manifest(&self, name: &str, content: &str) -> PathBuf {
        test_file_in_dir(
            self.dir.path(),
            &format!("{name}/{MANIFEST_FILE_NAME}"),
            content,
        )
    }
}

impl Default for PluginDir {
    fn default() -> Self {
        Self::new()
    }
}
