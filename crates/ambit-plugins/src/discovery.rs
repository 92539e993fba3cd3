//! Plugin manifest discovery.
//!
//! Scans directories for `plugin.toml` files. Discovery only reads
//! manifests; the capabilities themselves are compiled into the host and
//! matched to manifests by plugin ID.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{PluginError, PluginResult};
use crate::manifest::PluginManifest;

/// Standard plugin manifest file name.
pub const MANIFEST_FILE_NAME: &str = "plugin.toml";

/// Discover plugin manifests in `dirs`.
///
/// Each directory is scanned with [`load_manifests_from_dir`]. Directories
/// that do not exist are skipped. When two manifests share an ID, the one
/// found first wins and the other is logged and dropped.
///
/// Returns `(manifest, plugin_dir)` pairs sorted by plugin ID.
pub fn discover_manifests(dirs: &[PathBuf]) -> Vec<(PluginManifest, PathBuf)> {
    let mut manifests = Vec::new();
    let mut seen = HashSet::new();

    for dir in dirs {
        if !dir.exists() {
            debug!(path = %dir.display(), "Plugin directory does not exist");
            continue;
        }
        info!(path = %dir.display(), "Discovering plugins");
        match load_manifests_from_dir(dir) {
            Ok(found) => {
                for (manifest, plugin_dir) in found {
                    if seen.insert(manifest.id.clone()) {
                        manifests.push((manifest, plugin_dir));
                    } else {
                        warn!(
                            plugin_id = %manifest.id,
                            path = %plugin_dir.display(),
                            "Duplicate plugin manifest ignored"
                        );
                    }
                }
            },
            Err(e) => warn!(path = %dir.display(), error = %e, "Failed to read plugin directory"),
        }
    }

    manifests.sort_by(|(a, _), (b, _)| a.id.cmp(&b.id));
    info!(count = manifests.len(), "Discovered plugin manifests");
    manifests
}

/// Load all plugin manifests from a directory.
///
/// Looks for `plugin.toml` in each immediate subdirectory, and directly in
/// `dir`. Malformed manifests are logged and skipped.
///
/// Returns `(manifest, plugin_dir)` pairs sorted by plugin directory, so a
/// manifest directly in `dir` comes first.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn load_manifests_from_dir(dir: &Path) -> PluginResult<Vec<(PluginManifest, PathBuf)>> {
    let mut manifests = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        let (manifest_path, plugin_dir) = if path.is_dir() {
            (path.join(MANIFEST_FILE_NAME), path)
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n == MANIFEST_FILE_NAME)
        {
            (path, dir.to_path_buf())
        } else {
            continue;
        };
        if !manifest_path.is_file() {
            continue;
        }

        match load_manifest(&manifest_path) {
            Ok(manifest) => {
                debug!(
                    path = %manifest_path.display(),
                    plugin_id = %manifest.id,
                    "Loaded plugin manifest"
                );
                manifests.push((manifest, plugin_dir));
            },
            Err(e) => {
                warn!(
                    path = %manifest_path.display(),
                    error = %e,
                    "Failed to load plugin manifest"
                );
            },
        }
    }

    manifests.sort_by(|(_, a), (_, b)| a.cmp(b));
    Ok(manifests)
}

/// Load and validate a single plugin manifest from a TOML file.
///
/// # Errors
///
/// Returns [`PluginError::ManifestParseError`] if the file cannot be read or
/// parsed, or a validation error from [`PluginManifest::validate`].
pub fn load_manifest(path: &Path) -> PluginResult<PluginManifest> {
    let content = std::fs::read_to_string(path).map_err(|e| PluginError::ManifestParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let manifest: PluginManifest =
        toml::from_str(&content).map_err(|e| PluginError::ManifestParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    manifest.validate()?;

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityKind;
    use tempfile::TempDir;

    fn manifest_toml(id: &str) -> String {
        format!(
            r#"
id = "{id}"
name = "Plugin {id}"
version = "0.1.0"

[features]
tools = true
ui = true
"#
        )
    }

    fn write_plugin(root: &Path, dir: &str, content: &str) {
        let plugin_dir = root.join(dir);
        std::fs::create_dir_all(&plugin_dir).unwrap();
        std::fs::write(plugin_dir.join(MANIFEST_FILE_NAME), content).unwrap();
    }

    #[test]
    fn test_load_manifest_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);
        std::fs::write(&path, manifest_toml("ask-user")).unwrap();

        let manifest = load_manifest(&path).unwrap();
        assert_eq!(manifest.id.as_str(), "ask-user");
        assert_eq!(
            manifest.features.declared(),
            vec![CapabilityKind::Tools, CapabilityKind::Ui]
        );
    }

    #[test]
    fn test_load_manifest_rejects_bad_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);
        std::fs::write(&path, "id = \"x\"\nname = \"X\"\nversion = \"latest\"\n").unwrap();
        assert!(matches!(
            load_manifest(&path),
            Err(PluginError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_load_manifest_missing_file() {
        assert!(matches!(
            load_manifest(Path::new("/nonexistent/plugin.toml")),
            Err(PluginError::ManifestParseError { .. })
        ));
    }

    #[test]
    fn test_load_manifests_skips_invalid() {
        let dir = TempDir::new().unwrap();
        write_plugin(dir.path(), "valid", &manifest_toml("valid"));
        write_plugin(dir.path(), "broken", "not valid toml {{{{");
        std::fs::create_dir(dir.path().join("empty")).unwrap();

        let results = load_manifests_from_dir(dir.path()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0.id.as_str(), "valid");
        assert_eq!(results[0].1, dir.path().join("valid"));
    }

    #[test]
    fn test_discover_sorts_and_dedups() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_plugin(first.path(), "zeta", &manifest_toml("zeta"));
        write_plugin(first.path(), "alpha", &manifest_toml("alpha"));
        write_plugin(second.path(), "alpha-copy", &manifest_toml("alpha"));

        let found = discover_manifests(&[
            first.path().to_path_buf(),
            second.path().to_path_buf(),
            first.path().join("missing"),
        ]);
        let ids: Vec<&str> = found.iter().map(|(m, _)| m.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
        assert_eq!(found[0].1, first.path().join("alpha"));
    }

    #[test]
    fn test_duplicates_in_one_dir_resolve_by_path() {
        let dir = TempDir::new().unwrap();
        for name in ["weather-c", "weather-a", "weather-b"] {
            write_plugin(dir.path(), name, &manifest_toml("weather"));
        }

        let listed = load_manifests_from_dir(dir.path()).unwrap();
        let dirs: Vec<PathBuf> = listed.into_iter().map(|(_, d)| d).collect();
        assert_eq!(
            dirs,
            vec![
                dir.path().join("weather-a"),
                dir.path().join("weather-b"),
                dir.path().join("weather-c"),
            ]
        );

        let found = discover_manifests(&[dir.path().to_path_buf()]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, dir.path().join("weather-a"));
    }
}
