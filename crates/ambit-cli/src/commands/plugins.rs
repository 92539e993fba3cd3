//! Plugin commands - list registered plugins and check manifest directories.

use std::path::{Path, PathBuf};

use ambit_plugins::{HostRegistry, MANIFEST_FILE_NAME, Plugin, PluginManifest, load_manifest};
use anyhow::{Context, bail};

use crate::theme::{Theme, feature_list};

/// Outcome of checking one `plugin.toml`.
#[derive(Debug)]
pub(crate) struct ManifestCheck {
    /// The manifest file.
    pub(crate) path: PathBuf,
    /// The parsed manifest, or why it was rejected.
    pub(crate) result: Result<PluginManifest, String>,
    /// How the manifest disagrees with the registered plugin of the same id.
    pub(crate) drift: Option<String>,
}

impl ManifestCheck {
    fn is_ok(&self) -> bool {
        self.result.is_ok() && self.drift.is_none()
    }
}

/// Print every registered plugin.
pub(crate) fn list_plugins(registry: &HostRegistry) {
    let mut plugins: Vec<&dyn Plugin> = registry.plugins();
    if plugins.is_empty() {
        println!("{}", Theme::info("No plugins enabled"));
        return;
    }
    plugins.sort_by(|a, b| a.id().cmp(b.id()));

    println!("{}", Theme::header("Registered Plugins"));
    println!("  {:<22} {:<10} {:<28} NAME", "ID", "VERSION", "FEATURES");
    println!("{}", Theme::separator());
    for plugin in &plugins {
        let manifest = plugin.manifest();
        println!(
            "  {:<22} {:<10} {:<28} {}",
            manifest.id.as_str(),
            manifest.version,
            feature_list(&manifest.features),
            manifest.name
        );
    }
    println!(
        "\n{}",
        Theme::dimmed(&format!("{} plugin(s)", plugins.len()))
    );

    for issue in registry.ui_binding_issues() {
        println!(
            "{}",
            Theme::warning(&format!(
                "{} renders '{}' but tool '{}' is not registered",
                issue.plugin, issue.part_type, issue.tool_id
            ))
        );
    }
}

/// Every `plugin.toml` directly in `dir` or in one of its subdirectories,
/// sorted by path.
pub(crate) fn manifest_paths(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let direct = dir.join(MANIFEST_FILE_NAME);
    if direct.is_file() {
        paths.push(direct);
    }
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read {}", dir.display()))?
            .path();
        let candidate = path.join(MANIFEST_FILE_NAME);
        if path.is_dir() && candidate.is_file() {
            paths.push(candidate);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load every manifest under `dir` and compare it with `registry`.
pub(crate) fn check_dir(dir: &Path, registry: &HostRegistry) -> anyhow::Result<Vec<ManifestCheck>> {
    let checks = manifest_paths(dir)?
        .into_iter()
        .map(|path| match load_manifest(&path) {
            Ok(manifest) => {
                let drift = registry
                    .get(&manifest.id)
                    .and_then(|plugin| feature_drift(&manifest, plugin.manifest()));
                ManifestCheck {
                    path,
                    result: Ok(manifest),
                    drift,
                }
            },
            Err(e) => ManifestCheck {
                path,
                result: Err(e.to_string()),
                drift: None,
            },
        })
        .collect();
    Ok(checks)
}

fn feature_drift(file: &PluginManifest, registered: &PluginManifest) -> Option<String> {
    (file.features != registered.features).then(|| {
        format!(
            "declares [{}] but the registered plugin declares [{}]",
            feature_list(&file.features),
            feature_list(&registered.features)
        )
    })
}

/// Check the manifests in `dirs` (or the configured plugin directories).
pub(crate) fn check_manifests(dirs: &[PathBuf], registry: &HostRegistry) -> anyhow::Result<()> {
    if dirs.is_empty() {
        println!(
            "{}",
            Theme::info("No plugin directories given or configured in [plugins] dirs")
        );
        return Ok(());
    }

    let mut total = 0usize;
    let mut problems = 0usize;
    for dir in dirs {
        println!("{}", Theme::header(&dir.display().to_string()));
        let checks = match check_dir(dir, registry) {
            Ok(checks) => checks,
            Err(e) => {
                println!("  {}", Theme::error(&format!("{e:#}")));
                problems = problems.saturating_add(1);
                continue;
            },
        };
        if checks.is_empty() {
            println!("  {}", Theme::dimmed("no manifests found"));
        }
        for check in &checks {
            total = total.saturating_add(1);
            if !check.is_ok() {
                problems = problems.saturating_add(1);
            }
            print_check(check);
        }
    }

    println!(
        "\n{}",
        Theme::dimmed(&format!("{total} manifest(s) checked, {problems} problem(s)"))
    );
    if problems > 0 {
        bail!("{problems} manifest problem(s) found");
    }
    Ok(())
}

fn print_check(check: &ManifestCheck) {
    match &check.result {
        Ok(manifest) => {
            let line = format!(
                "{} {} [{}]",
                manifest.id,
                manifest.version,
                feature_list(&manifest.features)
            );
            println!("  {}", Theme::success(&line));
            if let Some(drift) = &check.drift {
                println!("    {}", Theme::warning(drift));
            }
        },
        Err(message) => {
            println!("  {}", Theme::error(&check.path.display().to_string()));
            println!("    {}", Theme::dimmed(message));
        },
    }
}
