//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge the user config (`~/.ambit/config.toml`, or
//!    `$AMBIT_HOME/config.toml` when the former is absent)
//! 3. Merge `{workspace}/.ambit/config.toml`
//! 4. Apply env var fallbacks for fields no file set
//! 5. Resolve `${VAR}` references
//! 6. Deserialize the merged tree → `Config`
//! 7. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::env::{apply_env_fallbacks, collect_env_vars, resolve_env_references};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
pub(crate) const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Directory name holding Ambit configuration, under home or a workspace.
pub const CONFIG_DIR_NAME: &str = ".ambit";
/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Load the configuration with layered file precedence, reading the process
/// environment.
///
/// `workspace_root` is the root of the current project. If `None`, the
/// workspace layer is skipped. `home_override` replaces the `.ambit`
/// directory used for the user layer.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, or if the
/// final merged configuration fails validation.
pub fn load(workspace_root: Option<&Path>, home_override: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    load_with_env(workspace_root, home_override, &collect_env_vars())
}

/// Like [`load`], with an explicit environment.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env<S: ::std::hash::BuildHasher>(
    workspace_root: Option<&Path>,
    home_override: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    // 1. Embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_leaves(&merged, "", ConfigLayer::Defaults, &mut field_sources);

    // 2. User config.
    let user_path = user_config_path(home_override, env_vars)?;
    if let Some(overlay) = try_load_file(&user_path)? {
        deep_merge_tracking(&mut merged, &overlay, "", ConfigLayer::User, &mut field_sources);
        info!(path = %user_path.display(), "loaded user config");
        loaded_files.push(user_path.display().to_string());
    }

    // 3. Workspace config.
    if let Some(root) = workspace_root {
        let path = workspace_config_path(root);
        if let Some(overlay) = try_load_file(&path)? {
            deep_merge_tracking(
                &mut merged,
                &overlay,
                "",
                ConfigLayer::Workspace,
                &mut field_sources,
            );
            info!(path = %path.display(), "loaded workspace config");
            loaded_files.push(path.display().to_string());
        }
    }

    // 4. Env var fallbacks.
    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 5-6. Resolve ${VAR} references, then deserialize.
    resolve_env_references(&mut merged, env_vars);
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 7. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a single file (no layering).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
        path: path.display().to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    })?;
    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// The workspace config file under `root`.
#[must_use]
pub fn workspace_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// The user config file that [`load`] reads.
///
/// With `home_override`, that directory is treated as the `.ambit` directory
/// itself. Otherwise `~/.ambit/config.toml` is used when it exists, falling
/// back to `$AMBIT_HOME/config.toml`.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDir`] if no home directory can be determined
/// and no override is given.
pub fn user_config_path<S: ::std::hash::BuildHasher>(
    home_override: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<PathBuf> {
    if let Some(dir) = home_override {
        return Ok(dir.join(CONFIG_FILE_NAME));
    }

    let default_path = home_directory()?
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME);
    if default_path.is_file() {
        return Ok(default_path);
    }

    if let Some(ambit_home) = env_vars.get("AMBIT_HOME") {
        let dir = PathBuf::from(ambit_home);
        if dir.is_dir() {
            return Ok(dir.join(CONFIG_FILE_NAME));
        }
        warn!(path = %ambit_home, "AMBIT_HOME is not a directory; ignoring");
    }

    Ok(default_path)
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

/// Determine the user's home directory.
fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}
