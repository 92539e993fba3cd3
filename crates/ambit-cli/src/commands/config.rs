//! Config commands - show, validate, and list config paths.

use std::path::Path;

use ambit_config::{ConfigResult, ResolvedConfig, ShowFormat};
use anyhow::{Context, bail};

use crate::theme::Theme;

/// Parse a `--format` value.
pub(crate) fn parse_format(format: &str) -> anyhow::Result<ShowFormat> {
    match format {
        "toml" => Ok(ShowFormat::Toml),
        "json" => Ok(ShowFormat::Json),
        other => bail!("unknown format '{other}' (expected toml or json)"),
    }
}

/// Print the resolved configuration.
pub(crate) fn show_config(
    resolved: &ResolvedConfig,
    format: &str,
    section: Option<&str>,
) -> anyhow::Result<()> {
    let format = parse_format(format)?;
    let output = resolved.show(format, section).with_context(|| match section {
        Some(name) => format!("unknown config section '{name}'"),
        None => "failed to render configuration".to_owned(),
    })?;
    print!("{output}");
    Ok(())
}

/// Report whether the layered configuration loads and validates.
pub(crate) fn validate_config(loaded: &ConfigResult<ResolvedConfig>) -> anyhow::Result<()> {
    match loaded {
        Ok(resolved) => {
            println!("{}", Theme::success("Configuration is valid"));
            for path in &resolved.loaded_files {
                println!("  {}", Theme::dimmed(path));
            }
            Ok(())
        },
        Err(e) => {
            println!("{}", Theme::error("Configuration is invalid"));
            bail!("{e}")
        },
    }
}

/// Print every config file path that loading checks.
pub(crate) fn show_paths(workspace_root: Option<&Path>) {
    let home = directories::BaseDirs::new().map(|d| d.home_dir().display().to_string());
    let workspace = workspace_root.map(|p| p.display().to_string());

    println!("{}", Theme::header("Config paths (lowest to highest precedence)"));
    for path in ResolvedConfig::config_paths(home.as_deref(), workspace.as_deref()) {
        let expanded = path.replace(
            "$AMBIT_HOME",
            &std::env::var("AMBIT_HOME").unwrap_or_else(|_| "$AMBIT_HOME".to_owned()),
        );
        let marker = if Path::new(&expanded).is_file() {
            Theme::success(&expanded)
        } else {
            Theme::dimmed(&format!("  {expanded}"))
        };
        println!("  {marker}");
    }
}
