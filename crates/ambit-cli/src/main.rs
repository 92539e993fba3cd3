//! Ambit CLI - inspect and exercise the plugins composed into an Ambit host.
//!
//! The CLI builds a host registry from the bundled plugins, filtered and
//! configured by the layered `ambit-config` configuration, and exposes the
//! registry through a handful of subcommands.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::{Path, PathBuf};

use ambit_config::{ConfigResult, ResolvedConfig};
use ambit_plugins::HostRegistry;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;
mod theme;

use commands::{config, moderate, plugins, tools};

/// Ambit - plugin host for agent applications
#[derive(Parser)]
#[command(name = "ambit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true, env = "AMBIT_WORKSPACE")]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect plugins and plugin manifests
    Plugins {
        #[command(subcommand)]
        command: PluginCommands,
    },

    /// Inspect and call tools
    Tools {
        #[command(subcommand)]
        command: ToolCommands,
    },

    /// Run text through the registered input processors
    Moderate {
        /// Text to screen
        text: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum PluginCommands {
    /// List registered plugins
    List,
    /// Validate the plugin manifests found in directories
    Check {
        /// Directories to scan (defaults to `[plugins] dirs`)
        dirs: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ToolCommands {
    /// List registered tools
    List,
    /// Print a tool's JSON Schema
    Schema {
        /// Tool ID
        id: String,
        /// Print the output schema instead of the input schema
        #[arg(long)]
        output: bool,
    },
    /// Call a tool with JSON input
    Call {
        /// Tool ID
        id: String,
        /// Tool input as JSON
        #[arg(default_value = "{}")]
        input: String,
        /// Answer for a tool that asks the user, as JSON
        #[arg(long)]
        resume: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration with source annotations
    Show {
        /// Output format (toml or json)
        #[arg(short, long, default_value = "toml")]
        format: String,
        /// Show only a specific section (e.g. weather, moderation)
        section: Option<String>,
    },
    /// Validate the current configuration
    Validate,
    /// Show config file paths being checked
    Paths,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let workspace_root = cli.workspace.clone().or_else(|| std::env::current_dir().ok());
    let loaded = ambit_config::Config::load(workspace_root.as_deref());

    // Set up logging from config, with --verbose override.
    let mut log_config = match &loaded {
        Ok(resolved) => config_bridge::to_log_config(&resolved.config)?,
        Err(_) => ambit_telemetry::LogConfig::new("warn"),
    };
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = ambit_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match cli.command {
        Commands::Config { command } => handle_config(command, &loaded, workspace_root.as_deref()),
        Commands::Plugins { command } => {
            let (resolved, registry) = compose(loaded)?;
            handle_plugins(command, &resolved, &registry)
        },
        Commands::Tools { command } => {
            let (_, registry) = compose(loaded)?;
            handle_tools(command, &registry).await
        },
        Commands::Moderate { text } => {
            let (_, registry) = compose(loaded)?;
            moderate::moderate(&registry, &text)
        },
    }
}

/// The loaded configuration and the registry built from it.
fn compose(loaded: ConfigResult<ResolvedConfig>) -> Result<(ResolvedConfig, HostRegistry)> {
    let resolved = loaded.context("failed to load configuration")?;
    let registry = config_bridge::build_registry(&resolved.config)?;
    Ok((resolved, registry))
}

fn handle_plugins(
    command: PluginCommands,
    resolved: &ResolvedConfig,
    registry: &HostRegistry,
) -> Result<()> {
    match command {
        PluginCommands::List => {
            plugins::list_plugins(registry);
            Ok(())
        },
        PluginCommands::Check { dirs } => {
            let dirs = if dirs.is_empty() {
                resolved.config.plugins.dirs.iter().map(PathBuf::from).collect()
            } else {
                dirs
            };
            plugins::check_manifests(&dirs, registry)
        },
    }
}

async fn handle_tools(command: ToolCommands, registry: &HostRegistry) -> Result<()> {
    match command {
        ToolCommands::List => {
            tools::list_tools(registry);
            Ok(())
        },
        ToolCommands::Schema { id, output } => tools::show_schema(registry, &id, output),
        ToolCommands::Call { id, input, resume } => {
            tools::call_tool(registry, &id, &input, resume.as_deref()).await
        },
    }
}

fn handle_config(
    command: ConfigCommands,
    loaded: &ConfigResult<ResolvedConfig>,
    workspace_root: Option<&Path>,
) -> Result<()> {
    match command {
        ConfigCommands::Show { format, section } => {
            let resolved = loaded
                .as_ref()
                .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;
            config::show_config(resolved, &format, section.as_deref())
        },
        ConfigCommands::Validate => config::validate_config(loaded),
        ConfigCommands::Paths => {
            config::show_paths(workspace_root);
            Ok(())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tool_call_with_resume() {
        let cli = Cli::try_parse_from([
            "ambit",
            "tools",
            "call",
            "askForConfirmation",
            r#"{"title":"Delete?","message":"Sure?"}"#,
            "--resume",
            r#"{"confirmed":false}"#,
        ])
        .unwrap();
        match cli.command {
            Commands::Tools {
                command: ToolCommands::Call { id, resume, .. },
            } => {
                assert_eq!(id, "askForConfirmation");
                assert_eq!(resume.as_deref(), Some(r#"{"confirmed":false}"#));
            },
            _ => panic!("expected tools call"),
        }
    }

    #[test]
    fn test_plugins_check_dirs_optional() {
        let cli = Cli::try_parse_from(["ambit", "plugins", "check"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Plugins {
                command: PluginCommands::Check { ref dirs }
            } if dirs.is_empty()
        ));
    }
}
