//! CLI subcommand implementations.

pub(crate) mod config;
pub(crate) mod moderate;
pub(crate) mod plugins;
pub(crate) mod tools;
