//! CLI subcommands

use std::path::Path;

use anyhow::Context;
use cardvault_core::RegistryConfig;

pub mod demo;
pub mod deploy;
pub mod query;

/// Load registry config from `path`, or from the environment when absent
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RegistryConfig> {
    match path {
        Some(path) => RegistryConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => RegistryConfig::from_env().context("loading config from environment"),
    }
}
