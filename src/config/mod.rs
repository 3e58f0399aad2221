// src/config/mod.rs
//! Configuration management for the mining dashboard
//!
//! This module handles all configuration-related functionality including:
//! - Loading and parsing configuration files
//! - Generating configuration templates
//! - Per-coin miner overrides and experiment feature toggles
//!
//! The configuration uses TOML format. Loading failures are reported as
//! errors rather than silently replaced with an empty configuration.

/// Core configuration implementation
///
/// Contains the [`Config`] struct and related types that define
/// the dashboard's configuration structure.
#[allow(clippy::module_inception)]
pub mod config;

// Re-export key items for easy access
pub use config::{Config, LedgerSettings, MinerSettings, MinerTable, MiningSettings};

use crate::utils::error::MinerError;
use std::path::PathBuf;

/// Loads dashboard configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the configuration file (anything convertible to PathBuf)
///
/// # Returns
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(MinerError)` - If the file couldn't be read, parsed or validated
pub fn load(path: impl Into<PathBuf>) -> Result<Config, MinerError> {
    Config::load(path)
}

/// Generates a commented configuration template
pub fn generate_template() -> String {
    Config::generate_template()
}
