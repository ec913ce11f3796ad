//! Configuration module - terminal path, theme names, strategy
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.conemu-autotheme/config.json
//! - Default values for all settings
//! - Merging file values with positional arguments
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - `Config` (file shape), `Strategy`, `ResolvedConfig`
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{
    DEFAULT_DARK_THEME, DEFAULT_LIGHT_THEME, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TERMINAL_PATH,
    EXPECTED_POSITIONAL_ARGS,
};
pub use loader::{app_dir, default_config_path, expand_path, load_config, parse_config};
pub use types::{default_settings_path, Config, ResolvedConfig, Strategy};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
