//! Configuration type definitions
//!
//! `Config` mirrors the JSON file: every field is optional and falls back to
//! a default. `ResolvedConfig` is the fully merged result the process runs
//! with.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::defaults::*;
use super::loader::expand_path;

// ============================================
// STRATEGY
// ============================================

/// How a theme switch is materialized for the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Rewrite the color table in the terminal's XML settings document
    #[default]
    Patch,
    /// Generate macro scripts and hand one to the terminal on each switch
    Script,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Patch => "patch",
            Strategy::Script => "script",
        }
    }
}

// ============================================
// MAIN CONFIG
// ============================================

/// Contents of `~/.conemu-autotheme/config.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Terminal executable (default: ConEmu64.exe under Program Files)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_path: Option<String>,
    /// Scheme used while the system is in light mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_theme: Option<String>,
    /// Scheme used while the system is in dark mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_theme: Option<String>,
    /// Terminal settings document (default: <config dir>/ConEmu.xml)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    /// Patch the document for the current mode at startup (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_sync: Option<bool>,
    /// Extra arguments for the terminal in patch mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_args: Option<Vec<String>>,
    /// Polling notifier interval in milliseconds (default: 2000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

impl Config {
    pub fn get_terminal_path(&self) -> PathBuf {
        self.terminal_path
            .as_deref()
            .map(expand_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TERMINAL_PATH))
    }

    pub fn get_light_theme(&self) -> String {
        self.light_theme
            .clone()
            .unwrap_or_else(|| DEFAULT_LIGHT_THEME.to_string())
    }

    pub fn get_dark_theme(&self) -> String {
        self.dark_theme
            .clone()
            .unwrap_or_else(|| DEFAULT_DARK_THEME.to_string())
    }

    pub fn get_settings_path(&self) -> PathBuf {
        self.settings_path
            .as_deref()
            .map(expand_path)
            .unwrap_or_else(default_settings_path)
    }

    pub fn get_strategy(&self) -> Strategy {
        self.strategy.unwrap_or_default()
    }

    pub fn get_initial_sync(&self) -> bool {
        self.initial_sync.unwrap_or(DEFAULT_INITIAL_SYNC)
    }

    pub fn get_launch_args(&self) -> Vec<String> {
        self.launch_args.clone().unwrap_or_default()
    }

    pub fn get_poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS).max(1))
    }
}

/// `%APPDATA%\ConEmu.xml` on Windows, `<config dir>/ConEmu.xml` elsewhere.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(DEFAULT_SETTINGS_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE_NAME))
}

// ============================================
// RESOLVED CONFIG
// ============================================

/// Everything the process needs, after defaults, file and arguments are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub terminal_path: PathBuf,
    pub light_theme: String,
    pub dark_theme: String,
    pub settings_path: PathBuf,
    pub strategy: Strategy,
    pub initial_sync: bool,
    pub launch_args: Vec<String>,
    pub poll_interval: Duration,
}

impl ResolvedConfig {
    /// Merge the file config with positional arguments.
    ///
    /// Positional arguments (`<terminal> <light> <dark>`) win when exactly
    /// three are given; any other count leaves the file/default values alone.
    pub fn resolve(config: &Config, positional: &[String]) -> Self {
        let mut resolved = ResolvedConfig {
            terminal_path: config.get_terminal_path(),
            light_theme: config.get_light_theme(),
            dark_theme: config.get_dark_theme(),
            settings_path: config.get_settings_path(),
            strategy: config.get_strategy(),
            initial_sync: config.get_initial_sync(),
            launch_args: config.get_launch_args(),
            poll_interval: config.get_poll_interval(),
        };

        match positional {
            [terminal, light, dark] => {
                resolved.terminal_path = PathBuf::from(terminal);
                resolved.light_theme = light.clone();
                resolved.dark_theme = dark.clone();
            }
            [] => {}
            other => {
                debug!(
                    count = other.len(),
                    expected = EXPECTED_POSITIONAL_ARGS,
                    "Ignoring positional arguments"
                );
            }
        }

        resolved
    }
}
