//! Configuration loading from file system
//!
//! Reads the optional JSON config file. A missing file at the default
//! location means "use defaults"; anything that exists but cannot be read or
//! parsed is an error, since silently ignoring it would run with themes the
//! user did not ask for.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use super::defaults::{APP_DIR, CONFIG_FILE_NAME};
use super::types::Config;
use crate::error::{AutoThemeError, Result};

/// Expand a leading `~` in a configured path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// `~/.conemu-autotheme`
pub fn app_dir() -> PathBuf {
    expand_path(APP_DIR)
}

/// `~/.conemu-autotheme/config.json`
pub fn default_config_path() -> PathBuf {
    app_dir().join(CONFIG_FILE_NAME)
}

/// Load configuration from `path`, or from the default location when None.
///
/// Returns `Config::default()` if the default file does not exist. An
/// explicitly requested file must exist.
#[instrument(name = "load_config")]
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (default_config_path(), false),
    };

    let contents = match std::fs::read_to_string(&config_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound && !explicit => {
            info!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(AutoThemeError::ConfigFile {
                path: config_path,
                message: e.to_string(),
            })
        }
    };

    let config = parse_config(&contents).map_err(|message| AutoThemeError::ConfigFile {
        path: config_path.clone(),
        message,
    })?;
    info!(path = %config_path.display(), "Successfully loaded config");
    Ok(config)
}

/// Parse the JSON text of a config file.
pub fn parse_config(contents: &str) -> std::result::Result<Config, String> {
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_json::from_str::<Config>(contents).map_err(|e| {
        let hint = if e.to_string().contains("unknown variant") {
            " (strategy must be \"patch\" or \"script\")"
        } else {
            ""
        };
        format!("{}{}", e, hint)
    })
}
