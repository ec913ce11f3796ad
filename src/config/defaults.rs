//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Terminal executable launched after each switch
pub const DEFAULT_TERMINAL_PATH: &str = r"C:\Program Files\ConEmu\ConEmu64.exe";

/// Scheme names used when nothing else is configured
pub const DEFAULT_LIGHT_THEME: &str = "Tomorrow";
pub const DEFAULT_DARK_THEME: &str = "Tomorrow Night";

/// File name of the terminal's settings document inside the user config dir
pub const DEFAULT_SETTINGS_FILE_NAME: &str = "ConEmu.xml";

/// Patch the document once at startup before waiting for changes
pub const DEFAULT_INITIAL_SYNC: bool = true;

/// Wake interval for the polling notifier (hosts without registry notifications)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Per-user application directory (config file, logs)
pub const APP_DIR: &str = "~/.conemu-autotheme";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Positional arguments only override the defaults when exactly this many are given:
/// `<terminal> <light theme> <dark theme>`
pub const EXPECTED_POSITIONAL_ARGS: usize = 3;
