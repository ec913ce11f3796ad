use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

/// How bad a failure is for the running process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning, // logged, the loop keeps going
    Error,   // the current operation failed
    Fatal,   // the process cannot continue
}

/// Domain-specific errors for the appearance follower
#[derive(Error, Debug)]
pub enum AutoThemeError {
    #[error("Unknown theme '{theme}': not in the palette catalog")]
    ConfigResolution { theme: String },

    #[error("Config file '{path}' could not be loaded: {message}")]
    ConfigFile { path: PathBuf, message: String },

    #[error("Scratch I/O failed for '{path}': {source}")]
    ScratchIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings document '{path}' has non-ASCII byte 0x{byte:02x} at offset {offset}")]
    Encoding {
        path: PathBuf,
        offset: usize,
        byte: u8,
    },

    #[error("Settings document '{path}' is not well-formed XML: {message}")]
    XmlParse { path: PathBuf, message: String },

    #[error("Change notification failed: {0}")]
    Notification(String),

    #[error("Could not launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl AutoThemeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ConfigResolution { .. } => ErrorSeverity::Fatal,
            Self::ConfigFile { .. } => ErrorSeverity::Fatal,
            Self::ScratchIo { .. } => ErrorSeverity::Error,
            Self::Encoding { .. } => ErrorSeverity::Error,
            Self::XmlParse { .. } => ErrorSeverity::Error,
            Self::Notification(_) => ErrorSeverity::Fatal,
            Self::Launch { .. } => ErrorSeverity::Warning,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigResolution { theme } => format!(
                "Theme '{}' is not known. Run with --list-themes to see the available names.",
                theme
            ),
            Self::ConfigFile { path, .. } => format!("Fix or remove {}", path.display()),
            Self::ScratchIo { path, .. } => format!("Could not write {}", path.display()),
            Self::Encoding { path, .. } => format!(
                "{} contains non-ASCII text and was left untouched",
                path.display()
            ),
            Self::XmlParse { path, .. } => format!("{} could not be read as XML", path.display()),
            Self::Notification(msg) => format!("Lost the appearance change notification: {}", msg),
            Self::Launch { program, .. } => format!("Could not start {}", program),
        }
    }

    /// Process exit code for a failure that ends the process.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigResolution { .. } | Self::ConfigFile { .. } => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, AutoThemeError>;

/// Extension trait for logging a failure and carrying on.
///
/// Records the caller location so a swallowed error can still be traced
/// back to the call site from the JSONL log.
///
/// ```ignore
/// use conemu_autotheme::error::ResultExt;
///
/// // The loop does not care whether the terminal exited cleanly
/// launcher.launch(&settings).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log as error with caller location and return None.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = %error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = %error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
