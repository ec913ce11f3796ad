//! Structured JSONL logging plus human-readable stderr output.
//!
//! - **JSONL to file** (`~/.conemu-autotheme/logs/conemu-autotheme.jsonl`)
//! - **Compact to stderr**
//!
//! # Usage
//!
//! ```rust,ignore
//! use conemu_autotheme::logging;
//!
//! // Keep the guard alive until exit, dropping it flushes the file writer
//! let _guard = logging::init(logging::LoggingOptions::default());
//!
//! tracing::info!(event_type = "appearance_transition", to = "dark", "Appearance changed");
//! ```
//!
//! # JSONL Output Format
//!
//! ```json
//! {"timestamp":"2024-12-25T10:30:45.123Z","level":"INFO","target":"conemu_autotheme::sync_loop","fields":{"event_type":"appearance_transition","from":"light","to":"dark","message":"Appearance changed"}}
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::process::ExitStatus;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::appearance::AppearanceMode;
use crate::config::app_dir;
use crate::materialize::MaterializedSettings;

const LOG_FILE_NAME: &str = "conemu-autotheme.jsonl";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingOptions {
    /// Lower the default filter from `info` to `debug`
    pub verbose: bool,
}

impl LoggingOptions {
    fn default_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Initialize the dual-output logging system.
///
/// `RUST_LOG` overrides the default filter. If the log file cannot be
/// opened, only stderr output is produced.
pub fn init(options: LoggingOptions) -> LoggingGuard {
    let log_path = log_path();
    let (file_writer, file_guard) = open_file_writer(&log_path);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_filter()));

    let json_layer = fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
    {
        eprintln!("[LOGGING] Subscriber already installed: {}", e);
    }

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

fn open_file_writer(log_path: &std::path::Path) -> (NonBlocking, WorkerGuard) {
    if let Some(dir) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("[LOGGING] Failed to create log directory: {}", e);
        }
    }

    match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => tracing_appender::non_blocking(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            tracing_appender::non_blocking(std::io::sink())
        }
    }
}

/// `~/.conemu-autotheme/logs/`
fn get_log_dir() -> PathBuf {
    app_dir().join("logs")
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

// =============================================================================
// DOMAIN EVENTS
// =============================================================================

/// Log an observed appearance transition
pub fn log_transition(from: AppearanceMode, to: AppearanceMode) {
    tracing::info!(
        event_type = "appearance_transition",
        from = from.as_str(),
        to = to.as_str(),
        "Appearance changed"
    );
}

/// Log a successful materialization
pub fn log_materialized(mode: AppearanceMode, theme: &str, settings: &MaterializedSettings) {
    match settings {
        MaterializedSettings::PatchedDocument {
            path,
            fields_written,
        } => tracing::info!(
            event_type = "materialized",
            strategy = "patch",
            mode = mode.as_str(),
            theme,
            path = %path.display(),
            fields_written,
            "Theme applied to settings document"
        ),
        MaterializedSettings::Script { path } => tracing::info!(
            event_type = "materialized",
            strategy = "script",
            mode = mode.as_str(),
            theme,
            path = %path.display(),
            "Theme script selected"
        ),
    }
}

/// Log the terminal's exit after a launch
pub fn log_launch(settings: &MaterializedSettings, status: &ExitStatus) {
    let script = settings.launch_argument().map(|p| p.display().to_string());
    if status.success() {
        tracing::info!(
            event_type = "terminal_launch",
            script = script.as_deref(),
            exit_code = status.code(),
            "Terminal exited"
        );
    } else {
        tracing::warn!(
            event_type = "terminal_launch",
            script = script.as_deref(),
            exit_code = status.code(),
            "Terminal exited with failure status"
        );
    }
}

/// Log an error with structured fields and context
pub fn log_error(category: &str, error: &str, context: Option<&str>) {
    let msg = match context {
        Some(ctx) => format!("{}: {} (context: {})", category, error, ctx),
        None => format!("{}: {}", category, error),
    };

    tracing::error!(
        event_type = "error",
        category = category,
        error_message = error,
        context = context,
        "{}", msg
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_location() {
        let path = log_path();
        assert!(path.ends_with("logs/conemu-autotheme.jsonl"));
        assert!(path.starts_with(app_dir()));
    }

    #[test]
    fn test_default_filter_follows_verbosity() {
        assert_eq!(LoggingOptions::default().default_filter(), "info");
        assert_eq!(LoggingOptions { verbose: true }.default_filter(), "debug");
    }

    #[test]
    fn test_file_writer_falls_back_when_unopenable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending
        let (_writer, _guard) = open_file_writer(dir.path());
    }

    #[test]
    fn test_event_helpers_without_subscriber() {
        log_transition(AppearanceMode::Light, AppearanceMode::Dark);
        log_materialized(
            AppearanceMode::Dark,
            "Tomorrow Night",
            &MaterializedSettings::Script {
                path: PathBuf::from("dark.bat"),
            },
        );
        log_error("test", "boom", Some("unit test"));
    }
}
