//! Terminal launching.
//!
//! After a switch has been materialized the terminal is started once, and
//! the loop blocks until it exits. For the script strategy the script path
//! is the terminal's only argument; for the patch strategy the configured
//! launch arguments are passed instead.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use tracing::{debug, instrument};

use crate::error::{AutoThemeError, Result};
use crate::materialize::MaterializedSettings;

pub trait Launcher {
    /// Start the terminal for `settings` and wait for it to exit.
    fn launch(&self, settings: &MaterializedSettings) -> Result<ExitStatus>;
}

/// Launches the terminal executable as a child process.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    launch_args: Vec<String>,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>, launch_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            launch_args,
        }
    }

    /// The command `launch` runs for `settings`.
    pub fn command_for(&self, settings: &MaterializedSettings) -> Command {
        let mut cmd = Command::new(&self.program);
        match settings.launch_argument() {
            Some(script) => {
                cmd.arg(script);
            }
            None => {
                cmd.args(&self.launch_args);
            }
        }
        cmd
    }
}

impl Launcher for ProcessLauncher {
    #[instrument(name = "launch_terminal", skip_all, fields(program = %self.program.display()))]
    fn launch(&self, settings: &MaterializedSettings) -> Result<ExitStatus> {
        let mut cmd = self.command_for(settings);
        debug!(command = ?cmd, "Starting terminal");
        cmd.status().map_err(|source| AutoThemeError::Launch {
            program: self.program.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn args_of(cmd: &Command) -> Vec<&OsStr> {
        cmd.get_args().collect()
    }

    #[test]
    fn test_script_path_is_the_only_argument() {
        let launcher = ProcessLauncher::new("ConEmu64.exe", vec!["-min".to_string()]);
        let settings = MaterializedSettings::Script {
            path: PathBuf::from("C:\\Temp\\dark.bat"),
        };

        let cmd = launcher.command_for(&settings);
        assert_eq!(cmd.get_program(), OsStr::new("ConEmu64.exe"));
        assert_eq!(args_of(&cmd), vec![OsStr::new("C:\\Temp\\dark.bat")]);
    }

    #[test]
    fn test_patched_document_uses_launch_args() {
        let launcher = ProcessLauncher::new(
            "ConEmu64.exe",
            vec!["-Single".to_string(), "-NoUpdate".to_string()],
        );
        let settings = MaterializedSettings::PatchedDocument {
            path: PathBuf::from("ConEmu.xml"),
            fields_written: 16,
        };

        let cmd = launcher.command_for(&settings);
        assert_eq!(
            args_of(&cmd),
            vec![OsStr::new("-Single"), OsStr::new("-NoUpdate")]
        );
    }

    #[test]
    fn test_patched_document_without_args_launches_bare() {
        let launcher = ProcessLauncher::new("ConEmu64.exe", Vec::new());
        let settings = MaterializedSettings::PatchedDocument {
            path: PathBuf::from("ConEmu.xml"),
            fields_written: 16,
        };
        assert!(args_of(&launcher.command_for(&settings)).is_empty());
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = ProcessLauncher::new(dir.path().join("no-such-terminal"), Vec::new());
        let settings = MaterializedSettings::Script {
            path: PathBuf::from("light.bat"),
        };

        let err = launcher.launch(&settings).unwrap_err();
        assert!(matches!(err, AutoThemeError::Launch { .. }));
    }
}
