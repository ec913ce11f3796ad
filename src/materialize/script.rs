//! Macro-script strategy.
//!
//! Instead of editing the settings document, two small batch scripts are
//! written to a scratch directory at startup, one per appearance mode. Each
//! tells the running terminal to switch its palette by name, then closes the
//! helper console it runs in. The loop hands the matching script to the
//! terminal as its launch argument.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info, instrument};

use super::{MaterializedSettings, Materializer};
use crate::appearance::AppearanceMode;
use crate::config::Strategy;
use crate::error::{AutoThemeError, Result};
use crate::theme::{ThemeBinding, ThemeBindings};

const SCRATCH_DIR_PREFIX: &str = "conemu-autotheme-";

/// Batch script that switches the terminal palette to `theme_name`.
///
/// The name is wrapped in `<...>` the way the terminal's `palette` macro
/// expects a scheme name.
pub fn script_contents(theme_name: &str) -> String {
    [
        format!("ConEmuC -GuiMacro palette 1 \"<{}>\"", theme_name),
        "ConEmuC -GuiMacro WindowMinimize".to_string(),
        "ConEmuC -GuiMacro Close(0,1)".to_string(),
    ]
    .iter()
    .map(|line| format!("{}\r\n", line))
    .collect()
}

/// File name of the script for a mode: `light.bat` / `dark.bat`.
pub fn script_file_name(mode: AppearanceMode) -> String {
    format!("{}.bat", mode.as_str())
}

/// Both mode scripts, generated once into a scratch directory that is
/// removed when this value is dropped.
#[derive(Debug)]
pub struct ScriptMaterializer {
    dir: TempDir,
    light: PathBuf,
    dark: PathBuf,
    light_contents: String,
    dark_contents: String,
}

impl ScriptMaterializer {
    /// Create the scratch directory and write both scripts.
    ///
    /// Failure here is fatal for the script strategy: the loop has nothing
    /// to hand to the terminal without them.
    #[instrument(name = "prepare_scripts", skip(bindings))]
    pub fn prepare(bindings: &ThemeBindings) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_DIR_PREFIX)
            .tempdir()
            .map_err(|source| AutoThemeError::ScratchIo {
                path: std::env::temp_dir(),
                source,
            })?;
        Self::prepare_in(dir, bindings)
    }

    fn prepare_in(dir: TempDir, bindings: &ThemeBindings) -> Result<Self> {
        let light_binding = bindings.for_mode(AppearanceMode::Light);
        let dark_binding = bindings.for_mode(AppearanceMode::Dark);

        let materializer = Self {
            light: dir.path().join(script_file_name(AppearanceMode::Light)),
            dark: dir.path().join(script_file_name(AppearanceMode::Dark)),
            light_contents: script_contents(&light_binding.theme_name),
            dark_contents: script_contents(&dark_binding.theme_name),
            dir,
        };
        for mode in [AppearanceMode::Light, AppearanceMode::Dark] {
            let (path, contents) = materializer.script_for(mode);
            write_atomic(materializer.dir.path(), path, contents)?;
        }

        info!(dir = %materializer.dir.path().display(), "Theme scripts generated");
        Ok(materializer)
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn script_path(&self, mode: AppearanceMode) -> &Path {
        self.script_for(mode).0
    }

    fn script_for(&self, mode: AppearanceMode) -> (&Path, &str) {
        match mode {
            AppearanceMode::Light => (self.light.as_path(), self.light_contents.as_str()),
            AppearanceMode::Dark => (self.dark.as_path(), self.dark_contents.as_str()),
        }
    }
}

impl Materializer for ScriptMaterializer {
    fn strategy(&self) -> Strategy {
        Strategy::Script
    }

    /// Select the precomputed script for the binding's mode. A script that
    /// has gone missing (temp cleaners) is written again.
    fn materialize(&self, binding: &ThemeBinding) -> Result<MaterializedSettings> {
        let (path, contents) = self.script_for(binding.mode);
        if !path.is_file() {
            debug!(path = %path.display(), "Script missing, rewriting");
            write_atomic(self.dir.path(), path, contents)?;
        }
        Ok(MaterializedSettings::Script {
            path: path.to_path_buf(),
        })
    }
}

/// Write through a sibling temp file and rename over the target, so the
/// terminal never sees a half-written script.
fn write_atomic(dir: &Path, path: &Path, contents: &str) -> Result<()> {
    let io_error = |source| AutoThemeError::ScratchIo {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_error)?;
    tmp.write_all(contents.as_bytes()).map_err(io_error)?;
    tmp.flush().map_err(io_error)?;
    tmp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::resolve_bindings;

    fn bindings() -> ThemeBindings {
        resolve_bindings("Tomorrow", "Tomorrow Night").unwrap()
    }

    #[test]
    fn test_script_contents() {
        assert_eq!(
            script_contents("Tomorrow Night"),
            "ConEmuC -GuiMacro palette 1 \"<Tomorrow Night>\"\r\n\
             ConEmuC -GuiMacro WindowMinimize\r\n\
             ConEmuC -GuiMacro Close(0,1)\r\n"
        );
    }

    #[test]
    fn test_script_file_names() {
        assert_eq!(script_file_name(AppearanceMode::Light), "light.bat");
        assert_eq!(script_file_name(AppearanceMode::Dark), "dark.bat");
    }

    #[test]
    fn test_prepare_writes_both_scripts() {
        let materializer = ScriptMaterializer::prepare(&bindings()).unwrap();

        let light = std::fs::read_to_string(materializer.script_path(AppearanceMode::Light)).unwrap();
        let dark = std::fs::read_to_string(materializer.script_path(AppearanceMode::Dark)).unwrap();
        assert!(light.contains("\"<Tomorrow>\""));
        assert!(dark.contains("\"<Tomorrow Night>\""));
        assert!(materializer
            .script_path(AppearanceMode::Light)
            .starts_with(materializer.dir()));
    }

    #[test]
    fn test_materialize_returns_script_for_mode() {
        let bindings = bindings();
        let materializer = ScriptMaterializer::prepare(&bindings).unwrap();

        let settings = materializer
            .materialize(bindings.for_mode(AppearanceMode::Dark))
            .unwrap();
        assert_eq!(
            settings.launch_argument(),
            Some(materializer.script_path(AppearanceMode::Dark))
        );
    }

    #[test]
    fn test_materialize_rewrites_missing_script() {
        let bindings = bindings();
        let materializer = ScriptMaterializer::prepare(&bindings).unwrap();
        let path = materializer.script_path(AppearanceMode::Light).to_path_buf();
        std::fs::remove_file(&path).unwrap();

        materializer
            .materialize(bindings.for_mode(AppearanceMode::Light))
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), script_contents("Tomorrow"));
    }

    #[test]
    fn test_scratch_dir_removed_on_drop() {
        let materializer = ScriptMaterializer::prepare(&bindings()).unwrap();
        let dir = materializer.dir().to_path_buf();
        assert!(dir.is_dir());
        drop(materializer);
        assert!(!dir.exists());
    }

    #[test]
    fn test_prepare_in_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().to_path_buf();
        // Point the materializer at a directory, then remove it underneath
        let scratch = tempfile::Builder::new().tempdir_in(&gone).unwrap();
        let scratch_path = scratch.path().to_path_buf();
        std::fs::remove_dir_all(&scratch_path).unwrap();

        let err = ScriptMaterializer::prepare_in(scratch, &bindings()).unwrap_err();
        assert!(matches!(err, AutoThemeError::ScratchIo { .. }));
    }
}
