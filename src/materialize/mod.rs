//! Turning a theme binding into something the terminal picks up.
//!
//! Two strategies sit behind [`Materializer`]:
//!
//! - [`DocumentPatcher`] (default): rewrites the color table of the terminal's
//!   XML settings document in place, see [`settings_xml`].
//! - [`ScriptMaterializer`]: pre-generated macro scripts, one per mode, that
//!   the terminal runs to switch palettes, see [`script`].
//!
//! The loop only sees the trait and the [`MaterializedSettings`] it returns.

pub mod script;
pub mod settings_xml;

use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::config::Strategy;
use crate::error::Result;
use crate::theme::{ThemeBinding, ThemeBindings};

pub use script::ScriptMaterializer;
pub use settings_xml::{apply_palette, PatchReport};

/// Result of materializing a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializedSettings {
    /// The settings document now carries the binding's palette.
    PatchedDocument { path: PathBuf, fields_written: usize },
    /// Script the terminal should run to switch palettes.
    Script { path: PathBuf },
}

impl MaterializedSettings {
    /// Extra argument for the terminal launch, if the strategy needs one.
    pub fn launch_argument(&self) -> Option<&Path> {
        match self {
            Self::PatchedDocument { .. } => None,
            Self::Script { path } => Some(path),
        }
    }
}

pub trait Materializer {
    fn strategy(&self) -> Strategy;

    /// Make the binding's palette available to the terminal.
    fn materialize(&self, binding: &ThemeBinding) -> Result<MaterializedSettings>;
}

/// Patches the color table of one settings document.
#[derive(Debug, Clone)]
pub struct DocumentPatcher {
    settings_path: PathBuf,
}

impl DocumentPatcher {
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
        }
    }
}

impl Materializer for DocumentPatcher {
    fn strategy(&self) -> Strategy {
        Strategy::Patch
    }

    fn materialize(&self, binding: &ThemeBinding) -> Result<MaterializedSettings> {
        let report = apply_palette(&self.settings_path, &binding.palette)?;
        Ok(MaterializedSettings::PatchedDocument {
            path: report.path,
            fields_written: report.fields_written,
        })
    }
}

/// Build the materializer for `strategy`.
///
/// The script strategy writes both scripts here, so scratch I/O problems
/// surface at startup rather than on the first appearance change.
#[instrument(name = "build_materializer", skip(bindings))]
pub fn build_materializer(
    strategy: Strategy,
    settings_path: &Path,
    bindings: &ThemeBindings,
) -> Result<Box<dyn Materializer>> {
    Ok(match strategy {
        Strategy::Patch => Box::new(DocumentPatcher::new(settings_path)),
        Strategy::Script => Box::new(ScriptMaterializer::prepare(bindings)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::AppearanceMode;
    use crate::palette::PALETTE_SLOTS;
    use crate::theme::resolve_bindings;

    const MINIMAL_DOCUMENT: &str = concat!(
        "<key name=\"Software\"><key name=\"ConEmu\"><key name=\".Vanilla\">",
        "<value name=\"ColorTable00\" type=\"dword\" data=\"00000000\"/>",
        "</key></key></key>"
    );

    #[test]
    fn test_patched_document_has_no_launch_argument() {
        let settings = MaterializedSettings::PatchedDocument {
            path: PathBuf::from("ConEmu.xml"),
            fields_written: PALETTE_SLOTS,
        };
        assert_eq!(settings.launch_argument(), None);
    }

    #[test]
    fn test_script_launch_argument_is_its_path() {
        let settings = MaterializedSettings::Script {
            path: PathBuf::from("dark.bat"),
        };
        assert_eq!(settings.launch_argument(), Some(Path::new("dark.bat")));
    }

    #[test]
    fn test_document_patcher_materializes_binding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ConEmu.xml");
        std::fs::write(&path, MINIMAL_DOCUMENT).unwrap();

        let bindings = resolve_bindings("Tomorrow", "Tomorrow Night").unwrap();
        let patcher = DocumentPatcher::new(&path);
        let settings = patcher
            .materialize(bindings.for_mode(AppearanceMode::Dark))
            .unwrap();

        assert_eq!(
            settings,
            MaterializedSettings::PatchedDocument {
                path: path.clone(),
                fields_written: 1,
            }
        );
        // Tomorrow Night background 0x1d1f21 in native layout
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("data=\"00211f1d\""));
    }

    #[test]
    fn test_build_materializer_picks_strategy() {
        let bindings = resolve_bindings("Tomorrow", "Tomorrow Night").unwrap();
        let settings_path = Path::new("ConEmu.xml");

        let patch = build_materializer(Strategy::Patch, settings_path, &bindings).unwrap();
        assert_eq!(patch.strategy(), Strategy::Patch);

        let script = build_materializer(Strategy::Script, settings_path, &bindings).unwrap();
        assert_eq!(script.strategy(), Strategy::Script);
    }
}
