//! Theme bindings: which named palette each appearance mode uses.
//!
//! Exactly two bindings exist, one per [`AppearanceMode`]. They are resolved
//! once at startup from the configured names and never change afterwards.

use tracing::{debug, instrument};

use crate::appearance::AppearanceMode;
use crate::error::{AutoThemeError, Result};
use crate::palette::{find_palette, ColorPalette};

/// One appearance mode paired with a resolved palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeBinding {
    pub mode: AppearanceMode,
    /// Canonical catalog name (the terminal's own scheme name).
    pub theme_name: String,
    pub palette: ColorPalette,
}

/// The light and dark bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeBindings {
    light: ThemeBinding,
    dark: ThemeBinding,
}

impl ThemeBindings {
    pub fn for_mode(&self, mode: AppearanceMode) -> &ThemeBinding {
        match mode {
            AppearanceMode::Light => &self.light,
            AppearanceMode::Dark => &self.dark,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThemeBinding> {
        [&self.light, &self.dark].into_iter()
    }
}

/// Resolve both theme names against the palette catalog.
///
/// An unknown name is a [`AutoThemeError::ConfigResolution`].
#[instrument(name = "resolve_bindings")]
pub fn resolve_bindings(light_theme: &str, dark_theme: &str) -> Result<ThemeBindings> {
    let light = resolve_one(AppearanceMode::Light, light_theme)?;
    let dark = resolve_one(AppearanceMode::Dark, dark_theme)?;
    Ok(ThemeBindings { light, dark })
}

fn resolve_one(mode: AppearanceMode, name: &str) -> Result<ThemeBinding> {
    let entry = find_palette(name).ok_or_else(|| AutoThemeError::ConfigResolution {
        theme: name.to_string(),
    })?;
    debug!(mode = mode.as_str(), theme = entry.name, "Theme binding resolved");
    Ok(ThemeBinding {
        mode,
        theme_name: entry.name.to_string(),
        palette: entry.palette,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_default_names() {
        let bindings = resolve_bindings("Tomorrow", "Tomorrow Night").unwrap();
        assert_eq!(bindings.for_mode(AppearanceMode::Light).theme_name, "Tomorrow");
        assert_eq!(
            bindings.for_mode(AppearanceMode::Dark).theme_name,
            "Tomorrow Night"
        );
    }

    #[test]
    fn test_binding_mode_matches_slot() {
        let bindings = resolve_bindings("Solarized Light", "Solarized").unwrap();
        for binding in bindings.iter() {
            assert_eq!(bindings.for_mode(binding.mode), binding);
        }
        assert_eq!(bindings.iter().count(), 2);
    }

    #[test]
    fn test_names_are_canonicalized() {
        let bindings = resolve_bindings("<tomorrow>", "MONOKAI").unwrap();
        assert_eq!(bindings.for_mode(AppearanceMode::Light).theme_name, "Tomorrow");
        assert_eq!(bindings.for_mode(AppearanceMode::Dark).theme_name, "Monokai");
    }

    #[test]
    fn test_unknown_light_theme_fails() {
        let err = resolve_bindings("No Such Theme", "Tomorrow Night").unwrap_err();
        match err {
            AutoThemeError::ConfigResolution { theme } => assert_eq!(theme, "No Such Theme"),
            other => panic!("Expected ConfigResolution, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_dark_theme_fails() {
        let err = resolve_bindings("Tomorrow", "Nope").unwrap_err();
        assert!(matches!(err, AutoThemeError::ConfigResolution { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
