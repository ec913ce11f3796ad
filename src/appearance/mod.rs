//! Appearance-State Reader
//!
//! Reads the system-wide light/dark preference on demand. Readers hold no
//! state; every call goes back to the system.
//!
//! On Windows the preference lives in
//! `HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize`
//! as the DWORD `AppsUseLightTheme`. Zero means the light theme is disabled,
//! i.e. dark mode.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

mod command;
#[cfg(windows)]
mod registry;

pub use command::CommandAppearance;
#[cfg(windows)]
pub use registry::RegistryAppearance;

/// Registry key (under HKCU) holding the appearance flags.
pub const PERSONALIZE_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Themes\Personalize";

/// DWORD value: 0 = dark, nonzero = light.
pub const LIGHT_THEME_VALUE: &str = "AppsUseLightTheme";

/// Mode reported when the flag cannot be read.
///
/// Windows itself treats a missing `AppsUseLightTheme` as light, so an
/// unreadable flag is reported the same way instead of as an all-zero DWORD.
pub const FALLBACK_MODE: AppearanceMode = AppearanceMode::Light;

/// System appearance: light or dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppearanceMode {
    #[default]
    Light,
    Dark,
}

impl AppearanceMode {
    /// Interpret the `AppsUseLightTheme` DWORD.
    pub fn from_light_theme_flag(value: u32) -> Self {
        if value == 0 {
            AppearanceMode::Dark
        } else {
            AppearanceMode::Light
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppearanceMode::Light => "light",
            AppearanceMode::Dark => "dark",
        }
    }
}

impl fmt::Display for AppearanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the appearance flag could not be read.
#[derive(Error, Debug)]
pub enum AppearanceReadError {
    #[error("appearance flag unavailable: {0}")]
    Unavailable(String),

    #[error("appearance query failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can report the current appearance.
pub trait AppearanceSource {
    fn try_read(&self) -> Result<AppearanceMode, AppearanceReadError>;
}

impl<S: AppearanceSource + ?Sized> AppearanceSource for &S {
    fn try_read(&self) -> Result<AppearanceMode, AppearanceReadError> {
        (**self).try_read()
    }
}

impl<S: AppearanceSource + ?Sized> AppearanceSource for Box<S> {
    fn try_read(&self) -> Result<AppearanceMode, AppearanceReadError> {
        (**self).try_read()
    }
}

/// Read the current mode, never failing.
///
/// Falls back to [`FALLBACK_MODE`] and logs a warning when the source
/// cannot be read.
pub fn read_current_mode<S: AppearanceSource + ?Sized>(source: &S) -> AppearanceMode {
    match source.try_read() {
        Ok(mode) => mode,
        Err(e) => {
            warn!(
                error = %e,
                fallback = FALLBACK_MODE.as_str(),
                "Could not read system appearance, using fallback"
            );
            FALLBACK_MODE
        }
    }
}

/// The reader for the host platform.
pub fn system_source() -> Box<dyn AppearanceSource + Send> {
    #[cfg(windows)]
    {
        Box::new(RegistryAppearance)
    }
    #[cfg(not(windows))]
    {
        Box::new(CommandAppearance)
    }
}
