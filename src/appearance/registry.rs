use winreg::enums::HKEY_CURRENT_USER;
use winreg::RegKey;

use super::{AppearanceMode, AppearanceReadError, AppearanceSource, LIGHT_THEME_VALUE, PERSONALIZE_KEY};

/// Reads `AppsUseLightTheme` from the current user's hive.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryAppearance;

impl AppearanceSource for RegistryAppearance {
    fn try_read(&self) -> Result<AppearanceMode, AppearanceReadError> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let personalize = hkcu.open_subkey(PERSONALIZE_KEY)?;
        let value: u32 = personalize.get_value(LIGHT_THEME_VALUE)?;
        Ok(AppearanceMode::from_light_theme_flag(value))
    }
}
