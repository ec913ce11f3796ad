//! Appearance detection by asking the desktop's own command-line tools.
//!
//! Used on hosts without the Windows registry. macOS answers through
//! `defaults read -g AppleInterfaceStyle`, GNOME through
//! `gsettings get org.gnome.desktop.interface color-scheme`.

use std::process::Command;

use tracing::debug;

use super::{AppearanceMode, AppearanceReadError, AppearanceSource};

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandAppearance;

impl AppearanceSource for CommandAppearance {
    fn try_read(&self) -> Result<AppearanceMode, AppearanceReadError> {
        if cfg!(target_os = "macos") {
            let output = Command::new("defaults")
                .args(["read", "-g", "AppleInterfaceStyle"])
                .output()?;
            let stdout = String::from_utf8_lossy(&output.stdout);
            let mode = parse_apple_interface_style(output.status.success(), &stdout);
            debug!(appearance = mode.as_str(), "System appearance detected");
            return Ok(mode);
        }

        let output = Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", "color-scheme"])
            .output()?;
        if !output.status.success() {
            return Err(AppearanceReadError::Unavailable(format!(
                "gsettings exited with {}",
                output.status
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_gsettings_color_scheme(&stdout).ok_or_else(|| {
            AppearanceReadError::Unavailable(format!("unrecognized color-scheme {}", stdout.trim()))
        })
    }
}

/// In light mode the `AppleInterfaceStyle` key does not exist and `defaults`
/// exits non-zero, so a failed read means light.
fn parse_apple_interface_style(success: bool, stdout: &str) -> AppearanceMode {
    if success && stdout.to_lowercase().contains("dark") {
        AppearanceMode::Dark
    } else {
        AppearanceMode::Light
    }
}

/// GNOME 42+: `'prefer-dark'`, `'prefer-light'` or `'default'`.
fn parse_gsettings_color_scheme(stdout: &str) -> Option<AppearanceMode> {
    let value = stdout.trim().trim_matches('\'').to_ascii_lowercase();
    match value.as_str() {
        "prefer-dark" => Some(AppearanceMode::Dark),
        "prefer-light" | "default" => Some(AppearanceMode::Light),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apple_dark() {
        assert_eq!(
            parse_apple_interface_style(true, "Dark\n"),
            AppearanceMode::Dark
        );
    }

    #[test]
    fn test_apple_missing_key_is_light() {
        assert_eq!(parse_apple_interface_style(false, ""), AppearanceMode::Light);
    }

    #[test]
    fn test_gsettings_values() {
        assert_eq!(
            parse_gsettings_color_scheme("'prefer-dark'\n"),
            Some(AppearanceMode::Dark)
        );
        assert_eq!(
            parse_gsettings_color_scheme("'default'\n"),
            Some(AppearanceMode::Light)
        );
        assert_eq!(
            parse_gsettings_color_scheme("'prefer-light'"),
            Some(AppearanceMode::Light)
        );
        assert_eq!(parse_gsettings_color_scheme("''"), None);
    }
}
