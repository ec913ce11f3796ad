//! Terminal color values.
//!
//! ConEmu stores each color-table slot as a Win32 `COLORREF`: a 32-bit value
//! laid out as `0x00BBGGRR`. Palettes are written here in the familiar
//! `0xRRGGBB` form and converted once, so the value written to the settings
//! document is the stored value verbatim.

use std::fmt;

/// One color-table entry in the terminal's native `0x00BBGGRR` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TerminalColor(u32);

impl TerminalColor {
    /// Converts a u32 hex color (0xRRGGBB) to the native layout.
    ///
    /// ```rust,ignore
    /// let red = TerminalColor::from_rgb_hex(0xff0000);
    /// assert_eq!(red.raw(), 0x0000ff);
    /// ```
    #[inline]
    pub const fn from_rgb_hex(hex: u32) -> Self {
        let r = (hex >> 16) & 0xFF;
        let g = (hex >> 8) & 0xFF;
        let b = hex & 0xFF;
        Self((b << 16) | (g << 8) | r)
    }

    /// Wraps a value already in the native layout.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// `(r, g, b)` components.
    pub fn rgb(self) -> (u8, u8, u8) {
        (
            (self.0 & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            ((self.0 >> 16) & 0xFF) as u8,
        )
    }

    /// The 8-hex-digit lowercase string used for a `data` attribute.
    pub fn to_data_string(self) -> String {
        format!("{:08x}", self.0)
    }
}

impl fmt::Display for TerminalColor {
    /// Formats as `#rrggbb` for logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.rgb();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}
