//! Color palettes for the terminal's 16-slot color table.
//!
//! - [`TerminalColor`]: one slot, stored in the terminal's native layout
//! - [`ColorPalette`]: the 16 slots in standard order
//! - [`catalog`]: the built-in named palettes and name lookup

pub mod catalog;
mod color;

pub use catalog::{find_palette, palette_names, NamedPalette, CATALOG};
pub use color::TerminalColor;

/// Number of slots in a terminal color table.
pub const PALETTE_SLOTS: usize = 16;

/// An ordered 16-slot color table.
///
/// Slots 0-7 are black, red, green, yellow, blue, magenta, cyan, white;
/// slots 8-15 are their bright variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette([TerminalColor; PALETTE_SLOTS]);

impl ColorPalette {
    /// Builds a palette from `0xRRGGBB` values.
    pub const fn from_rgb_hex(hex: [u32; PALETTE_SLOTS]) -> Self {
        let mut slots = [TerminalColor::from_raw(0); PALETTE_SLOTS];
        let mut i = 0;
        while i < PALETTE_SLOTS {
            slots[i] = TerminalColor::from_rgb_hex(hex[i]);
            i += 1;
        }
        Self(slots)
    }

    /// Color for a slot, or None if `index` is not 0-15.
    pub fn get(&self, index: usize) -> Option<TerminalColor> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = TerminalColor> + '_ {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> ColorPalette {
        let mut hex = [0u32; PALETTE_SLOTS];
        for (i, slot) in hex.iter_mut().enumerate() {
            *slot = (i as u32) * 0x111111;
        }
        ColorPalette::from_rgb_hex(hex)
    }

    #[test]
    fn test_get_in_range() {
        let palette = ramp();
        assert_eq!(palette.get(0), Some(TerminalColor::from_rgb_hex(0x000000)));
        assert_eq!(palette.get(1), Some(TerminalColor::from_rgb_hex(0x111111)));
        assert_eq!(palette.get(15), Some(TerminalColor::from_rgb_hex(0xffffff)));
    }

    #[test]
    fn test_get_out_of_range() {
        let palette = ramp();
        assert_eq!(palette.get(16), None);
        assert_eq!(palette.get(usize::MAX), None);
    }

    #[test]
    fn test_iter_preserves_slot_order() {
        let palette = ramp();
        let collected: Vec<_> = palette.iter().collect();
        assert_eq!(collected.len(), PALETTE_SLOTS);
        for (i, color) in collected.into_iter().enumerate() {
            assert_eq!(Some(color), palette.get(i));
        }
    }
}
