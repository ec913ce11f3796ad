//! Built-in named palettes.
//!
//! Slot order follows the standard 16-color layout:
//! - Slots 0-7: black, red, green, yellow, blue, magenta, cyan, white
//! - Slots 8-15: bright variants of the above
//!
//! ConEmu draws the default background from slot 0 and the default text from
//! slot 7, so each scheme puts its background and foreground there.

use super::ColorPalette;

/// A palette together with the name users refer to it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPalette {
    pub name: &'static str,
    pub palette: ColorPalette,
}

const fn named(name: &'static str, hex: [u32; 16]) -> NamedPalette {
    NamedPalette {
        name,
        palette: ColorPalette::from_rgb_hex(hex),
    }
}

/// Every palette the process knows about. Immutable for the process lifetime.
pub static CATALOG: &[NamedPalette] = &[
    named(
        "Tomorrow",
        [
            0xffffff, 0xc82829, 0x718c00, 0xeab700, 0x4271ae, 0x8959a8, 0x3e999f, 0x4d4d4c,
            0x8e908c, 0xc82829, 0x718c00, 0xeab700, 0x4271ae, 0x8959a8, 0x3e999f, 0x1d1f21,
        ],
    ),
    named(
        "Tomorrow Night",
        [
            0x1d1f21, 0xcc6666, 0xb5bd68, 0xf0c674, 0x81a2be, 0xb294bb, 0x8abeb7, 0xc5c8c6,
            0x969896, 0xcc6666, 0xb5bd68, 0xf0c674, 0x81a2be, 0xb294bb, 0x8abeb7, 0xffffff,
        ],
    ),
    named(
        "Tomorrow Night Eighties",
        [
            0x2d2d2d, 0xf2777a, 0x99cc99, 0xffcc66, 0x6699cc, 0xcc99cc, 0x66cccc, 0xcccccc,
            0x999999, 0xf2777a, 0x99cc99, 0xffcc66, 0x6699cc, 0xcc99cc, 0x66cccc, 0xffffff,
        ],
    ),
    named(
        "Tomorrow Night Bright",
        [
            0x000000, 0xd54e53, 0xb9ca4a, 0xe7c547, 0x7aa6da, 0xc397d8, 0x70c0b1, 0xeaeaea,
            0x969896, 0xd54e53, 0xb9ca4a, 0xe7c547, 0x7aa6da, 0xc397d8, 0x70c0b1, 0xffffff,
        ],
    ),
    named(
        "Tomorrow Night Blue",
        [
            0x002451, 0xff9da4, 0xd1f1a9, 0xffeead, 0xbbdaff, 0xebbbff, 0x99ffff, 0xffffff,
            0x7285b7, 0xff9da4, 0xd1f1a9, 0xffeead, 0xbbdaff, 0xebbbff, 0x99ffff, 0xffffff,
        ],
    ),
    named(
        "Solarized",
        [
            0x002b36, 0xdc322f, 0x859900, 0xb58900, 0x268bd2, 0xd33682, 0x2aa198, 0x839496,
            0x073642, 0xcb4b16, 0x586e75, 0x657b83, 0x93a1a1, 0x6c71c4, 0xeee8d5, 0xfdf6e3,
        ],
    ),
    named(
        "Solarized Light",
        [
            0xfdf6e3, 0xdc322f, 0x859900, 0xb58900, 0x268bd2, 0xd33682, 0x2aa198, 0x657b83,
            0xeee8d5, 0xcb4b16, 0x93a1a1, 0x839496, 0x586e75, 0x6c71c4, 0x073642, 0x002b36,
        ],
    ),
    named(
        "Monokai",
        [
            0x272822, 0xf92672, 0xa6e22e, 0xf4bf75, 0x66d9ef, 0xae81ff, 0xa1efe4, 0xf8f8f2,
            0x75715e, 0xf92672, 0xa6e22e, 0xf4bf75, 0x66d9ef, 0xae81ff, 0xa1efe4, 0xf9f8f5,
        ],
    ),
    named(
        "Campbell",
        [
            0x0c0c0c, 0xc50f1f, 0x13a10e, 0xc19c00, 0x0037da, 0x881798, 0x3a96dd, 0xcccccc,
            0x767676, 0xe74856, 0x16c60c, 0xf9f1a5, 0x3b78ff, 0xb4009e, 0x61d6d6, 0xf2f2f2,
        ],
    ),
];

/// Look up a palette by name.
///
/// Matching ignores ASCII case and surrounding whitespace, and accepts the
/// `<Name>` form ConEmu uses for its built-in schemes.
pub fn find_palette(name: &str) -> Option<&'static NamedPalette> {
    let wanted = normalize_name(name);
    CATALOG
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(wanted))
}

/// Names of every catalog entry, in catalog order.
pub fn palette_names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|entry| entry.name)
}

fn normalize_name(name: &str) -> &str {
    let trimmed = name.trim();
    trimmed
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{TerminalColor, PALETTE_SLOTS};
    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_are_unique() {
        let mut seen = HashSet::new();
        for name in palette_names() {
            assert!(
                seen.insert(name.to_ascii_lowercase()),
                "duplicate palette name {}",
                name
            );
        }
    }

    #[test]
    fn test_every_palette_has_sixteen_slots() {
        for entry in CATALOG {
            assert_eq!(entry.palette.iter().count(), PALETTE_SLOTS, "{}", entry.name);
        }
    }

    #[test]
    fn test_default_theme_names_resolve() {
        assert!(find_palette("Tomorrow").is_some());
        assert!(find_palette("Tomorrow Night").is_some());
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        let entry = find_palette("  tomorrow NIGHT ").map(|e| e.name);
        assert_eq!(entry, Some("Tomorrow Night"));
    }

    #[test]
    fn test_lookup_accepts_bracket_form() {
        let entry = find_palette("<Solarized Light>").map(|e| e.name);
        assert_eq!(entry, Some("Solarized Light"));
    }

    #[test]
    fn test_lookup_does_not_prefix_match() {
        // "Tomorrow Night" must not resolve to plain "Tomorrow" or vice versa
        assert_eq!(find_palette("Tomorrow").map(|e| e.name), Some("Tomorrow"));
        assert!(find_palette("Tomorrow Nigh").is_none());
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert!(find_palette("Not A Real Scheme").is_none());
        assert!(find_palette("").is_none());
    }

    #[test]
    fn test_tomorrow_night_background_and_foreground() {
        let palette = find_palette("Tomorrow Night").map(|e| &e.palette);
        let palette = palette.expect("catalog entry");
        assert_eq!(palette.get(0), Some(TerminalColor::from_rgb_hex(0x1d1f21)));
        assert_eq!(palette.get(7), Some(TerminalColor::from_rgb_hex(0xc5c8c6)));
    }
}
