//! Color-table patching for the terminal's XML settings document.
//!
//! ConEmu keeps its settings in a tree of `<key name="...">` elements with
//! `<value name="..." type="..." data="..."/>` leaves:
//!
//! ```xml
//! <key name="Software">
//!   <key name="ConEmu">
//!     <key name=".Vanilla">
//!       <value name="ColorTable00" type="dword" data="00211f1d"/>
//!       ...
//! ```
//!
//! Patching runs as three separate stages:
//!
//! 1. [`parse_document`] turns the text into an owned event list. Whitespace,
//!    comments and declarations are kept as they were.
//! 2. [`patch_color_table`] is a pure function from document + palette to a
//!    new document, rewriting only the `data` attribute of the 16 color slots.
//! 3. [`serialize_document`] writes the event list back out. Events that were
//!    not patched come out byte-for-byte as they were read.
//!
//! [`apply_palette`] composes the three around a read and a write of the
//! file. A document without a single color slot is refused rather than
//! rewritten. The write is a plain overwrite: a crash in the middle of it can
//! leave a truncated document behind.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::{debug, info, instrument, warn};

use crate::error::{AutoThemeError, Result};
use crate::palette::{ColorPalette, PALETTE_SLOTS};

/// Element names from the document root down to a color slot: `key/key/key/value`.
const SLOT_ANCESTORS: [&[u8]; 3] = [b"key", b"key", b"key"];
const SLOT_ELEMENT: &[u8] = b"value";
const SLOT_NAME_PREFIX: &str = "ColorTable";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A parsed settings document.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsDocument {
    events: Vec<Event<'static>>,
}

/// Output of [`patch_color_table`].
#[derive(Debug, Clone, PartialEq)]
pub struct PatchedDocument {
    pub document: SettingsDocument,
    /// Slot index of every field written, in document order.
    pub slots_written: Vec<usize>,
}

/// What [`apply_palette`] did to the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub path: PathBuf,
    pub fields_written: usize,
}

// ============================================================================
// Stage 1: parse
// ============================================================================

/// Parse document text into an owned event list.
///
/// Rejects text that is not well-formed: unbalanced tags, bad attribute
/// syntax, or a stray end tag.
pub fn parse_document(text: &str) -> std::result::Result<SettingsDocument, String> {
    let mut reader = Reader::from_str(text);
    let mut events = Vec::new();
    let mut depth: usize = 0;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at byte {}: {}", reader.buffer_position(), e))?;
        match &event {
            Event::Eof => break,
            Event::Start(start) => {
                check_attributes(start)?;
                depth += 1;
            }
            Event::Empty(start) => check_attributes(start)?,
            Event::End(end) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    format!(
                        "unexpected end tag </{}>",
                        String::from_utf8_lossy(end.name().as_ref())
                    )
                })?;
            }
            _ => {}
        }
        events.push(event.into_owned());
    }

    if depth != 0 {
        return Err(format!("{} element(s) left unclosed", depth));
    }
    Ok(SettingsDocument { events })
}

fn check_attributes(start: &BytesStart<'_>) -> std::result::Result<(), String> {
    for attr in start.attributes() {
        attr.map_err(|e| {
            format!(
                "bad attribute on <{}>: {}",
                String::from_utf8_lossy(start.name().as_ref()),
                e
            )
        })?;
    }
    Ok(())
}

// ============================================================================
// Stage 2: transform
// ============================================================================

/// Rewrite the `data` attribute of every color slot with the palette color.
///
/// A slot is a `value` element at `key/key/key/value` below the document
/// root whose `name` is `ColorTable` followed by a decimal index 0-15.
/// ConEmu writes two-digit indices (`ColorTable07`); `ColorTable7` is
/// accepted as well. Nothing else in the document changes.
pub fn patch_color_table(document: &SettingsDocument, palette: &ColorPalette) -> PatchedDocument {
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut events = Vec::with_capacity(document.events.len());
    let mut slots_written = Vec::with_capacity(PALETTE_SLOTS);

    for event in &document.events {
        match event {
            Event::Start(start) => {
                let patched = patch_slot(start, &path, palette, &mut slots_written);
                path.push(start.name().as_ref().to_vec());
                events.push(Event::Start(patched.unwrap_or_else(|| start.clone())));
            }
            Event::Empty(start) => {
                let patched = patch_slot(start, &path, palette, &mut slots_written);
                events.push(Event::Empty(patched.unwrap_or_else(|| start.clone())));
            }
            Event::End(_) => {
                path.pop();
                events.push(event.clone());
            }
            other => events.push(other.clone()),
        }
    }

    PatchedDocument {
        document: SettingsDocument { events },
        slots_written,
    }
}

fn patch_slot(
    start: &BytesStart<'static>,
    ancestors: &[Vec<u8>],
    palette: &ColorPalette,
    slots_written: &mut Vec<usize>,
) -> Option<BytesStart<'static>> {
    if start.name().as_ref() != SLOT_ELEMENT || !is_slot_path(ancestors) {
        return None;
    }
    let index = start
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"name")
        .and_then(|attr| color_slot_index(&attr.value))?;
    let color = palette.get(index)?;
    slots_written.push(index);
    Some(with_data(start, &color.to_data_string()))
}

fn is_slot_path(ancestors: &[Vec<u8>]) -> bool {
    ancestors.len() == SLOT_ANCESTORS.len()
        && ancestors
            .iter()
            .zip(SLOT_ANCESTORS)
            .all(|(actual, expected)| actual.as_slice() == expected)
}

/// `ColorTable<N>` -> `N` for N in 0..16.
fn color_slot_index(name: &[u8]) -> Option<usize> {
    let digits = std::str::from_utf8(name).ok()?.strip_prefix(SLOT_NAME_PREFIX)?;
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<usize>().ok().filter(|i| *i < PALETTE_SLOTS)
}

/// Copy of `start` with `data` replaced (or appended if absent).
fn with_data(start: &BytesStart<'static>, data: &str) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut patched = BytesStart::new(name);
    let mut replaced = false;

    // Attributes were validated while parsing
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == b"data" {
            patched.push_attribute(Attribute {
                key: attr.key,
                value: Cow::Owned(data.as_bytes().to_vec()),
            });
            replaced = true;
        } else {
            patched.push_attribute(Attribute {
                key: attr.key,
                value: double_quotable(attr.value),
            });
        }
    }
    if !replaced {
        patched.push_attribute(("data", data));
    }
    patched
}

/// The writer always emits `"`, so a literal `"` from a single-quoted value
/// has to become `&quot;`.
fn double_quotable(value: Cow<'_, [u8]>) -> Cow<'_, [u8]> {
    if !value.contains(&b'"') {
        return value;
    }
    let mut escaped = Vec::with_capacity(value.len() + 5);
    for &b in value.iter() {
        if b == b'"' {
            escaped.extend_from_slice(b"&quot;");
        } else {
            escaped.push(b);
        }
    }
    Cow::Owned(escaped)
}

// ============================================================================
// Stage 3: serialize
// ============================================================================

/// Write the document back to text.
pub fn serialize_document(document: &SettingsDocument) -> std::result::Result<String, String> {
    let mut writer = Writer::new(Vec::new());
    for event in &document.events {
        writer
            .write_event(event.clone())
            .map_err(|e| format!("serialize failed: {}", e))?;
    }
    String::from_utf8(writer.into_inner()).map_err(|e| format!("serialized text is not UTF-8: {}", e))
}

// ============================================================================
// File-level operation
// ============================================================================

/// Apply `palette` to the color table of the document at `path`.
///
/// The document must be 7-bit clean (an optional UTF-8 byte-order mark is
/// kept as-is); anything else is refused with
/// [`AutoThemeError::Encoding`] before the file is touched.
#[instrument(name = "apply_palette", skip(path, palette), fields(path = %path.display()))]
pub fn apply_palette(path: &Path, palette: &ColorPalette) -> Result<PatchReport> {
    let bytes = std::fs::read(path).map_err(|source| AutoThemeError::ScratchIo {
        path: path.to_path_buf(),
        source,
    })?;

    let (bom, body) = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => (UTF8_BOM, rest),
        None => (&[][..], bytes.as_slice()),
    };

    if let Some(offset) = body.iter().position(|b| !b.is_ascii()) {
        return Err(AutoThemeError::Encoding {
            path: path.to_path_buf(),
            offset: offset + bom.len(),
            byte: body.get(offset).copied().unwrap_or_default(),
        });
    }
    let text = String::from_utf8_lossy(body);

    let xml_error = |message: String| AutoThemeError::XmlParse {
        path: path.to_path_buf(),
        message,
    };
    let document = parse_document(&text).map_err(xml_error)?;
    let patched = patch_color_table(&document, palette);

    let fields_written = patched.slots_written.len();
    if fields_written == 0 {
        warn!(expected = PALETTE_SLOTS, "No color table fields found, document left as is");
        return Err(xml_error(
            "no ColorTable values at key/key/key/value".to_string(),
        ));
    }
    let output = serialize_document(&patched.document).map_err(xml_error)?;

    if fields_written != PALETTE_SLOTS {
        warn!(
            fields_written,
            expected = PALETTE_SLOTS,
            "Color table field count differs from palette size"
        );
    } else {
        debug!(fields_written, "Color table patched in memory");
    }

    let mut contents = Vec::with_capacity(bom.len() + output.len());
    contents.extend_from_slice(bom);
    contents.extend_from_slice(output.as_bytes());
    std::fs::write(path, contents).map_err(|source| AutoThemeError::ScratchIo {
        path: path.to_path_buf(),
        source,
    })?;

    info!(fields_written, "Settings document rewritten");
    Ok(PatchReport {
        path: path.to_path_buf(),
        fields_written,
    })
}

#[cfg(test)]
#[path = "settings_xml_tests.rs"]
mod tests;
