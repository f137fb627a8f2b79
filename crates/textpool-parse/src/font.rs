//! Font model seen by the interpreter.
//!
//! Font programs are never parsed here. A [`Font`] only answers the two
//! questions text positioning needs: what Unicode text a character code
//! stands for, and how wide its glyph is. [`SimpleFont`] covers fonts
//! described by a width table and an optional ToUnicode map; callers with
//! richer font data implement [`Font`] themselves.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use encoding_rs::{UTF_16BE, WINDOWS_1252};

/// A font resource as used by text-showing operators.
///
/// Shared read-only across pages, hence `Send + Sync`.
pub trait Font: Send + Sync {
    /// Resource name or base font name, for diagnostics.
    fn name(&self) -> &str;

    /// Unicode text for the raw bytes of one character code.
    fn decode_to_unicode(&self, raw: &[u8]) -> String;

    /// Glyph width in thousandths of an em, if known.
    fn width_of(&self, code: u32) -> Option<f64>;

    /// Whether character codes are two bytes wide.
    fn is_identity_encoding(&self) -> bool;

    /// Whether glyphs advance downward instead of rightward.
    fn is_vertical(&self) -> bool {
        false
    }

    /// Whether `code` decodes through a known mapping rather than a guess.
    fn has_unicode_mapping(&self, _code: u32) -> bool {
        true
    }
}

/// Character code from its big-endian bytes.
pub fn code_from_bytes(raw: &[u8]) -> u32 {
    raw.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

/// A font described by a width table and optional ToUnicode entries.
///
/// Codes without a ToUnicode entry decode as WinAnsi for one-byte fonts
/// and as UTF-16BE for identity-encoded fonts.
#[derive(Debug, Clone, Default)]
pub struct SimpleFont {
    name: String,
    first_char: u32,
    widths: Vec<f64>,
    overrides: HashMap<u32, f64>,
    missing_width: Option<f64>,
    to_unicode: HashMap<u32, String>,
    identity: bool,
    vertical: bool,
}

impl SimpleFont {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the width table: `widths[i]` is the width of code `first_char + i`.
    pub fn with_widths(mut self, first_char: u32, widths: Vec<f64>) -> Self {
        self.first_char = first_char;
        self.widths = widths;
        self
    }

    /// Set the width of a single code, taking precedence over the table.
    pub fn with_width(mut self, code: u32, width: f64) -> Self {
        self.overrides.insert(code, width);
        self
    }

    /// Width for codes outside the table.
    pub fn with_missing_width(mut self, width: f64) -> Self {
        self.missing_width = Some(width);
        self
    }

    /// Map a code to Unicode text.
    pub fn with_to_unicode(mut self, code: u32, text: impl Into<String>) -> Self {
        self.to_unicode.insert(code, text.into());
        self
    }

    /// Read two-byte character codes.
    pub fn with_identity_encoding(mut self) -> Self {
        self.identity = true;
        self
    }

    /// Advance glyphs downward.
    pub fn with_vertical_writing(mut self) -> Self {
        self.vertical = true;
        self
    }
}

impl Font for SimpleFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode_to_unicode(&self, raw: &[u8]) -> String {
        if let Some(text) = self.to_unicode.get(&code_from_bytes(raw)) {
            return text.clone();
        }
        let encoding = if self.identity && raw.len() == 2 {
            UTF_16BE
        } else {
            WINDOWS_1252
        };
        let (text, _) = encoding.decode_without_bom_handling(raw);
        text.into_owned()
    }

    fn width_of(&self, code: u32) -> Option<f64> {
        if let Some(&w) = self.overrides.get(&code) {
            return Some(w);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .or(self.missing_width)
    }

    fn is_identity_encoding(&self) -> bool {
        self.identity
    }

    fn is_vertical(&self) -> bool {
        self.vertical
    }

    /// One-byte codes always have WinAnsi; two-byte codes need a ToUnicode entry.
    fn has_unicode_mapping(&self, code: u32) -> bool {
        !self.identity || self.to_unicode.contains_key(&code)
    }
}

/// Stand-in for a font name with no entry in the [`FontMap`].
///
/// Decodes every byte as the Unicode scalar of the same value and reports
/// no widths, so positioning falls back to the width heuristic.
#[derive(Debug, Clone)]
pub struct FallbackFont {
    name: String,
}

impl FallbackFont {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Font for FallbackFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode_to_unicode(&self, raw: &[u8]) -> String {
        raw.iter().map(|&b| char::from(b)).collect()
    }

    fn width_of(&self, _code: u32) -> Option<f64> {
        None
    }

    fn is_identity_encoding(&self) -> bool {
        false
    }
}

/// Font resources of a page, keyed by the name used in `Tf`.
#[derive(Clone, Default)]
pub struct FontMap {
    fonts: HashMap<String, Arc<dyn Font>>,
}

impl FontMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a font under a resource name, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, font: impl Font + 'static) {
        self.fonts.insert(name.into(), Arc::new(font));
    }

    /// Register an already shared font.
    pub fn insert_shared(&mut self, name: impl Into<String>, font: Arc<dyn Font>) {
        self.fonts.insert(name.into(), font);
    }

    /// Builder form of [`FontMap::insert`].
    pub fn with_font(mut self, name: impl Into<String>, font: impl Font + 'static) -> Self {
        self.insert(name, font);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Font>> {
        self.fonts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Resource names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fonts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for FontMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontMap").field("fonts", &self.names()).finish()
    }
}
