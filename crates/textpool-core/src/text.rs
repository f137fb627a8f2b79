//! Positioned glyphs and the small vocabulary shared by the coalescing
//! stages: rotation classes, writing modes and character classes.

use crate::geometry::Transform;

/// Quarter-turn writing direction of a glyph or word in device space.
///
/// | class | writes toward |
/// |-------|---------------|
/// | `Deg0`   | +x |
/// | `Deg90`  | +y |
/// | `Deg180` | −x |
/// | `Deg270` | −y |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    Deg0 = 0,
    Deg90 = 1,
    Deg180 = 2,
    Deg270 = 3,
}

impl Rotation {
    /// All classes in serialization order.
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Rotation class from its index; values wrap modulo 4.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index & 3]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Rotate by `quarters` further quarter turns.
    pub fn turned(self, quarters: usize) -> Self {
        Self::from_index(self.index() + quarters)
    }

    /// Classify the rotation component of a glyph-to-device transform.
    ///
    /// The dominant diagonal decides between the horizontal classes and
    /// the vertical ones; the sign of the dominant entries picks the
    /// direction.
    pub fn from_transform(m: &Transform) -> Self {
        if (m.a * m.d).abs() >= (m.b * m.c).abs() {
            if m.a > 0.0 || m.d > 0.0 {
                Rotation::Deg0
            } else {
                Rotation::Deg180
            }
        } else if m.b > 0.0 || m.c < 0.0 {
            Rotation::Deg90
        } else {
            Rotation::Deg270
        }
    }

    /// Signed position along the writing direction; grows in reading order.
    pub fn primary(self, x: f64, y: f64) -> f64 {
        match self {
            Rotation::Deg0 => x,
            Rotation::Deg90 => y,
            Rotation::Deg180 => -x,
            Rotation::Deg270 => -y,
        }
    }

    /// Position across the writing direction (the baseline coordinate).
    pub fn base(self, x: f64, y: f64) -> f64 {
        match self {
            Rotation::Deg0 | Rotation::Deg180 => y,
            Rotation::Deg90 | Rotation::Deg270 => x,
        }
    }

    /// Whether successive lines have decreasing baseline coordinates.
    pub fn lines_descend(self) -> bool {
        matches!(self, Rotation::Deg0 | Rotation::Deg270)
    }
}

/// Writing mode of the font that produced a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WritingMode {
    #[default]
    Horizontal,
    Vertical,
}

/// A decoded glyph with its device-space origin and advance.
///
/// Produced once per Unicode scalar by the glyph positioner and consumed
/// by the word builder.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionedChar {
    /// Decoded Unicode scalar.
    pub unicode: char,
    /// Raw character code from the content stream.
    pub code: u32,
    /// Position in the page's glyph stream.
    pub index: usize,
    /// Device-space origin.
    pub x: f64,
    pub y: f64,
    /// Device-space advance vector.
    pub dx: f64,
    pub dy: f64,
    /// Font size scaled into device space.
    pub font_size: f64,
    /// Rotation class of the glyph's transform.
    pub rotation: Rotation,
    pub writing_mode: WritingMode,
    /// Name of the font resource that drew the glyph.
    pub font_name: String,
}

impl PositionedChar {
    /// Trailing device coordinate along the glyph's writing axis.
    pub fn edge(&self) -> f64 {
        match self.rotation {
            Rotation::Deg0 | Rotation::Deg180 => self.x + self.dx,
            Rotation::Deg90 | Rotation::Deg270 => self.y + self.dy,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.dx.is_finite()
            && self.dy.is_finite()
            && self.font_size.is_finite()
    }
}

/// Returns `true` if the character is a CJK ideograph, kana, hangul or bopomofo.
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'     // CJK Unified Ideographs
        | '\u{3400}'..='\u{4DBF}'   // Extension A
        | '\u{F900}'..='\u{FAFF}'   // Compatibility Ideographs
        | '\u{3040}'..='\u{309F}'   // Hiragana
        | '\u{30A0}'..='\u{30FF}'   // Katakana
        | '\u{AC00}'..='\u{D7AF}'   // Hangul Syllables
        | '\u{1100}'..='\u{11FF}'   // Hangul Jamo
        | '\u{3100}'..='\u{312F}'   // Bopomofo
        | '\u{2E80}'..='\u{2EFF}'   // Radicals Supplement
        | '\u{2F00}'..='\u{2FDF}'   // Kangxi Radicals
        | '\u{20000}'..='\u{2A6DF}' // Extension B
    )
}

/// Returns `true` for characters normally drawn one em wide: CJK plus
/// CJK punctuation and full-width forms.
pub fn is_wide(c: char) -> bool {
    is_cjk(c)
        || matches!(c,
            '\u{3000}'..='\u{303F}'   // CJK Symbols and Punctuation
            | '\u{FF01}'..='\u{FF60}' // Fullwidth Forms
            | '\u{FFE0}'..='\u{FFE6}'
        )
}

/// Sentence punctuation after which a tight gap still reads as a space.
pub fn is_sentence_punct(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?')
}

/// Characters that always terminate a word and never become part of one.
pub fn is_word_break(c: char) -> bool {
    c.is_whitespace() || c.is_control()
}
