//! Finished words.

use crate::geometry::BBox;
use crate::text::{PositionedChar, Rotation, WritingMode};

/// Ascent above the baseline, as a fraction of the font size.
pub const ASCENT: f64 = 0.75;
/// Descent below the baseline, as a fraction of the font size (negative).
pub const DESCENT: f64 = -0.25;

/// A run of glyphs that share a baseline, font size, rotation and
/// writing mode with no word-sized gap between them.
///
/// Always holds at least one glyph. Immutable once the word builder
/// hands it over.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Word {
    /// Concatenated text of the glyphs.
    pub text: String,
    /// Glyphs in stream order.
    pub chars: Vec<PositionedChar>,
    /// Device-space bounding box.
    pub bbox: BBox,
    /// Baseline coordinate: y for rotations 0 and 2, x for 1 and 3.
    pub base: f64,
    pub font_size: f64,
    pub rotation: Rotation,
    pub writing_mode: WritingMode,
    /// Glyph boundaries along the writing axis; `chars.len() + 1` entries.
    pub edges: Vec<f64>,
    /// Emission order among the page's words.
    pub order: usize,
}

impl Word {
    /// Assemble a word from glyphs and their boundaries.
    ///
    /// Returns `None` for an empty glyph list or a mismatched edge list.
    pub fn from_parts(
        chars: Vec<PositionedChar>,
        edges: Vec<f64>,
        base: f64,
        font_size: f64,
        rotation: Rotation,
        writing_mode: WritingMode,
        order: usize,
    ) -> Option<Self> {
        if chars.is_empty() || edges.len() != chars.len() + 1 {
            return None;
        }
        let text: String = chars.iter().map(|c| c.unicode).collect();
        let bbox = word_bbox(&edges, base, font_size, rotation, writing_mode);
        Some(Self {
            text,
            chars,
            bbox,
            base,
            font_size,
            rotation,
            writing_mode,
            edges,
            order,
        })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn signed(&self, v: f64) -> f64 {
        match self.rotation {
            Rotation::Deg0 | Rotation::Deg90 => v,
            Rotation::Deg180 | Rotation::Deg270 => -v,
        }
    }

    /// Leading extent along the writing direction, in reading-order coordinates.
    pub fn pri_start(&self) -> f64 {
        self.edges
            .iter()
            .map(|&e| self.signed(e))
            .fold(f64::INFINITY, f64::min)
    }

    /// Trailing extent along the writing direction, in reading-order coordinates.
    pub fn pri_end(&self) -> f64 {
        self.edges
            .iter()
            .map(|&e| self.signed(e))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Average glyph advance; half the font size for zero-width words.
    pub fn avg_char_width(&self) -> f64 {
        let width = self.pri_end() - self.pri_start();
        if width > 0.0 && !self.chars.is_empty() {
            width / self.chars.len() as f64
        } else {
            self.font_size * 0.5
        }
    }

    pub fn first_char(&self) -> Option<char> {
        self.text.chars().next()
    }

    pub fn last_char(&self) -> Option<char> {
        self.text.chars().next_back()
    }
}

/// Bounding box from the writing-axis edges and the cross-axis font extent.
fn word_bbox(
    edges: &[f64],
    base: f64,
    font_size: f64,
    rotation: Rotation,
    writing_mode: WritingMode,
) -> BBox {
    let lo = edges.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = edges.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (c0, c1) = match writing_mode {
        WritingMode::Vertical => (base - font_size * 0.5, base + font_size * 0.5),
        WritingMode::Horizontal => match rotation {
            Rotation::Deg0 => (base + DESCENT * font_size, base + ASCENT * font_size),
            Rotation::Deg90 => (base - ASCENT * font_size, base - DESCENT * font_size),
            Rotation::Deg180 => (base - ASCENT * font_size, base - DESCENT * font_size),
            Rotation::Deg270 => (base + DESCENT * font_size, base + ASCENT * font_size),
        },
    };
    match rotation {
        Rotation::Deg0 | Rotation::Deg180 => BBox::new(lo, c0, hi, c1),
        Rotation::Deg90 | Rotation::Deg270 => BBox::new(c0, lo, c1, hi),
    }
}
