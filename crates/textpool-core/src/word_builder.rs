//! Coalescing positioned glyphs into words.
//!
//! [`WordBuilder`] consumes glyphs in content stream order and decides for
//! each one whether it continues the current word. It is a two-state
//! machine: either no word is open, or one word is being built. Finished
//! words go to the line pool of their rotation class, or to a stream-order
//! list when pooling is disabled.

use crate::geometry::BBox;
use crate::line_pool::PagePools;
use crate::options::{ExtractOptions, WordTolerances};
use crate::text::{PositionedChar, Rotation, WritingMode, is_word_break};
use crate::word::Word;

/// Advance below which, in both axes, a glyph counts as tiny.
const TINY_ADVANCE: f64 = 3.0;
/// Font sizes closer than this are the same size.
const FONT_SIZE_EPSILON: f64 = 1e-3;

/// Counters describing what the word builder did with its input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WordBuilderStats {
    /// Glyphs offered to the builder.
    pub chars_seen: usize,
    /// Glyphs that ended up in a word.
    pub chars_accepted: usize,
    /// Whitespace and control glyphs used only as word breaks.
    pub whitespace: usize,
    pub dropped_non_finite: usize,
    pub dropped_off_page: usize,
    /// Tiny glyphs seen, including dropped ones.
    pub tiny_chars: usize,
    /// Tiny glyphs dropped after the cap was reached.
    pub dropped_tiny: usize,
    /// Words handed to the pools (or the stream-order list).
    pub words: usize,
}

/// A word that is still accepting glyphs.
#[derive(Debug)]
struct OpenWord {
    chars: Vec<PositionedChar>,
    edges: Vec<f64>,
    base: f64,
    font_size: f64,
    rotation: Rotation,
    writing_mode: WritingMode,
    /// Furthest reading-order extent reached so far.
    pri_max: f64,
}

impl OpenWord {
    fn new(rotation: Rotation, base: f64, font_size: f64, writing_mode: WritingMode) -> Self {
        Self {
            chars: Vec::new(),
            edges: Vec::new(),
            base,
            font_size,
            rotation,
            writing_mode,
            pri_max: f64::NEG_INFINITY,
        }
    }

    fn axis(&self, x: f64, y: f64) -> f64 {
        match self.rotation {
            Rotation::Deg0 | Rotation::Deg180 => x,
            Rotation::Deg90 | Rotation::Deg270 => y,
        }
    }

    fn push(&mut self, ch: PositionedChar) {
        let start = self.axis(ch.x, ch.y);
        let end = self.axis(ch.x + ch.dx, ch.y + ch.dy);
        match self.edges.last_mut() {
            Some(last) => *last = start,
            None => self.edges.push(start),
        }
        self.edges.push(end);
        let r = self.rotation;
        self.pri_max = self
            .pri_max
            .max(r.primary(ch.x, ch.y))
            .max(r.primary(ch.x + ch.dx, ch.y + ch.dy));
        self.chars.push(ch);
    }

    /// Reading-order position of the most recent glyph's origin.
    fn last_origin(&self) -> Option<f64> {
        self.chars.last().map(|c| self.rotation.primary(c.x, c.y))
    }

    fn finish(self, order: usize) -> Option<Word> {
        Word::from_parts(
            self.chars,
            self.edges,
            self.base,
            self.font_size,
            self.rotation,
            self.writing_mode,
            order,
        )
    }
}

/// Everything the builder produced for one page.
#[derive(Debug, Clone)]
pub struct BuiltWords {
    /// Pooled words; empty when stream order was requested.
    pub pools: PagePools,
    /// Words in emission order; only filled when stream order was requested.
    pub raw: Vec<Word>,
    pub stats: WordBuilderStats,
}

/// Stateful glyph-to-word coalescer for one page.
#[derive(Debug)]
pub struct WordBuilder {
    tolerances: WordTolerances,
    page: BBox,
    max_tiny_chars: usize,
    raw_order: bool,
    current: Option<OpenWord>,
    last_char_overlap: bool,
    pools: PagePools,
    raw: Vec<Word>,
    stats: WordBuilderStats,
}

impl WordBuilder {
    /// Create a builder for a page with the given device-space bounds.
    pub fn new(page: BBox, options: &ExtractOptions) -> Self {
        Self {
            tolerances: options.word.clone(),
            page,
            max_tiny_chars: options.max_tiny_chars,
            raw_order: options.raw_order,
            current: None,
            last_char_overlap: false,
            pools: PagePools::new(options.pool_quantum),
            raw: Vec::new(),
            stats: WordBuilderStats::default(),
        }
    }

    pub fn stats(&self) -> &WordBuilderStats {
        &self.stats
    }

    /// Whether the tiny-glyph cap has started dropping input.
    pub fn tiny_limit_reached(&self) -> bool {
        self.stats.tiny_chars > self.max_tiny_chars
    }

    /// Whether a word is currently open.
    pub fn is_building(&self) -> bool {
        self.current.is_some()
    }

    /// Feed one glyph.
    pub fn add_char(&mut self, ch: PositionedChar) {
        self.stats.chars_seen += 1;

        if !ch.is_finite() {
            self.stats.dropped_non_finite += 1;
            return;
        }
        if self.is_off_page(&ch) {
            self.stats.dropped_off_page += 1;
            return;
        }
        if ch.dx.abs() < TINY_ADVANCE && ch.dy.abs() < TINY_ADVANCE {
            self.stats.tiny_chars += 1;
            if self.stats.tiny_chars > self.max_tiny_chars {
                self.stats.dropped_tiny += 1;
                return;
            }
        }
        if is_word_break(ch.unicode) {
            self.stats.whitespace += 1;
            self.end_word();
            return;
        }

        if let Some(word) = &self.current {
            let overlap = self.breaks_word(word, &ch);
            if overlap.breaks {
                self.end_word();
            }
            self.last_char_overlap = overlap.duplicate;
        } else {
            self.last_char_overlap = false;
        }

        let mut ch = ch;
        let rotation = self
            .current
            .as_ref()
            .map_or(ch.rotation, |word| word.rotation);
        if rotation.primary(ch.dx, ch.dy) < 0.0 {
            // Mirrored run: restart at the far edge with the advance flipped.
            self.end_word();
            ch.x += ch.dx;
            ch.y += ch.dy;
            ch.dx = -ch.dx;
            ch.dy = -ch.dy;
        }

        let word = self.current.get_or_insert_with(|| {
            OpenWord::new(
                ch.rotation,
                ch.rotation.base(ch.x, ch.y),
                ch.font_size,
                ch.writing_mode,
            )
        });
        word.push(ch);
        self.stats.chars_accepted += 1;
    }

    /// Close the current word, if any, and hand it over.
    pub fn end_word(&mut self) {
        let Some(word) = self.current.take() else {
            return;
        };
        let Some(word) = word.finish(self.stats.words) else {
            return;
        };
        self.stats.words += 1;
        if self.raw_order {
            self.raw.push(word);
        } else {
            self.pools.add_word(word);
        }
    }

    /// Close any open word and return the page's words.
    pub fn finish(mut self) -> BuiltWords {
        self.end_word();
        BuiltWords {
            pools: self.pools,
            raw: self.raw,
            stats: self.stats,
        }
    }

    fn is_off_page(&self, ch: &PositionedChar) -> bool {
        let (x_lo, x_hi) = ordered(ch.x, ch.x + ch.dx);
        let (y_lo, y_hi) = ordered(ch.y, ch.y + ch.dy);
        x_hi < self.page.x0
            || x_lo > self.page.x1
            || y_hi < self.page.y0
            || y_lo > self.page.y1
            || ch.dx.abs() > self.page.width()
            || ch.dy.abs() > self.page.height()
    }

    /// Continuity test of `ch` against the open word.
    fn breaks_word(&self, word: &OpenWord, ch: &PositionedChar) -> BreakDecision {
        let tol = &self.tolerances;
        let r = word.rotation;
        let fs = word.font_size;
        let base = r.base(ch.x, ch.y);
        let origin = r.primary(ch.x, ch.y);
        let sp = origin - word.pri_max;
        let delta = word.last_origin().map_or(f64::INFINITY, |last| origin - last);
        let base_delta = (base - word.base).abs();

        let duplicate =
            delta.abs() < tol.dup_max_pri_delta * fs && base_delta < tol.dup_max_sec_delta * fs;
        let breaks = duplicate
            || self.last_char_overlap
            || sp < -tol.min_dup_break_overlap * fs
            || sp > tol.min_word_break_space * fs
            || base_delta > tol.max_base_delta
            || (ch.font_size - fs).abs() > FONT_SIZE_EPSILON
            || ch.writing_mode != word.writing_mode
            || ch.rotation != r;
        BreakDecision { breaks, duplicate }
    }
}

struct BreakDecision {
    breaks: bool,
    duplicate: bool,
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}
