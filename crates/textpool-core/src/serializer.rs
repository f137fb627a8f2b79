//! Rendering pooled words as text.
//!
//! Three output modes share the same line grouping:
//!
//! - **plain**: lines in reading order, one space where the gap between two
//!   words reads as a space, a blank line between paragraphs;
//! - **layout**: horizontal and vertical gaps become runs of spaces and blank
//!   lines on a fixed character grid;
//! - **columns**: plain text per detected column.
//!
//! A fourth, raw mode renders words in content stream order.

use crate::columns::{ColumnDetector, ColumnLayout};
use crate::geometry::BBox;
use crate::line_pool::{LineOptions, PagePools, TextLine};
use crate::options::ExtractOptions;
use crate::text::{Rotation, is_cjk, is_sentence_punct};
use crate::word::Word;

/// Line height as a multiple of the median font size when not configured.
const AUTO_LINE_HEIGHT: f64 = 1.2;

/// Font size assumed for the layout grid when no word has a positive size.
const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Renders words and lines according to [`ExtractOptions`].
#[derive(Debug, Clone)]
pub struct TextSerializer<'a> {
    options: &'a ExtractOptions,
    lines: LineOptions,
}

impl<'a> TextSerializer<'a> {
    pub fn new(options: &'a ExtractOptions) -> Self {
        Self {
            options,
            lines: LineOptions::from(options),
        }
    }

    /// Plain text of all pools, rotation 0 first.
    pub fn plain(&self, pools: &PagePools) -> String {
        let blocks: Vec<String> = pools
            .iter()
            .map(|pool| self.lines_to_text(&pool.lines(&self.lines)))
            .filter(|b| !b.is_empty())
            .collect();
        blocks.join("\n\n")
    }

    /// Layout-preserving text of all pools.
    ///
    /// Each rotation is laid out in its own reading frame relative to
    /// `page`; blocks for different rotations are separated by a blank line.
    pub fn layout(&self, pools: &PagePools, page: &BBox) -> String {
        let grid = self.grid(pools);
        let blocks: Vec<String> = pools
            .iter()
            .map(|pool| self.layout_lines(&pool.lines(&self.lines), pool.rotation(), page, grid))
            .filter(|b| !b.is_empty())
            .collect();
        blocks.join("\n\n")
    }

    /// Detect columns among the upright lines and render them.
    pub fn columns(&self, pools: &PagePools, page: &BBox) -> String {
        let detector = ColumnDetector::new(self.options.columns.clone());
        let upright = pools.pool(Rotation::Deg0).lines(&self.lines);
        let layout = detector.detect(upright, page.width());
        let mut blocks = vec![self.column_text(&layout)];
        blocks.extend(
            pools
                .iter()
                .filter(|p| p.rotation() != Rotation::Deg0)
                .map(|pool| self.lines_to_text(&pool.lines(&self.lines))),
        );
        let blocks: Vec<String> = blocks.into_iter().filter(|b| !b.is_empty()).collect();
        blocks.join("\n\n")
    }

    /// Plain text per column, each under a `[column N]` label when the page
    /// has more than one column.
    pub fn column_text(&self, layout: &ColumnLayout) -> String {
        let labelled = layout.columns.len() > 1;
        let blocks: Vec<String> = layout
            .columns
            .iter()
            .enumerate()
            .filter(|(_, col)| !col.lines.is_empty())
            .map(|(i, col)| {
                let body = self.lines_to_text(&col.lines);
                if labelled {
                    format!("[column {}]\n{body}", i + 1)
                } else {
                    body
                }
            })
            .collect();
        blocks.join("\n\n")
    }

    /// Words in stream order; a newline wherever the baseline or rotation changes.
    pub fn raw(&self, words: &[Word]) -> String {
        let mut out = String::new();
        let mut prev: Option<&Word> = None;
        for word in words {
            if let Some(p) = prev {
                let size = p.font_size.max(word.font_size);
                if p.rotation != word.rotation
                    || (p.base - word.base).abs() > self.options.line_tolerance * size
                {
                    out.push('\n');
                } else if word.pri_start() < p.pri_start() || self.needs_space(p, word) {
                    out.push(' ');
                }
            }
            out.push_str(&word.text);
            prev = Some(word);
        }
        out
    }

    /// Lines joined by newlines, with a blank line at paragraph-sized gaps.
    pub fn lines_to_text(&self, lines: &[TextLine]) -> String {
        let mut out = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                let prev = &lines[i - 1];
                out.push('\n');
                let size = prev.font_size.max(line.font_size);
                if (line.base - prev.base).abs() > self.options.paragraph_gap * size {
                    out.push('\n');
                }
            }
            out.push_str(&self.line_text(line));
        }
        out
    }

    /// One line's words with reconstructed spaces.
    pub fn line_text(&self, line: &TextLine) -> String {
        let mut out = String::new();
        for (i, word) in line.words.iter().enumerate() {
            if i > 0 && self.needs_space(&line.words[i - 1], word) {
                out.push(' ');
            }
            out.push_str(&word.text);
        }
        out
    }

    /// Whether the gap between two neighbouring words reads as a space.
    ///
    /// The gap is measured in units of the left word's average glyph width.
    /// Tight gaps glue, wide gaps split, and in between only a gap after
    /// sentence punctuation followed by a letter or digit becomes a space.
    /// Two CJK glyphs are never separated.
    pub fn needs_space(&self, prev: &Word, next: &Word) -> bool {
        let gap = next.pri_start() - prev.pri_end();
        let ratio = gap / prev.avg_char_width();
        let spacing = &self.options.spacing;
        if ratio.is_nan() || ratio < spacing.merge_below {
            return false;
        }
        let (Some(a), Some(b)) = (prev.last_char(), next.first_char()) else {
            return false;
        };
        if is_cjk(a) && is_cjk(b) {
            return false;
        }
        ratio > spacing.split_above || (is_sentence_punct(a) && b.is_alphanumeric())
    }

    /// Cell width and line height for layout mode.
    fn grid(&self, pools: &PagePools) -> (f64, f64) {
        let layout = &self.options.layout;
        let mut sizes: Vec<f64> = pools.words().map(|w| w.font_size).collect();
        sizes.sort_by(f64::total_cmp);
        let median_size = sizes
            .get(sizes.len() / 2)
            .copied()
            .filter(|&s| s.is_finite() && s > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE);

        let cell = layout.cell_width.unwrap_or_else(|| {
            let (width, count) = pools.words().fold((0.0, 0usize), |(w, n), word| {
                (w + (word.pri_end() - word.pri_start()).max(0.0), n + word.len())
            });
            if width > 0.0 && count > 0 {
                width / count as f64
            } else {
                median_size * 0.5
            }
        });
        let height = layout
            .line_height
            .unwrap_or(median_size * AUTO_LINE_HEIGHT);
        let usable = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        (
            usable(cell, median_size * 0.5),
            usable(height, median_size * AUTO_LINE_HEIGHT),
        )
    }

    fn layout_lines(
        &self,
        lines: &[TextLine],
        rotation: Rotation,
        page: &BBox,
        (cell, height): (f64, f64),
    ) -> String {
        let layout = &self.options.layout;
        let origin = primary_origin(rotation, page);
        let mut rows: Vec<String> = Vec::new();
        let mut prev_v: Option<f64> = None;

        for line in lines {
            let v = line_depth(rotation, line.base, page);
            if let Some(pv) = prev_v {
                let blanks = (((v - pv) / height).round() as i64 - 1).max(0) as usize;
                rows.extend(std::iter::repeat_n(String::new(), blanks.min(layout.max_blank_lines)));
            }
            prev_v = Some(v);

            let mut row = String::new();
            let mut cursor = 0usize;
            for (i, word) in line.words.iter().enumerate() {
                let target = ((word.pri_start() - origin) / cell).round().max(0.0) as usize;
                let spaces = if i == 0 {
                    target
                } else if self.needs_space(&line.words[i - 1], word) {
                    target.saturating_sub(cursor).max(1)
                } else {
                    0
                };
                let spaces = spaces.min(layout.max_leading_spaces);
                row.extend(std::iter::repeat_n(' ', spaces));
                row.push_str(&word.text);
                cursor += spaces + word.text.chars().count();
            }
            rows.push(row.trim_end().to_string());
        }

        while rows.last().is_some_and(String::is_empty) {
            rows.pop();
        }
        rows.join("\n")
    }
}

/// Smallest reading-order coordinate on the page for a rotation.
fn primary_origin(rotation: Rotation, page: &BBox) -> f64 {
    match rotation {
        Rotation::Deg0 => page.x0,
        Rotation::Deg90 => page.y0,
        Rotation::Deg180 => -page.x1,
        Rotation::Deg270 => -page.y1,
    }
}

/// Distance of a baseline from the top of the page in the rotation's frame.
fn line_depth(rotation: Rotation, base: f64, page: &BBox) -> f64 {
    match rotation {
        Rotation::Deg0 => page.y1 - base,
        Rotation::Deg90 => base - page.x0,
        Rotation::Deg180 => base - page.y0,
        Rotation::Deg270 => page.x1 - base,
    }
}
