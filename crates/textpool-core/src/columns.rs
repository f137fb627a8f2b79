//! Column detection from horizontal whitespace.
//!
//! Finds vertical bands that no word on the page touches and splits the
//! page at the widest of them. Purely geometric: a band of whitespace
//! between two table cells is a column boundary as far as this module is
//! concerned.
//!
//! Gap-free lines running across most of the text, such as a title over a
//! two-column body, are left out of the gap search when lines that do
//! contain a column-sized gap outnumber them. They are kept whole and
//! placed by their center.

use crate::line_pool::TextLine;
use crate::options::ColumnOptions;
use crate::word::Word;

/// Share of the text extent above which a gap-free line spans the page.
const SPANNING_SHARE: f64 = 0.5;

/// An empty horizontal band between occupied runs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gap {
    pub start: f64,
    pub end: f64,
    pub width: f64,
}

impl Gap {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            width: end - start,
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// A vertical reading band `[x_min, x_max)` and the lines assigned to it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    pub x_min: f64,
    pub x_max: f64,
    pub lines: Vec<TextLine>,
}

/// Result of column detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnLayout {
    /// Columns left to right; at least one.
    pub columns: Vec<Column>,
    /// Gaps used as column boundaries, left to right.
    pub gaps: Vec<Gap>,
}

/// Splits lines into columns.
#[derive(Debug, Clone, Default)]
pub struct ColumnDetector {
    options: ColumnOptions,
}

impl ColumnDetector {
    pub fn new(options: ColumnOptions) -> Self {
        Self { options }
    }

    /// Gaps wide enough to separate columns, at most `max_columns - 1` of them.
    pub fn find_gaps(&self, lines: &[TextLine]) -> Vec<Gap> {
        self.gaps_excluding(lines, &self.spanning_lines(lines))
    }

    /// Flags lines that cross the page without a column-sized gap.
    ///
    /// All flags are false unless lines with such a gap outnumber the
    /// spanning ones.
    pub fn spanning_lines(&self, lines: &[TextLine]) -> Vec<bool> {
        let min_gap = self.options.min_gap_width;
        let (lo, hi) = lines
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), l| {
                (lo.min(l.bbox.x0), hi.max(l.bbox.x1))
            });
        let extent = hi - lo;

        let split = lines.iter().filter(|l| has_wide_gap(l, min_gap)).count();
        let flags: Vec<bool> = lines
            .iter()
            .map(|l| !has_wide_gap(l, min_gap) && l.bbox.width() >= SPANNING_SHARE * extent)
            .collect();
        let spanning = flags.iter().filter(|&&f| f).count();
        if spanning > 0 && spanning < split {
            flags
        } else {
            vec![false; lines.len()]
        }
    }

    fn gaps_excluding(&self, lines: &[TextLine], skip: &[bool]) -> Vec<Gap> {
        let q = self.options.quantum;
        let min_gap = self.options.min_gap_width;

        let mut spans: Vec<(f64, f64)> = lines
            .iter()
            .zip(skip)
            .filter(|(_, skipped)| !**skipped)
            .flat_map(|(l, _)| l.words.iter())
            .map(|w| ((w.bbox.x0 / q).floor() * q, (w.bbox.x1 / q).ceil() * q))
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

        let mut runs: Vec<(f64, f64)> = Vec::new();
        for (start, end) in spans {
            match runs.last_mut() {
                Some(run) if start <= run.1 => run.1 = run.1.max(end),
                _ => runs.push((start, end)),
            }
        }

        let mut gaps: Vec<Gap> = runs
            .windows(2)
            .map(|pair| Gap::new(pair[0].1, pair[1].0))
            .filter(|g| g.width >= min_gap)
            .collect();

        let mut merged: Vec<Gap> = Vec::with_capacity(gaps.len());
        for gap in gaps.drain(..) {
            match merged.last_mut() {
                Some(prev) if gap.start - prev.end < min_gap => {
                    *prev = Gap::new(prev.start, gap.end);
                }
                _ => merged.push(gap),
            }
        }

        let keep = self.options.max_columns.saturating_sub(1);
        if merged.len() > keep {
            merged.sort_by(|a, b| b.width.total_cmp(&a.width).then(a.start.total_cmp(&b.start)));
            merged.truncate(keep);
            merged.sort_by(|a, b| a.start.total_cmp(&b.start));
        }
        merged
    }

    /// Column boundaries `[x_min, mid(gap_1), ..., x_max]`.
    pub fn boundaries(gaps: &[Gap], x_min: f64, x_max: f64) -> Vec<f64> {
        let mut bounds = Vec::with_capacity(gaps.len() + 2);
        bounds.push(x_min);
        bounds.extend(gaps.iter().map(Gap::midpoint));
        bounds.push(x_max);
        bounds
    }

    /// Partition `lines` into columns over a page of the given width.
    ///
    /// A line whose words straddle a boundary is split there first; each
    /// piece then goes to the column containing its horizontal center.
    /// Spanning lines are not split. Line order within a column follows
    /// the input order.
    pub fn detect(&self, lines: Vec<TextLine>, page_width: f64) -> ColumnLayout {
        let spanning = self.spanning_lines(&lines);
        let gaps = self.gaps_excluding(&lines, &spanning);
        let bounds = Self::boundaries(&gaps, 0.0, page_width);
        let mut columns: Vec<Column> = bounds
            .windows(2)
            .map(|pair| Column {
                x_min: pair[0],
                x_max: pair[1],
                lines: Vec::new(),
            })
            .collect();

        for (line, whole) in lines.into_iter().zip(spanning) {
            if whole {
                let idx = column_of(&bounds, line.bbox.center_x());
                columns[idx].lines.push(line);
                continue;
            }
            let (base, rotation) = (line.base, line.rotation);
            let mut pieces: Vec<Vec<Word>> = vec![Vec::new(); columns.len()];
            for word in line.words {
                pieces[column_of(&bounds, word.bbox.center_x())].push(word);
            }
            for words in pieces.into_iter().filter(|p| !p.is_empty()) {
                if let Some(piece) = TextLine::from_words(words, base, rotation) {
                    let idx = column_of(&bounds, piece.bbox.center_x());
                    columns[idx].lines.push(piece);
                }
            }
        }

        ColumnLayout { columns, gaps }
    }
}

/// Whether two neighbouring words of the line are at least `min_gap` apart.
fn has_wide_gap(line: &TextLine, min_gap: f64) -> bool {
    line.words
        .windows(2)
        .any(|pair| pair[1].bbox.x0 - pair[0].bbox.x1 >= min_gap)
}

/// Index of the band containing `x`; out-of-range values clamp to the ends.
fn column_of(bounds: &[f64], x: f64) -> usize {
    let bands = bounds.len().saturating_sub(1).max(1);
    let interior = &bounds[1..bounds.len().saturating_sub(1).max(1)];
    interior.iter().take_while(|&&b| x >= b).count().min(bands - 1)
}
