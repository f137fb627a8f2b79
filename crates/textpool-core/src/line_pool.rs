//! Baseline-bucketed word pools and line grouping.
//!
//! Each rotation class has its own [`LinePool`]. Words are keyed by
//! `floor(base / quantum)` so that neighbours on a line land in the same or
//! adjacent buckets, and lines can be formed by walking buckets in order
//! instead of comparing every pair of words on the page.

use std::collections::BTreeMap;

use crate::geometry::BBox;
use crate::options::ExtractOptions;
use crate::text::Rotation;
use crate::word::Word;

/// Settings for grouping pooled words into lines.
#[derive(Debug, Clone, PartialEq)]
pub struct LineOptions {
    /// Max baseline distance, as a multiple of font size.
    pub line_tolerance: f64,
    /// Duplicate detection along the writing axis, as a multiple of font size.
    pub dup_max_pri_delta: f64,
    /// Duplicate detection across the writing axis, as a multiple of font size.
    pub dup_max_sec_delta: f64,
}

impl Default for LineOptions {
    fn default() -> Self {
        LineOptions::from(&ExtractOptions::default())
    }
}

impl From<&ExtractOptions> for LineOptions {
    fn from(opts: &ExtractOptions) -> Self {
        Self {
            line_tolerance: opts.line_tolerance,
            dup_max_pri_delta: opts.word.dup_max_pri_delta,
            dup_max_sec_delta: opts.word.dup_max_sec_delta,
        }
    }
}

/// Words of one pool that share a visual line.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextLine {
    /// Words in reading order along the line.
    pub words: Vec<Word>,
    /// Baseline of the first word that opened the line.
    pub base: f64,
    pub rotation: Rotation,
    /// Largest font size on the line.
    pub font_size: f64,
    pub bbox: BBox,
}

impl TextLine {
    /// Build a line; returns `None` when `words` is empty.
    pub fn from_words(words: Vec<Word>, base: f64, rotation: Rotation) -> Option<Self> {
        let first = words.first()?;
        let mut bbox = first.bbox;
        let mut font_size = first.font_size;
        for w in &words[1..] {
            bbox = bbox.union(&w.bbox);
            font_size = font_size.max(w.font_size);
        }
        Some(Self {
            words,
            base,
            rotation,
            font_size,
            bbox,
        })
    }

    /// Words joined by single spaces.
    pub fn text(&self) -> String {
        let parts: Vec<&str> = self.words.iter().map(|w| w.text.as_str()).collect();
        parts.join(" ")
    }
}

/// Words of one rotation class keyed by quantized baseline.
#[derive(Debug, Clone)]
pub struct LinePool {
    rotation: Rotation,
    quantum: f64,
    buckets: BTreeMap<i64, Vec<Word>>,
    bounds: Option<(i64, i64)>,
    len: usize,
}

impl LinePool {
    pub fn new(rotation: Rotation, quantum: f64) -> Self {
        Self {
            rotation,
            quantum,
            buckets: BTreeMap::new(),
            bounds: None,
            len: 0,
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Bucket index for a baseline coordinate.
    pub fn bucket_index(&self, base: f64) -> i64 {
        (base / self.quantum).floor() as i64
    }

    /// Append a word to its baseline bucket.
    pub fn add_word(&mut self, word: Word) {
        debug_assert_eq!(word.rotation, self.rotation);
        let bucket = self.bucket_index(word.base);
        self.bounds = Some(match self.bounds {
            Some((lo, hi)) => (lo.min(bucket), hi.max(bucket)),
            None => (bucket, bucket),
        });
        self.buckets.entry(bucket).or_default().push(word);
        self.len += 1;
    }

    /// Smallest and largest occupied bucket index.
    pub fn bucket_bounds(&self) -> Option<(i64, i64)> {
        self.bounds
    }

    /// Words of one bucket in insertion order.
    pub fn bucket(&self, index: i64) -> &[Word] {
        self.buckets.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Words in ascending bucket order, insertion order within a bucket.
    pub fn iter(&self) -> impl Iterator<Item = &Word> {
        self.buckets.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Group the pool's words into lines in reading order.
    ///
    /// Buckets are walked in line order for the rotation; a word joins the
    /// current line while its baseline is within `line_tolerance · size` of
    /// the line's baseline. Within a line, words are ordered along the
    /// writing direction and exact duplicates (same text at the same spot,
    /// as produced by fake-bold double printing) are dropped.
    pub fn lines(&self, options: &LineOptions) -> Vec<TextLine> {
        let descend = self.rotation.lines_descend();
        let mut words: Vec<&Word> = if descend {
            self.buckets.values().rev().flatten().collect()
        } else {
            self.buckets.values().flatten().collect()
        };
        // Stable: insertion order survives for equal baselines.
        words.sort_by(|a, b| {
            if descend {
                b.base.total_cmp(&a.base)
            } else {
                a.base.total_cmp(&b.base)
            }
        });

        let mut groups: Vec<(f64, Vec<&Word>)> = Vec::new();
        for word in words {
            let joins = groups.last().is_some_and(|(base, members)| {
                (word.base - base).abs()
                    <= options.line_tolerance * line_size(members).max(word.font_size)
            });
            match groups.last_mut() {
                Some((_, members)) if joins => members.push(word),
                _ => groups.push((word.base, vec![word])),
            }
        }

        groups
            .into_iter()
            .filter_map(|(base, mut members)| {
                members.sort_by(|a, b| {
                    a.pri_start()
                        .total_cmp(&b.pri_start())
                        .then(a.order.cmp(&b.order))
                });
                let kept = dedupe(members, options);
                TextLine::from_words(kept, base, self.rotation)
            })
            .collect()
    }
}

fn line_size(members: &[&Word]) -> f64 {
    members.iter().map(|w| w.font_size).fold(0.0, f64::max)
}

/// Drop words that repeat an already kept word at (nearly) the same spot.
fn dedupe(members: Vec<&Word>, options: &LineOptions) -> Vec<Word> {
    let mut kept: Vec<Word> = Vec::with_capacity(members.len());
    for word in members {
        let pri_tol = options.dup_max_pri_delta * word.font_size;
        let sec_tol = options.dup_max_sec_delta * word.font_size;
        let start = word.pri_start();
        let duplicate = kept
            .iter()
            .rev()
            .take_while(|k| start - k.pri_start() < pri_tol)
            .any(|k| k.text == word.text && (k.base - word.base).abs() < sec_tol);
        if !duplicate {
            kept.push(word.clone());
        }
    }
    kept
}

/// The four pools of a page.
#[derive(Debug, Clone)]
pub struct PagePools {
    pools: [LinePool; 4],
}

impl PagePools {
    pub fn new(quantum: f64) -> Self {
        Self {
            pools: Rotation::ALL.map(|r| LinePool::new(r, quantum)),
        }
    }

    /// Pool a set of words, each by its own rotation.
    pub fn from_words(words: impl IntoIterator<Item = Word>, quantum: f64) -> Self {
        let mut pools = Self::new(quantum);
        for w in words {
            pools.add_word(w);
        }
        pools
    }

    /// Route a word to the pool of its rotation class.
    pub fn add_word(&mut self, word: Word) {
        self.pools[word.rotation.index()].add_word(word);
    }

    pub fn pool(&self, rotation: Rotation) -> &LinePool {
        &self.pools[rotation.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinePool> {
        self.pools.iter()
    }

    /// All words, pool by pool in rotation order.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.pools.iter().flat_map(LinePool::iter)
    }

    pub fn len(&self) -> usize {
        self.pools.iter().map(LinePool::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.iter().all(LinePool::is_empty)
    }

    /// Words in reading order: rotation, then line, then position on the line.
    pub fn reading_order(&self, options: &LineOptions) -> Vec<Word> {
        self.pools
            .iter()
            .flat_map(|p| p.lines(options))
            .flat_map(|l| l.words)
            .collect()
    }
}
