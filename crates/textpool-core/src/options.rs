//! Extraction options.
//!
//! Every threshold used by the word builder, line grouping, spacing and
//! column detection is a named field here rather than an inline constant.
//! With the `serde` feature the whole tree deserializes from a partial
//! JSON document; missing fields keep their defaults.

use crate::error::TextError;
use crate::unicode_norm::UnicodeNorm;

/// Tie-break tolerances for deciding whether a glyph continues a word.
///
/// All values except `max_base_delta` are multiples of the word's font size.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WordTolerances {
    /// Max distance between glyph origins along the writing axis for a duplicate.
    pub dup_max_pri_delta: f64,
    /// Max baseline distance for a duplicate.
    pub dup_max_sec_delta: f64,
    /// Backward movement tolerated before a word is broken.
    pub min_dup_break_overlap: f64,
    /// Forward gap that breaks a word.
    pub min_word_break_space: f64,
    /// Max baseline drift within a word, in device units.
    pub max_base_delta: f64,
}

impl Default for WordTolerances {
    fn default() -> Self {
        Self {
            dup_max_pri_delta: 0.1,
            dup_max_sec_delta: 0.2,
            min_dup_break_overlap: 0.1,
            min_word_break_space: 0.1,
            max_base_delta: 0.5,
        }
    }
}

/// Gap thresholds, as fractions of the average character width, for
/// inserting spaces between neighbouring words on a line.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpacingThresholds {
    /// Below this ratio words are glued together.
    pub merge_below: f64,
    /// Above this ratio a space is always inserted.
    pub split_above: f64,
}

impl Default for SpacingThresholds {
    fn default() -> Self {
        Self {
            merge_below: 0.05,
            split_above: 0.2,
        }
    }
}

/// Layout-preserving output settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutOptions {
    /// Width of one output column in device units; derived from the page when `None`.
    pub cell_width: Option<f64>,
    /// Height of one output row in device units; derived from the page when `None`.
    pub line_height: Option<f64>,
    /// Cap on spaces emitted for a single horizontal gap.
    pub max_leading_spaces: usize,
    /// Cap on blank lines emitted for a single vertical gap.
    pub max_blank_lines: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            cell_width: None,
            line_height: None,
            max_leading_spaces: 200,
            max_blank_lines: 8,
        }
    }
}

/// Column detection settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColumnOptions {
    /// Narrowest empty band that separates two columns.
    pub min_gap_width: f64,
    /// Upper bound on the number of columns.
    pub max_columns: usize,
    /// Horizontal quantization step for word spans.
    pub quantum: f64,
}

impl Default for ColumnOptions {
    fn default() -> Self {
        Self {
            min_gap_width: 20.0,
            max_columns: 4,
            quantum: 5.0,
        }
    }
}

/// Options controlling one page's extraction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExtractOptions {
    /// Word continuation tolerances.
    pub word: WordTolerances,
    /// Baseline bucket size of the line pools (default: 2.0).
    pub pool_quantum: f64,
    /// Number of tiny glyphs processed before further tiny glyphs are dropped (default: 50,000).
    pub max_tiny_chars: usize,
    /// Max baseline distance, as a multiple of font size, for words on one line (default: 0.5).
    pub line_tolerance: f64,
    /// Baseline distance, as a multiple of font size, that starts a paragraph (default: 1.8).
    pub paragraph_gap: f64,
    /// Inter-word spacing thresholds.
    pub spacing: SpacingThresholds,
    /// Layout mode settings.
    pub layout: LayoutOptions,
    /// Column detection settings.
    pub columns: ColumnOptions,
    /// Keep words in content stream order instead of pooling them (default: false).
    pub raw_order: bool,
    /// Whether to collect warnings (default: true).
    pub collect_warnings: bool,
    /// Normalization applied to decoded text (default: none).
    pub unicode_norm: UnicodeNorm,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            word: WordTolerances::default(),
            pool_quantum: 2.0,
            max_tiny_chars: 50_000,
            line_tolerance: 0.5,
            paragraph_gap: 1.8,
            spacing: SpacingThresholds::default(),
            layout: LayoutOptions::default(),
            columns: ColumnOptions::default(),
            raw_order: false,
            collect_warnings: true,
            unicode_norm: UnicodeNorm::None,
        }
    }
}

impl ExtractOptions {
    /// Check values that would make the pipeline misbehave.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), TextError> {
        let positive = [
            ("pool_quantum", self.pool_quantum),
            ("line_tolerance", self.line_tolerance),
            ("paragraph_gap", self.paragraph_gap),
            ("columns.min_gap_width", self.columns.min_gap_width),
            ("columns.quantum", self.columns.quantum),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TextError::ConfigError(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.columns.max_columns == 0 {
            return Err(TextError::ConfigError(
                "columns.max_columns must be at least 1".to_string(),
            ));
        }
        if self.spacing.merge_below > self.spacing.split_above {
            return Err(TextError::ConfigError(format!(
                "spacing.merge_below ({}) exceeds spacing.split_above ({})",
                self.spacing.merge_below, self.spacing.split_above
            )));
        }
        for (name, value) in [
            ("layout.cell_width", self.layout.cell_width),
            ("layout.line_height", self.layout.line_height),
        ] {
            if let Some(v) = value {
                if !(v.is_finite() && v > 0.0) {
                    return Err(TextError::ConfigError(format!(
                        "{name} must be a positive number, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = ExtractOptions::default();
        assert_eq!(opts.pool_quantum, 2.0);
        assert_eq!(opts.max_tiny_chars, 50_000);
        assert_eq!(opts.word.max_base_delta, 0.5);
        assert_eq!(opts.word.min_word_break_space, 0.1);
        assert_eq!(opts.spacing.merge_below, 0.05);
        assert_eq!(opts.spacing.split_above, 0.2);
        assert_eq!(opts.columns.min_gap_width, 20.0);
        assert_eq!(opts.columns.max_columns, 4);
        assert_eq!(opts.layout.max_leading_spaces, 200);
        assert!(opts.collect_warnings);
        assert!(!opts.raw_order);
        assert_eq!(opts.unicode_norm, UnicodeNorm::None);
    }

    #[test]
    fn default_options_validate() {
        assert!(ExtractOptions::default().validate().is_ok());
    }

    #[test]
    fn zero_quantum_rejected() {
        let opts = ExtractOptions {
            pool_quantum: 0.0,
            ..ExtractOptions::default()
        };
        let err = opts.validate().unwrap_err();
        assert!(err.to_string().contains("pool_quantum"));
    }

    #[test]
    fn zero_columns_rejected() {
        let mut opts = ExtractOptions::default();
        opts.columns.max_columns = 0;
        assert!(matches!(opts.validate(), Err(TextError::ConfigError(_))));
    }

    #[test]
    fn inverted_spacing_rejected() {
        let mut opts = ExtractOptions::default();
        opts.spacing.merge_below = 0.5;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn negative_cell_width_rejected() {
        let mut opts = ExtractOptions::default();
        opts.layout.cell_width = Some(-1.0);
        assert!(opts.validate().unwrap_err().to_string().contains("cell_width"));
    }
}
