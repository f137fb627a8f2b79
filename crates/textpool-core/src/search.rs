//! Pattern search over extracted words, with match positions.

use regex::Regex;

use crate::error::TextError;
use crate::geometry::BBox;
use crate::word::Word;

/// Options controlling text search behavior.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchOptions {
    /// Interpret the pattern as a regex (default: `true`); otherwise a literal.
    pub regex: bool,
    /// Case-sensitive matching (default: `true`).
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            regex: true,
            case_sensitive: true,
        }
    }
}

/// One match and where it sits on the page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchMatch {
    /// The matched text.
    pub text: String,
    /// Union bounding box of the words the match touches.
    pub bbox: BBox,
    /// Indices into the searched word slice.
    pub word_indices: Vec<usize>,
}

/// Search `words`, joined by single spaces, for `pattern`.
///
/// A match may span several words; its box is the union of every word it
/// touches. Matches consisting only of the joining spaces are skipped.
///
/// # Errors
///
/// Returns [`TextError::ConfigError`] if the pattern does not compile.
pub fn search_words(
    words: &[Word],
    pattern: &str,
    options: &SearchOptions,
) -> Result<Vec<SearchMatch>, TextError> {
    if words.is_empty() || pattern.is_empty() {
        return Ok(Vec::new());
    }

    let mut full_text = String::new();
    // Owning word per byte; `None` for the joining spaces.
    let mut owner: Vec<Option<usize>> = Vec::new();
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            full_text.push(' ');
            owner.push(None);
        }
        full_text.push_str(&word.text);
        owner.resize(full_text.len(), Some(i));
    }

    let body = if options.regex {
        pattern.to_string()
    } else {
        regex::escape(pattern)
    };
    let source = if options.case_sensitive {
        body
    } else {
        format!("(?i){body}")
    };
    let re = Regex::new(&source)
        .map_err(|e| TextError::ConfigError(format!("invalid search pattern: {e}")))?;

    let mut results = Vec::new();
    for m in re.find_iter(&full_text) {
        let mut word_indices: Vec<usize> = Vec::new();
        for idx in owner[m.start()..m.end()].iter().flatten() {
            if word_indices.last() != Some(idx) {
                word_indices.push(*idx);
            }
        }
        let Some((&first, rest)) = word_indices.split_first() else {
            continue;
        };
        let bbox = rest
            .iter()
            .fold(words[first].bbox, |acc, &i| acc.union(&words[i].bbox));
        results.push(SearchMatch {
            text: m.as_str().to_string(),
            bbox,
            word_indices,
        });
    }
    Ok(results)
}
