//! Unicode normalization of decoded glyph text.

use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::{is_nfc_quick, is_nfd_quick, is_nfkc_quick, is_nfkd_quick, IsNormalized};

/// Normalization form applied to each decoded character code's text.
///
/// Producers disagree on composed vs. decomposed forms and on
/// compatibility characters such as ligatures; normalizing makes output
/// comparable across them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UnicodeNorm {
    /// Keep decoded text as is (default).
    #[default]
    None,
    /// Canonical composition.
    Nfc,
    /// Canonical decomposition.
    Nfd,
    /// Compatibility composition; expands `ﬁ` into `fi`.
    Nfkc,
    /// Compatibility decomposition.
    Nfkd,
}

impl UnicodeNorm {
    /// Apply this normalization form, borrowing when nothing changes.
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let quick = match self {
            UnicodeNorm::None => return Cow::Borrowed(text),
            UnicodeNorm::Nfc => is_nfc_quick(text.chars()),
            UnicodeNorm::Nfd => is_nfd_quick(text.chars()),
            UnicodeNorm::Nfkc => is_nfkc_quick(text.chars()),
            UnicodeNorm::Nfkd => is_nfkd_quick(text.chars()),
        };
        if quick == IsNormalized::Yes {
            return Cow::Borrowed(text);
        }
        Cow::Owned(match self {
            UnicodeNorm::None => text.to_string(),
            UnicodeNorm::Nfc => text.nfc().collect(),
            UnicodeNorm::Nfd => text.nfd().collect(),
            UnicodeNorm::Nfkc => text.nfkc().collect(),
            UnicodeNorm::Nfkd => text.nfkd().collect(),
        })
    }
}
