//! Error type for the tokenizer.
//!
//! Uses [`thiserror`] for derivation. [`BackendError`] converts into the
//! core [`TextError`] so callers see one error type. Interpretation itself
//! never fails; problems there become warnings.

use textpool_core::TextError;
use thiserror::Error;

/// Error type for content stream parsing.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Malformed content stream syntax.
    #[error("content stream parse error: {0}")]
    Parse(String),
}

impl From<BackendError> for TextError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => TextError::ParseError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = BackendError::Parse("unterminated array".to_string());
        assert_eq!(err.to_string(), "content stream parse error: unterminated array");
    }

    #[test]
    fn parse_to_text_error() {
        let err: TextError = BackendError::Parse("bad syntax".to_string()).into();
        assert_eq!(err, TextError::ParseError("bad syntax".to_string()));
        assert_eq!(err.to_string(), "parse error: bad syntax");
    }

    #[test]
    fn tokenizer_failure_converts() {
        let err: TextError = crate::tokenize(b"BT (open").unwrap_err().into();
        assert!(matches!(err, TextError::ParseError(_)));
    }
}
