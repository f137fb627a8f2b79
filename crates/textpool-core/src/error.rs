//! Error and warning types for textpool.
//!
//! Provides [`TextError`] for fatal errors at the edges of the pipeline
//! (tokenizing input and validating configuration) and [`ExtractWarning`]
//! for non-fatal issues that allow best-effort continuation inside a page.

use std::fmt;

/// Fatal error types.
///
/// Nothing inside the per-page pipeline produces these; they come from
/// tokenizing content bytes or from invalid options and search patterns.
#[derive(Debug, Clone, PartialEq)]
pub enum TextError {
    /// Content stream bytes could not be tokenized.
    ParseError(String),
    /// Invalid configuration value.
    ConfigError(String),
}

impl fmt::Display for TextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextError::ParseError(msg) => write!(f, "parse error: {msg}"),
            TextError::ConfigError(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for TextError {}

/// Machine-readable warning code for categorizing extraction issues.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum ExtractWarningCode {
    /// A font name used by `Tf` has no entry in the font map.
    MissingFont,
    /// A supported operator was missing operands or had operands of the wrong type.
    MalformedOperator,
    /// `Q` was encountered with an empty save stack.
    UnbalancedRestore,
    /// A configured resource limit was reached during extraction.
    ResourceLimitReached,
    /// A two-byte code had no Unicode mapping and was decoded from its value.
    EncodingFallback,
}

impl ExtractWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractWarningCode::MissingFont => "MISSING_FONT",
            ExtractWarningCode::MalformedOperator => "MALFORMED_OPERATOR",
            ExtractWarningCode::UnbalancedRestore => "UNBALANCED_RESTORE",
            ExtractWarningCode::ResourceLimitReached => "RESOURCE_LIMIT_REACHED",
            ExtractWarningCode::EncodingFallback => "ENCODING_FALLBACK",
        }
    }
}

impl fmt::Display for ExtractWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal warning encountered during extraction.
///
/// The page is still processed; the warning records what was skipped or
/// approximated and where.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractWarning {
    /// Machine-readable warning code.
    pub code: ExtractWarningCode,
    /// Human-readable description of the warning.
    pub description: String,
    /// Index of the operator in the content stream, if applicable.
    pub operator_index: Option<usize>,
    /// Font name associated with the warning, if applicable.
    pub font_name: Option<String>,
}

impl ExtractWarning {
    /// Create a warning with a specific code and description.
    pub fn with_code(code: ExtractWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            operator_index: None,
            font_name: None,
        }
    }

    /// Attach the operator index (builder pattern).
    pub fn at_operator(mut self, index: usize) -> Self {
        self.operator_index = Some(index);
        self
    }

    /// Attach the font name (builder pattern).
    pub fn for_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = Some(font_name.into());
        self
    }
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(ref font_name) = self.font_name {
            write!(f, " [font {font_name}]")?;
        }
        if let Some(index) = self.operator_index {
            write!(f, " [operator #{index}]")?;
        }
        Ok(())
    }
}
