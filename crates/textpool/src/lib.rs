//! textpool: plain, layout and column text from PDF content streams.
//!
//! This is the public API facade crate for textpool. It re-exports types from
//! textpool-core and uses textpool-parse for tokenizing and interpreting
//! content streams.
//!
//! # Architecture
//!
//! - **textpool-core**: Words, line pools, column detection and serialization
//! - **textpool-parse**: Tokenizer, text state and operator interpreter
//! - **textpool** (this crate): Page pipeline that ties everything together
//!
//! # Example
//!
//! ```
//! use textpool::{FontMap, PageGeometry, SimpleFont, extract_plain_text_from_bytes};
//!
//! let helvetica = SimpleFont::new("Helvetica").with_missing_width(500.0);
//! let fonts = FontMap::new().with_font("F1", helvetica);
//! let text = extract_plain_text_from_bytes(
//!     b"BT /F1 12 Tf 72 700 Td (Hello World) Tj ET",
//!     &fonts,
//!     &PageGeometry::default(),
//! )
//! .unwrap();
//! assert_eq!(text, "Hello World");
//! ```

mod batch;
mod page;

pub use batch::{PageContent, extract_pages};
#[cfg(feature = "parallel")]
pub use batch::extract_pages_parallel;
pub use page::PageText;

pub use textpool_core;
pub use textpool_core::{
    BBox, Column, ColumnLayout, ColumnOptions, ExtractOptions, ExtractWarning,
    ExtractWarningCode, Gap, LayoutOptions, PageGeometry, PositionedChar, Rotation, SearchMatch,
    SearchOptions, SpacingThresholds, TextError, TextLine, UnicodeNorm, Word, WordBuilderStats,
    WordTolerances, WritingMode, search_words,
};
pub use textpool_parse;
pub use textpool_parse::{CollectingHandler, Font, FontMap, Operator, SimpleFont, tokenize};

/// Plain text of a page with default options.
pub fn extract_plain_text(ops: &[Operator], fonts: &FontMap, geometry: &PageGeometry) -> String {
    PageText::extract(ops, fonts, geometry, &ExtractOptions::default()).plain_text()
}

/// Layout-preserving text of a page with default options.
pub fn extract_layout_text(ops: &[Operator], fonts: &FontMap, geometry: &PageGeometry) -> String {
    PageText::extract(ops, fonts, geometry, &ExtractOptions::default()).layout_text()
}

/// Column-aware text of a page with default options.
pub fn detect_columns_and_extract(
    ops: &[Operator],
    fonts: &FontMap,
    geometry: &PageGeometry,
) -> String {
    PageText::extract(ops, fonts, geometry, &ExtractOptions::default()).column_text()
}

/// Words of a page in reading order, with default options.
pub fn extract_words(ops: &[Operator], fonts: &FontMap, geometry: &PageGeometry) -> Vec<Word> {
    PageText::extract(ops, fonts, geometry, &ExtractOptions::default()).words()
}

/// Glyphs of a page as the interpreter positions them, before word building.
pub fn extract_chars(
    ops: &[Operator],
    fonts: &FontMap,
    geometry: &PageGeometry,
) -> Vec<PositionedChar> {
    let mut handler = CollectingHandler::new();
    textpool_parse::interpret(ops, fonts, geometry, UnicodeNorm::None, &mut handler);
    handler.chars
}

pub fn extract_plain_text_from_bytes(
    content: &[u8],
    fonts: &FontMap,
    geometry: &PageGeometry,
) -> Result<String, TextError> {
    Ok(extract_plain_text(&tokenize(content)?, fonts, geometry))
}

pub fn extract_layout_text_from_bytes(
    content: &[u8],
    fonts: &FontMap,
    geometry: &PageGeometry,
) -> Result<String, TextError> {
    Ok(extract_layout_text(&tokenize(content)?, fonts, geometry))
}

pub fn detect_columns_and_extract_from_bytes(
    content: &[u8],
    fonts: &FontMap,
    geometry: &PageGeometry,
) -> Result<String, TextError> {
    Ok(detect_columns_and_extract(&tokenize(content)?, fonts, geometry))
}

pub fn extract_words_from_bytes(
    content: &[u8],
    fonts: &FontMap,
    geometry: &PageGeometry,
) -> Result<Vec<Word>, TextError> {
    Ok(extract_words(&tokenize(content)?, fonts, geometry))
}

pub fn extract_chars_from_bytes(
    content: &[u8],
    fonts: &FontMap,
    geometry: &PageGeometry,
) -> Result<Vec<PositionedChar>, TextError> {
    Ok(extract_chars(&tokenize(content)?, fonts, geometry))
}
