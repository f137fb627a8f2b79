//! textpool-core: Backend-independent data types and text reconstruction.
//!
//! This crate turns positioned glyphs into words, groups words into lines
//! per rotation class, detects columns and renders the result as text.
//! It knows nothing about content streams; see `textpool-parse` for that.

pub mod columns;
pub mod error;
pub mod geometry;
pub mod line_pool;
pub mod options;
pub mod search;
pub mod serializer;
pub mod text;
pub mod unicode_norm;
pub mod word;
pub mod word_builder;

pub use columns::{Column, ColumnDetector, ColumnLayout, Gap};
pub use error::{ExtractWarning, ExtractWarningCode, TextError};
pub use geometry::{BBox, PageGeometry, Point, Transform};
pub use line_pool::{LineOptions, LinePool, PagePools, TextLine};
pub use options::{ColumnOptions, ExtractOptions, LayoutOptions, SpacingThresholds, WordTolerances};
pub use search::{SearchMatch, SearchOptions, search_words};
pub use serializer::TextSerializer;
pub use text::{PositionedChar, Rotation, WritingMode};
pub use unicode_norm::UnicodeNorm;
pub use word::Word;
pub use word_builder::{BuiltWords, WordBuilder, WordBuilderStats};
