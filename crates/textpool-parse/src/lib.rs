//! textpool-parse: content stream tokenizer and operator interpreter.
//!
//! Turns the bytes of a page content stream into positioned glyphs. The
//! tokenizer produces [`Operator`]s, the [`OperatorInterpreter`] keeps the
//! graphics and text state and positions every shown code with the
//! [`GlyphPositioner`], and a [`ContentHandler`] receives the results. It
//! depends on textpool-core for shared data types.

pub mod error;
pub mod font;
pub mod graphics_state;
pub mod handler;
pub mod interpreter;
pub mod operator;
pub mod positioner;
pub mod text_state;
pub mod tokenizer;

pub use error::BackendError;
pub use font::{FallbackFont, Font, FontMap, SimpleFont};
pub use graphics_state::GraphicsState;
pub use handler::{CollectingHandler, ContentHandler};
pub use interpreter::{OperatorInterpreter, interpret};
pub use operator::{Op, TextArrayItem};
pub use positioner::{GlyphPositioner, GlyphRun};
pub use text_state::{TextRenderMode, TextState, TextStateSnapshot};
pub use textpool_core;
pub use tokenizer::{Operand, Operator, tokenize};
