//! Callback trait between the interpreter and whatever consumes glyphs.
//!
//! The interpreter calls [`ContentHandler`] methods as it walks a page's
//! operators. All methods default to no-ops so implementors subscribe only
//! to what they need.

use textpool_core::{ExtractWarning, PositionedChar};

/// Receiver of interpreter events.
pub trait ContentHandler {
    /// A glyph was drawn.
    fn on_char(&mut self, _ch: PositionedChar) {}

    /// A text object ended (`ET`).
    fn on_text_end(&mut self) {}

    /// Something was skipped or approximated.
    fn on_warning(&mut self, _warning: ExtractWarning) {}
}

/// Handler that stores every event; useful for inspection and tests.
#[derive(Debug, Clone, Default)]
pub struct CollectingHandler {
    pub chars: Vec<PositionedChar>,
    pub warnings: Vec<ExtractWarning>,
    /// Number of `ET` operators seen.
    pub text_ends: usize,
}

impl CollectingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded text of all collected glyphs, in stream order.
    pub fn text(&self) -> String {
        self.chars.iter().map(|c| c.unicode).collect()
    }
}

impl ContentHandler for CollectingHandler {
    fn on_char(&mut self, ch: PositionedChar) {
        self.chars.push(ch);
    }

    fn on_text_end(&mut self) {
        self.text_ends += 1;
    }

    fn on_warning(&mut self, warning: ExtractWarning) {
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use textpool_core::{ExtractWarningCode, Rotation, WritingMode};

    struct NoopHandler;
    impl ContentHandler for NoopHandler {}

    fn glyph(c: char) -> PositionedChar {
        PositionedChar {
            unicode: c,
            code: c as u32,
            index: 0,
            x: 0.0,
            y: 0.0,
            dx: 5.0,
            dy: 0.0,
            font_size: 10.0,
            rotation: Rotation::Deg0,
            writing_mode: WritingMode::Horizontal,
            font_name: "F1".to_string(),
        }
    }

    #[test]
    fn default_methods_are_noops() {
        let mut h = NoopHandler;
        h.on_char(glyph('a'));
        h.on_text_end();
        h.on_warning(ExtractWarning::with_code(ExtractWarningCode::MissingFont, "ignored"));
    }

    #[test]
    fn collecting_handler_records_events() {
        let mut h = CollectingHandler::new();
        h.on_char(glyph('h'));
        h.on_char(glyph('i'));
        h.on_text_end();
        h.on_warning(ExtractWarning::with_code(ExtractWarningCode::UnbalancedRestore, "w"));
        assert_eq!(h.text(), "hi");
        assert_eq!(h.text_ends, 1);
        assert_eq!(h.warnings.len(), 1);
    }

    #[test]
    fn usable_as_trait_object() {
        let mut h = CollectingHandler::new();
        let dyn_h: &mut dyn ContentHandler = &mut h;
        dyn_h.on_char(glyph('x'));
        assert_eq!(h.chars.len(), 1);
    }
}
