//! Operator interpreter.
//!
//! Walks a page's operators once, keeps the graphics and text state, and
//! reports positioned glyphs to a [`ContentHandler`]. Interpretation never
//! fails: unknown operators are ignored, malformed ones are skipped with a
//! warning, and unknown fonts fall back to byte-for-byte decoding with
//! estimated widths.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use textpool_core::{ExtractWarning, ExtractWarningCode, PageGeometry, UnicodeNorm};

use crate::font::{FallbackFont, Font, FontMap};
use crate::graphics_state::GraphicsState;
use crate::handler::ContentHandler;
use crate::operator::{Op, TextArrayItem};
use crate::positioner::{GlyphPositioner, split_codes};
use crate::text_state::TextState;
use crate::tokenizer::Operator;

/// Interpreter state for one page.
pub struct OperatorInterpreter<'f> {
    fonts: &'f FontMap,
    positioner: GlyphPositioner,
    graphics: GraphicsState,
    text: TextState,
    fallbacks: HashMap<String, Arc<dyn Font>>,
    unmapped_fonts: HashSet<String>,
    next_index: usize,
}

impl<'f> OperatorInterpreter<'f> {
    /// Start a page walk; the initial CTM is the page transform.
    pub fn new(fonts: &'f FontMap, geometry: &PageGeometry) -> Self {
        Self {
            fonts,
            positioner: GlyphPositioner::default(),
            graphics: GraphicsState::new(geometry.page_transform()),
            text: TextState::new(),
            fallbacks: HashMap::new(),
            unmapped_fonts: HashSet::new(),
            next_index: 0,
        }
    }

    /// Normalize decoded text with the given form.
    pub fn with_normalization(mut self, norm: UnicodeNorm) -> Self {
        self.positioner = GlyphPositioner::new(norm);
        self
    }

    pub fn text_state(&self) -> &TextState {
        &self.text
    }

    pub fn graphics_state(&self) -> &GraphicsState {
        &self.graphics
    }

    /// Number of glyphs reported so far.
    pub fn chars_emitted(&self) -> usize {
        self.next_index
    }

    /// Interpret a whole operator list.
    pub fn run(&mut self, ops: &[Operator], handler: &mut dyn ContentHandler) {
        for (index, op) in ops.iter().enumerate() {
            self.execute(index, &Op::decode(op), handler);
        }
    }

    /// Apply one decoded operator; `index` is its position in the stream.
    pub fn execute(&mut self, index: usize, op: &Op<'_>, handler: &mut dyn ContentHandler) {
        match op {
            Op::Save => self.graphics.save(self.text.save_snapshot()),
            Op::Restore => match self.graphics.restore() {
                Some(snapshot) => self.text.restore_snapshot(snapshot),
                None => {
                    tracing::debug!(operator = index, "Q with empty save stack ignored");
                    handler.on_warning(
                        ExtractWarning::with_code(
                            ExtractWarningCode::UnbalancedRestore,
                            "Q without matching q; ignored",
                        )
                        .at_operator(index),
                    );
                }
            },
            Op::Concat(m) => self.graphics.concat(m),
            Op::BeginText => self.text.begin_text(),
            Op::EndText => {
                self.text.end_text();
                handler.on_text_end();
            }
            Op::SetFont { name, size } => self.text.set_font(name, *size),
            Op::SetCharSpacing(v) => self.text.char_spacing = *v,
            Op::SetWordSpacing(v) => self.text.word_spacing = *v,
            Op::SetHorizontalScale(v) => self.text.h_scaling = *v,
            Op::SetLeading(v) => self.text.leading = *v,
            Op::SetRise(v) => self.text.rise = *v,
            Op::SetRenderMode(mode) => self.text.set_render_mode(*mode),
            Op::MoveText { tx, ty } => self.text.move_text_position(*tx, *ty),
            Op::MoveTextSetLeading { tx, ty } => {
                self.text.move_text_position_and_set_leading(*tx, *ty);
            }
            Op::SetTextMatrix(m) => self.text.set_text_matrix(*m),
            Op::NextLine => self.text.move_to_next_line(),
            Op::ShowText(bytes) => self.show(index, bytes, handler),
            Op::ShowTextArray(items) => {
                for item in items {
                    match item {
                        TextArrayItem::Text(bytes) => self.show(index, bytes, handler),
                        TextArrayItem::Adjust(n) => self.adjust(*n),
                    }
                }
            }
            Op::NextLineShowText(bytes) => {
                self.text.move_to_next_line();
                self.show(index, bytes, handler);
            }
            Op::NextLineShowSpaced {
                word_spacing,
                char_spacing,
                text,
            } => {
                self.text.word_spacing = *word_spacing;
                self.text.char_spacing = *char_spacing;
                self.text.move_to_next_line();
                self.show(index, text, handler);
            }
            Op::Other(_) => {}
            Op::Malformed {
                name,
                expected,
                found,
            } => {
                tracing::debug!(
                    operator = index,
                    op = *name,
                    expected = *expected,
                    found = *found,
                    "malformed operator skipped"
                );
                handler.on_warning(
                    ExtractWarning::with_code(
                        ExtractWarningCode::MalformedOperator,
                        format!("{name} expects {expected}, got {found} operand(s); skipped"),
                    )
                    .at_operator(index),
                );
            }
        }
    }

    /// Position and report every glyph of a shown string.
    fn show(&mut self, index: usize, bytes: &[u8], handler: &mut dyn ContentHandler) {
        let font = self.resolve_font(index, handler);
        for (code, raw) in split_codes(bytes, font.is_identity_encoding()) {
            if !font.has_unicode_mapping(code) {
                self.report_unmapped(index, code, handler);
            }
            let run = self.positioner.position(
                code,
                raw,
                font.as_ref(),
                &self.text,
                self.graphics.ctm(),
                self.next_index,
            );
            self.next_index += run.chars.len();
            for ch in run.chars {
                handler.on_char(ch);
            }
            self.text.advance(run.advance.0, run.advance.1);
        }
    }

    /// `TJ` number: shift against the writing direction by `n/1000` em.
    fn adjust(&mut self, n: f64) {
        let shift = -n / 1000.0 * self.text.font_size;
        let vertical = self
            .fonts
            .get(&self.text.font_name)
            .is_some_and(|f| f.is_vertical());
        if vertical {
            self.text.advance(0.0, shift);
        } else {
            self.text
                .advance(shift * self.text.h_scaling_normalized(), 0.0);
        }
    }

    /// Warn once per font that a code was decoded without a Unicode mapping.
    fn report_unmapped(&mut self, index: usize, code: u32, handler: &mut dyn ContentHandler) {
        if !self.unmapped_fonts.insert(self.text.font_name.clone()) {
            return;
        }
        let name = &self.text.font_name;
        tracing::debug!(font = %name, operator = index, code, "code has no unicode mapping");
        handler.on_warning(
            ExtractWarning::with_code(
                ExtractWarningCode::EncodingFallback,
                format!("font '{name}' has no Unicode mapping for code {code:#06x}"),
            )
            .for_font(name.as_str())
            .at_operator(index),
        );
    }

    /// The current font, or a fallback reported once per missing name.
    fn resolve_font(&mut self, index: usize, handler: &mut dyn ContentHandler) -> Arc<dyn Font> {
        let name = &self.text.font_name;
        if let Some(font) = self.fonts.get(name).or_else(|| self.fallbacks.get(name)) {
            return Arc::clone(font);
        }
        let name = name.clone();
        tracing::debug!(font = %name, operator = index, "font not in font map, using fallback");
        handler.on_warning(
            ExtractWarning::with_code(
                ExtractWarningCode::MissingFont,
                format!("font '{name}' not found; using byte decoding and estimated widths"),
            )
            .for_font(name.as_str())
            .at_operator(index),
        );
        let font: Arc<dyn Font> = Arc::new(FallbackFont::new(name.as_str()));
        self.fallbacks.insert(name, Arc::clone(&font));
        font
    }
}

/// Interpret `ops` for a page in one call.
pub fn interpret(
    ops: &[Operator],
    fonts: &FontMap,
    geometry: &PageGeometry,
    norm: UnicodeNorm,
    handler: &mut dyn ContentHandler,
) {
    OperatorInterpreter::new(fonts, geometry)
        .with_normalization(norm)
        .run(ops, handler);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::SimpleFont;
    use crate::handler::CollectingHandler;
    use crate::tokenizer::tokenize;
    use textpool_core::{Rotation, WritingMode};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Font with 500-unit glyphs and 250-unit spaces.
    fn helv() -> SimpleFont {
        let mut widths = vec![500.0; 224];
        widths[0] = 250.0;
        SimpleFont::new("Helvetica").with_widths(32, widths)
    }

    fn fonts() -> FontMap {
        FontMap::new().with_font("F1", helv())
    }

    fn run_page(content: &str, fonts: &FontMap, geometry: PageGeometry) -> CollectingHandler {
        let ops = tokenize(content.as_bytes()).unwrap();
        let mut handler = CollectingHandler::new();
        interpret(&ops, fonts, &geometry, UnicodeNorm::None, &mut handler);
        handler
    }

    fn run(content: &str) -> CollectingHandler {
        run_page(content, &fonts(), PageGeometry::default())
    }

    fn xs(h: &CollectingHandler) -> Vec<f64> {
        h.chars.iter().map(|c| c.x).collect()
    }

    // --- Text showing ---

    #[test]
    fn simple_text() {
        let h = run("BT /F1 12 Tf 50 700 Td (Hello) Tj ET");
        assert_eq!(h.text(), "Hello");
        assert_eq!(xs(&h), vec![50.0, 56.0, 62.0, 68.0, 74.0]);
        assert!(h.chars.iter().all(|c| c.y == 700.0 && approx(c.dx, 6.0)));
        assert!(h.chars.iter().all(|c| c.font_name == "Helvetica"));
        let indices: Vec<usize> = h.chars.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(h.text_ends, 1);
        assert!(h.warnings.is_empty());
    }

    #[test]
    fn consecutive_strings_continue_position() {
        let h = run("BT /F1 10 Tf 0 100 Td (ab) Tj (c) Tj ET");
        assert_eq!(xs(&h), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn tj_array_adjustments() {
        let h = run("BT /F1 10 Tf 0 100 Td [(A) -1000 (B) 500 (C)] TJ ET");
        // -1000 moves right by one em, 500 moves left by half an em.
        assert_eq!(xs(&h), vec![0.0, 15.0, 15.0]);
    }

    #[test]
    fn tj_adjustment_scaled_by_tz() {
        let h = run("BT /F1 10 Tf 50 Tz 0 100 Td [(A) -1000 (B)] TJ ET");
        // Glyph advance 2.5, adjustment 5.
        assert_eq!(xs(&h), vec![0.0, 7.5]);
    }

    #[test]
    fn word_and_char_spacing() {
        let h = run("BT /F1 10 Tf 1 Tc 4 Tw 0 100 Td (a b) Tj ET");
        // a: 5+1, space: 2.5+1+4
        assert_eq!(xs(&h), vec![0.0, 6.0, 13.5]);
    }

    #[test]
    fn line_movement_operators() {
        let h = run("BT /F1 10 Tf 14 TL 20 700 Td (a) Tj T* (b) Tj (c) ' 2 1 (d) \" ET");
        let pos: Vec<(f64, f64)> = h.chars.iter().map(|c| (c.x, c.y)).collect();
        assert_eq!(pos, vec![(20.0, 700.0), (20.0, 686.0), (20.0, 672.0), (20.0, 658.0)]);
    }

    #[test]
    fn double_quote_sets_spacing() {
        let h = run("BT /F1 10 Tf 14 TL 0 700 Td 3 2 (a b) \" ET");
        // Tw 3 and Tc 2 apply to the shown string.
        assert_eq!(xs(&h), vec![0.0, 7.0, 14.5]);
    }

    #[test]
    fn td_sets_leading() {
        let h = run("BT /F1 10 Tf 0 700 Td 0 -20 TD (a) Tj T* (b) Tj ET");
        let ys: Vec<f64> = h.chars.iter().map(|c| c.y).collect();
        assert_eq!(ys, vec![680.0, 660.0]);
    }

    #[test]
    fn text_matrix_and_rise() {
        let h = run("BT /F1 1 Tf 12 0 0 12 100 500 Tm 2 Ts (x) Tj ET");
        let c = &h.chars[0];
        assert!(approx(c.x, 100.0) && approx(c.y, 524.0));
        assert!(approx(c.font_size, 12.0));
        assert!(approx(c.dx, 6.0));
    }

    #[test]
    fn bt_resets_text_matrix() {
        let h = run("BT /F1 10 Tf 100 100 Td ET BT (a) Tj ET");
        assert!(approx(h.chars[0].x, 0.0) && approx(h.chars[0].y, 0.0));
        assert_eq!(h.text_ends, 2);
    }

    // --- Graphics state ---

    #[test]
    fn cm_applies_to_text() {
        let h = run("q 1 0 0 1 100 200 cm BT /F1 10 Tf (a) Tj ET Q BT /F1 10 Tf (b) Tj ET");
        assert!(approx(h.chars[0].x, 100.0) && approx(h.chars[0].y, 200.0));
        assert!(approx(h.chars[1].x, 0.0) && approx(h.chars[1].y, 0.0));
    }

    #[test]
    fn restore_brings_back_font_and_spacing() {
        let h = run("BT /F1 10 Tf q 5 Tc /F2 20 Tf Q 0 100 Td (ab) Tj ET");
        assert_eq!(xs(&h), vec![0.0, 5.0]);
        assert!(h.warnings.is_empty());
    }

    #[test]
    fn unbalanced_restore_warns_and_continues() {
        let h = run("Q BT /F1 10 Tf (a) Tj ET");
        assert_eq!(h.text(), "a");
        assert_eq!(h.warnings.len(), 1);
        assert_eq!(h.warnings[0].code, ExtractWarningCode::UnbalancedRestore);
        assert_eq!(h.warnings[0].operator_index, Some(0));
    }

    #[test]
    fn malformed_operator_skipped_entirely() {
        let h = run("1 0 cm BT /F1 10 Tf 0 100 Td (a) Tj ET");
        assert!(approx(h.chars[0].x, 0.0) && approx(h.chars[0].y, 100.0));
        assert_eq!(h.warnings.len(), 1);
        assert_eq!(h.warnings[0].code, ExtractWarningCode::MalformedOperator);
        assert_eq!(h.warnings[0].operator_index, Some(0));
        assert!(h.warnings[0].description.contains("cm"));
    }

    #[test]
    fn unknown_operators_ignored_silently() {
        let h = run("0 0 10 10 re f 1 0 0 RG BT /F1 10 Tf (a) Tj ET");
        assert_eq!(h.text(), "a");
        assert!(h.warnings.is_empty());
    }

    // --- Fonts ---

    #[test]
    fn missing_font_warns_once_and_falls_back() {
        let h = run("BT /F9 10 Tf (ab) Tj (c) Tj ET");
        assert_eq!(h.text(), "abc");
        assert_eq!(h.warnings.len(), 1);
        let w = &h.warnings[0];
        assert_eq!(w.code, ExtractWarningCode::MissingFont);
        assert_eq!(w.font_name.as_deref(), Some("F9"));
        // Heuristic width of half an em.
        assert_eq!(xs(&h), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn identity_font_reads_two_byte_codes() {
        let fonts = FontMap::new().with_font(
            "C0",
            SimpleFont::new("CJK").with_identity_encoding().with_missing_width(1000.0),
        );
        let h = run_page("BT /C0 10 Tf <4E2D6587> Tj ET", &fonts, PageGeometry::default());
        assert_eq!(h.text(), "中文");
        assert_eq!(h.chars[0].code, 0x4E2D);
        assert_eq!(xs(&h), vec![0.0, 10.0]);
        // Both codes lack a ToUnicode entry; one warning for the font.
        assert_eq!(h.warnings.len(), 1);
        let w = &h.warnings[0];
        assert_eq!(w.code, ExtractWarningCode::EncodingFallback);
        assert_eq!(w.font_name.as_deref(), Some("C0"));
        assert_eq!(w.operator_index, Some(2));
    }

    #[test]
    fn mapped_identity_font_has_no_fallback_warning() {
        let fonts = FontMap::new().with_font(
            "C1",
            SimpleFont::new("CJK")
                .with_identity_encoding()
                .with_to_unicode(0x0001, "中")
                .with_to_unicode(0x0002, "文"),
        );
        let h = run_page("BT /C1 10 Tf <00010002> Tj ET", &fonts, PageGeometry::default());
        assert_eq!(h.text(), "中文");
        assert!(h.warnings.is_empty());
    }

    #[test]
    fn vertical_font_writes_downward() {
        let fonts = FontMap::new().with_font(
            "V",
            SimpleFont::new("Vert").with_identity_encoding().with_vertical_writing(),
        );
        let content = "BT /V 10 Tf 300 700 Td <4E2D6587> Tj ET";
        let h = run_page(content, &fonts, PageGeometry::default());
        let ys: Vec<f64> = h.chars.iter().map(|c| c.y).collect();
        assert_eq!(ys, vec![700.0, 690.0]);
        assert!(h.chars.iter().all(|c| c.rotation == Rotation::Deg270));
        assert!(h.chars.iter().all(|c| c.writing_mode == WritingMode::Vertical));
    }

    #[test]
    fn normalization_option() {
        let fonts =
            FontMap::new().with_font("L", SimpleFont::new("Lig").with_to_unicode(1, "\u{FB01}"));
        let ops = tokenize(b"BT /L 10 Tf <01> Tj ET").unwrap();
        let mut h = CollectingHandler::new();
        interpret(&ops, &fonts, &PageGeometry::default(), UnicodeNorm::Nfkc, &mut h);
        assert_eq!(h.text(), "fi");
    }

    // --- Page rotation ---

    #[test]
    fn rotated_page_turns_text() {
        let geometry = PageGeometry::new(612.0, 792.0).with_rotation(90);
        let h = run_page("BT /F1 10 Tf 50 700 Td (ab) Tj ET", &fonts(), geometry);
        let c = &h.chars[0];
        assert!(approx(c.x, 700.0) && approx(c.y, 562.0));
        assert!(approx(c.dx, 0.0) && approx(c.dy, -5.0));
        assert_eq!(c.rotation, Rotation::Deg270);
    }

    #[test]
    fn interpreter_exposes_state() {
        let ops = tokenize(b"q BT /F1 10 Tf (ab) Tj").unwrap();
        let fonts = fonts();
        let mut interp = OperatorInterpreter::new(&fonts, &PageGeometry::default());
        let mut h = CollectingHandler::new();
        interp.run(&ops, &mut h);
        assert_eq!(interp.chars_emitted(), 2);
        assert_eq!(interp.graphics_state().stack_depth(), 1);
        assert!(interp.text_state().in_text_object());
        assert!(approx(interp.text_state().text_matrix().e, 10.0));
    }
}
