//! Per-glyph positioning.
//!
//! For each character code of a shown string the positioner composes the
//! text matrix with the CTM, applies the spacing model and produces one
//! [`PositionedChar`] per decoded Unicode scalar. It does not mutate the
//! text state; the caller advances the text matrix by the returned
//! displacement.

use textpool_core::text::is_wide;
use textpool_core::{PositionedChar, Rotation, Transform, UnicodeNorm, WritingMode};

use crate::font::{Font, code_from_bytes};
use crate::text_state::TextState;

/// Width guess, in ems, for codes the font has no width for.
fn heuristic_width(text: &str) -> f64 {
    match text.chars().next() {
        Some(' ') => 0.25,
        Some(c) if is_wide(c) => 1.0,
        _ => 0.5,
    }
}

/// Split a shown string into character codes.
///
/// Identity-encoded fonts use two-byte big-endian codes; a trailing odd
/// byte becomes a one-byte code. Other fonts use one byte per code.
pub fn split_codes(bytes: &[u8], identity: bool) -> impl Iterator<Item = (u32, &[u8])> {
    let width = if identity { 2 } else { 1 };
    bytes.chunks(width).map(|raw| (code_from_bytes(raw), raw))
}

/// Glyphs drawn for one character code.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    /// One entry per decoded Unicode scalar; empty when the code decodes to nothing.
    pub chars: Vec<PositionedChar>,
    /// Text space displacement `(tx, ty)` to apply to the text matrix.
    pub advance: (f64, f64),
}

/// Computes device positions of shown glyphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphPositioner {
    norm: UnicodeNorm,
}

impl GlyphPositioner {
    pub fn new(norm: UnicodeNorm) -> Self {
        Self { norm }
    }

    /// Position one character code.
    ///
    /// `first_index` is the stream index given to the first produced glyph;
    /// further scalars of the same code take the following indices.
    pub fn position(
        &self,
        code: u32,
        raw: &[u8],
        font: &dyn Font,
        state: &TextState,
        ctm: &Transform,
        first_index: usize,
    ) -> GlyphRun {
        let decoded = font.decode_to_unicode(raw);
        let text = self.norm.normalize(&decoded);

        let fs = state.font_size;
        let word_spacing = if raw.len() == 1 && code == 32 {
            state.word_spacing
        } else {
            0.0
        };
        let vertical = font.is_vertical();
        let advance = if vertical {
            (0.0, -(fs + state.char_spacing + word_spacing))
        } else {
            let w = font
                .width_of(code)
                .map_or_else(|| heuristic_width(&text), |w| w / 1000.0);
            (
                (w * fs + state.char_spacing + word_spacing) * state.h_scaling_normalized(),
                0.0,
            )
        };

        let scalars: Vec<char> = text.chars().collect();
        if scalars.is_empty() {
            return GlyphRun {
                chars: Vec::new(),
                advance,
            };
        }

        let render = state.text_matrix().concat(ctm);
        let origin = render.apply(0.0, state.rise);
        let device_advance = render.apply_delta(advance.0, advance.1);
        let size_vec = render.apply_delta(0.0, fs);
        let device_size = size_vec.x.hypot(size_vec.y);

        // Glyph space carries the font size and horizontal scaling, so a
        // negative `Tf` or `Tz` turns the glyph.
        let sx = fs * state.h_scaling_normalized();
        let glyph_scale = Transform::new(sx, 0.0, 0.0, fs, 0.0, 0.0);
        let glyph_space = if glyph_scale.a == 0.0 || glyph_scale.d == 0.0 {
            render
        } else {
            glyph_scale.concat(&render)
        };
        let (rotation, writing_mode) = if vertical {
            (Rotation::from_transform(&glyph_space).turned(3), WritingMode::Vertical)
        } else {
            (Rotation::from_transform(&glyph_space), WritingMode::Horizontal)
        };

        let n = scalars.len() as f64;
        let (step_x, step_y) = (device_advance.x / n, device_advance.y / n);
        let chars = scalars
            .into_iter()
            .enumerate()
            .map(|(k, unicode)| PositionedChar {
                unicode,
                code,
                index: first_index + k,
                x: origin.x + step_x * k as f64,
                y: origin.y + step_y * k as f64,
                dx: step_x,
                dy: step_y,
                font_size: device_size,
                rotation,
                writing_mode,
                font_name: font.name().to_string(),
            })
            .collect();

        GlyphRun { chars, advance }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::SimpleFont;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn state_at(x: f64, y: f64, size: f64) -> TextState {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.set_font("F1", size);
        ts.set_text_matrix(Transform::translate(x, y));
        ts
    }

    fn helv() -> SimpleFont {
        SimpleFont::new("Helv").with_widths(32, vec![250.0; 96])
    }

    // --- Code splitting ---

    #[test]
    fn single_byte_codes() {
        let codes: Vec<u32> = split_codes(b"AB", false).map(|(c, _)| c).collect();
        assert_eq!(codes, vec![65, 66]);
    }

    #[test]
    fn two_byte_codes_with_odd_tail() {
        let codes: Vec<(u32, usize)> = split_codes(&[0x4E, 0x2D, 0x41], true)
            .map(|(c, raw)| (c, raw.len()))
            .collect();
        assert_eq!(codes, vec![(0x4E2D, 2), (0x41, 1)]);
    }

    // --- Horizontal positioning ---

    #[test]
    fn upright_glyph() {
        let font = SimpleFont::new("Helv").with_width(72, 600.0);
        let ts = state_at(50.0, 700.0, 10.0);
        let run =
            GlyphPositioner::default().position(72, b"H", &font, &ts, &Transform::identity(), 0);
        assert_eq!(run.chars.len(), 1);
        let ch = &run.chars[0];
        assert_eq!(ch.unicode, 'H');
        assert!(approx(ch.x, 50.0) && approx(ch.y, 700.0));
        assert!(approx(ch.dx, 6.0) && approx(ch.dy, 0.0));
        assert!(approx(ch.font_size, 10.0));
        assert_eq!(ch.rotation, Rotation::Deg0);
        assert_eq!(ch.font_name, "Helv");
        assert!(approx(run.advance.0, 6.0));
    }

    #[test]
    fn spacing_model() {
        let font = helv();
        let mut ts = state_at(0.0, 0.0, 10.0);
        ts.char_spacing = 1.0;
        ts.word_spacing = 3.0;
        ts.h_scaling = 50.0;
        let p = GlyphPositioner::default();
        let space = p.position(32, b" ", &font, &ts, &Transform::identity(), 0);
        // (0.25 * 10 + 1 + 3) * 0.5
        assert!(approx(space.advance.0, 3.25));
        let a = p.position(65, b"A", &font, &ts, &Transform::identity(), 0);
        assert!(approx(a.advance.0, 1.75));
    }

    #[test]
    fn word_spacing_skips_two_byte_space() {
        let font = SimpleFont::new("CID").with_identity_encoding().with_width(32, 500.0);
        let mut ts = state_at(0.0, 0.0, 10.0);
        ts.word_spacing = 5.0;
        let id = Transform::identity();
        let run = GlyphPositioner::default().position(32, &[0x00, 0x20], &font, &ts, &id, 0);
        assert!(approx(run.advance.0, 5.0));
    }

    #[test]
    fn rise_and_ctm_scale() {
        let font = SimpleFont::new("Helv").with_width(65, 500.0);
        let mut ts = state_at(10.0, 20.0, 12.0);
        ts.rise = 3.0;
        let ctm = Transform::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let run = GlyphPositioner::default().position(65, b"A", &font, &ts, &ctm, 0);
        let ch = &run.chars[0];
        assert!(approx(ch.x, 20.0) && approx(ch.y, 46.0));
        assert!(approx(ch.dx, 12.0));
        assert!(approx(ch.font_size, 24.0));
        // Text space advance is not scaled by the CTM.
        assert!(approx(run.advance.0, 6.0));
    }

    #[test]
    fn heuristic_widths_when_font_has_none() {
        let font = SimpleFont::new("Bare").with_identity_encoding();
        let ts = state_at(0.0, 0.0, 10.0);
        let p = GlyphPositioner::default();
        let id = Transform::identity();
        assert!(approx(p.position(0x20, &[0x00, 0x20], &font, &ts, &id, 0).advance.0, 2.5));
        assert!(approx(p.position(0x41, &[0x00, 0x41], &font, &ts, &id, 0).advance.0, 5.0));
        assert!(approx(p.position(0x4E2D, &[0x4E, 0x2D], &font, &ts, &id, 0).advance.0, 10.0));
    }

    #[test]
    fn rotation_classes() {
        let font = helv();
        let p = GlyphPositioner::default();
        let cases = [
            (Transform::new(0.0, 1.0, -1.0, 0.0, 0.0, 0.0), Rotation::Deg90, (0.0, 2.5)),
            (Transform::new(-1.0, 0.0, 0.0, -1.0, 0.0, 0.0), Rotation::Deg180, (-2.5, 0.0)),
            (Transform::new(0.0, -1.0, 1.0, 0.0, 0.0, 0.0), Rotation::Deg270, (0.0, -2.5)),
        ];
        for (tm, rotation, (dx, dy)) in cases {
            let mut ts = state_at(0.0, 0.0, 10.0);
            ts.set_text_matrix(tm);
            let ch = &p.position(65, b"A", &font, &ts, &Transform::identity(), 0).chars[0];
            assert_eq!(ch.rotation, rotation);
            assert!(approx(ch.dx, dx) && approx(ch.dy, dy), "{rotation:?}: {} {}", ch.dx, ch.dy);
        }
    }

    #[test]
    fn negative_font_size_turns_glyph() {
        let font = helv();
        let ts = state_at(50.0, 700.0, -12.0);
        let ch = &GlyphPositioner::default()
            .position(65, b"A", &font, &ts, &Transform::identity(), 0)
            .chars[0];
        assert_eq!(ch.rotation, Rotation::Deg180);
        assert!(approx(ch.dx, -3.0) && approx(ch.dy, 0.0));
        assert!(approx(ch.font_size, 12.0));
    }

    #[test]
    fn negative_h_scaling_mirrors_glyph() {
        let font = helv();
        let mut ts = state_at(0.0, 0.0, 10.0);
        ts.h_scaling = -100.0;
        let ch = &GlyphPositioner::default()
            .position(65, b"A", &font, &ts, &Transform::identity(), 0)
            .chars[0];
        assert!(approx(ch.dx, -2.5));
        // a < 0 with d > 0 keeps the upright class.
        assert_eq!(ch.rotation, Rotation::Deg0);
    }

    #[test]
    fn zero_font_size_classes_from_matrix() {
        let font = helv();
        let ts = state_at(0.0, 0.0, 0.0);
        let ch = &GlyphPositioner::default()
            .position(65, b"A", &font, &ts, &Transform::identity(), 0)
            .chars[0];
        assert_eq!(ch.rotation, Rotation::Deg0);
    }

    // --- Multi-scalar and empty decodes ---

    #[test]
    fn ligature_splits_advance() {
        let font = SimpleFont::new("Lig").with_to_unicode(1, "ffi").with_width(1, 900.0);
        let ts = state_at(0.0, 0.0, 10.0);
        let id = Transform::identity();
        let run = GlyphPositioner::default().position(1, &[1], &font, &ts, &id, 7);
        let xs: Vec<f64> = run.chars.iter().map(|c| c.x).collect();
        assert_eq!(run.chars.len(), 3);
        assert!(approx(xs[1], 3.0) && approx(xs[2], 6.0));
        assert!(run.chars.iter().all(|c| approx(c.dx, 3.0)));
        assert_eq!(run.chars[2].index, 9);
        assert!(approx(run.advance.0, 9.0));
    }

    #[test]
    fn empty_decode_still_advances() {
        let font = SimpleFont::new("Empty").with_to_unicode(5, "").with_width(5, 400.0);
        let ts = state_at(0.0, 0.0, 10.0);
        let id = Transform::identity();
        let run = GlyphPositioner::default().position(5, &[5], &font, &ts, &id, 0);
        assert!(run.chars.is_empty());
        assert!(approx(run.advance.0, 4.0));
    }

    #[test]
    fn normalization_applied() {
        let font = SimpleFont::new("Lig").with_to_unicode(1, "\u{FB01}").with_width(1, 500.0);
        let ts = state_at(0.0, 0.0, 10.0);
        let id = Transform::identity();
        let run = GlyphPositioner::new(UnicodeNorm::Nfkc).position(1, &[1], &font, &ts, &id, 0);
        let text: String = run.chars.iter().map(|c| c.unicode).collect();
        assert_eq!(text, "fi");
    }

    // --- Vertical writing ---

    #[test]
    fn vertical_font_advances_downward() {
        let font = SimpleFont::new("V").with_identity_encoding().with_vertical_writing();
        let mut ts = state_at(100.0, 500.0, 10.0);
        ts.char_spacing = 1.0;
        ts.h_scaling = 50.0;
        let id = Transform::identity();
        let run = GlyphPositioner::default().position(0x4E2D, &[0x4E, 0x2D], &font, &ts, &id, 0);
        let ch = &run.chars[0];
        assert_eq!(run.advance, (0.0, -11.0));
        assert!(approx(ch.dy, -11.0) && approx(ch.dx, 0.0));
        assert_eq!(ch.rotation, Rotation::Deg270);
        assert_eq!(ch.writing_mode, WritingMode::Vertical);
    }
}
