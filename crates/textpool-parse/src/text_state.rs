//! Text state for the operator interpreter.
//!
//! Tracks the text object (`BT`/`ET`), font selection (`Tf`), the spacing
//! parameters and the text and line matrices moved by `Td`, `TD`, `T*`,
//! `Tm` and by shown glyphs.

use textpool_core::Transform;

/// Text rendering mode (`Tr`). Only recorded; text is extracted in all modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextRenderMode {
    #[default]
    Fill,
    Stroke,
    FillStroke,
    Invisible,
    FillClip,
    StrokeClip,
    FillStrokeClip,
    Clip,
}

impl TextRenderMode {
    /// Mode for a `Tr` operand; `None` outside `0..=7`.
    pub fn from_i64(value: i64) -> Option<Self> {
        Some(match value {
            0 => Self::Fill,
            1 => Self::Stroke,
            2 => Self::FillStroke,
            3 => Self::Invisible,
            4 => Self::FillClip,
            5 => Self::StrokeClip,
            6 => Self::FillStrokeClip,
            7 => Self::Clip,
            _ => return None,
        })
    }
}

/// Text parameters saved and restored with the graphics state by `q`/`Q`.
///
/// The text and line matrices are not part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStateSnapshot {
    pub char_spacing: f64,
    pub word_spacing: f64,
    pub h_scaling: f64,
    pub leading: f64,
    pub font_name: String,
    pub font_size: f64,
    pub render_mode: TextRenderMode,
    pub rise: f64,
}

/// Text state of one page walk.
#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    /// `Tc`, in unscaled text space units.
    pub char_spacing: f64,
    /// `Tw`, applied to single-byte code 32 only.
    pub word_spacing: f64,
    /// `Tz`, in percent (100 = normal).
    pub h_scaling: f64,
    /// `TL`
    pub leading: f64,
    /// Resource name selected by `Tf`.
    pub font_name: String,
    /// Size selected by `Tf`, in text space units.
    pub font_size: f64,
    pub render_mode: TextRenderMode,
    /// `Ts`
    pub rise: f64,
    in_text_object: bool,
    text_matrix: Transform,
    line_matrix: Transform,
}

impl Default for TextState {
    fn default() -> Self {
        Self::new()
    }
}

impl TextState {
    pub fn new() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 100.0,
            leading: 0.0,
            font_name: String::new(),
            font_size: 0.0,
            render_mode: TextRenderMode::default(),
            rise: 0.0,
            in_text_object: false,
            text_matrix: Transform::identity(),
            line_matrix: Transform::identity(),
        }
    }

    pub fn in_text_object(&self) -> bool {
        self.in_text_object
    }

    pub fn text_matrix(&self) -> &Transform {
        &self.text_matrix
    }

    pub fn line_matrix(&self) -> &Transform {
        &self.line_matrix
    }

    /// Horizontal scaling as a fraction (1.0 = 100%).
    pub fn h_scaling_normalized(&self) -> f64 {
        self.h_scaling / 100.0
    }

    // --- BT / ET ---

    /// `BT`: reset both matrices to identity.
    pub fn begin_text(&mut self) {
        self.text_matrix = Transform::identity();
        self.line_matrix = Transform::identity();
        self.in_text_object = true;
    }

    /// `ET`: the matrices are kept for inspection.
    pub fn end_text(&mut self) {
        self.in_text_object = false;
    }

    // --- Parameters ---

    /// `Tf`
    pub fn set_font(&mut self, font_name: &str, font_size: f64) {
        font_name.clone_into(&mut self.font_name);
        self.font_size = font_size;
    }

    /// `Tr`; out-of-range modes leave the mode unchanged.
    pub fn set_render_mode(&mut self, mode: i64) {
        if let Some(mode) = TextRenderMode::from_i64(mode) {
            self.render_mode = mode;
        }
    }

    // --- Positioning ---

    /// `Tm`: replace both matrices.
    pub fn set_text_matrix(&mut self, m: Transform) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: move to the start of the next line, offset from the current one.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Transform::translate(tx, ty).concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `TD`: `-ty TL` followed by `tx ty Td`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.leading = -ty;
        self.move_text_position(tx, ty);
    }

    /// `T*`: `0 -TL Td`.
    pub fn move_to_next_line(&mut self) {
        self.move_text_position(0.0, -self.leading);
    }

    /// Move the text matrix by a text space displacement after a glyph or
    /// a `TJ` adjustment.
    pub fn advance(&mut self, tx: f64, ty: f64) {
        self.text_matrix = Transform::translate(tx, ty).concat(&self.text_matrix);
    }

    // --- q / Q ---

    pub fn save_snapshot(&self) -> TextStateSnapshot {
        TextStateSnapshot {
            char_spacing: self.char_spacing,
            word_spacing: self.word_spacing,
            h_scaling: self.h_scaling,
            leading: self.leading,
            font_name: self.font_name.clone(),
            font_size: self.font_size,
            render_mode: self.render_mode,
            rise: self.rise,
        }
    }

    pub fn restore_snapshot(&mut self, snapshot: TextStateSnapshot) {
        self.char_spacing = snapshot.char_spacing;
        self.word_spacing = snapshot.word_spacing;
        self.h_scaling = snapshot.h_scaling;
        self.leading = snapshot.leading;
        self.font_name = snapshot.font_name;
        self.font_size = snapshot.font_size;
        self.render_mode = snapshot.render_mode;
        self.rise = snapshot.rise;
    }
}
