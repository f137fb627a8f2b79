//! Graphics state stack: the current transform and its `q`/`Q` save points.

use textpool_core::Transform;

use crate::text_state::TextStateSnapshot;

#[derive(Debug, Clone)]
struct SavedState {
    ctm: Transform,
    text: TextStateSnapshot,
}

/// Current transformation matrix plus the save stack.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    ctm: Transform,
    stack: Vec<SavedState>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new(Transform::identity())
    }
}

impl GraphicsState {
    /// Start with `initial` as the CTM, usually the page transform.
    pub fn new(initial: Transform) -> Self {
        Self {
            ctm: initial,
            stack: Vec::new(),
        }
    }

    pub fn ctm(&self) -> &Transform {
        &self.ctm
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// `q`: push the CTM together with the text parameters.
    pub fn save(&mut self, text: TextStateSnapshot) {
        self.stack.push(SavedState {
            ctm: self.ctm,
            text,
        });
    }

    /// `Q`: pop the last save point, returning its text parameters.
    ///
    /// Returns `None` and leaves the state untouched when the stack is empty.
    pub fn restore(&mut self) -> Option<TextStateSnapshot> {
        let saved = self.stack.pop()?;
        self.ctm = saved.ctm;
        Some(saved.text)
    }

    /// `cm`: `ctm = m × ctm`.
    pub fn concat(&mut self, m: &Transform) {
        self.ctm = m.concat(&self.ctm);
    }
}
