//! The editable text surface of one block.
//!
//! A surface holds the live runs and the caret or text selection. During
//! typing it may run ahead of the model; the editor reads it back on input
//! and only overwrites it from the model when it is safe to, tracking pending
//! overwrites with a dirty flag.

use crate::caret::{self, TextRange};
use crate::codec::{self, TextSegment};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    runs: Vec<TextSegment>,
    selection: TextRange,
    dirty: bool,
}

impl Surface {
    pub fn new(content: &[TextSegment]) -> Self {
        Self {
            runs: codec::normalize(content.to_vec()),
            selection: TextRange::default(),
            dirty: false,
        }
    }

    pub fn runs(&self) -> &[TextSegment] {
        &self.runs
    }

    pub fn markup(&self) -> String {
        codec::to_markup(&self.runs)
    }

    /// Content as the model should store it, read back through the markup.
    pub fn segments(&self) -> Vec<TextSegment> {
        codec::from_markup(&self.markup())
    }

    pub fn plain_text(&self) -> String {
        codec::plain_text(&self.runs)
    }

    pub fn len(&self) -> usize {
        caret::text_len(&self.runs)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn selection(&self) -> TextRange {
        self.selection
    }

    pub fn set_selection(&mut self, range: TextRange) {
        self.selection = range.clamp(self.len());
    }

    pub fn select_all(&mut self) {
        self.selection = TextRange::new(0, self.len());
    }

    pub fn caret_to_start(&mut self) {
        self.selection = TextRange::collapsed(0);
    }

    pub fn caret_to_end(&mut self) {
        self.selection = TextRange::collapsed(self.len());
    }

    /// Whether all text is highlighted, or there is no text.
    pub fn is_fully_selected(&self) -> bool {
        let len = self.len();
        len == 0 || (self.selection.start == 0 && self.selection.end >= len)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Replaces the content from the model. The selection is clamped to the
    /// new length.
    pub fn load(&mut self, content: &[TextSegment]) {
        self.runs = codec::normalize(content.to_vec());
        self.dirty = false;
        self.selection = self.selection.clamp(self.len());
    }

    /// Replaces the current selection with `text`.
    pub fn insert_text(&mut self, text: &str) {
        let range = self.selection;
        let runs = if range.is_collapsed() {
            self.runs.clone()
        } else {
            caret::delete_range(&self.runs, range)
        };
        self.runs = caret::insert_text(&runs, range.start, text);
        self.selection = TextRange::collapsed(range.start + caret::grapheme_len(text));
    }

    pub fn delete_range(&mut self, range: TextRange) {
        let range = range.clamp(self.len());
        self.runs = caret::delete_range(&self.runs, range);
        self.selection = TextRange::collapsed(range.start);
    }

    /// Backspace inside the text: removes the selection, or the grapheme
    /// before the caret.
    pub fn delete_backward(&mut self) {
        let range = self.selection;
        if !range.is_collapsed() {
            self.delete_range(range);
        } else if range.start > 0 {
            self.delete_range(TextRange::new(range.start - 1, range.start));
        }
    }

    pub fn delete_forward(&mut self) {
        let range = self.selection;
        if !range.is_collapsed() {
            self.delete_range(range);
        } else if range.end < self.len() {
            self.delete_range(TextRange::new(range.end, range.end + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_advances_caret() {
        let mut surface = Surface::new(&[]);
        surface.insert_text("hé");
        surface.insert_text("llo");
        assert_eq!(surface.plain_text(), "héllo");
        assert_eq!(surface.selection(), TextRange::collapsed(5));
    }

    #[test]
    fn test_typing_over_selection() {
        let mut surface = Surface::new(&[TextSegment::plain("hello")]);
        surface.set_selection(TextRange::new(1, 4));
        surface.insert_text("EY");
        assert_eq!(surface.plain_text(), "hEYo");
        assert_eq!(surface.selection(), TextRange::collapsed(3));
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut surface = Surface::new(&[TextSegment::plain("abc")]);
        surface.set_selection(TextRange::collapsed(1));
        surface.delete_backward();
        assert_eq!(surface.plain_text(), "bc");
        surface.delete_backward();
        assert_eq!(surface.plain_text(), "bc");
        surface.delete_forward();
        assert_eq!(surface.plain_text(), "c");
    }

    #[test]
    fn test_load_clamps_selection() {
        let mut surface = Surface::new(&[TextSegment::plain("hello")]);
        surface.caret_to_end();
        surface.mark_dirty();
        surface.load(&[TextSegment::plain("hi")]);
        assert_eq!(surface.selection(), TextRange::collapsed(2));
        assert!(!surface.is_dirty());
    }

    #[test]
    fn test_fully_selected() {
        let mut surface = Surface::new(&[TextSegment::plain("ab")]);
        assert!(!surface.is_fully_selected());
        surface.select_all();
        assert!(surface.is_fully_selected());
        assert!(Surface::new(&[]).is_fully_selected());
    }
}
