//! The text input the editor drives.
//!
//! The engine never owns the visible text. It reads the text, selection and scroll offset from a
//! [`TextSurface`], computes a replacement, and writes the result back. All offsets are character
//! offsets.

/// A plain-text input control with a selection.
pub trait TextSurface {
    /// Whether the surface can currently be read and written (e.g. it is visible).
    ///
    /// An unavailable surface makes the editor skip the step entirely.
    fn is_available(&self) -> bool {
        true
    }

    /// Current full text.
    fn text(&self) -> String;

    /// Current selection as `(start, end)` character offsets.
    fn selection(&self) -> (usize, usize);

    /// Current vertical scroll offset.
    fn scroll_offset(&self) -> usize;

    /// Replace the full text.
    fn set_text(&mut self, text: &str);

    /// Select the character range `start..end`.
    fn set_selection(&mut self, start: usize, end: usize);

    /// Set the vertical scroll offset.
    fn set_scroll_offset(&mut self, offset: usize);

    /// Give the surface input focus.
    fn focus(&mut self) {}
}

/// An in-memory [`TextSurface`] for headless use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySurface {
    text: String,
    selection: (usize, usize),
    scroll_offset: usize,
    hidden: bool,
    text_writes: usize,
}

impl MemorySurface {
    /// Create a surface holding `text` with the caret at the end.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let end = text.chars().count();
        Self {
            text,
            selection: (end, end),
            ..Self::default()
        }
    }

    /// Builder-style selection setter.
    pub fn with_selection(mut self, start: usize, end: usize) -> Self {
        self.selection = (start, end);
        self
    }

    /// Select the first occurrence of `needle`. Leaves the selection unchanged if absent.
    pub fn select_text(&mut self, needle: &str) -> bool {
        let Some(byte) = self.text.find(needle) else {
            return false;
        };
        let start = self.text[..byte].chars().count();
        self.selection = (start, start + needle.chars().count());
        true
    }

    /// Text currently covered by the selection.
    pub fn selected_text(&self) -> String {
        let (start, end) = self.selection;
        self.text
            .chars()
            .skip(start.min(end))
            .take(start.max(end) - start.min(end))
            .collect()
    }

    /// Simulate the user typing `text` over the selection, as the host control would.
    ///
    /// The editor is not involved; hosts report the edit through
    /// [`MarkdownEditor::input_applied`](crate::MarkdownEditor::input_applied).
    pub fn type_text(&mut self, text: &str) {
        let (start, end) = self.selection;
        let (start, end) = (start.min(end), start.max(end));
        let mut chars: Vec<char> = self.text.chars().collect();
        let end = end.min(chars.len());
        let start = start.min(end);
        chars.splice(start..end, text.chars());
        self.text = chars.into_iter().collect();
        let caret = start + text.chars().count();
        self.selection = (caret, caret);
    }

    /// Simulate a backspace at the caret (or over the selection).
    pub fn backspace(&mut self) {
        let (start, end) = self.selection;
        if start == end {
            if start == 0 {
                return;
            }
            self.selection = (start - 1, end);
        }
        self.type_text("");
    }

    /// Hide or show the surface.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Number of times the text was replaced through [`TextSurface::set_text`].
    pub fn text_writes(&self) -> usize {
        self.text_writes
    }
}

impl TextSurface for MemorySurface {
    fn is_available(&self) -> bool {
        !self.hidden
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn selection(&self) -> (usize, usize) {
        self.selection
    }

    fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.text_writes += 1;
    }

    fn set_selection(&mut self, start: usize, end: usize) {
        self.selection = (start, end);
    }

    fn set_scroll_offset(&mut self, offset: usize) {
        self.scroll_offset = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_replaces_the_selection() {
        let mut surface = MemorySurface::new("Hello world").with_selection(6, 11);
        surface.type_text("there");
        assert_eq!(surface.text(), "Hello there");
        assert_eq!(surface.selection(), (11, 11));
        assert_eq!(surface.text_writes(), 0);
    }

    #[test]
    fn select_text_uses_char_offsets() {
        let mut surface = MemorySurface::new("héllo wörld");
        assert!(surface.select_text("wörld"));
        assert_eq!(surface.selection(), (6, 11));
        assert_eq!(surface.selected_text(), "wörld");
    }

    #[test]
    fn backspace_at_start_does_nothing() {
        let mut surface = MemorySurface::new("abc").with_selection(0, 0);
        surface.backspace();
        assert_eq!(surface.text(), "abc");
    }
}
