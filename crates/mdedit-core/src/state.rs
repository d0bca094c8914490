//! Editor state snapshots.
//!
//! An [`EditorState`] is an immutable picture of the surface: full text, selection bounds and
//! scroll offset. Snapshots are what the undo history stores, and the bridge between the surface
//! and the [`Chunk`] representation commands work on.

use crate::chunk::Chunk;
use crate::surface::TextSurface;

/// Text, selection and scroll offset of the surface at one point in time.
///
/// Selection bounds are character offsets into `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    /// Full text.
    pub text: String,
    /// Selection start (character offset).
    pub selection_start: usize,
    /// Selection end (character offset).
    pub selection_end: usize,
    /// Vertical scroll offset.
    pub scroll_offset: usize,
}

impl EditorState {
    /// Create a state from its parts.
    pub fn new(text: impl Into<String>, selection_start: usize, selection_end: usize) -> Self {
        Self {
            text: text.into(),
            selection_start,
            selection_end,
            scroll_offset: 0,
        }
    }

    /// Read the current state of `surface`.
    ///
    /// Returns `None` when the surface is unavailable.
    pub fn capture<S: TextSurface + ?Sized>(surface: &S) -> Option<Self> {
        if !surface.is_available() {
            return None;
        }
        let (selection_start, selection_end) = surface.selection();
        Some(Self {
            text: surface.text(),
            selection_start,
            selection_end,
            scroll_offset: surface.scroll_offset(),
        })
    }

    /// Split the text at the selection bounds.
    ///
    /// Bounds past the end of the text are clamped, and a reversed selection is ordered.
    pub fn to_chunk(&self) -> Chunk {
        let char_count = self.text.chars().count();
        let start = self.selection_start.min(char_count);
        let end = self.selection_end.min(char_count);
        let (start, end) = (start.min(end), start.max(end));

        let start_byte = char_to_byte(&self.text, start);
        let end_byte = char_to_byte(&self.text, end);

        Chunk {
            before: self.text[..start_byte].to_string(),
            selection: self.text[start_byte..end_byte].to_string(),
            after: self.text[end_byte..].to_string(),
            scroll_offset: self.scroll_offset,
            ..Chunk::default()
        }
    }

    /// Flatten a chunk into a state selecting the chunk's selection.
    ///
    /// Tags are merged into their neighbours first, so they end up outside the selection.
    pub fn from_chunk(mut chunk: Chunk) -> Self {
        chunk.merge_tags();
        let selection_start = chunk.before.chars().count();
        let selection_end = selection_start + chunk.selection.chars().count();

        let mut text = chunk.before;
        text.reserve(chunk.selection.len() + chunk.after.len());
        text.push_str(&chunk.selection);
        text.push_str(&chunk.after);

        Self {
            text,
            selection_start,
            selection_end,
            scroll_offset: chunk.scroll_offset,
        }
    }

    /// Write this state back to `surface`.
    ///
    /// The text is only replaced when it differs from the surface's current text.
    pub fn restore<S: TextSurface + ?Sized>(&self, surface: &mut S) {
        if !surface.is_available() {
            return;
        }
        if surface.text() != self.text {
            surface.set_text(&self.text);
        }
        surface.set_selection(self.selection_start, self.selection_end);
        surface.set_scroll_offset(self.scroll_offset);
    }
}

fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(byte, _)| byte)
}
