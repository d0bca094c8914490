//! Structured text change deltas.
//!
//! A committed command rewrites the whole surface text, but collaborators that mirror the text
//! elsewhere (a host data model, a preview pane) usually want to know *what* changed without
//! diffing old and new text themselves. [`TextDelta::between`] computes the single replaced span
//! expressed in **character offsets** (Unicode scalar values).

/// A single text edit expressed in character offsets.
///
/// Semantics:
/// - `start` is a character offset in the document **before** the edit.
/// - The deleted range is defined by the length (in `char`s) of `deleted_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDeltaEdit {
    /// Start character offset of the edit.
    pub start: usize,
    /// Exact deleted text (may be empty).
    pub deleted_text: String,
    /// Exact inserted text (may be empty).
    pub inserted_text: String,
}

impl TextDeltaEdit {
    /// Length of `deleted_text` in characters.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    /// Length of `inserted_text` in characters.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// Exclusive end character offset in the pre-edit document.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.deleted_len())
    }
}

/// A structured description of a document text change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelta {
    /// Character count before applying `edits`.
    pub before_char_count: usize,
    /// Character count after applying `edits`.
    pub after_char_count: usize,
    /// Ordered list of edits that transforms the "before" document into the "after" document.
    pub edits: Vec<TextDeltaEdit>,
}

impl TextDelta {
    /// Describe the change from `before` to `after` as one replaced span.
    ///
    /// The span is bounded by the longest common prefix and suffix, so identical texts produce
    /// an empty delta.
    pub fn between(before: &str, after: &str) -> Self {
        let before_chars: Vec<char> = before.chars().collect();
        let after_chars: Vec<char> = after.chars().collect();

        let prefix = before_chars
            .iter()
            .zip(&after_chars)
            .take_while(|(a, b)| a == b)
            .count();
        let max_suffix = before_chars.len().min(after_chars.len()) - prefix;
        let suffix = before_chars
            .iter()
            .rev()
            .zip(after_chars.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();

        let deleted: String = before_chars[prefix..before_chars.len() - suffix]
            .iter()
            .collect();
        let inserted: String = after_chars[prefix..after_chars.len() - suffix]
            .iter()
            .collect();

        let edits = if deleted.is_empty() && inserted.is_empty() {
            Vec::new()
        } else {
            vec![TextDeltaEdit {
                start: prefix,
                deleted_text: deleted,
                inserted_text: inserted,
            }]
        };

        Self {
            before_char_count: before_chars.len(),
            after_char_count: after_chars.len(),
            edits,
        }
    }

    /// Returns `true` if this delta contains no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}
