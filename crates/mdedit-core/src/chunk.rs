//! Five-region text decomposition.
//!
//! A [`Chunk`] splits the text around a selection into `before`, `start_tag`, `selection`,
//! `end_tag` and `after`. Commands pull markup delimiters out of the neighbouring regions into
//! the tag slots, inspect or replace them, and hand the chunk back for flattening.
//!
//! Every operation here is total: a pattern that does not match leaves the chunk untouched.

use regex::Regex;

use crate::line_ending::normalize_line_endings;

/// The text around a selection, split into five contiguous regions.
///
/// While the chunk is flat, `before + start_tag + selection + end_tag + after` is the full text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    /// Text preceding the start tag.
    pub before: String,
    /// Markup delimiter logically attached to the start of the selection.
    pub start_tag: String,
    /// Selected text.
    pub selection: String,
    /// Markup delimiter logically attached to the end of the selection.
    pub end_tag: String,
    /// Text following the end tag.
    pub after: String,
    /// Scroll offset of the surface the chunk was taken from.
    pub scroll_offset: usize,
}

/// A delimiter pattern compiled for matching at the end and at the start of a region.
#[derive(Debug, Clone)]
pub struct TagPattern {
    at_end: Regex,
    at_start: Regex,
}

impl TagPattern {
    /// Compile `pattern` into its end-anchored and start-anchored forms.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            at_end: Regex::new(&format!("(?:{pattern})$"))?,
            at_start: Regex::new(&format!("^(?:{pattern})"))?,
        })
    }

    fn match_end(&self, text: &str) -> Option<usize> {
        self.at_end.find(text).map(|m| m.start())
    }

    fn match_start(&self, text: &str) -> Option<usize> {
        self.at_start.find(text).map(|m| m.end())
    }
}

impl Chunk {
    /// Create a chunk with empty tags.
    pub fn new(
        before: impl Into<String>,
        selection: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            before: before.into(),
            selection: selection.into(),
            after: after.into(),
            ..Self::default()
        }
    }

    /// Concatenation of all five regions.
    pub fn text(&self) -> String {
        [
            self.before.as_str(),
            &self.start_tag,
            &self.selection,
            &self.end_tag,
            &self.after,
        ]
        .concat()
    }

    /// Pull delimiters matching `start` / `end` out of the regions next to the selection.
    ///
    /// The `start` match at the end of `before` and the one at the start of `selection` move into
    /// `start_tag`; the `end` match at the end of `selection` and the one at the start of `after`
    /// move into `end_tag`. Text order is preserved, so the chunk stays flat.
    pub fn find_tags(&mut self, start: Option<&TagPattern>, end: Option<&TagPattern>) {
        if let Some(pattern) = start {
            if let Some(at) = pattern.match_end(&self.before) {
                let tail = self.before.split_off(at);
                self.start_tag.insert_str(0, &tail);
            }
            if let Some(len) = pattern.match_start(&self.selection) {
                let head: String = self.selection.drain(..len).collect();
                self.start_tag.push_str(&head);
            }
        }

        if let Some(pattern) = end {
            if let Some(at) = pattern.match_end(&self.selection) {
                let tail = self.selection.split_off(at);
                self.end_tag.insert_str(0, &tail);
            }
            if let Some(len) = pattern.match_start(&self.after) {
                let head: String = self.after.drain(..len).collect();
                self.end_tag.push_str(&head);
            }
        }
    }

    /// Strip leading and trailing whitespace from the selection.
    ///
    /// When `remove` is false the whitespace is kept in the text: leading whitespace is appended
    /// to `before` and trailing whitespace is prepended to `after`.
    pub fn trim_whitespace(&mut self, remove: bool) {
        let lead = self.selection.len() - self.selection.trim_start().len();
        let head: String = self.selection.drain(..lead).collect();
        let keep = self.selection.trim_end().len();
        let tail = self.selection.split_off(keep);

        if !remove {
            self.before.push_str(&head);
            self.after.insert_str(0, &tail);
        }
    }

    /// Normalize the blank lines around the selection.
    ///
    /// Newlines at either edge of the selection move out through the tags into `before` and
    /// `after`. Then the run of newlines at the end of `before` is replaced by exactly
    /// `lines_before + 1` newlines (only the last `lines_before + 1` of them are considered unless
    /// `collapse_all`), and the same happens at the start of `after`. Empty neighbours are left
    /// empty.
    pub fn skip_lines(&mut self, lines_before: usize, lines_after: usize, collapse_all: bool) {
        let newlines_before = lines_before + 1;
        let newlines_after = lines_after + 1;

        let lead = leading_newlines(&self.selection);
        let head: String = self.selection.drain(..lead).collect();
        self.start_tag.push_str(&head);

        let trail = trailing_newlines(&self.selection);
        let tail = self.selection.split_off(self.selection.len() - trail);
        self.end_tag.insert_str(0, &tail);

        let lead = leading_newlines(&self.start_tag);
        let head: String = self.start_tag.drain(..lead).collect();
        self.before.push_str(&head);

        let trail = trailing_newlines(&self.end_tag);
        let tail = self.end_tag.split_off(self.end_tag.len() - trail);
        self.after.insert_str(0, &tail);

        if !self.before.is_empty() {
            let mut strip = trailing_newlines(&self.before);
            if !collapse_all {
                strip = strip.min(newlines_before);
            }
            self.before.truncate(self.before.len() - strip);
            self.before.push_str(&"\n".repeat(newlines_before));
        }

        if !self.after.is_empty() {
            let mut strip = leading_newlines(&self.after);
            if !collapse_all {
                strip = strip.min(newlines_after);
            }
            self.after.replace_range(..strip, &"\n".repeat(newlines_after));
        }
    }

    /// Fold the tags back into their neighbours: `start_tag` onto the end of `before`, `end_tag`
    /// onto the start of `after`.
    pub fn merge_tags(&mut self) {
        let start = std::mem::take(&mut self.start_tag);
        self.before.push_str(&start);
        let end = std::mem::take(&mut self.end_tag);
        self.after.insert_str(0, &end);
    }

    /// Convert CRLF and CR newlines to LF in every region.
    pub fn normalize_line_endings(&mut self) {
        for region in [
            &mut self.before,
            &mut self.start_tag,
            &mut self.selection,
            &mut self.end_tag,
            &mut self.after,
        ] {
            if let std::borrow::Cow::Owned(fixed) = normalize_line_endings(region) {
                *region = fixed;
            }
        }
    }
}

pub(crate) fn leading_newlines(text: &str) -> usize {
    text.len() - text.trim_start_matches('\n').len()
}

pub(crate) fn trailing_newlines(text: &str) -> usize {
    text.len() - text.trim_end_matches('\n').len()
}
