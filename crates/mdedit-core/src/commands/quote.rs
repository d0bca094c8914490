//! Blockquote toggling.
//!
//! Quoting a selection adopts any blockquote directly above or below it, so toggling inside an
//! existing quote extends or splits that quote instead of nesting a new one.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::chunk::{Chunk, leading_newlines, trailing_newlines};
use crate::commands::reflow;
use crate::hooks::HookSet;
use crate::settings::EditorSettings;

static QUOTE_BELOW: LazyLock<Regex> = lazy_regex!(
    r"^(?:(?:(?:\n|^)(?:\n[ \t]*)*>(?:.+\n)*.*)+(?:\n[ \t]*)*)",
    "quote continuation regex should compile",
);

static BLANKS_AT_TAG_END: LazyLock<Regex> = lazy_regex!(
    r"\n((?:>|\s)*)\n$",
    "blank quote line regex should compile",
);

static BLANKS_AT_TAG_START: LazyLock<Regex> = lazy_regex!(
    r"^\n((?:>|\s)*)\n",
    "blank quote line regex should compile",
);

static STARTS_QUOTED: LazyLock<Regex> = lazy_regex!(
    r"^(?:\n|^)[ ]{0,3}>",
    "quoted start regex should compile",
);

static ENDS_QUOTED: LazyLock<Regex> = lazy_regex!(
    r"(?:\n|^)[ ]{0,3}>.*$",
    "quoted end regex should compile",
);

/// Toggle a blockquote around the chunk's selection.
pub fn quote(chunk: &mut Chunk, settings: &EditorSettings, hooks: &HookSet) {
    peel_newlines(chunk);

    let blank_marker = chunk.before.trim_end_matches([' ', '\t']);
    if blank_marker.ends_with('>') {
        let at = blank_marker.len() - 1;
        let marker = chunk.before.split_off(at);
        chunk.selection.insert_str(0, &marker);
    }

    if chunk
        .selection
        .chars()
        .all(|c| c.is_whitespace() || c == '>')
    {
        chunk.selection.clear();
    }
    if chunk.selection.is_empty() {
        chunk.selection = settings.strings.quote_example.clone();
    }

    adopt_quote_above(chunk);
    adopt_quote_below(chunk);

    if chunk.selection.split('\n').any(|line| !is_quoted_line(line)) {
        reflow::wrap(chunk, settings.line_length.saturating_sub(2));
        chunk.selection = chunk
            .selection
            .split('\n')
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        replace_blanks_in_tags(chunk, true);
        chunk.skip_lines(1, 1, false);
    } else {
        chunk.selection = chunk
            .selection
            .split('\n')
            .map(strip_quote_marker)
            .collect::<Vec<_>>()
            .join("\n");
        reflow::unwrap(chunk);
        replace_blanks_in_tags(chunk, false);

        if !STARTS_QUOTED.is_match(&chunk.selection) && !chunk.start_tag.is_empty() {
            let strip = trailing_newlines(&chunk.start_tag).min(2);
            chunk.start_tag.truncate(chunk.start_tag.len() - strip);
            chunk.start_tag.push_str("\n\n");
        }
        if !ENDS_QUOTED.is_match(&chunk.selection) && !chunk.end_tag.is_empty() {
            let strip = leading_newlines(&chunk.end_tag).min(2);
            chunk.end_tag.replace_range(..strip, "\n\n");
        }
    }

    chunk.selection = hooks.post_blockquote_creation(&chunk.selection);

    if !chunk.selection.contains('\n') && chunk.selection.starts_with('>') {
        let marker_len = chunk.selection.len() - chunk.selection[1..].trim_start_matches(' ').len();
        let marker: String = chunk.selection.drain(..marker_len).collect();
        chunk.start_tag.push_str(&marker);
    }
}

/// Move newlines at the edges of the selection into the surrounding text.
///
/// A selection made only of newlines keeps its last one.
fn peel_newlines(chunk: &mut Chunk) {
    let len = chunk.selection.len();
    if len == 0 {
        return;
    }
    let mut lead = leading_newlines(&chunk.selection);
    let mut trail = trailing_newlines(&chunk.selection);
    if lead == len {
        lead = len - 1;
        trail = 0;
    }

    let tail = chunk.selection.split_off(len - trail);
    chunk.after.insert_str(0, &tail);
    let head: String = chunk.selection.drain(..lead).collect();
    chunk.before.push_str(&head);
}

/// Move the quote lines directly above the selection from `before` into `start_tag`.
///
/// Walking down the lines of `before`, a line belongs to the trailing run if it starts with `>`,
/// is blank, or continues an unbroken chain of non-empty lines opened by a `>` line with content.
/// The run is adopted only if at least one of its lines starts with `>`.
fn adopt_quote_above(chunk: &mut Chunk) {
    let mut matched = String::new();
    let mut left_over = String::new();

    if !chunk.before.is_empty() {
        let body = chunk.before.strip_suffix('\n').unwrap_or(&chunk.before);
        let mut in_chain = false;

        for line in body.split('\n') {
            in_chain = in_chain && !line.is_empty();
            let good = if line.starts_with('>') {
                if !in_chain && line.len() > 1 {
                    in_chain = true;
                }
                true
            } else if line.chars().all(|c| c == ' ' || c == '\t') {
                true
            } else {
                in_chain
            };

            if good {
                matched.push_str(line);
                matched.push('\n');
            } else {
                left_over.push_str(&matched);
                left_over.push_str(line);
                matched = String::from("\n");
            }
        }

        if !(matched.starts_with('>') || matched.contains("\n>")) {
            left_over.push_str(&matched);
            matched.clear();
        }
    }

    chunk.start_tag = matched;
    chunk.before = left_over;
}

/// Move the quote lines directly below the selection from `after` into `end_tag`.
fn adopt_quote_below(chunk: &mut Chunk) {
    if !chunk.after.is_empty() && !chunk.after.starts_with('\n') {
        chunk.after.insert(0, '\n');
    }
    if let Some(found) = QUOTE_BELOW.find(&chunk.after) {
        let end = found.end();
        if end > 0 {
            let rest = chunk.after.split_off(end);
            chunk.end_tag = std::mem::replace(&mut chunk.after, rest);
        }
    }
}

/// Rewrite the blank lines where the adopted tags meet the selection.
///
/// Quoting turns them into `> ` so the quote stays continuous; unquoting empties them.
fn replace_blanks_in_tags(chunk: &mut Chunk, use_bracket: bool) {
    let replacement = if use_bracket { "> " } else { "" };
    let rewrite = |caps: &Captures<'_>| format!("\n{}\n", blank_quote_lines(&caps[1], replacement));

    if !chunk.start_tag.is_empty() {
        chunk.start_tag = BLANKS_AT_TAG_END
            .replace(&chunk.start_tag, rewrite)
            .into_owned();
    }
    if !chunk.end_tag.is_empty() {
        chunk.end_tag = BLANKS_AT_TAG_START
            .replace(&chunk.end_tag, rewrite)
            .into_owned();
    }
}

fn blank_quote_lines(text: &str, replacement: &str) -> String {
    text.split('\n')
        .map(|line| {
            if is_blank_quote_line(line) {
                replacement
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `[ ]{0,3}>?[ \t]*`
fn is_blank_quote_line(line: &str) -> bool {
    let rest = strip_indent(line);
    let rest = rest.strip_prefix('>').unwrap_or(rest);
    rest.chars().all(|c| c == ' ' || c == '\t')
}

/// `[ ]{0,3}>`
fn is_quoted_line(line: &str) -> bool {
    strip_indent(line).starts_with('>')
}

/// Remove `[ ]{0,3}> ?` from the start of a quoted line.
fn strip_quote_marker(line: &str) -> &str {
    let rest = strip_indent(line);
    match rest.strip_prefix('>') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => line,
    }
}

/// Strip up to three leading spaces.
fn strip_indent(line: &str) -> &str {
    let spaces = line.len() - line.trim_start_matches(' ').len();
    &line[spaces.min(3)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(chunk: &mut Chunk) {
        quote(chunk, &EditorSettings::default(), &HookSet::new());
    }

    #[test]
    fn quoted_line_check_allows_three_spaces() {
        assert!(is_quoted_line("> a"));
        assert!(is_quoted_line("   >a"));
        assert!(!is_quoted_line("    > a"));
        assert!(!is_quoted_line("a"));
    }

    #[test]
    fn blank_quote_lines_are_replaced() {
        assert_eq!(blank_quote_lines(" >\n\ntext", "> "), "> \n> \ntext");
        assert_eq!(blank_quote_lines("> \t", ""), "");
    }

    #[test]
    fn quoting_plain_paragraph() {
        let mut chunk = Chunk::new("", "Hello world", "");
        run(&mut chunk);
        assert_eq!(chunk.text(), "> Hello world");
        assert_eq!(chunk.selection, "Hello world");
        assert_eq!(chunk.start_tag, "> ");
    }

    #[test]
    fn empty_selection_uses_example() {
        let mut chunk = Chunk::default();
        run(&mut chunk);
        assert_eq!(chunk.text(), "> Blockquote");
    }

    #[test]
    fn unquoting_strips_markers() {
        let mut chunk = Chunk::new("", "> one\n> two", "");
        run(&mut chunk);
        assert_eq!(chunk.text(), "one two");
    }

    #[test]
    fn adopts_quote_above() {
        let mut chunk = Chunk::new("intro\n\n> first\n", "second", "");
        adopt_quote_above(&mut chunk);
        assert_eq!(chunk.before, "intro");
        assert_eq!(chunk.start_tag, "\n\n> first\n");
    }

    #[test]
    fn lazy_continuation_belongs_to_the_quote() {
        let mut chunk = Chunk::new("> first\nlazy\n", "x", "");
        adopt_quote_above(&mut chunk);
        assert_eq!(chunk.before, "");
        assert_eq!(chunk.start_tag, "> first\nlazy\n");
    }

    #[test]
    fn plain_text_above_is_not_adopted() {
        let mut chunk = Chunk::new("just text\n", "x", "");
        adopt_quote_above(&mut chunk);
        assert_eq!(chunk.before, "just text\n");
        assert_eq!(chunk.start_tag, "");
    }

    #[test]
    fn adopts_quote_below() {
        let mut chunk = Chunk::new("", "x", "\n> below\nmore\n\nafter");
        adopt_quote_below(&mut chunk);
        assert_eq!(chunk.end_tag, "\n> below\nmore\n\n");
        assert_eq!(chunk.after, "after");
    }
}
