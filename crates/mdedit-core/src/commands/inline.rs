//! Inline markup: delimiter wrapping and code.

use std::sync::LazyLock;

use regex::Regex;

use crate::chunk::{Chunk, TagPattern};

static BLANK_LINES: LazyLock<Regex> = lazy_regex!(r"\n{2,}", "blank line regex should compile");

static INDENTED_LINE_BEFORE: LazyLock<Regex> = lazy_regex!(
    r"(?:\n|^)(?:\t|[ ]{4,}).*\n$",
    "indented line regex should compile",
);

static INDENTED_LINE_AFTER: LazyLock<Regex> = lazy_regex!(
    r"^\n(?:\t|[ ]{4,})",
    "indented line regex should compile",
);

static UNINDENTED_LINE: LazyLock<Regex> = lazy_regex!(
    r"(?m)^[ ]{0,3}\S",
    "unindented line regex should compile",
);

static ONE_INDENT: LazyLock<Regex> = lazy_regex!(
    r"(?m)^(?:[ ]{4}|[ ]{0,3}\t)",
    "indent regex should compile",
);

static BACKTICK: LazyLock<TagPattern> = LazyLock::new(|| {
    TagPattern::new("`").expect("backtick pattern should compile")
});

/// Indent used by markdown code blocks.
const CODE_INDENT: &str = "    ";

/// Add or remove `left`/`right` around the selection.
///
/// The selection is trimmed first (the whitespace stays in the text) and runs of blank lines
/// inside it collapse to single newlines. With `toggle`, delimiters already present directly
/// around the selection are removed instead of doubled. Returns `false` for an empty selection.
pub fn do_wrap(chunk: &mut Chunk, left: &str, right: &str, toggle: bool) -> bool {
    chunk.trim_whitespace(false);
    if let std::borrow::Cow::Owned(collapsed) = BLANK_LINES.replace_all(&chunk.selection, "\n") {
        chunk.selection = collapsed;
    }
    if chunk.selection.is_empty() {
        return false;
    }

    if toggle && is_wrapped(chunk, left, right) {
        if let Some(stripped) = chunk.before.strip_suffix(left) {
            chunk.before.truncate(stripped.len());
        }
        if let Some(stripped) = chunk.after.strip_prefix(right) {
            chunk.after = stripped.to_string();
        }
    } else {
        chunk.before.push_str(left);
        chunk.after.insert_str(0, right);
    }
    true
}

/// Whether the selection is already surrounded by enough delimiter characters to unwrap.
///
/// `***text***` counts as bold-and-italic; a single `*` toggle next to exactly two stars adds
/// italics instead of stripping half of the bold.
fn is_wrapped(chunk: &Chunk, left: &str, right: &str) -> bool {
    let (Some(left_char), Some(right_char)) = (left.chars().next(), right.chars().next()) else {
        return false;
    };
    let run_before = chunk
        .before
        .chars()
        .rev()
        .take_while(|c| *c == left_char)
        .count();
    let run_after = chunk.after.chars().take_while(|c| *c == right_char).count();
    let prev = run_before.min(run_after);
    let len = left.chars().count();

    prev >= len && !(prev == 2 && len == 1)
}

/// Toggle code markup.
///
/// A selection spanning lines, or standing on a line of its own, becomes an indented code block;
/// anything inline becomes a backtick span.
pub fn code(chunk: &mut Chunk, example: &str) {
    let has_text_before = chunk
        .before
        .trim_end_matches(' ')
        .chars()
        .next_back()
        .is_some_and(|c| !c.is_whitespace());
    let has_text_after = chunk
        .after
        .trim_start_matches(' ')
        .chars()
        .next()
        .is_some_and(|c| !c.is_whitespace());

    if (!has_text_before && !has_text_after) || chunk.selection.contains('\n') {
        code_block(chunk, example);
    } else {
        code_span(chunk, example);
    }
}

fn code_block(chunk: &mut Chunk, example: &str) {
    if chunk.before.ends_with(CODE_INDENT) {
        chunk.before.truncate(chunk.before.len() - CODE_INDENT.len());
        chunk.selection.insert_str(0, CODE_INDENT);
    }

    let lines_back = usize::from(!INDENTED_LINE_BEFORE.is_match(&chunk.before));
    let lines_forward = usize::from(!INDENTED_LINE_AFTER.is_match(&chunk.after));
    chunk.skip_lines(lines_back, lines_forward, false);

    if chunk.selection.is_empty() {
        chunk.start_tag = CODE_INDENT.to_string();
        chunk.selection = example.to_string();
    } else if UNINDENTED_LINE.is_match(&chunk.selection) {
        if chunk.selection.contains('\n') {
            chunk.selection = chunk
                .selection
                .split('\n')
                .map(|line| format!("{CODE_INDENT}{line}"))
                .collect::<Vec<_>>()
                .join("\n");
        } else {
            // Single line: the indent goes outside the selection.
            chunk.before.push_str(CODE_INDENT);
        }
    } else {
        chunk.selection = ONE_INDENT.replace_all(&chunk.selection, "").into_owned();
    }
}

/// Toggle backticks around an inline selection.
///
/// Only a matched pair is removed. A backtick on just one side is folded back into the
/// surrounding text unchanged, so a stray delimiter is never moved or dropped.
fn code_span(chunk: &mut Chunk, example: &str) {
    chunk.trim_whitespace(false);
    chunk.find_tags(Some(&BACKTICK), Some(&BACKTICK));

    match (chunk.start_tag.is_empty(), chunk.end_tag.is_empty()) {
        (true, true) => {
            chunk.start_tag = "`".to_string();
            chunk.end_tag = "`".to_string();
            if chunk.selection.is_empty() {
                chunk.selection = example.to_string();
            }
        }
        (false, false) => {
            chunk.start_tag.clear();
            chunk.end_tag.clear();
        }
        // A lone backtick is not a span; leave it where it was.
        _ => chunk.merge_tags(),
    }
}
