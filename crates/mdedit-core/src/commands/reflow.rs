//! Hard-wrapping and unwrapping of paragraph text.
//!
//! Lines that start a markdown block (indented code, quotes, list items, headings, rules,
//! reference definitions) are never joined onto the previous line and never re-broken.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use regex::{Captures, Regex};
use tracing::debug;

use crate::chunk::Chunk;

static BLOCK_PREFIX: LazyLock<Regex> = lazy_regex!(
    r"^(?:\s{4,}|\s*>|\s*-\s+|\s*\d+\.|=|\+|-|_|\*|#|\s*\[[^\n\]]+\]:)",
    "block prefix regex should compile",
);

/// Line-breaking patterns, one per wrap width.
static LINE_PATTERNS: LazyLock<Mutex<HashMap<usize, Regex>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Whether `text` starts with a markdown block marker.
pub fn starts_block(text: &str) -> bool {
    BLOCK_PREFIX.is_match(text)
}

/// Join single line breaks into spaces.
///
/// A newline is kept when it is preceded by another newline (or starts the text), or when the
/// following line is blank or starts a block.
pub fn unwrap(chunk: &mut Chunk) {
    chunk.selection = unwrap_text(&chunk.selection);
}

/// Unwrap, then re-break the selection into lines of at most `line_length` characters.
///
/// Lines starting a block keep their shape. Trailing whitespace is trimmed.
pub fn wrap(chunk: &mut Chunk, line_length: usize) {
    unwrap(chunk);

    if let Some(line) = line_pattern(line_length.max(1)) {
        chunk.selection = line
            .replace_all(&chunk.selection, |caps: &Captures<'_>| {
                let whole = &caps[0];
                if starts_block(whole) {
                    whole.to_string()
                } else {
                    format!("{}\n", &caps[1])
                }
            })
            .into_owned();
    }

    let kept = chunk.selection.trim_end().len();
    chunk.selection.truncate(kept);
}

/// The compiled `(.{1,width})( +|$\n?)` pattern, cached per width.
///
/// Returns `None` when the width is too large for the regex engine.
fn line_pattern(width: usize) -> Option<Regex> {
    let mut cache = LINE_PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(line) = cache.get(&width) {
        return Some(line.clone());
    }

    match Regex::new(&format!(r"(?m)(.{{1,{width}}})( +|$\n?)")) {
        Ok(line) => {
            cache.insert(width, line.clone());
            Some(line)
        }
        Err(err) => {
            debug!(width, %err, "line wrap pattern rejected, text left unwrapped");
            None
        }
    }
}

fn unwrap_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;

    for (i, ch) in text.char_indices() {
        let joinable = ch == '\n'
            && prev.is_some_and(|p| p != '\n')
            && {
                let rest = &text[i + 1..];
                !rest.starts_with('\n') && !starts_block(rest)
            };
        out.push(if joinable { ' ' } else { ch });
        prev = Some(ch);
    }
    out
}
