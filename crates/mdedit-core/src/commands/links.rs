//! Reference-style links and images.
//!
//! Links are always written in reference form (`[text][n]` with a `  [n]: url "title"` line at the
//! end of the document). Whenever a link is added, edited or removed, every numbered definition is
//! collected and the references are renumbered densely in document order.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::chunk::{Chunk, TagPattern, trailing_newlines};
use crate::prompt::LinkKind;
use crate::settings::EditorStrings;

static LINK_START: LazyLock<TagPattern> = LazyLock::new(|| {
    TagPattern::new(r"\s*!?\[").expect("link start pattern should compile")
});

static LINK_END: LazyLock<TagPattern> = LazyLock::new(|| {
    TagPattern::new(r"\][ ]?(?:\n[ ]*)?(?:\[.*?\])?").expect("link end pattern should compile")
});

static LINK_OPENER: LazyLock<Regex> = lazy_regex!(r"!?\[", "link opener regex should compile");

static NUMBERED_REF: LazyLock<Regex> =
    lazy_regex!(r"\]\[(\d+)\]", "numbered reference regex should compile");

static NAMED_REF: LazyLock<Regex> =
    lazy_regex!(r"\]\[([^\]]+)\]", "named reference regex should compile");

static LINK_DEF: LazyLock<Regex> = lazy_regex!(
    r#"(?m)^[ ]{0,3}\[(\d+)\]:[ \t]*\n?[ \t]*<?(\S+?)>?[ \t]*\n?[ \t]*(?:(\n*)["(](.+?)[")][ \t]*)?(?:\n+|$)"#,
    "link definition regex should compile",
);

static DEF_ID: LazyLock<Regex> =
    lazy_regex!(r"^[ ]{0,3}\[(\d+)\]:", "definition id regex should compile");

static REFERENCE: LazyLock<Regex> = lazy_regex!(
    r"(\[)((?:\[[^\]]*\]|[^\[\]])*)(\][ ]?(?:\n[ ]*)?\[)(\d+)(\])",
    "reference regex should compile",
);

static DOUBLED_SCHEME: LazyLock<Regex> =
    lazy_regex!(r"^http://(https?|ftp)://", "scheme regex should compile");

static HAS_SCHEME: LazyLock<Regex> =
    lazy_regex!(r"^(?:https?|ftp)://", "scheme regex should compile");

static LINK_AND_TITLE: LazyLock<Regex> = lazy_regex!(
    r#"^\s*(.*?)(?:\s+"(.+)")?\s*$"#,
    "link and title regex should compile",
);

static URL_PART: LazyLock<Regex> = lazy_regex!(
    r"%[0-9a-fA-F]{2}|\?|\+|[^A-Za-z0-9_\-./]",
    "url part regex should compile",
);

/// Id the new definition carries until it is renumbered.
const PLACEHOLDER_ID: &str = "999";

/// What the first phase of a link command decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRequest {
    /// Ask the user for a URL, pre-filled with `initial`.
    Prompt {
        /// Current definition of the link under the selection, or empty.
        initial: String,
    },
    /// The selection spans paragraphs and cannot become a link.
    Blocked,
}

/// Locate a link around the selection and decide what to prompt for.
pub fn begin(chunk: &mut Chunk) -> LinkRequest {
    chunk.trim_whitespace(false);
    chunk.find_tags(Some(&LINK_START), Some(&LINK_END));

    if chunk.end_tag.chars().count() > 1 && !chunk.start_tag.is_empty() {
        return LinkRequest::Prompt {
            initial: existing_definition(chunk),
        };
    }

    // Whatever looked like link markup becomes part of the link text.
    let start = std::mem::take(&mut chunk.start_tag);
    let end = std::mem::take(&mut chunk.end_tag);
    chunk.selection.insert_str(0, &start);
    chunk.selection.push_str(&end);

    if chunk.selection.contains("\n\n") {
        LinkRequest::Blocked
    } else {
        LinkRequest::Prompt {
            initial: String::new(),
        }
    }
}

/// Apply the prompt's answer. Returns `false` when the prompt was cancelled.
///
/// A non-empty answer (re)links the selection; an empty answer removes the link and its
/// definition.
pub fn finish(
    chunk: &mut Chunk,
    kind: LinkKind,
    reply: Option<&str>,
    strings: &EditorStrings,
) -> bool {
    match reply {
        None => false,
        Some("") => {
            if let Some(opener) = LINK_OPENER.find(&chunk.start_tag).map(|m| m.range()) {
                chunk.start_tag.replace_range(opener, "");
            }
            chunk.end_tag.clear();
            add_link_def(chunk, None);
            true
        }
        Some(link) => {
            let mut link = DOUBLED_SCHEME.replace(link, "${1}://").into_owned();
            if !HAS_SCHEME.is_match(&link) {
                link.insert_str(0, "http://");
            }

            chunk.selection = escape_brackets(&chunk.selection);

            let definition = format!(" [{PLACEHOLDER_ID}]: {}", properly_encoded(&link));
            let number = add_link_def(chunk, Some(&definition));

            // Whitespace picked up in front of an existing opener stays in the text.
            let lead = chunk.start_tag.len() - chunk.start_tag.trim_start().len();
            chunk.start_tag.truncate(lead);
            chunk.start_tag.push_str(kind.open_tag());
            chunk.end_tag = format!("][{number}]");

            if chunk.selection.is_empty() {
                chunk.selection = match kind {
                    LinkKind::Link => strings.link_description.clone(),
                    LinkKind::Image => strings.image_description.clone(),
                };
            }
            true
        }
    }
}

/// Definition text of the reference in `end_tag`, for pre-filling the prompt.
///
/// A numbered reference is looked up in `after`; a named one yields its label.
fn existing_definition(chunk: &Chunk) -> String {
    if let Some(caps) = NUMBERED_REF.captures(&chunk.end_tag) {
        let pattern = format!(r"\[{}\]:\s+(.+)", regex::escape(&caps[1]));
        return Regex::new(&pattern)
            .ok()
            .and_then(|def| def.captures(&chunk.after).map(|m| m[1].to_string()))
            .unwrap_or_default();
    }
    NAMED_REF
        .captures(&chunk.end_tag)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

/// Rebuild the reference-link table of the whole chunk.
///
/// Every numbered definition is stripped from `before`, `selection` and `after`. References are
/// then renumbered `1..k` in document order: `before`, then `link_def` (or, without one, the
/// references in `selection`), then `after`. The surviving definitions are appended to `after`.
///
/// Returns the number assigned to `link_def` (the count of definitions up to and including it).
pub fn add_link_def(chunk: &mut Chunk, link_def: Option<&str>) -> usize {
    let mut defs = HashMap::new();
    chunk.before = strip_link_defs(&chunk.before, &mut defs);
    chunk.selection = strip_link_defs(&chunk.selection, &mut defs);
    chunk.after = strip_link_defs(&chunk.after, &mut defs);

    let mut table = Renumbering::new(&defs);
    chunk.before = table.rewrite(&chunk.before);
    match link_def {
        Some(def) => table.push_definition(def),
        None => chunk.selection = table.rewrite(&chunk.selection),
    }
    let number = table.count;
    chunk.after = table.rewrite(&chunk.after);

    let kept = chunk.after.len() - trailing_newlines(&chunk.after);
    chunk.after.truncate(kept);
    if chunk.after.is_empty() {
        let kept = chunk.selection.len() - trailing_newlines(&chunk.selection);
        chunk.selection.truncate(kept);
    }

    if !table.definitions.is_empty() {
        chunk.after.push_str("\n\n");
        chunk.after.push_str(&table.definitions);
    }
    number
}

/// Remove numbered link definitions from `text`, collecting them by id.
///
/// A "title" separated from its definition by blank lines is really a paragraph; it stays in the
/// text.
fn strip_link_defs(text: &str, defs: &mut HashMap<String, String>) -> String {
    LINK_DEF
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let offset = caps.get(0).map_or(0, |m| m.start());
            match caps.get(3).filter(|newlines| !newlines.is_empty()) {
                Some(newlines) => {
                    let split = newlines.start() - offset;
                    defs.insert(caps[1].to_string(), whole[..split].trim_end().to_string());
                    whole[split..].to_string()
                }
                None => {
                    defs.insert(caps[1].to_string(), whole.trim_end().to_string());
                    String::new()
                }
            }
        })
        .into_owned()
}

/// Renumbering pass over the reference links of a chunk.
struct Renumbering<'d> {
    defs: &'d HashMap<String, String>,
    assigned: HashMap<String, usize>,
    count: usize,
    definitions: String,
}

impl<'d> Renumbering<'d> {
    fn new(defs: &'d HashMap<String, String>) -> Self {
        Self {
            defs,
            assigned: HashMap::new(),
            count: 0,
            definitions: String::new(),
        }
    }

    fn push_definition(&mut self, def: &str) {
        self.count += 1;
        let line = DEF_ID.replace(def, format!("  [{}]:", self.count));
        self.definitions.push('\n');
        self.definitions.push_str(&line);
    }

    /// Renumber the references in `text`, one nesting level deep (a linked image).
    fn rewrite(&mut self, text: &str) -> String {
        let defs = self.defs;
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in REFERENCE.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            last = whole.end();

            let inner = self.rewrite(&caps[2]);
            let id = &caps[4];
            let number = match self.assigned.get(id) {
                Some(number) => Some(*number),
                None => defs.get(id).map(|def| {
                    self.push_definition(def);
                    self.assigned.insert(id.to_string(), self.count);
                    self.count
                }),
            };

            out.push_str(&caps[1]);
            out.push_str(&inner);
            out.push_str(&caps[3]);
            match number {
                Some(number) => out.push_str(&number.to_string()),
                None => out.push_str(id),
            }
            out.push_str(&caps[5]);
        }

        out.push_str(&text[last..]);
        out
    }
}

/// Escape every `[` or `]` not already escaped by an odd run of backslashes.
pub fn escape_brackets(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut backslashes = 0usize;
    for ch in text.chars() {
        if matches!(ch, '[' | ']') && backslashes % 2 == 0 {
            out.push('\\');
        }
        backslashes = if ch == '\\' { backslashes + 1 } else { 0 };
        out.push(ch);
    }
    out
}

/// Normalize a URL with an optional `"title"`.
///
/// Existing percent escapes are uppercased, characters `encodeURI` would escape are
/// percent-encoded, a lone `%` becomes `%25` and `+` becomes `%20` inside the query string. The
/// title is trimmed and its quotes, parentheses and angle brackets are turned into entities.
pub fn properly_encoded(link_def: &str) -> String {
    let Some(caps) = LINK_AND_TITLE.captures(link_def) else {
        return link_def.to_string();
    };

    let mut in_query = false;
    let link = URL_PART.replace_all(&caps[1], |part: &Captures<'_>| {
        let part = &part[0];
        if part.len() == 3 && part.starts_with('%') {
            return part.to_ascii_uppercase();
        }
        match part {
            "?" => {
                in_query = true;
                "?".to_string()
            }
            "+" if in_query => "%20".to_string(),
            other => encode_uri(other),
        }
    });

    match caps.get(2) {
        Some(title) => {
            let title = title
                .as_str()
                .trim()
                .replace('"', "&quot;")
                .replace('(', "&#40;")
                .replace(')', "&#41;")
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            format!("{link} \"{title}\"")
        }
        None => link.into_owned(),
    }
}

/// Percent-encode everything outside the `encodeURI` safe set.
fn encode_uri(text: &str) -> String {
    const SAFE: &str = ";,/?:@&=+$-_.!~*'()#";
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || SAFE.contains(ch) {
            out.push(ch);
        } else {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_reference_prompts_with_its_label() {
        let mut chunk = Chunk::new("a [", "b", "][label] c");
        assert_eq!(
            begin(&mut chunk),
            LinkRequest::Prompt {
                initial: "label".to_string()
            }
        );
    }

    #[test]
    fn brackets_are_escaped_by_parity() {
        assert_eq!(escape_brackets("[a]"), "\\[a\\]");
        assert_eq!(escape_brackets("x \\[y]"), "x \\[y\\]");
        assert_eq!(escape_brackets("x \\\\[y"), "x \\\\\\[y");
        assert_eq!(escape_brackets("[["), "\\[\\[");
    }

    #[test]
    fn url_encoding() {
        assert_eq!(properly_encoded("http://example.com"), "http://example.com");
        assert_eq!(
            properly_encoded("  http://example.com/a b?x=1+2  "),
            "http://example.com/a%20b?x=1%202"
        );
        assert_eq!(properly_encoded("http://x.com/a+b"), "http://x.com/a+b");
        assert_eq!(properly_encoded("http://x.com/%7e"), "http://x.com/%7E");
        assert_eq!(properly_encoded("http://x.com/100%"), "http://x.com/100%25");
        assert_eq!(properly_encoded("http://x.com/é"), "http://x.com/%C3%A9");
    }

    #[test]
    fn title_is_escaped() {
        assert_eq!(
            properly_encoded(r#"http://x.com "A (b) <c>""#),
            r#"http://x.com "A &#40;b&#41; &lt;c&gt;""#
        );
    }

    #[test]
    fn definitions_are_stripped_and_collected() {
        let mut defs = HashMap::new();
        let text = strip_link_defs("intro\n\n  [2]: http://two\n  [5]: <http://five> \"Five\"", &mut defs);
        assert_eq!(text, "intro\n\n");
        assert_eq!(defs["2"], "  [2]: http://two");
        assert_eq!(defs["5"], "  [5]: <http://five> \"Five\"");
    }

    #[test]
    fn paragraph_after_definition_is_kept() {
        let mut defs = HashMap::new();
        let text = strip_link_defs("[1]: http://one\n\n(not a title)\n", &mut defs);
        assert_eq!(defs["1"], "[1]: http://one");
        assert_eq!(text, "\n(not a title)\n");
    }

    #[test]
    fn references_are_renumbered_in_order() {
        let mut chunk = Chunk::new(
            "see [a][5] and [b][2] and [a again][5]\n\n  [2]: http://two\n  [5]: http://five",
            "",
            "",
        );
        add_link_def(&mut chunk, None);
        assert_eq!(chunk.before, "see [a][1] and [b][2] and [a again][1]\n\n");
        assert_eq!(chunk.after, "\n\n\n  [1]: http://five\n  [2]: http://two");
    }

    #[test]
    fn linked_image_numbers_inner_reference_first() {
        let mut chunk = Chunk::new(
            "[![img][7]][3]\n\n  [3]: http://page\n  [7]: http://img.png",
            "",
            "",
        );
        add_link_def(&mut chunk, None);
        assert!(chunk.before.starts_with("[![img][1]][2]"));
        assert_eq!(chunk.after, "\n\n\n  [1]: http://img.png\n  [2]: http://page");
    }

    #[test]
    fn reference_without_definition_is_untouched() {
        let mut chunk = Chunk::new("[x][4]", "", "");
        assert_eq!(add_link_def(&mut chunk, None), 0);
        assert_eq!(chunk.text(), "[x][4]");
    }

    #[test]
    fn begin_detects_existing_link() {
        let mut chunk = Chunk::new("a [", "text", "][1] b\n\n  [1]: http://one.com");
        assert_eq!(
            begin(&mut chunk),
            LinkRequest::Prompt {
                initial: "http://one.com".into()
            }
        );
        assert_eq!(chunk.before, "a");
        assert_eq!(chunk.start_tag, " [");
        assert_eq!(chunk.end_tag, "][1]");
    }

    #[test]
    fn begin_blocks_multi_paragraph_selection() {
        let mut chunk = Chunk::new("", "one\n\ntwo", "");
        assert_eq!(begin(&mut chunk), LinkRequest::Blocked);
    }

    #[test]
    fn new_link_on_empty_selection() {
        let mut chunk = Chunk::default();
        assert_eq!(
            begin(&mut chunk),
            LinkRequest::Prompt {
                initial: String::new()
            }
        );
        assert!(finish(
            &mut chunk,
            LinkKind::Link,
            Some("example.com"),
            &EditorStrings::default()
        ));
        assert_eq!(chunk.start_tag, "[");
        assert_eq!(chunk.selection, "enter link description here");
        assert_eq!(chunk.end_tag, "][1]");
        assert_eq!(chunk.after, "\n\n\n  [1]: http://example.com");
    }

    #[test]
    fn editing_a_link_keeps_the_space_before_it() {
        let mut chunk = Chunk::new("a [", "text", "][1] b\n\n  [1]: http://one.com");
        begin(&mut chunk);
        finish(
            &mut chunk,
            LinkKind::Link,
            Some("two.com"),
            &EditorStrings::default(),
        );
        assert_eq!(chunk.text(), "a [text][1] b\n\n\n  [1]: http://two.com");
    }

    #[test]
    fn doubled_scheme_is_fixed() {
        let mut chunk = Chunk::new("", "x", "");
        finish(
            &mut chunk,
            LinkKind::Image,
            Some("http://https://secure.org"),
            &EditorStrings::default(),
        );
        assert_eq!(chunk.start_tag, "![");
        assert_eq!(chunk.after, "\n\n\n  [1]: https://secure.org");
    }
}
