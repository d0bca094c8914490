//! Markdown commands.
//!
//! Every command works on a [`Chunk`] taken from the current surface state and leaves it ready to
//! be flattened back into text. [`CommandEngine`] holds no state between calls; it only borrows
//! the editor's settings and hooks.
//!
//! # Example
//!
//! ```rust
//! use mdedit_core::{Chunk, CommandEngine, EditorSettings, HookSet};
//!
//! let settings = EditorSettings::default();
//! let hooks = HookSet::new();
//! let engine = CommandEngine::new(&settings, &hooks);
//!
//! let mut chunk = Chunk::new("Hello ", "world", "!");
//! assert!(engine.bold(&mut chunk));
//! assert_eq!(chunk.text(), "Hello **world**!");
//! ```

/// Compile a constant regex on first use.
macro_rules! lazy_regex {
    ($re:expr, $msg:expr $(,)?) => {
        std::sync::LazyLock::new(|| regex::Regex::new($re).expect($msg))
    };
}

pub mod inline;
pub mod links;
pub mod quote;
pub mod reflow;

use tracing::debug;

use crate::chunk::Chunk;
use crate::hooks::HookSet;
use crate::prompt::LinkKind;
use crate::settings::EditorSettings;

pub use links::LinkRequest;

/// A toolbar or keyboard command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Toggle `**strong**` emphasis.
    Bold,
    /// Toggle `*emphasis*`.
    Italic,
    /// Surround a non-empty selection with a delimiter pair (no toggling).
    Wrap {
        /// Opening delimiter.
        left: String,
        /// Closing delimiter.
        right: String,
    },
    /// Toggle a blockquote.
    Quote,
    /// Toggle a code span or an indented code block.
    Code,
    /// Insert, edit or remove a reference link.
    Link,
    /// Insert, edit or remove a reference image.
    Image,
    /// Undo the last step.
    Undo,
    /// Redo the last undone step.
    Redo,
}

impl Command {
    /// The wrap command for a typed opening delimiter, if it is one that auto-pairs.
    ///
    /// Hosts call this on key press; when the resulting command applies, the key itself should be
    /// swallowed.
    pub fn auto_pair(ch: char) -> Option<Self> {
        let right = match ch {
            '(' => ')',
            '"' => '"',
            '\'' => '\'',
            '{' => '}',
            '[' => ']',
            '*' => '*',
            _ => return None,
        };
        Some(Self::Wrap {
            left: ch.to_string(),
            right: right.to_string(),
        })
    }

    /// Kind of reference this command inserts, for link and image commands.
    pub fn link_kind(&self) -> Option<LinkKind> {
        match self {
            Self::Link => Some(LinkKind::Link),
            Self::Image => Some(LinkKind::Image),
            _ => None,
        }
    }
}

/// What an executed command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandOutcome {
    /// The text changed and an undo step was recorded.
    Applied,
    /// Nothing changed (empty selection for a wrap, cancelled prompt, nothing to undo...).
    Unchanged,
    /// A link prompt is open; the command completes in
    /// [`MarkdownEditor::resolve_prompt`](crate::MarkdownEditor::resolve_prompt).
    AwaitingPrompt,
    /// The surface could not be read, so the command was skipped.
    SurfaceUnavailable,
}

/// Chunk transformations behind the markup commands.
#[derive(Debug, Clone, Copy)]
pub struct CommandEngine<'a> {
    settings: &'a EditorSettings,
    hooks: &'a HookSet,
}

impl<'a> CommandEngine<'a> {
    /// Create an engine borrowing the editor's settings and hooks.
    pub fn new(settings: &'a EditorSettings, hooks: &'a HookSet) -> Self {
        Self { settings, hooks }
    }

    /// Apply a markup command. Returns `false` when the chunk should not be committed.
    ///
    /// Link, image and history commands need collaborators beyond a chunk and are driven by the
    /// editor; they return `false` here.
    pub fn apply(&self, command: &Command, chunk: &mut Chunk) -> bool {
        let applied = match command {
            Command::Bold => self.bold(chunk),
            Command::Italic => self.italic(chunk),
            Command::Wrap { left, right } => self.wrap(chunk, left, right),
            Command::Quote => self.quote(chunk),
            Command::Code => self.code(chunk),
            Command::Link | Command::Image | Command::Undo | Command::Redo => false,
        };
        debug!(?command, applied, "markup command");
        applied
    }

    /// Toggle `**` around the selection.
    pub fn bold(&self, chunk: &mut Chunk) -> bool {
        inline::do_wrap(chunk, "**", "**", true)
    }

    /// Toggle `*` around the selection.
    pub fn italic(&self, chunk: &mut Chunk) -> bool {
        inline::do_wrap(chunk, "*", "*", true)
    }

    /// Surround the selection with `left` and `right`.
    pub fn wrap(&self, chunk: &mut Chunk, left: &str, right: &str) -> bool {
        inline::do_wrap(chunk, left, right, false)
    }

    /// Toggle a blockquote around the selected lines.
    pub fn quote(&self, chunk: &mut Chunk) -> bool {
        quote::quote(chunk, self.settings, self.hooks);
        true
    }

    /// Toggle a code span or code block.
    pub fn code(&self, chunk: &mut Chunk) -> bool {
        inline::code(chunk, &self.settings.strings.code_example);
        true
    }

    /// First phase of a link/image command: locate an existing link and decide what to prompt.
    pub fn begin_link(&self, chunk: &mut Chunk) -> LinkRequest {
        links::begin(chunk)
    }

    /// Second phase of a link/image command: apply the prompt's answer.
    ///
    /// `reply` is `None` for a cancelled prompt. Returns `false` when nothing should change.
    pub fn finish_link(&self, chunk: &mut Chunk, kind: LinkKind, reply: Option<&str>) -> bool {
        links::finish(chunk, kind, reply, &self.settings.strings)
    }
}
