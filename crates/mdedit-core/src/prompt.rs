//! Link and image URL prompt.

/// Which kind of reference the prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// A hyperlink (`[text][n]`).
    Link,
    /// An image (`![alt][n]`).
    Image,
}

impl LinkKind {
    /// Opening delimiter of the reference.
    pub fn open_tag(self) -> &'static str {
        match self {
            Self::Link => "[",
            Self::Image => "![",
        }
    }
}

/// The answer to a link prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptReply {
    /// The user confirmed a value. An empty string removes an existing link.
    Submitted(String),
    /// The user dismissed the prompt. Nothing changes.
    Cancelled,
    /// The answer will arrive later through
    /// [`MarkdownEditor::resolve_prompt`](crate::MarkdownEditor::resolve_prompt).
    Deferred,
}

impl PromptReply {
    /// Convert an optional value (`None` meaning cancel) into a reply.
    pub fn from_value(value: Option<String>) -> Self {
        value.map_or(Self::Cancelled, Self::Submitted)
    }
}

/// A single-field prompt asking the user for a URL.
///
/// `initial` is the current definition of the link being edited, or empty for a new one.
pub trait LinkPrompt {
    /// Ask for a URL (optionally followed by a quoted title).
    fn request(&mut self, kind: LinkKind, initial: &str) -> PromptReply;
}

impl<F> LinkPrompt for F
where
    F: FnMut(LinkKind, &str) -> PromptReply,
{
    fn request(&mut self, kind: LinkKind, initial: &str) -> PromptReply {
        self(kind, initial)
    }
}

/// A prompt that always answers [`PromptReply::Deferred`].
///
/// Suits hosts that show a non-blocking dialog and reply through
/// [`MarkdownEditor::resolve_prompt`](crate::MarkdownEditor::resolve_prompt).
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferredPrompt;

impl LinkPrompt for DeferredPrompt {
    fn request(&mut self, _kind: LinkKind, _initial: &str) -> PromptReply {
        PromptReply::Deferred
    }
}
