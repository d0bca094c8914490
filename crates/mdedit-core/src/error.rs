//! Errors reported to the host application.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Integration errors raised by the editor.
///
/// Malformed markdown never produces an error; these variants only report misuse of the
/// editor by the host application.
pub enum EditorError {
    #[error("unknown hook '{0}'")]
    /// A hook was addressed by a name outside the known set.
    UnknownHook(String),

    #[error("editor is not running; call run() before issuing commands")]
    /// A command or input notification arrived before [`run`](crate::MarkdownEditor::run).
    NotInitialized,

    #[error("a link prompt is still waiting for its reply")]
    /// A command was issued while a deferred link/image prompt is open.
    PromptPending,

    #[error("no link prompt is waiting for a reply")]
    /// [`resolve_prompt`](crate::MarkdownEditor::resolve_prompt) was called without an open prompt.
    NoPendingPrompt,
}
