//! Editor orchestration.
//!
//! [`MarkdownEditor`] ties the pieces together: it captures the surface state, runs a command on
//! the resulting [`Chunk`], records the undo step, writes the result back, and notifies
//! subscribers.
//!
//! # Example
//!
//! ```rust
//! use mdedit_core::{
//!     Command, CommandOutcome, EditorSettings, LinkKind, MarkdownEditor, MemorySurface, PromptReply,
//!     TextSurface,
//! };
//!
//! let surface = MemorySurface::new("Hello world!").with_selection(6, 11);
//! let prompt = |_kind: LinkKind, _initial: &str| PromptReply::Cancelled;
//! let mut editor = MarkdownEditor::new(surface, prompt, EditorSettings::default());
//! editor.run();
//!
//! assert_eq!(editor.execute(Command::Bold).unwrap(), CommandOutcome::Applied);
//! assert_eq!(editor.surface().text(), "Hello **world**!");
//!
//! editor.execute(Command::Undo).unwrap();
//! assert_eq!(editor.surface().text(), "Hello world!");
//! ```

use tracing::debug;

use crate::chunk::Chunk;
use crate::commands::{Command, CommandEngine, CommandOutcome, LinkRequest};
use crate::delta::TextDelta;
use crate::error::EditorError;
use crate::hooks::HookSet;
use crate::prompt::{LinkKind, LinkPrompt, PromptReply};
use crate::settings::EditorSettings;
use crate::state::EditorState;
use crate::surface::TextSurface;
use crate::undo::{EditKey, UndoHistory};

/// What produced a text change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeCause {
    /// A markup command.
    Command(Command),
    /// An undo step.
    Undo,
    /// A redo step.
    Redo,
}

/// A text change made by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    /// What produced the change.
    pub cause: ChangeCause,
    /// The replaced span, in character offsets.
    pub delta: TextDelta,
}

/// Callback type for text changes.
pub type TextChangeCallback = Box<dyn FnMut(&TextChange) + Send>;

/// A link command waiting for its prompt.
#[derive(Debug)]
struct PendingLink {
    kind: LinkKind,
    state: EditorState,
    chunk: Chunk,
}

/// Toolbar markdown editor driving a [`TextSurface`].
pub struct MarkdownEditor<S: TextSurface, P: LinkPrompt> {
    surface: S,
    prompt: P,
    settings: EditorSettings,
    hooks: HookSet,
    history: Option<UndoHistory>,
    running: bool,
    pending: Option<PendingLink>,
    callbacks: Vec<TextChangeCallback>,
}

impl<S: TextSurface, P: LinkPrompt> std::fmt::Debug for MarkdownEditor<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownEditor")
            .field("settings", &self.settings)
            .field("hooks", &self.hooks)
            .field("history", &self.history)
            .field("running", &self.running)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<S: TextSurface, P: LinkPrompt> MarkdownEditor<S, P> {
    /// Create an editor. Nothing happens until [`run`](Self::run) is called.
    pub fn new(surface: S, prompt: P, settings: EditorSettings) -> Self {
        Self {
            surface,
            prompt,
            settings,
            hooks: HookSet::new(),
            history: None,
            running: false,
            pending: None,
            callbacks: Vec::new(),
        }
    }

    /// Start the editor, recording the initial undo state. Calling it again does nothing.
    pub fn run(&mut self) {
        if self.running {
            return;
        }
        self.running = true;

        if self.settings.undo_enabled {
            let mut history = UndoHistory::new(self.settings.max_undo_depth);
            history.init(&self.surface);
            self.history = Some(history);
        }
        debug!(undo = self.settings.undo_enabled, "editor running");
    }

    /// Whether [`run`](Self::run) has been called.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Registered hooks.
    pub fn hooks(&self) -> &HookSet {
        &self.hooks
    }

    /// Registered hooks, for registration.
    pub fn hooks_mut(&mut self) -> &mut HookSet {
        &mut self.hooks
    }

    /// Editor settings.
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// The driven surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The driven surface, for applying host input.
    ///
    /// Report such input through [`handle_key`](Self::handle_key) and
    /// [`input_applied`](Self::input_applied) so the undo history stays accurate.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The undo history, when undo is enabled and the editor is running.
    pub fn history(&self) -> Option<&UndoHistory> {
        self.history.as_ref()
    }

    /// Mutable access to the undo history, e.g. to subscribe to it.
    pub fn history_mut(&mut self) -> Option<&mut UndoHistory> {
        self.history.as_mut()
    }

    /// Whether an undo is possible.
    pub fn can_undo(&self) -> bool {
        self.history.as_ref().is_some_and(UndoHistory::can_undo)
    }

    /// Whether a redo is possible.
    pub fn can_redo(&self) -> bool {
        self.history.as_ref().is_some_and(UndoHistory::can_redo)
    }

    /// Whether a link prompt is waiting for [`resolve_prompt`](Self::resolve_prompt).
    pub fn is_prompt_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Subscribe to text changes made by commands, undo and redo.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&TextChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Run a command.
    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome, EditorError> {
        self.ensure_ready()?;
        debug!(?command, "execute command");

        let outcome = match command.link_kind() {
            Some(kind) => self.link_or_image(kind),
            None => match command {
                Command::Undo => self.undo(),
                Command::Redo => self.redo(),
                markup => self.markup(markup),
            },
        };

        debug!(?outcome, "command finished");
        Ok(outcome)
    }

    /// Answer a deferred link prompt: `Some(url)` (possibly empty) or `None` to cancel.
    ///
    /// The prompt is closed either way; if the surface has become unavailable in the meantime
    /// the reply is discarded and [`CommandOutcome::SurfaceUnavailable`] is returned.
    pub fn resolve_prompt(&mut self, value: Option<String>) -> Result<CommandOutcome, EditorError> {
        let Some(pending) = self.pending.take() else {
            return Err(EditorError::NoPendingPrompt);
        };
        debug!(kind = ?pending.kind, cancelled = value.is_none(), "link prompt resolved");
        Ok(self.complete_link(pending, value.as_deref()))
    }

    /// Report a key press *before* the host applies it to the surface.
    pub fn handle_key(&mut self, key: EditKey) -> Result<(), EditorError> {
        if !self.running {
            return Err(EditorError::NotInitialized);
        }
        if let (Some(mode), Some(history)) = (key.undo_mode(), self.history.as_mut()) {
            history.set_mode(mode, &self.surface);
        }
        Ok(())
    }

    /// Report that an input has been applied to the surface.
    pub fn input_applied(&mut self) -> Result<(), EditorError> {
        if !self.running {
            return Err(EditorError::NotInitialized);
        }
        if let Some(history) = self.history.as_mut() {
            history.refresh(&self.surface);
        }
        Ok(())
    }

    /// Report a paste the host has applied to the surface.
    pub fn handle_paste(&mut self) -> Result<(), EditorError> {
        if !self.running {
            return Err(EditorError::NotInitialized);
        }
        if let Some(history) = self.history.as_mut() {
            history.handle_paste(&self.surface);
        }
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), EditorError> {
        if !self.running {
            return Err(EditorError::NotInitialized);
        }
        if self.pending.is_some() {
            return Err(EditorError::PromptPending);
        }
        Ok(())
    }

    fn capture_chunk(&self) -> Option<(EditorState, Chunk)> {
        let state = EditorState::capture(&self.surface)?;
        let mut chunk = state.to_chunk();
        chunk.normalize_line_endings();
        Some((state, chunk))
    }

    fn markup(&mut self, command: Command) -> CommandOutcome {
        let Some((state, mut chunk)) = self.capture_chunk() else {
            return CommandOutcome::SurfaceUnavailable;
        };

        let engine = CommandEngine::new(&self.settings, &self.hooks);
        if !engine.apply(&command, &mut chunk) {
            return CommandOutcome::Unchanged;
        }
        self.commit(ChangeCause::Command(command), &state, chunk)
    }

    fn link_or_image(&mut self, kind: LinkKind) -> CommandOutcome {
        let Some((state, mut chunk)) = self.capture_chunk() else {
            return CommandOutcome::SurfaceUnavailable;
        };

        let engine = CommandEngine::new(&self.settings, &self.hooks);
        let initial = match engine.begin_link(&mut chunk) {
            LinkRequest::Prompt { initial } => initial,
            LinkRequest::Blocked => return CommandOutcome::Unchanged,
        };

        let dialog = match kind {
            LinkKind::Image => self.hooks.insert_image_dialog(),
            LinkKind::Link => None,
        };
        let reply = match dialog {
            Some(reply) => reply,
            None => self.prompt.request(kind, &initial),
        };

        let pending = PendingLink { kind, state, chunk };
        match reply {
            PromptReply::Submitted(value) => self.complete_link(pending, Some(&value)),
            PromptReply::Cancelled => self.complete_link(pending, None),
            PromptReply::Deferred => {
                debug!(?kind, "link prompt deferred");
                self.pending = Some(pending);
                CommandOutcome::AwaitingPrompt
            }
        }
    }

    fn complete_link(&mut self, pending: PendingLink, reply: Option<&str>) -> CommandOutcome {
        // A deferred reply can arrive after the host has hidden the surface.
        if !self.surface.is_available() {
            debug!(kind = ?pending.kind, "link prompt dropped, surface unavailable");
            return CommandOutcome::SurfaceUnavailable;
        }

        let PendingLink {
            kind,
            state,
            mut chunk,
        } = pending;

        let engine = CommandEngine::new(&self.settings, &self.hooks);
        engine.finish_link(&mut chunk, kind, reply);

        let command = match kind {
            LinkKind::Link => Command::Link,
            LinkKind::Image => Command::Image,
        };
        self.commit(ChangeCause::Command(command), &state, chunk)
    }

    /// Write a command result back to the surface as its own undo step.
    fn commit(&mut self, cause: ChangeCause, before: &EditorState, chunk: Chunk) -> CommandOutcome {
        let next = EditorState::from_chunk(chunk);

        if next.text == before.text {
            next.restore(&mut self.surface);
            return CommandOutcome::Unchanged;
        }

        if let Some(history) = self.history.as_mut() {
            history.refresh(&self.surface);
            history.set_command_mode(&self.surface);
        }

        self.surface.focus();
        next.restore(&mut self.surface);

        if let Some(history) = self.history.as_mut() {
            history.refresh(&self.surface);
        }

        self.notify(TextChange {
            cause,
            delta: TextDelta::between(&before.text, &next.text),
        });
        CommandOutcome::Applied
    }

    fn undo(&mut self) -> CommandOutcome {
        self.step_history(ChangeCause::Undo)
    }

    fn redo(&mut self) -> CommandOutcome {
        self.step_history(ChangeCause::Redo)
    }

    fn step_history(&mut self, cause: ChangeCause) -> CommandOutcome {
        if !self.surface.is_available() {
            return CommandOutcome::SurfaceUnavailable;
        }
        let Some(history) = self.history.as_mut() else {
            return CommandOutcome::Unchanged;
        };

        let before = self.surface.text();
        let stepped = match cause {
            ChangeCause::Redo => history.redo(&mut self.surface),
            _ => history.undo(&mut self.surface),
        };
        if !stepped {
            return CommandOutcome::Unchanged;
        }

        debug!(?cause, "history step");
        let after = self.surface.text();
        self.notify(TextChange {
            cause,
            delta: TextDelta::between(&before, &after),
        });
        CommandOutcome::Applied
    }

    fn notify(&mut self, change: TextChange) {
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }
}
