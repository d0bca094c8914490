#![warn(missing_docs)]
//! Mdedit Core - Headless Markdown Toolbar Engine
//!
//! # Overview
//!
//! `mdedit-core` implements the editing behavior behind a markdown toolbar: bold, italic,
//! blockquote, code, link and image buttons, plus an undo history that coalesces keystrokes.
//! It never draws anything. The host supplies a [`TextSurface`] (the text area) and a
//! [`LinkPrompt`] (the URL dialog) and forwards key presses; the engine reads and writes plain
//! text and a selection range.
//!
//! # Core Features
//!
//! - **Selection Chunking**: a selection is split into before / start tag / selection / end tag / after
//! - **Toggle Markup**: applying bold, italic, quote or code twice restores the original text
//! - **Reference Links**: links become `[text][n]` with definitions renumbered at the document end
//! - **Coalescing Undo**: runs of typing, deleting or moving collapse into single undo steps
//! - **Hooks**: post-process blockquotes and replace the image dialog
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  MarkdownEditor (run / execute / keys)      │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  CommandEngine (inline, quote, links)       │  ← Markup Commands
//! ├─────────────────────────────────────────────┤
//! │  UndoHistory (modes, coalescing)            │  ← History
//! ├─────────────────────────────────────────────┤
//! │  EditorState / Chunk                        │  ← Snapshots
//! ├─────────────────────────────────────────────┤
//! │  TextSurface                                │  ← Host Text Area
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Using the Editor
//!
//! ```rust
//! use mdedit_core::{
//!     Command, DeferredPrompt, EditorSettings, MarkdownEditor, MemorySurface, TextSurface,
//! };
//!
//! let surface = MemorySurface::new("see the docs").with_selection(8, 12);
//! let mut editor = MarkdownEditor::new(surface, DeferredPrompt, EditorSettings::default());
//! editor.run();
//!
//! // The prompt answers later, e.g. once a dialog closes.
//! editor.execute(Command::Link).unwrap();
//! editor.resolve_prompt(Some("example.com/docs".to_string())).unwrap();
//!
//! assert_eq!(
//!     editor.surface().text(),
//!     "see the [docs][1]\n\n\n  [1]: http://example.com/docs"
//! );
//! ```
//!
//! ## Using Chunks Directly
//!
//! ```rust
//! use mdedit_core::{Chunk, CommandEngine, EditorSettings, HookSet};
//!
//! let settings = EditorSettings::default();
//! let hooks = HookSet::new();
//! let engine = CommandEngine::new(&settings, &hooks);
//!
//! let mut chunk = Chunk::new("", "a quoted line", "");
//! engine.quote(&mut chunk);
//! assert_eq!(chunk.text(), "> a quoted line");
//! ```
//!
//! # Module Description
//!
//! - [`chunk`] - Five-region selection model
//! - [`state`] - Text and selection snapshots
//! - [`undo`] - Undo history with coalescing modes
//! - [`commands`] - Markup commands
//! - [`editor`] - Orchestration over a [`TextSurface`]
//! - [`hooks`] - Host extension points
//!
//! # Offsets
//!
//! - Selection offsets are character offsets, not byte offsets
//! - Line endings are normalized to `\n` before commands run

pub mod chunk;
pub mod commands;
pub mod delta;
pub mod editor;
pub mod error;
pub mod hooks;
pub mod line_ending;
pub mod prompt;
pub mod settings;
pub mod state;
pub mod surface;
pub mod undo;

pub use chunk::{Chunk, TagPattern};
pub use commands::{Command, CommandEngine, CommandOutcome, LinkRequest};
pub use delta::{TextDelta, TextDeltaEdit};
pub use editor::{ChangeCause, MarkdownEditor, TextChange, TextChangeCallback};
pub use error::EditorError;
pub use hooks::{Hook, HookName, HookSet, ImageDialogHook, TextHook};
pub use line_ending::normalize_line_endings;
pub use prompt::{DeferredPrompt, LinkKind, LinkPrompt, PromptReply};
pub use settings::{DEFAULT_LINE_LENGTH, EditorSettings, EditorStrings};
pub use state::EditorState;
pub use surface::{MemorySurface, TextSurface};
pub use undo::{
    DEFAULT_MAX_UNDO_DEPTH, EditKey, HistoryCallback, HistoryChange, UndoHistory, UndoMode,
};
