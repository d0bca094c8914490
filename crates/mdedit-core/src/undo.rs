//! Undo/redo history with keystroke coalescing.
//!
//! The history stores whole [`EditorState`] snapshots. Raw input is classified into an
//! [`UndoMode`]; consecutive events of the same mode coalesce into one undo step, and a new step
//! is persisted whenever the mode changes. Commands always get a step of their own.
//!
//! # Stack layout
//!
//! `pointer` is the slot the *live* surface state belongs to. Entries below it are restorable
//! history; `stack[0]` is the initial snapshot, so undo is possible while `pointer > 1`. Entries
//! above `pointer` are redo states.
//!
//! # Hosts
//!
//! The host reports input in two phases: [`UndoHistory::set_mode`] *before* the input is applied
//! to the surface (persisting the buffered pre-input state if the mode changed), and
//! [`UndoHistory::refresh`] *after* it (capturing the new buffered state).

use tracing::trace;

use crate::state::EditorState;
use crate::surface::TextSurface;

/// Default maximum number of stored snapshots.
pub const DEFAULT_MAX_UNDO_DEPTH: usize = 1000;

/// Classification of the most recent input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UndoMode {
    /// No input since the last undo/redo.
    #[default]
    None,
    /// Printable characters.
    Typing,
    /// Backspace or delete.
    Deleting,
    /// Caret movement by keyboard or pointer.
    Moving,
    /// Enter.
    Newlines,
    /// Escape.
    Escape,
    /// Clipboard paste.
    Paste,
    /// A toolbar command.
    Command,
}

/// Raw input categories a host can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKey {
    /// Arrow, page and home/end keys.
    Navigation,
    /// Backspace or delete.
    Delete,
    /// Enter/return.
    Enter,
    /// Escape.
    Escape,
    /// Shift, control, alt, caps lock or the OS key pressed on its own.
    Modifier,
    /// Any other key.
    Character,
    /// A pointer press inside the input.
    Pointer,
}

impl EditKey {
    /// Classify a DOM-style key code.
    pub fn from_key_code(code: u32) -> Self {
        match code {
            33..=40 | 63232..=63235 => Self::Navigation,
            8 | 46 | 127 => Self::Delete,
            13 => Self::Enter,
            27 => Self::Escape,
            16..=20 | 91 => Self::Modifier,
            _ => Self::Character,
        }
    }

    /// The undo mode this input switches to, if any.
    pub fn undo_mode(self) -> Option<UndoMode> {
        match self {
            Self::Navigation | Self::Pointer => Some(UndoMode::Moving),
            Self::Delete => Some(UndoMode::Deleting),
            Self::Enter => Some(UndoMode::Newlines),
            Self::Escape => Some(UndoMode::Escape),
            Self::Modifier => None,
            Self::Character => Some(UndoMode::Typing),
        }
    }
}

/// History status delivered to subscribers after every push, undo and redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryChange {
    /// Whether an undo is possible.
    pub can_undo: bool,
    /// Whether a redo is possible.
    pub can_redo: bool,
    /// Number of steps that can be undone.
    pub depth: usize,
}

/// Callback type for history changes.
pub type HistoryCallback = Box<dyn FnMut(&HistoryChange) + Send>;

/// Snapshot-based undo/redo history.
pub struct UndoHistory {
    stack: Vec<EditorState>,
    pointer: usize,
    mode: UndoMode,
    /// State captured when a run of caret movement started.
    pending: Option<EditorState>,
    /// Last state captured after an input was applied.
    buffered: Option<EditorState>,
    max_depth: usize,
    callbacks: Vec<HistoryCallback>,
}

impl std::fmt::Debug for UndoHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoHistory")
            .field("stack", &self.stack.len())
            .field("pointer", &self.pointer)
            .field("mode", &self.mode)
            .field("pending", &self.pending.is_some())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_DEPTH)
    }
}

impl UndoHistory {
    /// Create an empty history keeping at most `max_depth` snapshots (at least two).
    pub fn new(max_depth: usize) -> Self {
        Self {
            stack: Vec::new(),
            pointer: 0,
            mode: UndoMode::None,
            pending: None,
            buffered: None,
            max_depth: max_depth.max(2),
            callbacks: Vec::new(),
        }
    }

    /// Record the initial state of `surface`.
    pub fn init<S: TextSurface + ?Sized>(&mut self, surface: &S) {
        self.refresh(surface);
        self.save_state(surface);
    }

    /// Subscribe to history changes.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&HistoryChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Whether an undo is possible.
    pub fn can_undo(&self) -> bool {
        self.pointer > 1
    }

    /// Whether a redo is possible.
    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.stack.len()
    }

    /// Current input mode.
    pub fn mode(&self) -> UndoMode {
        self.mode
    }

    /// Number of steps that can be undone.
    pub fn depth(&self) -> usize {
        self.pointer.saturating_sub(1)
    }

    /// Stored snapshots, oldest first (including any redo states).
    pub fn states(&self) -> &[EditorState] {
        &self.stack
    }

    /// Switch to `mode` before an input is applied.
    ///
    /// A mode change persists the buffered state as a new undo step; repeated events of the same
    /// mode coalesce.
    pub fn set_mode<S: TextSurface + ?Sized>(&mut self, mode: UndoMode, surface: &S) {
        if self.mode != mode {
            trace!(from = ?self.mode, to = ?mode, "undo mode switch");
            self.mode = mode;
            self.save_state(surface);
        }
    }

    /// Persist the buffered state as a command step.
    ///
    /// Unlike [`set_mode`](Self::set_mode) this always persists, so back-to-back commands are
    /// undone one at a time.
    pub fn set_command_mode<S: TextSurface + ?Sized>(&mut self, surface: &S) {
        self.mode = UndoMode::Command;
        self.save_state(surface);
    }

    /// Re-capture the buffered state after an input was applied to the surface.
    pub fn refresh<S: TextSurface + ?Sized>(&mut self, surface: &S) {
        self.buffered = EditorState::capture(surface);
    }

    /// React to a paste that has already been applied to the surface.
    pub fn handle_paste<S: TextSurface + ?Sized>(&mut self, surface: &S) {
        let changed = match &self.buffered {
            Some(buffered) => surface.is_available() && buffered.text != surface.text(),
            None => false,
        };
        if changed {
            self.mode = UndoMode::Paste;
            self.save_state(surface);
            self.refresh(surface);
        }
    }

    /// Restore the previous step. Returns `false` when there is nothing to undo.
    pub fn undo<S: TextSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        self.settle_pending();

        let undone = if self.can_undo() {
            match EditorState::capture(&*surface) {
                Some(live) => {
                    if self.pointer < self.stack.len() {
                        self.stack[self.pointer] = live;
                    } else {
                        self.stack.push(live);
                    }
                    self.pointer -= 1;
                    self.stack[self.pointer].restore(surface);
                    true
                }
                None => false,
            }
        } else {
            false
        };

        self.mode = UndoMode::None;
        surface.focus();
        self.refresh(&*surface);
        if undone {
            trace!(pointer = self.pointer, "undo");
            self.notify();
        }
        undone
    }

    /// Re-apply the next step. Returns `false` when there is nothing to redo.
    pub fn redo<S: TextSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        self.settle_pending();

        let redone = self.can_redo() && surface.is_available();
        if redone {
            self.pointer += 1;
            self.stack[self.pointer].restore(surface);
        }

        self.mode = UndoMode::None;
        surface.focus();
        self.refresh(&*surface);
        if redone {
            trace!(pointer = self.pointer, "redo");
            self.notify();
        }
        redone
    }

    fn save_state<S: TextSurface + ?Sized>(&mut self, surface: &S) {
        let Some(current) = self
            .buffered
            .clone()
            .or_else(|| EditorState::capture(surface))
        else {
            return;
        };

        if self.mode == UndoMode::Moving {
            if self.pending.is_none() {
                self.pending = Some(current);
            }
            return;
        }

        self.settle_pending();
        self.push(current);
    }

    /// Push the pending movement state if it differs from the top of the stack.
    fn settle_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let differs = self
            .pointer
            .checked_sub(1)
            .and_then(|top| self.stack.get(top))
            .is_none_or(|top| top.text != pending.text);
        if differs {
            self.push(pending);
        }
    }

    fn push(&mut self, state: EditorState) {
        self.stack.truncate(self.pointer);
        self.stack.push(state);
        self.pointer += 1;

        if self.stack.len() > self.max_depth {
            self.stack.remove(0);
            self.pointer -= 1;
        }

        trace!(pointer = self.pointer, depth = self.stack.len(), "undo step pushed");
        self.notify();
    }

    fn notify(&mut self) {
        let change = HistoryChange {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            depth: self.depth(),
        };
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    fn type_key(history: &mut UndoHistory, surface: &mut MemorySurface, text: &str) {
        history.set_mode(UndoMode::Typing, surface);
        surface.type_text(text);
        history.refresh(surface);
    }

    #[test]
    fn key_codes_map_to_modes() {
        assert_eq!(EditKey::from_key_code(37), EditKey::Navigation);
        assert_eq!(EditKey::from_key_code(63233), EditKey::Navigation);
        assert_eq!(EditKey::from_key_code(8), EditKey::Delete);
        assert_eq!(EditKey::from_key_code(13), EditKey::Enter);
        assert_eq!(EditKey::from_key_code(27), EditKey::Escape);
        assert_eq!(EditKey::from_key_code(17), EditKey::Modifier);
        assert_eq!(EditKey::from_key_code(65), EditKey::Character);
        assert_eq!(EditKey::Modifier.undo_mode(), None);
        assert_eq!(EditKey::Pointer.undo_mode(), Some(UndoMode::Moving));
    }

    #[test]
    fn fresh_history_cannot_undo() {
        let surface = MemorySurface::new("");
        let mut history = UndoHistory::default();
        history.init(&surface);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.depth(), 0);
    }

    #[test]
    fn typing_run_is_one_step() {
        let mut surface = MemorySurface::new("");
        let mut history = UndoHistory::default();
        history.init(&surface);

        for ch in ["a", "b", "c"] {
            type_key(&mut history, &mut surface, ch);
        }
        assert!(history.can_undo());

        assert!(history.undo(&mut surface));
        assert_eq!(surface.text(), "");
        assert!(!history.can_undo());
        assert!(history.can_redo());

        assert!(history.redo(&mut surface));
        assert_eq!(surface.text(), "abc");
        assert!(!history.can_redo());
    }

    #[test]
    fn moving_without_edit_adds_no_step() {
        let mut surface = MemorySurface::new("abc");
        let mut history = UndoHistory::default();
        history.init(&surface);

        history.set_mode(UndoMode::Moving, &surface);
        surface.set_selection(1, 1);
        history.refresh(&surface);
        history.set_mode(UndoMode::Moving, &surface);
        surface.set_selection(0, 0);
        history.refresh(&surface);

        history.set_command_mode(&surface);
        // The pending movement state has the same text as the initial one and is dropped.
        assert_eq!(history.states().len(), 2);
    }

    #[test]
    fn eviction_caps_the_stack() {
        let mut surface = MemorySurface::new("");
        let mut history = UndoHistory::new(3);
        history.init(&surface);

        for i in 0..5 {
            surface.type_text(&i.to_string());
            history.refresh(&surface);
            history.set_command_mode(&surface);
        }
        assert_eq!(history.states().len(), 3);
        assert!(history.can_undo());
    }
}
