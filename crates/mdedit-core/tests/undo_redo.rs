use std::sync::{Arc, Mutex};

use mdedit_core::{
    Command, CommandOutcome, DeferredPrompt, EditKey, EditorSettings, HistoryChange,
    MarkdownEditor, MemorySurface, TextSurface, UndoMode,
};

fn running(surface: MemorySurface) -> MarkdownEditor<MemorySurface, DeferredPrompt> {
    running_with(surface, EditorSettings::default())
}

fn running_with(
    surface: MemorySurface,
    settings: EditorSettings,
) -> MarkdownEditor<MemorySurface, DeferredPrompt> {
    let mut editor = MarkdownEditor::new(surface, DeferredPrompt, settings);
    editor.run();
    editor
}

fn type_chars(editor: &mut MarkdownEditor<MemorySurface, DeferredPrompt>, text: &str) {
    for ch in text.chars() {
        editor.handle_key(EditKey::Character).unwrap();
        editor.surface_mut().type_text(&ch.to_string());
        editor.input_applied().unwrap();
    }
}

fn backspace(editor: &mut MarkdownEditor<MemorySurface, DeferredPrompt>) {
    editor.handle_key(EditKey::Delete).unwrap();
    editor.surface_mut().backspace();
    editor.input_applied().unwrap();
}

#[test]
fn test_commands_undo_one_at_a_time() {
    let mut editor = running(MemorySurface::new("one two three").with_selection(0, 3));

    editor.execute(Command::Bold).unwrap();
    assert!(editor.surface_mut().select_text("three"));
    editor.execute(Command::Italic).unwrap();
    assert_eq!(editor.surface().text(), "**one** two *three*");
    assert!(editor.can_undo());
    assert!(!editor.can_redo());

    assert_eq!(editor.execute(Command::Undo).unwrap(), CommandOutcome::Applied);
    assert_eq!(editor.surface().text(), "**one** two three");

    editor.execute(Command::Undo).unwrap();
    assert_eq!(editor.surface().text(), "one two three");
    assert!(!editor.can_undo());
    assert!(editor.can_redo());

    editor.execute(Command::Redo).unwrap();
    assert_eq!(editor.surface().text(), "**one** two three");
    editor.execute(Command::Redo).unwrap();
    assert_eq!(editor.surface().text(), "**one** two *three*");
    assert!(!editor.can_redo());
}

#[test]
fn test_undo_restores_selection() {
    let mut editor = running(MemorySurface::new("one two").with_selection(4, 7));

    editor.execute(Command::Bold).unwrap();
    editor.execute(Command::Undo).unwrap();
    assert_eq!(editor.surface().text(), "one two");
    assert_eq!(editor.surface().selection(), (4, 7));
}

#[test]
fn test_typing_run_is_one_undo_step() {
    let mut editor = running(MemorySurface::new(""));

    type_chars(&mut editor, "abc");
    assert_eq!(editor.surface().text(), "abc");
    assert_eq!(editor.history().map(|h| h.mode()), Some(UndoMode::Typing));

    editor.execute(Command::Undo).unwrap();
    assert_eq!(editor.surface().text(), "");
    assert!(!editor.can_undo());

    editor.execute(Command::Redo).unwrap();
    assert_eq!(editor.surface().text(), "abc");
}

#[test]
fn test_switching_from_typing_to_deleting_splits_steps() {
    let mut editor = running(MemorySurface::new(""));

    type_chars(&mut editor, "abc");
    backspace(&mut editor);
    backspace(&mut editor);
    assert_eq!(editor.surface().text(), "a");

    editor.execute(Command::Undo).unwrap();
    assert_eq!(editor.surface().text(), "abc");

    editor.execute(Command::Undo).unwrap();
    assert_eq!(editor.surface().text(), "");
}

#[test]
fn test_caret_movement_before_typing_is_restorable() {
    let mut editor = running(MemorySurface::new(""));

    type_chars(&mut editor, "ab");
    editor.handle_key(EditKey::Navigation).unwrap();
    editor.surface_mut().set_selection(0, 0);
    editor.input_applied().unwrap();
    type_chars(&mut editor, "X");
    assert_eq!(editor.surface().text(), "Xab");

    editor.execute(Command::Undo).unwrap();
    assert_eq!(editor.surface().text(), "ab");
    assert_eq!(editor.surface().selection(), (0, 0));

    while editor.can_undo() {
        editor.execute(Command::Undo).unwrap();
    }
    assert_eq!(editor.surface().text(), "");
}

#[test]
fn test_modifier_keys_do_not_change_mode() {
    let mut editor = running(MemorySurface::new("x"));

    editor.handle_key(EditKey::from_key_code(16)).unwrap();
    assert_eq!(editor.history().map(|h| h.mode()), Some(UndoMode::None));

    editor.handle_key(EditKey::from_key_code(37)).unwrap();
    assert_eq!(editor.history().map(|h| h.mode()), Some(UndoMode::Moving));
}

#[test]
fn test_key_codes_are_classified() {
    assert_eq!(EditKey::from_key_code(37), EditKey::Navigation);
    assert_eq!(EditKey::from_key_code(8), EditKey::Delete);
    assert_eq!(EditKey::from_key_code(46), EditKey::Delete);
    assert_eq!(EditKey::from_key_code(13), EditKey::Enter);
    assert_eq!(EditKey::from_key_code(27), EditKey::Escape);
    assert_eq!(EditKey::from_key_code(17), EditKey::Modifier);
    assert_eq!(EditKey::from_key_code(65), EditKey::Character);
}

#[test]
fn test_paste_is_its_own_step() {
    let mut editor = running(MemorySurface::new("abc"));

    editor.surface_mut().type_text(" pasted");
    editor.handle_paste().unwrap();
    assert_eq!(editor.history().map(|h| h.mode()), Some(UndoMode::Paste));

    editor.execute(Command::Undo).unwrap();
    assert_eq!(editor.surface().text(), "abc");
}

#[test]
fn test_history_depth_is_bounded() {
    let settings = EditorSettings {
        max_undo_depth: 3,
        ..EditorSettings::default()
    };
    let mut editor = running_with(MemorySurface::new("x").with_selection(0, 1), settings);
    let paren = Command::auto_pair('(').unwrap();

    for _ in 0..3 {
        editor.execute(paren.clone()).unwrap();
    }
    assert_eq!(editor.surface().text(), "(((x)))");

    editor.execute(Command::Undo).unwrap();
    editor.execute(Command::Undo).unwrap();
    assert_eq!(editor.surface().text(), "(x)");
    assert!(!editor.can_undo());
    assert_eq!(
        editor.execute(Command::Undo).unwrap(),
        CommandOutcome::Unchanged
    );
}

#[test]
fn test_history_subscribers_see_availability() {
    let changes: Arc<Mutex<Vec<HistoryChange>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);

    let mut editor = running(MemorySurface::new("word").with_selection(0, 4));
    editor
        .history_mut()
        .unwrap()
        .subscribe(move |change| sink.lock().unwrap().push(*change));

    editor.execute(Command::Bold).unwrap();
    assert_eq!(
        changes.lock().unwrap().last().copied(),
        Some(HistoryChange {
            can_undo: true,
            can_redo: false,
            depth: 1,
        })
    );

    editor.execute(Command::Undo).unwrap();
    assert_eq!(
        changes.lock().unwrap().last().copied(),
        Some(HistoryChange {
            can_undo: false,
            can_redo: true,
            depth: 0,
        })
    );
}

#[test]
fn test_disabled_undo_keeps_no_history() {
    let settings = EditorSettings {
        undo_enabled: false,
        ..EditorSettings::default()
    };
    let mut editor = running_with(MemorySurface::new("word").with_selection(0, 4), settings);

    assert_eq!(editor.execute(Command::Bold).unwrap(), CommandOutcome::Applied);
    assert!(editor.history().is_none());
    assert!(!editor.can_undo());
    assert_eq!(
        editor.execute(Command::Undo).unwrap(),
        CommandOutcome::Unchanged
    );
    assert_eq!(editor.surface().text(), "**word**");
}
