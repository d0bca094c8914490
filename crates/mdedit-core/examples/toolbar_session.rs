//! Toolbar session example
//!
//! Drives a `MarkdownEditor` over an in-memory surface the way a toolbar host would: format
//! text, insert a link through a deferred prompt, type, and walk the undo history.

use mdedit_core::{
    Command, CommandOutcome, DeferredPrompt, EditKey, EditorSettings, MarkdownEditor,
    MemorySurface, TextSurface,
};
use std::sync::{Arc, Mutex};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Toolbar session ===\n");

    let surface = MemorySurface::new("Markdown is a markup language.\n\nRead the guide.");
    let mut editor = MarkdownEditor::new(surface, DeferredPrompt, EditorSettings::default());

    let change_count = Arc::new(Mutex::new(0usize));
    let change_count_clone = Arc::clone(&change_count);
    editor.subscribe(move |change| {
        if let Ok(mut count) = change_count_clone.lock() {
            *count += 1;
            println!("  change #{}: {:?}", *count, change.cause);
        }
    });
    editor.run();

    println!("1. Bold:");
    editor.surface_mut().select_text("Markdown");
    editor.execute(Command::Bold)?;
    print_surface(&editor);

    println!("\n2. Quote the first paragraph:");
    editor.surface_mut().select_text("**Markdown** is a markup language.");
    editor.execute(Command::Quote)?;
    print_surface(&editor);

    println!("\n3. Link with a deferred prompt:");
    editor.surface_mut().select_text("guide");
    if editor.execute(Command::Link)? == CommandOutcome::AwaitingPrompt {
        println!("  prompt open, answering later...");
        editor.resolve_prompt(Some("commonmark.org/help".to_string()))?;
    }
    print_surface(&editor);

    println!("\n4. Typing:");
    let end = editor.surface().text().chars().count();
    editor.surface_mut().set_selection(end, end);
    for ch in "\nThanks!".chars() {
        let key = if ch == '\n' {
            EditKey::Enter
        } else {
            EditKey::Character
        };
        editor.handle_key(key)?;
        editor.surface_mut().type_text(&ch.to_string());
        editor.input_applied()?;
    }
    print_surface(&editor);

    println!("\n5. Undo everything:");
    while editor.can_undo() {
        editor.execute(Command::Undo)?;
    }
    print_surface(&editor);

    println!("\n6. Redo once:");
    editor.execute(Command::Redo)?;
    print_surface(&editor);

    if let Ok(count) = change_count.lock() {
        println!("\nTotal changes: {count}");
    }
    Ok(())
}

fn print_surface(editor: &MarkdownEditor<MemorySurface, DeferredPrompt>) {
    for line in editor.surface().text().lines() {
        println!("  | {line}");
    }
    println!("  selection: {:?}", editor.surface().selection());
}
