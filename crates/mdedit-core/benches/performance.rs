use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use mdedit_core::{
    Chunk, Command, CommandEngine, DeferredPrompt, EditKey, EditorSettings, HookSet, LinkKind,
    MarkdownEditor, MemorySurface, TextSurface,
};

fn large_document(paragraphs: usize) -> String {
    let mut out = String::with_capacity(paragraphs * 96);
    for i in 0..paragraphs {
        out.push_str(&format!(
            "Paragraph {i:05}: the quick brown fox jumps over the lazy dog, see [ref][{}].\n\n",
            i + 1
        ));
    }
    for i in 0..paragraphs {
        out.push_str(&format!("  [{}]: http://example.com/{i}\n", i + 1));
    }
    out
}

fn bench_quote_long_selection(c: &mut Criterion) {
    let body = "the quick brown fox jumps over the lazy dog ".repeat(2_000);
    let settings = EditorSettings::default();
    let hooks = HookSet::new();
    let engine = CommandEngine::new(&settings, &hooks);

    c.bench_function("quote/88k_chars", |b| {
        b.iter_batched(
            || Chunk::new("intro\n\n", body.as_str(), "\n\noutro"),
            |mut chunk| {
                engine.quote(&mut chunk);
                black_box(chunk.selection.len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_link_renumbering(c: &mut Criterion) {
    let text = large_document(2_000);
    let settings = EditorSettings::default();
    let hooks = HookSet::new();
    let engine = CommandEngine::new(&settings, &hooks);

    c.bench_function("link/renumber_2k_refs", |b| {
        b.iter_batched(
            || Chunk::new("", "new link", text.as_str()),
            |mut chunk| {
                engine.begin_link(&mut chunk);
                engine.finish_link(&mut chunk, LinkKind::Link, Some("example.org"));
                black_box(chunk.after.len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_typing_with_history(c: &mut Criterion) {
    let text = large_document(500);
    c.bench_function("typing/100_chars_with_history", |b| {
        b.iter_batched(
            || {
                let surface = MemorySurface::new(text.as_str());
                let mut editor =
                    MarkdownEditor::new(surface, DeferredPrompt, EditorSettings::default());
                editor.run();
                editor
            },
            |mut editor| {
                for _ in 0..100 {
                    editor.handle_key(EditKey::Character).unwrap();
                    editor.surface_mut().type_text("x");
                    editor.input_applied().unwrap();
                }
                editor.execute(Command::Undo).unwrap();
                black_box(editor.surface().text().len());
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_quote_long_selection,
    bench_link_renumbering,
    bench_typing_with_history
);
criterion_main!(benches);
