//! Benchmarks for highlighting, editing and gutter painting.
//!
//! Run with: cargo bench

use codepad_buffer::{Position, TextBuffer};
use codepad_core::geometry::Rect;
use codepad_core::view::{Font, ViewSettings};
use codepad_core::EditorView;
use codepad_syntax::{HighlightSettings, Language, StringMatching};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// Generates a Python source of `lines` lines.
fn generate_source(lines: usize) -> String {
    (0..lines)
        .map(|i| match i % 4 {
            0 => format!("def func_{i}(x):  # helper {i}\n"),
            1 => format!("    s = \"value {i}\" + 'other'\n"),
            2 => "    if x is not None and x > 0: return True\n".to_string(),
            _ => "    return False\n".to_string(),
        })
        .collect()
}

fn python_view(text: &str) -> EditorView {
    let engine = Language::Python
        .engine(&HighlightSettings::default())
        .expect("python rules compile");
    EditorView::new(text, engine, Font::default(), ViewSettings::default())
}

/// Benchmarks a single line through each string strategy.
fn bench_highlight_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("highlight_line");
    let line = "class Foo(Base): x = \"a\" + \"b\" if not y else 'c'  # done";

    for matching in [StringMatching::Pairwise, StringMatching::Greedy] {
        let settings = HighlightSettings {
            string_matching: matching,
            ..HighlightSettings::default()
        };
        let engine = Language::Python.engine(&settings).expect("python rules compile");

        group.bench_with_input(
            BenchmarkId::new("python", format!("{matching:?}")),
            &engine,
            |b, engine| b.iter(|| black_box(engine.resolve_line(black_box(line)))),
        );
    }

    group.finish();
}

/// Benchmarks building a view, which highlights every line.
fn bench_full_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_scan");

    for size in [100, 1000, 10000].iter() {
        let text = generate_source(*size);
        group.bench_with_input(BenchmarkId::new("open", size), &text, |b, text| {
            b.iter(|| black_box(python_view(black_box(text))))
        });
    }

    group.finish();
}

/// Benchmarks typing into a large file; only changed lines are rescanned.
fn bench_incremental_edit(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental_edit");
    let text = generate_source(10000);

    group.bench_function("type_in_middle", |b| {
        b.iter_with_setup(
            || {
                let mut view = python_view(&text);
                view.move_cursor(Position::new(5000, 4));
                view
            },
            |mut view| {
                view.insert_text(black_box("x")).expect("view is writable");
                black_box(view)
            },
        )
    });

    group.bench_function("insert_line_break", |b| {
        b.iter_with_setup(
            || {
                let mut view = python_view(&text);
                view.move_cursor(Position::new(5000, 4));
                view
            },
            |mut view| {
                view.insert_text(black_box("\n")).expect("view is writable");
                black_box(view)
            },
        )
    });

    group.finish();
}

/// Benchmarks gutter label computation for one screen.
fn bench_gutter_paint(c: &mut Criterion) {
    let mut group = c.benchmark_group("gutter_paint");
    let mut view = python_view(&generate_source(100000));
    view.resize(Rect::new(0.0, 0.0, 800.0, 600.0));
    view.scroll_to(500_000.0);
    let dirty = Rect::new(0.0, 0.0, view.gutter().width(), 600.0);

    group.bench_function("screen_at_line_25000", |b| {
        b.iter(|| black_box(view.paint_gutter(black_box(dirty))))
    });

    group.finish();
}

/// Benchmarks raw buffer line access used by the highlighter.
fn bench_line_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_access");
    let buffer = TextBuffer::from(generate_source(100000).as_str());

    group.bench_function("line_text", |b| {
        b.iter(|| black_box(buffer.line_text(black_box(50000))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_highlight_line,
    bench_full_scan,
    bench_incremental_edit,
    bench_gutter_paint,
    bench_line_access,
);
criterion_main!(benches);
