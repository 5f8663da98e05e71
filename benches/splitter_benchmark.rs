//! Segment splitter benchmark: Measure incremental anchor advancement.
//!
//! Target: per-tick cost proportional to newly revealed text, not to the
//! whole document.

use cadence::{SegmentSplitter, Segments};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn sample_document(paragraphs: usize) -> String {
    let mut text = String::new();
    for i in 0..paragraphs {
        if i % 5 == 4 {
            text.push_str("```rust\nlet value = compute();\nassert!(value > 0);\n```\n\n");
        } else {
            text.push_str("A paragraph of streamed prose that ends cleanly.\n\n");
        }
    }
    text
}

fn splitter_full_document(c: &mut Criterion) {
    let document = sample_document(200);

    c.bench_function("splitter_advance_full_document", |b| {
        b.iter(|| {
            let mut splitter = SegmentSplitter::new();
            splitter.advance(black_box(&document), document.len());
            black_box(splitter.anchor())
        });
    });
}

fn splitter_incremental_ticks(c: &mut Criterion) {
    let document = sample_document(200);

    c.bench_function("splitter_advance_incremental_64b_ticks", |b| {
        b.iter(|| {
            let mut splitter = SegmentSplitter::new();
            let mut revealed = 0;
            while revealed < document.len() {
                revealed = (revealed + 64).min(document.len());
                while !document.is_char_boundary(revealed) {
                    revealed += 1;
                }
                splitter.advance(black_box(&document), revealed);
            }
            black_box(splitter.anchor())
        });
    });
}

fn splitter_segments_lookup(c: &mut Criterion) {
    let document = sample_document(500);
    let mut splitter = SegmentSplitter::new();
    splitter.advance(&document, document.len());

    c.bench_function("splitter_segments_lookup", |b| {
        b.iter(|| {
            let Segments { stable, streaming } =
                splitter.segments(black_box(&document), document.len());
            black_box((stable.len(), streaming.len()))
        });
    });
}

fn splitter_scale_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("splitter_scale");

    for paragraphs in [50, 500, 2_000] {
        let document = sample_document(paragraphs);
        group.bench_with_input(
            BenchmarkId::new("advance", paragraphs),
            &document,
            |b, document| {
                b.iter(|| {
                    let mut splitter = SegmentSplitter::new();
                    splitter.advance(black_box(document), document.len());
                    black_box(splitter.anchor())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    splitter_full_document,
    splitter_incremental_ticks,
    splitter_segments_lookup,
    splitter_scale_comparison,
);
criterion_main!(benches);
