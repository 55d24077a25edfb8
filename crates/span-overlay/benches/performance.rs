use criterion::{Criterion, black_box, criterion_group, criterion_main};
use span_overlay::{
    AnnotationField, FieldSource, HoverSet, RawSpan, SpanOverlay, build_render_spans,
    build_snippet, merge_spans, normalize,
};

fn large_text(sentence_count: usize) -> String {
    let mut out = String::with_capacity(sentence_count * 64);
    for i in 0..sentence_count {
        out.push_str(&format!(
            "{i:06} the quick brown fox jumps over the lazy dog (span-overlay benchmark). "
        ));
    }
    out
}

/// Three overlapping annotation sources spread over the whole text.
fn annotation_fields(char_count: usize) -> Vec<AnnotationField> {
    let len = char_count as i64;
    let every = |step: i64, width: i64| -> Vec<RawSpan> {
        (0..len / step)
            .map(|i| RawSpan::scored(i * step, (i * step + width).min(len), (i % 10) as f64 / 10.0))
            .collect()
    };

    vec![
        AnnotationField::new(
            "text.keyword",
            FieldSource::Keyword {
                query: "fox".to_string(),
            },
            every(80, 3),
        ),
        AnnotationField::new(
            "text.concept",
            FieldSource::ConceptScore {
                namespace: "local".to_string(),
                concept_name: "animals".to_string(),
            },
            every(200, 120),
        ),
        AnnotationField::new(
            "text.sentences",
            FieldSource::LeafSpan {
                field: "sentences".to_string(),
            },
            every(75, 70),
        ),
    ]
}

fn bench_merge_large_document(c: &mut Criterion) {
    let text = large_text(5_000);
    let fields = annotation_fields(text.chars().count());
    let span_sets = normalize(&text, &fields);

    c.bench_function("merge/5k_sentences_3_sources", |b| {
        b.iter(|| {
            let merged = merge_spans(black_box(&text), black_box(&span_sets));
            black_box(merged.len());
        })
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let text = large_text(5_000);
    let fields = annotation_fields(text.chars().count());

    c.bench_function("pipeline/normalize_merge_render_snippet", |b| {
        b.iter(|| {
            let span_sets = normalize(black_box(&text), black_box(&fields));
            let merged = merge_spans(&text, &span_sets);
            let rendered = build_render_spans(&merged, &span_sets.source_types(), &HoverSet::new());
            let snippet = build_snippet(&rendered, false);
            black_box(snippet.spans.len());
        })
    });
}

fn bench_hover_rerender_with_cached_merge(c: &mut Criterion) {
    let text = large_text(5_000);
    let fields = annotation_fields(text.chars().count());
    let overlay = SpanOverlay::from_fields(text, &fields);
    let hovered: HoverSet = ["text.keyword[10]"].into_iter().collect();

    c.bench_function("pipeline/hover_rerender_cached", |b| {
        b.iter(|| {
            let snippet = overlay.snippet(black_box(&hovered), false);
            black_box(snippet.some_hidden);
        })
    });
}

criterion_group!(
    benches,
    bench_merge_large_document,
    bench_full_pipeline,
    bench_hover_rerender_with_cached_merge
);
criterion_main!(benches);
