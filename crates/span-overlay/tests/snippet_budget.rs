use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use span_overlay::{
    AnnotationField, FieldSource, HoverSet, RawSpan, SnippetConfig, SnippetSpan, Snippeter,
    SpanOverlay, build_snippet, highlight_text,
};

fn keyword(spans: Vec<RawSpan>) -> AnnotationField {
    AnnotationField::new(
        "kw",
        FieldSource::Keyword {
            query: "q".to_string(),
        },
        spans,
    )
}

fn low_concept(spans: Vec<RawSpan>) -> AnnotationField {
    AnnotationField::new(
        "concept",
        FieldSource::ConceptScore {
            namespace: "local".to_string(),
            concept_name: "faint".to_string(),
        },
        spans,
    )
}

#[test]
fn test_cat_example_collapsed_keeps_all_three_spans() {
    let text = "The cat sat on the mat.";
    let snippet = highlight_text(
        text,
        &[keyword(vec![RawSpan::new(4, 7)])],
        &HoverSet::new(),
        false,
    );

    assert_eq!(snippet.spans.len(), 3);
    assert!(snippet.spans.iter().all(|s| !s.is_ellipsis()));
    assert!(snippet.spans.iter().all(|s| !s.is_truncated()));
    assert_eq!(snippet.visible_text("…"), text);
    assert!(!snippet.some_hidden);
}

#[test]
fn test_long_document_collapses_around_hits() {
    let filler = "lorem ipsum ".repeat(40);
    let text = format!("{filler}NEEDLE{filler}");
    let start = filler.chars().count() as i64;
    let overlay = SpanOverlay::from_fields(&text, &[keyword(vec![RawSpan::new(start, start + 6)])]);

    let collapsed = overlay.snippet(&HoverSet::new(), false);
    assert!(collapsed.some_hidden);
    assert_eq!(collapsed.spans.len(), 5);
    assert!(collapsed.spans[0].is_ellipsis());
    assert_eq!(collapsed.spans[1].snippet_text().map(|t| t.chars().count()), Some(50));
    assert_eq!(collapsed.spans[2].snippet_text(), Some("NEEDLE"));
    assert_eq!(collapsed.spans[3].snippet_text().map(|t| t.chars().count()), Some(50));
    assert!(collapsed.spans[4].is_ellipsis());

    let expanded = overlay.snippet(&HoverSet::new(), true);
    assert!(!expanded.some_hidden);
    assert_eq!(expanded.visible_text(""), text);
}

#[test]
fn test_no_signal_fallback_for_sub_threshold_scores() {
    let text = "x".repeat(1000);
    let snippet = highlight_text(
        &text,
        &[low_concept(vec![
            RawSpan::scored(10, 20, 0.2),
            RawSpan::scored(500, 600, 0.5),
        ])],
        &HoverSet::new(),
        false,
    );

    assert_eq!(snippet.spans.len(), 2);
    let first = &snippet.spans[0];
    assert!(first.snippet_text().is_some_and(|t| t.chars().count() <= 300));
    assert_eq!(first.render_span().map(|r| r.start()), Some(0));
    assert!(snippet.spans[1].is_ellipsis());
    assert!(snippet.some_hidden);
}

#[test]
fn test_collapsed_never_truncates_highlighted_spans() {
    let mut rng = StdRng::seed_from_u64(0xface);
    for _ in 0..300 {
        let len = rng.gen_range(0..400i64);
        let text: String = (0..len)
            .map(|i| if i % 7 == 0 { '👋' } else { 'a' })
            .collect();

        let mut spans = Vec::new();
        let mut pos = 0i64;
        while pos < len {
            let start = pos + rng.gen_range(0..120);
            let end = (start + rng.gen_range(1..40)).min(len);
            if start >= len {
                break;
            }
            spans.push(RawSpan::new(start, end));
            pos = end;
        }

        let context_chars = rng.gen_range(0..60);
        let overlay = SpanOverlay::from_fields(&text, &[keyword(spans)]);
        let render_spans = overlay.render(&HoverSet::new());
        let snippet = Snippeter::new(SnippetConfig {
            context_chars,
            fallback_chars: 300,
        })
        .build(&render_spans, false);

        for span in &snippet.spans {
            if let SnippetSpan::Shown {
                render_span,
                snippet_text,
            } = span
            {
                if render_span.is_highlighted {
                    assert_eq!(snippet_text.as_str(), render_span.text());
                } else {
                    assert!(snippet_text.chars().count() <= render_span.text().chars().count());
                    assert!(render_span.text().contains(snippet_text.as_str()));
                }
            }
        }

        for pair in snippet.spans.windows(2) {
            assert!(
                !(pair[0].is_ellipsis() && pair[1].is_ellipsis()),
                "ellipses must not repeat"
            );
        }
    }
}

#[test]
fn test_empty_text_snippet_is_empty() {
    let snippet = highlight_text("", &[keyword(vec![RawSpan::new(0, 3)])], &HoverSet::new(), false);
    assert!(snippet.spans.is_empty());
    assert!(!snippet.some_hidden);

    let merged = SpanOverlay::from_fields("", &[]).merged().to_vec();
    assert_eq!(merged.len(), 1);
    assert_eq!((merged[0].start, merged[0].end), (0, 0));
}

#[test]
fn test_build_snippet_default_budgets() {
    let filler = "z".repeat(120);
    let text = format!("{filler}hit{filler}");
    let overlay = SpanOverlay::from_fields(&text, &[keyword(vec![RawSpan::new(120, 123)])]);
    let snippet = build_snippet(&overlay.render(&HoverSet::new()), false);

    let expected = format!("…{}hit{}…", "z".repeat(50), "z".repeat(50));
    assert_eq!(snippet.visible_text("…"), expected);
}
