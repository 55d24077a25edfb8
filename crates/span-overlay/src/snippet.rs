//! Snippeting.
//!
//! Collapses a long document around its highlighted pieces: highlighted render spans are always
//! shown in full, their non-highlighted neighbours keep a bounded amount of context, and
//! everything else is folded into ellipsis markers. When nothing is highlighted the snippet
//! falls back to the beginning of the document.

use crate::config::SnippetConfig;
use crate::render::RenderSpan;
use crate::text::{grapheme_prefix, grapheme_suffix};
use serde::Serialize;
use tracing::debug;

/// One element of a snippet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnippetSpan {
    /// A render span, possibly cut down to a prefix or suffix of its text.
    Shown {
        /// The render span being shown.
        render_span: RenderSpan,
        /// The visible text: the full text, or a prefix/suffix of it.
        snippet_text: String,
    },
    /// Placeholder for hidden text.
    Ellipsis,
}

impl SnippetSpan {
    fn shown(render_span: &RenderSpan, snippet_text: &str) -> Self {
        SnippetSpan::Shown {
            render_span: render_span.clone(),
            snippet_text: snippet_text.to_string(),
        }
    }

    /// Returns `true` for an ellipsis marker.
    pub fn is_ellipsis(&self) -> bool {
        matches!(self, SnippetSpan::Ellipsis)
    }

    /// The shown render span, if any.
    pub fn render_span(&self) -> Option<&RenderSpan> {
        match self {
            SnippetSpan::Shown { render_span, .. } => Some(render_span),
            SnippetSpan::Ellipsis => None,
        }
    }

    /// The visible text, if any.
    pub fn snippet_text(&self) -> Option<&str> {
        match self {
            SnippetSpan::Shown { snippet_text, .. } => Some(snippet_text),
            SnippetSpan::Ellipsis => None,
        }
    }

    /// Returns `true` if the visible text is shorter than the render span's text.
    pub fn is_truncated(&self) -> bool {
        match self {
            SnippetSpan::Shown {
                render_span,
                snippet_text,
            } => snippet_text.len() < render_span.text().len(),
            SnippetSpan::Ellipsis => false,
        }
    }
}

/// Result of snippeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snippet {
    /// Shown pieces and ellipsis markers, in document order.
    pub spans: Vec<SnippetSpan>,
    /// `true` if some text is hidden in this view.
    pub some_hidden: bool,
}

impl Snippet {
    /// Concatenated visible text, with `marker` in place of each ellipsis.
    pub fn visible_text(&self, marker: &str) -> String {
        let mut out = String::new();
        for span in &self.spans {
            match span {
                SnippetSpan::Shown { snippet_text, .. } => out.push_str(snippet_text),
                SnippetSpan::Ellipsis => out.push_str(marker),
            }
        }
        out
    }
}

fn push_ellipsis(out: &mut Vec<SnippetSpan>) {
    if !out.last().is_some_and(SnippetSpan::is_ellipsis) {
        out.push(SnippetSpan::Ellipsis);
    }
}

/// Builds [`Snippet`]s with fixed budgets.
#[derive(Debug, Clone, Copy, Default)]
pub struct Snippeter {
    config: SnippetConfig,
}

impl Snippeter {
    /// Create a snippeter with the given budgets.
    pub fn new(config: SnippetConfig) -> Self {
        Self { config }
    }

    /// The budgets in use.
    pub fn config(&self) -> &SnippetConfig {
        &self.config
    }

    /// Build the expanded (`is_expanded == true`) or collapsed view of `render_spans`.
    pub fn build(&self, render_spans: &[RenderSpan], is_expanded: bool) -> Snippet {
        if render_spans.iter().all(|r| r.text().is_empty()) {
            return Snippet::default();
        }

        if is_expanded {
            return Snippet {
                spans: render_spans
                    .iter()
                    .map(|r| SnippetSpan::shown(r, r.text()))
                    .collect(),
                some_hidden: false,
            };
        }

        self.collapse(render_spans)
            .unwrap_or_else(|| self.leading_fallback(render_spans))
    }

    /// Collapsed view around highlighted spans; `None` when nothing is highlighted.
    fn collapse(&self, render_spans: &[RenderSpan]) -> Option<Snippet> {
        let budget = self.config.context_chars;
        let mut out = Vec::new();
        let mut some_hidden = false;
        let mut any_highlighted = false;

        for (i, render_span) in render_spans.iter().enumerate() {
            let text = render_span.text();
            if render_span.is_highlighted {
                any_highlighted = true;
                out.push(SnippetSpan::shown(render_span, text));
                continue;
            }
            if text.is_empty() {
                continue;
            }

            let prev_highlighted = i > 0 && render_spans[i - 1].is_highlighted;
            let next_highlighted = render_spans
                .get(i + 1)
                .is_some_and(|next| next.is_highlighted);

            match (prev_highlighted, next_highlighted) {
                (false, false) => {
                    push_ellipsis(&mut out);
                    some_hidden = true;
                }
                (true, true) => {
                    if render_span.merged.len() <= budget.saturating_mul(2) {
                        out.push(SnippetSpan::shown(render_span, text));
                    } else {
                        let head = grapheme_prefix(text, budget);
                        let tail = grapheme_suffix(text, budget);
                        if !head.is_empty() {
                            out.push(SnippetSpan::shown(render_span, head));
                        }
                        push_ellipsis(&mut out);
                        if !tail.is_empty() {
                            out.push(SnippetSpan::shown(render_span, tail));
                        }
                        some_hidden = true;
                    }
                }
                (true, false) => {
                    let head = grapheme_prefix(text, budget);
                    if !head.is_empty() {
                        out.push(SnippetSpan::shown(render_span, head));
                    }
                    if head.len() < text.len() {
                        push_ellipsis(&mut out);
                        some_hidden = true;
                    }
                }
                (false, true) => {
                    let tail = grapheme_suffix(text, budget);
                    if tail.len() < text.len() {
                        push_ellipsis(&mut out);
                        some_hidden = true;
                    }
                    if !tail.is_empty() {
                        out.push(SnippetSpan::shown(render_span, tail));
                    }
                }
            }
        }

        any_highlighted.then_some(Snippet {
            spans: out,
            some_hidden,
        })
    }

    /// The first span's leading text, used when nothing is highlighted.
    fn leading_fallback(&self, render_spans: &[RenderSpan]) -> Snippet {
        let Some(first) = render_spans.first() else {
            return Snippet::default();
        };

        let text = first.text();
        let head = grapheme_prefix(text, self.config.fallback_chars);
        let some_hidden = head.len() < text.len() || render_spans.len() > 1;
        debug!(
            render_spans = render_spans.len(),
            shown_bytes = head.len(),
            "no highlighted span, showing leading text"
        );

        let mut spans = vec![SnippetSpan::shown(first, head)];
        if some_hidden {
            spans.push(SnippetSpan::Ellipsis);
        }
        Snippet { spans, some_hidden }
    }
}

/// Build a snippet with the default budgets.
pub fn build_snippet(render_spans: &[RenderSpan], is_expanded: bool) -> Snippet {
    Snippeter::default().build(render_spans, is_expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MergedSpan;
    use crate::render::Rgba;
    use std::collections::BTreeMap;

    fn render_span(start: usize, text: &str, is_highlighted: bool) -> RenderSpan {
        let end = start + text.chars().count();
        RenderSpan {
            merged: MergedSpan {
                start,
                end,
                text: text.to_string(),
                covering: BTreeMap::new(),
            },
            background_color: Rgba::TRANSPARENT,
            text_color: None,
            is_bold_black: is_highlighted,
            is_bold_colored: false,
            is_highlighted,
            is_hovered: false,
            max_score: None,
            hover_named_values: Vec::new(),
            first_hover_owner: false,
            paths: Vec::new(),
        }
    }

    fn sequence(spans: &[(&str, bool)]) -> Vec<RenderSpan> {
        let mut start = 0;
        spans
            .iter()
            .map(|(text, highlighted)| {
                let r = render_span(start, text, *highlighted);
                start = r.end();
                r
            })
            .collect()
    }

    #[test]
    fn test_expanded_shows_everything() {
        let spans = sequence(&[("a".repeat(500).as_str(), false), ("hit", true)]);
        let snippet = build_snippet(&spans, true);
        assert_eq!(snippet.spans.len(), 2);
        assert!(!snippet.some_hidden);
        assert!(snippet.spans.iter().all(|s| !s.is_truncated()));
    }

    #[test]
    fn test_empty_text_yields_empty_snippet() {
        let spans = sequence(&[("", false)]);
        assert_eq!(build_snippet(&spans, false), Snippet::default());
        assert_eq!(build_snippet(&spans, true), Snippet::default());
    }

    #[test]
    fn test_far_runs_collapse_into_single_ellipsis() {
        let spans = sequence(&[
            ("hit", true),
            ("x", false),
            ("y", false),
            ("z", false),
            ("w", false),
            ("hit", true),
        ]);
        let snippet = Snippeter::new(SnippetConfig {
            context_chars: 50,
            fallback_chars: 300,
        })
        .build(&spans, false);

        assert_eq!(snippet.visible_text("…"), "hitx…whit");
        assert!(snippet.some_hidden);
    }

    #[test]
    fn test_context_is_truncated_toward_the_highlight() {
        let spans = sequence(&[("0123456789", false), ("hit", true), ("abcdefghij", false)]);
        let snippet = Snippeter::new(SnippetConfig {
            context_chars: 3,
            fallback_chars: 300,
        })
        .build(&spans, false);

        assert_eq!(snippet.visible_text("…"), "…789hitabc…");
        assert!(snippet.some_hidden);
    }

    #[test]
    fn test_gap_between_two_highlights_keeps_both_ends() {
        let spans = sequence(&[("hit", true), ("0123456789", false), ("hit", true)]);
        let snippet = Snippeter::new(SnippetConfig {
            context_chars: 2,
            fallback_chars: 300,
        })
        .build(&spans, false);

        assert_eq!(snippet.visible_text("…"), "hit01…89hit");
        let ellipses = snippet.spans.iter().filter(|s| s.is_ellipsis()).count();
        assert_eq!(ellipses, 1);
    }

    #[test]
    fn test_short_gap_between_two_highlights_is_kept() {
        let spans = sequence(&[("hit", true), ("0123", false), ("hit", true)]);
        let snippet = Snippeter::new(SnippetConfig {
            context_chars: 2,
            fallback_chars: 300,
        })
        .build(&spans, false);

        assert_eq!(snippet.visible_text("…"), "hit0123hit");
        assert!(!snippet.some_hidden);
    }

    #[test]
    fn test_fallback_shows_leading_text() {
        let long = "a".repeat(400);
        let spans = sequence(&[(long.as_str(), false)]);
        let snippet = build_snippet(&spans, false);

        assert_eq!(snippet.spans.len(), 2);
        assert_eq!(snippet.spans[0].snippet_text().map(str::len), Some(300));
        assert!(snippet.spans[1].is_ellipsis());
        assert!(snippet.some_hidden);
    }

    #[test]
    fn test_fallback_short_single_span_has_no_ellipsis() {
        let spans = sequence(&[("short text", false)]);
        let snippet = build_snippet(&spans, false);
        assert_eq!(snippet.spans.len(), 1);
        assert_eq!(snippet.visible_text("…"), "short text");
        assert!(!snippet.some_hidden);
    }
}
