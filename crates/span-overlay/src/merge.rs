//! Span merging.
//!
//! [`merge_spans`] sweeps the boundaries of every span set at once and cuts the text into an
//! ordered, gapless, non-overlapping partition of `[0, len)`. Each piece records which original
//! [`SourceSpan`]s cover it, grouped by source key.

use crate::normalize::SpanSets;
use crate::span::{SourceKey, SourceSpan, Span, SpanPath};
use crate::text::CodepointText;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

/// One element of the merged partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedSpan {
    /// Start offset (inclusive), in code points.
    pub start: usize,
    /// End offset (exclusive), in code points.
    pub end: usize,
    /// `text[start..end]`, sliced by code point.
    pub text: String,
    /// The original spans overlapping `[start, end)`, by source key.
    ///
    /// Entries are shared handles to the spans of the input [`SpanSets`], not adjusted copies.
    /// Not serialized; render output carries the covering paths instead.
    #[serde(skip_serializing)]
    pub covering: BTreeMap<SourceKey, Vec<Arc<SourceSpan>>>,
}

impl MergedSpan {
    /// The code-point range of this piece.
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Length in code points.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` for a zero-length piece (only produced for empty text).
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns `true` if at least one source span covers this piece.
    pub fn is_covered(&self) -> bool {
        !self.covering.is_empty()
    }

    /// All covering spans, in key order.
    pub fn covering_spans(&self) -> impl Iterator<Item = &Arc<SourceSpan>> {
        self.covering.values().flatten()
    }

    /// Paths of all covering spans, in key order.
    pub fn paths(&self) -> impl Iterator<Item = &SpanPath> {
        self.covering_spans().map(|s| &s.path)
    }
}

/// Clamp a span to `[0, len]`; the merger does not trust callers that built [`SpanSets`] by hand.
fn clamped(span: &SourceSpan, len: usize) -> (usize, usize) {
    let start = span.span.start.min(len);
    let end = span.span.end.min(len).max(start);
    (start, end)
}

/// Merge all span sets over `text` into an ordered partition of `[0, len)`.
///
/// - The output is contiguous: `merged[0].start == 0`, `merged[i].end == merged[i + 1].start`,
///   and the last end is the text length. Concatenating `text` fields yields the input.
/// - Zero-length spans never introduce a boundary and never cover anything.
/// - If a key violates the non-overlap contract, the partition is still cut at every span
///   boundary; `covering` may then list several overlapping spans of that key.
/// - With no span sets (or empty text) a single uncovered piece `[0, len)` is returned.
pub fn merge_spans(text: &str, span_sets: &SpanSets) -> Vec<MergedSpan> {
    let indexed = CodepointText::new(text);
    let len = indexed.len();

    let lists: Vec<(&SourceKey, &[Arc<SourceSpan>])> = span_sets.iter().collect();
    // Per key: index of the first span whose (clamped) end is still beyond the cursor.
    let mut next = vec![0usize; lists.len()];
    let mut merged = Vec::new();
    let mut cursor = 0usize;

    while cursor < len {
        let mut boundary = len;
        for (k, (_, spans)) in lists.iter().enumerate() {
            for span in &spans[next[k]..] {
                let (start, end) = clamped(span, len);
                if start == end {
                    continue;
                }
                if start > cursor {
                    boundary = boundary.min(start);
                    break;
                }
                if end > cursor {
                    boundary = boundary.min(end);
                }
            }
        }

        let mut covering = BTreeMap::new();
        for (k, (key, spans)) in lists.iter().enumerate() {
            let hits: Vec<Arc<SourceSpan>> = spans[next[k]..]
                .iter()
                .take_while(|span| clamped(span, len).0 < boundary)
                .filter(|span| {
                    let (start, end) = clamped(span, len);
                    start < end && end > cursor
                })
                .cloned()
                .collect();
            if !hits.is_empty() {
                covering.insert((*key).clone(), hits);
            }
        }

        merged.push(MergedSpan {
            start: cursor,
            end: boundary,
            text: indexed.slice(cursor, boundary).to_string(),
            covering,
        });
        cursor = boundary;

        for (k, (_, spans)) in lists.iter().enumerate() {
            while next[k] < spans.len() && clamped(&spans[next[k]], len).1 <= cursor {
                next[k] += 1;
            }
        }
    }

    if merged.is_empty() {
        merged.push(MergedSpan {
            start: 0,
            end: len,
            text: text.to_string(),
            covering: BTreeMap::new(),
        });
    }

    trace!(
        sources = lists.len(),
        spans = span_sets.span_count(),
        merged = merged.len(),
        "merged span sets"
    );
    merged
}
