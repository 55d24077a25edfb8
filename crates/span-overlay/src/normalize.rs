//! Span set normalization.
//!
//! Upstream producers hand over one [`AnnotationField`] per annotated field: a field-level
//! descriptor (keyword query, concept identity, label, ...) plus the raw ranges it extracted,
//! each with an optional per-span value (a score, a metadata value). [`normalize`] turns them
//! into a [`SpanSets`] map: one sorted list of [`SourceSpan`]s per [`SourceKey`], with ranges
//! clamped to the text and empty sources removed.

use crate::span::{MetadataValue, SourceKey, SourceSpan, SourceType, Span, SpanPath, SpanPayload};
use crate::text::CodepointText;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, trace};

/// Source type by source key.
///
/// Keys missing from the map are treated as [`SourceType::Metadata`].
pub type SourceTypes = HashMap<SourceKey, SourceType>;

/// Field-level descriptor shared by every span of one annotation field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSource {
    /// Keyword search hits for `query`.
    Keyword {
        /// The search query text.
        query: String,
    },
    /// Concept classifier scores.
    ConceptScore {
        /// Concept namespace.
        namespace: String,
        /// Concept name.
        concept_name: String,
    },
    /// Semantic similarity scores against `query`.
    SemanticSimilarity {
        /// The similarity query text.
        query: String,
    },
    /// Human label spans.
    Label {
        /// Label name.
        label: String,
    },
    /// Plain metadata spans.
    Metadata {
        /// Upstream dtype name, if known.
        dtype: Option<String>,
    },
    /// Leaf spans of a structured field.
    LeafSpan {
        /// Name of the field.
        field: String,
    },
}

impl FieldSource {
    /// The source type of spans produced by this field.
    pub fn source_type(&self) -> SourceType {
        match self {
            FieldSource::Keyword { .. } => SourceType::Keyword,
            FieldSource::ConceptScore { .. } => SourceType::ConceptScore,
            FieldSource::SemanticSimilarity { .. } => SourceType::SemanticSimilarity,
            FieldSource::Label { .. } => SourceType::Label,
            FieldSource::Metadata { .. } => SourceType::Metadata,
            FieldSource::LeafSpan { .. } => SourceType::LeafSpan,
        }
    }

    fn payload_for(&self, value: Option<&MetadataValue>) -> SpanPayload {
        let score = || match value {
            Some(MetadataValue::Number(n)) => *n,
            _ => 0.0,
        };

        match self {
            FieldSource::Keyword { query } => SpanPayload::Keyword {
                query: query.clone(),
            },
            FieldSource::ConceptScore {
                namespace,
                concept_name,
            } => SpanPayload::ConceptScore {
                namespace: namespace.clone(),
                concept_name: concept_name.clone(),
                score: score(),
            },
            FieldSource::SemanticSimilarity { query } => SpanPayload::SemanticSimilarity {
                query: query.clone(),
                score: score(),
            },
            FieldSource::Label { label } => SpanPayload::Label {
                label: label.clone(),
            },
            FieldSource::Metadata { dtype } => SpanPayload::Metadata {
                value: value
                    .cloned()
                    .unwrap_or_else(|| MetadataValue::Text(String::new())),
                dtype: dtype.clone(),
            },
            FieldSource::LeafSpan { field } => SpanPayload::LeafSpan {
                field: field.clone(),
            },
        }
    }
}

/// One range as extracted upstream, before clamping.
///
/// Offsets are signed so that out-of-range producer output can be represented and clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSpan {
    /// Start offset in code points.
    pub start: i64,
    /// End offset in code points (exclusive).
    pub end: i64,
    /// Per-span value: a score for scored sources, the raw value for metadata.
    pub value: Option<MetadataValue>,
}

impl RawSpan {
    /// A range without a per-span value.
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            value: None,
        }
    }

    /// A range with a numeric score.
    pub fn scored(start: i64, end: i64, score: f64) -> Self {
        Self {
            start,
            end,
            value: Some(MetadataValue::Number(score)),
        }
    }

    /// A range with an arbitrary value.
    pub fn with_value(start: i64, end: i64, value: MetadataValue) -> Self {
        Self {
            start,
            end,
            value: Some(value),
        }
    }
}

/// All extracted spans of one annotation field.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationField {
    /// Unique key of the field (e.g. a serialized schema path).
    pub key: SourceKey,
    /// Field-level descriptor.
    pub source: FieldSource,
    /// Extracted ranges, in upstream order.
    pub spans: Vec<RawSpan>,
}

impl AnnotationField {
    /// Create an annotation field.
    pub fn new(key: impl Into<SourceKey>, source: FieldSource, spans: Vec<RawSpan>) -> Self {
        Self {
            key: key.into(),
            source,
            spans,
        }
    }
}

/// Sorted span lists by source key.
///
/// Within one key, spans are sorted by `start` (ties by `end`). Keys never map to an empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpanSets {
    sets: BTreeMap<SourceKey, Vec<Arc<SourceSpan>>>,
}

impl SpanSets {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one span, keeping its key's list sorted.
    pub fn insert(&mut self, span: SourceSpan) {
        let spans = self.sets.entry(span.key().clone()).or_default();
        let sort_key = (span.span.start, span.span.end);
        let pos = spans.partition_point(|s| (s.span.start, s.span.end) <= sort_key);
        spans.insert(pos, Arc::new(span));
    }

    /// Insert many spans.
    pub fn extend(&mut self, spans: impl IntoIterator<Item = SourceSpan>) {
        for span in spans {
            self.insert(span);
        }
    }

    /// Spans of one key (empty if the key is absent).
    pub fn get(&self, key: &SourceKey) -> &[Arc<SourceSpan>] {
        self.sets.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Iterate keys with their sorted spans, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&SourceKey, &[Arc<SourceSpan>])> {
        self.sets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of source keys.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns `true` if no source contributes spans.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total number of spans across all keys.
    pub fn span_count(&self) -> usize {
        self.sets.values().map(Vec::len).sum()
    }

    /// Source type of each key, derived from its spans' payloads.
    pub fn source_types(&self) -> SourceTypes {
        self.sets
            .iter()
            .filter_map(|(key, spans)| Some((key.clone(), spans.first()?.source_type())))
            .collect()
    }
}

/// Clamp one raw range to `[0, len]`.
///
/// Returns `None` for a range that lies entirely outside the text. Inverted ranges collapse to
/// a zero-length span at their (clamped) start.
fn clamp_raw_span(text: &CodepointText<'_>, raw: &RawSpan) -> Option<Span> {
    let len = text.len() as i64;
    let (start, end) = if raw.start > raw.end {
        (raw.start, raw.start)
    } else {
        (raw.start, raw.end)
    };

    let outside = (end < 0) || (start > len) || (start < end && (end <= 0 || start >= len));
    if outside {
        return None;
    }

    Some(Span::new(text.clamp_offset(start), text.clamp_offset(end)))
}

/// Normalize upstream annotation fields into sorted, clamped span sets.
///
/// Inputs are not mutated. Fields (or fields whose spans all fall outside the text) that end up
/// with no spans do not appear in the output. Spans sharing a key across several fields are
/// merged into one list.
pub fn normalize(text: &str, fields: &[AnnotationField]) -> SpanSets {
    let indexed = CodepointText::new(text);
    let mut sets: BTreeMap<SourceKey, Vec<Arc<SourceSpan>>> = BTreeMap::new();

    for field in fields {
        let mut spans = Vec::with_capacity(field.spans.len());
        for (index, raw) in field.spans.iter().enumerate() {
            let Some(span) = clamp_raw_span(&indexed, raw) else {
                debug!(
                    key = %field.key,
                    start = raw.start,
                    end = raw.end,
                    len = indexed.len(),
                    "dropping span outside text"
                );
                continue;
            };
            if span.start as i64 != raw.start || span.end as i64 != raw.end {
                debug!(
                    key = %field.key,
                    start = raw.start,
                    end = raw.end,
                    clamped_start = span.start,
                    clamped_end = span.end,
                    "clamped span to text bounds"
                );
            }

            let payload = field.source.payload_for(raw.value.as_ref());
            spans.push(Arc::new(SourceSpan::new(
                SpanPath::new(field.key.clone(), index),
                span,
                payload,
            )));
        }

        if spans.is_empty() {
            continue;
        }
        sets.entry(field.key.clone()).or_default().extend(spans);
    }

    for (key, spans) in sets.iter_mut() {
        let sorted = spans
            .windows(2)
            .all(|w| (w[0].span.start, w[0].span.end) <= (w[1].span.start, w[1].span.end));
        if !sorted {
            trace!(key = %key, count = spans.len(), "sorting out-of-order spans");
            spans.sort_by_key(|s| (s.span.start, s.span.end));
        }
    }

    SpanSets { sets }
}
