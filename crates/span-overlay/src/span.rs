//! Span data model.
//!
//! A [`SourceSpan`] is one annotation produced by one source (a keyword search, a concept model,
//! a label, a metadata field, ...) over a half-open code-point range of a single text.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A half-open code-point range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive), in code points.
    pub start: usize,
    /// End offset (exclusive), in code points.
    pub end: usize,
}

impl Span {
    /// Create a span with `[start, end)` offsets.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in code points.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the span covers no code points.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if the span contains a specific position.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Check if two spans share at least one code point.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Identifies the annotation field that produced a span (e.g. a serialized schema path).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceKey(String);

impl SourceKey {
    /// Create a source key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for SourceKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The path of one source span: its source key plus its position in the upstream list.
///
/// Hover de-duplication and hover matching are keyed by this path. Serializes as `key[index]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpanPath {
    /// Source key of the annotation field.
    pub key: SourceKey,
    /// Index of the span within the field's upstream span list.
    pub index: usize,
}

impl SpanPath {
    /// Create a span path.
    pub fn new(key: impl Into<SourceKey>, index: usize) -> Self {
        Self {
            key: key.into(),
            index,
        }
    }
}

impl fmt::Display for SpanPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.key, self.index)
    }
}

impl Serialize for SpanPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Semantic kind of an annotation source. Decides styling and whether a score gates highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Keyword search hit.
    Keyword,
    /// Concept classifier score.
    ConceptScore,
    /// Semantic similarity score against a query.
    SemanticSimilarity,
    /// Human label.
    Label,
    /// Plain metadata value.
    Metadata,
    /// Leaf span of a structured field.
    LeafSpan,
}

impl SourceType {
    /// All source types.
    pub const ALL: [SourceType; 6] = [
        SourceType::Keyword,
        SourceType::ConceptScore,
        SourceType::SemanticSimilarity,
        SourceType::Label,
        SourceType::Metadata,
        SourceType::LeafSpan,
    ];

    /// Returns `true` for types whose highlight is gated by a numeric score.
    pub fn is_scored(self) -> bool {
        matches!(self, SourceType::ConceptScore | SourceType::SemanticSimilarity)
    }

    /// The snake_case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Keyword => "keyword",
            SourceType::ConceptScore => "concept_score",
            SourceType::SemanticSimilarity => "semantic_similarity",
            SourceType::Label => "label",
            SourceType::Metadata => "metadata",
            SourceType::LeafSpan => "leaf_span",
        }
    }

    /// Parse a snake_case wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw metadata value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Numeric value.
    Number(f64),
    /// String value.
    Text(String),
    /// Boolean value.
    Bool(bool),
}

impl MetadataValue {
    /// Returns `true` for numeric values.
    pub fn is_numeric(&self) -> bool {
        matches!(self, MetadataValue::Number(_))
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Number(n) => write!(f, "{n}"),
            MetadataValue::Text(s) => f.write_str(s),
            MetadataValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Per-source payload. The variant determines the span's [`SourceType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source_type", rename_all = "snake_case")]
pub enum SpanPayload {
    /// Keyword search hit for `query`.
    Keyword {
        /// The search query text.
        query: String,
    },
    /// Concept classifier output.
    ConceptScore {
        /// Concept namespace.
        namespace: String,
        /// Concept name.
        concept_name: String,
        /// Classifier score, nominally in `[0, 1]`.
        score: f64,
    },
    /// Semantic similarity against `query`.
    SemanticSimilarity {
        /// The similarity query text.
        query: String,
        /// Similarity score, nominally in `[0, 1]`.
        score: f64,
    },
    /// Human label.
    Label {
        /// Label name.
        label: String,
    },
    /// Plain metadata value.
    Metadata {
        /// The raw value.
        value: MetadataValue,
        /// Upstream dtype name, if known.
        dtype: Option<String>,
    },
    /// Leaf span of a structured field.
    LeafSpan {
        /// Name of the field the leaf belongs to.
        field: String,
    },
}

impl SpanPayload {
    /// The source type implied by this payload.
    pub fn source_type(&self) -> SourceType {
        match self {
            SpanPayload::Keyword { .. } => SourceType::Keyword,
            SpanPayload::ConceptScore { .. } => SourceType::ConceptScore,
            SpanPayload::SemanticSimilarity { .. } => SourceType::SemanticSimilarity,
            SpanPayload::Label { .. } => SourceType::Label,
            SpanPayload::Metadata { .. } => SourceType::Metadata,
            SpanPayload::LeafSpan { .. } => SourceType::LeafSpan,
        }
    }

    /// The numeric score carried by the payload.
    ///
    /// Scored variants return their score; numeric metadata returns its value. Non-finite
    /// numbers are reported as `None`.
    pub fn score(&self) -> Option<f64> {
        let score = match self {
            SpanPayload::ConceptScore { score, .. } => *score,
            SpanPayload::SemanticSimilarity { score, .. } => *score,
            SpanPayload::Metadata {
                value: MetadataValue::Number(n),
                ..
            } => *n,
            _ => return None,
        };
        score.is_finite().then_some(score)
    }

    /// Returns `true` if the payload's value is a number (scores, numeric metadata).
    pub fn is_numeric(&self) -> bool {
        match self {
            SpanPayload::ConceptScore { .. } | SpanPayload::SemanticSimilarity { .. } => true,
            SpanPayload::Metadata { value, .. } => value.is_numeric(),
            _ => false,
        }
    }

    /// Name shown on hover for a span from `key`.
    pub fn hover_name(&self, key: &SourceKey) -> String {
        match self {
            SpanPayload::ConceptScore {
                namespace,
                concept_name,
                ..
            } => format!("{namespace}/{concept_name}"),
            SpanPayload::SemanticSimilarity { query, .. } => format!("similarity: {query}"),
            _ => key.to_string(),
        }
    }

    /// Value shown on hover.
    pub fn hover_value(&self) -> MetadataValue {
        match self {
            SpanPayload::Keyword { query } => MetadataValue::Text(query.clone()),
            SpanPayload::ConceptScore { score, .. } => MetadataValue::Number(*score),
            SpanPayload::SemanticSimilarity { score, .. } => MetadataValue::Number(*score),
            SpanPayload::Label { label } => MetadataValue::Text(label.clone()),
            SpanPayload::Metadata { value, .. } => value.clone(),
            SpanPayload::LeafSpan { field } => MetadataValue::Text(field.clone()),
        }
    }
}

/// One annotation span from one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSpan {
    /// Path of this span (source key + upstream index).
    pub path: SpanPath,
    /// Code-point range, already clamped to the text.
    pub span: Span,
    /// Source payload.
    pub payload: SpanPayload,
}

impl SourceSpan {
    /// Create a source span.
    pub fn new(path: SpanPath, span: Span, payload: SpanPayload) -> Self {
        Self {
            path,
            span,
            payload,
        }
    }

    /// Source key of the annotation field.
    pub fn key(&self) -> &SourceKey {
        &self.path.key
    }

    /// The source type implied by the payload.
    pub fn source_type(&self) -> SourceType {
        self.payload.source_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains_and_overlaps() {
        let span = Span::new(10, 20);
        assert!(span.contains(10));
        assert!(span.contains(19));
        assert!(!span.contains(20));

        assert!(span.overlaps(&Span::new(15, 25)));
        assert!(!span.overlaps(&Span::new(20, 30)));
        assert!(!Span::new(5, 5).overlaps(&Span::new(0, 10)));
    }

    #[test]
    fn test_source_type_round_trips_wire_names() {
        for source_type in SourceType::ALL {
            assert_eq!(SourceType::parse(source_type.as_str()), Some(source_type));
        }
        assert_eq!(SourceType::parse("sentiment"), None);
    }

    #[test]
    fn test_payload_score() {
        let concept = SpanPayload::ConceptScore {
            namespace: "local".to_string(),
            concept_name: "toxic".to_string(),
            score: 0.9,
        };
        assert_eq!(concept.score(), Some(0.9));
        assert_eq!(concept.source_type(), SourceType::ConceptScore);

        let nan = SpanPayload::SemanticSimilarity {
            query: "cats".to_string(),
            score: f64::NAN,
        };
        assert_eq!(nan.score(), None);

        let keyword = SpanPayload::Keyword {
            query: "cat".to_string(),
        };
        assert_eq!(keyword.score(), None);
    }

    #[test]
    fn test_span_path_display() {
        assert_eq!(SpanPath::new("text.pii", 3).to_string(), "text.pii[3]");
    }
}
