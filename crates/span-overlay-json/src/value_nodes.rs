//! Reading upstream value-node documents into [`AnnotationField`]s.
//!
//! A document is an array of field descriptors (or an object holding it under `"fields"`):
//!
//! ```json
//! [
//!   {
//!     "key": "text.toxicity",
//!     "source_type": "concept_score",
//!     "concept_namespace": "local",
//!     "concept_name": "toxicity",
//!     "spans": [{ "__span__": { "start": 0, "end": 5 }, "score": 0.9 }]
//!   }
//! ]
//! ```
//!
//! Span nodes may carry their range under `__span__` or inline as `start`/`end`, and their value
//! under `score`, `value` or `__value__`. Span nodes without a usable range are skipped.

use crate::error::BridgeError;
use serde_json::Value;
use span_overlay::{AnnotationField, FieldSource, MetadataValue, RawSpan, SourceType, SpanSets};
use tracing::debug;

fn required_str<'a>(field: &'a Value, name: &'static str) -> Result<&'a str, BridgeError> {
    field
        .get(name)
        .and_then(Value::as_str)
        .ok_or(BridgeError::MissingField(name))
}

fn optional_string(field: &Value, name: &str) -> Option<String> {
    field.get(name).and_then(Value::as_str).map(str::to_string)
}

fn parse_offset(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

fn parse_range(node: &Value) -> Option<(i64, i64)> {
    let range = node.get("__span__").unwrap_or(node);
    let start = parse_offset(range.get("start")?)?;
    let end = parse_offset(range.get("end")?)?;
    Some((start, end))
}

fn parse_metadata_value(value: &Value) -> Option<MetadataValue> {
    match value {
        Value::Number(n) => n.as_f64().map(MetadataValue::Number),
        Value::String(s) => Some(MetadataValue::Text(s.clone())),
        Value::Bool(b) => Some(MetadataValue::Bool(*b)),
        _ => None,
    }
}

fn parse_span_value(node: &Value) -> Option<MetadataValue> {
    ["score", "value", "__value__"]
        .into_iter()
        .find_map(|name| node.get(name))
        .and_then(parse_metadata_value)
}

fn parse_field_source(field: &Value) -> Result<FieldSource, BridgeError> {
    let name = required_str(field, "source_type")?;
    let Some(source_type) = SourceType::parse(name) else {
        return Err(BridgeError::UnknownSourceType(name.to_string()));
    };

    Ok(match source_type {
        SourceType::Keyword => FieldSource::Keyword {
            query: required_str(field, "query")?.to_string(),
        },
        SourceType::ConceptScore => FieldSource::ConceptScore {
            namespace: required_str(field, "concept_namespace")?.to_string(),
            concept_name: required_str(field, "concept_name")?.to_string(),
        },
        SourceType::SemanticSimilarity => FieldSource::SemanticSimilarity {
            query: required_str(field, "query")?.to_string(),
        },
        SourceType::Label => FieldSource::Label {
            label: required_str(field, "label")?.to_string(),
        },
        SourceType::Metadata => FieldSource::Metadata {
            dtype: optional_string(field, "dtype"),
        },
        SourceType::LeafSpan => FieldSource::LeafSpan {
            field: optional_string(field, "field")
                .unwrap_or_else(|| required_str(field, "key").unwrap_or_default().to_string()),
        },
    })
}

/// Parse one field descriptor.
pub fn parse_annotation_field(field: &Value) -> Result<AnnotationField, BridgeError> {
    let key = required_str(field, "key")?;
    let source = parse_field_source(field)?;

    let nodes = field
        .get("spans")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut spans = Vec::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        let Some((start, end)) = parse_range(node) else {
            debug!(key, index, "skipping span node without a range");
            continue;
        };
        spans.push(RawSpan {
            start,
            end,
            value: parse_span_value(node),
        });
    }

    Ok(AnnotationField::new(key, source, spans))
}

/// Parse a document of field descriptors.
pub fn parse_annotation_fields(document: &Value) -> Result<Vec<AnnotationField>, BridgeError> {
    let fields = document
        .as_array()
        .or_else(|| document.get("fields").and_then(Value::as_array))
        .ok_or(BridgeError::NotAnArray)?;

    fields.iter().map(parse_annotation_field).collect()
}

/// Parse a document of field descriptors from JSON text.
pub fn parse_annotation_fields_str(json: &str) -> Result<Vec<AnnotationField>, BridgeError> {
    let document: Value = serde_json::from_str(json)?;
    parse_annotation_fields(&document)
}

/// Parse a document and normalize it against `text`.
pub fn span_sets_from_json(text: &str, document: &Value) -> Result<SpanSets, BridgeError> {
    let fields = parse_annotation_fields(document)?;
    Ok(span_overlay::normalize(text, &fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_range_accepts_both_shapes() {
        assert_eq!(
            parse_range(&json!({ "__span__": { "start": 1, "end": 4 } })),
            Some((1, 4))
        );
        assert_eq!(parse_range(&json!({ "start": 2.0, "end": 3 })), Some((2, 3)));
        assert_eq!(parse_range(&json!({ "start": 2 })), None);
    }

    #[test]
    fn test_parse_span_value_prefers_score() {
        assert_eq!(
            parse_span_value(&json!({ "score": 0.4, "value": "x" })),
            Some(MetadataValue::Number(0.4))
        );
        assert_eq!(
            parse_span_value(&json!({ "__value__": true })),
            Some(MetadataValue::Bool(true))
        );
        assert_eq!(parse_span_value(&json!({ "value": null })), None);
    }

    #[test]
    fn test_leaf_span_field_defaults_to_key() {
        let field = parse_annotation_field(&json!({
            "key": "text.sentences",
            "source_type": "leaf_span",
            "spans": []
        }))
        .unwrap();
        assert_eq!(
            field.source,
            FieldSource::LeafSpan {
                field: "text.sentences".to_string()
            }
        );
    }
}
