//! JSON payloads for render spans and snippets, ready for a display layer.
//!
//! The shape is the `Serialize` form of the core types: a render span is flat (`start`, `end`,
//! `text` next to its attributes), colours are CSS strings and span paths are `key[index]`.
//! Snippet elements are tagged with `"kind": "shown" | "ellipsis"`.

use crate::error::BridgeError;
use serde_json::Value;
use span_overlay::{RenderSpan, Snippet};

/// Convert one render span to a JSON object.
pub fn render_span_to_json(span: &RenderSpan) -> Result<Value, BridgeError> {
    Ok(serde_json::to_value(span)?)
}

/// Convert render spans to a JSON array.
pub fn render_spans_to_json(spans: &[RenderSpan]) -> Result<Value, BridgeError> {
    Ok(serde_json::to_value(spans)?)
}

/// Convert a snippet to `{"spans": [..], "some_hidden": ..}`.
pub fn snippet_to_json(snippet: &Snippet) -> Result<Value, BridgeError> {
    Ok(serde_json::to_value(snippet)?)
}
