#![warn(missing_docs)]
//! JSON bridge for `span-overlay`.
//!
//! Reads upstream value-node documents (annotation fields with `__span__` nodes) into
//! [`span_overlay::SpanSets`], and writes render spans and snippets back out as flat JSON.
//!
//! ```rust
//! use serde_json::json;
//! use span_overlay::{HoverSet, highlight_text};
//! use span_overlay_json::{parse_annotation_fields, snippet_to_json};
//!
//! let document = json!([{
//!     "key": "text.search",
//!     "source_type": "keyword",
//!     "query": "cat",
//!     "spans": [{ "__span__": { "start": 4, "end": 7 } }]
//! }]);
//!
//! let fields = parse_annotation_fields(&document).unwrap();
//! let snippet = highlight_text("The cat sat on the mat.", &fields, &HoverSet::new(), false);
//! let out = snippet_to_json(&snippet).unwrap();
//! assert_eq!(out["spans"][1]["snippet_text"], "cat");
//! ```

mod error;
pub mod output;
pub mod value_nodes;

pub use error::BridgeError;
pub use output::{render_span_to_json, render_spans_to_json, snippet_to_json};
pub use value_nodes::{
    parse_annotation_field, parse_annotation_fields, parse_annotation_fields_str,
    span_sets_from_json,
};
