#![warn(missing_docs)]
//! Span Overlay - Annotation Span Merging and Snippeting Engine
//!
//! # Overview
//!
//! `span-overlay` reconciles independently produced annotation spans over one text (keyword
//! hits, concept scores, semantic similarity, labels, metadata, leaf spans) into a single
//! non-overlapping partition, derives render attributes for each piece, and decides which parts
//! of a long document to show under a character budget. It does not render anything itself:
//! the output is plain data for a UI layer.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Snippeter            (collapse / expand)   │  ← Display budget
//! ├─────────────────────────────────────────────┤
//! │  RenderSpanBuilder    (colour, bold, hover) │  ← Styling
//! ├─────────────────────────────────────────────┤
//! │  SpanMerger           (boundary sweep)      │  ← Partition
//! ├─────────────────────────────────────────────┤
//! │  SpanSetNormalizer    (clamp, sort)         │  ← Input cleanup
//! ├─────────────────────────────────────────────┤
//! │  CodepointText        (char offsets)        │  ← Text access
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every stage is a pure function of its inputs and never fails: malformed spans are clamped
//! or dropped, and missing source types fall back to metadata.
//!
//! # Quick Start
//!
//! ```rust
//! use span_overlay::{
//!     AnnotationField, FieldSource, HoverSet, RawSpan, build_render_spans, build_snippet,
//!     merge_spans, normalize,
//! };
//!
//! let text = "The cat sat on the mat.";
//! let fields = vec![AnnotationField::new(
//!     "text.keyword",
//!     FieldSource::Keyword { query: "cat".to_string() },
//!     vec![RawSpan::new(4, 7)],
//! )];
//!
//! let span_sets = normalize(text, &fields);
//! let merged = merge_spans(text, &span_sets);
//! assert_eq!(merged.len(), 3);
//! assert_eq!(merged[1].text, "cat");
//!
//! let rendered = build_render_spans(&merged, &span_sets.source_types(), &HoverSet::new());
//! assert!(rendered[1].is_highlighted && rendered[1].is_bold_black);
//!
//! let snippet = build_snippet(&rendered, false);
//! assert_eq!(snippet.visible_text("…"), text);
//! ```
//!
//! # Module Description
//!
//! - [`text`] - Code-point indexed text access and grapheme-safe truncation
//! - [`span`] - Span data model and typed payloads
//! - [`normalize`] - Upstream annotation fields to sorted, clamped span sets
//! - [`merge`] - Boundary sweep producing the merged partition
//! - [`render`] - Highlight, colour and hover attributes
//! - [`snippet`] - Budgeted collapsed view with ellipses
//! - [`pipeline`] - The whole pipeline with a cached merge result
//! - [`config`] - Thresholds, colours and budgets
//!
//! # Unicode Support
//!
//! - All offsets are Unicode scalar values (`char`), not bytes or UTF-16 code units
//! - Snippet truncation never splits a grapheme cluster (emoji sequences, combining marks)

pub mod config;
mod error;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod render;
pub mod snippet;
pub mod span;
pub mod text;

pub use config::{HighlightConfig, OverlayConfig, SnippetConfig};
pub use error::OverlayError;
pub use merge::{MergedSpan, merge_spans};
pub use normalize::{AnnotationField, FieldSource, RawSpan, SourceTypes, SpanSets, normalize};
pub use pipeline::{SpanOverlay, highlight_text};
pub use render::{
    HoverSet, NamedValue, RenderSpan, RenderSpanBuilder, Rgb, Rgba, build_render_spans,
    score_opacity,
};
pub use snippet::{Snippet, SnippetSpan, Snippeter, build_snippet};
pub use span::{MetadataValue, SourceKey, SourceSpan, SourceType, Span, SpanPath, SpanPayload};
pub use text::CodepointText;
