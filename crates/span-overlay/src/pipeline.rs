//! The explicit pipeline: `text + span sets -> merged spans -> render spans -> snippet`.
//!
//! Every stage is a pure function, so callers may simply re-run the free functions on each
//! change. [`SpanOverlay`] additionally keeps the merge result, which only depends on the text
//! and the span sets, so that hover changes and expand/collapse toggles only re-run the cheap
//! render and snippet stages.

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::merge::{MergedSpan, merge_spans};
use crate::normalize::{AnnotationField, SourceTypes, SpanSets, normalize};
use crate::render::{HoverSet, RenderSpan, RenderSpanBuilder};
use crate::snippet::{Snippet, Snippeter};
use crate::span::{SourceKey, SourceType};

/// Text, span sets and settings for one field, with the merge result cached.
#[derive(Debug, Clone)]
pub struct SpanOverlay {
    text: String,
    span_sets: SpanSets,
    /// Types derived from the span payloads, overridden by `type_overrides`.
    source_types: SourceTypes,
    type_overrides: SourceTypes,
    config: OverlayConfig,
    merged: Vec<MergedSpan>,
    version: u64,
}

impl SpanOverlay {
    /// Create an overlay from already-normalized span sets.
    pub fn new(text: impl Into<String>, span_sets: SpanSets) -> Self {
        let mut overlay = Self {
            text: text.into(),
            span_sets,
            source_types: SourceTypes::new(),
            type_overrides: SourceTypes::new(),
            config: OverlayConfig::default(),
            merged: Vec::new(),
            version: 0,
        };
        overlay.refresh();
        overlay
    }

    /// Create an overlay by normalizing upstream annotation fields.
    pub fn from_fields(text: impl Into<String>, fields: &[AnnotationField]) -> Self {
        let text = text.into();
        let span_sets = normalize(&text, fields);
        Self::new(text, span_sets)
    }

    /// Use the given configuration (does not touch the merge cache).
    ///
    /// The configuration is validated first; an out-of-range setting is rejected.
    pub fn with_config(mut self, config: OverlayConfig) -> Result<Self, OverlayError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// The text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The span sets.
    pub fn span_sets(&self) -> &SpanSets {
        &self.span_sets
    }

    /// The configuration.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Effective source type of each key.
    pub fn source_types(&self) -> &SourceTypes {
        &self.source_types
    }

    /// Incremented on every change to the text or the span sets.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the text. Existing spans are kept and clamped to the new text by the merger.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.refresh();
    }

    /// Replace the span sets.
    pub fn set_span_sets(&mut self, span_sets: SpanSets) {
        self.span_sets = span_sets;
        self.refresh();
    }

    /// Replace the span sets by normalizing upstream annotation fields against the current text.
    pub fn set_fields(&mut self, fields: &[AnnotationField]) {
        self.span_sets = normalize(&self.text, fields);
        self.refresh();
    }

    /// Force the source type of a key, regardless of its payloads.
    pub fn set_source_type(&mut self, key: impl Into<SourceKey>, source_type: SourceType) {
        self.type_overrides.insert(key.into(), source_type);
        self.source_types = self.effective_source_types();
    }

    /// The cached merge result.
    pub fn merged(&self) -> &[MergedSpan] {
        &self.merged
    }

    /// Render the cached merge result against a hover snapshot.
    pub fn render(&self, hovered: &HoverSet) -> Vec<RenderSpan> {
        RenderSpanBuilder::new(self.config.highlight.clone()).build(
            &self.merged,
            &self.source_types,
            hovered,
        )
    }

    /// Render and snippet in one step.
    pub fn snippet(&self, hovered: &HoverSet, is_expanded: bool) -> Snippet {
        let render_spans = self.render(hovered);
        Snippeter::new(self.config.snippet).build(&render_spans, is_expanded)
    }

    fn effective_source_types(&self) -> SourceTypes {
        let mut types = self.span_sets.source_types();
        types.extend(
            self.type_overrides
                .iter()
                .map(|(key, source_type)| (key.clone(), *source_type)),
        );
        types
    }

    fn refresh(&mut self) {
        self.merged = merge_spans(&self.text, &self.span_sets);
        self.source_types = self.effective_source_types();
        self.version = self.version.wrapping_add(1);
    }
}

/// Run the whole pipeline once with default settings.
pub fn highlight_text(
    text: &str,
    fields: &[AnnotationField],
    hovered: &HoverSet,
    is_expanded: bool,
) -> Snippet {
    SpanOverlay::from_fields(text, fields).snippet(hovered, is_expanded)
}
