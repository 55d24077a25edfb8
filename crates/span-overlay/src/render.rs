//! Render span construction.
//!
//! Turns each [`MergedSpan`] into a [`RenderSpan`]: highlight flags, a background colour derived
//! from the strongest score, bold styling for presence-based sources, and the hover rows that the
//! piece introduces.

use crate::config::HighlightConfig;
use crate::merge::MergedSpan;
use crate::normalize::SourceTypes;
use crate::span::{MetadataValue, SourceType, SpanPath};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;

/// An opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a colour from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// This colour at the given opacity.
    pub fn with_alpha(self, a: f64) -> Rgba {
        Rgba::new(self.r, self.g, self.b, a)
    }

    /// CSS `rgb(...)` notation.
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// An RGB colour with opacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub a: f64,
}

impl Rgba {
    /// Fully transparent.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    /// Create a colour from its channels and opacity.
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Returns `true` if the colour paints nothing.
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// CSS `rgba(...)` notation.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Externally owned set of hovered paths.
///
/// An entry is either a full span path (`"<key>[<index>]"`, see [`SpanPath`]'s `Display`) or a
/// bare source key, which matches every span of that key. The engine only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoverSet {
    entries: HashSet<String>,
}

impl HoverSet {
    /// Create an empty hover set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (span path or source key).
    pub fn insert(&mut self, entry: impl Into<String>) -> bool {
        self.entries.insert(entry.into())
    }

    /// Add a span path.
    pub fn insert_path(&mut self, path: &SpanPath) -> bool {
        self.entries.insert(path.to_string())
    }

    /// Remove an entry.
    pub fn remove(&mut self, entry: &str) -> bool {
        self.entries.remove(entry)
    }

    /// Returns `true` if nothing is hovered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `path` or its source key is hovered.
    pub fn matches(&self, path: &SpanPath) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        self.entries.contains(path.key.as_str()) || self.entries.contains(&path.to_string())
    }
}

impl<S: Into<String>> FromIterator<S> for HoverSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn serialize_css_rgba<S: Serializer>(color: &Rgba, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&color.to_css())
}

fn serialize_css_rgb<S: Serializer>(color: &Option<Rgb>, serializer: S) -> Result<S::Ok, S::Error> {
    match color {
        Some(color) => serializer.serialize_str(&color.to_css()),
        None => serializer.serialize_none(),
    }
}

/// One hover row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    /// Row label.
    pub name: String,
    /// Row value.
    pub value: MetadataValue,
    /// Path of the span the row describes.
    pub path: SpanPath,
}

/// A merged span with its render attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSpan {
    /// The underlying partition element.
    #[serde(flatten)]
    pub merged: MergedSpan,
    /// Background colour (transparent when nothing applies).
    #[serde(serialize_with = "serialize_css_rgba")]
    pub background_color: Rgba,
    /// Text colour override for label spans.
    #[serde(serialize_with = "serialize_css_rgb")]
    pub text_color: Option<Rgb>,
    /// Bold, default colour (keywords, leaf spans, non-numeric metadata).
    pub is_bold_black: bool,
    /// Bold, label colour.
    pub is_bold_colored: bool,
    /// Must stay visible under snippeting.
    pub is_highlighted: bool,
    /// One of the covering paths is in the hover set.
    pub is_hovered: bool,
    /// Highest score among scored covering spans.
    pub max_score: Option<f64>,
    /// Hover rows for the paths this span is the first to introduce.
    pub hover_named_values: Vec<NamedValue>,
    /// `true` if this span introduces at least one path not seen in an earlier span.
    pub first_hover_owner: bool,
    /// Paths of every covering span.
    pub paths: Vec<SpanPath>,
}

impl RenderSpan {
    /// Text of this piece.
    pub fn text(&self) -> &str {
        &self.merged.text
    }

    /// Start offset in code points.
    pub fn start(&self) -> usize {
        self.merged.start
    }

    /// End offset in code points.
    pub fn end(&self) -> usize {
        self.merged.end
    }
}

/// Background opacity for a score: zero at or below the threshold, then a linear ramp from
/// `min_opacity` to `max_opacity` at score 1.0 (scores above 1.0 saturate).
pub fn score_opacity(score: f64, config: &HighlightConfig) -> f64 {
    if !score.is_finite() || score <= config.score_threshold {
        return 0.0;
    }
    let range = (1.0 - config.score_threshold).max(f64::EPSILON);
    let t = ((score - config.score_threshold) / range).min(1.0);
    config.min_opacity + t * (config.max_opacity - config.min_opacity)
}

/// Builds [`RenderSpan`]s with a fixed [`HighlightConfig`].
#[derive(Debug, Clone, Default)]
pub struct RenderSpanBuilder {
    config: HighlightConfig,
}

impl RenderSpanBuilder {
    /// Create a builder with the given styling settings.
    pub fn new(config: HighlightConfig) -> Self {
        Self { config }
    }

    /// The styling settings in use.
    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Render every merged span, preserving order.
    ///
    /// `source_types` gives the semantic type of each key; missing keys count as
    /// [`SourceType::Metadata`].
    pub fn build(
        &self,
        merged: &[MergedSpan],
        source_types: &SourceTypes,
        hovered: &HoverSet,
    ) -> Vec<RenderSpan> {
        let mut seen_paths: HashSet<SpanPath> = HashSet::new();
        merged
            .iter()
            .map(|m| self.render_one(m, source_types, hovered, &mut seen_paths))
            .collect()
    }

    fn render_one(
        &self,
        merged: &MergedSpan,
        source_types: &SourceTypes,
        hovered: &HoverSet,
        seen_paths: &mut HashSet<SpanPath>,
    ) -> RenderSpan {
        let mut max_score: Option<f64> = None;
        let mut is_bold_black = false;
        let mut is_bold_colored = false;
        let mut has_presence_highlight = false;
        let mut is_hovered = false;
        let mut hover_named_values = Vec::new();
        let mut paths = Vec::new();

        for span in merged.covering_spans() {
            let source_type = source_types
                .get(span.key())
                .copied()
                .unwrap_or(SourceType::Metadata);

            match source_type {
                SourceType::ConceptScore | SourceType::SemanticSimilarity => {
                    if let Some(score) = span.payload.score() {
                        max_score = Some(max_score.map_or(score, |m: f64| m.max(score)));
                    }
                }
                SourceType::Keyword | SourceType::LeafSpan => {
                    has_presence_highlight = true;
                    is_bold_black = true;
                }
                SourceType::Label => {
                    has_presence_highlight = true;
                    is_bold_colored = true;
                }
                SourceType::Metadata => {
                    if !span.payload.is_numeric() {
                        has_presence_highlight = true;
                        is_bold_black = true;
                    }
                }
            }

            is_hovered |= hovered.matches(&span.path);
            if seen_paths.insert(span.path.clone()) {
                hover_named_values.push(NamedValue {
                    name: span.payload.hover_name(span.key()),
                    value: span.payload.hover_value(),
                    path: span.path.clone(),
                });
            }
            paths.push(span.path.clone());
        }

        // The gate is the threshold alone; the ramp may be configured down to zero opacity.
        let score_hit = max_score.is_some_and(|s| s > self.config.score_threshold);
        let is_highlighted = has_presence_highlight || score_hit;

        let background_color = if is_hovered {
            self.config.hover_color
        } else if score_hit {
            let opacity = max_score.map_or(0.0, |s| score_opacity(s, &self.config));
            self.config.score_color.with_alpha(opacity)
        } else if has_presence_highlight {
            self.config.neutral_color
        } else {
            Rgba::TRANSPARENT
        };

        RenderSpan {
            merged: merged.clone(),
            background_color,
            text_color: is_bold_colored.then_some(self.config.label_color),
            is_bold_black,
            is_bold_colored,
            is_highlighted,
            is_hovered,
            max_score,
            first_hover_owner: !hover_named_values.is_empty(),
            hover_named_values,
            paths,
        }
    }
}

/// Render merged spans with the default styling settings.
pub fn build_render_spans(
    merged: &[MergedSpan],
    source_types: &SourceTypes,
    hovered: &HoverSet,
) -> Vec<RenderSpan> {
    RenderSpanBuilder::default().build(merged, source_types, hovered)
}
