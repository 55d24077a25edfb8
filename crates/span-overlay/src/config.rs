//! Tunable constants for highlighting and snippeting.
//!
//! Every field has a default, so a host only needs to spell out what it overrides:
//!
//! ```rust
//! use span_overlay::OverlayConfig;
//!
//! let config = OverlayConfig::from_json_str(r#"{ "snippet": { "context_chars": 20 } }"#).unwrap();
//! assert_eq!(config.snippet.context_chars, 20);
//! assert_eq!(config.snippet.fallback_chars, 300);
//! ```

use crate::error::OverlayError;
use crate::render::{Rgb, Rgba};
use serde::{Deserialize, Serialize};

/// Default score above which a scored span is highlighted.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;
/// Default background opacity just above the threshold.
pub const DEFAULT_MIN_OPACITY: f64 = 0.3;
/// Default background opacity at score 1.0.
pub const DEFAULT_MAX_OPACITY: f64 = 0.8;
/// Default number of context code points kept next to a highlighted span.
pub const DEFAULT_CONTEXT_CHARS: usize = 50;
/// Default number of code points shown when nothing is highlighted.
pub const DEFAULT_FALLBACK_CHARS: usize = 300;

/// Highlight styling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Scores at or below this value are not highlighted.
    pub score_threshold: f64,
    /// Opacity of the score ramp just above the threshold.
    pub min_opacity: f64,
    /// Opacity of the score ramp at score 1.0.
    pub max_opacity: f64,
    /// Base colour of the score ramp.
    pub score_color: Rgb,
    /// Fixed background for highlights that carry no score (keywords, labels, leaf spans, ...).
    pub neutral_color: Rgba,
    /// Background while one of the span's paths is hovered.
    pub hover_color: Rgba,
    /// Text colour for label spans.
    pub label_color: Rgb,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            min_opacity: DEFAULT_MIN_OPACITY,
            max_opacity: DEFAULT_MAX_OPACITY,
            score_color: Rgb::new(0, 100, 250),
            neutral_color: Rgba::new(255, 230, 102, 0.6),
            hover_color: Rgba::new(255, 170, 0, 0.7),
            label_color: Rgb::new(22, 128, 61),
        }
    }
}

/// Snippet budget settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnippetConfig {
    /// Code points of non-highlighted context kept on each side of a highlighted span.
    pub context_chars: usize,
    /// Code points of the first span shown when nothing is highlighted.
    pub fallback_chars: usize,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            context_chars: DEFAULT_CONTEXT_CHARS,
            fallback_chars: DEFAULT_FALLBACK_CHARS,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Highlight styling.
    pub highlight: HighlightConfig,
    /// Snippet budgets.
    pub snippet: SnippetConfig,
}

impl OverlayConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, OverlayError> {
        let config: OverlayConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is in range.
    pub fn validate(&self) -> Result<(), OverlayError> {
        let h = &self.highlight;
        if !(0.0..1.0).contains(&h.score_threshold) {
            return Err(OverlayError::InvalidConfig(format!(
                "score_threshold must be in [0, 1), got {}",
                h.score_threshold
            )));
        }
        for (name, opacity) in [("min_opacity", h.min_opacity), ("max_opacity", h.max_opacity)] {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(OverlayError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {opacity}"
                )));
            }
        }
        if h.min_opacity > h.max_opacity {
            return Err(OverlayError::InvalidConfig(format!(
                "min_opacity ({}) exceeds max_opacity ({})",
                h.min_opacity, h.max_opacity
            )));
        }
        if self.snippet.fallback_chars == 0 {
            return Err(OverlayError::InvalidConfig(
                "fallback_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
