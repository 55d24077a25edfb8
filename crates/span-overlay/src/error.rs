use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading overlay configuration.
///
/// The merge/render/snippet pipeline itself never fails; only foreign input parsed at the edges
/// can.
pub enum OverlayError {
    #[error("JSON parse error: {0}")]
    /// The configuration document is not valid JSON or has the wrong shape.
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    /// A setting is out of its valid range.
    InvalidConfig(String),
}
