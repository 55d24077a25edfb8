use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while reading an annotation document.
///
/// Only structural problems are errors. Individual malformed span nodes are skipped.
pub enum BridgeError {
    #[error("JSON parse error: {0}")]
    /// The document is not valid JSON.
    Json(#[from] serde_json::Error),

    #[error("expected an array of annotation fields")]
    /// The document is neither an array nor an object with a `fields` array.
    NotAnArray,

    #[error("missing required field: {0}")]
    /// A field descriptor lacks a required property.
    MissingField(&'static str),

    #[error("unknown source type '{0}'")]
    /// A field descriptor names a source type this engine does not know.
    UnknownSourceType(String),
}
