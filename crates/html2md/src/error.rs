//! Structural anomalies found while parsing or converting.
//!
//! None of these abort a conversion. They are recorded, logged at debug
//! level, and make [`Converter::ok`](crate::Converter::ok) return `false`.

/// A recoverable structural problem in the input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Anomaly {
    #[error("<{tag}> was never closed")]
    UnclosedTag { tag: String },

    #[error("closing tag </{tag}> has no matching opening tag")]
    UnexpectedClosingTag { tag: String },

    #[error("<{tag}> was closed implicitly by a mis-nested closing tag")]
    MisnestedTag { tag: String },

    #[error("malformed markup at byte {offset}")]
    MalformedTag { offset: usize },

    #[error("<{tag}> is missing required attribute `{attribute}`")]
    MissingAttribute { tag: String, attribute: String },

    #[error("element nesting exceeds the depth limit of {limit}")]
    DepthLimitExceeded { limit: usize },
}
