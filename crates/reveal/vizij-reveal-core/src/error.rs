//! Error types for the reveal engine.
//!
//! Every error is local to the offending target or variant: a failed `attach` or
//! `define_variant` leaves the rest of the engine untouched.

use serde::{Deserialize, Serialize};

/// Errors surfaced by the reveal engine API.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RevealError {
    /// Target has no measurable geometry (zero-size, detached or non-finite bounds).
    #[error("Invalid target '{handle}': {reason}")]
    InvalidTarget { handle: String, reason: String },

    /// A variant with this name already exists with a different definition.
    #[error("Variant '{name}' is already defined differently")]
    DuplicateVariant { name: String },

    /// A variant definition lacks its `hidden` or `visible` snapshot.
    #[error("Variant '{name}' is missing required key '{key}'")]
    MissingVariantKey { name: String, key: String },

    /// A property appears in one snapshot of a variant but not in the other.
    #[error("Variant '{name}': property '{property}' must appear in both hidden and visible")]
    PropertyMismatch { name: String, property: String },

    /// Named variant was never defined.
    #[error("Variant not found: {name}")]
    UnknownVariant { name: String },

    /// Named easing is neither built in nor registered.
    #[error("Easing not found: {name}")]
    UnknownEasing { name: String },

    /// No live target is attached under this handle.
    #[error("Target not found: {handle}")]
    UnknownTarget { handle: String },

    /// A live target already uses this handle.
    #[error("Target '{handle}' is already attached")]
    DuplicateTarget { handle: String },

    /// Out-of-range configuration value.
    #[error("Invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    /// Malformed JSON definition.
    #[error("Parse error: {reason}")]
    Parse { reason: String },
}

impl From<serde_json::Error> for RevealError {
    fn from(err: serde_json::Error) -> Self {
        RevealError::Parse {
            reason: err.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RevealError>;
