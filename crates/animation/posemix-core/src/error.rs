//! Error types for the compositing core

use crate::ids::{AnimationId, RunId};
use crate::request::AnimationAction;

/// Errors surfaced by registration, run requests and data loading.
///
/// None of these abort the host: callers log them and drop the affected run.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AnimationError {
    /// An animation with this id is already registered
    #[error("Animation already registered: {id}")]
    DuplicateAnimation { id: AnimationId },

    /// Animation could not be resolved for the requested target
    #[error("Animation not found: {id}")]
    AnimationNotFound { id: AnimationId },

    /// A run was issued without any request
    #[error("Run {run_id} has no requests")]
    EmptyRequest { run_id: RunId },

    /// Action parameters that cannot be executed
    #[error("Invalid parameters for {action:?}: {reason}")]
    InvalidParameters {
        action: AnimationAction,
        reason: String,
    },

    /// Rewind issued without a preceding Play over the same frame range
    #[error("Rewind requires a preceding Play leg over the same frames")]
    RewindWithoutPlay,

    /// Raw animation data failed validation
    #[error("Invalid animation data '{name}': {reason}")]
    InvalidData { name: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl AnimationError {
    /// Error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::DuplicateAnimation { .. } | Self::AnimationNotFound { .. } => "registry",
            Self::EmptyRequest { .. }
            | Self::InvalidParameters { .. }
            | Self::RewindWithoutPlay => "request",
            Self::InvalidData { .. } => "data",
            Self::SerializationError { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}

impl From<bincode::Error> for AnimationError {
    fn from(err: bincode::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnimationError>;
