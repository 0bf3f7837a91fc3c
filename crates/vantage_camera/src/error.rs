//! View controller error types

use thiserror::Error;
use vantage_animation::AnimationError;

/// Errors reported by the view controller
///
/// None of these are fatal: the request that caused them is dropped and the
/// previous valid state is kept.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    /// Request rejected before touching any state
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Movement with a duration below zero
    #[error("Transition duration must be non-negative, got {0}s")]
    NegativeDuration(f64),

    /// Frame identifier that can never name a frame
    #[error("Malformed frame id: {0:?}")]
    MalformedFrameId(String),

    /// Frame not known to the frame lookup (yet)
    #[error("Transform for frame {frame:?} is unavailable")]
    FrameLookup { frame: String },
}

impl From<AnimationError> for ViewError {
    fn from(err: AnimationError) -> Self {
        match err {
            AnimationError::NegativeDuration(secs) => ViewError::NegativeDuration(secs),
        }
    }
}

/// Result type for view controller operations
pub type Result<T> = std::result::Result<T, ViewError>;
