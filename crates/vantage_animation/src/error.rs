//! Animation error types

use thiserror::Error;

/// Errors raised while building or queueing camera movements
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Transition duration below zero (or not a number)
    #[error("transition duration must be non-negative, got {0}s")]
    NegativeDuration(f64),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
