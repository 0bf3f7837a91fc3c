//! Vantage Animation
//!
//! Queued, eased camera transitions.
//!
//! # Features
//!
//! - **Easing**: named time-to-space progress curves ([`Easing`])
//! - **Transition Queue**: growable ring buffer of [`CameraMovement`]s
//! - **Clocks**: wall-clock or frame-counted progress ([`AnimationClock`])
//! - **Driver**: per-tick state machine blending the current segment ([`AnimationDriver`])

pub mod clock;
pub mod driver;
pub mod easing;
pub mod error;
pub mod movement;
pub mod queue;

pub use clock::{AnimationClock, ClockMode, ManualClock, MonotonicClock, TimeSource};
pub use driver::{AnimationDriver, TickOutcome};
pub use easing::{space_progress, Easing};
pub use error::{AnimationError, Result};
pub use movement::{CameraMovement, MIN_DURATION};
pub use queue::{Segment, TransitionQueue, DEFAULT_CAPACITY, DEFAULT_GROWTH};
