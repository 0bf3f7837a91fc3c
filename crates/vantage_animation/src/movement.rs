//! Queued camera movements

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use std::time::Duration;
use vantage_core::ViewPose;

/// Shortest duration a movement may have; zero-length jumps are stretched to it
pub const MIN_DURATION: Duration = Duration::from_millis(1);

/// One queued camera movement: the goal pose, how long to get there and the curve
///
/// Immutable once built. The duration is always strictly positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraMovement {
    pose: ViewPose,
    duration: Duration,
    easing: Easing,
}

impl CameraMovement {
    /// Build a movement from a duration in seconds
    ///
    /// Negative or non-finite durations are rejected; zero becomes [`MIN_DURATION`].
    pub fn new(pose: ViewPose, duration_secs: f64, easing: Easing) -> Result<Self> {
        if !(duration_secs >= 0.0) || !duration_secs.is_finite() {
            return Err(AnimationError::NegativeDuration(duration_secs));
        }
        Ok(Self::with_duration(pose, Duration::from_secs_f64(duration_secs), easing))
    }

    pub fn with_duration(pose: ViewPose, duration: Duration, easing: Easing) -> Self {
        Self {
            pose,
            duration: duration.max(MIN_DURATION),
            easing,
        }
    }

    /// Zero-length "you are here" entry used as the start of a segment
    pub fn snapshot(pose: ViewPose) -> Self {
        Self::with_duration(pose, MIN_DURATION, Easing::default())
    }

    pub fn pose(&self) -> &ViewPose {
        &self.pose
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Replace the pose with one expressed in another frame, keeping timing and curve
    pub fn map_pose<F>(&mut self, f: F)
    where
        F: FnOnce(&ViewPose) -> ViewPose,
    {
        self.pose = f(&self.pose);
    }
}
