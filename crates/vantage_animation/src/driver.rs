//! Animation driver
//!
//! Per-tick state machine that walks the transition queue:
//!
//! - **Idle**: queue empty, `tick()` yields nothing
//! - **Playing**: compute time progress, ease it, blend start → goal
//! - **SegmentComplete**: pop the start; re-anchor on the next goal or drain to Idle

use crate::clock::{AnimationClock, ClockMode, TimeSource};
use crate::easing::Easing;
use crate::error::Result;
use crate::movement::CameraMovement;
use crate::queue::{Segment, TransitionQueue, DEFAULT_CAPACITY, DEFAULT_GROWTH};
use std::sync::Arc;
use std::time::Duration;
use vantage_core::ViewPose;

/// Result of one animated tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutcome {
    /// Blended pose to push to the camera
    pub pose: ViewPose,
    /// Clamped time progress of the current segment
    pub time_progress: f64,
    /// Eased space progress of the current segment
    pub space_progress: f32,
    /// The segment reached its goal this tick
    pub segment_complete: bool,
    /// The queue drained this tick; a completion notification is due
    pub finished: bool,
}

/// Drives queued camera movements one tick at a time
pub struct AnimationDriver {
    queue: TransitionQueue,
    clock: AnimationClock,
    time: Arc<dyn TimeSource>,
    animating: bool,
    pending_pause: Duration,
}

impl AnimationDriver {
    pub fn new(time: Arc<dyn TimeSource>) -> Self {
        Self::with_queue_capacity(time, DEFAULT_CAPACITY, DEFAULT_GROWTH)
    }

    pub fn with_queue_capacity(time: Arc<dyn TimeSource>, capacity: usize, growth: usize) -> Self {
        Self {
            queue: TransitionQueue::with_capacity(capacity, growth),
            clock: AnimationClock::new(time.now()),
            time,
            animating: false,
            pending_pause: Duration::ZERO,
        }
    }

    /// Queue a movement to `goal`, starting from `live` when idle
    ///
    /// Negative durations are rejected and leave the driver untouched.
    pub fn begin_transition(
        &mut self,
        goal: ViewPose,
        duration_secs: f64,
        easing: Easing,
        live: &ViewPose,
    ) -> Result<()> {
        let movement = CameraMovement::new(goal, duration_secs, easing)?;
        self.enqueue(movement, live);
        Ok(())
    }

    /// Queue an already validated movement
    pub fn enqueue(&mut self, movement: CameraMovement, live: &ViewPose) {
        if self.queue.enqueue(movement, live) {
            self.clock.anchor(self.time.now());
        }
        self.animating = true;
        tracing::trace!(
            "AnimationDriver: queued movement ({:?}, {:?}), {} pending",
            movement.duration(),
            movement.easing(),
            self.queue.len()
        );
    }

    /// Flush every pending movement
    ///
    /// Returns `true` when frame-counted playback was active; the caller owes
    /// a completion notification in that case. Playback reverts to wall-clock.
    pub fn cancel(&mut self) -> bool {
        self.animating = false;
        self.queue.clear();
        self.clock.reset_frames();

        if self.clock.is_frame_counted() {
            self.clock.set_mode(ClockMode::WallClock);
            true
        } else {
            false
        }
    }

    /// Delay playback by `duration`, applied on the next animated tick
    pub fn request_pause(&mut self, duration: Duration) {
        self.pending_pause += duration;
    }

    /// Advance one frame
    ///
    /// Returns `None` while idle.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.animating {
            return None;
        }
        let Some(Segment { start, goal }) = self.queue.front_segment() else {
            return None;
        };

        if !self.pending_pause.is_zero() {
            self.clock.shift(self.pending_pause);
            tracing::debug!("AnimationDriver: paused for {:?}", self.pending_pause);
            self.pending_pause = Duration::ZERO;
        }

        let mut time_progress = self.clock.progress(self.time.now(), goal.duration());
        let segment_complete = time_progress >= 1.0;
        if segment_complete {
            time_progress = 1.0;
        }

        let space_progress = goal.easing().space_progress(time_progress);
        let pose = start.pose().lerp(goal.pose(), space_progress);
        tracing::trace!(
            "AnimationDriver: progress time={:.3} space={:.3}",
            time_progress,
            space_progress
        );

        let mut finished = false;
        if segment_complete {
            self.queue.advance();
            if self.queue.has_next() {
                self.clock.reanchor(goal.duration());
            } else {
                // A natural drain always notifies once, whichever clock ran
                self.cancel();
                finished = true;
                tracing::debug!("AnimationDriver: animation finished");
            }
        }

        Some(TickOutcome {
            pose,
            time_progress,
            space_progress,
            segment_complete,
            finished,
        })
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Switch to frame-counted playback at `target_fps`
    pub fn use_frame_counted(&mut self, target_fps: u32) {
        self.clock.set_mode(ClockMode::FrameCounted {
            target_fps: target_fps.max(1),
        });
    }

    /// Switch back to wall-clock playback
    pub fn use_wall_clock(&mut self) {
        self.clock.set_mode(ClockMode::WallClock);
    }

    pub fn clock_mode(&self) -> ClockMode {
        self.clock.mode()
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn queue(&self) -> &TransitionQueue {
        &self.queue
    }

    /// Mutable queue access for re-expressing stored poses in a new frame
    pub fn queue_mut(&mut self) -> &mut TransitionQueue {
        &mut self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use vantage_core::Vec3;

    fn driver() -> (AnimationDriver, ManualClock) {
        let time = ManualClock::new();
        (AnimationDriver::new(Arc::new(time.clone())), time)
    }

    fn rest() -> ViewPose {
        ViewPose::new(Vec3::new(5.0, 5.0, 10.0), Vec3::ZERO, Vec3::UNIT_Z)
    }

    fn goal() -> ViewPose {
        ViewPose::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::UNIT_Z)
    }

    #[test]
    fn test_idle_tick_is_none() {
        let (mut driver, _) = driver();
        assert!(driver.tick().is_none());
    }

    #[test]
    fn test_linear_transition_scenario() {
        let (mut driver, time) = driver();
        driver.begin_transition(goal(), 2.0, Easing::Full, &rest()).unwrap();

        time.advance(Duration::from_secs(1));
        let mid = driver.tick().unwrap();
        assert!(mid.pose.eye.abs_diff_eq(Vec3::new(2.5, 2.5, 7.5), 1e-5));
        assert!(!mid.finished);

        time.advance(Duration::from_secs(1));
        let end = driver.tick().unwrap();
        assert_eq!(end.pose.eye, Vec3::new(0.0, 0.0, 5.0));
        assert!(end.segment_complete);
        assert!(end.finished);

        time.advance(Duration::from_secs(1));
        assert!(driver.tick().is_none());
        assert!(!driver.is_animating());
    }

    #[test]
    fn test_zero_duration_completes_quickly() {
        let (mut driver, time) = driver();
        driver.begin_transition(goal(), 0.0, Easing::Wave, &rest()).unwrap();
        time.advance(Duration::from_millis(16));
        let outcome = driver.tick().unwrap();
        assert!(outcome.finished);
        assert_eq!(outcome.pose, goal());
    }

    #[test]
    fn test_zero_duration_frame_counted_completes_on_second_tick() {
        let (mut driver, _) = driver();
        driver.use_frame_counted(60);
        driver.begin_transition(goal(), 0.0, Easing::Wave, &rest()).unwrap();
        let first = driver.tick().unwrap();
        assert!(!first.finished);
        let second = driver.tick().unwrap();
        assert!(second.finished);
        assert_eq!(driver.clock_mode(), ClockMode::WallClock);
    }

    #[test]
    fn test_negative_duration_is_noop() {
        let (mut driver, _) = driver();
        assert!(driver.begin_transition(goal(), -1.0, Easing::Full, &rest()).is_err());
        assert!(driver.queue().is_empty());
        assert!(!driver.is_animating());
    }

    #[test]
    fn test_next_segment_anchors_at_nominal_end() {
        let (mut driver, time) = driver();
        let start = time.now();
        let second = ViewPose::new(Vec3::new(10.0, 0.0, 5.0), Vec3::ZERO, Vec3::UNIT_Z);
        driver.begin_transition(goal(), 0.001, Easing::Full, &rest()).unwrap();
        driver.begin_transition(second, 1.0, Easing::Full, &rest()).unwrap();

        // Pop the first segment well after its nominal end
        time.advance(Duration::from_millis(250));
        let first = driver.tick().unwrap();
        assert!(first.segment_complete);
        assert!(!first.finished);
        assert_eq!(driver.clock().anchor_instant(), start + Duration::from_millis(1));

        // 250ms after start is 249ms into the second segment
        let outcome = driver.tick().unwrap();
        assert!((outcome.time_progress - 0.249).abs() < 1e-6);
    }

    #[test]
    fn test_pause_shifts_anchor() {
        let (mut driver, time) = driver();
        driver.begin_transition(goal(), 2.0, Easing::Full, &rest()).unwrap();
        time.advance(Duration::from_secs(1));
        driver.request_pause(Duration::from_secs(1));
        let outcome = driver.tick().unwrap();
        assert_eq!(outcome.time_progress, 0.0);

        time.advance(Duration::from_secs(1));
        let outcome = driver.tick().unwrap();
        assert!((outcome.time_progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_cancel_reports_frame_counted() {
        let (mut driver, _) = driver();
        driver.begin_transition(goal(), 1.0, Easing::Full, &rest()).unwrap();
        assert!(!driver.cancel());

        driver.use_frame_counted(30);
        driver.begin_transition(goal(), 1.0, Easing::Full, &rest()).unwrap();
        driver.tick();
        assert!(driver.cancel());
        assert!(driver.queue().is_empty());
        assert_eq!(driver.clock().frames(), 0);
        assert_eq!(driver.clock_mode(), ClockMode::WallClock);
    }
}
