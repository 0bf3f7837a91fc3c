//! Animation clocks
//!
//! Progress through a segment is measured either against wall-clock time or
//! by counting rendered frames at a target rate. Exactly one strategy is
//! active at a time.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of "now" for wall-clock playback
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;
}

/// The process monotonic clock
#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicClock;

impl TimeSource for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually stepped clock for deterministic playback and tests
///
/// Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Active clock strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClockMode {
    /// Elapsed wall-clock time since the segment anchor
    #[default]
    WallClock,
    /// One frame per tick at `target_fps`, for deterministic offline rendering
    FrameCounted { target_fps: u32 },
}

/// Per-segment time progress bookkeeping
#[derive(Clone, Debug)]
pub struct AnimationClock {
    mode: ClockMode,
    anchor: Instant,
    frames: u64,
}

impl AnimationClock {
    pub fn new(now: Instant) -> Self {
        Self {
            mode: ClockMode::WallClock,
            anchor: now,
            frames: 0,
        }
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ClockMode) {
        self.mode = mode;
    }

    pub fn is_frame_counted(&self) -> bool {
        matches!(self.mode, ClockMode::FrameCounted { .. })
    }

    /// Start timing a fresh run of segments at `now`
    pub fn anchor(&mut self, now: Instant) {
        self.anchor = now;
    }

    pub fn anchor_instant(&self) -> Instant {
        self.anchor
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Fraction of `duration` elapsed; may exceed 1.0
    ///
    /// Frame-counted mode consumes one frame per call.
    pub fn progress(&mut self, now: Instant, duration: Duration) -> f64 {
        let secs = duration.as_secs_f64().max(f64::EPSILON);
        match self.mode {
            ClockMode::FrameCounted { target_fps } => {
                let progress = self.frames as f64 / (target_fps.max(1) as f64 * secs);
                self.frames += 1;
                progress
            }
            ClockMode::WallClock => now.saturating_duration_since(self.anchor).as_secs_f64() / secs,
        }
    }

    /// Move on to the next segment: its start is the nominal end of the one just finished
    pub fn reanchor(&mut self, finished_duration: Duration) {
        self.anchor += finished_duration;
        self.frames = 0;
    }

    /// Push the anchor forward without touching progress already made
    pub fn shift(&mut self, pause: Duration) {
        self.anchor += pause;
    }

    pub fn reset_frames(&mut self) {
        self.frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_clock_progress() {
        let time = ManualClock::new();
        let mut clock = AnimationClock::new(time.now());
        time.advance(Duration::from_millis(500));
        let p = clock.progress(time.now(), Duration::from_secs(2));
        assert!((p - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_frame_counted_progress() {
        let mut clock = AnimationClock::new(Instant::now());
        clock.set_mode(ClockMode::FrameCounted { target_fps: 10 });
        let now = Instant::now();
        let samples: Vec<f64> = (0..3).map(|_| clock.progress(now, Duration::from_secs(1))).collect();
        assert_eq!(samples, vec![0.0, 0.1, 0.2]);
        assert_eq!(clock.frames(), 3);
    }

    #[test]
    fn test_shift_delays_progress() {
        let time = ManualClock::new();
        let mut clock = AnimationClock::new(time.now());
        clock.shift(Duration::from_secs(1));
        time.advance(Duration::from_millis(500));
        // Anchor is still in the future
        assert_eq!(clock.progress(time.now(), Duration::from_secs(1)), 0.0);
    }

    #[test]
    fn test_reanchor_uses_nominal_end() {
        let time = ManualClock::new();
        let start = time.now();
        let mut clock = AnimationClock::new(start);
        clock.reanchor(Duration::from_millis(250));
        assert_eq!(clock.anchor_instant(), start + Duration::from_millis(250));
    }
}
