//! Thread-safe controller handle
//!
//! Requests arrive on transport threads while `update()` and pointer input run
//! on the render thread. One lock guards the whole controller, so a tick never
//! sees a half-applied request and a cancel never races a partial enqueue.
//!
//! Outbound messages are collected under the lock and delivered after it is
//! released, so subscribers may call back into the handle.

use crate::command::{CameraPlacement, CameraTrajectory};
use crate::controller::AnimatedViewController;
use crate::error::Result;
use crate::input::PointerEvent;
use crate::publish::ViewOutputs;
use crate::surface::Viewport;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use vantage_animation::{Easing, TickOutcome};
use vantage_core::ViewPose;

/// Cloneable handle to an [`AnimatedViewController`]
#[derive(Clone)]
pub struct SharedViewController {
    inner: Arc<RwLock<AnimatedViewController>>,
}

impl SharedViewController {
    pub fn new(mut controller: AnimatedViewController) -> Self {
        controller.defer_outputs();
        Self {
            inner: Arc::new(RwLock::new(controller)),
        }
    }

    /// Run `f` with shared access
    pub fn with_controller<R>(&self, f: impl FnOnce(&AnimatedViewController) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access, then deliver what it published
    pub fn with_controller_mut<R>(&self, f: impl FnOnce(&mut AnimatedViewController) -> R) -> R {
        let (result, outbound, outputs) = {
            let mut controller = self.inner.write();
            let result = f(&mut controller);
            (result, controller.take_outbound(), controller.outputs())
        };
        for message in &outbound {
            outputs.deliver(message);
        }
        result
    }

    pub fn update(&self) -> Option<TickOutcome> {
        self.with_controller_mut(|c| c.update())
    }

    pub fn begin_transition(&self, goal: ViewPose, duration_secs: f64, easing: Easing) -> Result<()> {
        self.with_controller_mut(|c| c.begin_transition(goal, duration_secs, easing))
    }

    pub fn cancel_transition(&self) {
        self.with_controller_mut(|c| c.cancel_transition());
    }

    pub fn handle_placement(&self, placement: &CameraPlacement) -> Result<()> {
        self.with_controller_mut(|c| c.handle_placement(placement))
    }

    pub fn handle_trajectory(&self, trajectory: &CameraTrajectory) -> Result<usize> {
        self.with_controller_mut(|c| c.handle_trajectory(trajectory))
    }

    pub fn request_pause(&self, duration: Duration) {
        self.inner.write().request_pause(duration);
    }

    pub fn reattach(&self, frame: &str) -> Result<()> {
        self.with_controller_mut(|c| c.reattach(frame))
    }

    pub fn handle_pointer(&self, event: &PointerEvent, viewport: &Viewport) -> bool {
        self.with_controller_mut(|c| c.handle_pointer(event, viewport))
    }

    pub fn reset(&self) {
        self.with_controller_mut(|c| c.reset());
    }

    pub fn pose(&self) -> ViewPose {
        *self.inner.read().pose()
    }

    pub fn is_animating(&self) -> bool {
        self.inner.read().is_animating()
    }

    pub fn outputs(&self) -> Arc<ViewOutputs> {
        self.inner.read().outputs()
    }
}
