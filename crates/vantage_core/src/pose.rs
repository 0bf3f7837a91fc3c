//! Camera view pose: eye, focus and up

use crate::{Quat, RigidTransform, Vec3};
use serde::{Deserialize, Serialize};

/// Canonical camera pose
///
/// Eye, focus and up are the stored representation; the orientation is
/// always derived from them and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewPose {
    /// Camera position
    pub eye: Vec3,
    /// Point the camera looks at (and orbits around)
    pub focus: Vec3,
    /// Vector mapped to "up" in the image plane
    pub up: Vec3,
}

impl Default for ViewPose {
    fn default() -> Self {
        Self {
            eye: Vec3::new(5.0, 5.0, 10.0),
            focus: Vec3::ZERO,
            up: Vec3::UNIT_Z,
        }
    }
}

impl ViewPose {
    pub fn new(eye: Vec3, focus: Vec3, up: Vec3) -> Self {
        Self { eye, focus, up }
    }

    /// Distance between eye and focus
    pub fn distance(&self) -> f32 {
        self.eye.distance(self.focus)
    }

    /// Unit viewing direction from eye to focus
    pub fn direction(&self) -> Vec3 {
        (self.focus - self.eye).normalize_or(Vec3::NEG_Z)
    }

    /// Camera orientation derived from the pose
    pub fn orientation(&self) -> Quat {
        Quat::look_rotation(self.focus - self.eye, self.up)
    }

    /// Component-wise blend of eye, focus and up; `s = 0` yields `self`
    pub fn lerp(&self, goal: &ViewPose, s: f32) -> ViewPose {
        ViewPose {
            eye: self.eye.lerp(goal.eye, s),
            focus: self.focus.lerp(goal.focus, s),
            up: self.up.lerp(goal.up, s),
        }
    }

    /// Re-express a pose held in frame `from` in frame `to`
    ///
    /// Both transforms map their frame into the common fixed frame. Points go
    /// through the fixed frame; the up vector only rotates.
    pub fn reexpressed(&self, from: &RigidTransform, to: &RigidTransform) -> ViewPose {
        ViewPose {
            eye: to.inverse_transform_point(from.transform_point(self.eye)),
            focus: to.inverse_transform_point(from.transform_point(self.focus)),
            up: to.inverse_transform_vector(from.transform_vector(self.up)),
        }
    }

    pub fn abs_diff_eq(&self, other: &ViewPose, epsilon: f32) -> bool {
        self.eye.abs_diff_eq(other.eye, epsilon)
            && self.focus.abs_diff_eq(other.focus, epsilon)
            && self.up.abs_diff_eq(other.up, epsilon)
    }
}
