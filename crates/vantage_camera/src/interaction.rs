//! Interaction controller
//!
//! Converts pointer deltas into camera pose changes. Two styles are
//! supported:
//!
//! - **Orbit**: the focus point stays put and the eye swings around it
//! - **FPS**: the eye stays put and the focus swings around it
//!
//! While the vertical axis is maintained, pitch is kept inside
//! `[PITCH_LIMIT_LOW, PITCH_LIMIT_HIGH]` so the view never flips through the pole.

use crate::config::{Sensitivity, ViewControllerConfig};
use crate::input::{PointerEvent, PointerKind};
use crate::surface::Viewport;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f32::consts::{FRAC_PI_2, PI};
use vantage_core::{Quat, Vec3, ViewPose};

/// Lowest allowed pitch (radians from straight down)
pub const PITCH_LIMIT_LOW: f32 = 0.02;
/// Highest allowed pitch (radians from straight down)
pub const PITCH_LIMIT_HIGH: f32 = PI - 0.02;

/// Pointer interaction style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Orbit,
    Fps,
}

impl InteractionMode {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionMode::Orbit => "Orbit",
            InteractionMode::Fps => "FPS",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            InteractionMode::Orbit => InteractionMode::Fps,
            InteractionMode::Fps => InteractionMode::Orbit,
        }
    }
}

/// One pose change derived from pointer input
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    /// Yaw about the vertical axis, pitch about camera X, roll about camera Z
    Rotate { yaw: f32, pitch: f32, roll: f32 },
    /// Move eye and focus together along camera-local axes
    Translate(Vec3),
    /// Move only the eye along camera Z, never through the focus
    Dolly(f32),
    /// Swap Orbit and FPS without moving
    ToggleMode,
}

/// Gestures produced by a single pointer event
pub type Gestures = SmallVec<[Gesture; 3]>;

/// Orbit/FPS interaction state
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionController {
    mode: InteractionMode,
    maintain_vertical_axis: bool,
    min_distance: f32,
    sensitivity: Sensitivity,
}

impl InteractionController {
    pub fn new(mode: InteractionMode, maintain_vertical_axis: bool) -> Self {
        Self {
            mode,
            maintain_vertical_axis,
            min_distance: 0.01,
            sensitivity: Sensitivity::default(),
        }
    }

    pub fn from_config(config: &ViewControllerConfig) -> Self {
        Self {
            mode: config.interaction_mode,
            maintain_vertical_axis: config.maintain_vertical_axis,
            min_distance: config.min_distance,
            sensitivity: config.sensitivity.clone(),
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
    }

    pub fn maintain_vertical_axis(&self) -> bool {
        self.maintain_vertical_axis
    }

    pub fn set_maintain_vertical_axis(&mut self, maintain: bool) {
        self.maintain_vertical_axis = maintain;
    }

    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    /// Axis yaw turns about: +Z when maintained, otherwise the pose's up vector
    pub fn vertical_axis(&self, pose: &ViewPose) -> Vec3 {
        if self.maintain_vertical_axis {
            Vec3::UNIT_Z
        } else {
            pose.up.normalize_or(Vec3::UNIT_Z)
        }
    }

    /// Angle between the camera's back axis and the vertical axis
    ///
    /// 0 looks straight down, π/2 is level, π looks straight up.
    pub fn pitch(&self, pose: &ViewPose) -> f32 {
        pitch_of(&pose.orientation(), self.vertical_axis(pose))
    }

    /// Apply incremental yaw, pitch and roll
    ///
    /// Returns `false` when the pitch component was dropped at a pole limit.
    pub fn rotate(&self, pose: &mut ViewPose, yaw: f32, pitch: f32, roll: f32) -> bool {
        let axis = self.vertical_axis(pose);
        let distance = pose.distance();
        let old = pose.orientation();
        let old_pitch = pitch_of(&old, axis);

        // Damp yaw near the poles
        let yaw = if self.maintain_vertical_axis {
            yaw * (old_pitch - FRAC_PI_2).cos()
        } else {
            yaw
        };

        let yaw_quat = Quat::from_axis_angle(axis, yaw);
        let pitch_quat = Quat::from_axis_angle(Vec3::UNIT_X, pitch);
        let roll_quat = Quat::from_axis_angle(Vec3::UNIT_Z, roll);

        let mut new = (yaw_quat * old * pitch_quat * roll_quat).normalize();

        // The measured pitch folds back at the poles, so judge the unfolded target
        let target_pitch = old_pitch + pitch;

        let mut pitched = true;
        if self.maintain_vertical_axis
            && ((pitch > 0.0 && target_pitch > PITCH_LIMIT_HIGH)
                || (pitch < 0.0 && target_pitch < PITCH_LIMIT_LOW))
        {
            new = (yaw_quat * old * roll_quat).normalize();
            pitched = false;
        }

        match self.mode {
            InteractionMode::Orbit => pose.eye = pose.focus + new.z_axis() * distance,
            InteractionMode::Fps => pose.focus = pose.eye - new.z_axis() * distance,
        }
        pose.up = if self.maintain_vertical_axis {
            Vec3::UNIT_Z
        } else {
            new.y_axis()
        };
        pitched
    }

    /// Move eye and focus together by `local` (camera axes)
    pub fn translate(&self, pose: &mut ViewPose, local: Vec3) {
        let offset = pose.orientation() * local;
        pose.eye += offset;
        pose.focus += offset;
    }

    /// Move the eye along camera Z by `dz`
    ///
    /// Refused (returns `false`) if the eye would end up closer than the
    /// minimum distance or on the other side of the focus.
    pub fn dolly(&self, pose: &mut ViewPose, dz: f32) -> bool {
        let new_eye = pose.eye + pose.orientation() * Vec3::new(0.0, 0.0, dz);
        let old_offset = pose.eye - pose.focus;
        let new_offset = new_eye - pose.focus;
        if new_offset.length() > self.min_distance && new_offset.dot(old_offset) > 0.0 {
            pose.eye = new_eye;
            true
        } else {
            false
        }
    }

    /// Apply one gesture
    pub fn apply(&mut self, pose: &mut ViewPose, gesture: Gesture) {
        match gesture {
            Gesture::Rotate { yaw, pitch, roll } => {
                self.rotate(pose, yaw, pitch, roll);
            }
            Gesture::Translate(local) => self.translate(pose, local),
            Gesture::Dolly(dz) => {
                self.dolly(pose, dz);
            }
            Gesture::ToggleMode => {
                self.mode = self.mode.toggled();
                tracing::debug!("InteractionController: switched to {}", self.mode.name());
            }
        }
    }

    /// Map a pointer event onto gestures
    ///
    /// Drag deltas only count while `dragging`.
    pub fn gestures(
        &self,
        event: &PointerEvent,
        dragging: bool,
        distance: f32,
        viewport: &Viewport,
    ) -> Gestures {
        let mut gestures = Gestures::new();
        let s = &self.sensitivity;

        let (dx, dy) = if dragging && event.kind == PointerKind::Move {
            let (dx, dy) = event.delta();
            (dx as f32, dy as f32)
        } else {
            (0.0, 0.0)
        };
        let moved = dx != 0.0 || dy != 0.0;
        let shift = event.modifiers.shift;

        if event.buttons.left && !shift {
            if moved {
                gestures.push(Gesture::Rotate {
                    yaw: -dx * s.rotate,
                    pitch: -dy * s.rotate,
                    roll: 0.0,
                });
            }
        } else if event.buttons.middle || (shift && event.buttons.left) {
            if moved {
                let local = match self.mode {
                    InteractionMode::Orbit => {
                        let half_fov_y = viewport.fov_y / 2.0;
                        let half_fov_x = (half_fov_y.tan() * viewport.aspect).atan();
                        Vec3::new(
                            -(dx / viewport.width.max(1) as f32) * distance * half_fov_x.tan() * 2.0,
                            (dy / viewport.height.max(1) as f32) * distance * half_fov_y.tan() * 2.0,
                            0.0,
                        )
                    }
                    InteractionMode::Fps => Vec3::new(dx * s.fps_pan, -dy * s.fps_pan, 0.0),
                };
                gestures.push(Gesture::Translate(local));
            }
        } else if event.buttons.right && dy != 0.0 {
            let dz = dy * s.zoom * distance;
            if shift || self.mode == InteractionMode::Fps {
                gestures.push(Gesture::Translate(Vec3::new(0.0, 0.0, dz)));
            } else {
                gestures.push(Gesture::Dolly(dz));
            }
        }

        if event.wheel_delta != 0 {
            let diff = event.wheel_delta as f32;
            if shift {
                gestures.push(Gesture::Translate(Vec3::new(0.0, 0.0, -diff * s.wheel * distance)));
            } else if event.modifiers.control {
                gestures.push(Gesture::Rotate {
                    yaw: 0.0,
                    pitch: 0.0,
                    roll: diff * s.wheel,
                });
            } else {
                gestures.push(Gesture::Dolly(-diff * s.wheel * distance));
            }
        }

        if event.kind == PointerKind::Press && event.buttons.left && event.modifiers.control && shift {
            gestures.push(Gesture::ToggleMode);
        }

        gestures
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(InteractionMode::Orbit, true)
    }
}

fn pitch_of(orientation: &Quat, vertical: Vec3) -> f32 {
    orientation.z_axis().dot(vertical).clamp(-1.0, 1.0).acos()
}
