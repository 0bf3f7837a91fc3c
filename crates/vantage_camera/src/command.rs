//! Inbound command messages
//!
//! Placement and trajectory requests as delivered by a transport adapter.
//! Every point and vector carries the frame it is expressed in; an empty
//! frame id means the camera's attached frame.

use crate::interaction::InteractionMode;
use serde::{Deserialize, Deserializer, Serialize};
use vantage_animation::Easing;
use vantage_core::{Vec3, ViewPose};

/// Point tagged with its source frame
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointStamped {
    pub frame_id: String,
    pub point: Vec3,
}

impl PointStamped {
    pub fn new(frame_id: impl Into<String>, point: Vec3) -> Self {
        Self {
            frame_id: frame_id.into(),
            point,
        }
    }
}

/// Direction tagged with its source frame
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vector3Stamped {
    pub frame_id: String,
    pub vector: Vec3,
}

impl Default for Vector3Stamped {
    fn default() -> Self {
        Self {
            frame_id: String::new(),
            vector: Vec3::UNIT_Z,
        }
    }
}

impl Vector3Stamped {
    pub fn new(frame_id: impl Into<String>, vector: Vec3) -> Self {
        Self {
            frame_id: frame_id.into(),
            vector,
        }
    }
}

/// Requested change of the pointer interaction style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeOverride {
    #[default]
    NoChange,
    Orbit,
    Fps,
}

impl ModeOverride {
    pub fn mode(&self) -> Option<InteractionMode> {
        match self {
            ModeOverride::NoChange => None,
            ModeOverride::Orbit => Some(InteractionMode::Orbit),
            ModeOverride::Fps => Some(InteractionMode::Fps),
        }
    }
}

/// Flags shared by placement and trajectory requests
pub(crate) struct ControlFlags<'a> {
    pub target_frame: &'a str,
    pub mode: ModeOverride,
    pub interaction_disabled: bool,
    pub allow_free_yaw_axis: bool,
}

/// Single-pose placement request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraPlacement {
    /// Frame to attach to before moving; empty keeps the current one
    pub target_frame: String,
    /// Transition duration in seconds; negative drops the movement
    pub time_from_start: f64,
    pub eye: PointStamped,
    pub focus: PointStamped,
    pub up: Vector3Stamped,
    pub mouse_interaction_mode: ModeOverride,
    pub interaction_disabled: bool,
    pub allow_free_yaw_axis: bool,
}

impl CameraPlacement {
    /// Placement with every component in the attached frame
    pub fn from_pose(pose: ViewPose, time_from_start: f64) -> Self {
        Self {
            time_from_start,
            eye: PointStamped::new("", pose.eye),
            focus: PointStamped::new("", pose.focus),
            up: Vector3Stamped::new("", pose.up),
            ..Default::default()
        }
    }

    pub(crate) fn flags(&self) -> ControlFlags<'_> {
        ControlFlags {
            target_frame: &self.target_frame,
            mode: self.mouse_interaction_mode,
            interaction_disabled: self.interaction_disabled,
            allow_free_yaw_axis: self.allow_free_yaw_axis,
        }
    }
}

/// One waypoint of a trajectory
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraWaypoint {
    pub eye: PointStamped,
    pub focus: PointStamped,
    pub up: Vector3Stamped,
    /// Seconds to reach this waypoint from the previous one
    pub transition_duration: f64,
    /// Easing code (`0..=3`) or name; unknown values mean [`Easing::Wave`]
    #[serde(deserialize_with = "easing_code_or_name")]
    pub easing: Easing,
}

impl CameraWaypoint {
    pub fn new(pose: ViewPose, transition_duration: f64, easing: Easing) -> Self {
        Self {
            eye: PointStamped::new("", pose.eye),
            focus: PointStamped::new("", pose.focus),
            up: Vector3Stamped::new("", pose.up),
            transition_duration,
            easing,
        }
    }
}

fn easing_code_or_name<'de, D>(deserializer: D) -> std::result::Result<Easing, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Code(u8),
        Name(String),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Code(code) => Easing::from_code(code),
        Repr::Name(name) => Easing::from_name(&name).unwrap_or_default(),
    })
}

/// Multi-waypoint trajectory request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTrajectory {
    pub trajectory: Vec<CameraWaypoint>,
    /// Frame to attach to before queueing; empty keeps the current one
    pub target_frame: String,
    pub mouse_interaction_mode: ModeOverride,
    pub interaction_disabled: bool,
    pub allow_free_yaw_axis: bool,
    /// Advance one frame per tick and publish every rendered frame
    pub render_frame_by_frame: bool,
    pub frames_per_second: u32,
}

impl CameraTrajectory {
    pub fn new(trajectory: Vec<CameraWaypoint>) -> Self {
        Self {
            trajectory,
            ..Default::default()
        }
    }

    /// Builder-style frame-by-frame rendering at `fps`
    pub fn frame_by_frame(mut self, fps: u32) -> Self {
        self.render_frame_by_frame = true;
        self.frames_per_second = fps;
        self
    }

    pub(crate) fn flags(&self) -> ControlFlags<'_> {
        ControlFlags {
            target_frame: &self.target_frame,
            mode: self.mouse_interaction_mode,
            interaction_disabled: self.interaction_disabled,
            allow_free_yaw_axis: self.allow_free_yaw_axis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trajectory_from_json() {
        let json = r#"{
            "target_frame": "base_link",
            "mouse_interaction_mode": "fps",
            "render_frame_by_frame": true,
            "frames_per_second": 30,
            "trajectory": [
                {
                    "eye": { "frame_id": "map", "point": { "x": 0.0, "y": 0.0, "z": 5.0 } },
                    "transition_duration": 2.0,
                    "easing": "full"
                },
                { "transition_duration": -1.0 },
                { "transition_duration": 1.0, "easing": 1 },
                { "transition_duration": 1.0, "easing": 42 }
            ]
        }"#;
        let trajectory: CameraTrajectory = serde_json::from_str(json).unwrap();
        assert_eq!(trajectory.trajectory.len(), 4);
        assert_eq!(trajectory.mouse_interaction_mode.mode(), Some(InteractionMode::Fps));
        assert_eq!(trajectory.trajectory[0].eye.frame_id, "map");
        assert_eq!(trajectory.trajectory[0].easing, Easing::Full);
        assert_eq!(trajectory.trajectory[1].easing, Easing::Wave);
        assert_eq!(trajectory.trajectory[1].up.vector, Vec3::UNIT_Z);
        assert_eq!(trajectory.trajectory[2].easing, Easing::Declining);
        assert_eq!(trajectory.trajectory[3].easing, Easing::Wave);
    }

    #[test]
    fn test_placement_defaults() {
        let placement: CameraPlacement = serde_json::from_str("{}").unwrap();
        assert_eq!(placement.mouse_interaction_mode, ModeOverride::NoChange);
        assert!(placement.target_frame.is_empty());
        assert!(!placement.interaction_disabled);
    }
}
