//! View controller configuration
//!
//! Every field has a serde default, so a partial (or empty) configuration
//! table deserializes into a working controller setup.

use crate::frames::FIXED_FRAME;
use crate::interaction::InteractionMode;
use serde::{Deserialize, Serialize};
use vantage_core::ViewPose;

/// Configuration for an [`AnimatedViewController`](crate::AnimatedViewController)
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewControllerConfig {
    /// Pose restored by `reset()` and used at startup
    pub default_pose: ViewPose,
    /// Frame the camera is attached to at startup
    pub target_frame: String,
    /// Transition time for `look_at` and friends (seconds)
    pub default_transition_time: f64,
    /// Frame rate for frame-by-frame rendering
    pub target_fps: u32,
    /// Initial transition queue capacity
    pub queue_capacity: usize,
    /// Slots added whenever the queue fills up
    pub queue_growth: usize,
    /// Whether pointer input moves the camera
    pub mouse_enabled: bool,
    /// Initial pointer interaction style
    pub interaction_mode: InteractionMode,
    /// Keep +Z as the up axis and forbid rolling
    pub maintain_vertical_axis: bool,
    /// Publish rendered frames while animating
    pub publish_view_images: bool,
    /// Closest the eye may get to the focus point
    pub min_distance: f32,
    /// Pointer sensitivities
    pub sensitivity: Sensitivity,
    /// Stream names used by transport adapters
    pub topics: TopicNames,
}

impl Default for ViewControllerConfig {
    fn default() -> Self {
        Self {
            default_pose: ViewPose::default(),
            target_frame: FIXED_FRAME.to_string(),
            default_transition_time: 0.5,
            target_fps: 60,
            queue_capacity: vantage_animation::DEFAULT_CAPACITY,
            queue_growth: vantage_animation::DEFAULT_GROWTH,
            mouse_enabled: true,
            interaction_mode: InteractionMode::Orbit,
            maintain_vertical_axis: true,
            publish_view_images: false,
            min_distance: 0.01,
            sensitivity: Sensitivity::default(),
            topics: TopicNames::default(),
        }
    }
}

/// Pointer-to-motion scale factors
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Sensitivity {
    /// Radians per pixel of drag
    pub rotate: f32,
    /// Fraction of the focus distance per wheel unit
    pub wheel: f32,
    /// Fraction of the focus distance per pixel of right-drag
    pub zoom: f32,
    /// World units per pixel when panning in FPS mode
    pub fps_pan: f32,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            rotate: 0.005,
            wheel: 0.001,
            zoom: 0.01,
            fps_pan: 0.01,
        }
    }
}

/// Names of the inbound and outbound message streams
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TopicNames {
    pub placement: String,
    pub trajectory: String,
    pub pause: String,
    pub pose: String,
    pub finished: String,
    pub image: String,
}

impl Default for TopicNames {
    fn default() -> Self {
        Self {
            placement: "/rviz/camera_placement".to_string(),
            trajectory: "/rviz/camera_trajectory".to_string(),
            pause: "/rviz/pause_animation_duration".to_string(),
            pose: "/rviz/current_camera_pose".to_string(),
            finished: "/rviz/finished_animation".to_string(),
            image: "/rviz/view_image".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ViewControllerConfig =
            serde_json::from_str(r#"{ "target_fps": 30, "interaction_mode": "fps" }"#).unwrap();
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.interaction_mode, InteractionMode::Fps);
        assert_eq!(config.default_transition_time, 0.5);
        assert_eq!(config.topics.pose, "/rviz/current_camera_pose");
    }
}
