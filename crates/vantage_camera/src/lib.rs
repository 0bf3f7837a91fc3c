//! Vantage Camera
//!
//! Animated view controller for 3D viewers.
//!
//! # Features
//!
//! - **Transitions**: queued placement and trajectory requests played back
//!   with easing, on wall-clock time or frame by frame
//! - **Frame attachment**: the camera rides along with a named reference frame
//! - **Interaction**: orbit and first-person pointer control with pitch limits
//! - **Outputs**: pose, completion and rendered-image streams
//!
//! # Example
//!
//! ```ignore
//! use vantage_camera::prelude::*;
//!
//! let controller = AnimatedViewController::new(
//!     ViewControllerConfig::default(),
//!     Arc::new(StaticFrameGraph::new()),
//!     Arc::new(MonotonicClock),
//! );
//! let shared = SharedViewController::new(controller);
//! shared.handle_trajectory(&trajectory)?;
//! while shared.update().is_some() {}
//! ```

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod frames;
pub mod input;
pub mod interaction;
pub mod publish;
pub mod shared;
pub mod surface;

pub use command::{CameraPlacement, CameraTrajectory, CameraWaypoint, ModeOverride, PointStamped, Vector3Stamped};
pub use config::{Sensitivity, TopicNames, ViewControllerConfig};
pub use controller::{AnimatedViewController, StaticView, ViewSource, ANIMATED_CLASS, ORBIT_CLASS};
pub use error::{Result, ViewError};
pub use frames::{AttachmentState, FrameLookup, StaticFrameGraph, FIXED_FRAME};
pub use input::{Buttons, Modifiers, PointerEvent, PointerKind};
pub use interaction::{Gesture, InteractionController, InteractionMode, PITCH_LIMIT_HIGH, PITCH_LIMIT_LOW};
pub use publish::{
    Broadcast, Outbound, PixelBox, PixelFormat, StampedPose, SubscriptionId, ViewImage, ViewOutputs, IMAGE_ENCODING,
};
pub use shared::SharedViewController;
pub use surface::{HeadlessSurface, RenderSurface, Viewport};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AnimatedViewController, CameraPlacement, CameraTrajectory, CameraWaypoint, FrameLookup,
        InteractionMode, PointerEvent, SharedViewController, StampedPose, StaticFrameGraph,
        ViewControllerConfig, Viewport,
    };
    pub use std::sync::Arc;
    pub use vantage_animation::{Easing, MonotonicClock};
    pub use vantage_core::{Quat, RigidTransform, Vec3, ViewPose};
}
