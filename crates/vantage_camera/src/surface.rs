//! Rendering collaborator
//!
//! The controller never renders itself. It pushes the camera placement to a
//! [`RenderSurface`] every tick and reads frames back when images are
//! requested.

use crate::publish::PixelBox;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;
use vantage_core::{Quat, Vec3};

/// Pixel size and projection of the rendered view
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Width over height
    pub aspect: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1000, 1000, FRAC_PI_4)
    }
}

impl Viewport {
    pub fn new(width: u32, height: u32, fov_y: f32) -> Self {
        Self {
            width,
            height,
            fov_y,
            aspect: width as f32 / height.max(1) as f32,
        }
    }
}

/// Renderer the controller drives
pub trait RenderSurface: Send + Sync {
    /// Place the camera; both values are in the fixed frame
    fn apply_camera(&self, position: Vec3, orientation: Quat);

    fn viewport(&self) -> Viewport;

    /// Read back the last rendered frame, if the surface can
    fn read_pixels(&self) -> Option<PixelBox>;
}

/// Surface without a renderer
///
/// Records the last camera placement and optionally hands out a fixed frame,
/// which is enough for command-line playback and tests.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    viewport: Viewport,
    camera: Mutex<Option<(Vec3, Quat)>>,
    frame: Mutex<Option<PixelBox>>,
}

impl HeadlessSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    /// Builder-style fixed frame returned by [`read_pixels`](RenderSurface::read_pixels)
    pub fn with_frame(self, frame: PixelBox) -> Self {
        *self.frame.lock() = Some(frame);
        self
    }

    /// Last placement passed to [`apply_camera`](RenderSurface::apply_camera)
    pub fn camera(&self) -> Option<(Vec3, Quat)> {
        *self.camera.lock()
    }
}

impl RenderSurface for HeadlessSurface {
    fn apply_camera(&self, position: Vec3, orientation: Quat) {
        *self.camera.lock() = Some((position, orientation));
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn read_pixels(&self) -> Option<PixelBox> {
        self.frame.lock().clone()
    }
}
