//! Outbound message streams
//!
//! Each stream is a [`Broadcast`]: subscribers register a callback and get a
//! [`SubscriptionId`] back. Publishing clones the callback list first, so a
//! subscriber may (un)subscribe from inside its own callback.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;
use std::time::SystemTime;
use vantage_core::{Quat, Vec3, ViewPose};

new_key_type! {
    /// Handle to a registered stream subscriber
    pub struct SubscriptionId;
}

/// Callback invoked for every published message
pub type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Named fan-out stream
pub struct Broadcast<T> {
    topic: String,
    subscribers: Mutex<SlotMap<SubscriptionId, Subscriber<T>>>,
}

impl<T> Broadcast<T> {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            subscribers: Mutex::new(SlotMap::with_key()),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.subscribers.lock().insert(Arc::new(callback));
        tracing::debug!("{}: subscriber added", self.topic);
        id
    }

    /// Returns `false` if `id` was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.lock().remove(id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.lock().is_empty()
    }

    /// Deliver `message` to every subscriber; returns how many received it
    pub fn publish(&self, message: &T) -> usize {
        let subscribers: Vec<Subscriber<T>> = self.subscribers.lock().values().cloned().collect();
        for subscriber in &subscribers {
            subscriber(message);
        }
        subscribers.len()
    }
}

impl<T> std::fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcast")
            .field("topic", &self.topic)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Camera pose message, timestamped at emission
///
/// `position` and `orientation` are expressed in `frame_id`. The controller
/// stamps poses with its attached frame, so consumers resolve them the same
/// way as any other frame-tagged pose; `AnimatedViewController::fixed_pose`
/// gives fixed-frame coordinates directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StampedPose {
    pub frame_id: String,
    pub stamp: SystemTime,
    pub position: Vec3,
    pub orientation: Quat,
}

impl StampedPose {
    /// Build from a view pose
    ///
    /// The orientation is rotated so +X points at the focus and +Z is up,
    /// the convention of pose consumers, instead of the camera's -Z forward.
    pub fn from_view(frame_id: impl Into<String>, stamp: SystemTime, pose: &ViewPose) -> Self {
        let correction = Quat::from_rpy(0.0, FRAC_PI_2, FRAC_PI_2);
        Self {
            frame_id: frame_id.into(),
            stamp,
            position: pose.eye,
            orientation: (pose.orientation() * correction).normalize(),
        }
    }

    /// Unit vector the camera looks along
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::UNIT_X
    }
}

/// Memory layout of read-back pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    #[default]
    Bgr8,
    Rgb8,
    Bgra8,
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Bgr8 | PixelFormat::Rgb8 => 3,
            PixelFormat::Bgra8 | PixelFormat::Rgba8 => 4,
        }
    }
}

/// Tightly packed pixels read back from a render surface
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PixelBox {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl PixelBox {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            data,
        }
    }

    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }

    /// Re-encode as packed BGR, dropping alpha
    pub fn to_bgr8(&self) -> Option<Vec<u8>> {
        if self.data.len() != self.expected_len() {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let data = match self.format {
            PixelFormat::Bgr8 => self.data.clone(),
            PixelFormat::Bgra8 => self
                .data
                .chunks_exact(bpp)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => self
                .data
                .chunks_exact(bpp)
                .flat_map(|px| [px[2], px[1], px[0]])
                .collect(),
        };
        Some(data)
    }
}

/// Wire encoding of every published image
pub const IMAGE_ENCODING: &str = "bgr8";

/// Rendered frame message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewImage {
    pub frame_id: String,
    pub stamp: SystemTime,
    pub width: u32,
    pub height: u32,
    pub encoding: String,
    pub is_bigendian: bool,
    /// Row length in bytes
    pub step: u32,
    pub data: Vec<u8>,
}

impl ViewImage {
    /// Encode `pixels`; `None` if the buffer does not match its dimensions
    pub fn from_pixels(frame_id: impl Into<String>, stamp: SystemTime, pixels: &PixelBox) -> Option<Self> {
        let data = pixels.to_bgr8()?;
        Some(Self {
            frame_id: frame_id.into(),
            stamp,
            width: pixels.width,
            height: pixels.height,
            encoding: IMAGE_ENCODING.to_string(),
            is_bigendian: false,
            step: pixels.width * 3,
            data,
        })
    }
}

/// All outbound streams of one controller
#[derive(Debug)]
pub struct ViewOutputs {
    pub poses: Broadcast<StampedPose>,
    /// Completion notifications; always `true`
    pub finished: Broadcast<bool>,
    pub images: Broadcast<ViewImage>,
}

impl ViewOutputs {
    pub fn new(topics: &crate::config::TopicNames) -> Self {
        Self {
            poses: Broadcast::new(topics.pose.clone()),
            finished: Broadcast::new(topics.finished.clone()),
            images: Broadcast::new(topics.image.clone()),
        }
    }

    /// Send one message to the stream it belongs to
    pub fn deliver(&self, message: &Outbound) -> usize {
        match message {
            Outbound::Pose(pose) => self.poses.publish(pose),
            Outbound::Finished(done) => self.finished.publish(done),
            Outbound::Image(image) => self.images.publish(image),
        }
    }
}

/// A message waiting to be delivered on one of the [`ViewOutputs`] streams
#[derive(Clone, Debug, PartialEq)]
pub enum Outbound {
    Pose(StampedPose),
    Finished(bool),
    Image(ViewImage),
}
