//! Frame transform adapter
//!
//! The camera pose is stored relative to an *attached* reference frame. This
//! module owns the attachment and converts poses between the fixed world
//! frame, the attached frame and arbitrary source frames.

use crate::error::{Result, ViewError};
use rustc_hash::FxHashMap;
use std::time::SystemTime;
use vantage_core::{RigidTransform, Vec3, ViewPose};

/// Name of the fixed world frame; always resolves to the identity
pub const FIXED_FRAME: &str = "<Fixed Frame>";

/// Injected frame graph capability
///
/// Returns the transform of `frame` expressed in the fixed frame at `stamp`,
/// or `None` if it is unknown or not available yet.
pub trait FrameLookup: Send + Sync {
    fn lookup_transform(&self, frame: &str, stamp: SystemTime) -> Option<RigidTransform>;
}

impl<F> FrameLookup for F
where
    F: Fn(&str, SystemTime) -> Option<RigidTransform> + Send + Sync,
{
    fn lookup_transform(&self, frame: &str, stamp: SystemTime) -> Option<RigidTransform> {
        self(frame, stamp)
    }
}

/// Frame graph of static, named transforms
#[derive(Clone, Debug, Default)]
pub struct StaticFrameGraph {
    frames: FxHashMap<String, RigidTransform>,
}

impl StaticFrameGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_frame(mut self, name: impl Into<String>, transform: RigidTransform) -> Self {
        self.insert(name, transform);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, transform: RigidTransform) -> Option<RigidTransform> {
        self.frames.insert(name.into(), transform)
    }

    pub fn remove(&mut self, name: &str) -> Option<RigidTransform> {
        self.frames.remove(name)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameLookup for StaticFrameGraph {
    fn lookup_transform(&self, frame: &str, _stamp: SystemTime) -> Option<RigidTransform> {
        if frame == FIXED_FRAME {
            return Some(RigidTransform::IDENTITY);
        }
        self.frames.get(frame).copied()
    }
}

/// Reject ids that can never name a frame
pub fn validate_frame_id(frame: &str) -> Result<()> {
    if frame == FIXED_FRAME {
        return Ok(());
    }
    if frame.trim().is_empty() || frame.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ViewError::MalformedFrameId(frame.to_string()));
    }
    Ok(())
}

/// Look up `frame` in the fixed frame
pub fn resolve(lookup: &dyn FrameLookup, frame: &str, stamp: SystemTime) -> Result<RigidTransform> {
    validate_frame_id(frame)?;
    if frame == FIXED_FRAME {
        return Ok(RigidTransform::IDENTITY);
    }
    lookup
        .lookup_transform(frame, stamp)
        .ok_or_else(|| ViewError::FrameLookup {
            frame: frame.to_string(),
        })
}

/// Convert a pose held in `from` into `to`, passing through the fixed frame
pub fn convert_pose(pose: &ViewPose, from: &RigidTransform, to: &RigidTransform) -> ViewPose {
    pose.reexpressed(from, to)
}

/// Old and new reference transforms of a successful reattachment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reattachment {
    pub old: RigidTransform,
    pub new: RigidTransform,
}

impl Reattachment {
    /// Re-express a pose stored against the old reference in the new one
    pub fn apply(&self, pose: &ViewPose) -> ViewPose {
        convert_pose(pose, &self.old, &self.new)
    }
}

/// Attached frame and its transform in the fixed frame
#[derive(Clone, Debug, PartialEq)]
pub struct AttachmentState {
    frame: String,
    reference: RigidTransform,
}

impl AttachmentState {
    /// Attachment to `frame` with an identity reference until it is resolved
    pub fn new(frame: impl Into<String>) -> Self {
        Self {
            frame: frame.into(),
            reference: RigidTransform::IDENTITY,
        }
    }

    pub fn frame(&self) -> &str {
        &self.frame
    }

    pub fn reference(&self) -> &RigidTransform {
        &self.reference
    }

    /// Re-read the attached frame's current transform
    ///
    /// Poses stay attached, so a moving frame carries the camera with it.
    /// On lookup failure the previous transform is kept.
    pub fn refresh(&mut self, lookup: &dyn FrameLookup, stamp: SystemTime) -> bool {
        match resolve(lookup, &self.frame, stamp) {
            Ok(reference) => {
                self.reference = reference;
                true
            }
            Err(err) => {
                tracing::trace!("AttachmentState: refresh skipped: {}", err);
                false
            }
        }
    }

    /// Switch the attachment to `frame`
    ///
    /// Fails without touching anything if the frame cannot be resolved. On
    /// success the caller must re-express every stored pose with the returned
    /// [`Reattachment`].
    pub fn reattach(
        &mut self,
        frame: &str,
        lookup: &dyn FrameLookup,
        stamp: SystemTime,
    ) -> Result<Reattachment> {
        let new = resolve(lookup, frame, stamp)?;
        let old = self.reference;
        self.frame = frame.to_string();
        self.reference = new;
        Ok(Reattachment { old, new })
    }

    /// Transform of a message's source frame; an empty id means the attached frame
    pub fn source_transform(
        &self,
        frame: &str,
        lookup: &dyn FrameLookup,
        stamp: SystemTime,
    ) -> Result<RigidTransform> {
        if frame.is_empty() || frame == self.frame {
            return Ok(self.reference);
        }
        resolve(lookup, frame, stamp)
    }

    pub fn fixed_to_attached(&self, point: Vec3) -> Vec3 {
        self.reference.inverse_transform_point(point)
    }

    pub fn attached_to_fixed(&self, point: Vec3) -> Vec3 {
        self.reference.transform_point(point)
    }

    /// A point given in a frame with transform `source`, expressed in the attached frame
    pub fn import_point(&self, point: Vec3, source: &RigidTransform) -> Vec3 {
        self.fixed_to_attached(source.transform_point(point))
    }

    /// A direction given in a frame with transform `source`, expressed in the attached frame
    pub fn import_vector(&self, vector: Vec3, source: &RigidTransform) -> Vec3 {
        self.reference
            .inverse_transform_vector(source.transform_vector(vector))
    }

    /// A whole pose given in a frame with transform `source`
    pub fn import_pose(&self, pose: &ViewPose, source: &RigidTransform) -> ViewPose {
        convert_pose(pose, source, &self.reference)
    }

    /// An attached-frame pose expressed in the fixed frame
    pub fn export_pose(&self, pose: &ViewPose) -> ViewPose {
        convert_pose(pose, &self.reference, &RigidTransform::IDENTITY)
    }
}
