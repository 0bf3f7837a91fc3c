//! Vantage Core
//!
//! Stateless geometry shared by the camera animation crates:
//!
//! - [`Vec3`] and [`Quat`] math
//! - [`RigidTransform`] for composing and inverting frame transforms
//! - [`ViewPose`], the eye/focus/up camera pose with derived orientation

mod pose;
mod quat;
mod transform;
mod vec;

pub use pose::ViewPose;
pub use quat::Quat;
pub use transform::RigidTransform;
pub use vec::Vec3;
