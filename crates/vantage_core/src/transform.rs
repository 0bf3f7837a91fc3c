//! Rigid transforms between coordinate frames

use crate::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a child frame expressed in its parent frame
///
/// Applying the transform maps child-local coordinates into the parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub position: Vec3,
    pub orientation: Quat,
}

impl RigidTransform {
    pub const IDENTITY: RigidTransform = RigidTransform {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation: orientation.normalize(),
        }
    }

    pub fn from_translation(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Child-local point to parent coordinates
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.orientation * p + self.position
    }

    /// Child-local direction to parent coordinates (ignores translation)
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.orientation * v
    }

    /// Parent point to child-local coordinates
    pub fn inverse_transform_point(&self, p: Vec3) -> Vec3 {
        self.orientation.inverse() * (p - self.position)
    }

    /// Parent direction to child-local coordinates
    pub fn inverse_transform_vector(&self, v: Vec3) -> Vec3 {
        self.orientation.inverse() * v
    }

    pub fn inverse(&self) -> Self {
        let orientation = self.orientation.inverse();
        Self {
            position: -(orientation * self.position),
            orientation,
        }
    }

    /// `self ∘ child`: first apply `child`, then `self`
    pub fn compose(&self, child: &RigidTransform) -> Self {
        Self {
            position: self.transform_point(child.position),
            orientation: (self.orientation * child.orientation).normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_inverse_undoes_transform() {
        let t = RigidTransform::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rpy(0.2, 0.4, FRAC_PI_2));
        let p = Vec3::new(-4.0, 0.5, 2.0);
        assert!(t.inverse_transform_point(t.transform_point(p)).abs_diff_eq(p, 1e-5));
        assert!(t.inverse().transform_point(t.transform_point(p)).abs_diff_eq(p, 1e-5));
    }

    #[test]
    fn test_compose() {
        let a = RigidTransform::new(Vec3::new(1.0, 0.0, 0.0), Quat::from_rpy(0.0, 0.0, FRAC_PI_2));
        let b = RigidTransform::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let p = Vec3::new(0.3, 0.2, 0.1);
        let composed = a.compose(&b).transform_point(p);
        assert!(composed.abs_diff_eq(a.transform_point(b.transform_point(p)), 1e-5));
    }
}
