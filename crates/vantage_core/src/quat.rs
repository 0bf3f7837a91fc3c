//! Quaternion for 3D rotations

use crate::Vec3;
use serde::{Deserialize, Serialize};

/// Quaternion for representing 3D rotations
///
/// Camera orientations follow the usual viewer convention: the camera looks
/// along its local -Z axis and local +Y maps to "up" in the image plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Create a new quaternion
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create from axis-angle representation
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let Some(axis) = axis.try_normalize() else {
            return Self::IDENTITY;
        };
        let (s, c) = (angle * 0.5).sin_cos();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: c,
        }
    }

    /// Create from fixed-axis roll (X), pitch (Y) and yaw (Z), applied in that order
    pub fn from_rpy(roll: f32, pitch: f32, yaw: f32) -> Self {
        let qx = Self::from_axis_angle(Vec3::UNIT_X, roll);
        let qy = Self::from_axis_angle(Vec3::UNIT_Y, pitch);
        let qz = Self::from_axis_angle(Vec3::UNIT_Z, yaw);
        (qz * qy * qx).normalize()
    }

    /// Create from three orthonormal basis vectors (the rotation matrix columns)
    pub fn from_axes(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Self {
        let (m00, m10, m20) = (x_axis.x, x_axis.y, x_axis.z);
        let (m01, m11, m21) = (y_axis.x, y_axis.y, y_axis.z);
        let (m02, m12, m22) = (z_axis.x, z_axis.y, z_axis.z);

        let trace = m00 + m11 + m22;

        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self {
                w: 0.25 * s,
                x: (m21 - m12) / s,
                y: (m02 - m20) / s,
                z: (m10 - m01) / s,
            }
        } else if m00 > m11 && m00 > m22 {
            let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
            Self {
                w: (m21 - m12) / s,
                x: 0.25 * s,
                y: (m01 + m10) / s,
                z: (m02 + m20) / s,
            }
        } else if m11 > m22 {
            let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
            Self {
                w: (m02 - m20) / s,
                x: (m01 + m10) / s,
                y: 0.25 * s,
                z: (m12 + m21) / s,
            }
        } else {
            let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
            Self {
                w: (m10 - m01) / s,
                x: (m02 + m20) / s,
                y: (m12 + m21) / s,
                z: 0.25 * s,
            }
        };
        q.normalize()
    }

    /// Camera orientation looking along `direction` with `up` projected into the image plane
    ///
    /// When `up` is parallel to `direction` another perpendicular axis is
    /// picked so the result is always a valid rotation.
    pub fn look_rotation(direction: Vec3, up: Vec3) -> Self {
        let back = (-direction).normalize_or(Vec3::UNIT_Z);
        let right = match up.cross(back).try_normalize() {
            Some(right) => right,
            None => {
                let alternate = if back.z.abs() < 0.9 { Vec3::UNIT_Z } else { Vec3::UNIT_Y };
                alternate.cross(back).normalize_or(Vec3::UNIT_X)
            }
        };
        let true_up = back.cross(right);
        Self::from_axes(right, true_up, back)
    }

    /// Normalize the quaternion
    pub fn normalize(&self) -> Self {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if len < 1e-6 {
            return Self::IDENTITY;
        }
        let inv_len = 1.0 / len;
        Self {
            x: self.x * inv_len,
            y: self.y * inv_len,
            z: self.z * inv_len,
            w: self.w * inv_len,
        }
    }

    /// Get the conjugate (inverse for unit quaternions)
    pub fn conjugate(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Inverse rotation
    pub fn inverse(&self) -> Self {
        self.normalize().conjugate()
    }

    /// Dot product of two quaternions
    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Multiply two quaternions
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
        }
    }

    /// Rotate a vector by this quaternion
    pub fn rotate_vec3(&self, v: Vec3) -> Vec3 {
        let qv = Self::new(v.x, v.y, v.z, 0.0);
        let result = self.mul(&qv).mul(&self.conjugate());
        Vec3::new(result.x, result.y, result.z)
    }

    /// Local X axis (camera "right") in the parent frame
    pub fn x_axis(&self) -> Vec3 {
        Vec3::new(
            1.0 - 2.0 * (self.y * self.y + self.z * self.z),
            2.0 * (self.x * self.y + self.w * self.z),
            2.0 * (self.x * self.z - self.w * self.y),
        )
    }

    /// Local Y axis (camera "up") in the parent frame
    pub fn y_axis(&self) -> Vec3 {
        Vec3::new(
            2.0 * (self.x * self.y - self.w * self.z),
            1.0 - 2.0 * (self.x * self.x + self.z * self.z),
            2.0 * (self.y * self.z + self.w * self.x),
        )
    }

    /// Local Z axis (pointing from the focus back towards the eye) in the parent frame
    pub fn z_axis(&self) -> Vec3 {
        Vec3::new(
            2.0 * (self.x * self.z + self.w * self.y),
            2.0 * (self.y * self.z - self.w * self.x),
            1.0 - 2.0 * (self.x * self.x + self.y * self.y),
        )
    }

    /// Whether both quaternions describe the same rotation within `epsilon`
    pub fn same_rotation(&self, other: Self, epsilon: f32) -> bool {
        1.0 - self.normalize().dot(other.normalize()).abs() <= epsilon
    }
}

impl std::ops::Mul for Quat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Quat::mul(&self, &rhs)
    }
}

impl std::ops::Mul<Vec3> for Quat {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        self.rotate_vec3(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_identity() {
        let q = Quat::IDENTITY;
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!(q.rotate_vec3(v).abs_diff_eq(v, 1e-5));
    }

    #[test]
    fn test_from_axis_angle() {
        // Rotate 90 degrees around Y axis
        let q = Quat::from_axis_angle(Vec3::UNIT_Y, PI / 2.0);
        let rotated = q.rotate_vec3(Vec3::UNIT_X);
        assert!(rotated.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_axes_match_rotation() {
        let q = Quat::from_rpy(0.3, -0.7, 1.1);
        assert!(q.x_axis().abs_diff_eq(q * Vec3::UNIT_X, 1e-5));
        assert!(q.y_axis().abs_diff_eq(q * Vec3::UNIT_Y, 1e-5));
        assert!(q.z_axis().abs_diff_eq(q * Vec3::UNIT_Z, 1e-5));
    }

    #[test]
    fn test_from_axes_roundtrip() {
        let q = Quat::from_rpy(-1.2, 0.4, 2.9);
        let rebuilt = Quat::from_axes(q.x_axis(), q.y_axis(), q.z_axis());
        assert!(rebuilt.same_rotation(q, 1e-5));
    }

    #[test]
    fn test_look_rotation() {
        // Looking along +X with Z up
        let q = Quat::look_rotation(Vec3::UNIT_X, Vec3::UNIT_Z);
        assert!((q * Vec3::NEG_Z).abs_diff_eq(Vec3::UNIT_X, 1e-5));
        assert!(q.y_axis().abs_diff_eq(Vec3::UNIT_Z, 1e-5));
    }

    #[test]
    fn test_look_rotation_degenerate_up() {
        let q = Quat::look_rotation(Vec3::NEG_Z, Vec3::UNIT_Z);
        assert!((q * Vec3::NEG_Z).abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert!((q.x_axis().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_inverse() {
        let q = Quat::from_rpy(0.0, FRAC_PI_2, FRAC_PI_2);
        let v = Vec3::new(1.0, -2.0, 0.5);
        assert!(q.inverse().rotate_vec3(q.rotate_vec3(v)).abs_diff_eq(v, 1e-5));
    }
}
