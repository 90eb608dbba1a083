//! Value types for keyframe data: vectors, quaternions, and interpolation

/// Quaternion representation for rotations
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Create a new quaternion
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about `axis` (the axis is normalized first)
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let len = axis.length();
        if len == 0.0 {
            return Self::IDENTITY;
        }
        let (sin, cos) = (angle * 0.5).sin_cos();
        let s = sin / len;
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: cos,
        }
    }

    /// Four-component dot product
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Euclidean norm
    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Normalize the quaternion
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
                w: self.w / len,
            }
        } else {
            Self::IDENTITY
        }
    }

    /// Check whether the norm is within `epsilon` of one
    pub fn is_normalized(&self, epsilon: f32) -> bool {
        (self.length() - 1.0).abs() <= epsilon
    }

    /// Spherical linear interpolation along the shorter arc
    ///
    /// `t = 0` yields `self` and `t = 1` yields `other` (or its negation,
    /// which is the same rotation).
    pub fn slerp(&self, other: &Self, t: f32) -> Self {
        let dot = self.dot(other);

        // Negate one quaternion to take the shorter arc
        let (other, dot) = if dot < 0.0 {
            (
                Self {
                    x: -other.x,
                    y: -other.y,
                    z: -other.z,
                    w: -other.w,
                },
                -dot,
            )
        } else {
            (*other, dot)
        };

        // Nearly parallel: sin(theta) underflows, fall back to normalized lerp
        if dot > 0.9995 {
            return Self {
                x: self.x.lerp(&other.x, t),
                y: self.y.lerp(&other.y, t),
                z: self.z.lerp(&other.z, t),
                w: self.w.lerp(&other.w, t),
            }
            .normalize();
        }

        let theta_0 = dot.min(1.0).acos();
        let sin_theta_0 = theta_0.sin();

        let s0 = ((1.0 - t) * theta_0).sin() / sin_theta_0;
        let s1 = (t * theta_0).sin() / sin_theta_0;

        Self {
            x: s0 * self.x + s1 * other.x,
            y: s0 * self.y + s1 * other.y,
            z: s0 * self.z + s1 * other.z,
            w: s0 * self.w + s1 * other.w,
        }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<glam::Quat> for Quat {
    fn from(q: glam::Quat) -> Self {
        Self::new(q.x, q.y, q.z, q.w)
    }
}

impl From<Quat> for glam::Quat {
    fn from(q: Quat) -> Self {
        glam::Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

/// 3D vector for positions and scales
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Zero vector
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Unit scale vector
    pub const ONE: Self = Self {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    /// Unit X axis
    pub const X: Self = Self::new(1.0, 0.0, 0.0);

    /// Unit Y axis
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);

    /// Unit Z axis
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Create a new vector
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Distance to another point
    pub fn distance(&self, other: &Self) -> f32 {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z).length()
    }
}

impl From<glam::Vec3> for Vec3 {
    fn from(v: glam::Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for glam::Vec3 {
    fn from(v: Vec3) -> Self {
        glam::Vec3::new(v.x, v.y, v.z)
    }
}

/// Trait for types that can be linearly interpolated
pub trait Lerp: Clone {
    /// Linear interpolation between self and other
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            x: self.x.lerp(&other.x, t),
            y: self.y.lerp(&other.y, t),
            z: self.z.lerp(&other.z, t),
        }
    }
}

impl Lerp for Quat {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        // Rotations are never component-lerped
        self.slerp(other, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_vec3_lerp() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10.0, 20.0, 30.0);

        let mid = a.lerp(&b, 0.5);
        assert!((mid.x - 5.0).abs() < 0.001);
        assert!((mid.y - 10.0).abs() < 0.001);
        assert!((mid.z - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_quat_identity() {
        let q = Quat::IDENTITY;
        assert_eq!(q.x, 0.0);
        assert_eq!(q.y, 0.0);
        assert_eq!(q.z, 0.0);
        assert_eq!(q.w, 1.0);
    }

    #[test]
    fn test_quat_normalize() {
        let q = Quat::new(1.0, 1.0, 1.0, 1.0);
        assert!(q.normalize().is_normalized(0.001));
        assert_eq!(Quat::new(0.0, 0.0, 0.0, 0.0).normalize(), Quat::IDENTITY);
    }

    #[test]
    fn test_from_axis_angle() {
        let q = Quat::from_axis_angle(Vec3::new(0.0, 2.0, 0.0), FRAC_PI_2);
        assert!(q.x.abs() < 1e-6);
        assert!((q.y - 0.5_f32.sqrt()).abs() < 0.001);
        assert!((q.w - 0.5_f32.sqrt()).abs() < 0.001);
        assert!(q.is_normalized(1e-6));
    }

    #[test]
    fn test_slerp_endpoints_exact() {
        let a = Quat::from_axis_angle(Vec3::Y, 0.3);
        let b = Quat::from_axis_angle(Vec3::X, 1.2);
        assert_eq!(a.slerp(&b, 0.0), a);

        let end = a.slerp(&b, 1.0);
        assert!((end.dot(&b).abs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_slerp_midpoint_constant_angle() {
        let a = Quat::IDENTITY;
        let b = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2);
        let mid = a.slerp(&b, 0.5);
        let expected = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2 * 0.5);
        assert!((mid.dot(&expected) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_slerp_shorter_arc() {
        let a = Quat::from_axis_angle(Vec3::Y, 0.1);
        let b = Quat::from_axis_angle(Vec3::Y, 0.2);
        let negated_b = Quat::new(-b.x, -b.y, -b.z, -b.w);
        let mid = a.slerp(&negated_b, 0.5);
        let expected = Quat::from_axis_angle(Vec3::Y, 0.15);
        assert!((mid.dot(&expected).abs() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_glam_round_trip() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.7);
        let g: glam::Quat = q.into();
        assert_eq!(Quat::from(g), q);

        let v = Vec3::new(1.0, -2.0, 3.5);
        let g: glam::Vec3 = v.into();
        assert_eq!(Vec3::from(g), v);
    }
}
