//! 4x4 affine transform matrix
//!
//! Matrices are stored row-major and act on row vectors (`p' = p * M`), so
//! `A * B` applies `A` first and then `B`. The translation lives in the last
//! row. Read as column-major, the same sixteen floats are the equivalent
//! column-vector matrix, which is what [`From<Mat4> for glam::Mat4`] relies on.

use crate::types::{Quat, Vec3};

/// 4x4 transformation matrix (row-major, row-vector convention)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mat4 {
    /// Matrix data in row-major order
    pub data: [f32; 16],
}

impl Mat4 {
    /// Identity matrix
    pub const IDENTITY: Self = Self {
        data: [
            1.0, 0.0, 0.0, 0.0, // Row 0
            0.0, 1.0, 0.0, 0.0, // Row 1
            0.0, 0.0, 1.0, 0.0, // Row 2
            0.0, 0.0, 0.0, 1.0, // Row 3
        ],
    };

    /// Create a matrix from row-major data
    pub const fn from_rows_array(data: [f32; 16]) -> Self {
        Self { data }
    }

    /// Create translation matrix
    pub fn from_translation(v: Vec3) -> Self {
        Self {
            data: [
                1.0, 0.0, 0.0, 0.0, // Row 0
                0.0, 1.0, 0.0, 0.0, // Row 1
                0.0, 0.0, 1.0, 0.0, // Row 2
                v.x, v.y, v.z, 1.0, // Row 3
            ],
        }
    }

    /// Create scale matrix
    pub fn from_scale(v: Vec3) -> Self {
        Self {
            data: [
                v.x, 0.0, 0.0, 0.0, // Row 0
                0.0, v.y, 0.0, 0.0, // Row 1
                0.0, 0.0, v.z, 0.0, // Row 2
                0.0, 0.0, 0.0, 1.0, // Row 3
            ],
        }
    }

    /// Create rotation matrix from quaternion
    pub fn from_rotation(q: Quat) -> Self {
        Self::from_scale_rotation_translation(Vec3::ONE, q, Vec3::ZERO)
    }

    /// Affine transform `Scale * Rotate * Translate` about the origin
    ///
    /// A point is scaled along the unrotated axes, then rotated, then moved.
    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        let x = rotation.x;
        let y = rotation.y;
        let z = rotation.z;
        let w = rotation.w;

        let x2 = x + x;
        let y2 = y + y;
        let z2 = z + z;

        let xx = x * x2;
        let xy = x * y2;
        let xz = x * z2;
        let yy = y * y2;
        let yz = y * z2;
        let zz = z * z2;
        let wx = w * x2;
        let wy = w * y2;
        let wz = w * z2;

        let sx = scale.x;
        let sy = scale.y;
        let sz = scale.z;

        Self {
            data: [
                (1.0 - (yy + zz)) * sx,
                (xy + wz) * sx,
                (xz - wy) * sx,
                0.0,
                (xy - wz) * sy,
                (1.0 - (xx + zz)) * sy,
                (yz + wx) * sy,
                0.0,
                (xz + wy) * sz,
                (yz - wx) * sz,
                (1.0 - (xx + yy)) * sz,
                0.0,
                translation.x,
                translation.y,
                translation.z,
                1.0,
            ],
        }
    }

    /// Element at `row`, `col`
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * 4 + col]
    }

    /// Multiply two matrices (self * other): apply `self`, then `other`
    pub fn mul(&self, other: &Self) -> Self {
        let a = &self.data;
        let b = &other.data;
        let mut out = [0.0f32; 16];

        for row in 0..4 {
            let a0 = a[row * 4];
            let a1 = a[row * 4 + 1];
            let a2 = a[row * 4 + 2];
            let a3 = a[row * 4 + 3];
            for col in 0..4 {
                out[row * 4 + col] =
                    a0 * b[col] + a1 * b[4 + col] + a2 * b[8 + col] + a3 * b[12 + col];
            }
        }

        Self { data: out }
    }

    /// Transpose, for consumers that expect the column-vector convention
    pub fn transpose(&self) -> Self {
        let m = &self.data;
        Self {
            data: [
                m[0], m[4], m[8], m[12], //
                m[1], m[5], m[9], m[13], //
                m[2], m[6], m[10], m[14], //
                m[3], m[7], m[11], m[15],
            ],
        }
    }

    /// Inverse of an affine matrix (upper 3x3 invertible, last column `0 0 0 1`)
    ///
    /// Returns `None` when the linear part is singular.
    pub fn inverse_affine(&self) -> Option<Self> {
        let m = &self.data;
        let (a, b, c) = (m[0], m[1], m[2]);
        let (d, e, f) = (m[4], m[5], m[6]);
        let (g, h, i) = (m[8], m[9], m[10]);

        let co00 = e * i - f * h;
        let co01 = f * g - d * i;
        let co02 = d * h - e * g;
        let det = a * co00 + b * co01 + c * co02;
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let r = [
            co00 * inv_det,
            (c * h - b * i) * inv_det,
            (b * f - c * e) * inv_det,
            co01 * inv_det,
            (a * i - c * g) * inv_det,
            (c * d - a * f) * inv_det,
            co02 * inv_det,
            (b * g - a * h) * inv_det,
            (a * e - b * d) * inv_det,
        ];

        let (tx, ty, tz) = (m[12], m[13], m[14]);
        Some(Self {
            data: [
                r[0],
                r[1],
                r[2],
                0.0,
                r[3],
                r[4],
                r[5],
                0.0,
                r[6],
                r[7],
                r[8],
                0.0,
                -(tx * r[0] + ty * r[3] + tz * r[6]),
                -(tx * r[1] + ty * r[4] + tz * r[7]),
                -(tx * r[2] + ty * r[5] + tz * r[8]),
                1.0,
            ],
        })
    }

    /// Transform a point by this matrix
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.data;
        Vec3 {
            x: p.x * m[0] + p.y * m[4] + p.z * m[8] + m[12],
            y: p.x * m[1] + p.y * m[5] + p.z * m[9] + m[13],
            z: p.x * m[2] + p.y * m[6] + p.z * m[10] + m[14],
        }
    }

    /// Transform a direction by this matrix (ignores translation)
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let m = &self.data;
        Vec3 {
            x: v.x * m[0] + v.y * m[4] + v.z * m[8],
            y: v.x * m[1] + v.y * m[5] + v.z * m[9],
            z: v.x * m[2] + v.y * m[6] + v.z * m[10],
        }
    }

    /// Translation part (last row)
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.data[12], self.data[13], self.data[14])
    }

    /// Check that every element is within `epsilon` of `other`
    pub fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    /// Get matrix as flat array for GPU upload
    pub fn as_array(&self) -> &[f32; 16] {
        &self.data
    }

    /// Get matrix as 4x3 for GPU upload (drops the constant last column)
    pub fn as_4x3(&self) -> [f32; 12] {
        [
            self.data[0],
            self.data[1],
            self.data[2],
            self.data[4],
            self.data[5],
            self.data[6],
            self.data[8],
            self.data[9],
            self.data[10],
            self.data[12],
            self.data[13],
            self.data[14],
        ]
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Self) -> Self::Output {
        Mat4::mul(&self, &rhs)
    }
}

impl From<Mat4> for glam::Mat4 {
    fn from(m: Mat4) -> Self {
        glam::Mat4::from_cols_array(&m.data)
    }
}

impl From<glam::Mat4> for Mat4 {
    fn from(m: glam::Mat4) -> Self {
        Self {
            data: m.to_cols_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec3_near(actual: Vec3, expected: Vec3) {
        assert!(
            actual.distance(&expected) < 1e-5,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_mat4_identity() {
        let m = Mat4::IDENTITY;
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(1, 1), 1.0);
        assert_eq!(m.get(2, 2), 1.0);
        assert_eq!(m.get(3, 3), 1.0);
    }

    #[test]
    fn test_mat4_translation() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_vec3_near(m.transform_point(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
        assert_vec3_near(m.transform_vector(Vec3::X), Vec3::X);
    }

    #[test]
    fn test_mat4_scale() {
        let m = Mat4::from_scale(Vec3::new(2.0, 3.0, 4.0));
        let p = m.transform_point(Vec3::ONE);
        assert_vec3_near(p, Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_rotation_about_y() {
        let m = Mat4::from_rotation(Quat::from_axis_angle(Vec3::Y, FRAC_PI_2));
        assert_vec3_near(m.transform_point(Vec3::X), Vec3::new(0.0, 0.0, -1.0));
        assert_vec3_near(m.transform_point(Vec3::Z), Vec3::X);
    }

    #[test]
    fn test_mul_applies_left_first() {
        let translate = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let rotate = Mat4::from_rotation(Quat::from_axis_angle(Vec3::Y, FRAC_PI_2));

        // Translate then rotate: (1,0,0) -> (0,0,-1)
        let p = (translate * rotate).transform_point(Vec3::ZERO);
        assert_vec3_near(p, Vec3::new(0.0, 0.0, -1.0));

        // Rotate then translate: origin stays, then moves to (1,0,0)
        let p = (rotate * translate).transform_point(Vec3::ZERO);
        assert_vec3_near(p, Vec3::X);
    }

    #[test]
    fn test_srt_order() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 2.0, 2.0),
            Quat::from_axis_angle(Vec3::Y, FRAC_PI_2),
            Vec3::new(0.0, 5.0, 0.0),
        );
        let composed = Mat4::from_scale(Vec3::new(2.0, 2.0, 2.0))
            * Mat4::from_rotation(Quat::from_axis_angle(Vec3::Y, FRAC_PI_2))
            * Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
        assert!(m.abs_diff_eq(&composed, 1e-6));
        assert_vec3_near(m.transform_point(Vec3::X), Vec3::new(0.0, 5.0, -2.0));
    }

    #[test]
    fn test_mat4_multiply_identity() {
        let a = Mat4::IDENTITY;
        let b = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(a.mul(&b).data, b.data);
        assert_eq!(b.mul(&a).data, b.data);
    }

    #[test]
    fn test_inverse_affine() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(1.0, 2.0, 0.5),
            Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.8),
            Vec3::new(-3.0, 4.0, 10.0),
        );
        let inv = m.inverse_affine().expect("invertible");
        assert!((m * inv).abs_diff_eq(&Mat4::IDENTITY, 1e-5));

        let singular = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        assert!(singular.inverse_affine().is_none());
    }

    #[test]
    fn test_transpose() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let t = m.transpose();
        assert_eq!(t.get(0, 3), 1.0);
        assert_eq!(t.get(1, 3), 2.0);
        assert_eq!(t.get(2, 3), 3.0);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn test_glam_conversion_preserves_transform() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(1.0, 1.5, 1.0),
            Quat::from_axis_angle(Vec3::Z, 0.4),
            Vec3::new(3.0, -1.0, 2.0),
        );
        let p = Vec3::new(0.5, 2.0, -1.0);
        let g: glam::Mat4 = m.into();
        let expected = m.transform_point(p);
        let actual = Vec3::from(g.transform_point3(p.into()));
        assert_vec3_near(actual, expected);
        assert_eq!(Mat4::from(g), m);
    }

    #[test]
    fn test_as_4x3() {
        let m = Mat4::from_translation(Vec3::new(7.0, 8.0, 9.0));
        let packed = m.as_4x3();
        assert_eq!(&packed[9..], &[7.0, 8.0, 9.0]);
    }
}
