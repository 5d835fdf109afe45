//! # Matrix4
//!
//! A 4x4 column-major affine/projective transform. This is the matrix type every
//! drawable's model transform, the camera view and the projection are expressed in.
//!
//! `a.multiply(&b)` computes `a * b`; applying the result to a point is the same as
//! applying `b` first and then `a`. This matches the shader's
//! `projection * view * rotate * model * position` ordering.

use cgmath::{InnerSpace, Point3, Vector3};
use log::{error, warn};

use crate::error::{ViewerError, ViewerResult};

use super::matrix3::rotation_entries;

/// A 4x4 matrix stored in column-major order.
///
/// Element `(row, col)` lives at `elements[col * 4 + row]`; translation occupies
/// `elements[12..15]`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Matrix4 {
    /// The sixteen matrix entries, column by column
    pub elements: [f32; 16],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<cgmath::Matrix4<f32>> for Matrix4 {
    fn from(m: cgmath::Matrix4<f32>) -> Self {
        let columns: [[f32; 4]; 4] = m.into();
        let mut elements = [0.0; 16];
        for (col, column) in columns.iter().enumerate() {
            elements[col * 4..col * 4 + 4].copy_from_slice(column);
        }
        Self { elements }
    }
}

impl From<Matrix4> for cgmath::Matrix4<f32> {
    fn from(m: Matrix4) -> Self {
        let e = m.elements;
        cgmath::Matrix4::from([
            [e[0], e[1], e[2], e[3]],
            [e[4], e[5], e[6], e[7]],
            [e[8], e[9], e[10], e[11]],
            [e[12], e[13], e[14], e[15]],
        ])
    }
}

impl Matrix4 {
    /// Creates a new identity matrix.
    #[rustfmt::skip]
    pub fn identity() -> Self {
        Self {
            elements: [
                1.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Creates a matrix from raw column-major elements.
    pub fn from_elements(elements: [f32; 16]) -> Self {
        Self { elements }
    }

    /// Creates a pure translation matrix.
    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::identity();
        m.set_translate(x, y, z);
        m
    }

    /// Creates a pure scale matrix.
    pub fn from_scale(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::identity();
        m.set_scale(x, y, z);
        m
    }

    /// Reads the entry at `(row, col)`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.elements[col * 4 + row]
    }

    /// Resets this matrix to the multiplicative identity.
    pub fn set_identity(&mut self) -> &mut Self {
        self.elements = Self::identity().elements;
        self
    }

    /// Copies all entries from another matrix.
    pub fn set(&mut self, source: &Matrix4) -> &mut Self {
        self.elements = source.elements;
        self
    }

    /// Post-multiplies this matrix by `other` (`self = self * other`).
    ///
    /// The product is accumulated in a temporary, so multiplying a matrix by a copy
    /// of itself is fine.
    pub fn multiply(&mut self, other: &Matrix4) -> &mut Self {
        let a = self.elements;
        let b = &other.elements;
        let mut result = [0.0f32; 16];

        for col in 0..4 {
            for row in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += a[k * 4 + row] * b[col * 4 + k];
                }
                result[col * 4 + row] = sum;
            }
        }

        self.elements = result;
        self
    }

    /// Alias for [`Matrix4::multiply`].
    pub fn concat(&mut self, other: &Matrix4) -> &mut Self {
        self.multiply(other)
    }

    /// Transposes this matrix in place.
    pub fn transpose(&mut self) -> &mut Self {
        let e = &mut self.elements;
        e.swap(1, 4);
        e.swap(2, 8);
        e.swap(3, 12);
        e.swap(6, 9);
        e.swap(7, 13);
        e.swap(11, 14);
        self
    }

    /// Determinant of the upper-left 3x3 (linear) part.
    ///
    /// This is the quantity that decides whether a normal matrix exists for this
    /// transform. Use [`Matrix4::full_determinant`] for the 4x4 determinant.
    pub fn determinant(&self) -> f32 {
        let e = &self.elements;

        e[0] * (e[5] * e[10] - e[9] * e[6]) - e[4] * (e[1] * e[10] - e[9] * e[2])
            + e[8] * (e[1] * e[6] - e[5] * e[2])
    }

    /// Determinant of the whole 4x4 matrix, by cofactor expansion along row 0.
    pub fn full_determinant(&self) -> f32 {
        (0..4)
            .map(|col| self.at(0, col) * self.cofactor(0, col))
            .sum()
    }

    /// Sets this matrix to the inverse of `source` (adjugate over determinant).
    ///
    /// # Errors
    /// Returns [`ViewerError::SingularMatrix`] and leaves `self` unmodified when the
    /// 4x4 determinant of `source` is exactly zero.
    pub fn set_inverse_of(&mut self, source: &Matrix4) -> ViewerResult<&mut Self> {
        let det = source.full_determinant();
        if det == 0.0 {
            error!("Matrix4: determinant is zero, cannot invert");
            return Err(ViewerError::SingularMatrix);
        }

        let inv_det = 1.0 / det;
        let mut result = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                // adj(row, col) = cofactor(col, row)
                result[col * 4 + row] = source.cofactor(col, row) * inv_det;
            }
        }

        self.elements = result;
        Ok(self)
    }

    /// Inverts this matrix in place.
    ///
    /// # Errors
    /// Returns [`ViewerError::SingularMatrix`] and leaves `self` unmodified when the
    /// matrix is singular.
    pub fn invert(&mut self) -> ViewerResult<&mut Self> {
        let source = *self;
        self.set_inverse_of(&source)
    }

    /// Sets this matrix to a translation.
    pub fn set_translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.set_identity();
        self.elements[12] = x;
        self.elements[13] = y;
        self.elements[14] = z;
        self
    }

    /// Post-multiplies by a translation.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.multiply(&Matrix4::from_translation(x, y, z))
    }

    /// Sets this matrix to a scale.
    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.set_identity();
        self.elements[0] = x;
        self.elements[5] = y;
        self.elements[10] = z;
        self
    }

    /// Post-multiplies by a scale.
    pub fn scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.multiply(&Matrix4::from_scale(x, y, z))
    }

    /// Sets this matrix to a rotation of `angle` degrees around `(x, y, z)`.
    ///
    /// The axis is normalized internally. A zero-length or non-finite axis or angle
    /// resets to identity and logs a warning.
    pub fn set_rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) -> &mut Self {
        self.set_identity();
        match rotation_entries(angle, x, y, z) {
            Some(r) => {
                for col in 0..3 {
                    for row in 0..3 {
                        self.elements[col * 4 + row] = r[col * 3 + row];
                    }
                }
            }
            None => warn!("Matrix4: rotation axis or angle is degenerate, using identity"),
        }
        self
    }

    /// Post-multiplies by a rotation of `angle` degrees around `(x, y, z)`.
    pub fn rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) -> &mut Self {
        let mut r = Matrix4::identity();
        r.set_rotate(angle, x, y, z);
        self.multiply(&r)
    }

    /// Sets this matrix to a right-handed perspective projection.
    ///
    /// # Arguments
    /// * `fovy` - Vertical field of view in degrees
    /// * `aspect` - Width over height
    /// * `near`, `far` - Clip plane distances, both positive
    ///
    /// # Errors
    /// Returns [`ViewerError::DegenerateTransform`] without touching `self` when the
    /// parameters would divide by zero.
    pub fn set_perspective(
        &mut self,
        fovy: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> ViewerResult<&mut Self> {
        if near == far || aspect == 0.0 {
            error!("Matrix4: null frustum (near={near}, far={far}, aspect={aspect})");
            return Err(ViewerError::DegenerateTransform("null frustum"));
        }
        if near <= 0.0 {
            error!("Matrix4: near plane must be positive, got {near}");
            return Err(ViewerError::DegenerateTransform("near plane"));
        }

        let half = fovy.to_radians() / 2.0;
        let s = half.sin();
        if s == 0.0 {
            error!("Matrix4: field of view {fovy} collapses the frustum");
            return Err(ViewerError::DegenerateTransform("field of view"));
        }

        let rd = 1.0 / (far - near);
        let ct = half.cos() / s;

        self.elements = [0.0; 16];
        self.elements[0] = ct / aspect;
        self.elements[5] = ct;
        self.elements[10] = -(far + near) * rd;
        self.elements[11] = -1.0;
        self.elements[14] = -2.0 * near * far * rd;

        Ok(self)
    }

    /// Sets this matrix to a view transform looking from `eye` towards `at`.
    ///
    /// # Errors
    /// Returns [`ViewerError::DegenerateTransform`] when `eye == at`, `up` is
    /// parallel to the view direction, or any input is not finite; `self` is left
    /// unmodified.
    pub fn set_look_at(
        &mut self,
        eye: Point3<f32>,
        at: Point3<f32>,
        up: Vector3<f32>,
    ) -> ViewerResult<&mut Self> {
        let f = at - eye;
        // is_normal also rejects NaN and infinity
        if !f.magnitude2().is_normal() {
            warn!("Matrix4: look-at target equals eye position or is not finite");
            return Err(ViewerError::DegenerateTransform("look-at direction"));
        }
        let f = f.normalize();

        let s = f.cross(up);
        if !s.magnitude2().is_normal() {
            warn!("Matrix4: up vector is parallel to the view direction");
            return Err(ViewerError::DegenerateTransform("look-at up vector"));
        }
        let s = s.normalize();
        let u = s.cross(f);

        #[rustfmt::skip]
        let elements = [
            s.x, u.x, -f.x, 0.0,
            s.y, u.y, -f.y, 0.0,
            s.z, u.z, -f.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        self.elements = elements;

        Ok(self.translate(-eye.x, -eye.y, -eye.z))
    }

    /// Transforms a point (w = 1) and returns its xyz, without perspective divide.
    pub fn multiply_vector3(&self, v: [f32; 3]) -> [f32; 3] {
        let r = self.multiply_vector4([v[0], v[1], v[2], 1.0]);
        [r[0], r[1], r[2]]
    }

    /// Transforms a homogeneous vector.
    pub fn multiply_vector4(&self, v: [f32; 4]) -> [f32; 4] {
        let e = &self.elements;
        let mut r = [0.0f32; 4];
        for (row, out) in r.iter_mut().enumerate() {
            *out = e[row] * v[0] + e[4 + row] * v[1] + e[8 + row] * v[2] + e[12 + row] * v[3];
        }
        r
    }

    /// Signed 3x3 minor of the entry at `(row, col)`.
    fn cofactor(&self, row: usize, col: usize) -> f32 {
        let mut m = [0.0f32; 9];
        let mut i = 0;
        for c in (0..4).filter(|&c| c != col) {
            for r in (0..4).filter(|&r| r != row) {
                m[i] = self.at(r, c);
                i += 1;
            }
        }
        let minor = m[0] * (m[4] * m[8] - m[7] * m[5]) - m[3] * (m[1] * m[8] - m[7] * m[2])
            + m[6] * (m[1] * m[5] - m[4] * m[2]);
        if (row + col) % 2 == 0 {
            minor
        } else {
            -minor
        }
    }
}
