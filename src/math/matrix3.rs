//! # Matrix3
//!
//! A 3x3 column-major matrix, used mostly for normal-matrix calculations.
//!
//! Every mutating method returns `&mut Self` so calls can be chained. Methods
//! that can fail on degenerate input return a [`ViewerResult`] instead and leave
//! the receiver untouched when they fail.

use log::{error, warn};

use crate::error::{ViewerError, ViewerResult};

use super::Matrix4;

/// A 3x3 matrix stored in column-major order.
///
/// Element `(row, col)` lives at `elements[col * 3 + row]`, the same layout
/// WGSL/GLSL expect for `mat3x3` uploads.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Matrix3 {
    /// The nine matrix entries, column by column
    pub elements: [f32; 9],
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix3 {
    /// Creates a new identity matrix.
    pub fn identity() -> Self {
        Self {
            elements: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Creates a matrix from raw column-major elements.
    pub fn from_elements(elements: [f32; 9]) -> Self {
        Self { elements }
    }

    /// Reads the entry at `(row, col)`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.elements[col * 3 + row]
    }

    /// Resets this matrix to the multiplicative identity.
    pub fn set_identity(&mut self) -> &mut Self {
        self.elements = Self::identity().elements;
        self
    }

    /// Copies all entries from another matrix.
    pub fn set(&mut self, source: &Matrix3) -> &mut Self {
        self.elements = source.elements;
        self
    }

    /// Copies the upper-left 3x3 (linear) part of a 4x4 matrix, dropping translation.
    pub fn set_from_matrix4(&mut self, source: &Matrix4) -> &mut Self {
        let src = &source.elements;
        let dst = &mut self.elements;

        dst[0] = src[0];
        dst[1] = src[1];
        dst[2] = src[2];

        dst[3] = src[4];
        dst[4] = src[5];
        dst[5] = src[6];

        dst[6] = src[8];
        dst[7] = src[9];
        dst[8] = src[10];

        self
    }

    /// Sets this matrix to a rotation of `angle` degrees around the axis `(x, y, z)`.
    ///
    /// The axis is normalized when its length is not already 1. A zero-length axis
    /// has no direction, so the matrix is reset to identity and a warning is logged.
    ///
    /// # Arguments
    /// * `angle` - Rotation angle in degrees
    /// * `x`, `y`, `z` - Components of the rotation axis
    pub fn set_rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) -> &mut Self {
        match rotation_entries(angle, x, y, z) {
            Some(r) => {
                self.elements = r;
            }
            None => {
                warn!("Matrix3: rotation axis or angle is degenerate, using identity");
                self.set_identity();
            }
        }
        self
    }

    /// Returns the determinant.
    pub fn determinant(&self) -> f32 {
        let e = &self.elements;

        e[0] * (e[4] * e[8] - e[7] * e[5]) - e[3] * (e[1] * e[8] - e[7] * e[2])
            + e[6] * (e[1] * e[5] - e[4] * e[2])
    }

    /// Sets this matrix to the inverse of `source` using the classical adjoint.
    ///
    /// # Errors
    /// Returns [`ViewerError::SingularMatrix`] and leaves `self` unmodified when the
    /// determinant of `source` is exactly zero.
    pub fn set_inverse_of(&mut self, source: &Matrix3) -> ViewerResult<&mut Self> {
        let det = source.determinant();
        if det == 0.0 {
            error!("Matrix3: determinant is zero, cannot invert");
            return Err(ViewerError::SingularMatrix);
        }

        let s = &source.elements;
        let inv_det = 1.0 / det;

        self.elements = [
            (s[4] * s[8] - s[7] * s[5]) * inv_det,
            (s[7] * s[2] - s[1] * s[8]) * inv_det,
            (s[1] * s[5] - s[4] * s[2]) * inv_det,
            (s[6] * s[5] - s[3] * s[8]) * inv_det,
            (s[0] * s[8] - s[6] * s[2]) * inv_det,
            (s[3] * s[2] - s[0] * s[5]) * inv_det,
            (s[3] * s[7] - s[6] * s[4]) * inv_det,
            (s[6] * s[1] - s[0] * s[7]) * inv_det,
            (s[0] * s[4] - s[3] * s[1]) * inv_det,
        ];

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

    /// Transposes this matrix in place.
    pub fn transpose(&mut self) -> &mut Self {
        let e = &mut self.elements;
        e.swap(1, 3);
        e.swap(2, 6);
        e.swap(5, 7);
        self
    }

    /// Post-multiplies this matrix by `other` (`self = self * other`).
    ///
    /// The product is accumulated in a temporary, so multiplying a matrix by a copy
    /// of itself is fine.
    pub fn multiply(&mut self, other: &Matrix3) -> &mut Self {
        let a = self.elements;
        let b = &other.elements;
        let mut result = [0.0f32; 9];

        for col in 0..3 {
            for row in 0..3 {
                let mut sum = 0.0;
                for k in 0..3 {
                    sum += a[k * 3 + row] * b[col * 3 + k];
                }
                result[col * 3 + row] = sum;
            }
        }

        self.elements = result;
        self
    }

    /// Sets this matrix to the normal matrix of `model`: the inverse-transpose of
    /// its linear part.
    ///
    /// # Errors
    /// Returns [`ViewerError::SingularMatrix`] when the linear part cannot be inverted;
    /// `self` is left unmodified.
    pub fn set_normal_matrix(&mut self, model: &Matrix4) -> ViewerResult<&mut Self> {
        let mut linear = Matrix3::identity();
        linear.set_from_matrix4(model);
        linear.invert()?;
        linear.transpose();
        Ok(self.set(&linear))
    }

    /// Transforms a 3D vector by this matrix.
    pub fn multiply_vector3(&self, v: [f32; 3]) -> [f32; 3] {
        let e = &self.elements;
        [
            e[0] * v[0] + e[3] * v[1] + e[6] * v[2],
            e[1] * v[0] + e[4] * v[1] + e[7] * v[2],
            e[2] * v[0] + e[5] * v[1] + e[8] * v[2],
        ]
    }
}

/// Rodrigues rotation entries in column-major order, or `None` for a zero-length
/// or non-finite axis or angle.
pub(super) fn rotation_entries(angle: f32, x: f32, y: f32, z: f32) -> Option<[f32; 9]> {
    if !angle.is_finite() {
        return None;
    }
    let rad = angle.to_radians();
    let (s, c) = rad.sin_cos();

    let len = (x * x + y * y + z * z).sqrt();
    if !len.is_normal() {
        return None;
    }
    let (x, y, z) = if len != 1.0 {
        let rlen = 1.0 / len;
        (x * rlen, y * rlen, z * rlen)
    } else {
        (x, y, z)
    };

    let nc = 1.0 - c;
    let xy = x * y;
    let yz = y * z;
    let zx = z * x;
    let xs = x * s;
    let ys = y * s;
    let zs = z * s;

    Some([
        x * x * nc + c,
        xy * nc + zs,
        zx * nc - ys,
        xy * nc - zs,
        y * y * nc + c,
        yz * nc + xs,
        zx * nc + ys,
        yz * nc - xs,
        z * z * nc + c,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> Matrix3 {
        Matrix3::from_elements([2.0, 0.0, 1.0, 1.0, 3.0, 0.0, 0.0, 1.0, 4.0])
    }

    #[test]
    fn identity_times_m_is_m() {
        let m = sample();
        let mut id = Matrix3::identity();
        id.multiply(&m);
        for i in 0..9 {
            assert_abs_diff_eq!(id.elements[i], m.elements[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn rotate_180_about_z_flips_x() {
        let mut r = Matrix3::identity();
        r.set_rotate(180.0, 0.0, 0.0, 1.0);
        let p = r.multiply_vector3([1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(p[0], -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p[1], 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p[2], 0.0, epsilon = 1e-5);
    }

    #[test]
    fn rotate_normalizes_axis() {
        let mut a = Matrix3::identity();
        let mut b = Matrix3::identity();
        a.set_rotate(37.0, 0.0, 5.0, 0.0);
        b.set_rotate(37.0, 0.0, 1.0, 0.0);
        for i in 0..9 {
            assert_abs_diff_eq!(a.elements[i], b.elements[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn rotate_with_zero_axis_is_identity() {
        let mut m = sample();
        m.set_rotate(90.0, 0.0, 0.0, 0.0);
        assert_eq!(m, Matrix3::identity());
    }

    #[test]
    fn inverse_round_trips_to_identity() {
        let m = sample();
        assert!(m.determinant() != 0.0);
        let mut inv = m;
        inv.invert().unwrap();
        let mut product = m;
        product.multiply(&inv);
        let id = Matrix3::identity();
        for i in 0..9 {
            assert_abs_diff_eq!(product.elements[i], id.elements[i], epsilon = 1e-5);
        }
    }

    #[test]
    fn singular_inverse_leaves_matrix_untouched() {
        let singular = Matrix3::from_elements([1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 1.0, 1.0]);
        assert_eq!(singular.determinant(), 0.0);
        let mut m = singular;
        assert_eq!(m.invert().unwrap_err(), ViewerError::SingularMatrix);
        assert_eq!(m, singular);
    }

    #[test]
    fn transpose_swaps_off_diagonal() {
        let mut m = sample();
        m.transpose();
        assert_eq!(m.at(0, 1), sample().at(1, 0));
        assert_eq!(m.at(2, 0), sample().at(0, 2));
        assert_eq!(m.at(1, 1), sample().at(1, 1));
    }

    #[test]
    fn multiply_by_own_copy_squares() {
        let mut m = Matrix3::identity();
        m.set_rotate(45.0, 0.0, 0.0, 1.0);
        let copy = m;
        m.multiply(&copy);
        let mut expected = Matrix3::identity();
        expected.set_rotate(90.0, 0.0, 0.0, 1.0);
        for i in 0..9 {
            assert_abs_diff_eq!(m.elements[i], expected.elements[i], epsilon = 1e-5);
        }
    }

    #[test]
    fn normal_matrix_of_uniform_scale_is_inverse_scale() {
        let mut model = Matrix4::identity();
        model.set_scale(2.0, 2.0, 2.0);
        let mut n = Matrix3::identity();
        n.set_normal_matrix(&model).unwrap();
        assert_abs_diff_eq!(n.at(0, 0), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(n.at(1, 1), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(n.at(2, 2), 0.5, epsilon = 1e-6);
    }
}
