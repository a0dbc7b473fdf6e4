/// Row-major 4x4 matrix with immutable, chainable transforms
///
/// Every chained call post-multiplies: `a.x_rotate(p).translate(x, y, z)` is
/// `a * Rx(p) * T(x, y, z)`, so the last call in a chain is the first one
/// applied to a point evaluated as `m * point`.
use std::ops::Mul;

use crate::error::ShapeError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    e: [f32; 16],
}

impl Matrix4 {
    /// Build from exactly 16 row-major elements
    pub fn new(elements: Vec<f32>) -> Result<Self, ShapeError> {
        Self::try_from(elements.as_slice())
    }

    pub const fn from_array(e: [f32; 16]) -> Self {
        Self { e }
    }

    #[rustfmt::skip]
    pub const fn identity() -> Self {
        Self::from_array([
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn get(&self, row: usize, column: usize) -> f32 {
        self.e[row * 4 + column]
    }

    pub fn elements(&self) -> &[f32; 16] {
        &self.e
    }

    /// Column-major copy, for backends that upload without transposing
    pub fn transposed(&self) -> Self {
        let mut e = [0.0; 16];
        for row in 0..4 {
            for column in 0..4 {
                e[column * 4 + row] = self.get(row, column);
            }
        }
        Self::from_array(e)
    }

    #[rustfmt::skip]
    pub fn translation(tx: f32, ty: f32, tz: f32) -> Self {
        Self::from_array([
            1.0, 0.0, 0.0, tx,
            0.0, 1.0, 0.0, ty,
            0.0, 0.0, 1.0, tz,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    #[rustfmt::skip]
    pub fn x_rotation(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self::from_array([
            1.0, 0.0, 0.0, 0.0,
            0.0,   c,  -s, 0.0,
            0.0,   s,   c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    #[rustfmt::skip]
    pub fn y_rotation(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self::from_array([
              c, 0.0,   s, 0.0,
            0.0, 1.0, 0.0, 0.0,
             -s, 0.0,   c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    #[rustfmt::skip]
    pub fn z_rotation(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self::from_array([
              c,  -s, 0.0, 0.0,
              s,   c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn scaling(s: f32) -> Self {
        Self::nonuniform_scaling(s, s, s)
    }

    #[rustfmt::skip]
    pub fn nonuniform_scaling(sx: f32, sy: f32, sz: f32) -> Self {
        Self::from_array([
             sx, 0.0, 0.0, 0.0,
            0.0,  sy, 0.0, 0.0,
            0.0, 0.0,  sz, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Simplified projective transform without clip planes.
    ///
    /// `expand_x` keeps the vertical field of view fixed and divides x by the
    /// aspect ratio; otherwise the horizontal field is fixed and y is
    /// multiplied by it. Output `w` is `-tan(fov / 2) * z`.
    #[rustfmt::skip]
    pub fn perspective(aspect_ratio: f32, expand_x: bool, fov_degrees: f32) -> Self {
        let t = (fov_degrees / 2.0).to_radians().tan();
        let (x, y) = if expand_x {
            (1.0 / aspect_ratio, 1.0)
        } else {
            (1.0, aspect_ratio)
        };

        Self::from_array([
              x, 0.0, 0.0,  0.0,
            0.0,   y, 0.0,  0.0,
            0.0, 0.0, 0.0, -1.0,
            0.0, 0.0,  -t,  0.0,
        ])
    }

    pub fn multiply(&self, other: &Matrix4) -> Self {
        let mut e = [0.0; 16];
        for row in 0..4 {
            for column in 0..4 {
                e[row * 4 + column] = (0..4)
                    .map(|i| self.get(row, i) * other.get(i, column))
                    .sum();
            }
        }
        Self::from_array(e)
    }

    pub fn translate(&self, tx: f32, ty: f32, tz: f32) -> Self {
        self.multiply(&Self::translation(tx, ty, tz))
    }

    pub fn x_rotate(&self, radians: f32) -> Self {
        self.multiply(&Self::x_rotation(radians))
    }

    pub fn y_rotate(&self, radians: f32) -> Self {
        self.multiply(&Self::y_rotation(radians))
    }

    pub fn z_rotate(&self, radians: f32) -> Self {
        self.multiply(&Self::z_rotation(radians))
    }

    pub fn scale(&self, sx: f32, sy: f32, sz: f32) -> Self {
        self.multiply(&Self::nonuniform_scaling(sx, sy, sz))
    }

    pub fn perspective_by(&self, aspect_ratio: f32, expand_x: bool, fov_degrees: f32) -> Self {
        self.multiply(&Self::perspective(aspect_ratio, expand_x, fov_degrees))
    }

    /// Apply to a homogeneous column vector
    pub fn transform(&self, v: &[f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (row, slot) in out.iter_mut().enumerate() {
            *slot = (0..4).map(|i| self.get(row, i) * v[i]).sum();
        }
        out
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl TryFrom<&[f32]> for Matrix4 {
    type Error = ShapeError;

    fn try_from(elements: &[f32]) -> Result<Self, Self::Error> {
        let e: [f32; 16] = elements
            .try_into()
            .map_err(|_| ShapeError { len: elements.len() })?;
        Ok(Self::from_array(e))
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        self.multiply(&rhs)
    }
}

impl Mul<&Matrix4> for &Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: &Matrix4) -> Matrix4 {
        self.multiply(rhs)
    }
}

impl From<Matrix4> for nalgebra::Matrix4<f32> {
    fn from(m: Matrix4) -> Self {
        nalgebra::Matrix4::from_row_slice(&m.e)
    }
}

impl From<nalgebra::Matrix4<f32>> for Matrix4 {
    fn from(m: nalgebra::Matrix4<f32>) -> Self {
        // nalgebra stores columns contiguously
        let mut e = [0.0; 16];
        for row in 0..4 {
            for column in 0..4 {
                e[row * 4 + column] = m[(row, column)];
            }
        }
        Self::from_array(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &Matrix4, b: &Matrix4) {
        for (x, y) in a.elements().iter().zip(b.elements()) {
            assert!((x - y).abs() < 1e-5, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_shape_error() {
        assert_eq!(Matrix4::new(vec![0.0; 15]), Err(ShapeError { len: 15 }));
        assert_eq!(Matrix4::new(vec![0.0; 17]), Err(ShapeError { len: 17 }));
        assert!(Matrix4::new(vec![1.0; 16]).is_ok());
    }

    #[test]
    fn test_get_is_row_major() {
        let m = Matrix4::new((0..16).map(|i| i as f32).collect()).unwrap();
        assert_eq!(m.get(0, 3), 3.0);
        assert_eq!(m.get(2, 1), 9.0);
        assert_eq!(m.transposed().get(2, 1), 6.0);
    }

    #[test]
    fn test_zero_translation_is_identity() {
        let p = Matrix4::perspective(16.0 / 9.0, false, 90.0);
        assert_eq!(p.translate(0.0, 0.0, 0.0), p);
    }

    #[test]
    fn test_rotation_then_translation_do_not_commute() {
        let r = Matrix4::x_rotation(0.7);
        let t = Matrix4::translation(1.0, 2.0, 3.0);
        assert_ne!(r * t, t * r);
    }

    #[test]
    fn test_chain_post_multiplies() {
        let p = Matrix4::perspective(1.5, true, 60.0);
        let chained = p.x_rotate(0.3).y_rotate(-1.1).translate(4.0, 5.0, 6.0);
        let explicit = p
            * Matrix4::x_rotation(0.3)
            * Matrix4::y_rotation(-1.1)
            * Matrix4::translation(4.0, 5.0, 6.0);
        assert_close(&chained, &explicit);
    }

    #[test]
    fn test_translation_moves_points() {
        let m = Matrix4::translation(1.0, 2.0, 3.0).scale(2.0, 2.0, 2.0);
        // Scale applies first, then translation.
        assert_eq!(m.transform(&[1.0, 1.0, 1.0, 1.0]), [3.0, 4.0, 5.0, 1.0]);
    }

    #[test]
    fn test_perspective_layout() {
        let p = Matrix4::perspective(2.0, false, 90.0);
        assert_eq!(p.get(0, 0), 1.0);
        assert_eq!(p.get(1, 1), 2.0);
        assert_eq!(p.get(2, 3), -1.0);
        assert!((p.get(3, 2) + 1.0).abs() < 1e-6);

        let q = Matrix4::perspective(2.0, true, 90.0);
        assert_eq!(q.get(0, 0), 0.5);
        assert_eq!(q.get(1, 1), 1.0);
    }

    #[test]
    fn test_multiply_matches_nalgebra() {
        let a = Matrix4::x_rotation(0.4).translate(1.0, -2.0, 0.5);
        let b = Matrix4::perspective(1.3, false, 75.0).z_rotate(2.0);
        let expected: Matrix4 =
            (nalgebra::Matrix4::from(a) * nalgebra::Matrix4::from(b)).into();
        assert_close(&(a * b), &expected);
    }
}
