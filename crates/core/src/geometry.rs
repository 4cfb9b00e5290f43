//! Planar geometry: affine transforms and point-in-shape tests
//!
//! [`Aff3`] is a 2D affine transform stored as a homogeneous 3x3 matrix.
//! Building operations post-multiply, so the last operation added is the
//! first one applied to a point:
//!
//! ```ignore
//! let mut xfm = Aff3::identity();
//! xfm.rotate(-th);
//! xfm.translate(-x0, -y0); // applied first
//! ```

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TextureError};

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aff3 {
    m: Matrix3<f64>,
}

impl Default for Aff3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Aff3 {
    pub fn identity() -> Self {
        Self {
            m: Matrix3::identity(),
        }
    }

    /// Transform from the top two rows `[a, b, c, d, e, f]` of
    /// `| a b c |`, `| d e f |`, `| 0 0 1 |`.
    pub fn from_row_slice(v: [f64; 6]) -> Self {
        Self {
            m: Matrix3::new(v[0], v[1], v[2], v[3], v[4], v[5], 0.0, 0.0, 1.0),
        }
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        let mut a = Self::identity();
        a.translate(tx, ty);
        a
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        let mut a = Self::identity();
        a.scale(sx, sy);
        a
    }

    pub fn rotation(th: f64) -> Self {
        let mut a = Self::identity();
        a.rotate(th);
        a
    }

    /// Reflection across the line through `p1` and `p2`.
    pub fn reflection(p1: [f64; 2], p2: [f64; 2]) -> Self {
        let mut a = Self::identity();
        a.reflect(p1, p2);
        a
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.m
    }

    /// Post-multiply by `other`.
    pub fn concatenate(&mut self, other: &Self) -> &mut Self {
        self.m *= other.m;
        self
    }

    /// Pre-multiply by `other`, so it is applied after the current transform.
    pub fn pre_concatenate(&mut self, other: &Self) -> &mut Self {
        self.m = other.m * self.m;
        self
    }

    pub fn translate(&mut self, tx: f64, ty: f64) -> &mut Self {
        let t = Matrix3::new(1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0);
        self.m *= t;
        self
    }

    pub fn scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        let s = Matrix3::new(sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0);
        self.m *= s;
        self
    }

    /// Counter-clockwise rotation by `th` radians about the origin.
    pub fn rotate(&mut self, th: f64) -> &mut Self {
        let (s, c) = th.sin_cos();
        let r = Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0);
        self.m *= r;
        self
    }

    pub fn rotate_about(&mut self, th: f64, ax: f64, ay: f64) -> &mut Self {
        self.translate(ax, ay);
        self.rotate(th);
        self.translate(-ax, -ay)
    }

    pub fn shear(&mut self, shx: f64, shy: f64) -> &mut Self {
        let s = Matrix3::new(1.0, shx, 0.0, shy, 1.0, 0.0, 0.0, 0.0, 1.0);
        self.m *= s;
        self
    }

    /// Reflection across the line through `p1` and `p2`.
    pub fn reflect(&mut self, p1: [f64; 2], p2: [f64; 2]) -> &mut Self {
        let th = (p2[1] - p1[1]).atan2(p2[0] - p1[0]);
        let (s2, c2) = (2.0 * th).sin_cos();
        let r = Matrix3::new(c2, s2, 0.0, s2, -c2, 0.0, 0.0, 0.0, 1.0);
        self.translate(p1[0], p1[1]);
        self.m *= r;
        self.translate(-p1[0], -p1[1])
    }

    pub fn determinant(&self) -> f64 {
        self.m[(0, 0)] * self.m[(1, 1)] - self.m[(0, 1)] * self.m[(1, 0)]
    }

    /// Inverse transform. Fails when the transform collapses the plane.
    pub fn inverse(&self) -> Result<Self> {
        if self.determinant().abs() < SINGULAR_EPSILON {
            return Err(TextureError::SingularTransform);
        }
        self.m
            .try_inverse()
            .map(|m| Self { m })
            .ok_or(TextureError::SingularTransform)
    }

    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.m;
        (
            m[(0, 0)] * x + m[(0, 1)] * y + m[(0, 2)],
            m[(1, 0)] * x + m[(1, 1)] * y + m[(1, 2)],
        )
    }

    /// Apply to a homogeneous point.
    pub fn apply_vector(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.m * p
    }
}

/// Signed side of `p` relative to the directed line `p1 -> p2`. Positive on
/// the left, negative on the right, zero on the line.
#[inline]
pub fn side_of_line(p1: [f64; 2], p2: [f64; 2], p: [f64; 2]) -> f64 {
    (p2[0] - p1[0]) * (p[1] - p1[1]) - (p2[1] - p1[1]) * (p[0] - p1[0])
}

/// Point-in-shape oracle.
pub trait Shape: Send + Sync {
    fn contains(&self, x: f64, y: f64) -> bool;
}

impl<S: Shape + ?Sized> Shape for &S {
    fn contains(&self, x: f64, y: f64) -> bool {
        (**self).contains(x, y)
    }
}

impl<S: Shape + ?Sized> Shape for Box<S> {
    fn contains(&self, x: f64, y: f64) -> bool {
        (**self).contains(x, y)
    }
}

/// Union of shapes.
impl<S: Shape> Shape for Vec<S> {
    fn contains(&self, x: f64, y: f64) -> bool {
        self.iter().any(|s| s.contains(x, y))
    }
}

/// Closed polygon tested with the even-odd rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolygonParams", into = "PolygonParams")]
pub struct Polygon {
    points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PolygonParams {
    points: Vec<[f64; 2]>,
}

impl TryFrom<PolygonParams> for Polygon {
    type Error = TextureError;

    fn try_from(p: PolygonParams) -> Result<Self> {
        Self::new(p.points)
    }
}

impl From<Polygon> for PolygonParams {
    fn from(p: Polygon) -> Self {
        Self { points: p.points }
    }
}

impl Polygon {
    pub fn new(points: Vec<[f64; 2]>) -> Result<Self> {
        if points.len() < 3 {
            return Err(TextureError::EmptyPoints);
        }
        Ok(Self { points })
    }

    /// Regular polygon with `n` sides inscribed in a circle.
    pub fn regular(n: usize, center: [f64; 2], radius: f64, offset: f64) -> Result<Self> {
        let n = n.max(3);
        let th = std::f64::consts::TAU / n as f64;
        let points = (0..n)
            .map(|i| {
                let a = offset + th * i as f64;
                [center[0] + radius * a.cos(), center[1] + radius * a.sin()]
            })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }
}

impl Shape for Polygon {
    fn contains(&self, x: f64, y: f64) -> bool {
        let pts = &self.points;
        if pts.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = pts.len() - 1;
        for i in 0..pts.len() {
            let (xi, yi) = (pts[i][0], pts[i][1]);
            let (xj, yj) = (pts[j][0], pts[j][1]);
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: [f64; 2],
    pub radius: f64,
}

impl Circle {
    pub fn new(center: [f64; 2], radius: f64) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }
}

impl Shape for Circle {
    fn contains(&self, x: f64, y: f64) -> bool {
        (x - self.center[0]).hypot(y - self.center[1]) <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_post_multiply_order() {
        // Translate is applied first, then the rotation
        let mut xfm = Aff3::identity();
        xfm.rotate(FRAC_PI_2);
        xfm.translate(-1.0, 0.0);
        let (x, y) = xfm.apply(2.0, 0.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reflection_across_diagonal() {
        let r = Aff3::reflection([0.0, 0.0], [1.0, 1.0]);
        let (x, y) = r.apply(3.0, 1.0);
        assert_abs_diff_eq!(x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 3.0, epsilon = 1e-12);

        let shifted = Aff3::reflection([0.0, 2.0], [1.0, 2.0]);
        let (x, y) = shifted.apply(5.0, 3.0);
        assert_abs_diff_eq!(x, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse() {
        let mut xfm = Aff3::identity();
        xfm.scale(2.0, 0.5).rotate(0.3).translate(4.0, -1.0);
        let inv = xfm.inverse().unwrap();
        let (x, y) = xfm.apply(1.5, -2.5);
        let (bx, by) = inv.apply(x, y);
        assert_abs_diff_eq!(bx, 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(by, -2.5, epsilon = 1e-9);
        assert_eq!(
            Aff3::scaling(0.0, 1.0).inverse(),
            Err(TextureError::SingularTransform)
        );
    }

    #[test]
    fn test_side_of_line() {
        assert!(side_of_line([0.0, 0.0], [1.0, 0.0], [0.0, 1.0]) > 0.0);
        assert!(side_of_line([0.0, 0.0], [1.0, 0.0], [0.0, -1.0]) < 0.0);
        assert_eq!(side_of_line([0.0, 0.0], [1.0, 0.0], [5.0, 0.0]), 0.0);
    }

    #[test]
    fn test_polygon_even_odd() {
        let square =
            Polygon::new(vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]).unwrap();
        assert!(square.contains(5.0, 5.0));
        assert!(!square.contains(15.0, 5.0));
        assert!(Polygon::new(vec![[0.0, 0.0], [1.0, 1.0]]).is_err());
        let hex = Polygon::regular(6, [0.0, 0.0], 5.0, 0.0).unwrap();
        assert!(hex.contains(0.0, 0.0));
        assert!(!hex.contains(0.0, 4.9));
    }

    #[test]
    fn test_polygon_json_checked() {
        let tri: Polygon = serde_json::from_str(r#"{"points": [[0, 0], [4, 0], [0, 4]]}"#).unwrap();
        assert!(tri.contains(1.0, 1.0));
        assert_eq!(tri.points().len(), 3);
        assert!(serde_json::from_str::<Polygon>(r#"{"points": []}"#).is_err());
        assert!(serde_json::from_str::<Polygon>(r#"{"points": [[0, 0], [1, 1]]}"#).is_err());
    }

    #[test]
    fn test_circle_and_union() {
        let shapes = vec![Circle::new([0.0, 0.0], 1.0), Circle::new([5.0, 0.0], 1.0)];
        assert!(shapes.contains(5.5, 0.0));
        assert!(!shapes.contains(2.5, 0.0));
    }

    #[test]
    fn test_serde_round_trip() {
        let xfm = Aff3::rotation(0.7);
        let json = serde_json::to_string(&xfm).unwrap();
        let back: Aff3 = serde_json::from_str(&json).unwrap();
        assert_eq!(xfm, back);
    }
}
