//! Point based fields
//!
//! Both fields sum a falloff of the distance to a set of feature points:
//!
//! ```text
//! v = clamp(scale * Σ F(D(p, p_i) * A_i) * B_i + offset)
//! ```
//!
//! [`BlinnField`] sums over every point in order. [`WorleyField`] sums over
//! the k nearest points, nearest first, with k the number of `B` weights.
//!
//! # References
//!
//! - Blinn, J. (1982) "A Generalization of Algebraic Surface Drawing"
//! - Worley, S. (1996) "A Cellular Texture Basis Function", SIGGRAPH '96

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TextureError};
use crate::field::{clamp, ScalarField};

/// Distance metric between a query location and a feature point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    #[default]
    Euclidean,
    EuclideanSquared,
    Manhattan,
    Chebyshev,
}

impl Distance {
    #[inline]
    pub fn measure(self, a: [f64; 2], b: [f64; 2]) -> f64 {
        let dx = a[0] - b[0];
        let dy = a[1] - b[1];
        match self {
            Self::Euclidean => dx.hypot(dy),
            Self::EuclideanSquared => dx * dx + dy * dy,
            Self::Manhattan => dx.abs() + dy.abs(),
            Self::Chebyshev => dx.abs().max(dy.abs()),
        }
    }
}

/// Function applied to each scaled distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Falloff {
    #[default]
    Identity,
    /// `e^d`, use negative `A` weights for a decaying blob
    Exp,
    /// `e^-d`
    NegExp,
    /// `1 / (1 + d)`
    Inverse,
}

impl Falloff {
    #[inline]
    pub fn apply(self, d: f64) -> f64 {
        match self {
            Self::Identity => d,
            Self::Exp => d.exp(),
            Self::NegExp => (-d).exp(),
            Self::Inverse => 1.0 / (1.0 + d),
        }
    }
}

/// Serialized form shared by [`BlinnField`] and [`WorleyField`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PointFieldParams {
    points: Vec<[f64; 2]>,
    #[serde(default)]
    a: Vec<f64>,
    #[serde(default)]
    b: Vec<f64>,
    #[serde(default)]
    distance: Distance,
    #[serde(default)]
    falloff: Falloff,
    scale: f64,
    #[serde(default)]
    offset: f64,
}

macro_rules! point_field_serde {
    ($name:ident) => {
        impl TryFrom<PointFieldParams> for $name {
            type Error = TextureError;

            fn try_from(p: PointFieldParams) -> Result<Self> {
                Self::new(p.points, p.a, p.b, p.distance, p.falloff, p.scale, p.offset)
            }
        }

        impl From<$name> for PointFieldParams {
            fn from(f: $name) -> Self {
                Self {
                    points: f.points,
                    a: f.a,
                    b: f.b,
                    distance: f.distance,
                    falloff: f.falloff,
                    scale: f.scale,
                    offset: f.offset,
                }
            }
        }
    };
}

point_field_serde!(BlinnField);
point_field_serde!(WorleyField);

/// Metaball style field summed over every point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PointFieldParams", into = "PointFieldParams")]
pub struct BlinnField {
    pub points: Vec<[f64; 2]>,
    /// Per point distance multipliers, missing entries are 1.
    pub a: Vec<f64>,
    /// Per point value multipliers, missing entries are 1.
    pub b: Vec<f64>,
    pub distance: Distance,
    pub falloff: Falloff,
    pub scale: f64,
    pub offset: f64,
}

impl BlinnField {
    pub fn new(
        points: Vec<[f64; 2]>,
        a: Vec<f64>,
        b: Vec<f64>,
        distance: Distance,
        falloff: Falloff,
        scale: f64,
        offset: f64,
    ) -> Result<Self> {
        if points.is_empty() {
            return Err(TextureError::EmptyPoints);
        }
        debug!(points = points.len(), ?distance, ?falloff, "Blinn field");
        Ok(Self {
            points,
            a,
            b,
            distance,
            falloff,
            scale,
            offset,
        })
    }
}

impl ScalarField for BlinnField {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let loc = [x, y];
        let mut sum = 0.0;
        for (i, p) in self.points.iter().enumerate() {
            let d = self.distance.measure(loc, *p) * self.a.get(i).copied().unwrap_or(1.0);
            sum += self.falloff.apply(d) * self.b.get(i).copied().unwrap_or(1.0);
        }
        clamp(sum * self.scale + self.offset)
    }
}

/// Cellular field over the k nearest feature points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PointFieldParams", into = "PointFieldParams")]
pub struct WorleyField {
    pub points: Vec<[f64; 2]>,
    /// Distance multipliers by rank, missing entries are 1.
    pub a: Vec<f64>,
    /// Weights by rank. Their count sets k.
    pub b: Vec<f64>,
    pub distance: Distance,
    pub falloff: Falloff,
    pub scale: f64,
    pub offset: f64,
}

impl WorleyField {
    /// Errors when there are no points or no rank weights.
    pub fn new(
        points: Vec<[f64; 2]>,
        a: Vec<f64>,
        b: Vec<f64>,
        distance: Distance,
        falloff: Falloff,
        scale: f64,
        offset: f64,
    ) -> Result<Self> {
        if points.is_empty() {
            return Err(TextureError::EmptyPoints);
        }
        if b.is_empty() {
            return Err(TextureError::LengthMismatch {
                what: "worley weights",
                expected: 1,
                actual: 0,
            });
        }
        debug!(points = points.len(), k = b.len().min(points.len()), "Worley field");
        Ok(Self {
            points,
            a,
            b,
            distance,
            falloff,
            scale,
            offset,
        })
    }

    /// Classic F2 - F1 cell edge pattern.
    pub fn f2_minus_f1(points: Vec<[f64; 2]>, scale: f64, offset: f64) -> Result<Self> {
        Self::new(
            points,
            vec![],
            vec![-1.0, 1.0],
            Distance::Euclidean,
            Falloff::Identity,
            scale,
            offset,
        )
    }

    fn k(&self) -> usize {
        self.b.len().min(self.points.len())
    }
}

impl ScalarField for WorleyField {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let loc = [x, y];
        let k = self.k();
        let mut ds: Vec<f64> = self
            .points
            .iter()
            .map(|p| self.distance.measure(loc, *p))
            .collect();
        let by_dist = |a: &f64, b: &f64| a.partial_cmp(b).unwrap_or(Ordering::Equal);
        if k < ds.len() {
            ds.select_nth_unstable_by(k, by_dist);
            ds.truncate(k);
        }
        ds.sort_unstable_by(by_dist);

        let mut sum = 0.0;
        for (i, d) in ds.iter().enumerate() {
            let d = d * self.a.get(i).copied().unwrap_or(1.0);
            sum += self.falloff.apply(d) * self.b[i];
        }
        clamp(sum * self.scale + self.offset)
    }
}

/// Uniformly scattered points in `[0, w) x [0, h)` from a seed.
pub fn random_points(n: usize, w: f64, h: f64, seed: u64) -> Vec<[f64; 2]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| [rng.random::<f64>() * w, rng.random::<f64>() * h])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_distances() {
        let a = [0.0, 0.0];
        let b = [3.0, -4.0];
        assert_eq!(Distance::Euclidean.measure(a, b), 5.0);
        assert_eq!(Distance::EuclideanSquared.measure(a, b), 25.0);
        assert_eq!(Distance::Manhattan.measure(a, b), 7.0);
        assert_eq!(Distance::Chebyshev.measure(a, b), 4.0);
    }

    #[test]
    fn test_worley_nearest_first() {
        let pts = vec![[10.0, 0.0], [0.0, 0.0], [3.0, 0.0]];
        let f = WorleyField::new(
            pts,
            vec![],
            vec![1.0, 0.0, 0.0],
            Distance::Euclidean,
            Falloff::Identity,
            0.1,
            0.0,
        )
        .unwrap();
        // Nearest point to (1, 0) is the origin at distance 1
        assert_abs_diff_eq!(f.eval(1.0, 0.0), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(f.eval(9.0, 0.0), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_worley_f2_minus_f1() {
        let f = WorleyField::f2_minus_f1(vec![[0.0, 0.0], [4.0, 0.0]], 0.25, -1.0).unwrap();
        // Equidistant from both points on the bisector
        assert_abs_diff_eq!(f.eval(2.0, 5.0), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(f.eval(0.0, 0.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_blinn_sum() {
        let f = BlinnField::new(
            vec![[0.0, 0.0], [10.0, 0.0]],
            vec![-1.0, -1.0],
            vec![],
            Distance::EuclideanSquared,
            Falloff::Exp,
            1.0,
            -1.0,
        )
        .unwrap();
        // On top of a point: e^0 + e^-100
        assert_abs_diff_eq!(f.eval(0.0, 0.0), (-100f64).exp(), epsilon = 1e-12);
        for i in 0..50 {
            let v = f.eval(f64::from(i) * 0.7 - 10.0, 1.3);
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            BlinnField::new(
                vec![],
                vec![],
                vec![],
                Distance::Euclidean,
                Falloff::Identity,
                1.0,
                0.0
            ),
            Err(TextureError::EmptyPoints)
        );
        assert!(WorleyField::new(
            vec![[0.0, 0.0]],
            vec![],
            vec![],
            Distance::Euclidean,
            Falloff::Identity,
            1.0,
            0.0
        )
        .is_err());
    }

    #[test]
    fn test_json_checked() {
        let w = WorleyField::f2_minus_f1(vec![[0.0, 0.0], [4.0, 0.0]], 0.25, -1.0).unwrap();
        let back: WorleyField = serde_json::from_str(&serde_json::to_string(&w).unwrap()).unwrap();
        assert_eq!(w, back);

        let empty = r#"{"points":[],"b":[1.0],"scale":1.0}"#;
        assert!(serde_json::from_str::<WorleyField>(empty).is_err());
        let unweighted = r#"{"points":[[0.0,0.0]],"scale":1.0}"#;
        assert!(serde_json::from_str::<WorleyField>(unweighted).is_err());
        assert!(serde_json::from_str::<BlinnField>(r#"{"points":[],"scale":1.0}"#).is_err());

        let b: BlinnField = serde_json::from_str(r#"{"points":[[1.0,2.0]],"scale":0.5}"#).unwrap();
        assert_eq!(b.distance, Distance::Euclidean);
        assert_abs_diff_eq!(b.eval(1.0, 2.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_random_points_seeded() {
        let a = random_points(20, 100.0, 50.0, 4);
        assert_eq!(a, random_points(20, 100.0, 50.0, 4));
        assert!(a.iter().all(|p| p[0] < 100.0 && p[1] < 50.0));
    }
}
