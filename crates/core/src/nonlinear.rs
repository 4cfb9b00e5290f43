//! Non-linear shaping functions
//!
//! Each [`NonLinear`] is a monotonic map of [0, 1] onto [0, 1] with
//! `f(0) = 0` and `f(1) = 1`. Waves, filters and color ramps use them to
//! shape a linear parameter before it is turned into a value.
//!
//! # References
//!
//! - Perlin, K. (2002) "Improving Noise" (quintic `P5` fade curve)
//! - Ebert et al. (2003) "Texturing & Modeling: A Procedural Approach"

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

/// Named shaping function. Parameterized variants carry their constants so a
/// serialized tree reproduces the same curve.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "nl", rename_all = "snake_case")]
pub enum NonLinear {
    #[default]
    Linear,
    Square,
    Cube,
    /// `(e^(kt) - 1) / (e^k - 1)`, steeper towards 1 as `k` grows
    Exponential { k: f64 },
    /// Inverse of [`NonLinear::Exponential`]
    Logarithmic { k: f64 },
    /// Half cosine, ease in and out
    Sin,
    /// Quarter sine, ease out
    Sin1,
    /// Quarter cosine, ease in
    Sin2,
    /// Quarter circle, ease in
    Circle1,
    /// Quarter circle, ease out
    Circle2,
    Catenary,
    Gauss { k: f64 },
    /// Sigmoid of slope `k` centered on `mid`, rescaled to hit 0 and 1
    Logistic { k: f64, mid: f64 },
    /// Cubic smoothstep `t²(3 - 2t)`
    P3,
    /// Quintic smootherstep `t³(t(6t - 15) + 10)`
    P5,
}

impl NonLinear {
    pub fn exponential(k: f64) -> Self {
        Self::Exponential { k: sanitize_k(k) }
    }

    pub fn logarithmic(k: f64) -> Self {
        Self::Logarithmic { k: sanitize_k(k) }
    }

    pub fn gauss(k: f64) -> Self {
        Self::Gauss { k: sanitize_k(k) }
    }

    pub fn logistic(k: f64, mid: f64) -> Self {
        Self::Logistic {
            k: sanitize_k(k),
            mid: mid.clamp(0.0, 1.0),
        }
    }

    /// Map `t` in [0, 1] to [0, 1]. Input outside the range is clamped.
    pub fn transform(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let v = match *self {
            Self::Linear => t,
            Self::Square => t * t,
            Self::Cube => t * t * t,
            Self::Exponential { k } => ((k * t).exp() - 1.0) / (k.exp() - 1.0),
            Self::Logarithmic { k } => (1.0 + t * (k.exp() - 1.0)).ln() / k,
            Self::Sin => (1.0 - (PI * t).cos()) / 2.0,
            Self::Sin1 => (FRAC_PI_2 * t).sin(),
            Self::Sin2 => 1.0 - (FRAC_PI_2 * t).cos(),
            Self::Circle1 => 1.0 - (1.0 - t * t).sqrt(),
            Self::Circle2 => {
                let u = 1.0 - t;
                (1.0 - u * u).sqrt()
            }
            Self::Catenary => (t.cosh() - 1.0) / (1f64.cosh() - 1.0),
            Self::Gauss { k } => (1.0 - (-k * t * t).exp()) / (1.0 - (-k).exp()),
            Self::Logistic { k, mid } => {
                let s = |u: f64| 1.0 / (1.0 + (-k * (u - mid)).exp());
                let (lo, hi) = (s(0.0), s(1.0));
                (s(t) - lo) / (hi - lo)
            }
            Self::P3 => t * t * (3.0 - 2.0 * t),
            Self::P5 => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
        };
        v.clamp(0.0, 1.0)
    }

    /// Map `t` in [0, 1] to [-1, 1].
    #[inline]
    pub fn eval(&self, t: f64) -> f64 {
        self.transform(t) * 2.0 - 1.0
    }
}

/// Degenerate curve constants collapse to the linear case, so keep them away
/// from zero.
fn sanitize_k(k: f64) -> f64 {
    if !k.is_finite() || k.abs() < 1e-6 {
        1.0
    } else {
        k.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn all() -> Vec<NonLinear> {
        vec![
            NonLinear::Linear,
            NonLinear::Square,
            NonLinear::Cube,
            NonLinear::exponential(2.0),
            NonLinear::logarithmic(2.0),
            NonLinear::Sin,
            NonLinear::Sin1,
            NonLinear::Sin2,
            NonLinear::Circle1,
            NonLinear::Circle2,
            NonLinear::Catenary,
            NonLinear::gauss(2.0),
            NonLinear::logistic(10.0, 0.5),
            NonLinear::P3,
            NonLinear::P5,
        ]
    }

    #[test]
    fn test_end_points() {
        for nl in all() {
            assert_abs_diff_eq!(nl.transform(0.0), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(nl.transform(1.0), 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(nl.eval(0.0), -1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(nl.eval(1.0), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_monotonic() {
        for nl in all() {
            let mut prev = nl.transform(0.0);
            for i in 1..=100 {
                let v = nl.transform(f64::from(i) / 100.0);
                assert!(v + 1e-12 >= prev, "{nl:?} not monotonic at {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(NonLinear::Square.transform(-2.0), 0.0);
        assert_eq!(NonLinear::Square.transform(3.0), 1.0);
    }

    #[test]
    fn test_p5_midpoint() {
        assert_abs_diff_eq!(NonLinear::P5.transform(0.5), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(NonLinear::P3.transform(0.5), 0.5, epsilon = 1e-12);
    }
}
