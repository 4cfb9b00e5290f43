//! Value combiners
//!
//! Binary and ternary operators over source values, the non-deterministic
//! blends, and shape driven selection.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::field::{clamp, lerp, to_unit, ColorField, ScalarField, VectorField};
use crate::filter::{post, FilterOp};
use crate::geometry::Shape;

/// Two argument operator `(u, v) -> [-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BinaryOp {
    Mul,
    /// Clamped sum
    Add,
    /// Clamped difference
    Sub,
    Min,
    Max,
    Avg,
    /// Blend weighted by the difference, biased toward the larger operand
    Diff,
    /// `u` outside `[start, end]`, `v` inside
    Substitute { start: f64, end: f64 },
    /// Clamped `a * u + b * v`
    Weighted { a: f64, b: f64 },
    /// `u` below the threshold, `v` at or above it
    Threshold { a: f64 },
}

impl BinaryOp {
    pub fn apply(&self, u: f64, v: f64) -> f64 {
        match *self {
            Self::Mul => u * v,
            Self::Add => clamp(u + v),
            Self::Sub => clamp(u - v),
            Self::Min => u.min(v),
            Self::Max => u.max(v),
            Self::Avg => (u + v) / 2.0,
            Self::Diff => {
                let t = (u - v + 2.0) / 4.0;
                lerp(t, u, v)
            }
            Self::Substitute { start, end } => {
                if u < start || u > end {
                    u
                } else {
                    v
                }
            }
            Self::Weighted { a, b } => clamp(a * u + b * v),
            Self::Threshold { a } => {
                if u < a {
                    u
                } else {
                    v
                }
            }
        }
    }
}

/// Three argument operator where the third value steers the first two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TernaryOp {
    /// `u` at `w = -1` through to `v` at `w = 1`
    Blend,
    /// `u` when `w` is outside `[start, end]`, `v` inside
    Substitute { start: f64, end: f64 },
}

impl TernaryOp {
    pub fn apply(&self, u: f64, v: f64, w: f64) -> f64 {
        match *self {
            Self::Blend => lerp(to_unit(w), u, v),
            Self::Substitute { start, end } => {
                if w < start || w > end {
                    u
                } else {
                    v
                }
            }
        }
    }
}

/// Combines two sources, then applies an optional filter.
#[derive(Debug, Clone)]
pub struct Combiner2<A, B> {
    pub src1: A,
    pub src2: B,
    pub op: BinaryOp,
    pub filter: Option<FilterOp>,
}

impl<A: ScalarField, B: ScalarField> Combiner2<A, B> {
    pub fn new(src1: A, src2: B, op: BinaryOp) -> Self {
        Self {
            src1,
            src2,
            op,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: FilterOp) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl<A: ScalarField, B: ScalarField> ScalarField for Combiner2<A, B> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let v = self.op.apply(self.src1.eval(x, y), self.src2.eval(x, y));
        post(self.filter.as_ref(), v)
    }
}

/// Combines three sources, then applies an optional filter.
#[derive(Debug, Clone)]
pub struct Combiner3<A, B, C> {
    pub src1: A,
    pub src2: B,
    pub src3: C,
    pub op: TernaryOp,
    pub filter: Option<FilterOp>,
}

impl<A: ScalarField, B: ScalarField, C: ScalarField> Combiner3<A, B, C> {
    pub fn new(src1: A, src2: B, src3: C, op: TernaryOp) -> Self {
        Self {
            src1,
            src2,
            src3,
            op,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: FilterOp) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl<A: ScalarField, B: ScalarField, C: ScalarField> ScalarField for Combiner3<A, B, C> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let v = self
            .op
            .apply(self.src1.eval(x, y), self.src2.eval(x, y), self.src3.eval(x, y));
        post(self.filter.as_ref(), v)
    }
}

/// Picks `src2` when a fresh random draw falls below the blend weight taken
/// from `src3`, `src1` otherwise. Not repeatable between evaluations.
#[derive(Debug, Clone)]
pub struct StochasticBlend<A, B, C> {
    pub src1: A,
    pub src2: B,
    pub src3: C,
}

impl<A: ScalarField, B: ScalarField, C: ScalarField> StochasticBlend<A, B, C> {
    pub fn new(src1: A, src2: B, src3: C) -> Self {
        Self { src1, src2, src3 }
    }
}

impl<A: ScalarField, B: ScalarField, C: ScalarField> ScalarField for StochasticBlend<A, B, C> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let t = to_unit(self.src3.eval(x, y));
        if rand::random::<f64>() < t {
            self.src2.eval(x, y)
        } else {
            self.src1.eval(x, y)
        }
    }
}

/// [`TernaryOp::Blend`] with up to `jitter` of random noise added to the
/// blend weight on every evaluation.
#[derive(Debug, Clone)]
pub struct JitterBlend<A, B, C> {
    pub src1: A,
    pub src2: B,
    pub src3: C,
    pub jitter: f64,
}

impl<A: ScalarField, B: ScalarField, C: ScalarField> JitterBlend<A, B, C> {
    pub fn new(src1: A, src2: B, src3: C, jitter: f64) -> Self {
        Self {
            src1,
            src2,
            src3,
            jitter: jitter.abs(),
        }
    }
}

impl<A: ScalarField, B: ScalarField, C: ScalarField> ScalarField for JitterBlend<A, B, C> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let j = (rand::random::<f64>() * 2.0 - 1.0) * self.jitter;
        let t = (to_unit(self.src3.eval(x, y)) + j).clamp(0.0, 1.0);
        lerp(t, self.src1.eval(x, y), self.src2.eval(x, y))
    }
}

/// First source inside the shape, second outside. Works for any field kind.
#[derive(Debug, Clone)]
pub struct ShapeCombiner<A, B, S> {
    pub inside: A,
    pub outside: B,
    pub shape: S,
}

impl<A, B, S: Shape> ShapeCombiner<A, B, S> {
    pub fn new(inside: A, outside: B, shape: S) -> Self {
        Self {
            inside,
            outside,
            shape,
        }
    }
}

impl<A: ScalarField, B: ScalarField, S: Shape> ScalarField for ShapeCombiner<A, B, S> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        if self.shape.contains(x, y) {
            self.inside.eval(x, y)
        } else {
            self.outside.eval(x, y)
        }
    }
}

impl<A: VectorField, B: VectorField, S: Shape> VectorField for ShapeCombiner<A, B, S> {
    fn eval(&self, x: f64, y: f64) -> Vec<f64> {
        if self.shape.contains(x, y) {
            self.inside.eval(x, y)
        } else {
            self.outside.eval(x, y)
        }
    }
}

impl<A: ColorField, B: ColorField, S: Shape> ColorField for ShapeCombiner<A, B, S> {
    fn eval(&self, x: f64, y: f64) -> Color {
        if self.shape.contains(x, y) {
            self.inside.eval(x, y)
        } else {
            self.outside.eval(x, y)
        }
    }
}

/// How a stack of shapes turns into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeStyle {
    /// 1 inside any shape, -1 outside all
    #[default]
    Binary,
    /// Steps down from 1 by the index of the first shape hit
    Occurrence,
    /// Steps up from -1 for every shape hit
    Summed,
}

/// Scalar field drawn from an ordered stack of shapes.
#[derive(Debug, Clone)]
pub struct ShapeField<S> {
    pub shapes: Vec<S>,
    pub style: ShapeStyle,
}

impl<S: Shape> ShapeField<S> {
    pub fn new(shapes: Vec<S>, style: ShapeStyle) -> Self {
        Self { shapes, style }
    }

    fn step(&self) -> f64 {
        2.0 / (self.shapes.len() + 1) as f64
    }
}

impl<S: Shape> ScalarField for ShapeField<S> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        match self.style {
            ShapeStyle::Binary => {
                if Shape::contains(&self.shapes, x, y) {
                    1.0
                } else {
                    -1.0
                }
            }
            ShapeStyle::Occurrence => {
                let dp = self.step();
                self.shapes
                    .iter()
                    .position(|s| s.contains(x, y))
                    .map_or(-1.0, |i| 1.0 - dp * i as f64)
            }
            ShapeStyle::Summed => {
                let dp = self.step();
                let hits = self.shapes.iter().filter(|s| s.contains(x, y)).count();
                -1.0 + dp * hits as f64
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Uniform, UniformColor};
    use crate::geometry::Circle;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_binary_ops() {
        assert_eq!(BinaryOp::Mul.apply(0.5, -0.5), -0.25);
        assert_eq!(BinaryOp::Add.apply(0.75, 0.5), 1.0);
        assert_eq!(BinaryOp::Sub.apply(-0.75, 0.5), -1.0);
        assert_eq!(BinaryOp::Min.apply(0.2, -0.1), -0.1);
        assert_eq!(BinaryOp::Max.apply(0.2, -0.1), 0.2);
        assert_eq!(BinaryOp::Avg.apply(1.0, 0.0), 0.5);
        let sub = BinaryOp::Substitute { start: -0.5, end: 0.5 };
        assert_eq!(sub.apply(0.8, 0.1), 0.8);
        assert_eq!(sub.apply(0.2, 0.1), 0.1);
        assert_eq!(BinaryOp::Weighted { a: 0.75, b: 0.25 }.apply(1.0, -1.0), 0.5);
        assert_eq!(BinaryOp::Threshold { a: 0.0 }.apply(-0.3, 0.9), -0.3);
        assert_eq!(BinaryOp::Threshold { a: 0.0 }.apply(0.3, 0.9), 0.9);
    }

    #[test]
    fn test_diff_weighting() {
        // t = (1 - (-1) + 2) / 4 = 1, all v
        assert_eq!(BinaryOp::Diff.apply(1.0, -1.0), -1.0);
        // t = 0.5 when equal
        assert_eq!(BinaryOp::Diff.apply(0.4, 0.4), 0.4);
        // t = (0.5 + 2) / 4 = 0.625
        assert_abs_diff_eq!(BinaryOp::Diff.apply(0.5, 0.0), 0.375 * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_ternary_ops() {
        assert_eq!(TernaryOp::Blend.apply(-1.0, 1.0, -1.0), -1.0);
        assert_eq!(TernaryOp::Blend.apply(-1.0, 1.0, 1.0), 1.0);
        assert_eq!(TernaryOp::Blend.apply(-1.0, 1.0, 0.0), 0.0);
        let sub = TernaryOp::Substitute { start: 0.0, end: 0.5 };
        assert_eq!(sub.apply(0.1, 0.2, 0.25), 0.2);
        assert_eq!(sub.apply(0.1, 0.2, 0.75), 0.1);
    }

    #[test]
    fn test_combiner_post_filter() {
        let c = Combiner2::new(Uniform::new(0.5), Uniform::new(0.25), BinaryOp::Add)
            .with_filter(FilterOp::Invert);
        assert_eq!(c.eval(0.0, 0.0), -0.75);
        let c3 = Combiner3::new(
            Uniform::new(0.0),
            Uniform::new(1.0),
            Uniform::new(0.0),
            TernaryOp::Blend,
        );
        assert_eq!(c3.eval(3.0, 3.0), 0.5);
    }

    #[test]
    fn test_stochastic_blends_stay_in_range() {
        let s = StochasticBlend::new(Uniform::new(-1.0), Uniform::new(1.0), Uniform::new(0.0));
        let j = JitterBlend::new(Uniform::new(-1.0), Uniform::new(1.0), Uniform::new(0.0), 0.1);
        for i in 0..200 {
            let v = s.eval(f64::from(i), 0.0);
            assert!(v == -1.0 || v == 1.0);
            let w = j.eval(f64::from(i), 0.0);
            assert!((-0.2 - 1e-12..=0.2 + 1e-12).contains(&w));
        }
        // Certain picks at the extremes
        let all2 = StochasticBlend::new(Uniform::new(-1.0), Uniform::new(1.0), Uniform::new(1.0));
        assert_eq!(all2.eval(0.0, 0.0), 1.0);
    }

    #[test]
    fn test_shape_combiner_and_field() {
        let circle = Circle::new([0.0, 0.0], 5.0);
        let sc = ShapeCombiner::new(
            UniformColor::new(Color::WHITE),
            UniformColor::new(Color::BLACK),
            circle,
        );
        assert_eq!(ColorField::eval(&sc, 1.0, 1.0), Color::WHITE);
        assert_eq!(ColorField::eval(&sc, 6.0, 0.0), Color::BLACK);

        let shapes = vec![Circle::new([0.0, 0.0], 5.0), Circle::new([0.0, 0.0], 10.0)];
        let bin = ShapeField::new(shapes.clone(), ShapeStyle::Binary);
        assert_eq!(bin.eval(7.0, 0.0), 1.0);
        assert_eq!(bin.eval(11.0, 0.0), -1.0);

        let occ = ShapeField::new(shapes.clone(), ShapeStyle::Occurrence);
        assert_eq!(occ.eval(1.0, 0.0), 1.0);
        assert_abs_diff_eq!(occ.eval(7.0, 0.0), 1.0 / 3.0, epsilon = 1e-12);
        assert_eq!(occ.eval(11.0, 0.0), -1.0);

        let sum = ShapeField::new(shapes, ShapeStyle::Summed);
        assert_abs_diff_eq!(sum.eval(1.0, 0.0), 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sum.eval(7.0, 0.0), -1.0 / 3.0, epsilon = 1e-12);
    }
}
