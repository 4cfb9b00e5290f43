//! Color fields built from scalar and vector fields
//!
//! Scalars in [-1, 1] become color channels in [0, 1]. [`ColorConv`] runs a
//! scalar through a multi-stop [`ColorNl`] ramp; [`ColorBlend`] and
//! [`ColorSubstitute`] mix two color fields under control of a third scalar.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::color::{Color, ColorLerp};
use crate::error::{Result, TextureError};
use crate::field::{to_unit, ColorField, ScalarField, VectorField};
use crate::nonlinear::NonLinear;

/// Gray level from a scalar field.
#[derive(Debug, Clone)]
pub struct ColorGray<S> {
    pub src: S,
}

impl<S: ScalarField> ColorGray<S> {
    pub fn new(src: S) -> Self {
        Self { src }
    }
}

impl<S: ScalarField> ColorField for ColorGray<S> {
    fn eval(&self, x: f64, y: f64) -> Color {
        Color::gray(to_unit(self.src.eval(x, y)).clamp(0.0, 1.0))
    }
}

/// Channels taken from three scalar fields, and alpha from an optional
/// fourth (opaque when absent). `hsl` selects HSLA over RGBA.
#[derive(Debug, Clone)]
pub struct ColorFields<S> {
    pub srcs: [S; 3],
    pub alpha: Option<S>,
    pub hsl: bool,
}

impl<S: ScalarField> ColorFields<S> {
    pub fn new(srcs: [S; 3], alpha: Option<S>, hsl: bool) -> Self {
        Self { srcs, alpha, hsl }
    }
}

impl<S: ScalarField> ColorField for ColorFields<S> {
    fn eval(&self, x: f64, y: f64) -> Color {
        let [c1, c2, c3] = [0, 1, 2].map(|i| to_unit(self.srcs[i].eval(x, y)).clamp(0.0, 1.0));
        let a = self
            .alpha
            .as_ref()
            .map_or(1.0, |s| to_unit(s.eval(x, y)).clamp(0.0, 1.0));
        if self.hsl {
            Color::hsla(c1, c2, c3, a)
        } else {
            Color::rgba(c1, c2, c3, a)
        }
    }
}

/// RGBA from the first four components of a vector field. Missing color
/// components read as -1 and a missing alpha as opaque.
#[derive(Debug, Clone)]
pub struct ColorVector<V> {
    pub src: V,
}

impl<V: VectorField> ColorVector<V> {
    pub fn new(src: V) -> Self {
        Self { src }
    }
}

impl<V: VectorField> ColorField for ColorVector<V> {
    fn eval(&self, x: f64, y: f64) -> Color {
        let v = self.src.eval(x, y);
        let ch = |i: usize, dflt: f64| to_unit(v.get(i).copied().unwrap_or(dflt)).clamp(0.0, 1.0);
        Color::rgba(ch(0, -1.0), ch(1, -1.0), ch(2, -1.0), ch(3, 1.0))
    }
}

/// One interior stop of a [`ColorNl`] ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub t: f64,
    pub color: Color,
}

/// Color ramp from `start` at t = 0 to `end` at t = 1 through optional
/// interior stops. The parameter is shaped by `nl` before the stop lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorNlParams", into = "ColorNlParams")]
pub struct ColorNl {
    pub nl: NonLinear,
    pub lerp: ColorLerp,
    tvals: Vec<f64>,
    colors: Vec<Color>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColorNlParams {
    start: Color,
    end: Color,
    #[serde(default)]
    stops: Vec<ColorStop>,
    #[serde(default)]
    nl: NonLinear,
    #[serde(default)]
    lerp: ColorLerp,
}

impl ColorNl {
    /// Two color ramp.
    pub fn simple(start: Color, end: Color, nl: NonLinear, lerp: ColorLerp) -> Self {
        Self {
            nl,
            lerp,
            tvals: vec![0.0, 1.0],
            colors: vec![start, end],
        }
    }

    /// Interior stop positions must be strictly increasing inside (0, 1).
    pub fn new(
        start: Color,
        end: Color,
        stops: &[ColorStop],
        nl: NonLinear,
        lerp: ColorLerp,
    ) -> Result<Self> {
        let mut tvals = Vec::with_capacity(stops.len() + 2);
        let mut colors = Vec::with_capacity(stops.len() + 2);
        tvals.push(0.0);
        colors.push(start);
        for s in stops {
            let last = tvals[tvals.len() - 1];
            if !(s.t > last && s.t < 1.0) {
                return Err(TextureError::InvalidStops(format!(
                    "stop at {} must lie in ({}, 1)",
                    s.t, last
                )));
            }
            tvals.push(s.t);
            colors.push(s.color);
        }
        tvals.push(1.0);
        colors.push(end);
        Ok(Self {
            nl,
            lerp,
            tvals,
            colors,
        })
    }

    /// Color at `t` in [0, 1].
    pub fn color_at(&self, t: f64) -> Color {
        let t = self.nl.transform(t);
        let n = self.tvals.len();
        // First segment whose end is at or past t
        let i = self.tvals[1..]
            .iter()
            .position(|&tv| t <= tv)
            .unwrap_or(n - 2);
        let (t0, t1) = (self.tvals[i], self.tvals[i + 1]);
        let local = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
        self.lerp.lerp(local, self.colors[i], self.colors[i + 1])
    }
}

impl TryFrom<ColorNlParams> for ColorNl {
    type Error = TextureError;

    fn try_from(p: ColorNlParams) -> Result<Self> {
        Self::new(p.start, p.end, &p.stops, p.nl, p.lerp)
    }
}

impl From<ColorNl> for ColorNlParams {
    fn from(c: ColorNl) -> Self {
        let n = c.colors.len();
        let stops = (1..n - 1)
            .map(|i| ColorStop {
                t: c.tvals[i],
                color: c.colors[i],
            })
            .collect();
        Self {
            start: c.colors[0],
            end: c.colors[n - 1],
            stops,
            nl: c.nl,
            lerp: c.lerp,
        }
    }
}

/// Maps a scalar field through a color ramp.
#[derive(Debug, Clone)]
pub struct ColorConv<S> {
    pub src: S,
    pub ramp: ColorNl,
}

impl<S: ScalarField> ColorConv<S> {
    pub fn new(src: S, ramp: ColorNl) -> Self {
        Self { src, ramp }
    }
}

impl<S: ScalarField> ColorField for ColorConv<S> {
    fn eval(&self, x: f64, y: f64) -> Color {
        self.ramp.color_at(to_unit(self.src.eval(x, y)))
    }
}

/// `src1` at `src3 = -1` through to `src2` at `src3 = 1`.
#[derive(Debug, Clone)]
pub struct ColorBlend<A, B, S> {
    pub src1: A,
    pub src2: B,
    pub src3: S,
    pub lerp: ColorLerp,
}

impl<A: ColorField, B: ColorField, S: ScalarField> ColorBlend<A, B, S> {
    pub fn new(src1: A, src2: B, src3: S, lerp: ColorLerp) -> Self {
        Self {
            src1,
            src2,
            src3,
            lerp,
        }
    }
}

impl<A: ColorField, B: ColorField, S: ScalarField> ColorField for ColorBlend<A, B, S> {
    fn eval(&self, x: f64, y: f64) -> Color {
        let t = to_unit(self.src3.eval(x, y)).clamp(0.0, 1.0);
        self.lerp.lerp(t, self.src1.eval(x, y), self.src2.eval(x, y))
    }
}

/// `src2` where `src3` lies in `[start, end]`, `src1` elsewhere.
#[derive(Debug, Clone)]
pub struct ColorSubstitute<A, B, S> {
    pub src1: A,
    pub src2: B,
    pub src3: S,
    pub start: f64,
    pub end: f64,
}

impl<A: ColorField, B: ColorField, S: ScalarField> ColorSubstitute<A, B, S> {
    pub fn new(src1: A, src2: B, src3: S, start: f64, end: f64) -> Self {
        Self {
            src1,
            src2,
            src3,
            start,
            end,
        }
    }
}

impl<A: ColorField, B: ColorField, S: ScalarField> ColorField for ColorSubstitute<A, B, S> {
    fn eval(&self, x: f64, y: f64) -> Color {
        let v = self.src3.eval(x, y);
        if v < self.start || v > self.end {
            self.src1.eval(x, y)
        } else {
            self.src2.eval(x, y)
        }
    }
}

/// Channel order for [`ColorSinCos`], naming which of `sin(pi v)`,
/// `cos(pi v)` and `v` itself lands in the first, second and third channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinCosMode {
    #[default]
    SinCosValue,
    SinValueCos,
    CosSinValue,
    CosValueSin,
    ValueSinCos,
    ValueCosSin,
}

impl SinCosMode {
    pub const ALL: [Self; 6] = [
        Self::SinCosValue,
        Self::SinValueCos,
        Self::CosSinValue,
        Self::CosValueSin,
        Self::ValueSinCos,
        Self::ValueCosSin,
    ];

    fn order(self, s: f64, c: f64, v: f64) -> [f64; 3] {
        match self {
            Self::SinCosValue => [s, c, v],
            Self::SinValueCos => [s, v, c],
            Self::CosSinValue => [c, s, v],
            Self::CosValueSin => [c, v, s],
            Self::ValueSinCos => [v, s, c],
            Self::ValueCosSin => [v, c, s],
        }
    }
}

/// Colors a scalar field by feeding the sine, cosine and value of the
/// sample into the three channels of an RGB or HSL color.
#[derive(Debug, Clone)]
pub struct ColorSinCos<S> {
    pub src: S,
    pub mode: SinCosMode,
    pub hsl: bool,
}

impl<S: ScalarField> ColorSinCos<S> {
    pub fn new(src: S, mode: SinCosMode, hsl: bool) -> Self {
        Self { src, mode, hsl }
    }
}

impl<S: ScalarField> ColorField for ColorSinCos<S> {
    fn eval(&self, x: f64, y: f64) -> Color {
        let v = self.src.eval(x, y).clamp(-1.0, 1.0);
        let (s, c) = (v * PI).sin_cos();
        let [c1, c2, c3] = self.mode.order(to_unit(s), to_unit(c), to_unit(v));
        if self.hsl {
            Color::hsla(c1, c2, c3, 1.0)
        } else {
            Color::rgba(c1, c2, c3, 1.0)
        }
    }
}
