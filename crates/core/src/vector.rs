//! Vector fields and conversions between field kinds
//!
//! Builders go from scalars or colors to vectors ([`VectorFields`],
//! [`VectorColor`], [`Normal`]) and reducers go back to scalars
//! ([`Direction`], [`Magnitude`], [`Select`], [`Weighted`], [`ColorToGray`],
//! [`ColorSelect`], [`VectorCombine`]).

use std::f64::consts::FRAC_1_PI;

use serde::{Deserialize, Serialize};

use crate::combine::TernaryOp;
use crate::error::{Result, TextureError};
use crate::field::{clamp, from_unit, ColorField, ScalarField, VectorField};

/// One vector component per scalar source.
#[derive(Debug, Clone)]
pub struct VectorFields<S> {
    pub srcs: Vec<S>,
}

impl<S: ScalarField> VectorFields<S> {
    pub fn new(srcs: Vec<S>) -> Result<Self> {
        if srcs.is_empty() {
            return Err(TextureError::EmptySources);
        }
        Ok(Self { srcs })
    }
}

impl<S: ScalarField> VectorField for VectorFields<S> {
    fn eval(&self, x: f64, y: f64) -> Vec<f64> {
        self.srcs.iter().map(|s| s.eval(x, y)).collect()
    }
}

/// The straight RGBA channels of a color field mapped to [-1, 1].
#[derive(Debug, Clone)]
pub struct VectorColor<C> {
    pub src: C,
}

impl<C: ColorField> VectorColor<C> {
    pub fn new(src: C) -> Self {
        Self { src }
    }
}

impl<C: ColorField> VectorField for VectorColor<C> {
    fn eval(&self, x: f64, y: f64) -> Vec<f64> {
        let c = self.src.eval(x, y).to_rgba();
        vec![from_unit(c.r), from_unit(c.g), from_unit(c.b), from_unit(c.a)]
    }
}

/// Unit surface normals of a height field by central differences.
///
/// Each query costs four source evaluations, which multiplies quickly when
/// normals of composite fields are themselves composed.
#[derive(Debug, Clone)]
pub struct Normal<S> {
    pub src: S,
    pub dx: f64,
    pub dy: f64,
    sdx: f64,
    sdy: f64,
}

impl<S: ScalarField> Normal<S> {
    /// # Arguments
    ///
    /// * `sx`, `sy` - Height scale along each axis
    /// * `dx`, `dy` - Half the sample spacing along each axis, must be positive
    pub fn new(src: S, sx: f64, sy: f64, dx: f64, dy: f64) -> Result<Self> {
        let dx = crate::error::positive("normal dx", dx)?;
        let dy = crate::error::positive("normal dy", dy)?;
        Ok(Self {
            src,
            dx,
            dy,
            sdx: sx / (2.0 * dx),
            sdy: sy / (2.0 * dy),
        })
    }
}

impl<S: ScalarField> VectorField for Normal<S> {
    fn eval(&self, x: f64, y: f64) -> Vec<f64> {
        let dx = (self.src.eval(x - self.dx, y) - self.src.eval(x + self.dx, y)) * self.sdx;
        let dy = (self.src.eval(x, y - self.dy) - self.src.eval(x, y + self.dy)) * self.sdy;
        let div = 1.0 / (dx * dx + dy * dy + 1.0).sqrt();
        vec![dx * div, dy * div, div]
    }
}

/// Unit length version of a vector field. Zero vectors pass through.
#[derive(Debug, Clone)]
pub struct UnitVector<V> {
    pub src: V,
}

impl<V: VectorField> UnitVector<V> {
    pub fn new(src: V) -> Self {
        Self { src }
    }
}

impl<V: VectorField> VectorField for UnitVector<V> {
    fn eval(&self, x: f64, y: f64) -> Vec<f64> {
        let mut v = self.src.eval(x, y);
        let len = v.iter().map(|f| f * f).sum::<f64>().sqrt();
        if len > 0.0 {
            v.iter_mut().for_each(|f| *f /= len);
        }
        v
    }
}

/// Angle of the vector in the XY plane, scaled from [-pi, pi] to [-1, 1].
#[derive(Debug, Clone)]
pub struct Direction<V> {
    pub src: V,
}

impl<V: VectorField> Direction<V> {
    pub fn new(src: V) -> Self {
        Self { src }
    }
}

impl<V: VectorField> ScalarField for Direction<V> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let v = self.src.eval(x, y);
        let (vx, vy) = (component(&v, 0), component(&v, 1));
        vy.atan2(vx) * FRAC_1_PI
    }
}

/// Scaled vector length, clamped. Never negative.
#[derive(Debug, Clone)]
pub struct Magnitude<V> {
    pub src: V,
    pub scale: f64,
}

impl<V: VectorField> Magnitude<V> {
    pub fn new(src: V, scale: f64) -> Self {
        Self { src, scale }
    }
}

impl<V: VectorField> ScalarField for Magnitude<V> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let v = self.src.eval(x, y);
        clamp(v.iter().map(|f| f * f).sum::<f64>().sqrt() * self.scale)
    }
}

/// One scaled component of a vector field, clamped. Components past the end
/// of the vector read as 0.
#[derive(Debug, Clone)]
pub struct Select<V> {
    pub src: V,
    pub channel: usize,
    pub scale: f64,
}

impl<V: VectorField> Select<V> {
    pub fn new(src: V, channel: usize, scale: f64) -> Self {
        Self {
            src,
            channel,
            scale,
        }
    }
}

impl<V: VectorField> ScalarField for Select<V> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        clamp(component(&self.src.eval(x, y), self.channel) * self.scale)
    }
}

/// Dot product of the vector with fixed weights, clamped. Missing weights
/// count as 0.
#[derive(Debug, Clone)]
pub struct Weighted<V> {
    pub src: V,
    pub weights: Vec<f64>,
}

impl<V: VectorField> Weighted<V> {
    pub fn new(src: V, weights: Vec<f64>) -> Self {
        Self { src, weights }
    }
}

impl<V: VectorField> ScalarField for Weighted<V> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let v = self.src.eval(x, y);
        clamp(v.iter().zip(&self.weights).map(|(a, w)| a * w).sum())
    }
}

/// Applies a ternary operator to the first three vector components.
#[derive(Debug, Clone)]
pub struct VectorCombine<V> {
    pub src: V,
    pub op: TernaryOp,
}

impl<V: VectorField> VectorCombine<V> {
    pub fn new(src: V, op: TernaryOp) -> Self {
        Self { src, op }
    }
}

impl<V: VectorField> ScalarField for VectorCombine<V> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let v = self.src.eval(x, y);
        clamp(self.op.apply(component(&v, 0), component(&v, 1), component(&v, 2)))
    }
}

/// Luma of a color field mapped to [-1, 1].
#[derive(Debug, Clone)]
pub struct ColorToGray<C> {
    pub src: C,
}

impl<C: ColorField> ColorToGray<C> {
    pub fn new(src: C) -> Self {
        Self { src }
    }
}

impl<C: ColorField> ScalarField for ColorToGray<C> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        from_unit(self.src.eval(x, y).luma())
    }
}

/// Premultiplied RGBA channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[default]
    Red,
    Green,
    Blue,
    Alpha,
}

/// One premultiplied channel of a color field mapped to [-1, 1].
#[derive(Debug, Clone)]
pub struct ColorSelect<C> {
    pub src: C,
    pub channel: Channel,
}

impl<C: ColorField> ColorSelect<C> {
    pub fn new(src: C, channel: Channel) -> Self {
        Self { src, channel }
    }
}

impl<C: ColorField> ScalarField for ColorSelect<C> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let (r, g, b, a) = self.src.eval(x, y).to_rgba().to_premultiplied();
        let v = match self.channel {
            Channel::Red => r,
            Channel::Green => g,
            Channel::Blue => b,
            Channel::Alpha => a,
        };
        from_unit(v.clamp(0.0, 1.0))
    }
}

#[inline]
fn component(v: &[f64], i: usize) -> f64 {
    v.get(i).copied().unwrap_or(0.0)
}
