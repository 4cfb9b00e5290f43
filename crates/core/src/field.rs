//! Field protocol
//!
//! Every node in a texture tree implements one of three capability traits:
//!
//! - [`ScalarField`]: `(x, y) -> v` with `v` in [-1, 1]
//! - [`VectorField`]: `(x, y) -> Vec<f64>`, typically a normal triplet
//! - [`ColorField`]: `(x, y) -> Color`
//!
//! Evaluation is total over the reals. A field that does not cover the whole
//! plane returns a fixed sentinel (0, the zero vector, or black) outside its
//! domain. Nodes are immutable once built; the only interior mutation allowed
//! is a bounded memoization cache that never changes the observable value.

use std::sync::Arc;

use crate::color::Color;

/// A field of values in [-1, 1].
pub trait ScalarField: Send + Sync {
    /// Value of the field at `(x, y)`.
    fn eval(&self, x: f64, y: f64) -> f64;
}

/// A field of vectors, each component nominally in [-1, 1].
pub trait VectorField: Send + Sync {
    /// Vector at `(x, y)`.
    fn eval(&self, x: f64, y: f64) -> Vec<f64>;
}

/// A field of colors.
pub trait ColorField: Send + Sync {
    /// Color at `(x, y)`.
    fn eval(&self, x: f64, y: f64) -> Color;
}

macro_rules! forward_field {
    ($tr:ident, $out:ty) => {
        impl<T: $tr + ?Sized> $tr for &T {
            #[inline]
            fn eval(&self, x: f64, y: f64) -> $out {
                (**self).eval(x, y)
            }
        }

        impl<T: $tr + ?Sized> $tr for Box<T> {
            #[inline]
            fn eval(&self, x: f64, y: f64) -> $out {
                (**self).eval(x, y)
            }
        }

        impl<T: $tr + ?Sized> $tr for Arc<T> {
            #[inline]
            fn eval(&self, x: f64, y: f64) -> $out {
                (**self).eval(x, y)
            }
        }
    };
}

forward_field!(ScalarField, f64);
forward_field!(VectorField, Vec<f64>);
forward_field!(ColorField, Color);

/// Implements all three field traits for a node that only remaps the
/// coordinate before evaluating `self.src`. The node supplies an inherent
/// `map(&self, x, y) -> (f64, f64)`. The source must be the first type
/// parameter; further parameters are listed with their bounds.
macro_rules! remap_fields {
    ($ty:ident $(, $g:ident : $b:path)*) => {
        impl<S: $crate::field::ScalarField $(, $g: $b)*> $crate::field::ScalarField
            for $ty<S $(, $g)*>
        {
            fn eval(&self, x: f64, y: f64) -> f64 {
                let (x, y) = self.map(x, y);
                self.src.eval(x, y)
            }
        }

        impl<S: $crate::field::VectorField $(, $g: $b)*> $crate::field::VectorField
            for $ty<S $(, $g)*>
        {
            fn eval(&self, x: f64, y: f64) -> Vec<f64> {
                let (x, y) = self.map(x, y);
                self.src.eval(x, y)
            }
        }

        impl<S: $crate::field::ColorField $(, $g: $b)*> $crate::field::ColorField
            for $ty<S $(, $g)*>
        {
            fn eval(&self, x: f64, y: f64) -> $crate::color::Color {
                let (x, y) = self.map(x, y);
                self.src.eval(x, y)
            }
        }
    };
}

/// Owned scalar field trait object, the usual currency of tree builders.
pub type BoxedScalar = Box<dyn ScalarField>;
/// Owned vector field trait object.
pub type BoxedVector = Box<dyn VectorField>;
/// Owned color field trait object.
pub type BoxedColor = Box<dyn ColorField>;

/// Clamp a value into [-1, 1].
#[inline]
pub fn clamp(v: f64) -> f64 {
    v.clamp(-1.0, 1.0)
}

/// Linear interpolation from `start` (t = 0) to `end` (t = 1).
#[inline]
pub(crate) fn lerp(t: f64, start: f64, end: f64) -> f64 {
    (1.0 - t) * start + t * end
}

/// Map a value in [-1, 1] to [0, 1].
#[inline]
pub(crate) fn to_unit(v: f64) -> f64 {
    (v + 1.0) / 2.0
}

/// Map a value in [0, 1] to [-1, 1].
#[inline]
pub(crate) fn from_unit(t: f64) -> f64 {
    t * 2.0 - 1.0
}

/// Constant scalar field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    pub value: f64,
}

impl Uniform {
    /// Creates a constant field. The value is clamped to [-1, 1].
    pub fn new(value: f64) -> Self {
        Self {
            value: clamp(value),
        }
    }
}

impl ScalarField for Uniform {
    fn eval(&self, _x: f64, _y: f64) -> f64 {
        self.value
    }
}

/// Constant vector field.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformVector {
    pub value: Vec<f64>,
}

impl UniformVector {
    pub fn new(value: Vec<f64>) -> Self {
        Self { value }
    }

    /// The unit normal pointing straight up out of the XY plane.
    pub fn default_normal() -> Self {
        Self::new(DEFAULT_NORMAL.to_vec())
    }
}

impl VectorField for UniformVector {
    fn eval(&self, _x: f64, _y: f64) -> Vec<f64> {
        self.value.clone()
    }
}

/// Surface normal used when no normal map is supplied.
pub const DEFAULT_NORMAL: [f64; 3] = [0.0, 0.0, 1.0];

/// Constant color field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformColor {
    pub value: Color,
}

impl UniformColor {
    pub fn new(value: Color) -> Self {
        Self { value }
    }
}

impl ColorField for UniformColor {
    fn eval(&self, _x: f64, _y: f64) -> Color {
        self.value
    }
}

/// Axis-aligned rectangle, inclusive on all edges.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Rect {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        !(x < self.min[0] || x > self.max[0] || y < self.min[1] || y > self.max[1])
    }
}

/// Returns `inside` within the rectangle and `outside` everywhere else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxField {
    pub rect: Rect,
    pub inside: f64,
    pub outside: f64,
}

impl BoxField {
    pub fn new(rect: Rect, inside: f64, outside: f64) -> Self {
        Self {
            rect,
            inside: clamp(inside),
            outside: clamp(outside),
        }
    }
}

impl ScalarField for BoxField {
    fn eval(&self, x: f64, y: f64) -> f64 {
        if self.rect.contains(x, y) {
            self.inside
        } else {
            self.outside
        }
    }
}

/// Passes the source through inside the rectangle, a constant outside.
#[derive(Debug, Clone)]
pub struct Window<S> {
    pub src: S,
    pub rect: Rect,
    pub outside: f64,
}

impl<S: ScalarField> Window<S> {
    pub fn new(src: S, rect: Rect, outside: f64) -> Self {
        Self {
            src,
            rect,
            outside: clamp(outside),
        }
    }
}

impl<S: ScalarField> ScalarField for Window<S> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        if self.rect.contains(x, y) {
            self.src.eval(x, y)
        } else {
            self.outside
        }
    }
}

/// First source inside the rectangle, second source outside.
#[derive(Debug, Clone)]
pub struct Window2<A, B> {
    pub inside: A,
    pub outside: B,
    pub rect: Rect,
}

impl<A: ScalarField, B: ScalarField> Window2<A, B> {
    pub fn new(inside: A, outside: B, rect: Rect) -> Self {
        Self {
            inside,
            outside,
            rect,
        }
    }
}

impl<A: ScalarField, B: ScalarField> ScalarField for Window2<A, B> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        if self.rect.contains(x, y) {
            self.inside.eval(x, y)
        } else {
            self.outside.eval(x, y)
        }
    }
}

/// Adapter turning a closure into a scalar field. Handy in tests and for
/// one-off analytic leaves that don't deserve a named type.
pub struct FnField<F>(pub F);

impl<F> ScalarField for FnField<F>
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn eval(&self, x: f64, y: f64) -> f64 {
        (self.0)(x, y)
    }
}
