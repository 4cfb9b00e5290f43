//! A value field bundled with its normals and colors

use std::sync::Arc;

use crate::color::{Color, ColorLerp};
use crate::color_field::{ColorConv, ColorNl, ColorStop};
use crate::error::Result;
use crate::field::{ColorField, ScalarField, VectorField};
use crate::nonlinear::NonLinear;
use crate::vector::Normal;

/// One height field viewed three ways: as values, as bump normals scaled
/// by the bump scale, and as colors from a three stop ramp.
pub struct Component<S: ?Sized> {
    pub value: Arc<S>,
    pub normals: Normal<Arc<S>>,
    pub colors: ColorConv<Arc<S>>,
}

impl<S: ScalarField + ?Sized> Component<S> {
    /// `colors` are placed at t = 0, 0.5 and 1 of the ramp.
    pub fn new(
        src: Arc<S>,
        colors: [Color; 3],
        nl: NonLinear,
        lerp: ColorLerp,
        bump_scale: f64,
    ) -> Result<Self> {
        let [start, mid, end] = colors;
        let ramp = ColorNl::new(start, end, &[ColorStop { t: 0.5, color: mid }], nl, lerp)?;
        Ok(Self {
            normals: Normal::new(Arc::clone(&src), bump_scale, bump_scale, 1.0, 1.0)?,
            colors: ColorConv::new(Arc::clone(&src), ramp),
            value: src,
        })
    }
}

impl<S: ScalarField + ?Sized> ScalarField for Component<S> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        self.value.eval(x, y)
    }
}

impl<S: ScalarField + ?Sized> VectorField for Component<S> {
    fn eval(&self, x: f64, y: f64) -> Vec<f64> {
        self.normals.eval(x, y)
    }
}

impl<S: ScalarField + ?Sized> ColorField for Component<S> {
    fn eval(&self, x: f64, y: f64) -> Color {
        self.colors.eval(x, y)
    }
}
