//! Wave driven gradients
//!
//! A gradient lays a [`Wave`] across the plane: along x, outwards from the
//! origin, or around it. Position and orientation come from wrapping the
//! gradient in a [`crate::transform::Transform`].

use std::f64::consts::PI;

use crate::field::ScalarField;
use crate::wave::Wave;

/// `wave(x)`
#[derive(Debug, Clone)]
pub struct LinearGradient<W> {
    pub wave: W,
}

impl<W: Wave> LinearGradient<W> {
    pub fn new(wave: W) -> Self {
        Self { wave }
    }
}

impl<W: Wave> ScalarField for LinearGradient<W> {
    fn eval(&self, x: f64, _y: f64) -> f64 {
        self.wave.eval(x)
    }
}

/// `wave(|(x, y)|)`
#[derive(Debug, Clone)]
pub struct RadialGradient<W> {
    pub wave: W,
}

impl<W: Wave> RadialGradient<W> {
    pub fn new(wave: W) -> Self {
        Self { wave }
    }
}

impl<W: Wave> ScalarField for RadialGradient<W> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        self.wave.eval(x.hypot(y))
    }
}

/// One wavelength swept around the origin, starting on the negative x axis.
#[derive(Debug, Clone)]
pub struct ConicGradient<W> {
    pub wave: W,
}

impl<W: Wave> ConicGradient<W> {
    pub fn new(wave: W) -> Self {
        Self { wave }
    }
}

impl<W: Wave> ScalarField for ConicGradient<W> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        // [-pi, pi] onto [0, lambda]
        let v = (y.atan2(x) / PI + 1.0) * self.wave.lambda() / 2.0;
        self.wave.eval(v)
    }
}
