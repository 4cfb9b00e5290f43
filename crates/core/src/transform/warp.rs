//! Non-affine coordinate warps
//!
//! Each [`WarpFunc`] maps a query point to the point the source is sampled
//! at. Radial warps work in polar coordinates about their `center`.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::nonlinear::NonLinear;

/// Coordinate deformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "warp", rename_all = "snake_case")]
pub enum WarpFunc {
    /// Reshapes distances within `radius` of the center through `nl`.
    Radial {
        center: [f64; 2],
        radius: f64,
        nl: NonLinear,
    },
    /// Rotation growing linearly with distance, `k` radians per unit.
    Swirl { center: [f64; 2], k: f64 },
    /// Rotation by `angle` at the center fading to none at `radius`.
    Drain {
        center: [f64; 2],
        angle: f64,
        radius: f64,
    },
    /// Horizontal pinch towards the center line, strongest on it and decaying
    /// as `e^-(scale |dy|^power)`.
    PinchX {
        center: [f64; 2],
        amount: f64,
        scale: f64,
        power: f64,
    },
    /// Sideways sine displacement of x driven by y.
    RippleX {
        lambda: f64,
        amplitude: f64,
        phase: f64,
    },
    /// Sine displacement of the radius driven by the radius.
    RadialRipple {
        center: [f64; 2],
        lambda: f64,
        amplitude: f64,
        phase: f64,
    },
    /// Sine displacement of the angle driven by the radius.
    RadialWiggle {
        center: [f64; 2],
        lambda: f64,
        amplitude: f64,
        phase: f64,
    },
}

fn polar(center: [f64; 2], x: f64, y: f64) -> (f64, f64) {
    let (dx, dy) = (x - center[0], y - center[1]);
    (dx.hypot(dy), dy.atan2(dx))
}

/// Ripple wavelengths are taken as absolute and no shorter than one unit.
#[inline]
fn wavelength(lambda: f64) -> f64 {
    lambda.abs().max(1.0)
}

fn cartesian(center: [f64; 2], r: f64, th: f64) -> (f64, f64) {
    let (s, c) = th.sin_cos();
    (center[0] + r * c, center[1] + r * s)
}

impl WarpFunc {
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Self::Radial { center, radius, nl } => {
                let (r, th) = polar(*center, x, y);
                if r >= *radius || *radius <= 0.0 {
                    return (x, y);
                }
                cartesian(*center, radius * nl.transform(r / radius), th)
            }
            Self::Swirl { center, k } => {
                let (r, th) = polar(*center, x, y);
                cartesian(*center, r, th + k * r)
            }
            Self::Drain {
                center,
                angle,
                radius,
            } => {
                let (r, th) = polar(*center, x, y);
                if r >= *radius {
                    return (x, y);
                }
                cartesian(*center, r, th + angle * (1.0 - r / radius))
            }
            Self::PinchX {
                center,
                amount,
                scale,
                power,
            } => {
                let dy = (y - center[1]).abs();
                let f = 1.0 - amount * (-scale * dy.powf(*power)).exp();
                (center[0] + (x - center[0]) * f, y)
            }
            Self::RippleX {
                lambda,
                amplitude,
                phase,
            } => (x + amplitude * (TAU * (y + phase) / wavelength(*lambda)).sin(), y),
            Self::RadialRipple {
                center,
                lambda,
                amplitude,
                phase,
            } => {
                let (r, th) = polar(*center, x, y);
                let r = r + amplitude * (TAU * r / wavelength(*lambda) + phase).sin();
                cartesian(*center, r, th)
            }
            Self::RadialWiggle {
                center,
                lambda,
                amplitude,
                phase,
            } => {
                let (r, th) = polar(*center, x, y);
                let th = th + amplitude * (TAU * r / wavelength(*lambda) + phase).sin();
                cartesian(*center, r, th)
            }
        }
    }
}

/// Samples the source at `func(x, y)`.
#[derive(Debug, Clone)]
pub struct Warp<S> {
    pub src: S,
    pub func: WarpFunc,
}

impl<S> Warp<S> {
    pub fn new(src: S, func: WarpFunc) -> Self {
        Self { src, func }
    }

    #[inline]
    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        self.func.apply(x, y)
    }
}

remap_fields!(Warp);
