//! One dimensional pattern generators
//!
//! A [`Generator`] projects `(x, y)` onto a direction, wraps the projection
//! into a wavelength and feeds the resulting `t` in [0, 1] to a [`GenFunc`].
//! `center` skews where within the period `t` reaches 0.5 and `phase`
//! shifts the period start. [`Multi`] does the same over a run of differing
//! wavelengths.

use std::f64::consts::{FRAC_PI_2, TAU};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TextureError};
use crate::field::ScalarField;
use crate::filter::{post, FilterOp};
use crate::noise::Perlin;
use crate::nonlinear::NonLinear;

/// Direction components within this distance of 0 or ±1 snap onto it.
const AXIS_EPSILON: f64 = 0.000_001;

/// Generator function mapping `t` in [0, 1] to [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "func", rename_all = "snake_case")]
pub enum GenFunc {
    Flat { value: f64 },
    /// Sine starting from its minimum
    Sin,
    Square,
    Triangle,
    Saw,
    /// One shaping function used for the rising and falling half
    Nl1 { nl: NonLinear },
    Nl2 { up: NonLinear, down: NonLinear },
    /// A horizontal run through Perlin noise
    Noise1d {
        scale: f64,
        seed: u64,
        #[serde(default)]
        offset: [f64; 2],
    },
}

impl GenFunc {
    fn eval(&self, t: f64, noise: Option<&Perlin>) -> f64 {
        match self {
            Self::Flat { value } => *value,
            Self::Sin => (t * TAU - FRAC_PI_2).sin(),
            Self::Square => {
                if t > 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Self::Triangle => {
                let v = if t < 0.5 { t * 2.0 } else { (1.0 - t) * 2.0 };
                v * 2.0 - 1.0
            }
            Self::Saw => t * 2.0 - 1.0,
            Self::Nl1 { nl } => up_down(nl, nl, t),
            Self::Nl2 { up, down } => up_down(up, down, t),
            Self::Noise1d { scale, offset, .. } => {
                noise.map_or(0.0, |p| p.noise(t * scale + offset[0], offset[1]))
            }
        }
    }

    /// Perlin instance backing [`GenFunc::Noise1d`].
    fn noise(&self) -> Option<Perlin> {
        match self {
            Self::Noise1d { seed, .. } => Some(Perlin::new(*seed)),
            _ => None,
        }
    }
}

fn up_down(up: &NonLinear, down: &NonLinear, t: f64) -> f64 {
    let v = if t < 0.5 {
        up.transform(2.0 * t)
    } else {
        down.transform(2.0 * (1.0 - t))
    };
    v * 2.0 - 1.0
}

fn snap(v: f64) -> f64 {
    for target in [0.0, 1.0, -1.0] {
        if (v - target).abs() < AXIS_EPSILON {
            return target;
        }
    }
    v
}

/// Skew `t` so that `center` maps to 0.5.
fn skew(t: f64, center: f64) -> f64 {
    if t <= center {
        t * 0.5 / center
    } else {
        0.5 * (t - center) / (1.0 - center) + 0.5
    }
}

/// Wrap `v` into `[0, lambda]`. An exact multiple above zero stays at
/// `lambda`.
fn wrap(mut v: f64, lambda: f64) -> f64 {
    if v < 0.0 {
        v += (-v / lambda).ceil() * lambda;
    }
    if v > lambda {
        v -= (v / lambda - 1.0).ceil() * lambda;
    }
    v
}

/// Periodic pattern along a direction.
#[derive(Debug, Clone)]
pub struct Generator {
    /// Wavelength, at least 1
    pub lambda: f64,
    /// Position in the period mapped to t = 0.5, in (0, 1)
    pub center: f64,
    /// Period offset in [0, 1]
    pub phase: f64,
    pub func: GenFunc,
    pub filter: Option<FilterOp>,
    pub theta: f64,
    cos_th: f64,
    sin_th: f64,
    noise: Option<Perlin>,
}

impl Generator {
    /// # Arguments
    ///
    /// * `lambda` - Wavelength, values below 1 are raised to 1
    /// * `theta` - Direction of travel in radians
    /// * `func` - Pattern for one period
    #[must_use]
    pub fn new(lambda: f64, theta: f64, func: GenFunc) -> Self {
        let noise = func.noise();
        Self {
            lambda: lambda.max(1.0),
            center: 0.5,
            phase: 0.0,
            func,
            filter: None,
            theta,
            cos_th: snap(theta.cos()),
            sin_th: snap(theta.sin()),
            noise,
        }
    }

    /// Center is kept strictly inside (0, 1).
    pub fn with_center(mut self, center: f64) -> Self {
        self.center = center.clamp(AXIS_EPSILON, 1.0 - AXIS_EPSILON);
        self
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase.clamp(0.0, 1.0);
        self
    }

    pub fn with_filter(mut self, filter: FilterOp) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Map a projected distance to the generator parameter `t`.
    pub fn v_to_t(&self, v: f64) -> f64 {
        let v = wrap(v, self.lambda);
        let mut t = v / self.lambda + self.phase;
        if t > 1.0 {
            t -= 1.0;
        }
        skew(t, self.center)
    }
}

impl ScalarField for Generator {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let v = x * self.cos_th + y * self.sin_th;
        let g = self.func.eval(self.v_to_t(v), self.noise.as_ref());
        post(self.filter.as_ref(), g)
    }
}

/// Generator over a repeating run of wavelengths.
#[derive(Debug, Clone)]
pub struct Multi {
    pub lambdas: Vec<f64>,
    pub center: f64,
    pub phase: f64,
    pub func: GenFunc,
    pub filter: Option<FilterOp>,
    pub theta: f64,
    sums: Vec<f64>,
    cos_th: f64,
    sin_th: f64,
    noise: Option<Perlin>,
}

impl Multi {
    /// Wavelengths below 1 are raised to 1.
    pub fn new(lambdas: Vec<f64>, theta: f64, func: GenFunc) -> Result<Self> {
        if lambdas.is_empty() {
            return Err(TextureError::EmptyWave);
        }
        let lambdas: Vec<f64> = lambdas.into_iter().map(|l| l.max(1.0)).collect();
        let mut sum = 0.0;
        let sums = lambdas
            .iter()
            .map(|l| {
                sum += l;
                sum
            })
            .collect();
        let noise = func.noise();
        Ok(Self {
            lambdas,
            center: 0.5,
            phase: 0.0,
            func,
            filter: None,
            theta,
            sums,
            cos_th: theta.cos(),
            sin_th: theta.sin(),
            noise,
        })
    }

    /// `n` wavelengths drawn between 50% and 100% of `lambda`.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        n: usize,
        lambda: f64,
        theta: f64,
        func: GenFunc,
    ) -> Result<Self> {
        let half = lambda / 2.0;
        let lambdas = (0..n).map(|_| (1.0 + rng.random::<f64>()) * half).collect();
        Self::new(lambdas, theta, func)
    }

    pub fn with_filter(mut self, filter: FilterOp) -> Self {
        self.filter = Some(filter);
        self
    }

    fn total(&self) -> f64 {
        self.sums[self.sums.len() - 1]
    }

    pub fn v_to_t(&self, v: f64) -> f64 {
        let v = wrap(v, self.total());
        let mut i = 0;
        while i < self.sums.len() - 1 && v > self.sums[i] {
            i += 1;
        }
        let start = if i > 0 { self.sums[i - 1] } else { 0.0 };
        let mut t = (v - start) / self.lambdas[i] + self.phase;
        if t > 1.0 {
            t -= 1.0;
        }
        skew(t, self.center)
    }
}

impl ScalarField for Multi {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let v = x * self.cos_th + y * self.sin_th;
        let g = self.func.eval(self.v_to_t(v), self.noise.as_ref());
        post(self.filter.as_ref(), g)
    }
}
