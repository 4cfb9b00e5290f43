//! Value filters
//!
//! A filter maps a value in [-1, 1] to another in [-1, 1]. Most take `a` and
//! `b` parameters and operate on `a * v + b`. [`FilterOp`] covers the
//! parameterized set, [`RandQuantize`] the seeded bucket shuffle.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::field::{clamp, from_unit, to_unit, ScalarField};
use crate::nonlinear::NonLinear;

/// Parameterized value filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterOp {
    /// `a * v + b` into one of `c` evenly spaced levels (`c >= 2`)
    Quantize { a: f64, b: f64, c: usize },
    /// `a * v + b`, clamped
    Clip { a: f64, b: f64 },
    /// `sin(a * v) + b`, clamped
    Sine { a: f64, b: f64 },
    /// `|a * v + b|`, clamped
    Abs { a: f64, b: f64 },
    /// `v^a + b`, clamped. Negative values keep their sign.
    Pow { a: f64, b: f64 },
    /// `e^-(a (v + b))²`, clamped
    Gaussian { a: f64, b: f64 },
    /// `a * v + b` folded back into [-1, 1]
    Fold { a: f64, b: f64 },
    Invert,
    /// `a * (b + v)`, clamped
    OffsetScale { a: f64, b: f64 },
    /// Limit to `[-1, c]`
    Ceil { c: f64 },
    /// Limit to `[c, 1]`
    Floor { c: f64 },
    /// Map [-1, 1] linearly onto `[a, b]`
    Remap { a: f64, b: f64 },
    NonLinear { nl: NonLinear },
    /// `b` below the threshold `a`, `c` at or above it
    Threshold { a: f64, b: f64, c: f64 },
    RandQuantize(RandQuantize),
}

impl FilterOp {
    pub fn apply(&self, v: f64) -> f64 {
        match self {
            Self::Quantize { a, b, c } => quantize(*a, *b, *c, v),
            Self::Clip { a, b } => clamp(a * v + b),
            Self::Sine { a, b } => clamp((a * v).sin() + b),
            Self::Abs { a, b } => clamp((a * v + b).abs()),
            Self::Pow { a, b } => clamp(v.signum() * v.abs().powf(*a) + b),
            Self::Gaussian { a, b } => {
                let t = (v + b) * a;
                clamp((-t * t).exp())
            }
            Self::Fold { a, b } => fold(a * v + b),
            Self::Invert => -v,
            Self::OffsetScale { a, b } => clamp(a * (b + v)),
            Self::Ceil { c } => v.min(*c),
            Self::Floor { c } => v.max(*c),
            Self::Remap { a, b } => clamp(a + to_unit(v) * (b - a)),
            Self::NonLinear { nl } => nl.eval(to_unit(v)),
            Self::Threshold { a, b, c } => {
                if v < *a {
                    *b
                } else {
                    *c
                }
            }
            Self::RandQuantize(rq) => rq.apply(v),
        }
    }
}

fn quantize(a: f64, b: f64, c: usize, v: f64) -> f64 {
    let t = to_unit(clamp(a * v + b));
    let c = c.max(2) as f64;
    clamp(2.0 * (t * c).floor() / (c - 1.0) - 1.0)
}

/// Reflect a value back and forth until it lands in [-1, 1], like a
/// triangle wave around the boundaries.
pub fn fold(v: f64) -> f64 {
    let mut t = to_unit(v).abs();
    if t > 1.0 {
        let n = t.floor();
        t -= n;
        if n % 2.0 != 0.0 {
            t = 1.0 - t;
        }
    }
    from_unit(t)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RandQuantizeParams {
    a: f64,
    b: f64,
    c: usize,
    seed: u64,
}

/// Quantizer whose `c` evenly spaced levels are assigned to the buckets in a
/// seeded random order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RandQuantizeParams", into = "RandQuantizeParams")]
pub struct RandQuantize {
    pub a: f64,
    pub b: f64,
    pub c: usize,
    pub seed: u64,
    levels: Vec<f64>,
}

impl RandQuantize {
    /// `c` is raised to at least 2.
    #[must_use]
    pub fn new(a: f64, b: f64, c: usize, seed: u64) -> Self {
        let c = c.max(2);
        let dx = 2.0 / (c - 1) as f64;
        let mut levels = Vec::with_capacity(c);
        levels.push(-1.0);
        for i in 1..c {
            levels.push(clamp(levels[i - 1] + dx));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        levels.shuffle(&mut rng);
        Self {
            a,
            b,
            c,
            seed,
            levels,
        }
    }

    pub fn apply(&self, v: f64) -> f64 {
        let t = to_unit(clamp(self.a * v + self.b)) * self.c as f64;
        let k = (t.floor() as usize).min(self.c - 1);
        self.levels[k]
    }
}

impl From<RandQuantizeParams> for RandQuantize {
    fn from(p: RandQuantizeParams) -> Self {
        Self::new(p.a, p.b, p.c, p.seed)
    }
}

impl From<RandQuantize> for RandQuantizeParams {
    fn from(r: RandQuantize) -> Self {
        Self {
            a: r.a,
            b: r.b,
            c: r.c,
            seed: r.seed,
        }
    }
}

/// Filters applied in order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterChain {
    pub filters: Vec<FilterOp>,
}

impl FilterChain {
    pub fn new(filters: Vec<FilterOp>) -> Self {
        Self { filters }
    }

    pub fn apply(&self, v: f64) -> f64 {
        self.filters.iter().fold(v, |acc, f| f.apply(acc))
    }
}

/// Applies a filter chain to the source value.
#[derive(Debug, Clone)]
pub struct Filter<S> {
    pub src: S,
    pub chain: FilterChain,
}

impl<S: ScalarField> Filter<S> {
    pub fn new(src: S, op: FilterOp) -> Self {
        Self {
            src,
            chain: FilterChain::new(vec![op]),
        }
    }

    pub fn chain(src: S, chain: FilterChain) -> Self {
        Self { src, chain }
    }
}

impl<S: ScalarField> ScalarField for Filter<S> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        self.chain.apply(self.src.eval(x, y))
    }
}

/// Apply an optional post filter.
#[inline]
pub(crate) fn post(filter: Option<&FilterOp>, v: f64) -> f64 {
    match filter {
        Some(f) => f.apply(v),
        None => v,
    }
}
