//! One dimensional waves
//!
//! A [`Wave`] describes the shape of a single period and its wavelength.
//! Gradients decide how the period is laid across the plane, so the two
//! concerns can be mixed freely.
//!
//! All waves are defined for every real input by periodic extension. The
//! optional `once` flag instead pins the value outside the first cycle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TextureError};
use crate::field::clamp;
use crate::nonlinear::NonLinear;

/// Offsets closer than this to a cycle boundary snap onto it.
const SNAP_EPSILON: f64 = 0.000_001;

/// A periodic function `v -> [-1, 1]` with a fixed wavelength.
pub trait Wave: Send + Sync {
    /// Value of the wave at `v`.
    fn eval(&self, v: f64) -> f64;

    /// Wavelength. Constant for the life of the wave.
    fn lambda(&self) -> f64;
}

impl<W: Wave + ?Sized> Wave for &W {
    fn eval(&self, v: f64) -> f64 {
        (**self).eval(v)
    }

    fn lambda(&self) -> f64 {
        (**self).lambda()
    }
}

impl<W: Wave + ?Sized> Wave for Box<W> {
    fn eval(&self, v: f64) -> f64 {
        (**self).eval(v)
    }

    fn lambda(&self) -> f64 {
        (**self).lambda()
    }
}

impl<W: Wave + ?Sized> Wave for Arc<W> {
    fn eval(&self, v: f64) -> f64 {
        (**self).eval(v)
    }

    fn lambda(&self) -> f64 {
        (**self).lambda()
    }
}

pub type BoxedWave = Box<dyn Wave>;

/// Split `v` into a whole number of periods and an offset within the period.
///
/// For `v >= 0` the result is `(n, v - n * lambda)` with the offset in
/// `[0, lambda)`. Negative values are handled on their magnitude and the
/// offset is then measured from the other end of the period, so the mapping
/// continues periodically through zero. `n` counts periods away from zero and
/// is only meaningful for parity decisions.
///
/// # Arguments
/// * `v` - Value in (-inf, inf)
/// * `lambda` - Period length, must be positive
pub fn map_value_to_lambda(v: f64, lambda: f64) -> (usize, f64) {
    if v < 0.0 {
        let (n, off) = map_value_to_lambda(-v, lambda);
        if off < SNAP_EPSILON {
            return (n, 0.0);
        }
        return (n, lambda - off);
    } else if v < lambda {
        return (0, v);
    }

    let n = (v / lambda).trunc();
    (n as usize, v - n * lambda)
}

/// Cumulative absolute lengths. Errors on an empty list or a zero total.
fn cumulative(lambdas: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    if lambdas.is_empty() {
        return Err(TextureError::EmptyWave);
    }
    let abs: Vec<f64> = lambdas.iter().map(|l| l.abs()).collect();
    let mut sum = 0.0;
    let cum = abs
        .iter()
        .map(|l| {
            sum += l;
            sum
        })
        .collect();
    if sum <= 0.0 || !sum.is_finite() {
        return Err(TextureError::NonPositive {
            what: "total wavelength",
            value: sum,
        });
    }
    Ok((abs, cum))
}

/// Truncate or cyclically extend `items` to `n` entries.
fn fit_length<T: Clone>(mut items: Vec<T>, n: usize) -> Result<Vec<T>> {
    if items.is_empty() {
        return Err(TextureError::EmptyWave);
    }
    if items.len() > n {
        items.truncate(n);
    } else {
        let base = items.len();
        for i in 0..n - base {
            items.push(items[i % base].clone());
        }
    }
    Ok(items)
}

/// Locate the segment of a multi-lambda cycle containing `off` and the
/// parameter `t` within it, applying mirroring when requested.
fn locate(
    lambdas: &[f64],
    cum: &[f64],
    ov: f64,
    r: usize,
    off: f64,
    mirrored: bool,
) -> (usize, f64) {
    let nl = lambdas.len();
    let mut i = 0;
    while i < nl && off > cum[i] {
        i += 1;
    }
    let mut t = if i > nl - 1 {
        // Rolled off the end through rounding
        i = nl - 1;
        1.0
    } else {
        let base = if i > 0 { cum[i - 1] } else { 0.0 };
        (off - base) / lambdas[i]
    };

    if mirrored
        && ((ov > 0.0 && (r * nl + i) % 2 == 1) || (ov < 0.0 && (r * nl + nl - i) % 2 == 1))
    {
        t = 1.0 - t;
    }
    (i, t)
}

/// Serialized form of [`NlWave`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NlWaveParams {
    lambdas: Vec<f64>,
    nlfs: Vec<NonLinear>,
    #[serde(default)]
    mirrored: bool,
    #[serde(default)]
    once: bool,
}

/// Piecewise non-linear wave. Each segment rises from -1 to 1 over its own
/// wavelength using its own shaping function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NlWaveParams", into = "NlWaveParams")]
pub struct NlWave {
    pub lambdas: Vec<f64>,
    pub nlfs: Vec<NonLinear>,
    pub mirrored: bool,
    pub once: bool,
    cum: Vec<f64>,
}

impl TryFrom<NlWaveParams> for NlWave {
    type Error = TextureError;

    fn try_from(p: NlWaveParams) -> Result<Self> {
        Self::new(p.lambdas, p.nlfs, p.mirrored, p.once)
    }
}

impl From<NlWave> for NlWaveParams {
    fn from(w: NlWave) -> Self {
        Self {
            lambdas: w.lambdas,
            nlfs: w.nlfs,
            mirrored: w.mirrored,
            once: w.once,
        }
    }
}

impl NlWave {
    /// Creates a wave from segment wavelengths and shaping functions.
    ///
    /// Wavelengths are made absolute. The shaping list is truncated or
    /// repeated to match the number of wavelengths. When mirrored, every
    /// other segment runs backwards and the reported wavelength doubles.
    pub fn new(
        lambdas: Vec<f64>,
        nlfs: Vec<NonLinear>,
        mirrored: bool,
        once: bool,
    ) -> Result<Self> {
        let (lambdas, cum) = cumulative(&lambdas)?;
        let nlfs = fit_length(nlfs, lambdas.len())?;
        Ok(Self {
            lambdas,
            nlfs,
            mirrored,
            once,
            cum,
        })
    }

    /// Single segment wave.
    pub fn simple(lambda: f64, nlf: NonLinear, mirrored: bool, once: bool) -> Result<Self> {
        Self::new(vec![lambda], vec![nlf], mirrored, once)
    }

    fn total(&self) -> f64 {
        self.cum[self.cum.len() - 1]
    }
}

impl Wave for NlWave {
    fn eval(&self, v: f64) -> f64 {
        let sum = self.total();
        let ov = v;
        let (r, off) = map_value_to_lambda(v, sum);

        if self.once {
            if v < 0.0 {
                return -1.0;
            }
            if self.mirrored && r > 1 {
                return -1.0;
            }
            if !self.mirrored && r > 0 {
                return 1.0;
            }
        }

        let (i, t) = locate(&self.lambdas, &self.cum, ov, r, off, self.mirrored);
        self.nlfs[i].eval(t)
    }

    fn lambda(&self) -> f64 {
        if self.mirrored {
            self.total() * 2.0
        } else {
            self.total()
        }
    }
}

/// Serialized form of [`DcWave`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DcWaveParams {
    up: f64,
    down: f64,
    nl_up: NonLinear,
    nl_down: NonLinear,
    #[serde(default)]
    once: bool,
}

/// Rise then fall: -1 to 1 over the first wavelength, back to -1 over the
/// second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DcWaveParams", into = "DcWaveParams")]
pub struct DcWave {
    pub up: f64,
    pub down: f64,
    pub nl_up: NonLinear,
    pub nl_down: NonLinear,
    pub once: bool,
}

impl TryFrom<DcWaveParams> for DcWave {
    type Error = TextureError;

    fn try_from(p: DcWaveParams) -> Result<Self> {
        Self::new(&[p.up, p.down], &[p.nl_up, p.nl_down], p.once)
    }
}

impl From<DcWave> for DcWaveParams {
    fn from(w: DcWave) -> Self {
        Self {
            up: w.up,
            down: w.down,
            nl_up: w.nl_up,
            nl_down: w.nl_down,
            once: w.once,
        }
    }
}

impl DcWave {
    /// One or two wavelengths and one or two shaping functions. A single
    /// entry is used for both halves.
    pub fn new(lambdas: &[f64], nlfs: &[NonLinear], once: bool) -> Result<Self> {
        let (abs, _) = cumulative(lambdas)?;
        let up = abs[0];
        let down = abs.get(1).copied().unwrap_or(up);
        let nl_up = *nlfs.first().ok_or(TextureError::EmptyWave)?;
        let nl_down = nlfs.get(1).copied().unwrap_or(nl_up);
        if up <= 0.0 || down <= 0.0 {
            return Err(TextureError::NonPositive {
                what: "wavelength",
                value: up.min(down),
            });
        }
        Ok(Self {
            up,
            down,
            nl_up,
            nl_down,
            once,
        })
    }
}

impl Wave for DcWave {
    fn eval(&self, v: f64) -> f64 {
        let sum = self.up + self.down;
        if self.once && !(0.0..sum).contains(&v) {
            return -1.0;
        }
        let (_, off) = map_value_to_lambda(v, sum);
        if off < self.up {
            self.nl_up.eval(off / self.up)
        } else {
            self.nl_down.eval(1.0 - (off - self.up) / self.down)
        }
    }

    fn lambda(&self) -> f64 {
        self.up + self.down
    }
}

/// Alternating wave starting at 0: up to 1, back to 0, down to -1 and back
/// to 0, one quadrant per wavelength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AcWaveParams", into = "AcWaveParams")]
pub struct AcWave {
    pub lambdas: [f64; 4],
    pub nlfs: [NonLinear; 4],
    pub once: bool,
}

/// Serialized form of [`AcWave`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AcWaveParams {
    lambdas: Vec<f64>,
    nlfs: Vec<NonLinear>,
    #[serde(default)]
    once: bool,
}

impl TryFrom<AcWaveParams> for AcWave {
    type Error = TextureError;

    fn try_from(p: AcWaveParams) -> Result<Self> {
        Self::new(&p.lambdas, &p.nlfs, p.once)
    }
}

impl From<AcWave> for AcWaveParams {
    fn from(w: AcWave) -> Self {
        Self {
            lambdas: w.lambdas.to_vec(),
            nlfs: w.nlfs.to_vec(),
            once: w.once,
        }
    }
}

impl AcWave {
    /// Accepts 1, 2 or 4 wavelengths and shaping functions. One entry covers
    /// every quadrant, two entries cover the positive and negative halves.
    pub fn new(lambdas: &[f64], nlfs: &[NonLinear], once: bool) -> Result<Self> {
        let (abs, _) = cumulative(lambdas)?;
        let lambdas = quadrants(&abs, "wavelengths")?;
        if lambdas.iter().any(|l| *l <= 0.0) {
            return Err(TextureError::NonPositive {
                what: "wavelength",
                value: 0.0,
            });
        }
        let nlfs = quadrants(nlfs, "shaping functions")?;
        Ok(Self {
            lambdas,
            nlfs,
            once,
        })
    }
}

fn quadrants<T: Copy>(items: &[T], what: &'static str) -> Result<[T; 4]> {
    match *items {
        [a] => Ok([a, a, a, a]),
        [a, b] => Ok([a, a, b, b]),
        [a, b, c, d] => Ok([a, b, c, d]),
        [] => Err(TextureError::EmptyWave),
        _ => Err(TextureError::LengthMismatch {
            what,
            expected: 4,
            actual: items.len(),
        }),
    }
}

impl Wave for AcWave {
    fn eval(&self, v: f64) -> f64 {
        let sum = self.lambda();
        if self.once && !(0.0..sum).contains(&v) {
            return 0.0;
        }
        let (_, mut off) = map_value_to_lambda(v, sum);
        let mut q = 0;
        while q < 3 && off >= self.lambdas[q] {
            off -= self.lambdas[q];
            q += 1;
        }
        let t = (off / self.lambdas[q]).clamp(0.0, 1.0);
        let nl = &self.nlfs[q];
        match q {
            0 => nl.transform(t),
            1 => nl.transform(1.0 - t),
            2 => -nl.transform(t),
            _ => -nl.transform(1.0 - t),
        }
    }

    fn lambda(&self) -> f64 {
        self.lambdas.iter().sum()
    }
}

/// Catmull-Rom style cubic through `p[1]` (t = 0) and `p[2]` (t = 1).
pub fn cubic(t: f64, p: &[f64]) -> f64 {
    p[1] + 0.5
        * t
        * (p[2] - p[0]
            + t * (2.0 * p[0] - 5.0 * p[1] + 4.0 * p[2] - p[3]
                + t * (3.0 * (p[1] - p[2]) + p[3] - p[0])))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PatternWaveParams {
    lambdas: Vec<f64>,
    patterns: Vec<Vec<f64>>,
    #[serde(default)]
    mirrored: bool,
    #[serde(default)]
    once: bool,
}

/// Wave built from sampled value patterns, one per segment, smoothed with a
/// cubic between samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PatternWaveParams", into = "PatternWaveParams")]
pub struct PatternWave {
    pub lambdas: Vec<f64>,
    pub patterns: Vec<Vec<f64>>,
    pub mirrored: bool,
    pub once: bool,
    cum: Vec<f64>,
    padded: Vec<Vec<f64>>,
}

impl TryFrom<PatternWaveParams> for PatternWave {
    type Error = TextureError;

    fn try_from(p: PatternWaveParams) -> Result<Self> {
        Self::new(p.lambdas, p.patterns, p.mirrored, p.once)
    }
}

impl From<PatternWave> for PatternWaveParams {
    fn from(w: PatternWave) -> Self {
        Self {
            lambdas: w.lambdas,
            patterns: w.patterns,
            mirrored: w.mirrored,
            once: w.once,
        }
    }
}

impl PatternWave {
    /// Pattern values are clamped to [-1, 1]. An empty pattern is flat zero.
    pub fn new(
        lambdas: Vec<f64>,
        patterns: Vec<Vec<f64>>,
        mirrored: bool,
        once: bool,
    ) -> Result<Self> {
        let (lambdas, cum) = cumulative(&lambdas)?;
        let patterns: Vec<Vec<f64>> = fit_length(patterns, lambdas.len())?
            .into_iter()
            .map(|p| p.into_iter().map(clamp).collect())
            .collect();
        let padded = patterns.iter().map(|p| pad_pattern(p)).collect();
        Ok(Self {
            lambdas,
            patterns,
            mirrored,
            once,
            cum,
            padded,
        })
    }
}

/// Repeat the end samples so every interior segment has four control points.
fn pad_pattern(pat: &[f64]) -> Vec<f64> {
    match pat {
        [] => vec![0.0; 4],
        [v] => vec![*v; 4],
        [first, .., last] => {
            let mut np = Vec::with_capacity(pat.len() + 2);
            np.push(*first);
            np.extend_from_slice(pat);
            np.push(*last);
            np
        }
    }
}

impl Wave for PatternWave {
    fn eval(&self, v: f64) -> f64 {
        let sum = self.cum[self.cum.len() - 1];
        let ov = v;
        let (r, off) = map_value_to_lambda(v, sum);

        if self.once {
            if v < 0.0 {
                return -1.0;
            }
            if self.mirrored && r > 1 {
                return -1.0;
            }
            if !self.mirrored && r > 0 {
                return 1.0;
            }
        }

        let (i, t) = locate(&self.lambdas, &self.cum, ov, r, off, self.mirrored);
        let pat = &self.padded[i];
        let pl = pat.len();
        if 1.0 - t < 0.000_000_1 {
            return pat[pl - 1];
        }
        let dt = 1.0 / (pl - 3) as f64;
        let (j, ft) = map_value_to_lambda(t, dt);
        let j = j.min(pl - 4);
        clamp(cubic(ft / dt, &pat[j..j + 4]))
    }

    fn lambda(&self) -> f64 {
        let sum = self.cum[self.cum.len() - 1];
        if self.mirrored {
            sum * 2.0
        } else {
            sum
        }
    }
}

/// Negates the source wave.
#[derive(Debug, Clone)]
pub struct InvertWave<W> {
    pub src: W,
}

impl<W: Wave> InvertWave<W> {
    pub fn new(src: W) -> Self {
        Self { src }
    }
}

impl<W: Wave> Wave for InvertWave<W> {
    fn eval(&self, v: f64) -> f64 {
        -self.src.eval(v)
    }

    fn lambda(&self) -> f64 {
        self.src.lambda()
    }
}
