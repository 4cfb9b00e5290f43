//! Morphology and convolution over continuous fields
//!
//! The structuring element is a [`Support`]: a short list of offsets at
//! which the source is sampled around the query point. Erosion takes the
//! minimum over the support, dilation the maximum, and the compound
//! operators are built from those two.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TextureError};
use crate::field::{clamp, ScalarField};

/// Sample offsets for the morphological operators. Always holds the
/// origin, so erosion never exceeds the source and dilation never falls
/// below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct Support {
    offsets: Vec<[f64; 2]>,
}

impl Support {
    /// Arbitrary offsets. The origin is added when missing.
    pub fn custom(mut offsets: Vec<[f64; 2]>) -> Result<Self> {
        if offsets.is_empty() {
            return Err(TextureError::EmptySupport);
        }
        if !offsets.iter().any(|o| o[0] == 0.0 && o[1] == 0.0) {
            offsets.push([0.0, 0.0]);
        }
        Ok(Self { offsets })
    }

    /// 3x3 Von Neumann neighbourhood.
    pub fn z4(sx: f64, sy: f64) -> Self {
        Self {
            offsets: vec![[0.0, -sy], [-sx, 0.0], [0.0, 0.0], [sx, 0.0], [0.0, sy]],
        }
    }

    /// 3x3 Von Neumann neighbourhood rotated 45 degrees.
    pub fn x3(sx: f64, sy: f64) -> Self {
        Self {
            offsets: vec![[sx, -sy], [-sx, -sy], [0.0, 0.0], [sx, sy], [-sx, sy]],
        }
    }

    /// 3x3 Moore neighbourhood.
    pub fn z8(sx: f64, sy: f64) -> Self {
        let mut offsets = Vec::with_capacity(9);
        for dy in [-sy, 0.0, sy] {
            for dx in [-sx, 0.0, sx] {
                offsets.push([dx, dy]);
            }
        }
        Self { offsets }
    }

    pub fn offsets(&self) -> &[[f64; 2]] {
        &self.offsets
    }

    fn erode<S: ScalarField + ?Sized>(&self, src: &S, x: f64, y: f64) -> f64 {
        self.offsets
            .iter()
            .fold(1.0, |m, o| src.eval(x + o[0], y + o[1]).min(m))
    }

    fn dilate<S: ScalarField + ?Sized>(&self, src: &S, x: f64, y: f64) -> f64 {
        self.offsets
            .iter()
            .fold(-1.0, |m, o| src.eval(x + o[0], y + o[1]).max(m))
    }

    /// Dilation of the erosion.
    fn open<S: ScalarField + ?Sized>(&self, src: &S, x: f64, y: f64) -> f64 {
        self.offsets
            .iter()
            .fold(-1.0, |m, o| self.erode(src, x + o[0], y + o[1]).max(m))
    }

    /// Erosion of the dilation.
    fn close<S: ScalarField + ?Sized>(&self, src: &S, x: f64, y: f64) -> f64 {
        self.offsets
            .iter()
            .fold(1.0, |m, o| self.dilate(src, x + o[0], y + o[1]).min(m))
    }
}

impl TryFrom<Vec<[f64; 2]>> for Support {
    type Error = TextureError;

    fn try_from(offsets: Vec<[f64; 2]>) -> Result<Self> {
        Self::custom(offsets)
    }
}

impl From<Support> for Vec<[f64; 2]> {
    fn from(s: Support) -> Self {
        s.offsets
    }
}

/// Morphological operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphOp {
    Erode,
    Dilate,
    /// Source minus erosion
    EdgeIn,
    /// Dilation minus source
    EdgeOut,
    /// Dilation minus erosion
    Edge,
    /// Dilation of the erosion
    Open,
    /// Erosion of the dilation
    Close,
    /// Source minus opening
    TopHat,
    /// Closing minus source
    BottomHat,
}

/// Applies a morphological operator to the source. Differences are clamped
/// to [-1, 1].
#[derive(Debug, Clone)]
pub struct Morphology<S> {
    pub src: S,
    pub support: Support,
    pub op: MorphOp,
}

impl<S: ScalarField> Morphology<S> {
    pub fn new(src: S, support: Support, op: MorphOp) -> Self {
        Self { src, support, op }
    }

    pub fn erode(src: S, support: Support) -> Self {
        Self::new(src, support, MorphOp::Erode)
    }

    pub fn dilate(src: S, support: Support) -> Self {
        Self::new(src, support, MorphOp::Dilate)
    }
}

impl<S: ScalarField> ScalarField for Morphology<S> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let s = &self.support;
        let src = &self.src;
        match self.op {
            MorphOp::Erode => s.erode(src, x, y),
            MorphOp::Dilate => s.dilate(src, x, y),
            MorphOp::EdgeIn => clamp(src.eval(x, y) - s.erode(src, x, y)),
            MorphOp::EdgeOut => clamp(s.dilate(src, x, y) - src.eval(x, y)),
            MorphOp::Edge => clamp(s.dilate(src, x, y) - s.erode(src, x, y)),
            MorphOp::Open => s.open(src, x, y),
            MorphOp::Close => s.close(src, x, y),
            MorphOp::TopHat => clamp(src.eval(x, y) - s.open(src, x, y)),
            MorphOp::BottomHat => clamp(s.close(src, x, y) - src.eval(x, y)),
        }
    }
}

/// Convolution taps `[dx, dy, w]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KernelParams", into = "KernelParams")]
pub struct Kernel {
    taps: Vec<[f64; 3]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KernelParams {
    taps: Vec<[f64; 3]>,
    #[serde(default)]
    normalize: bool,
}

impl Kernel {
    /// When `normalize` is set the weights are divided by their sum, or by
    /// the sum of the positive weights when the total is zero.
    pub fn new(mut taps: Vec<[f64; 3]>, normalize: bool) -> Result<Self> {
        if taps.is_empty() {
            return Err(TextureError::EmptyKernel);
        }
        if normalize {
            let sum: f64 = taps.iter().map(|t| t[2]).sum();
            let sum_pos: f64 = taps.iter().map(|t| t[2]).filter(|w| *w > 0.0).sum();
            let div = if sum != 0.0 { sum } else { sum_pos };
            if div != 0.0 {
                for t in &mut taps {
                    t[2] /= div;
                }
            }
        }
        Ok(Self { taps })
    }

    /// Box blur over a `(2n + 1)` square with spacing `s`.
    pub fn box_blur(n: usize, s: f64) -> Self {
        let n = n as i64;
        let w = 1.0 / ((2 * n + 1) * (2 * n + 1)) as f64;
        let taps = (-n..=n)
            .flat_map(|j| (-n..=n).map(move |i| [i as f64 * s, j as f64 * s, w]))
            .collect();
        Self { taps }
    }

    pub fn taps(&self) -> &[[f64; 3]] {
        &self.taps
    }
}

impl TryFrom<KernelParams> for Kernel {
    type Error = TextureError;

    fn try_from(p: KernelParams) -> Result<Self> {
        Self::new(p.taps, p.normalize)
    }
}

impl From<Kernel> for KernelParams {
    fn from(k: Kernel) -> Self {
        // Weights are stored already normalized
        Self {
            taps: k.taps,
            normalize: false,
        }
    }
}

/// Weighted sum of source samples around the point, clamped.
#[derive(Debug, Clone)]
pub struct Convolution<S> {
    pub src: S,
    pub kernel: Kernel,
}

impl<S: ScalarField> Convolution<S> {
    pub fn new(src: S, kernel: Kernel) -> Self {
        Self { src, kernel }
    }
}

impl<S: ScalarField> ScalarField for Convolution<S> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let sum: f64 = self
            .kernel
            .taps
            .iter()
            .map(|k| self.src.eval(x + k[0], y + k[1]) * k[2])
            .sum();
        clamp(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FnField;
    use crate::noise::Perlin;
    use approx::assert_abs_diff_eq;

    fn step() -> FnField<impl Fn(f64, f64) -> f64 + Send + Sync> {
        FnField(|x: f64, _y: f64| if x < 0.0 { -1.0 } else { 1.0 })
    }

    #[test]
    fn test_support_includes_origin() {
        let s = Support::custom(vec![[1.0, 0.0]]).unwrap();
        assert_eq!(s.offsets().len(), 2);
        assert!(Support::custom(vec![]).is_err());
        assert_eq!(Support::z8(1.0, 1.0).offsets().len(), 9);
        assert!(Support::z4(2.0, 2.0).offsets().contains(&[0.0, 0.0]));
    }

    #[test]
    fn test_erode_dilate_step() {
        let sup = Support::z4(1.0, 1.0);
        let e = Morphology::erode(step(), sup.clone());
        let d = Morphology::dilate(step(), sup.clone());
        assert_eq!(e.eval(0.5, 0.0), -1.0);
        assert_eq!(e.eval(1.5, 0.0), 1.0);
        assert_eq!(d.eval(-0.5, 0.0), 1.0);
        assert_eq!(d.eval(-1.5, 0.0), -1.0);
        let edge = Morphology::new(step(), sup, MorphOp::Edge);
        assert_eq!(edge.eval(0.5, 0.0), 1.0);
        assert_eq!(edge.eval(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_duality_on_noise() {
        let sup = Support::z8(1.5, 1.5);
        let p = Perlin::new(99);
        let e = Morphology::erode(&p, sup.clone());
        let d = Morphology::dilate(&p, sup.clone());
        let o = Morphology::new(&p, sup.clone(), MorphOp::Open);
        let c = Morphology::new(&p, sup, MorphOp::Close);
        for i in 0..200 {
            let (x, y) = (f64::from(i) * 0.731 - 40.0, f64::from(i) * -0.377 + 11.0);
            let v = p.eval(x, y).clamp(-1.0, 1.0);
            assert!(e.eval(x, y) <= v + 1e-12);
            assert!(d.eval(x, y) >= v - 1e-12);
            assert!(o.eval(x, y) <= v + 1e-12);
            assert!(c.eval(x, y) >= v - 1e-12);
        }
    }

    #[test]
    fn test_convolution_normalized() {
        let k =
            Kernel::new(vec![[-1.0, 0.0, 1.0], [0.0, 0.0, 2.0], [1.0, 0.0, 1.0]], true).unwrap();
        let sum: f64 = k.taps().iter().map(|t| t[2]).sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
        let c = Convolution::new(FnField(|x: f64, _y: f64| x / 10.0), k);
        assert_abs_diff_eq!(c.eval(3.0, 0.0), 0.3, epsilon = 1e-12);

        // Zero sum falls back to the positive weights
        let edge = Kernel::new(vec![[-1.0, 0.0, -1.0], [1.0, 0.0, 1.0]], true).unwrap();
        assert_eq!(edge.taps()[1][2], 1.0);
        assert!(Kernel::new(vec![], false).is_err());

        let blur = Kernel::box_blur(1, 1.0);
        assert_eq!(blur.taps().len(), 9);
        let c = Convolution::new(FnField(|_x: f64, _y: f64| 5.0), blur);
        assert_eq!(c.eval(0.0, 0.0), 1.0);
    }
}
