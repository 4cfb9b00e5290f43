//! Fractal iteration
//!
//! [`Fractal`] samples its source under repeated application of an affine
//! transform and folds the per-octave samples with an [`OctaveCombiner`].
//! [`VariableFractal`] reads the octave count from a second field.
//! [`Ifs`] classifies points against an iterated function system.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TextureError};
use crate::field::{clamp, to_unit, ScalarField};
use crate::filter::{post, FilterOp};
use crate::geometry::{Aff3, Shape};

/// Most octaves a fractal evaluates.
pub const MAX_OCTAVES: usize = 10;

/// Working sets larger than this make IFS evaluation slow enough to warn.
const IFS_WORK_WARN: f64 = 1e6;

/// How per-octave samples are folded into one value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OctaveCombiner {
    /// `sum(v[i] * w[i])`
    Fbm { hurst: f64, lacunarity: f64 },
    /// `sum((v[i] + offset) * w[i])`
    Multifractal {
        hurst: f64,
        lacunarity: f64,
        offset: f64,
    },
}

impl OctaveCombiner {
    /// Octave weights `lacunarity^(-hurst * (i + 1))` for every octave.
    pub fn weights(&self) -> [f64; MAX_OCTAVES] {
        let (hurst, lacunarity) = match *self {
            Self::Fbm { hurst, lacunarity } | Self::Multifractal { hurst, lacunarity, .. } => {
                (hurst, lacunarity)
            }
        };
        let mut w = [0.0; MAX_OCTAVES];
        for (i, wi) in w.iter_mut().enumerate() {
            *wi = lacunarity.powf(-hurst * (i + 1) as f64);
        }
        w
    }

    /// Fold samples, given in octave order, with precomputed weights.
    pub fn combine(&self, values: &[f64], weights: &[f64; MAX_OCTAVES]) -> f64 {
        let offset = match *self {
            Self::Fbm { .. } => 0.0,
            Self::Multifractal { offset, .. } => offset,
        };
        values
            .iter()
            .zip(weights)
            .map(|(v, w)| (v + offset) * w)
            .sum()
    }
}

/// Split an octave count into whole octaves and the fraction left over.
fn split_octaves(octaves: f64) -> (usize, f64) {
    let octaves = octaves.clamp(0.0, MAX_OCTAVES as f64);
    let full = octaves.floor();
    let rem = if full as usize == MAX_OCTAVES { 0.0 } else { octaves - full };
    (full as usize, rem)
}

/// Samples for `full` octaves plus a partial one weighted by `rem`.
fn octave_samples<S: ScalarField + ?Sized>(
    src: &S,
    xfm: &Aff3,
    full: usize,
    rem: f64,
    mut x: f64,
    mut y: f64,
) -> Vec<f64> {
    let mut values = Vec::with_capacity(full + 1);
    for _ in 0..full {
        values.push(src.eval(x, y));
        (x, y) = xfm.apply(x, y);
    }
    if rem > 0.0 {
        // Linear, not geometric, in the remainder
        values.push(rem * src.eval(x, y));
    }
    values
}

/// Multi-octave fractal over a scalar source.
#[derive(Debug, Clone)]
pub struct Fractal<S> {
    pub src: S,
    pub xfm: Aff3,
    pub combiner: OctaveCombiner,
    pub octaves: f64,
    pub filter: Option<FilterOp>,
    full: usize,
    rem: f64,
    weights: [f64; MAX_OCTAVES],
}

impl<S: ScalarField> Fractal<S> {
    /// # Arguments
    ///
    /// * `src` - Field sampled once per octave
    /// * `xfm` - Applied to the coordinate between octaves, typically a
    ///   scale by the lacunarity and a rotation
    /// * `combiner` - Folds the octave samples
    /// * `octaves` - Octave count in [0, `MAX_OCTAVES`], may be fractional
    pub fn new(src: S, xfm: Aff3, combiner: OctaveCombiner, octaves: f64) -> Self {
        let (full, rem) = split_octaves(octaves);
        debug!(full, rem, ?combiner, "Fractal");
        Self {
            src,
            xfm,
            combiner,
            octaves,
            filter: None,
            full,
            rem,
            weights: combiner.weights(),
        }
    }

    pub fn with_filter(mut self, filter: FilterOp) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl<S: ScalarField> ScalarField for Fractal<S> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let values = octave_samples(&self.src, &self.xfm, self.full, self.rem, x, y);
        let v = clamp(self.combiner.combine(&values, &self.weights));
        post(self.filter.as_ref(), v)
    }
}

/// Fractal whose octave count at each point is read from `octave_src`,
/// mapped from [-1, 1] to [0, `max_octaves`].
#[derive(Debug, Clone)]
pub struct VariableFractal<S, O> {
    pub src: S,
    pub xfm: Aff3,
    pub combiner: OctaveCombiner,
    pub octave_src: O,
    pub max_octaves: f64,
    weights: [f64; MAX_OCTAVES],
}

impl<S: ScalarField, O: ScalarField> VariableFractal<S, O> {
    pub fn new(
        src: S,
        xfm: Aff3,
        combiner: OctaveCombiner,
        octave_src: O,
        max_octaves: f64,
    ) -> Self {
        let max_octaves = max_octaves.clamp(0.0, MAX_OCTAVES as f64);
        debug!(max_octaves, ?combiner, "Variable fractal");
        Self {
            src,
            xfm,
            combiner,
            octave_src,
            max_octaves,
            weights: combiner.weights(),
        }
    }
}

impl<S: ScalarField, O: ScalarField> ScalarField for VariableFractal<S, O> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let octaves = to_unit(clamp(self.octave_src.eval(x, y))) * self.max_octaves;
        let (full, rem) = split_octaves(octaves);
        let values = octave_samples(&self.src, &self.xfm, full, rem, x, y);
        clamp(self.combiner.combine(&values, &self.weights))
    }
}

/// Iterated function system membership test.
///
/// Holds the inverses of the system's contractive maps. A point is inside
/// when, after `iterations` rounds of mapping every surviving point through
/// every inverse, some image still lies strictly within `(0, domain)`.
/// Cost grows as `transforms ^ iterations`; keep the depth small.
#[derive(Debug, Clone)]
pub struct Ifs {
    pub domain: [f64; 2],
    pub iterations: usize,
    inverses: Vec<Aff3>,
}

impl Ifs {
    /// Fails on an empty transform list or a transform with no inverse.
    pub fn new(domain: [f64; 2], xfms: &[Aff3], iterations: usize) -> Result<Self> {
        if xfms.is_empty() {
            return Err(TextureError::EmptySources);
        }
        let inverses = xfms.iter().map(Aff3::inverse).collect::<Result<Vec<_>>>()?;
        let work = (xfms.len() as f64).powi(iterations as i32);
        if work > IFS_WORK_WARN {
            warn!(transforms = xfms.len(), iterations, "IFS evaluation will be slow");
        }
        debug!(transforms = xfms.len(), iterations, "IFS");
        Ok(Self {
            domain,
            iterations,
            inverses,
        })
    }

    #[inline]
    fn in_domain(&self, p: (f64, f64)) -> bool {
        p.0 > 0.0 && p.0 < self.domain[0] && p.1 > 0.0 && p.1 < self.domain[1]
    }
}

impl Shape for Ifs {
    fn contains(&self, x: f64, y: f64) -> bool {
        let mut points = vec![(x, y)];
        for _ in 0..self.iterations {
            let next: Vec<(f64, f64)> = points
                .iter()
                .flat_map(|p| self.inverses.iter().map(move |xfm| xfm.apply(p.0, p.1)))
                .filter(|p| self.in_domain(*p))
                .collect();
            if next.is_empty() {
                return false;
            }
            points = next;
        }
        true
    }
}

impl ScalarField for Ifs {
    fn eval(&self, x: f64, y: f64) -> f64 {
        if self.contains(x, y) {
            1.0
        } else {
            -1.0
        }
    }
}

/// First source where the IFS holds the point, second elsewhere.
#[derive(Debug, Clone)]
pub struct IfsCombiner<A, B> {
    pub inside: A,
    pub outside: B,
    pub ifs: Ifs,
}

impl<A: ScalarField, B: ScalarField> IfsCombiner<A, B> {
    pub fn new(inside: A, outside: B, ifs: Ifs) -> Self {
        Self {
            inside,
            outside,
            ifs,
        }
    }
}

impl<A: ScalarField, B: ScalarField> ScalarField for IfsCombiner<A, B> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        if self.ifs.contains(x, y) {
            self.inside.eval(x, y)
        } else {
            self.outside.eval(x, y)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Uniform;
    use approx::assert_abs_diff_eq;

    const FBM: OctaveCombiner = OctaveCombiner::Fbm {
        hurst: 1.0,
        lacunarity: 2.0,
    };

    #[test]
    fn test_fbm_weights_closed_form() {
        let f = Fractal::new(Uniform::new(1.0), Aff3::scaling(2.0, 2.0), FBM, 2.0);
        assert_abs_diff_eq!(f.eval(13.0, -4.0), 0.5 + 0.25, epsilon = 1e-12);
        let w = FBM.weights();
        assert_abs_diff_eq!(w[9], 2f64.powi(-10), epsilon = 1e-15);
    }

    #[test]
    fn test_fractional_octave() {
        let f = Fractal::new(Uniform::new(1.0), Aff3::identity(), FBM, 2.5);
        assert_abs_diff_eq!(f.eval(0.0, 0.0), 0.5 + 0.25 + 0.5 * 0.125, epsilon = 1e-12);
        let none = Fractal::new(Uniform::new(1.0), Aff3::identity(), FBM, 0.0);
        assert_eq!(none.eval(0.0, 0.0), 0.0);
        assert_eq!(split_octaves(25.0), (MAX_OCTAVES, 0.0));
    }

    #[test]
    fn test_multifractal_clamped() {
        let mf = OctaveCombiner::Multifractal {
            hurst: 1.0,
            lacunarity: 2.0,
            offset: 0.5,
        };
        let f = Fractal::new(Uniform::new(1.0), Aff3::identity(), mf, 2.0);
        assert_eq!(f.eval(0.0, 0.0), 1.0);
        let g = Fractal::new(Uniform::new(-1.0), Aff3::identity(), mf, 1.0);
        assert_abs_diff_eq!(g.eval(0.0, 0.0), -0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_variable_fractal_octaves_from_field() {
        // -1 maps to no octaves, 1 to the maximum
        let lo = VariableFractal::new(
            Uniform::new(1.0),
            Aff3::identity(),
            FBM,
            Uniform::new(-1.0),
            4.0,
        );
        assert_eq!(lo.eval(0.0, 0.0), 0.0);
        let hi = VariableFractal::new(
            Uniform::new(1.0),
            Aff3::identity(),
            FBM,
            Uniform::new(0.0),
            4.0,
        );
        assert_abs_diff_eq!(hi.eval(0.0, 0.0), 0.75, epsilon = 1e-12);
    }

    fn sierpinski(iterations: usize) -> Ifs {
        let a = Aff3::scaling(0.5, 0.5);
        let mut b = Aff3::translation(50.0, 0.0);
        b.scale(0.5, 0.5);
        let mut c = Aff3::translation(0.0, 50.0);
        c.scale(0.5, 0.5);
        Ifs::new([100.0, 100.0], &[a, b, c], iterations).unwrap()
    }

    #[test]
    fn test_ifs_classification() {
        let ifs = sierpinski(3);
        assert_eq!(ifs.eval(10.0, 10.0), 1.0);
        assert_eq!(ifs.eval(75.0, 75.0), -1.0);
        // Deeper systems carve out more
        assert_eq!(sierpinski(4).eval(10.0, 10.0), -1.0);
        assert!(Ifs::new([1.0, 1.0], &[], 2).is_err());
        assert!(Ifs::new([1.0, 1.0], &[Aff3::scaling(0.0, 1.0)], 2).is_err());
    }

    #[test]
    fn test_ifs_combiner() {
        let c = IfsCombiner::new(Uniform::new(0.5), Uniform::new(-0.5), sierpinski(2));
        assert_eq!(c.eval(10.0, 10.0), 0.5);
        assert_eq!(c.eval(75.0, 75.0), -0.5);
    }
}
