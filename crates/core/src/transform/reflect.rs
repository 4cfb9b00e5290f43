//! Mirror folding
//!
//! A [`Mirror`] lies along the directed line `start -> end`. Points on the
//! positive (left) side, and points on the line, pass through unchanged.
//! Points on the negative side are reflected onto the positive side before
//! the source is sampled, so folding twice is the same as folding once.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{side_of_line, Aff3};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct MirrorParams {
    start: [f64; 2],
    end: [f64; 2],
}

/// A mirror line and its reflection transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "MirrorParams", into = "MirrorParams")]
pub struct Mirror {
    pub start: [f64; 2],
    pub end: [f64; 2],
    xfm: Aff3,
}

impl Mirror {
    pub fn new(start: [f64; 2], end: [f64; 2]) -> Self {
        Self {
            start,
            end,
            xfm: Aff3::reflection(start, end),
        }
    }

    /// Fold a point onto the positive side of the mirror.
    #[inline]
    pub fn fold(&self, x: f64, y: f64) -> (f64, f64) {
        if side_of_line(self.start, self.end, [x, y]) < 0.0 {
            self.xfm.apply(x, y)
        } else {
            (x, y)
        }
    }
}

impl From<MirrorParams> for Mirror {
    fn from(p: MirrorParams) -> Self {
        Self::new(p.start, p.end)
    }
}

impl From<Mirror> for MirrorParams {
    fn from(m: Mirror) -> Self {
        Self {
            start: m.start,
            end: m.end,
        }
    }
}

/// Samples the source with the point folded across a single mirror.
#[derive(Debug, Clone)]
pub struct Reflect<S> {
    pub src: S,
    pub mirror: Mirror,
}

impl<S> Reflect<S> {
    pub fn new(src: S, start: [f64; 2], end: [f64; 2]) -> Self {
        Self {
            src,
            mirror: Mirror::new(start, end),
        }
    }

    #[inline]
    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        self.mirror.fold(x, y)
    }
}

remap_fields!(Reflect);

/// A stack of mirrors meeting at a center.
///
/// `mirrors` is ordered from the innermost (closest to the source) to the
/// outermost. A query point is folded by the outermost mirror first.
#[derive(Debug, Clone)]
pub struct Kaleidoscope<S> {
    pub src: S,
    pub mirrors: Vec<Mirror>,
}

impl<S> Kaleidoscope<S> {
    /// `n` spokes through `center`, `PI / n` apart, the first at angle
    /// `offset`. `n` is raised to at least 1.
    pub fn new(src: S, center: [f64; 2], n: usize, offset: f64) -> Self {
        let mirrors = spokes(center, 10.0, n, offset)
            .into_iter()
            .map(|p| Mirror::new(center, p))
            .collect();
        debug!("Kaleidoscope with {} spokes at {:?}", n.max(1), center);
        Self { src, mirrors }
    }

    /// As [`Kaleidoscope::new`] with a rim of mirrors joining the spoke ends
    /// at distance `d` from the center. The rim closes back on the first
    /// spoke.
    pub fn with_rim(src: S, center: [f64; 2], d: f64, n: usize, offset: f64) -> Self {
        let pts = spokes(center, d, n, offset);
        let mut mirrors: Vec<Mirror> = pts.iter().map(|p| Mirror::new(center, *p)).collect();
        for w in pts.windows(2) {
            mirrors.push(Mirror::new(w[0], w[1]));
        }
        mirrors.push(Mirror::new(pts[pts.len() - 1], pts[0]));
        debug!(
            "Kaleidoscope with {} spokes and rim at {} around {:?}",
            pts.len(),
            d,
            center
        );
        Self { src, mirrors }
    }

    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        self.mirrors
            .iter()
            .rev()
            .fold((x, y), |(x, y), m| m.fold(x, y))
    }
}

remap_fields!(Kaleidoscope);

fn spokes(center: [f64; 2], d: f64, n: usize, offset: f64) -> Vec<[f64; 2]> {
    let n = n.max(1);
    let th = PI / n as f64;
    (0..n)
        .map(|i| {
            let a = offset + th * i as f64;
            [center[0] + a.cos() * d, center[1] + a.sin() * d]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FnField, ScalarField};
    use approx::assert_abs_diff_eq;

    fn ramp() -> FnField<impl Fn(f64, f64) -> f64 + Send + Sync> {
        FnField(|x: f64, y: f64| ((x * 0.013).sin() + (y * 0.029).cos()) / 2.0)
    }

    #[test]
    fn test_mirror_fold() {
        // Horizontal mirror along the x axis, left side is y > 0
        let m = Mirror::new([0.0, 0.0], [1.0, 0.0]);
        assert_eq!(m.fold(3.0, 2.0), (3.0, 2.0));
        let (x, y) = m.fold(3.0, -2.0);
        assert_abs_diff_eq!(x, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 2.0, epsilon = 1e-12);
        // On the line is left alone
        assert_eq!(m.fold(5.0, 0.0), (5.0, 0.0));
    }

    #[test]
    fn test_reflect_twice_same_as_once() {
        let once = Reflect::new(ramp(), [0.0, 10.0], [7.0, -3.0]);
        let twice = Reflect::new(
            Reflect::new(ramp(), [0.0, 10.0], [7.0, -3.0]),
            [0.0, 10.0],
            [7.0, -3.0],
        );
        for i in 0..100 {
            let x = f64::from(i) * 3.7 - 180.0;
            let y = f64::from(i % 13) * 11.0 - 60.0;
            assert_abs_diff_eq!(once.eval(x, y), twice.eval(x, y), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_reflect_symmetric_about_line() {
        let r = Reflect::new(ramp(), [0.0, 0.0], [0.0, 1.0]);
        // Vertical mirror: left side is x < 0
        assert_abs_diff_eq!(r.eval(4.0, 9.0), r.eval(-4.0, 9.0), epsilon = 1e-12);
        assert_abs_diff_eq!(r.eval(4.0, 9.0), ramp().eval(-4.0, 9.0), epsilon = 1e-12);
    }

    #[test]
    fn test_kaleidoscope_mirror_layout() {
        let k = Kaleidoscope::new(ramp(), [50.0, 50.0], 3, 0.0);
        assert_eq!(k.mirrors.len(), 3);
        let k2 = Kaleidoscope::with_rim(ramp(), [50.0, 50.0], 20.0, 4, 0.0);
        assert_eq!(k2.mirrors.len(), 8);
        // The innermost mirror folds last, so every query ends up on its left
        let last = k.mirrors[0];
        for i in 0..50 {
            let (x, y) = k.map(f64::from(i) * 4.1, 100.0 - f64::from(i) * 2.3);
            assert!(side_of_line(last.start, last.end, [x, y]) >= -1e-9);
        }
    }

    #[test]
    fn test_mirror_serde() {
        let m = Mirror::new([1.0, 2.0], [3.0, 5.0]);
        let json = serde_json::to_string(&m).unwrap();
        let back: Mirror = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
