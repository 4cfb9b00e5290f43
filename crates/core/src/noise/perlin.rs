//! Perlin gradient noise
//!
//! Classic lattice gradient noise with the improved quintic fade curve. The
//! permutation table is filled with 0..=255, shuffled once from the seed and
//! duplicated so the second corner lookup never needs a modulo. Noise
//! therefore repeats every 256 units on both axes.
//!
//! Output is approximately in [-1, 1] but not rigorously bounded; wrap the
//! field in a clamping node when a strict range matters.
//!
//! # References
//!
//! - Perlin, K. (1985) "An image synthesizer", SIGGRAPH '85
//! - Perlin, K. (2002) "Improving noise", ACM Transactions on Graphics 21(3)

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::field::{lerp, ScalarField};

/// Permutation table size (must be a power of 2).
const PERM_SIZE: usize = 256;

/// Seeded Perlin noise.
#[derive(Clone, Debug)]
pub struct Perlin {
    /// Seed used to shuffle the permutation table.
    pub seed: u64,

    /// Permutation table, 0..=255 shuffled then repeated.
    perm: [u8; PERM_SIZE * 2],
}

impl Perlin {
    /// Create a noise field from a seed.
    ///
    /// The same seed always yields the same table, and therefore the same
    /// value at every coordinate.
    ///
    /// # Arguments
    ///
    /// * `seed` - Seed for the permutation shuffle
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut base: Vec<u8> = (0..=255).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        base.shuffle(&mut rng);

        let mut perm = [0u8; PERM_SIZE * 2];
        perm[..PERM_SIZE].copy_from_slice(&base);
        perm[PERM_SIZE..].copy_from_slice(&base);

        debug!(seed, "Perlin permutation table built");
        Self { seed, perm }
    }

    /// Noise with a seed drawn from the thread RNG.
    #[must_use]
    pub fn random() -> Self {
        Self::new(rand::random())
    }

    /// Raw noise value, the same as [`ScalarField::eval`].
    #[inline]
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let ix = x.floor();
        let iy = y.floor();
        let rx = x - ix;
        let ry = y - iy;
        let u = fade(rx);
        let v = fade(ry);

        let hx = (ix as i64 & 0xff) as usize;
        let hy = (iy as i64 & 0xff) as usize;
        let p = &self.perm;
        let a = usize::from(p[hx]) + hy;
        let b = usize::from(p[hx + 1]) + hy;

        lerp(
            v,
            lerp(u, gradient(p[a], rx, ry), gradient(p[b], rx - 1.0, ry)),
            lerp(
                u,
                gradient(p[a + 1], rx, ry - 1.0),
                gradient(p[b + 1], rx - 1.0, ry - 1.0),
            ),
        )
    }
}

impl ScalarField for Perlin {
    fn eval(&self, x: f64, y: f64) -> f64 {
        self.noise(x, y)
    }
}

/// Dot product of the offset with one of four diagonal gradients.
#[inline]
fn gradient(hash: u8, x: f64, y: f64) -> f64 {
    match hash % 4 {
        0 => x + y,
        1 => x - y,
        2 => -x + y,
        _ => -x - y,
    }
}

/// Quintic fade curve with zero first and second derivatives at 0 and 1.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_points_are_zero() {
        let p = Perlin::new(12345);
        assert_eq!(p.eval(0.0, 0.0), 0.0);
        assert_eq!(p.eval(17.0, -3.0), 0.0);
        assert_eq!(p.eval(-256.0, 1000.0), 0.0);
    }

    #[test]
    fn test_table_is_permutation() {
        let p = Perlin::new(7);
        let mut seen = [false; 256];
        for v in &p.perm[..PERM_SIZE] {
            seen[usize::from(*v)] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(p.perm[..PERM_SIZE], p.perm[PERM_SIZE..]);
    }

    #[test]
    fn test_repeats_every_256() {
        let p = Perlin::new(99);
        for (x, y) in [(0.3, 0.7), (12.25, -4.5), (-100.1, 33.3)] {
            let a = p.eval(x, y);
            let b = p.eval(x + 256.0, y - 256.0);
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bounded() {
        let p = Perlin::new(3);
        for i in 0..2000 {
            let x = f64::from(i) * 0.173 - 150.0;
            let y = f64::from(i) * 0.319 - 90.0;
            let v = p.eval(x, y);
            assert!((-1.0..=1.0).contains(&v), "{v} at ({x}, {y})");
        }
    }
}
