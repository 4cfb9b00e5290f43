//! Blocky noise leaves
//!
//! [`Binary`] is a seeded grid of on/off cells. [`BlockNoise`] scatters
//! randomly sized rectangles per cell of a repeating domain and reports
//! whether a point is covered by any of them.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::{positive, Result, TextureError};
use crate::field::ScalarField;
use crate::wave::map_value_to_lambda;

/// Seeded grid of cells, each on (1) with probability `perc`, else off (-1).
/// The grid repeats outside its bounds.
#[derive(Debug, Clone)]
pub struct Binary {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub perc: f64,
    bits: Vec<bool>,
}

impl Binary {
    pub fn new(width: usize, height: usize, seed: u64, perc: f64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::InvalidDimensions { width, height });
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let bits = (0..width * height)
            .map(|_| rng.random::<f64>() < perc)
            .collect();
        debug!(width, height, seed, perc, "Binary noise grid");
        Ok(Self {
            width,
            height,
            seed,
            perc,
            bits,
        })
    }
}

impl ScalarField for Binary {
    fn eval(&self, x: f64, y: f64) -> f64 {
        // Truncation toward zero, then wrap
        let ix = (x as i64).rem_euclid(self.width as i64) as usize;
        let iy = (y as i64).rem_euclid(self.height as i64) as usize;
        if self.bits[iy * self.width + ix] {
            1.0
        } else {
            -1.0
        }
    }
}

/// Rectangle as `[x0, y0, x1, y1]` in cell local coordinates.
type Block = [f64; 4];

/// Cells of random rectangles tiled over a `w x h` domain.
///
/// Rectangles start inside their own cell but may spill into the next cell
/// to the right or below, so a lookup also checks the cell to the left and
/// the cell above. Generated cells are memoized in a cache holding up to
/// three rows; the cache is dropped wholesale when it fills.
#[derive(Debug)]
pub struct BlockNoise {
    pub domain: [f64; 2],
    pub rows: usize,
    pub cols: usize,
    pub seed: u64,
    /// Rectangles per cell.
    pub samples: usize,
    pub cell_w: f64,
    pub cell_h: f64,
    cache_limit: usize,
    cache: Mutex<FxHashMap<usize, Vec<Block>>>,
}

impl BlockNoise {
    /// # Arguments
    ///
    /// * `w`, `h` - Domain size, the pattern repeats beyond it
    /// * `rows`, `cols` - Cell grid
    /// * `density` - Rectangles per unit of cell height
    /// * `seed` - Seed for the per-cell rectangle draws
    pub fn new(w: f64, h: f64, rows: usize, cols: usize, density: f64, seed: u64) -> Result<Self> {
        positive("block domain width", w)?;
        positive("block domain height", h)?;
        if rows == 0 || cols == 0 {
            return Err(TextureError::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        let cell_w = w / cols as f64;
        let cell_h = h / rows as f64;
        let samples = 4 * (cell_h * density.max(0.0)) as usize;
        debug!(rows, cols, samples, seed, "Block noise");
        Ok(Self {
            domain: [w, h],
            rows,
            cols,
            seed,
            samples,
            cell_w,
            cell_h,
            cache_limit: 3 * cols,
            cache: Mutex::new(FxHashMap::default()),
        })
    }

    fn cell_blocks(&self, r: usize, c: usize) -> Vec<Block> {
        let index = r * self.cols + c;
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(index as u64));
        let (lw, lh) = (self.cell_w, 1.0);
        (0..self.samples)
            .map(|_| {
                let ox = rng.random::<f64>() * self.cell_w;
                let oy = rng.random::<f64>() * self.cell_h;
                let dx = rng.random::<f64>() * lw;
                let dy = rng.random::<f64>() * lh;
                [ox, oy, ox + dx, oy + dy]
            })
            .collect()
    }

    /// True if `(x, y)`, local to cell `(r, c)`, falls in one of its blocks.
    fn hit(&self, r: usize, c: usize, x: f64, y: f64) -> bool {
        let index = r * self.cols + c;
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if !cache.contains_key(&index) {
            if cache.len() >= self.cache_limit {
                trace!(entries = cache.len(), "Block noise cell cache reset");
                cache.clear();
            }
            cache.insert(index, self.cell_blocks(r, c));
        }
        cache
            .get(&index)
            .is_some_and(|blocks| {
                blocks
                    .iter()
                    .any(|b| x >= b[0] && x <= b[2] && y >= b[1] && y <= b[3])
            })
    }
}

impl ScalarField for BlockNoise {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let (_, x) = map_value_to_lambda(x, self.domain[0]);
        let (_, y) = map_value_to_lambda(y, self.domain[1]);
        let r = ((y / self.cell_h) as usize).min(self.rows - 1);
        let c = ((x / self.cell_w) as usize).min(self.cols - 1);
        let x = x - self.cell_w * c as f64;
        let y = y - self.cell_h * r as f64;

        if self.hit(r, c, x, y) {
            return 1.0;
        }

        // Cell to the left
        let left = if c == 0 { self.cols - 1 } else { c - 1 };
        if self.hit(r, left, x + self.cell_w, y) {
            return 1.0;
        }

        // Cell above
        let up = if r == 0 { self.rows - 1 } else { r - 1 };
        if self.hit(up, c, x, y + self.cell_h) {
            return 1.0;
        }

        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_wraps() {
        let b = Binary::new(8, 4, 42, 0.5).unwrap();
        for (x, y) in [(0.5, 0.5), (3.2, 2.9), (7.0, 1.0)] {
            assert_eq!(b.eval(x, y), b.eval(x + 8.0, y + 4.0));
        }
        let v = b.eval(-1.5, 0.0);
        assert!(v == 1.0 || v == -1.0);
        assert!(Binary::new(0, 4, 1, 0.5).is_err());
    }

    #[test]
    fn test_binary_extremes() {
        let all = Binary::new(4, 4, 1, 1.1).unwrap();
        let none = Binary::new(4, 4, 1, 0.0).unwrap();
        assert_eq!(all.eval(2.0, 2.0), 1.0);
        assert_eq!(none.eval(2.0, 2.0), -1.0);
    }

    #[test]
    fn test_block_noise_is_stable_across_cache_resets() {
        let bn = BlockNoise::new(100.0, 100.0, 10, 10, 0.5, 9).unwrap();
        let pts: Vec<(f64, f64)> = (0..400)
            .map(|i| (f64::from(i) * 2.37, f64::from(i % 37) * 2.71))
            .collect();
        let first: Vec<f64> = pts.iter().map(|(x, y)| bn.eval(*x, *y)).collect();
        let second: Vec<f64> = pts.iter().map(|(x, y)| bn.eval(*x, *y)).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|v| *v == 1.0 || *v == -1.0));
    }

    #[test]
    fn test_block_noise_periodic() {
        let bn = BlockNoise::new(50.0, 40.0, 4, 5, 1.0, 3).unwrap();
        for (x, y) in [(1.0, 2.0), (33.25, 17.5), (49.0, 39.0)] {
            assert_eq!(bn.eval(x, y), bn.eval(x + 50.0, y - 40.0));
        }
    }
}
