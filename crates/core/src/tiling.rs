//! Tilings and chequers
//!
//! [`Tiler`] repeats a finite domain of its source across the plane and
//! [`StochasticTiler`] picks a different source per tile. [`Squares`],
//! [`Triangles`] and [`Hexagons`] are the regular tilings of the plane with
//! cells coloured by parity.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::color::Color;
use crate::error::{positive, Result, TextureError};
use crate::field::{ColorField, ScalarField, VectorField};
use crate::wave::map_value_to_lambda;

/// Tile picks kept before the stochastic tiler cache is dropped.
const TILE_CACHE_LIMIT: usize = 10_240;

/// Repeats the source's `[0, domain)` rectangle everywhere.
#[derive(Debug, Clone)]
pub struct Tiler<S> {
    pub src: S,
    pub domain: [f64; 2],
}

impl<S> Tiler<S> {
    /// Both domain sides must be positive.
    pub fn new(src: S, domain: [f64; 2]) -> Result<Self> {
        positive("tile width", domain[0])?;
        positive("tile height", domain[1])?;
        Ok(Self { src, domain })
    }

    #[inline]
    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        let (_, x) = map_value_to_lambda(x, self.domain[0]);
        let (_, y) = map_value_to_lambda(y, self.domain[1]);
        (x, y)
    }
}

remap_fields!(Tiler);

/// Tiles the plane with one of several sources chosen per tile.
///
/// The choice is a seeded draw keyed on the tile indices, so it is stable
/// for the life of the node. Draws are memoized in a bounded cache that is
/// dropped wholesale when full.
#[derive(Debug)]
pub struct StochasticTiler<S> {
    pub srcs: Vec<S>,
    pub domain: [f64; 2],
    pub seed: u64,
    cache: Mutex<FxHashMap<i64, usize>>,
}

impl<S> StochasticTiler<S> {
    pub fn new(srcs: Vec<S>, domain: [f64; 2], seed: u64) -> Result<Self> {
        if srcs.is_empty() {
            return Err(TextureError::EmptySources);
        }
        positive("tile width", domain[0])?;
        positive("tile height", domain[1])?;
        debug!(sources = srcs.len(), seed, "Stochastic tiler");
        Ok(Self {
            srcs,
            domain,
            seed,
            cache: Mutex::new(FxHashMap::default()),
        })
    }

    fn pick(&self, m: usize, n: usize) -> usize {
        let key = m as i64 * 1024 + n as i64;
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(v) = cache.get(&key) {
            return *v;
        }
        if cache.len() > TILE_CACHE_LIMIT {
            trace!(entries = cache.len(), "Stochastic tiler cache reset");
            cache.clear();
        }
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(key as u64));
        let v = rng.random_range(0..self.srcs.len());
        cache.insert(key, v);
        v
    }

    /// Source for the tile holding the point and the tile local coordinates.
    fn locate(&self, x: f64, y: f64) -> (&S, f64, f64) {
        let (m, x) = map_value_to_lambda(x, self.domain[0]);
        let (n, y) = map_value_to_lambda(y, self.domain[1]);
        (&self.srcs[self.pick(m, n)], x, y)
    }

    #[cfg(test)]
    fn cached(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl<S: ScalarField> ScalarField for StochasticTiler<S> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let (src, x, y) = self.locate(x, y);
        src.eval(x, y)
    }
}

impl<S: VectorField> VectorField for StochasticTiler<S> {
    fn eval(&self, x: f64, y: f64) -> Vec<f64> {
        let (src, x, y) = self.locate(x, y);
        src.eval(x, y)
    }
}

impl<S: ColorField> ColorField for StochasticTiler<S> {
    fn eval(&self, x: f64, y: f64) -> Color {
        let (src, x, y) = self.locate(x, y);
        src.eval(x, y)
    }
}

/// Chequerboard: the square holding the origin's upper right quadrant is 1,
/// its neighbours -1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Squares {
    pub scale: f64,
}

impl Squares {
    pub fn new(scale: f64) -> Result<Self> {
        Ok(Self {
            scale: positive("square size", scale)?,
        })
    }
}

impl ScalarField for Squares {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let (mut c, _) = map_value_to_lambda(x, self.scale);
        if x < 0.0 {
            c += 1;
        }
        let (mut r, _) = map_value_to_lambda(y, self.scale);
        if y < 0.0 {
            r += 1;
        }
        if (r + c) & 1 == 1 {
            -1.0
        } else {
            1.0
        }
    }
}

/// Squares split along their anti-diagonal, lower half 1, upper half -1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangles {
    pub scale: f64,
}

impl Triangles {
    pub fn new(scale: f64) -> Result<Self> {
        Ok(Self {
            scale: positive("triangle size", scale)?,
        })
    }
}

impl ScalarField for Triangles {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let (_, rx) = map_value_to_lambda(x, self.scale);
        let (_, ry) = map_value_to_lambda(y, self.scale);
        if rx + ry < self.scale {
            1.0
        } else {
            -1.0
        }
    }
}

/// Three coloured hexagonal tiling built from sheared squares. Cells take
/// the values 1, 0 and -1 so that no two neighbours match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hexagons {
    pub scale: f64,
}

impl Hexagons {
    pub fn new(scale: f64) -> Result<Self> {
        Ok(Self {
            scale: positive("hexagon size", scale)?,
        })
    }
}

impl ScalarField for Hexagons {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let (c, rx) = map_value_to_lambda(x, self.scale);
        let (r, ry) = map_value_to_lambda(y, self.scale);

        let mut r = r % 3;
        if y < 0.0 {
            r = 2 - r;
        }
        let mut c = c % 3;
        if x < 0.0 {
            c = 2 - c;
        }
        let lower = rx + ry < self.scale;

        if r == c {
            // Diagonal cells are split between two hexagons
            return match (r, lower) {
                (0, true) | (2, false) => 0.0,
                (0, false) | (1, true) => 1.0,
                _ => -1.0,
            };
        }
        match r + c {
            1 => 1.0,
            2 => 0.0,
            _ => -1.0,
        }
    }
}
