//! Memoization of expensive scalar fields

use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::{positive, Result};
use crate::field::ScalarField;

/// Remembers recent evaluations of its source, one per `resolution` sized
/// cell. A cell only answers for the exact point it was filled from, so the
/// cache never changes what the field returns. Once more than `limit`
/// cells are held the whole cache is dropped.
///
/// Worth wrapping around sources that morphology or convolution sample
/// repeatedly at the same offsets.
#[derive(Debug)]
pub struct Cache<S> {
    pub src: S,
    pub resolution: f64,
    pub limit: usize,
    inv_res: f64,
    cells: Mutex<FxHashMap<(i64, i64), [f64; 3]>>,
}

impl<S: ScalarField> Cache<S> {
    /// `resolution` must be positive; `limit` is raised to at least 1.
    pub fn new(src: S, resolution: f64, limit: usize) -> Result<Self> {
        let resolution = positive("cache resolution", resolution)?;
        let limit = limit.max(1);
        debug!(resolution, limit, "Field cache");
        Ok(Self {
            src,
            resolution,
            limit,
            inv_res: 1.0 / resolution,
            cells: Mutex::new(FxHashMap::default()),
        })
    }

    #[inline]
    fn cell(&self, x: f64, y: f64) -> (i64, i64) {
        ((x * self.inv_res).floor() as i64, (y * self.inv_res).floor() as i64)
    }

    /// Number of cells currently held.
    pub fn len(&self) -> usize {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: ScalarField> ScalarField for Cache<S> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let key = self.cell(x, y);
        {
            let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(&[cx, cy, v]) = cells.get(&key) {
                if cx == x && cy == y {
                    return v;
                }
            }
        }
        // Evaluate without holding the lock, the source may be slow
        let v = self.src.eval(x, y);
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        if cells.len() >= self.limit && !cells.contains_key(&key) {
            trace!(entries = cells.len(), "Field cache reset");
            cells.clear();
        }
        cells.insert(key, [x, y, v]);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::Perlin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting<'a> {
        calls: &'a AtomicUsize,
    }

    impl ScalarField for Counting<'_> {
        fn eval(&self, x: f64, _y: f64) -> f64 {
            self.calls.fetch_add(1, Ordering::Relaxed);
            (x / 100.0).clamp(-1.0, 1.0)
        }
    }

    #[test]
    fn test_repeat_queries_hit() {
        let calls = AtomicUsize::new(0);
        let c = Cache::new(Counting { calls: &calls }, 1.0, 16).unwrap();
        for _ in 0..5 {
            assert_eq!(c.eval(12.5, 3.0), 0.125);
        }
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        // Same cell, different point
        assert_eq!(c.eval(12.75, 3.0), 0.1275);
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_transparent_through_resets() {
        let p = Perlin::new(8);
        let c = Cache::new(&p, 0.5, 3).unwrap();
        for i in 0..500 {
            let (x, y) = (f64::from(i % 37) * 0.41 - 5.0, f64::from(i % 11) * 1.7);
            assert_eq!(c.eval(x, y), p.eval(x, y));
            assert!(c.len() <= 3);
        }
        assert!(Cache::new(&p, 0.0, 3).is_err());
    }
}
