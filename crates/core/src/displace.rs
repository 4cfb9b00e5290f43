//! Domain warping by other fields
//!
//! [`Displace`] and [`DisplaceVector`] move the sample point by values read
//! from secondary fields; [`Distort`] reads the displacement from its own
//! source.

use crate::error::{Result, TextureError};
use crate::field::{ScalarField, VectorField};

/// Samples the source at the point moved by `(dx, dy) * scale`, where the
/// displacements come from two scalar fields evaluated at the offset point.
///
/// With `independent` set the displacement is used as the sample point on
/// its own instead of being added to `(x, y)`.
#[derive(Debug, Clone)]
pub struct Displace<S, X, Y> {
    pub src: S,
    pub dx: X,
    pub dy: Y,
    pub offset: [f64; 2],
    pub scale: [f64; 2],
    pub independent: bool,
}

impl<S, X: ScalarField, Y: ScalarField> Displace<S, X, Y> {
    /// Same scale on both axes, no offset.
    pub fn new(src: S, dx: X, dy: Y, scale: f64) -> Self {
        Self {
            src,
            dx,
            dy,
            offset: [0.0, 0.0],
            scale: [scale, scale],
            independent: false,
        }
    }

    pub fn with_offset(mut self, offset: [f64; 2]) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_scale(mut self, sx: f64, sy: f64) -> Self {
        self.scale = [sx, sy];
        self
    }

    pub fn independent(mut self, independent: bool) -> Self {
        self.independent = independent;
        self
    }

    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        let (ox, oy) = (x + self.offset[0], y + self.offset[1]);
        let dvx = self.dx.eval(ox, oy) * self.scale[0];
        let dvy = self.dy.eval(ox, oy) * self.scale[1];
        if self.independent {
            (dvx, dvy)
        } else {
            (x + dvx, y + dvy)
        }
    }
}

remap_fields!(Displace, X: ScalarField, Y: ScalarField);

/// As [`Displace`] with both displacements taken from components of one
/// vector field.
#[derive(Debug, Clone)]
pub struct DisplaceVector<S, V> {
    pub src: S,
    pub disp: V,
    /// Components used for x and y
    pub select: [usize; 2],
    pub offset: [f64; 2],
    pub scale: [f64; 2],
    pub independent: bool,
}

impl<S, V: VectorField> DisplaceVector<S, V> {
    /// Uses components 0 and 1 with the same scale on both axes.
    pub fn new(src: S, disp: V, scale: f64) -> Self {
        Self {
            src,
            disp,
            select: [0, 1],
            offset: [0.0, 0.0],
            scale: [scale, scale],
            independent: false,
        }
    }

    /// Pick the vector components driving x and y. `len` is the length of
    /// the vectors the displacement field produces.
    pub fn with_select(mut self, sx: usize, sy: usize, len: usize) -> Result<Self> {
        for channel in [sx, sy] {
            if channel >= len {
                return Err(TextureError::InvalidChannel { channel, len });
            }
        }
        self.select = [sx, sy];
        Ok(self)
    }

    pub fn with_offset(mut self, offset: [f64; 2]) -> Self {
        self.offset = offset;
        self
    }

    pub fn independent(mut self, independent: bool) -> Self {
        self.independent = independent;
        self
    }

    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        let dv = self.disp.eval(x + self.offset[0], y + self.offset[1]);
        let pick = |i: usize| dv.get(i).copied().unwrap_or(0.0);
        let dvx = pick(self.select[0]) * self.scale[0];
        let dvy = pick(self.select[1]) * self.scale[1];
        if self.independent {
            (dvx, dvy)
        } else {
            (x + dvx, y + dvy)
        }
    }
}

remap_fields!(DisplaceVector, V: VectorField);

/// Self referential distortion after Musgrave's VL noise. The source is
/// sampled at two offset points to find where to sample it a third time.
#[derive(Debug, Clone)]
pub struct Distort<S> {
    pub src: S,
    pub offset: [f64; 2],
    /// Extra offsets for the x and y lookups
    pub noise_offset: [f64; 2],
    pub distortion: f64,
}

impl<S: ScalarField> Distort<S> {
    pub fn new(src: S, distortion: f64) -> Self {
        Self {
            src,
            offset: [0.5, 0.5],
            noise_offset: [0.0, 3.333],
            distortion,
        }
    }
}

impl<S: ScalarField> ScalarField for Distort<S> {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let (x, y) = (x + self.offset[0], y + self.offset[1]);
        let [nox, noy] = self.noise_offset;
        // The x lookup is shifted by the x offset on both axes, likewise y
        let nx = self.src.eval(x + nox, y + nox) * self.distortion;
        let ny = self.src.eval(x + noy, y + noy) * self.distortion;
        self.src.eval(nx, ny)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FnField, Uniform, UniformVector};
    use crate::noise::Perlin;
    use approx::assert_abs_diff_eq;

    fn ramp() -> FnField<impl Fn(f64, f64) -> f64 + Send + Sync> {
        FnField(|x: f64, y: f64| ((x + y) / 100.0).clamp(-1.0, 1.0))
    }

    #[test]
    fn test_displace_shifts_sample() {
        let d = Displace::new(ramp(), Uniform::new(0.5), Uniform::new(-0.25), 10.0);
        // (10 + 5, 10 - 2.5)
        assert_abs_diff_eq!(ScalarField::eval(&d, 10.0, 10.0), 0.225, epsilon = 1e-12);
        let ind =
            Displace::new(ramp(), Uniform::new(0.5), Uniform::new(0.5), 10.0).independent(true);
        assert_abs_diff_eq!(ScalarField::eval(&ind, 70.0, -3.0), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_displace_vector_select() {
        let v = UniformVector::new(vec![0.1, 0.2, 0.3]);
        let d = DisplaceVector::new(ramp(), v.clone(), 100.0)
            .with_select(2, 0, 3)
            .unwrap();
        // (0 + 30, 0 + 10)
        assert_abs_diff_eq!(ScalarField::eval(&d, 0.0, 0.0), 0.4, epsilon = 1e-12);
        assert!(DisplaceVector::new(ramp(), v, 1.0).with_select(0, 3, 3).is_err());
    }

    #[test]
    fn test_distort_zero_is_constant() {
        let p = Perlin::new(4);
        let d = Distort::new(&p, 0.0);
        let at_origin = p.eval(0.0, 0.0);
        for i in 0..20 {
            assert_eq!(d.eval(f64::from(i) * 1.3, 7.0), at_origin);
        }
        let live = Distort::new(&p, 2.0);
        let v = live.eval(3.3, 4.4);
        assert!(v.is_finite());
    }
}
