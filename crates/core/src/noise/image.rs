//! Fields sampled from raster data
//!
//! Rasters hold plain floating point samples; decoding image files is left
//! to the caller. Sampling is bicubic over the 4x4 neighbourhood of the
//! pixel containing the point, with edge pixels repeated outwards. Each 1D
//! pass is clamped to [0, 1] since the cubic overshoots.

use serde::{Deserialize, Serialize};

use crate::color::Frgba;
use crate::error::{Result, TextureError};
use crate::field::{ScalarField, VectorField};

fn clamped_cubic(t: f64, p: &[f64; 4]) -> f64 {
    crate::wave::cubic(t, p).clamp(0.0, 1.0)
}

/// Serialized form of both rasters.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RasterParams<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// Gray raster with samples in [0, 1], row major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RasterParams<f64>", into = "RasterParams<f64>")]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f64>,
}

impl Raster {
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::InvalidDimensions { width, height });
        }
        if data.len() != width * height {
            return Err(TextureError::LengthMismatch {
                what: "raster samples",
                expected: width * height,
                actual: data.len(),
            });
        }
        let data = data.into_iter().map(|v| v.clamp(0.0, 1.0)).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Raster from 16-bit gray samples.
    pub fn from_gray16(width: usize, height: usize, data: &[u16]) -> Result<Self> {
        Self::new(
            width,
            height,
            data.iter().map(|v| f64::from(*v) / f64::from(u16::MAX)).collect(),
        )
    }

    /// Sample with coordinates clamped to the raster edges.
    #[inline]
    pub fn at(&self, x: i64, y: i64) -> f64 {
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        self.data[cy * self.width + cx]
    }
}

impl TryFrom<RasterParams<f64>> for Raster {
    type Error = TextureError;

    fn try_from(p: RasterParams<f64>) -> Result<Self> {
        Self::new(p.width, p.height, p.data)
    }
}

impl From<Raster> for RasterParams<f64> {
    fn from(r: Raster) -> Self {
        Self {
            width: r.width,
            height: r.height,
            data: r.data,
        }
    }
}

/// RGBA raster, straight alpha, row major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RasterParams<Frgba>", into = "RasterParams<Frgba>")]
pub struct RasterRgba {
    pub width: usize,
    pub height: usize,
    pub data: Vec<Frgba>,
}

impl RasterRgba {
    pub fn new(width: usize, height: usize, data: Vec<Frgba>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::InvalidDimensions { width, height });
        }
        if data.len() != width * height {
            return Err(TextureError::LengthMismatch {
                what: "raster pixels",
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Raster from interleaved 8-bit RGBA bytes.
    pub fn from_rgba8(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        let data = bytes
            .chunks_exact(4)
            .map(|p| Frgba::from_rgba8(p[0], p[1], p[2], p[3]))
            .collect();
        Self::new(width, height, data)
    }

    #[inline]
    pub fn at(&self, x: i64, y: i64) -> Frgba {
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        self.data[cy * self.width + cx]
    }

    /// Luma of every pixel as a gray raster.
    pub fn to_gray(&self) -> Raster {
        Raster {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(Frgba::luma).collect(),
        }
    }
}

impl TryFrom<RasterParams<Frgba>> for RasterRgba {
    type Error = TextureError;

    fn try_from(p: RasterParams<Frgba>) -> Result<Self> {
        Self::new(p.width, p.height, p.data)
    }
}

impl From<RasterRgba> for RasterParams<Frgba> {
    fn from(r: RasterRgba) -> Self {
        Self {
            width: r.width,
            height: r.height,
            data: r.data,
        }
    }
}

/// Split a coordinate into pixel index and fraction.
#[inline]
fn cell(v: f64) -> (i64, f64) {
    let f = v.floor();
    (f as i64, v - f)
}

/// Bicubic gray image field. Returns 0 outside the raster.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageField {
    pub raster: Raster,
}

impl ImageField {
    pub fn new(raster: Raster) -> Self {
        Self { raster }
    }

    /// Interpolated sample in [0, 1].
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let (ix, rx) = cell(x);
        let (iy, ry) = cell(y);
        let mut rows = [0.0; 4];
        for (j, row) in rows.iter_mut().enumerate() {
            let py = iy - 1 + j as i64;
            let p = [
                self.raster.at(ix - 1, py),
                self.raster.at(ix, py),
                self.raster.at(ix + 1, py),
                self.raster.at(ix + 2, py),
            ];
            *row = clamped_cubic(rx, &p);
        }
        clamped_cubic(ry, &rows)
    }
}

impl ScalarField for ImageField {
    fn eval(&self, x: f64, y: f64) -> f64 {
        let r = &self.raster;
        if x < 0.0 || x >= r.width as f64 || y < 0.0 || y >= r.height as f64 {
            return 0.0;
        }
        self.sample(x, y) * 2.0 - 1.0
    }
}

/// Bicubic RGBA image as a 4-vector field, channels in [0, 1]. Returns
/// `(0, 0, 0, 1)` outside the raster.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageVector {
    pub raster: RasterRgba,
    /// Produce HSLA channels instead of RGBA.
    pub hsl: bool,
}

impl ImageVector {
    pub fn new(raster: RasterRgba, hsl: bool) -> Self {
        Self { raster, hsl }
    }

    fn channels(&self, x: i64, y: i64) -> [f64; 4] {
        let c = self.raster.at(x, y);
        if self.hsl {
            let h = c.to_hsla();
            [h.h, h.s, h.l, h.a]
        } else {
            [c.r, c.g, c.b, c.a]
        }
    }
}

impl VectorField for ImageVector {
    fn eval(&self, x: f64, y: f64) -> Vec<f64> {
        let r = &self.raster;
        if x < 0.0 || x >= r.width as f64 || y < 0.0 || y >= r.height as f64 {
            return vec![0.0, 0.0, 0.0, 1.0];
        }
        let (ix, rx) = cell(x);
        let (iy, ry) = cell(y);

        let mut patch = [[[0.0; 4]; 4]; 4];
        for (j, row) in patch.iter_mut().enumerate() {
            for (i, px) in row.iter_mut().enumerate() {
                *px = self.channels(ix - 1 + i as i64, iy - 1 + j as i64);
            }
        }

        (0..4)
            .map(|ch| {
                let mut rows = [0.0; 4];
                for (j, row) in rows.iter_mut().enumerate() {
                    let p = [
                        patch[j][0][ch],
                        patch[j][1][ch],
                        patch[j][2][ch],
                        patch[j][3][ch],
                    ];
                    *row = clamped_cubic(rx, &p);
                }
                clamped_cubic(ry, &rows)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ramp() -> Raster {
        let data = (0..16).map(|i| f64::from(i % 4) / 3.0).collect();
        Raster::new(4, 4, data).unwrap()
    }

    #[test]
    fn test_samples_at_pixel_corners() {
        let f = ImageField::new(ramp());
        assert_abs_diff_eq!(f.eval(0.0, 0.0), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(f.eval(3.0, 2.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(f.eval(1.0, 1.0), 1.0 / 3.0 * 2.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_outside() {
        let f = ImageField::new(ramp());
        assert_eq!(f.eval(-0.1, 1.0), 0.0);
        assert_eq!(f.eval(4.0, 1.0), 0.0);
        assert_eq!(f.eval(1.0, 4.5), 0.0);
    }

    #[test]
    fn test_raster_validation() {
        assert!(Raster::new(2, 2, vec![0.0; 3]).is_err());
        assert!(Raster::new(0, 2, vec![]).is_err());
        let r = Raster::from_gray16(1, 1, &[u16::MAX]).unwrap();
        assert_eq!(r.at(5, -5), 1.0);

        let back: Raster = serde_json::from_str(&serde_json::to_string(&ramp()).unwrap()).unwrap();
        assert_eq!(back, ramp());
        let short = r#"{"width":2,"height":2,"data":[0.0,0.5,1.0]}"#;
        assert!(serde_json::from_str::<Raster>(short).is_err());
        assert!(serde_json::from_str::<RasterRgba>(r#"{"width":0,"height":1,"data":[]}"#).is_err());
    }

    #[test]
    fn test_vector_image() {
        let red = Frgba::new(1.0, 0.0, 0.0, 1.0);
        let raster = RasterRgba::new(2, 2, vec![red; 4]).unwrap();
        let f = ImageVector::new(raster.clone(), false);
        let v = f.eval(0.5, 0.5);
        assert_abs_diff_eq!(v[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v[1], 0.0, epsilon = 1e-12);
        assert_eq!(f.eval(-1.0, 0.0), vec![0.0, 0.0, 0.0, 1.0]);

        let hsl = ImageVector::new(raster, true);
        let h = hsl.eval(1.0, 1.0);
        assert_abs_diff_eq!(h[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(h[2], 0.5, epsilon = 1e-12);
    }
}
