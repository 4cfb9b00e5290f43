//! Realizing fields as pixel buffers
//!
//! Pixel `(c, r)` samples the field at
//! `(origin_x + c * step_x, origin_y + r * step_y)`. [`render_gray`] and
//! [`render_rgba`] fill a whole buffer; [`TextureGray16`] and
//! [`TextureRgba`] evaluate pixels lazily on first access and keep them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TextureError};
use crate::field::{to_unit, ColorField, ScalarField};

/// Raster size and the mapping from pixels to field coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub origin_x: f64,
    pub origin_y: f64,
    pub step_x: f64,
    pub step_y: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            origin_x: 0.0,
            origin_y: 0.0,
            step_x: 1.0,
            step_y: 1.0,
        }
    }
}

impl RenderConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Rejects empty rasters.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TextureError::InvalidDimensions {
                width: self.width as usize,
                height: self.height as usize,
            });
        }
        Ok(())
    }

    /// Field coordinate of pixel `(c, r)`.
    #[inline]
    pub fn position(&self, c: u32, r: u32) -> (f64, f64) {
        (
            self.origin_x + f64::from(c) * self.step_x,
            self.origin_y + f64::from(r) * self.step_y,
        )
    }

    fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn index(&self, c: u32, r: u32) -> Option<usize> {
        (c < self.width && r < self.height).then(|| r as usize * self.width as usize + c as usize)
    }
}

/// Scalar in [-1, 1] to a 16-bit gray level.
#[inline]
fn to_gray16(v: f64) -> u16 {
    (to_unit(v).clamp(0.0, 1.0) * f64::from(u16::MAX)).round() as u16
}

/// Row-major 16-bit gray raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u16>,
}

/// Row-major straight-alpha RGBA raster, four bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Evaluate a scalar field at every pixel.
pub fn render_gray<S: ScalarField + ?Sized>(config: &RenderConfig, src: &S) -> Result<GrayBuffer> {
    config.validate()?;
    debug!(width = config.width, height = config.height, "Rendering gray");
    let mut data = Vec::with_capacity(config.pixels());
    for r in 0..config.height {
        for c in 0..config.width {
            let (x, y) = config.position(c, r);
            data.push(to_gray16(src.eval(x, y)));
        }
    }
    Ok(GrayBuffer {
        width: config.width,
        height: config.height,
        data,
    })
}

/// Evaluate a color field at every pixel.
pub fn render_rgba<C: ColorField + ?Sized>(config: &RenderConfig, src: &C) -> Result<RgbaBuffer> {
    config.validate()?;
    debug!(width = config.width, height = config.height, "Rendering RGBA");
    let mut data = Vec::with_capacity(config.pixels() * 4);
    for r in 0..config.height {
        for c in 0..config.width {
            let (x, y) = config.position(c, r);
            data.extend_from_slice(&src.eval(x, y).to_rgba().to_rgba8());
        }
    }
    Ok(RgbaBuffer {
        width: config.width,
        height: config.height,
        data,
    })
}

/// Fixed size bit set recording which pixels have been evaluated.
#[derive(Debug, Clone)]
struct BitMap {
    words: Vec<u64>,
}

impl BitMap {
    fn new(n: usize) -> Self {
        Self {
            words: vec![0; n.div_ceil(64)],
        }
    }

    #[inline]
    fn get(&self, i: usize) -> bool {
        self.words[i / 64] & (1 << (i % 64)) != 0
    }

    #[inline]
    fn set(&mut self, i: usize) {
        self.words[i / 64] |= 1 << (i % 64);
    }

    fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}

/// Lazily evaluated 16-bit gray image over a scalar field.
pub struct TextureGray16<S> {
    pub src: S,
    pub config: RenderConfig,
    pixels: Vec<u16>,
    done: BitMap,
}

impl<S: ScalarField> TextureGray16<S> {
    pub fn new(src: S, config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            src,
            pixels: vec![0; config.pixels()],
            done: BitMap::new(config.pixels()),
            config,
        })
    }

    /// Gray level at `(c, r)`, evaluated on first access. Out of bounds
    /// pixels are black.
    pub fn at(&mut self, c: u32, r: u32) -> u16 {
        let Some(i) = self.config.index(c, r) else {
            return 0;
        };
        if !self.done.get(i) {
            let (x, y) = self.config.position(c, r);
            self.pixels[i] = to_gray16(self.src.eval(x, y));
            self.done.set(i);
        }
        self.pixels[i]
    }

    /// Pixels evaluated so far.
    pub fn evaluated(&self) -> usize {
        self.done.count()
    }

    /// Evaluate everything still missing and hand over the raster.
    pub fn into_buffer(mut self) -> GrayBuffer {
        for r in 0..self.config.height {
            for c in 0..self.config.width {
                self.at(c, r);
            }
        }
        GrayBuffer {
            width: self.config.width,
            height: self.config.height,
            data: self.pixels,
        }
    }
}

/// Lazily evaluated RGBA image over a color field.
pub struct TextureRgba<C> {
    pub src: C,
    pub config: RenderConfig,
    pixels: Vec<[u8; 4]>,
    done: BitMap,
}

impl<C: ColorField> TextureRgba<C> {
    pub fn new(src: C, config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            src,
            pixels: vec![[0; 4]; config.pixels()],
            done: BitMap::new(config.pixels()),
            config,
        })
    }

    /// Straight-alpha RGBA at `(c, r)`, evaluated on first access. Out of
    /// bounds pixels are transparent.
    pub fn at(&mut self, c: u32, r: u32) -> [u8; 4] {
        let Some(i) = self.config.index(c, r) else {
            return [0; 4];
        };
        if !self.done.get(i) {
            let (x, y) = self.config.position(c, r);
            self.pixels[i] = self.src.eval(x, y).to_rgba().to_rgba8();
            self.done.set(i);
        }
        self.pixels[i]
    }

    pub fn evaluated(&self) -> usize {
        self.done.count()
    }

    pub fn into_buffer(mut self) -> RgbaBuffer {
        for r in 0..self.config.height {
            for c in 0..self.config.width {
                self.at(c, r);
            }
        }
        RgbaBuffer {
            width: self.config.width,
            height: self.config.height,
            data: self.pixels.into_iter().flatten().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::field::{FnField, UniformColor};

    #[test]
    fn test_config_defaults_and_validation() {
        let cfg = RenderConfig::default();
        assert_eq!((cfg.width, cfg.height), (512, 512));
        assert!(RenderConfig::new(0, 4).validate().is_err());
        let parsed: RenderConfig = serde_json::from_str(r#"{"width": 8, "step_x": 0.5}"#).unwrap();
        assert_eq!(parsed.height, 512);
        assert_eq!(parsed.position(2, 3), (1.0, 3.0));
    }

    #[test]
    fn test_render_gray_maps_range() {
        let cfg = RenderConfig {
            origin_x: -1.0,
            step_x: 1.0,
            ..RenderConfig::new(3, 1)
        };
        let buf = render_gray(&cfg, &FnField(|x: f64, _y: f64| x)).unwrap();
        assert_eq!(buf.data, vec![0, 32768, 65535]);
    }

    #[test]
    fn test_lazy_texture_counts() {
        let mut t =
            TextureRgba::new(UniformColor::new(Color::WHITE), RenderConfig::new(4, 4)).unwrap();
        assert_eq!(t.evaluated(), 0);
        assert_eq!(t.at(1, 2), [255; 4]);
        t.at(1, 2);
        assert_eq!(t.evaluated(), 1);
        assert_eq!(t.at(9, 0), [0; 4]);
        let buf = t.into_buffer();
        assert_eq!(buf.data.len(), 64);

        let mut g =
            TextureGray16::new(FnField(|_x: f64, _y: f64| 1.0), RenderConfig::new(70, 1)).unwrap();
        assert_eq!(g.at(69, 0), u16::MAX);
        assert_eq!(g.evaluated(), 1);
        assert_eq!(g.into_buffer().data.len(), 70);
    }
}
