//! Color model
//!
//! Colors are carried as floating point tuples in [0, 1]. [`Frgba`] uses
//! straight (non-premultiplied) alpha; conversions to and from premultiplied
//! form are explicit. [`Hsla`] is the hue/saturation/lightness equivalent and
//! [`Color`] tags which of the two a field produced.

use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA in floating point [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Frgba {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, 255)
    }

    /// Straight-alpha color from 8-bit channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            f64::from(a) / 255.0,
        )
    }

    /// Build from premultiplied channels. Fully transparent input yields
    /// [`Frgba::TRANSPARENT`].
    pub fn from_premultiplied(r: f64, g: f64, b: f64, a: f64) -> Self {
        if a <= 0.0 {
            return Self::TRANSPARENT;
        }
        Self::new(r / a, g / a, b / a, a)
    }

    /// Premultiplied `(r, g, b, a)`.
    pub fn to_premultiplied(self) -> (f64, f64, f64, f64) {
        (self.r * self.a, self.g * self.a, self.b * self.a, self.a)
    }

    /// Channel-wise sum of the color channels, clamped to [0, 1]. Alpha is
    /// taken from `self`.
    pub fn add(self, other: Self) -> Self {
        Self::new(
            (self.r + other.r).clamp(0.0, 1.0),
            (self.g + other.g).clamp(0.0, 1.0),
            (self.b + other.b).clamp(0.0, 1.0),
            self.a,
        )
    }

    /// Channel-wise product of the color channels. Alpha is taken from `self`.
    pub fn prod(self, other: Self) -> Self {
        Self::new(self.r * other.r, self.g * other.g, self.b * other.b, self.a)
    }

    /// Scale the color channels, leaving alpha untouched.
    pub fn scale(self, v: f64) -> Self {
        Self::new(self.r * v, self.g * v, self.b * v, self.a)
    }

    pub fn is_black(&self) -> bool {
        self.r < 0.0001 && self.g < 0.0001 && self.b < 0.0001
    }

    /// Straight-alpha 8-bit channels.
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            to_u8(self.r),
            to_u8(self.g),
            to_u8(self.b),
            to_u8(self.a),
        ]
    }

    /// Straight-alpha 16-bit channels.
    pub fn to_rgba16(self) -> [u16; 4] {
        [
            to_u16(self.r),
            to_u16(self.g),
            to_u16(self.b),
            to_u16(self.a),
        ]
    }

    pub fn from_rgba16(r: u16, g: u16, b: u16, a: u16) -> Self {
        let max = f64::from(u16::MAX);
        Self::new(f64::from(r) / max, f64::from(g) / max, f64::from(b) / max, f64::from(a) / max)
    }

    /// Rec. 601 luma of the premultiplied color, in [0, 1].
    pub fn luma(&self) -> f64 {
        let (r, g, b, _) = self.to_premultiplied();
        (0.299 * r + 0.587 * g + 0.114 * b).clamp(0.0, 1.0)
    }

    /// Convert to hue, saturation, lightness.
    pub fn to_hsla(self) -> Hsla {
        let (r, g, b) = (
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        );
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if max - min < 1e-12 {
            return Hsla::new(0.0, 0.0, l, self.a);
        }
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        Hsla::new(h / 6.0, s, l, self.a)
    }
}

#[inline]
fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn to_u16(v: f64) -> u16 {
    (v.clamp(0.0, 1.0) * f64::from(u16::MAX)).round() as u16
}

/// Hue, saturation, lightness and alpha, all in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsla {
    pub h: f64,
    pub s: f64,
    pub l: f64,
    pub a: f64,
}

impl Hsla {
    pub const fn new(h: f64, s: f64, l: f64, a: f64) -> Self {
        Self { h, s, l, a }
    }

    /// Convert to straight-alpha RGBA. Hue wraps, the other channels clamp.
    pub fn to_rgba(self) -> Frgba {
        let h = self.h.rem_euclid(1.0);
        let s = self.s.clamp(0.0, 1.0);
        let l = self.l.clamp(0.0, 1.0);
        if s <= 0.0 {
            return Frgba::new(l, l, l, self.a);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Frgba::new(
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
            self.a,
        )
    }
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// A color tagged with the model it was produced in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum Color {
    Rgba(Frgba),
    Hsla(Hsla),
}

impl Color {
    pub const BLACK: Self = Self::Rgba(Frgba::BLACK);
    pub const WHITE: Self = Self::Rgba(Frgba::WHITE);

    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self::Rgba(Frgba::new(r, g, b, a))
    }

    pub fn hsla(h: f64, s: f64, l: f64, a: f64) -> Self {
        Self::Hsla(Hsla::new(h, s, l, a))
    }

    pub fn gray(v: f64) -> Self {
        Self::rgba(v, v, v, 1.0)
    }

    pub fn to_rgba(self) -> Frgba {
        match self {
            Self::Rgba(c) => c,
            Self::Hsla(c) => c.to_rgba(),
        }
    }

    pub fn to_hsla(self) -> Hsla {
        match self {
            Self::Rgba(c) => c.to_hsla(),
            Self::Hsla(c) => c,
        }
    }

    pub fn alpha(&self) -> f64 {
        match self {
            Self::Rgba(c) => c.a,
            Self::Hsla(c) => c.a,
        }
    }

    pub fn luma(&self) -> f64 {
        self.to_rgba().luma()
    }
}

impl From<Frgba> for Color {
    fn from(c: Frgba) -> Self {
        Self::Rgba(c)
    }
}

impl From<Hsla> for Color {
    fn from(c: Hsla) -> Self {
        Self::Hsla(c)
    }
}

/// Interpolation scheme between two colors, `t` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorLerp {
    /// Straight interpolation of the RGBA channels.
    #[default]
    Rgba,
    /// Interpolation of the HSLA channels. Hue never crosses 1 -> 0.
    Hsl,
    /// As [`ColorLerp::Hsl`] but hue takes the shortest path around the circle.
    HslShortest,
}

impl ColorLerp {
    pub fn lerp(self, t: f64, start: Color, end: Color) -> Color {
        let mix = |a: f64, b: f64| (1.0 - t) * a + t * b;
        match self {
            Self::Rgba => {
                let (s, e) = (start.to_rgba(), end.to_rgba());
                Color::rgba(mix(s.r, e.r), mix(s.g, e.g), mix(s.b, e.b), mix(s.a, e.a))
            }
            Self::Hsl => {
                let (s, e) = (start.to_hsla(), end.to_hsla());
                Color::hsla(mix(s.h, e.h), mix(s.s, e.s), mix(s.l, e.l), mix(s.a, e.a))
            }
            Self::HslShortest => {
                let (s, e) = (start.to_hsla(), end.to_hsla());
                let hd = e.h - s.h;
                let h = if hd > 0.5 {
                    mix(s.h, e.h - 1.0).rem_euclid(1.0)
                } else if hd < -0.5 {
                    mix(s.h, e.h + 1.0).rem_euclid(1.0)
                } else {
                    mix(s.h, e.h)
                };
                Color::hsla(h, mix(s.s, e.s), mix(s.l, e.l), mix(s.a, e.a))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_hsl_round_trip_primaries() {
        for c in [
            Frgba::new(1.0, 0.0, 0.0, 1.0),
            Frgba::new(0.0, 1.0, 0.0, 1.0),
            Frgba::new(0.0, 0.0, 1.0, 0.5),
            Frgba::new(0.2, 0.4, 0.6, 1.0),
            Frgba::new(0.9, 0.9, 0.1, 1.0),
        ] {
            let back = c.to_hsla().to_rgba();
            assert_abs_diff_eq!(back.r, c.r, epsilon = 1e-9);
            assert_abs_diff_eq!(back.g, c.g, epsilon = 1e-9);
            assert_abs_diff_eq!(back.b, c.b, epsilon = 1e-9);
            assert_abs_diff_eq!(back.a, c.a, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_red_hue_is_zero() {
        let hsl = Frgba::new(1.0, 0.0, 0.0, 1.0).to_hsla();
        assert_abs_diff_eq!(hsl.h, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hsl.s, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hsl.l, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_sixteen_bit_channels() {
        let c = Frgba::new(1.0, 0.5, 0.0, 2.0);
        assert_eq!(c.to_rgba16(), [65535, 32768, 0, 65535]);
        assert_eq!(Frgba::from_rgba16(65535, 0, 0, 65535), Frgba::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_premultiplied_round_trip() {
        let c = Frgba::new(0.8, 0.4, 0.2, 0.5);
        let (r, g, b, a) = c.to_premultiplied();
        assert_abs_diff_eq!(r, 0.4, epsilon = 1e-12);
        let back = Frgba::from_premultiplied(r, g, b, a);
        assert_abs_diff_eq!(back.g, 0.4, epsilon = 1e-12);
        assert_eq!(Frgba::from_premultiplied(0.3, 0.3, 0.3, 0.0), Frgba::TRANSPARENT);
    }

    #[test]
    fn test_add_clamps_and_keeps_alpha() {
        let c = Frgba::new(0.7, 0.2, 0.0, 0.3).add(Frgba::new(0.6, 0.2, 0.1, 1.0));
        assert_eq!(c.r, 1.0);
        assert_abs_diff_eq!(c.g, 0.4, epsilon = 1e-12);
        assert_eq!(c.a, 0.3);
    }

    #[test]
    fn test_hsl_shortest_wraps() {
        let start = Color::hsla(0.9, 1.0, 0.5, 1.0);
        let end = Color::hsla(0.1, 1.0, 0.5, 1.0);
        let mid = ColorLerp::HslShortest.lerp(0.5, start, end).to_hsla();
        assert_abs_diff_eq!(mid.h, 0.0, epsilon = 1e-9);
        let long = ColorLerp::Hsl.lerp(0.5, start, end).to_hsla();
        assert_abs_diff_eq!(long.h, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_luma_of_white_and_transparent() {
        assert_abs_diff_eq!(Color::WHITE.luma(), 1.0, epsilon = 1e-12);
        assert_eq!(Frgba::TRANSPARENT.luma(), 0.0);
    }
}
