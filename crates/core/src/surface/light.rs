//! Light sources
//!
//! A [`Light`] reports what it contributes at a surface point. Ambient light
//! has no direction; directional light comes from infinity and does not
//! fall off; point light falls off with the inverse square of distance.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::color::Frgba;

/// What a light delivers to one surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Illumination {
    pub color: Frgba,
    /// Unit vector from the surface towards the light, `None` for ambient
    pub direction: Option<Vector3<f64>>,
    /// Distance to the light, negative when there is no falloff
    pub distance: f64,
    pub power: f64,
}

impl Illumination {
    /// Light color after distance falloff.
    pub fn attenuated(&self) -> Frgba {
        if self.distance > 0.0 {
            self.color.scale(self.power / (self.distance * self.distance))
        } else {
            self.color
        }
    }
}

pub trait Light: Send + Sync {
    /// Illumination at the surface point `(x, y, 0)`.
    fn eval(&self, x: f64, y: f64) -> Illumination;
}

/// Uniform light from every direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ambient {
    pub color: Frgba,
}

impl Ambient {
    pub fn new(color: Frgba) -> Self {
        Self { color }
    }
}

impl Default for Ambient {
    /// Low gray.
    fn default() -> Self {
        Self::new(Frgba::from_rgb8(10, 10, 10))
    }
}

impl Light for Ambient {
    fn eval(&self, _x: f64, _y: f64) -> Illumination {
        Illumination {
            color: self.color,
            direction: None,
            distance: -1.0,
            power: 0.0,
        }
    }
}

/// Light at infinity. The direction points from the surface to the light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "DirectionalParams", into = "DirectionalParams")]
pub struct Directional {
    pub color: Frgba,
    direction: Vector3<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct DirectionalParams {
    color: Frgba,
    direction: Vector3<f64>,
}

impl Directional {
    /// A zero direction is replaced by straight overhead.
    pub fn new(color: Frgba, direction: Vector3<f64>) -> Self {
        Self {
            color,
            direction: unit_or_up(direction),
        }
    }

    pub fn direction(&self) -> &Vector3<f64> {
        &self.direction
    }
}

/// Unit vectors pass through untouched so serialized directions reload
/// bit for bit.
fn unit_or_up(v: Vector3<f64>) -> Vector3<f64> {
    let n = v.norm();
    if (n - 1.0).abs() < 1e-12 {
        v
    } else if n > f64::EPSILON {
        v / n
    } else {
        Vector3::z()
    }
}

impl From<DirectionalParams> for Directional {
    fn from(p: DirectionalParams) -> Self {
        Self::new(p.color, p.direction)
    }
}

impl From<Directional> for DirectionalParams {
    fn from(d: Directional) -> Self {
        Self {
            color: d.color,
            direction: d.direction,
        }
    }
}

impl Light for Directional {
    fn eval(&self, _x: f64, _y: f64) -> Illumination {
        Illumination {
            color: self.color,
            direction: Some(self.direction),
            distance: -1.0,
            power: 0.0,
        }
    }
}

/// Light at a point above the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub color: Frgba,
    pub position: Vector3<f64>,
    pub power: f64,
}

impl PointLight {
    pub fn new(color: Frgba, position: Vector3<f64>, power: f64) -> Self {
        Self {
            color,
            position,
            power,
        }
    }
}

impl Light for PointLight {
    fn eval(&self, x: f64, y: f64) -> Illumination {
        let to_light = self.position - Vector3::new(x, y, 0.0);
        let distance = to_light.norm();
        let direction = unit_or_up(to_light);
        Illumination {
            color: self.color,
            direction: Some(direction),
            distance,
            power: self.power,
        }
    }
}

/// Serializable choice of light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "light", rename_all = "snake_case")]
pub enum LightSource {
    Ambient(Ambient),
    Directional(Directional),
    Point(PointLight),
}

impl Light for LightSource {
    fn eval(&self, x: f64, y: f64) -> Illumination {
        match self {
            Self::Ambient(l) => l.eval(x, y),
            Self::Directional(l) => l.eval(x, y),
            Self::Point(l) => l.eval(x, y),
        }
    }
}
