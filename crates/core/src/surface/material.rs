//! Surface materials
//!
//! A [`Material`] gives the emissive color, the ambient, diffuse and specular
//! reflectances, the shininess exponent and the roughness at a point.

use serde::{Deserialize, Serialize};

use crate::color::Frgba;
use crate::field::ColorField;

/// Material properties at one point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialSample {
    pub emissive: Frgba,
    pub ambient: Frgba,
    pub diffuse: Frgba,
    pub specular: Frgba,
    pub shininess: f64,
    /// Normal perturbation in [0, 1], 0 leaves normals untouched
    #[serde(default)]
    pub roughness: f64,
}

impl Default for MaterialSample {
    /// No emission, white ambient and diffuse, no specular.
    fn default() -> Self {
        Self {
            emissive: Frgba::BLACK,
            ambient: Frgba::WHITE,
            diffuse: Frgba::WHITE,
            specular: Frgba::BLACK,
            shininess: 0.0,
            roughness: 0.0,
        }
    }
}

pub trait Material: Send + Sync {
    fn eval(&self, x: f64, y: f64) -> MaterialSample;
}

/// Matte white.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMaterial;

impl Material for DefaultMaterial {
    fn eval(&self, _x: f64, _y: f64) -> MaterialSample {
        MaterialSample::default()
    }
}

/// The same properties everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UniformMaterial {
    pub sample: MaterialSample,
}

impl UniformMaterial {
    pub fn new(sample: MaterialSample) -> Self {
        Self { sample }
    }
}

impl Material for UniformMaterial {
    fn eval(&self, _x: f64, _y: f64) -> MaterialSample {
        self.sample
    }
}

/// Ambient and diffuse reflectance read from a color field. Emission,
/// specular and the exponents are fixed.
#[derive(Debug, Clone)]
pub struct FieldMaterial<C> {
    pub color: C,
    pub emissive: Frgba,
    pub specular: Frgba,
    pub shininess: f64,
    pub roughness: f64,
}

impl<C: ColorField> FieldMaterial<C> {
    pub fn new(color: C) -> Self {
        Self {
            color,
            emissive: Frgba::BLACK,
            specular: Frgba::BLACK,
            shininess: 0.0,
            roughness: 0.0,
        }
    }

    pub fn with_specular(mut self, specular: Frgba, shininess: f64) -> Self {
        self.specular = specular;
        self.shininess = shininess;
        self
    }

    pub fn with_emissive(mut self, emissive: Frgba) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_roughness(mut self, roughness: f64) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }
}

impl<C: ColorField> Material for FieldMaterial<C> {
    fn eval(&self, x: f64, y: f64) -> MaterialSample {
        let c = self.color.eval(x, y).to_rgba();
        MaterialSample {
            emissive: self.emissive,
            ambient: c,
            diffuse: c,
            specular: self.specular,
            shininess: self.shininess,
            roughness: self.roughness,
        }
    }
}

impl<M: Material + ?Sized> Material for Box<M> {
    fn eval(&self, x: f64, y: f64) -> MaterialSample {
        (**self).eval(x, y)
    }
}
