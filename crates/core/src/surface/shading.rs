//! Phong and Blinn-Phong shading of a lit, bump mapped surface

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Unit, UnitQuaternion, Vector3};

use super::light::{Ambient, Light};
use super::material::Material;
use crate::color::{Color, Frgba};
use crate::field::{ColorField, VectorField};

/// The viewer looks straight down onto the plane.
const VIEW: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);

/// Color field produced by lighting a material through a normal map.
///
/// Each point is the sum of the emissive color, the ambient light times the
/// ambient reflectance, and the diffuse and specular contributions of every
/// light facing the surface.
pub struct Surface<M, N> {
    pub ambient: Ambient,
    pub lights: Vec<Box<dyn Light>>,
    pub material: M,
    pub normals: N,
    /// Blinn-Phong half vector highlights instead of Phong reflection
    pub blinn: bool,
}

impl<M: Material, N: VectorField> Surface<M, N> {
    /// Default ambient light and no other lights.
    pub fn new(material: M, normals: N) -> Self {
        Self {
            ambient: Ambient::default(),
            lights: Vec::new(),
            material,
            normals,
            blinn: false,
        }
    }

    pub fn with_ambient(mut self, ambient: Ambient) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_light(mut self, light: impl Light + 'static) -> Self {
        self.lights.push(Box::new(light));
        self
    }

    pub fn blinn(mut self, blinn: bool) -> Self {
        self.blinn = blinn;
        self
    }

    fn normal_at(&self, x: f64, y: f64) -> Vector3<f64> {
        let n = self.normals.eval(x, y);
        let c = |i: usize, dflt: f64| n.get(i).copied().unwrap_or(dflt);
        Vector3::new(c(0, 0.0), c(1, 0.0), c(2, 1.0))
    }
}

impl<M: Material, N: VectorField> ColorField for Surface<M, N> {
    fn eval(&self, x: f64, y: f64) -> Color {
        let mat = self.material.eval(x, y);
        let mut col = mat.emissive.add(mat.ambient.prod(self.ambient.color));

        let mut normal = self.normal_at(x, y);
        if mat.roughness > 0.0 {
            normal = roughen(mat.roughness, &normal);
        }

        let mut diffuse = Frgba::default();
        let mut specular = Frgba::default();
        for light in &self.lights {
            let lit = light.eval(x, y);
            let Some(dir) = lit.direction else {
                continue;
            };
            if lit.color.is_black() {
                continue;
            }
            let lambert = dir.dot(&normal);
            if lambert < 0.0 {
                continue;
            }
            let lcol = lit.attenuated();
            diffuse = diffuse.add(lcol.prod(mat.diffuse.scale(lambert)));

            let highlight = if self.blinn {
                let half = (dir + VIEW).try_normalize(f64::EPSILON).unwrap_or(VIEW);
                let dp = half.dot(&normal);
                (dp > 0.0).then(|| dp.powf(mat.shininess * 4.0))
            } else {
                let reflected = 2.0 * dir.dot(&normal) * normal - dir;
                let dp = reflected.dot(&VIEW);
                (dp > 0.0).then(|| dp.powf(mat.shininess))
            };
            if let Some(h) = highlight {
                specular = specular.add(lcol.prod(mat.specular.scale(h)));
            }
        }
        Color::Rgba(col.add(diffuse).add(specular))
    }
}

/// Replace `normal` by a random unit vector within `r * 90` degrees of it.
pub fn roughen(r: f64, normal: &Vector3<f64>) -> Vector3<f64> {
    let theta = rand::random::<f64>() * 2.0 * PI;
    let phi = (1.0 - rand::random::<f64>() * r) * FRAC_PI_2;
    let rv = Vector3::new(phi.cos() * theta.cos(), phi.cos() * theta.sin(), phi.sin());

    // Tilt the sample from about +z to about the normal
    let axis = VIEW.cross(normal);
    match Unit::try_new(axis, f64::EPSILON) {
        Some(axis) => {
            let angle = normal.dot(&VIEW).clamp(-1.0, 1.0).acos();
            UnitQuaternion::from_axis_angle(&axis, angle) * rv
        }
        // Parallel to +z keeps the sample, antiparallel flips it over
        None if normal.z < 0.0 => UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI) * rv,
        None => rv,
    }
}
