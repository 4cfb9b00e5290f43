//! Lighting of textured surfaces
//!
//! A [`Surface`] is a color field built from a [`Material`], a normal map
//! and a set of [`Light`]s.

pub mod light;
pub mod material;
pub mod shading;

pub use light::{Ambient, Directional, Illumination, Light, LightSource, PointLight};
pub use material::{DefaultMaterial, FieldMaterial, Material, MaterialSample, UniformMaterial};
pub use shading::{roughen, Surface};
