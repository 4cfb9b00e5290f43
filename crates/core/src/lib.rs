//! Procedural Texture Core Library
//!
//! Resolution independent fields over the plane, composed into trees and
//! sampled into images only at the very end.
//!
//! ## Fields
//!
//! Every node implements one or more of the field traits:
//! - [`ScalarField`]: a value in [-1, 1] at each point
//! - [`VectorField`]: a variable length vector, typically a surface normal
//! - [`ColorField`]: an RGBA or HSLA color
//!
//! Leaves are noises, gradients, tilings and wave generators. Inner nodes
//! remap coordinates (transforms, reflections, warps, tilers), reshape
//! values (filters), mix fields (combiners, morphology, displacement,
//! fractals) or convert between the three kinds. Surfaces light a material
//! with a normal field.
//!
//! Trees can be built in code or described with [`TextureSpec`] and loaded
//! from JSON. [`render_gray`] and [`render_rgba`] realize a field on a
//! pixel grid.

// Field traits and simple leaves, must come first for the remap macro
#[macro_use]
pub mod field;

// Values, colors and shaping
pub mod color;
pub mod error;
pub mod geometry;
pub mod nonlinear;
pub mod wave;

// Sources
pub mod generator;
pub mod gradient;
pub mod noise;
pub mod tiling;

// Operators
pub mod cache;
pub mod combine;
pub mod displace;
pub mod filter;
pub mod fractal;
pub mod morphology;
pub mod transform;

// Vectors, colors and lighting
pub mod color_field;
pub mod component;
pub mod surface;
pub mod vector;

// Descriptions and output
pub mod describe;
pub mod realize;

// Re-export the field traits and common leaves
pub use field::{
    BoxField, BoxedColor, BoxedScalar, BoxedVector, ColorField, FnField, Rect, ScalarField, Uniform,
    UniformColor, UniformVector, VectorField, Window, Window2,
};

// Re-export value types
pub use color::{Color, ColorLerp, Frgba, Hsla};
pub use error::{Result, TextureError};
pub use geometry::{Aff3, Circle, Polygon, Shape};
pub use nonlinear::NonLinear;
pub use wave::{BoxedWave, Wave};

// Re-export the most used nodes
pub use cache::Cache;
pub use color_field::{ColorConv, ColorNl, ColorStop};
pub use component::Component;
pub use fractal::{Fractal, OctaveCombiner};
pub use noise::Perlin;
pub use surface::{Directional, LightSource, Surface};
pub use transform::{Reflect, Transform};
pub use vector::Normal;

// Re-export descriptions and rendering
pub use describe::{ColorSpec, ScalarSpec, TextureSpec, VectorSpec};
pub use realize::{
    render_gray, render_rgba, GrayBuffer, RenderConfig, RgbaBuffer, TextureGray16, TextureRgba,
};
