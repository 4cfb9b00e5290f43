//! Noise and data driven leaf fields
//!
//! - [`Perlin`]: seeded lattice gradient noise
//! - [`WorleyField`], [`BlinnField`]: feature point fields
//! - [`Binary`], [`BlockNoise`]: seeded blocky patterns
//! - [`ImageField`], [`ImageVector`]: bicubic raster sampling

pub mod blocks;
pub mod cellular;
pub mod image;
pub mod perlin;

pub use blocks::{Binary, BlockNoise};
pub use cellular::{random_points, BlinnField, Distance, Falloff, WorleyField};
pub use image::{ImageField, ImageVector, Raster, RasterRgba};
pub use perlin::Perlin;
