//! Coordinate transforms
//!
//! Nodes here change where a source is sampled, never what it returns, so
//! each one works unchanged over scalar, vector and color sources.
//!
//! - [`Transform`]: affine remap
//! - [`Pixelate`]: snap to cell centers
//! - [`Strip`]: fix y, also usable as a [`crate::wave::Wave`]
//! - [`Reflect`], [`Kaleidoscope`]: mirror folding
//! - [`Warp`]: parametric non-affine deformations

pub mod affine;
pub mod reflect;
pub mod warp;

pub use affine::{Pixelate, Strip, Transform};
pub use reflect::{Kaleidoscope, Mirror, Reflect};
pub use warp::{Warp, WarpFunc};
