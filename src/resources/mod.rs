//! Mesh and color resources
//!
//! Geometry containers, normal estimation, and the color utilities that feed the
//! visual's color buffer.

pub mod color;
mod colormap;
mod mesh;
mod normals;

pub use color::ColorSpec;
pub use colormap::*;
pub use mesh::*;
pub use normals::*;
