//! Math helpers shared by the movers and the collider generation
//!
//! - Small vector types (vec submodule)
//! - 4x4 affine transforms for mesh based parts (matrix submodule)
//! - Angle, quadratic and arc helpers (geometry submodule)

mod geometry;
mod matrix;
mod vec;

pub use geometry::*;
pub use matrix::*;
pub use vec::*;
