//!
//! Vpin-physics simulates the moving parts of a virtual pinball table.
//!
//! It turns flipper and plunger settings into kinematic movers and converts render meshes
//! of primitives, rubbers and ramps into collider lists for a collision solver.
//!
//! The contact solver itself, rendering and table file parsing live elsewhere.

pub mod collider;
pub mod config;
pub mod flipper;
pub mod math;
pub mod mesh;
pub mod plunger;
pub mod table;
