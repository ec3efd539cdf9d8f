//! Triangle meshes as supplied by the render side
//!
//! Mesh based parts (primitives, rubbers, ramps) hand us their render mesh, wound
//! counter-clockwise when seen from the outside. Physics triangles list the same
//! corners in the opposite order, the collider generator takes care of that.

pub mod simplify;

use crate::math::{Matrix3D, Vec3};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use simplify::simplify;

/// Render vertex: position, normal and texture coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeshVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub nx: f32,
    pub ny: f32,
    pub nz: f32,
    pub tu: f32,
    pub tv: f32,
}

impl MeshVertex {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::new(self.nx, self.ny, self.nz)
    }
}

/// Triangle as three indices into the vertex list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Face {
    pub i0: u32,
    pub i1: u32,
    pub i2: u32,
}

impl Face {
    pub const fn new(i0: u32, i1: u32, i2: u32) -> Self {
        Self { i0, i1, i2 }
    }

    pub fn indices(&self) -> [u32; 3] {
        [self.i0, self.i1, self.i2]
    }

    /// Two or more shared indices
    pub fn is_degenerate(&self) -> bool {
        self.i0 == self.i1 || self.i1 == self.i2 || self.i2 == self.i0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub faces: Vec<Face>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A face references a vertex that does not exist
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
    /// Indices are 32 bit, bigger meshes can not be addressed
    TooManyVertices(usize),
    /// The collapse queue ran dry before every vertex got an order
    IncompleteCollapseOrder { collapsed: usize, expected: usize },
}

impl Error for MeshError {}

impl Display for MeshError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshError::IndexOutOfRange {
                face,
                index,
                vertex_count,
            } => write!(
                f,
                "face {face} references vertex {index} but the mesh has {vertex_count} vertices"
            ),
            MeshError::TooManyVertices(count) => {
                write!(f, "mesh has {count} vertices, more than 32 bit indices allow")
            }
            MeshError::IncompleteCollapseOrder {
                collapsed,
                expected,
            } => write!(
                f,
                "simplification stopped after {collapsed} of {expected} vertex collapses"
            ),
        }
    }
}

impl Mesh {
    pub fn new(vertices: Vec<MeshVertex>, faces: Vec<Face>) -> Self {
        Self { vertices, faces }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Checks that every face only references existing vertices
    pub fn validate(&self) -> Result<(), MeshError> {
        if u32::try_from(self.vertices.len()).is_err() {
            return Err(MeshError::TooManyVertices(self.vertices.len()));
        }
        let vertex_count = self.vertices.len();
        for (face_index, face) in self.faces.iter().enumerate() {
            if let Some(&index) = face
                .indices()
                .iter()
                .find(|&&i| i as usize >= vertex_count)
            {
                return Err(MeshError::IndexOutOfRange {
                    face: face_index,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Returns a copy with positions and normals transformed to table space
    pub fn transformed(&self, matrix: &Matrix3D) -> Mesh {
        let vertices = self
            .vertices
            .iter()
            .map(|v| {
                let p = matrix.transform_point(v.position());
                let n = matrix.transform_vector(v.normal()).normalize();
                MeshVertex {
                    x: p.x,
                    y: p.y,
                    z: p.z,
                    nx: n.x,
                    ny: n.y,
                    nz: n.z,
                    tu: v.tu,
                    tv: v.tv,
                }
            })
            .collect();
        Mesh {
            vertices,
            faces: self.faces.clone(),
        }
    }
}
