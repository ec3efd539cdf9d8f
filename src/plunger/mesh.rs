//! Render mesh of the plunger rod
//!
//! Spins the lathe profile around the rod axis. The tip follows the plunger position
//! while the last station stays anchored at the rod bottom, so the rod stretches and
//! shrinks as the plunger travels.

use super::PlungerGeometry;
use crate::mesh::{Face, Mesh, MeshVertex};
use std::f32::consts::PI;

/// Vertices around the circumference of each station
pub const LATHE_POINTS: usize = 16;

/// Builds the rod mesh with the tip at `position`. Flat plungers have no lathe.
pub fn lathe_mesh(geometry: &PlungerGeometry, position: f32) -> Option<Mesh> {
    let coords = &geometry.desc.coords;
    if coords.is_empty() {
        return None;
    }

    let mut vertices = Vec::with_capacity(coords.len() * LATHE_POINTS);
    let mut faces = Vec::with_capacity((coords.len() - 1) * LATHE_POINTS * 2);
    let last = coords.len() - 1;
    let mut prev_y = f32::MIN;

    for (i, c) in coords.iter().enumerate() {
        let y = if i == last && coords.len() > 1 {
            geometry.desc.rod_bottom_y
        } else {
            position + c.y
        };
        // the rod bottom may end up in front of the ring when fully pulled
        let y = y.max(prev_y);
        prev_y = y;
        let radius = c.r * geometry.width;
        let step_u = 1.0 / LATHE_POINTS as f32;

        for l in 0..LATHE_POINTS {
            // angle 0 is at the top of the rod
            let (sin, cos) = (2.0 * PI * l as f32 / LATHE_POINTS as f32).sin_cos();
            let mut tu = 0.51 + l as f32 * step_u;
            if tu > 1.0 {
                tu -= 1.0;
            }
            vertices.push(MeshVertex {
                x: geometry.center.x + radius * sin,
                y,
                z: geometry.z_axis + radius * cos,
                nx: c.nx * sin,
                ny: c.ny,
                nz: c.nx * cos,
                tu,
                tv: c.tv,
            });
        }

        if i > 0 {
            connect_rings(&mut faces, ((i - 1) * LATHE_POINTS) as u32);
        }
    }

    Some(Mesh::new(vertices, faces))
}

/// Two triangles per quad between the ring starting at `base` and the next one
fn connect_rings(faces: &mut Vec<Face>, base: u32) {
    let n = LATHE_POINTS as u32;
    for l in 0..n {
        let i0 = base + l;
        let i1 = base + (l + 1) % n;
        let i2 = base + n + l;
        let i3 = base + n + (l + 1) % n;
        faces.push(Face::new(i0, i2, i1));
        faces.push(Face::new(i1, i2, i3));
    }
}
