//! Collider generation for mesh based parts
//!
//! Primitives, rubbers and ramps collide with their render mesh. Every face becomes a
//! triangle collider, every distinct edge a line and every vertex a point, so the ball
//! can hit faces, sharp edges and tips alike.
//!
//! Dense meshes are reduced first. How hard depends on the part's collision reduction
//! factor, see [`reduced_vertex_count`].

use super::{Collider, ColliderInfo, EdgeSet, TriangleCollider};
use crate::config::PrimitiveConfig;
use crate::math::{Matrix3D, Vec3};
use crate::mesh::{Mesh, simplify};
use log::{debug, warn};
use std::borrow::Cow;
use tracing::instrument;

/// Meshes at or below this vertex count are never reduced
pub const MIN_REDUCED_VERTEX_COUNT: usize = 420;

/// Vertex count a mesh is reduced to before generating colliders.
///
/// `max(n ^ (clamp(1 - reduction_factor, 0, 1) * 0.25 + 0.75), 420)`
///
/// A reduction factor of 0 keeps the mesh as is, 1 reduces it to `n^0.75`.
pub fn reduced_vertex_count(vertex_count: usize, reduction_factor: f32) -> usize {
    let keep = if reduction_factor.is_nan() {
        1.0
    } else {
        (1.0 - reduction_factor).clamp(0.0, 1.0)
    };
    if keep >= 1.0 {
        return vertex_count.max(MIN_REDUCED_VERTEX_COUNT);
    }
    let exponent = f64::from(keep) * 0.25 + 0.75;
    let reduced = (vertex_count as f64).powf(exponent) as usize;
    reduced.max(MIN_REDUCED_VERTEX_COUNT)
}

/// Generates the colliders for a mesh that is already in table space.
///
/// The render winding is flipped for the physics side. Shared edges are only emitted
/// once. An empty or invalid mesh produces no colliders.
#[instrument(skip(mesh, info), fields(item_id = info.item_id, vertex_count = mesh.vertex_count()))]
pub fn generate_colliders(mesh: &Mesh, info: ColliderInfo, reduction_factor: f32) -> Vec<Collider> {
    if mesh.vertices.is_empty() {
        return Vec::new();
    }
    if let Err(e) = mesh.validate() {
        warn!(
            "Skipping colliders for {:?} {}: {e}",
            info.item_type, info.item_id
        );
        return Vec::new();
    }

    let target = reduced_vertex_count(mesh.vertex_count(), reduction_factor);
    let mesh: Cow<Mesh> = if target < mesh.vertex_count() {
        match simplify(mesh, target) {
            Ok(reduced) => Cow::Owned(reduced),
            Err(e) => {
                warn!(
                    "Mesh reduction failed for {:?} {}, using the full mesh: {e}",
                    info.item_type, info.item_id
                );
                Cow::Borrowed(mesh)
            }
        }
    } else {
        Cow::Borrowed(mesh)
    };

    let mut colliders = Vec::with_capacity(mesh.face_count() * 3 + mesh.vertex_count());
    let mut edges = EdgeSet::with_capacity(mesh.face_count() * 3 / 2);
    let mut degenerate = 0;
    let position = |i: u32| mesh.vertices[i as usize].position();

    for face in &mesh.faces {
        let [i0, i1, i2] = face.indices();
        let rgv: [Vec3; 3] = [position(i0), position(i2), position(i1)];

        let triangle = TriangleCollider::new(rgv, info);
        if triangle.is_degenerate() {
            degenerate += 1;
        } else {
            colliders.push(Collider::Triangle(triangle));
        }

        if i0 != i1 && edges.should_add_edge(i0, i1) {
            colliders.push(Collider::line(rgv[0], rgv[2], info));
        }
        if i1 != i2 && edges.should_add_edge(i1, i2) {
            colliders.push(Collider::line(rgv[2], rgv[1], info));
        }
        if i2 != i0 && edges.should_add_edge(i2, i0) {
            colliders.push(Collider::line(rgv[1], rgv[0], info));
        }
    }

    colliders.extend(
        mesh.vertices
            .iter()
            .map(|v| Collider::point(v.position(), info)),
    );

    if degenerate > 0 {
        debug!(
            "Skipped {degenerate} degenerate triangles for {:?} {}",
            info.item_type, info.item_id
        );
    }
    debug!(
        "Generated {} colliders ({} vertices, {} faces, {} edges)",
        colliders.len(),
        mesh.vertex_count(),
        mesh.face_count(),
        edges.len()
    );
    colliders
}

/// Generates the colliders of a primitive placed on the table.
///
/// The mesh is given in object space and moved to the part's position, size and
/// rotation on top of `surface_height`. Toys and non-collidable parts get nothing.
pub fn generate_primitive_colliders(
    config: &PrimitiveConfig,
    mesh: &Mesh,
    surface_height: f32,
    info: ColliderInfo,
) -> Vec<Collider> {
    if config.is_toy || !config.is_collidable {
        debug!("Primitive {} is not collidable", config.name);
        return Vec::new();
    }
    let position = Vec3::new(
        config.position.x,
        config.position.y,
        config.position.z + surface_height,
    );
    let matrix = Matrix3D::primitive_transform(position, config.size, config.rotation);
    generate_colliders(
        &mesh.transformed(&matrix),
        info,
        config.collision_reduction_factor,
    )
}
