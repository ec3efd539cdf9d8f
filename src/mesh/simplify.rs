//! Progressive mesh reduction
//!
//! Edge collapse decimation after Stan Melax, "A Simple, Fast, and Effective Polygon
//! Reduction Algorithm" (Game Developer, November 1998). VPinball runs the same scheme
//! over dense primitive meshes before it builds their colliders.
//!
//! The whole collapse order is computed up front. Vertices are then permuted so the
//! most collapsible ones sort last, which turns any reduction into "keep the first
//! `n` vertices and remap the faces through the collapse map".

use super::{Face, Mesh, MeshError, MeshVertex};
use crate::math::Vec3;
use log::debug;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::instrument;

/// Reduces `mesh` to at most `target_vertex_count` vertices.
///
/// Faces that collapse to a line or a point are dropped. A mesh that already fits is
/// returned unchanged. On error nothing of the partial reduction is returned.
#[instrument(skip(mesh), fields(vertex_count = mesh.vertex_count(), face_count = mesh.face_count()))]
pub fn simplify(mesh: &Mesh, target_vertex_count: usize) -> Result<Mesh, MeshError> {
    mesh.validate()?;
    let vertex_count = mesh.vertex_count();
    if vertex_count <= target_vertex_count {
        return Ok(mesh.clone());
    }
    if target_vertex_count == 0 {
        return Ok(Mesh::default());
    }

    let CollapseOrder {
        collapse_map,
        permutation,
    } = ProgressiveMesh::new(mesh).collapse_order()?;

    let mut vertices = vec![MeshVertex::default(); vertex_count];
    for (old, &new) in permutation.iter().enumerate() {
        vertices[new as usize] = mesh.vertices[old];
    }
    vertices.truncate(target_vertex_count);

    let faces: Vec<Face> = mesh
        .faces
        .iter()
        .filter_map(|face| {
            let [i0, i1, i2] = face.indices().map(|i| {
                map_index(
                    &collapse_map,
                    permutation[i as usize],
                    target_vertex_count,
                )
            });
            let reduced = Face::new(i0, i1, i2);
            (!reduced.is_degenerate()).then_some(reduced)
        })
        .collect();

    debug!(
        "Reduced mesh from {} to {} vertices, {} to {} faces",
        vertex_count,
        vertices.len(),
        mesh.face_count(),
        faces.len()
    );
    Ok(Mesh { vertices, faces })
}

/// Follows the collapse chain until the index falls inside the kept prefix.
///
/// Every vertex collapses onto one that is removed later, so it sits at a lower
/// index and the walk always ends.
fn map_index(collapse_map: &[u32], mut index: u32, max: usize) -> u32 {
    while index as usize >= max {
        index = collapse_map[index as usize];
    }
    index
}

struct CollapseOrder {
    /// For the vertex at (permuted) index `i`, the permuted index it collapses onto
    collapse_map: Vec<u32>,
    /// Original vertex index to permuted index
    permutation: Vec<u32>,
}

struct PmVertex {
    position: Vec3,
    neighbors: Vec<usize>,
    faces: Vec<usize>,
    cost: f32,
    collapse: Option<usize>,
    stamp: u32,
    removed: bool,
}

struct PmTriangle {
    v: [usize; 3],
    normal: Vec3,
}

/// Heap entry, stale once the vertex stamp moved on
struct Candidate {
    cost: f32,
    vertex: usize,
    stamp: u32,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the maximum: cheapest cost first, then the lowest index
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

struct ProgressiveMesh {
    vertices: Vec<PmVertex>,
    triangles: Vec<PmTriangle>,
    heap: BinaryHeap<Candidate>,
}

impl ProgressiveMesh {
    fn new(mesh: &Mesh) -> Self {
        let mut pm = ProgressiveMesh {
            vertices: mesh
                .vertices
                .iter()
                .map(|v| PmVertex {
                    position: v.position(),
                    neighbors: Vec::new(),
                    faces: Vec::new(),
                    cost: 0.0,
                    collapse: None,
                    stamp: 0,
                    removed: false,
                })
                .collect(),
            triangles: Vec::with_capacity(mesh.face_count()),
            heap: BinaryHeap::with_capacity(mesh.vertex_count() * 2),
        };
        for face in mesh.faces.iter().filter(|f| !f.is_degenerate()) {
            pm.add_triangle(face.indices().map(|i| i as usize));
        }
        for v in 0..pm.vertices.len() {
            pm.compute_cost_at_vertex(v);
        }
        pm
    }

    fn add_triangle(&mut self, v: [usize; 3]) {
        let t = self.triangles.len();
        self.triangles.push(PmTriangle {
            v,
            normal: Vec3::default(),
        });
        self.compute_normal(t);
        for i in 0..3 {
            self.vertices[v[i]].faces.push(t);
            for j in 0..3 {
                if i != j {
                    add_unique(&mut self.vertices[v[i]].neighbors, v[j]);
                }
            }
        }
    }

    fn compute_normal(&mut self, t: usize) {
        let [a, b, c] = self.triangles[t].v.map(|i| self.vertices[i].position);
        let normal = Vec3::cross(&(b - a), &(c - b));
        if normal.length() > 0.0 {
            self.triangles[t].normal = normal.normalize();
        }
    }

    fn remove_if_non_neighbor(&mut self, v: usize, n: usize) {
        if !self.vertices[v].neighbors.contains(&n) {
            return;
        }
        let shares_face = self.vertices[v]
            .faces
            .iter()
            .any(|&f| self.triangles[f].v.contains(&n));
        if !shares_face {
            self.vertices[v].neighbors.retain(|&x| x != n);
        }
    }

    fn delete_triangle(&mut self, t: usize) {
        let v = self.triangles[t].v;
        for &vi in &v {
            self.vertices[vi].faces.retain(|&f| f != t);
        }
        for i in 0..3 {
            let i2 = (i + 1) % 3;
            self.remove_if_non_neighbor(v[i], v[i2]);
            self.remove_if_non_neighbor(v[i2], v[i]);
        }
    }

    fn replace_vertex(&mut self, t: usize, vold: usize, vnew: usize) {
        if let Some(slot) = self.triangles[t].v.iter().position(|&x| x == vold) {
            self.triangles[t].v[slot] = vnew;
        }
        self.vertices[vold].faces.retain(|&f| f != t);
        add_unique(&mut self.vertices[vnew].faces, t);

        let v = self.triangles[t].v;
        for &vi in &v {
            self.remove_if_non_neighbor(vold, vi);
            self.remove_if_non_neighbor(vi, vold);
        }
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    add_unique(&mut self.vertices[v[i]].neighbors, v[j]);
                }
            }
        }
        self.compute_normal(t);
    }

    fn remove_vertex(&mut self, u: usize) {
        let neighbors = std::mem::take(&mut self.vertices[u].neighbors);
        for n in neighbors {
            self.vertices[n].neighbors.retain(|&x| x != u);
        }
        self.vertices[u].removed = true;
    }

    /// Edge length times curvature, where curvature uses the face around `u`
    /// that turns the furthest away from the faces shared by `u` and `v`.
    fn edge_collapse_cost(&self, u: usize, v: usize) -> f32 {
        let edge_length = (self.vertices[v].position - self.vertices[u].position).length();
        let sides: Vec<usize> = self.vertices[u]
            .faces
            .iter()
            .copied()
            .filter(|&f| self.triangles[f].v.contains(&v))
            .collect();

        let mut curvature = 0.0f32;
        for &f in &self.vertices[u].faces {
            let mut min_curv = 1.0f32;
            for &s in &sides {
                let dot = self.triangles[f].normal.dot(&self.triangles[s].normal);
                min_curv = min_curv.min((1.0 - dot) / 2.0);
            }
            curvature = curvature.max(min_curv);
        }
        edge_length * curvature
    }

    fn compute_cost_at_vertex(&mut self, v: usize) {
        let (cost, collapse) = if self.vertices[v].neighbors.is_empty() {
            // isolated vertices go first
            (-0.01, None)
        } else {
            let mut best: Option<(f32, usize)> = None;
            for &n in &self.vertices[v].neighbors {
                let c = self.edge_collapse_cost(v, n);
                let better = match best {
                    None => true,
                    Some((best_cost, best_n)) => match c.total_cmp(&best_cost) {
                        Ordering::Less => true,
                        Ordering::Equal => n < best_n,
                        Ordering::Greater => false,
                    },
                };
                if better {
                    best = Some((c, n));
                }
            }
            match best {
                Some((c, n)) => (c, Some(n)),
                None => (-0.01, None),
            }
        };

        let vertex = &mut self.vertices[v];
        vertex.cost = cost;
        vertex.collapse = collapse;
        vertex.stamp += 1;
        self.heap.push(Candidate {
            cost,
            vertex: v,
            stamp: vertex.stamp,
        });
    }

    fn collapse(&mut self, u: usize, target: Option<usize>) {
        let Some(v) = target else {
            self.remove_vertex(u);
            return;
        };
        let affected = self.vertices[u].neighbors.clone();

        for i in (0..self.vertices[u].faces.len()).rev() {
            let t = self.vertices[u].faces[i];
            if self.triangles[t].v.contains(&v) {
                self.delete_triangle(t);
            }
        }
        for i in (0..self.vertices[u].faces.len()).rev() {
            let t = self.vertices[u].faces[i];
            self.replace_vertex(t, u, v);
        }
        self.remove_vertex(u);

        for n in affected {
            self.compute_cost_at_vertex(n);
        }
    }

    fn pop_cheapest(&mut self) -> Option<usize> {
        while let Some(candidate) = self.heap.pop() {
            let vertex = &self.vertices[candidate.vertex];
            if !vertex.removed && vertex.stamp == candidate.stamp {
                return Some(candidate.vertex);
            }
        }
        None
    }

    fn collapse_order(mut self) -> Result<CollapseOrder, MeshError> {
        let n = self.vertices.len();
        let mut permutation = vec![0u32; n];
        let mut targets: Vec<Option<usize>> = vec![None; n];

        for i in (0..n).rev() {
            let Some(cheapest) = self.pop_cheapest() else {
                return Err(MeshError::IncompleteCollapseOrder {
                    collapsed: n - 1 - i,
                    expected: n,
                });
            };
            permutation[cheapest] = i as u32;
            let target = self.vertices[cheapest].collapse;
            targets[i] = target;
            self.collapse(cheapest, target);
        }

        let collapse_map = targets
            .iter()
            .map(|t| t.map_or(0, |t| permutation[t]))
            .collect();
        Ok(CollapseOrder {
            collapse_map,
            permutation,
        })
    }
}

fn add_unique(list: &mut Vec<usize>, value: usize) {
    if !list.contains(&value) {
        list.push(value);
    }
}
